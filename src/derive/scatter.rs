use serde::Serialize;

use super::smoothing::{Smoother, check_fraction};
use crate::data::filter::RowSubset;
use crate::data::model::Outcome;
use crate::error::{ExploreError, PredictorKind, Result};

/// One observation of the scatter view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub outcome: Outcome,
}

/// Trend overlay fitted by the smoother, non-decreasing in `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedCurve {
    pub fraction: f64,
    pub points: Vec<(f64, f64)>,
}

/// Paired numeric observations coloured by outcome, with an optional trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub x_predictor: String,
    pub y_predictor: String,
    pub points: Vec<ScatterPoint>,
    pub smoothed: Option<SmoothedCurve>,
}

impl ScatterSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Pair `x_predictor` with `y_predictor` for every row of the subset, and fit
/// a trend when a fraction is given.
///
/// Both predictors must be numeric. Identical axes are allowed. Rows with a
/// null in either column are skipped.
pub fn scatter<S: Smoother + ?Sized>(
    subset: &RowSubset<'_>,
    x_predictor: &str,
    y_predictor: &str,
    smoothing: Option<f64>,
    smoother: &S,
) -> Result<ScatterSeries> {
    let dataset = subset.dataset();
    let x_col = dataset.predictor_index(x_predictor, PredictorKind::Numeric)?;
    let y_col = dataset.predictor_index(y_predictor, PredictorKind::Numeric)?;

    let points = subset
        .rows()
        .filter_map(|row| {
            Some(ScatterPoint {
                x: row.cell(x_col).as_f64()?,
                y: row.cell(y_col).as_f64()?,
                outcome: row.outcome(),
            })
        })
        .collect();

    let mut series = ScatterSeries {
        x_predictor: x_predictor.to_string(),
        y_predictor: y_predictor.to_string(),
        points,
        smoothed: None,
    };
    if let Some(fraction) = smoothing {
        series.smoothed = Some(smooth(&series, fraction, smoother)?);
    }
    Ok(series)
}

/// Fit the trend for an existing series.
///
/// Fails with `InvalidSmoothingFraction` outside [0, 1] and with
/// `SmoothingUnavailable` when the smoother rejects the data.
pub fn smooth<S: Smoother + ?Sized>(
    series: &ScatterSeries,
    fraction: f64,
    smoother: &S,
) -> Result<SmoothedCurve> {
    let fraction = check_fraction(fraction)?;

    let mut pairs: Vec<(f64, f64)> = series.points.iter().map(|p| (p.x, p.y)).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

    let mut points = smoother
        .smooth(&xs, &ys, fraction)
        .map_err(ExploreError::SmoothingUnavailable)?;
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    log::debug!(
        "smoothed {} ~ {} over {} points (frac={fraction})",
        series.y_predictor,
        series.x_predictor,
        xs.len()
    );
    Ok(SmoothedCurve { fraction, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterState, filter};
    use crate::data::loader::parse_csv;

    /// Echoes the sorted input so tests can observe what the smoother saw.
    struct Echo;

    impl Smoother for Echo {
        fn smooth(
            &self,
            x: &[f64],
            y: &[f64],
            _fraction: f64,
        ) -> std::result::Result<Vec<(f64, f64)>, String> {
            if x.len() < 2 {
                return Err("at least 2 points required".into());
            }
            Ok(x.iter().copied().zip(y.iter().copied()).collect())
        }
    }

    const CSV: &str = "\
Age,Sex,Cholesterol,MaxHR,HeartDisease
63,M,233,150,1
41,F,204,172,0
56,M,,178,0
57,F,354,163,1
";

    #[test]
    fn test_base_series_skips_nulls_and_keeps_order() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::unfiltered(&ds));
        let series = scatter(&subset, "Age", "Cholesterol", None, &Echo).unwrap();

        assert_eq!(series.points.len(), 3);
        assert_eq!(series.points[0], ScatterPoint { x: 63.0, y: 233.0, outcome: Outcome::Disease });
        assert_eq!(series.points[2].x, 57.0);
        assert!(series.smoothed.is_none());
    }

    #[test]
    fn test_smoother_receives_pairs_sorted_by_x() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::unfiltered(&ds));
        let series = scatter(&subset, "Age", "MaxHR", Some(0.5), &Echo).unwrap();

        let curve = series.smoothed.unwrap();
        let xs: Vec<f64> = curve.points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![41.0, 56.0, 57.0, 63.0]);
        assert_eq!(curve.points[0].1, 172.0);
    }

    #[test]
    fn test_same_predictor_on_both_axes_still_computes() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::unfiltered(&ds));
        let series = scatter(&subset, "MaxHR", "MaxHR", None, &Echo).unwrap();
        assert!(series.points.iter().all(|p| p.x == p.y));
    }

    #[test]
    fn test_fraction_out_of_range() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::unfiltered(&ds));
        assert!(matches!(
            scatter(&subset, "Age", "MaxHR", Some(1.5), &Echo),
            Err(ExploreError::InvalidSmoothingFraction(_))
        ));
    }

    #[test]
    fn test_insufficient_data_is_smoothing_unavailable() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::new(crate::data::filter::SexFilter::Any, 41, 41));
        assert!(matches!(
            scatter(&subset, "Age", "MaxHR", Some(0.5), &Echo),
            Err(ExploreError::SmoothingUnavailable(_))
        ));
    }

    #[test]
    fn test_categorical_axis_is_invalid_predictor() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::unfiltered(&ds));
        assert!(matches!(
            scatter(&subset, "Sex", "MaxHR", None, &Echo),
            Err(ExploreError::InvalidPredictor { .. })
        ));
    }
}
