use serde::Serialize;

use crate::data::filter::RowSubset;
use crate::data::model::Outcome;
use crate::error::{PredictorKind, Result};

/// Values of one numeric predictor split by outcome, in row order.
///
/// Quartiles and whiskers are left to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedDistribution {
    pub predictor: String,
    pub healthy: Vec<f64>,
    pub disease: Vec<f64>,
}

impl GroupedDistribution {
    pub fn group(&self, outcome: Outcome) -> &[f64] {
        match outcome {
            Outcome::Healthy => &self.healthy,
            Outcome::Disease => &self.disease,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.healthy.is_empty() && self.disease.is_empty()
    }
}

/// Partition the predictor's non-null values by outcome.
pub fn distribution(subset: &RowSubset<'_>, predictor: &str) -> Result<GroupedDistribution> {
    let column = subset
        .dataset()
        .predictor_index(predictor, PredictorKind::Numeric)?;

    let mut grouped = GroupedDistribution {
        predictor: predictor.to_string(),
        healthy: Vec::new(),
        disease: Vec::new(),
    };
    for row in subset.rows() {
        let Some(value) = row.cell(column).as_f64() else {
            continue;
        };
        match row.outcome() {
            Outcome::Healthy => grouped.healthy.push(value),
            Outcome::Disease => grouped.disease.push(value),
        }
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterState, SexFilter, filter};
    use crate::data::loader::parse_csv;
    use crate::error::ExploreError;

    const CSV: &str = "\
Age,Sex,MaxHR,HeartDisease
40,M,172,0
49,F,156,1
37,M,,1
48,F,108,1
54,M,122,0
";

    #[test]
    fn test_partitions_in_row_order() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let d = distribution(&filter(&ds, &FilterState::unfiltered(&ds)), "MaxHR").unwrap();
        assert_eq!(d.healthy, vec![172.0, 122.0]);
        assert_eq!(d.disease, vec![156.0, 108.0]);
        assert_eq!(d.group(Outcome::Disease), &[156.0, 108.0]);
    }

    #[test]
    fn test_rejects_categorical_predictor() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::unfiltered(&ds));
        assert!(matches!(
            distribution(&subset, "Sex"),
            Err(ExploreError::InvalidPredictor { .. })
        ));
    }

    #[test]
    fn test_empty_subset() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        let subset = filter(&ds, &FilterState::new(SexFilter::Any, 0, 10));
        assert!(distribution(&subset, "Age").unwrap().is_empty());
    }
}
