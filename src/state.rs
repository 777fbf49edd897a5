use std::sync::Arc;

use crate::config::{Config, INITIAL_FRACTION};
use crate::data::filter::{FilterState, SexFilter};
use crate::derive::smoothing::LowessSmoother;
use crate::derive::{GroupedDistribution, HierarchyBreakdown, ProportionTable};
use crate::engine::{Explorer, Input, ScatterView, View, views_affected_by};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Selections – every host-bound input
// ---------------------------------------------------------------------------

/// Current value of every selector in one viewer session.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub sex: SexFilter,
    pub age_range: (i64, i64),
    pub categorical: String,
    pub scatter_x: String,
    pub scatter_y: String,
    pub smoothing: bool,
    /// Raw text of the fraction input.
    pub fraction: String,
    pub distribution: String,
}

impl Selections {
    /// Any sex, full age range, first categorical predictor, first and
    /// second numeric predictors, smoothing off.
    pub fn initial(explorer: &Explorer) -> Self {
        let ds = explorer.dataset();
        let first = |list: &[String], n: usize| {
            list.get(n)
                .or_else(|| list.first())
                .cloned()
                .unwrap_or_default()
        };
        Self {
            sex: SexFilter::Any,
            age_range: ds.age_range(),
            categorical: first(ds.categorical_predictors(), 0),
            scatter_x: first(ds.numeric_predictors(), 0),
            scatter_y: first(ds.numeric_predictors(), 1),
            smoothing: false,
            fraction: INITIAL_FRACTION.to_string(),
            distribution: first(ds.numeric_predictors(), 0),
        }
    }

    pub fn filters(&self) -> FilterState {
        FilterState::new(self.sex.clone(), self.age_range.0, self.age_range.1)
    }
}

/// One input change coming from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Sex(SexFilter),
    AgeRange(i64, i64),
    CategoricalPredictor(String),
    ScatterX(String),
    ScatterY(String),
    SmoothingToggle(bool),
    SmoothingFraction(String),
    DistributionPredictor(String),
}

impl Change {
    pub fn input(&self) -> Input {
        match self {
            Change::Sex(_) => Input::Sex,
            Change::AgeRange(..) => Input::AgeRange,
            Change::CategoricalPredictor(_) => Input::CategoricalPredictor,
            Change::ScatterX(_) => Input::ScatterX,
            Change::ScatterY(_) => Input::ScatterY,
            Change::SmoothingToggle(_) => Input::SmoothingToggle,
            Change::SmoothingFraction(_) => Input::SmoothingFraction,
            Change::DistributionPredictor(_) => Input::DistributionPredictor,
        }
    }
}

// ---------------------------------------------------------------------------
// Session – selections plus the views derived from them
// ---------------------------------------------------------------------------

/// Per-viewer state. Each view holds its own result so one failure never
/// hides the others.
#[derive(Debug)]
pub struct Session {
    explorer: Explorer,
    pub selections: Selections,
    pub hierarchy: Result<HierarchyBreakdown>,
    pub proportions: Result<ProportionTable>,
    pub scatter: Result<ScatterView>,
    pub distribution: Result<GroupedDistribution>,
    pub second_options: Vec<String>,
    pub smoothing_panel_visible: bool,
}

impl Session {
    pub fn new(explorer: Explorer) -> Self {
        let selections = Selections::initial(&explorer);
        Self::with_selections(explorer, selections)
    }

    pub fn with_selections(explorer: Explorer, selections: Selections) -> Self {
        let filters = selections.filters();
        Session {
            hierarchy: explorer.recompute_hierarchy(&filters, &selections.categorical),
            proportions: explorer.recompute_proportions(&filters, &selections.categorical),
            scatter: explorer.recompute_scatter(
                &filters,
                &selections.scatter_x,
                &selections.scatter_y,
                selections.smoothing,
                &selections.fraction,
            ),
            distribution: explorer.recompute_distribution(&filters, &selections.distribution),
            second_options: explorer.second_predictor_options(&selections.scatter_x),
            smoothing_panel_visible: explorer.smoothing_panel_visible(selections.smoothing),
            explorer,
            selections,
        }
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    /// Apply one input change and recompute only the views that read it.
    ///
    /// Returns the recomputed views. Changing the first scatter selector to
    /// the second's value leaves the second selection untouched.
    pub fn apply(&mut self, change: Change) -> Vec<View> {
        let input = change.input();
        let s = &mut self.selections;
        match change {
            Change::Sex(v) => s.sex = v,
            Change::AgeRange(low, high) => s.age_range = (low, high),
            Change::CategoricalPredictor(v) => s.categorical = v,
            Change::ScatterX(v) => s.scatter_x = v,
            Change::ScatterY(v) => s.scatter_y = v,
            Change::SmoothingToggle(v) => s.smoothing = v,
            Change::SmoothingFraction(v) => s.fraction = v,
            Change::DistributionPredictor(v) => s.distribution = v,
        }

        let views = views_affected_by(input);
        for &view in &views {
            self.recompute(view);
        }
        log::debug!("{input:?} changed, recomputed {views:?}");
        views
    }

    fn recompute(&mut self, view: View) {
        let s = &self.selections;
        let filters = s.filters();
        let ex = &self.explorer;
        match view {
            View::Hierarchy => self.hierarchy = ex.recompute_hierarchy(&filters, &s.categorical),
            View::Proportions => {
                self.proportions = ex.recompute_proportions(&filters, &s.categorical)
            }
            View::Scatter => {
                self.scatter = ex.recompute_scatter(
                    &filters,
                    &s.scatter_x,
                    &s.scatter_y,
                    s.smoothing,
                    &s.fraction,
                )
            }
            View::Distribution => {
                self.distribution = ex.recompute_distribution(&filters, &s.distribution)
            }
            View::SecondPredictorOptions => {
                self.second_options = ex.second_predictor_options(&s.scatter_x)
            }
            View::SmoothingPanel => {
                self.smoothing_panel_visible = ex.smoothing_panel_visible(s.smoothing)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full host state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    pub config: Config,

    /// Active session (None until a dataset is loaded).
    pub session: Option<Session>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Load a dataset and start a fresh session on it. A failure keeps the
    /// previous session and reports the error.
    pub fn open(&mut self, uri: &str) {
        match Explorer::load(uri) {
            Ok(explorer) => {
                let smoother = LowessSmoother {
                    iterations: self.config.lowess_iterations,
                };
                self.session = Some(Session::new(explorer.with_smoother(Arc::new(smoother))));
                self.status_message = None;
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    /// Forward a selector change to the active session.
    pub fn apply(&mut self, change: Change) {
        if let Some(session) = &mut self.session {
            session.apply(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;
    use crate::error::ExploreError;

    const CSV: &str = "\
Age,Sex,ChestPainType,Cholesterol,MaxHR,HeartDisease
40,M,ATA,289,172,0
49,F,NAP,180,156,1
37,M,ATA,283,98,0
48,F,ASY,214,108,1
54,M,NAP,195,122,0
39,M,NAP,339,170,0
";

    fn session() -> Session {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        Session::new(Explorer::new(Arc::new(ds)))
    }

    #[test]
    fn test_initial_selections() {
        let s = session();
        assert_eq!(s.selections.categorical, "Sex");
        assert_eq!(s.selections.scatter_x, "Age");
        assert_eq!(s.selections.scatter_y, "Cholesterol");
        assert_eq!(s.selections.age_range, (37, 54));
        assert_eq!(s.second_options, vec!["Cholesterol", "MaxHR"]);
        assert!(!s.smoothing_panel_visible);
        assert_eq!(s.hierarchy.as_ref().unwrap().total(), 6);
    }

    #[test]
    fn test_fraction_change_only_touches_scatter() {
        let mut s = session();
        let views = s.apply(Change::SmoothingFraction("0.5".into()));
        assert_eq!(views, vec![View::Scatter]);
    }

    #[test]
    fn test_first_selector_matching_second_keeps_second() {
        let mut s = session();
        s.apply(Change::ScatterX("Cholesterol".into()));
        assert_eq!(s.selections.scatter_y, "Cholesterol");
        assert_eq!(s.second_options, vec!["Age", "MaxHR"]);
        assert!(s.scatter.is_ok());
    }

    #[test]
    fn test_invalid_fraction_keeps_base_series() {
        let mut s = session();
        s.apply(Change::SmoothingToggle(true));
        s.apply(Change::SmoothingFraction("abc".into()));
        assert!(s.smoothing_panel_visible);

        let view = s.scatter.as_ref().unwrap();
        assert_eq!(view.series.points.len(), 6);
        assert!(view.series.smoothed.is_none());
        assert!(matches!(view.smoothing_error, Some(ExploreError::InvalidSmoothingFraction(_))));
    }

    #[test]
    fn test_failing_view_does_not_block_others() {
        let mut s = session();
        s.apply(Change::CategoricalPredictor("MaxHR".into()));
        assert!(s.hierarchy.is_err());
        assert!(s.proportions.is_err());
        assert!(s.distribution.is_ok());
        assert!(s.scatter.is_ok());
    }

    #[test]
    fn test_age_filter_to_empty_yields_empty_views() {
        let mut s = session();
        s.apply(Change::AgeRange(60, 80));
        assert!(s.hierarchy.as_ref().unwrap().is_empty());
        assert!(s.proportions.as_ref().unwrap().is_empty());
        assert!(s.distribution.as_ref().unwrap().is_empty());
        assert!(s.scatter.as_ref().unwrap().series.is_empty());
    }

    #[test]
    fn test_open_failure_sets_status() {
        let mut app = AppState::default();
        app.open("/nonexistent/heart.csv");
        assert!(app.session.is_none());
        assert!(app.status_message.unwrap().starts_with("Error: Dataset unavailable"));
    }
}
