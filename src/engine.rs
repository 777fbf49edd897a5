//! Call contracts consumed by the host runtime.
//!
//! An [`Explorer`] binds the derivations to one read-only dataset handle.
//! [`View::dependencies`] declares which inputs each derivation reads; the
//! host re-invokes a derivation whenever one of them changes, and for
//! nothing else.

use std::sync::Arc;

use serde::Serialize;

use crate::constraint;
use crate::data::filter::{FilterState, RowSubset, filter};
use crate::data::loader::load_dataset;
use crate::data::model::Dataset;
use crate::derive::smoothing::{LowessSmoother, Smoother, parse_fraction};
use crate::derive::{
    self, GroupedDistribution, HierarchyBreakdown, ProportionTable, ScatterSeries,
};
use crate::error::{ExploreError, Result};

// ---------------------------------------------------------------------------
// Dependency declaration
// ---------------------------------------------------------------------------

/// A host-bound input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Input {
    Sex,
    AgeRange,
    CategoricalPredictor,
    ScatterX,
    ScatterY,
    SmoothingToggle,
    SmoothingFraction,
    DistributionPredictor,
}

/// A derived output the host displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum View {
    Hierarchy,
    Proportions,
    Scatter,
    Distribution,
    SecondPredictorOptions,
    SmoothingPanel,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Hierarchy,
        View::Proportions,
        View::Scatter,
        View::Distribution,
        View::SecondPredictorOptions,
        View::SmoothingPanel,
    ];

    /// Exactly the inputs this view is computed from.
    pub fn dependencies(self) -> &'static [Input] {
        use Input::*;
        match self {
            View::Hierarchy | View::Proportions => &[Sex, AgeRange, CategoricalPredictor],
            View::Scatter => &[
                Sex,
                AgeRange,
                ScatterX,
                ScatterY,
                SmoothingToggle,
                SmoothingFraction,
            ],
            View::Distribution => &[Sex, AgeRange, DistributionPredictor],
            View::SecondPredictorOptions => &[ScatterX],
            View::SmoothingPanel => &[SmoothingToggle],
        }
    }
}

/// Views to recompute after `input` changed.
pub fn views_affected_by(input: Input) -> Vec<View> {
    View::ALL
        .into_iter()
        .filter(|view| view.dependencies().contains(&input))
        .collect()
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

/// Scatter result as shown to the user: the base series always renders; a
/// smoothing failure only drops the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterView {
    pub series: ScatterSeries,
    #[serde(skip)]
    pub smoothing_error: Option<ExploreError>,
}

/// Read-only handle over the loaded dataset.
#[derive(Clone)]
pub struct Explorer {
    dataset: Arc<Dataset>,
    smoother: Arc<dyn Smoother + Send + Sync>,
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("rows", &self.dataset.len())
            .finish_non_exhaustive()
    }
}

impl Explorer {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            smoother: Arc::new(LowessSmoother::default()),
        }
    }

    /// Load the dataset at `uri`. Fails with `DataUnavailable`.
    pub fn load(uri: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(load_dataset(uri)?)))
    }

    /// Replace the smoothing primitive.
    pub fn with_smoother(mut self, smoother: Arc<dyn Smoother + Send + Sync>) -> Self {
        self.smoother = smoother;
        self
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    fn subset(&self, filters: &FilterState) -> RowSubset<'_> {
        filter(&self.dataset, filters)
    }

    pub fn recompute_hierarchy(
        &self,
        filters: &FilterState,
        predictor: &str,
    ) -> Result<HierarchyBreakdown> {
        derive::hierarchy(&self.subset(filters), predictor).inspect_err(log_failure)
    }

    pub fn recompute_proportions(
        &self,
        filters: &FilterState,
        predictor: &str,
    ) -> Result<ProportionTable> {
        derive::proportions(&self.subset(filters), predictor).inspect_err(log_failure)
    }

    /// Scatter of `y_predictor` against `x_predictor`.
    ///
    /// Only predictor errors fail the call. An unparsable fraction or a
    /// failed fit yields the base series plus the error that removed the
    /// overlay.
    pub fn recompute_scatter(
        &self,
        filters: &FilterState,
        x_predictor: &str,
        y_predictor: &str,
        smoothing_requested: bool,
        fraction: &str,
    ) -> Result<ScatterView> {
        let subset = self.subset(filters);
        let mut series =
            derive::scatter(&subset, x_predictor, y_predictor, None, self.smoother.as_ref())
                .inspect_err(log_failure)?;

        let mut smoothing_error = None;
        if smoothing_requested {
            let fitted = parse_fraction(fraction).and_then(|f| {
                derive::scatter::smooth(&series, f, self.smoother.as_ref())
            });
            match fitted {
                Ok(curve) => series.smoothed = Some(curve),
                Err(e) => {
                    log_failure(&e);
                    smoothing_error = Some(e);
                }
            }
        }

        Ok(ScatterView {
            series,
            smoothing_error,
        })
    }

    pub fn recompute_distribution(
        &self,
        filters: &FilterState,
        predictor: &str,
    ) -> Result<GroupedDistribution> {
        derive::distribution(&self.subset(filters), predictor).inspect_err(log_failure)
    }

    pub fn second_predictor_options(&self, first_selection: &str) -> Vec<String> {
        constraint::second_predictor_options(self.dataset.numeric_predictors(), first_selection)
    }

    pub fn smoothing_panel_visible(&self, smoothing_requested: bool) -> bool {
        constraint::smoothing_panel_visible(smoothing_requested)
    }
}

fn log_failure(e: &ExploreError) {
    if e.is_recoverable() {
        log::warn!("{e}");
    } else {
        log::error!("{e}");
    }
}
