//! Derived views computed from a filtered [`RowSubset`](crate::data::filter::RowSubset).
//!
//! Every function here is pure: same subset and parameters, same output.
//! Nothing is cached between calls.

pub mod distribution;
pub mod hierarchy;
pub mod proportion;
pub mod scatter;
pub mod smoothing;

pub use distribution::{GroupedDistribution, distribution};
pub use hierarchy::{CategoryNode, HierarchyBreakdown, OutcomeNode, hierarchy};
pub use proportion::{ProportionRow, ProportionTable, proportions};
pub use scatter::{ScatterPoint, ScatterSeries, SmoothedCurve, scatter};
pub use smoothing::{LowessSmoother, Smoother, parse_fraction};
