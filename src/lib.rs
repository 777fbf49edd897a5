//! Reactive derivation core of the heart disease exploration dashboard.
//!
//! ```text
//!  load_dataset ─► Dataset (shared, read-only)
//!                     │
//!   FilterState ──► filter ─► RowSubset ─┬─► hierarchy / proportions / distribution
//!                                        └─► scatter (+ lowess trend)
//!
//!   scatter x selector ─► second_predictor_options
//!   smoothing toggle   ─► smoothing_panel_visible
//! ```
//!
//! [`engine::Explorer`] exposes these as the calls the host makes, and
//! [`engine::View::dependencies`] says when to make them.

pub mod chart;
pub mod color;
pub mod config;
pub mod constraint;
pub mod data;
pub mod derive;
pub mod engine;
pub mod error;
pub mod state;

pub use data::filter::{FilterState, RowSubset, SexFilter, filter};
pub use data::loader::load_dataset;
pub use data::model::{CellValue, Dataset, Outcome, Row};
pub use engine::{Explorer, Input, ScatterView, View, views_affected_by};
pub use error::{ExploreError, PredictorKind, Result};
