use std::fmt;

/// Which classified column set a predictor was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorKind {
    Categorical,
    Numeric,
}

impl fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictorKind::Categorical => write!(f, "categorical"),
            PredictorKind::Numeric => write!(f, "numeric"),
        }
    }
}

/// Errors produced by the exploration core.
///
/// Every variant is local to the view that raised it; the session keeps one
/// result per view so a failure in one never blocks the others.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExploreError {
    /// The dataset could not be retrieved or parsed. Fatal at startup.
    #[error("Dataset unavailable: {0}")]
    DataUnavailable(String),

    /// A selector handed the core a column outside the classified set.
    #[error("'{predictor}' is not a {kind} predictor")]
    InvalidPredictor {
        predictor: String,
        kind: PredictorKind,
    },

    /// Smoothing fraction outside [0, 1] or not parsable.
    #[error("Invalid smoothing fraction: {0}")]
    InvalidSmoothingFraction(String),

    /// The local regression primitive could not fit the filtered data.
    #[error("Smoothing unavailable: {0}")]
    SmoothingUnavailable(String),
}

impl ExploreError {
    /// Recoverable errors degrade a view; the rest indicate a wiring bug or a
    /// missing dataset.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExploreError::InvalidSmoothingFraction(_) | ExploreError::SmoothingUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExploreError>;
