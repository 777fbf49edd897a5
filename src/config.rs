use clap::Parser;

use crate::derive::smoothing::DEFAULT_ITERATIONS;

/// Step of the age range slider, in years.
pub const AGE_STEP: i64 = 5;

/// Fraction text shown before the user types one.
pub const INITIAL_FRACTION: &str = "0";

/// Heart disease data exploration dashboard.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "heart-explorer", version, about)]
pub struct Config {
    /// Dataset to load at startup (.csv, .json or .parquet, path or file:// URI).
    #[arg(long, env = "HEART_EXPLORER_DATA")]
    pub data: Option<String>,

    /// Robustness iterations of the lowess trend.
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub lowess_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: None,
            lowess_iterations: DEFAULT_ITERATIONS,
        }
    }
}
