//! Seam to the local regression primitive and parsing of the bandwidth
//! fraction typed by the user.

use lowess::prelude::{Batch, Lowess as LowessBuilder};

use crate::error::{ExploreError, Result};

/// Robustness iterations of the classic lowess routine.
pub const DEFAULT_ITERATIONS: usize = 3;

/// A non-parametric smoother over `(x, y)` pairs already sorted by `x`.
///
/// Implementations return the fitted curve as `(x, y_hat)` points, or a
/// message describing why the data could not be fitted.
pub trait Smoother {
    fn smooth(
        &self,
        x: &[f64],
        y: &[f64],
        fraction: f64,
    ) -> std::result::Result<Vec<(f64, f64)>, String>;
}

/// Locally weighted scatterplot smoothing backed by the `lowess` crate.
#[derive(Debug, Clone, Copy)]
pub struct LowessSmoother {
    pub iterations: usize,
}

impl Default for LowessSmoother {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Smoother for LowessSmoother {
    fn smooth(
        &self,
        x: &[f64],
        y: &[f64],
        fraction: f64,
    ) -> std::result::Result<Vec<(f64, f64)>, String> {
        let result = LowessBuilder::<f64>::new()
            .fraction(fraction)
            .iterations(self.iterations)
            .delta(0.0)
            .adapter(Batch)
            .build()
            .map_err(|e| e.to_string())?
            .fit(x, y)
            .map_err(|e| e.to_string())?;

        Ok(result.x.into_iter().zip(result.y).collect())
    }
}

/// Parse the fraction input.
///
/// Accepted text is `1`, or `0` optionally followed by a point and digits
/// (`0`, `0.`, `0.25`). Anything else fails with `InvalidSmoothingFraction`.
pub fn parse_fraction(text: &str) -> Result<f64> {
    let invalid = || {
        ExploreError::InvalidSmoothingFraction(format!("'{text}' is not a number between 0 and 1"))
    };
    let trimmed = text.trim();
    if trimmed == "1" {
        return Ok(1.0);
    }
    let rest = trimmed.strip_prefix('0').ok_or_else(invalid)?;
    let digits = match rest.strip_prefix('.') {
        Some(digits) => digits,
        None if rest.is_empty() => "",
        None => return Err(invalid()),
    };
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    format!("0.{digits}0").parse::<f64>().map_err(|_| invalid())
}

/// Range check for a numeric fraction.
pub fn check_fraction(fraction: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&fraction) {
        Ok(fraction)
    } else {
        Err(ExploreError::InvalidSmoothingFraction(format!(
            "{fraction} is outside [0, 1]"
        )))
    }
}
