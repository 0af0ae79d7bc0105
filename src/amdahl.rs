//! Serial-fraction estimators for Amdahl's Law.
//!
//! Two independent estimators over a [`ScalingDataset`]:
//!
//! - **Two-point**: closed form from `T(1)` and `T(N)` at the largest
//!   available thread count. Quick, but sensitive to noise in either
//!   endpoint.
//! - **Least squares**: linearizes `T(N)/T(1) = (1 - f) + f/N` as
//!   `y = a + b·x` with `x = 1/N` and solves the normal equations over
//!   every sample.
//!
//! Both report their residual in the original time domain, so the two fits
//! are directly comparable. Neither clamps `f`: an estimate outside `[0, 1]`
//! is a measurement-quality diagnostic, surfaced as a [`FitWarning`] on the
//! returned fit rather than an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::ScalingDataset;
use crate::error::{EscalarError, Result};
use crate::predict::predict;

/// Which estimator produced a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitMethod {
    /// Closed form from the `threads == 1` and largest-thread-count samples.
    TwoPoint,
    /// Ordinary least squares over the linearized model, all samples.
    LeastSquares,
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitMethod::TwoPoint => write!(f, "two-point"),
            FitMethod::LeastSquares => write!(f, "least-squares"),
        }
    }
}

/// Diagnostic attached to a fit whose estimate is suspect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FitWarning {
    /// Estimated serial fraction lies outside `[0, 1]`. Legitimate under
    /// noisy measurements (superlinear speedup or slowdown); never clamped.
    SerialFractionOutOfRange {
        /// The out-of-range estimate.
        f: f64,
    },
}

/// Result of fitting Amdahl's Law to a scaling dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmdahlFit {
    /// Estimated serial fraction. Conceptually in `[0, 1]`, not clamped.
    pub f: f64,
    /// Estimator that produced this fit.
    pub method: FitMethod,
    /// Measured single-thread time `T(1)` the fit is anchored to.
    pub baseline_seconds: f64,
    /// Sum of squared differences between measured and predicted times,
    /// over all samples, in seconds².
    pub residual: f64,
    /// Out-of-range diagnostic, when applicable.
    pub warning: Option<FitWarning>,
}

impl AmdahlFit {
    /// True when the estimated serial fraction lies outside `[0, 1]`.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        self.warning.is_some()
    }
}

/// Two-point closed-form estimate:
/// `f = (N · (1 − TN/T1)) / (N − 1)`.
///
/// Uses only the baseline sample and the largest-thread-count sample.
///
/// # Errors
///
/// - [`EscalarError::InsufficientDataForFit`] when there is no
///   `threads == 1` sample or only one distinct thread count.
/// - [`EscalarError::DivisionByZeroInFit`] when `T1 == 0`.
///
/// # Examples
///
/// ```
/// use escalar::dataset::{ExecutionSample, ScalingDataset};
/// use escalar::amdahl::fit_two_point;
///
/// let mut ds = ScalingDataset::new();
/// ds.push(ExecutionSample { threads: 1, seconds: 10.0 }).unwrap();
/// ds.push(ExecutionSample { threads: 32, seconds: 4.1875 }).unwrap();
///
/// let fit = fit_two_point(&ds).unwrap();
/// assert!((fit.f - 0.6).abs() < 1e-9);
/// ```
pub fn fit_two_point(dataset: &ScalingDataset) -> Result<AmdahlFit> {
    let t1 = dataset
        .time_at(1)
        .map_err(|_| EscalarError::InsufficientDataForFit {
            method: FitMethod::TwoPoint,
            reason: "no baseline sample at threads = 1".to_string(),
        })?;

    let n = dataset.max_threads().unwrap_or(1);
    if n <= 1 {
        return Err(EscalarError::InsufficientDataForFit {
            method: FitMethod::TwoPoint,
            reason: "need a sample at more than one thread".to_string(),
        });
    }
    let tn = dataset.time_at(n)?;

    if t1 == 0.0 {
        return Err(EscalarError::DivisionByZeroInFit {
            method: FitMethod::TwoPoint,
            expression: "TN / T1".to_string(),
            lhs: tn,
            rhs: t1,
        });
    }

    let n = f64::from(n);
    let f = (n * (1.0 - tn / t1)) / (n - 1.0);
    Ok(finish_fit(dataset, FitMethod::TwoPoint, t1, f))
}

/// Ordinary least-squares estimate over the linearized model.
///
/// With `x = 1/N` and `y = T(N)/T(1)`, solves `y = a + b·x` by the 2×2
/// normal equations over every sample (the `N = 1` point contributes the
/// degenerate but valid `x = 1, y = 1`), then recovers `f = b / (a + b)`.
///
/// # Errors
///
/// - [`EscalarError::InsufficientDataForFit`] with fewer than two distinct
///   thread counts, or no `threads == 1` baseline to normalize against.
/// - [`EscalarError::DivisionByZeroInFit`] when `T1 == 0`, when the
///   normal-equation determinant vanishes, or when `a + b == 0`.
pub fn fit_least_squares(dataset: &ScalingDataset) -> Result<AmdahlFit> {
    if dataset.distinct_thread_counts() < 2 {
        return Err(EscalarError::InsufficientDataForFit {
            method: FitMethod::LeastSquares,
            reason: "need at least two samples with distinct thread counts".to_string(),
        });
    }
    let t1 = dataset
        .time_at(1)
        .map_err(|_| EscalarError::InsufficientDataForFit {
            method: FitMethod::LeastSquares,
            reason: "no baseline sample at threads = 1 to normalize against".to_string(),
        })?;
    if t1 == 0.0 {
        return Err(EscalarError::DivisionByZeroInFit {
            method: FitMethod::LeastSquares,
            expression: "T(N) / T1".to_string(),
            lhs: 1.0,
            rhs: t1,
        });
    }

    let samples = dataset.ordered_samples();
    let m = samples.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_xy = 0.0;
    for sample in &samples {
        let x = 1.0 / f64::from(sample.threads);
        let y = sample.seconds / t1;
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_xy += x * y;
    }

    // Normal equations for y = a + b*x:
    //   m*a      + sum_x*b  = sum_y
    //   sum_x*a  + sum_xx*b = sum_xy
    let det = m * sum_xx - sum_x * sum_x;
    if det == 0.0 {
        return Err(EscalarError::DivisionByZeroInFit {
            method: FitMethod::LeastSquares,
            expression: "m·Σx² − (Σx)²".to_string(),
            lhs: m * sum_xx,
            rhs: sum_x * sum_x,
        });
    }
    let b = (m * sum_xy - sum_x * sum_y) / det;
    let a = (sum_y - b * sum_x) / m;

    let denom = a + b;
    if denom == 0.0 {
        return Err(EscalarError::DivisionByZeroInFit {
            method: FitMethod::LeastSquares,
            expression: "b / (a + b)".to_string(),
            lhs: b,
            rhs: denom,
        });
    }

    let f = b / denom;
    Ok(finish_fit(dataset, FitMethod::LeastSquares, t1, f))
}

/// Residual (time domain) and out-of-range diagnosis shared by both methods.
fn finish_fit(dataset: &ScalingDataset, method: FitMethod, baseline: f64, f: f64) -> AmdahlFit {
    let residual = dataset
        .ordered_samples()
        .iter()
        .map(|s| {
            let predicted = predict(baseline, f, s.threads);
            (s.seconds - predicted).powi(2)
        })
        .sum();

    let warning = if (0.0..=1.0).contains(&f) {
        None
    } else {
        Some(FitWarning::SerialFractionOutOfRange { f })
    };

    AmdahlFit {
        f,
        method,
        baseline_seconds: baseline,
        residual,
        warning,
    }
}
