//! Subcommand implementations.

pub(crate) mod curve;
pub(crate) mod fit;
pub(crate) mod sweep;

use std::path::Path;

use clap::ValueEnum;
use escalar::amdahl::{fit_least_squares, fit_two_point, AmdahlFit, FitMethod};
use escalar::dataset::ScalingDataset;
use escalar::error::EscalarError;

use crate::error::{CliError, Result};

/// Estimator selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum MethodArg {
    /// Closed form from T(1) and T(N)
    TwoPoint,
    /// Ordinary least squares over all samples
    LeastSquares,
    /// Run both estimators
    Both,
}

impl std::fmt::Display for MethodArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Must match the clap value names so default_value_t round-trips.
        match self {
            MethodArg::TwoPoint => write!(f, "two-point"),
            MethodArg::LeastSquares => write!(f, "least-squares"),
            MethodArg::Both => write!(f, "both"),
        }
    }
}

impl MethodArg {
    /// The concrete estimators this selection expands to.
    pub(crate) fn methods(self) -> &'static [FitMethod] {
        match self {
            MethodArg::TwoPoint => &[FitMethod::TwoPoint],
            MethodArg::LeastSquares => &[FitMethod::LeastSquares],
            MethodArg::Both => &[FitMethod::TwoPoint, FitMethod::LeastSquares],
        }
    }
}

/// Dispatches to the selected estimator.
pub(crate) fn run_fit(
    method: FitMethod,
    dataset: &ScalingDataset,
) -> std::result::Result<AmdahlFit, EscalarError> {
    match method {
        FitMethod::TwoPoint => fit_two_point(dataset),
        FitMethod::LeastSquares => fit_least_squares(dataset),
    }
}

/// Loads a dataset, mapping a missing file to a dedicated error.
pub(crate) fn load_dataset(path: &Path) -> Result<ScalingDataset> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    ScalingDataset::load_from_path(path).map_err(CliError::from)
}
