//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use escalar::prelude::*;
//! ```

pub use crate::amdahl::{fit_least_squares, fit_two_point, AmdahlFit, FitMethod, FitWarning};
pub use crate::dataset::{
    dataset_filename, ExecutionSample, ScalingDataset, ThreadCount, DATASET_HEADER,
};
pub use crate::driver::{
    BenchmarkDriver, EngineRunner, ProcessSpec, SweepConfig, SweepReport, SystemEngine,
};
pub use crate::error::EscalarError;
pub use crate::predict::{predict, predicted_curve, PredictedCurve, PredictedPoint};
