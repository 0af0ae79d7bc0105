//! Escalar: strong-scaling benchmark harness with Amdahl's-Law fitting.
//!
//! Escalar drives an external parallel compute engine across a range of
//! worker-thread counts, records wall-clock execution time for each run,
//! persists the samples crash-safely, and estimates the inherently serial
//! fraction of the work by fitting Amdahl's Law.
//!
//! # Quick Start
//!
//! ```
//! use escalar::prelude::*;
//!
//! // A measured strong-scaling dataset.
//! let mut ds = ScalingDataset::new();
//! for &(threads, seconds) in &[(1, 100.0), (2, 55.0), (4, 30.0), (8, 18.0)] {
//!     ds.push(ExecutionSample { threads, seconds }).unwrap();
//! }
//!
//! // Estimate the serial fraction.
//! let fit = fit_least_squares(&ds).unwrap();
//! assert!(fit.f > 0.0 && fit.f < 1.0);
//!
//! // Predict the curve for comparison plots.
//! let curve = predicted_curve(&fit, &ds.thread_counts());
//! assert_eq!(curve.len(), 4);
//! ```
//!
//! # Modules
//!
//! - [`dataset`]: (thread count, execution time) samples and CSV persistence
//! - [`driver`]: sequential sweep orchestration over the external engine
//! - [`amdahl`]: two-point and least-squares serial-fraction estimators
//! - [`predict`]: pure Amdahl's-Law predictor and curve export
//! - [`error`]: error taxonomy carrying full diagnostic context

pub mod amdahl;
pub mod dataset;
pub mod driver;
pub mod error;
pub mod predict;
pub mod prelude;
