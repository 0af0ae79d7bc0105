//! Error types for escalar operations.
//!
//! Provides rich error context for library consumers: every failure carries
//! the thread count, row index, or operand values needed to diagnose it
//! without re-running the sweep.

use std::fmt;
use std::path::PathBuf;

use crate::amdahl::FitMethod;
use crate::dataset::ThreadCount;

/// Main error type for escalar operations.
///
/// # Examples
///
/// ```
/// use escalar::error::EscalarError;
///
/// let err = EscalarError::EngineNonZeroExit {
///     threads: 8,
///     code: Some(1),
/// };
/// assert!(err.to_string().contains("8 threads"));
/// ```
#[derive(Debug)]
pub enum EscalarError {
    /// The benchmarked executable does not exist or is not on PATH.
    ExecutableNotFound {
        /// Path that was invoked
        path: PathBuf,
    },

    /// The engine exited with a non-zero status.
    EngineNonZeroExit {
        /// Thread count of the failing invocation
        threads: ThreadCount,
        /// Exit code, `None` when the process was killed by a signal
        code: Option<i32>,
    },

    /// A persisted dataset row could not be parsed.
    MalformedDatasetRow {
        /// 1-based physical line number (the header is line 1)
        row: usize,
        /// Raw line content
        content: String,
        /// What was wrong with it
        reason: String,
    },

    /// Two samples share the same thread count.
    DuplicateThreadCount {
        /// The repeated thread count
        threads: ThreadCount,
    },

    /// No sample recorded for the requested thread count.
    MissingSample {
        /// The absent thread count
        threads: ThreadCount,
    },

    /// A sample violates the dataset invariants.
    InvalidSample {
        /// Thread count of the rejected sample
        threads: ThreadCount,
        /// Measured time of the rejected sample
        seconds: f64,
        /// Which invariant it violates
        reason: String,
    },

    /// The dataset lacks the samples a fit method requires.
    InsufficientDataForFit {
        /// Estimator that was attempted
        method: FitMethod,
        /// Which precondition failed
        reason: String,
    },

    /// A fit computation would divide by zero.
    DivisionByZeroInFit {
        /// Estimator that was attempted
        method: FitMethod,
        /// The failing expression, e.g. `"TN / T1"`
        expression: String,
        /// Numerator at the point of failure
        lhs: f64,
        /// Denominator at the point of failure (zero)
        rhs: f64,
    },

    /// Sweep configuration rejected at validation.
    InvalidConfig {
        /// Which field and constraint
        reason: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),
}

impl fmt::Display for EscalarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscalarError::ExecutableNotFound { path } => {
                write!(f, "Executable not found: {}", path.display())
            }
            EscalarError::EngineNonZeroExit { threads, code } => match code {
                Some(code) => {
                    write!(f, "Engine exited with status {code} at {threads} threads")
                }
                None => write!(f, "Engine terminated by signal at {threads} threads"),
            },
            EscalarError::MalformedDatasetRow {
                row,
                content,
                reason,
            } => {
                write!(f, "Malformed dataset row {row} ({reason}): {content:?}")
            }
            EscalarError::DuplicateThreadCount { threads } => {
                write!(f, "Duplicate sample for {threads} threads")
            }
            EscalarError::MissingSample { threads } => {
                write!(f, "No sample recorded for {threads} threads")
            }
            EscalarError::InvalidSample {
                threads,
                seconds,
                reason,
            } => {
                write!(
                    f,
                    "Invalid sample ({threads} threads, {seconds} s): {reason}"
                )
            }
            EscalarError::InsufficientDataForFit { method, reason } => {
                write!(f, "Insufficient data for {method} fit: {reason}")
            }
            EscalarError::DivisionByZeroInFit {
                method,
                expression,
                lhs,
                rhs,
            } => {
                write!(
                    f,
                    "Division by zero in {method} fit: {expression} with numerator {lhs}, denominator {rhs}"
                )
            }
            EscalarError::InvalidConfig { reason } => {
                write!(f, "Invalid sweep configuration: {reason}")
            }
            EscalarError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for EscalarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EscalarError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EscalarError {
    fn from(err: std::io::Error) -> Self {
        EscalarError::Io(err)
    }
}

/// Result type alias for escalar operations.
pub type Result<T> = std::result::Result<T, EscalarError>;
