//! Error types for esc-cli.
//!
//! Each failure family maps to a distinct process exit code so scripted
//! callers can tell a parse failure from an engine failure.

use std::path::PathBuf;
use std::process::ExitCode;

use escalar::error::EscalarError;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Dataset file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Bad command-line argument or sweep configuration
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Dataset could not be parsed or violates its invariants
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Estimator could not produce a fit
    #[error("Fit failed: {0}")]
    FitFailed(String),

    /// Sweep terminated early
    #[error("Sweep failed: {0}")]
    SweepFailed(String),

    /// JSON output could not be produced
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidArgument(_) => ExitCode::from(2),
            Self::FileNotFound(_) => ExitCode::from(3),
            Self::Dataset(_) => ExitCode::from(4),
            Self::FitFailed(_) => ExitCode::from(5),
            Self::SweepFailed(_) => ExitCode::from(6),
            Self::Io(_) => ExitCode::from(7),
            Self::Serialization(_) => ExitCode::from(8),
        }
    }
}

impl From<EscalarError> for CliError {
    fn from(e: EscalarError) -> Self {
        match e {
            EscalarError::MalformedDatasetRow { .. }
            | EscalarError::DuplicateThreadCount { .. }
            | EscalarError::MissingSample { .. }
            | EscalarError::InvalidSample { .. } => Self::Dataset(e.to_string()),
            EscalarError::InsufficientDataForFit { .. }
            | EscalarError::DivisionByZeroInFit { .. } => Self::FitFailed(e.to_string()),
            EscalarError::ExecutableNotFound { .. }
            | EscalarError::EngineNonZeroExit { .. } => Self::SweepFailed(e.to_string()),
            EscalarError::InvalidConfig { .. } => Self::InvalidArgument(e.to_string()),
            EscalarError::Io(io) => Self::Io(io),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        // Families must stay distinguishable for scripted callers.
        let errors = [
            CliError::InvalidArgument("x".into()),
            CliError::FileNotFound(PathBuf::from("x")),
            CliError::Dataset("x".into()),
            CliError::FitFailed("x".into()),
            CliError::SweepFailed("x".into()),
            CliError::Serialization("x".into()),
        ];
        let codes: Vec<String> = errors.iter().map(|e| format!("{:?}", e.exit_code())).collect();
        let mut unique = codes.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_fit_errors_map_to_fit_failed() {
        use escalar::amdahl::FitMethod;
        let e = EscalarError::InsufficientDataForFit {
            method: FitMethod::TwoPoint,
            reason: "no baseline".into(),
        };
        assert!(matches!(CliError::from(e), CliError::FitFailed(_)));
    }

    #[test]
    fn test_engine_errors_map_to_sweep_failed() {
        let e = EscalarError::EngineNonZeroExit {
            threads: 4,
            code: Some(1),
        };
        assert!(matches!(CliError::from(e), CliError::SweepFailed(_)));
    }
}
