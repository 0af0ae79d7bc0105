//! Amdahl's-Law predictor: execution time from serial fraction.
//!
//! Pure functions only. Identical inputs always produce bit-identical
//! outputs, which keeps both estimators' residuals deterministic and
//! comparable.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::amdahl::AmdahlFit;
use crate::dataset::ThreadCount;
use crate::error::Result;

/// Literal header line of the exported curve format.
pub const CURVE_HEADER: &str = "threads,predicted_time_sec";

/// One point of a predicted scaling curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedPoint {
    /// Thread count the prediction is for.
    pub threads: ThreadCount,
    /// Predicted execution time in seconds.
    pub predicted_seconds: f64,
}

/// Predicted execution times, one per requested thread count, input order.
pub type PredictedCurve = Vec<PredictedPoint>;

/// Predicted execution time under Amdahl's Law:
/// `T(N) = T1 * ((1 - f) + f / N)`.
///
/// # Examples
///
/// ```
/// use escalar::predict::predict;
///
/// // Fully serial work does not speed up at all.
/// assert_eq!(predict(10.0, 0.0, 32), 10.0);
/// // Fully parallel work scales perfectly.
/// assert_eq!(predict(10.0, 1.0, 2), 5.0);
/// ```
#[must_use]
pub fn predict(baseline_seconds: f64, f: f64, threads: ThreadCount) -> f64 {
    baseline_seconds * ((1.0 - f) + f / f64::from(threads))
}

/// Evaluates a fit over a set of thread counts, preserving input order.
#[must_use]
pub fn predicted_curve(fit: &AmdahlFit, thread_counts: &[ThreadCount]) -> PredictedCurve {
    thread_counts
        .iter()
        .map(|&threads| PredictedPoint {
            threads,
            predicted_seconds: predict(fit.baseline_seconds, fit.f, threads),
        })
        .collect()
}

/// Writes a predicted curve as CSV for an external renderer.
///
/// # Errors
///
/// Returns [`crate::error::EscalarError::Io`] on write failure.
pub fn save_curve(curve: &[PredictedPoint], mut sink: impl Write) -> Result<()> {
    writeln!(sink, "{CURVE_HEADER}")?;
    for point in curve {
        writeln!(sink, "{},{}", point.threads, point.predicted_seconds)?;
    }
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amdahl::FitMethod;

    #[test]
    fn test_predict_at_one_thread_is_baseline() {
        assert!((predict(100.0, 0.37, 1) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_known_value() {
        // T1 = 10, f = 0.6, N = 4: 10 * (0.4 + 0.15) = 5.5
        assert!((predict(10.0, 0.6, 4) - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_predict_is_pure_bit_identical() {
        let a = predict(123.456, 0.789, 17);
        let b = predict(123.456, 0.789, 17);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_curve_preserves_input_order() {
        let fit = AmdahlFit {
            f: 0.5,
            method: FitMethod::TwoPoint,
            baseline_seconds: 10.0,
            residual: 0.0,
            warning: None,
        };
        let curve = predicted_curve(&fit, &[8, 1, 2]);
        let order: Vec<u32> = curve.iter().map(|p| p.threads).collect();
        assert_eq!(order, vec![8, 1, 2]);
        assert!((curve[1].predicted_seconds - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_save_curve_format() {
        let curve = vec![
            PredictedPoint {
                threads: 1,
                predicted_seconds: 10.0,
            },
            PredictedPoint {
                threads: 2,
                predicted_seconds: 7.5,
            },
        ];
        let mut out = Vec::new();
        save_curve(&curve, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "threads,predicted_time_sec\n1,10\n2,7.5\n");
    }
}
