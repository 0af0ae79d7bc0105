//! Fit command: estimate the serial fraction from a persisted dataset.

use std::path::Path;

use escalar::amdahl::{AmdahlFit, FitWarning};
use escalar::error::EscalarError;

use super::{load_dataset, run_fit, MethodArg};
use crate::error::{CliError, Result};
use crate::output;

pub(crate) fn run(file: &Path, method: MethodArg, json: bool) -> Result<()> {
    let dataset = load_dataset(file)?;

    let mut fits: Vec<AmdahlFit> = Vec::new();
    let mut failures: Vec<EscalarError> = Vec::new();
    for &m in method.methods() {
        match run_fit(m, &dataset) {
            Ok(fit) => fits.push(fit),
            Err(e) => failures.push(e),
        }
    }

    if json {
        let text = serde_json::to_string_pretty(&fits)
            .map_err(|e| CliError::Serialization(e.to_string()))?;
        println!("{text}");
    } else {
        output::section("Amdahl fit");
        output::kv("Dataset", file.display());
        output::kv("Samples", dataset.len());
        for fit in &fits {
            print_fit(fit);
        }
        println!();
        for e in &failures {
            output::warning(&e.to_string());
        }
    }

    // With --method both, one surviving estimator is a success; the caller
    // asked for whatever the data supports. All-failed is an error.
    if fits.is_empty() {
        if let Some(e) = failures.into_iter().next() {
            return Err(e.into());
        }
    }
    Ok(())
}

fn print_fit(fit: &AmdahlFit) {
    println!();
    output::kv("Method", fit.method);
    output::kv("Serial fraction f", format!("{:.6}", fit.f));
    output::kv("Baseline T(1)", format!("{:.6} s", fit.baseline_seconds));
    output::kv("Residual", format!("{:.6e} s^2", fit.residual));
    if let Some(FitWarning::SerialFractionOutOfRange { f }) = fit.warning {
        output::warning(&format!(
            "serial fraction {f:.6} lies outside [0, 1]; suspect noisy measurements"
        ));
    }
}
