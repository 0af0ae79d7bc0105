//! Sweep command: drive the engine across thread counts and persist timings.

use std::path::{Path, PathBuf};

use escalar::driver::{BenchmarkDriver, SweepConfig};

use crate::error::{CliError, Result};
use crate::output;

#[allow(clippy::too_many_arguments)]
pub(crate) fn run(
    executable: &Path,
    cells: u64,
    min_threads: u32,
    max_threads: u32,
    out: Option<PathBuf>,
    env_var: &str,
    json: bool,
) -> Result<()> {
    let mut config = SweepConfig::new(executable, cells, max_threads)
        .with_min_threads(min_threads)
        .with_thread_env_var(env_var);
    if let Some(out) = out {
        config = config.with_output(out);
    }
    let output_path = config.output.clone();

    if !json {
        output::section("Scaling sweep");
        output::kv("Executable", executable.display());
        output::kv("Workload", format!("{cells} cells"));
        output::kv("Threads", format!("{min_threads}..={max_threads}"));
        output::kv("Output", output_path.display());
        println!();
    }

    let driver = BenchmarkDriver::new(config);
    let counts: Vec<u32> = (min_threads..=max_threads).collect();
    let report = driver.run_observed(&counts, |sample| {
        if !json {
            println!("  {} threads -> {:.6} s", sample.threads, sample.seconds);
        }
    })?;

    if json {
        let payload = serde_json::json!({
            "dataset": report.dataset,
            "samples": report.dataset.len(),
            "complete": report.is_complete(),
            "failure": report.failure.as_ref().map(|f| f.cause.to_string()),
            "output": output_path,
        });
        let text = serde_json::to_string_pretty(&payload)
            .map_err(|e| CliError::Serialization(e.to_string()))?;
        println!("{text}");
    }

    match report.failure {
        None => {
            if !json {
                println!();
                output::success(&format!(
                    "{} samples saved to {}",
                    report.dataset.len(),
                    output_path.display()
                ));
            }
            Ok(())
        }
        Some(failure) => {
            if !json {
                println!();
                output::fail(&format!("sweep aborted at {} threads", failure.threads));
                output::info(&format!(
                    "{} samples kept in {}",
                    report.dataset.len(),
                    output_path.display()
                ));
            }
            Err(CliError::SweepFailed(format!(
                "{} ({} samples kept in {})",
                failure.cause,
                report.dataset.len(),
                output_path.display()
            )))
        }
    }
}
