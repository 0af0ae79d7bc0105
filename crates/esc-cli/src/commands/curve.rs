//! Curve command: export the fitted Amdahl curve for an external renderer.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use escalar::dataset::ThreadCount;
use escalar::predict::{predicted_curve, save_curve};

use super::{load_dataset, run_fit, MethodArg};
use crate::error::{CliError, Result};
use crate::output;

pub(crate) fn run(
    file: &Path,
    method: MethodArg,
    points: Option<&str>,
    out: Option<&Path>,
    json: bool,
) -> Result<()> {
    if method == MethodArg::Both {
        return Err(CliError::InvalidArgument(
            "curve requires a single fit method (two-point or least-squares)".to_string(),
        ));
    }
    let fit_method = method.methods()[0];

    let dataset = load_dataset(file)?;
    let fit = run_fit(fit_method, &dataset)?;

    let counts = match points {
        Some(spec) => parse_points(spec)?,
        None => dataset.thread_counts(),
    };
    let curve = predicted_curve(&fit, &counts);

    if json {
        let text = serde_json::to_string_pretty(&curve)
            .map_err(|e| CliError::Serialization(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    match out {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            save_curve(&curve, writer)?;
            output::success(&format!(
                "{} predicted points written to {}",
                curve.len(),
                path.display()
            ));
        }
        None => {
            save_curve(&curve, std::io::stdout().lock())?;
        }
    }
    Ok(())
}

fn parse_points(spec: &str) -> Result<Vec<ThreadCount>> {
    spec.split(',')
        .map(|token| {
            token.trim().parse::<ThreadCount>().map_err(|_| {
                CliError::InvalidArgument(format!("bad thread count {token:?} in --points"))
            })
        })
        .collect()
}
