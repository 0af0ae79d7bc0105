//! esc - Scaling-benchmark operations CLI
//!
//! Usage:
//!   esc sweep --executable ./gas --cells 125000 --max-threads 32
//!   esc fit varthreads_125000_cells.csv              # both estimators
//!   esc fit data.csv --method least-squares --json   # machine-readable
//!   esc curve data.csv --out amdahl_curve.csv        # curve for the renderer

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;
mod output;

use commands::MethodArg;

/// esc - Scaling-Benchmark Harness
///
/// Drive an external parallel engine across thread counts, persist the
/// timings, and fit Amdahl's Law to estimate the serial fraction.
#[derive(Parser)]
#[command(name = "esc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scaling sweep against the engine executable
    Sweep {
        /// Path to the benchmarked executable
        #[arg(long, value_name = "PATH")]
        executable: PathBuf,

        /// Workload size passed to the engine (number of cells)
        #[arg(long)]
        cells: u64,

        /// Smallest thread count (inclusive)
        #[arg(long, default_value_t = 1)]
        min_threads: u32,

        /// Largest thread count (inclusive)
        #[arg(long)]
        max_threads: u32,

        /// Output CSV (default: varthreads_<cells>_cells.csv)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Environment variable controlling engine parallelism
        #[arg(long, default_value = "OMP_NUM_THREADS")]
        env_var: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fit Amdahl's Law to a persisted dataset
    Fit {
        /// Dataset CSV produced by a sweep
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Estimator to run
        #[arg(long, value_enum, default_value_t = MethodArg::Both)]
        method: MethodArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the predicted scaling curve as CSV
    Curve {
        /// Dataset CSV produced by a sweep
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Estimator backing the curve
        #[arg(long, value_enum, default_value_t = MethodArg::LeastSquares)]
        method: MethodArg,

        /// Comma-separated thread counts (default: the dataset's own)
        #[arg(long, value_name = "LIST")]
        points: Option<String>,

        /// Destination file (default: stdout)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sweep {
            executable,
            cells,
            min_threads,
            max_threads,
            out,
            env_var,
            json,
        } => commands::sweep::run(
            &executable,
            cells,
            min_threads,
            max_threads,
            out,
            &env_var,
            json,
        ),
        Commands::Fit { file, method, json } => commands::fit::run(&file, method, json),
        Commands::Curve {
            file,
            method,
            points,
            out,
            json,
        } => commands::curve::run(&file, method, points.as_deref(), out.as_deref(), json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            e.exit_code()
        }
    }
}
