//! Benchmark driver: sweeps the external engine across thread counts.
//!
//! The driver is single-threaded and strictly sequential. Running two engine
//! instances at once would contend for the same cores and invalidate every
//! timing measurement, so each invocation blocks until the child exits.
//! After every sample the whole dataset is rewritten to the output file: a
//! crash mid-sweep never loses already-measured samples, and the file is
//! parseable at every instant.
//!
//! Process execution goes through the [`EngineRunner`] seam so tests can
//! substitute a fake engine with scripted timings.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::dataset::{dataset_filename, ExecutionSample, ScalingDataset, ThreadCount};
use crate::error::{EscalarError, Result};

/// Environment variable the engine reads for its parallelism degree.
pub const DEFAULT_THREAD_ENV_VAR: &str = "OMP_NUM_THREADS";

/// Configuration of one sweep, validated once at sweep start.
///
/// # Examples
///
/// ```
/// use escalar::driver::SweepConfig;
///
/// let config = SweepConfig::new("./gas", 125_000, 32);
/// assert_eq!(config.min_threads, 1);
/// assert_eq!(config.output.to_str(), Some("varthreads_125000_cells.csv"));
/// ```
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Path to the benchmarked executable.
    pub executable: PathBuf,
    /// Problem size passed to the engine as its sole argument.
    pub workload_size: u64,
    /// Smallest thread count to measure (inclusive).
    pub min_threads: ThreadCount,
    /// Largest thread count to measure (inclusive).
    pub max_threads: ThreadCount,
    /// Destination of the persisted dataset.
    pub output: PathBuf,
    /// Environment variable controlling the engine's parallelism.
    pub thread_env_var: String,
}

impl SweepConfig {
    /// Creates a config sweeping `1..=max_threads`, writing to the
    /// conventional `varthreads_<workload>_cells.csv` in the working
    /// directory, controlling parallelism via `OMP_NUM_THREADS`.
    pub fn new(executable: impl Into<PathBuf>, workload_size: u64, max_threads: ThreadCount) -> Self {
        Self {
            executable: executable.into(),
            workload_size,
            min_threads: 1,
            max_threads,
            output: PathBuf::from(dataset_filename(workload_size)),
            thread_env_var: DEFAULT_THREAD_ENV_VAR.to_string(),
        }
    }

    /// Sets the smallest thread count to measure.
    #[must_use]
    pub fn with_min_threads(mut self, min_threads: ThreadCount) -> Self {
        self.min_threads = min_threads;
        self
    }

    /// Sets the dataset destination.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the parallelism-control environment variable.
    #[must_use]
    pub fn with_thread_env_var(mut self, var: impl Into<String>) -> Self {
        self.thread_env_var = var.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EscalarError::InvalidConfig`] for an empty executable path,
    /// a zero workload size, a zero minimum thread count, or an inverted
    /// thread range.
    pub fn validate(&self) -> Result<()> {
        if self.executable.as_os_str().is_empty() {
            return Err(EscalarError::InvalidConfig {
                reason: "executable path is empty".to_string(),
            });
        }
        if self.workload_size == 0 {
            return Err(EscalarError::InvalidConfig {
                reason: "workload size must be at least 1".to_string(),
            });
        }
        if self.min_threads == 0 {
            return Err(EscalarError::InvalidConfig {
                reason: "min_threads must be at least 1".to_string(),
            });
        }
        if self.min_threads > self.max_threads {
            return Err(EscalarError::InvalidConfig {
                reason: format!(
                    "min_threads ({}) exceeds max_threads ({})",
                    self.min_threads, self.max_threads
                ),
            });
        }
        Ok(())
    }

    /// The explicit invocation value for one thread count.
    #[must_use]
    pub fn process_spec(&self, threads: ThreadCount) -> ProcessSpec {
        ProcessSpec {
            executable: self.executable.clone(),
            args: vec![self.workload_size.to_string()],
            env: vec![(self.thread_env_var.clone(), threads.to_string())],
        }
    }
}

/// One fully-specified engine invocation: executable, arguments, and
/// environment overrides. No hidden state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Executable to invoke.
    pub executable: PathBuf,
    /// Positional arguments.
    pub args: Vec<String>,
    /// Environment overrides applied on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

/// Outcome of one engine invocation, as observed by a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineInvocation {
    /// Wall-clock time from process start to exit.
    pub elapsed: Duration,
    /// Exit code, `None` when killed by a signal.
    pub exit_code: Option<i32>,
    /// Whether the process exited with status zero.
    pub success: bool,
}

/// Process-execution seam. The driver never spawns processes directly, so
/// tests can substitute a fake engine.
pub trait EngineRunner {
    /// Runs one invocation to completion and reports its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EscalarError::ExecutableNotFound`] when the executable does
    /// not exist, [`EscalarError::Io`] for other spawn failures.
    fn run(&self, spec: &ProcessSpec) -> Result<EngineInvocation>;
}

/// Real runner: spawns the engine via [`std::process::Command`].
///
/// Stdout and stderr are discarded (they carry nothing the harness needs).
/// Elapsed time is measured on a monotonic clock spanning process start to
/// process exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEngine;

impl EngineRunner for SystemEngine {
    fn run(&self, spec: &ProcessSpec) -> Result<EngineInvocation> {
        let mut command = Command::new(&spec.executable);
        command
            .args(&spec.args)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        for (key, value) in &spec.env {
            command.env(key, value);
        }

        let start = Instant::now();
        let status = command.status().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EscalarError::ExecutableNotFound {
                    path: spec.executable.clone(),
                }
            } else {
                EscalarError::Io(e)
            }
        })?;
        let elapsed = start.elapsed();

        Ok(EngineInvocation {
            elapsed,
            exit_code: status.code(),
            success: status.success(),
        })
    }
}

/// The invocation that ended a sweep early.
#[derive(Debug)]
pub struct SweepFailure {
    /// Thread count of the failing invocation.
    pub threads: ThreadCount,
    /// What went wrong.
    pub cause: EscalarError,
}

/// Result of a sweep: the collected dataset plus, for an early-terminated
/// sweep, the failure that stopped it. Partial results are first-class —
/// everything in `dataset` is already durably persisted.
#[derive(Debug)]
pub struct SweepReport {
    /// Samples collected (and flushed) before any failure.
    pub dataset: ScalingDataset,
    /// `None` when every requested thread count was measured.
    pub failure: Option<SweepFailure>,
}

impl SweepReport {
    /// True when the sweep measured every requested thread count.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Drives the engine across a range of thread counts and records wall-clock
/// execution times.
pub struct BenchmarkDriver<R: EngineRunner = SystemEngine> {
    config: SweepConfig,
    runner: R,
}

impl BenchmarkDriver<SystemEngine> {
    /// Creates a driver backed by the real process runner.
    #[must_use]
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            runner: SystemEngine,
        }
    }
}

impl<R: EngineRunner> BenchmarkDriver<R> {
    /// Creates a driver with an injected runner (tests use a fake engine).
    pub fn with_runner(config: SweepConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// The sweep configuration.
    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Sweeps `min_threads..=max_threads` in ascending order.
    ///
    /// # Errors
    ///
    /// See [`BenchmarkDriver::run_observed`].
    pub fn run(&self) -> Result<SweepReport> {
        let counts: Vec<ThreadCount> = (self.config.min_threads..=self.config.max_threads).collect();
        self.run_observed(&counts, |_| {})
    }

    /// Sweeps an explicit sequence of thread counts in the given order.
    ///
    /// # Errors
    ///
    /// See [`BenchmarkDriver::run_observed`].
    pub fn run_thread_counts(&self, counts: &[ThreadCount]) -> Result<SweepReport> {
        self.run_observed(counts, |_| {})
    }

    /// Sweeps `counts` in request order, calling `on_sample` after each
    /// sample has been measured and flushed.
    ///
    /// The dataset file is rewritten (sorted ascending) after every sample.
    /// The first failing invocation aborts the remaining counts; samples
    /// collected so far stay persisted and are returned in the report next
    /// to the failure.
    ///
    /// # Errors
    ///
    /// Hard errors only: [`EscalarError::InvalidConfig`] from validation
    /// (including duplicate requested counts) and [`EscalarError::Io`] when
    /// the output file cannot be written. Engine failures are reported via
    /// [`SweepReport::failure`], not as an `Err`.
    pub fn run_observed(
        &self,
        counts: &[ThreadCount],
        mut on_sample: impl FnMut(&ExecutionSample),
    ) -> Result<SweepReport> {
        self.config.validate()?;
        for (i, &t) in counts.iter().enumerate() {
            if t == 0 {
                return Err(EscalarError::InvalidConfig {
                    reason: "requested thread count 0".to_string(),
                });
            }
            if counts[..i].contains(&t) {
                return Err(EscalarError::InvalidConfig {
                    reason: format!("thread count {t} requested twice"),
                });
            }
        }

        let mut dataset = ScalingDataset::new();
        // Header-only file up front: the destination is valid before the
        // first (possibly slow) invocation finishes.
        dataset.save_to_path(&self.config.output)?;

        let mut failure = None;
        for &threads in counts {
            let spec = self.config.process_spec(threads);
            match self.runner.run(&spec) {
                Ok(invocation) if invocation.success => {
                    let sample = ExecutionSample {
                        threads,
                        seconds: invocation.elapsed.as_secs_f64(),
                    };
                    dataset.push(sample)?;
                    dataset.save_to_path(&self.config.output)?;
                    on_sample(&sample);
                }
                Ok(invocation) => {
                    failure = Some(SweepFailure {
                        threads,
                        cause: EscalarError::EngineNonZeroExit {
                            threads,
                            code: invocation.exit_code,
                        },
                    });
                    break;
                }
                Err(cause) => {
                    failure = Some(SweepFailure { threads, cause });
                    break;
                }
            }
        }

        Ok(SweepReport { dataset, failure })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Scripted engine: pops one outcome per invocation, records specs.
    struct FakeEngine {
        outcomes: RefCell<VecDeque<Result<EngineInvocation>>>,
        specs: RefCell<Vec<ProcessSpec>>,
    }

    impl FakeEngine {
        fn new(outcomes: Vec<Result<EngineInvocation>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                specs: RefCell::new(Vec::new()),
            }
        }

        fn succeeding(timings_ms: &[u64]) -> Self {
            Self::new(timings_ms.iter().map(|&ms| Ok(ok_invocation(ms))).collect())
        }
    }

    fn ok_invocation(ms: u64) -> EngineInvocation {
        EngineInvocation {
            elapsed: Duration::from_millis(ms),
            exit_code: Some(0),
            success: true,
        }
    }

    fn failed_invocation(code: i32) -> EngineInvocation {
        EngineInvocation {
            elapsed: Duration::from_millis(1),
            exit_code: Some(code),
            success: false,
        }
    }

    impl EngineRunner for FakeEngine {
        fn run(&self, spec: &ProcessSpec) -> Result<EngineInvocation> {
            self.specs.borrow_mut().push(spec.clone());
            self.outcomes
                .borrow_mut()
                .pop_front()
                .expect("fake engine invoked more times than scripted")
        }
    }

    fn config_in(dir: &tempfile::TempDir, max_threads: ThreadCount) -> SweepConfig {
        SweepConfig::new("./gas", 125_000, max_threads)
            .with_output(dir.path().join("sweep.csv"))
    }

    #[test]
    fn test_full_sweep_appends_in_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::succeeding(&[300, 100, 200]);
        let driver = BenchmarkDriver::with_runner(config_in(&dir, 4), engine);

        let report = driver.run_thread_counts(&[4, 1, 2]).unwrap();
        assert!(report.is_complete());
        let order: Vec<u32> = report.dataset.samples().iter().map(|s| s.threads).collect();
        assert_eq!(order, vec![4, 1, 2]);
        assert!((report.dataset.time_at(4).unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_persisted_file_is_sorted_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir, 4);
        let output = config.output.clone();
        let engine = FakeEngine::succeeding(&[300, 100, 200]);
        let driver = BenchmarkDriver::with_runner(config, engine);

        driver.run_thread_counts(&[4, 1, 2]).unwrap();
        let persisted = ScalingDataset::load_from_path(&output).unwrap();
        let order: Vec<u32> = persisted.samples().iter().map(|s| s.threads).collect();
        assert_eq!(order, vec![1, 2, 4]);
    }

    #[test]
    fn test_engine_receives_workload_arg_and_thread_env() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::succeeding(&[10, 10]);
        let driver = BenchmarkDriver::with_runner(config_in(&dir, 2), engine);

        driver.run().unwrap();
        let specs = driver.runner.specs.borrow();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].args, vec!["125000".to_string()]);
        assert_eq!(
            specs[0].env,
            vec![("OMP_NUM_THREADS".to_string(), "1".to_string())]
        );
        assert_eq!(
            specs[1].env,
            vec![("OMP_NUM_THREADS".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_custom_thread_env_var() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir, 1).with_thread_env_var("RAYON_NUM_THREADS");
        let engine = FakeEngine::succeeding(&[10]);
        let driver = BenchmarkDriver::with_runner(config, engine);

        driver.run().unwrap();
        let specs = driver.runner.specs.borrow();
        assert_eq!(specs[0].env[0].0, "RAYON_NUM_THREADS");
    }

    #[test]
    fn test_non_zero_exit_aborts_but_keeps_prior_samples() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir, 4);
        let output = config.output.clone();
        let engine = FakeEngine::new(vec![
            Ok(ok_invocation(100)),
            Ok(ok_invocation(60)),
            Ok(failed_invocation(7)),
            Ok(ok_invocation(40)), // never reached
        ]);
        let driver = BenchmarkDriver::with_runner(config, engine);

        let report = driver.run_thread_counts(&[1, 2, 3, 4]).unwrap();
        assert!(!report.is_complete());
        let failure = report.failure.unwrap();
        assert_eq!(failure.threads, 3);
        assert!(matches!(
            failure.cause,
            EscalarError::EngineNonZeroExit {
                threads: 3,
                code: Some(7),
            }
        ));

        // Exactly the pre-failure samples, both in memory and on disk.
        assert_eq!(report.dataset.len(), 2);
        let persisted = ScalingDataset::load_from_path(&output).unwrap();
        assert_eq!(persisted.thread_counts(), vec![1, 2]);
    }

    #[test]
    fn test_missing_executable_leaves_valid_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir, 2);
        let output = config.output.clone();
        let engine = FakeEngine::new(vec![Err(EscalarError::ExecutableNotFound {
            path: PathBuf::from("./gas"),
        })]);
        let driver = BenchmarkDriver::with_runner(config, engine);

        let report = driver.run().unwrap();
        assert!(report.dataset.is_empty());
        assert!(matches!(
            report.failure.unwrap().cause,
            EscalarError::ExecutableNotFound { .. }
        ));
        // Header-only file parses as an empty dataset.
        let persisted = ScalingDataset::load_from_path(&output).unwrap();
        assert!(persisted.is_empty());
    }

    #[test]
    fn test_observer_sees_each_sample() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::succeeding(&[10, 20, 30]);
        let driver = BenchmarkDriver::with_runner(config_in(&dir, 3), engine);

        let mut seen = Vec::new();
        driver
            .run_observed(&[1, 2, 3], |sample| seen.push(sample.threads))
            .unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_validation_rejects_bad_configs() {
        let dir = tempfile::tempdir().unwrap();

        let inverted = config_in(&dir, 2).with_min_threads(8);
        let driver = BenchmarkDriver::with_runner(inverted, FakeEngine::succeeding(&[]));
        assert!(matches!(
            driver.run().unwrap_err(),
            EscalarError::InvalidConfig { .. }
        ));

        let empty_exe = SweepConfig::new("", 1000, 4).with_output(dir.path().join("x.csv"));
        let driver = BenchmarkDriver::with_runner(empty_exe, FakeEngine::succeeding(&[]));
        assert!(matches!(
            driver.run().unwrap_err(),
            EscalarError::InvalidConfig { .. }
        ));

        let zero_workload = SweepConfig::new("./gas", 0, 4).with_output(dir.path().join("y.csv"));
        let driver = BenchmarkDriver::with_runner(zero_workload, FakeEngine::succeeding(&[]));
        assert!(matches!(
            driver.run().unwrap_err(),
            EscalarError::InvalidConfig { .. }
        ));
    }

    #[test]
    fn test_duplicate_requested_counts_rejected_upfront() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::succeeding(&[10, 10]);
        let driver = BenchmarkDriver::with_runner(config_in(&dir, 4), engine);
        assert!(matches!(
            driver.run_thread_counts(&[2, 2]).unwrap_err(),
            EscalarError::InvalidConfig { .. }
        ));
        // Rejected before any invocation.
        assert!(driver.runner.specs.borrow().is_empty());
    }

    #[test]
    fn test_system_engine_reports_not_found() {
        let spec = ProcessSpec {
            executable: PathBuf::from("/nonexistent/engine-binary"),
            args: vec!["1000".to_string()],
            env: vec![("OMP_NUM_THREADS".to_string(), "1".to_string())],
        };
        assert!(matches!(
            SystemEngine.run(&spec).unwrap_err(),
            EscalarError::ExecutableNotFound { .. }
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_system_engine_measures_and_reports_exit() {
        let ok = ProcessSpec {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string(), "exit 0".to_string()],
            env: vec![],
        };
        let invocation = SystemEngine.run(&ok).unwrap();
        assert!(invocation.success);
        assert_eq!(invocation.exit_code, Some(0));

        let failing = ProcessSpec {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string(), "exit 3".to_string()],
            env: vec![],
        };
        let invocation = SystemEngine.run(&failing).unwrap();
        assert!(!invocation.success);
        assert_eq!(invocation.exit_code, Some(3));
    }
}
