//! Scaling datasets: (thread count, execution time) samples and their
//! persisted CSV form.
//!
//! A [`ScalingDataset`] keeps samples in the order they were measured; the
//! persisted form and the accessors canonicalize to ascending thread count,
//! so "order measured" and "order stored" stay decoupled.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EscalarError, Result};

/// Number of worker threads used for one run. Always ≥ 1.
pub type ThreadCount = u32;

/// Literal header line of the persisted dataset format.
pub const DATASET_HEADER: &str = "threads,execution_time_sec";

/// One measured run of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSample {
    /// Worker-thread count the engine ran with.
    pub threads: ThreadCount,
    /// Measured wall-clock time in seconds. Never negative.
    pub seconds: f64,
}

/// Ordered collection of execution samples, unique per thread count.
///
/// # Examples
///
/// ```
/// use escalar::dataset::{ExecutionSample, ScalingDataset};
///
/// let mut ds = ScalingDataset::new();
/// ds.push(ExecutionSample { threads: 1, seconds: 100.0 }).unwrap();
/// ds.push(ExecutionSample { threads: 4, seconds: 30.0 }).unwrap();
///
/// assert_eq!(ds.time_at(4).unwrap(), 30.0);
/// assert_eq!(ds.max_threads(), Some(4));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingDataset {
    samples: Vec<ExecutionSample>,
}

impl ScalingDataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the dataset holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in the order they were appended (measurement order).
    #[must_use]
    pub fn samples(&self) -> &[ExecutionSample] {
        &self.samples
    }

    /// Samples sorted ascending by thread count (canonical order).
    #[must_use]
    pub fn ordered_samples(&self) -> Vec<ExecutionSample> {
        let mut ordered = self.samples.clone();
        ordered.sort_by_key(|s| s.threads);
        ordered
    }

    /// Number of distinct thread counts (equals `len()` by invariant).
    #[must_use]
    pub fn distinct_thread_counts(&self) -> usize {
        self.samples.len()
    }

    /// Appends a sample.
    ///
    /// # Errors
    ///
    /// Returns [`EscalarError::InvalidSample`] for a zero thread count or a
    /// negative/non-finite time, [`EscalarError::DuplicateThreadCount`] when
    /// the thread count is already present.
    pub fn push(&mut self, sample: ExecutionSample) -> Result<()> {
        if sample.threads == 0 {
            return Err(EscalarError::InvalidSample {
                threads: sample.threads,
                seconds: sample.seconds,
                reason: "thread count must be at least 1".to_string(),
            });
        }
        if !sample.seconds.is_finite() || sample.seconds < 0.0 {
            return Err(EscalarError::InvalidSample {
                threads: sample.threads,
                seconds: sample.seconds,
                reason: "execution time must be finite and non-negative".to_string(),
            });
        }
        if self.samples.iter().any(|s| s.threads == sample.threads) {
            return Err(EscalarError::DuplicateThreadCount {
                threads: sample.threads,
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Measured time for an exact thread count.
    ///
    /// # Errors
    ///
    /// Returns [`EscalarError::MissingSample`] when no sample with that
    /// thread count exists.
    pub fn time_at(&self, threads: ThreadCount) -> Result<f64> {
        self.samples
            .iter()
            .find(|s| s.threads == threads)
            .map(|s| s.seconds)
            .ok_or(EscalarError::MissingSample { threads })
    }

    /// Largest thread count in the dataset, `None` when empty.
    #[must_use]
    pub fn max_threads(&self) -> Option<ThreadCount> {
        self.samples.iter().map(|s| s.threads).max()
    }

    /// Thread counts in canonical ascending order.
    #[must_use]
    pub fn thread_counts(&self) -> Vec<ThreadCount> {
        let mut counts: Vec<ThreadCount> = self.samples.iter().map(|s| s.threads).collect();
        counts.sort_unstable();
        counts
    }

    /// Writes the dataset as CSV: header, then one row per sample in
    /// ascending thread-count order.
    ///
    /// # Errors
    ///
    /// Returns [`EscalarError::Io`] on write failure.
    pub fn save(&self, mut sink: impl Write) -> Result<()> {
        writeln!(sink, "{DATASET_HEADER}")?;
        for sample in self.ordered_samples() {
            writeln!(sink, "{},{}", sample.threads, sample.seconds)?;
        }
        sink.flush()?;
        Ok(())
    }

    /// Rewrites the whole file at `path` with the current samples.
    ///
    /// The file is valid and parseable after every call, which is what makes
    /// per-sample flushing during a sweep crash-safe.
    ///
    /// # Errors
    ///
    /// Returns [`EscalarError::Io`] when the file cannot be created or
    /// written.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.save(&mut writer)?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(())
    }

    /// Parses a dataset from its CSV form.
    ///
    /// Row numbers in errors are 1-based physical line numbers; the header
    /// is line 1. Blank lines are tolerated. A single malformed row aborts
    /// the entire load: a partially trusted dataset is worse than none.
    ///
    /// # Errors
    ///
    /// Returns [`EscalarError::MalformedDatasetRow`] for a bad header, wrong
    /// field count, non-numeric field, zero thread count, or negative time;
    /// [`EscalarError::DuplicateThreadCount`] for a repeated thread count.
    pub fn load(source: impl BufRead) -> Result<Self> {
        let mut dataset = Self::new();
        let mut saw_header = false;

        for (index, line) in source.lines().enumerate() {
            let row = index + 1;
            let line = line?;
            let content = line.trim_end_matches(['\r', '\n']);

            if !saw_header {
                if content != DATASET_HEADER {
                    return Err(EscalarError::MalformedDatasetRow {
                        row,
                        content: content.to_string(),
                        reason: format!("expected header {DATASET_HEADER:?}"),
                    });
                }
                saw_header = true;
                continue;
            }

            if content.trim().is_empty() {
                continue;
            }

            let sample = parse_row(row, content)?;
            match dataset.push(sample) {
                Ok(()) => {}
                Err(EscalarError::DuplicateThreadCount { threads }) => {
                    return Err(EscalarError::DuplicateThreadCount { threads });
                }
                Err(EscalarError::InvalidSample { reason, .. }) => {
                    return Err(EscalarError::MalformedDatasetRow {
                        row,
                        content: content.to_string(),
                        reason,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        if !saw_header {
            return Err(EscalarError::MalformedDatasetRow {
                row: 1,
                content: String::new(),
                reason: format!("empty input, expected header {DATASET_HEADER:?}"),
            });
        }

        Ok(dataset)
    }

    /// Loads a dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`EscalarError::Io`] when the file cannot be opened, plus the
    /// parse errors of [`ScalingDataset::load`].
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::load(BufReader::new(file))
    }
}

fn parse_row(row: usize, content: &str) -> Result<ExecutionSample> {
    let malformed = |reason: String| EscalarError::MalformedDatasetRow {
        row,
        content: content.to_string(),
        reason,
    };

    let mut fields = content.split(',');
    let (Some(threads_field), Some(seconds_field), None) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed("expected exactly two fields".to_string()));
    };

    let threads: ThreadCount = threads_field
        .trim()
        .parse()
        .map_err(|_| malformed(format!("non-numeric thread count {threads_field:?}")))?;
    let seconds: f64 = seconds_field
        .trim()
        .parse()
        .map_err(|_| malformed(format!("non-numeric time {seconds_field:?}")))?;

    Ok(ExecutionSample { threads, seconds })
}

/// File-name convention for a sweep's output, keyed by workload size so
/// multiple sweeps can coexist: `varthreads_<workload>_cells.csv`.
#[must_use]
pub fn dataset_filename(workload_size: u64) -> String {
    format!("varthreads_{workload_size}_cells.csv")
}
