// ABOUTME: Batch analysis of CSV recordings, one file or a whole directory at a time
// ABOUTME: Directory runs fan out across rayon workers and collect per-file failures without aborting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use aquametric_analysis::config::AlgorithmConfig;
use aquametric_analysis::pipeline::AnalysisPipeline;
use aquametric_core::models::AnalysisResult;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::errors::{AppError, AppResult};
use crate::ingest::SensorTable;
use crate::logging::AppLogger;

/// Successful analysis of one recording
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    /// Source file
    pub path: PathBuf,
    /// Samples read from the file
    pub samples: usize,
    /// Pipeline output
    pub result: AnalysisResult,
}

/// A recording that could not be analyzed
#[derive(Debug)]
pub struct FileFailure {
    /// Source file
    pub path: PathBuf,
    /// Why it failed
    pub error: AppError,
}

/// Outcome of a directory run, both lists in file-name order
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Recordings analyzed successfully
    pub analyses: Vec<FileAnalysis>,
    /// Recordings that failed
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    /// Number of files attempted
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.analyses.len() + self.failures.len()
    }

    /// Whether every attempted file succeeded
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the production pipeline over CSV recordings
#[derive(Debug)]
pub struct BatchAnalyzer {
    config: AlgorithmConfig,
    pipeline: AnalysisPipeline,
}

impl Default for BatchAnalyzer {
    fn default() -> Self {
        Self::new(AlgorithmConfig::default())
    }
}

impl BatchAnalyzer {
    /// Build an analyzer for the given configuration
    #[must_use]
    pub fn new(config: AlgorithmConfig) -> Self {
        let pipeline = AnalysisPipeline::from_config(&config);
        Self { config, pipeline }
    }

    /// Configuration the analyzer was built with
    #[must_use]
    pub const fn config(&self) -> &AlgorithmConfig {
        &self.config
    }

    /// The underlying pipeline
    #[must_use]
    pub const fn pipeline(&self) -> &AnalysisPipeline {
        &self.pipeline
    }

    /// Sampling rate assumed for every recording
    #[must_use]
    pub const fn sampling_rate_hz(&self) -> f64 {
        self.config.sampling.frequency_hz
    }

    /// Analyze a single CSV recording
    ///
    /// # Errors
    ///
    /// Returns ingestion errors (missing file or columns, malformed rows),
    /// recording validation errors, an out-of-range pool length, and any
    /// pipeline error.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn analyze_csv_file(&self, path: &Path, pool_length_m: u32) -> AppResult<FileAnalysis> {
        let started = Instant::now();
        let table = SensorTable::from_path(path, self.sampling_rate_hz())?;
        let samples = table.len();
        let session = table.into_session(pool_length_m)?;
        let result = self.pipeline.analyze(&session)?;

        AppLogger::log_analysis(
            path,
            result.total_laps(),
            result.total_duration_sec(),
            started.elapsed(),
        );
        Ok(FileAnalysis {
            path: path.to_path_buf(),
            samples,
            result,
        })
    }

    /// Analyze every `*.csv` file directly inside a directory
    ///
    /// Files are processed in parallel. A file that fails is logged and
    /// reported in [`BatchOutcome::failures`]; the rest of the batch still runs.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the directory does not exist and
    /// `StorageError` if it cannot be listed.
    pub fn analyze_directory(&self, directory: &Path, pool_length_m: u32) -> AppResult<BatchOutcome> {
        let started = Instant::now();
        let files = csv_files(directory)?;
        debug!(directory = %directory.display(), files = files.len(), "starting batch");

        let results: Vec<(PathBuf, AppResult<FileAnalysis>)> = files
            .into_par_iter()
            .map(|path| {
                let result = self.analyze_csv_file(&path, pool_length_m);
                (path, result)
            })
            .collect();

        let mut outcome = BatchOutcome::default();
        for (path, result) in results {
            match result {
                Ok(analysis) => outcome.analyses.push(analysis),
                Err(error) => {
                    AppLogger::log_analysis_failure(&path, &error);
                    outcome.failures.push(FileFailure { path, error });
                }
            }
        }

        AppLogger::log_batch_summary(
            directory,
            outcome.analyses.len(),
            outcome.failures.len(),
            started.elapsed(),
        );
        Ok(outcome)
    }
}

/// `*.csv` files directly inside `directory`, sorted by path
fn csv_files(directory: &Path) -> AppResult<Vec<PathBuf>> {
    let entries = fs::read_dir(directory).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::not_found(format!("directory {}", directory.display())),
        _ => AppError::storage(format!("cannot list {}", directory.display())).with_source(e),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| {
                AppError::storage(format!("cannot list {}", directory.display())).with_source(e)
            })?
            .path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
