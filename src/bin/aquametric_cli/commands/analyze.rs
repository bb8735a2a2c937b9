// ABOUTME: Session analysis commands for aquametric-cli
// ABOUTME: Runs the pipeline on one CSV file or a directory and prints text or JSON reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use std::path::Path;

use aquametric::batch::BatchAnalyzer;
use aquametric::config::AlgorithmConfig;
use aquametric::errors::{AppError, AppResult};
use aquametric::report::SessionReport;
use tracing::info;

use crate::helpers::display::{display_batch_failures, display_report};

/// Analyze a single recording
pub fn analyze_file(
    config: AlgorithmConfig,
    file: &Path,
    pool_length_m: u32,
    json: bool,
) -> AppResult<()> {
    let analyzer = BatchAnalyzer::new(config);
    let analysis = analyzer.analyze_csv_file(file, pool_length_m)?;
    info!(
        file = %file.display(),
        samples = analysis.samples,
        laps = analysis.result.total_laps(),
        "analysis finished"
    );

    let report = SessionReport::from_result(&analysis.result, analyzer.sampling_rate_hz());
    if json {
        println!("{}", report.to_json()?);
    } else {
        display_report(file, &report);
    }
    Ok(())
}

/// Analyze every recording in a directory
///
/// Fails only if the directory cannot be listed or every file failed.
pub fn analyze_directory(
    config: AlgorithmConfig,
    directory: &Path,
    pool_length_m: u32,
    json: bool,
) -> AppResult<()> {
    let analyzer = BatchAnalyzer::new(config);
    let outcome = analyzer.analyze_directory(directory, pool_length_m)?;
    let rate = analyzer.sampling_rate_hz();

    if json {
        let reports: Vec<SessionReport> = outcome
            .analyses
            .iter()
            .map(|analysis| SessionReport::from_result(&analysis.result, rate))
            .collect();
        let rendered = serde_json::to_string_pretty(&reports)
            .map_err(|e| AppError::serialization(format!("cannot serialize reports: {e}")))?;
        println!("{rendered}");
    } else {
        if outcome.attempted() == 0 {
            println!("No CSV recordings found in {}", directory.display());
        }
        for analysis in &outcome.analyses {
            display_report(
                &analysis.path,
                &SessionReport::from_result(&analysis.result, rate),
            );
        }
    }
    display_batch_failures(&outcome.failures);

    if outcome.analyses.is_empty() && !outcome.failures.is_empty() {
        return Err(AppError::invalid_input(format!(
            "none of the {} recordings in {} could be analyzed",
            outcome.failures.len(),
            directory.display()
        )));
    }
    Ok(())
}
