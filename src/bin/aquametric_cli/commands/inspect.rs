// ABOUTME: Inspection commands for aquametric-cli
// ABOUTME: Classifies a sample range, compares raw and filtered statistics, and lists stroke styles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use std::path::Path;

use aquametric::config::{AlgorithmConfig, FilterConfig};
use aquametric::errors::{AppError, AppResult};
use aquametric::ingest::SensorTable;
use aquametric_analysis::classifier::{EnergyClassifier, StrokeClassifier};
use aquametric_analysis::preprocessor::{SignalConditioner, SignalPreprocessor};
use aquametric_core::models::{StrokeType, Vec3};
use serde_json::json;

use crate::helpers::display::{display_axis_stats, display_energy_profile, AxisStats};

fn load_accel(file: &Path, sampling_rate_hz: f64) -> AppResult<Vec<Vec3>> {
    let data = SensorTable::from_path(file, sampling_rate_hz)?.into_sensor_data()?;
    Ok(data.accel().to_vec())
}

/// Classify the stroke style of `start..end` in the filtered recording
pub fn classify(
    config: &AlgorithmConfig,
    file: &Path,
    start: Option<usize>,
    end: Option<usize>,
    json: bool,
) -> AppResult<()> {
    let rate = config.sampling.frequency_hz;
    let raw = load_accel(file, rate)?;
    let filtered = SignalConditioner::from_config(&config.filter).process(&raw, rate)?;

    let start = start.unwrap_or(0);
    let end = end.unwrap_or(filtered.len());
    let lap = filtered.get(start..end).ok_or_else(|| {
        AppError::value_out_of_range(format!(
            "sample range {start}..{end} is outside the recording of {} samples",
            filtered.len()
        ))
    })?;

    let classifier = EnergyClassifier::from_config(&config.classifier);
    let stroke = classifier.classify(lap);
    let profile = classifier.energy_profile(lap);

    if json {
        let rendered = serde_json::to_string_pretty(&json!({
            "file": file.display().to_string(),
            "start_idx": start,
            "end_idx": end,
            "stroke_type": stroke,
            "energy_profile": profile,
        }))?;
        println!("{rendered}");
    } else {
        println!(
            "{}: samples {start}..{end} ({:.1} s)",
            file.display(),
            lap.len() as f64 / rate
        );
        println!("Stroke: {}", stroke.display_name());
        display_energy_profile(&profile);
    }
    Ok(())
}

/// Print per-axis accelerometer statistics before and after filtering
pub fn filter(
    config: &AlgorithmConfig,
    file: &Path,
    cutoff_hz: Option<f64>,
    order: Option<usize>,
) -> AppResult<()> {
    let filter_config = FilterConfig {
        order: order.unwrap_or(config.filter.order),
        cutoff_hz: cutoff_hz.unwrap_or(config.filter.cutoff_hz),
    };
    let mut checked = config.clone();
    checked.filter = filter_config.clone();
    checked.validate()?;

    let rate = config.sampling.frequency_hz;
    let raw = load_accel(file, rate)?;
    let filtered = SignalConditioner::from_config(&filter_config).process(&raw, rate)?;

    println!(
        "{}: {} samples at {rate} Hz, order {} low-pass at {} Hz",
        file.display(),
        raw.len(),
        filter_config.order,
        filter_config.cutoff_hz
    );
    display_axis_stats(&AxisStats::from_samples(&raw), &AxisStats::from_samples(&filtered));
    Ok(())
}

/// List every stroke style with its wire name and expected cycle rate band
pub fn stroke_types() {
    println!("NAME           DISPLAY           BAND (Hz)");
    for stroke in StrokeType::ALL {
        let (low, high) = stroke.frequency_band();
        let band = format!("{low:.1}-{high:.1}");
        println!("{:<14} {:<14} {band:>12}", stroke.as_str(), stroke.display_name());
    }
}
