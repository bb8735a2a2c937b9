// ABOUTME: Output formatting helpers for aquametric-cli
// ABOUTME: Prints session reports, batch failures, energy profiles and per-axis statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use std::path::Path;

use aquametric::batch::FileFailure;
use aquametric::report::SessionReport;
use aquametric_analysis::classifier::EnergyProfile;
use aquametric_core::models::Vec3;

/// Display a session report with the file it came from
pub fn display_report(source: &Path, report: &SessionReport) {
    println!("{}", "=".repeat(60));
    println!("{}", source.display());
    println!("{}", "=".repeat(60));
    print!("{}", report.summary_text());
    println!();
}

/// Display files a batch could not analyze
pub fn display_batch_failures(failures: &[FileFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("{} recording(s) failed:", failures.len());
    for failure in failures {
        eprintln!("  {}: {}", failure.path.display(), failure.error);
    }
}

/// Display per-axis energies of a lap
pub fn display_energy_profile(profile: &EnergyProfile) {
    println!("Energy (mean absolute deviation, m/s^2):");
    println!("  X: {:>8.3}   mean {:>8.3}", profile.energy_x, profile.mean_x);
    println!("  Y: {:>8.3}   mean {:>8.3}", profile.energy_y, profile.mean_y);
    println!("  Z: {:>8.3}   mean {:>8.3}", profile.energy_z, profile.mean_z);
    println!("  Total: {:.3}, dominant axis {}", profile.total_energy, profile.dominant_axis);
}

/// Mean and standard deviation per axis
pub struct AxisStats {
    mean: [f64; 3],
    std: [f64; 3],
}

impl AxisStats {
    /// Population statistics of a 3-axis series
    pub fn from_samples(samples: &[Vec3]) -> Self {
        if samples.is_empty() {
            return Self {
                mean: [0.0; 3],
                std: [0.0; 3],
            };
        }
        let n = samples.len() as f64;
        let mean = [0, 1, 2].map(|axis| samples.iter().map(|s| s[axis]).sum::<f64>() / n);
        let std = [0, 1, 2].map(|axis| {
            let variance = samples
                .iter()
                .map(|s| (s[axis] - mean[axis]).powi(2))
                .sum::<f64>()
                / n;
            variance.sqrt()
        });
        Self { mean, std }
    }
}

/// Display raw and filtered statistics side by side
pub fn display_axis_stats(raw: &AxisStats, filtered: &AxisStats) {
    println!("Axis      raw mean   raw std   filt mean  filt std");
    for (axis, name) in ["X", "Y", "Z"].iter().enumerate() {
        println!(
            "{name:<4} {:>10.3} {:>9.3} {:>11.3} {:>9.3}",
            raw.mean[axis], raw.std[axis], filtered.mean[axis], filtered.std[axis]
        );
    }
}
