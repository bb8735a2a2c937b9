// ABOUTME: Shared test utilities and synthetic recording generators for integration tests
// ABOUTME: Provides quiet logging setup, swim/rest signal builders and CSV fixture writers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `aquametric`

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use aquametric::Vec3;

static INIT_LOGGER: Once = Once::new();

/// Sampling rate used by every synthetic recording
pub const RATE_HZ: f64 = 30.0;

/// Nanoseconds between samples at [`RATE_HZ`]
pub const SAMPLE_PERIOD_NS: i64 = 33_333_333;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// One stretch of a synthetic recording
#[derive(Debug, Clone, Copy)]
pub enum Phase {
    /// Wrist still, gravity on Z
    Rest(f64),
    /// Wrist still, face-down
    Float(f64),
    /// 1 Hz vertical undulation of 15 m/s² around gravity
    Swim(f64),
    /// 1 Hz lateral roll of the given amplitude, face-down
    Roll(f64, f64),
}

impl Phase {
    const fn seconds(self) -> f64 {
        match self {
            Self::Rest(seconds)
            | Self::Float(seconds)
            | Self::Swim(seconds)
            | Self::Roll(seconds, _) => seconds,
        }
    }

    fn sample(self, t: f64) -> Vec3 {
        match self {
            Self::Rest(_) => [0.0, 0.0, 9.8],
            Self::Float(_) => [0.0, 0.0, -9.8],
            Self::Swim(_) => [0.0, 0.0, 15.0f64.mul_add((2.0 * PI * t).sin(), 9.8)],
            Self::Roll(_, amplitude) => [0.0, amplitude * (2.0 * PI * t).sin(), -9.8],
        }
    }
}

/// Accelerometer samples for a sequence of phases at [`RATE_HZ`]
pub fn accel_for(phases: &[Phase]) -> Vec<Vec3> {
    let mut accel = Vec::new();
    for &phase in phases {
        let n = (phase.seconds() * RATE_HZ).round() as usize;
        accel.extend((0..n).map(|i| phase.sample(i as f64 / RATE_HZ)));
    }
    accel
}

/// Timestamps, accelerometer and zero gyroscope for a sequence of phases
pub fn session_arrays(phases: &[Phase]) -> (Vec<i64>, Vec<Vec3>, Vec<Vec3>) {
    let accel = accel_for(phases);
    let n = accel.len();
    let timestamps = (0..n as i64).map(|i| i * SAMPLE_PERIOD_NS).collect();
    (timestamps, accel, vec![[0.0; 3]; n])
}

/// Rest, lap, rest, lap, rest: 45 seconds holding two 15-second laps
pub fn two_lap_phases() -> Vec<Phase> {
    vec![
        Phase::Rest(5.0),
        Phase::Swim(15.0),
        Phase::Rest(5.0),
        Phase::Swim(15.0),
        Phase::Rest(5.0),
    ]
}

/// Render a recording in the CSV layout the ingester expects
pub fn csv_text(timestamps: Option<&[i64]>, accel: &[Vec3], gyro: &[Vec3]) -> String {
    let mut text = String::new();
    if timestamps.is_some() {
        text.push_str("timestamp,");
    }
    text.push_str("ACC_0,ACC_1,ACC_2,GYRO_0,GYRO_1,GYRO_2\n");
    for (i, (a, g)) in accel.iter().zip(gyro).enumerate() {
        if let Some(ts) = timestamps {
            write!(text, "{},", ts[i]).unwrap();
        }
        writeln!(text, "{},{},{},{},{},{}", a[0], a[1], a[2], g[0], g[1], g[2]).unwrap();
    }
    text
}

/// Write a synthetic recording to `dir/name`
pub fn write_recording(dir: &Path, name: &str, phases: &[Phase]) -> PathBuf {
    let (timestamps, accel, gyro) = session_arrays(phases);
    let path = dir.join(name);
    fs::write(&path, csv_text(Some(&timestamps), &accel, &gyro)).unwrap();
    path
}
