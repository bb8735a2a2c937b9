// ABOUTME: Benchmark fixtures generating synthetic swim recordings
// ABOUTME: Deterministic lap/rest patterns so measurements are reproducible across runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Benchmark fixtures for synthetic swim sessions.

use std::f64::consts::PI;
use std::iter;

use aquametric::{SessionData, Vec3};
use uuid::Uuid;

/// Sampling rate of every generated recording
pub const RATE_HZ: f64 = 30.0;

/// Predefined session lengths for benchmark scenarios
#[derive(Debug, Clone, Copy)]
pub enum SessionSize {
    /// 4 laps, about 2 minutes
    Short,
    /// 20 laps, about 10 minutes
    Medium,
    /// 80 laps, about 40 minutes
    Long,
}

impl SessionSize {
    /// Number of laps in the session
    #[must_use]
    pub const fn laps(self) -> usize {
        match self {
            Self::Short => 4,
            Self::Medium => 20,
            Self::Long => 80,
        }
    }
}

/// Accelerometer samples for `laps` laps of 20 s separated by 10 s rests
///
/// Laps alternate between a roll-dominant pattern and a vertical undulation
/// so both classifier branches are exercised.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn generate_accel(laps: usize) -> Vec<Vec3> {
    let lap_samples = (20.0 * RATE_HZ) as usize;
    let rest_samples = (10.0 * RATE_HZ) as usize;
    let mut accel = Vec::with_capacity(laps * (lap_samples + rest_samples) + rest_samples);

    accel.extend(iter::repeat([0.0, 0.0, -9.8]).take(rest_samples));
    for lap in 0..laps {
        for i in 0..lap_samples {
            let phase = 2.0 * PI * i as f64 / RATE_HZ;
            // Small deterministic jitter keeps the filter from seeing a pure tone
            let jitter = 0.3 * (7.3 * phase).sin();
            let sample = if lap % 2 == 0 {
                [jitter, 12.0 * phase.sin(), -9.8 + jitter]
            } else {
                [6.0 * phase.cos(), jitter, 15.0f64.mul_add(phase.sin(), -9.8)]
            };
            accel.push(sample);
        }
        accel.extend(iter::repeat([0.0, 0.0, -9.8]).take(rest_samples));
    }
    accel
}

/// A complete session of the given size
#[allow(clippy::cast_possible_wrap)]
#[must_use]
pub fn generate_session(size: SessionSize) -> SessionData {
    let accel = generate_accel(size.laps());
    let n = accel.len();
    let timestamps = (0..n as i64).map(|i| i * 33_333_333).collect();
    SessionData::from_arrays(timestamps, accel, vec![[0.0; 3]; n], Uuid::new_v4(), 25)
        .unwrap_or_else(|e| unreachable!("synthetic session is valid: {e}"))
}
