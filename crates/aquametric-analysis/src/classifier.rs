// ABOUTME: Stroke style classification from per-axis acceleration energy of a single lap
// ABOUTME: Applies an ordered threshold procedure: gravity orientation, roll dominance, undulation family
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Stroke Classifier
//!
//! Axes follow a wrist-worn device: X points along the fingers (forward), Y
//! along the thumb (lateral roll), Z out of the wrist (vertical undulation).
//! Per-axis energy is the mean absolute deviation from the axis mean.
//!
//! Decision order, first match wins:
//! 1. mean Z above the gravity threshold: backstroke (face-up)
//! 2. Y energy dominates X and Z by the configured ratio: freestyle
//! 3. Z energy at least Y energy: butterfly or breaststroke from X energy,
//!    with total energy breaking ties in the borderline band
//! 4. otherwise freestyle
#![allow(clippy::cast_precision_loss)] // Safe: lap sample counts are far below 2^52

use std::fmt;

use aquametric_core::models::{StrokeType, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ClassifierConfig, ClassifierThresholds};

/// Capability: assign a stroke style to one lap of filtered acceleration
pub trait StrokeClassifier: Send + Sync {
    /// Classify a lap; too-short laps are `Unknown`
    fn classify(&self, lap_accel: &[Vec3]) -> StrokeType;
}

/// Accelerometer axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Forward, along the fingers
    X,
    /// Lateral, along the thumb
    Y,
    /// Vertical, out of the wrist
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        })
    }
}

/// Diagnostic breakdown of a lap's motion energy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyProfile {
    /// Mean absolute deviation on X
    pub energy_x: f64,
    /// Mean absolute deviation on Y
    pub energy_y: f64,
    /// Mean absolute deviation on Z
    pub energy_z: f64,
    /// Sum of the three energies
    pub total_energy: f64,
    /// Mean X acceleration
    pub mean_x: f64,
    /// Mean Y acceleration
    pub mean_y: f64,
    /// Mean Z acceleration
    pub mean_z: f64,
    /// Axis with the most energy (first wins on ties)
    pub dominant_axis: Axis,
}

/// Threshold classifier over per-axis energy
#[derive(Debug, Clone)]
pub struct EnergyClassifier {
    thresholds: ClassifierThresholds,
    min_samples: usize,
}

impl Default for EnergyClassifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

impl EnergyClassifier {
    /// Create a classifier with explicit thresholds
    #[must_use]
    pub const fn new(thresholds: ClassifierThresholds, min_samples: usize) -> Self {
        Self {
            thresholds,
            min_samples,
        }
    }

    /// Create a classifier from the classifier section of the algorithm configuration
    #[must_use]
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.thresholds.clone(), config.min_samples)
    }

    /// Active thresholds
    #[must_use]
    pub const fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Energies, means and dominant axis of a lap
    ///
    /// An empty lap yields an all-zero profile dominated by X.
    #[must_use]
    pub fn energy_profile(&self, lap_accel: &[Vec3]) -> EnergyProfile {
        let means = axis_means(lap_accel);
        let energies = axis_energies(lap_accel, &means);

        let mut dominant = 0;
        for (axis, &energy) in energies.iter().enumerate().skip(1) {
            if energy > energies[dominant] {
                dominant = axis;
            }
        }

        EnergyProfile {
            energy_x: energies[0],
            energy_y: energies[1],
            energy_z: energies[2],
            total_energy: energies.iter().sum(),
            mean_x: means[0],
            mean_y: means[1],
            mean_z: means[2],
            dominant_axis: match dominant {
                0 => Axis::X,
                1 => Axis::Y,
                _ => Axis::Z,
            },
        }
    }

    fn decide(&self, means: &[f64; 3], energies: &[f64; 3]) -> StrokeType {
        let t = &self.thresholds;
        let [e_x, e_y, e_z] = *energies;

        if means[2] > t.backstroke_gravity_z {
            return StrokeType::Backstroke;
        }

        let ratio = t.freestyle_y_energy_ratio;
        if e_y > e_x * ratio && e_y > e_z * ratio {
            return StrokeType::Freestyle;
        }

        if e_z >= e_y {
            if e_x > t.butterfly_x_energy {
                return StrokeType::Butterfly;
            }
            if e_x < t.breaststroke_energy_max {
                return StrokeType::Breaststroke;
            }
            return if e_x + e_y + e_z > t.borderline_total_energy {
                StrokeType::Butterfly
            } else {
                StrokeType::Breaststroke
            };
        }

        StrokeType::Freestyle
    }
}

impl StrokeClassifier for EnergyClassifier {
    fn classify(&self, lap_accel: &[Vec3]) -> StrokeType {
        if lap_accel.len() < self.min_samples.max(1) {
            return StrokeType::Unknown;
        }
        let means = axis_means(lap_accel);
        let energies = axis_energies(lap_accel, &means);
        let stroke = self.decide(&means, &energies);
        debug!(
            samples = lap_accel.len(),
            energy_x = energies[0],
            energy_y = energies[1],
            energy_z = energies[2],
            mean_z = means[2],
            stroke = stroke.as_str(),
            "classified lap"
        );
        stroke
    }
}

fn axis_means(samples: &[Vec3]) -> [f64; 3] {
    if samples.is_empty() {
        return [0.0; 3];
    }
    let n = samples.len() as f64;
    let mut sums = [0.0; 3];
    for sample in samples {
        for (sum, value) in sums.iter_mut().zip(sample) {
            *sum += value;
        }
    }
    sums.map(|sum| sum / n)
}

/// Mean absolute deviation per axis
fn axis_energies(samples: &[Vec3], means: &[f64; 3]) -> [f64; 3] {
    if samples.is_empty() {
        return [0.0; 3];
    }
    let n = samples.len() as f64;
    let mut sums = [0.0; 3];
    for sample in samples {
        for ((sum, value), mean) in sums.iter_mut().zip(sample).zip(means) {
            *sum += (value - mean).abs();
        }
    }
    sums.map(|sum| sum / n)
}
