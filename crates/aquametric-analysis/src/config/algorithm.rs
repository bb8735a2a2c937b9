// ABOUTME: Tunable parameters for every analysis stage with documented defaults
// ABOUTME: Mirrors the algorithm YAML layout so files deserialize directly into these types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Algorithm Configuration
//!
//! Every threshold used by the pipeline lives here so classification and
//! segmentation can be retuned without code changes. All fields carry serde
//! defaults, which means a partial YAML document (or none at all) is valid.
//!
//! # Example
//!
//! ```rust
//! use aquametric_analysis::config::AlgorithmConfig;
//!
//! let config = AlgorithmConfig::default();
//! assert_eq!(config.filter.order, 48);
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use aquametric_core::constants::physics::GRAVITY_MS2;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Complete algorithm configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    /// Sampling settings
    pub sampling: SamplingConfig,
    /// Low-pass filter design
    pub filter: FilterConfig,
    /// Stroke classifier settings
    pub classifier: ClassifierConfig,
    /// Lap segmentation settings
    pub segmentation: SegmentationConfig,
    /// Stroke counter settings
    pub stroke_counter: StrokeCounterConfig,
}

/// Sensor sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sampling frequency of the recordings (Hz)
    pub frequency_hz: f64,
}

/// FIR low-pass filter design parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter order; the design has `order + 1` coefficients
    pub order: usize,
    /// Cutoff frequency (Hz). Stroke cycles sit in 0.5–1.5 Hz, anything above 3 Hz is noise
    pub cutoff_hz: f64,
}

/// Stroke classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Decision thresholds
    pub thresholds: ClassifierThresholds,
    /// Laps with fewer samples are classified as unknown
    pub min_samples: usize,
}

/// Thresholds of the energy decision procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Mean Z acceleration above which the swimmer is face-up (m/s²)
    pub backstroke_gravity_z: f64,
    /// Factor by which Y energy must exceed X and Z energy for freestyle
    pub freestyle_y_energy_ratio: f64,
    /// X energy above which a symmetric stroke is butterfly
    pub butterfly_x_energy: f64,
    /// X energy below which a symmetric stroke is breaststroke
    pub breaststroke_energy_max: f64,
    /// Total energy separating butterfly from breaststroke in the borderline band
    pub borderline_total_energy: f64,
}

/// Lap segmentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Acceleration magnitude expected when not swimming (m/s²)
    pub gravity: f64,
    /// Samples with null probability below this are swimming
    pub null_probability_threshold: f64,
    /// Closing structuring element length (seconds), fills gaps up to this long
    pub close_window_sec: f64,
    /// Opening structuring element length (seconds), removes blips shorter than this
    pub open_window_sec: f64,
    /// Runs shorter than this are not laps (seconds)
    pub min_lap_duration_sec: f64,
    /// Snap lap boundaries to the sharpest nearby acceleration change
    pub refine_boundaries: bool,
    /// Half-width of the boundary refinement search (seconds)
    pub refine_window_sec: f64,
}

/// Stroke counting strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMethod {
    /// Time-domain peak detection
    Peaks,
    /// Dominant frequency in the style's band times lap duration
    Spectral,
    /// Duration-weighted blend of peaks and spectral estimates
    #[default]
    Hybrid,
}

impl CountingMethod {
    /// Configuration name of the method
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Peaks => "peaks",
            Self::Spectral => "spectral",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for CountingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CountingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "peaks" | "peak" => Ok(Self::Peaks),
            "spectral" | "fft" => Ok(Self::Spectral),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ConfigError::Parse(format!(
                "unknown stroke counting method '{other}' (expected peaks, spectral or hybrid)"
            ))),
        }
    }
}

/// Stroke counter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeCounterConfig {
    /// Counting strategy
    pub method: CountingMethod,
    /// Laps with fewer samples count zero strokes
    pub min_samples: usize,
    /// Laps with fewer samples fall back from spectral to peak counting
    pub spectral_min_samples: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { frequency_hz: 30.0 }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order: 48,
            cutoff_hz: 3.0,
        }
    }
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            backstroke_gravity_z: 5.0,
            freestyle_y_energy_ratio: 1.2,
            butterfly_x_energy: 15.0,
            breaststroke_energy_max: 12.0,
            borderline_total_energy: 35.0,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY_MS2,
            null_probability_threshold: 0.5,
            close_window_sec: 3.0,
            open_window_sec: 2.0,
            min_lap_duration_sec: 10.0,
            refine_boundaries: false,
            refine_window_sec: 2.0,
        }
    }
}

impl Default for StrokeCounterConfig {
    fn default() -> Self {
        Self {
            method: CountingMethod::Hybrid,
            min_samples: 10,
            spectral_min_samples: 30,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            thresholds: ClassifierThresholds::default(),
            min_samples: 30,
        }
    }
}

impl AlgorithmConfig {
    /// Check every parameter for physical plausibility
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive(self.sampling.frequency_hz, "sampling.frequency_hz must be > 0")?;

        if self.filter.order == 0 {
            return Err(ConfigError::ValueOutOfRange("filter.order must be > 0"));
        }
        positive(self.filter.cutoff_hz, "filter.cutoff_hz must be > 0")?;

        let t = &self.classifier.thresholds;
        positive(
            t.freestyle_y_energy_ratio,
            "classifier.thresholds.freestyle_y_energy_ratio must be > 0",
        )?;
        positive(t.butterfly_x_energy, "classifier.thresholds.butterfly_x_energy must be > 0")?;
        positive(
            t.breaststroke_energy_max,
            "classifier.thresholds.breaststroke_energy_max must be > 0",
        )?;
        positive(
            t.borderline_total_energy,
            "classifier.thresholds.borderline_total_energy must be > 0",
        )?;
        if !t.backstroke_gravity_z.is_finite() {
            return Err(ConfigError::ValueOutOfRange(
                "classifier.thresholds.backstroke_gravity_z must be finite",
            ));
        }

        let s = &self.segmentation;
        positive(s.gravity, "segmentation.gravity must be > 0")?;
        if !(s.null_probability_threshold > 0.0 && s.null_probability_threshold < 1.0) {
            return Err(ConfigError::InvalidRange(
                "segmentation.null_probability_threshold must be within (0, 1)",
            ));
        }
        positive(s.close_window_sec, "segmentation.close_window_sec must be > 0")?;
        positive(s.open_window_sec, "segmentation.open_window_sec must be > 0")?;
        positive(s.refine_window_sec, "segmentation.refine_window_sec must be > 0")?;
        if !(s.min_lap_duration_sec.is_finite() && s.min_lap_duration_sec >= 0.0) {
            return Err(ConfigError::ValueOutOfRange(
                "segmentation.min_lap_duration_sec must be >= 0",
            ));
        }

        if self.stroke_counter.spectral_min_samples < 2 {
            return Err(ConfigError::ValueOutOfRange(
                "stroke_counter.spectral_min_samples must be >= 2",
            ));
        }

        Ok(())
    }
}

fn positive(value: f64, message: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValueOutOfRange(message))
    }
}
