// ABOUTME: Aligned inertial sensor recording (accelerometer, gyroscope, optional magnetometer/pressure)
// ABOUTME: Validates channel lengths and timestamp ordering once at construction, then stays immutable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use serde::{Deserialize, Serialize};

use crate::constants::time::NANOS_PER_SECOND;
use crate::errors::{AppError, AppResult};

/// One three-axis sample `[x, y, z]`
pub type Vec3 = [f64; 3];

/// Raw sensor recording with all channels aligned on the same sample index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    timestamps: Vec<i64>,
    accel: Vec<Vec3>,
    gyro: Vec<Vec3>,
    mag: Option<Vec<Vec3>>,
    pressure: Option<Vec<f64>>,
}

impl SensorData {
    /// Build a recording from timestamps (nanoseconds), accelerometer and gyroscope samples
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if channel lengths differ, timestamps decrease, or a
    /// sample is not finite.
    pub fn new(timestamps: Vec<i64>, accel: Vec<Vec3>, gyro: Vec<Vec3>) -> AppResult<Self> {
        Self::with_optional_channels(timestamps, accel, gyro, None, None)
    }

    /// Build a recording that also carries magnetometer and/or pressure channels
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any present channel has a different length than the
    /// timestamps, timestamps decrease, or a sample is not finite.
    pub fn with_optional_channels(
        timestamps: Vec<i64>,
        accel: Vec<Vec3>,
        gyro: Vec<Vec3>,
        mag: Option<Vec<Vec3>>,
        pressure: Option<Vec<f64>>,
    ) -> AppResult<Self> {
        let n = timestamps.len();
        check_length("accel", accel.len(), n)?;
        check_length("gyro", gyro.len(), n)?;
        if let Some(mag) = &mag {
            check_length("mag", mag.len(), n)?;
        }
        if let Some(pressure) = &pressure {
            check_length("pressure", pressure.len(), n)?;
        }

        if let Some(idx) = timestamps.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(AppError::invalid_input(format!(
                "timestamps must be non-decreasing, sample {} precedes sample {idx}",
                idx + 1
            )));
        }

        check_finite_vec3("accel", &accel)?;
        check_finite_vec3("gyro", &gyro)?;
        if let Some(mag) = &mag {
            check_finite_vec3("mag", mag)?;
        }
        if let Some(pressure) = &pressure {
            if let Some(idx) = pressure.iter().position(|value| !value.is_finite()) {
                return Err(AppError::invalid_input(format!(
                    "pressure contains a non-finite value at sample {idx}"
                )));
            }
        }

        Ok(Self {
            timestamps,
            accel,
            gyro,
            mag,
            pressure,
        })
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the recording holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Wall-clock span between first and last sample in seconds
    #[must_use]
    pub fn duration_sec(&self) -> f64 {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) if self.len() >= 2 => {
                (last - first) as f64 / NANOS_PER_SECOND
            }
            _ => 0.0,
        }
    }

    /// Sample timestamps in nanoseconds
    #[must_use]
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Accelerometer samples (m/s²)
    #[must_use]
    pub fn accel(&self) -> &[Vec3] {
        &self.accel
    }

    /// Gyroscope samples (rad/s)
    #[must_use]
    pub fn gyro(&self) -> &[Vec3] {
        &self.gyro
    }

    /// Magnetometer samples, if recorded
    #[must_use]
    pub fn mag(&self) -> Option<&[Vec3]> {
        self.mag.as_deref()
    }

    /// Pressure samples, if recorded
    #[must_use]
    pub fn pressure(&self) -> Option<&[f64]> {
        self.pressure.as_deref()
    }

    /// Copy of the recording with accelerometer and gyroscope replaced
    ///
    /// Used by the pipeline to hand filtered channels to the segmenter while keeping
    /// timestamps and auxiliary channels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the replacement channels do not match the recording length.
    pub fn with_motion(&self, accel: Vec<Vec3>, gyro: Vec<Vec3>) -> AppResult<Self> {
        check_length("accel", accel.len(), self.len())?;
        check_length("gyro", gyro.len(), self.len())?;
        Ok(Self {
            timestamps: self.timestamps.clone(),
            accel,
            gyro,
            mag: self.mag.clone(),
            pressure: self.pressure.clone(),
        })
    }

    /// Owned copy of samples `[start_idx, end_idx)`
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if the range is inverted or extends past the end.
    pub fn slice(&self, start_idx: usize, end_idx: usize) -> AppResult<Self> {
        if start_idx > end_idx || end_idx > self.len() {
            return Err(AppError::value_out_of_range(format!(
                "slice [{start_idx}, {end_idx}) is outside a recording of {} samples",
                self.len()
            )));
        }
        let range = start_idx..end_idx;
        Ok(Self {
            timestamps: self.timestamps[range.clone()].to_vec(),
            accel: self.accel[range.clone()].to_vec(),
            gyro: self.gyro[range.clone()].to_vec(),
            mag: self.mag.as_ref().map(|mag| mag[range.clone()].to_vec()),
            pressure: self.pressure.as_ref().map(|p| p[range].to_vec()),
        })
    }
}

fn check_length(channel: &str, actual: usize, expected: usize) -> AppResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "{channel} has {actual} samples but timestamps has {expected}"
        )))
    }
}

fn check_finite_vec3(channel: &str, samples: &[Vec3]) -> AppResult<()> {
    match samples
        .iter()
        .position(|sample| sample.iter().any(|value| !value.is_finite()))
    {
        Some(idx) => Err(AppError::invalid_input(format!(
            "{channel} contains a non-finite value at sample {idx}"
        ))),
        None => Ok(()),
    }
}
