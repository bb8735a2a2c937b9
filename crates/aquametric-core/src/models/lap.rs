// ABOUTME: Single swimming lap with its sample range, stroke style and stroke count
// ABOUTME: SWOLF and pace are derived on read from duration, stroke count and pool length
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use serde::{Deserialize, Serialize};

use super::stroke::StrokeType;

/// Single swimming lap with detected metrics
///
/// `start_idx..end_idx` is a half-open range into the filtered series the lap was
/// detected in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwimLap {
    /// 1-based position of the lap within its session
    pub lap_number: u32,
    /// First sample of the lap
    pub start_idx: usize,
    /// One past the last sample of the lap
    pub end_idx: usize,
    /// Classified stroke style
    pub stroke_type: StrokeType,
    /// Estimated stroke repetitions
    pub stroke_count: u32,
    /// `(end_idx - start_idx) / sampling_rate`
    pub duration_sec: f64,
    /// Pool length in meters
    pub pool_length_m: u32,
}

impl SwimLap {
    /// Number of samples covered by the lap
    #[must_use]
    pub const fn sample_count(&self) -> usize {
        self.end_idx.saturating_sub(self.start_idx)
    }

    /// SWOLF efficiency score: rounded seconds plus strokes (lower is better)
    #[must_use]
    pub fn swolf(&self) -> u32 {
        self.duration_sec.round().max(0.0) as u32 + self.stroke_count
    }

    /// Distance covered, one pool length
    #[must_use]
    pub const fn distance_m(&self) -> u32 {
        self.pool_length_m
    }

    /// Pace in seconds per 100 m
    #[must_use]
    pub fn pace_per_100m(&self) -> f64 {
        if self.pool_length_m == 0 {
            return 0.0;
        }
        self.duration_sec / f64::from(self.pool_length_m) * 100.0
    }

    /// Lap start relative to the beginning of the recording, in seconds
    #[must_use]
    pub fn start_time_sec(&self, sampling_rate_hz: f64) -> f64 {
        self.start_idx as f64 / sampling_rate_hz
    }

    /// Lap end relative to the beginning of the recording, in seconds
    #[must_use]
    pub fn end_time_sec(&self, sampling_rate_hz: f64) -> f64 {
        self.end_idx as f64 / sampling_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(duration_sec: f64, stroke_count: u32) -> SwimLap {
        SwimLap {
            lap_number: 1,
            start_idx: 0,
            end_idx: (duration_sec * 30.0) as usize,
            stroke_type: StrokeType::Freestyle,
            stroke_count,
            duration_sec,
            pool_length_m: 25,
        }
    }

    #[test]
    fn test_swolf_and_pace() {
        let lap = lap(20.0, 18);
        assert_eq!(lap.swolf(), 38);
        assert!((lap.pace_per_100m() - 80.0).abs() < 1e-9);
        assert_eq!(lap.distance_m(), 25);
    }

    #[test]
    fn test_swolf_rounds_duration() {
        assert_eq!(lap(19.6, 10).swolf(), 30);
        assert_eq!(lap(19.4, 10).swolf(), 29);
    }

    #[test]
    fn test_times_from_indices() {
        let lap = SwimLap {
            start_idx: 90,
            end_idx: 540,
            ..lap(15.0, 12)
        };
        assert!((lap.start_time_sec(30.0) - 3.0).abs() < 1e-9);
        assert!((lap.end_time_sec(30.0) - 18.0).abs() < 1e-9);
        assert_eq!(lap.sample_count(), 450);
    }
}
