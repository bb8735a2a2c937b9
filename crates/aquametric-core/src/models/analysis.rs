// ABOUTME: Session analysis result aggregating detected laps with the filtered motion channels
// ABOUTME: Totals, averages and the stroke breakdown are derived from the lap list on read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lap::SwimLap;
use super::sensor::Vec3;
use super::stroke::StrokeType;

/// Lap counts per stroke style, in the order styles were first encountered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeBreakdown {
    entries: Vec<(StrokeType, usize)>,
}

impl StrokeBreakdown {
    /// Count laps per style
    #[must_use]
    pub fn from_laps(laps: &[SwimLap]) -> Self {
        let mut entries: Vec<(StrokeType, usize)> = Vec::new();
        for lap in laps {
            match entries.iter_mut().find(|(stroke, _)| *stroke == lap.stroke_type) {
                Some((_, count)) => *count += 1,
                None => entries.push((lap.stroke_type, 1)),
            }
        }
        Self { entries }
    }

    /// Laps swum in the given style
    #[must_use]
    pub fn count(&self, stroke: StrokeType) -> usize {
        self.entries
            .iter()
            .find(|(s, _)| *s == stroke)
            .map_or(0, |(_, count)| *count)
    }

    /// Style with the most laps; ties go to the style seen first
    #[must_use]
    pub fn primary(&self) -> Option<StrokeType> {
        let mut best: Option<(StrokeType, usize)> = None;
        for &(stroke, count) in &self.entries {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((stroke, count));
            }
        }
        best.map(|(stroke, _)| stroke)
    }

    /// `(style, laps)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (StrokeType, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Whether no laps were counted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Complete analysis result for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    session_id: Uuid,
    processed_at: DateTime<Utc>,
    pool_length_m: u32,
    laps: Vec<SwimLap>,
    filtered_accel: Vec<Vec3>,
    filtered_gyro: Vec<Vec3>,
}

impl AnalysisResult {
    /// Assemble a result; laps must already be ordered by `lap_number`
    #[must_use]
    pub fn new(
        session_id: Uuid,
        processed_at: DateTime<Utc>,
        pool_length_m: u32,
        laps: Vec<SwimLap>,
        filtered_accel: Vec<Vec3>,
        filtered_gyro: Vec<Vec3>,
    ) -> Self {
        Self {
            session_id,
            processed_at,
            pool_length_m,
            laps,
            filtered_accel,
            filtered_gyro,
        }
    }

    /// Session the result belongs to
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// When the analysis ran
    #[must_use]
    pub const fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    /// Pool length in meters
    #[must_use]
    pub const fn pool_length_m(&self) -> u32 {
        self.pool_length_m
    }

    /// Detected laps in ascending lap number
    #[must_use]
    pub fn laps(&self) -> &[SwimLap] {
        &self.laps
    }

    /// Low-pass filtered accelerometer channel the laps were detected in
    #[must_use]
    pub fn filtered_accel(&self) -> &[Vec3] {
        &self.filtered_accel
    }

    /// Low-pass filtered gyroscope channel
    #[must_use]
    pub fn filtered_gyro(&self) -> &[Vec3] {
        &self.filtered_gyro
    }

    /// Number of laps
    #[must_use]
    pub fn total_laps(&self) -> usize {
        self.laps.len()
    }

    /// Sum of per-lap distances
    #[must_use]
    pub fn total_distance_m(&self) -> u32 {
        self.laps.iter().map(SwimLap::distance_m).sum()
    }

    /// Sum of per-lap durations
    #[must_use]
    pub fn total_duration_sec(&self) -> f64 {
        self.laps.iter().map(|lap| lap.duration_sec).sum()
    }

    /// Mean SWOLF over all laps, 0 without laps
    #[must_use]
    pub fn avg_swolf(&self) -> f64 {
        if self.laps.is_empty() {
            return 0.0;
        }
        let total: f64 = self.laps.iter().map(|lap| f64::from(lap.swolf())).sum();
        total / self.laps.len() as f64
    }

    /// Mean pace per 100 m over all laps, 0 without laps
    #[must_use]
    pub fn avg_pace_per_100m(&self) -> f64 {
        if self.laps.is_empty() {
            return 0.0;
        }
        let total: f64 = self.laps.iter().map(SwimLap::pace_per_100m).sum();
        total / self.laps.len() as f64
    }

    /// Lap counts per style
    #[must_use]
    pub fn stroke_breakdown(&self) -> StrokeBreakdown {
        StrokeBreakdown::from_laps(&self.laps)
    }

    /// Most common style, `Unknown` when there are no laps
    #[must_use]
    pub fn primary_stroke(&self) -> StrokeType {
        self.stroke_breakdown()
            .primary()
            .unwrap_or(StrokeType::Unknown)
    }
}
