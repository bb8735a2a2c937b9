// ABOUTME: Serializable session reports built from analysis results
// ABOUTME: Per-lap details, session summary and a plain-text rendering for terminals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Session reports
//!
//! An [`AnalysisResult`] carries the filtered signals, which are large and
//! rarely wanted downstream. A [`SessionReport`] keeps only the lap metrics
//! and the session summary.

use std::fmt::Write;

use aquametric_core::models::{AnalysisResult, StrokeType, SwimLap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Metrics of one lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapDetail {
    /// 1-based lap number
    pub lap_number: u32,
    /// Classified style
    pub stroke_type: StrokeType,
    /// Lap duration in seconds
    pub duration_sec: f64,
    /// Estimated strokes
    pub stroke_count: u32,
    /// Rounded seconds plus strokes
    pub swolf: u32,
    /// Seconds per 100 m
    pub pace_per_100m: f64,
    /// Meters covered
    pub distance_m: u32,
    /// Lap start from the beginning of the recording (s)
    pub start_time_sec: f64,
    /// Lap end from the beginning of the recording (s)
    pub end_time_sec: f64,
}

impl LapDetail {
    /// Extract the reported metrics of a lap
    #[must_use]
    pub fn from_lap(lap: &SwimLap, sampling_rate_hz: f64) -> Self {
        Self {
            lap_number: lap.lap_number,
            stroke_type: lap.stroke_type,
            duration_sec: lap.duration_sec,
            stroke_count: lap.stroke_count,
            swolf: lap.swolf(),
            pace_per_100m: lap.pace_per_100m(),
            distance_m: lap.distance_m(),
            start_time_sec: lap.start_time_sec(sampling_rate_hz),
            end_time_sec: lap.end_time_sec(sampling_rate_hz),
        }
    }
}

/// Laps swum in one style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeShare {
    /// Style
    pub stroke_type: StrokeType,
    /// Number of laps
    pub laps: usize,
}

/// Session-level aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Number of detected laps
    pub total_laps: usize,
    /// Laps times pool length
    pub total_distance_m: u32,
    /// Sum of lap durations (s)
    pub total_duration_sec: f64,
    /// Mean SWOLF, 0 without laps
    pub avg_swolf: f64,
    /// Mean pace in seconds per 100 m, 0 without laps
    pub avg_pace_per_100m: f64,
    /// Most frequent style, `unknown` without laps
    pub primary_stroke: StrokeType,
    /// Laps per style in first-seen order
    pub stroke_breakdown: Vec<StrokeShare>,
}

impl SessionSummary {
    /// Aggregate an analysis result
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            total_laps: result.total_laps(),
            total_distance_m: result.total_distance_m(),
            total_duration_sec: result.total_duration_sec(),
            avg_swolf: result.avg_swolf(),
            avg_pace_per_100m: result.avg_pace_per_100m(),
            primary_stroke: result.primary_stroke(),
            stroke_breakdown: result
                .stroke_breakdown()
                .iter()
                .map(|(stroke_type, laps)| StrokeShare { stroke_type, laps })
                .collect(),
        }
    }
}

/// Complete report for one analyzed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Session identifier
    pub session_id: Uuid,
    /// When the analysis ran
    pub processed_at: DateTime<Utc>,
    /// Pool length in meters
    pub pool_length_m: u32,
    /// Sampling rate the analysis assumed
    pub sampling_rate_hz: f64,
    /// Aggregates
    pub summary: SessionSummary,
    /// Per-lap metrics in lap order
    pub laps: Vec<LapDetail>,
}

impl SessionReport {
    /// Build a report from an analysis result
    #[must_use]
    pub fn from_result(result: &AnalysisResult, sampling_rate_hz: f64) -> Self {
        Self {
            session_id: result.session_id(),
            processed_at: result.processed_at(),
            pool_length_m: result.pool_length_m(),
            sampling_rate_hz,
            summary: SessionSummary::from_result(result),
            laps: result
                .laps()
                .iter()
                .map(|lap| LapDetail::from_lap(lap, sampling_rate_hz))
                .collect(),
        }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if serialization fails
    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::serialization(format!("cannot serialize report: {e}")))
    }

    /// Human-readable multi-line summary
    #[must_use]
    pub fn summary_text(&self) -> String {
        let summary = &self.summary;
        let mut text = String::new();

        let _ = writeln!(text, "Session {}", self.session_id);
        let _ = writeln!(
            text,
            "Pool: {} m | Laps: {} | Distance: {} m | Time: {}",
            self.pool_length_m,
            summary.total_laps,
            summary.total_distance_m,
            format_clock(summary.total_duration_sec)
        );

        if summary.total_laps == 0 {
            let _ = writeln!(text, "No laps detected");
            return text;
        }

        let _ = writeln!(
            text,
            "Primary stroke: {} | Avg SWOLF: {:.1} | Avg pace: {} /100m",
            summary.primary_stroke.display_name(),
            summary.avg_swolf,
            format_clock(summary.avg_pace_per_100m)
        );

        let breakdown: Vec<String> = summary
            .stroke_breakdown
            .iter()
            .map(|share| format!("{} x{}", share.stroke_type.display_name(), share.laps))
            .collect();
        let _ = writeln!(text, "Strokes: {}", breakdown.join(", "));

        let _ = writeln!(text);
        let _ = writeln!(text, "Lap  Stroke           Time Strokes  SWOLF      Pace");
        for lap in &self.laps {
            let duration = format!("{:.1}s", lap.duration_sec);
            let _ = writeln!(
                text,
                "{:>3}  {:<12} {duration:>8} {:>7} {:>6} {:>9}",
                lap.lap_number,
                lap.stroke_type.display_name(),
                lap.stroke_count,
                lap.swolf,
                format_clock(lap.pace_per_100m)
            );
        }
        text
    }
}

/// Seconds as `m:ss`
fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
