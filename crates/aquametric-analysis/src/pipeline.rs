// ABOUTME: Orchestrates filter, segment, classify and count into a session analysis result
// ABOUTME: Generic over the stage capabilities so alternate strategies are chosen at construction time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Analysis Pipeline
//!
//! One `analyze` call runs the stages strictly in sequence:
//! filter both motion channels, segment the filtered recording, then classify
//! and count every lap. Any stage error aborts the call; no partial result is
//! returned. The call is synchronous and deterministic, so independent
//! pipelines can run concurrently on different sessions.
#![allow(clippy::cast_precision_loss)] // Safe: sample counts are far below 2^52

use std::ops::Range;

use aquametric_core::errors::{AppError, AppResult};
use aquametric_core::models::{AnalysisResult, SessionData, SwimLap, Vec3};
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::classifier::{EnergyClassifier, StrokeClassifier};
use crate::config::AlgorithmConfig;
use crate::preprocessor::{SignalConditioner, SignalPreprocessor};
use crate::segmenter::{ActivityMaskSegmenter, LapSegmenter};
use crate::stroke_counter::{StrokeCounter, StrokeCounting};

/// Swim session analysis pipeline
///
/// The default type parameters are the production strategies. Swap any stage
/// with the `with_*` builders, for example a [`crate::segmenter::NullProbabilitySegmenter`]
/// fed by an upstream detector.
#[derive(Debug)]
pub struct AnalysisPipeline<
    P = SignalConditioner,
    S = ActivityMaskSegmenter,
    C = EnergyClassifier,
    K = StrokeCounter,
> {
    preprocessor: P,
    segmenter: S,
    classifier: C,
    stroke_counter: K,
    sampling_rate_hz: f64,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::from_config(&AlgorithmConfig::default())
    }
}

impl AnalysisPipeline {
    /// Production pipeline built from the algorithm configuration
    #[must_use]
    pub fn from_config(config: &AlgorithmConfig) -> Self {
        Self::with_components(
            SignalConditioner::from_config(&config.filter),
            ActivityMaskSegmenter::new(config.segmentation.clone()),
            EnergyClassifier::from_config(&config.classifier),
            StrokeCounter::from_config(&config.stroke_counter),
            config.sampling.frequency_hz,
        )
    }

    /// Production pipeline with default parameters at the given sampling rate
    #[must_use]
    pub fn with_sampling_rate(sampling_rate_hz: f64) -> Self {
        let mut config = AlgorithmConfig::default();
        config.sampling.frequency_hz = sampling_rate_hz;
        Self::from_config(&config)
    }
}

impl<P, S, C, K> AnalysisPipeline<P, S, C, K>
where
    P: SignalPreprocessor,
    S: LapSegmenter,
    C: StrokeClassifier,
    K: StrokeCounting,
{
    /// Assemble a pipeline from explicit stage implementations
    #[must_use]
    pub const fn with_components(
        preprocessor: P,
        segmenter: S,
        classifier: C,
        stroke_counter: K,
        sampling_rate_hz: f64,
    ) -> Self {
        Self {
            preprocessor,
            segmenter,
            classifier,
            stroke_counter,
            sampling_rate_hz,
        }
    }

    /// Replace the conditioning stage
    #[must_use]
    pub fn with_preprocessor<P2: SignalPreprocessor>(self, preprocessor: P2) -> AnalysisPipeline<P2, S, C, K> {
        AnalysisPipeline {
            preprocessor,
            segmenter: self.segmenter,
            classifier: self.classifier,
            stroke_counter: self.stroke_counter,
            sampling_rate_hz: self.sampling_rate_hz,
        }
    }

    /// Replace the segmentation stage
    #[must_use]
    pub fn with_segmenter<S2: LapSegmenter>(self, segmenter: S2) -> AnalysisPipeline<P, S2, C, K> {
        AnalysisPipeline {
            preprocessor: self.preprocessor,
            segmenter,
            classifier: self.classifier,
            stroke_counter: self.stroke_counter,
            sampling_rate_hz: self.sampling_rate_hz,
        }
    }

    /// Replace the classification stage
    #[must_use]
    pub fn with_classifier<C2: StrokeClassifier>(self, classifier: C2) -> AnalysisPipeline<P, S, C2, K> {
        AnalysisPipeline {
            preprocessor: self.preprocessor,
            segmenter: self.segmenter,
            classifier,
            stroke_counter: self.stroke_counter,
            sampling_rate_hz: self.sampling_rate_hz,
        }
    }

    /// Replace the stroke counting stage
    #[must_use]
    pub fn with_stroke_counter<K2: StrokeCounting>(self, stroke_counter: K2) -> AnalysisPipeline<P, S, C, K2> {
        AnalysisPipeline {
            preprocessor: self.preprocessor,
            segmenter: self.segmenter,
            classifier: self.classifier,
            stroke_counter,
            sampling_rate_hz: self.sampling_rate_hz,
        }
    }

    /// Sampling rate the pipeline assumes for every recording
    #[must_use]
    pub const fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    /// The conditioning stage
    pub const fn preprocessor(&self) -> &P {
        &self.preprocessor
    }

    /// The classification stage
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Run the full analysis on one session
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unusable sampling rate, propagates stage
    /// errors, and returns `InternalError` if the segmenter produces ranges
    /// that are out of bounds, empty or overlapping.
    #[instrument(
        skip(self, session),
        fields(session_id = %session.session_id(), samples = session.sensor_data().len())
    )]
    pub fn analyze(&self, session: &SessionData) -> AppResult<AnalysisResult> {
        let rate = self.sampling_rate_hz;
        let sensor_data = session.sensor_data();

        let (filtered_accel, filtered_gyro) =
            self.preprocessor
                .process_sensor_data(sensor_data.accel(), sensor_data.gyro(), rate)?;
        let filtered = sensor_data.with_motion(filtered_accel, filtered_gyro)?;

        let ranges = self.segmenter.segment(&filtered, rate)?;
        check_ranges(&ranges, filtered.len())?;

        let mut laps = Vec::with_capacity(ranges.len());
        for (lap_number, range) in (1_u32..).zip(ranges) {
            let lap = self.build_lap(
                lap_number,
                range,
                filtered.accel(),
                session.pool_length_m(),
            );
            debug!(
                lap = lap.lap_number,
                start = lap.start_idx,
                end = lap.end_idx,
                stroke = %lap.stroke_type,
                strokes = lap.stroke_count,
                duration_sec = lap.duration_sec,
                "analyzed lap"
            );
            laps.push(lap);
        }

        let result = AnalysisResult::new(
            session.session_id(),
            Utc::now(),
            session.pool_length_m(),
            laps,
            filtered.accel().to_vec(),
            filtered.gyro().to_vec(),
        );
        info!(
            laps = result.total_laps(),
            duration_sec = result.total_duration_sec(),
            primary_stroke = %result.primary_stroke(),
            "session analyzed"
        );
        Ok(result)
    }

    /// Analyze raw arrays by wrapping them in a fresh session
    ///
    /// # Errors
    ///
    /// Returns input validation errors for the arrays or pool length, then any
    /// error from [`AnalysisPipeline::analyze`].
    pub fn analyze_from_arrays(
        &self,
        timestamps: Vec<i64>,
        accel: Vec<Vec3>,
        gyro: Vec<Vec3>,
        pool_length_m: u32,
    ) -> AppResult<AnalysisResult> {
        let session =
            SessionData::from_arrays(timestamps, accel, gyro, Uuid::new_v4(), pool_length_m)?;
        self.analyze(&session)
    }

    fn build_lap(
        &self,
        lap_number: u32,
        range: Range<usize>,
        filtered_accel: &[Vec3],
        pool_length_m: u32,
    ) -> SwimLap {
        let lap_accel = &filtered_accel[range.clone()];
        let stroke_type = self.classifier.classify(lap_accel);
        let stroke_count =
            self.stroke_counter
                .count_strokes(lap_accel, stroke_type, self.sampling_rate_hz);

        SwimLap {
            lap_number,
            start_idx: range.start,
            end_idx: range.end,
            stroke_type,
            stroke_count,
            duration_sec: range.len() as f64 / self.sampling_rate_hz,
            pool_length_m,
        }
    }
}

/// Analyze raw arrays with the production pipeline at the given sampling rate
///
/// # Errors
///
/// See [`AnalysisPipeline::analyze_from_arrays`].
pub fn analyze_from_arrays(
    timestamps: Vec<i64>,
    accel: Vec<Vec3>,
    gyro: Vec<Vec3>,
    pool_length_m: u32,
    sampling_rate_hz: f64,
) -> AppResult<AnalysisResult> {
    AnalysisPipeline::with_sampling_rate(sampling_rate_hz).analyze_from_arrays(
        timestamps,
        accel,
        gyro,
        pool_length_m,
    )
}

fn check_ranges(ranges: &[Range<usize>], len: usize) -> AppResult<()> {
    let mut previous_end = 0;
    for range in ranges {
        if range.start >= range.end || range.end > len || range.start < previous_end {
            return Err(AppError::internal(format!(
                "segmenter produced invalid lap range {}..{} for {len} samples",
                range.start, range.end
            )));
        }
        previous_end = range.end;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquametric_core::errors::ErrorCode;
    use aquametric_core::models::{SensorData, StrokeType};
    use std::f64::consts::PI;

    const RATE: f64 = 30.0;

    fn session_arrays(parts: &[(bool, f64)]) -> (Vec<i64>, Vec<Vec3>, Vec<Vec3>) {
        let mut accel = Vec::new();
        for &(swimming, seconds) in parts {
            for i in 0..(seconds * RATE).round() as usize {
                let t = i as f64 / RATE;
                let z = if swimming {
                    15.0f64.mul_add((2.0 * PI * t).sin(), 9.8)
                } else {
                    9.8
                };
                accel.push([0.0, 0.0, z]);
            }
        }
        let n = accel.len();
        let timestamps = (0..n as i64).map(|i| i * 33_333_333).collect();
        (timestamps, accel, vec![[0.0; 3]; n])
    }

    struct FixedRanges(Vec<Range<usize>>);

    impl LapSegmenter for FixedRanges {
        fn segment(&self, _: &SensorData, _: f64) -> AppResult<Vec<Range<usize>>> {
            Ok(self.0.clone())
        }
    }

    struct AlwaysButterfly;

    impl StrokeClassifier for AlwaysButterfly {
        fn classify(&self, _: &[Vec3]) -> StrokeType {
            StrokeType::Butterfly
        }
    }

    #[test]
    fn test_two_bursts_yield_two_laps() {
        let (ts, accel, gyro) =
            session_arrays(&[(false, 5.0), (true, 15.0), (false, 5.0), (true, 15.0), (false, 5.0)]);
        let result = analyze_from_arrays(ts, accel, gyro, 25, RATE).unwrap();

        assert_eq!(result.total_laps(), 2);
        assert_eq!(result.filtered_accel().len(), 1350);
        for (i, lap) in result.laps().iter().enumerate() {
            assert_eq!(lap.lap_number as usize, i + 1);
            assert!((lap.duration_sec - 15.0).abs() < 1.0, "duration {}", lap.duration_sec);
            assert!((lap.duration_sec * RATE - lap.sample_count() as f64).abs() < 1e-6);
        }
        assert_eq!(result.total_distance_m(), 50);
    }

    #[test]
    fn test_rest_only_session_has_no_laps() {
        let (ts, accel, gyro) = session_arrays(&[(false, 30.0)]);
        let result = AnalysisPipeline::default()
            .analyze_from_arrays(ts, accel, gyro, 25)
            .unwrap();
        assert_eq!(result.total_laps(), 0);
        assert_eq!(result.primary_stroke(), StrokeType::Unknown);
    }

    #[test]
    fn test_invalid_input_fails_before_analysis() {
        let err = analyze_from_arrays(vec![0, 1], vec![[0.0; 3]; 2], vec![[0.0; 3]; 1], 25, RATE)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let err = analyze_from_arrays(vec![0], vec![[0.0; 3]], vec![[0.0; 3]], 25, 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_invalid_segment_ranges_abort() {
        let (ts, accel, gyro) = session_arrays(&[(false, 5.0)]);
        let pipeline = AnalysisPipeline::default().with_segmenter(FixedRanges(vec![100..200]));
        let err = pipeline.analyze_from_arrays(ts, accel, gyro, 25).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_swapped_stages_are_used() {
        let (ts, accel, gyro) = session_arrays(&[(true, 20.0)]);
        let pipeline = AnalysisPipeline::default()
            .with_segmenter(FixedRanges(vec![0..300, 300..600]))
            .with_classifier(AlwaysButterfly);
        let result = pipeline.analyze_from_arrays(ts, accel, gyro, 50).unwrap();
        assert_eq!(result.total_laps(), 2);
        assert!(result.laps().iter().all(|lap| lap.stroke_type == StrokeType::Butterfly));
        assert!((result.laps()[1].duration_sec - 10.0).abs() < 1e-9);
        assert_eq!(result.total_distance_m(), 100);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let (ts, accel, gyro) = session_arrays(&[(false, 3.0), (true, 20.0), (false, 3.0)]);
        let session = SessionData::from_arrays(ts, accel, gyro, Uuid::new_v4(), 25).unwrap();
        let pipeline = AnalysisPipeline::default();
        let a = pipeline.analyze(&session).unwrap();
        let b = pipeline.analyze(&session).unwrap();
        assert_eq!(a.laps(), b.laps());
        assert_eq!(a.session_id(), session.session_id());
    }
}
