// ABOUTME: End-to-end tests of the analysis pipeline on synthetic swim sessions
// ABOUTME: Covers lap detection, style and count plausibility, configuration effects and swapped stages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric
#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod common;

use aquametric::config::{AlgorithmConfig, CountingMethod};
use aquametric::{AnalysisPipeline, SessionData, StrokeType};
use aquametric_analysis::segmenter::NullProbabilitySegmenter;
use aquametric_analysis::stroke_counter::StrokeCounter;
use aquametric_core::ErrorCode;
use common::{init_test_logging, session_arrays, two_lap_phases, Phase, RATE_HZ};
use uuid::Uuid;

fn session(phases: &[Phase], pool_length_m: u32) -> SessionData {
    let (ts, accel, gyro) = session_arrays(phases);
    SessionData::from_arrays(ts, accel, gyro, Uuid::new_v4(), pool_length_m).unwrap()
}

#[test]
fn test_two_lap_session() {
    init_test_logging();
    let session = session(&two_lap_phases(), 25);
    let result = AnalysisPipeline::default().analyze(&session).unwrap();

    assert_eq!(result.session_id(), session.session_id());
    assert_eq!(result.filtered_accel().len(), 1350);
    assert_eq!(result.filtered_gyro().len(), 1350);
    assert_eq!(result.total_laps(), 2);
    assert_eq!(result.total_distance_m(), 50);

    let laps = result.laps();
    assert!(laps[0].end_idx <= laps[1].start_idx);
    // First burst spans samples 150..600, second 750..1200
    assert!(laps[0].start_idx.abs_diff(150) < 30, "start {}", laps[0].start_idx);
    assert!(laps[1].end_idx.abs_diff(1200) < 30, "end {}", laps[1].end_idx);
    for lap in laps {
        assert!((lap.duration_sec - 15.0).abs() < 1.0);
        assert_eq!(lap.pool_length_m, 25);
        assert_eq!(lap.distance_m(), 25);
        // Gravity stays on +Z through the undulation, which reads as face-up
        assert_eq!(lap.stroke_type, StrokeType::Backstroke);
        assert_eq!(
            lap.swolf(),
            lap.duration_sec.round() as u32 + lap.stroke_count
        );
    }
    assert_eq!(result.primary_stroke(), StrokeType::Backstroke);
    assert!((result.total_duration_sec() - 30.0).abs() < 2.0);
}

#[test]
fn test_roll_session_is_freestyle_with_plausible_count() {
    init_test_logging();
    let phases = [Phase::Float(5.0), Phase::Roll(20.0, 15.0), Phase::Float(5.0)];
    let result = AnalysisPipeline::default()
        .analyze(&session(&phases, 50))
        .unwrap();

    assert_eq!(result.total_laps(), 1);
    let lap = &result.laps()[0];
    assert_eq!(lap.stroke_type, StrokeType::Freestyle);
    assert!((lap.duration_sec - 20.0).abs() < 2.0, "duration {}", lap.duration_sec);
    // One roll per second
    assert!(
        (15..=25).contains(&lap.stroke_count),
        "count {}",
        lap.stroke_count
    );
    assert!(f64::from(lap.stroke_count) <= (lap.duration_sec * 1.5).floor());
}

#[test]
fn test_counting_methods_agree_on_clean_signal() {
    init_test_logging();
    let phases = [Phase::Float(5.0), Phase::Roll(20.0, 15.0), Phase::Float(5.0)];
    let session = session(&phases, 25);

    let counts: Vec<u32> = [CountingMethod::Peaks, CountingMethod::Spectral, CountingMethod::Hybrid]
        .into_iter()
        .map(|method| {
            let pipeline =
                AnalysisPipeline::default().with_stroke_counter(StrokeCounter::with_method(method));
            let result = pipeline.analyze(&session).unwrap();
            assert_eq!(result.total_laps(), 1);
            result.laps()[0].stroke_count
        })
        .collect();

    for count in &counts {
        assert!((15..=25).contains(count), "counts {counts:?}");
    }
}

#[test]
fn test_rest_only_session() {
    init_test_logging();
    let result = AnalysisPipeline::default()
        .analyze(&session(&[Phase::Rest(30.0)], 25))
        .unwrap();
    assert_eq!(result.total_laps(), 0);
    assert_eq!(result.total_distance_m(), 0);
    assert_eq!(result.avg_swolf(), 0.0);
    assert_eq!(result.avg_pace_per_100m(), 0.0);
    assert_eq!(result.primary_stroke(), StrokeType::Unknown);
}

#[test]
fn test_longer_minimum_lap_drops_short_bursts() {
    init_test_logging();
    let mut config = AlgorithmConfig::default();
    config.segmentation.min_lap_duration_sec = 20.0;
    let result = AnalysisPipeline::from_config(&config)
        .analyze(&session(&two_lap_phases(), 25))
        .unwrap();
    assert_eq!(result.total_laps(), 0);
}

#[test]
fn test_external_null_probabilities_drive_segmentation() {
    init_test_logging();
    let session = session(&two_lap_phases(), 25);
    let n = session.sensor_data().len();
    let probabilities: Vec<f64> = (0..n)
        .map(|i| if (300..900).contains(&i) { 0.1 } else { 0.9 })
        .collect();

    let segmenter = NullProbabilitySegmenter::default().with_probabilities(probabilities);
    let result = AnalysisPipeline::default()
        .with_segmenter(segmenter)
        .analyze(&session)
        .unwrap();

    assert_eq!(result.total_laps(), 1);
    let lap = &result.laps()[0];
    assert_eq!((lap.start_idx, lap.end_idx), (300, 900));
    assert!((lap.duration_sec - 20.0).abs() < 1e-9);
    assert!((lap.start_time_sec(RATE_HZ) - 10.0).abs() < 1e-9);
}

#[test]
fn test_mismatched_null_probabilities_rejected() {
    init_test_logging();
    let segmenter = NullProbabilitySegmenter::default().with_probabilities(vec![0.0; 10]);
    let err = AnalysisPipeline::default()
        .with_segmenter(segmenter)
        .analyze(&session(&two_lap_phases(), 25))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn test_pool_length_bounds() {
    let (ts, accel, gyro) = session_arrays(&[Phase::Rest(1.0)]);
    let err = SessionData::from_arrays(ts, accel, gyro, Uuid::new_v4(), 5).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}
