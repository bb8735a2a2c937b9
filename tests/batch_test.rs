// ABOUTME: Integration tests for single-file and directory batch analysis
// ABOUTME: Checks ordering, per-file failure isolation and parallel/sequential agreement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric
#![allow(clippy::unwrap_used)]

mod common;

use std::fs;

use aquametric::batch::BatchAnalyzer;
use aquametric_core::ErrorCode;
use common::{init_test_logging, two_lap_phases, write_recording, Phase};
use tempfile::TempDir;

#[test]
fn test_directory_with_a_broken_file() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    write_recording(dir.path(), "b_two_laps.csv", &two_lap_phases());
    write_recording(dir.path(), "a_rest.csv", &[Phase::Rest(20.0)]);
    fs::write(dir.path().join("c_broken.csv"), "ACC_0,ACC_1\n1,2\n").unwrap();
    fs::write(dir.path().join("readme.txt"), "not a recording").unwrap();

    let analyzer = BatchAnalyzer::default();
    let outcome = analyzer.analyze_directory(dir.path(), 25).unwrap();

    assert_eq!(outcome.attempted(), 3);
    assert!(!outcome.all_succeeded());

    let names: Vec<_> = outcome
        .analyses
        .iter()
        .map(|analysis| analysis.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a_rest.csv", "b_two_laps.csv"]);
    assert_eq!(outcome.analyses[0].result.total_laps(), 0);
    assert_eq!(outcome.analyses[1].result.total_laps(), 2);
    assert_eq!(outcome.analyses[1].samples, 1350);

    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].path.ends_with("c_broken.csv"));
    assert_eq!(outcome.failures[0].error.code, ErrorCode::MissingRequiredField);
}

#[test]
fn test_directory_matches_single_file_runs() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let paths: Vec<_> = (0..4)
        .map(|i| write_recording(dir.path(), &format!("session_{i}.csv"), &two_lap_phases()))
        .collect();

    let analyzer = BatchAnalyzer::default();
    let outcome = analyzer.analyze_directory(dir.path(), 50).unwrap();
    assert!(outcome.all_succeeded());
    assert_eq!(outcome.analyses.len(), 4);

    for (path, batched) in paths.iter().zip(&outcome.analyses) {
        let single = analyzer.analyze_csv_file(path, 50).unwrap();
        assert_eq!(&batched.path, path);
        assert_eq!(single.result.laps(), batched.result.laps());
        assert_eq!(batched.result.total_distance_m(), 100);
    }
}

#[test]
fn test_invalid_pool_length_fails_the_file() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let path = write_recording(dir.path(), "session.csv", &two_lap_phases());
    let err = BatchAnalyzer::default().analyze_csv_file(&path, 100).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}
