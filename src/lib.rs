// ABOUTME: Main library entry point for the AquaMetric swim analysis toolkit
// ABOUTME: Wires configuration loading, logging, CSV ingestion, batch runs and reports around the analysis engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

#![deny(unsafe_code)]

//! # AquaMetric
//!
//! Turns wrist-worn IMU recordings of a swim session into laps annotated with
//! stroke style, stroke count, SWOLF and pace.
//!
//! ## Layout
//!
//! - **`aquametric_core`**: error taxonomy and the session/lap entity model
//! - **`aquametric_analysis`**: conditioning, segmentation, classification,
//!   counting and the pipeline that composes them
//! - **this crate**: configuration loading, logging, CSV ingestion, batch
//!   analysis, reports and the `aquametric-cli` binary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aquametric::batch::BatchAnalyzer;
//! use aquametric::config::load_algorithm_config;
//! use aquametric::report::SessionReport;
//!
//! # fn main() -> aquametric::errors::AppResult<()> {
//! let config = load_algorithm_config(None)?;
//! let analyzer = BatchAnalyzer::new(config);
//! let outcome = analyzer.analyze_csv_file("session.csv".as_ref(), 25)?;
//! let report = SessionReport::from_result(&outcome.result, analyzer.sampling_rate_hz());
//! println!("{}", report.summary_text());
//! # Ok(())
//! # }
//! ```

/// Error types shared with the analysis engine
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Algorithm configuration loading from YAML and environment
pub mod config;

/// Sensor table ingestion from CSV
pub mod ingest;

/// Single-file and directory analysis runs
pub mod batch;

/// Serializable session reports
pub mod report;

pub use aquametric_analysis::{
    AlgorithmConfig, AnalysisPipeline, EnergyClassifier, SignalConditioner, StrokeCounter,
};
pub use aquametric_core::models::{
    AnalysisResult, SensorData, SessionData, StrokeType, SwimLap, Vec3,
};
