// ABOUTME: Swim analysis engine turning raw wrist IMU recordings into classified, counted laps
// ABOUTME: Hosts the conditioning, segmentation, classification and counting stages plus their orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

#![deny(unsafe_code)]

//! # AquaMetric Analysis
//!
//! The four-stage pipeline over a complete recording:
//!
//! - **preprocessor**: zero-phase FIR low-pass filtering
//! - **segmenter**: activity mask with morphological cleanup into lap ranges
//! - **classifier**: per-axis energy decision procedure for the stroke style
//! - **`stroke_counter`**: peak, spectral and hybrid stroke counting
//! - **pipeline**: sequencing and result assembly
//!
//! Every stage sits behind a narrow capability trait so alternate strategies
//! can be plugged into [`pipeline::AnalysisPipeline`] at construction time.
//!
//! ```rust
//! use aquametric_analysis::pipeline::analyze_from_arrays;
//!
//! let n = 300;
//! let timestamps = (0..n as i64).map(|i| i * 33_333_333).collect();
//! let result = analyze_from_arrays(timestamps, vec![[0.0, 0.0, 9.8]; n], vec![[0.0; 3]; n], 25, 30.0)?;
//! assert_eq!(result.total_laps(), 0);
//! # Ok::<(), aquametric_core::AppError>(())
//! ```

/// Algorithm parameters and their validation
pub mod config;

/// Zero-phase low-pass signal conditioning
pub mod preprocessor;

/// Lap boundary detection
pub mod segmenter;

/// Stroke style classification
pub mod classifier;

/// Stroke counting
pub mod stroke_counter;

/// Stage orchestration
pub mod pipeline;

pub use classifier::{EnergyClassifier, EnergyProfile, StrokeClassifier};
pub use config::{AlgorithmConfig, ConfigError, CountingMethod};
pub use pipeline::{analyze_from_arrays, AnalysisPipeline};
pub use preprocessor::{SignalConditioner, SignalPreprocessor};
pub use segmenter::{ActivityMaskSegmenter, LapSegmenter, NullProbabilitySegmenter};
pub use stroke_counter::{StrokeCounter, StrokeCounting};
