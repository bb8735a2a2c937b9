// ABOUTME: Configuration module for the aquametric-analysis crate
// ABOUTME: Re-exports algorithm parameter types and their validation errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

/// Tunable algorithm parameters (sampling, filter, classifier, segmentation, counting)
pub mod algorithm;

/// Configuration validation errors
pub mod error;

pub use algorithm::{
    AlgorithmConfig, ClassifierConfig, ClassifierThresholds, CountingMethod, FilterConfig,
    SamplingConfig, SegmentationConfig, StrokeCounterConfig,
};
pub use error::ConfigError;
