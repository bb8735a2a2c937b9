// ABOUTME: Configuration loading for the AquaMetric application layer
// ABOUTME: Resolves the algorithm YAML file, applies environment overrides and validates the result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Algorithm configuration loading
//!
//! The analysis engine never reads configuration itself; this module builds an
//! [`AlgorithmConfig`] and hands it to the pipeline constructors.

/// YAML file resolution and environment overrides
pub mod loader;

pub use aquametric_analysis::config::{
    AlgorithmConfig, ClassifierConfig, ClassifierThresholds, ConfigError, CountingMethod,
    FilterConfig, SamplingConfig, SegmentationConfig, StrokeCounterConfig,
};
pub use loader::{
    apply_env_overrides, load_algorithm_config, load_from_file, resolve_config_path,
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
};
