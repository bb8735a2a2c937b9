// ABOUTME: Algorithm configuration loader reading YAML files and AQUAMETRIC_* environment overrides
// ABOUTME: Precedence is explicit path, then AQUAMETRIC_CONFIG_PATH, then the default file, then built-in defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use aquametric_analysis::config::{AlgorithmConfig, ConfigError};
use tracing::{debug, info};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Environment variable naming an algorithm configuration file
pub const CONFIG_PATH_ENV: &str = "AQUAMETRIC_CONFIG_PATH";

/// File picked up from the working directory when nothing else is specified
pub const DEFAULT_CONFIG_PATH: &str = "config/algorithm_config.yaml";

/// Decide which configuration file to read, if any
///
/// An explicit path always wins, even if it does not exist (reading it will
/// then fail). The default file is only used when present.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    default_path.is_file().then(|| default_path.to_path_buf())
}

/// Read an algorithm configuration from a YAML file
///
/// Missing sections and fields take their defaults. The result is not
/// validated; [`load_algorithm_config`] does that after overrides.
///
/// # Errors
///
/// Returns `ConfigMissing` if the file does not exist, `ConfigError` if it
/// exists but cannot be read, and `ConfigInvalid` if it is not valid YAML for
/// [`AlgorithmConfig`].
pub fn load_from_file(path: &Path) -> AppResult<AlgorithmConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        let error = if e.kind() == io::ErrorKind::NotFound {
            AppError::new(
                ErrorCode::ConfigMissing,
                format!("configuration file {} does not exist", path.display()),
            )
        } else {
            AppError::config(format!("cannot read configuration file {}", path.display()))
        };
        error.with_source(e)
    })?;

    if contents.trim().is_empty() {
        return Ok(AlgorithmConfig::default());
    }

    serde_yaml::from_str(&contents).map_err(|e| {
        AppError::new(
            ErrorCode::ConfigInvalid,
            format!("invalid configuration file {}: {e}", path.display()),
        )
        .with_source(e)
    })
}

/// Load, override and validate the algorithm configuration
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed, an
/// environment override does not parse, or the final configuration fails
/// validation.
pub fn load_algorithm_config(explicit: Option<&Path>) -> AppResult<AlgorithmConfig> {
    let config = match resolve_config_path(explicit) {
        Some(path) => {
            info!(config.path = %path.display(), "Loading algorithm configuration");
            load_from_file(&path)?
        }
        None => {
            debug!("No algorithm configuration file found, using defaults");
            AlgorithmConfig::default()
        }
    };

    let config = apply_env_overrides(config)?;
    config.validate()?;
    Ok(config)
}

/// Apply `AQUAMETRIC_*` environment overrides on top of a configuration
///
/// # Errors
///
/// Returns `ConfigError::Parse` naming the variable whose value does not parse
pub fn apply_env_overrides(mut config: AlgorithmConfig) -> Result<AlgorithmConfig, ConfigError> {
    if let Ok(val) = env::var("AQUAMETRIC_SAMPLING_HZ") {
        config.sampling.frequency_hz = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse("Invalid AQUAMETRIC_SAMPLING_HZ".into()))?;
    }

    if let Ok(val) = env::var("AQUAMETRIC_FILTER_ORDER") {
        config.filter.order = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse("Invalid AQUAMETRIC_FILTER_ORDER".into()))?;
    }

    if let Ok(val) = env::var("AQUAMETRIC_FILTER_CUTOFF_HZ") {
        config.filter.cutoff_hz = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse("Invalid AQUAMETRIC_FILTER_CUTOFF_HZ".into()))?;
    }

    if let Ok(val) = env::var("AQUAMETRIC_MIN_LAP_SEC") {
        config.segmentation.min_lap_duration_sec = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse("Invalid AQUAMETRIC_MIN_LAP_SEC".into()))?;
    }

    if let Ok(val) = env::var("AQUAMETRIC_STROKE_COUNT_METHOD") {
        config.stroke_counter.method = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse("Invalid AQUAMETRIC_STROKE_COUNT_METHOD".into()))?;
    }

    Ok(config)
}
