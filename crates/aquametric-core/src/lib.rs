// ABOUTME: Core types and constants for the AquaMetric swim analysis platform
// ABOUTME: Foundation crate with error handling, the sensor/session/lap entity model, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

#![deny(unsafe_code)]

//! # AquaMetric Core
//!
//! Foundation crate providing shared types for swim session analysis. It holds no
//! algorithms; the analysis crate populates these entities.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Physical constants and accepted input ranges
//! - **models**: `SensorData`, `SessionData`, `SwimLap`, `AnalysisResult`, `StrokeType`

/// Unified error handling system with standard error codes
pub mod errors;

/// Physical constants and input limits
pub mod constants;

/// Domain entity model (sensor recordings, sessions, laps, results)
pub mod models;

pub use errors::{AppError, AppResult, ErrorCode};
