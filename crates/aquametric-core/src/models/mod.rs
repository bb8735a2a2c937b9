// ABOUTME: Domain entity model for swim session analysis
// ABOUTME: Re-exports SensorData, SessionData, SwimLap, AnalysisResult and StrokeType
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! # Data Models
//!
//! The entities flow through the pipeline in one direction: a `SessionData` owns the
//! raw `SensorData`, the analysis produces `SwimLap` records, and the laps are
//! assembled into an `AnalysisResult` whose aggregates are derived on read.
//!
//! ## Design Principles
//!
//! - **Immutable once built**: constructors validate, fields are read through accessors
//! - **Copy-on-slice**: slicing a recording yields an independent owned value
//! - **Derived metrics are computed**: SWOLF, pace and totals are never stored

mod analysis;
mod lap;
mod sensor;
mod session;
mod stroke;

pub use analysis::{AnalysisResult, StrokeBreakdown};
pub use lap::SwimLap;
pub use sensor::{SensorData, Vec3};
pub use session::SessionData;
pub use stroke::StrokeType;
