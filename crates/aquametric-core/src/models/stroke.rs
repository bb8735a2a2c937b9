// ABOUTME: Swimming stroke style enumeration with parsing, display and expected stroke rates
// ABOUTME: Closed set covering the four competitive styles plus unknown, rest and turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::stroke_bands;
use crate::errors::AppError;

/// Swimming stroke styles
///
/// `Rest` and `Turn` are reserved for finer-grained segmentation; the energy
/// classifier only emits the four competitive styles and `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrokeType {
    /// Front crawl
    Freestyle,
    /// Back crawl
    Backstroke,
    /// Breaststroke
    Breaststroke,
    /// Butterfly
    Butterfly,
    /// Not enough evidence to decide
    Unknown,
    /// Resting at the wall
    Rest,
    /// Turning at the wall
    Turn,
}

impl StrokeType {
    /// Every variant, in declaration order
    pub const ALL: [Self; 7] = [
        Self::Freestyle,
        Self::Backstroke,
        Self::Breaststroke,
        Self::Butterfly,
        Self::Unknown,
        Self::Rest,
        Self::Turn,
    ];

    /// Wire name of the style
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Freestyle => "freestyle",
            Self::Backstroke => "backstroke",
            Self::Breaststroke => "breaststroke",
            Self::Butterfly => "butterfly",
            Self::Unknown => "unknown",
            Self::Rest => "rest",
            Self::Turn => "turn",
        }
    }

    /// Human-readable name of the style
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Freestyle => "Freestyle",
            Self::Backstroke => "Backstroke",
            Self::Breaststroke => "Breaststroke",
            Self::Butterfly => "Butterfly",
            Self::Unknown => "Unknown",
            Self::Rest => "Rest",
            Self::Turn => "Turn",
        }
    }

    /// Bilateral styles alternate arms, so the wrist roll axis carries the stroke rhythm
    #[must_use]
    pub const fn is_bilateral(&self) -> bool {
        matches!(self, Self::Freestyle | Self::Backstroke)
    }

    /// Expected stroke rate band `(min_hz, max_hz)` for the style
    ///
    /// `Rest` and `Turn` have no stroke rhythm of their own and share the
    /// widest band with `Unknown`.
    #[must_use]
    pub const fn frequency_band(&self) -> (f64, f64) {
        match self {
            Self::Freestyle => stroke_bands::FREESTYLE_HZ,
            Self::Backstroke => stroke_bands::BACKSTROKE_HZ,
            Self::Breaststroke => stroke_bands::BREASTSTROKE_HZ,
            Self::Butterfly => stroke_bands::BUTTERFLY_HZ,
            Self::Unknown | Self::Rest | Self::Turn => stroke_bands::UNKNOWN_HZ,
        }
    }
}

impl fmt::Display for StrokeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrokeType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stroke| stroke.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::invalid_input(format!("Unknown stroke type: {s}")))
    }
}
