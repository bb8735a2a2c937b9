// ABOUTME: Physical constants and input limits shared by every AquaMetric crate
// ABOUTME: Gravity, pool length bounds, time unit conversions, and stroke frequency bands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

/// Physical constants
pub mod physics {
    /// Expected acceleration magnitude of a wrist at rest (m/s²)
    pub const GRAVITY_MS2: f64 = 9.8;
}

/// Pool geometry limits
pub mod pool {
    /// Shortest pool accepted for a session (meters)
    pub const MIN_POOL_LENGTH_M: u32 = 10;
    /// Longest pool accepted for a session (meters)
    pub const MAX_POOL_LENGTH_M: u32 = 50;
    /// Short-course pool length used when the caller does not specify one
    pub const DEFAULT_POOL_LENGTH_M: u32 = 25;
}

/// Time unit conversions
pub mod time {
    /// Nanoseconds in one second, the unit of sensor timestamps
    pub const NANOS_PER_SECOND: f64 = 1_000_000_000.0;
}

/// Expected stroke rate bands (Hz, inclusive) per swimming style
pub mod stroke_bands {
    /// Freestyle arm-cycle rate band
    pub const FREESTYLE_HZ: (f64, f64) = (0.6, 1.5);
    /// Backstroke arm-cycle rate band
    pub const BACKSTROKE_HZ: (f64, f64) = (0.5, 1.2);
    /// Breaststroke cycle rate band
    pub const BREASTSTROKE_HZ: (f64, f64) = (0.3, 0.8);
    /// Butterfly cycle rate band
    pub const BUTTERFLY_HZ: (f64, f64) = (0.4, 1.0);
    /// Band used when the style is unknown
    pub const UNKNOWN_HZ: (f64, f64) = (0.3, 1.5);
}
