// ABOUTME: Stroke repetition counting for one lap via peak detection, spectral analysis or both
// ABOUTME: Uses per-style stroke frequency bands to space peaks and to bound the dominant frequency search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Stroke Counter
//!
//! Bilateral styles (freestyle, backstroke) show one roll cycle per arm
//! stroke on the thumb axis (Y). Symmetric styles undulate, which shows on the
//! wrist-normal axis (Z). The chosen axis is demeaned and counted either by
//! peak detection with a minimum spacing derived from the style's fastest
//! plausible stroke rate, or by the dominant frequency within the style's band
//! multiplied by the lap duration. The hybrid method blends both, trusting
//! peaks on short laps and the spectrum on long ones.
#![allow(clippy::cast_precision_loss)] // Safe: lap sample counts are far below 2^52
#![allow(clippy::cast_possible_truncation)] // Safe: stroke counts are small and floored at zero
#![allow(clippy::cast_sign_loss)] // Safe: values are clamped non-negative before casting

use std::cmp::Ordering;

use aquametric_core::models::{StrokeType, Vec3};
use num_complex::Complex;
use rustfft::FftPlanner;
use tracing::debug;

use crate::config::{CountingMethod, StrokeCounterConfig};

/// Lower bound on the spacing between detected peaks, in samples
const MIN_PEAK_DISTANCE_SAMPLES: usize = 3;
/// Laps shorter than this (seconds) trust peaks most
const SHORT_LAP_SEC: f64 = 15.0;
/// Laps shorter than this (seconds) trust peaks somewhat
const MEDIUM_LAP_SEC: f64 = 30.0;
/// Peak-count weight for short, medium and long laps
const PEAK_WEIGHTS: [f64; 3] = [0.8, 0.6, 0.4];
/// Band maxima at or below this magnitude are treated as no energy
const SILENT_BAND_MAGNITUDE: f64 = 1e-9;

/// Capability: estimate stroke repetitions in one lap
pub trait StrokeCounting: Send + Sync {
    /// Strokes in the lap; laps too short to count yield zero
    fn count_strokes(&self, lap_accel: &[Vec3], stroke_type: StrokeType, sampling_rate_hz: f64)
        -> u32;
}

/// Peak, spectral and hybrid stroke counting
#[derive(Debug, Clone)]
pub struct StrokeCounter {
    method: CountingMethod,
    min_samples: usize,
    spectral_min_samples: usize,
}

impl Default for StrokeCounter {
    fn default() -> Self {
        Self::from_config(&StrokeCounterConfig::default())
    }
}

impl StrokeCounter {
    /// Create a counter from the stroke counter section of the algorithm configuration
    #[must_use]
    pub const fn from_config(config: &StrokeCounterConfig) -> Self {
        Self {
            method: config.method,
            min_samples: config.min_samples,
            spectral_min_samples: config.spectral_min_samples,
        }
    }

    /// Counter using a specific method with default sample limits
    #[must_use]
    pub fn with_method(method: CountingMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Configured counting method
    #[must_use]
    pub const fn method(&self) -> CountingMethod {
        self.method
    }

    /// Count by time-domain peak detection
    #[must_use]
    pub fn count_peaks(&self, lap_accel: &[Vec3], stroke_type: StrokeType, sampling_rate_hz: f64) -> u32 {
        if lap_accel.len() < self.min_samples || !valid_rate(sampling_rate_hz) {
            return 0;
        }
        let signal = demeaned_axis(lap_accel, stroke_type);
        let (_, max_freq) = stroke_type.frequency_band();
        let distance = ((sampling_rate_hz / max_freq) as usize).max(MIN_PEAK_DISTANCE_SAMPLES);

        let positive = find_peaks(&signal, distance).len();
        let count = if stroke_type.is_bilateral() {
            positive
        } else {
            let negated: Vec<f64> = signal.iter().map(|v| -v).collect();
            positive.max(find_peaks(&negated, distance).len())
        };
        saturate(count)
    }

    /// Count from the dominant frequency within the style's band
    ///
    /// Falls back to [`StrokeCounter::count_peaks`] for laps too short for a
    /// meaningful spectrum or when the band holds no energy.
    #[must_use]
    pub fn count_spectral(
        &self,
        lap_accel: &[Vec3],
        stroke_type: StrokeType,
        sampling_rate_hz: f64,
    ) -> u32 {
        let n = lap_accel.len();
        if n < self.min_samples || !valid_rate(sampling_rate_hz) {
            return 0;
        }
        if n < self.spectral_min_samples {
            return self.count_peaks(lap_accel, stroke_type, sampling_rate_hz);
        }

        let Some(dominant_hz) = dominant_frequency(
            &demeaned_axis(lap_accel, stroke_type),
            sampling_rate_hz,
            stroke_type.frequency_band(),
        ) else {
            debug!(
                stroke = stroke_type.as_str(),
                samples = n,
                "no energy in stroke band, counting peaks"
            );
            return self.count_peaks(lap_accel, stroke_type, sampling_rate_hz);
        };

        (dominant_hz * n as f64 / sampling_rate_hz).max(0.0) as u32
    }

    /// Duration-weighted blend of the peak and spectral estimates
    ///
    /// Capped at the style's maximum stroke rate times the lap duration.
    #[must_use]
    pub fn count_hybrid(&self, lap_accel: &[Vec3], stroke_type: StrokeType, sampling_rate_hz: f64) -> u32 {
        let n = lap_accel.len();
        if n < self.min_samples || !valid_rate(sampling_rate_hz) {
            return 0;
        }
        let peaks = f64::from(self.count_peaks(lap_accel, stroke_type, sampling_rate_hz));
        let spectral = f64::from(self.count_spectral(lap_accel, stroke_type, sampling_rate_hz));

        let duration_sec = n as f64 / sampling_rate_hz;
        let weight = if duration_sec < SHORT_LAP_SEC {
            PEAK_WEIGHTS[0]
        } else if duration_sec < MEDIUM_LAP_SEC {
            PEAK_WEIGHTS[1]
        } else {
            PEAK_WEIGHTS[2]
        };

        let blended = weight.mul_add(peaks, (1.0 - weight) * spectral).max(0.0);
        let (_, max_freq) = stroke_type.frequency_band();
        let ceiling = (duration_sec * max_freq).floor();
        debug!(
            peaks,
            spectral,
            peak_weight = weight,
            ceiling,
            "blended stroke estimates"
        );
        blended.min(ceiling) as u32
    }
}

impl StrokeCounting for StrokeCounter {
    fn count_strokes(
        &self,
        lap_accel: &[Vec3],
        stroke_type: StrokeType,
        sampling_rate_hz: f64,
    ) -> u32 {
        match self.method {
            CountingMethod::Peaks => self.count_peaks(lap_accel, stroke_type, sampling_rate_hz),
            CountingMethod::Spectral => {
                self.count_spectral(lap_accel, stroke_type, sampling_rate_hz)
            }
            CountingMethod::Hybrid => self.count_hybrid(lap_accel, stroke_type, sampling_rate_hz),
        }
    }
}

fn valid_rate(sampling_rate_hz: f64) -> bool {
    sampling_rate_hz.is_finite() && sampling_rate_hz > 0.0
}

fn saturate(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Roll axis for bilateral styles, vertical axis otherwise, with the mean removed
fn demeaned_axis(lap_accel: &[Vec3], stroke_type: StrokeType) -> Vec<f64> {
    let axis = if stroke_type.is_bilateral() { 1 } else { 2 };
    let values: Vec<f64> = lap_accel.iter().map(|sample| sample[axis]).collect();
    if values.is_empty() {
        return values;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.into_iter().map(|v| v - mean).collect()
}

/// Frequency of the strongest positive bin inside `[low, high]` Hz
///
/// `None` when no bin falls in the band or the band is silent.
fn dominant_frequency(signal: &[f64], sampling_rate_hz: f64, (low, high): (f64, f64)) -> Option<f64> {
    let n = signal.len();
    if n < 2 {
        return None;
    }
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    let mut best: Option<(f64, f64)> = None;
    for (k, bin) in buffer.iter().enumerate().take((n - 1) / 2 + 1).skip(1) {
        let freq = k as f64 * sampling_rate_hz / n as f64;
        if freq < low || freq > high {
            continue;
        }
        let magnitude = bin.norm();
        if best.map_or(true, |(_, best_mag)| magnitude > best_mag) {
            best = Some((freq, magnitude));
        }
    }

    best.filter(|&(_, magnitude)| magnitude > SILENT_BAND_MAGNITUDE)
        .map(|(freq, _)| freq)
}

/// Local maxima at least `distance` samples apart
///
/// Flat tops count once, at their midpoint. When two maxima are closer than
/// `distance`, the lower one is dropped, tallest first.
#[must_use]
pub fn find_peaks(signal: &[f64], distance: usize) -> Vec<usize> {
    let peaks = local_maxima(signal);
    if distance <= 1 || peaks.len() < 2 {
        return peaks;
    }

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        signal[peaks[a]]
            .partial_cmp(&signal[peaks[b]])
            .unwrap_or(Ordering::Equal)
    });

    let mut keep = vec![true; peaks.len()];
    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(peak, kept)| kept.then_some(peak))
        .collect()
}

#[allow(clippy::float_cmp)] // Exact equality is what makes a plateau
fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let n = signal.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }
    let mut i = 1;
    while i < n - 1 {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let left = i;
                let right = ahead - 1;
                peaks.push((left + right) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}
