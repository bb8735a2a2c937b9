// ABOUTME: Zero-phase FIR low-pass conditioning of accelerometer and gyroscope channels
// ABOUTME: Designs Hamming-windowed sinc filters once per sampling rate and caches the taps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Signal Conditioner
//!
//! Stroke cycles live between 0.5 and 1.5 Hz while wrist sensors pick up
//! turbulence and electrical noise well above that. Each channel is passed
//! through a linear-phase FIR low-pass filter forward and then backward, which
//! cancels the phase delay so turns and stroke peaks keep their sample index.
//!
//! The forward-backward pass pads both ends with an odd reflection of the
//! signal and starts each pass from the filter's steady state, so the edges do
//! not ring.
#![allow(clippy::cast_precision_loss)] // Safe: tap indices are tiny

use std::f64::consts::PI;
use std::sync::Arc;

use aquametric_core::errors::{AppError, AppResult};
use aquametric_core::models::Vec3;
use dashmap::DashMap;
use tracing::debug;

use crate::config::FilterConfig;

/// Lower bound on the cutoff normalized to Nyquist
const MIN_NORMALIZED_CUTOFF: f64 = 0.01;
/// Upper bound on the cutoff normalized to Nyquist
const MAX_NORMALIZED_CUTOFF: f64 = 0.99;
/// Padding per side, in multiples of the tap count
const PAD_TAPS_FACTOR: usize = 3;

/// Capability: low-pass a recording without shifting its events in time
pub trait SignalPreprocessor: Send + Sync {
    /// Filter every axis of a three-axis channel independently
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive or non-finite sampling rate.
    fn process(&self, data: &[Vec3], sampling_rate_hz: f64) -> AppResult<Vec<Vec3>>;

    /// Filter a single series
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive or non-finite sampling rate.
    fn process_series(&self, data: &[f64], sampling_rate_hz: f64) -> AppResult<Vec<f64>>;

    /// Filter accelerometer and gyroscope channels in one call
    ///
    /// # Errors
    ///
    /// Propagates errors from [`SignalPreprocessor::process`].
    fn process_sensor_data(
        &self,
        accel: &[Vec3],
        gyro: &[Vec3],
        sampling_rate_hz: f64,
    ) -> AppResult<(Vec<Vec3>, Vec<Vec3>)> {
        Ok((
            self.process(accel, sampling_rate_hz)?,
            self.process(gyro, sampling_rate_hz)?,
        ))
    }
}

/// Hamming-windowed FIR low-pass filter applied forward and backward
///
/// Coefficients depend only on the sampling rate once order and cutoff are
/// fixed, so they are memoized per rate. The cache is owned by the instance and
/// safe to share across threads; two threads racing on a cold entry compute
/// identical taps.
#[derive(Debug)]
pub struct SignalConditioner {
    order: usize,
    cutoff_hz: f64,
    /// Sampling rate (as raw `f64` bits) -> filter taps
    coefficients: DashMap<u64, Arc<[f64]>>,
}

impl Default for SignalConditioner {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl SignalConditioner {
    /// Create a conditioner with an explicit order and cutoff
    #[must_use]
    pub fn new(order: usize, cutoff_hz: f64) -> Self {
        Self {
            order,
            cutoff_hz,
            coefficients: DashMap::new(),
        }
    }

    /// Create a conditioner from the filter section of the algorithm configuration
    #[must_use]
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.order, config.cutoff_hz)
    }

    /// Filter order; the design has `order + 1` taps
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Cutoff frequency in Hz
    #[must_use]
    pub const fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Taps for the given sampling rate, designed on first use
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive or non-finite sampling rate.
    pub fn coefficients(&self, sampling_rate_hz: f64) -> AppResult<Arc<[f64]>> {
        if !(sampling_rate_hz.is_finite() && sampling_rate_hz > 0.0) {
            return Err(AppError::invalid_input(format!(
                "sampling rate must be a positive number of Hz, got {sampling_rate_hz}"
            )));
        }

        let key = sampling_rate_hz.to_bits();
        if let Some(taps) = self.coefficients.get(&key) {
            return Ok(Arc::clone(taps.value()));
        }

        let normalized = (self.cutoff_hz / (0.5 * sampling_rate_hz))
            .clamp(MIN_NORMALIZED_CUTOFF, MAX_NORMALIZED_CUTOFF);
        let taps: Arc<[f64]> = design_lowpass(self.order + 1, normalized).into();
        debug!(
            sampling_rate_hz,
            normalized_cutoff = normalized,
            taps = taps.len(),
            "designed low-pass filter"
        );
        self.coefficients.insert(key, Arc::clone(&taps));
        Ok(taps)
    }

    /// Number of sampling rates with cached taps
    #[must_use]
    pub fn cached_rates(&self) -> usize {
        self.coefficients.len()
    }

    fn too_short(&self, len: usize) -> bool {
        len <= self.order + 1
    }
}

impl SignalPreprocessor for SignalConditioner {
    fn process(&self, data: &[Vec3], sampling_rate_hz: f64) -> AppResult<Vec<Vec3>> {
        let taps = self.coefficients(sampling_rate_hz)?;
        if self.too_short(data.len()) {
            return Ok(data.to_vec());
        }

        let mut output = vec![[0.0; 3]; data.len()];
        for axis in 0..3 {
            let column: Vec<f64> = data.iter().map(|sample| sample[axis]).collect();
            for (out, value) in output.iter_mut().zip(filtfilt(&taps, &column)) {
                out[axis] = value;
            }
        }
        Ok(output)
    }

    fn process_series(&self, data: &[f64], sampling_rate_hz: f64) -> AppResult<Vec<f64>> {
        let taps = self.coefficients(sampling_rate_hz)?;
        if self.too_short(data.len()) {
            return Ok(data.to_vec());
        }
        Ok(filtfilt(&taps, data))
    }
}

/// Windowed-sinc low-pass design with unit gain at DC
///
/// `cutoff` is normalized to Nyquist (1.0 == half the sampling rate).
fn design_lowpass(num_taps: usize, cutoff: f64) -> Vec<f64> {
    if num_taps == 1 {
        return vec![1.0];
    }
    let alpha = (num_taps - 1) as f64 / 2.0;
    let span = (num_taps - 1) as f64;

    let mut taps: Vec<f64> = (0..num_taps)
        .map(|n| {
            let m = n as f64 - alpha;
            let window = 0.46f64.mul_add(-(2.0 * PI * n as f64 / span).cos(), 0.54);
            cutoff * sinc(cutoff * m) * window
        })
        .collect();

    let gain: f64 = taps.iter().sum();
    if gain.abs() > f64::EPSILON {
        for tap in &mut taps {
            *tap /= gain;
        }
    }
    taps
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Forward-backward FIR filtering with odd-reflection padding
///
/// Callers guarantee `signal.len() > taps.len()`.
fn filtfilt(taps: &[f64], signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let pad = (PAD_TAPS_FACTOR * taps.len()).min(n - 1);
    let first = signal[0];
    let last = signal[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0f64.mul_add(first, -signal[i])));
    extended.extend_from_slice(signal);
    extended.extend((1..=pad).map(|i| 2.0f64.mul_add(last, -signal[n - 1 - i])));

    let steady_state = steady_state_taps(taps);

    let mut forward = lfilter(taps, &extended, &steady_state);
    forward.reverse();
    let mut backward = lfilter(taps, &forward, &steady_state);
    backward.reverse();

    backward[pad..pad + n].to_vec()
}

/// Delay-line state of a FIR filter that has seen a unit step forever
fn steady_state_taps(taps: &[f64]) -> Vec<f64> {
    (1..taps.len()).map(|k| taps[k..].iter().sum()).collect()
}

/// Direct-form II transposed FIR filter, state seeded with `zi * input[0]`
fn lfilter(taps: &[f64], input: &[f64], zi: &[f64]) -> Vec<f64> {
    let Some(&x0) = input.first() else {
        return Vec::new();
    };
    let mut state: Vec<f64> = zi.iter().map(|z| z * x0).collect();
    let last = state.len();
    let mut output = Vec::with_capacity(input.len());

    for &x in input {
        let y = taps[0].mul_add(x, state.first().copied().unwrap_or(0.0));
        for k in 0..last {
            let carry = if k + 1 < last { state[k + 1] } else { 0.0 };
            state[k] = taps[k + 1].mul_add(x, carry);
        }
        output.push(y);
    }
    output
}
