// ABOUTME: Lap boundary detection from an activity mask over filtered acceleration magnitude
// ABOUTME: Cleans the mask with morphological close/open and keeps swimming runs long enough to be laps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Lap Segmenter
//!
//! A wrist sensor at rest (pushing off, turning, hanging on the lane rope)
//! reads roughly gravity. While swimming, the magnitude swings far from it.
//! Each sample gets a "null probability" `1 / (1 + |m - g| / 2)`; samples below
//! the threshold are swimming. The resulting mask is closed to bridge brief
//! dropouts, opened to remove short blips, and every remaining run that lasts
//! at least the minimum lap duration becomes a lap.
//!
//! Window lengths are full structuring element widths, so a close window of
//! 3 s fills gaps of up to 3 s and an open window of 2 s removes runs shorter
//! than about 2 s. Windows are truncated at the ends of the recording.
#![allow(clippy::cast_possible_truncation)] // Safe: window lengths are small positive sample counts
#![allow(clippy::cast_sign_loss)] // Safe: durations are validated non-negative

use std::ops::Range;

use aquametric_core::errors::{AppError, AppResult};
use aquametric_core::models::{SensorData, Vec3};
use tracing::{debug, warn};

use crate::config::SegmentationConfig;

/// Capability: carve a recording into lap index ranges
pub trait LapSegmenter: Send + Sync {
    /// Ordered, disjoint, half-open lap ranges
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when auxiliary inputs do not line up with the recording.
    fn segment(&self, sensor_data: &SensorData, sampling_rate_hz: f64)
        -> AppResult<Vec<Range<usize>>>;
}

/// Segmenter driven by deviation of acceleration magnitude from gravity
#[derive(Debug, Clone, Default)]
pub struct ActivityMaskSegmenter {
    config: SegmentationConfig,
}

impl ActivityMaskSegmenter {
    /// Create a segmenter with explicit settings
    #[must_use]
    pub const fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Active settings
    #[must_use]
    pub const fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Per-sample probability that the swimmer is not swimming
    #[must_use]
    pub fn null_probability(&self, accel: &[Vec3]) -> Vec<f64> {
        accel
            .iter()
            .map(|sample| {
                let deviation = (magnitude(sample) - self.config.gravity).abs();
                1.0 / (1.0 + deviation / 2.0)
            })
            .collect()
    }

    /// Snap each lap boundary to the sharpest acceleration change nearby
    ///
    /// The search covers `refine_window_sec` on either side of the boundary. A
    /// lap keeps its original range when the search region is too short to
    /// difference or the snapped range would collapse below the minimum lap
    /// length. Starts never move before the previous lap's end and ends never
    /// move past the next lap's detected start, so the fallback range is always
    /// the detected one.
    #[must_use]
    pub fn refine_lap_boundaries(
        &self,
        accel: &[Vec3],
        laps: &[Range<usize>],
        sampling_rate_hz: f64,
    ) -> Vec<Range<usize>> {
        let window = seconds_to_samples(self.config.refine_window_sec, sampling_rate_hz);
        let min_samples = seconds_to_samples(self.config.min_lap_duration_sec, sampling_rate_hz);
        let n = accel.len();

        let mut refined: Vec<Range<usize>> = Vec::with_capacity(laps.len());
        let mut previous_end = 0;

        for (i, lap) in laps.iter().enumerate() {
            let next_start = laps.get(i + 1).map_or(n, |next| next.start.min(n));
            let snapped_start = sharpest_change(accel, lap.start, window);
            let snapped_end =
                sharpest_change(accel, lap.end, window).map(|idx| idx.min(next_start));

            let candidate = match (snapped_start, snapped_end) {
                (Some(start), Some(end)) => Some(start.max(previous_end)..end),
                _ => None,
            };

            let range = match candidate {
                Some(range) if range.end > range.start && range.len() >= min_samples => range,
                _ => {
                    warn!(
                        start = lap.start,
                        end = lap.end,
                        "boundary refinement collapsed lap, keeping detected range"
                    );
                    lap.start.max(previous_end)..lap.end
                }
            };
            if range.is_empty() {
                continue;
            }

            previous_end = range.end;
            refined.push(range);
        }
        refined
    }
}

impl LapSegmenter for ActivityMaskSegmenter {
    fn segment(
        &self,
        sensor_data: &SensorData,
        sampling_rate_hz: f64,
    ) -> AppResult<Vec<Range<usize>>> {
        let accel = sensor_data.accel();
        if accel.is_empty() {
            return Ok(Vec::new());
        }
        ensure_rate(sampling_rate_hz)?;

        let threshold = self.config.null_probability_threshold;
        let mask: Vec<bool> = self
            .null_probability(accel)
            .into_iter()
            .map(|p| p < threshold)
            .collect();

        let close_half = seconds_to_samples(self.config.close_window_sec, sampling_rate_hz) / 2;
        let open_half = seconds_to_samples(self.config.open_window_sec, sampling_rate_hz) / 2;
        let cleaned = open(&close(&mask, close_half), open_half);

        let min_samples = seconds_to_samples(self.config.min_lap_duration_sec, sampling_rate_hz);
        let candidates = contiguous_runs(&cleaned);
        let candidate_count = candidates.len();
        let laps: Vec<Range<usize>> = candidates
            .into_iter()
            .filter(|run| run.len() >= min_samples)
            .collect();

        debug!(
            samples = accel.len(),
            raw_active = mask.iter().filter(|&&active| active).count(),
            candidates = candidate_count,
            laps = laps.len(),
            "segmented activity mask"
        );

        if self.config.refine_boundaries {
            Ok(self.refine_lap_boundaries(accel, &laps, sampling_rate_hz))
        } else {
            Ok(laps)
        }
    }
}

/// Segmenter that thresholds externally supplied null probabilities
///
/// Used when an upstream detector already smooths its own output, so there is
/// no morphological cleanup and no length filtering. Without probabilities it
/// falls back to [`ActivityMaskSegmenter`].
#[derive(Debug, Clone)]
pub struct NullProbabilitySegmenter {
    probabilities: Option<Vec<f64>>,
    threshold: f64,
    fallback: ActivityMaskSegmenter,
}

impl Default for NullProbabilitySegmenter {
    fn default() -> Self {
        Self::new(SegmentationConfig::default())
    }
}

impl NullProbabilitySegmenter {
    /// Create a segmenter without probabilities yet
    #[must_use]
    pub fn new(config: SegmentationConfig) -> Self {
        Self {
            probabilities: None,
            threshold: config.null_probability_threshold,
            fallback: ActivityMaskSegmenter::new(config),
        }
    }

    /// Attach per-sample null probabilities from an upstream detector
    #[must_use]
    pub fn with_probabilities(mut self, probabilities: Vec<f64>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }
}

impl LapSegmenter for NullProbabilitySegmenter {
    fn segment(
        &self,
        sensor_data: &SensorData,
        sampling_rate_hz: f64,
    ) -> AppResult<Vec<Range<usize>>> {
        let Some(probabilities) = &self.probabilities else {
            debug!("no null probabilities attached, using activity mask");
            return self.fallback.segment(sensor_data, sampling_rate_hz);
        };

        if probabilities.len() != sensor_data.len() {
            return Err(AppError::invalid_input(format!(
                "null probabilities cover {} samples but the recording has {}",
                probabilities.len(),
                sensor_data.len()
            )));
        }

        let mask: Vec<bool> = probabilities.iter().map(|&p| p < self.threshold).collect();
        Ok(contiguous_runs(&mask))
    }
}

fn ensure_rate(sampling_rate_hz: f64) -> AppResult<()> {
    if sampling_rate_hz.is_finite() && sampling_rate_hz > 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "sampling rate must be a positive number of Hz, got {sampling_rate_hz}"
        )))
    }
}

fn magnitude(sample: &Vec3) -> f64 {
    sample[0]
        .mul_add(sample[0], sample[1].mul_add(sample[1], sample[2] * sample[2]))
        .sqrt()
}

fn seconds_to_samples(seconds: f64, sampling_rate_hz: f64) -> usize {
    (seconds * sampling_rate_hz).max(0.0) as usize
}

/// Index of the largest frame-to-frame magnitude jump within `center ± window`
fn sharpest_change(accel: &[Vec3], center: usize, window: usize) -> Option<usize> {
    let lo = center.saturating_sub(window);
    let hi = (center + window).min(accel.len());
    if hi <= lo + 1 {
        return None;
    }

    let magnitudes: Vec<f64> = accel[lo..hi].iter().map(magnitude).collect();
    let mut best_idx = 0;
    let mut best_jump = f64::NEG_INFINITY;
    for (idx, pair) in magnitudes.windows(2).enumerate() {
        let jump = (pair[1] - pair[0]).abs();
        if jump > best_jump {
            best_jump = jump;
            best_idx = idx;
        }
    }
    Some(lo + best_idx)
}

/// Running count of set samples; `prefix[i]` counts `mask[..i]`
fn prefix_counts(mask: &[bool]) -> Vec<usize> {
    let mut prefix = Vec::with_capacity(mask.len() + 1);
    prefix.push(0);
    let mut total = 0;
    for &set in mask {
        total += usize::from(set);
        prefix.push(total);
    }
    prefix
}

/// Set where any sample within `half` is set
fn dilate(mask: &[bool], half: usize) -> Vec<bool> {
    let prefix = prefix_counts(mask);
    let n = mask.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            prefix[hi] - prefix[lo] > 0
        })
        .collect()
}

/// Set only where every sample within `half` is set
fn erode(mask: &[bool], half: usize) -> Vec<bool> {
    let prefix = prefix_counts(mask);
    let n = mask.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            prefix[hi] - prefix[lo] == hi - lo
        })
        .collect()
}

fn close(mask: &[bool], half: usize) -> Vec<bool> {
    erode(&dilate(mask, half), half)
}

fn open(mask: &[bool], half: usize) -> Vec<bool> {
    dilate(&erode(mask, half), half)
}

/// Maximal runs of set samples, including one that reaches the end
fn contiguous_runs(mask: &[bool]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &active) in mask.iter().enumerate() {
        match (active, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..mask.len());
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const RATE: f64 = 30.0;

    fn rest(seconds: f64) -> Vec<Vec3> {
        vec![[0.0, 0.0, 9.8]; (seconds * RATE) as usize]
    }

    fn burst(seconds: f64) -> Vec<Vec3> {
        (0..(seconds * RATE) as usize)
            .map(|i| {
                let t = i as f64 / RATE;
                [0.0, 0.0, 15.0f64.mul_add((2.0 * PI * t).sin(), 9.8)]
            })
            .collect()
    }

    fn recording(parts: Vec<Vec<Vec3>>) -> SensorData {
        let accel: Vec<Vec3> = parts.into_iter().flatten().collect();
        let n = accel.len();
        let timestamps = (0..n as i64).map(|i| i * 33_333_333).collect();
        SensorData::new(timestamps, accel, vec![[0.0; 3]; n]).unwrap()
    }

    /// Deterministic xorshift so recordings vary per seed without a rand dependency
    struct Seeded(u64);

    impl Seeded {
        fn next_unit(&mut self) -> f64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }

        fn between(&mut self, lo: f64, hi: f64) -> f64 {
            (hi - lo).mul_add(self.next_unit(), lo)
        }
    }

    /// Alternating rest and swim phases with random lengths, amplitudes and stroke rates
    fn random_recording(seed: u64) -> SensorData {
        let mut rng = Seeded(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1);
        let mut accel = Vec::new();
        for _ in 0..(3 + (rng.next_unit() * 6.0) as usize) {
            accel.extend(vec![[0.0, 0.0, 9.8]; (rng.between(1.0, 8.0) * RATE) as usize]);
            let amplitude = rng.between(6.0, 20.0);
            let freq = rng.between(0.5, 1.5);
            let roll = rng.next_unit() < 0.5;
            for i in 0..(rng.between(2.0, 25.0) * RATE) as usize {
                let wave = amplitude * (2.0 * PI * freq * i as f64 / RATE).sin();
                let jitter = rng.between(-0.5, 0.5);
                accel.push(if roll {
                    [jitter, wave, -9.8 + jitter]
                } else {
                    [jitter, 0.0, 9.8 + wave]
                });
            }
        }
        accel.extend(vec![[0.0, 0.0, 9.8]; (rng.between(0.0, 5.0) * RATE) as usize]);
        let n = accel.len();
        let timestamps = (0..n as i64).map(|i| i * 33_333_333).collect();
        SensorData::new(timestamps, accel, vec![[0.0; 3]; n]).unwrap()
    }

    fn assert_valid_ranges(laps: &[Range<usize>], n: usize, min_samples: usize, context: &str) {
        let mut previous_end = 0;
        for lap in laps {
            assert!(lap.start < lap.end, "{context}: empty range {lap:?}");
            assert!(lap.start >= previous_end, "{context}: {lap:?} overlaps end {previous_end}");
            assert!(lap.end <= n, "{context}: {lap:?} beyond {n} samples");
            assert!(lap.len() >= min_samples, "{context}: {lap:?} shorter than {min_samples}");
            previous_end = lap.end;
        }
    }

    fn mask(bits: &str) -> Vec<bool> {
        bits.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_null_probability_mapping() {
        let segmenter = ActivityMaskSegmenter::default();
        let p = segmenter.null_probability(&[[0.0, 0.0, 9.8], [0.0, 0.0, 11.8], [0.0, 0.0, 29.8]]);
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!((p[1] - 0.5).abs() < 1e-12);
        assert!((p[2] - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_close_fills_gaps_up_to_window() {
        // window 4 -> half 2: gaps of up to 4 samples close
        let closed = close(&mask("111000011110000011"), 2);
        assert_eq!(closed, mask("111111111110000011"));
    }

    #[test]
    fn test_open_removes_short_runs() {
        // window 4 -> half 2: runs shorter than 5 samples vanish
        let opened = open(&mask("0011100001111111000"), 2);
        assert_eq!(opened, mask("0000000001111111000"));
    }

    #[test]
    fn test_runs_include_trailing_run() {
        assert_eq!(contiguous_runs(&mask("0110011")), vec![1..3, 5..7]);
        assert!(contiguous_runs(&mask("0000")).is_empty());
        assert_eq!(contiguous_runs(&mask("111")), vec![0..3]);
    }

    #[test]
    fn test_empty_and_rest_inputs_yield_no_laps() {
        let segmenter = ActivityMaskSegmenter::default();
        assert!(segmenter.segment(&recording(vec![]), RATE).unwrap().is_empty());
        assert!(segmenter
            .segment(&recording(vec![rest(60.0)]), RATE)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_two_bursts_two_laps() {
        let data = recording(vec![rest(5.0), burst(15.0), rest(5.0), burst(15.0), rest(5.0)]);
        let laps = ActivityMaskSegmenter::default().segment(&data, RATE).unwrap();
        assert_eq!(laps.len(), 2);
        for lap in &laps {
            assert!(lap.len().abs_diff(450) <= 15, "lap length {}", lap.len());
        }
        assert!(laps[0].end <= laps[1].start);
    }

    #[test]
    fn test_short_burst_is_not_a_lap() {
        let data = recording(vec![rest(5.0), burst(6.0), rest(5.0)]);
        assert!(ActivityMaskSegmenter::default().segment(&data, RATE).unwrap().is_empty());
    }

    #[test]
    fn test_refined_ranges_stay_valid() {
        let config = SegmentationConfig {
            refine_boundaries: true,
            ..SegmentationConfig::default()
        };
        let data = recording(vec![rest(5.0), burst(15.0), rest(5.0), burst(15.0), rest(5.0)]);
        let laps = ActivityMaskSegmenter::new(config).segment(&data, RATE).unwrap();
        assert_eq!(laps.len(), 2);
        assert!(laps[0].start < laps[0].end);
        assert!(laps[0].end <= laps[1].start);
        assert!(laps[1].end <= data.len());
    }

    #[test]
    fn test_range_invariants_on_varied_recordings() {
        for seed in 0..60 {
            let data = random_recording(seed);
            for refine_boundaries in [false, true] {
                for (refine_window_sec, min_lap_duration_sec) in [(2.0, 10.0), (6.0, 3.0), (4.0, 5.0)] {
                    let config = SegmentationConfig {
                        refine_boundaries,
                        refine_window_sec,
                        min_lap_duration_sec,
                        ..SegmentationConfig::default()
                    };
                    let laps = ActivityMaskSegmenter::new(config).segment(&data, RATE).unwrap();
                    assert_valid_ranges(
                        &laps,
                        data.len(),
                        seconds_to_samples(min_lap_duration_sec, RATE),
                        &format!("seed {seed} refine {refine_boundaries} window {refine_window_sec}"),
                    );
                }
            }
        }
    }

    #[test]
    fn test_wide_refinement_window_keeps_laps_apart() {
        // A 4 s rest is shorter than the 6 s search window, so each boundary search
        // reaches into the neighbouring lap
        let config = SegmentationConfig {
            refine_boundaries: true,
            refine_window_sec: 6.0,
            min_lap_duration_sec: 3.0,
            ..SegmentationConfig::default()
        };
        let data = recording(vec![
            rest(5.0),
            burst(10.0),
            rest(4.0),
            burst(10.0),
            rest(4.0),
            burst(10.0),
            rest(5.0),
        ]);
        let segmenter = ActivityMaskSegmenter::new(config);
        let detected = ActivityMaskSegmenter::new(SegmentationConfig {
            refine_boundaries: false,
            ..segmenter.config().clone()
        })
        .segment(&data, RATE)
        .unwrap();
        let refined = segmenter.segment(&data, RATE).unwrap();

        assert_eq!(refined.len(), detected.len());
        assert_valid_ranges(&refined, data.len(), 90, "wide window");
        for (lap, next) in refined.iter().zip(detected.iter().skip(1)) {
            assert!(lap.end <= next.start, "{lap:?} runs into detected lap {next:?}");
        }
    }

    #[test]
    fn test_external_probabilities() {
        let data = recording(vec![rest(1.0)]);
        let mut probs = vec![0.9; 30];
        for p in &mut probs[5..12] {
            *p = 0.1;
        }
        for p in &mut probs[25..] {
            *p = 0.2;
        }
        let segmenter =
            NullProbabilitySegmenter::new(SegmentationConfig::default()).with_probabilities(probs);
        assert_eq!(segmenter.segment(&data, RATE).unwrap(), vec![5..12, 25..30]);
    }

    #[test]
    fn test_external_probability_length_mismatch() {
        let data = recording(vec![rest(1.0)]);
        let segmenter = NullProbabilitySegmenter::new(SegmentationConfig::default())
            .with_probabilities(vec![0.1; 10]);
        assert!(segmenter.segment(&data, RATE).is_err());
    }

    #[test]
    fn test_external_segmenter_falls_back_without_probabilities() {
        let data = recording(vec![rest(5.0), burst(15.0), rest(5.0)]);
        let laps = NullProbabilitySegmenter::new(SegmentationConfig::default())
            .segment(&data, RATE)
            .unwrap();
        assert_eq!(laps.len(), 1);
    }
}
