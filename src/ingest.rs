// ABOUTME: Sensor table ingestion from CSV exports of wrist IMU recordings
// ABOUTME: Maps ACC/GYRO/MAG/pressure columns onto SensorData, synthesizing timestamps when absent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! CSV ingestion
//!
//! The expected layout is one row per sample with a header naming the
//! channels. `ACC_0..2` and `GYRO_0..2` are required; `timestamp` (integer
//! nanoseconds, or a float that is rounded), `MAG_0..2` and `pressure` are
//! optional. Header matching ignores case and surrounding whitespace.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use aquametric_core::constants::time::NANOS_PER_SECOND;
use aquametric_core::models::{SensorData, SessionData, Vec3};
use chrono::Utc;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Accelerometer columns (m/s²)
pub const ACCEL_COLUMNS: [&str; 3] = ["ACC_0", "ACC_1", "ACC_2"];
/// Gyroscope columns (rad/s)
pub const GYRO_COLUMNS: [&str; 3] = ["GYRO_0", "GYRO_1", "GYRO_2"];
/// Magnetometer columns
pub const MAG_COLUMNS: [&str; 3] = ["MAG_0", "MAG_1", "MAG_2"];
/// Sample timestamp column (nanoseconds)
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Barometric pressure column
pub const PRESSURE_COLUMN: &str = "pressure";

/// Column positions resolved from the header row
struct ColumnLayout {
    timestamp: Option<usize>,
    accel: [usize; 3],
    gyro: [usize; 3],
    mag: Option<[usize; 3]>,
    pressure: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> AppResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };

        let mut missing = Vec::new();
        let mut required = |names: [&'static str; 3]| {
            let found = names.map(find);
            for (name, idx) in names.iter().zip(&found) {
                if idx.is_none() {
                    missing.push(*name);
                }
            }
            found
        };
        let accel = required(ACCEL_COLUMNS);
        let gyro = required(GYRO_COLUMNS);
        if !missing.is_empty() {
            return Err(AppError::missing_fields(&missing));
        }

        // All present because `missing` is empty
        let unwrap_all = |found: [Option<usize>; 3]| found.map(|idx| idx.unwrap_or_default());

        let mag = MAG_COLUMNS.map(find);
        Ok(Self {
            timestamp: find(TIMESTAMP_COLUMN),
            accel: unwrap_all(accel),
            gyro: unwrap_all(gyro),
            mag: mag.iter().all(Option::is_some).then(|| unwrap_all(mag)),
            pressure: find(PRESSURE_COLUMN),
        })
    }
}

/// A parsed sensor table, not yet validated as a recording
#[derive(Debug, Clone)]
pub struct SensorTable {
    timestamps: Vec<i64>,
    accel: Vec<Vec3>,
    gyro: Vec<Vec3>,
    mag: Option<Vec<Vec3>>,
    pressure: Option<Vec<f64>>,
    timestamps_synthesized: bool,
}

impl SensorTable {
    /// Read a table from a CSV file
    ///
    /// `sampling_rate_hz` is only used to synthesize timestamps when the file
    /// has no `timestamp` column.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the file does not exist, `StorageError`
    /// if it cannot be opened, and any error from [`SensorTable::from_reader`].
    pub fn from_path(path: &Path, sampling_rate_hz: f64) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::not_found(format!("sensor file {}", path.display())),
            _ => AppError::storage(format!("cannot open {}", path.display())).with_source(e),
        })?;
        let table = Self::from_reader(file, sampling_rate_hz)?;
        debug!(
            path = %path.display(),
            samples = table.len(),
            synthesized_timestamps = table.timestamps_synthesized,
            "sensor table loaded"
        );
        Ok(table)
    }

    /// Read a table from any CSV source
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unusable sampling rate,
    /// `MissingRequiredField` naming absent required columns, and
    /// `InvalidFormat` for malformed rows or unparseable numbers.
    pub fn from_reader<R: Read>(reader: R, sampling_rate_hz: f64) -> AppResult<Self> {
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(AppError::invalid_input(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| {
                AppError::invalid_format(format!("unreadable CSV header: {e}")).with_source(e)
            })?
            .clone();
        let layout = ColumnLayout::from_headers(&headers)?;

        let mut table = Self {
            timestamps: Vec::new(),
            accel: Vec::new(),
            gyro: Vec::new(),
            mag: layout.mag.map(|_| Vec::new()),
            pressure: layout.pressure.map(|_| Vec::new()),
            timestamps_synthesized: layout.timestamp.is_none(),
        };

        for (row, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| {
                AppError::invalid_format(format!("malformed CSV row {}: {e}", row + 1))
                    .with_source(e)
            })?;
            table.push_row(&layout, &headers, &record, row, sampling_rate_hz)?;
        }

        Ok(table)
    }

    fn push_row(
        &mut self,
        layout: &ColumnLayout,
        headers: &StringRecord,
        record: &StringRecord,
        row: usize,
        sampling_rate_hz: f64,
    ) -> AppResult<()> {
        let value = |idx: usize| parse_number(headers, record, idx, row);
        let vector = |idx: [usize; 3]| -> AppResult<Vec3> {
            Ok([value(idx[0])?, value(idx[1])?, value(idx[2])?])
        };

        let timestamp = match layout.timestamp {
            Some(idx) => parse_timestamp(headers, record, idx, row)?,
            None => (row as f64 * NANOS_PER_SECOND / sampling_rate_hz).round() as i64,
        };
        self.timestamps.push(timestamp);
        self.accel.push(vector(layout.accel)?);
        self.gyro.push(vector(layout.gyro)?);

        if let (Some(idx), Some(mag)) = (layout.mag, self.mag.as_mut()) {
            mag.push(vector(idx)?);
        }
        if let (Some(idx), Some(pressure)) = (layout.pressure, self.pressure.as_mut()) {
            pressure.push(value(idx)?);
        }
        Ok(())
    }

    /// Number of rows read
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Whether timestamps were generated from the sampling rate
    #[must_use]
    pub const fn timestamps_synthesized(&self) -> bool {
        self.timestamps_synthesized
    }

    /// Whether the table carried all three magnetometer columns
    #[must_use]
    pub const fn has_mag(&self) -> bool {
        self.mag.is_some()
    }

    /// Whether the table carried a pressure column
    #[must_use]
    pub const fn has_pressure(&self) -> bool {
        self.pressure.is_some()
    }

    /// Validate the table as a recording
    ///
    /// # Errors
    ///
    /// Propagates [`SensorData::with_optional_channels`] validation errors
    /// (decreasing timestamps, non-finite samples).
    pub fn into_sensor_data(self) -> AppResult<SensorData> {
        SensorData::with_optional_channels(
            self.timestamps,
            self.accel,
            self.gyro,
            self.mag,
            self.pressure,
        )
    }

    /// Wrap the table in a new session recorded now by an anonymous user
    ///
    /// # Errors
    ///
    /// Propagates recording validation errors and the pool length check.
    pub fn into_session(self, pool_length_m: u32) -> AppResult<SessionData> {
        let sensor_data = self.into_sensor_data()?;
        SessionData::new(
            Uuid::new_v4(),
            Uuid::nil(),
            pool_length_m,
            Utc::now(),
            sensor_data,
        )
    }
}

fn column_name(headers: &StringRecord, idx: usize) -> &str {
    headers.get(idx).unwrap_or("?")
}

fn parse_number(
    headers: &StringRecord,
    record: &StringRecord,
    idx: usize,
    row: usize,
) -> AppResult<f64> {
    let raw = record.get(idx).unwrap_or_default();
    raw.parse::<f64>().map_err(|_| {
        AppError::invalid_format(format!(
            "row {}: column {} holds '{raw}', expected a number",
            row + 1,
            column_name(headers, idx)
        ))
    })
}

fn parse_timestamp(
    headers: &StringRecord,
    record: &StringRecord,
    idx: usize,
    row: usize,
) -> AppResult<i64> {
    let raw = record.get(idx).unwrap_or_default();
    if let Ok(nanos) = raw.parse::<i64>() {
        return Ok(nanos);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value.round() as i64),
        _ => Err(AppError::invalid_format(format!(
            "row {}: column {} holds '{raw}', expected a timestamp in nanoseconds",
            row + 1,
            column_name(headers, idx)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use aquametric_core::ErrorCode;

    use super::*;

    const HEADER: &str = "timestamp,ACC_0,ACC_1,ACC_2,GYRO_0,GYRO_1,GYRO_2";

    #[test]
    fn test_reads_required_columns() -> AppResult<()> {
        let csv = format!("{HEADER}\n0,0.1,0.2,9.8,0,0,0\n33333333,0.2,0.1,9.7,0.01,0,0\n");
        let table = SensorTable::from_reader(csv.as_bytes(), 30.0)?;
        assert_eq!(table.len(), 2);
        assert!(!table.timestamps_synthesized());
        assert!(!table.has_mag());

        let data = table.into_sensor_data()?;
        assert_eq!(data.timestamps(), &[0, 33_333_333]);
        assert!((data.accel()[1][2] - 9.7).abs() < 1e-12);
        assert!((data.gyro()[1][0] - 0.01).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_synthesizes_timestamps() -> AppResult<()> {
        let csv = "ACC_0,ACC_1,ACC_2,GYRO_0,GYRO_1,GYRO_2\n0,0,9.8,0,0,0\n0,0,9.8,0,0,0\n0,0,9.8,0,0,0\n";
        let table = SensorTable::from_reader(csv.as_bytes(), 25.0)?;
        assert!(table.timestamps_synthesized());
        let data = table.into_sensor_data()?;
        assert_eq!(data.timestamps(), &[0, 40_000_000, 80_000_000]);
        Ok(())
    }

    #[test]
    fn test_missing_columns_are_named() {
        let csv = "timestamp,ACC_0,ACC_2,GYRO_0,GYRO_1\n0,0,9.8,0,0\n";
        let err = SensorTable::from_reader(csv.as_bytes(), 30.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert!(err.message.contains("ACC_1"));
        assert!(err.message.contains("GYRO_2"));
        assert!(!err.message.contains("ACC_0"));
    }

    #[test]
    fn test_optional_channels_and_case_insensitive_headers() -> AppResult<()> {
        let csv = "Timestamp, acc_0,ACC_1,ACC_2,GYRO_0,GYRO_1,GYRO_2,MAG_0,MAG_1,MAG_2,Pressure\n\
                   1.0e3,0,0,9.8,0,0,0,20,5,-40,1013.2\n";
        let table = SensorTable::from_reader(csv.as_bytes(), 30.0)?;
        assert!(table.has_mag());
        assert!(table.has_pressure());
        let data = table.into_sensor_data()?;
        assert_eq!(data.timestamps(), &[1000]);
        assert_eq!(data.mag().map(<[Vec3]>::len), Some(1));
        assert_eq!(data.pressure(), Some(&[1013.2][..]));
        Ok(())
    }

    #[test]
    fn test_bad_number_is_invalid_format() {
        let csv = format!("{HEADER}\n0,0.1,oops,9.8,0,0,0\n");
        let err = SensorTable::from_reader(csv.as_bytes(), 30.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(err.message.contains("ACC_1"));
    }

    #[test]
    fn test_decreasing_timestamps_rejected_on_conversion() -> AppResult<()> {
        let csv = format!("{HEADER}\n100,0,0,9.8,0,0,0\n50,0,0,9.8,0,0,0\n");
        let table = SensorTable::from_reader(csv.as_bytes(), 30.0)?;
        let err = table.into_sensor_data().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        Ok(())
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let err = SensorTable::from_reader(HEADER.as_bytes(), 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = SensorTable::from_path(Path::new("/nonexistent/session.csv"), 30.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
    }
}
