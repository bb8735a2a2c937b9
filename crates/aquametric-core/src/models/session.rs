// ABOUTME: Swim session wrapper pairing one sensor recording with its owner and pool geometry
// ABOUTME: Created once per uploaded recording and consumed by reference during analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sensor::{SensorData, Vec3};
use crate::constants::pool::{MAX_POOL_LENGTH_M, MIN_POOL_LENGTH_M};
use crate::errors::{AppError, AppResult};

/// Complete session data with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    session_id: Uuid,
    user_id: Uuid,
    pool_length_m: u32,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    device_type: String,
    sensor_data: SensorData,
}

impl SessionData {
    /// Create a session around an already validated recording
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if the pool length is outside 10–50 m.
    pub fn new(
        session_id: Uuid,
        user_id: Uuid,
        pool_length_m: u32,
        start_time: DateTime<Utc>,
        sensor_data: SensorData,
    ) -> AppResult<Self> {
        if !(MIN_POOL_LENGTH_M..=MAX_POOL_LENGTH_M).contains(&pool_length_m) {
            return Err(AppError::value_out_of_range(format!(
                "pool length must be between {MIN_POOL_LENGTH_M} and {MAX_POOL_LENGTH_M} m, got {pool_length_m}"
            )));
        }
        Ok(Self {
            session_id,
            user_id,
            pool_length_m,
            start_time,
            end_time: None,
            device_type: "unknown".to_owned(),
            sensor_data,
        })
    }

    /// Build a session with fresh identifiers straight from raw arrays
    ///
    /// # Errors
    ///
    /// Propagates channel validation errors from [`SensorData::new`] and the pool
    /// length check from [`SessionData::new`].
    pub fn from_arrays(
        timestamps: Vec<i64>,
        accel: Vec<Vec3>,
        gyro: Vec<Vec3>,
        user_id: Uuid,
        pool_length_m: u32,
    ) -> AppResult<Self> {
        let sensor_data = SensorData::new(timestamps, accel, gyro)?;
        Self::new(Uuid::new_v4(), user_id, pool_length_m, Utc::now(), sensor_data)
    }

    /// Record when the session ended
    #[must_use]
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Record which device produced the recording
    #[must_use]
    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    /// Session identifier
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Owning user
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Pool length in meters
    #[must_use]
    pub const fn pool_length_m(&self) -> u32 {
        self.pool_length_m
    }

    /// When recording started
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// When recording ended, if known
    #[must_use]
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Device that produced the recording
    #[must_use]
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// The raw recording
    #[must_use]
    pub const fn sensor_data(&self) -> &SensorData {
        &self.sensor_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn empty_recording() -> SensorData {
        SensorData::new(Vec::new(), Vec::new(), Vec::new()).unwrap()
    }

    #[test]
    fn test_pool_length_bounds() {
        let make = |len| {
            SessionData::new(Uuid::new_v4(), Uuid::new_v4(), len, Utc::now(), empty_recording())
        };
        assert!(make(10).is_ok());
        assert!(make(50).is_ok());
        assert_eq!(make(9).unwrap_err().code, ErrorCode::ValueOutOfRange);
        assert_eq!(make(51).unwrap_err().code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_from_arrays_defaults() {
        let user = Uuid::new_v4();
        let session = SessionData::from_arrays(vec![0, 1], vec![[0.0; 3]; 2], vec![[0.0; 3]; 2], user, 25)
            .unwrap()
            .with_device_type("apple_watch");
        assert_eq!(session.user_id(), user);
        assert_eq!(session.pool_length_m(), 25);
        assert_eq!(session.device_type(), "apple_watch");
        assert!(session.end_time().is_none());
        assert_eq!(session.sensor_data().len(), 2);
    }
}
