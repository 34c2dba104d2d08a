//! step.sensor_event.v1 schema definition
//!
//! One platform sensor callback, serialized. Step counters report a single
//! cumulative float since device boot in `values[0]`; other sensor kinds are
//! accepted on the wire and ignored by the tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "step.sensor_event.v1";

/// Sensor that produced the event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Cumulative steps since boot
    StepCounter,
    /// One event per detected step
    StepDetector,
    Accelerometer,
    /// For other platform sensors
    #[serde(untagged)]
    Other(String),
}

impl SensorKind {
    pub fn as_str(&self) -> &str {
        match self {
            SensorKind::StepCounter => "step_counter",
            SensorKind::StepDetector => "step_detector",
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Other(name) => name.as_str(),
        }
    }
}

/// A single sensor callback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEvent {
    /// Schema version identifier
    pub schema_version: String,
    /// Unique event identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// When the reading was delivered (UTC)
    pub timestamp: DateTime<Utc>,
    /// Reporting sensor
    pub sensor: SensorKind,
    /// Raw sensor values
    pub values: Vec<f64>,
    /// Platform accuracy level, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<i32>,
}

impl SensorEvent {
    /// Create a step counter event carrying a cumulative count
    pub fn step_count(timestamp: DateTime<Utc>, cumulative: f64) -> Self {
        SensorEvent {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id: Some(uuid::Uuid::new_v4().to_string()),
            timestamp,
            sensor: SensorKind::StepCounter,
            values: vec![cumulative],
            accuracy: None,
        }
    }

    /// Add accuracy to the event
    pub fn with_accuracy(mut self, accuracy: i32) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn is_step_counter(&self) -> bool {
        self.sensor == SensorKind::StepCounter
    }

    /// Cumulative count truncated to whole steps, for step counter events
    pub fn cumulative_steps(&self) -> Option<i64> {
        if !self.is_step_counter() {
            return None;
        }
        self.values.first().map(|v| v.trunc() as i64)
    }

    /// Validate the event schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if !self.is_step_counter() {
            return Ok(());
        }

        match self.values.first() {
            None => Err(ValidationError::MissingValue),
            Some(v) if !v.is_finite() || *v < 0.0 => {
                Err(ValidationError::InvalidStepCount(v.to_string()))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Validation errors for sensor events
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Step counter event carries no value")]
    MissingValue,

    #[error("Step count must be a finite non-negative number, got {0}")]
    InvalidStepCount(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_step_event() {
        let event = SensorEvent::step_count(Utc::now(), 1234.0).with_accuracy(3);
        let json = serde_json::to_string_pretty(&event).unwrap();

        assert!(json.contains("step.sensor_event.v1"));
        assert!(json.contains("step_counter"));
        assert!(json.contains("1234"));
    }

    #[test]
    fn test_deserialize_step_event() {
        let json = r#"{
            "schema_version": "step.sensor_event.v1",
            "timestamp": "2024-01-15T08:30:00Z",
            "sensor": "step_counter",
            "values": [5123.0]
        }"#;

        let event: SensorEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.schema_version, SCHEMA_VERSION);
        assert!(event.is_step_counter());
        assert_eq!(event.cumulative_steps(), Some(5123));
        assert!(event.accuracy.is_none());
    }

    #[test]
    fn test_unknown_sensor_is_other() {
        let json = r#"{
            "schema_version": "step.sensor_event.v1",
            "timestamp": "2024-01-15T08:30:00Z",
            "sensor": "gyroscope",
            "values": [0.1, 0.2, 0.3]
        }"#;

        let event: SensorEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.sensor, SensorKind::Other("gyroscope".to_string()));
        assert_eq!(event.cumulative_steps(), None);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_fractional_count_truncates() {
        let event = SensorEvent::step_count(Utc::now(), 99.9);
        assert_eq!(event.cumulative_steps(), Some(99));
    }

    #[test]
    fn test_validation() {
        assert!(SensorEvent::step_count(Utc::now(), 10.0).validate().is_ok());

        let negative = SensorEvent::step_count(Utc::now(), -1.0);
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::InvalidStepCount(_))
        ));

        let nan = SensorEvent::step_count(Utc::now(), f64::NAN);
        assert!(nan.validate().is_err());

        let mut empty = SensorEvent::step_count(Utc::now(), 0.0);
        empty.values.clear();
        assert_eq!(empty.validate(), Err(ValidationError::MissingValue));

        let mut wrong_version = SensorEvent::step_count(Utc::now(), 0.0);
        wrong_version.schema_version = "step.sensor_event.v0".to_string();
        assert!(matches!(
            wrong_version.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));
    }
}
