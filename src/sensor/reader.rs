//! Reading recorded sensor event streams
//!
//! Replays of the platform sensor are stored either as NDJSON (one event per
//! line, as captured) or as a JSON array.

use crate::error::TrackerError;
use crate::sensor::event::*;

/// Parser and batch validator for sensor event streams
pub struct SensorEventReader;

impl SensorEventReader {
    /// Parse a JSON string containing an array of sensor events
    pub fn parse_array(json: &str) -> Result<Vec<SensorEvent>, TrackerError> {
        let events: Vec<SensorEvent> = serde_json::from_str(json)?;
        Ok(events)
    }

    /// Parse NDJSON (newline-delimited JSON) containing sensor events
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<SensorEvent>, TrackerError> {
        let mut events = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<SensorEvent>(trimmed) {
                Ok(event) => events.push(event),
                Err(e) => {
                    return Err(TrackerError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(events)
    }

    /// Validate a batch of events, returning only the failures
    pub fn validate_events(events: &[SensorEvent]) -> Vec<ValidationResult> {
        events
            .iter()
            .enumerate()
            .filter_map(|(idx, event)| {
                event.validate().err().map(|error| ValidationResult {
                    index: idx,
                    event_id: event.event_id.clone(),
                    error,
                })
            })
            .collect()
    }
}

/// A failed event in a batch
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub event_id: Option<String>,
    pub error: ValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ndjson() {
        let ndjson = r#"{"schema_version":"step.sensor_event.v1","timestamp":"2024-01-15T08:00:00Z","sensor":"step_counter","values":[100.0]}

{"schema_version":"step.sensor_event.v1","timestamp":"2024-01-15T08:01:00Z","sensor":"step_counter","values":[130.0]}"#;

        let events = SensorEventReader::parse_ndjson(ndjson).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].cumulative_steps(), Some(130));
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let ndjson = r#"{"schema_version":"step.sensor_event.v1","timestamp":"2024-01-15T08:00:00Z","sensor":"step_counter","values":[100.0]}
not json"#;

        let err = SensorEventReader::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"schema_version":"step.sensor_event.v1","timestamp":"2024-01-15T08:00:00Z","sensor":"step_counter","values":[1.0]},
            {"schema_version":"step.sensor_event.v1","timestamp":"2024-01-15T08:00:05Z","sensor":"accelerometer","values":[0.0, 9.8, 0.1]}
        ]"#;

        let events = SensorEventReader::parse_array(json).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].sensor, SensorKind::Accelerometer);
    }

    #[test]
    fn test_validate_events() {
        let mut events = vec![
            SensorEvent::step_count(chrono::Utc::now(), 10.0),
            SensorEvent::step_count(chrono::Utc::now(), -5.0),
        ];
        events[1].event_id = Some("bad".to_string());

        let results = SensorEventReader::validate_events(&events);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 1);
        assert_eq!(results[0].event_id.as_deref(), Some("bad"));
    }
}
