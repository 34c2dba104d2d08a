//! Core types for the fitness tracker
//!
//! Session state as persisted, chart history entries, and the display frames
//! handed to the host after every update.

use crate::config::ChartKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted step offsets.
///
/// Field names serialize to the keys used by the key-value store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Cumulative count reported by the sensor since device boot
    pub total_steps: i64,
    /// Offset captured at the last reset
    pub previous_total_steps: i64,
}

impl SessionState {
    pub fn new(total_steps: i64, previous_total_steps: i64) -> Self {
        Self {
            total_steps,
            previous_total_steps,
        }
    }

    /// Steps since the last reset, never negative
    pub fn current_steps(&self) -> u64 {
        self.total_steps
            .saturating_sub(self.previous_total_steps)
            .max(0) as u64
    }

    /// Capture the current total as the new offset
    pub fn reset(&mut self) {
        self.previous_total_steps = self.total_steps;
    }
}

/// One chart point in the bounded history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Axis label ("HH:MM", local time of the reading)
    pub label: String,
    /// Session-relative steps at that moment
    pub steps: u64,
    /// When the reading was taken
    pub recorded_at: DateTime<Utc>,
}

/// Chart point as drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: u32,
    pub y: u64,
    pub label: String,
}

/// Complete chart dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub description: String,
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

/// Why a frame was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameCause {
    Startup,
    SensorEvent,
    Reset,
}

/// Everything the screen needs to redraw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    /// Tracker instance that produced the frame
    pub instance_id: String,
    /// Redraw sequence number, strictly increasing per tracker
    pub sequence: u64,
    pub cause: FrameCause,
    pub steps: u64,
    pub steps_text: String,
    pub distance_km: f64,
    pub distance_text: String,
    pub calories_kcal: f64,
    pub calories_text: String,
    /// Present only when the screen has a progress indicator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<u8>,
    /// Present only when the screen has a chart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSeries>,
}

/// Transient user-visible message (toast)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    NoStepSensor,
    PermissionGranted,
    PermissionDenied,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NoStepSensor => "No step counter sensor detected on this device",
            Notice::PermissionGranted => "Permission granted",
            Notice::PermissionDenied => "Permission denied - step counting may not work",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_steps_subtracts_offset() {
        let state = SessionState::new(5_400, 5_000);
        assert_eq!(state.current_steps(), 400);
    }

    #[test]
    fn test_current_steps_clamped_at_zero() {
        let state = SessionState::new(120, 5_000);
        assert_eq!(state.current_steps(), 0);
    }

    #[test]
    fn test_reset_zeroes_current() {
        let mut state = SessionState::new(9_000, 1_000);
        state.reset();
        assert_eq!(state.previous_total_steps, 9_000);
        assert_eq!(state.current_steps(), 0);
    }

    #[test]
    fn test_state_serializes_with_store_keys() {
        let json = serde_json::to_value(SessionState::new(10, 4)).unwrap();
        assert_eq!(json["totalSteps"], 10);
        assert_eq!(json["previousTotalSteps"], 4);
    }

    #[test]
    fn test_frame_omits_absent_widgets() {
        let frame = DisplayFrame {
            instance_id: "test".to_string(),
            sequence: 1,
            cause: FrameCause::Reset,
            steps: 0,
            steps_text: "Steps: 0".to_string(),
            distance_km: 0.0,
            distance_text: "Distance: 0.00 km".to_string(),
            calories_kcal: 0.0,
            calories_text: "Calories: 0.0 kcal".to_string(),
            progress_percent: None,
            chart: None,
        };

        let json = serde_json::to_value(&frame).unwrap();
        assert!(json.get("progress_percent").is_none());
        assert!(json.get("chart").is_none());
        assert_eq!(json["cause"], "reset");
    }

    #[test]
    fn test_notice_messages() {
        assert!(Notice::NoStepSensor.message().contains("No step counter"));
        assert!(Notice::PermissionDenied.message().starts_with("Permission denied"));
    }
}
