//! Tracker configuration
//!
//! Every physical constant and widget choice lives here with a documented
//! default, so both screen variants (chart throttled to every 10th event, or
//! chart plus progress bar updated on every event) run through one tracker.

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};

/// Average adult stride length (meters)
pub const DEFAULT_STRIDE_LENGTH_M: f64 = 0.762;

/// Reference body weight (kg)
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// Energy cost per step per kilogram of body weight (kcal).
///
/// At 70 kg this gives 28.0 kcal per 1000 steps.
pub const DEFAULT_KCAL_PER_STEP_PER_KG: f64 = 0.0004;

/// Daily step goal used by the progress indicator
pub const DEFAULT_DAILY_GOAL: u64 = 10_000;

/// Number of points kept for the chart
pub const DEFAULT_HISTORY_CAPACITY: usize = 7;

/// Upper bound on `history_capacity`; a chart never shows more points than this
pub const MAX_HISTORY_CAPACITY: usize = 1024;

/// Append a chart point on every Nth sensor event
pub const DEFAULT_CHART_EVERY: u32 = 10;

/// How to treat a cumulative count that drops below the stored offset,
/// which happens when the device reboots and the sensor restarts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebootPolicy {
    /// Keep the offset; displayed steps stay at 0 until the counter passes it
    #[default]
    Clamp,
    /// Drop the offset to 0 so steps taken since the reboot are counted
    Rebaseline,
}

/// Chart rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
        }
    }
}

/// Which optional widgets the host screen provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetFlags {
    /// Progress indicator toward the daily goal
    pub progress: bool,
    /// History chart
    pub chart: bool,
    /// Chart style, ignored when `chart` is false
    pub chart_kind: ChartKind,
}

impl Default for WidgetFlags {
    fn default() -> Self {
        Self {
            progress: false,
            chart: true,
            chart_kind: ChartKind::Line,
        }
    }
}

/// Full tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Stride length in meters
    pub stride_length_m: f64,
    /// User weight in kg
    pub weight_kg: f64,
    /// Calorie coefficient (kcal per step per kg)
    pub kcal_per_step_per_kg: f64,
    /// Daily step goal
    pub daily_goal: u64,
    /// Maximum number of chart points retained
    pub history_capacity: usize,
    /// Chart throttle: append on every Nth event (1 = every event)
    pub chart_every: u32,
    /// Reboot handling
    pub reboot_policy: RebootPolicy,
    /// Capture a fresh offset every time the tracker is created
    pub reset_on_launch: bool,
    /// Optional widgets
    pub widgets: WidgetFlags,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            stride_length_m: DEFAULT_STRIDE_LENGTH_M,
            weight_kg: DEFAULT_WEIGHT_KG,
            kcal_per_step_per_kg: DEFAULT_KCAL_PER_STEP_PER_KG,
            daily_goal: DEFAULT_DAILY_GOAL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            chart_every: DEFAULT_CHART_EVERY,
            reboot_policy: RebootPolicy::Clamp,
            reset_on_launch: false,
            widgets: WidgetFlags::default(),
        }
    }
}

impl TrackerConfig {
    /// Screen variant with a line chart updated on every 10th event
    pub fn chart_screen() -> Self {
        Self::default()
    }

    /// Screen variant with a progress bar and a bar chart updated on every event
    pub fn progress_screen() -> Self {
        Self {
            chart_every: 1,
            widgets: WidgetFlags {
                progress: true,
                chart: true,
                chart_kind: ChartKind::Bar,
            },
            ..Self::default()
        }
    }

    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, TrackerError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject values that would make the derived metrics meaningless
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.stride_length_m.is_finite() && self.stride_length_m > 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "stride_length_m must be positive, got {}",
                self.stride_length_m
            )));
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "weight_kg must be positive, got {}",
                self.weight_kg
            )));
        }
        if !(self.kcal_per_step_per_kg.is_finite() && self.kcal_per_step_per_kg >= 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "kcal_per_step_per_kg must be non-negative, got {}",
                self.kcal_per_step_per_kg
            )));
        }
        if self.daily_goal == 0 {
            return Err(TrackerError::InvalidConfig(
                "daily_goal must be greater than 0".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(TrackerError::InvalidConfig(
                "history_capacity must be greater than 0".to_string(),
            ));
        }
        if self.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(TrackerError::InvalidConfig(format!(
                "history_capacity must be at most {}, got {}",
                MAX_HISTORY_CAPACITY, self.history_capacity
            )));
        }
        if self.chart_every == 0 {
            return Err(TrackerError::InvalidConfig(
                "chart_every must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_capacity, 7);
        assert_eq!(config.chart_every, 10);
        assert_eq!(config.reboot_policy, RebootPolicy::Clamp);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TrackerConfig::from_json(r#"{"weight_kg": 82.5, "widgets": {"progress": true}}"#)
            .unwrap();

        assert_eq!(config.weight_kg, 82.5);
        assert_eq!(config.stride_length_m, DEFAULT_STRIDE_LENGTH_M);
        assert!(config.widgets.progress);
        assert!(config.widgets.chart);
        assert_eq!(config.widgets.chart_kind, ChartKind::Line);
    }

    #[test]
    fn test_enum_fields_parse_snake_case() {
        let config = TrackerConfig::from_json(
            r#"{"reboot_policy": "rebaseline", "widgets": {"chart_kind": "bar"}}"#,
        )
        .unwrap();

        assert_eq!(config.reboot_policy, RebootPolicy::Rebaseline);
        assert_eq!(config.widgets.chart_kind, ChartKind::Bar);
    }

    #[test]
    fn test_rejects_zero_goal() {
        let result = TrackerConfig::from_json(r#"{"daily_goal": 0}"#);
        assert!(matches!(result, Err(TrackerError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_positive_stride() {
        let config = TrackerConfig {
            stride_length_m: 0.0,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_cadence_and_capacity() {
        let config = TrackerConfig {
            chart_every: 0,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TrackerConfig {
            history_capacity: 0,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_capacity() {
        let result = TrackerConfig::from_json(r#"{"history_capacity": 1000000000000000}"#);
        assert!(matches!(result, Err(TrackerError::InvalidConfig(_))));

        let config = TrackerConfig {
            history_capacity: MAX_HISTORY_CAPACITY,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = TrackerConfig {
            history_capacity: MAX_HISTORY_CAPACITY + 1,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_screen_variants() {
        let chart = TrackerConfig::chart_screen();
        assert_eq!(chart.chart_every, 10);
        assert!(!chart.widgets.progress);

        let progress = TrackerConfig::progress_screen();
        assert_eq!(progress.chart_every, 1);
        assert!(progress.widgets.progress);
        assert_eq!(progress.widgets.chart_kind, ChartKind::Bar);
    }

    #[test]
    fn test_json_round_trip() {
        let config = TrackerConfig::progress_screen();
        let loaded = TrackerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, loaded);
    }
}
