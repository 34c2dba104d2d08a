//! Display updates
//!
//! Turns a session-relative step count into a [`DisplayFrame`]: formatted
//! text fields, the optional progress value, and the optional chart dataset.
//! Chart points are appended at a throttled cadence into a bounded history.

use crate::config::TrackerConfig;
use crate::history::StepHistory;
use crate::metrics::StepMetrics;
use crate::types::{DisplayFrame, FrameCause, HistoryEntry};
use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

/// Axis label format for history entries
pub const LABEL_FORMAT: &str = "%H:%M";

/// Produces display frames for one screen
#[derive(Debug, Clone)]
pub struct DisplayUpdater {
    config: TrackerConfig,
    history: StepHistory,
    instance_id: String,
    /// Sensor updates seen, drives the chart throttle
    updates: u64,
    /// Redraws issued so far
    sequence: u64,
}

impl DisplayUpdater {
    /// Create an updater with a unique instance ID
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_instance_id(config, Uuid::new_v4().to_string())
    }

    /// Create an updater with a specific instance ID
    pub fn with_instance_id(config: TrackerConfig, instance_id: String) -> Self {
        let history = StepHistory::new(config.history_capacity);
        Self {
            config,
            history,
            instance_id,
            updates: 0,
            sequence: 0,
        }
    }

    /// Render a new step count.
    ///
    /// The first update and every `chart_every`-th after it append a history
    /// point stamped with `at`.
    pub fn update(&mut self, current: u64, at: DateTime<Utc>) -> DisplayFrame {
        let metrics = StepMetrics::derive(current, &self.config);

        if self.updates % u64::from(self.config.chart_every) == 0 {
            let entry = HistoryEntry {
                label: history_label(at),
                steps: current,
                recorded_at: at,
            };
            if let Some(evicted) = self.history.push(entry) {
                tracing::trace!(steps = evicted.steps, label = %evicted.label, "Evicted history entry");
            }
        }
        self.updates += 1;

        self.frame(FrameCause::SensorEvent, metrics)
    }

    /// Show zeroed values; the history is left as is
    pub fn clear(&mut self) -> DisplayFrame {
        self.frame(FrameCause::Reset, StepMetrics::zero())
    }

    /// Redraw a step count without touching the history or throttle
    pub fn refresh(&mut self, current: u64, cause: FrameCause) -> DisplayFrame {
        let metrics = StepMetrics::derive(current, &self.config);
        self.frame(cause, metrics)
    }

    pub fn history(&self) -> &StepHistory {
        &self.history
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Number of redraws issued
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn frame(&mut self, cause: FrameCause, metrics: StepMetrics) -> DisplayFrame {
        self.sequence += 1;
        let widgets = &self.config.widgets;

        DisplayFrame {
            instance_id: self.instance_id.clone(),
            sequence: self.sequence,
            cause,
            steps: metrics.steps,
            steps_text: metrics.steps_text(),
            distance_km: metrics.distance_km,
            distance_text: metrics.distance_text(),
            calories_kcal: metrics.calories_kcal,
            calories_text: metrics.calories_text(),
            progress_percent: widgets.progress.then_some(metrics.progress_percent),
            chart: widgets
                .chart
                .then(|| self.history.to_series(widgets.chart_kind)),
        }
    }
}

/// Local wall-clock label for a reading
pub fn history_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(LABEL_FORMAT).to_string()
}
