//! Step tracker orchestration
//!
//! This module provides the public API of the crate. A [`StepTracker`] owns
//! the session offsets, the display updater and the persistence store, and
//! follows the screen lifecycle: created, resumed (listening), paused
//! (saved, not listening).

use crate::config::{RebootPolicy, TrackerConfig};
use crate::display::DisplayUpdater;
use crate::error::TrackerError;
use crate::history::StepHistory;
use crate::sensor::{SensorEvent, SensorEventReader};
use crate::store::{load_session, save_session, KeyValueStore, MemoryStore};
use crate::types::{DisplayFrame, FrameCause, Notice, SessionState};
use chrono::{DateTime, Utc};

/// Replay a recorded NDJSON sensor stream through a fresh tracker.
///
/// Starts from zero offsets with a volatile store, so nothing is persisted.
///
/// # Returns
/// One display frame per handled step counter event
///
/// # Example
/// ```ignore
/// let frames = replay_ndjson(recorded, TrackerConfig::progress_screen())?;
/// ```
pub fn replay_ndjson(ndjson: &str, config: TrackerConfig) -> Result<Vec<DisplayFrame>, TrackerError> {
    let events = SensorEventReader::parse_ndjson(ndjson)?;
    let mut tracker = StepTracker::with_memory_store(config, true)?;
    tracker.resume();
    tracker.replay(&events)
}

/// Stateful tracker for one screen
pub struct StepTracker {
    config: TrackerConfig,
    state: SessionState,
    store: Box<dyn KeyValueStore>,
    display: DisplayUpdater,
    sensor_available: bool,
    listening: bool,
    notices: Vec<Notice>,
    last_frame: DisplayFrame,
}

impl StepTracker {
    /// Create a tracker, loading saved offsets from `store`.
    ///
    /// When `sensor_available` is false a [`Notice::NoStepSensor`] is queued
    /// and the tracker never starts listening.
    pub fn new(
        config: TrackerConfig,
        store: Box<dyn KeyValueStore>,
        sensor_available: bool,
    ) -> Result<Self, TrackerError> {
        config.validate()?;

        let mut state = load_session(store.as_ref())?;
        if config.reset_on_launch {
            state.reset();
        }

        let mut notices = Vec::new();
        if !sensor_available {
            tracing::warn!("No step counter sensor detected");
            notices.push(Notice::NoStepSensor);
        }

        let mut display = DisplayUpdater::new(config.clone());
        let last_frame = display.refresh(state.current_steps(), FrameCause::Startup);

        tracing::info!(
            total_steps = state.total_steps,
            previous_total_steps = state.previous_total_steps,
            sensor_available,
            "Step tracker created"
        );

        Ok(Self {
            config,
            state,
            store,
            display,
            sensor_available,
            listening: false,
            notices,
            last_frame,
        })
    }

    /// Create a tracker over a volatile store starting from zero
    pub fn with_memory_store(
        config: TrackerConfig,
        sensor_available: bool,
    ) -> Result<Self, TrackerError> {
        Self::new(config, Box::new(MemoryStore::new()), sensor_available)
    }

    /// Screen became visible: subscribe to the sensor if there is one.
    ///
    /// Returns whether the tracker is now listening.
    pub fn resume(&mut self) -> bool {
        if self.sensor_available && !self.listening {
            self.listening = true;
            tracing::debug!("Sensor listener registered");
        }
        self.listening
    }

    /// Screen hidden: unsubscribe and persist offsets
    pub fn pause(&mut self) -> Result<(), TrackerError> {
        if self.listening {
            self.listening = false;
            tracing::debug!("Sensor listener unregistered");
        }
        self.save()
    }

    /// Handle one sensor callback.
    ///
    /// Returns `Ok(None)` for events the tracker does not act on: other
    /// sensor kinds, or anything delivered while not listening.
    pub fn on_sensor_event(
        &mut self,
        event: &SensorEvent,
    ) -> Result<Option<DisplayFrame>, TrackerError> {
        event.validate()?;

        if !self.listening {
            tracing::debug!(sensor = event.sensor.as_str(), "Dropped event while not listening");
            return Ok(None);
        }

        let Some(raw) = event.cumulative_steps() else {
            return Ok(None);
        };

        if raw < self.state.total_steps {
            tracing::warn!(
                raw,
                last_total = self.state.total_steps,
                policy = ?self.config.reboot_policy,
                "Cumulative step count went backwards, sensor was likely reset"
            );
            if self.config.reboot_policy == RebootPolicy::Rebaseline {
                self.state.previous_total_steps = 0;
            }
        }

        self.state.total_steps = raw;
        let current = self.state.current_steps();
        tracing::debug!(raw, current, "Step count update");

        let frame = self.display.update(current, event.timestamp);
        self.last_frame = frame.clone();
        Ok(Some(frame))
    }

    /// Handle a bare cumulative count, as delivered by the platform callback
    pub fn on_step_count(
        &mut self,
        cumulative: f64,
        at: DateTime<Utc>,
    ) -> Result<Option<DisplayFrame>, TrackerError> {
        let event = SensorEvent::step_count(at, cumulative);
        self.on_sensor_event(&event)
    }

    /// Feed a batch of events, collecting the frames they produce
    pub fn replay(&mut self, events: &[SensorEvent]) -> Result<Vec<DisplayFrame>, TrackerError> {
        let mut frames = Vec::new();
        for event in events {
            if let Some(frame) = self.on_sensor_event(event)? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// Start counting from zero at the current cumulative total.
    ///
    /// Clears the displayed values, keeps the chart history, and persists the
    /// new offset.
    pub fn reset(&mut self) -> Result<DisplayFrame, TrackerError> {
        self.state.reset();
        self.save()?;

        tracing::info!(offset = self.state.previous_total_steps, "Step count reset");

        let frame = self.display.clear();
        self.last_frame = frame.clone();
        Ok(frame)
    }

    /// Record the outcome of the activity-recognition permission prompt
    pub fn on_permission_result(&mut self, granted: bool) {
        let notice = if granted {
            Notice::PermissionGranted
        } else {
            tracing::warn!("Activity recognition permission denied");
            Notice::PermissionDenied
        };
        self.notices.push(notice);
    }

    /// Take queued notices, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Persist the current offsets
    pub fn save(&mut self) -> Result<(), TrackerError> {
        save_session(self.store.as_mut(), &self.state)
    }

    /// Replace the offsets (e.g. state handed over by the host) and redraw
    pub fn restore_state(&mut self, state: SessionState) -> DisplayFrame {
        self.state = state;
        let frame = self
            .display
            .refresh(self.state.current_steps(), FrameCause::Startup);
        self.last_frame = frame.clone();
        frame
    }

    /// Serialize the offsets to JSON
    pub fn state_json(&self) -> Result<String, TrackerError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// Load offsets from JSON and redraw
    pub fn load_state_json(&mut self, json: &str) -> Result<DisplayFrame, TrackerError> {
        let state: SessionState = serde_json::from_str(json)?;
        Ok(self.restore_state(state))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_steps(&self) -> u64 {
        self.state.current_steps()
    }

    pub fn history(&self) -> &StepHistory {
        self.display.history()
    }

    /// Most recent frame (startup frame until the first update)
    pub fn last_frame(&self) -> &DisplayFrame {
        &self.last_frame
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn sensor_available(&self) -> bool {
        self.sensor_available
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }
}
