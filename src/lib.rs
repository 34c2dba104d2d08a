//! Fitness Tracker - On-device step tracking core
//!
//! Turns the platform's cumulative step-counter readings into what a single
//! activity screen shows: steps since the last reset, distance and calorie
//! estimates, progress toward a daily goal, and a short chart history.
//!
//! Flow: sensor event → session offset (tracker) → metrics → display frame.
//! The session offsets persist through a flat key-value store.

pub mod config;
pub mod display;
pub mod error;
pub mod history;
pub mod metrics;
pub mod sensor;
pub mod store;
pub mod tracker;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{ChartKind, RebootPolicy, TrackerConfig, WidgetFlags};
pub use error::TrackerError;
pub use tracker::{replay_ndjson, StepTracker};
pub use types::{DisplayFrame, Notice, SessionState};

// Sensor schema exports
pub use sensor::{SensorEvent, SensorEventReader, SCHEMA_VERSION};

/// Library version embedded in reports
pub const TRACKER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "fitness-tracker";
