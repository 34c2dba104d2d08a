//! Derived step metrics
//!
//! Distance, calorie and goal-progress estimates computed from the
//! session-relative step count, plus the fixed-precision text shown in the
//! screen's text fields.

use crate::config::TrackerConfig;
use serde::{Deserialize, Serialize};

/// Estimates derived from one step count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    /// Session-relative steps
    pub steps: u64,
    /// Distance walked (km)
    pub distance_km: f64,
    /// Energy burned (kcal)
    pub calories_kcal: f64,
    /// Progress toward the daily goal (0-100)
    pub progress_percent: u8,
}

impl StepMetrics {
    /// Derive all metrics for `steps` under `config`
    pub fn derive(steps: u64, config: &TrackerConfig) -> Self {
        Self {
            steps,
            distance_km: distance_km(steps, config.stride_length_m),
            calories_kcal: calories_kcal(steps, config.kcal_per_step_per_kg, config.weight_kg),
            progress_percent: progress_percent(steps, config.daily_goal),
        }
    }

    /// All-zero metrics shown right after a reset
    pub fn zero() -> Self {
        Self {
            steps: 0,
            distance_km: 0.0,
            calories_kcal: 0.0,
            progress_percent: 0,
        }
    }

    pub fn steps_text(&self) -> String {
        format!("Steps: {}", self.steps)
    }

    pub fn distance_text(&self) -> String {
        format!("Distance: {:.2} km", self.distance_km)
    }

    pub fn calories_text(&self) -> String {
        format!("Calories: {:.1} kcal", self.calories_kcal)
    }
}

/// Distance in km: steps × stride (m) / 1000
pub fn distance_km(steps: u64, stride_length_m: f64) -> f64 {
    steps as f64 * stride_length_m / 1000.0
}

/// Calories in kcal: steps × coefficient × weight
pub fn calories_kcal(steps: u64, kcal_per_step_per_kg: f64, weight_kg: f64) -> f64 {
    steps as f64 * kcal_per_step_per_kg * weight_kg
}

/// Goal progress, rounded to the nearest percent and capped at 100.
///
/// A zero goal counts as already met.
pub fn progress_percent(steps: u64, daily_goal: u64) -> u8 {
    if daily_goal == 0 {
        return 100;
    }
    let percent = (steps as f64 / daily_goal as f64 * 100.0).round();
    percent.min(100.0) as u8
}
