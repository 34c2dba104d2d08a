//! Bounded step history
//!
//! Keeps the most recent step readings for the chart. The sequence is FIFO:
//! once it grows past its capacity the oldest entry is dropped, and the order
//! of what remains never changes.

use crate::config::{ChartKind, DEFAULT_HISTORY_CAPACITY};
use crate::types::{ChartPoint, ChartSeries, HistoryEntry};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Dataset label shown in the chart legend
pub const SERIES_LABEL: &str = "Steps";

/// Chart description text
pub const CHART_DESCRIPTION: &str = "Step Tracking History";

/// Fixed-capacity history of step readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for StepHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl StepHistory {
    /// Create an empty history holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY) + 1),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when over capacity.
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Build the chart dataset. Points are indexed by position so the x axis
    /// always runs 0..len regardless of how many entries were evicted.
    pub fn to_series(&self, kind: ChartKind) -> ChartSeries {
        let points = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| ChartPoint {
                x: i as u32,
                y: entry.steps,
                label: entry.label.clone(),
            })
            .collect();

        ChartSeries {
            label: SERIES_LABEL.to_string(),
            description: CHART_DESCRIPTION.to_string(),
            kind,
            points,
        }
    }

    /// Load history from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize history to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn entry(steps: u64) -> HistoryEntry {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 8, steps as u32 % 60, 0).unwrap();
        HistoryEntry {
            label: at.format("%H:%M").to_string(),
            steps,
            recorded_at: at,
        }
    }

    #[test]
    fn test_push_within_capacity() {
        let mut history = StepHistory::new(7);
        for i in 0..7 {
            assert!(history.push(entry(i)).is_none());
        }
        assert_eq!(history.len(), 7);
    }

    #[test]
    fn test_large_capacity_allocates_lazily() {
        let mut history = StepHistory::new(usize::MAX / 2);
        assert!(history.is_empty());
        assert!(history.push(entry(1)).is_none());
        assert_eq!(history.capacity(), usize::MAX / 2);
    }

    #[test]
    fn test_eighth_push_evicts_first() {
        let mut history = StepHistory::new(7);
        for i in 1..=7 {
            history.push(entry(i * 100));
        }

        let evicted = history.push(entry(800)).unwrap();
        assert_eq!(evicted.steps, 100);
        assert_eq!(history.len(), 7);

        let steps: Vec<u64> = history.iter().map(|e| e.steps).collect();
        assert_eq!(steps, vec![200, 300, 400, 500, 600, 700, 800]);
    }

    #[test]
    fn test_series_reindexes_points() {
        let mut history = StepHistory::new(3);
        for i in 1..=5 {
            history.push(entry(i));
        }

        let series = history.to_series(ChartKind::Bar);
        assert_eq!(series.label, "Steps");
        assert_eq!(series.kind, ChartKind::Bar);
        let xs: Vec<u32> = series.points.iter().map(|p| p.x).collect();
        let ys: Vec<u64> = series.points.iter().map(|p| p.y).collect();
        assert_eq!(xs, vec![0, 1, 2]);
        assert_eq!(ys, vec![3, 4, 5]);
        assert_eq!(series.points[0].label, "08:03");
    }

    #[test]
    fn test_latest() {
        let mut history = StepHistory::default();
        assert!(history.latest().is_none());
        history.push(entry(10));
        history.push(entry(20));
        assert_eq!(history.latest().unwrap().steps, 20);
    }

    #[test]
    fn test_serialization() {
        let mut history = StepHistory::new(4);
        history.push(entry(42));

        let json = history.to_json().unwrap();
        let loaded = StepHistory::from_json(&json).unwrap();

        assert_eq!(loaded.capacity(), 4);
        assert_eq!(loaded.latest().unwrap().steps, 42);
    }

    proptest! {
        #[test]
        fn prop_length_bounded_and_order_preserved(
            values in proptest::collection::vec(0u64..100_000, 0..50),
            capacity in 1usize..12,
        ) {
            let mut history = StepHistory::new(capacity);
            for v in &values {
                history.push(entry(*v));
                prop_assert!(history.len() <= capacity);
            }

            let kept: Vec<u64> = history.iter().map(|e| e.steps).collect();
            let start = values.len().saturating_sub(capacity);
            prop_assert_eq!(kept, values[start..].to_vec());
        }
    }
}
