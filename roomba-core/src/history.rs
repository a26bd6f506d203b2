/// Bounded battery-charge history shown as a line chart
use std::collections::VecDeque;

use serde::Serialize;

use crate::config::{Eviction, HistoryConfig};

#[derive(Debug, Clone, Serialize)]
pub struct BatteryHistory {
    points: VecDeque<f64>,
    readings_seen: u64,
    resets: u32,
    #[serde(skip)]
    config: HistoryConfig,
}

impl BatteryHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            points: VecDeque::with_capacity(config.capacity + 1),
            readings_seen: 0,
            resets: 0,
            config,
        }
    }

    /// Offer one battery percentage reading. Only every `sample_every`-th reading
    /// becomes a history point; returns whether this one did.
    pub fn record(&mut self, percent: f64) -> bool {
        self.readings_seen += 1;
        if self.readings_seen % self.config.sample_every.max(1) as u64 != 0 {
            return false;
        }

        self.points.push_back(percent);
        match self.config.eviction {
            // A chart that fills up is wiped; the next point starts a new one
            Eviction::Reset if self.points.len() >= self.config.capacity => {
                self.points.clear();
                self.resets += 1;
            }
            Eviction::Sliding if self.points.len() > self.config.capacity => {
                self.points.pop_front();
            }
            _ => {}
        }
        true
    }

    /// Points oldest to newest
    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// How many times a full chart was discarded under the reset policy
    pub fn resets(&self) -> u32 {
        self.resets
    }

}

impl Default for BatteryHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sample_every: u32, capacity: usize, eviction: Eviction) -> HistoryConfig {
        HistoryConfig { sample_every, capacity, eviction }
    }

    #[test]
    fn test_sampling_cadence() {
        let mut history = BatteryHistory::new(config(3, 10, Eviction::Reset));

        assert!(!history.record(10.0));
        assert!(!history.record(11.0));
        assert!(history.record(12.0));
        assert_eq!(history.points().collect::<Vec<_>>(), vec![12.0]);
    }

    #[test]
    fn test_reset_when_capacity_reached() {
        let mut history = BatteryHistory::new(config(1, 3, Eviction::Reset));
        for value in [1.0, 2.0] {
            history.record(value);
        }
        assert_eq!(history.len(), 2);

        history.record(3.0);
        assert!(history.is_empty());
        assert_eq!(history.resets(), 1);

        history.record(4.0);
        assert_eq!(history.points().collect::<Vec<_>>(), vec![4.0]);
    }

    #[test]
    fn test_sliding_window_evicts_oldest() {
        let mut history = BatteryHistory::new(config(1, 3, Eviction::Sliding));
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            history.record(value);
        }
        assert_eq!(history.points().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(history.resets(), 0);
    }

    #[test]
    fn test_default_wipes_chart_at_reading_1200() {
        // 20 readings per point; the 60th point empties the chart
        let mut history = BatteryHistory::default();
        for i in 1..1200 {
            history.record(i as f64);
        }
        assert_eq!(history.len(), 59);
        assert_eq!(history.latest(), Some(1180.0));

        history.record(1200.0);
        assert!(history.is_empty());
        assert_eq!(history.resets(), 1);

        for i in 1201..=1220 {
            history.record(i as f64);
        }
        assert_eq!(history.points().collect::<Vec<_>>(), vec![1220.0]);
    }
}
