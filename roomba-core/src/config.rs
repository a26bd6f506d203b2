/// Configuration structures that can be tested independently
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::commands::MAX_VELOCITY;
use crate::groups;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DashConfig {
    pub poll: PollConfig,
    pub drive: DriveConfig,
    pub history: HistoryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollConfig {
    pub interactive_period_ms: u64,
    pub headless_period_ms: u64,
    pub groups: Vec<u8>,
    /// How long a group read may wait for the robot's reply
    pub read_timeout_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interactive_period_ms: 300,
            headless_period_ms: 1000,
            groups: groups::DEFAULT_POLL_GROUPS.to_vec(),
            read_timeout_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriveConfig {
    pub speed_mm_s: i16,
    pub turn_speed_mm_s: i16,
    pub auto_stop_ms: u64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            speed_mm_s: 100,
            turn_speed_mm_s: 50,
            auto_stop_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Eviction {
    /// Discard the whole chart once it overflows
    Reset,
    /// Drop the oldest point
    Sliding,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Battery readings per history point
    pub sample_every: u32,
    pub capacity: usize,
    pub eviction: Eviction,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            sample_every: 20,
            capacity: 60,
            eviction: Eviction::Reset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub buffer_lines: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            buffer_lines: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl DashConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.interactive_period_ms == 0 {
            return Err(ConfigError::new("poll.interactive_period_ms", "must be non-zero"));
        }
        if self.poll.headless_period_ms == 0 {
            return Err(ConfigError::new("poll.headless_period_ms", "must be non-zero"));
        }
        if self.poll.read_timeout_ms == 0 {
            return Err(ConfigError::new("poll.read_timeout_ms", "must be non-zero"));
        }
        if self.poll.groups.is_empty() {
            return Err(ConfigError::new("poll.groups", "at least one group is required"));
        }
        if let Some(&bad) = self.poll.groups.iter().find(|&&g| groups::lookup(g).is_none()) {
            return Err(ConfigError::new("poll.groups", format!("unknown sensor group {}", bad)));
        }

        for (field, speed) in [
            ("drive.speed_mm_s", self.drive.speed_mm_s),
            ("drive.turn_speed_mm_s", self.drive.turn_speed_mm_s),
        ] {
            if !(0..=MAX_VELOCITY).contains(&speed) {
                return Err(ConfigError::new(field, format!("{} outside 0..={}", speed, MAX_VELOCITY)));
            }
        }
        if self.drive.auto_stop_ms == 0 {
            return Err(ConfigError::new("drive.auto_stop_ms", "must be non-zero"));
        }

        if self.history.capacity == 0 {
            return Err(ConfigError::new("history.capacity", "must be non-zero"));
        }
        if self.history.sample_every == 0 {
            return Err(ConfigError::new("history.sample_every", "must be non-zero"));
        }
        Ok(())
    }
}
