/// In-memory tail of recent log lines, shown in the interactive panel
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogEntry {
    /// Milliseconds since the logger started
    pub timestamp: u64,
    pub level: String,
    pub message: String,
    pub module: Option<String>,
}

pub struct LogBuffer {
    buffer: Mutex<VecDeque<LogEntry>>,
    capacity: AtomicUsize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: AtomicUsize::new(capacity),
        }
    }

    /// Change how many lines are kept, dropping the oldest if shrinking
    pub fn set_capacity(&self, capacity: usize) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        self.capacity.store(capacity, Ordering::Relaxed);
        while buffer.len() > capacity {
            buffer.pop_front();
        }
    }

    pub fn push(&self, entry: LogEntry) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let capacity = self.capacity.load(Ordering::Relaxed);
        if capacity == 0 {
            return;
        }
        while buffer.len() >= capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry);
    }

    /// Newest `count` entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<LogEntry> {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = buffer.len().saturating_sub(count);
        buffer.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static LOG_BUFFER: OnceLock<Arc<LogBuffer>> = OnceLock::new();

/// Install the process-wide buffer; later calls return the first one
pub fn init(capacity: usize) -> Arc<LogBuffer> {
    LOG_BUFFER.get_or_init(|| Arc::new(LogBuffer::new(capacity))).clone()
}

pub fn global() -> Option<Arc<LogBuffer>> {
    LOG_BUFFER.get().cloned()
}

pub fn append(level: &str, module: Option<&str>, message: &str, timestamp: u64) {
    if let Some(buffer) = LOG_BUFFER.get() {
        buffer.push(LogEntry {
            timestamp,
            level: level.trim().to_string(),
            message: message.to_string(),
            module: module.map(str::to_string),
        });
    }
}
