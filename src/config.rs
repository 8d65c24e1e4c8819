//! Configuration for sinks, snapshot tapes and the writer task.

use crate::error::ConfigError;

/// Configuration for an `OverwriteSink`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkConfig {
    /// Whether to sync the store after every complete write (slower but durable).
    pub sync_on_write: bool,
}

impl SinkConfig {
    /// Returns a copy with `sync_on_write` set.
    #[must_use]
    pub const fn with_sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }
}

/// Configuration for a `SnapshotTape`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Largest encoded payload accepted when loading (bytes).
    pub max_snapshot_size: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_snapshot_size: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl SnapshotConfig {
    pub(crate) const MIN_SNAPSHOT_SIZE: usize = 64;

    /// Checks the size limit, returning the config unchanged if it is usable.
    ///
    /// # Errors
    /// `BelowMinimum` if `max_snapshot_size` is under 64 bytes.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_snapshot_size < Self::MIN_SNAPSHOT_SIZE {
            return Err(ConfigError::BelowMinimum {
                field: "max_snapshot_size",
                min: Self::MIN_SNAPSHOT_SIZE as u64,
                actual: self.max_snapshot_size as u64,
            });
        }
        Ok(self)
    }
}

/// Configuration for a `SinkWriter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Maximum queued write requests.
    pub queue_capacity: usize,
    /// Name of the owning thread.
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            thread_name: "rewind-writer".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Largest accepted `queue_capacity`.
    pub const MAX_QUEUE_CAPACITY: usize = 65_536;

    /// Checks queue bounds and the thread name.
    ///
    /// # Errors
    /// `BelowMinimum`/`AboveMaximum` for the capacity, `Empty` for a blank name.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::BelowMinimum {
                field: "queue_capacity",
                min: 1,
                actual: 0,
            });
        }

        if self.queue_capacity > Self::MAX_QUEUE_CAPACITY {
            return Err(ConfigError::AboveMaximum {
                field: "queue_capacity",
                max: Self::MAX_QUEUE_CAPACITY as u64,
                actual: self.queue_capacity as u64,
            });
        }

        if self.thread_name.trim().is_empty() {
            return Err(ConfigError::Empty { field: "thread_name" });
        }

        Ok(self)
    }
}
