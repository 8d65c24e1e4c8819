//! Error types for rewind.
//!
//! All errors are strongly typed using thiserror. Sink failures carry enough
//! information for the caller to know what the store holds afterwards, since
//! the sink itself never retries or rolls back.

use std::io;

use thiserror::Error;

/// What the store holds after a failed overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Nothing was touched; the previous content is still in place.
    Unchanged,
    /// The store was truncated to zero length but never rewritten.
    Emptied,
    /// The store holds the first `valid_bytes` bytes of the new payload and nothing else.
    Partial {
        /// Number of leading payload bytes the store acknowledged.
        valid_bytes: usize,
    },
    /// The payload was fully written but could not be flushed to durable media.
    Unsynced,
}

/// Failures of a single `OverwriteSink::write` call.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Truncation failed; the store is unchanged.
    #[error("failed to truncate store: {source}")]
    TruncationFailed {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The store was emptied but the cursor could not be moved to the start.
    #[error("store truncated but cursor could not be reset: {source}")]
    RepositionFailed {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The write failed or was short; the store holds a prefix of the payload.
    #[error("write failed after {written} of {expected} bytes")]
    WriteFailed {
        /// Bytes the store acknowledged.
        written: usize,
        /// Length of the payload.
        expected: usize,
        /// `None` for a short write the store did not report as an error.
        #[source]
        source: Option<io::Error>,
    },

    /// The payload was written but could not be synced.
    #[error("{written} bytes written but sync failed: {source}")]
    SyncFailed {
        /// Bytes written before the sync.
        written: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    /// Returns the state the store was left in.
    #[must_use]
    pub const fn store_state(&self) -> StoreState {
        match self {
            Self::TruncationFailed { .. } => StoreState::Unchanged,
            Self::RepositionFailed { .. } => StoreState::Emptied,
            Self::WriteFailed { written, expected, .. } => StoreState::Partial {
                valid_bytes: if *written < *expected { *written } else { *expected },
            },
            Self::SyncFailed { .. } => StoreState::Unsynced,
        }
    }

    /// Number of payload bytes the store acknowledged before the failure.
    #[must_use]
    pub const fn bytes_written(&self) -> usize {
        match self {
            Self::WriteFailed { written, .. } | Self::SyncFailed { written, .. } => *written,
            Self::TruncationFailed { .. } | Self::RepositionFailed { .. } => 0,
        }
    }

    /// Returns true if the previous content was destroyed without being replaced.
    ///
    /// The caller must re-persist from its in-memory source of truth.
    #[must_use]
    pub const fn is_data_lost(&self) -> bool {
        matches!(self, Self::RepositionFailed { .. } | Self::WriteFailed { .. })
    }

    /// Returns true if this is a short write rather than a reported I/O error.
    #[must_use]
    pub const fn is_short_write(&self) -> bool {
        matches!(self, Self::WriteFailed { source: None, .. })
    }

    /// Returns true if calling `write` again with the same payload is safe.
    ///
    /// The payload is caller-owned and never consumed, so every sink failure is
    /// retryable; whether a retry can succeed depends on the store.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        true
    }
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting is too small.
    #[error("{field} must be at least {min} (got {actual})")]
    BelowMinimum {
        /// Name of the setting.
        field: &'static str,
        /// Smallest accepted value.
        min: u64,
        /// Value that was given.
        actual: u64,
    },

    /// A numeric setting is too large.
    #[error("{field} must be at most {max} (got {actual})")]
    AboveMaximum {
        /// Name of the setting.
        field: &'static str,
        /// Largest accepted value.
        max: u64,
        /// Value that was given.
        actual: u64,
    },

    /// A text setting is blank.
    #[error("{field} cannot be empty")]
    Empty {
        /// Name of the setting.
        field: &'static str,
    },
}

/// Failures while saving or loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The value could not be serialized.
    #[error("failed to encode snapshot: {message}")]
    Encode {
        /// Serializer message.
        message: String,
    },

    /// The store does not hold a valid snapshot frame.
    #[error("snapshot is corrupted: {source}")]
    Corrupted {
        /// Decoding error.
        #[source]
        source: io::Error,
    },

    /// The store could not be read.
    #[error("failed to read snapshot from store: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Failures of the queue-fed writer task.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The queue already holds `capacity` requests.
    #[error("write queue is full (capacity: {capacity})")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// The writer thread is gone.
    #[error("writer task has shut down")]
    Disconnected,

    /// No result arrived in time; the request is still queued.
    #[error("write did not complete within {duration_ms}ms")]
    Timeout {
        /// How long the caller waited.
        duration_ms: u64,
    },

    /// The writer thread could not be started.
    #[error("failed to spawn writer thread: {source}")]
    Spawn {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The writer thread panicked before returning the store.
    #[error("writer thread panicked")]
    Panicked,
}

/// Top-level error type for rewind.
#[derive(Debug, Error)]
pub enum RewindError {
    /// An overwrite failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Snapshot encode or load failure.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Writer task failure.
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

impl RewindError {
    /// Returns the underlying sink error, if any.
    #[must_use]
    pub const fn as_sink(&self) -> Option<&SinkError> {
        match self {
            Self::Sink(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the store's previous content may have been destroyed.
    #[must_use]
    pub const fn is_data_lost(&self) -> bool {
        match self {
            Self::Sink(err) => err.is_data_lost(),
            _ => false,
        }
    }

    /// Returns true if the failed operation may be retried as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Sink(err) => err.is_retryable(),
            Self::Worker(err) => {
                matches!(err, WorkerError::QueueFull { .. } | WorkerError::Timeout { .. })
            }
            Self::Config(_) | Self::Snapshot(_) => false,
        }
    }
}

/// Result type alias for rewind operations.
pub type RewindResult<T> = Result<T, RewindError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err(msg: &str) -> io::Error {
        io::Error::other(msg.to_string())
    }

    #[test]
    fn test_truncation_failure_leaves_store_unchanged() {
        let err = SinkError::TruncationFailed { source: io_err("read-only") };
        assert_eq!(err.store_state(), StoreState::Unchanged);
        assert!(!err.is_data_lost());
        assert_eq!(err.bytes_written(), 0);
        assert!(format!("{err}").contains("read-only"));
    }

    #[test]
    fn test_reposition_failure_is_data_loss() {
        let err = SinkError::RepositionFailed { source: io_err("bad fd") };
        assert_eq!(err.store_state(), StoreState::Emptied);
        assert!(err.is_data_lost());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_short_write_reports_partial_count() {
        let err = SinkError::WriteFailed {
            written: 3,
            expected: 10,
            source: None,
        };
        assert_eq!(err.store_state(), StoreState::Partial { valid_bytes: 3 });
        assert!(err.is_short_write());
        assert!(err.is_data_lost());
        let msg = format!("{err}");
        assert!(msg.contains("3 of 10"));
    }

    #[test]
    fn test_partial_state_never_exceeds_payload() {
        let err = SinkError::WriteFailed {
            written: 12,
            expected: 7,
            source: None,
        };
        assert_eq!(err.store_state(), StoreState::Partial { valid_bytes: 7 });
    }

    #[test]
    fn test_write_error_is_not_short_write() {
        let err = SinkError::WriteFailed {
            written: 0,
            expected: 4,
            source: Some(io_err("disk full")),
        };
        assert!(!err.is_short_write());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_sync_failure_keeps_payload() {
        let err = SinkError::SyncFailed {
            written: 12,
            source: io_err("eio"),
        };
        assert_eq!(err.store_state(), StoreState::Unsynced);
        assert_eq!(err.bytes_written(), 12);
        assert!(!err.is_data_lost());
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::BelowMinimum {
            field: "queue_capacity",
            min: 1,
            actual: 0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("queue_capacity"));
        assert!(msg.contains("at least 1"));
    }

    #[test]
    fn test_rewind_error_from_sink() {
        let err: RewindError = SinkError::RepositionFailed { source: io_err("x") }.into();
        assert!(err.as_sink().is_some());
        assert!(err.is_data_lost());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_rewind_error_retryable() {
        let full: RewindError = WorkerError::QueueFull { capacity: 4 }.into();
        assert!(full.is_retryable());

        let gone: RewindError = WorkerError::Disconnected.into();
        assert!(!gone.is_retryable());

        let cfg: RewindError = ConfigError::Empty { field: "thread_name" }.into();
        assert!(!cfg.is_retryable());
        assert!(cfg.as_sink().is_none());
    }
}
