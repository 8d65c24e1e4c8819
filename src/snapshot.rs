//! Snapshot tape: persist a serializable state value through an overwrite sink.
//!
//! Every `save` encodes the whole value into one checksummed frame and hands it
//! to `OverwriteSink::write`, so the store always holds at most one snapshot.
//! `load` reads the store back and verifies the frame.

use std::io::{Error as IoError, ErrorKind, Read, SeekFrom};
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::codec;
use crate::config::SnapshotConfig;
use crate::error::{RewindResult, SnapshotError};
use crate::sink::OverwriteSink;
use crate::store::ByteStore;

/// Saves and loads whole values of `T` through a single store.
#[derive(Debug)]
pub struct SnapshotTape<S, T> {
    sink: OverwriteSink<S>,
    config: SnapshotConfig,
    _value: PhantomData<fn() -> T>,
}

impl<S: ByteStore, T> SnapshotTape<S, T> {
    /// Wraps `sink` with the default size limit.
    pub fn new(sink: OverwriteSink<S>) -> Self {
        Self {
            sink,
            config: SnapshotConfig::default(),
            _value: PhantomData,
        }
    }

    /// Wraps `sink` with a custom configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` if `config` is invalid.
    pub fn with_config(sink: OverwriteSink<S>, config: SnapshotConfig) -> RewindResult<Self> {
        Ok(Self {
            sink,
            config: config.validate()?,
            _value: PhantomData,
        })
    }

    /// The underlying sink.
    pub fn sink(&self) -> &OverwriteSink<S> {
        &self.sink
    }

    /// Unwraps the tape, returning the sink.
    pub fn into_sink(self) -> OverwriteSink<S> {
        self.sink
    }
}

impl<S: ByteStore, T: Serialize> SnapshotTape<S, T> {
    /// Replace the stored snapshot with `value`.
    ///
    /// Returns the number of bytes written (frame included).
    pub fn save(&mut self, value: &T) -> RewindResult<usize> {
        let frame = codec::encode(value).map_err(|e| SnapshotError::Encode {
            message: e.to_string(),
        })?;

        match self.sink.write(&frame) {
            Ok(written) => {
                debug!(bytes = written, "snapshot saved");
                Ok(written)
            }
            Err(err) => {
                warn!(error = %err, state = ?err.store_state(), "snapshot save failed");
                Err(err.into())
            }
        }
    }
}

impl<S: ByteStore + Read, T: DeserializeOwned> SnapshotTape<S, T> {
    /// Read the stored snapshot.
    ///
    /// Returns `Ok(None)` when the store is empty, which is the state of a new
    /// store and of one whose last save failed after truncation.
    pub fn load(&mut self) -> RewindResult<Option<T>> {
        let store = self.sink.get_mut();
        store
            .seek(SeekFrom::Start(0))
            .map_err(|source| SnapshotError::Read { source })?;

        // One byte past the largest valid frame is enough to spot an oversized store.
        let max = self.config.max_snapshot_size;
        let max_frame = max.saturating_add(codec::FRAME_OVERHEAD);
        let limit = u64::try_from(max_frame).unwrap_or(u64::MAX).saturating_add(1);

        let mut bytes = Vec::new();
        Read::take(store, limit)
            .read_to_end(&mut bytes)
            .map_err(|source| SnapshotError::Read { source })?;

        if bytes.is_empty() {
            debug!("snapshot store is empty");
            return Ok(None);
        }

        if bytes.len() > max_frame {
            warn!(limit = max_frame, "stored snapshot is larger than the size limit");
            return Err(SnapshotError::Corrupted {
                source: IoError::new(
                    ErrorKind::InvalidData,
                    format!(
                        "store holds more than {max_frame} bytes, snapshot exceeds maximum {max}"
                    ),
                ),
            }
            .into());
        }

        let value = codec::decode(&bytes, max).map_err(|source| {
            warn!(bytes = bytes.len(), error = %source, "stored snapshot is corrupted");
            SnapshotError::Corrupted { source }
        })?;

        debug!(bytes = bytes.len(), "snapshot loaded");
        Ok(Some(value))
    }
}
