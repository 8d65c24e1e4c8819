//! Overwrite sink: replace the whole content of a store on every write.
//!
//! Each `write` runs three steps against the store, in order:
//! 1. `truncate(0)` so no tail of a longer previous payload survives
//! 2. `seek(Start(0))` because truncation does not move the cursor
//! 3. `write(data)` from offset 0
//!
//! The sequence is not atomic. A failure after step 1 leaves the old content
//! destroyed, and the returned `SinkError` says so. There is no locking,
//! logging, retry or rollback here; wrap the sink in a `SinkWriter` when
//! several producers share one store.

use std::io::{Error as IoError, ErrorKind, SeekFrom};

use crate::config::SinkConfig;
use crate::error::SinkError;
use crate::store::ByteStore;

/// Persists the entire current value of some state to a single store.
///
/// The sink never opens or closes the store. Pass `&mut store` or `&File`
/// to keep ownership with the caller, or move the handle in and take it back
/// with `into_inner`.
#[derive(Debug)]
pub struct OverwriteSink<S> {
    store: S,
    config: SinkConfig,
}

impl<S: ByteStore> OverwriteSink<S> {
    /// Wraps an already-open store.
    pub fn new(store: S) -> Self {
        Self::with_config(store, SinkConfig::default())
    }

    /// Wraps an already-open store with a custom configuration.
    pub fn with_config(store: S, config: SinkConfig) -> Self {
        Self { store, config }
    }

    /// Replace the store's content with `data`.
    ///
    /// Returns `data.len()` on success. A short write is reported as
    /// `SinkError::WriteFailed` with `source: None`, never as success.
    ///
    /// # Errors
    /// - `TruncationFailed`: store unchanged
    /// - `RepositionFailed`: store emptied, not rewritten
    /// - `WriteFailed`: store holds a prefix of `data`
    /// - `SyncFailed`: `data` written, durability unknown (only with `sync_on_write`)
    pub fn write(&mut self, data: &[u8]) -> Result<usize, SinkError> {
        self.store
            .truncate(0)
            .map_err(|source| SinkError::TruncationFailed { source })?;

        let pos = self
            .store
            .seek(SeekFrom::Start(0))
            .map_err(|source| SinkError::RepositionFailed { source })?;
        if pos != 0 {
            return Err(SinkError::RepositionFailed {
                source: IoError::other(format!("seek to start landed at offset {pos}")),
            });
        }

        let written = self.store.write(data).map_err(|source| SinkError::WriteFailed {
            written: 0,
            expected: data.len(),
            source: Some(source),
        })?;
        if written > data.len() {
            // The store's count is untrustworthy, so claim no valid bytes.
            return Err(SinkError::WriteFailed {
                written: 0,
                expected: data.len(),
                source: Some(IoError::new(
                    ErrorKind::InvalidData,
                    format!(
                        "store reported {written} bytes written for a {}-byte payload",
                        data.len()
                    ),
                )),
            });
        }
        if written < data.len() {
            return Err(SinkError::WriteFailed {
                written,
                expected: data.len(),
                source: None,
            });
        }

        if self.config.sync_on_write {
            self.store
                .sync()
                .map_err(|source| SinkError::SyncFailed { written, source })?;
        }

        Ok(written)
    }

    /// The configuration this sink was built with.
    #[must_use]
    pub const fn config(&self) -> SinkConfig {
        self.config
    }

    /// Shared access to the store.
    pub fn get_ref(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store.
    ///
    /// Moving the cursor or writing through this handle is harmless: the next
    /// `write` truncates and rewinds first.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Unwraps the sink, handing the store back to the caller.
    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreState;
    use crate::store::MemoryStore;
    use std::io::Result as IoResult;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fault {
        Truncate,
        Seek,
        SeekElsewhere,
        Write,
        Short(usize),
        OverCount,
        Sync,
    }

    /// Memory store that fails one step of the overwrite sequence.
    #[derive(Debug)]
    struct FaultyStore {
        inner: MemoryStore,
        fault: Option<Fault>,
        syncs: usize,
    }

    impl FaultyStore {
        fn new(contents: &str, fault: Option<Fault>) -> Self {
            Self {
                inner: MemoryStore::with_contents(contents),
                fault,
                syncs: 0,
            }
        }

        fn fail(&self, fault: Fault) -> IoResult<()> {
            if self.fault == Some(fault) {
                return Err(IoError::other(format!("injected {fault:?}")));
            }
            Ok(())
        }
    }

    impl ByteStore for FaultyStore {
        fn truncate(&mut self, len: u64) -> IoResult<()> {
            self.fail(Fault::Truncate)?;
            self.inner.truncate(len)
        }

        fn seek(&mut self, pos: SeekFrom) -> IoResult<u64> {
            self.fail(Fault::Seek)?;
            if self.fault == Some(Fault::SeekElsewhere) {
                return self.inner.seek(SeekFrom::Start(3));
            }
            self.inner.seek(pos)
        }

        fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
            self.fail(Fault::Write)?;
            if let Some(Fault::Short(limit)) = self.fault {
                let n = limit.min(buf.len());
                return self.inner.write(&buf[..n]);
            }
            if self.fault == Some(Fault::OverCount) {
                return self.inner.write(buf).map(|n| n + 5);
            }
            self.inner.write(buf)
        }

        fn sync(&mut self) -> IoResult<()> {
            self.fail(Fault::Sync)?;
            self.syncs += 1;
            Ok(())
        }
    }

    #[test]
    fn test_overwrite_shorter_payload_leaves_no_tail() {
        let mut store = MemoryStore::with_contents("hello world");
        store.seek(SeekFrom::End(0)).unwrap();

        let mut sink = OverwriteSink::new(&mut store);
        assert_eq!(sink.write(b"hi").unwrap(), 2);

        assert_eq!(store.contents(), b"hi");
    }

    #[test]
    fn test_overwrite_grow_and_shrink() {
        let mut sink = OverwriteSink::new(MemoryStore::new());

        sink.write(b"short").unwrap();
        assert_eq!(sink.get_ref().contents(), b"short");

        sink.write(b"a much longer payload").unwrap();
        assert_eq!(sink.get_ref().contents(), b"a much longer payload");

        sink.write(b"tiny").unwrap();
        assert_eq!(sink.get_ref().contents(), b"tiny");
    }

    #[test]
    fn test_empty_write_on_empty_store() {
        let mut sink = OverwriteSink::new(MemoryStore::new());
        assert_eq!(sink.write(b"").unwrap(), 0);
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_empty_write_clears_store() {
        let mut sink = OverwriteSink::new(MemoryStore::with_contents("stale"));
        assert_eq!(sink.write(&[]).unwrap(), 0);
        assert!(sink.get_ref().is_empty());
    }

    #[test]
    fn test_repeated_write_is_idempotent() {
        let mut once = OverwriteSink::new(MemoryStore::with_contents("old"));
        once.write(b"state").unwrap();

        let mut twice = OverwriteSink::new(MemoryStore::with_contents("old"));
        twice.write(b"state").unwrap();
        twice.write(b"state").unwrap();

        assert_eq!(once.get_ref().contents(), twice.get_ref().contents());
    }

    #[test]
    fn test_cursor_moved_through_get_mut_is_reset() {
        let mut sink = OverwriteSink::new(MemoryStore::with_contents("abcdef"));
        sink.get_mut().seek(SeekFrom::Start(4)).unwrap();

        sink.write(b"xy").unwrap();
        assert_eq!(sink.get_ref().contents(), b"xy");
        assert_eq!(sink.get_ref().position(), 2);
    }

    #[test]
    fn test_truncation_failure_keeps_content() {
        let mut sink = OverwriteSink::new(FaultyStore::new("keep me", Some(Fault::Truncate)));

        let err = sink.write(b"new").unwrap_err();
        assert!(matches!(err, SinkError::TruncationFailed { .. }));
        assert_eq!(err.store_state(), StoreState::Unchanged);
        assert_eq!(sink.get_ref().inner.contents(), b"keep me");
    }

    #[test]
    fn test_seek_failure_reports_emptied_store() {
        let mut sink = OverwriteSink::new(FaultyStore::new("old state", Some(Fault::Seek)));

        let err = sink.write(b"new").unwrap_err();
        assert!(matches!(err, SinkError::RepositionFailed { .. }));
        assert!(err.is_data_lost());
        assert!(sink.get_ref().inner.is_empty());
    }

    #[test]
    fn test_seek_to_wrong_offset_is_reposition_failure() {
        let store = FaultyStore::new("old state", Some(Fault::SeekElsewhere));
        let mut sink = OverwriteSink::new(store);

        let err = sink.write(b"new").unwrap_err();
        assert!(matches!(err, SinkError::RepositionFailed { .. }));
        assert!(format!("{err}").contains("offset 3"));
        assert!(sink.get_ref().inner.is_empty());
    }

    #[test]
    fn test_write_error_is_propagated() {
        let mut sink = OverwriteSink::new(FaultyStore::new("old", Some(Fault::Write)));

        let err = sink.write(b"payload").unwrap_err();
        match &err {
            SinkError::WriteFailed { written, expected, source } => {
                assert_eq!(*written, 0);
                assert_eq!(*expected, 7);
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.store_state(), StoreState::Partial { valid_bytes: 0 });
    }

    #[test]
    fn test_short_write_is_not_success() {
        let store = FaultyStore::new("old content", Some(Fault::Short(3)));
        let mut sink = OverwriteSink::new(store);

        let err = sink.write(b"payload").unwrap_err();
        assert!(err.is_short_write());
        assert_eq!(err.bytes_written(), 3);
        assert_eq!(sink.get_ref().inner.contents(), b"pay");
    }

    #[test]
    fn test_over_reported_write_claims_no_valid_bytes() {
        let mut sink = OverwriteSink::new(FaultyStore::new("old", Some(Fault::OverCount)));

        let err = sink.write(b"payload").unwrap_err();
        assert!(!err.is_short_write());
        assert_eq!(err.store_state(), StoreState::Partial { valid_bytes: 0 });
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("12 bytes written for a 7-byte payload"));
    }

    #[test]
    fn test_retry_after_failure_repairs_store() {
        let mut sink = OverwriteSink::new(FaultyStore::new("old", Some(Fault::Seek)));
        assert!(sink.write(b"state").is_err());

        sink.get_mut().fault = None;
        assert_eq!(sink.write(b"state").unwrap(), 5);
        assert_eq!(sink.get_ref().inner.contents(), b"state");
    }

    #[test]
    fn test_sync_only_when_configured() {
        let mut sink = OverwriteSink::new(FaultyStore::new("", None));
        sink.write(b"a").unwrap();
        assert_eq!(sink.get_ref().syncs, 0);

        let config = SinkConfig::default().with_sync_on_write(true);
        let mut sink = OverwriteSink::with_config(FaultyStore::new("", None), config);
        sink.write(b"a").unwrap();
        sink.write(b"b").unwrap();
        assert_eq!(sink.get_ref().syncs, 2);
        assert!(sink.config().sync_on_write);
    }

    #[test]
    fn test_sync_failure_after_full_write() {
        let config = SinkConfig::default().with_sync_on_write(true);
        let store = FaultyStore::new("old", Some(Fault::Sync));
        let mut sink = OverwriteSink::with_config(store, config);

        let err = sink.write(b"fresh").unwrap_err();
        assert_eq!(err.store_state(), StoreState::Unsynced);
        assert_eq!(err.bytes_written(), 5);
        assert_eq!(sink.get_ref().inner.contents(), b"fresh");
    }
}
