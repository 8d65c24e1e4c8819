//! In-memory byte store.
//!
//! Behaves like a regular file: truncation leaves the cursor where it was,
//! and writing past the end zero-fills the gap. That makes it a faithful
//! stand-in for files in tests, including the stale-cursor hazard.

use std::io::{self, Error as IoError, ErrorKind, Read, Result as IoResult, SeekFrom};

use super::ByteStore;

fn to_index(offset: u64) -> IoResult<usize> {
    usize::try_from(offset).map_err(|_| {
        IoError::new(
            ErrorKind::InvalidInput,
            format!("offset {offset} does not fit in memory"),
        )
    })
}

/// Growable, truncatable in-memory buffer with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    data: Vec<u8>,
    pos: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `data`, with the cursor at the start.
    #[must_use]
    pub fn with_contents(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Current content.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Current cursor offset.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.pos
    }

    /// Current content length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the store, returning its content.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteStore for MemoryStore {
    fn truncate(&mut self, len: u64) -> IoResult<()> {
        let len = to_index(len)?;
        self.data.resize(len, 0);
        Ok(())
    }

    fn seek(&mut self, pos: SeekFrom) -> IoResult<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(offset) => (self.data.len() as u64, offset),
            SeekFrom::Current(offset) => (self.pos, offset),
        };

        match base.checked_add_signed(offset) {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(IoError::new(
                ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }

    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        let start = to_index(self.pos)?;
        let end = start.checked_add(buf.len()).ok_or_else(|| {
            IoError::new(ErrorKind::InvalidInput, "write would overflow the store")
        })?;

        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(buf);
        self.pos = end as u64;

        Ok(buf.len())
    }
}

impl Read for MemoryStore {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let start = to_index(self.pos)?.min(self.data.len());
        let remaining = &self.data[start..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n as u64;
        Ok(n)
    }
}
