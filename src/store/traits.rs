//! Capability trait for truncatable, seekable byte stores.

use std::io::{Result as IoResult, SeekFrom};

/// A persistent, seekable, truncatable byte store.
///
/// Implementations are plain handles: they must not open, close or lock
/// anything on their own. Every method maps onto one primitive operation
/// of the underlying medium.
pub trait ByteStore {
    /// Set the logical size of the store. `truncate(0)` discards all content.
    ///
    /// Truncation does not have to move the cursor.
    fn truncate(&mut self, len: u64) -> IoResult<()>;

    /// Reposition the cursor, returning the new offset from the start.
    fn seek(&mut self, pos: SeekFrom) -> IoResult<u64>;

    /// Write bytes at the cursor and advance it.
    ///
    /// May write fewer bytes than requested without returning an error.
    fn write(&mut self, buf: &[u8]) -> IoResult<usize>;

    /// Flush written bytes to durable media.
    fn sync(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl<S: ByteStore + ?Sized> ByteStore for &mut S {
    fn truncate(&mut self, len: u64) -> IoResult<()> {
        (**self).truncate(len)
    }

    fn seek(&mut self, pos: SeekFrom) -> IoResult<u64> {
        (**self).seek(pos)
    }

    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        (**self).write(buf)
    }

    fn sync(&mut self) -> IoResult<()> {
        (**self).sync()
    }
}

impl<S: ByteStore + ?Sized> ByteStore for Box<S> {
    fn truncate(&mut self, len: u64) -> IoResult<()> {
        (**self).truncate(len)
    }

    fn seek(&mut self, pos: SeekFrom) -> IoResult<u64> {
        (**self).seek(pos)
    }

    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        (**self).write(buf)
    }

    fn sync(&mut self) -> IoResult<()> {
        (**self).sync()
    }
}
