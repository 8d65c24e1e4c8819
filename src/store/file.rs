//! `ByteStore` for regular files.

use std::fs::{File, OpenOptions};
use std::io::{self, Result as IoResult, SeekFrom};
use std::path::Path;

use super::ByteStore;

impl ByteStore for File {
    fn truncate(&mut self, len: u64) -> IoResult<()> {
        self.set_len(len)
    }

    fn seek(&mut self, pos: SeekFrom) -> IoResult<u64> {
        io::Seek::seek(self, pos)
    }

    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        io::Write::write(self, buf)
    }

    fn sync(&mut self) -> IoResult<()> {
        self.sync_all()
    }
}

/// Shared handle: several owners may hold `&File` to the same open file.
impl ByteStore for &File {
    fn truncate(&mut self, len: u64) -> IoResult<()> {
        self.set_len(len)
    }

    fn seek(&mut self, pos: SeekFrom) -> IoResult<u64> {
        io::Seek::seek(self, pos)
    }

    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        io::Write::write(self, buf)
    }

    fn sync(&mut self) -> IoResult<()> {
        self.sync_all()
    }
}

/// Open (or create) a file for use as a byte store.
///
/// Existing content is left in place; the first sink write replaces it.
/// The returned handle belongs to the caller, who closes it by dropping it.
///
/// # Errors
/// - `ErrorKind::NotFound` if the parent directory does not exist
/// - `ErrorKind::PermissionDenied` if we don't have read/write access
pub fn open_file_store(path: impl AsRef<Path>) -> IoResult<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}
