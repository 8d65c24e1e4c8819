//! Binary frame for snapshots.
//!
//! A snapshot is a single frame that fills the whole store:
//! - Magic bytes and a version byte to identify the content
//! - Length prefix for the JSON payload
//! - CRC32 checksum for corruption detection
//!
//! ```text
//! [magic: 4 bytes "RWND"][version: 1 byte][length: 4 bytes LE]
//! [data: N bytes JSON][crc32: 4 bytes LE]
//! ```

use std::io::{Error as IoError, ErrorKind, Result as IoResult};

use crc32fast::Hasher;
use serde::{de::DeserializeOwned, Serialize};

/// Current frame version.
pub const FRAME_VERSION: u8 = 1;

/// Magic bytes to identify snapshot files.
pub const MAGIC: [u8; 4] = *b"RWND";

/// Bytes of framing around the payload.
pub const FRAME_OVERHEAD: usize = MAGIC.len() + 1 + 4 + 4;

fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn invalid(message: String) -> IoError {
    IoError::new(ErrorKind::InvalidData, message)
}

/// Serializes a value into one complete frame.
pub fn encode<T: Serialize>(value: &T) -> IoResult<Vec<u8>> {
    let data = serde_json::to_vec(value)
        .map_err(|e| invalid(format!("serialization failed: {e}")))?;

    let len = u32::try_from(data.len()).map_err(|_| {
        invalid(format!("payload of {} bytes exceeds u32 length prefix", data.len()))
    })?;

    let mut out = Vec::with_capacity(FRAME_OVERHEAD + data.len());
    out.extend_from_slice(&MAGIC);
    out.push(FRAME_VERSION);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&data);
    out.extend_from_slice(&checksum(&data).to_le_bytes());

    Ok(out)
}

/// Deserializes a value from a complete frame, verifying the checksum.
///
/// The frame must span all of `bytes`; anything after the checksum is an error,
/// since a correct overwrite never leaves trailing bytes behind.
///
/// # Errors
/// All failures are `ErrorKind::InvalidData`:
/// - Bad magic or unsupported version
/// - Payload larger than `max_len`
/// - Frame truncated or followed by trailing bytes
/// - Checksum mismatch or deserialization failure
pub fn decode<T: DeserializeOwned>(bytes: &[u8], max_len: usize) -> IoResult<T> {
    if bytes.len() < FRAME_OVERHEAD {
        return Err(invalid(format!(
            "frame truncated: {} bytes, need at least {FRAME_OVERHEAD}",
            bytes.len()
        )));
    }

    let (magic, rest) = bytes.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(invalid(format!(
            "invalid magic bytes: expected {MAGIC:?}, got {magic:?}"
        )));
    }

    let (version, rest) = rest.split_at(1);
    if version[0] != FRAME_VERSION {
        return Err(invalid(format!(
            "unsupported frame version: {} (expected {FRAME_VERSION})",
            version[0]
        )));
    }

    let (len_bytes, rest) = rest.split_at(4);
    let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;

    if len > max_len {
        return Err(invalid(format!("snapshot size {len} exceeds maximum {max_len}")));
    }

    if rest.len() < len + 4 {
        return Err(invalid(format!(
            "frame truncated: payload claims {len} bytes, {} available",
            rest.len().saturating_sub(4)
        )));
    }
    if rest.len() > len + 4 {
        return Err(invalid(format!(
            "{} trailing bytes after frame",
            rest.len() - len - 4
        )));
    }

    let (data, crc_bytes) = rest.split_at(len);
    let stored_crc = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let computed_crc = checksum(data);

    if stored_crc != computed_crc {
        return Err(invalid(format!(
            "CRC mismatch: stored={stored_crc:08x}, computed={computed_crc:08x} (data corrupted)"
        )));
    }

    serde_json::from_slice(data).map_err(|e| invalid(format!("deserialization failed: {e}")))
}
