//! # rewind - overwrite sink
//!
//! rewind persists the *entire current value* of some in-memory state to a
//! single file-like store. Every write replaces the store's content wholesale
//! instead of appending to it.
//!
//! ## Core Concepts
//!
//! - **ByteStore**: a truncatable, seekable, writable handle (a `File`, a `MemoryStore`, ...)
//! - **OverwriteSink**: truncate, rewind, write; with typed partial-failure reporting
//! - **SnapshotTape**: checksummed save/load of a serializable value through a sink
//! - **SinkWriter**: a single owning thread that serializes writes from many producers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rewind::{open_file_store, OverwriteSink};
//!
//! let file = open_file_store("league.json")?;
//! let mut sink = OverwriteSink::new(&file);
//!
//! sink.write(br#"[{"name":"Cleo","wins":10}]"#)?;
//! sink.write(br#"[]"#)?; // file now holds exactly "[]"
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod error;
pub mod sink;
pub mod snapshot;
pub mod store;
pub mod worker;

// Re-export primary types at crate root for convenience
pub use config::{SinkConfig, SnapshotConfig, WorkerConfig};
pub use error::{
    ConfigError, RewindError, RewindResult, SinkError, SnapshotError, StoreState, WorkerError,
};
pub use sink::OverwriteSink;
pub use snapshot::SnapshotTape;
pub use store::{open_file_store, ByteStore, MemoryStore};
pub use worker::{SinkWriter, WriteTicket};
