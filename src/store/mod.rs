//! Byte stores the overwrite sink can write through.
//!
//! The sink only needs truncate, seek and write. `ByteStore` captures that
//! trio so regular files and in-memory buffers are interchangeable.

mod file;
mod memory;
mod traits;

pub use file::open_file_store;
pub use memory::MemoryStore;
pub use traits::ByteStore;
