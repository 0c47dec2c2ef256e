//! Binary pool serialization and the OBJ scene reader.
//!
//! The arena format is a raw dump in host byte order: a `u64` node count
//! followed by the node records, eight `i32` child slots each. No magic, no
//! checksum; readers validate the size arithmetic and every child index
//! instead.

mod export;
mod import;
mod obj_reader;

pub use export::{serialized_size, to_bytes, write_pool, write_to_file};
pub use import::{from_bytes, read_from_file, read_pool};
pub use obj_reader::Obj;

/// Serialized size of one node record.
pub const NODE_BYTES: usize = crate::core::MAX_CHILDREN * 4;

/// Serialized size of the node-count header.
pub const HEADER_BYTES: usize = 8;
