use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{NativeEndian, WriteBytesExt};

use crate::error::Result;
use crate::pool::NodePool;

use super::{HEADER_BYTES, NODE_BYTES};

/// Number of bytes `pool` occupies on disk.
pub fn serialized_size(pool: &NodePool) -> usize {
    HEADER_BYTES + pool.len() * NODE_BYTES
}

/// Writes the pool in the binary arena format.
pub fn write_pool<W: Write>(pool: &NodePool, writer: &mut W) -> Result<()> {
    writer.write_u64::<NativeEndian>(pool.len() as u64)?;
    for node in pool.nodes() {
        for &slot in node.children() {
            writer.write_i32::<NativeEndian>(slot)?;
        }
    }
    Ok(())
}

/// Serializes the pool into a fresh buffer.
pub fn to_bytes(pool: &NodePool) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(serialized_size(pool));
    bytes.extend_from_slice(&(pool.len() as u64).to_ne_bytes());
    for node in pool.nodes() {
        for &slot in node.children() {
            bytes.extend_from_slice(&slot.to_ne_bytes());
        }
    }
    bytes
}

pub fn write_to_file<P: AsRef<Path>>(pool: &NodePool, path: P) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_pool(pool, &mut writer)?;
    writer.flush()?;
    Ok(())
}
