use std::fs;
use std::io::Read;
use std::path::Path;

use byteorder::{NativeEndian, ReadBytesExt};

use crate::core::{Node, MAX_CHILDREN};
use crate::error::{Result, SvdagError};
use crate::pool::NodePool;

use super::{HEADER_BYTES, NODE_BYTES};

/// Loads a pool from an in-memory image. The slice must hold exactly
/// `8 + 32 * count` bytes and every child index must resolve.
pub fn from_bytes(bytes: &[u8]) -> Result<NodePool> {
    if bytes.len() < HEADER_BYTES {
        return Err(SvdagError::CorruptPool {
            reason: format!("header truncated at {} bytes", bytes.len()),
        });
    }

    let count = u64::from_ne_bytes(bytes[..HEADER_BYTES].try_into().unwrap());
    let expected = HEADER_BYTES as u128 + count as u128 * NODE_BYTES as u128;
    if expected != bytes.len() as u128 {
        return Err(SvdagError::CorruptPool {
            reason: format!(
                "{count} nodes need {expected} bytes, payload holds {}",
                bytes.len()
            ),
        });
    }

    let count = count as usize;
    let mut pool = NodePool::with_capacity(count);
    let mut offset = HEADER_BYTES;
    for _ in 0..count {
        let mut children = [0i32; MAX_CHILDREN];
        for slot in children.iter_mut() {
            *slot = i32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap());
            offset += 4;
        }
        pool.append(Node::new(children));
    }

    validate_children(&pool)?;
    pool.set_root(count as u32);
    Ok(pool)
}

/// Reads a pool from a stream; the stream must end exactly after the last
/// node record.
pub fn read_pool<R: Read>(reader: &mut R) -> Result<NodePool> {
    let count = reader.read_u64::<NativeEndian>().map_err(truncated)?;
    if count > (usize::MAX / NODE_BYTES) as u64 {
        return Err(SvdagError::CorruptPool {
            reason: format!("declared node count {count} exceeds addressable memory"),
        });
    }

    let count = count as usize;
    let mut pool = NodePool::with_capacity(count);
    for _ in 0..count {
        let mut children = [0i32; MAX_CHILDREN];
        for slot in children.iter_mut() {
            *slot = reader.read_i32::<NativeEndian>().map_err(truncated)?;
        }
        pool.append(Node::new(children));
    }

    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        return Err(SvdagError::CorruptPool {
            reason: format!("trailing bytes after {count} node records"),
        });
    }

    validate_children(&pool)?;
    pool.set_root(count as u32);
    Ok(pool)
}

pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<NodePool> {
    let bytes = fs::read(path)?;
    from_bytes(&bytes)
}

fn truncated(err: std::io::Error) -> SvdagError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        SvdagError::CorruptPool {
            reason: "payload shorter than the declared node count".to_string(),
        }
    } else {
        SvdagError::Io(err)
    }
}

fn validate_children(pool: &NodePool) -> Result<()> {
    let count = pool.len();
    for (position, node) in pool.nodes().iter().enumerate() {
        for &slot in node.children() {
            if slot > 0 && slot as usize > count {
                return Err(SvdagError::CorruptPool {
                    reason: format!(
                        "node {position} references child {slot} in a pool of {count} nodes"
                    ),
                });
            }
        }
    }
    Ok(())
}
