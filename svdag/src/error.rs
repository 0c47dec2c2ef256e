//! Error types for pool access, editing and serialization.

use std::error::Error;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, SvdagError>;

/// Errors surfaced by pool operations.
///
/// Nothing is retried internally; a pool left behind by a failed build or
/// edit holds intermediate nodes and should be dropped by the caller.
#[derive(Debug)]
pub enum SvdagError {
    /// A node index does not resolve to a pool entry.
    IndexOutOfRange {
        /// The offending 1-based index.
        index: u32,
        /// Number of nodes in the pool.
        len: usize,
    },
    /// An editing operation targeted a child slot it cannot work with.
    NotFound {
        /// Index of the parent node.
        parent: u32,
        /// Octant of the offending slot.
        octant: usize,
    },
    /// A serialized pool failed validation during load.
    CorruptPool {
        /// What went wrong.
        reason: String,
    },
    /// Build parameters outside the supported range.
    InputRejected {
        /// What went wrong.
        reason: String,
    },
    /// An underlying read or write failed.
    Io(io::Error),
}

impl fmt::Display for SvdagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "node index {index} out of range for pool of {len} nodes")
            }
            Self::NotFound { parent, octant } => {
                write!(f, "node {parent} has no child in octant {octant}")
            }
            Self::CorruptPool { reason } => write!(f, "corrupt pool: {reason}"),
            Self::InputRejected { reason } => write!(f, "input rejected: {reason}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl Error for SvdagError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SvdagError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
