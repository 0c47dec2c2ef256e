//! Sparse voxel DAG construction, editing and ray traversal.
//!
//! A [`NodePool`] stores an octree as an index-addressed arena in which
//! structurally identical subtrees are shared. Pools are built from triangle
//! meshes ([`MeshBuilder`]) or inside tests ([`NodePool::from_sdf`]), merged
//! and carved with the editing operations, compressed, serialized to a flat
//! binary format and traversed by rays.

pub mod builder;
pub mod core;
mod editor;
pub mod error;
pub mod io;
mod pool;
mod traversal;

pub use builder::{MeshBuilder, Scene, MAX_BUILD_DEPTH, MIN_BUILD_DEPTH};
pub use core::{Aabb, Node, Slot, MAX_CHILDREN, SOLID_LEAF};
pub use error::{Result, SvdagError};
pub use pool::NodePool;
pub use traversal::RayHit;
