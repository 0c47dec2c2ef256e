mod math;
mod node;

pub use math::{ray_aabb_intersection, Aabb};
pub use node::{Children, DedupMap, Node, NodeHasherBuilder, Slot, MAX_CHILDREN, SOLID_LEAF};
