use glam::Vec3;

use crate::builder::{MAX_BUILD_DEPTH, MIN_BUILD_DEPTH};
use crate::core::{Aabb, DedupMap, Node, MAX_CHILDREN, SOLID_LEAF};
use crate::error::{Result, SvdagError};
use crate::pool::NodePool;

impl NodePool {
    /// Merges `other` into this pool. With `overwrite` unset the result is
    /// the set union; with it set, `other`'s leaves win where both sides are
    /// solid. `other` is never mutated; its nodes are copied in with indices
    /// re-rooted past the current pool.
    ///
    /// Fusion appends duplicates and cross-links into the copied region, so
    /// the pool is no longer topologically ordered until `recompress` (or a
    /// later `compress`) canonicalises it.
    pub fn combine(&mut self, other: &NodePool, overwrite: bool, recompress: bool) {
        if other.root() == 0 {
            if recompress {
                self.compress();
            }
            return;
        }
        if self.root() == 0 {
            *self = other.clone();
            if recompress {
                self.compress();
            }
            return;
        }

        let offset = self.len() as i32;
        let target = self.root();
        let source = (other.root() as i32 + offset) as u32;
        self.append_shifted(other, offset);
        self.fuse(overwrite, target, source);
        self.set_root(target);
        debug_assert!(self.slots_in_range());

        if recompress {
            self.compress();
        }
    }

    /// Removes `other`'s solid volume from this pool (set difference).
    pub fn subtract(&mut self, other: &NodePool, recompress: bool) {
        if self.root() == 0 || other.root() == 0 {
            if recompress {
                self.compress();
            }
            return;
        }

        let offset = self.len() as i32;
        let target = self.root();
        let source = (other.root() as i32 + offset) as u32;
        self.append_shifted(other, offset);
        self.erase(target, source);
        self.set_root(target);
        debug_assert!(self.slots_in_range());

        if recompress {
            self.compress();
        }
    }

    /// Copies the node referenced by `parent`'s slot to the end of the pool
    /// and repoints the slot at the copy. The copy-on-write primitive the
    /// fusion recursions rely on: shared subtrees are never edited in place.
    pub fn duplicate_child(&mut self, parent: u32, octant: usize) -> Result<u32> {
        let slot = self.get(parent)?.children()[octant];
        if slot <= 0 {
            return Err(SvdagError::NotFound { parent, octant });
        }
        Ok(self.duplicate_child_slot(parent, octant))
    }

    /// Replaces `parent`'s slot with a fresh node whose eight slots all hold
    /// the slot's current value. Subdividing a leaf refines the voxel into
    /// eight identical leaf children one level deeper.
    pub fn subdivide_child(&mut self, parent: u32, octant: usize) -> Result<u32> {
        let slot = self.get(parent)?.children()[octant];
        if slot == 0 {
            return Err(SvdagError::NotFound { parent, octant });
        }
        Ok(self.subdivide_child_slot(parent, octant))
    }

    /// Builds a pool over the unit cube from an inside test.
    ///
    /// `inside(cube_center, cube_size)` decides solidity. A sub-cube the test
    /// accepts above the bottom level short-circuits to a solid leaf, so a
    /// conservative test prunes whole subtrees; otherwise recursion bottoms
    /// out at `max_depth`. Nodes whose eight children all come back solid
    /// collapse to a leaf bottom-up, and finished nodes are deduplicated the
    /// same way the mesh builder deduplicates them.
    pub fn from_sdf<F>(max_depth: u32, inside: F) -> Result<NodePool>
    where
        F: Fn(Vec3, f32) -> bool,
    {
        if !(MIN_BUILD_DEPTH..=MAX_BUILD_DEPTH).contains(&max_depth) {
            return Err(SvdagError::InputRejected {
                reason: format!(
                    "build depth {max_depth} outside [{MIN_BUILD_DEPTH}, {MAX_BUILD_DEPTH}]"
                ),
            });
        }

        let mut pool = NodePool::new();
        let mut dedup = DedupMap::default();
        let value = sdf_cube(&mut pool, &mut dedup, &inside, Aabb::UNIT, max_depth, 0);
        match value {
            0 => {}
            value if value < 0 => {
                let index = pool.append(Node::solid());
                pool.set_root(index);
            }
            value => pool.set_root(value as u32),
        }

        debug_assert!(pool.is_topologically_ordered());
        Ok(pool)
    }

    fn append_shifted(&mut self, other: &NodePool, offset: i32) {
        for node in other.nodes() {
            let mut children = *node.children();
            for slot in children.iter_mut() {
                if *slot > 0 {
                    *slot += offset;
                }
            }
            self.append(Node::new(children));
        }
    }

    fn fuse(&mut self, overwrite: bool, target: u32, source: u32) {
        for octant in 0..MAX_CHILDREN {
            let ours = self.node(target).children()[octant];
            let theirs = self.node(source).children()[octant];
            match (ours, theirs) {
                (_, 0) => {}
                (0, theirs) => self.node_mut(target).children_mut()[octant] = theirs,
                (ours, theirs) if ours < 0 && theirs < 0 => {
                    self.node_mut(target).children_mut()[octant] =
                        if overwrite { theirs } else { ours };
                }
                // A solid leaf on either side already covers the octant.
                (ours, _) if ours < 0 => {}
                (_, theirs) if theirs < 0 => {
                    self.node_mut(target).children_mut()[octant] = theirs;
                }
                (_, theirs) => {
                    let duplicate = self.duplicate_child_slot(target, octant);
                    self.fuse(overwrite, duplicate, theirs as u32);
                }
            }
        }
    }

    fn erase(&mut self, target: u32, source: u32) {
        for octant in 0..MAX_CHILDREN {
            let ours = self.node(target).children()[octant];
            let theirs = self.node(source).children()[octant];
            match (ours, theirs) {
                (0, _) | (_, 0) => {}
                // Their solid leaf covers the octant: everything goes.
                (_, theirs) if theirs < 0 => {
                    self.node_mut(target).children_mut()[octant] = 0;
                }
                // Refine our leaf so the subtraction can descend into it.
                (ours, theirs) if ours < 0 => {
                    let refined = self.subdivide_child_slot(target, octant);
                    self.erase(refined, theirs as u32);
                }
                (_, theirs) => {
                    let duplicate = self.duplicate_child_slot(target, octant);
                    self.erase(duplicate, theirs as u32);
                }
            }
        }
    }

    fn duplicate_child_slot(&mut self, parent: u32, octant: usize) -> u32 {
        let child = self.node(parent).children()[octant];
        debug_assert!(child > 0, "duplicating a non-child slot");
        let copy = *self.node(child as u32);
        let index = self.append(copy);
        self.node_mut(parent).children_mut()[octant] = index as i32;
        index
    }

    fn subdivide_child_slot(&mut self, parent: u32, octant: usize) -> u32 {
        let slot = self.node(parent).children()[octant];
        debug_assert!(slot != 0, "subdividing an empty slot");
        let index = self.append(Node::new([slot; MAX_CHILDREN]));
        self.node_mut(parent).children_mut()[octant] = index as i32;
        index
    }
}

fn sdf_cube<F>(
    pool: &mut NodePool,
    dedup: &mut DedupMap,
    inside: &F,
    cube: Aabb,
    max_depth: u32,
    depth: u32,
) -> i32
where
    F: Fn(Vec3, f32) -> bool,
{
    let size = cube.max.x - cube.min.x;
    if inside(cube.center(), size) {
        return SOLID_LEAF;
    }
    if depth == max_depth {
        return 0;
    }

    let mut children = [0i32; MAX_CHILDREN];
    for (octant, child) in children.iter_mut().enumerate() {
        *child = sdf_cube(pool, dedup, inside, cube.octant(octant), max_depth, depth + 1);
    }

    let node = Node::new(children);
    if !node.has_value() {
        return 0;
    }
    if children.iter().all(|&child| child == SOLID_LEAF) {
        return SOLID_LEAF;
    }
    if let Some(&existing) = dedup.get(&node) {
        return existing as i32;
    }
    let index = pool.append(node);
    dedup.insert(node, index);
    index as i32
}
