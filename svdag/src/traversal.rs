use glam::Vec3;

use crate::core::{ray_aabb_intersection, Aabb, MAX_CHILDREN};
use crate::pool::NodePool;

/// First solid voxel hit along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Entry point of the hit voxel.
    pub position: Vec3,
    /// Parametric distance of the entry point along the ray.
    pub distance: f32,
}

impl NodePool {
    /// Marches `origin + t * direction` through the DAG over the unit cube
    /// and returns the first solid voxel entered, or `None` when the ray
    /// leaves the cube or exceeds `max_dist` first.
    ///
    /// `max_depth` caps the descent: any occupied slot at that depth counts
    /// as solid, so traversing shallower than the build depth yields the
    /// coarser voxels. Rays over a different cube are transformed into unit
    /// space by the caller. Read-only, so any number of traversals may run
    /// concurrently against a shared pool.
    pub fn traverse(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_depth: u32,
        max_dist: f32,
    ) -> Option<RayHit> {
        if self.root() == 0 {
            return None;
        }
        let cube = Aabb::UNIT;
        let (entry, exit) = ray_aabb_intersection(origin, direction, &cube)?;
        if exit < 0.0 || entry > max_dist {
            return None;
        }
        self.march(
            self.root(),
            &cube,
            origin,
            direction,
            max_depth.max(1),
            max_dist,
            0,
        )
    }

    fn march(
        &self,
        index: u32,
        cube: &Aabb,
        origin: Vec3,
        direction: Vec3,
        max_depth: u32,
        max_dist: f32,
        depth: u32,
    ) -> Option<RayHit> {
        let node = self.node(index);

        // Front-to-back visit order: occupied octants sorted by entry
        // distance along the ray.
        let mut candidates = [(0.0f32, 0usize); MAX_CHILDREN];
        let mut count = 0;
        for octant in 0..MAX_CHILDREN {
            if node.children()[octant] == 0 {
                continue;
            }
            let sub = cube.octant(octant);
            if let Some((entry, exit)) = ray_aabb_intersection(origin, direction, &sub) {
                if exit < 0.0 || entry > max_dist {
                    continue;
                }
                candidates[count] = (entry.max(0.0), octant);
                count += 1;
            }
        }
        candidates[..count].sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        for &(entry, octant) in &candidates[..count] {
            let slot = node.children()[octant];
            if slot < 0 || depth + 1 >= max_depth {
                return Some(RayHit {
                    position: origin + direction * entry,
                    distance: entry,
                });
            }
            let sub = cube.octant(octant);
            if let Some(hit) = self.march(
                slot as u32,
                &sub,
                origin,
                direction,
                max_depth,
                max_dist,
                depth + 1,
            ) {
                return Some(hit);
            }
        }

        None
    }
}
