use glam::Vec3;
use log::debug;

use crate::core::{Aabb, DedupMap, Node, MAX_CHILDREN, SOLID_LEAF};
use crate::error::{Result, SvdagError};
use crate::pool::NodePool;

pub const MIN_BUILD_DEPTH: u32 = 1;
pub const MAX_BUILD_DEPTH: u32 = 31;

/// Voxels between progress callback invocations.
const PROGRESS_INTERVAL: u64 = 1024;

/// Geometry source consumed by the builder.
///
/// The builder needs triangles and a bounding box, nothing else; winding,
/// normals and materials are the loader's business.
pub trait Scene {
    /// Axis-aligned bounds enclosing every triangle.
    fn bounds(&self) -> (Vec3, Vec3);

    fn triangle_count(&self) -> usize;

    /// Vertex positions of triangle `index`.
    fn triangle(&self, index: usize) -> (Vec3, Vec3, Vec3);
}

/// Recursive mesh voxelizer producing a deduplicated node pool.
///
/// Octants are filtered with a triangle-bounding-box pre-cull (inclusive, so
/// geometry on a splitting plane lands on both sides), recursion bottoms out
/// in solid leaves at `max_depth`, and every finished node goes through a
/// structural dedup map local to the build. Single-threaded by design; the
/// result is a pure function of the inputs.
pub struct MeshBuilder<'a, S: Scene> {
    scene: &'a S,
    max_depth: u32,
    cube: Aabb,
    progress: Option<Box<dyn FnMut(u64) + 'a>>,
    voxels_processed: u64,
}

impl<'a, S: Scene> MeshBuilder<'a, S> {
    pub fn new(scene: &'a S, max_depth: u32, corner: Vec3, size: f32) -> Result<Self> {
        if !(MIN_BUILD_DEPTH..=MAX_BUILD_DEPTH).contains(&max_depth) {
            return Err(SvdagError::InputRejected {
                reason: format!(
                    "build depth {max_depth} outside [{MIN_BUILD_DEPTH}, {MAX_BUILD_DEPTH}]"
                ),
            });
        }
        if !(size > 0.0) {
            return Err(SvdagError::InputRejected {
                reason: format!("degenerate bounding cube of size {size}"),
            });
        }

        Ok(Self {
            scene,
            max_depth,
            cube: Aabb::from_corner_size(corner, size),
            progress: None,
            voxels_processed: 0,
        })
    }

    /// Registers a periodic progress callback receiving the running voxel
    /// count. No frequency guarantee; the callback must not block. A caller
    /// that wants to cancel a long build panics out of the callback and
    /// drops the partial pool.
    pub fn with_progress(mut self, callback: impl FnMut(u64) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn build(mut self) -> NodePool {
        let triangle_count = self.scene.triangle_count();
        let triangle_boxes: Vec<Aabb> = (0..triangle_count)
            .map(|index| {
                let (v0, v1, v2) = self.scene.triangle(index);
                Aabb::from_triangle(v0, v1, v2)
            })
            .collect();
        let overlapping: Vec<u32> = (0..triangle_count as u32)
            .filter(|&index| triangle_boxes[index as usize].intersects(&self.cube))
            .collect();

        let mut pool = NodePool::new();
        let mut dedup = DedupMap::default();
        let cube = self.cube;
        let root = self.build_cube(&mut pool, &mut dedup, &triangle_boxes, &overlapping, cube, 0);
        if root > 0 {
            pool.set_root(root as u32);
        }

        debug_assert!(pool.is_topologically_ordered());
        debug!(
            "voxelized {} triangles to depth {}: {} nodes",
            triangle_count,
            self.max_depth,
            pool.len()
        );
        pool
    }

    fn build_cube(
        &mut self,
        pool: &mut NodePool,
        dedup: &mut DedupMap,
        triangle_boxes: &[Aabb],
        triangles: &[u32],
        cube: Aabb,
        depth: u32,
    ) -> i32 {
        if triangles.is_empty() {
            return 0;
        }
        if depth == self.max_depth {
            self.voxels_processed += 1;
            if self.voxels_processed % PROGRESS_INTERVAL == 0 {
                if let Some(callback) = self.progress.as_mut() {
                    callback(self.voxels_processed);
                }
            }
            return SOLID_LEAF;
        }

        let mut children = [0i32; MAX_CHILDREN];
        for (octant, child) in children.iter_mut().enumerate() {
            let sub = cube.octant(octant);
            let filtered: Vec<u32> = triangles
                .iter()
                .copied()
                .filter(|&index| triangle_boxes[index as usize].intersects(&sub))
                .collect();
            *child = self.build_cube(pool, dedup, triangle_boxes, &filtered, sub, depth + 1);
        }

        let node = Node::new(children);
        if !node.has_value() {
            return 0;
        }
        if let Some(&existing) = dedup.get(&node) {
            return existing as i32;
        }
        let index = pool.append(node);
        dedup.insert(node, index);
        index as i32
    }
}

impl NodePool {
    /// Voxelizes `scene` over the cube spanned by its bounds: minimum corner,
    /// longest edge. An empty scene yields an empty pool.
    pub fn from_scene<S: Scene>(scene: &S, max_depth: u32) -> Result<NodePool> {
        if scene.triangle_count() == 0 {
            return Ok(NodePool::new());
        }
        let (min, max) = scene.bounds();
        let size = (max - min).max_element();
        Ok(MeshBuilder::new(scene, max_depth, min, size)?.build())
    }
}
