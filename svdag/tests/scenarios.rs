//! End-to-end scenarios: build, edit, serialize and traverse whole pools.

use glam::Vec3;
use rayon::prelude::*;

use svdag::io::{from_bytes, read_from_file, to_bytes, write_to_file};
use svdag::{MeshBuilder, Node, NodePool, Scene, SOLID_LEAF};

struct TriMesh {
    triangles: Vec<[Vec3; 3]>,
}

impl TriMesh {
    fn cuboid(min: Vec3, max: Vec3) -> Self {
        let v = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ];
        let quads = [
            [0, 1, 2, 3],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 3, 7, 4],
            [1, 2, 6, 5],
        ];
        let mut triangles = Vec::new();
        for quad in quads {
            triangles.push([v[quad[0]], v[quad[1]], v[quad[2]]]);
            triangles.push([v[quad[0]], v[quad[2]], v[quad[3]]]);
        }
        Self { triangles }
    }
}

impl Scene for TriMesh {
    fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for triangle in &self.triangles {
            for &vertex in triangle {
                min = min.min(vertex);
                max = max.max(vertex);
            }
        }
        (min, max)
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn triangle(&self, index: usize) -> (Vec3, Vec3, Vec3) {
        let [v0, v1, v2] = self.triangles[index];
        (v0, v1, v2)
    }
}

fn lower_half_y() -> NodePool {
    NodePool::from_sdf(2, |center, _| center.y < 0.5).unwrap()
}

fn upper_half_y() -> NodePool {
    NodePool::from_sdf(2, |center, _| center.y > 0.5).unwrap()
}

fn sphere_pool(depth: u32) -> NodePool {
    NodePool::from_sdf(depth, |center, size| {
        (center - Vec3::splat(0.5)).length() + size * 0.5 < 0.35
    })
    .unwrap()
}

#[test]
fn single_voxel_mesh_build() {
    let mesh = TriMesh::cuboid(Vec3::ZERO, Vec3::ONE);
    let pool = NodePool::from_scene(&mesh, 1).unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.root_node().unwrap(), &Node::solid());
}

#[test]
fn mesh_outside_cube_builds_empty_pool() {
    let far = Vec3::splat(9.0);
    let mesh = TriMesh {
        triangles: vec![[far, far + Vec3::X, far + Vec3::Y]],
    };
    let pool = MeshBuilder::new(&mesh, 3, Vec3::ZERO, 1.0).unwrap().build();
    assert_eq!(pool.len(), 0);
}

#[test]
fn half_space_mesh_shares_the_solid_child() {
    let mesh = TriMesh {
        triangles: vec![
            [
                Vec3::new(0.0, 0.25, 0.0),
                Vec3::new(1.0, 0.25, 0.0),
                Vec3::new(1.0, 0.25, 1.0),
            ],
            [
                Vec3::new(0.0, 0.25, 0.0),
                Vec3::new(1.0, 0.25, 1.0),
                Vec3::new(0.0, 0.25, 1.0),
            ],
        ],
    };
    let mut pool = MeshBuilder::new(&mesh, 2, Vec3::ZERO, 1.0).unwrap().build();

    let root = pool.root_node().unwrap();
    assert_eq!(root.children(), &[1, 1, 0, 0, 1, 1, 0, 0]);
    assert_eq!(pool.get(1).unwrap(), &Node::solid());

    pool.compress();
    assert_eq!(pool.len(), 2);
}

#[test]
fn sdf_union_collapses_to_a_single_solid_leaf() {
    let mut pool = lower_half_y();
    pool.combine(&upper_half_y(), false, true);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.root_node().unwrap(), &Node::solid());
}

#[test]
fn sdf_subtract_of_disjoint_halves_is_identity() {
    let mut pool = lower_half_y();
    let original = pool.clone();
    pool.subtract(&upper_half_y(), true);
    assert_eq!(pool, original);
}

#[test]
fn subtracting_a_pool_from_itself_empties_it() {
    let mut pool = sphere_pool(3);
    let other = pool.clone();
    pool.subtract(&other, true);
    assert_eq!(pool.len(), 0);
    assert_eq!(pool.root(), 0);
}

#[test]
fn build_edit_serialize_traverse_pipeline() {
    // Build a solid block mesh, carve a half-space out of it, ship it
    // through the binary format and ray-march the result.
    let mesh = TriMesh::cuboid(Vec3::ZERO, Vec3::ONE);
    let mut pool = NodePool::from_scene(&mesh, 2).unwrap();
    pool.subtract(&upper_half_y(), true);

    let path = std::env::temp_dir().join("svdag_pipeline.svdag");
    write_to_file(&pool, &path).unwrap();
    let restored = read_from_file(&path).unwrap();
    assert_eq!(restored, pool);

    // The mesh voxelizes to a hollow shell; probe a column on the x = 0
    // wall, which is solid along its full height before the subtraction.
    let hit = restored
        .traverse(Vec3::new(0.05, -1.0, 0.05), Vec3::Y, 2, 10.0)
        .unwrap();
    assert!((hit.position.y - 0.0).abs() < 1e-5);
    let top = restored
        .traverse(Vec3::new(0.05, 2.0, 0.05), Vec3::NEG_Y, 2, 10.0)
        .unwrap();
    assert!((top.position.y - 0.5).abs() < 1e-5);
}

#[test]
fn serialize_round_trip_preserves_every_node() {
    for pool in [lower_half_y(), sphere_pool(4), NodePool::new()] {
        let restored = from_bytes(&to_bytes(&pool)).unwrap();
        assert_eq!(restored, pool);
        assert_eq!(restored.root(), pool.root());
    }
}

#[test]
fn build_determinism_across_runs() {
    let mesh = TriMesh::cuboid(Vec3::splat(0.2), Vec3::new(0.8, 0.5, 0.9));
    let first = NodePool::from_scene(&mesh, 5).unwrap();
    let second = NodePool::from_scene(&mesh, 5).unwrap();
    assert_eq!(first, second);
    assert!(first.nodes().iter().zip(second.nodes()).all(|(a, b)| a == b));
}

#[test]
fn compressed_pools_carry_no_duplicates() {
    let mut pool = sphere_pool(4);
    pool.combine(&lower_half_y(), false, true);

    let mut seen = std::collections::HashSet::new();
    for node in pool.nodes() {
        assert!(seen.insert(*node), "duplicate node after compress");
        assert!(node.has_value());
    }
    // Topological order: children strictly below their parents.
    for (position, node) in pool.nodes().iter().enumerate() {
        for &slot in node.children() {
            if slot > 0 {
                assert!((slot as usize) <= position);
            }
        }
    }
    assert_eq!(pool.root() as usize, pool.len());
}

#[test]
fn concurrent_traversal_matches_serial() {
    let pool = sphere_pool(5);

    let rays: Vec<Vec3> = (0..256)
        .map(|i| {
            Vec3::new(
                (i % 16) as f32 / 16.0 + 0.03125,
                (i / 16) as f32 / 16.0 + 0.03125,
                -1.0,
            )
        })
        .collect();

    let serial: Vec<_> = rays
        .iter()
        .map(|&origin| pool.traverse(origin, Vec3::Z, 5, 10.0))
        .collect();
    let parallel: Vec<_> = rays
        .par_iter()
        .map(|&origin| pool.traverse(origin, Vec3::Z, 5, 10.0))
        .collect();

    assert_eq!(serial, parallel);
    assert!(serial.iter().any(|hit| hit.is_some()));
    assert!(serial.iter().any(|hit| hit.is_none()));
}

#[test]
fn leaf_slots_use_the_documented_tag() {
    let pool = lower_half_y();
    for node in pool.nodes() {
        for &slot in node.children() {
            assert!(slot >= SOLID_LEAF, "only -1 is written as a leaf tag");
        }
    }
}
