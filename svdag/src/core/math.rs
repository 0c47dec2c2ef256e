use glam::Vec3;

/// Axis-aligned box spanned by two corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The unit cube `[0, 1]³`, the implicit domain of a node pool.
    pub const UNIT: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ONE,
    };

    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_corner_size(corner: Vec3, size: f32) -> Self {
        Self {
            min: corner,
            max: corner + Vec3::splat(size),
        }
    }

    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            min: v0.min(v1).min(v2),
            max: v0.max(v1).max(v2),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Sub-cube for octant `(x_bit << 2) | (y_bit << 1) | z_bit`.
    pub fn octant(&self, index: usize) -> Self {
        let half = (self.max - self.min) * 0.5;
        let min = self.min
            + Vec3::new(
                if index & 4 != 0 { half.x } else { 0.0 },
                if index & 2 != 0 { half.y } else { 0.0 },
                if index & 1 != 0 { half.z } else { 0.0 },
            );
        Self {
            min,
            max: min + half,
        }
    }

    /// Inclusive overlap: boxes that touch at a face or edge count.
    ///
    /// Octree cell bounds are exact halvings of the root cube, so geometry
    /// lying on a splitting plane lands in the cells on both sides.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Slab-method ray/box test. Returns `(t_entry, t_exit)` on overlap; the
/// entry parameter is negative when the origin is inside the box.
pub fn ray_aabb_intersection(origin: Vec3, direction: Vec3, aabb: &Aabb) -> Option<(f32, f32)> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        if direction[axis].abs() < 1e-8 {
            if origin[axis] < aabb.min[axis] || origin[axis] > aabb.max[axis] {
                return None;
            }
        } else {
            let inv_d = 1.0 / direction[axis];
            let mut t1 = (aabb.min[axis] - origin[axis]) * inv_d;
            let mut t2 = (aabb.max[axis] - origin[axis]) * inv_d;

            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);

            if t_min > t_max {
                return None;
            }
        }
    }

    Some((t_min, t_max))
}
