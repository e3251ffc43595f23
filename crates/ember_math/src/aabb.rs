use crate::{Ray, Vec3};

/// Axis-aligned bounding box.
///
/// A fresh box starts at `min = +inf`, `max = -inf`, so expanding it over a
/// sequence of points yields the tight bounds of that set.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// A box containing nothing (`min > max` on every axis).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create a box from two opposite corners.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Grow the box to contain `point`.
    #[inline]
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Per-axis extent. Negative on an empty box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Slab test: does the ray cross the box anywhere at `t >= 0`?
    ///
    /// Axis-parallel rays divide by zero; the resulting infinities fall out
    /// of the min/max comparisons without special casing.
    #[inline]
    pub fn hit(&self, ray: &Ray) -> bool {
        let inv_dir = ray.dir.recip();
        let t0 = (self.min - ray.origin) * inv_dir;
        let t1 = (self.max - ray.origin) * inv_dir;

        let t_near = t0.min(t1);
        let t_far = t0.max(t1);

        let near = t_near.max_element();
        let far = t_far.min_element();
        near <= far && far >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_from_empty() {
        let mut aabb = Aabb::EMPTY;
        aabb.expand(Vec3::new(1.0, -2.0, 3.0));
        aabb.expand(Vec3::new(-1.0, 2.0, 0.0));

        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_hit_and_miss() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        // Straight at the box
        assert!(aabb.hit(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z)));
        // Pointing away
        assert!(!aabb.hit(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z)));
        // Off to the side
        assert!(!aabb.hit(&Ray::new(Vec3::new(5.0, 0.0, -5.0), Vec3::Z)));
        // Origin inside
        assert!(aabb.hit(&Ray::new(Vec3::ZERO, Vec3::X)));
    }

    #[test]
    fn test_axis_parallel_ray() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        // dir.x == dir.y == 0 produces infinities in the slab test
        let inside = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::Z);
        assert!(aabb.hit(&inside));

        let outside = Ray::new(Vec3::new(1.5, 0.5, -5.0), Vec3::Z);
        assert!(!aabb.hit(&outside));
    }

    #[test]
    fn test_flat_box() {
        // Zero extent in z still intersects a ray crossing the plane
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -3.0), Vec3::new(1.0, 1.0, -3.0));
        assert!(aabb.hit(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)));
        assert!(!aabb.hit(&Ray::new(Vec3::ZERO, Vec3::Z)));
    }
}
