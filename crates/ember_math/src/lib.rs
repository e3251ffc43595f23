//! Math primitives for the Ember ray tracer.
//!
//! Re-exports glam for vectors and matrices, and adds the ray/box types and
//! the handful of free functions the renderer builds on.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod ops;
mod ray;

pub use aabb::Aabb;
pub use ops::{max_dimension, reflect, refract};
pub use ray::Ray;

/// Rejection threshold for near-parallel geometry and degenerate extents.
pub const EPSILON: f32 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_reexport() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v[1], 2.0);
        assert_eq!(v[2], 3.0);
    }

    #[test]
    fn test_mat3_rotation() {
        // Rotating +Z by 90 degrees around Y lands on +X.
        let m = Mat3::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let v = m * Vec3::Z;
        assert!((v - Vec3::X).length() < 1e-6);
    }
}
