//! Intersection record shared by the traversal and shading code.

use ember_math::Vec3;

use crate::mesh::Mesh;

/// Effectively-infinite ray length; the default closest-hit ceiling.
pub const MAX_T: f32 = 1e30;

/// Data describing a ray-triangle intersection.
///
/// `t` doubles as the running-best distance during traversal: it starts at
/// the query's `max_t` ceiling and only closer hits overwrite the record.
/// `(u, v, w)` are barycentric coordinates with `w = 1 - u - v` belonging to
/// the triangle's first vertex. `mesh` is a non-owning back-reference to the
/// hit mesh, valid for the lifetime of the scene being traced.
#[derive(Debug, Copy, Clone)]
pub struct HitRecord<'a> {
    pub t: f32,
    pub u: f32,
    pub v: f32,
    pub w: f32,
    /// Intersection point, `origin + t * dir`.
    pub ip: Vec3,
    /// Geometric face normal (unit length).
    pub normal: Vec3,
    pub mesh: Option<&'a Mesh>,
    /// Triangle ordinal within the hit mesh's (reordered) triangle list.
    pub triangle_index: usize,
}

impl<'a> HitRecord<'a> {
    /// An empty record whose distance acts as the hit ceiling.
    pub fn new(max_t: f32) -> Self {
        Self {
            t: max_t,
            u: 0.0,
            v: 0.0,
            w: 0.0,
            ip: Vec3::ZERO,
            normal: Vec3::ZERO,
            mesh: None,
            triangle_index: 0,
        }
    }
}
