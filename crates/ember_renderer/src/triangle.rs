//! Ray-triangle intersection.
//!
//! Möller-Trumbore with barycentric extraction. Triangles store indices into
//! their mesh's vertex list; the actual vertex positions are passed in by
//! the caller.

use ember_math::{Ray, Vec3, EPSILON};

use crate::hit::HitRecord;

/// Three vertex indices into the owning mesh's vertex list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Triangle {
    pub v0: u32,
    pub v1: u32,
    pub v2: u32,
}

impl Triangle {
    pub fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self { v0, v1, v2 }
    }
}

/// Möller-Trumbore ray-triangle test against vertices `a`, `b`, `c`.
///
/// With `backface` set, hits are admitted from either side of the triangle;
/// otherwise only front-face hits (positive determinant) register. Hits
/// beyond `max_t` are rejected. On success the record's `t`, barycentrics,
/// intersection point, and geometric normal are written; the mesh
/// back-reference and triangle ordinal are the caller's to fill in.
pub fn intersect_triangle(
    ray: &Ray,
    a: Vec3,
    b: Vec3,
    c: Vec3,
    backface: bool,
    max_t: f32,
    rec: &mut HitRecord,
) -> bool {
    let e1 = b - a;
    let e2 = c - a;

    let h = ray.dir.cross(e2);
    let d = e1.dot(h);

    // Parallel ray, or back side when backfaces are disabled. A degenerate
    // triangle (|e1 x e2| = 0) lands here too and is silently missed.
    let d_test = if backface { d.abs() } else { d };
    if d_test < EPSILON {
        return false;
    }

    let f = 1.0 / d;

    // u is the signed distance from the AC side toward B, normalized;
    // outside [0, 1] the intersection point lies outside the triangle.
    let s = ray.origin - a;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    // v likewise measures from the AB side toward C; u + v > 1 puts the
    // point beyond the BC side.
    let q = s.cross(e1);
    let v = f * ray.dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    let t = f * e2.dot(q);
    if t < 0.0 || t > max_t {
        return false;
    }

    rec.t = t;
    rec.u = u;
    rec.v = v;
    rec.w = 1.0 - u - v;
    rec.ip = ray.at(t);
    rec.normal = e1.cross(e2).normalize();
    true
}
