use crate::Vec3;

/// Index of the axis with the largest absolute component.
#[inline]
pub fn max_dimension(v: Vec3) -> usize {
    let a = v.abs();
    let mut dim = 0;
    if a.y > a[dim] {
        dim = 1;
    }
    if a.z > a[dim] {
        dim = 2;
    }
    dim
}

/// Reflect an incoming direction `i` about the normal `n` (both unit).
#[inline]
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * i.dot(n) * n
}

/// Refract an incoming direction `i` through a surface with normal `n`.
///
/// `ior` is the ratio eta_incoming / eta_outgoing. Returns the unit
/// transmitted direction, or the reflected direction with the second element
/// `true` when the angle exceeds the critical angle (total internal
/// reflection).
#[inline]
pub fn refract(i: Vec3, n: Vec3, ior: f32) -> (Vec3, bool) {
    let n_dot_i = i.dot(n);
    let k = 1.0 - (ior * ior) * (1.0 - n_dot_i * n_dot_i);

    if k < 0.0 {
        return (reflect(i, n), true);
    }

    let t = (ior * i - (ior * n_dot_i + k.sqrt()) * n).normalize();
    (t, false)
}
