//! Camera and primary-ray generation.

use ember_math::{Mat3, Ray, Vec3, EPSILON};

/// A pinhole camera looking down its local -Z axis.
///
/// Orientation is pan/tilt/roll in degrees; a scene file may instead supply
/// an explicit rotation matrix, which takes precedence over the angles.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pan: f32,
    tilt: f32,
    roll: f32,
    fov: f32,
    matrix_override: Option<Mat3>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            pan: 0.0,
            tilt: 0.0,
            roll: 0.0,
            fov: 90.0,
            matrix_override: None,
        }
    }

    /// Set the pan angle in degrees.
    pub fn set_pan(&mut self, degrees: f32) {
        self.pan = degrees;
    }

    /// Set the tilt angle in degrees, clamped to [-90, 90].
    pub fn set_tilt(&mut self, degrees: f32) {
        self.tilt = degrees.clamp(-90.0, 90.0);
    }

    /// Set the roll angle in degrees.
    pub fn set_roll(&mut self, degrees: f32) {
        self.roll = degrees;
    }

    /// Set the horizontal field of view in degrees, clamped into (0, 180).
    pub fn set_fov(&mut self, degrees: f32) {
        self.fov = degrees.clamp(EPSILON, 180.0 - EPSILON);
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Replace the composed rotation with an explicit matrix (row-major
    /// semantics: applied as `m * v`).
    pub fn set_matrix(&mut self, matrix: Mat3) {
        self.matrix_override = Some(matrix);
    }

    /// The camera rotation: roll (Z), then tilt (X), then pan (Y), applied
    /// in that order to camera-local directions.
    pub fn matrix(&self) -> Mat3 {
        if let Some(m) = self.matrix_override {
            return m;
        }
        Mat3::from_rotation_y(self.pan.to_radians())
            * Mat3::from_rotation_x(self.tilt.to_radians())
            * Mat3::from_rotation_z(self.roll.to_radians())
    }

    /// Generate the primary ray through pixel `(x, y)` of a `width x height`
    /// image, sampling the pixel center.
    pub fn generate_ray(&self, width: usize, height: usize, x: usize, y: usize) -> Ray {
        let aspect = height as f32 / width as f32;
        let scale = (self.fov.to_radians() * 0.5).tan();

        let px = (2.0 * (x as f32 + 0.5) / width as f32 - 1.0) * scale;
        let py = (1.0 - 2.0 * (y as f32 + 0.5) / height as f32) * scale * aspect;

        let dir = self.matrix() * Vec3::new(px, py, -1.0).normalize();
        Ray::new(self.position, dir)
    }
}
