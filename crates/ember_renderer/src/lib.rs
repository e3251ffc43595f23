//! Ember renderer - CPU Monte Carlo ray tracing.
//!
//! Renders a single frame of an immutable scene: per-mesh BVH acceleration,
//! recursive shading over constant/diffuse/reflective/refractive materials
//! with shadow rays and optional one-bounce global illumination, and a
//! bucket dispatcher that renders tiles in parallel.

mod bucket;
mod bvh;
mod camera;
mod color;
mod hit;
mod material;
mod mesh;
mod renderer;
mod scene;
mod triangle;

pub use bucket::{generate_buckets, Bucket, DEFAULT_BUCKET_SIZE};
pub use bvh::{BvhNode, MAX_TRIANGLES_PER_LEAF};
pub use camera::Camera;
pub use color::Color;
pub use hit::{HitRecord, MAX_T};
pub use material::{Material, GI_DEPTH, GI_RAYS, MAX_DEPTH, SHADOW_BIAS};
pub use mesh::Mesh;
pub use renderer::{pixels_to_rgb8, render, render_bucket, render_into};
pub use scene::{Light, Scene, SceneSettings};
pub use triangle::Triangle;

/// Re-export the math types the public API is expressed in.
pub use ember_math::{Aabb, Mat3, Ray, Vec3, EPSILON};
