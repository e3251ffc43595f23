//! Frame rendering: the parallel bucket loop and pixel output.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::bucket::{generate_buckets, Bucket};
use crate::color::Color;
use crate::hit::{HitRecord, MAX_T};
use crate::scene::Scene;

/// Render a frame into a freshly allocated linear-RGBA buffer.
pub fn render(scene: &Scene) -> Vec<Color> {
    let mut pixels = vec![scene.settings.background; scene.settings.width * scene.settings.height];
    render_into(scene, &mut pixels);
    pixels
}

/// Render a frame into a caller-provided row-major pixel buffer.
///
/// The scene is shared read-only across the worker pool; each bucket is
/// rendered sequentially into a tile-local vector and blitted into its own
/// rectangle of the buffer afterwards, so no two tiles touch the same pixel.
pub fn render_into(scene: &Scene, pixels: &mut [Color]) {
    let width = scene.settings.width;
    let height = scene.settings.height;
    assert_eq!(pixels.len(), width * height, "pixel buffer size mismatch");

    let buckets = generate_buckets(width, height, scene.settings.bucket_size);
    log::debug!(
        "rendering {}x{} as {} buckets of {}px",
        width,
        height,
        buckets.len(),
        scene.settings.bucket_size
    );

    let tiles: Vec<(Bucket, Vec<Color>)> = buckets
        .par_iter()
        .map(|bucket| (*bucket, render_bucket(scene, bucket)))
        .collect();

    for (bucket, tile) in tiles {
        for row in 0..bucket.height {
            let src = &tile[row * bucket.width..(row + 1) * bucket.width];
            let offset = (bucket.y + row) * width + bucket.x;
            pixels[offset..offset + bucket.width].copy_from_slice(src);
        }
    }
}

/// Render one bucket to a row-major tile of pixels.
///
/// The bucket's RNG is seeded from its index, so a frame is reproducible
/// regardless of how the buckets are scheduled across threads.
pub fn render_bucket(scene: &Scene, bucket: &Bucket) -> Vec<Color> {
    let width = scene.settings.width;
    let height = scene.settings.height;
    let mut rng = SmallRng::seed_from_u64(bucket.index as u64);

    let mut tile = Vec::with_capacity(bucket.pixel_count());
    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let ray = scene
                .camera
                .generate_ray(width, height, bucket.x + local_x, bucket.y + local_y);

            let mut rec = HitRecord::new(MAX_T);
            let color = if scene.intersect(&ray, false, false, MAX_T, &mut rec) {
                scene.shade(&ray, &rec, 0, &mut rng)
            } else {
                scene.settings.background
            };
            tile.push(color);
        }
    }
    tile
}

/// Pack a linear pixel buffer into 8-bit RGB bytes.
pub fn pixels_to_rgb8(pixels: &[Color]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for color in pixels {
        bytes.extend_from_slice(&color.to_rgb8());
    }
    bytes
}
