//! Command-line renderer: load a scene file, render, write an image.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use ember_renderer::{pixels_to_rgb8, render, Color, Scene};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        bail!("usage: ember <scene.crtscene> <output.(ppm|png)>");
    }
    let scene_path = &args[1];
    let output_path = &args[2];

    let document = ember_scene::load_scene(scene_path)
        .with_context(|| format!("failed to load scene `{scene_path}`"))?;
    let scene = Scene::from_document(&document);

    let triangles: usize = scene.meshes.iter().map(|m| m.triangles.len()).sum();
    log::info!(
        "scene: {} meshes ({} triangles), {} materials, {} lights",
        scene.meshes.len(),
        triangles,
        scene.materials.len(),
        scene.lights.len()
    );

    let start = Instant::now();
    let pixels = render(&scene);
    log::info!(
        "rendered {}x{} in {:.2?}",
        scene.settings.width,
        scene.settings.height,
        start.elapsed()
    );

    save_image(
        output_path,
        scene.settings.width,
        scene.settings.height,
        &pixels,
    )
    .with_context(|| format!("failed to write `{output_path}`"))?;
    log::info!("wrote {output_path}");

    Ok(())
}

fn save_image(path: &str, width: usize, height: usize, pixels: &[Color]) -> Result<()> {
    let rgb = pixels_to_rgb8(pixels);
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("png") => save_png(path, width, height, rgb),
        _ => save_ppm(path, width, height, &rgb),
    }
}

fn save_png(path: &str, width: usize, height: usize, rgb: Vec<u8>) -> Result<()> {
    let img = image::RgbImage::from_raw(width as u32, height as u32, rgb)
        .context("pixel buffer does not match image dimensions")?;
    img.save(path)?;
    Ok(())
}

/// Binary PPM, the format the reference tooling consumes.
fn save_ppm(path: &str, width: usize, height: usize, rgb: &[u8]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P6")?;
    writeln!(writer, "{width} {height}")?;
    writeln!(writer, "255")?;
    writer.write_all(rgb)?;
    Ok(())
}
