//! Surface materials and the recursive shading evaluator.

use std::f32::consts::PI;

use ember_math::{reflect, refract, Ray, Vec3};
use rand::RngCore;

use crate::color::Color;
use crate::hit::{HitRecord, MAX_T};
use crate::scene::Scene;

/// Offset along the normal that moves secondary-ray origins off the surface
/// they were spawned from.
pub const SHADOW_BIAS: f32 = 1e-4;

/// Maximum recursive reflection/refraction depth.
pub const MAX_DEPTH: u32 = 8;

/// Maximum number of diffuse bounces per path.
pub const GI_DEPTH: u16 = 1;

/// Indirect rays spawned per diffuse bounce.
pub const GI_RAYS: u32 = 128;

/// A surface material.
///
/// A closed set of variants with one `shade` dispatch; the scene owns the
/// heterogeneous material table and meshes reference entries by index.
#[derive(Debug, Clone)]
pub enum Material {
    /// View-dependent cosine tint; used for debugging and light blobs.
    Constant { albedo: Color, smooth_shading: bool },
    /// Lambertian direct lighting with optional one-bounce GI.
    Diffuse { albedo: Color, smooth_shading: bool },
    /// Perfect mirror modulated by albedo.
    Reflective { albedo: Color, smooth_shading: bool },
    /// Fresnel-mixed reflection and transmission.
    Refractive {
        albedo: Color,
        smooth_shading: bool,
        ior: f32,
    },
}

impl Material {
    /// Evaluate this material at a hit point.
    ///
    /// `depth` counts specular (reflection/refraction) recursion;
    /// `ray.gi_depth` counts diffuse bounces.
    pub fn shade(
        &self,
        scene: &Scene,
        ray: &Ray,
        rec: &HitRecord,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        match *self {
            Material::Constant {
                albedo,
                smooth_shading,
            } => {
                let rec_s = smoothed(rec, smooth_shading);
                albedo * facing_ratio(ray.dir, rec_s.normal)
            }
            Material::Diffuse {
                albedo,
                smooth_shading,
            } => shade_diffuse(scene, ray, rec, albedo, smooth_shading, depth, rng),
            Material::Reflective {
                albedo,
                smooth_shading,
            } => shade_reflective(scene, ray, rec, albedo, smooth_shading, depth, rng),
            Material::Refractive {
                albedo,
                smooth_shading,
                ior,
            } => shade_refractive(scene, ray, rec, albedo, smooth_shading, ior, depth, rng),
        }
    }
}

/// The constant-material response: maps the view/normal cosine from [-1, 1]
/// into [-1/3, 1].
#[inline]
fn facing_ratio(ray_dir: Vec3, normal: Vec3) -> f32 {
    (-ray_dir).dot(normal) / 3.0 * 2.0 + 1.0 / 3.0
}

/// Apply the smooth-shading prologue when the material asks for it.
fn smoothed<'a>(rec: &HitRecord<'a>, smooth_shading: bool) -> HitRecord<'a> {
    if smooth_shading {
        if let Some(mesh) = rec.mesh {
            return mesh.smooth_intersection(rec);
        }
    }
    *rec
}

fn shade_diffuse(
    scene: &Scene,
    ray: &Ray,
    rec: &HitRecord,
    albedo: Color,
    smooth_shading: bool,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let rec_s = smoothed(rec, smooth_shading);
    let p = rec_s.ip + rec_s.normal * SHADOW_BIAS;

    let mut direct = Color::BLACK;
    for light in &scene.lights {
        let ldir = light.position - p;
        let distance = ldir.length();
        let shadow_ray = Ray::new(p, ldir / distance);

        let mut shadow_rec = HitRecord::new(distance);
        let occluded = scene.intersect(&shadow_ray, true, true, distance, &mut shadow_rec);
        if occluded {
            continue;
        }

        let cos_law = shadow_ray.dir.dot(rec_s.normal).max(0.0);
        let area = 4.0 * PI * ldir.length_squared();
        direct += albedo * (light.intensity / area * cos_law);
    }

    // One bounce of indirect light: jittered mirror directions, averaged in
    // with the direct term below.
    let mut gi = Color::BLACK;
    let mut gi_traced = 0u32;
    if ray.gi_depth < GI_DEPTH {
        for _ in 0..GI_RAYS {
            let gi_dir = reflect(ray.dir, rec_s.normal) + random_unit_vector(rng);
            let gi_ray = Ray::with_gi_depth(rec_s.ip, gi_dir, ray.gi_depth + 1);

            let mut gi_rec = HitRecord::new(MAX_T);
            if scene.intersect(&gi_ray, false, false, MAX_T, &mut gi_rec) {
                gi += scene.shade(&gi_ray, &gi_rec, depth + 1, rng);
            }
            gi_traced += 1;
        }
    }

    // Lightless scenes still produce a readable image
    if scene.lights.is_empty() {
        return albedo * facing_ratio(ray.dir, rec_s.normal);
    }

    (direct + gi) * (1.0 / (gi_traced + 1) as f32)
}

fn shade_reflective(
    scene: &Scene,
    ray: &Ray,
    rec: &HitRecord,
    albedo: Color,
    smooth_shading: bool,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let rec_s = smoothed(rec, smooth_shading);
    let p = rec_s.ip + rec_s.normal * SHADOW_BIAS;
    let reflected_ray = Ray::with_gi_depth(p, reflect(ray.dir, rec_s.normal), ray.gi_depth);

    let mut reflected_color = scene.settings.background;
    if depth < MAX_DEPTH {
        let mut refl_rec = HitRecord::new(MAX_T);
        if scene.intersect(&reflected_ray, false, false, MAX_T, &mut refl_rec) {
            reflected_color = scene.shade(&reflected_ray, &refl_rec, depth + 1, rng);
        }
    }

    reflected_color * albedo
}

#[allow(clippy::too_many_arguments)]
fn shade_refractive(
    scene: &Scene,
    ray: &Ray,
    rec: &HitRecord,
    albedo: Color,
    smooth_shading: bool,
    ior: f32,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let rec_s = smoothed(rec, smooth_shading);

    // The inside test uses the geometric normal; the smoothed one can
    // disagree with it near silhouettes.
    let inside = ray.dir.dot(rec.normal) > 0.0;
    let ip_in = rec.ip - rec_s.normal * SHADOW_BIAS;
    let ip_out = rec_s.ip + rec_s.normal * SHADOW_BIAS;
    let normal = if inside { -rec_s.normal } else { rec_s.normal };
    let eta = if inside { ior } else { 1.0 / ior };

    // Reflection leg, capped shallow: mirror bounces inside glass multiply
    // fast and contribute little.
    let mut reflected_color = Color::BLACK;
    if depth < 2 {
        let reflected_dir = reflect(ray.dir, normal).normalize();
        let origin = if inside { ip_in } else { ip_out };
        let reflected_ray = Ray::with_gi_depth(origin, reflected_dir, ray.gi_depth);

        let mut refl_rec = HitRecord::new(MAX_T);
        if scene.intersect(&reflected_ray, true, false, MAX_T, &mut refl_rec) {
            reflected_color = scene.shade(&reflected_ray, &refl_rec, depth + 1, rng);
        } else {
            reflected_color = scene.settings.background;
        }
    }

    // Transmission leg; under total internal reflection the refract helper
    // already handed back the mirror direction, started inside the surface.
    let (refracted_dir, tir) = refract(ray.dir, normal, eta);
    let refracted_start = if inside && !tir { ip_out } else { ip_in };
    let refracted_ray = Ray::with_gi_depth(refracted_start, refracted_dir, ray.gi_depth);

    let mut refracted_color = Color::BLACK;
    if depth < MAX_DEPTH {
        let mut refr_rec = HitRecord::new(MAX_T);
        if scene.intersect(&refracted_ray, true, false, MAX_T, &mut refr_rec) {
            refracted_color = scene.shade(&refracted_ray, &refr_rec, depth + 1, rng);
        } else {
            refracted_color = scene.settings.background;
        }
    }

    let fresnel = 0.5 * (1.0 + ray.dir.dot(normal)).powi(5);
    (reflected_color * fresnel + refracted_color * (1.0 - fresnel)) * albedo
}

// =============================================================================
// Sampling helpers
// =============================================================================

/// A random f32 in [0, 1) from an object-safe RNG.
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    let bits = rng.next_u32();
    (bits >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// A uniformly distributed point on the unit sphere.
pub(crate) fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let theta = 2.0 * PI * gen_f32(rng);
    let z = 2.0 * gen_f32(rng) - 1.0;
    let r = (1.0 - z * z).sqrt();

    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut mean = Vec3::ZERO;
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-5);
            mean += v;
        }
        // Uniform on the sphere: the sample mean collapses toward zero
        assert!((mean / 1000.0).length() < 0.1);
    }

    #[test]
    fn test_facing_ratio_bounds() {
        // Head-on view maps to 1, grazing to 1/3
        assert!((facing_ratio(Vec3::NEG_Z, Vec3::Z) - 1.0).abs() < 1e-6);
        assert!((facing_ratio(Vec3::X, Vec3::Z) - 1.0 / 3.0).abs() < 1e-6);
    }

    use crate::mesh::Mesh;
    use crate::scene::{Light, Scene, SceneSettings};

    fn quad_mesh(z: f32, half: f32, material_index: Option<usize>) -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(-half, -half, z),
                Vec3::new(half, -half, z),
                Vec3::new(half, half, z),
                Vec3::new(-half, half, z),
            ],
            &[0, 1, 2, 0, 2, 3],
            material_index,
        )
    }

    fn hit_scene<'a>(scene: &'a Scene, ray: &Ray) -> HitRecord<'a> {
        let mut rec = HitRecord::new(MAX_T);
        assert!(scene.intersect(ray, false, false, MAX_T, &mut rec));
        rec
    }

    #[test]
    fn test_diffuse_direct_light_magnitude() {
        let mut scene = Scene::new(SceneSettings::default());
        scene.meshes.push(quad_mesh(-3.0, 5.0, Some(0)));
        scene.materials.push(Material::Diffuse {
            albedo: Color::rgb(1.0, 1.0, 1.0),
            smooth_shading: false,
        });
        let light = Light {
            position: Vec3::new(0.0, 0.0, -1.0),
            intensity: 400.0,
        };
        scene.lights.push(light);

        // gi_depth at the cap disables indirect sampling, isolating the
        // direct term
        let ray = Ray::with_gi_depth(Vec3::ZERO, Vec3::NEG_Z, GI_DEPTH);
        let rec = hit_scene(&scene, &ray);
        let mut rng = SmallRng::seed_from_u64(1);
        let color = scene.shade(&ray, &rec, 0, &mut rng);

        let p = rec.ip + rec.normal * SHADOW_BIAS;
        let ldir = light.position - p;
        let expected =
            light.intensity / (4.0 * PI * ldir.length_squared()) * ldir.normalize().dot(rec.normal);
        assert!((color.r - expected).abs() < 1e-4);
        assert!((color.g - expected).abs() < 1e-4);
    }

    #[test]
    fn test_diffuse_in_shadow_is_black() {
        let mut scene = Scene::new(SceneSettings::default());
        scene.meshes.push(quad_mesh(-3.0, 5.0, Some(0)));
        // Occluder between the surface and the light
        scene.meshes.push(quad_mesh(-2.0, 5.0, None));
        scene.materials.push(Material::Diffuse {
            albedo: Color::WHITE,
            smooth_shading: false,
        });
        scene.lights.push(Light {
            position: Vec3::new(0.0, 0.0, -1.0),
            intensity: 400.0,
        });

        let ray = Ray::with_gi_depth(Vec3::new(0.0, 0.0, -2.5), Vec3::NEG_Z, GI_DEPTH);
        let rec = hit_scene(&scene, &ray);
        let mut rng = SmallRng::seed_from_u64(1);
        let color = scene.shade(&ray, &rec, 0, &mut rng);

        // The shadow ray crosses the occluder's back face; backface
        // admission makes it count
        assert_eq!(color.r, 0.0);
        assert_eq!(color.g, 0.0);
        assert_eq!(color.b, 0.0);
    }

    #[test]
    fn test_reflective_modulates_by_albedo() {
        // Mirror facing the camera with nothing else: reflection ray exits
        // the scene and picks up the background
        let mut scene = Scene::new(SceneSettings::default());
        scene.settings.background = Color::rgb(1.0, 0.5, 0.25);
        scene.meshes.push(quad_mesh(-3.0, 5.0, Some(0)));
        scene.materials.push(Material::Reflective {
            albedo: Color::rgb(0.5, 0.5, 0.5),
            smooth_shading: false,
        });

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = hit_scene(&scene, &ray);
        let mut rng = SmallRng::seed_from_u64(1);
        let color = scene.shade(&ray, &rec, 0, &mut rng);

        assert!((color.r - 0.5).abs() < 1e-6);
        assert!((color.g - 0.25).abs() < 1e-6);
        assert!((color.b - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_reflective_depth_cap_returns_background() {
        let mut scene = Scene::new(SceneSettings::default());
        scene.settings.background = Color::rgb(0.1, 0.2, 0.3);
        scene.meshes.push(quad_mesh(-3.0, 5.0, Some(0)));
        scene.materials.push(Material::Reflective {
            albedo: Color::WHITE,
            smooth_shading: false,
        });

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = hit_scene(&scene, &ray);
        let mut rng = SmallRng::seed_from_u64(1);
        let color = scene.shade(&ray, &rec, MAX_DEPTH, &mut rng);

        assert_eq!(color, scene.settings.background * Color::WHITE);
    }

    #[test]
    fn test_refractive_normal_incidence_transmits() {
        let mut scene = Scene::new(SceneSettings::default());
        scene.settings.background = Color::rgb(0.0, 1.0, 0.0);
        scene.meshes.push(quad_mesh(-3.0, 5.0, Some(0)));
        scene.materials.push(Material::Refractive {
            albedo: Color::WHITE,
            smooth_shading: false,
            ior: 1.5,
        });

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = hit_scene(&scene, &ray);
        let mut rng = SmallRng::seed_from_u64(1);
        let color = scene.shade(&ray, &rec, 0, &mut rng);

        // fresnel = 0.5 * (1 + dir.normal)^5 = 0 head-on: pure transmission
        assert!((color.g - 1.0).abs() < 1e-5);
        assert!(color.r.abs() < 1e-5);
    }
}
