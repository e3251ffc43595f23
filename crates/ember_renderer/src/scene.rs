//! Scene ownership and top-level intersection/shading dispatch.

use ember_math::{Mat3, Ray, Vec3};
use ember_scene::{MaterialType, SceneDocument};
use rand::RngCore;

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::camera::Camera;
use crate::color::Color;
use crate::hit::HitRecord;
use crate::material::Material;
use crate::mesh::Mesh;

/// Image and dispatcher settings.
#[derive(Debug, Clone)]
pub struct SceneSettings {
    pub width: usize,
    pub height: usize,
    pub background: Color,
    /// Tile edge in pixels.
    pub bucket_size: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: Color::rgb(0.2, 0.2, 0.2),
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// A point light with radiant power `intensity`.
#[derive(Debug, Copy, Clone)]
pub struct Light {
    pub position: Vec3,
    pub intensity: f32,
}

/// Shading response for meshes with no material assigned.
const UNASSIGNED_MATERIAL: Material = Material::Constant {
    albedo: Color::rgb(0.5, 0.3, 0.9),
    smooth_shading: false,
};

/// An immutable scene: meshes, materials, lights, camera, settings.
///
/// Nothing here mutates during rendering, so the scene is shared read-only
/// across all render workers.
#[derive(Default)]
pub struct Scene {
    pub settings: SceneSettings,
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Build an engine scene from a validated document.
    pub fn from_document(doc: &SceneDocument) -> Self {
        let settings = SceneSettings {
            width: doc.settings.width,
            height: doc.settings.height,
            background: doc.settings.background.into(),
            bucket_size: doc.settings.bucket_size,
        };

        let mut camera = Camera::new(Vec3::from_array(doc.camera.position));
        if let Some(m) = doc.camera.matrix {
            // The document matrix is row-major; glam builds column-major
            camera.set_matrix(Mat3::from_cols_array(&m).transpose());
        }

        let materials = doc
            .materials
            .iter()
            .map(|m| {
                let albedo = Color::from(m.albedo);
                match m.kind {
                    MaterialType::Constant => Material::Constant {
                        albedo,
                        smooth_shading: m.smooth_shading,
                    },
                    MaterialType::Diffuse => Material::Diffuse {
                        albedo,
                        smooth_shading: m.smooth_shading,
                    },
                    MaterialType::Reflective => Material::Reflective {
                        albedo,
                        smooth_shading: m.smooth_shading,
                    },
                    MaterialType::Refractive => Material::Refractive {
                        albedo,
                        smooth_shading: m.smooth_shading,
                        ior: m.ior,
                    },
                }
            })
            .collect();

        let meshes = doc
            .objects
            .iter()
            .map(|o| {
                let vertices = o
                    .vertices
                    .chunks_exact(3)
                    .map(|c| Vec3::new(c[0], c[1], c[2]))
                    .collect();
                Mesh::new(vertices, &o.triangles, o.material_index)
            })
            .collect();

        let lights = doc
            .lights
            .iter()
            .map(|l| Light {
                position: Vec3::from_array(l.position),
                intensity: l.intensity,
            })
            .collect();

        Self {
            settings,
            camera,
            meshes,
            materials,
            lights,
        }
    }

    /// Find the nearest intersection along the ray (closest-hit) or any
    /// intersection within `max_t` (any-hit, for shadow rays).
    ///
    /// The record's distance is initialized to `max_t`; on return, a hit
    /// occurred iff the result is true, and `rec` then identifies the mesh
    /// and triangle so the shader can resolve the material.
    pub fn intersect<'a>(
        &'a self,
        ray: &Ray,
        backface: bool,
        any: bool,
        max_t: f32,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        rec.t = max_t;
        let mut found = false;

        for mesh in &self.meshes {
            if mesh.intersect(ray, backface, any, max_t, rec) {
                if any {
                    return true;
                }
                found = true;
            }
        }
        found
    }

    /// Shade a hit by dispatching to the hit mesh's material.
    pub fn shade(
        &self,
        ray: &Ray,
        rec: &HitRecord,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let material = rec
            .mesh
            .and_then(|mesh| mesh.material_index)
            .and_then(|index| self.materials.get(index))
            .unwrap_or(&UNASSIGNED_MATERIAL);

        material.shade(self, ray, rec, depth, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::MAX_T;
    use ember_scene::parse_document;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn triangle_mesh(z: f32, material_index: Option<usize>) -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(0.0, 1.0, z),
            ],
            &[0, 1, 2],
            material_index,
        )
    }

    #[test]
    fn test_closest_hit_across_meshes() {
        let mut scene = Scene::new(SceneSettings::default());
        scene.meshes.push(triangle_mesh(-5.0, Some(0)));
        scene.meshes.push(triangle_mesh(-3.0, Some(1)));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut rec = HitRecord::new(MAX_T);

        assert!(scene.intersect(&ray, false, false, MAX_T, &mut rec));
        assert!((rec.t - 3.0).abs() < 1e-5);
        assert_eq!(rec.mesh.unwrap().material_index, Some(1));
    }

    #[test]
    fn test_any_hit_stops_at_first_mesh() {
        let mut scene = Scene::new(SceneSettings::default());
        scene.meshes.push(triangle_mesh(-5.0, None));
        scene.meshes.push(triangle_mesh(-3.0, None));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut rec = HitRecord::new(MAX_T);

        assert!(scene.intersect(&ray, true, true, MAX_T, &mut rec));
        // Storage order wins in any-hit mode; the farther mesh comes first
        assert!((rec.t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_miss_leaves_record_at_ceiling() {
        let mut scene = Scene::new(SceneSettings::default());
        scene.meshes.push(triangle_mesh(-3.0, None));

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let mut rec = HitRecord::new(MAX_T);

        assert!(!scene.intersect(&ray, false, false, MAX_T, &mut rec));
        assert_eq!(rec.t, MAX_T);
        assert!(rec.mesh.is_none());
    }

    #[test]
    fn test_shade_without_material_uses_fallback() {
        let mut scene = Scene::new(SceneSettings::default());
        scene.meshes.push(triangle_mesh(-3.0, None));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut rec = HitRecord::new(MAX_T);
        assert!(scene.intersect(&ray, false, false, MAX_T, &mut rec));

        let mut rng = SmallRng::seed_from_u64(0);
        let color = scene.shade(&ray, &rec, 0, &mut rng);

        // Head-on constant shading of the debug albedo
        assert!((color.r - 0.5).abs() < 1e-4);
        assert!((color.g - 0.3).abs() < 1e-4);
        assert!((color.b - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_from_document() {
        let doc = parse_document(
            r#"{
                "settings": {
                    "background_color": [0.1, 0.2, 0.3],
                    "image_settings": { "width": 64, "height": 48, "bucket_size": 16 }
                },
                "camera": { "position": [0, 0, 1] },
                "lights": [ { "position": [0, 5, 0], "intensity": 500 } ],
                "materials": [ { "type": "reflective", "albedo": [0.9, 0.9, 0.9] } ],
                "objects": [
                    {
                        "material_index": 0,
                        "vertices": [-1, -1, -3, 1, -1, -3, 0, 1, -3],
                        "triangles": [0, 1, 2]
                    }
                ]
            }"#,
        )
        .unwrap();

        let scene = Scene::from_document(&doc);
        assert_eq!(scene.settings.width, 64);
        assert_eq!(scene.settings.bucket_size, 16);
        assert_eq!(scene.settings.background, Color::rgb(0.1, 0.2, 0.3));
        assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.lights.len(), 1);
        assert!(matches!(scene.materials[0], Material::Reflective { .. }));
    }
}
