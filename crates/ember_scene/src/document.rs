//! Plain-data scene document types.
//!
//! These mirror the fields of the `.crtscene` JSON format one-to-one and
//! carry no behavior; the renderer converts a validated document into its
//! own scene representation.

/// Image and dispatcher settings.
#[derive(Clone, Debug)]
pub struct SettingsDocument {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Background color, linear RGB in [0, 1].
    pub background: [f32; 3],
    /// Tile edge in pixels.
    pub bucket_size: usize,
}

/// Camera placement.
#[derive(Clone, Debug)]
pub struct CameraDocument {
    pub position: [f32; 3],
    /// Row-major 3x3 rotation applied to the camera-local forward direction.
    /// Identity when the document omits it.
    pub matrix: Option<[f32; 9]>,
}

/// A point light.
#[derive(Clone, Debug)]
pub struct LightDocument {
    pub position: [f32; 3],
    /// Radiant power.
    pub intensity: f32,
}

/// Material variant selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialType {
    Constant,
    Diffuse,
    Reflective,
    Refractive,
}

/// A surface material description.
#[derive(Clone, Debug)]
pub struct MaterialDocument {
    pub kind: MaterialType,
    /// Base reflectance, linear RGB in [0, 1].
    pub albedo: [f32; 3],
    pub smooth_shading: bool,
    /// Index of refraction; meaningful for `Refractive` only.
    pub ior: f32,
}

/// A triangle mesh description.
#[derive(Clone, Debug)]
pub struct ObjectDocument {
    /// Flat x/y/z triples; length is a multiple of 3.
    pub vertices: Vec<f32>,
    /// Flat vertex-index triples; length is a multiple of 3 and every index
    /// is within the vertex list.
    pub triangles: Vec<u32>,
    /// Index into the document's material list, if any.
    pub material_index: Option<usize>,
}

/// A complete, validated scene description.
#[derive(Clone, Debug)]
pub struct SceneDocument {
    pub settings: SettingsDocument,
    pub camera: CameraDocument,
    pub lights: Vec<LightDocument>,
    pub materials: Vec<MaterialDocument>,
    pub objects: Vec<ObjectDocument>,
}

impl ObjectDocument {
    /// Number of vertices described by the flat array.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles described by the flat array.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}
