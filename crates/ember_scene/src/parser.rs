//! JSON scene-file parsing and validation.
//!
//! The parser walks the document at the `serde_json::Value` level so every
//! error can name the field it came from. Structural validation happens
//! here; the renderer trusts the resulting [`SceneDocument`].

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::document::{
    CameraDocument, LightDocument, MaterialDocument, MaterialType, ObjectDocument, SceneDocument,
    SettingsDocument,
};

/// Default tile edge when the document does not specify one.
pub const DEFAULT_BUCKET_SIZE: usize = 24;

/// Errors produced while loading a scene file.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` is not {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("field `{field}` has {len} elements, expected {expected}")]
    BadArrayLength {
        field: String,
        len: usize,
        expected: &'static str,
    },

    #[error("object {object}: triangle index {index} out of range ({count} vertices)")]
    TriangleIndexOutOfRange {
        object: usize,
        index: u64,
        count: usize,
    },

    #[error("object {object}: material index {index} out of range ({count} materials)")]
    MaterialIndexOutOfRange {
        object: usize,
        index: usize,
        count: usize,
    },

    #[error("material {index}: unknown type `{kind}`")]
    UnknownMaterialType { index: usize, kind: String },
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;

/// Load and validate a `.crtscene` file.
pub fn load_scene(path: impl AsRef<Path>) -> SceneResult<SceneDocument> {
    let text = std::fs::read_to_string(path)?;
    parse_document(&text)
}

/// Parse and validate a scene document from JSON text.
pub fn parse_document(text: &str) -> SceneResult<SceneDocument> {
    let root: Value = serde_json::from_str(text)?;

    let settings = parse_settings(&root)?;
    let camera = parse_camera(&root)?;
    let lights = parse_lights(&root)?;
    let materials = parse_materials(&root)?;
    let objects = parse_objects(&root, materials.len())?;

    log::debug!(
        "scene document: {}x{}, {} objects, {} materials, {} lights",
        settings.width,
        settings.height,
        objects.len(),
        materials.len(),
        lights.len()
    );

    Ok(SceneDocument {
        settings,
        camera,
        lights,
        materials,
        objects,
    })
}

fn parse_settings(root: &Value) -> SceneResult<SettingsDocument> {
    let settings = require(root, "settings")?;
    let image = require_in(settings, "settings", "image_settings")?;

    let width = get_usize(image, "settings.image_settings", "width")?;
    let height = get_usize(image, "settings.image_settings", "height")?;
    let background = get_vec3(settings, "settings", "background_color")?;

    // bucket_size historically lived under image_settings; accept it in
    // either place and fall back to the default.
    let bucket_size = match image.get("bucket_size").or_else(|| settings.get("bucket_size")) {
        Some(v) => as_usize(v, "settings.bucket_size")?,
        None => DEFAULT_BUCKET_SIZE,
    };

    Ok(SettingsDocument {
        width,
        height,
        background,
        bucket_size,
    })
}

fn parse_camera(root: &Value) -> SceneResult<CameraDocument> {
    let camera = require(root, "camera")?;
    let position = get_vec3(camera, "camera", "position")?;

    let matrix = match camera.get("matrix") {
        Some(v) => {
            let elements = as_f32_array(v, "camera.matrix")?;
            if elements.len() != 9 {
                return Err(SceneError::BadArrayLength {
                    field: "camera.matrix".into(),
                    len: elements.len(),
                    expected: "9",
                });
            }
            let mut m = [0.0f32; 9];
            m.copy_from_slice(&elements);
            Some(m)
        }
        None => None,
    };

    Ok(CameraDocument { position, matrix })
}

fn parse_lights(root: &Value) -> SceneResult<Vec<LightDocument>> {
    let mut lights = Vec::new();
    let Some(value) = root.get("lights") else {
        return Ok(lights);
    };
    let array = as_array(value, "lights")?;

    for (i, entry) in array.iter().enumerate() {
        let path = format!("lights[{i}]");
        let position = get_vec3(entry, &path, "position")?;
        let intensity = get_f32(entry, &path, "intensity")?;
        lights.push(LightDocument {
            position,
            intensity,
        });
    }
    Ok(lights)
}

fn parse_materials(root: &Value) -> SceneResult<Vec<MaterialDocument>> {
    let mut materials = Vec::new();
    let Some(value) = root.get("materials") else {
        return Ok(materials);
    };
    let array = as_array(value, "materials")?;

    for (i, entry) in array.iter().enumerate() {
        let path = format!("materials[{i}]");
        let kind_name = get_str(entry, &path, "type")?;
        let kind = match kind_name {
            "constant" => MaterialType::Constant,
            "diffuse" => MaterialType::Diffuse,
            "reflective" => MaterialType::Reflective,
            "refractive" => MaterialType::Refractive,
            other => {
                return Err(SceneError::UnknownMaterialType {
                    index: i,
                    kind: other.to_string(),
                })
            }
        };

        let albedo = get_vec3(entry, &path, "albedo")?;
        let smooth_shading = match entry.get("smooth_shading") {
            Some(v) => v.as_bool().ok_or_else(|| SceneError::WrongType {
                field: format!("{path}.smooth_shading"),
                expected: "a boolean",
            })?,
            None => false,
        };
        let ior = match entry.get("ior") {
            Some(v) => as_f32(v, &format!("{path}.ior"))?,
            None => 1.0,
        };

        materials.push(MaterialDocument {
            kind,
            albedo,
            smooth_shading,
            ior,
        });
    }
    Ok(materials)
}

fn parse_objects(root: &Value, material_count: usize) -> SceneResult<Vec<ObjectDocument>> {
    let mut objects = Vec::new();
    let Some(value) = root.get("objects") else {
        return Ok(objects);
    };
    let array = as_array(value, "objects")?;

    for (i, entry) in array.iter().enumerate() {
        let path = format!("objects[{i}]");

        let vertices_field = format!("{path}.vertices");
        let vertices = as_f32_array(
            entry
                .get("vertices")
                .ok_or_else(|| SceneError::MissingField(vertices_field.clone()))?,
            &vertices_field,
        )?;
        if vertices.len() % 3 != 0 {
            return Err(SceneError::BadArrayLength {
                field: vertices_field,
                len: vertices.len(),
                expected: "a multiple of 3",
            });
        }
        let vertex_count = vertices.len() / 3;

        let triangles_field = format!("{path}.triangles");
        let triangles_value = entry
            .get("triangles")
            .ok_or_else(|| SceneError::MissingField(triangles_field.clone()))?;
        let mut triangles = Vec::new();
        for element in as_array(triangles_value, &triangles_field)? {
            let index = element.as_u64().ok_or_else(|| SceneError::WrongType {
                field: triangles_field.clone(),
                expected: "an array of non-negative integers",
            })?;
            if index as usize >= vertex_count {
                return Err(SceneError::TriangleIndexOutOfRange {
                    object: i,
                    index,
                    count: vertex_count,
                });
            }
            triangles.push(index as u32);
        }
        if triangles.len() % 3 != 0 {
            return Err(SceneError::BadArrayLength {
                field: triangles_field,
                len: triangles.len(),
                expected: "a multiple of 3",
            });
        }

        let material_index = match entry.get("material_index") {
            None | Some(Value::Null) => None,
            Some(v) => {
                let index = v.as_u64().ok_or_else(|| SceneError::WrongType {
                    field: format!("{path}.material_index"),
                    expected: "a non-negative integer",
                })? as usize;
                if index >= material_count {
                    return Err(SceneError::MaterialIndexOutOfRange {
                        object: i,
                        index,
                        count: material_count,
                    });
                }
                Some(index)
            }
        };

        objects.push(ObjectDocument {
            vertices,
            triangles,
            material_index,
        });
    }
    Ok(objects)
}

// =============================================================================
// Value accessors
// =============================================================================

fn require<'a>(root: &'a Value, field: &str) -> SceneResult<&'a Value> {
    root.get(field)
        .ok_or_else(|| SceneError::MissingField(field.to_string()))
}

fn require_in<'a>(parent: &'a Value, parent_path: &str, field: &str) -> SceneResult<&'a Value> {
    parent
        .get(field)
        .ok_or_else(|| SceneError::MissingField(format!("{parent_path}.{field}")))
}

fn as_array<'a>(value: &'a Value, field: &str) -> SceneResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| SceneError::WrongType {
        field: field.to_string(),
        expected: "an array",
    })
}

fn as_f32(value: &Value, field: &str) -> SceneResult<f32> {
    value
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| SceneError::WrongType {
            field: field.to_string(),
            expected: "a number",
        })
}

fn as_usize(value: &Value, field: &str) -> SceneResult<usize> {
    value
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| SceneError::WrongType {
            field: field.to_string(),
            expected: "a non-negative integer",
        })
}

fn as_f32_array(value: &Value, field: &str) -> SceneResult<Vec<f32>> {
    let array = as_array(value, field)?;
    let mut out = Vec::with_capacity(array.len());
    for element in array {
        out.push(as_f32(element, field)?);
    }
    Ok(out)
}

fn get_f32(parent: &Value, parent_path: &str, field: &str) -> SceneResult<f32> {
    as_f32(
        require_in(parent, parent_path, field)?,
        &format!("{parent_path}.{field}"),
    )
}

fn get_usize(parent: &Value, parent_path: &str, field: &str) -> SceneResult<usize> {
    as_usize(
        require_in(parent, parent_path, field)?,
        &format!("{parent_path}.{field}"),
    )
}

fn get_str<'a>(parent: &'a Value, parent_path: &str, field: &str) -> SceneResult<&'a str> {
    require_in(parent, parent_path, field)?
        .as_str()
        .ok_or_else(|| SceneError::WrongType {
            field: format!("{parent_path}.{field}"),
            expected: "a string",
        })
}

fn get_vec3(parent: &Value, parent_path: &str, field: &str) -> SceneResult<[f32; 3]> {
    let path = format!("{parent_path}.{field}");
    let elements = as_f32_array(require_in(parent, parent_path, field)?, &path)?;
    if elements.len() != 3 {
        return Err(SceneError::BadArrayLength {
            field: path,
            len: elements.len(),
            expected: "3",
        });
    }
    Ok([elements[0], elements[1], elements[2]])
}
