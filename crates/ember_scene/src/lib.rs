//! Declarative scene documents for the Ember renderer.
//!
//! This crate parses the JSON `.crtscene` format into a plain-data
//! [`SceneDocument`] and validates it: every index is checked against the
//! arrays it points into, so the renderer can consume the document without
//! re-validating.
//!
//! # Example
//!
//! ```ignore
//! let document = ember_scene::load_scene("cornell.crtscene")?;
//! println!("{} objects, {} materials", document.objects.len(), document.materials.len());
//! ```

pub mod document;
pub mod parser;

pub use document::{
    CameraDocument, LightDocument, MaterialDocument, MaterialType, ObjectDocument, SceneDocument,
    SettingsDocument,
};
pub use parser::{load_scene, parse_document, SceneError, SceneResult};
