//! High-level asset loading.
//!
//! `Asset` is a parsed document plus its resolved buffers. `load_model` runs
//! the whole pipeline: load, validate every primitive, then flatten into a
//! `TriangleRegistry`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::asset::accessor::{AccessorError, AccessorView};
use crate::asset::parser::{parse_glb, GlbError};
use crate::asset::types::Document;
use crate::registry::{RegistryError, TriangleRegistry};
use crate::validate::{validate, ValidationReport};

/// Errors that can occur during model loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GLB error: {0}")]
    Glb(#[from] GlbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read external buffer '{uri}': {source}")]
    ExternalBuffer {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported buffer URI: {0}")]
    UnsupportedUri(String),

    #[error("Buffer {0} refers to the BIN chunk but the file has none")]
    MissingBinChunk(usize),

    #[error("Asset failed validation with {} finding(s)", .0.findings.len())]
    Validation(ValidationReport),

    #[error("Accessor error: {0}")]
    Accessor(#[from] AccessorError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// A loaded binary glTF asset.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Asset name (file stem) for diagnostics
    pub name: String,

    pub document: Document,

    /// Buffer contents, indexed like `document.buffers`
    pub buffers: Vec<Vec<u8>>,

    /// Loader warnings; never fatal
    pub warnings: Vec<String>,
}

impl Asset {
    /// Load a `.glb` file. External buffers resolve relative to its directory.
    pub fn open<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed");
        let data = std::fs::read(path)?;
        let base_dir = path.parent().map(Path::to_path_buf);

        Self::from_glb(&data, name, base_dir)
    }

    /// Parse GLB bytes (useful for testing).
    pub fn from_glb(data: &[u8], name: &str, base_dir: Option<PathBuf>) -> LoadResult<Self> {
        let glb = parse_glb(data)?;
        let document: Document = serde_json::from_slice(glb.json)?;

        let mut warnings = glb.warnings;

        if document.asset.version != "2.0" {
            warnings.push(format!(
                "Asset version '{}' is not 2.0, loading anyway",
                document.asset.version
            ));
        }
        for extension in &document.extensions_required {
            warnings.push(format!("Required extension '{extension}' is not supported"));
        }

        let mut buffers = Vec::with_capacity(document.buffers.len());
        for (index, buffer) in document.buffers.iter().enumerate() {
            let data = match &buffer.uri {
                None => glb
                    .bin
                    .ok_or(LoadError::MissingBinChunk(index))?
                    .to_vec(),
                Some(uri) if uri.starts_with("data:") => {
                    return Err(LoadError::UnsupportedUri(truncate_uri(uri)));
                }
                Some(uri) => {
                    let path = match &base_dir {
                        Some(dir) => dir.join(uri),
                        None => PathBuf::from(uri),
                    };
                    std::fs::read(&path).map_err(|source| LoadError::ExternalBuffer {
                        uri: uri.clone(),
                        source,
                    })?
                }
            };

            if data.len() < buffer.byte_length {
                warnings.push(format!(
                    "Buffer {index} declares {} bytes but only {} are present",
                    buffer.byte_length,
                    data.len()
                ));
            }
            buffers.push(data);
        }

        Ok(Self {
            name: name.to_string(),
            document,
            buffers,
            warnings,
        })
    }

    /// Bounds-checked view of an accessor's elements.
    pub fn accessor_view(&self, index: usize) -> Result<AccessorView<'_>, AccessorError> {
        let accessor = self
            .document
            .accessors
            .get(index)
            .ok_or(AccessorError::MissingAccessor(index))?;
        let view_index = accessor
            .buffer_view
            .ok_or(AccessorError::NoBufferView(index))?;
        let view = self
            .document
            .buffer_views
            .get(view_index)
            .ok_or(AccessorError::MissingBufferView(view_index))?;
        let buffer = self
            .buffers
            .get(view.buffer)
            .ok_or(AccessorError::MissingBuffer(view.buffer))?;

        // The view itself must fit the buffer before the accessor can fit the view
        let view_end = view.byte_offset.saturating_add(view.byte_length);
        if view_end > buffer.len() {
            return Err(AccessorError::OutOfBounds {
                start: view.byte_offset,
                end: view_end,
                available: buffer.len(),
            });
        }
        let view_bytes = &buffer[view.byte_offset..view_end];

        if accessor.byte_offset > view_bytes.len() {
            let start = view.byte_offset.saturating_add(accessor.byte_offset);
            return Err(AccessorError::OutOfBounds {
                start,
                end: start,
                available: view_end,
            });
        }

        AccessorView::new(
            &view_bytes[accessor.byte_offset..],
            view.byte_stride.unwrap_or(0),
            accessor.count,
            accessor.accessor_type(),
            accessor.component_type(),
            view.byte_offset + accessor.byte_offset,
        )
    }
}

fn truncate_uri(uri: &str) -> String {
    match uri.find(',') {
        Some(comma) => format!("{},...", &uri[..comma]),
        None => uri.to_string(),
    }
}

/// Log loader warnings and validation results for an asset.
fn report(asset: &Asset, validation: &ValidationReport) {
    for warning in &asset.warnings {
        log::warn!("[{}] {}", asset.name, warning);
    }
    for warning in &validation.warnings {
        log::warn!("{warning}");
    }
    for finding in &validation.findings {
        log::error!("{finding}");
    }
}

/// Load a `.glb` model and flatten it into a triangle registry.
///
/// Every validation finding is logged before the asset is rejected; an
/// invalid asset is returned as `LoadError::Validation`, never as a partial
/// registry.
///
/// # Example
///
/// ```ignore
/// use glint_core::load_model;
///
/// let registry = load_model("amongus.glb")?;
/// ```
pub fn load_model<P: AsRef<Path>>(path: P) -> LoadResult<TriangleRegistry> {
    let asset = Asset::open(path)?;
    let validation = validate(&asset);

    report(&asset, &validation);

    if !validation.is_valid() {
        return Err(LoadError::Validation(validation));
    }

    let registry = TriangleRegistry::build(&asset, &validation)?;

    log::info!(
        "Loaded '{}': {} meshes, {} vertices, {} triangles",
        asset.name,
        asset.document.meshes.len(),
        registry.vertex_count(),
        registry.triangle_count()
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{scratch_dir, GlbBuilder};
    use serde_json::json;

    #[test]
    fn test_from_glb_resolves_bin_chunk() {
        let mut builder = GlbBuilder::new();
        let positions = builder.vec3_f32(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        builder.mesh("Tri", vec![json!({ "attributes": { "POSITION": positions } })]);

        let asset = Asset::from_glb(&builder.build(), "tri", None).unwrap();

        assert_eq!(asset.buffers.len(), 1);
        assert!(asset.warnings.is_empty());
        let view = asset.accessor_view(positions).unwrap();
        assert_eq!(view.count(), 3);
        assert_eq!(view.read_vec3().unwrap()[1].x, 1.0);
    }

    #[test]
    fn test_version_and_extension_warnings() {
        let document = json!({
            "asset": { "version": "1.0" },
            "extensionsRequired": ["KHR_draco_mesh_compression"],
        });
        let data = GlbBuilder::container(&document, None);

        let asset = Asset::from_glb(&data, "old", None).unwrap();

        assert_eq!(asset.warnings.len(), 2);
        assert!(asset.warnings[0].contains("1.0"));
        assert!(asset.warnings[1].contains("KHR_draco_mesh_compression"));
    }

    #[test]
    fn test_missing_bin_chunk() {
        let document = json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 16 }],
        });
        let data = GlbBuilder::container(&document, None);

        let err = Asset::from_glb(&data, "nobin", None).unwrap_err();

        assert!(matches!(err, LoadError::MissingBinChunk(0)));
    }

    #[test]
    fn test_data_uri_rejected() {
        let document = json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 4, "uri": "data:application/octet-stream;base64,AAAAAA==" }],
        });
        let data = GlbBuilder::container(&document, None);

        let err = Asset::from_glb(&data, "datauri", None).unwrap_err();

        match err {
            LoadError::UnsupportedUri(uri) => assert!(!uri.contains("AAAA")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_external_buffer() {
        let dir = scratch_dir("external_buffer");
        let floats: Vec<u8> = [0.5f32, 1.5, 2.5].iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(dir.join("extra.bin"), &floats).unwrap();

        let document = json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 12, "uri": "extra.bin" }],
            "bufferViews": [{ "buffer": 0, "byteLength": 12 }],
            "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 1, "type": "VEC3" }],
        });
        let data = GlbBuilder::container(&document, None);

        let asset = Asset::from_glb(&data, "ext", Some(dir)).unwrap();
        let values = asset.accessor_view(0).unwrap().read_vec3().unwrap();

        assert_eq!(values[0].z, 2.5);
    }

    #[test]
    fn test_missing_external_buffer() {
        let dir = scratch_dir("missing_external_buffer");
        let document = json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 12, "uri": "nowhere.bin" }],
        });
        let data = GlbBuilder::container(&document, None);

        let err = Asset::from_glb(&data, "ext", Some(dir)).unwrap_err();

        assert!(matches!(err, LoadError::ExternalBuffer { .. }));
    }

    #[test]
    fn test_short_buffer_warns() {
        let document = json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 64 }],
        });
        let data = GlbBuilder::container(&document, Some(&[0u8; 8]));

        let asset = Asset::from_glb(&data, "short", None).unwrap();

        assert_eq!(asset.warnings.len(), 1);
        assert!(asset.warnings[0].contains("64"));
    }

    #[test]
    fn test_malformed_json() {
        let data = GlbBuilder::raw_container(b"{ not json }", None);

        assert!(matches!(
            Asset::from_glb(&data, "bad", None),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_accessor_view_errors() {
        let document = json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": 8 }],
            "bufferViews": [
                { "buffer": 0, "byteLength": 8 },
                { "buffer": 0, "byteOffset": 4, "byteLength": 8 },
                { "buffer": 3, "byteLength": 8 },
                { "buffer": 0, "byteOffset": 4, "byteLength": 4 }
            ],
            "accessors": [
                { "componentType": 5126, "count": 1, "type": "VEC3" },
                { "bufferView": 0, "componentType": 5126, "count": 1, "type": "VEC3" },
                { "bufferView": 1, "componentType": 5126, "count": 1, "type": "SCALAR" },
                { "bufferView": 2, "componentType": 5126, "count": 1, "type": "SCALAR" },
                { "bufferView": 9, "componentType": 5126, "count": 1, "type": "SCALAR" },
                { "bufferView": 3, "byteOffset": usize::MAX, "componentType": 5126, "count": 1, "type": "SCALAR" }
            ],
        });
        let data = GlbBuilder::container(&document, Some(&[0u8; 8]));
        let asset = Asset::from_glb(&data, "views", None).unwrap();

        assert_eq!(asset.accessor_view(0).unwrap_err(), AccessorError::NoBufferView(0));
        assert!(matches!(
            asset.accessor_view(1).unwrap_err(),
            AccessorError::OutOfBounds { .. }
        ));
        assert!(matches!(
            asset.accessor_view(2).unwrap_err(),
            AccessorError::OutOfBounds { start: 4, end: 12, available: 8 }
        ));
        assert_eq!(asset.accessor_view(3).unwrap_err(), AccessorError::MissingBuffer(3));
        assert_eq!(asset.accessor_view(4).unwrap_err(), AccessorError::MissingBufferView(9));
        assert_eq!(
            asset.accessor_view(5).unwrap_err(),
            AccessorError::OutOfBounds {
                start: usize::MAX,
                end: usize::MAX,
                available: 8
            }
        );
        assert_eq!(asset.accessor_view(6).unwrap_err(), AccessorError::MissingAccessor(6));
    }

    #[test]
    fn test_load_model_valid() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = scratch_dir("load_model_valid");
        let path = dir.join("quad.glb");

        let mut builder = GlbBuilder::new();
        let primitive = builder.colored_primitive(4, &[0, 1, 2, 0, 2, 3]);
        builder.mesh("Quad", vec![primitive]);
        std::fs::write(&path, builder.build()).unwrap();

        let registry = load_model(&path).unwrap();

        assert_eq!(registry.vertex_count(), 4);
        assert_eq!(registry.triangle_count(), 2);
    }

    #[test]
    fn test_load_model_invalid() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = scratch_dir("load_model_invalid");
        let path = dir.join("lines.glb");

        let mut builder = GlbBuilder::new();
        let mut primitive = builder.colored_primitive(3, &[0, 1, 2]);
        primitive["mode"] = json!(1);
        builder.mesh("Wire", vec![primitive]);
        std::fs::write(&path, builder.build()).unwrap();

        match load_model(&path) {
            Err(LoadError::Validation(report)) => {
                assert_eq!(report.findings.len(), 1);
                assert!(report.findings[0].to_string().contains("LINES"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_load_model_missing_file() {
        let dir = scratch_dir("load_model_missing");

        assert!(matches!(
            load_model(dir.join("absent.glb")),
            Err(LoadError::Io(_))
        ));
    }
}
