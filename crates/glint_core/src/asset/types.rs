//! glTF document types.
//!
//! These mirror the JSON chunk closely. Enumerated fields are kept as raw
//! values so that validation, not deserialization, decides what is acceptable.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Top-level glTF document (the subset the loader reads).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub asset: AssetInfo,

    #[serde(default)]
    pub meshes: Vec<Mesh>,

    #[serde(default)]
    pub accessors: Vec<Accessor>,

    #[serde(default)]
    pub buffer_views: Vec<BufferView>,

    #[serde(default)]
    pub buffers: Vec<Buffer>,

    #[serde(default)]
    pub extensions_required: Vec<String>,
}

/// The `asset` block.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    #[serde(default)]
    pub version: String,
}

/// A named set of primitives.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Mesh {
    pub name: Option<String>,

    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    /// Name used in diagnostics, falling back to the mesh index.
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("mesh[{index}]"),
        }
    }
}

/// A single draw call worth of geometry.
#[derive(Clone, Debug, Deserialize)]
pub struct Primitive {
    /// Semantic name (e.g. `POSITION`) to accessor index
    #[serde(default)]
    pub attributes: BTreeMap<String, usize>,

    pub indices: Option<usize>,

    pub material: Option<usize>,

    /// Topology code, TRIANGLES when absent
    #[serde(default = "default_mode")]
    pub mode: u32,
}

fn default_mode() -> u32 {
    Mode::Triangles.code()
}

impl Primitive {
    /// Decoded topology.
    pub fn mode(&self) -> Mode {
        Mode::from_code(self.mode)
    }

    /// Accessor index of a vertex attribute.
    pub fn attribute(&self, semantic: &str) -> Option<usize> {
        self.attributes.get(semantic).copied()
    }
}

/// A typed view into a buffer view.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: Option<usize>,

    #[serde(default)]
    pub byte_offset: usize,

    pub component_type: u32,

    pub count: usize,

    #[serde(rename = "type")]
    pub kind: String,
}

impl Accessor {
    pub fn accessor_type(&self) -> AccessorType {
        AccessorType::from_name(&self.kind)
    }

    pub fn component_type(&self) -> ComponentType {
        ComponentType::from_code(self.component_type)
    }
}

/// A byte range of a buffer.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,

    #[serde(default)]
    pub byte_offset: usize,

    pub byte_length: usize,

    pub byte_stride: Option<usize>,
}

/// A binary blob, either the GLB BIN chunk (no `uri`) or an external file.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    pub byte_length: usize,

    pub uri: Option<String>,
}

/// Accessor element shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Unknown,
}

impl AccessorType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "SCALAR" => Self::Scalar,
            "VEC2" => Self::Vec2,
            "VEC3" => Self::Vec3,
            "VEC4" => Self::Vec4,
            "MAT2" => Self::Mat2,
            "MAT3" => Self::Mat3,
            "MAT4" => Self::Mat4,
            _ => Self::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Number of components per element.
    pub fn components(self) -> Option<usize> {
        match self {
            Self::Scalar => Some(1),
            Self::Vec2 => Some(2),
            Self::Vec3 => Some(3),
            Self::Vec4 | Self::Mat2 => Some(4),
            Self::Mat3 => Some(9),
            Self::Mat4 => Some(16),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for AccessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accessor component encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
    Double,
    Unknown,
}

impl ComponentType {
    pub fn from_code(code: u32) -> Self {
        match code {
            5120 => Self::Byte,
            5121 => Self::UnsignedByte,
            5122 => Self::Short,
            5123 => Self::UnsignedShort,
            5124 => Self::Int,
            5125 => Self::UnsignedInt,
            5126 => Self::Float,
            5130 => Self::Double,
            _ => Self::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Byte => "BYTE",
            Self::UnsignedByte => "UNSIGNED_BYTE",
            Self::Short => "SHORT",
            Self::UnsignedShort => "UNSIGNED_SHORT",
            Self::Int => "INT",
            Self::UnsignedInt => "UNSIGNED_INT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> Option<usize> {
        match self {
            Self::Byte | Self::UnsignedByte => Some(1),
            Self::Short | Self::UnsignedShort => Some(2),
            Self::Int | Self::UnsignedInt | Self::Float => Some(4),
            Self::Double => Some(8),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Primitive topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Unknown(u32),
}

impl Mode {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Points,
            1 => Self::Lines,
            2 => Self::LineLoop,
            3 => Self::LineStrip,
            4 => Self::Triangles,
            5 => Self::TriangleStrip,
            6 => Self::TriangleFan,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Points => 0,
            Self::Lines => 1,
            Self::LineLoop => 2,
            Self::LineStrip => 3,
            Self::Triangles => 4,
            Self::TriangleStrip => 5,
            Self::TriangleFan => 6,
            Self::Unknown(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Points => "POINTS",
            Self::Lines => "LINES",
            Self::LineLoop => "LINE_LOOP",
            Self::LineStrip => "LINE_STRIP",
            Self::Triangles => "TRIANGLES",
            Self::TriangleStrip => "TRIANGLE_STRIP",
            Self::TriangleFan => "TRIANGLE_FAN",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
