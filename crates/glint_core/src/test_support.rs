//! In-memory GLB fixtures for tests.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::asset::{Asset, CHUNK_BIN, CHUNK_JSON, GLB_MAGIC};

/// Builds a GLB file with a single BIN buffer.
#[derive(Default)]
pub(crate) struct GlbBuilder {
    bin: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes as a new buffer view, 4-byte aligned.
    pub fn view(&mut self, bytes: &[u8]) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        }));
        self.buffer_views.len() - 1
    }

    /// Append raw bytes and an accessor describing them.
    pub fn accessor(&mut self, bytes: &[u8], component_type: u32, kind: &str, count: usize) -> usize {
        let view = self.view(bytes);
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": component_type,
            "count": count,
            "type": kind,
        }));
        self.accessors.len() - 1
    }

    pub fn vec3_f32(&mut self, values: &[[f32; 3]]) -> usize {
        let bytes: Vec<u8> = values.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
        self.accessor(&bytes, 5126, "VEC3", values.len())
    }

    pub fn vec4_u16(&mut self, values: &[[u16; 4]]) -> usize {
        let bytes: Vec<u8> = values.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
        self.accessor(&bytes, 5123, "VEC4", values.len())
    }

    pub fn indices_u16(&mut self, values: &[u16]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.accessor(&bytes, 5123, "SCALAR", values.len())
    }

    pub fn indices_u32(&mut self, values: &[u32]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.accessor(&bytes, 5125, "SCALAR", values.len())
    }

    /// A primitive that satisfies the attribute contract.
    ///
    /// Vertex `i` sits at `(i, i % 2, 0)` with a +Z normal and a red channel
    /// of `i * 1000`.
    pub fn colored_primitive(&mut self, vertex_count: usize, indices: &[u16]) -> Value {
        let positions: Vec<[f32; 3]> = (0..vertex_count)
            .map(|i| [i as f32, (i % 2) as f32, 0.0])
            .collect();
        let normals = vec![[0.0, 0.0, 1.0]; vertex_count];
        let colors: Vec<[u16; 4]> = (0..vertex_count)
            .map(|i| [(i * 1000) as u16, 0, 65535, 65535])
            .collect();

        let position = self.vec3_f32(&positions);
        let normal = self.vec3_f32(&normals);
        let color = self.vec4_u16(&colors);
        let index = self.indices_u16(indices);

        json!({
            "attributes": { "POSITION": position, "NORMAL": normal, "COLOR_0": color },
            "indices": index,
        })
    }

    pub fn mesh(&mut self, name: &str, primitives: Vec<Value>) {
        self.meshes.push(json!({ "name": name, "primitives": primitives }));
    }

    pub fn document(&self) -> Value {
        let mut document = json!({
            "asset": { "version": "2.0", "generator": "glint tests" },
            "meshes": self.meshes,
            "accessors": self.accessors,
            "bufferViews": self.buffer_views,
        });
        if !self.bin.is_empty() {
            document["buffers"] = json!([{ "byteLength": self.bin.len() }]);
        }
        document
    }

    pub fn build(&self) -> Vec<u8> {
        let bin = if self.bin.is_empty() {
            None
        } else {
            Some(self.bin.as_slice())
        };
        Self::container(&self.document(), bin)
    }

    pub fn to_asset(&self) -> Asset {
        Asset::from_glb(&self.build(), "test", None).unwrap()
    }

    /// Wrap a JSON document and optional BIN payload in a GLB container.
    pub fn container(document: &Value, bin: Option<&[u8]>) -> Vec<u8> {
        let json = serde_json::to_vec(document).unwrap();
        Self::raw_container(&json, bin)
    }

    pub fn raw_container(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
        let mut json = json.to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let mut body = Vec::new();
        body.extend_from_slice(&(json.len() as u32).to_le_bytes());
        body.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        body.extend_from_slice(&json);

        if let Some(bin) = bin {
            let mut bin = bin.to_vec();
            while bin.len() % 4 != 0 {
                bin.push(0);
            }
            body.extend_from_slice(&(bin.len() as u32).to_le_bytes());
            body.extend_from_slice(&CHUNK_BIN.to_le_bytes());
            body.extend_from_slice(&bin);
        }

        let mut data = Vec::with_capacity(12 + body.len());
        data.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&((12 + body.len()) as u32).to_le_bytes());
        data.extend_from_slice(&body);
        data
    }
}

/// A fresh per-process scratch directory.
pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("glint_core_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
