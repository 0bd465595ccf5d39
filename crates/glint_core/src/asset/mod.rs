//! Binary glTF 2.0 support.
//!
//! Only what the renderer consumes is modelled: meshes, primitives,
//! accessors, buffer views and buffers.
//!
//! ## Supported
//!
//! - `.glb` containers with a JSON chunk and an optional BIN chunk
//! - Buffers stored in the BIN chunk or in files next to the asset
//! - Interleaved buffer views (`byteStride`)
//!
//! ## Not Supported
//!
//! - `.gltf` JSON files and `data:` URIs
//! - Sparse accessors, scene/node transforms, materials, textures

mod accessor;
mod loader;
mod parser;
mod types;

pub use accessor::*;
pub use loader::*;
pub use parser::*;
pub use types::*;
