//! Glint Core - asset loading and the flattened scene for the ray tracer.
//!
//! This crate provides:
//!
//! - **Asset loading**: binary glTF (`.glb`) container parsing and typed
//!   accessor reads
//! - **Validation**: an accumulative check of every primitive against the
//!   attribute contract the renderer relies on
//! - **Triangle registry**: all accepted geometry flattened into one
//!   struct-of-arrays vertex set with globally valid triangle indices
//!
//! # Example
//!
//! ```ignore
//! use glint_core::load_model;
//!
//! let registry = load_model("scene.glb")?;
//! println!("{} vertices, {} triangles",
//!     registry.vertex_count(),
//!     registry.triangle_count());
//! ```

pub mod asset;
pub mod registry;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use asset::{load_model, Asset, LoadError, LoadResult};
pub use registry::{RegistryError, TriangleRegistry};
pub use validate::{validate, FindingKind, ValidationFinding, ValidationReport, ValidationWarning};
