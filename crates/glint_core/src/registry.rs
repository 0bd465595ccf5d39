//! The flattened triangle registry.
//!
//! All accepted geometry lives in one set of parallel vertex arrays. Each
//! primitive's local indices are rebased onto the running vertex count, so
//! every triangle indexes straight into the shared arrays.

use glint_math::{UVec3, Vec3, Vec4};
use thiserror::Error;

use crate::asset::{Asset, LoadResult, Primitive};
use crate::validate::ValidationReport;

/// Errors raised while appending geometry to a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Primitive has {positions} positions, {normals} normals and {colors} colors")]
    AttributeLengthMismatch {
        positions: usize,
        normals: usize,
        colors: usize,
    },

    #[error("Local index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Primitive has no {0} attribute")]
    MissingAttribute(&'static str),

    #[error("Vertex count {0} does not fit in 32-bit indices")]
    TooManyVertices(usize),
}

/// Flat, render-ready scene geometry.
///
/// Invariant: every component of every triangle is below `vertex_count()`.
#[derive(Clone, Debug, Default)]
pub struct TriangleRegistry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Vec<Vec4>,
    triangles: Vec<UVec3>,
}

impl TriangleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with room for `vertices` vertices.
    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(vertices / 3),
        }
    }

    /// Append one primitive.
    ///
    /// `indices` are local to this primitive and are offset by the number of
    /// vertices already in the registry. Trailing indices that do not form a
    /// whole triangle are dropped. Nothing is appended on error.
    pub fn push_primitive(
        &mut self,
        positions: &[Vec3],
        normals: &[Vec3],
        colors: &[Vec4],
        indices: &[u32],
    ) -> Result<(), RegistryError> {
        if normals.len() != positions.len() || colors.len() != positions.len() {
            return Err(RegistryError::AttributeLengthMismatch {
                positions: positions.len(),
                normals: normals.len(),
                colors: colors.len(),
            });
        }

        let local_count = positions.len();
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= local_count) {
            return Err(RegistryError::IndexOutOfRange {
                index,
                vertex_count: local_count,
            });
        }

        let base = self.positions.len();
        let total = base + local_count;
        if total > u32::MAX as usize {
            return Err(RegistryError::TooManyVertices(total));
        }
        let offset = base as u32;

        self.positions.extend_from_slice(positions);
        self.normals.extend_from_slice(normals);
        self.colors.extend_from_slice(colors);
        self.triangles.extend(
            indices
                .chunks_exact(3)
                .map(|t| UVec3::new(t[0] + offset, t[1] + offset, t[2] + offset)),
        );

        Ok(())
    }

    /// Flatten every primitive of a validated asset, meshes then primitives in order.
    ///
    /// An invalid report yields an empty registry.
    pub fn build(asset: &Asset, report: &ValidationReport) -> LoadResult<Self> {
        if !report.is_valid() {
            return Ok(Self::new());
        }

        let primitives: Vec<&Primitive> = asset
            .document
            .meshes
            .iter()
            .flat_map(|mesh| mesh.primitives.iter())
            .collect();

        // Size everything up front
        let mut capacity = 0;
        for primitive in &primitives {
            let index = primitive
                .attribute("POSITION")
                .ok_or(RegistryError::MissingAttribute("POSITION"))?;
            capacity += asset.accessor_view(index)?.count();
        }

        let mut registry = Self::with_capacity(capacity);
        for primitive in primitives {
            let view = |semantic: &'static str| {
                primitive
                    .attribute(semantic)
                    .ok_or(RegistryError::MissingAttribute(semantic))
            };

            let positions = asset.accessor_view(view("POSITION")?)?.read_vec3()?;
            let normals = asset.accessor_view(view("NORMAL")?)?.read_vec3()?;
            let colors = asset.accessor_view(view("COLOR_0")?)?.read_vec4_unorm16()?;
            let indices = match primitive.indices {
                Some(index) => asset.accessor_view(index)?.read_indices()?,
                None => return Err(RegistryError::MissingAttribute("indices").into()),
            };

            registry.push_primitive(&positions, &normals, &colors, &indices)?;
        }

        Ok(registry)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangles.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn triangles(&self) -> &[UVec3] {
        &self.triangles
    }

    /// Corner positions of triangle `index`, in index order.
    pub fn triangle_positions(&self, index: usize) -> [Vec3; 3] {
        let t = self.triangles[index];
        [
            self.positions[t.x as usize],
            self.positions[t.y as usize],
            self.positions[t.z as usize],
        ]
    }

    /// Axis-aligned bounds of all vertices as `(min, max)`.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        if self.positions.is_empty() {
            return None;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for pos in &self.positions {
            min = min.min(*pos);
            max = max.max(*pos);
        }

        Some((min, max))
    }
}
