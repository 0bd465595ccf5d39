//! Asset validation.
//!
//! Every primitive of every mesh is checked against the attribute contract
//! the renderer relies on. Checks never stop early: all findings are
//! collected, and a single finding anywhere rejects the whole asset.

use std::fmt;

use thiserror::Error;

use crate::asset::{
    is_index_layout, AccessorError, AccessorType, Asset, ComponentType, Mode, Primitive,
};

/// A vertex attribute the renderer requires.
struct AttributeRule {
    semantic: &'static str,
    description: &'static str,
    accessor_type: AccessorType,
    component_type: ComponentType,
}

const POSITION: AttributeRule = AttributeRule {
    semantic: "POSITION",
    description: "vertex position",
    accessor_type: AccessorType::Vec3,
    component_type: ComponentType::Float,
};

const NORMAL: AttributeRule = AttributeRule {
    semantic: "NORMAL",
    description: "vertex normal",
    accessor_type: AccessorType::Vec3,
    component_type: ComponentType::Float,
};

const COLOR: AttributeRule = AttributeRule {
    semantic: "COLOR_0",
    description: "vertex color",
    accessor_type: AccessorType::Vec4,
    component_type: ComponentType::UnsignedShort,
};

/// What is wrong with a primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    #[error("mode '{mode}' is not supported (only 'TRIANGLES' is supported)")]
    WrongMode { mode: Mode },

    #[error("no {attribute} data")]
    MissingAttribute { attribute: &'static str },

    #[error("{attribute} type of '{actual}' instead of '{expected}'")]
    WrongAttributeType {
        attribute: &'static str,
        expected: AccessorType,
        actual: AccessorType,
    },

    #[error("{attribute} component type of '{actual}' instead of '{expected}'")]
    WrongComponentType {
        attribute: &'static str,
        expected: ComponentType,
        actual: ComponentType,
    },

    #[error("no indices")]
    MissingIndices,

    #[error("unreadable {attribute} accessor: {reason}")]
    InvalidAccessor {
        attribute: &'static str,
        reason: AccessorError,
    },

    #[error("{actual} {attribute} elements for {expected} vertex positions")]
    AttributeCountMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("indices of '{accessor_type}' / '{component_type}' (expected an unsigned integer SCALAR)")]
    WrongIndexType {
        accessor_type: AccessorType,
        component_type: ComponentType,
    },

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// A finding tied to the primitive it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub mesh: String,
    pub primitive: usize,
    pub kind: FindingKind,
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] primitive {}: {}", self.mesh, self.primitive, self.kind)
    }
}

/// Something ignored or dropped that does not invalidate the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    MaterialIgnored { mesh: String, primitive: usize },
    TrailingIndices { mesh: String, primitive: usize, dropped: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaterialIgnored { mesh, primitive } => write!(
                f,
                "[{mesh}] primitive {primitive}: material specified, materials are not supported and will be ignored"
            ),
            Self::TrailingIndices { mesh, primitive, dropped } => write!(
                f,
                "[{mesh}] primitive {primitive}: index count is not a multiple of 3, dropping the last {dropped}"
            ),
        }
    }
}

/// Result of validating a whole asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub findings: Vec<ValidationFinding>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// True when no primitive produced a finding.
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Collects findings for one primitive.
struct PrimitiveCheck<'a> {
    asset: &'a Asset,
    mesh: String,
    primitive: usize,
    report: &'a mut ValidationReport,
}

impl PrimitiveCheck<'_> {
    fn fail(&mut self, kind: FindingKind) {
        self.report.findings.push(ValidationFinding {
            mesh: self.mesh.clone(),
            primitive: self.primitive,
            kind,
        });
    }

    fn warn(&mut self, warning: ValidationWarning) {
        self.report.warnings.push(warning);
    }

    /// Check an attribute; returns its element count when it is usable.
    fn attribute(&mut self, primitive: &Primitive, rule: &AttributeRule) -> Option<usize> {
        let Some(index) = primitive.attribute(rule.semantic) else {
            self.fail(FindingKind::MissingAttribute {
                attribute: rule.description,
            });
            return None;
        };

        let Some(accessor) = self.asset.document.accessors.get(index) else {
            self.fail(FindingKind::InvalidAccessor {
                attribute: rule.description,
                reason: AccessorError::MissingAccessor(index),
            });
            return None;
        };

        let mut usable = true;
        if accessor.accessor_type() != rule.accessor_type {
            self.fail(FindingKind::WrongAttributeType {
                attribute: rule.description,
                expected: rule.accessor_type,
                actual: accessor.accessor_type(),
            });
            usable = false;
        }
        if accessor.component_type() != rule.component_type {
            self.fail(FindingKind::WrongComponentType {
                attribute: rule.description,
                expected: rule.component_type,
                actual: accessor.component_type(),
            });
            usable = false;
        }
        if !usable {
            return None;
        }

        match self.asset.accessor_view(index) {
            Ok(view) => Some(view.count()),
            Err(reason) => {
                self.fail(FindingKind::InvalidAccessor {
                    attribute: rule.description,
                    reason,
                });
                None
            }
        }
    }

    fn indices(&mut self, primitive: &Primitive, vertex_count: Option<usize>) {
        let Some(index) = primitive.indices else {
            self.fail(FindingKind::MissingIndices);
            return;
        };

        let Some(accessor) = self.asset.document.accessors.get(index) else {
            self.fail(FindingKind::InvalidAccessor {
                attribute: "index",
                reason: AccessorError::MissingAccessor(index),
            });
            return;
        };

        if !is_index_layout(accessor.accessor_type(), accessor.component_type()) {
            self.fail(FindingKind::WrongIndexType {
                accessor_type: accessor.accessor_type(),
                component_type: accessor.component_type(),
            });
            return;
        }

        let indices = match self
            .asset
            .accessor_view(index)
            .and_then(|view| view.read_indices())
        {
            Ok(indices) => indices,
            Err(reason) => {
                self.fail(FindingKind::InvalidAccessor {
                    attribute: "index",
                    reason,
                });
                return;
            }
        };

        let dropped = indices.len() % 3;
        if dropped != 0 {
            self.warn(ValidationWarning::TrailingIndices {
                mesh: self.mesh.clone(),
                primitive: self.primitive,
                dropped,
            });
        }

        // Range is only meaningful once the vertex count is known
        if let Some(vertex_count) = vertex_count {
            let used = &indices[..indices.len() - dropped];
            if let Some(&index) = used.iter().find(|&&i| i as usize >= vertex_count) {
                self.fail(FindingKind::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
        }
    }

    fn run(&mut self, primitive: &Primitive) {
        let mode = primitive.mode();
        if mode != Mode::Triangles {
            self.fail(FindingKind::WrongMode { mode });
        }

        if primitive.material.is_some() {
            self.warn(ValidationWarning::MaterialIgnored {
                mesh: self.mesh.clone(),
                primitive: self.primitive,
            });
        }

        let positions = self.attribute(primitive, &POSITION);
        let normals = self.attribute(primitive, &NORMAL);
        let colors = self.attribute(primitive, &COLOR);

        if let Some(expected) = positions {
            for (rule, count) in [(&NORMAL, normals), (&COLOR, colors)] {
                if let Some(actual) = count.filter(|&actual| actual != expected) {
                    self.fail(FindingKind::AttributeCountMismatch {
                        attribute: rule.description,
                        expected,
                        actual,
                    });
                }
            }
        }

        self.indices(primitive, positions);
    }
}

/// Validate every primitive of every mesh in traversal order.
pub fn validate(asset: &Asset) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (mesh_index, mesh) in asset.document.meshes.iter().enumerate() {
        let name = mesh.display_name(mesh_index);
        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            PrimitiveCheck {
                asset,
                mesh: name.clone(),
                primitive: primitive_index,
                report: &mut report,
            }
            .run(primitive);
        }
    }

    report
}
