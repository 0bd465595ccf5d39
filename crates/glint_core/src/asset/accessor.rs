//! Typed reads through accessors.

use glint_math::{Vec3, Vec4};
use thiserror::Error;

use super::types::{AccessorType, ComponentType};

/// Why an accessor cannot be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessorError {
    #[error("accessor {0} does not exist")]
    MissingAccessor(usize),

    #[error("accessor {0} has no buffer view")]
    NoBufferView(usize),

    #[error("buffer view {0} does not exist")]
    MissingBufferView(usize),

    #[error("buffer {0} does not exist")]
    MissingBuffer(usize),

    #[error("element layout {accessor_type} of {component_type} has no known size")]
    UnknownLayout {
        accessor_type: AccessorType,
        component_type: ComponentType,
    },

    #[error("byte stride {stride} is smaller than the element size {element_size}")]
    StrideTooSmall { stride: usize, element_size: usize },

    #[error("needs bytes {start}..{end} but the buffer holds {available}")]
    OutOfBounds {
        start: usize,
        end: usize,
        available: usize,
    },

    #[error("expected {expected_type} of {expected_component}, found {actual_type} of {actual_component}")]
    WrongLayout {
        expected_type: AccessorType,
        expected_component: ComponentType,
        actual_type: AccessorType,
        actual_component: ComponentType,
    },
}

/// A bounds-checked window onto an accessor's elements.
#[derive(Debug, Clone, Copy)]
pub struct AccessorView<'a> {
    bytes: &'a [u8],
    stride: usize,
    element_size: usize,
    count: usize,
    accessor_type: AccessorType,
    component_type: ComponentType,
}

impl<'a> AccessorView<'a> {
    /// Create a view over `bytes`, which must start at the first element.
    ///
    /// Fails if the last element would run past the end of `bytes`.
    pub fn new(
        bytes: &'a [u8],
        stride: usize,
        count: usize,
        accessor_type: AccessorType,
        component_type: ComponentType,
        base_offset: usize,
    ) -> Result<Self, AccessorError> {
        let components = accessor_type.components();
        let size = component_type.size();
        let element_size = match (components, size) {
            (Some(components), Some(size)) => components * size,
            _ => {
                return Err(AccessorError::UnknownLayout {
                    accessor_type,
                    component_type,
                })
            }
        };

        let stride = if stride == 0 { element_size } else { stride };
        if stride < element_size {
            return Err(AccessorError::StrideTooSmall {
                stride,
                element_size,
            });
        }

        let needed = match count {
            0 => Some(0),
            _ => (count - 1)
                .checked_mul(stride)
                .and_then(|n| n.checked_add(element_size)),
        };
        match needed {
            Some(needed) if needed <= bytes.len() => {}
            _ => {
                return Err(AccessorError::OutOfBounds {
                    start: base_offset,
                    end: needed.map_or(usize::MAX, |n| base_offset.saturating_add(n)),
                    available: base_offset.saturating_add(bytes.len()),
                })
            }
        }

        Ok(Self {
            bytes,
            stride,
            element_size,
            count,
            accessor_type,
            component_type,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Raw bytes of element `index`.
    pub fn element(&self, index: usize) -> &'a [u8] {
        let start = index * self.stride;
        &self.bytes[start..start + self.element_size]
    }

    fn expect_layout(
        &self,
        accessor_type: AccessorType,
        component_type: ComponentType,
    ) -> Result<(), AccessorError> {
        if self.accessor_type == accessor_type && self.component_type == component_type {
            Ok(())
        } else {
            Err(AccessorError::WrongLayout {
                expected_type: accessor_type,
                expected_component: component_type,
                actual_type: self.accessor_type,
                actual_component: self.component_type,
            })
        }
    }

    /// Read a VEC3 of FLOAT accessor.
    pub fn read_vec3(&self) -> Result<Vec<Vec3>, AccessorError> {
        self.expect_layout(AccessorType::Vec3, ComponentType::Float)?;

        Ok((0..self.count)
            .map(|i| {
                let e = self.element(i);
                Vec3::new(read_f32(e, 0), read_f32(e, 4), read_f32(e, 8))
            })
            .collect())
    }

    /// Read a VEC4 of UNSIGNED_SHORT accessor, normalizing each channel to [0, 1].
    pub fn read_vec4_unorm16(&self) -> Result<Vec<Vec4>, AccessorError> {
        self.expect_layout(AccessorType::Vec4, ComponentType::UnsignedShort)?;

        Ok((0..self.count)
            .map(|i| {
                let e = self.element(i);
                Vec4::new(
                    read_u16(e, 0) as f32 / 65535.0,
                    read_u16(e, 2) as f32 / 65535.0,
                    read_u16(e, 4) as f32 / 65535.0,
                    read_u16(e, 6) as f32 / 65535.0,
                )
            })
            .collect())
    }

    /// Read a SCALAR index accessor of any unsigned integer width, widened to u32.
    pub fn read_indices(&self) -> Result<Vec<u32>, AccessorError> {
        let read: fn(&[u8]) -> u32 = match (self.accessor_type, self.component_type) {
            (AccessorType::Scalar, ComponentType::UnsignedByte) => index_u8,
            (AccessorType::Scalar, ComponentType::UnsignedShort) => index_u16,
            (AccessorType::Scalar, ComponentType::UnsignedInt) => index_u32,
            _ => {
                return Err(AccessorError::WrongLayout {
                    expected_type: AccessorType::Scalar,
                    expected_component: ComponentType::UnsignedShort,
                    actual_type: self.accessor_type,
                    actual_component: self.component_type,
                })
            }
        };

        Ok((0..self.count).map(|i| read(self.element(i))).collect())
    }
}

/// Whether an index accessor layout can be widened to u32.
pub fn is_index_layout(accessor_type: AccessorType, component_type: ComponentType) -> bool {
    accessor_type == AccessorType::Scalar
        && matches!(
            component_type,
            ComponentType::UnsignedByte | ComponentType::UnsignedShort | ComponentType::UnsignedInt
        )
}

fn index_u8(element: &[u8]) -> u32 {
    element[0] as u32
}

fn index_u16(element: &[u8]) -> u32 {
    read_u16(element, 0) as u32
}

fn index_u32(element: &[u8]) -> u32 {
    read_u32(element, 0)
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(data, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_read_vec3_packed() {
        let bytes = f32_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let view = AccessorView::new(&bytes, 0, 2, AccessorType::Vec3, ComponentType::Float, 0).unwrap();

        let values = view.read_vec3().unwrap();

        assert_eq!(values, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn test_read_vec3_interleaved() {
        // position (3 floats) + padding float per element
        let bytes = f32_bytes(&[1.0, 2.0, 3.0, -1.0, 4.0, 5.0, 6.0, -1.0]);
        let view = AccessorView::new(&bytes, 16, 2, AccessorType::Vec3, ComponentType::Float, 0).unwrap();

        let values = view.read_vec3().unwrap();

        assert_eq!(values[1], Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_last_element_may_omit_stride_padding() {
        let bytes = f32_bytes(&[1.0, 2.0, 3.0, -1.0, 4.0, 5.0, 6.0]);
        let view = AccessorView::new(&bytes, 16, 2, AccessorType::Vec3, ComponentType::Float, 0);

        assert!(view.is_ok());
    }

    #[test]
    fn test_out_of_bounds() {
        let bytes = f32_bytes(&[1.0, 2.0, 3.0]);
        let err = AccessorView::new(&bytes, 0, 2, AccessorType::Vec3, ComponentType::Float, 8).unwrap_err();

        assert_eq!(
            err,
            AccessorError::OutOfBounds {
                start: 8,
                end: 32,
                available: 20
            }
        );
    }

    #[test]
    fn test_huge_count_is_out_of_bounds() {
        let bytes = f32_bytes(&[1.0, 2.0, 3.0]);
        let err = AccessorView::new(&bytes, 0, usize::MAX, AccessorType::Vec3, ComponentType::Float, 4).unwrap_err();

        assert_eq!(
            err,
            AccessorError::OutOfBounds {
                start: 4,
                end: usize::MAX,
                available: 16
            }
        );
    }

    #[test]
    fn test_stride_too_small() {
        let bytes = vec![0u8; 64];
        let err = AccessorView::new(&bytes, 8, 2, AccessorType::Vec3, ComponentType::Float, 0).unwrap_err();

        assert!(matches!(err, AccessorError::StrideTooSmall { stride: 8, element_size: 12 }));
    }

    #[test]
    fn test_read_vec4_unorm16() {
        let raw: Vec<u8> = [0u16, 65535, 32768, 65535]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let view = AccessorView::new(&raw, 0, 1, AccessorType::Vec4, ComponentType::UnsignedShort, 0).unwrap();

        let colors = view.read_vec4_unorm16().unwrap();

        assert_eq!(colors[0].x, 0.0);
        assert_eq!(colors[0].y, 1.0);
        assert!((colors[0].z - 0.5).abs() < 1e-4);
        assert_eq!(colors[0].w, 1.0);
    }

    #[test]
    fn test_read_indices_widths() {
        let bytes_u8 = [0u8, 1, 2];
        let view = AccessorView::new(&bytes_u8, 0, 3, AccessorType::Scalar, ComponentType::UnsignedByte, 0).unwrap();
        assert_eq!(view.read_indices().unwrap(), vec![0, 1, 2]);

        let bytes_u16: Vec<u8> = [3u16, 4, 65535].iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = AccessorView::new(&bytes_u16, 0, 3, AccessorType::Scalar, ComponentType::UnsignedShort, 0).unwrap();
        assert_eq!(view.read_indices().unwrap(), vec![3, 4, 65535]);

        let bytes_u32: Vec<u8> = [70000u32, 1, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = AccessorView::new(&bytes_u32, 0, 3, AccessorType::Scalar, ComponentType::UnsignedInt, 0).unwrap();
        assert_eq!(view.read_indices().unwrap(), vec![70000, 1, 2]);
    }

    #[test]
    fn test_wrong_layout() {
        let bytes = f32_bytes(&[1.0, 2.0, 3.0]);
        let view = AccessorView::new(&bytes, 0, 1, AccessorType::Vec3, ComponentType::Float, 0).unwrap();

        assert!(matches!(view.read_indices(), Err(AccessorError::WrongLayout { .. })));
        assert!(matches!(view.read_vec4_unorm16(), Err(AccessorError::WrongLayout { .. })));
    }

    #[test]
    fn test_index_layout() {
        assert!(is_index_layout(AccessorType::Scalar, ComponentType::UnsignedShort));
        assert!(!is_index_layout(AccessorType::Scalar, ComponentType::Float));
        assert!(!is_index_layout(AccessorType::Vec3, ComponentType::UnsignedInt));
    }
}
