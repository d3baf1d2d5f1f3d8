//! Shape inference for dense tensor literals.
//!
//! A literal such as `[[1, 2], [3, 4], [5, 6]]` is unified bottom-up. Leaves
//! (int or float vectors) produce a one-dimensional shape; every nesting level
//! seeds its shape from its first child, opens a new dimension and merges the
//! remaining children into it. Sizes are accumulated innermost first and
//! reversed when the shape is exposed, so the example yields `[3, 2]`.

use lattice_ast::nodes::DenseTensorLiteral;
use thiserror::Error;

use crate::type_info::ScalarType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LiteralShapeError {
    #[error("dense tensor literal mixes int and float components")]
    ComponentMismatch,
    #[error("dense tensor literal rows have mismatched dimensions")]
    DimensionMismatch,
    #[error("dense tensor literal must contain at least one element")]
    Empty,
}

/// Shape of a dense literal, sizes stored innermost dimension first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseShape {
    pub component: ScalarType,
    dim_sizes: Vec<u32>,
}

impl DenseShape {
    fn leaf(component: ScalarType, len: usize) -> Self {
        Self {
            component,
            dim_sizes: vec![u32::try_from(len).unwrap_or(u32::MAX)],
        }
    }

    fn add_dimension(&mut self) {
        self.dim_sizes.push(1);
    }

    /// Merges a sibling shape into this one, whose last dimension counts the
    /// siblings merged so far.
    fn merge(&mut self, other: &DenseShape) -> Result<(), LiteralShapeError> {
        if self.component != other.component {
            return Err(LiteralShapeError::ComponentMismatch);
        }
        let Some((count, inner)) = self.dim_sizes.split_last_mut() else {
            return Err(LiteralShapeError::DimensionMismatch);
        };
        if *inner != *other.dim_sizes {
            return Err(LiteralShapeError::DimensionMismatch);
        }
        *count += 1;
        Ok(())
    }

    /// Dimension sizes, outermost first.
    #[must_use]
    pub fn dimensions(&self) -> Vec<u32> {
        self.dim_sizes.iter().rev().copied().collect()
    }
}

/// Infers the shape of `literal`.
///
/// # Errors
///
/// Fails when elements mix int and float components, when sibling rows have
/// different shapes, or when a nested literal has no elements.
pub fn infer_shape(literal: &DenseTensorLiteral) -> Result<DenseShape, LiteralShapeError> {
    match literal {
        DenseTensorLiteral::IntVector(lit) => Ok(DenseShape::leaf(ScalarType::Int, lit.values.len())),
        DenseTensorLiteral::FloatVector(lit) => {
            Ok(DenseShape::leaf(ScalarType::Float, lit.values.len()))
        }
        DenseTensorLiteral::Nested(lit) => {
            let Some((first, rest)) = lit.elements.split_first() else {
                return Err(LiteralShapeError::Empty);
            };
            let mut shape = infer_shape(first)?;
            shape.add_dimension();
            for element in rest {
                shape.merge(&infer_shape(element)?)?;
            }
            Ok(shape)
        }
    }
}
