//! Shape utilities for inferred tensors
//!
//! Shapes are `Option<Vec<i64>>`: `None` for unknown rank, `-1` for an unknown
//! dimension.

use crate::proto::TensorShapeProto;

/// Inferred shape: `None` when the rank is unknown
pub type InferredShape = Option<Vec<i64>>;

/// Largest rank TensorFlow accepts for a tensor
pub const MAX_RANK: usize = 254;

/// Total number of elements of a shape, `None` if it overflows `usize`.
///
/// Unknown (negative) dimensions count as zero.
pub fn numel(shape: &[i64]) -> Option<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d.max(0) as usize))
}

/// Check if shape contains dynamic dimensions (negative values)
pub fn is_dynamic(shape: &[i64]) -> bool {
    shape.iter().any(|&d| d < 0)
}

/// Merge two dimension sizes under numpy broadcasting.
///
/// Returns `None` when both are known and incompatible.
fn broadcast_dim(a: i64, b: i64) -> Option<i64> {
    match (a, b) {
        (a, b) if a == b => Some(a),
        (1, b) => Some(b),
        (a, 1) => Some(a),
        // One side unknown, the other known and > 1: it must match
        (a, b) if a < 0 => Some(b),
        (a, b) if b < 0 => Some(a),
        _ => None,
    }
}

/// Compute broadcast output shape, or `None` if incompatible
pub fn broadcast_shape(shape_a: &[i64], shape_b: &[i64]) -> Option<Vec<i64>> {
    let max_len = shape_a.len().max(shape_b.len());
    let pad_a = max_len - shape_a.len();
    let pad_b = max_len - shape_b.len();

    (0..max_len)
        .map(|i| {
            let a = if i < pad_a { 1 } else { shape_a[i - pad_a] };
            let b = if i < pad_b { 1 } else { shape_b[i - pad_b] };
            broadcast_dim(a, b)
        })
        .collect()
}

/// Broadcast two inferred shapes; unknown rank on either side stays unknown
pub fn broadcast_inferred(a: &InferredShape, b: &InferredShape) -> InferredShape {
    match (a, b) {
        (Some(a), Some(b)) => broadcast_shape(a, b),
        _ => None,
    }
}

/// Extract an inferred shape from a proto
pub fn shape_from_proto(shape: &TensorShapeProto) -> InferredShape {
    shape.dims()
}

/// Build a proto from an inferred shape
pub fn shape_to_proto(shape: &InferredShape) -> TensorShapeProto {
    match shape {
        Some(dims) => TensorShapeProto::from_dims(dims),
        None => TensorShapeProto::unknown(),
    }
}

/// Normalize axis to positive index, `None` if out of range
pub fn normalize_axis(axis: i64, ndim: usize) -> Option<usize> {
    let ndim_i64 = ndim as i64;
    let normalized = if axis < 0 { axis + ndim_i64 } else { axis };

    (0..ndim_i64)
        .contains(&normalized)
        .then_some(normalized as usize)
}
