//! Tensor utilities for TensorFlow graphs
//!
//! This module provides utilities for working with tensors:
//! - Data type mappings (`dtype`)
//! - Shape utilities (`shape`)

pub mod dtype;
pub mod shape;

// Re-export commonly used items
pub use dtype::{base_dtype, i32_to_dtype, is_ref_type, ref_dtype};
pub use shape::{
    broadcast_inferred, broadcast_shape, is_dynamic, normalize_axis, numel, shape_from_proto,
    shape_to_proto, InferredShape, MAX_RANK,
};
