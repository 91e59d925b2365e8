//! Analyses over a [`GrapplerItem`](crate::builder::GrapplerItem)
//!
//! - [`important`]: ops the fetch and enqueue nodes depend on
//! - [`properties`]: static dtype / shape / value inference
//! - [`colocation`]: groups of nodes bound to the same device

pub mod colocation;
pub mod important;
pub mod properties;

pub use colocation::colocation_groups;
pub use important::{enqueue_ops_fanin, important_ops, main_ops_fanin};
pub use properties::{GraphProperties, MAX_INFERRED_OUTPUTS, MAX_VALUE_ELEMENTS};
