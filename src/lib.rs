//! # Grappler Item
//!
//! Immutable, queryable snapshots of TensorFlow meta-graphs for graph
//! analysis tools.
//!
//! A [`GraphItem`] deep-copies a `MetaGraphDef`, hands its canonical encoding
//! to an [`AnalysisBackend`], and answers read-only queries from the handle the
//! backend builds. The handle is rebuilt only when the tracked
//! [`MetaGraphSource`] changes version.
//!
//! ## Features
//!
//! - **Important ops**: the transitive fanin of fetch and enqueue nodes
//! - **Op properties**: per-output dtype, shape and constant value
//! - **Colocation groups**: nodes bound to the same device
//!
//! ## Example
//!
//! ```ignore
//! use grappler_item::prelude::*;
//!
//! let meta = load_metagraph("model.meta")?;
//! let mut item = GraphItem::from_metagraph(meta, AnalysisPolicy::default())?;
//!
//! let important = item.identify_important_ops()?;
//! let properties = item.op_properties()?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod analysis;
pub mod backend;
pub mod builder;
pub mod error;
pub mod graph;
pub mod io;
pub mod item;
pub mod proto;
pub mod tensor;
pub mod traits;

// Python bindings (only with python feature)
#[cfg(feature = "python")]
pub mod python;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use grappler_item::prelude::*`
pub mod prelude {
    pub use crate::analysis::GraphProperties;
    pub use crate::backend::{AnalysisHandle, StaticBackend};
    pub use crate::builder::{build_item, AnalysisPolicy, GrapplerItem};
    pub use crate::error::{ItemError, ItemResult, Status, StatusCode};
    pub use crate::graph::GraphContext;
    pub use crate::io::{
        load_metagraph, load_metagraph_from_bytes, save_metagraph, validate_metagraph,
        ValidationOptions,
    };
    pub use crate::item::{GraphItem, MetaGraphSource};
    pub use crate::proto::{DataType, GraphDef, MetaGraphDef, NodeDef, TensorProperties};
    pub use crate::traits::AnalysisBackend;
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use builder::AnalysisPolicy;
pub use error::{ItemError, ItemResult};
pub use item::{GraphItem, MetaGraphSource};
pub use traits::AnalysisBackend;

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
