//! Meta-graph I/O module
//!
//! This module provides functions for loading, saving, and validating
//! serialized `MetaGraphDef`s.
//!
//! # Example
//!
//! ```ignore
//! use grappler_item::io::{load_metagraph, save_metagraph, check_metagraph};
//!
//! let meta = load_metagraph("model.meta")?;
//! check_metagraph(&meta)?;
//! save_metagraph(&meta, "copy.meta")?;
//! ```

pub mod reader;
pub mod validation;
pub mod writer;

// Re-exports
pub use reader::{get_metagraph_info, load_metagraph, load_metagraph_from_bytes, MetaGraphInfo};
pub use validation::{
    check_metagraph, validate_graph, validate_metagraph, ValidationOptions, ValidationResult,
};
pub use writer::{metagraph_size, metagraph_to_bytes, save_metagraph};
