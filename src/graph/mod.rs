//! Graph infrastructure for TensorFlow `GraphDef`s
//!
//! - [`GraphContext`]: Central structure for graph queries with O(1) lookups
//! - [`maps`]: Type definitions and builders for graph maps
//! - [`traversal`]: BFS over fanins, transitive fanin
//!
//! # Example
//!
//! ```ignore
//! use grappler_item::graph::{transitive_fanin, GraphContext};
//!
//! let ctx = GraphContext::new(&graph_def);
//! let order = ctx.topological_order();
//! let needed = transitive_fanin(&ctx, ["train_op"], false);
//! ```
//!
//! # Maps
//!
//! | Map | Description |
//! |-----|-------------|
//! | `node_map` | node name → NodeDef (order preserved) |
//! | `fanout_map` | node name → consumer node names |
//! | `port_count_map` | node name → referenced output ports |

pub mod context;
pub mod maps;
pub mod traversal;

// Re-export main types
pub use context::GraphContext;
pub use maps::{FanoutMap, NodeMap, PortCountMap, TensorRef};
pub use traversal::{transitive_fanin, BfsIterator};
