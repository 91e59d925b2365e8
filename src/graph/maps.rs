//! Graph map types and builders
//!
//! Defines the core data structures for efficient graph traversal.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::proto::{GraphDef, NodeDef};

/// Parsed reference to a node output found in `NodeDef.input`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TensorRef<'a> {
    /// Producing node name
    pub node: &'a str,
    /// Output port, [`TensorRef::CONTROL`] for control dependencies
    pub port: i32,
}

impl<'a> TensorRef<'a> {
    /// Port value used for `^node` control inputs
    pub const CONTROL: i32 = -1;

    /// Parse `"node"`, `"node:port"` or `"^node"`
    pub fn parse(input: &'a str) -> Self {
        if let Some(node) = input.strip_prefix('^') {
            return Self {
                node,
                port: Self::CONTROL,
            };
        }

        match input.rsplit_once(':') {
            Some((node, port)) => match port.parse::<i32>() {
                Ok(port) if port >= 0 => Self { node, port },
                _ => Self { node: input, port: 0 },
            },
            None => Self {
                node: input,
                port: 0,
            },
        }
    }

    /// Check if this is a control dependency
    pub fn is_control(&self) -> bool {
        self.port == Self::CONTROL
    }
}

/// Type alias for node map: node_name → NodeDef (graph order preserved)
pub type NodeMap = IndexMap<String, NodeDef>;

/// Type alias for fanout map: node_name → [consumer_node_names]
/// SmallVec optimized for common case of 1-4 consumers
pub type FanoutMap = FxHashMap<String, SmallVec<[String; 4]>>;

/// Type alias for port map: node_name → number of output ports referenced
pub type PortCountMap = FxHashMap<String, usize>;

/// Build node map from graph nodes
///
/// Preserves node order using IndexMap. On duplicate names the first node wins.
pub fn build_node_map(graph: &GraphDef) -> NodeMap {
    let mut map = IndexMap::with_capacity(graph.node.len());

    for node in &graph.node {
        map.entry(node.name.clone()).or_insert_with(|| node.clone());
    }

    map
}

/// Build fanout map from graph nodes
///
/// Maps each node name to the nodes consuming any of its outputs, including
/// control consumers. A consumer appears once per producer.
pub fn build_fanout_map(graph: &GraphDef) -> FanoutMap {
    let mut map: FanoutMap = FxHashMap::default();

    for node in &graph.node {
        for input in &node.input {
            if input.is_empty() {
                continue;
            }
            let fanin = TensorRef::parse(input);
            let consumers = map.entry(fanin.node.to_string()).or_default();
            if !consumers.contains(&node.name) {
                consumers.push(node.name.clone());
            }
        }
    }

    map
}

/// Build port map (highest referenced data output + 1 per producer)
pub fn build_port_count_map(graph: &GraphDef) -> PortCountMap {
    let mut map: PortCountMap = FxHashMap::default();

    for node in &graph.node {
        for input in &node.input {
            let fanin = TensorRef::parse(input);
            if input.is_empty() || fanin.is_control() {
                continue;
            }
            let count = map.entry(fanin.node.to_string()).or_insert(0);
            *count = (*count).max(fanin.port as usize + 1);
        }
    }

    map
}
