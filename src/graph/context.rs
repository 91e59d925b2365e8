//! Graph context for TensorFlow graph analysis
//!
//! `GraphContext` is the central structure for working with a `GraphDef`.
//! It maintains maps for node lookup and traversal in both directions.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::proto::{GraphDef, NodeDef};

use super::maps::{
    build_fanout_map, build_node_map, build_port_count_map, FanoutMap, NodeMap, PortCountMap,
    TensorRef,
};

/// Graph context for efficient graph queries
#[derive(Debug, Clone)]
pub struct GraphContext {
    /// Maps node name → NodeDef (preserves graph order)
    pub node_map: NodeMap,

    /// Maps node name → consumer node names
    pub fanout_map: FanoutMap,

    /// Maps node name → number of data outputs referenced by consumers
    pub port_count_map: PortCountMap,
}

impl GraphContext {
    /// Create a new GraphContext from a GraphDef
    pub fn new(graph: &GraphDef) -> Self {
        Self {
            node_map: build_node_map(graph),
            fanout_map: build_fanout_map(graph),
            port_count_map: build_port_count_map(graph),
        }
    }

    // ========================================================================
    // Node accessors
    // ========================================================================

    /// Get a node by name
    pub fn get_node(&self, name: &str) -> Option<&NodeDef> {
        self.node_map.get(name)
    }

    /// Check if a node exists
    pub fn has_node(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.node_map.len()
    }

    /// Iterate over all nodes in graph order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeDef> {
        self.node_map.values()
    }

    /// Iterate over node names in graph order
    pub fn node_names(&self) -> impl Iterator<Item = &String> {
        self.node_map.keys()
    }

    // ========================================================================
    // Graph traversal
    // ========================================================================

    /// Data inputs of a node, in input order
    pub fn data_fanins<'a>(&self, node: &'a NodeDef) -> Vec<TensorRef<'a>> {
        node.input
            .iter()
            .filter(|i| !i.is_empty())
            .map(|i| TensorRef::parse(i))
            .filter(|r| !r.is_control())
            .collect()
    }

    /// Names of every node this node depends on (data and control)
    pub fn fanin_names<'a>(&self, node: &'a NodeDef) -> Vec<&'a str> {
        node.input
            .iter()
            .filter(|i| !i.is_empty())
            .map(|i| TensorRef::parse(i).node)
            .collect()
    }

    /// Consumer node names of a node (data and control)
    pub fn get_fanouts(&self, name: &str) -> &[String] {
        self.fanout_map
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or_default()
    }

    /// Number of output ports consumers reference on a node
    pub fn referenced_outputs(&self, name: &str) -> usize {
        self.port_count_map.get(name).copied().unwrap_or(0)
    }

    /// Nodes in topological order (Kahn's algorithm).
    ///
    /// When only cycles remain (e.g. `NextIteration` back edges), the first
    /// unplaced `Merge` is released as if its inputs were ready, falling back to
    /// the first unplaced node in graph order. Inputs naming unknown nodes are
    /// ignored.
    pub fn topological_order(&self) -> Vec<&str> {
        let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();
        for node in self.nodes() {
            let degree = self
                .fanin_names(node)
                .into_iter()
                .filter(|name| self.has_node(name))
                .count();
            in_degree.insert(node.name.as_str(), degree);
        }

        let mut queue: VecDeque<&str> = self
            .nodes()
            .map(|n| n.name.as_str())
            .filter(|name| in_degree.get(name) == Some(&0))
            .collect();

        let mut placed: FxHashSet<&str> = FxHashSet::default();
        let mut order = Vec::with_capacity(self.node_count());
        loop {
            while let Some(name) = queue.pop_front() {
                if !placed.insert(name) {
                    continue;
                }
                order.push(name);
                for consumer in self.get_fanouts(name) {
                    // Each input edge was counted separately; mirror that here
                    let edges = self
                        .get_node(consumer)
                        .map(|n| self.fanin_names(n).iter().filter(|f| **f == name).count())
                        .unwrap_or(0);
                    if let Some(degree) = in_degree.get_mut(consumer.as_str()) {
                        let before = *degree;
                        *degree = degree.saturating_sub(edges);
                        if before > 0 && *degree == 0 {
                            queue.push_back(consumer.as_str());
                        }
                    }
                }
            }

            let unplaced = |n: &&NodeDef| !placed.contains(n.name.as_str());
            let seed = self
                .nodes()
                .filter(unplaced)
                .find(|n| n.is_op_in(&["Merge", "RefMerge"]))
                .or_else(|| self.nodes().find(unplaced));
            match seed {
                Some(node) => {
                    trace!(node = %node.name, "releasing node on a cycle");
                    in_degree.insert(node.name.as_str(), 0);
                    queue.push_back(node.name.as_str());
                }
                None => break,
            }
        }

        order
    }
}
