//! Graph traversal utilities
//!
//! Provides BFS over the fanins of TensorFlow graph nodes.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use super::context::GraphContext;
use crate::proto::NodeDef;

/// BFS iterator following data and control fanins
pub struct BfsIterator<'a> {
    ctx: &'a GraphContext,
    queue: VecDeque<&'a str>,
    visited: FxHashSet<&'a str>,
    follow_colocation: bool,
}

impl<'a> BfsIterator<'a> {
    /// Create a new BFS iterator starting from the given nodes.
    ///
    /// Start names that are not in the graph are skipped.
    pub fn new<I>(ctx: &'a GraphContext, starts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut queue = VecDeque::new();
        let mut visited = FxHashSet::default();

        for start in starts {
            if let Some((name, _)) = ctx.node_map.get_key_value(start) {
                if visited.insert(name.as_str()) {
                    queue.push_back(name.as_str());
                }
            }
        }

        Self {
            ctx,
            queue,
            visited,
            follow_colocation: false,
        }
    }

    /// Also treat `loc:@` colocation targets as fanins
    pub fn with_colocation(mut self, follow: bool) -> Self {
        self.follow_colocation = follow;
        self
    }

    fn visit(&mut self, name: &'a str) {
        if let Some((name, _)) = self.ctx.node_map.get_key_value(name) {
            if self.visited.insert(name.as_str()) {
                self.queue.push_back(name.as_str());
            }
        }
    }
}

impl<'a> Iterator for BfsIterator<'a> {
    type Item = &'a NodeDef;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.queue.pop_front()?;
        let node = self.ctx.get_node(name)?;

        for fanin in self.ctx.fanin_names(node) {
            self.visit(fanin);
        }
        if self.follow_colocation {
            for target in node.colocation_targets() {
                self.visit(target);
            }
        }

        Some(node)
    }
}

/// Names of all nodes the given roots transitively depend on, roots included
pub fn transitive_fanin<'a, I>(
    ctx: &'a GraphContext,
    roots: I,
    follow_colocation: bool,
) -> FxHashSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    BfsIterator::new(ctx, roots)
        .with_colocation(follow_colocation)
        .map(|n| n.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_node, COLOCATION_ATTR};
    use crate::proto::{AttrValue, GraphDef};

    fn make_test_graph() -> GraphDef {
        let mut read = make_node("Identity", &["v"], "read");
        read.set_attr(COLOCATION_ATTR, AttrValue::new_strings(&["loc:@v"]));

        GraphDef {
            node: vec![
                make_node("VariableV2", &[], "v"),
                read,
                make_node("Placeholder", &[], "x"),
                make_node("Mul", &["x", "read"], "mul"),
                make_node("NoOp", &["^mul"], "train"),
                make_node("Const", &[], "unused"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_fanin_bfs() {
        let graph = make_test_graph();
        let ctx = GraphContext::new(&graph);

        let names: Vec<_> = BfsIterator::new(&ctx, ["train"])
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["train", "mul", "x", "read", "v"]);
    }

    #[test]
    fn test_bfs_multiple_starts() {
        let graph = make_test_graph();
        let ctx = GraphContext::new(&graph);

        let names: Vec<_> = BfsIterator::new(&ctx, ["read", "x", "read"])
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["read", "x", "v"]);
    }

    #[test]
    fn test_transitive_fanin_colocation() {
        // The colocated variable is only reachable through the constraint
        let mut graph = make_test_graph();
        graph.node[1].input.clear();
        let ctx = GraphContext::new(&graph);

        let plain = transitive_fanin(&ctx, ["train"], false);
        assert!(!plain.contains("v"));

        let colocated = transitive_fanin(&ctx, ["train"], true);
        assert!(colocated.contains("v"));
        assert!(!colocated.contains("unused"));
    }

    #[test]
    fn test_unknown_start_is_skipped() {
        let graph = make_test_graph();
        let ctx = GraphContext::new(&graph);

        assert!(transitive_fanin(&ctx, ["missing"], true).is_empty());
    }
}
