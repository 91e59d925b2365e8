//! Colocation groups
//!
//! Nodes joined through `loc:@` constraints must be placed on the same
//! device. Groups are the connected components of those constraints.

use rustc_hash::FxHashMap;

use crate::graph::GraphContext;

/// Disjoint sets over node indices
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut idx: usize) -> usize {
        while self.parent[idx] != idx {
            self.parent[idx] = self.parent[self.parent[idx]];
            idx = self.parent[idx];
        }
        idx
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Keep the earliest node as root so groups come out in graph order
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// Groups of at least two nodes that must share a device.
///
/// Members are sorted by name and groups by their first member. Targets
/// naming unknown nodes are ignored.
pub fn colocation_groups(ctx: &GraphContext) -> Vec<Vec<String>> {
    let mut sets = UnionFind::new(ctx.node_count());

    for (idx, node) in ctx.nodes().enumerate() {
        for target in node.colocation_targets() {
            if let Some(target_idx) = ctx.node_map.get_index_of(target) {
                sets.union(idx, target_idx);
            }
        }
    }

    let mut members: FxHashMap<usize, Vec<String>> = FxHashMap::default();
    for (idx, name) in ctx.node_names().enumerate() {
        let root = sets.find(idx);
        members.entry(root).or_default().push(name.clone());
    }

    let mut groups: Vec<Vec<String>> = members
        .into_values()
        .filter(|group| group.len() > 1)
        .map(|mut group| {
            group.sort();
            group
        })
        .collect();
    groups.sort();
    groups
}
