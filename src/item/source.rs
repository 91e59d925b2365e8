//! Shared, versioned meta-graph source
//!
//! A [`MetaGraphSource`] is the caller-visible handle to a meta-graph. Clones
//! share the same graph; every replacement or mutation bumps the version, which
//! is what a [`GraphItem`](super::GraphItem) compares against to decide whether
//! its analysis is stale.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::proto::MetaGraphDef;

#[derive(Default)]
struct SourceState {
    meta: MetaGraphDef,
    version: u64,
}

/// Versioned reference to a caller-owned meta-graph
#[derive(Clone, Default)]
pub struct MetaGraphSource {
    state: Arc<RwLock<SourceState>>,
}

impl MetaGraphSource {
    /// Wrap a meta-graph
    pub fn new(meta: MetaGraphDef) -> Self {
        Self {
            state: Arc::new(RwLock::new(SourceState { meta, version: 1 })),
        }
    }

    /// Current version
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// Replace the meta-graph, returning the new version.
    ///
    /// The version changes even when `meta` equals the current graph.
    pub fn replace(&self, meta: MetaGraphDef) -> u64 {
        let mut state = self.state.write();
        state.meta = meta;
        state.version += 1;
        state.version
    }

    /// Mutate the meta-graph in place
    pub fn update<R>(&self, f: impl FnOnce(&mut MetaGraphDef) -> R) -> R {
        let mut state = self.state.write();
        state.version += 1;
        f(&mut state.meta)
    }

    /// Read the meta-graph without copying it
    pub fn read<R>(&self, f: impl FnOnce(&MetaGraphDef) -> R) -> R {
        f(&self.state.read().meta)
    }

    /// Deep copy of the current meta-graph
    pub fn snapshot(&self) -> MetaGraphDef {
        self.state.read().meta.clone()
    }

    /// Deep copy of the current meta-graph with the version it was taken at
    pub fn versioned_snapshot(&self) -> (MetaGraphDef, u64) {
        let state = self.state.read();
        (state.meta.clone(), state.version)
    }

    /// Check whether two handles share the same graph
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl From<MetaGraphDef> for MetaGraphSource {
    fn from(meta: MetaGraphDef) -> Self {
        Self::new(meta)
    }
}

impl fmt::Debug for MetaGraphSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("MetaGraphSource")
            .field("version", &state.version)
            .field(
                "nodes",
                &state.meta.graph_def.as_ref().map_or(0, |g| g.node.len()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::make_node;

    #[test]
    fn test_versions_increase() {
        let source = MetaGraphSource::new(MetaGraphDef::default());
        assert_eq!(source.version(), 1);

        assert_eq!(source.replace(MetaGraphDef::default()), 2);
        source.update(|meta| meta.graph_mut().node.push(make_node("NoOp", &[], "a")));
        assert_eq!(source.version(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let source = MetaGraphSource::new(MetaGraphDef::default());
        let other = source.clone();

        other.update(|meta| meta.graph_mut().node.push(make_node("NoOp", &[], "a")));

        assert!(source.ptr_eq(&other));
        assert_eq!(source.version(), other.version());
        assert_eq!(source.read(|meta| meta.graph_def.as_ref().unwrap().node.len()), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let source = MetaGraphSource::new(MetaGraphDef::default());
        let (snapshot, version) = source.versioned_snapshot();

        source.update(|meta| meta.graph_mut().node.push(make_node("NoOp", &[], "a")));

        assert!(snapshot.graph_def.is_none());
        assert_eq!(version, 1);
        assert!(source.snapshot().graph_def.is_some());
    }
}
