//! Graph item
//!
//! A [`GraphItem`] owns a deep-copied snapshot of a meta-graph, the policy it
//! is analysed under, and the backend handle built from the two. Before every
//! query the item compares the version it was built from against its
//! [`MetaGraphSource`] and rebuilds the handle if the source moved on.
//!
//! # Example
//!
//! ```ignore
//! use grappler_item::prelude::*;
//!
//! let source = MetaGraphSource::new(load_metagraph("model.meta")?);
//! let mut item = GraphItem::new(source.clone(), AnalysisPolicy::default())?;
//!
//! let important = item.identify_important_ops()?;
//! source.update(|meta| { /* edit the graph */ });
//! let properties = item.op_properties()?; // rebuilt first
//! ```

pub mod source;

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use prost::Message;
use tracing::{debug, info, warn};

use crate::backend::StaticBackend;
use crate::builder::AnalysisPolicy;
use crate::error::{ItemError, ItemResult};
use crate::proto::{MetaGraphDef, TensorProperties};
use crate::traits::AnalysisBackend;

pub use source::MetaGraphSource;

/// Immutable meta-graph snapshot with a lazily rebuilt analysis handle
pub struct GraphItem<B: AnalysisBackend = StaticBackend> {
    source: MetaGraphSource,
    policy: AnalysisPolicy,
    backend: B,
    snapshot: MetaGraphDef,
    handle: B::Handle,
    built_version: u64,
}

impl GraphItem<StaticBackend> {
    /// Create an item over `source` analysed by the static backend
    pub fn new(source: MetaGraphSource, policy: AnalysisPolicy) -> ItemResult<Self> {
        Self::with_backend(source, policy, StaticBackend::new())
    }

    /// Create an item over a plain meta-graph
    pub fn from_metagraph(meta: MetaGraphDef, policy: AnalysisPolicy) -> ItemResult<Self> {
        Self::new(MetaGraphSource::new(meta), policy)
    }
}

impl<B: AnalysisBackend> GraphItem<B> {
    /// Create an item analysed by `backend`.
    ///
    /// Fails with [`ItemError::Validation`] if the backend rejects the graph.
    pub fn with_backend(
        source: MetaGraphSource,
        policy: AnalysisPolicy,
        backend: B,
    ) -> ItemResult<Self> {
        let (snapshot, version) = source.versioned_snapshot();
        let handle = build_handle(&backend, &snapshot, policy)?;

        info!(
            version,
            ignore_colocation = policy.ignore_colocation,
            ignore_user_placement = policy.ignore_user_placement,
            "created graph item"
        );

        Ok(Self {
            source,
            policy,
            backend,
            snapshot,
            handle,
            built_version: version,
        })
    }

    /// Check whether the source changed since the handle was built
    pub fn is_stale(&self) -> bool {
        self.source.version() != self.built_version
    }

    /// Rebuild the handle if the source changed, then return it.
    ///
    /// On failure the previous snapshot and handle are kept and the item stays
    /// stale, so the next call retries.
    pub fn ensure_fresh(&mut self) -> ItemResult<&B::Handle> {
        if self.is_stale() {
            let (snapshot, version) = self.source.versioned_snapshot();
            debug!(
                from = self.built_version,
                to = version,
                "meta-graph changed, rebuilding analysis"
            );

            self.handle = build_handle(&self.backend, &snapshot, self.policy)?;
            self.snapshot = snapshot;
            self.built_version = version;
        }
        Ok(&self.handle)
    }

    /// Ops the graph's fetch and enqueue nodes depend on
    pub fn identify_important_ops(&mut self) -> ItemResult<BTreeSet<String>> {
        self.ensure_fresh()?;
        Ok(self
            .backend
            .identify_important_ops(&self.handle, false)
            .into_iter()
            .collect())
    }

    /// Important ops in topological order
    pub fn identify_important_ops_sorted(&mut self) -> ItemResult<Vec<String>> {
        self.ensure_fresh()?;
        Ok(self.backend.identify_important_ops(&self.handle, true))
    }

    /// Output tensor properties of every op, in graph order
    pub fn op_properties(&mut self) -> ItemResult<IndexMap<String, Vec<TensorProperties>>> {
        self.ensure_fresh()?;

        self.backend
            .op_properties(&self.handle)
            .into_iter()
            .map(|(op, records)| {
                let props = records
                    .iter()
                    .map(|record| TensorProperties::decode(record.as_slice()))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|source| ItemError::Decode {
                        op: op.clone(),
                        source,
                    })?;
                Ok((op, props))
            })
            .collect()
    }

    /// Groups of ops that must share a device
    pub fn colocation_groups(&mut self) -> ItemResult<Vec<Vec<String>>> {
        self.ensure_fresh()?;
        Ok(self.backend.colocation_groups(&self.handle))
    }

    /// Source the item tracks
    pub fn metagraph(&self) -> &MetaGraphSource {
        &self.source
    }

    /// Replace the source graph; the next query rebuilds
    pub fn set_metagraph(&mut self, meta: MetaGraphDef) {
        self.source.replace(meta);
    }

    /// Snapshot the current handle was built from
    pub fn snapshot(&self) -> &MetaGraphDef {
        &self.snapshot
    }

    /// Analysis policy
    pub fn policy(&self) -> AnalysisPolicy {
        self.policy
    }

    /// Source version the current handle was built from
    pub fn built_version(&self) -> u64 {
        self.built_version
    }

    /// Backend the item queries
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn build_handle<B: AnalysisBackend>(
    backend: &B,
    snapshot: &MetaGraphDef,
    policy: AnalysisPolicy,
) -> ItemResult<B::Handle> {
    let bytes = snapshot.encode_to_vec();
    backend
        .build_analysis(
            &bytes,
            policy.ignore_colocation,
            policy.ignore_user_placement,
        )
        .map_err(|status| {
            warn!(code = %status.code, message = %status.message, "backend rejected graph");
            ItemError::from(status)
        })
}

impl<B: AnalysisBackend> fmt::Debug for GraphItem<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphItem")
            .field("source", &self.source)
            .field("policy", &self.policy)
            .field("built_version", &self.built_version)
            .finish_non_exhaustive()
    }
}
