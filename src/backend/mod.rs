//! Static analysis backend
//!
//! [`StaticBackend`] implements [`AnalysisBackend`] in-process: it decodes
//! the meta-graph, builds a [`GrapplerItem`] and answers queries from it
//! without executing the graph.

use std::sync::OnceLock;

use indexmap::IndexMap;
use prost::Message;
use tracing::debug;

use crate::analysis::{colocation_groups, important_ops, GraphProperties};
use crate::builder::{build_item, AnalysisPolicy, GrapplerItem};
use crate::error::Status;
use crate::proto::MetaGraphDef;
use crate::traits::AnalysisBackend;

/// Analysis state for one meta-graph snapshot
#[derive(Debug)]
pub struct AnalysisHandle {
    item: GrapplerItem,
    properties: OnceLock<GraphProperties>,
}

impl AnalysisHandle {
    /// Wrap a built item
    pub fn new(item: GrapplerItem) -> Self {
        Self {
            item,
            properties: OnceLock::new(),
        }
    }

    /// The item the handle was built from
    pub fn item(&self) -> &GrapplerItem {
        &self.item
    }

    /// Static properties of the item graph, inferred on first use
    pub fn properties(&self) -> &GraphProperties {
        self.properties
            .get_or_init(|| GraphProperties::infer_statically(&self.item.graph))
    }
}

/// In-process backend using static inference
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBackend;

impl StaticBackend {
    /// Create a new backend
    pub fn new() -> Self {
        Self
    }
}

impl AnalysisBackend for StaticBackend {
    type Handle = AnalysisHandle;

    fn build_analysis(
        &self,
        metagraph: &[u8],
        ignore_colocation: bool,
        ignore_user_placement: bool,
    ) -> Result<AnalysisHandle, Status> {
        let meta = MetaGraphDef::decode(metagraph).map_err(|e| {
            Status::invalid_argument(format!("Failed to parse MetaGraphDef: {}", e))
        })?;

        let policy = AnalysisPolicy {
            ignore_colocation,
            ignore_user_placement,
        };
        let item = build_item(&meta, policy)?;

        debug!(bytes = metagraph.len(), "built analysis handle");
        Ok(AnalysisHandle::new(item))
    }

    fn identify_important_ops(
        &self,
        handle: &AnalysisHandle,
        sort_topologically: bool,
    ) -> Vec<String> {
        important_ops(handle.item(), sort_topologically)
    }

    fn op_properties(&self, handle: &AnalysisHandle) -> IndexMap<String, Vec<Vec<u8>>> {
        handle
            .properties()
            .iter()
            .map(|(name, outputs)| {
                let records = outputs.iter().map(|p| p.encode_to_vec()).collect();
                (name.clone(), records)
            })
            .collect()
    }

    fn colocation_groups(&self, handle: &AnalysisHandle) -> Vec<Vec<String>> {
        colocation_groups(&handle.item().context())
    }
}
