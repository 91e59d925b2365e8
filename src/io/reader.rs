//! Meta-graph reader
//!
//! Load serialized `MetaGraphDef`s from files or bytes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use prost::Message;
use tracing::debug;

use crate::error::{ItemError, ItemResult};
use crate::proto::MetaGraphDef;

/// Load a meta-graph from a file path
///
/// # Example
///
/// ```ignore
/// use grappler_item::io::load_metagraph;
///
/// let meta = load_metagraph("model.meta")?;
/// println!("{} collections", meta.collection_def.len());
/// ```
pub fn load_metagraph<P: AsRef<Path>>(path: P) -> ItemResult<MetaGraphDef> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| {
        ItemError::InvalidMetaGraph(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();

    reader.read_to_end(&mut buffer).map_err(|e| {
        ItemError::InvalidMetaGraph(format!("Failed to read file '{}': {}", path.display(), e))
    })?;

    debug!(path = %path.display(), bytes = buffer.len(), "read meta-graph");
    load_metagraph_from_bytes(&buffer)
}

/// Load a meta-graph from bytes
pub fn load_metagraph_from_bytes(bytes: &[u8]) -> ItemResult<MetaGraphDef> {
    Ok(MetaGraphDef::decode(bytes)?)
}

/// Meta-graph summary
#[derive(Debug, Clone)]
pub struct MetaGraphInfo {
    /// Meta-graph version string
    pub meta_graph_version: String,
    /// Tags
    pub tags: Vec<String>,
    /// TensorFlow version that produced the graph
    pub tensorflow_version: String,
    /// GraphDef producer version
    pub producer: i32,
    /// Number of nodes
    pub node_count: usize,
    /// Collection keys
    pub collections: Vec<String>,
    /// Signature keys
    pub signatures: Vec<String>,
    /// Whether a saver is attached
    pub has_saver: bool,
}

impl MetaGraphInfo {
    /// Extract a summary from a meta-graph
    pub fn from_metagraph(meta: &MetaGraphDef) -> Self {
        let info = meta.meta_info_def.as_ref();
        let graph = meta.graph_def.as_ref();

        Self {
            meta_graph_version: info.map(|i| i.meta_graph_version.clone()).unwrap_or_default(),
            tags: info.map(|i| i.tags.clone()).unwrap_or_default(),
            tensorflow_version: info.map(|i| i.tensorflow_version.clone()).unwrap_or_default(),
            producer: graph
                .and_then(|g| g.versions.as_ref())
                .map(|v| v.producer)
                .unwrap_or(0),
            node_count: graph.map(|g| g.node.len()).unwrap_or(0),
            collections: meta.collection_def.keys().cloned().collect(),
            signatures: meta.signature_def.keys().cloned().collect(),
            has_saver: meta.saver_def.is_some(),
        }
    }
}

/// Read a meta-graph file and summarize it
pub fn get_metagraph_info<P: AsRef<Path>>(path: P) -> ItemResult<MetaGraphInfo> {
    let meta = load_metagraph(path)?;
    Ok(MetaGraphInfo::from_metagraph(&meta))
}
