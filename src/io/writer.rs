//! Meta-graph writer
//!
//! Save `MetaGraphDef`s to files or bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use prost::Message;
use tracing::debug;

use crate::error::{ItemError, ItemResult};
use crate::proto::MetaGraphDef;

/// Save a meta-graph to a file
pub fn save_metagraph<P: AsRef<Path>>(meta: &MetaGraphDef, path: P) -> ItemResult<()> {
    let path = path.as_ref();

    let file = File::create(path).map_err(|e| {
        ItemError::InvalidMetaGraph(format!("Failed to create file '{}': {}", path.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    let bytes = meta.encode_to_vec();

    writer.write_all(&bytes)?;
    writer.flush()?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote meta-graph");
    Ok(())
}

/// Encode a meta-graph to its canonical bytes
pub fn metagraph_to_bytes(meta: &MetaGraphDef) -> Vec<u8> {
    meta.encode_to_vec()
}

/// Size of the encoded meta-graph in bytes
pub fn metagraph_size(meta: &MetaGraphDef) -> usize {
    meta.encoded_len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::load_metagraph;
    use crate::proto::extensions::make_node;
    use crate::proto::GraphDef;

    fn create_test_metagraph() -> MetaGraphDef {
        let mut meta = MetaGraphDef {
            graph_def: Some(GraphDef {
                node: vec![make_node("NoOp", &[], "train")],
                ..Default::default()
            }),
            ..Default::default()
        };
        meta.set_collection_node_list("train_op", &["train"]);
        meta
    }

    #[test]
    fn test_metagraph_size() {
        let meta = create_test_metagraph();
        assert_eq!(metagraph_size(&meta), metagraph_to_bytes(&meta).len());
    }

    #[test]
    fn test_save_and_load() {
        let meta = create_test_metagraph();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.meta");

        save_metagraph(&meta, &path).unwrap();
        let loaded = load_metagraph(&path).unwrap();

        assert_eq!(loaded, meta);
    }

    #[test]
    fn test_save_to_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/graph.meta");

        let result = save_metagraph(&create_test_metagraph(), path);
        assert!(matches!(result, Err(ItemError::InvalidMetaGraph(_))));
    }
}
