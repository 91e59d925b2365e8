//! Meta-graph field extraction
//!
//! Reads fetch, feed, init, queue runner and saver metadata out of a
//! `MetaGraphDef`.

use prost::Message;

use crate::error::Status;
use crate::graph::TensorRef;
use crate::proto::{MetaGraphDef, QueueRunnerDef, TensorInfo};

/// Collection listing the training op(s)
pub const TRAIN_OP_COLLECTION: &str = "train_op";

/// Collection holding serialized `QueueRunnerDef`s
pub const QUEUE_RUNNERS_COLLECTION: &str = "queue_runners";

/// Collections whose nodes initialize the model
pub const INIT_OP_COLLECTIONS: [&str; 4] = [
    "table_initializer",
    "saved_model_main_op",
    "legacy_init_op",
    "init_op",
];

/// Node name of a tensor name (`"scope/op:1"` → `"scope/op"`)
pub fn node_name(tensor: &str) -> &str {
    TensorRef::parse(tensor).node
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

/// Fetch nodes: the `train_op` collection, then every signature output.
///
/// Signatures are visited in key order; duplicates are dropped.
pub fn fetch_nodes(meta: &MetaGraphDef) -> Vec<String> {
    let mut fetch = Vec::new();

    for tensor in meta.collection_node_list(TRAIN_OP_COLLECTION) {
        push_unique(&mut fetch, node_name(tensor));
    }

    for signature in meta.signature_def.values() {
        for output in signature.outputs.values() {
            push_unique(&mut fetch, node_name(&output.name));
        }
    }

    fetch
}

/// Fed tensors declared by signature inputs, keyed by tensor name
pub fn feeds(meta: &MetaGraphDef) -> Vec<(String, TensorInfo)> {
    let mut feeds: Vec<(String, TensorInfo)> = Vec::new();

    for signature in meta.signature_def.values() {
        for input in signature.inputs.values() {
            if !input.name.is_empty() && !feeds.iter().any(|(name, _)| *name == input.name) {
                feeds.push((input.name.clone(), input.clone()));
            }
        }
    }

    feeds
}

/// Init op node names from the well-known init collections
pub fn init_ops(meta: &MetaGraphDef) -> Vec<String> {
    let mut ops = Vec::new();

    for key in INIT_OP_COLLECTIONS {
        for tensor in meta.collection_node_list(key) {
            push_unique(&mut ops, node_name(tensor));
        }
    }

    ops
}

/// Enqueue op names from the `queue_runners` collection
pub fn enqueue_ops(meta: &MetaGraphDef) -> Result<Vec<String>, Status> {
    let mut ops = Vec::new();

    for record in meta.collection_bytes_list(QUEUE_RUNNERS_COLLECTION) {
        let runner = QueueRunnerDef::decode(record.as_slice()).map_err(|e| {
            Status::invalid_argument(format!("Failed to decode QueueRunnerDef: {}", e))
        })?;
        for op in &runner.enqueue_op_name {
            push_unique(&mut ops, node_name(op));
        }
    }

    Ok(ops)
}

/// Save and restore op names from the `SaverDef`, if any
pub fn saver_ops(meta: &MetaGraphDef) -> (Option<String>, Option<String>) {
    let Some(saver) = meta.saver_def.as_ref() else {
        return (None, None);
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| node_name(s).to_string());
    (
        non_empty(&saver.save_tensor_name),
        non_empty(&saver.restore_op_name),
    )
}
