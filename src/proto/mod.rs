//! TensorFlow Protocol Buffer types
//!
//! This module re-exports the prost message types in [`tensorflow`].
//! Additional extension methods are provided in the `extensions` submodule.

pub mod tensorflow;

// Re-export commonly used types at module level
pub use tensorflow::{
    AttrValue, CollectionDef, DataType, GraphDef, MetaGraphDef, NodeDef, QueueRunnerDef,
    ResourceHandleProto, SaverDef, SignatureDef, TensorInfo, TensorProto, TensorShapeProto,
    VariantTensorDataProto, VersionDef,
};

// Re-export submodules for nested types
pub use tensorflow::op_info::TensorProperties;
pub use tensorflow::{
    attr_value, collection_def, meta_graph_def, op_info, resource_handle_proto, tensor_shape_proto,
};

/// Extension methods for TensorFlow protobuf types
pub mod extensions;

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_metagraph_default() {
        let meta = MetaGraphDef::default();
        assert!(meta.graph_def.is_none());
        assert!(meta.collection_def.is_empty());
    }

    #[test]
    fn test_node_def_default() {
        let node = NodeDef::default();
        assert!(node.input.is_empty());
        assert!(node.device.is_empty());
    }

    #[test]
    fn test_tensor_properties_wire_layout() {
        // dtype = DT_FLOAT (field 1, varint 1), empty shape message (field 2)
        let props = TensorProperties {
            dtype: DataType::DtFloat as i32,
            shape: Some(TensorShapeProto::default()),
            value: None,
        };
        assert_eq!(props.encode_to_vec(), vec![0x08, 0x01, 0x12, 0x00]);
    }

    #[test]
    fn test_enum_accessor() {
        let props = TensorProperties {
            dtype: DataType::DtInt64 as i32,
            ..Default::default()
        };
        assert_eq!(props.dtype(), DataType::DtInt64);
    }
}
