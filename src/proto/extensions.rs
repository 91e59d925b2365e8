//! Extension methods for TensorFlow protobuf types
//!
//! Provides convenient helper methods for working with TensorFlow protobuf types.

use super::tensorflow::*;
use crate::tensor::numel;

/// Attribute holding colocation constraints (`loc:@<node>` entries)
pub const COLOCATION_ATTR: &str = "_class";

/// Prefix of a colocation constraint inside [`COLOCATION_ATTR`]
pub const COLOCATION_PREFIX: &str = "loc:@";

/// Largest element count a splat constant is expanded to by
/// [`TensorProto::int_values`]
pub const MAX_SPLAT_ELEMENTS: usize = 1 << 20;

// ============================================================================
// MetaGraphDef extensions
// ============================================================================

impl MetaGraphDef {
    /// Get mutable reference to graph, creating if necessary
    pub fn graph_mut(&mut self) -> &mut GraphDef {
        self.graph_def.get_or_insert_with(GraphDef::default)
    }

    /// Node names stored in a `node_list` collection
    pub fn collection_node_list(&self, key: &str) -> &[String] {
        match self.collection_def.get(key).and_then(|c| c.kind.as_ref()) {
            Some(collection_def::Kind::NodeList(list)) => &list.value,
            _ => &[],
        }
    }

    /// Raw records stored in a `bytes_list` collection
    pub fn collection_bytes_list(&self, key: &str) -> &[Vec<u8>] {
        match self.collection_def.get(key).and_then(|c| c.kind.as_ref()) {
            Some(collection_def::Kind::BytesList(list)) => &list.value,
            _ => &[],
        }
    }

    /// Set a `node_list` collection, replacing any previous value
    pub fn set_collection_node_list(&mut self, key: &str, nodes: &[&str]) {
        self.collection_def.insert(
            key.to_string(),
            CollectionDef {
                kind: Some(collection_def::Kind::NodeList(collection_def::NodeList {
                    value: nodes.iter().map(|s| s.to_string()).collect(),
                })),
            },
        );
    }
}

// ============================================================================
// NodeDef extensions
// ============================================================================

impl NodeDef {
    /// Get attribute by name
    pub fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.attr.get(name)
    }

    /// Get a `type` attribute
    pub fn get_attr_type(&self, name: &str) -> Option<DataType> {
        match self.get_attr(name)?.value.as_ref()? {
            attr_value::Value::Type(t) => DataType::try_from(*t).ok(),
            _ => None,
        }
    }

    /// Get integer attribute value with default
    pub fn get_attr_int(&self, name: &str, default: i64) -> i64 {
        match self.get_attr(name).and_then(|a| a.value.as_ref()) {
            Some(attr_value::Value::I(i)) => *i,
            _ => default,
        }
    }

    /// Get bool attribute value with default
    pub fn get_attr_bool(&self, name: &str, default: bool) -> bool {
        match self.get_attr(name).and_then(|a| a.value.as_ref()) {
            Some(attr_value::Value::B(b)) => *b,
            _ => default,
        }
    }

    /// Get a `shape` attribute
    pub fn get_attr_shape(&self, name: &str) -> Option<&TensorShapeProto> {
        match self.get_attr(name)?.value.as_ref()? {
            attr_value::Value::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Get a `tensor` attribute
    pub fn get_attr_tensor(&self, name: &str) -> Option<&TensorProto> {
        match self.get_attr(name)?.value.as_ref()? {
            attr_value::Value::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Set (or replace) an attribute
    pub fn set_attr(&mut self, name: &str, value: AttrValue) {
        self.attr.insert(name.to_string(), value);
    }

    /// Check if this node's op type is in the given list
    pub fn is_op_in(&self, ops: &[&str]) -> bool {
        ops.contains(&self.op.as_str())
    }

    /// Names of the nodes this node must be colocated with
    pub fn colocation_targets(&self) -> Vec<&str> {
        match self.get_attr(COLOCATION_ATTR).and_then(|a| a.value.as_ref()) {
            Some(attr_value::Value::List(list)) => list
                .s
                .iter()
                .filter_map(|s| std::str::from_utf8(s).ok())
                .filter_map(|s| s.strip_prefix(COLOCATION_PREFIX))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Drop every `loc:@` entry from the `_class` attribute.
    ///
    /// Returns true if anything was removed. The attribute itself is removed
    /// once it has no entries left.
    pub fn clear_colocation(&mut self) -> bool {
        let Some(attr_value::Value::List(list)) = self
            .attr
            .get_mut(COLOCATION_ATTR)
            .and_then(|a| a.value.as_mut())
        else {
            return false;
        };

        let before = list.s.len();
        list.s.retain(|s| !s.starts_with(COLOCATION_PREFIX.as_bytes()));
        let removed = list.s.len() != before;

        if list.s.is_empty() {
            self.attr.remove(COLOCATION_ATTR);
        }
        removed
    }
}

// ============================================================================
// TensorShapeProto extensions
// ============================================================================

impl TensorShapeProto {
    /// Shape of unknown rank
    pub fn unknown() -> Self {
        Self {
            dim: Vec::new(),
            unknown_rank: true,
        }
    }

    /// Shape from dimension sizes (`-1` for unknown dimensions)
    pub fn from_dims(dims: &[i64]) -> Self {
        Self {
            dim: dims
                .iter()
                .map(|&size| tensor_shape_proto::Dim {
                    size,
                    name: String::new(),
                })
                .collect(),
            unknown_rank: false,
        }
    }

    /// Dimension sizes, or `None` when the rank is unknown
    pub fn dims(&self) -> Option<Vec<i64>> {
        if self.unknown_rank {
            None
        } else {
            Some(self.dim.iter().map(|d| d.size).collect())
        }
    }

    /// Rank, or `None` when unknown
    pub fn rank(&self) -> Option<usize> {
        (!self.unknown_rank).then_some(self.dim.len())
    }
}

// ============================================================================
// TensorProto extensions
// ============================================================================

impl TensorProto {
    /// Shape of the tensor (scalar when absent)
    pub fn dims(&self) -> Vec<i64> {
        self.tensor_shape
            .as_ref()
            .and_then(|s| s.dims())
            .unwrap_or_default()
    }

    /// Get the total number of elements, `None` if the count overflows
    pub fn num_elements(&self) -> Option<usize> {
        numel(&self.dims())
    }

    /// Integer contents, if the tensor holds int32 or int64 values.
    ///
    /// A single stored value is broadcast to the full element count, matching
    /// how TensorFlow compresses splat constants, up to
    /// [`MAX_SPLAT_ELEMENTS`].
    pub fn int_values(&self) -> Option<Vec<i64>> {
        let n = self.num_elements()?;
        let values: Vec<i64> = match self.dtype() {
            DataType::DtInt32 => {
                if !self.tensor_content.is_empty() {
                    self.tensor_content
                        .chunks_exact(4)
                        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as i64)
                        .collect()
                } else {
                    self.int_val.iter().map(|&v| v as i64).collect()
                }
            }
            DataType::DtInt64 => {
                if !self.tensor_content.is_empty() {
                    self.tensor_content
                        .chunks_exact(8)
                        .map(|c| {
                            i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
                        })
                        .collect()
                } else {
                    self.int64_val.clone()
                }
            }
            _ => return None,
        };

        match values.len() {
            len if len == n => Some(values),
            1 if n > 1 && n <= MAX_SPLAT_ELEMENTS => Some(vec![values[0]; n]),
            _ => None,
        }
    }
}

// ============================================================================
// AttrValue extensions
// ============================================================================

impl AttrValue {
    /// Create a `type` attribute
    pub fn new_type(dtype: DataType) -> Self {
        Self {
            value: Some(attr_value::Value::Type(dtype as i32)),
        }
    }

    /// Create an integer attribute
    pub fn new_int(value: i64) -> Self {
        Self {
            value: Some(attr_value::Value::I(value)),
        }
    }

    /// Create a bool attribute
    pub fn new_bool(value: bool) -> Self {
        Self {
            value: Some(attr_value::Value::B(value)),
        }
    }

    /// Create a `shape` attribute
    pub fn new_shape(shape: TensorShapeProto) -> Self {
        Self {
            value: Some(attr_value::Value::Shape(shape)),
        }
    }

    /// Create a `tensor` attribute
    pub fn new_tensor(tensor: TensorProto) -> Self {
        Self {
            value: Some(attr_value::Value::Tensor(tensor)),
        }
    }

    /// Create a list-of-strings attribute
    pub fn new_strings(values: &[&str]) -> Self {
        Self {
            value: Some(attr_value::Value::List(attr_value::ListValue {
                s: values.iter().map(|s| s.as_bytes().to_vec()).collect(),
                ..Default::default()
            })),
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Create a new NodeDef
pub fn make_node(op: &str, inputs: &[&str], name: &str) -> NodeDef {
    NodeDef {
        name: name.to_string(),
        op: op.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// Create a `Placeholder` node with the given dtype and shape
pub fn make_placeholder(name: &str, dtype: DataType, shape: &[i64]) -> NodeDef {
    let mut node = make_node("Placeholder", &[], name);
    node.set_attr("dtype", AttrValue::new_type(dtype));
    node.set_attr("shape", AttrValue::new_shape(TensorShapeProto::from_dims(shape)));
    node
}

/// Create a `Const` node holding a float tensor
pub fn make_const_f32(name: &str, dims: &[i64], values: &[f32]) -> NodeDef {
    let mut node = make_node("Const", &[], name);
    node.set_attr("dtype", AttrValue::new_type(DataType::DtFloat));
    node.set_attr(
        "value",
        AttrValue::new_tensor(TensorProto {
            dtype: DataType::DtFloat as i32,
            tensor_shape: Some(TensorShapeProto::from_dims(dims)),
            float_val: values.to_vec(),
            ..Default::default()
        }),
    );
    node
}

/// Create a `Const` node holding an int32 tensor
pub fn make_const_i32(name: &str, dims: &[i64], values: &[i32]) -> NodeDef {
    let mut node = make_node("Const", &[], name);
    node.set_attr("dtype", AttrValue::new_type(DataType::DtInt32));
    node.set_attr(
        "value",
        AttrValue::new_tensor(TensorProto {
            dtype: DataType::DtInt32 as i32,
            tensor_shape: Some(TensorShapeProto::from_dims(dims)),
            int_val: values.to_vec(),
            ..Default::default()
        }),
    );
    node
}

/// Create a signature tensor reference
pub fn make_tensor_info(name: &str, dtype: DataType, shape: Option<&[i64]>) -> TensorInfo {
    TensorInfo {
        name: name.to_string(),
        dtype: dtype as i32,
        tensor_shape: shape.map(TensorShapeProto::from_dims),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_get_attr() {
        let mut node = make_node("Sum", &["x", "axes"], "sum");
        node.set_attr("keep_dims", AttrValue::new_bool(true));
        node.set_attr("T", AttrValue::new_type(DataType::DtFloat));

        assert!(node.get_attr_bool("keep_dims", false));
        assert!(!node.get_attr_bool("missing", false));
        assert_eq!(node.get_attr_type("T"), Some(DataType::DtFloat));
        assert_eq!(node.get_attr_int("missing", 7), 7);
    }

    #[test]
    fn test_colocation_targets() {
        let mut node = make_node("Assign", &["v", "init"], "assign");
        node.set_attr(COLOCATION_ATTR, AttrValue::new_strings(&["loc:@v", "other"]));

        assert_eq!(node.colocation_targets(), vec!["v"]);
        assert!(node.clear_colocation());
        assert!(node.colocation_targets().is_empty());
        // Non-colocation entries are kept
        assert!(node.get_attr(COLOCATION_ATTR).is_some());
    }

    #[test]
    fn test_clear_colocation_removes_empty_attr() {
        let mut node = make_node("Identity", &["v"], "read");
        node.set_attr(COLOCATION_ATTR, AttrValue::new_strings(&["loc:@v"]));

        assert!(node.clear_colocation());
        assert!(node.get_attr(COLOCATION_ATTR).is_none());
        assert!(!node.clear_colocation());
    }

    #[test]
    fn test_shape_helpers() {
        let shape = TensorShapeProto::from_dims(&[2, -1]);
        assert_eq!(shape.dims(), Some(vec![2, -1]));
        assert_eq!(shape.rank(), Some(2));

        let unknown = TensorShapeProto::unknown();
        assert_eq!(unknown.dims(), None);
        assert_eq!(unknown.rank(), None);
    }

    #[test]
    fn test_int_values_splat() {
        let node = make_const_i32("c", &[3], &[5]);
        let tensor = node.get_attr_tensor("value").unwrap();
        assert_eq!(tensor.int_values(), Some(vec![5, 5, 5]));
    }

    #[test]
    fn test_int_values_from_content() {
        let tensor = TensorProto {
            dtype: DataType::DtInt64 as i32,
            tensor_shape: Some(TensorShapeProto::from_dims(&[2])),
            tensor_content: [4i64.to_le_bytes(), (-1i64).to_le_bytes()].concat(),
            ..Default::default()
        };
        assert_eq!(tensor.int_values(), Some(vec![4, -1]));
    }

    #[test]
    fn test_int_values_overflowing_shape() {
        let node = make_const_i32("c", &[1 << 32, 1 << 32], &[1]);
        let tensor = node.get_attr_tensor("value").unwrap();
        assert_eq!(tensor.num_elements(), None);
        assert_eq!(tensor.int_values(), None);
    }

    #[test]
    fn test_int_values_splat_is_bounded() {
        let huge = (MAX_SPLAT_ELEMENTS + 1) as i64;
        let node = make_const_i32("c", &[huge], &[7]);
        let tensor = node.get_attr_tensor("value").unwrap();
        assert_eq!(tensor.num_elements(), Some(MAX_SPLAT_ELEMENTS + 1));
        assert_eq!(tensor.int_values(), None);

        let node = make_const_i32("c", &[MAX_SPLAT_ELEMENTS as i64], &[7]);
        let tensor = node.get_attr_tensor("value").unwrap();
        assert_eq!(tensor.int_values().map(|v| v.len()), Some(MAX_SPLAT_ELEMENTS));
    }

    #[test]
    fn test_collection_node_list() {
        let mut meta = MetaGraphDef::default();
        meta.set_collection_node_list("train_op", &["train"]);

        assert_eq!(meta.collection_node_list("train_op"), &["train".to_string()]);
        assert!(meta.collection_node_list("missing").is_empty());
        assert!(meta.collection_bytes_list("train_op").is_empty());
    }
}
