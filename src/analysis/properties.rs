//! Static tensor property inference
//!
//! Walks the graph in topological order and derives, for every node output,
//! its dtype, its (possibly partial) shape and, when cheaply known, its value.
//! Ops without a rule fall back to the attribute dtype and an unknown rank.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::graph::GraphContext;
use crate::proto::{DataType, GraphDef, NodeDef, TensorProperties, TensorProto, TensorShapeProto};
use crate::tensor::{
    base_dtype, broadcast_inferred, is_dynamic, normalize_axis, numel, ref_dtype,
    shape_from_proto, shape_to_proto, InferredShape, MAX_RANK,
};

/// Largest constant (in elements) whose value is carried in its properties
pub const MAX_VALUE_ELEMENTS: usize = 1024;

/// Upper bound on the outputs inferred for a single node
pub const MAX_INFERRED_OUTPUTS: usize = 4096;

/// Ops forwarding input 0 unchanged, value included
const PASSTHROUGH_OPS: &[&str] = &[
    "Identity",
    "RefIdentity",
    "StopGradient",
    "PreventGradient",
    "Snapshot",
    "CheckNumerics",
    "Enter",
    "RefEnter",
    "Exit",
    "RefExit",
    "NextIteration",
    "RefNextIteration",
];

/// Elementwise ops whose output matches input 0
const UNARY_OPS: &[&str] = &[
    "Abs", "Ceil", "Cos", "Elu", "Erf", "Exp", "Floor", "LeakyRelu", "Log", "Log1p",
    "LogSoftmax", "Neg", "OnesLike", "Reciprocal", "Relu", "Relu6", "Round", "Rsqrt", "Selu",
    "Sigmoid", "Sign", "Sin", "Softmax", "Softplus", "Softsign", "Sqrt", "Square", "Tanh",
    "ZerosLike",
];

/// Elementwise predicates producing `DT_BOOL`
const UNARY_PREDICATE_OPS: &[&str] = &["IsFinite", "IsInf", "IsNan", "LogicalNot"];

/// Broadcasting binary ops whose dtype matches input 0
const BINARY_OPS: &[&str] = &[
    "Add",
    "AddV2",
    "Div",
    "DivNoNan",
    "FloorDiv",
    "FloorMod",
    "Maximum",
    "Minimum",
    "Mod",
    "Mul",
    "Pow",
    "RealDiv",
    "SquaredDifference",
    "Sub",
    "TruncateDiv",
];

/// Broadcasting binary ops producing `DT_BOOL`
const COMPARISON_OPS: &[&str] = &[
    "Equal",
    "Greater",
    "GreaterEqual",
    "Less",
    "LessEqual",
    "LogicalAnd",
    "LogicalOr",
    "NotEqual",
];

/// Reductions taking `(input, axes)` and a `keep_dims` attr
const REDUCTION_OPS: &[&str] = &["All", "Any", "Max", "Mean", "Min", "Prod", "Sum"];

/// Ops with no data outputs
const NO_OUTPUT_OPS: &[&str] = &["Assert", "ControlTrigger", "NoOp", "Save", "SaveSlices", "SaveV2"];

/// Attributes consulted, in order, for the dtype of ops without a rule
const FALLBACK_DTYPE_ATTRS: &[&str] = &["T", "dtype", "out_type", "DstT"];

fn properties(dtype: DataType, shape: &InferredShape) -> TensorProperties {
    TensorProperties {
        dtype: dtype as i32,
        shape: Some(shape_to_proto(shape)),
        value: None,
    }
}

fn unknown_properties(dtype: DataType) -> TensorProperties {
    properties(dtype, &None)
}

fn shape_of(props: &TensorProperties) -> InferredShape {
    props.shape.as_ref().and_then(shape_from_proto)
}

fn value_ints(props: &TensorProperties) -> Option<Vec<i64>> {
    props.value.as_ref()?.int_values()
}

fn input_dtype(node: &NodeDef, inputs: &[TensorProperties], idx: usize) -> DataType {
    inputs
        .get(idx)
        .map(|p| base_dtype(p.dtype()))
        .filter(|d| *d != DataType::DtInvalid)
        .or_else(|| node.get_attr_type("T").map(base_dtype))
        .unwrap_or(DataType::DtInvalid)
}

fn int_tensor(dtype: DataType, dims: &[i64], values: &[i64]) -> TensorProto {
    let mut tensor = TensorProto {
        dtype: dtype as i32,
        tensor_shape: Some(TensorShapeProto::from_dims(dims)),
        ..Default::default()
    };
    if dtype == DataType::DtInt64 {
        tensor.int64_val = values.to_vec();
    } else {
        tensor.int_val = values.iter().map(|&v| v as i32).collect();
    }
    tensor
}

/// Output properties of every node in a graph
#[derive(Debug, Clone, Default)]
pub struct GraphProperties {
    outputs: IndexMap<String, Vec<TensorProperties>>,
}

impl GraphProperties {
    /// Infer properties for every node of `graph` without executing it
    pub fn infer_statically(graph: &GraphDef) -> Self {
        let ctx = GraphContext::new(graph);
        let mut inferred: FxHashMap<&str, Vec<TensorProperties>> = FxHashMap::default();

        for name in ctx.topological_order() {
            let Some(node) = ctx.get_node(name) else {
                continue;
            };

            let inputs: Vec<TensorProperties> = ctx
                .data_fanins(node)
                .iter()
                .map(|fanin| {
                    inferred
                        .get(fanin.node)
                        .and_then(|outputs| outputs.get(fanin.port as usize))
                        .cloned()
                        .unwrap_or_else(|| unknown_properties(DataType::DtInvalid))
                })
                .collect();

            let outputs = infer_node(node, &inputs, ctx.referenced_outputs(name));
            inferred.insert(name, outputs);
        }

        let outputs: IndexMap<String, Vec<TensorProperties>> = ctx
            .node_names()
            .map(|name| {
                let props = inferred.remove(name.as_str()).unwrap_or_default();
                (name.clone(), props)
            })
            .collect();

        debug!(nodes = outputs.len(), "inferred static properties");
        Self { outputs }
    }

    /// Output properties of a node, empty if unknown
    pub fn output_properties(&self, name: &str) -> &[TensorProperties] {
        self.outputs
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or_default()
    }

    /// Check if the node was analysed
    pub fn has_properties(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    /// Number of analysed nodes
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Check if no node was analysed
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Iterate over `(node, outputs)` in graph order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<TensorProperties>)> {
        self.outputs.iter()
    }

    /// Take the underlying map
    pub fn into_inner(self) -> IndexMap<String, Vec<TensorProperties>> {
        self.outputs
    }
}

fn infer_node(node: &NodeDef, inputs: &[TensorProperties], referenced: usize) -> Vec<TensorProperties> {
    let input = |i: usize| {
        inputs
            .get(i)
            .cloned()
            .unwrap_or_else(|| unknown_properties(DataType::DtInvalid))
    };
    let attr_dtype = |key: &str| node.get_attr_type(key).unwrap_or(DataType::DtInvalid);

    match node.op.as_str() {
        "Placeholder" | "PlaceholderV2" => {
            let shape = node.get_attr_shape("shape").and_then(shape_from_proto);
            vec![properties(attr_dtype("dtype"), &shape)]
        }
        "PlaceholderWithDefault" => {
            let shape = node
                .get_attr_shape("shape")
                .and_then(shape_from_proto)
                .or_else(|| shape_of(&input(0)));
            vec![properties(attr_dtype("dtype"), &shape)]
        }
        "Const" => vec![infer_const(node)],
        "Variable" | "VariableV2" => {
            let shape = node.get_attr_shape("shape").and_then(shape_from_proto);
            vec![properties(ref_dtype(attr_dtype("dtype")), &shape)]
        }
        "VarHandleOp" => vec![properties(DataType::DtResource, &Some(Vec::new()))],
        "ReadVariableOp" => vec![unknown_properties(attr_dtype("dtype"))],
        op if PASSTHROUGH_OPS.contains(&op) => {
            let mut props = input(0);
            props.dtype = input_dtype(node, inputs, 0) as i32;
            vec![props]
        }
        op if UNARY_OPS.contains(&op) => {
            vec![properties(input_dtype(node, inputs, 0), &shape_of(&input(0)))]
        }
        op if UNARY_PREDICATE_OPS.contains(&op) => {
            vec![properties(DataType::DtBool, &shape_of(&input(0)))]
        }
        "Assign" | "AssignAdd" | "AssignSub" => {
            let mut props = input(0);
            props.value = None;
            if props.dtype() == DataType::DtInvalid {
                props.dtype = ref_dtype(attr_dtype("T")) as i32;
            }
            vec![props]
        }
        op if BINARY_OPS.contains(&op) => {
            let shape = broadcast_inferred(&shape_of(&input(0)), &shape_of(&input(1)));
            vec![properties(input_dtype(node, inputs, 0), &shape)]
        }
        op if COMPARISON_OPS.contains(&op) => {
            let shape = broadcast_inferred(&shape_of(&input(0)), &shape_of(&input(1)));
            vec![properties(DataType::DtBool, &shape)]
        }
        "BiasAdd" | "AddN" => {
            vec![properties(input_dtype(node, inputs, 0), &shape_of(&input(0)))]
        }
        "MatMul" => vec![infer_matmul(node, inputs)],
        "Cast" => vec![properties(attr_dtype("DstT"), &shape_of(&input(0)))],
        "Shape" => vec![infer_shape(node, &input(0))],
        "Size" => {
            let dtype = node.get_attr_type("out_type").unwrap_or(DataType::DtInt32);
            let mut props = properties(dtype, &Some(Vec::new()));
            if let Some(dims) = shape_of(&input(0)).filter(|d| !is_dynamic(d)) {
                if let Some(size) = numel(&dims).and_then(|n| i64::try_from(n).ok()) {
                    props.value = Some(int_tensor(dtype, &[], &[size]));
                }
            }
            vec![props]
        }
        "Rank" => {
            let mut props = properties(DataType::DtInt32, &Some(Vec::new()));
            if let Some(rank) = input(0).shape.as_ref().and_then(|s| s.rank()) {
                props.value = Some(int_tensor(DataType::DtInt32, &[], &[rank as i64]));
            }
            vec![props]
        }
        "Reshape" => vec![infer_reshape(node, inputs)],
        op if REDUCTION_OPS.contains(&op) => vec![infer_reduction(node, inputs)],
        "ArgMax" | "ArgMin" => vec![infer_arg_reduction(node, inputs)],
        "Pack" => vec![infer_pack(node, inputs)],
        "ConcatV2" => vec![infer_concat(node, inputs)],
        "Fill" => {
            let shape = value_ints(&input(0)).or_else(|| unknown_dims_of_length(&input(0)));
            vec![properties(input_dtype(node, inputs, 1), &shape)]
        }
        "Transpose" => vec![infer_transpose(node, inputs)],
        "Split" => infer_split(node, inputs),
        "Merge" | "RefMerge" => {
            let value = properties(input_dtype(node, inputs, 0), &shape_of(&input(0)));
            vec![value, properties(DataType::DtInt32, &Some(Vec::new()))]
        }
        "Switch" | "RefSwitch" => {
            let value = properties(input_dtype(node, inputs, 0), &shape_of(&input(0)));
            vec![value.clone(), value]
        }
        op if NO_OUTPUT_OPS.contains(&op) => Vec::new(),
        _ => {
            let dtype = FALLBACK_DTYPE_ATTRS
                .iter()
                .find_map(|key| node.get_attr_type(key))
                .unwrap_or(DataType::DtInvalid);
            vec![unknown_properties(dtype); referenced.clamp(1, MAX_INFERRED_OUTPUTS)]
        }
    }
}

fn infer_const(node: &NodeDef) -> TensorProperties {
    let tensor = node.get_attr_tensor("value");
    let dtype = node
        .get_attr_type("dtype")
        .or_else(|| tensor.map(|t| t.dtype()))
        .unwrap_or(DataType::DtInvalid);

    match tensor {
        Some(tensor) => {
            let mut props = properties(dtype, &Some(tensor.dims()));
            if tensor.num_elements().is_some_and(|n| n <= MAX_VALUE_ELEMENTS) {
                props.value = Some(tensor.clone());
            }
            props
        }
        None => unknown_properties(dtype),
    }
}

fn infer_matmul(node: &NodeDef, inputs: &[TensorProperties]) -> TensorProperties {
    let a = inputs.first().and_then(shape_of).filter(|s| s.len() == 2);
    let b = inputs.get(1).and_then(shape_of).filter(|s| s.len() == 2);
    let transpose_a = node.get_attr_bool("transpose_a", false);
    let transpose_b = node.get_attr_bool("transpose_b", false);

    let m = a.map(|s| if transpose_a { s[1] } else { s[0] }).unwrap_or(-1);
    let n = b.map(|s| if transpose_b { s[0] } else { s[1] }).unwrap_or(-1);

    properties(input_dtype(node, inputs, 0), &Some(vec![m, n]))
}

fn infer_shape(node: &NodeDef, input: &TensorProperties) -> TensorProperties {
    let dtype = node.get_attr_type("out_type").unwrap_or(DataType::DtInt32);

    match shape_of(input) {
        Some(dims) => {
            let rank = dims.len() as i64;
            let mut props = properties(dtype, &Some(vec![rank]));
            if !is_dynamic(&dims) {
                props.value = Some(int_tensor(dtype, &[rank], &dims));
            }
            props
        }
        None => properties(dtype, &Some(vec![-1])),
    }
}

fn infer_reshape(node: &NodeDef, inputs: &[TensorProperties]) -> TensorProperties {
    let dtype = input_dtype(node, inputs, 0);
    let source = inputs.first().and_then(shape_of);
    let target = inputs.get(1);

    let shape = match target.and_then(value_ints) {
        Some(mut dims) => {
            let wildcards = dims.iter().filter(|&&d| d == -1).count();
            if let (1, Some(src)) = (wildcards, source.filter(|s| !is_dynamic(s))) {
                let known = dims
                    .iter()
                    .filter(|&&d| d != -1)
                    .try_fold(1i64, |acc, &d| acc.checked_mul(d));
                let total = numel(&src).and_then(|n| i64::try_from(n).ok());
                if let (Some(known), Some(total)) = (known, total) {
                    if known > 0 {
                        if let Some(pos) = dims.iter().position(|&d| d == -1) {
                            dims[pos] = total / known;
                        }
                    }
                }
            }
            Some(dims)
        }
        None => target.and_then(unknown_dims_of_length),
    };

    properties(dtype, &shape)
}

/// Unknown dimensions for a rank-1 shape tensor of known length
fn unknown_dims_of_length(props: &TensorProperties) -> InferredShape {
    shape_of(props)
        .filter(|s| s.len() == 1 && (0..=MAX_RANK as i64).contains(&s[0]))
        .map(|s| vec![-1; s[0] as usize])
}

fn infer_reduction(node: &NodeDef, inputs: &[TensorProperties]) -> TensorProperties {
    let dtype = if node.is_op_in(&["All", "Any"]) {
        DataType::DtBool
    } else {
        input_dtype(node, inputs, 0)
    };
    let keep_dims = node.get_attr_bool("keep_dims", false);
    let source = inputs.first().and_then(shape_of);
    let axes = inputs.get(1).and_then(value_ints);

    let shape = match (source, axes) {
        (Some(dims), Some(axes)) => {
            let rank = dims.len();
            let axes: Option<Vec<usize>> = axes.iter().map(|&a| normalize_axis(a, rank)).collect();
            axes.map(|axes| {
                dims.iter()
                    .enumerate()
                    .filter_map(|(i, &d)| {
                        if axes.contains(&i) {
                            keep_dims.then_some(1)
                        } else {
                            Some(d)
                        }
                    })
                    .collect()
            })
        }
        (Some(dims), None) if keep_dims => Some(vec![-1; dims.len()]),
        _ => None,
    };

    properties(dtype, &shape)
}

fn infer_arg_reduction(node: &NodeDef, inputs: &[TensorProperties]) -> TensorProperties {
    let dtype = node.get_attr_type("output_type").unwrap_or(DataType::DtInt64);
    let source = inputs.first().and_then(shape_of);
    let axis = inputs
        .get(1)
        .and_then(value_ints)
        .filter(|v| v.len() == 1)
        .map(|v| v[0]);

    let shape = match (source, axis) {
        (Some(mut dims), Some(axis)) => normalize_axis(axis, dims.len()).map(|ax| {
            dims.remove(ax);
            dims
        }),
        (Some(dims), None) if !dims.is_empty() => Some(vec![-1; dims.len() - 1]),
        _ => None,
    };

    properties(dtype, &shape)
}

fn infer_pack(node: &NodeDef, inputs: &[TensorProperties]) -> TensorProperties {
    let count = inputs.len() as i64;
    let axis = node.get_attr_int("axis", 0);

    let shape = inputs.iter().find_map(shape_of).and_then(|mut dims| {
        normalize_axis(axis, dims.len() + 1).map(|ax| {
            dims.insert(ax, count);
            dims
        })
    });

    properties(input_dtype(node, inputs, 0), &shape)
}

fn infer_concat(node: &NodeDef, inputs: &[TensorProperties]) -> TensorProperties {
    let dtype = input_dtype(node, inputs, 0);
    let Some((axis, values)) = inputs.split_last() else {
        return unknown_properties(dtype);
    };

    let axis = value_ints(axis).and_then(|v| v.first().copied());
    let shapes: Option<Vec<Vec<i64>>> = values.iter().map(shape_of).collect();

    let shape = match (axis, shapes) {
        (Some(axis), Some(shapes)) if !shapes.is_empty() => {
            let rank = shapes[0].len();
            if shapes.iter().any(|s| s.len() != rank) {
                None
            } else {
                normalize_axis(axis, rank).map(|ax| {
                    let mut out = shapes[0].clone();
                    out[ax] = if shapes.iter().any(|s| s[ax] < 0) {
                        -1
                    } else {
                        shapes.iter().map(|s| s[ax]).sum()
                    };
                    out
                })
            }
        }
        _ => None,
    };

    properties(dtype, &shape)
}

fn infer_transpose(node: &NodeDef, inputs: &[TensorProperties]) -> TensorProperties {
    let dtype = input_dtype(node, inputs, 0);
    let source = inputs.first().and_then(shape_of);
    let perm = inputs.get(1).and_then(value_ints);

    let shape = match (source, perm) {
        (Some(dims), Some(perm)) if perm.len() == dims.len() => perm
            .iter()
            .map(|&p| normalize_axis(p, dims.len()).map(|ax| dims[ax]))
            .collect(),
        (Some(dims), _) => Some(vec![-1; dims.len()]),
        _ => None,
    };

    properties(dtype, &shape)
}

fn infer_split(node: &NodeDef, inputs: &[TensorProperties]) -> Vec<TensorProperties> {
    let num_split = node
        .get_attr_int("num_split", 1)
        .clamp(1, MAX_INFERRED_OUTPUTS as i64);
    let dtype = input_dtype(node, inputs, 1);
    let axis = inputs
        .first()
        .and_then(value_ints)
        .and_then(|v| v.first().copied());
    let source = inputs.get(1).and_then(shape_of);

    let shape = match (source, axis) {
        (Some(mut dims), Some(axis)) => normalize_axis(axis, dims.len()).map(|ax| {
            if dims[ax] >= 0 {
                dims[ax] /= num_split;
            }
            dims
        }),
        (Some(dims), None) => Some(vec![-1; dims.len()]),
        _ => None,
    };

    vec![properties(dtype, &shape); num_split as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_const_f32, make_const_i32, make_node, make_placeholder};
    use crate::proto::AttrValue;

    fn infer(nodes: Vec<NodeDef>) -> GraphProperties {
        GraphProperties::infer_statically(&GraphDef {
            node: nodes,
            ..Default::default()
        })
    }

    fn dims(props: &TensorProperties) -> Option<Vec<i64>> {
        shape_of(props)
    }

    #[test]
    fn test_chain() {
        let props = infer(vec![
            make_placeholder("a", DataType::DtFloat, &[2, 3]),
            make_node("Relu", &["a"], "b"),
            make_node("Identity", &["b"], "c"),
        ]);

        assert_eq!(props.len(), 3);
        for name in ["a", "b", "c"] {
            let outputs = props.output_properties(name);
            assert_eq!(outputs.len(), 1);
            assert_eq!(outputs[0].dtype(), DataType::DtFloat);
            assert_eq!(dims(&outputs[0]), Some(vec![2, 3]));
        }
    }

    #[test]
    fn test_result_in_graph_order() {
        let props = infer(vec![
            make_node("Relu", &["a"], "b"),
            make_placeholder("a", DataType::DtFloat, &[1]),
        ]);

        let names: Vec<_> = props.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(props.output_properties("b")[0].dtype(), DataType::DtFloat);
    }

    #[test]
    fn test_const_carries_value() {
        let props = infer(vec![make_const_f32("c", &[2], &[1.0, 2.0])]);
        let out = &props.output_properties("c")[0];

        assert_eq!(dims(out), Some(vec![2]));
        assert_eq!(out.value.as_ref().unwrap().float_val, vec![1.0, 2.0]);
    }

    #[test]
    fn test_variable_is_ref_and_identity_reads_base() {
        let mut var = make_node("VariableV2", &[], "v");
        var.set_attr("dtype", AttrValue::new_type(DataType::DtFloat));
        var.set_attr("shape", AttrValue::new_shape(TensorShapeProto::from_dims(&[4])));
        let props = infer(vec![var, make_node("Identity", &["v"], "read")]);

        assert_eq!(props.output_properties("v")[0].dtype(), DataType::DtFloatRef);
        assert_eq!(props.output_properties("read")[0].dtype(), DataType::DtFloat);
        assert_eq!(dims(&props.output_properties("read")[0]), Some(vec![4]));
    }

    #[test]
    fn test_binary_broadcast_and_comparison() {
        let props = infer(vec![
            make_placeholder("x", DataType::DtFloat, &[-1, 3]),
            make_placeholder("y", DataType::DtFloat, &[3]),
            make_node("Add", &["x", "y"], "add"),
            make_node("Greater", &["x", "y"], "gt"),
        ]);

        assert_eq!(dims(&props.output_properties("add")[0]), Some(vec![-1, 3]));
        assert_eq!(props.output_properties("gt")[0].dtype(), DataType::DtBool);
    }

    #[test]
    fn test_matmul() {
        let mut mm = make_node("MatMul", &["a", "b"], "mm");
        mm.set_attr("transpose_b", AttrValue::new_bool(true));
        let props = infer(vec![
            make_placeholder("a", DataType::DtFloat, &[8, 4]),
            make_placeholder("b", DataType::DtFloat, &[16, 4]),
            mm,
        ]);

        assert_eq!(dims(&props.output_properties("mm")[0]), Some(vec![8, 16]));
    }

    #[test]
    fn test_shape_and_reshape() {
        let props = infer(vec![
            make_placeholder("x", DataType::DtFloat, &[2, 3, 4]),
            make_node("Shape", &["x"], "shape"),
            make_const_i32("target", &[2], &[-1, 4]),
            make_node("Reshape", &["x", "target"], "reshape"),
        ]);

        let shape = &props.output_properties("shape")[0];
        assert_eq!(shape.dtype(), DataType::DtInt32);
        assert_eq!(dims(shape), Some(vec![3]));
        assert_eq!(shape.value.as_ref().unwrap().int_val, vec![2, 3, 4]);

        assert_eq!(dims(&props.output_properties("reshape")[0]), Some(vec![6, 4]));
    }

    #[test]
    fn test_reduction() {
        let mut sum = make_node("Sum", &["x", "axes"], "sum");
        sum.set_attr("keep_dims", AttrValue::new_bool(true));
        let props = infer(vec![
            make_placeholder("x", DataType::DtFloat, &[2, 3]),
            make_const_i32("axes", &[1], &[-1]),
            sum,
            make_node("Mean", &["x", "axes"], "mean"),
        ]);

        assert_eq!(dims(&props.output_properties("sum")[0]), Some(vec![2, 1]));
        assert_eq!(dims(&props.output_properties("mean")[0]), Some(vec![2]));
    }

    #[test]
    fn test_concat_and_pack() {
        let props = infer(vec![
            make_placeholder("a", DataType::DtFloat, &[2, 3]),
            make_placeholder("b", DataType::DtFloat, &[2, 5]),
            make_const_i32("axis", &[], &[1]),
            make_node("ConcatV2", &["a", "b", "axis"], "concat"),
            make_node("Pack", &["a", "a"], "pack"),
        ]);

        assert_eq!(dims(&props.output_properties("concat")[0]), Some(vec![2, 8]));
        assert_eq!(dims(&props.output_properties("pack")[0]), Some(vec![2, 2, 3]));
    }

    #[test]
    fn test_split_outputs() {
        let mut split = make_node("Split", &["axis", "x"], "split");
        split.set_attr("num_split", AttrValue::new_int(2));
        let props = infer(vec![
            make_const_i32("axis", &[], &[0]),
            make_placeholder("x", DataType::DtFloat, &[4, 3]),
            split,
            make_node("Add", &["split", "split:1"], "add"),
        ]);

        let outputs = props.output_properties("split");
        assert_eq!(outputs.len(), 2);
        assert_eq!(dims(&outputs[1]), Some(vec![2, 3]));
        assert_eq!(dims(&props.output_properties("add")[0]), Some(vec![2, 3]));
    }

    #[test]
    fn test_no_output_and_unknown_ops() {
        let mut custom = make_node("MyCustomOp", &["x"], "custom");
        custom.set_attr("T", AttrValue::new_type(DataType::DtInt64));
        let props = infer(vec![
            make_placeholder("x", DataType::DtInt64, &[1]),
            custom,
            make_node("Identity", &["custom:2"], "third"),
            make_node("NoOp", &["^third"], "done"),
        ]);

        let custom = props.output_properties("custom");
        assert_eq!(custom.len(), 3);
        assert_eq!(custom[0].dtype(), DataType::DtInt64);
        assert!(custom[0].shape.as_ref().unwrap().unknown_rank);

        assert!(props.has_properties("done"));
        assert!(props.output_properties("done").is_empty());
    }

    #[test]
    fn test_cycle_is_tolerated() {
        let props = infer(vec![
            make_placeholder("x", DataType::DtFloat, &[1]),
            make_node("Merge", &["x", "next"], "merge"),
            make_node("NextIteration", &["merge"], "next"),
        ]);

        let merge = props.output_properties("merge");
        assert_eq!(merge.len(), 2);
        assert_eq!(merge[0].dtype(), DataType::DtFloat);
        assert_eq!(merge[1].dtype(), DataType::DtInt32);
        assert_eq!(props.output_properties("next")[0].dtype(), DataType::DtFloat);
    }

    #[test]
    fn test_merge_consumer_listed_first() {
        let props = infer(vec![
            make_node("Identity", &["merge"], "out"),
            make_placeholder("x", DataType::DtFloat, &[1]),
            make_node("Merge", &["x", "next"], "merge"),
            make_node("NextIteration", &["merge"], "next"),
        ]);

        let out = &props.output_properties("out")[0];
        assert_eq!(out.dtype(), DataType::DtFloat);
        assert_eq!(dims(out), Some(vec![1]));
    }

    #[test]
    fn test_overflowing_element_count() {
        let huge = 1i64 << 32;
        let props = infer(vec![
            make_placeholder("x", DataType::DtFloat, &[huge, huge]),
            make_node("Size", &["x"], "size"),
            make_const_i32("target", &[2], &[-1, 2]),
            make_node("Reshape", &["x", "target"], "reshape"),
        ]);

        let size = &props.output_properties("size")[0];
        assert_eq!(size.dtype(), DataType::DtInt32);
        assert_eq!(dims(size), Some(vec![]));
        assert!(size.value.is_none());

        assert_eq!(dims(&props.output_properties("reshape")[0]), Some(vec![-1, 2]));
    }

    #[test]
    fn test_huge_const_has_no_value() {
        let props = infer(vec![make_const_i32("c", &[1 << 32, 1 << 32], &[0])]);
        let out = &props.output_properties("c")[0];

        assert_eq!(dims(out), Some(vec![1 << 32, 1 << 32]));
        assert!(out.value.is_none());
    }

    #[test]
    fn test_unbounded_rank_is_unknown() {
        let props = infer(vec![
            make_placeholder("x", DataType::DtFloat, &[4]),
            make_placeholder("dims", DataType::DtInt32, &[1 << 40]),
            make_node("Fill", &["dims", "x"], "fill"),
            make_node("Reshape", &["x", "dims"], "reshape"),
            make_placeholder("small", DataType::DtInt32, &[MAX_RANK as i64]),
            make_node("Fill", &["small", "x"], "fill_small"),
        ]);

        assert_eq!(dims(&props.output_properties("fill")[0]), None);
        assert_eq!(dims(&props.output_properties("reshape")[0]), None);
        assert_eq!(
            dims(&props.output_properties("fill_small")[0]).map(|d| d.len()),
            Some(MAX_RANK)
        );
    }

    #[test]
    fn test_output_count_is_bounded() {
        let mut split = make_node("Split", &["axis", "x"], "split");
        split.set_attr("num_split", AttrValue::new_int(i64::MAX));
        let props = infer(vec![
            make_placeholder("x", DataType::DtFloat, &[4]),
            make_node("MyOp", &["x"], "custom"),
            make_node("Identity", &["custom:2147483647"], "y"),
            make_const_i32("axis", &[], &[0]),
            split,
        ]);

        assert_eq!(props.output_properties("custom").len(), MAX_INFERRED_OUTPUTS);
        assert_eq!(props.output_properties("split").len(), MAX_INFERRED_OUTPUTS);
        assert_eq!(props.output_properties("y")[0].dtype(), DataType::DtInvalid);
    }
}
