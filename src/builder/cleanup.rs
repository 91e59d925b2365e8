//! Policy cleanup for item graphs
//!
//! Applies the analysis policy to the item's private graph copy.

use crate::proto::{AttrValue, GraphDef, TensorInfo};

/// Remove every `loc:@` colocation constraint.
///
/// Returns the number of nodes that lost a constraint.
pub fn strip_colocation(graph: &mut GraphDef) -> usize {
    graph
        .node
        .iter_mut()
        .map(|node| node.clear_colocation())
        .filter(|&removed| removed)
        .count()
}

/// Clear every user-supplied device placement.
///
/// Returns the number of nodes whose device was cleared.
pub fn clear_devices(graph: &mut GraphDef) -> usize {
    let mut cleared = 0;
    for node in &mut graph.node {
        if !node.device.is_empty() {
            node.device.clear();
            cleared += 1;
        }
    }
    cleared
}

/// Copy signature shapes onto fed placeholders whose own shape is unknown.
///
/// Returns the number of placeholders updated.
pub fn apply_feed_shapes(graph: &mut GraphDef, feeds: &[(String, TensorInfo)]) -> usize {
    let mut updated = 0;

    for (tensor, info) in feeds {
        let Some(shape) = info.tensor_shape.as_ref() else {
            continue;
        };
        if shape.unknown_rank {
            continue;
        }

        let name = super::fields::node_name(tensor);
        let Some(node) = graph.node.iter_mut().find(|n| n.name == name) else {
            continue;
        };
        if !node.is_op_in(&["Placeholder", "PlaceholderV2"]) {
            continue;
        }

        let known = node
            .get_attr_shape("shape")
            .map(|s| !s.unknown_rank)
            .unwrap_or(false);
        if !known {
            node.set_attr("shape", AttrValue::new_shape(shape.clone()));
            updated += 1;
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_node, make_placeholder, make_tensor_info, COLOCATION_ATTR};
    use crate::proto::{DataType, TensorShapeProto};

    #[test]
    fn test_strip_colocation() {
        let mut read = make_node("Identity", &["v"], "read");
        read.set_attr(COLOCATION_ATTR, AttrValue::new_strings(&["loc:@v"]));
        let mut graph = GraphDef {
            node: vec![make_node("VariableV2", &[], "v"), read],
            ..Default::default()
        };

        assert_eq!(strip_colocation(&mut graph), 1);
        assert!(graph.node[1].colocation_targets().is_empty());
        assert_eq!(strip_colocation(&mut graph), 0);
    }

    #[test]
    fn test_clear_devices() {
        let mut placed = make_node("MatMul", &[], "mm");
        placed.device = "/device:GPU:0".to_string();
        let mut graph = GraphDef {
            node: vec![placed, make_node("NoOp", &[], "noop")],
            ..Default::default()
        };

        assert_eq!(clear_devices(&mut graph), 1);
        assert!(graph.node.iter().all(|n| n.device.is_empty()));
    }

    #[test]
    fn test_apply_feed_shapes() {
        let mut unknown = make_node("Placeholder", &[], "x");
        unknown.set_attr("dtype", AttrValue::new_type(DataType::DtFloat));
        let mut graph = GraphDef {
            node: vec![unknown, make_placeholder("y", DataType::DtFloat, &[2])],
            ..Default::default()
        };
        let feeds = vec![
            (
                "x:0".to_string(),
                make_tensor_info("x:0", DataType::DtFloat, Some(&[-1, 3])),
            ),
            (
                "y:0".to_string(),
                make_tensor_info("y:0", DataType::DtFloat, Some(&[5])),
            ),
        ];

        assert_eq!(apply_feed_shapes(&mut graph, &feeds), 1);
        assert_eq!(
            graph.node[0].get_attr_shape("shape"),
            Some(&TensorShapeProto::from_dims(&[-1, 3]))
        );
        // Declared shapes win over the signature
        assert_eq!(
            graph.node[1].get_attr_shape("shape"),
            Some(&TensorShapeProto::from_dims(&[2]))
        );
    }
}
