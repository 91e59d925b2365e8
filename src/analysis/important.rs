//! Important-op identification
//!
//! An op is important when a fetch node or a queue enqueue op transitively
//! depends on it. Data and control edges are followed, plus colocation
//! edges when the item keeps them.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::builder::GrapplerItem;
use crate::graph::{transitive_fanin, GraphContext};

/// Transitive fanin of the fetch nodes
pub fn main_ops_fanin<'a>(item: &'a GrapplerItem, ctx: &'a GraphContext) -> FxHashSet<&'a str> {
    transitive_fanin(
        ctx,
        item.fetch.iter().map(String::as_str),
        item.honours_colocation(),
    )
}

/// Transitive fanin of the queue enqueue ops
pub fn enqueue_ops_fanin<'a>(item: &'a GrapplerItem, ctx: &'a GraphContext) -> FxHashSet<&'a str> {
    transitive_fanin(
        ctx,
        item.enqueue_ops.iter().map(String::as_str),
        item.honours_colocation(),
    )
}

/// Names of the important ops of an item.
///
/// Ops are listed in graph order, or in topological order when
/// `sort_topologically` is set.
pub fn important_ops(item: &GrapplerItem, sort_topologically: bool) -> Vec<String> {
    let ctx = item.context();

    let mut important = main_ops_fanin(item, &ctx);
    important.extend(enqueue_ops_fanin(item, &ctx));

    let ordered: Vec<String> = if sort_topologically {
        ctx.topological_order()
            .into_iter()
            .filter(|name| important.contains(name))
            .map(str::to_string)
            .collect()
    } else {
        ctx.node_names()
            .filter(|name| important.contains(name.as_str()))
            .cloned()
            .collect()
    };

    debug!(
        important = ordered.len(),
        total = ctx.node_count(),
        "identified important ops"
    );
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_item, AnalysisPolicy};
    use crate::proto::extensions::{make_node, COLOCATION_ATTR};
    use crate::proto::{AttrValue, GraphDef, MetaGraphDef};

    fn make_meta(nodes: Vec<crate::proto::NodeDef>, fetch: &[&str]) -> MetaGraphDef {
        let mut meta = MetaGraphDef {
            graph_def: Some(GraphDef {
                node: nodes,
                ..Default::default()
            }),
            ..Default::default()
        };
        meta.set_collection_node_list("train_op", fetch);
        meta
    }

    #[test]
    fn test_chain_is_important() {
        let meta = make_meta(
            vec![
                make_node("Placeholder", &[], "a"),
                make_node("Relu", &["a"], "b"),
                make_node("Identity", &["b"], "c"),
                make_node("Const", &[], "unused"),
            ],
            &["c"],
        );
        let item = build_item(&meta, AnalysisPolicy::default()).unwrap();

        assert_eq!(important_ops(&item, false), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_control_dependencies_are_followed() {
        let meta = make_meta(
            vec![
                make_node("NoOp", &["^init"], "train"),
                make_node("Const", &[], "init"),
            ],
            &["train"],
        );
        let item = build_item(&meta, AnalysisPolicy::default()).unwrap();

        assert_eq!(important_ops(&item, false), vec!["train", "init"]);
        assert_eq!(important_ops(&item, true), vec!["init", "train"]);
    }

    #[test]
    fn test_colocation_edges_follow_policy() {
        let mut train = make_node("NoOp", &[], "train");
        train.set_attr(COLOCATION_ATTR, AttrValue::new_strings(&["loc:@anchor"]));
        let meta = make_meta(vec![make_node("NoOp", &[], "anchor"), train], &["train"]);

        let ignored = build_item(&meta, AnalysisPolicy::default()).unwrap();
        assert_eq!(important_ops(&ignored, false), vec!["train"]);

        let honoured =
            build_item(&meta, AnalysisPolicy::default().with_ignore_colocation(false)).unwrap();
        assert_eq!(important_ops(&honoured, false), vec!["anchor", "train"]);
    }

    #[test]
    fn test_init_ops_are_not_important() {
        let mut meta = make_meta(
            vec![
                make_node("NoOp", &[], "train"),
                make_node("NoOp", &[], "init"),
            ],
            &["train"],
        );
        meta.set_collection_node_list("init_op", &["init"]);
        let item = build_item(&meta, AnalysisPolicy::default()).unwrap();

        assert_eq!(item.init_ops, vec!["init"]);
        assert_eq!(important_ops(&item, false), vec!["train"]);
    }
}
