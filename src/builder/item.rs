//! Grappler item construction
//!
//! Turns a `MetaGraphDef` plus an [`AnalysisPolicy`] into a [`GrapplerItem`]:
//! the validated graph and the node sets analyses start from.

use tracing::{debug, info};

use crate::error::Status;
use crate::graph::GraphContext;
use crate::io::validation::{validate_graph, ValidationOptions};
use crate::proto::{GraphDef, MetaGraphDef, TensorInfo};

use super::cleanup::{apply_feed_shapes, clear_devices, strip_colocation};
use super::fields::{enqueue_ops, feeds, fetch_nodes, init_ops, node_name, saver_ops};

/// Placement policy applied when an item is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalysisPolicy {
    /// Drop every colocation constraint generated by TensorFlow
    pub ignore_colocation: bool,
    /// Drop every device placement annotated in the graph
    pub ignore_user_placement: bool,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            ignore_colocation: true,
            ignore_user_placement: false,
        }
    }
}

impl AnalysisPolicy {
    /// Set whether colocation constraints are ignored
    pub fn with_ignore_colocation(mut self, ignore: bool) -> Self {
        self.ignore_colocation = ignore;
        self
    }

    /// Set whether user device placement is ignored
    pub fn with_ignore_user_placement(mut self, ignore: bool) -> Self {
        self.ignore_user_placement = ignore;
        self
    }
}

/// A graph prepared for analysis, with the node sets that matter to it
#[derive(Debug, Clone)]
pub struct GrapplerItem {
    /// Graph after the policy has been applied
    pub graph: GraphDef,
    /// Nodes whose outputs the model produces
    pub fetch: Vec<String>,
    /// Tensors fed by callers, with their signature info
    pub feed: Vec<(String, TensorInfo)>,
    /// Nodes run once to initialize the model
    pub init_ops: Vec<String>,
    /// Nodes feeding input queues
    pub enqueue_ops: Vec<String>,
    /// Checkpoint save op
    pub save_op: Option<String>,
    /// Checkpoint restore op
    pub restore_op: Option<String>,
    /// Policy the item was built with
    pub policy: AnalysisPolicy,
}

impl GrapplerItem {
    /// Build a lookup context over the item graph
    pub fn context(&self) -> GraphContext {
        GraphContext::new(&self.graph)
    }

    /// Whether colocation constraints were kept in the item graph
    pub fn honours_colocation(&self) -> bool {
        !self.policy.ignore_colocation
    }
}

fn require_nodes<'a>(
    ctx: &GraphContext,
    kind: &str,
    names: impl IntoIterator<Item = &'a String>,
) -> Result<(), Status> {
    for name in names {
        if !ctx.has_node(name) {
            return Err(Status::invalid_argument(format!(
                "{} node '{}' doesn't exist in graph",
                kind, name
            )));
        }
    }
    Ok(())
}

/// Build an item from a meta-graph
pub fn build_item(meta: &MetaGraphDef, policy: AnalysisPolicy) -> Result<GrapplerItem, Status> {
    let mut graph = meta
        .graph_def
        .clone()
        .ok_or_else(|| Status::invalid_argument("MetaGraphDef does not contain a graph"))?;

    let options = ValidationOptions {
        check_colocation: !policy.ignore_colocation,
        strict: false,
    };
    let validation = validate_graph(&graph, &options);
    for warning in &validation.warnings {
        debug!(warning = %warning, "graph validation warning");
    }
    if !validation.is_valid {
        return Err(Status::invalid_argument(validation.errors.join("; ")));
    }

    let fetch = fetch_nodes(meta);
    if fetch.is_empty() {
        return Err(Status::invalid_argument(
            "Failed to detect the fetch node(s), skipping this input",
        ));
    }

    let feed = feeds(meta);
    let init_ops = init_ops(meta);
    let enqueue_ops = enqueue_ops(meta)?;
    let (save_op, restore_op) = saver_ops(meta);

    let ctx = GraphContext::new(&graph);
    require_nodes(&ctx, "Fetch", &fetch)?;
    let feed_nodes: Vec<String> = feed
        .iter()
        .map(|(tensor, _)| node_name(tensor).to_string())
        .collect();
    require_nodes(&ctx, "Feed", &feed_nodes)?;
    require_nodes(&ctx, "Init", &init_ops)?;
    require_nodes(&ctx, "Enqueue", &enqueue_ops)?;
    require_nodes(&ctx, "Saver", save_op.iter().chain(restore_op.iter()))?;

    if policy.ignore_colocation {
        let stripped = strip_colocation(&mut graph);
        debug!(nodes = stripped, "stripped colocation constraints");
    }
    if policy.ignore_user_placement {
        let cleared = clear_devices(&mut graph);
        debug!(nodes = cleared, "cleared user device placement");
    }
    apply_feed_shapes(&mut graph, &feed);

    info!(
        nodes = graph.node.len(),
        fetch = fetch.len(),
        feeds = feed.len(),
        init_ops = init_ops.len(),
        enqueue_ops = enqueue_ops.len(),
        "built grappler item"
    );

    Ok(GrapplerItem {
        graph,
        fetch,
        feed,
        init_ops,
        enqueue_ops,
        save_op,
        restore_op,
        policy,
    })
}
