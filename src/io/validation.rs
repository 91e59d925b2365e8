//! Meta-graph validation
//!
//! Structural checks run before a graph is analysed.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::analysis::MAX_INFERRED_OUTPUTS;
use crate::error::{ItemError, ItemResult};
use crate::graph::TensorRef;
use crate::proto::{GraphDef, MetaGraphDef};

/// Validation result with detailed issues
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the graph is valid
    pub is_valid: bool,
    /// List of errors (critical issues)
    pub errors: Vec<String>,
    /// List of warnings (non-critical issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
        self.is_valid = false;
    }

    /// Add a warning
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Merge with another result
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Promote every warning to an error
    fn promote_warnings(&mut self) {
        if !self.warnings.is_empty() {
            self.is_valid = false;
            self.errors.append(&mut self.warnings);
        }
    }
}

/// Validation options
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Require every `loc:@` colocation target to exist
    pub check_colocation: bool,
    /// Strict mode (warnings become errors)
    pub strict: bool,
}

/// Validate a meta-graph
pub fn validate_metagraph(meta: &MetaGraphDef, options: &ValidationOptions) -> ValidationResult {
    let mut result = ValidationResult::valid();

    match &meta.graph_def {
        Some(graph) => result.merge(validate_graph(graph, options)),
        None => result.add_error("MetaGraphDef does not contain a graph"),
    }

    if meta.collection_def.is_empty() && meta.signature_def.is_empty() {
        result.add_warning("MetaGraphDef has no collections or signatures");
    }

    if options.strict {
        result.promote_warnings();
    }

    debug!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated meta-graph"
    );
    result
}

/// Validate a graph
pub fn validate_graph(graph: &GraphDef, options: &ValidationOptions) -> ValidationResult {
    let mut result = ValidationResult::valid();

    let mut names: FxHashSet<&str> = FxHashSet::default();
    for (idx, node) in graph.node.iter().enumerate() {
        if node.name.is_empty() {
            result.add_error(format!("Node {} has empty name", idx));
        } else if !names.insert(&node.name) {
            result.add_error(format!("Duplicate node name '{}'", node.name));
        }

        if node.op.is_empty() {
            result.add_error(format!("Node '{}' has empty op", node.name));
        }
    }

    for node in &graph.node {
        for input in &node.input {
            if input.is_empty() {
                result.add_warning(format!("Node '{}' has an empty input", node.name));
                continue;
            }

            let fanin = TensorRef::parse(input);
            if !names.contains(fanin.node) {
                result.add_error(format!(
                    "Node '{}' ({}): input '{}' refers to unknown node '{}'",
                    node.name, node.op, input, fanin.node
                ));
            } else if !fanin.is_control() && fanin.port as usize >= MAX_INFERRED_OUTPUTS {
                result.add_warning(format!(
                    "Node '{}': input '{}' uses port {}, outputs past {} are not analysed",
                    node.name, input, fanin.port, MAX_INFERRED_OUTPUTS
                ));
            }
        }

        if options.check_colocation {
            for target in node.colocation_targets() {
                if !names.contains(target) {
                    result.add_error(format!(
                        "Node '{}' is colocated with unknown node '{}'",
                        node.name, target
                    ));
                }
            }
        }
    }

    if graph.node.is_empty() {
        result.add_warning("Graph is empty (no nodes)");
    }

    if options.strict {
        result.promote_warnings();
    }

    result
}

/// Quick validation that returns an error if invalid
pub fn check_metagraph(meta: &MetaGraphDef) -> ItemResult<()> {
    let result = validate_metagraph(meta, &ValidationOptions::default());
    if result.is_valid {
        Ok(())
    } else {
        Err(ItemError::InvalidMetaGraph(result.errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_node, COLOCATION_ATTR};
    use crate::proto::AttrValue;

    fn make_meta(graph: GraphDef) -> MetaGraphDef {
        let mut meta = MetaGraphDef {
            graph_def: Some(graph),
            ..Default::default()
        };
        meta.set_collection_node_list("train_op", &["b"]);
        meta
    }

    fn chain() -> GraphDef {
        GraphDef {
            node: vec![
                make_node("Placeholder", &[], "a"),
                make_node("Relu", &["a"], "b"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_metagraph() {
        let result = validate_metagraph(&make_meta(chain()), &ValidationOptions::default());
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(check_metagraph(&make_meta(chain())).is_ok());
    }

    #[test]
    fn test_missing_graph() {
        let result = validate_metagraph(&MetaGraphDef::default(), &ValidationOptions::default());
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("does not contain a graph"));
    }

    #[test]
    fn test_dangling_input() {
        let mut graph = chain();
        graph.node[1].input.push("^ghost".to_string());

        let result = validate_graph(&graph, &ValidationOptions::default());
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("ghost"));
    }

    #[test]
    fn test_huge_port_is_warned() {
        let mut graph = chain();
        graph.node[1].input = vec!["a:2147483647".to_string()];

        let result = validate_graph(&graph, &ValidationOptions::default());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("2147483647"));
    }

    #[test]
    fn test_duplicate_and_empty_names() {
        let mut graph = chain();
        graph.node.push(make_node("Relu", &["a"], "b"));
        graph.node.push(make_node("", &[], ""));

        let result = validate_graph(&graph, &ValidationOptions::default());
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_colocation_target_checked_on_request() {
        let mut graph = chain();
        graph.node[1].set_attr(COLOCATION_ATTR, AttrValue::new_strings(&["loc:@nowhere"]));

        let lenient = validate_graph(&graph, &ValidationOptions::default());
        assert!(lenient.is_valid);

        let options = ValidationOptions {
            check_colocation: true,
            ..Default::default()
        };
        let checked = validate_graph(&graph, &options);
        assert!(!checked.is_valid);
    }

    #[test]
    fn test_strict_mode() {
        let meta = MetaGraphDef {
            graph_def: Some(chain()),
            ..Default::default()
        };
        assert!(validate_metagraph(&meta, &ValidationOptions::default()).is_valid);

        let strict = ValidationOptions {
            strict: true,
            ..Default::default()
        };
        assert!(!validate_metagraph(&meta, &strict).is_valid);
    }
}
