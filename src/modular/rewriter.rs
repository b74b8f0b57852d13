//! Pipeline Rewriter.
//!
//! Applies a resolved [`NameMapping`] to every node of a pipeline. Node
//! functions, explicit names, tags and decorators carry over; datasets are
//! renamed in place (container shape preserved) and the node namespace is
//! nested under the mapping's namespace.

use crate::modular::error::ModularResult;
use crate::modular::resolver::NameMapping;
use crate::pipeline::{Node, Pipeline};

pub struct PipelineRewriter;

impl PipelineRewriter {
    /// Rewrite every node and assemble the result.
    ///
    /// Either all nodes are rewritten and a new pipeline is returned, or an
    /// error is returned and nothing is produced. The source is never modified.
    pub fn apply(pipeline: &Pipeline, mapping: &NameMapping) -> ModularResult<Pipeline> {
        let nodes = pipeline
            .node_list()
            .iter()
            .map(|node| Self::rewrite_node(node, mapping))
            .collect::<ModularResult<Vec<_>>>()?;

        Ok(Pipeline::new(nodes)?)
    }

    fn rewrite_node(node: &Node, mapping: &NameMapping) -> ModularResult<Node> {
        let inputs = node.inputs().map_names(|name| mapping.rename(name));
        let outputs = node.outputs().map_names(|name| mapping.rename(name));
        let namespace = Self::nested_namespace(mapping.namespace(), node.namespace());

        let rewritten = node.copy_with(inputs, outputs, namespace)?;
        tracing::trace!("Rewrote node '{}' as '{}'", node.name(), rewritten.name());
        Ok(rewritten)
    }

    /// `outer.inner` when both are set, otherwise whichever one is.
    fn nested_namespace(outer: Option<&str>, inner: Option<&str>) -> Option<String> {
        match (outer, inner) {
            (Some(outer), Some(inner)) => Some(format!("{outer}.{inner}")),
            (Some(outer), None) => Some(outer.to_string()),
            (None, inner) => inner.map(str::to_string),
        }
    }
}
