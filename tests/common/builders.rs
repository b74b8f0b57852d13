//! Test data builders for creating test pipelines

use modpipe_rs::pipeline::NodeBuilder;
use modpipe_rs::{NameSet, Node, Pipeline};

/// Start a node around a function identifier
pub fn node(func: &'static str, inputs: impl Into<NameSet>, outputs: impl Into<NameSet>) -> NodeBuilder {
    Node::builder(func, inputs, outputs)
}

/// A built node with an explicit name
pub fn named(name: &str, inputs: impl Into<NameSet>, outputs: impl Into<NameSet>) -> Node {
    Node::builder("identity", inputs, outputs)
        .name(name)
        .build()
        .unwrap()
}

/// Builder for creating test pipelines node by node
#[derive(Default)]
pub struct PipelineBuilder {
    nodes: Vec<Node>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Append a named identity node
    pub fn named(self, name: &str, inputs: impl Into<NameSet>, outputs: impl Into<NameSet>) -> Self {
        self.node(named(name, inputs, outputs))
    }

    pub fn build(self) -> Pipeline {
        Pipeline::new(self.nodes).unwrap()
    }
}

/// `A -> node1 -> B`, `[C, D] -> node2 -> [E, F]`, `{H, J} -> node3 -> {K: L}`
pub fn shapes_pipeline() -> Pipeline {
    PipelineBuilder::new()
        .node(node("identity", "A", "B").name("node1").build().unwrap())
        .node(node("biconcat", ["C", "D"], ["E", "F"]).name("node2").build().unwrap())
        .node(
            node("biconcat", [("input1", "H"), ("input2", "J")], [("K", "L")])
                .name("node3")
                .build()
                .unwrap(),
        )
        .build()
}

/// `A -> node1 -> B -> node2 -> C -> node3 -> D`
pub fn chain_pipeline() -> Pipeline {
    PipelineBuilder::new()
        .named("node1", "A", "B")
        .named("node2", "B", "C")
        .named("node3", "C", "D")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder() {
        let pipeline = chain_pipeline();
        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.inputs().into_iter().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(pipeline.outputs().into_iter().collect::<Vec<_>>(), vec!["D"]);
    }
}
