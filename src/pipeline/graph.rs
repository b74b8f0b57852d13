//! The pipeline graph.
//!
//! A [`Pipeline`] is a validated set of nodes. There are no explicit edges:
//! nodes connect wherever an output name of one node (transcoding suffix
//! ignored) is an input name of another.
//!
//! Construction rejects:
//! - distinct nodes that share a name (identical nodes are merged),
//! - datasets produced by more than one node,
//! - datasets referenced both with and without a transcoding suffix,
//! - cycles.

use crate::pipeline::dataset::{is_parameter, is_transcoded, strip_transcoding};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::names::NameSet;
use crate::pipeline::node::{Node, NodeDecorator};
use crate::pipeline::topology::TopologySorter;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Add;
use std::sync::Arc;

/// An immutable, validated collection of nodes.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Nodes in construction order.
    nodes: Vec<Node>,
    /// Dependency layers (indices into `nodes`).
    groups: Vec<Vec<usize>>,
}

impl Pipeline {
    /// Build a pipeline from nodes, validating the resulting graph.
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> PipelineResult<Self> {
        let mut unique: Vec<Node> = Vec::new();
        for node in nodes {
            if !unique.contains(&node) {
                unique.push(node);
            }
        }

        Self::validate_unique_names(&unique)?;
        Self::validate_unique_outputs(&unique)?;
        Self::validate_transcoding(&unique)?;
        let groups = TopologySorter::group(&unique)?;

        Ok(Self {
            nodes: unique,
            groups,
        })
    }

    /// Combine several pipelines into one.
    pub fn from_pipelines<'a>(
        pipelines: impl IntoIterator<Item = &'a Pipeline>,
    ) -> PipelineResult<Self> {
        Self::new(pipelines.into_iter().flat_map(|p| p.nodes.iter().cloned()))
    }

    fn validate_unique_names(nodes: &[Node]) -> PipelineResult<()> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for node in nodes {
            *counts.entry(node.name()).or_default() += 1;
        }
        let duplicates: Vec<String> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect();
        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::DuplicateNodeNames(duplicates))
        }
    }

    fn validate_unique_outputs(nodes: &[Node]) -> PipelineResult<()> {
        // Transcoded outputs are one dataset per base name
        let mut producers: BTreeMap<&str, usize> = BTreeMap::new();
        for node in nodes {
            for output in node.output_names() {
                *producers.entry(strip_transcoding(output)).or_default() += 1;
            }
        }
        let duplicates: Vec<String> = producers
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect();
        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::OutputNotUnique(duplicates))
        }
    }

    fn validate_transcoding(nodes: &[Node]) -> PipelineResult<()> {
        let all: BTreeSet<&str> = nodes
            .iter()
            .flat_map(|n| n.input_names().into_iter().chain(n.output_names()))
            .collect();
        let invalid: BTreeSet<&str> = all
            .iter()
            .filter(|name| is_transcoded(name))
            .map(|name| strip_transcoding(*name))
            .filter(|base| all.contains(base))
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::TranscodingMismatch(
                invalid.into_iter().map(str::to_string).collect(),
            ))
        }
    }

    // ── Node access ──

    /// Nodes in topological order, each dependency layer sorted by node order.
    pub fn nodes(&self) -> Vec<&Node> {
        self.groups
            .iter()
            .flatten()
            .map(|&idx| &self.nodes[idx])
            .collect()
    }

    /// Dependency layers: nodes in a layer only depend on earlier layers.
    pub fn grouped_nodes(&self) -> Vec<Vec<&Node>> {
        self.groups
            .iter()
            .map(|group| group.iter().map(|&idx| &self.nodes[idx]).collect())
            .collect()
    }

    /// All nodes sorted by node order (full name first).
    pub fn sorted_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort();
        nodes
    }

    /// Nodes in the order they were given at construction.
    pub fn node_list(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Datasets ──

    /// Every dataset name read by some node.
    pub fn all_inputs(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .flat_map(|n| n.input_names())
            .map(str::to_string)
            .collect()
    }

    /// Every dataset name written by some node.
    pub fn all_outputs(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .flat_map(|n| n.output_names())
            .map(str::to_string)
            .collect()
    }

    /// Every dataset name referenced anywhere in the pipeline.
    pub fn data_sets(&self) -> BTreeSet<String> {
        let mut names = self.all_inputs();
        names.extend(self.all_outputs());
        names
    }

    /// Datasets with both a producer and a consumer inside the pipeline,
    /// by base name.
    fn intermediates(&self) -> BTreeSet<String> {
        let inputs: BTreeSet<String> = self
            .all_inputs()
            .iter()
            .map(|n| strip_transcoding(n).to_string())
            .collect();
        self.all_outputs()
            .iter()
            .map(|n| strip_transcoding(n).to_string())
            .filter(|base| inputs.contains(base))
            .collect()
    }

    /// Free inputs: inputs that no node in the pipeline produces.
    pub fn inputs(&self) -> BTreeSet<String> {
        let intermediates = self.intermediates();
        self.all_inputs()
            .into_iter()
            .filter(|n| !intermediates.contains(strip_transcoding(n)))
            .collect()
    }

    /// Free outputs: outputs that no node in the pipeline consumes.
    pub fn outputs(&self) -> BTreeSet<String> {
        let intermediates = self.intermediates();
        self.all_outputs()
            .into_iter()
            .filter(|n| !intermediates.contains(strip_transcoding(n)))
            .collect()
    }

    /// Parameter identifiers (`parameters` and `params:*`) referenced by nodes.
    pub fn parameters(&self) -> BTreeSet<String> {
        self.data_sets()
            .into_iter()
            .filter(|n| is_parameter(n))
            .collect()
    }

    /// Dataset names that are not parameter identifiers.
    pub fn datasets(&self) -> BTreeSet<String> {
        self.data_sets()
            .into_iter()
            .filter(|n| !is_parameter(n))
            .collect()
    }

    // ── Transforms ──

    /// Copy the pipeline with `tags` added to every node.
    pub fn tag<I, S>(&self, tags: I) -> Pipeline
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        self.map_nodes(|node| node.tag(tags.iter().cloned()))
    }

    /// Copy the pipeline with `decorators` appended to every node.
    pub fn decorate<I>(&self, decorators: I) -> Pipeline
    where
        I: IntoIterator<Item = Arc<dyn NodeDecorator>>,
    {
        let decorators: Vec<Arc<dyn NodeDecorator>> = decorators.into_iter().collect();
        self.map_nodes(|node| node.decorate(decorators.iter().cloned()))
    }

    /// Sub-pipeline of nodes carrying at least one of `tags`.
    pub fn only_nodes_with_tags<I, S>(&self, tags: I) -> PipelineResult<Pipeline>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(|t| t.as_ref().to_string()).collect();
        Pipeline::new(
            self.nodes
                .iter()
                .filter(|node| !node.tags().is_disjoint(&tags))
                .cloned(),
        )
    }

    /// Sub-pipeline of nodes in `namespace` or any namespace nested under it.
    pub fn only_nodes_with_namespace(&self, namespace: &str) -> PipelineResult<Pipeline> {
        let nested = format!("{namespace}.");
        Pipeline::new(
            self.nodes
                .iter()
                .filter(|node| {
                    node.namespace()
                        .is_some_and(|ns| ns == namespace || ns.starts_with(&nested))
                })
                .cloned(),
        )
    }

    /// Union of two pipelines.
    pub fn union(&self, other: &Pipeline) -> PipelineResult<Pipeline> {
        Self::from_pipelines([self, other])
    }

    /// Tag and decorate never change names or datasets, so the existing
    /// layout stays valid.
    fn map_nodes<F>(&self, f: F) -> Pipeline
    where
        F: Fn(&Node) -> Node,
    {
        Pipeline {
            nodes: self.nodes.iter().map(f).collect(),
            groups: self.groups.clone(),
        }
    }

    // ── Reporting ──

    /// Human-readable listing: nodes in execution order, then free inputs
    /// and outputs.
    pub fn describe(&self) -> String {
        let nodes: String = self
            .nodes()
            .iter()
            .map(|node| format!("{}\n", node.name()))
            .collect();
        format!(
            "#### Pipeline execution order ####\n\
             Inputs: {}\n\n\
             {}\n\
             Outputs: {}\n\
             ##################################",
            join_names(&self.inputs()),
            nodes,
            join_names(&self.outputs()),
        )
    }

    /// Serialisable view of the pipeline.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            nodes: self
                .nodes()
                .into_iter()
                .map(|node| NodeSnapshot {
                    name: node.name(),
                    func: node.func_name().to_string(),
                    namespace: node.namespace().map(str::to_string),
                    inputs: node.inputs().clone(),
                    outputs: node.outputs().clone(),
                    tags: node.tags().iter().cloned().collect(),
                    decorators: node.decorators().iter().map(|d| d.name().to_string()).collect(),
                })
                .collect(),
            inputs: self.inputs().into_iter().collect(),
            outputs: self.outputs().into_iter().collect(),
            parameters: self.parameters().into_iter().collect(),
        }
    }
}

fn join_names(names: &BTreeSet<String>) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

impl<'a> Add<&'a Pipeline> for &'a Pipeline {
    type Output = PipelineResult<Pipeline>;

    fn add(self, other: &'a Pipeline) -> Self::Output {
        self.union(other)
    }
}

/// Pipelines compare equal when they hold the same set of nodes.
impl PartialEq for Pipeline {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_nodes() == other.sorted_nodes()
    }
}

impl Eq for Pipeline {}

/// Snapshot of a node for serialisation.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub func: String,
    pub namespace: Option<String>,
    pub inputs: NameSet,
    pub outputs: NameSet,
    pub tags: Vec<String>,
    pub decorators: Vec<String>,
}

/// Snapshot of a pipeline for serialisation, nodes in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub parameters: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, inputs: impl Into<NameSet>, outputs: impl Into<NameSet>) -> Node {
        Node::builder("f", inputs, outputs)
            .name(name)
            .build()
            .unwrap()
    }

    fn chain() -> Pipeline {
        Pipeline::new([
            named("node1", "A", "B"),
            named("node2", "B", "C"),
            named("node3", "C", "D"),
        ])
        .unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_free_inputs_and_outputs() {
        let p = chain();
        assert_eq!(p.inputs(), set(&["A"]));
        assert_eq!(p.outputs(), set(&["D"]));
        assert_eq!(p.all_inputs(), set(&["A", "B", "C"]));
        assert_eq!(p.data_sets(), set(&["A", "B", "C", "D"]));
    }

    #[test]
    fn test_transcoded_intermediate_is_not_free() {
        let p = Pipeline::new([
            named("write", "A", "B@pandas"),
            named("read", "B@spark", "C"),
        ])
        .unwrap();
        assert_eq!(p.inputs(), set(&["A"]));
        assert_eq!(p.outputs(), set(&["C"]));
    }

    #[test]
    fn test_parameters_and_datasets() {
        let p = Pipeline::new([
            named("n1", ["A", "params:x"], "B"),
            named("n2", ["B", "parameters"], "C"),
        ])
        .unwrap();
        assert_eq!(p.parameters(), set(&["parameters", "params:x"]));
        assert_eq!(p.datasets(), set(&["A", "B", "C"]));
    }

    #[test]
    fn test_nodes_in_topological_order() {
        let p = Pipeline::new([
            named("node3", "C", "D"),
            named("node1", "A", "B"),
            named("node2", "B", "C"),
        ])
        .unwrap();
        let names: Vec<String> = p.nodes().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["node1", "node2", "node3"]);
        assert_eq!(p.node_list()[0].name(), "node3");
    }

    #[test]
    fn test_identical_nodes_are_merged() {
        let node = named("node1", "A", "B");
        let p = Pipeline::new([node.clone(), node]).unwrap();
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Pipeline::new([named("n", "A", "B"), named("n", "C", "D")]).unwrap_err();
        assert_eq!(err, PipelineError::DuplicateNodeNames(vec!["n".to_string()]));
    }

    #[test]
    fn test_output_not_unique() {
        let err = Pipeline::new([named("n1", "A", "B"), named("n2", "C", "B")]).unwrap_err();
        assert_eq!(err, PipelineError::OutputNotUnique(vec!["B".to_string()]));
    }

    #[test]
    fn test_transcoded_outputs_not_unique() {
        let err = Pipeline::new([named("n1", "A", "B@pandas"), named("n2", "C", "B@spark")])
            .unwrap_err();
        assert_eq!(err, PipelineError::OutputNotUnique(vec!["B".to_string()]));
    }

    #[test]
    fn test_transcoding_mismatch() {
        let err = Pipeline::new([named("n1", "A", "B@pandas"), named("n2", "B", "C")]).unwrap_err();
        assert_eq!(err, PipelineError::TranscodingMismatch(vec!["B".to_string()]));
    }

    #[test]
    fn test_cycle_rejected() {
        let err = Pipeline::new([named("n1", "A", "B"), named("n2", "B", "A")]).unwrap_err();
        assert!(matches!(err, PipelineError::CircularDependency(_)));
    }

    #[test]
    fn test_only_nodes_with_tags() {
        let p = Pipeline::new([
            named("n1", "A", "B").tag(["prep"]),
            named("n2", "B", "C").tag(["train"]),
        ])
        .unwrap();
        let prep = p.only_nodes_with_tags(["prep"]).unwrap();
        assert_eq!(prep.len(), 1);
        assert_eq!(prep.nodes()[0].name(), "n1");
    }

    #[test]
    fn test_only_nodes_with_namespace() {
        let p = Pipeline::new([
            Node::builder("f", "A", "B").name("n1").namespace("a").build().unwrap(),
            Node::builder("f", "B", "C").name("n2").namespace("a.b").build().unwrap(),
            Node::builder("f", "C", "D").name("n3").namespace("ab").build().unwrap(),
            named("n4", "D", "E"),
        ])
        .unwrap();
        let selected = p.only_nodes_with_namespace("a").unwrap();
        let names: Vec<String> = selected.nodes().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a.n1", "a.b.n2"]);
    }

    #[test]
    fn test_union() {
        let left = Pipeline::new([named("n1", "A", "B")]).unwrap();
        let right = Pipeline::new([named("n2", "B", "C")]).unwrap();
        let combined = (&left + &right).unwrap();
        assert_eq!(combined.inputs(), set(&["A"]));
        assert_eq!(combined.outputs(), set(&["C"]));
    }

    #[test]
    fn test_tag_and_decorate_pipeline() {
        let p = chain()
            .tag(["etl"])
            .decorate([Arc::new("timer") as Arc<dyn NodeDecorator>]);
        assert!(p.nodes().iter().all(|n| n.tags().contains("etl")));
        assert!(p.nodes().iter().all(|n| n.decorators().len() == 1));
        assert_eq!(p, chain());
    }

    #[test]
    fn test_describe() {
        let text = chain().describe();
        assert!(text.contains("Inputs: A"));
        assert!(text.contains("node1\nnode2\nnode3"));
        assert!(text.contains("Outputs: D"));
        assert_eq!(
            text,
            "#### Pipeline execution order ####\n\
             Inputs: A\n\n\
             node1\nnode2\nnode3\n\n\
             Outputs: D\n\
             ##################################"
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(chain().snapshot()).unwrap();
        assert_eq!(json["nodes"][0]["name"], "node1");
        assert_eq!(json["nodes"][0]["inputs"], "A");
        assert_eq!(json["inputs"][0], "A");
    }
}
