//! Node abstraction for the pipeline.
//!
//! A [`Node`] is an immutable unit of computation described by the datasets it
//! reads and writes. This crate never calls node logic: the function and any
//! decorators are opaque trait objects that only contribute an identifier,
//! and they are carried unchanged through every transform.
//!
//! All transforms (`copy_with`, `rename`, `tag`, `decorate`) return a new node.

use crate::pipeline::dataset::{prefix, transcode_split, TRANSCODING_SEPARATOR};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::names::NameSet;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The computation wrapped by a node.
pub trait NodeFunction: Send + Sync {
    /// Identifier of the function, used to derive node names.
    fn name(&self) -> &str;
}

/// Behaviour layered onto a node by a prior transform (e.g. retry, timing).
pub trait NodeDecorator: Send + Sync {
    fn name(&self) -> &str;
}

impl NodeFunction for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl NodeFunction for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl NodeDecorator for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl NodeDecorator for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

/// Builder for [`Node`]. Validation happens in [`NodeBuilder::build`].
pub struct NodeBuilder {
    func: Arc<dyn NodeFunction>,
    inputs: NameSet,
    outputs: NameSet,
    name: Option<String>,
    namespace: Option<String>,
    tags: BTreeSet<String>,
    decorators: Vec<Arc<dyn NodeDecorator>>,
}

impl NodeBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn decorator(mut self, decorator: Arc<dyn NodeDecorator>) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub fn build(self) -> PipelineResult<Node> {
        let label = self
            .name
            .clone()
            .unwrap_or_else(|| derive_name(self.func.name(), &self.inputs, &self.outputs));

        if let Some(name) = &self.name {
            if name.contains(TRANSCODING_SEPARATOR) {
                return Err(PipelineError::InvalidNodeName(name.clone()));
            }
        }

        for dataset in self.inputs.names().into_iter().chain(self.outputs.names()) {
            transcode_split(dataset)?;
        }

        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = self
            .outputs
            .names()
            .into_iter()
            .filter(|name| !seen.insert(*name))
            .map(str::to_string)
            .collect();
        if !duplicates.is_empty() {
            duplicates.sort();
            duplicates.dedup();
            return Err(PipelineError::DuplicateNodeOutputs {
                node: label,
                duplicates,
            });
        }

        let inputs: BTreeSet<&str> = self.inputs.names().into_iter().collect();
        let overlap: Vec<String> = self
            .outputs
            .names()
            .into_iter()
            .filter(|name| inputs.contains(name))
            .map(str::to_string)
            .collect();
        if !overlap.is_empty() {
            return Err(PipelineError::InputsOverlapOutputs {
                node: label,
                overlap,
            });
        }

        let derived_name = derive_name(self.func.name(), &self.inputs, &self.outputs);
        Ok(Node {
            func: self.func,
            inputs: self.inputs,
            outputs: self.outputs,
            name: self.name,
            namespace: self.namespace,
            tags: self.tags,
            decorators: self.decorators,
            derived_name,
        })
    }
}

/// `func([in1,in2]) -> [out1]`, or `-> None` when the node has no outputs.
fn derive_name(func_name: &str, inputs: &NameSet, outputs: &NameSet) -> String {
    let out = if outputs.is_empty() {
        "None".to_string()
    } else {
        outputs.to_string()
    };
    format!("{func_name}({inputs}) -> {out}")
}

/// An immutable pipeline node.
#[derive(Clone)]
pub struct Node {
    func: Arc<dyn NodeFunction>,
    inputs: NameSet,
    outputs: NameSet,
    name: Option<String>,
    namespace: Option<String>,
    tags: BTreeSet<String>,
    decorators: Vec<Arc<dyn NodeDecorator>>,
    /// Computed once from the function identifier and the node's own datasets.
    derived_name: String,
}

impl Node {
    /// Start building a node around `func`.
    pub fn builder(
        func: impl NodeFunction + 'static,
        inputs: impl Into<NameSet>,
        outputs: impl Into<NameSet>,
    ) -> NodeBuilder {
        Self::builder_from_arc(Arc::new(func), inputs, outputs)
    }

    /// Like [`Node::builder`] but shares an existing function handle.
    pub fn builder_from_arc(
        func: Arc<dyn NodeFunction>,
        inputs: impl Into<NameSet>,
        outputs: impl Into<NameSet>,
    ) -> NodeBuilder {
        NodeBuilder {
            func,
            inputs: inputs.into(),
            outputs: outputs.into(),
            name: None,
            namespace: None,
            tags: BTreeSet::new(),
            decorators: Vec::new(),
        }
    }

    /// Shorthand for an unnamed, untagged node.
    pub fn new(
        func: impl NodeFunction + 'static,
        inputs: impl Into<NameSet>,
        outputs: impl Into<NameSet>,
    ) -> PipelineResult<Node> {
        Self::builder(func, inputs, outputs).build()
    }

    /// Full node name, namespace included.
    pub fn name(&self) -> String {
        prefix(self.namespace.as_deref(), self.local_name())
    }

    /// Name without the namespace: the explicit name or the derived one.
    pub fn local_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.derived_name)
    }

    /// The explicit name given at construction, if any.
    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Human-friendly name: the explicit name, else the function identifier
    /// in title case (`load_data` becomes `Load Data`).
    pub fn short_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .func_name()
                .split('_')
                .filter(|word| !word.is_empty())
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn func_name(&self) -> &str {
        self.func.name()
    }

    pub fn func(&self) -> &Arc<dyn NodeFunction> {
        &self.func
    }

    pub fn inputs(&self) -> &NameSet {
        &self.inputs
    }

    pub fn outputs(&self) -> &NameSet {
        &self.outputs
    }

    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.names()
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.names()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn decorators(&self) -> &[Arc<dyn NodeDecorator>] {
        &self.decorators
    }

    /// Copy the node with new datasets and namespace.
    ///
    /// Function, explicit name, tags and decorators are kept; the derived name
    /// is recomputed from the new datasets.
    pub fn copy_with(
        &self,
        inputs: NameSet,
        outputs: NameSet,
        namespace: Option<String>,
    ) -> PipelineResult<Node> {
        NodeBuilder {
            func: Arc::clone(&self.func),
            inputs,
            outputs,
            name: self.name.clone(),
            namespace,
            tags: self.tags.clone(),
            decorators: self.decorators.clone(),
        }
        .build()
    }

    /// Rename datasets. Names absent from the relevant map are kept.
    pub fn rename(
        &self,
        inputs_map: &BTreeMap<String, String>,
        outputs_map: &BTreeMap<String, String>,
    ) -> PipelineResult<Node> {
        let substitute = |map: &BTreeMap<String, String>, name: &str| {
            map.get(name).cloned().unwrap_or_else(|| name.to_string())
        };
        self.copy_with(
            self.inputs.map_names(|n| substitute(inputs_map, n)),
            self.outputs.map_names(|n| substitute(outputs_map, n)),
            self.namespace.clone(),
        )
    }

    /// Copy the node with `tags` added.
    pub fn tag<I, S>(&self, tags: I) -> Node
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = self.clone();
        node.tags.extend(tags.into_iter().map(Into::into));
        node
    }

    /// Copy the node with `decorators` appended after the existing ones.
    pub fn decorate<I>(&self, decorators: I) -> Node
    where
        I: IntoIterator<Item = Arc<dyn NodeDecorator>>,
    {
        let mut node = self.clone();
        node.decorators.extend(decorators);
        node
    }

    fn unique_key(&self) -> (String, &NameSet, &NameSet) {
        (self.name(), &self.inputs, &self.outputs)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.unique_key() == other.unique_key()
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Nodes order by full name first, so sorted node lists are stable for assertions.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.unique_key().cmp(&other.unique_key())
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_key().hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        f.write_str(&self.derived_name)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name())
            .field("func", &self.func_name())
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("namespace", &self.namespace)
            .field("tags", &self.tags)
            .field(
                "decorators",
                &self.decorators.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
