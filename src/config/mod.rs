//! Configuration module for modpipe-rs
//!
//! Pipelines can be described in a file instead of code. A pipeline file
//! lists the nodes and, optionally, a stack of modular layers that are
//! applied in order, each one nesting the previous result under its
//! namespace.
//!
//! # Formats
//!
//! - **TOML** (default, any extension other than `.json`)
//! - **JSON** (`.json`)
//!
//! # Example
//!
//! ```toml
//! name = "data_processing"
//!
//! [[nodes]]
//! func = "preprocess"
//! inputs = "companies"
//! outputs = "preprocessed_companies"
//! name = "preprocess_companies"
//! tags = ["preprocessing"]
//!
//! [[nodes]]
//! func = "join"
//! inputs = { left = "preprocessed_companies", right = "params:join_key" }
//! outputs = "model_input_table"
//!
//! [[modular]]
//! namespace = "dp"
//! inputs = "companies"
//! outputs = "model_input_table"
//! ```

use crate::error::{ModpipeError, Result, ResultExt};
use crate::modular::{self, MappingRequest};
use crate::pipeline::{NameSet, Node, NodeDecorator, Pipeline, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Current pipeline file format version
pub const PIPELINE_FILE_VERSION: u32 = 1;

/// Extension selecting the JSON format
pub const JSON_EXTENSION: &str = "json";

// ==================== File Format ====================

/// Serialization format of a pipeline file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    /// Pick the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(JSON_EXTENSION) => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }
}

// ==================== Node Config ====================

/// A node as described in a pipeline file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Function identifier
    pub func: String,

    /// Datasets read by the node
    #[serde(default, skip_serializing_if = "NameSet::is_empty")]
    pub inputs: NameSet,

    /// Datasets written by the node
    #[serde(default, skip_serializing_if = "NameSet::is_empty")]
    pub outputs: NameSet,

    /// Explicit node name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Namespace the node already lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Decorator identifiers, applied in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
}

impl NodeConfig {
    /// Create a node config with no name, namespace, tags or decorators
    pub fn new(
        func: impl Into<String>,
        inputs: impl Into<NameSet>,
        outputs: impl Into<NameSet>,
    ) -> Self {
        Self {
            func: func.into(),
            inputs: inputs.into(),
            outputs: outputs.into(),
            name: None,
            namespace: None,
            tags: Vec::new(),
            decorators: Vec::new(),
        }
    }

    /// Set the explicit node name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build the node
    pub fn build(&self) -> PipelineResult<Node> {
        let mut builder = Node::builder(self.func.clone(), self.inputs.clone(), self.outputs.clone())
            .tags(self.tags.iter().cloned());
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        if let Some(namespace) = &self.namespace {
            builder = builder.namespace(namespace.clone());
        }
        for decorator in &self.decorators {
            builder = builder.decorator(Arc::new(decorator.clone()) as Arc<dyn NodeDecorator>);
        }
        builder.build()
    }
}

impl From<&Node> for NodeConfig {
    fn from(node: &Node) -> Self {
        Self {
            func: node.func_name().to_string(),
            inputs: node.inputs().clone(),
            outputs: node.outputs().clone(),
            name: node.explicit_name().map(str::to_string),
            namespace: node.namespace().map(str::to_string),
            tags: node.tags().iter().cloned().collect(),
            decorators: node
                .decorators()
                .iter()
                .map(|d| d.name().to_string())
                .collect(),
        }
    }
}

// ==================== Pipeline File ====================

/// A pipeline description file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFile {
    /// Version for future migration support
    #[serde(default = "default_pipeline_file_version")]
    pub version: u32,

    /// Pipeline name (informational)
    #[serde(default)]
    pub name: String,

    /// Nodes in construction order
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Modular layers, applied in order
    #[serde(default)]
    pub modular: Vec<MappingRequest>,
}

fn default_pipeline_file_version() -> u32 {
    PIPELINE_FILE_VERSION
}

impl Default for PipelineFile {
    fn default() -> Self {
        Self {
            version: PIPELINE_FILE_VERSION,
            name: String::new(),
            nodes: Vec::new(),
            modular: Vec::new(),
        }
    }
}

impl PipelineFile {
    /// Create an empty pipeline file
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Describe an existing pipeline (nodes in construction order)
    pub fn from_pipeline(name: impl Into<String>, pipeline: &Pipeline) -> Self {
        Self {
            name: name.into(),
            nodes: pipeline.node_list().iter().map(NodeConfig::from).collect(),
            ..Default::default()
        }
    }

    /// Add a modular layer
    pub fn with_layer(mut self, request: MappingRequest) -> Self {
        self.modular.push(request);
        self
    }

    /// Parse a pipeline file from a string
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        match format {
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| ModpipeError::Config(format!("Invalid TOML: {}", e))),
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ModpipeError::Config(format!("Invalid JSON: {}", e))),
        }
    }

    /// Load a pipeline file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModpipeError::Config(format!("Failed to read pipeline file {:?}: {}", path, e))
        })?;

        let file = Self::parse(&content, FileFormat::from_path(path))
            .with_context(|| format!("Failed to parse pipeline file {:?}", path))?;

        if file.version > PIPELINE_FILE_VERSION {
            tracing::warn!(
                "Pipeline file {:?} has version {} (newer than supported {})",
                path,
                file.version,
                PIPELINE_FILE_VERSION
            );
        }

        tracing::debug!(
            "Loaded pipeline file {:?}: {} nodes, {} modular layers",
            path,
            file.nodes.len(),
            file.modular.len()
        );
        Ok(file)
    }

    /// Serialize to a string in the given format
    pub fn to_string_as(&self, format: FileFormat) -> Result<String> {
        match format {
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| ModpipeError::Serialization(format!("Failed to serialize pipeline: {}", e))),
            FileFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ModpipeError::Serialization(format!("Failed to serialize pipeline: {}", e))),
        }
    }

    /// Save the pipeline file to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ModpipeError::Config(format!("Failed to create pipeline directory: {}", e))
                })?;
            }
        }

        let content = self.to_string_as(FileFormat::from_path(path))?;

        std::fs::write(path, content).map_err(|e| {
            ModpipeError::Config(format!("Failed to write pipeline file {:?}: {}", path, e))
        })
    }

    /// Build the pipeline described by the nodes, ignoring modular layers
    pub fn build(&self) -> Result<Pipeline> {
        let nodes = self
            .nodes
            .iter()
            .map(NodeConfig::build)
            .collect::<PipelineResult<Vec<_>>>()
            .context("Invalid node in pipeline file")?;
        Ok(Pipeline::new(nodes)?)
    }

    /// Build the pipeline and apply every modular layer in order
    pub fn build_namespaced(&self) -> Result<Pipeline> {
        let mut pipeline = self.build()?;
        for (idx, layer) in self.modular.iter().enumerate() {
            tracing::info!(
                "Applying modular layer {} (namespace: {:?})",
                idx,
                layer.namespace_prefix()
            );
            pipeline = modular::pipeline(&pipeline, layer.clone())
                .with_context(|| format!("Modular layer {} failed", idx))?;
        }
        Ok(pipeline)
    }
}
