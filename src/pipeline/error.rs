//! Pipeline-specific error types.

use thiserror::Error;

/// Errors raised while constructing nodes and pipelines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Expected maximum 1 transcoding separator, found {count} instead: '{name}'")]
    InvalidTranscoding { name: String, count: usize },

    #[error("Failed to create node '{node}': outputs must be unique, duplicated: {}", .duplicates.join(", "))]
    DuplicateNodeOutputs {
        node: String,
        duplicates: Vec<String>,
    },

    #[error("Failed to create node '{node}': a node cannot have the same inputs and outputs: {}", .overlap.join(", "))]
    InputsOverlapOutputs { node: String, overlap: Vec<String> },

    #[error("Node name '{0}' must not contain the transcoding separator '@'")]
    InvalidNodeName(String),

    #[error("Pipeline nodes must have unique names. The following node names appear more than once: {}", .0.join(", "))]
    DuplicateNodeNames(Vec<String>),

    #[error("Output(s) {} are returned by more than one node. Node outputs must be unique", .0.join(", "))]
    OutputNotUnique(Vec<String>),

    #[error("The following datasets are used with transcoding, but were referenced without the separator: {}", .0.join(", "))]
    TranscodingMismatch(Vec<String>),

    #[error("Circular dependencies exist among these nodes: {}", .0.join(", "))]
    CircularDependency(Vec<String>),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
