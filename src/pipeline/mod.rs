//! Node/dataset pipeline graph.
//!
//! Nodes declare the datasets they read and write; a pipeline is the DAG
//! implied by matching those names. Everything here is immutable: every
//! transform returns a new node or pipeline.
//!
//! # Architecture
//!
//! ```text
//! [Node: A -> B] ──B──► [Node: B, params:x -> C] ──C──► [Node: C -> D]
//!
//!  free inputs: A, params:x        free outputs: D
//! ```
//!
//! # Design
//!
//! - **Shape-preserving names**: `NameSet` keeps the single / sequence / keyed
//!   form a node was declared with.
//! - **Implicit edges**: dependencies are derived from dataset names with
//!   transcoding suffixes ignored.
//! - **Validated on construction**: a `Pipeline` value is always acyclic with
//!   unique node names and unique producers.

pub mod dataset;
pub mod error;
pub mod graph;
pub mod names;
pub mod node;
pub mod topology;

pub use error::{PipelineError, PipelineResult};
pub use graph::{NodeSnapshot, Pipeline, PipelineSnapshot};
pub use names::NameSet;
pub use node::{Node, NodeBuilder, NodeDecorator, NodeFunction};
pub use topology::TopologySorter;
