//! Modular pipelines: namespacing and dataset remapping.
//!
//! [`pipeline`] produces a copy of a pipeline whose dataset names are renamed,
//! prefixed with a namespace, or kept, without changing its topology or
//! node behaviour.
//!
//! ```text
//! Pipeline + MappingRequest ──► NameResolver ──► NameMapping ──► PipelineRewriter ──► Pipeline
//! ```
//!
//! # Example
//!
//! ```
//! use modpipe_rs::modular::{pipeline, MappingRequest};
//! use modpipe_rs::pipeline::{Node, Pipeline};
//!
//! let raw = Pipeline::new([
//!     Node::builder("clean", "raw", "clean").name("clean").build()?,
//!     Node::builder("train", ["clean", "params:lr"], "model").name("train").build()?,
//! ])?;
//!
//! let namespaced = pipeline(
//!     &raw,
//!     MappingRequest::new().namespace("ds").inputs("raw").outputs("model"),
//! )?;
//!
//! let train = namespaced.nodes()[1];
//! assert_eq!(train.name(), "ds.train");
//! assert_eq!(train.input_names(), vec!["ds.clean", "params:ds.lr"]);
//! assert_eq!(train.output_names(), vec!["model"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod request;
pub mod resolver;
pub mod rewriter;

pub use error::{ModularPipelineError, ModularResult};
pub use request::{MappingRequest, NameSpec};
pub use resolver::{NameMapping, NameResolver};
pub use rewriter::PipelineRewriter;

use crate::pipeline::Pipeline;

/// Namespace and/or remap `source` according to `request`.
///
/// - `inputs`: free inputs to keep (single/set) or rename (map); never
///   prefixed.
/// - `outputs`: outputs to keep or rename; may expose an intermediate dataset
///   but never a free input.
/// - `parameters`: parameters to keep or rename; bare keys are read as
///   `params:<key>`.
/// - `namespace`: prefix for every other name and for node namespaces.
///
/// Fails with [`ModularPipelineError`] without producing a pipeline when the
/// request is invalid.
pub fn pipeline(source: &Pipeline, request: MappingRequest) -> ModularResult<Pipeline> {
    if source.is_empty() {
        tracing::warn!("Applying a mapping request to an empty pipeline");
    }

    let mapping = NameResolver::resolve(source, &request)?;
    let result = PipelineRewriter::apply(source, &mapping)?;

    tracing::debug!(
        "Built modular pipeline with {} nodes (namespace: {:?}, identity: {})",
        result.len(),
        request.namespace_prefix(),
        request.is_identity()
    );

    Ok(result)
}
