//! Errors raised by the modular pipeline transform.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Why a namespacing / remapping request was rejected.
///
/// Every variant is raised before any node is rewritten, except `Pipeline`,
/// which reports a failure to assemble the rewritten nodes. In both cases no
/// pipeline is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModularPipelineError {
    /// A `params:*` / `parameters` name was given in `inputs` or `outputs`.
    #[error("Parameters should be specified in the 'parameters' argument")]
    ParametersInInputsOrOutputs,

    /// Mapping keys that name no dataset or parameter of the pipeline.
    #[error("Failed to map datasets and/or parameters: {}", .0.join(", "))]
    MissingNames(Vec<String>),

    /// An `inputs` key names a dataset produced inside the pipeline.
    #[error("Inputs should be free inputs to the pipeline")]
    InputsNotFree,

    /// An `outputs` key names a free input of the pipeline.
    #[error("Outputs can't contain free inputs to the pipeline")]
    OutputsContainFreeInputs,

    /// Distinct datasets would collapse onto the same new name.
    #[error("Multiple datasets would be renamed to '{target}': {}", .sources.join(", "))]
    DuplicateTarget { target: String, sources: Vec<String> },

    #[error("Failed to rebuild pipeline: {0}")]
    Pipeline(#[from] PipelineError),
}

pub type ModularResult<T> = std::result::Result<T, ModularPipelineError>;
