//! Error handling for modpipe-rs
//!
//! This module defines the crate-wide error type and a Result alias for use
//! by the configuration layer and the `modpipe` binary. The pipeline and
//! modular subsystems keep their own narrower error enums, which convert
//! into [`ModpipeError`] via `?`.

use crate::modular::ModularPipelineError;
use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for modpipe-rs operations
#[derive(Error, Debug)]
pub enum ModpipeError {
    /// Errors raised while constructing nodes or pipelines
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors raised while namespacing or remapping a pipeline
    #[error("Modular pipeline error: {0}")]
    Modular(#[from] ModularPipelineError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ModpipeError>,
    },
}

impl ModpipeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ModpipeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for modpipe-rs operations
pub type Result<T> = std::result::Result<T, ModpipeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ModpipeError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Into::<ModpipeError>::into(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Into::<ModpipeError>::into(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModpipeError::Config("missing [[nodes]] table".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: missing [[nodes]] table"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = ModpipeError::Config("test".to_string());
        let with_ctx = err.with_context("Failed to load pipeline");
        assert!(with_ctx.to_string().contains("Failed to load pipeline"));
        assert!(with_ctx.to_string().contains("test"));
    }

    #[test]
    fn test_modular_error_converts() {
        let result: std::result::Result<(), ModularPipelineError> =
            Err(ModularPipelineError::InputsNotFree);
        let err = result.context("Applying layer 'PREFIX'").unwrap_err();
        assert!(err
            .to_string()
            .contains("Inputs should be free inputs to the pipeline"));
        assert!(err.to_string().starts_with("Applying layer 'PREFIX'"));
    }
}
