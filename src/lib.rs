//! # modpipe-rs: Modular Pipeline Namespacing
//!
//! Build data pipelines out of nodes (a function plus named input and output
//! datasets) and reuse them as modules: [`modular::pipeline`] copies a
//! pipeline under a namespace, renaming or keeping the datasets it exchanges
//! with the outside world.
//!
//! ## Architecture
//!
//! - **Pipeline**: Nodes, dataset-name containers and the validated,
//!   topologically ordered [`Pipeline`]
//! - **Modular**: The Name Resolver (request → full rename table) and the
//!   Pipeline Rewriter (rename table → new pipeline)
//! - **Config**: TOML/JSON pipeline files with stacked modular layers
//!
//! ## Name rules
//!
//! For a pipeline namespaced as `ns`:
//!
//! | Name                  | Result                         |
//! |-----------------------|--------------------------------|
//! | explicitly mapped     | mapped value, never prefixed   |
//! | `parameters`          | unchanged                      |
//! | `params:k`            | `params:ns.k`                  |
//! | `base@fmt`, base mapped | mapped base + `@fmt`         |
//! | anything else         | `ns.<name>`                    |
//!
//! ## Example
//!
//! ```
//! use modpipe_rs::{modular, MappingRequest, Node, Pipeline};
//!
//! let cook = Pipeline::new([
//!     Node::builder("defrost", "frozen_meat", "meat").build()?,
//!     Node::builder("grill", ["meat", "params:heat"], "grilled_meat").build()?,
//! ])?;
//!
//! let lunch = modular::pipeline(
//!     &cook,
//!     MappingRequest::new()
//!         .namespace("lunch")
//!         .inputs("frozen_meat")
//!         .outputs([("grilled_meat", "lunch_food")]),
//! )?;
//!
//! assert_eq!(lunch.inputs().into_iter().collect::<Vec<_>>(), vec!["frozen_meat", "params:lunch.heat"]);
//! assert_eq!(lunch.outputs().into_iter().collect::<Vec<_>>(), vec!["lunch_food"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod modular;
pub mod pipeline;

// Re-export commonly used types
pub use config::{FileFormat, NodeConfig, PipelineFile};
pub use error::{ModpipeError, Result, ResultExt};
pub use modular::{MappingRequest, ModularPipelineError, NameSpec};
pub use pipeline::{NameSet, Node, Pipeline, PipelineError};
