pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod workflows;

pub use config::{ConfigLoader, PipelineConfig, WorkflowConfig};
pub use error::AppError;
pub use pipeline::{StepDescriptor, StepInput, WorkflowPlan, WorkflowRegistry};
pub use types::*;
