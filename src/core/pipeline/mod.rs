//! Step list model and the machinery around built workflows.

pub mod explain;
pub mod lint;
pub mod merge;
pub mod plan;
pub mod registry;
pub mod step;

pub use explain::{explain_steps, StepExplain};
pub use lint::{lint_steps, LintResult, LintSeverity};
pub use merge::{resolve, resolve_object};
pub use plan::{workflow_dependencies, WorkflowPlan};
pub use registry::{WorkflowBuilder, WorkflowRegistry};
pub use step::{verbs, workflow_source, StepDescriptor, StepInput, DEFAULT_INPUT_NAME};
