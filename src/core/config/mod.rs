use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod accessor;
pub mod loader;
pub mod validation;

pub use accessor::WorkflowConfig;
pub use loader::ConfigLoader;
pub use validation::ShapeError;

/// Pipeline configuration loaded from stepweaver.toml (or a YAML equivalent).
///
/// Each `[workflows.<name>]` table is handed verbatim to the builder registered
/// under that name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-workflow option bags, in declaration order.
    #[serde(default)]
    pub workflows: IndexMap<String, WorkflowConfig>,
}

impl PipelineConfig {
    pub fn workflow(&self, name: &str) -> Option<&WorkflowConfig> {
        self.workflows.get(name)
    }

    /// Config for `name`, or an empty one when the pipeline does not mention it.
    pub fn workflow_or_default(&self, name: &str) -> WorkflowConfig {
        self.workflows.get(name).cloned().unwrap_or_default()
    }

    pub fn workflow_mut(&mut self, name: &str) -> &mut WorkflowConfig {
        self.workflows.entry(name.to_string()).or_default()
    }
}
