#![allow(clippy::result_large_err)] // Builder trait and registry return AppError directly for structured diagnostics without boxing.

use crate::core::config::{PipelineConfig, WorkflowConfig};
use crate::core::error::AppError;
use crate::core::pipeline::lint::{lint_steps, LintSeverity};
use crate::core::pipeline::plan::WorkflowPlan;
use crate::core::pipeline::step::StepDescriptor;
use crate::core::types::ErrorCategory;
use crate::core::workflows::{
    build_create_base_documents_steps, build_create_base_text_units_steps,
    build_create_extracted_entities_steps, CREATE_BASE_DOCUMENTS,
    CREATE_BASE_EXTRACTED_ENTITIES, CREATE_BASE_TEXT_UNITS,
};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Turns a workflow's config into its ordered step list.
///
/// Any `Fn(&WorkflowConfig) -> Result<Vec<StepDescriptor>, AppError>` qualifies,
/// so plain builder functions and closures can be registered directly.
pub trait WorkflowBuilder: Send + Sync + 'static {
    fn build(&self, config: &WorkflowConfig) -> Result<Vec<StepDescriptor>, AppError>;
}

impl<F> WorkflowBuilder for F
where
    F: Fn(&WorkflowConfig) -> Result<Vec<StepDescriptor>, AppError> + Send + Sync + 'static,
{
    fn build(&self, config: &WorkflowConfig) -> Result<Vec<StepDescriptor>, AppError> {
        self(config)
    }
}

/// Workflow name to builder mapping consulted at pipeline construction time.
///
/// Registering under an existing name replaces the builder in place, keeping
/// its original position in [`WorkflowRegistry::names`].
#[derive(Clone, Default)]
pub struct WorkflowRegistry {
    builders: IndexMap<String, Arc<dyn WorkflowBuilder>>,
}

impl fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowRegistry")
            .field("workflows", &self.names())
            .finish()
    }
}

impl WorkflowRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in text unit, document and entity workflows.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CREATE_BASE_TEXT_UNITS, build_create_base_text_units_steps);
        registry.register(CREATE_BASE_DOCUMENTS, build_create_base_documents_steps);
        registry.register(
            CREATE_BASE_EXTRACTED_ENTITIES,
            build_create_extracted_entities_steps,
        );
        registry
    }

    /// Register `builder` under `name`, returning the builder it replaced.
    pub fn register<B: WorkflowBuilder>(
        &mut self,
        name: impl Into<String>,
        builder: B,
    ) -> Option<Arc<dyn WorkflowBuilder>> {
        let name = name.into();
        let previous = self.builders.insert(name.clone(), Arc::new(builder));
        if previous.is_some() {
            tracing::info!(workflow = %name, "overriding registered workflow builder");
        } else {
            tracing::debug!(workflow = %name, "registered workflow builder");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn WorkflowBuilder>> {
        self.builders.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered workflow names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.builders.keys().map(String::as_str).collect()
    }

    /// Invoke the builder registered under `name`.
    pub fn build(
        &self,
        name: &str,
        config: &WorkflowConfig,
    ) -> Result<Vec<StepDescriptor>, AppError> {
        let builder = self.builders.get(name).ok_or_else(|| {
            AppError::new(
                ErrorCategory::RegistryError,
                format!("no workflow builder registered under '{}'", name),
            )
            .with_code("REG-UNKNOWN-001")
        })?;
        builder.build(config).map_err(|mut err| {
            err.add_context("workflow", name);
            err
        })
    }

    /// Build, lint and fingerprint a workflow.
    ///
    /// Lint errors fail the plan; warnings are logged and kept out of the result.
    pub fn plan(&self, name: &str, config: &WorkflowConfig) -> Result<WorkflowPlan, AppError> {
        let steps = self.build(name, config)?;
        for finding in lint_steps(&steps) {
            match finding.severity {
                LintSeverity::Error => {
                    let mut err = AppError::new(
                        ErrorCategory::ValidationError,
                        format!("workflow '{}': {}", name, finding.message),
                    )
                    .with_code(finding.code);
                    if let Some(location) = &finding.location {
                        err.add_context("location", location);
                    }
                    if let Some(suggestion) = &finding.suggestion {
                        err.add_context("suggestion", suggestion);
                    }
                    return Err(err);
                }
                LintSeverity::Warning => {
                    tracing::warn!(
                        workflow = %name,
                        code = %finding.code,
                        location = ?finding.location,
                        suggestion = ?finding.suggestion,
                        "{}",
                        finding.message
                    );
                }
                LintSeverity::Info => {}
            }
        }
        let plan = WorkflowPlan::new(name, steps)?;
        tracing::debug!(
            workflow = %name,
            steps = plan.steps.len(),
            dependencies = ?plan.dependencies,
            fingerprint = %plan.fingerprint,
            "planned workflow"
        );
        Ok(plan)
    }

    /// Plan every registered workflow in registration order. Workflows absent from
    /// `pipeline` are built with an empty config.
    pub fn plan_all(&self, pipeline: &PipelineConfig) -> Result<Vec<WorkflowPlan>, AppError> {
        for name in pipeline.workflows.keys() {
            if !self.contains(name) {
                tracing::warn!(workflow = %name, "config names a workflow with no registered builder");
            }
        }
        self.builders
            .keys()
            .map(|name| self.plan(name, &pipeline.workflow_or_default(name)))
            .collect()
    }
}
