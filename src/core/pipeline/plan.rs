use crate::core::error::AppError;
use crate::core::pipeline::step::{StepDescriptor, WORKFLOW_SOURCE_PREFIX};
use crate::core::types::ErrorCategory;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// A built workflow ready to hand to the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowPlan {
    pub name: String,
    pub steps: Vec<StepDescriptor>,
    /// Upstream workflows named through `workflow:<name>` sources, first-seen order.
    pub dependencies: Vec<String>,
    /// SHA-256 of the serialized step list; identical config yields an identical value.
    pub fingerprint: String,
}

impl WorkflowPlan {
    pub fn new(name: impl Into<String>, steps: Vec<StepDescriptor>) -> Result<Self, AppError> {
        let fingerprint = fingerprint_steps(&steps)?;
        let dependencies = workflow_dependencies(&steps);
        Ok(Self {
            name: name.into(),
            steps,
            dependencies,
            fingerprint,
        })
    }
}

/// Collect the distinct upstream workflow names referenced by a step list.
pub fn workflow_dependencies(steps: &[StepDescriptor]) -> Vec<String> {
    let mut dependencies: Vec<String> = Vec::new();
    for input in steps.iter().filter_map(|step| step.input.as_ref()) {
        for reference in input.references() {
            if let Some(name) = reference.strip_prefix(WORKFLOW_SOURCE_PREFIX) {
                if !dependencies.iter().any(|known| known == name) {
                    dependencies.push(name.to_string());
                }
            }
        }
    }
    dependencies
}

/// Compute the SHA-256 hash of the serialized step list encoded as lowercase hex.
pub fn fingerprint_steps(steps: &[StepDescriptor]) -> Result<String, AppError> {
    let bytes = serde_json::to_vec(steps).map_err(|err| {
        AppError::new(ErrorCategory::SerializationError, "failed to serialize step list")
            .with_source(err)
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
