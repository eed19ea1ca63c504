use crate::core::pipeline::step::{StepDescriptor, DEFAULT_INPUT_NAME};
use serde::Serialize;

/// Per-step view with the implicit input wiring made explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepExplain {
    pub index: usize,
    /// Explicit id, or the positional id the engine derives.
    pub id: String,
    pub verb: String,
    pub enabled: bool,
    pub source: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub others: Vec<String>,
}

/// Positional id for a step that declares none.
pub fn positional_id(index: usize) -> String {
    format!("step_{}", index)
}

/// Resolve the effective input of every step.
///
/// A step without an explicit input reads the output of the nearest preceding
/// enabled step, or the default input when there is none. Disabled steps pass
/// their input through unchanged, so they never become an implicit upstream.
pub fn explain_steps(steps: &[StepDescriptor]) -> Vec<StepExplain> {
    let mut upstream = DEFAULT_INPUT_NAME.to_string();
    let mut explained = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let id = step.id.clone().unwrap_or_else(|| positional_id(index));
        let (source, others) = match &step.input {
            Some(input) => (input.source.clone(), input.others.clone()),
            None => (upstream.clone(), Vec::new()),
        };
        let enabled = step.is_enabled();
        if enabled {
            upstream = id.clone();
        }
        explained.push(StepExplain {
            index,
            id,
            verb: step.verb.clone(),
            enabled,
            source,
            others,
        });
    }
    explained
}
