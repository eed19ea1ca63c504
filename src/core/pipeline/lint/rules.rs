use super::{LintResult, LintSeverity, StepLintRule};
use crate::core::pipeline::step::{StepDescriptor, DEFAULT_INPUT_NAME, WORKFLOW_SOURCE_PREFIX};
use std::collections::{HashMap, HashSet};

pub fn built_in_rules() -> Vec<Box<dyn StepLintRule>> {
    vec![
        Box::new(DuplicateStepIdsRule),
        Box::new(UnknownInputSourceRule),
        Box::new(EmptyVerbRule),
        Box::new(ImplicitFirstInputRule),
    ]
}

fn location(index: usize) -> Option<String> {
    Some(format!("steps[{}]", index))
}

struct DuplicateStepIdsRule;

impl StepLintRule for DuplicateStepIdsRule {
    fn validate(&self, steps: &[StepDescriptor]) -> Vec<LintResult> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for id in steps.iter().filter_map(|step| step.id.as_deref()) {
            *counts.entry(id).or_insert(0) += 1;
        }

        let mut out = Vec::new();
        for (step_id, count) in counts {
            if count > 1 {
                out.push(LintResult::new(
                    "STEP-LINT-001",
                    LintSeverity::Error,
                    format!("duplicate step id '{}' found {} times", step_id, count),
                    Some(step_id.to_string()),
                    Some("rename steps so every explicit id is unique".to_string()),
                ));
            }
        }
        out
    }
}

/// Inputs may only name the default input, another workflow, or an id declared
/// by an earlier step.
struct UnknownInputSourceRule;

impl StepLintRule for UnknownInputSourceRule {
    fn validate(&self, steps: &[StepDescriptor]) -> Vec<LintResult> {
        let mut declared: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            if let Some(input) = &step.input {
                for reference in input.references() {
                    let known = reference == DEFAULT_INPUT_NAME
                        || reference.starts_with(WORKFLOW_SOURCE_PREFIX)
                        || declared.contains(reference);
                    if !known {
                        out.push(LintResult::new(
                            "STEP-LINT-002",
                            LintSeverity::Error,
                            format!(
                                "step '{}' reads from unknown source '{}'",
                                step.verb, reference
                            ),
                            location(index),
                            Some(
                                "reference an id declared by an earlier step or a workflow:<name> source"
                                    .to_string(),
                            ),
                        ));
                    }
                }
            }
            if let Some(id) = step.id.as_deref() {
                declared.insert(id);
            }
        }
        out
    }
}

struct EmptyVerbRule;

impl StepLintRule for EmptyVerbRule {
    fn validate(&self, steps: &[StepDescriptor]) -> Vec<LintResult> {
        steps
            .iter()
            .enumerate()
            .filter(|(_, step)| step.verb.trim().is_empty())
            .map(|(index, _)| {
                LintResult::new(
                    "STEP-LINT-003",
                    LintSeverity::Error,
                    "step has an empty verb",
                    location(index),
                    None,
                )
            })
            .collect()
    }
}

struct ImplicitFirstInputRule;

impl StepLintRule for ImplicitFirstInputRule {
    fn validate(&self, steps: &[StepDescriptor]) -> Vec<LintResult> {
        match steps.first() {
            Some(first) if first.input.is_none() => vec![LintResult::new(
                "STEP-LINT-004",
                LintSeverity::Warning,
                "first step has no explicit input and will read the default input",
                location(0),
                Some(format!(
                    "set input.source to '{}' or a workflow:<name> source",
                    DEFAULT_INPUT_NAME
                )),
            )],
            _ => Vec::new(),
        }
    }
}
