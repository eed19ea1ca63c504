use crate::core::pipeline::step::StepDescriptor;
use serde::Serialize;
use std::fmt;

pub mod rules;
pub use rules::*;

/// Diagnostic severity levels emitted by step lint rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Warning,
    Info,
}

impl LintSeverity {
    fn rank(&self) -> u8 {
        match self {
            LintSeverity::Error => 3,
            LintSeverity::Warning => 2,
            LintSeverity::Info => 1,
        }
    }
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => write!(f, "Error"),
            LintSeverity::Warning => write!(f, "Warning"),
            LintSeverity::Info => write!(f, "Info"),
        }
    }
}

/// Individual lint result emitted by a rule.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub code: String,
    pub severity: LintSeverity,
    pub message: String,
    /// Step position (`steps[3]`) or id the finding points at.
    pub location: Option<String>,
    pub suggestion: Option<String>,
}

impl LintResult {
    pub fn new(
        code: impl Into<String>,
        severity: LintSeverity,
        message: impl Into<String>,
        location: Option<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            location,
            suggestion,
        }
    }
}

/// Trait implemented by step list lint rules.
pub trait StepLintRule: Send + Sync {
    fn validate(&self, steps: &[StepDescriptor]) -> Vec<LintResult>;
}

/// Registry that runs all built-in step lint rules.
pub struct LintRegistry {
    rules: Vec<Box<dyn StepLintRule>>,
}

impl LintRegistry {
    /// Construct a registry populated with the built-in rules.
    pub fn new() -> Self {
        Self {
            rules: built_in_rules(),
        }
    }

    /// Run all registered lint rules against a step list.
    /// The results are already sorted by `(severity desc, code asc, location asc)`.
    pub fn run(&self, steps: &[StepDescriptor]) -> Vec<LintResult> {
        let mut results = Vec::new();
        for rule in &self.rules {
            results.extend(rule.validate(steps));
        }
        results.sort_by(|a, b| {
            let severity_cmp = b.severity.rank().cmp(&a.severity.rank());
            severity_cmp
                .then(a.code.cmp(&b.code))
                .then(a.location.cmp(&b.location))
        });
        results
    }
}

impl Default for LintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Lint a step list with the built-in rules.
pub fn lint_steps(steps: &[StepDescriptor]) -> Vec<LintResult> {
    LintRegistry::new().run(steps)
}
