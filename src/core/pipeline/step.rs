use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name under which the execution engine exposes the pipeline's default input table.
pub const DEFAULT_INPUT_NAME: &str = "source";

/// Prefix marking an `input.source` that refers to another workflow's output.
pub const WORKFLOW_SOURCE_PREFIX: &str = "workflow:";

/// Verb identifiers understood by the external execution engine.
pub mod verbs {
    pub const AGGREGATE_OVERRIDE: &str = "aggregate_override";
    pub const CHUNK: &str = "chunk";
    pub const CONVERT: &str = "convert";
    pub const COPY: &str = "copy";
    pub const ENTITY_EXTRACT: &str = "entity_extract";
    pub const FILTER: &str = "filter";
    pub const GENID: &str = "genid";
    pub const JOIN: &str = "join";
    pub const MERGE_GRAPHS: &str = "merge_graphs";
    pub const MERGE_OVERRIDE: &str = "merge_override";
    pub const ORDERBY: &str = "orderby";
    pub const RENAME: &str = "rename";
    pub const SELECT: &str = "select";
    pub const SNAPSHOT: &str = "snapshot";
    pub const SNAPSHOT_ROWS: &str = "snapshot_rows";
    pub const TEXT_REPLACE: &str = "my_text_replace";
    pub const UNROLL: &str = "unroll";
    pub const UNZIP: &str = "unzip";
    pub const ZIP: &str = "zip";
}

/// `input.source` value for consuming another workflow's output table.
pub fn workflow_source(workflow: &str) -> String {
    format!("{}{}", WORKFLOW_SOURCE_PREFIX, workflow)
}

/// Build a step argument table from a JSON object literal.
///
/// Only brace-delimited literals are accepted, so the result is always a mapping.
///
/// ```
/// use stepweaver::step_args;
///
/// let args = step_args!({"column": "chunk_id", "to": "id"});
/// assert_eq!(args["to"], "id");
/// ```
#[macro_export]
macro_rules! step_args {
    ({ $($body:tt)* }) => {
        match ::serde_json::json!({ $($body)* }) {
            ::serde_json::Value::Object(args) => args,
            _ => unreachable!("object literal always yields a mapping"),
        }
    };
}

/// Where a step reads its table(s) from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInput {
    pub source: String,
    /// Additional tables for multi-input verbs such as `join`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub others: Vec<String>,
}

impl StepInput {
    pub fn source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            others: Vec::new(),
        }
    }

    pub fn with_others<I, S>(source: impl Into<String>, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            others: others.into_iter().map(Into::into).collect(),
        }
    }

    /// Primary source followed by every secondary table.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.source.as_str()).chain(self.others.iter().map(String::as_str))
    }
}

/// One unit of work in a workflow's ordered step list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// Explicit identifier that later steps can name in `input.source`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub verb: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    /// `Some(false)` marks a step the engine must skip while keeping its position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Absent means "previous step's output" (or the default input for the first step).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<StepInput>,
}

impl StepDescriptor {
    /// Create a step from a verb and its argument table.
    pub fn new(verb: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            id: None,
            verb: verb.into(),
            args,
            enabled: None,
            input: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_input(mut self, input: StepInput) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }
}
