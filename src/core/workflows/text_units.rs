#![allow(clippy::result_large_err)]

use crate::core::config::validation::expect_pattern;
use crate::core::config::WorkflowConfig;
use crate::core::error::AppError;
use crate::core::pipeline::merge::resolve_object;
use crate::core::pipeline::step::{verbs, StepDescriptor, StepInput, DEFAULT_INPUT_NAME};
use crate::core::workflows::CREATE_BASE_TEXT_UNITS;
use crate::step_args;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const DEFAULT_CHUNK_COLUMN: &str = "chunk";
pub const DEFAULT_N_TOKENS_COLUMN: &str = "n_tokens";

/// One ordered substitution applied to chunk text after the chunk id is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReplacement {
    pub pattern: String,
    pub replacement: String,
}

/// Typed options for `create_base_text_units`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextUnitsConfig {
    pub chunk_column: String,
    pub chunk_by: Vec<String>,
    pub n_tokens_column: String,
    /// Passed through to the `chunk` verb (size, overlap, encoding, ...).
    pub text_chunk: Map<String, Value>,
    pub text_replacements: Vec<TextReplacement>,
}

impl Default for TextUnitsConfig {
    fn default() -> Self {
        Self {
            chunk_column: DEFAULT_CHUNK_COLUMN.to_string(),
            chunk_by: Vec::new(),
            n_tokens_column: DEFAULT_N_TOKENS_COLUMN.to_string(),
            text_chunk: Map::new(),
            text_replacements: Vec::new(),
        }
    }
}

impl TextUnitsConfig {
    pub fn from_config(config: &WorkflowConfig) -> Result<Self, AppError> {
        let text_replacements: Vec<TextReplacement> =
            config.get_or("text_replacements", Vec::new())?;
        for (index, replacement) in text_replacements.iter().enumerate() {
            expect_pattern(
                &format!("text_replacements[{}].pattern", index),
                &replacement.pattern,
            )?;
        }

        Ok(Self {
            chunk_column: config.get_str("chunk_column", DEFAULT_CHUNK_COLUMN)?,
            chunk_by: config.get_string_list("chunk_by")?,
            n_tokens_column: config.get_str("n_tokens_column", DEFAULT_N_TOKENS_COLUMN)?,
            text_chunk: config.get_mapping("text_chunk")?.unwrap_or_default(),
            text_replacements,
        })
    }
}

/// Build the base text unit table: sort, tag text with its document id, group,
/// chunk, then derive a content hash id per chunk.
///
/// ## Dependencies
/// * the pipeline's default input
pub fn build_create_base_text_units_steps(
    config: &WorkflowConfig,
) -> Result<Vec<StepDescriptor>, AppError> {
    let options = TextUnitsConfig::from_config(config)?;
    let steps = text_units_steps(&options);
    tracing::debug!(
        workflow = CREATE_BASE_TEXT_UNITS,
        steps = steps.len(),
        chunk_by = ?options.chunk_by,
        "built workflow steps"
    );
    Ok(steps)
}

pub fn text_units_steps(options: &TextUnitsConfig) -> Vec<StepDescriptor> {
    let chunk_column = options.chunk_column.as_str();
    let groupby = if options.chunk_by.is_empty() {
        Value::Null
    } else {
        json!(options.chunk_by)
    };
    let mut selected: Vec<String> = options.chunk_by.clone();
    selected.push("chunks".to_string());

    let mut chunk_defaults = Map::new();
    chunk_defaults.insert("column".into(), json!("texts"));
    chunk_defaults.insert("to".into(), json!("chunks"));
    let chunk_args = resolve_object(Some(&options.text_chunk), &chunk_defaults);

    vec![
        // sort for reproducibility
        StepDescriptor::new(
            verbs::ORDERBY,
            step_args!({"orders": [{"column": "id", "direction": "asc"}]}),
        )
        .with_input(StepInput::source(DEFAULT_INPUT_NAME)),
        // pack document ids with the text so chunks can be traced back
        StepDescriptor::new(
            verbs::ZIP,
            step_args!({"columns": ["id", "text"], "to": "text_with_ids"}),
        ),
        StepDescriptor::new(
            verbs::AGGREGATE_OVERRIDE,
            step_args!({
                "groupby": groupby,
                "aggregations": [{
                    "column": "text_with_ids",
                    "operation": "array_agg",
                    "to": "texts",
                }],
            }),
        ),
        StepDescriptor::new(verbs::CHUNK, chunk_args),
        StepDescriptor::new(verbs::SELECT, step_args!({"columns": selected})),
        StepDescriptor::new(verbs::UNROLL, step_args!({"column": "chunks"})),
        StepDescriptor::new(
            verbs::RENAME,
            step_args!({"columns": {"chunks": chunk_column}}),
        ),
        StepDescriptor::new(
            verbs::GENID,
            step_args!({"to": "chunk_id", "method": "md5_hash", "hash": [chunk_column]}),
        ),
        StepDescriptor::new(
            verbs::UNZIP,
            step_args!({
                "column": chunk_column,
                "to": ["document_ids", chunk_column, options.n_tokens_column],
            }),
        ),
        StepDescriptor::new(verbs::COPY, step_args!({"column": "chunk_id", "to": "id"})),
        // drop empty chunks
        StepDescriptor::new(
            verbs::FILTER,
            step_args!({
                "column": chunk_column,
                "criteria": [{"type": "value", "operator": "is not empty"}],
            }),
        ),
        StepDescriptor::new(
            verbs::TEXT_REPLACE,
            step_args!({
                "column": chunk_column,
                "to": chunk_column,
                "replacements": options.text_replacements,
            }),
        )
        .with_enabled(!options.text_replacements.is_empty()),
    ]
}
