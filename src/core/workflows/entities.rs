#![allow(clippy::result_large_err)]

use crate::core::config::WorkflowConfig;
use crate::core::error::AppError;
use crate::core::pipeline::merge::resolve;
use crate::core::pipeline::step::{verbs, workflow_source, StepDescriptor, StepInput};
use crate::core::workflows::{CREATE_BASE_EXTRACTED_ENTITIES, CREATE_BASE_TEXT_UNITS};
use crate::step_args;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// How the engine dispatches extraction calls. Forwarded verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsyncMode {
    #[default]
    #[serde(rename = "asyncio")]
    AsyncIo,
    Threaded,
}

/// Typed options for `create_base_extracted_entities`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityExtractionConfig {
    /// Raw `entity_extract` table, spread into the extraction step's args.
    pub entity_extract: Map<String, Value>,
    pub text_column: String,
    pub id_column: String,
    pub async_mode: AsyncMode,
    pub graphml_snapshot: bool,
    pub raw_entity_snapshot: bool,
    /// Caller overrides deep-merged onto [`default_graph_merge_operations`].
    pub graph_merge_operations: Option<Map<String, Value>>,
}

impl Default for EntityExtractionConfig {
    fn default() -> Self {
        Self {
            entity_extract: Map::new(),
            text_column: "chunk".to_string(),
            id_column: "chunk_id".to_string(),
            async_mode: AsyncMode::default(),
            graphml_snapshot: false,
            raw_entity_snapshot: false,
            graph_merge_operations: None,
        }
    }
}

impl EntityExtractionConfig {
    pub fn from_config(config: &WorkflowConfig) -> Result<Self, AppError> {
        let defaults = Self::default();
        let entity_extract = config.get_mapping("entity_extract")?.unwrap_or_default();
        // column options live inside the `entity_extract` table
        let extract = WorkflowConfig::from(entity_extract.clone());

        Ok(Self {
            text_column: extract.get_str("text_column", &defaults.text_column)?,
            id_column: extract.get_str("id_column", &defaults.id_column)?,
            async_mode: extract.get_or("async_mode", defaults.async_mode)?,
            entity_extract,
            graphml_snapshot: config.get_bool("graphml_snapshot", false)?,
            raw_entity_snapshot: config.get_bool("raw_entity_snapshot", false)?,
            graph_merge_operations: config.get_mapping("graph_merge_operations")?,
        })
    }
}

/// Built-in per-field reductions applied when per-row graphs are merged.
pub fn default_graph_merge_operations() -> Value {
    json!({
        "nodes": {
            "source_id": {"operation": "concat", "delimiter": ", ", "distinct": true},
            "description": {"operation": "concat", "separator": "\n", "distinct": false},
        },
        "edges": {
            "source_id": {"operation": "concat", "delimiter": ", ", "distinct": true},
            "description": {"operation": "concat", "separator": "\n", "distinct": false},
            "weight": "sum",
        },
    })
}

/// Build the extracted entities table: extract per text unit, optionally snapshot,
/// merge per-row graphs, optionally snapshot the merged graph as GraphML.
///
/// ## Dependencies
/// * `workflow:create_base_text_units`
pub fn build_create_extracted_entities_steps(
    config: &WorkflowConfig,
) -> Result<Vec<StepDescriptor>, AppError> {
    let options = EntityExtractionConfig::from_config(config)?;
    let steps = entities_steps(&options);
    tracing::debug!(
        workflow = CREATE_BASE_EXTRACTED_ENTITIES,
        steps = steps.len(),
        graphml_snapshot = options.graphml_snapshot,
        raw_entity_snapshot = options.raw_entity_snapshot,
        "built workflow steps"
    );
    Ok(steps)
}

pub fn entities_steps(options: &EntityExtractionConfig) -> Vec<StepDescriptor> {
    let mut extract_args = options.entity_extract.clone();
    extract_args.insert("column".into(), json!(options.text_column));
    extract_args.insert("id_column".into(), json!(options.id_column));
    extract_args.insert("async_mode".into(), json!(options.async_mode));
    extract_args.insert("to".into(), json!("entities"));
    extract_args.insert("graph_to".into(), json!("entity_graph"));

    let overrides = options.graph_merge_operations.clone().map(Value::Object);
    let operations = resolve(overrides.as_ref(), &default_graph_merge_operations());
    let mut merge_args = Map::new();
    merge_args.insert("column".into(), json!("entity_graph"));
    merge_args.insert("to".into(), json!("entity_graph"));
    if let Value::Object(operations) = operations {
        merge_args.extend(operations);
    }

    vec![
        StepDescriptor::new(verbs::ENTITY_EXTRACT, extract_args)
            .with_input(StepInput::source(workflow_source(CREATE_BASE_TEXT_UNITS))),
        StepDescriptor::new(
            verbs::SNAPSHOT,
            step_args!({"name": "raw_extracted_entities", "formats": ["json"]}),
        )
        .with_enabled(options.raw_entity_snapshot),
        StepDescriptor::new(verbs::MERGE_GRAPHS, merge_args),
        StepDescriptor::new(
            verbs::SNAPSHOT_ROWS,
            step_args!({
                "base_name": "merged_graph",
                "column": "entity_graph",
                "formats": [{"format": "text", "extension": "graphml"}],
            }),
        )
        .with_enabled(options.graphml_snapshot),
    ]
}
