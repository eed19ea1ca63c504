#![allow(clippy::result_large_err)]

use crate::core::config::WorkflowConfig;
use crate::core::error::AppError;
use crate::core::pipeline::step::{
    verbs, workflow_source, StepDescriptor, StepInput, DEFAULT_INPUT_NAME,
};
use crate::core::workflows::{CREATE_BASE_DOCUMENTS, CREATE_FINAL_TEXT_UNITS};
use crate::step_args;

const RENAME_CHUNK_DOC_ID: &str = "rename_chunk_doc_id";
const DOCS_WITH_TEXT_UNITS: &str = "docs_with_text_units";

/// Typed options for `create_base_documents`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentsConfig {
    /// Source columns coerced to text and folded into `attributes`, in order.
    pub document_attribute_columns: Vec<String>,
}

impl DocumentsConfig {
    pub fn from_config(config: &WorkflowConfig) -> Result<Self, AppError> {
        Ok(Self {
            document_attribute_columns: config.get_string_list("document_attribute_columns")?,
        })
    }
}

/// Build the documents table: one row per source document with its raw content
/// and the ids of every text unit cut from it.
///
/// ## Dependencies
/// * `workflow:create_final_text_units`
pub fn build_create_base_documents_steps(
    config: &WorkflowConfig,
) -> Result<Vec<StepDescriptor>, AppError> {
    let options = DocumentsConfig::from_config(config)?;
    let steps = documents_steps(&options);
    tracing::debug!(
        workflow = CREATE_BASE_DOCUMENTS,
        steps = steps.len(),
        attribute_columns = options.document_attribute_columns.len(),
        "built workflow steps"
    );
    Ok(steps)
}

pub fn documents_steps(options: &DocumentsConfig) -> Vec<StepDescriptor> {
    let columns = &options.document_attribute_columns;
    let mut steps = vec![
        StepDescriptor::new(verbs::UNROLL, step_args!({"column": "document_ids"}))
            .with_input(StepInput::source(workflow_source(CREATE_FINAL_TEXT_UNITS))),
        // only the chunk id, document id and chunk text are needed
        StepDescriptor::new(
            verbs::SELECT,
            step_args!({"columns": ["id", "document_ids", "text"]}),
        ),
        StepDescriptor::new(
            verbs::RENAME,
            step_args!({
                "columns": {
                    "document_ids": "chunk_doc_id",
                    "id": "chunk_id",
                    "text": "chunk_text",
                }
            }),
        )
        .with_id(RENAME_CHUNK_DOC_ID),
        StepDescriptor::new(verbs::JOIN, step_args!({"on": ["chunk_doc_id", "id"]}))
            .with_input(StepInput::with_others(
                RENAME_CHUNK_DOC_ID,
                [DEFAULT_INPUT_NAME],
            )),
        StepDescriptor::new(
            verbs::AGGREGATE_OVERRIDE,
            step_args!({
                "groupby": ["id"],
                "aggregations": [{
                    "column": "chunk_id",
                    "operation": "array_agg",
                    "to": "text_units",
                }],
            }),
        )
        .with_id(DOCS_WITH_TEXT_UNITS),
        // right outer keeps documents that produced no chunks
        StepDescriptor::new(
            verbs::JOIN,
            step_args!({"on": ["id", "id"], "strategy": "right outer"}),
        )
        .with_input(StepInput::with_others(
            DOCS_WITH_TEXT_UNITS,
            [DEFAULT_INPUT_NAME],
        )),
        StepDescriptor::new(verbs::RENAME, step_args!({"columns": {"text": "raw_content"}})),
    ];

    steps.extend(columns.iter().map(|column| {
        StepDescriptor::new(
            verbs::CONVERT,
            step_args!({"column": column, "to": column, "type": "string"}),
        )
    }));

    steps.push(
        StepDescriptor::new(
            verbs::MERGE_OVERRIDE,
            step_args!({"columns": columns, "strategy": "json", "to": "attributes"}),
        )
        .with_enabled(!columns.is_empty()),
    );
    steps.push(StepDescriptor::new(
        verbs::CONVERT,
        step_args!({"column": "id", "to": "id", "type": "string"}),
    ));
    steps
}
