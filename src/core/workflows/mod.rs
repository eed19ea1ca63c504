//! Built-in workflow step builders.
//!
//! Each builder is a pure function from a [`WorkflowConfig`](crate::core::config::WorkflowConfig)
//! to an ordered step list. Typed options are parsed once at the top of each
//! builder so shape errors surface before any step is produced.

pub mod documents;
pub mod entities;
pub mod text_units;

pub use documents::{build_create_base_documents_steps, DocumentsConfig};
pub use entities::{
    build_create_extracted_entities_steps, default_graph_merge_operations, AsyncMode,
    EntityExtractionConfig,
};
pub use text_units::{build_create_base_text_units_steps, TextReplacement, TextUnitsConfig};

pub const CREATE_BASE_TEXT_UNITS: &str = "create_base_text_units";
pub const CREATE_BASE_DOCUMENTS: &str = "create_base_documents";
pub const CREATE_BASE_EXTRACTED_ENTITIES: &str = "create_base_extracted_entities";

/// Upstream table consumed by document assembly; produced by a workflow outside this crate.
pub const CREATE_FINAL_TEXT_UNITS: &str = "create_final_text_units";
