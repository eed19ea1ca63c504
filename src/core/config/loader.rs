#![allow(clippy::result_large_err)]

use super::PipelineConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::workflows::{CREATE_BASE_EXTRACTED_ENTITIES, CREATE_BASE_TEXT_UNITS};
use serde_json::{Map, Value};
use std::env;
use std::path::Path;

/// Default pipeline config file name inside a workspace.
pub const CONFIG_FILE_NAME: &str = "stepweaver.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/stepweaver.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults plus env overrides
    pub fn load_from_workspace(workspace_path: &Path) -> Result<PipelineConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        let config_file = Self::load_from_file(&config_path)?;

        let mut config = config_file.unwrap_or_default();
        Self::apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Load config from a specific file path, choosing the format by extension
    /// (`.yaml`/`.yml` for YAML, anything else for TOML).
    /// Returns Ok(None) if the file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<PipelineConfig>, AppError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "pipeline config not found, using defaults");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to read config file {}", path.display()),
            )
            .with_code("CFG-IO-001")
            .with_source(err)
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let parsed: Result<PipelineConfig, anyhow::Error> = if is_yaml {
            serde_yaml::from_str(&content).map_err(Into::into)
        } else {
            toml::from_str(&content).map_err(Into::into)
        };
        let config = parsed.map_err(|err| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("failed to parse config file {}", path.display()),
            )
            .with_code("CFG-PARSE-001")
            .with_source(err)
        })?;

        tracing::debug!(
            path = %path.display(),
            workflows = config.workflows.len(),
            "loaded pipeline config"
        );
        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    pub fn apply_env_overrides(config: &mut PipelineConfig) {
        if let Ok(enabled) = env::var("STEPWEAVER_GRAPHML_SNAPSHOT") {
            if let Ok(enabled) = enabled.trim().parse::<bool>() {
                config
                    .workflow_mut(CREATE_BASE_EXTRACTED_ENTITIES)
                    .set("graphml_snapshot", enabled);
            }
        }

        if let Ok(enabled) = env::var("STEPWEAVER_RAW_ENTITY_SNAPSHOT") {
            if let Ok(enabled) = enabled.trim().parse::<bool>() {
                config
                    .workflow_mut(CREATE_BASE_EXTRACTED_ENTITIES)
                    .set("raw_entity_snapshot", enabled);
            }
        }

        if let Ok(column) = env::var("STEPWEAVER_CHUNK_COLUMN") {
            let column = column.trim();
            if !column.is_empty() {
                config
                    .workflow_mut(CREATE_BASE_TEXT_UNITS)
                    .set("chunk_column", column);
                Self::override_entity_text_column(config, column);
            }
        }
    }

    /// Entity extraction reads the chunk column produced by the text unit workflow,
    /// so both must follow the same override. A malformed `entity_extract` value is
    /// left alone for the builder to reject.
    fn override_entity_text_column(config: &mut PipelineConfig, column: &str) {
        let entities = config.workflow_mut(CREATE_BASE_EXTRACTED_ENTITIES);
        let mut extract = match entities.get_value("entity_extract") {
            None => Map::new(),
            Some(Value::Object(extract)) => extract.clone(),
            Some(_) => return,
        };
        extract.insert("text_column".to_string(), Value::from(column));
        entities.set("entity_extract", Value::Object(extract));
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "STEPWEAVER_GRAPHML_SNAPSHOT - Enable the merged graph GraphML snapshot (true/false)",
            "STEPWEAVER_RAW_ENTITY_SNAPSHOT - Enable the raw extracted entities snapshot (true/false)",
            "STEPWEAVER_CHUNK_COLUMN - Override the chunk column written by text units and read by entity extraction (default: chunk)",
            "STEPWEAVER_LOG_LEVEL - Override the default tracing level (default: info)",
            "STEPWEAVER_LOG_CONSOLE - Console log sink: stdout, stderr, none (default: stderr)",
        ]
    }
}
