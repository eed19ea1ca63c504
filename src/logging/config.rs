use crate::Result;
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const DEFAULT_LEVEL: &str = "info";

/// Sink for console log lines.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleOutput {
    Stdout,
    #[default]
    Stderr,
    None,
}

impl ConsoleOutput {
    pub fn make_writer(self) -> BoxMakeWriter {
        match self {
            ConsoleOutput::Stdout => BoxMakeWriter::new(io::stdout),
            ConsoleOutput::Stderr => BoxMakeWriter::new(io::stderr),
            ConsoleOutput::None => BoxMakeWriter::new(io::sink),
        }
    }
}

impl FromStr for ConsoleOutput {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "stdout" => Ok(ConsoleOutput::Stdout),
            "stderr" => Ok(ConsoleOutput::Stderr),
            "none" => Ok(ConsoleOutput::None),
            other => Err(anyhow!(
                "logging.console_output must be stdout, stderr or none, got '{}'",
                other
            )),
        }
    }
}

/// Resolved logging configuration after reading config files and env overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub default_level: String,
    pub console_output: ConsoleOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LEVEL.to_string(),
            console_output: ConsoleOutput::default(),
        }
    }
}

impl LoggingConfig {
    /// Load configuration with deterministic precedence: defaults, config file, env overrides.
    pub fn load(workspace_root: Option<&Path>) -> Result<Self> {
        let mut config = LoggingConfig::default();
        if let Some(workspace) = workspace_root {
            if let Some(workspace_config) = Self::load_from_workspace(workspace)? {
                config.apply(workspace_config);
            }
        }
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_workspace(workspace_root: &Path) -> Result<Option<TomlLogging>> {
        let path = workspace_root
            .join(".stepweaver")
            .join("config")
            .join("logging.toml");
        Self::load_from_file(&path)
    }

    fn load_from_file(path: &Path) -> Result<Option<TomlLogging>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read logging config {}", path.display()))?;
        let parsed: TomlLogging = toml::from_str(&content)
            .with_context(|| format!("failed to parse logging config {}", path.display()))?;
        Ok(Some(parsed))
    }

    fn apply(&mut self, toml: TomlLogging) {
        if let Some(logging) = toml.logging {
            if let Some(default_level) = logging.default_level {
                self.default_level = default_level;
            }
            if let Some(console_output) = logging.console_output {
                self.console_output = console_output;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = env::var("STEPWEAVER_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.default_level = level.trim().to_string();
            }
        }
        if let Ok(console) = env::var("STEPWEAVER_LOG_CONSOLE") {
            self.console_output = console.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        Directive::from_str(&self.default_level)
            .map_err(|_| anyhow!("logging.default_level must be a valid tracing directive"))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TomlLogging {
    pub logging: Option<TomlLoggingSection>,
}

#[derive(Debug, Deserialize)]
struct TomlLoggingSection {
    pub default_level: Option<String>,
    #[serde(default)]
    pub console_output: Option<ConsoleOutput>,
}
