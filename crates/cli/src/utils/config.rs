//! Config file reading utilities

use crate::error::{CliError, CliResult};
use log::debug;
use rulequery_engine::{load_schema, Schema};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_PATH: &str = ".rulequery/config.yaml";

/// Contents of `.rulequery/config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigFile {
    /// Query schema file, relative to the working directory
    pub schema: Option<String>,
    /// Pretty-print JSON output by default
    pub pretty: Option<bool>,
}

/// Read the project config. A missing file is an empty config.
pub fn read_config() -> CliResult<ConfigFile> {
    read_config_from(Path::new(CONFIG_PATH))
}

pub fn read_config_from(config_path: &Path) -> CliResult<ConfigFile> {
    if !config_path.exists() {
        return Ok(ConfigFile::default());
    }

    let config_content = fs::read_to_string(config_path)
        .map_err(|e| CliError::Message(format!("Failed to read config file: {e}")))?;

    // an empty file deserializes to unit, not a map
    if config_content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    serde_yaml::from_str(&config_content)
        .map_err(|e| CliError::Message(format!("Failed to parse config file: {e}")))
}

/// Load the query schema to work with: `--schema` first, then the config
/// file, then the built-in schema.
pub fn load_active_schema(flag: Option<&str>, config: &ConfigFile) -> CliResult<Schema> {
    match flag.or(config.schema.as_deref()) {
        Some(path) => load_schema_file(path),
        None => {
            debug!("using built-in query schema");
            Ok(Schema::default_schema())
        }
    }
}

pub fn load_schema_file(path: &str) -> CliResult<Schema> {
    debug!("loading query schema from {path}");
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::Message(format!("Failed to read schema {path}: {e}")))?;
    Ok(load_schema(&content, Some(path))?)
}
