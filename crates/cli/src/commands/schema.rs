//! Schema command implementation

use crate::error::{CliError, CliResult};
use crate::utils::config::{load_active_schema, load_schema_file, read_config};
use rulequery_engine::{QueryError, SchemaError};

pub struct Options {
    pub schema: Option<String>,
    /// Schema file to check instead of printing the active schema
    pub check: Option<String>,
}

pub fn run(options: &Options) -> i32 {
    if let Some(path) = &options.check {
        return run_check(path);
    }
    match print_schema(options) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("✗ Failed to load schema");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn print_schema(options: &Options) -> CliResult<String> {
    let config = read_config()?;
    let schema = load_active_schema(options.schema.as_deref(), &config)?;
    serde_json::to_string_pretty(&schema)
        .map_err(|e| CliError::Message(format!("Failed to serialize schema: {e}")))
}

fn run_check(path: &str) -> i32 {
    match load_schema_file(path) {
        Ok(schema) => {
            println!(
                "✓ Schema is valid ({} fields, {} operators)",
                schema.fields().len(),
                schema.operators().len()
            );
            0
        }
        Err(CliError::Query(QueryError::Schema(SchemaError::Invalid(issues)))) => {
            eprintln!("✗ Schema validation failed: {path}");
            for issue in &issues {
                match &issue.path {
                    Some(location) => eprintln!("  - {location}: {}", issue.message),
                    None => eprintln!("  - {}", issue.message),
                }
                if let Some(suggestion) = &issue.suggestion {
                    eprintln!("    Suggestion: {suggestion}");
                }
            }
            1
        }
        Err(e) => {
            eprintln!("✗ Schema validation failed: {path}");
            eprintln!("  Error: {e}");
            1
        }
    }
}
