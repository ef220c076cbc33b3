//! Suggest command implementation

use crate::error::{CliError, CliResult};
use crate::utils::config::{load_active_schema, read_config};
use rulequery_engine::{complete, Suggestion};

pub struct Options {
    pub query: String,
    pub schema: Option<String>,
    pub json: bool,
}

/// Print completion candidates for the end of a query
pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(e) => {
            eprintln!("✗ No suggestions available");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<String> {
    let config = read_config()?;
    let schema = load_active_schema(options.schema.as_deref(), &config)?;
    let suggestions = complete(&schema, &options.query)?;

    if options.json {
        serde_json::to_string_pretty(&suggestions)
            .map_err(|e| CliError::Message(format!("Failed to serialize suggestions: {e}")))
    } else {
        Ok(format_suggestions(&suggestions))
    }
}

fn format_suggestions(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "(no suggestions; a value goes here)".to_string();
    }
    suggestions
        .iter()
        .map(|s| {
            if s.label == s.name {
                format!("{} [{}]", s.label, s.token_type)
            } else {
                format!("{} ({}) [{}]", s.label, s.name, s.token_type)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
