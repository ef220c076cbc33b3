//! Parse command implementation

use crate::error::CliResult;
use crate::utils::config::{load_active_schema, read_config};
use rulequery_engine::parse_query;

pub struct Options {
    pub query: String,
    pub schema: Option<String>,
    pub pretty: bool,
}

/// Parse a query and print its rule-group AST as JSON
pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("✗ Query parsing failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<String> {
    let config = read_config()?;
    let schema = load_active_schema(options.schema.as_deref(), &config)?;
    let group = parse_query(&schema, &options.query)?;

    let pretty = options.pretty || config.pretty.unwrap_or(false);
    let json = if pretty {
        group.to_json_pretty()
    } else {
        group.to_json()
    };
    json.map_err(|e| crate::error::CliError::Message(format!("Failed to serialize AST: {e}")))
}
