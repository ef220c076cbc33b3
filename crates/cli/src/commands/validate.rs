//! Validate command implementation

use crate::error::CliResult;
use crate::utils::config::{load_active_schema, read_config};
use rulequery_engine::{validate_query, Violation};

pub struct Options {
    pub query: String,
    pub schema: Option<String>,
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(violations) if violations.is_empty() => {
            println!("✓ Query is valid");
            0
        }
        Ok(violations) => {
            eprintln!(
                "✗ Query has {} problem{}",
                violations.len(),
                if violations.len() > 1 { "s" } else { "" }
            );
            for violation in &violations {
                eprintln!("  - {violation}");
            }
            1
        }
        Err(e) => {
            eprintln!("✗ Validation failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<Vec<Violation>> {
    let config = read_config()?;
    let schema = load_active_schema(options.schema.as_deref(), &config)?;
    Ok(validate_query(&schema, &options.query)?)
}
