//! Tokens command implementation

use crate::error::CliResult;
use crate::utils::config::{load_active_schema, read_config};
use rulequery_engine::{lex, Lexeme};

pub struct Options {
    pub query: String,
    pub schema: Option<String>,
}

/// Print how each word of a query is classified
pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(e) => {
            eprintln!("✗ Tokenization failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<String> {
    let config = read_config()?;
    let schema = load_active_schema(options.schema.as_deref(), &config)?;
    Ok(format_lexemes(&lex(&schema, &options.query)))
}

fn format_lexemes(lexemes: &[Lexeme]) -> String {
    lexemes
        .iter()
        .map(|l| format!("{:>3}..{:<3} {:<10} {}", l.start, l.end, l.kind.as_str(), l.text))
        .collect::<Vec<_>>()
        .join("\n")
}
