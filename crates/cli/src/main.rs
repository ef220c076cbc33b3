//! rulequery CLI
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.

mod commands;
mod error;
mod utils;

#[cfg(test)]
mod test_helpers;

use clap::{CommandFactory, Parser, Subcommand};
use commands::{completion, parse, schema, suggest, tokens, validate};

/// rulequery CLI - Parse, validate and complete filter queries
#[derive(Parser)]
#[command(name = "rulequery")]
#[command(about = "rulequery CLI - Parse, validate and complete filter queries", long_about = None)]
#[command(version)]
struct Cli {
    /// Query schema file (YAML or JSON); defaults to .rulequery/config.yaml, then the built-in schema
    #[arg(long, global = true)]
    schema: Option<String>,
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and print the rule-group AST as JSON
    Parse {
        /// Query text, e.g. '(text contains "abc") AND (created_date > "2024-01-01")'
        query: String,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Check a query and list everything that keeps it from parsing
    Validate {
        /// Query text
        query: String,
    },
    /// Show completion candidates for the end of a query
    Suggest {
        /// Query text; a trailing space asks for the next word
        query: String,
        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how each word of a query is classified
    Tokens {
        /// Query text
        query: String,
    },
    /// Print the active query schema, or check a schema file
    Schema {
        /// Schema file to check
        #[arg(long)]
        check: Option<String>,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell type (bash, zsh, fish)
        shell: String,
    },
}

/// Command structure, used for shell completion generation
pub fn get_cli_command() -> clap::Command {
    Cli::command()
}

fn main() {
    let cli = Cli::parse();
    utils::logger::init_logger(cli.verbose);

    let exit_code = match cli.command {
        Commands::Parse { query, pretty } => {
            let opts = parse::Options {
                query,
                schema: cli.schema,
                pretty,
            };
            parse::run(&opts)
        }
        Commands::Validate { query } => {
            let opts = validate::Options {
                query,
                schema: cli.schema,
            };
            validate::run(&opts)
        }
        Commands::Suggest { query, json } => {
            let opts = suggest::Options {
                query,
                schema: cli.schema,
                json,
            };
            suggest::run(&opts)
        }
        Commands::Tokens { query } => {
            let opts = tokens::Options {
                query,
                schema: cli.schema,
            };
            tokens::run(&opts)
        }
        Commands::Schema { check } => {
            let opts = schema::Options {
                schema: cli.schema,
                check,
            };
            schema::run(&opts)
        }
        Commands::Completion { shell } => {
            let opts = completion::Options { shell };
            completion::run(&opts)
        }
    };

    std::process::exit(exit_code);
}
