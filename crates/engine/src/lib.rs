//! rulequery engine library
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.
//!
//! Grammar-driven model for building boolean filter queries one token at a
//! time, with context-sensitive suggestions, and a parser that folds the
//! finished tokens into a nested rule-group AST.
//! Works only with in-memory data (no file I/O) so it can run in WASM.
//!
//! # Example
//!
//! ```rust,no_run
//! use rulequery_engine::{parse_query, Schema};
//!
//! let schema = Schema::default_schema();
//! let group = parse_query(&schema, r#"(text contains "abc") AND (created_date > "2024-01-01")"#)?;
//! println!("{}", group.to_json().unwrap_or_default());
//! # Ok::<(), rulequery_engine::QueryError>(())
//! ```

pub mod ast;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod schema;
pub mod sequence;
pub mod session;
pub mod suggest;

pub use ast::{Rule, RuleGroup, RuleNode};
pub use error::{EditError, QueryError, SchemaError, TextError};
pub use grammar::{next_legal_types, TokenType, TypeSet, INITIAL_TYPES};
pub use parser::text::{Lexeme, LexemeKind};
pub use schema::{Combinator, Field, GroupBracket, Operator, Schema};
pub use sequence::{Slot, Token, TokenSequence, Violation};
pub use session::{EditorSession, Intent};
pub use suggest::Suggestion;

/// Load a query schema from YAML or JSON
///
/// The format is picked from `file_path`'s extension when given.
///
/// # Errors
///
/// Returns `SchemaError` if the document does not parse or is not a valid
/// query schema.
pub fn load_schema(content: &str, file_path: Option<&str>) -> Result<Schema, QueryError> {
    Ok(Schema::load(content, file_path)?)
}

/// Parse a query typed as text into a rule group
///
/// # Errors
///
/// Returns `TextError` if a word is out of place or the finished query is
/// not valid.
pub fn parse_query(schema: &Schema, text: &str) -> Result<RuleGroup, QueryError> {
    Ok(parser::text::parse_query(schema, text)?)
}

/// Check a query typed as text without parsing it
///
/// An empty list means the query can be parsed.
///
/// # Errors
///
/// Returns `TextError` if a word cannot be placed at all.
pub fn validate_query(schema: &Schema, text: &str) -> Result<Vec<Violation>, QueryError> {
    let sequence = parser::text::build_sequence(schema, text)?;
    Ok(sequence.validate())
}

/// Completion candidates for the end of `text`
///
/// # Errors
///
/// Returns `TextError` if the text before the last word is not a valid prefix.
pub fn complete(schema: &Schema, text: &str) -> Result<Vec<Suggestion>, QueryError> {
    Ok(parser::text::complete(schema, text)?)
}

/// Split query text into classified lexemes, for highlighting
pub fn lex(schema: &Schema, text: &str) -> Vec<Lexeme> {
    parser::text::lex(schema, text)
}
