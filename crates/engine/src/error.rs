/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */
use thiserror::Error;

use crate::grammar::{TokenType, TypeSet};
use crate::schema::SchemaIssue;
use crate::sequence::Violation;

/// Top-level error type for the query engine
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    #[error("Query text error: {0}")]
    Text(#[from] TextError),
}

/// Errors loading a query schema
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML: {0}")]
    InvalidYaml(String),

    #[error("{}", summarize_issues(.0))]
    Invalid(Vec<SchemaIssue>),
}

/// Rejected edits on a token sequence. The sequence is unchanged after any of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Invalid suggestion '{name}' ({token_type}) at slot {index}")]
    InvalidSelection {
        index: usize,
        name: String,
        token_type: TokenType,
    },

    #[error("Value quotes at slot {index} can only be removed with the whole value")]
    ProtectedDeletion { index: usize },

    #[error("Slot {index} is out of range (sequence has {len} slots)")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("Suggestion {choice} does not exist at slot {index} ({len} offered)")]
    SuggestionOutOfRange {
        index: usize,
        choice: usize,
        len: usize,
    },

    #[error("{}", summarize_violations(.0))]
    Invalid(Vec<Violation>),
}

/// Free-text query failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextError {
    #[error("Unexpected '{text}' at position {position}, expected {expected}{}", hint_suffix(.hint))]
    UnexpectedToken {
        position: usize,
        text: String,
        expected: TypeSet,
        hint: Option<String>,
    },

    #[error(transparent)]
    Edit(#[from] EditError),
}

fn summarize_issues(issues: &[SchemaIssue]) -> String {
    let mut out = format!("Schema validation failed with {} issue(s)", issues.len());
    for issue in issues {
        out.push_str("\n  - ");
        if let Some(path) = &issue.path {
            out.push_str(path);
            out.push_str(": ");
        }
        out.push_str(&issue.message);
    }
    out
}

fn summarize_violations(violations: &[Violation]) -> String {
    let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
    format!("Query is not complete: {}", messages.join("; "))
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!(" (did you mean '{h}'?)"))
        .unwrap_or_default()
}
