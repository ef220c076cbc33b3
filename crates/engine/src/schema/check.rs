/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::collections::HashSet;

use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{Field, Operator};

/// One problem found in a query schema document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaIssue {
    pub message: String,
    /// JSON pointer into the document, when the issue has a location.
    pub path: Option<String>,
    pub suggestion: Option<String>,
}

/// Check a document against the query schema JSON Schema.
pub fn check_structure(meta_schema: &Value, document: &Value) -> Vec<SchemaIssue> {
    let compiled = match JSONSchema::compile(meta_schema) {
        Ok(compiled) => compiled,
        Err(err) => {
            return vec![SchemaIssue {
                message: format!("Failed to compile schema: {err}"),
                path: None,
                suggestion: None,
            }];
        }
    };

    // the error iterator borrows `compiled`, so collect before it drops
    let issues = if let Err(errors) = compiled.validate(document) {
        errors.map(|error| convert_jsonschema_error(&error)).collect()
    } else {
        Vec::new()
    };
    issues
}

fn convert_jsonschema_error(error: &jsonschema::ValidationError) -> SchemaIssue {
    let instance_path = error.instance_path.to_string();
    let keyword = format!("{:?}", error.kind);

    let suggestion = if keyword.contains("Required") {
        Some("Add the missing property".to_string())
    } else if keyword.contains("Enum") {
        Some("valueKind must be 'text' or 'date'; family must be 'text' or 'comparison'".to_string())
    } else if keyword.contains("Pattern") {
        Some("Field names are lower-case identifiers such as 'created_date'".to_string())
    } else {
        None
    };

    SchemaIssue {
        message: error.to_string(),
        path: if instance_path.is_empty() {
            None
        } else {
            Some(instance_path)
        },
        suggestion,
    }
}

/// Field and operator rules the JSON Schema cannot express.
pub fn check_semantics(fields: &[Field], operators: &[Operator]) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    issues.extend(check_duplicate_operators(operators));
    issues.extend(check_duplicate_fields(fields));
    issues.extend(check_field_operators(fields, operators));
    issues
}

fn check_duplicate_fields(fields: &[Field]) -> Vec<SchemaIssue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if !seen.insert(field.name.as_str()) {
            issues.push(SchemaIssue {
                message: format!("Duplicate field name: '{}'", field.name),
                path: Some(format!("/fields/{index}/name")),
                suggestion: Some("Field names must be unique".to_string()),
            });
        }
    }
    issues
}

fn check_duplicate_operators(operators: &[Operator]) -> Vec<SchemaIssue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for (index, operator) in operators.iter().enumerate() {
        if !seen.insert(operator.name.as_str()) {
            issues.push(SchemaIssue {
                message: format!("Duplicate operator name: '{}'", operator.name),
                path: Some(format!("/operators/{index}/name")),
                suggestion: Some("Operator names must be unique".to_string()),
            });
        }
    }
    issues
}

fn check_field_operators(fields: &[Field], operators: &[Operator]) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    for (field_index, field) in fields.iter().enumerate() {
        let family = field.value_kind.operator_family();
        for (op_index, name) in field.operators.iter().enumerate() {
            let path = Some(format!("/fields/{field_index}/operators/{op_index}"));
            match operators.iter().find(|op| &op.name == name) {
                None => issues.push(SchemaIssue {
                    message: format!("Unknown operator '{name}' on field '{}'", field.name),
                    path,
                    suggestion: closest_operator(name, operators)
                        .map(|candidate| format!("Did you mean '{candidate}'?")),
                }),
                Some(op) if op.family != family => issues.push(SchemaIssue {
                    message: format!(
                        "Operator '{name}' is a {} operator but field '{}' takes {family} operators",
                        op.family, field.name
                    ),
                    path,
                    suggestion: None,
                }),
                Some(_) => {}
            }
        }
    }
    issues
}

fn closest_operator<'a>(name: &str, operators: &'a [Operator]) -> Option<&'a str> {
    operators
        .iter()
        .map(|op| (op.name.as_str(), strsim::levenshtein(name, &op.name)))
        .filter(|(candidate, distance)| *distance <= name.len().max(candidate.len()) / 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}
