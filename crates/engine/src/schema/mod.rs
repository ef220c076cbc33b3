/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Query schema: the static fields, operators, combinators and brackets an
 * expression is built from.
 */

pub mod check;
pub mod loader;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

pub use check::SchemaIssue;

/// Embed the default query schema at compile time
/// This avoids file I/O which is not available in WASM environments
const DEFAULT_SCHEMA_JSON: &str = include_str!("../../../../schemas/query-schema.v1.json");

/// Embed the JSON Schema that user-supplied query schemas are checked against
const SCHEMA_SCHEMA_JSON: &str = include_str!("../../../../schemas/query-schema.schema.v1.json");

/// Kind of value a field holds. Decides which operator family applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Date,
}

impl ValueKind {
    pub fn operator_family(self) -> OperatorFamily {
        match self {
            ValueKind::Text => OperatorFamily::Text,
            ValueKind::Date => OperatorFamily::Comparison,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorFamily {
    Text,
    Comparison,
}

impl fmt::Display for OperatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorFamily::Text => f.write_str("text"),
            OperatorFamily::Comparison => f.write_str("comparison"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub label: String,
    #[serde(rename = "valueKind")]
    pub value_kind: ValueKind,
    /// Operator names legal for this field, in suggestion order.
    #[serde(default)]
    pub operators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    pub label: String,
    pub family: OperatorFamily,
}

/// Logical combinator joining the members of a rule group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Combinator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Combinator {
    pub const ALL: [Combinator; 2] = [Combinator::And, Combinator::Or];

    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }

    /// Case-insensitive keyword lookup.
    pub fn parse(text: &str) -> Option<Combinator> {
        Combinator::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupBracket {
    #[serde(rename = "(")]
    Open,
    #[serde(rename = ")")]
    Close,
}

impl GroupBracket {
    pub const ALL: [GroupBracket; 2] = [GroupBracket::Open, GroupBracket::Close];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupBracket::Open => "(",
            GroupBracket::Close => ")",
        }
    }

    pub fn parse(text: &str) -> Option<GroupBracket> {
        GroupBracket::ALL.into_iter().find(|g| g.as_str() == text)
    }
}

impl fmt::Display for GroupBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query schema document as written by users. `operators` falls back to the
/// built-in operator table when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    pub fields: Vec<Field>,
    #[serde(default)]
    pub operators: Option<Vec<Operator>>,
}

/// Immutable description of everything a query can be built from.
///
/// Every field carries its full operator list after construction, so
/// lookups never have to consult the operator family again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    fields: Vec<Field>,
    operators: Vec<Operator>,
}

impl Schema {
    /// The built-in schema.
    ///
    /// # Panics
    ///
    /// Panics if the embedded schema JSON is invalid (this should never happen).
    #[must_use]
    pub fn default_schema() -> Schema {
        let value: Value = serde_json::from_str(DEFAULT_SCHEMA_JSON)
            .expect("Failed to parse embedded query schema - this should never happen");
        Schema::from_value(&value)
            .expect("Embedded query schema is invalid - this should never happen")
    }

    /// Load a schema from YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the text does not parse, does not match the
    /// query schema JSON Schema, or breaks a field/operator rule.
    pub fn load(content: &str, file_path: Option<&str>) -> Result<Schema, SchemaError> {
        let value = loader::read_document(content, file_path)?;
        Schema::from_value(&value)
    }

    /// Build a schema from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Invalid` with every issue found.
    pub fn from_value(value: &Value) -> Result<Schema, SchemaError> {
        let issues = check::check_structure(&meta_schema(), value);
        if !issues.is_empty() {
            return Err(SchemaError::Invalid(issues));
        }

        let document: SchemaDocument = serde_json::from_value(value.clone())
            .map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
        let operators = match document.operators {
            Some(operators) => operators,
            None => builtin_operators(),
        };

        let issues = check::check_semantics(&document.fields, &operators);
        if !issues.is_empty() {
            return Err(SchemaError::Invalid(issues));
        }

        let fields = document
            .fields
            .into_iter()
            .map(|mut field| {
                if field.operators.is_empty() {
                    let family = field.value_kind.operator_family();
                    field.operators = operators
                        .iter()
                        .filter(|op| op.family == family)
                        .map(|op| op.name.clone())
                        .collect();
                }
                field
            })
            .collect();

        Ok(Schema { fields, operators })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn combinators(&self) -> &'static [Combinator] {
        &Combinator::ALL
    }

    pub fn groups(&self) -> &'static [GroupBracket] {
        &GroupBracket::ALL
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn operator(&self, name: &str) -> Option<&Operator> {
        self.operators.iter().find(|op| op.name == name)
    }

    /// Operators declared on `field`, in declaration order.
    pub fn operators_for<'a>(&'a self, field: &'a Field) -> impl Iterator<Item = &'a Operator> + 'a {
        field.operators.iter().filter_map(move |name| self.operator(name))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::default_schema()
    }
}

/// Load the JSON Schema for query schema documents.
///
/// # Panics
///
/// Panics if the embedded JSON Schema is invalid (this should never happen).
#[must_use]
pub fn meta_schema() -> Value {
    serde_json::from_str(SCHEMA_SCHEMA_JSON)
        .expect("Failed to parse embedded query schema JSON Schema - this should never happen")
}

/// Operator table of the default schema.
fn builtin_operators() -> Vec<Operator> {
    Schema::default_schema().operators
}
