/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * End-to-end checks run before a sequence is handed to the parser.
 */

use serde::Serialize;
use thiserror::Error;

use crate::grammar::{next_legal_types, TokenType, INITIAL_TYPES};
use crate::schema::{Combinator, GroupBracket, Schema};
use crate::sequence::{Slot, Token};

/// A broken sequence invariant, found at slot `index`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    #[error("slot {index}: unbalanced bracket '{bracket}'")]
    UnbalancedGroup { index: usize, bracket: GroupBracket },

    #[error("slot {index}: rule starting here is missing its {missing}")]
    IncompleteRule { index: usize, missing: TokenType },

    #[error("slot {index}: {found} cannot follow {}", previous.map_or("the start of the query", TokenType::as_str))]
    IllegalAdjacency {
        index: usize,
        previous: Option<TokenType>,
        found: TokenType,
    },

    #[error("slot {index}: operator '{operator}' does not apply to field '{field}'")]
    OperatorMismatch {
        index: usize,
        field: String,
        operator: String,
    },

    #[error("slot {index}: a group cannot start with {combinator}")]
    LeadingCombinator { index: usize, combinator: Combinator },

    #[error("slot {index}: field '{field}' directly follows a closed group")]
    FieldAfterGroup { index: usize, field: String },

    #[error("slot {index}: {combinator} is not followed by a rule or group")]
    DanglingCombinator { index: usize, combinator: Combinator },

    #[error("slot {index}: {found} mixed with {first} in the same group")]
    MixedCombinators {
        index: usize,
        first: Combinator,
        found: Combinator,
    },

    #[error("slot {index}: groups need a combinator between them")]
    MissingCombinator { index: usize },

    #[error("slot {index}: unknown {token_type} '{name}'")]
    UnknownName {
        index: usize,
        token_type: TokenType,
        name: String,
    },

    #[error("slot {index}: '{text}' was typed but never selected")]
    UnresolvedSlot { index: usize, text: String },
}

impl Violation {
    pub fn index(&self) -> usize {
        match self {
            Violation::UnbalancedGroup { index, .. }
            | Violation::IncompleteRule { index, .. }
            | Violation::IllegalAdjacency { index, .. }
            | Violation::OperatorMismatch { index, .. }
            | Violation::LeadingCombinator { index, .. }
            | Violation::FieldAfterGroup { index, .. }
            | Violation::DanglingCombinator { index, .. }
            | Violation::MixedCombinators { index, .. }
            | Violation::MissingCombinator { index }
            | Violation::UnknownName { index, .. }
            | Violation::UnresolvedSlot { index, .. } => *index,
        }
    }
}

#[derive(Default)]
struct Scope<'a> {
    open_index: Option<usize>,
    field: Option<&'a str>,
    combinator: Option<Combinator>,
}

/// Check every slot in one pass. Pending slots are skipped unless text was
/// typed into them. The result is deterministic and ordered by slot.
pub fn validate(schema: &Schema, slots: &[Slot]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut scopes: Vec<Scope> = vec![Scope::default()];
    let mut previous: Option<(usize, &Token)> = None;
    // first slot of the rule still being built, and what it lacks
    let mut open_rule: Option<(usize, TokenType)> = None;

    for (index, slot) in slots.iter().enumerate() {
        let token = match slot {
            Slot::Resolved { token } => token,
            Slot::Pending { text, .. } => {
                if !text.is_empty() && !slot.is_value_slot() {
                    violations.push(Violation::UnresolvedSlot {
                        index,
                        text: text.clone(),
                    });
                }
                continue;
            }
        };
        let found = token.token_type();

        if let Some(violation) = check_name(schema, index, token) {
            violations.push(violation);
        }

        let allowed = previous.map_or(INITIAL_TYPES, |(_, p)| next_legal_types(p.token_type()));
        if !allowed.contains(found) {
            violations.push(Violation::IllegalAdjacency {
                index,
                previous: previous.map(|(_, p)| p.token_type()),
                found,
            });
        }

        let prev_token = previous.map(|(_, p)| p);
        match token {
            Token::Field(name) => {
                if matches!(prev_token, Some(Token::Group(GroupBracket::Close))) {
                    violations.push(Violation::FieldAfterGroup {
                        index,
                        field: name.clone(),
                    });
                }
                if let Some(scope) = scopes.last_mut() {
                    scope.field = Some(name.as_str());
                }
                open_rule = Some((index, TokenType::Operator));
            }
            Token::Operator(name) => {
                let field = scopes.last().and_then(|s| s.field);
                if let Some(field_name) = field {
                    let legal = schema
                        .field(field_name)
                        .is_some_and(|f| f.operators.iter().any(|op| op == name));
                    if !legal && schema.operator(name).is_some() && schema.field(field_name).is_some() {
                        violations.push(Violation::OperatorMismatch {
                            index,
                            field: field_name.to_string(),
                            operator: name.clone(),
                        });
                    }
                }
                if let Some((start, _)) = open_rule {
                    open_rule = Some((start, TokenType::Value));
                }
            }
            Token::Value(_) => open_rule = None,
            Token::Combinator(combinator) => {
                if matches!(prev_token, Some(Token::Group(GroupBracket::Open))) {
                    violations.push(Violation::LeadingCombinator {
                        index,
                        combinator: *combinator,
                    });
                }
                if let Some(scope) = scopes.last_mut() {
                    match scope.combinator {
                        Some(first) if first != *combinator => {
                            violations.push(Violation::MixedCombinators {
                                index,
                                first,
                                found: *combinator,
                            });
                        }
                        Some(_) => {}
                        None => scope.combinator = Some(*combinator),
                    }
                }
            }
            Token::Group(GroupBracket::Open) => {
                if matches!(
                    prev_token,
                    Some(Token::Group(GroupBracket::Close) | Token::Value(_))
                ) {
                    violations.push(Violation::MissingCombinator { index });
                }
                scopes.push(Scope {
                    open_index: Some(index),
                    ..Scope::default()
                });
            }
            Token::Group(GroupBracket::Close) => {
                if let Some((_, Token::Combinator(combinator))) = previous {
                    violations.push(Violation::DanglingCombinator {
                        index,
                        combinator: *combinator,
                    });
                }
                if scopes.len() > 1 {
                    scopes.pop();
                } else {
                    violations.push(Violation::UnbalancedGroup {
                        index,
                        bracket: GroupBracket::Close,
                    });
                }
            }
        }

        previous = Some((index, token));
    }

    if let Some((index, missing)) = open_rule {
        violations.push(Violation::IncompleteRule { index, missing });
    }
    if let Some((index, Token::Combinator(combinator))) = previous {
        violations.push(Violation::DanglingCombinator {
            index,
            combinator: *combinator,
        });
    }
    for scope in scopes.iter().skip(1) {
        if let Some(index) = scope.open_index {
            violations.push(Violation::UnbalancedGroup {
                index,
                bracket: GroupBracket::Open,
            });
        }
    }

    violations.sort_by_key(Violation::index);
    violations
}

fn check_name(schema: &Schema, index: usize, token: &Token) -> Option<Violation> {
    let known = match token {
        Token::Field(name) => schema.field(name).is_some(),
        Token::Operator(name) => schema.operator(name).is_some(),
        Token::Value(_) | Token::Combinator(_) | Token::Group(_) => true,
    };
    (!known).then(|| Violation::UnknownName {
        index,
        token_type: token.token_type(),
        name: token.text().to_string(),
    })
}
