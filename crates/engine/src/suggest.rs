/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Suggestion engine: ordered completion candidates for one slot.
 */

use log::trace;
use serde::Serialize;

use crate::error::EditError;
use crate::grammar::resolver::{legal_values, SlotContext};
use crate::grammar::{next_legal_types, TokenType, TypeSet};
use crate::sequence::{Slot, Token, TokenSequence};

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Types the following slot would accept once this is selected.
    #[serde(rename = "nextLegalTypes")]
    pub next_legal_types: TypeSet,
}

/// What the partial text is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchKey {
    #[default]
    Label,
    /// Label or schema name. Used when the text was typed as a query
    /// rather than picked from a list.
    LabelOrName,
}

/// Candidates for slot `index` whose label contains `partial`, ignoring case.
///
/// Lists fields, then operators, combinators and brackets, each in schema
/// order. Value slots take free text and get no candidates.
pub fn suggest(
    sequence: &TokenSequence<'_>,
    index: usize,
    partial: &str,
) -> Result<Vec<Suggestion>, EditError> {
    suggest_matching(sequence, index, partial, MatchKey::Label)
}

pub fn suggest_matching(
    sequence: &TokenSequence<'_>,
    index: usize,
    partial: &str,
    key: MatchKey,
) -> Result<Vec<Suggestion>, EditError> {
    let legal = sequence.legal_values(index)?;
    let needle = partial.to_lowercase();
    let matches = |name: &str, label: &str| {
        needle.is_empty()
            || label.to_lowercase().contains(&needle)
            || (key == MatchKey::LabelOrName && name.to_lowercase().contains(&needle))
    };

    let candidates = legal
        .fields
        .iter()
        .map(|f| (Token::Field(f.name.clone()), f.label.as_str()))
        .chain(
            legal
                .operators
                .iter()
                .map(|op| (Token::Operator(op.name.clone()), op.label.as_str())),
        )
        .chain(
            legal
                .combinators
                .iter()
                .map(|c| (Token::Combinator(*c), c.as_str())),
        )
        .chain(legal.groups.iter().map(|g| (Token::Group(*g), g.as_str())));

    let mut suggestions = Vec::new();
    for (token, label) in candidates {
        if !matches(token.text(), label) {
            continue;
        }
        suggestions.push(Suggestion {
            name: token.text().to_string(),
            label: label.to_string(),
            token_type: token.token_type(),
            next_legal_types: types_opened_by(sequence, index, token),
        });
    }
    trace!(
        "{} suggestion(s) for slot {index} matching '{partial}'",
        suggestions.len()
    );
    Ok(suggestions)
}

/// Types the slot after `index` could take if `token` were placed at `index`.
fn types_opened_by(sequence: &TokenSequence<'_>, index: usize, token: Token) -> TypeSet {
    let follow = next_legal_types(token.token_type());
    let mut slots = sequence.slots().to_vec();
    slots[index] = Slot::resolved(token);
    let context = SlotContext::at(&slots, index + 1);
    legal_values(sequence.schema(), follow, &context)
        .types()
        .intersection(follow)
}
