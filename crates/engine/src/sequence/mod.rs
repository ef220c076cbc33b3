/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Token sequence: the ordered slots a query is edited in.
 */

pub mod validate;

#[cfg(test)]
mod tests;

use log::debug;
use serde::Serialize;

use crate::ast::RuleGroup;
use crate::error::EditError;
use crate::grammar::resolver::{legal_values, LegalValues, SlotContext};
use crate::grammar::{next_legal_types, TokenType, TypeSet, INITIAL_TYPES};
use crate::parser;
use crate::schema::{Combinator, GroupBracket, Schema};
use crate::suggest::{self, Suggestion};

pub use validate::Violation;

/// Empty value literal a fresh value slot starts with.
pub const EMPTY_VALUE: &str = "\"\"";

/// A committed token. Values keep their quote delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum Token {
    Field(String),
    Operator(String),
    Value(String),
    Combinator(Combinator),
    Group(GroupBracket),
}

impl Token {
    /// Build a token of `token_type` from its textual name.
    ///
    /// Returns `None` for combinator or bracket names that do not exist.
    pub fn from_parts(token_type: TokenType, name: &str) -> Option<Token> {
        match token_type {
            TokenType::Field => Some(Token::Field(name.to_string())),
            TokenType::Operator => Some(Token::Operator(name.to_string())),
            TokenType::Value => Some(Token::Value(quote(name))),
            TokenType::Combinator => Combinator::parse(name).map(Token::Combinator),
            TokenType::Group => GroupBracket::parse(name).map(Token::Group),
        }
    }

    pub fn token_type(&self) -> TokenType {
        match self {
            Token::Field(_) => TokenType::Field,
            Token::Operator(_) => TokenType::Operator,
            Token::Value(_) => TokenType::Value,
            Token::Combinator(_) => TokenType::Combinator,
            Token::Group(_) => TokenType::Group,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Token::Field(name) | Token::Operator(name) | Token::Value(name) => name,
            Token::Combinator(combinator) => combinator.as_str(),
            Token::Group(bracket) => bracket.as_str(),
        }
    }
}

/// One editable position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Slot {
    /// Not yet committed. `text` is whatever has been typed so far; value
    /// slots always hold a quoted literal.
    Pending { candidates: TypeSet, text: String },
    Resolved { token: Token },
}

impl Slot {
    pub fn pending(candidates: TypeSet) -> Slot {
        Slot::Pending {
            candidates,
            text: initial_text(candidates),
        }
    }

    pub fn resolved(token: Token) -> Slot {
        Slot::Resolved { token }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Slot::Resolved { token } => Some(token),
            Slot::Pending { .. } => None,
        }
    }

    pub fn is_value_slot(&self) -> bool {
        match self {
            Slot::Pending { candidates, .. } => *candidates == TypeSet::single(TokenType::Value),
            Slot::Resolved { token } => matches!(token, Token::Value(_)),
        }
    }

    /// Raw text as the editor shows it.
    pub fn text(&self) -> &str {
        match self {
            Slot::Pending { text, .. } => text,
            Slot::Resolved { token } => token.text(),
        }
    }
}

fn initial_text(candidates: TypeSet) -> String {
    if candidates == TypeSet::single(TokenType::Value) {
        EMPTY_VALUE.to_string()
    } else {
        String::new()
    }
}

pub(crate) fn is_quoted(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => (first == '"' || first == '\'') && first == last,
        _ => false,
    }
}

/// Wrap `text` in double quotes unless it already carries a matching pair.
pub(crate) fn quote(text: &str) -> String {
    if is_quoted(text) {
        text.to_string()
    } else {
        format!("\"{text}\"")
    }
}

/// The query being edited, bound to the schema it is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSequence<'s> {
    schema: &'s Schema,
    slots: Vec<Slot>,
}

impl<'s> TokenSequence<'s> {
    /// A sequence holding one empty slot that accepts a field or `(`.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            slots: vec![Slot::pending(INITIAL_TYPES)],
        }
    }

    /// Wrap existing slots without checking them. Use [`validate`](Self::validate)
    /// before trusting the result.
    pub fn from_slots(schema: &'s Schema, slots: Vec<Slot>) -> Self {
        Self { schema, slots }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Result<&Slot, EditError> {
        self.slots.get(index).ok_or(EditError::SlotOutOfRange {
            index,
            len: self.slots.len(),
        })
    }

    /// Resolved tokens in order, skipping pending slots.
    pub fn tokens(&self) -> Vec<Token> {
        self.slots.iter().filter_map(Slot::token).cloned().collect()
    }

    /// Types the slot may take. Resolved slots report what their
    /// predecessor allows, so they can be re-selected.
    pub fn candidate_types(&self, index: usize) -> Result<TypeSet, EditError> {
        match self.slot(index)? {
            Slot::Pending { candidates, .. } => Ok(*candidates),
            Slot::Resolved { .. } => Ok(self.types_after(index)),
        }
    }

    /// Legal values per candidate type at `index`.
    pub fn legal_values(&self, index: usize) -> Result<LegalValues<'s>, EditError> {
        let candidates = self.candidate_types(index)?;
        let context = SlotContext::at(&self.slots, index);
        Ok(legal_values(self.schema, candidates, &context))
    }

    /// Completion candidates for slot `index` whose label contains `partial`.
    pub fn suggest(&self, index: usize, partial: &str) -> Result<Vec<Suggestion>, EditError> {
        suggest::suggest(self, index, partial)
    }

    /// Commit slot `index` to `name` of `token_type`.
    ///
    /// Non-value selections must be in the slot's current suggestion list.
    /// A value is any text; it is quoted if it is not already. The slot after
    /// `index` is created or re-seeded with the types that may follow. When a
    /// pending slot is resolved in front of a token that cannot directly
    /// follow it, a new pending slot is opened between the two.
    ///
    /// # Errors
    ///
    /// Returns `EditError::InvalidSelection` when the selection is not legal
    /// here, or when re-selecting a resolved slot would leave the token after
    /// it illegal. The sequence is left unchanged on error.
    pub fn resolve(
        &mut self,
        index: usize,
        name: &str,
        token_type: TokenType,
    ) -> Result<(), EditError> {
        let invalid = || EditError::InvalidSelection {
            index,
            name: name.to_string(),
            token_type,
        };

        let token = if token_type == TokenType::Value {
            if !self.legal_values(index)?.value {
                return Err(invalid());
            }
            Token::Value(quote(name))
        } else {
            let offered = self
                .suggest(index, "")?
                .into_iter()
                .any(|s| s.token_type == token_type && s.name == name);
            if !offered {
                return Err(invalid());
            }
            Token::from_parts(token_type, name).ok_or_else(invalid)?
        };

        let mut slots = self.slots.clone();
        let was_pending = matches!(slots[index], Slot::Pending { .. });
        slots[index] = Slot::resolved(token);
        let follow = next_legal_types(token_type);
        match slots.get_mut(index + 1) {
            None => slots.push(Slot::pending(follow)),
            Some(pending @ Slot::Pending { .. }) => reseed(pending, follow),
            Some(Slot::Resolved { token: following }) => {
                let following = following.clone();
                let probe = TokenSequence::from_slots(self.schema, slots.clone());
                let allowed = follow.contains(following.token_type())
                    && probe.legal_values(index + 1)?.allows(&following);
                if !allowed {
                    // new entries open a gap in front of existing tokens;
                    // replacing a token must keep its successor valid
                    if !was_pending {
                        return Err(invalid());
                    }
                    slots.insert(index + 1, Slot::pending(follow));
                }
            }
        }

        debug!("resolved slot {index} to {token_type} '{name}'");
        self.slots = slots;
        Ok(())
    }

    /// Resolve a value slot from the text typed into it.
    pub fn commit_value(&mut self, index: usize) -> Result<(), EditError> {
        let text = self.slot(index)?.text().to_string();
        self.resolve(index, &text, TokenType::Value)
    }

    /// Replace the text of a value slot. The text must keep its quotes.
    ///
    /// # Errors
    ///
    /// `ProtectedDeletion` if the edit drops a quote delimiter,
    /// `InvalidSelection` if the slot does not hold a value.
    pub fn edit_value(&mut self, index: usize, text: &str) -> Result<(), EditError> {
        let slot = self.slot(index)?;
        if !slot.is_value_slot() {
            return Err(EditError::InvalidSelection {
                index,
                name: text.to_string(),
                token_type: TokenType::Value,
            });
        }
        if !is_quoted(text) {
            return Err(EditError::ProtectedDeletion { index });
        }

        match &mut self.slots[index] {
            Slot::Pending { text: current, .. } => *current = text.to_string(),
            Slot::Resolved { token } => *token = Token::Value(text.to_string()),
        }
        Ok(())
    }

    /// Insert `(`, an empty slot and `)` at `index`.
    ///
    /// Returns the index of the empty slot, where editing continues.
    ///
    /// # Errors
    ///
    /// `InvalidSelection` when a group may not start at `index` or the
    /// resolved slot after it may not follow `)`.
    pub fn insert_group(&mut self, index: usize) -> Result<usize, EditError> {
        if index > self.slots.len() {
            return Err(EditError::SlotOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        let invalid = || EditError::InvalidSelection {
            index,
            name: GroupBracket::Open.as_str().to_string(),
            token_type: TokenType::Group,
        };

        let mut slots = self.slots.clone();
        slots.splice(
            index..index,
            [
                Slot::resolved(Token::Group(GroupBracket::Open)),
                Slot::pending(INITIAL_TYPES),
                Slot::resolved(Token::Group(GroupBracket::Close)),
            ],
        );

        let after_close = next_legal_types(TokenType::Group);
        match slots.get_mut(index + 3) {
            Some(pending @ Slot::Pending { .. }) => reseed(pending, after_close),
            Some(Slot::Resolved { token }) if !after_close.contains(token.token_type()) => {
                return Err(invalid());
            }
            _ => {}
        }

        let probe = TokenSequence::from_slots(self.schema, slots);
        let open = Token::Group(GroupBracket::Open);
        if !probe.candidate_types(index)?.contains(TokenType::Group)
            || !probe.legal_values(index)?.allows(&open)
        {
            return Err(invalid());
        }
        if let Some(Slot::Resolved { token }) = probe.slots.get(index + 3) {
            if !probe.legal_values(index + 3)?.allows(token) {
                return Err(invalid());
            }
        }

        debug!("inserted group at slot {index}");
        self.slots = probe.slots;
        Ok(index + 1)
    }

    /// Remove the slot at `index`.
    ///
    /// # Errors
    ///
    /// `ProtectedDeletion` for a value slot that still has content; its
    /// quotes are structural and go only with the whole slot.
    pub fn delete_slot(&mut self, index: usize) -> Result<(), EditError> {
        let slot = self.slot(index)?;
        if slot.is_value_slot() && !(slot.text().is_empty() || slot.text() == EMPTY_VALUE) {
            return Err(EditError::ProtectedDeletion { index });
        }

        self.slots.remove(index);
        if self.slots.is_empty() {
            self.slots.push(Slot::pending(INITIAL_TYPES));
        } else if index < self.slots.len() {
            let follow = self.types_after(index);
            if let pending @ Slot::Pending { .. } = &mut self.slots[index] {
                reseed(pending, follow);
            }
        }

        debug!("deleted slot {index}");
        Ok(())
    }

    /// Check the whole sequence. Empty iff it can be handed to the parser.
    pub fn validate(&self) -> Vec<Violation> {
        validate::validate(self.schema, &self.slots)
    }

    /// Validate, then parse the resolved tokens into a rule group.
    ///
    /// # Errors
    ///
    /// `EditError::Invalid` with the violations; the parser is not run.
    pub fn to_rule_group(&self) -> Result<RuleGroup, EditError> {
        let violations = self.validate();
        if !violations.is_empty() {
            return Err(EditError::Invalid(violations));
        }
        Ok(parser::parse(&self.tokens()))
    }

    /// Types that may follow the nearest resolved slot before `index`.
    fn types_after(&self, index: usize) -> TypeSet {
        self.slots[..index]
            .iter()
            .rev()
            .find_map(Slot::token)
            .map_or(INITIAL_TYPES, |token| next_legal_types(token.token_type()))
    }
}

/// Give a pending slot a new candidate set. Typed text survives unless the
/// slot switches between value and non-value.
fn reseed(slot: &mut Slot, candidates: TypeSet) {
    if let Slot::Pending {
        candidates: current,
        text,
    } = slot
    {
        let was_value = *current == TypeSet::single(TokenType::Value);
        let is_value = candidates == TypeSet::single(TokenType::Value);
        if was_value != is_value {
            *text = initial_text(candidates);
        }
        *current = candidates;
    }
}
