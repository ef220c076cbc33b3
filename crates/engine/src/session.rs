/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Editor session: one token sequence plus the focused slot, driven by
 * intents from whatever renders it.
 */

use log::debug;

use crate::ast::RuleGroup;
use crate::error::EditError;
use crate::grammar::TokenType;
use crate::schema::Schema;
use crate::sequence::{quote, TokenSequence};
use crate::suggest::Suggestion;

/// An editing action, already decoded from raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Focus(usize),
    MoveLeft,
    MoveRight,
    /// Take entry `choice` of the list `suggestions(partial)` returns.
    Accept { choice: usize, partial: String },
    Select { name: String, token_type: TokenType },
    /// Put `text` into the focused value slot and commit it.
    CommitValue(String),
    /// Replace the focused value slot's quoted text without committing.
    EditValue(String),
    InsertGroup,
    Delete,
}

#[derive(Debug, Clone)]
pub struct EditorSession<'s> {
    sequence: TokenSequence<'s>,
    focus: usize,
}

impl<'s> EditorSession<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            sequence: TokenSequence::new(schema),
            focus: 0,
        }
    }

    pub fn sequence(&self) -> &TokenSequence<'s> {
        &self.sequence
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Suggestions for the focused slot. Recomputed on every call.
    pub fn suggestions(&self, partial: &str) -> Result<Vec<Suggestion>, EditError> {
        self.sequence.suggest(self.focus, partial)
    }

    /// Apply one intent and return the new focus.
    ///
    /// # Errors
    ///
    /// Any `EditError` from the underlying sequence operation. Neither the
    /// sequence nor the focus change on error.
    pub fn apply(&mut self, intent: Intent) -> Result<usize, EditError> {
        debug!("intent {intent:?} at slot {}", self.focus);
        let focus = self.focus;
        self.focus = match intent {
            Intent::Focus(index) => {
                self.sequence.slot(index)?;
                index
            }
            Intent::MoveLeft => focus.saturating_sub(1),
            Intent::MoveRight => (focus + 1).min(self.last_index()),
            Intent::Accept { choice, partial } => {
                let suggestions = self.suggestions(&partial)?;
                let picked = suggestions
                    .get(choice)
                    .ok_or(EditError::SuggestionOutOfRange {
                        index: focus,
                        choice,
                        len: suggestions.len(),
                    })?;
                self.sequence.resolve(focus, &picked.name, picked.token_type)?;
                focus + 1
            }
            Intent::Select { name, token_type } => {
                self.sequence.resolve(focus, &name, token_type)?;
                focus + 1
            }
            Intent::CommitValue(text) => {
                let mut staged = self.sequence.clone();
                staged.edit_value(focus, &quote(&text))?;
                staged.commit_value(focus)?;
                self.sequence = staged;
                focus + 1
            }
            Intent::EditValue(text) => {
                self.sequence.edit_value(focus, &text)?;
                focus
            }
            Intent::InsertGroup => self.sequence.insert_group(focus)?,
            Intent::Delete => {
                self.sequence.delete_slot(focus)?;
                focus.saturating_sub(1).min(self.last_index())
            }
        };
        Ok(self.focus)
    }

    /// Validate and parse the current sequence.
    pub fn finish(&self) -> Result<RuleGroup, EditError> {
        self.sequence.to_rule_group()
    }

    fn last_index(&self) -> usize {
        self.sequence.len().saturating_sub(1)
    }
}
