/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Validity resolver: narrows the values legal within each candidate type of
 * a slot, using the slot's neighbours and the bracket balance.
 */

use crate::grammar::{TokenType, TypeSet};
use crate::schema::{Combinator, Field, GroupBracket, Operator, Schema};
use crate::sequence::{Slot, Token};

/// What the resolver needs to know about the slots around `index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotContext<'a> {
    /// Nearest resolved token before the slot.
    pub predecessor: Option<&'a Token>,
    /// Nearest preceding field in the slot's own bracket scope.
    pub scope_field: Option<&'a str>,
    /// Combinator already used in the slot's own bracket scope, on either
    /// side of the slot.
    pub scope_combinator: Option<Combinator>,
    pub open_before: usize,
    pub close_before: usize,
    /// Opens minus closes over every resolved slot except this one.
    pub unmatched_elsewhere: isize,
}

#[derive(Default)]
struct Scope<'a> {
    field: Option<&'a str>,
    combinator: Option<Combinator>,
}

impl<'a> SlotContext<'a> {
    pub fn at(slots: &'a [Slot], index: usize) -> Self {
        let mut context = SlotContext::default();
        let mut scopes = vec![Scope::default()];

        for slot in slots.iter().take(index) {
            let Some(token) = slot.token() else {
                continue;
            };
            context.predecessor = Some(token);
            match token {
                Token::Group(GroupBracket::Open) => {
                    context.open_before += 1;
                    scopes.push(Scope::default());
                }
                Token::Group(GroupBracket::Close) => {
                    context.close_before += 1;
                    if scopes.len() > 1 {
                        scopes.pop();
                    }
                }
                Token::Field(name) => {
                    if let Some(scope) = scopes.last_mut() {
                        scope.field = Some(name.as_str());
                    }
                }
                Token::Combinator(combinator) => {
                    if let Some(scope) = scopes.last_mut() {
                        scope.combinator.get_or_insert(*combinator);
                    }
                }
                Token::Operator(_) | Token::Value(_) => {}
            }
        }

        if let Some(scope) = scopes.last() {
            context.scope_field = scope.field;
            context.scope_combinator = scope.combinator;
        }
        if context.scope_combinator.is_none() {
            context.scope_combinator = combinator_after(slots, index);
        }

        context.unmatched_elsewhere = slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .filter_map(|(_, slot)| slot.token())
            .map(|token| match token {
                Token::Group(GroupBracket::Open) => 1,
                Token::Group(GroupBracket::Close) => -1,
                _ => 0,
            })
            .sum();

        context
    }

    fn predecessor_is(&self, predicate: impl Fn(&Token) -> bool) -> bool {
        self.predecessor.is_some_and(predicate)
    }
}

/// First combinator after `index` that belongs to the same bracket scope.
fn combinator_after(slots: &[Slot], index: usize) -> Option<Combinator> {
    let mut depth = 0usize;
    for token in slots.iter().skip(index + 1).filter_map(Slot::token) {
        match token {
            Token::Group(GroupBracket::Open) => depth += 1,
            Token::Group(GroupBracket::Close) => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            Token::Combinator(combinator) if depth == 0 => return Some(*combinator),
            _ => {}
        }
    }
    None
}

/// Values legal at one slot, per token type. Empty lists mean the type is
/// not available at this slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalValues<'s> {
    pub fields: Vec<&'s Field>,
    pub operators: Vec<&'s Operator>,
    pub value: bool,
    pub combinators: Vec<Combinator>,
    pub groups: Vec<GroupBracket>,
}

impl<'s> LegalValues<'s> {
    /// Types with at least one legal value.
    pub fn types(&self) -> TypeSet {
        let mut types = TypeSet::EMPTY;
        if !self.fields.is_empty() {
            types.insert(TokenType::Field);
        }
        if !self.operators.is_empty() {
            types.insert(TokenType::Operator);
        }
        if self.value {
            types.insert(TokenType::Value);
        }
        if !self.combinators.is_empty() {
            types.insert(TokenType::Combinator);
        }
        if !self.groups.is_empty() {
            types.insert(TokenType::Group);
        }
        types
    }

    pub fn allows(&self, token: &Token) -> bool {
        match token {
            Token::Field(name) => self.fields.iter().any(|f| &f.name == name),
            Token::Operator(name) => self.operators.iter().any(|op| &op.name == name),
            Token::Value(_) => self.value,
            Token::Combinator(combinator) => self.combinators.contains(combinator),
            Token::Group(bracket) => self.groups.contains(bracket),
        }
    }
}

/// Restrict each of `candidates` to the values legal in `context`.
pub fn legal_values<'s>(
    schema: &'s Schema,
    candidates: TypeSet,
    context: &SlotContext<'_>,
) -> LegalValues<'s> {
    let mut legal = LegalValues::default();
    let after_open = context.predecessor_is(|t| matches!(t, Token::Group(GroupBracket::Open)));
    let after_close = context.predecessor_is(|t| matches!(t, Token::Group(GroupBracket::Close)));

    if candidates.contains(TokenType::Field) && !after_close {
        legal.fields = schema.fields().iter().collect();
    }

    if candidates.contains(TokenType::Operator) {
        if let Some(field) = context.scope_field.and_then(|name| schema.field(name)) {
            legal.operators = schema.operators_for(field).collect();
        }
    }

    legal.value = candidates.contains(TokenType::Value);

    if candidates.contains(TokenType::Combinator) && context.predecessor.is_some() && !after_open {
        legal.combinators = match context.scope_combinator {
            Some(combinator) => vec![combinator],
            None => Combinator::ALL.to_vec(),
        };
    }

    if candidates.contains(TokenType::Group) {
        let open_blocked =
            context.predecessor_is(|t| matches!(t, Token::Group(_) | Token::Value(_)));
        if !open_blocked {
            legal.groups.push(GroupBracket::Open);
        }

        let has_unmatched = context.open_before > context.close_before
            && context.unmatched_elsewhere > 0;
        let after_combinator = context.predecessor_is(|t| matches!(t, Token::Combinator(_)));
        if has_unmatched && !after_combinator {
            legal.groups.push(GroupBracket::Close);
        }
    }

    legal
}
