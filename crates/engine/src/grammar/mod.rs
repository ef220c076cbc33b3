/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Grammar table: which token types may follow a resolved token.
 */

pub mod resolver;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token category a slot can be resolved to.
///
/// Declaration order is the order suggestions are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Field,
    Operator,
    Value,
    Combinator,
    Group,
}

impl TokenType {
    pub const ALL: [TokenType; 5] = [
        TokenType::Field,
        TokenType::Operator,
        TokenType::Value,
        TokenType::Combinator,
        TokenType::Group,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Field => "field",
            TokenType::Operator => "operator",
            TokenType::Value => "value",
            TokenType::Combinator => "combinator",
            TokenType::Group => "group",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small set of token types. Iterates in `TokenType` declaration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u8);

impl TypeSet {
    pub const EMPTY: TypeSet = TypeSet(0);

    pub fn of(types: &[TokenType]) -> Self {
        types.iter().copied().collect()
    }

    pub fn single(token_type: TokenType) -> Self {
        TypeSet(token_type.bit())
    }

    pub fn contains(self, token_type: TokenType) -> bool {
        self.0 & token_type.bit() != 0
    }

    pub fn insert(&mut self, token_type: TokenType) {
        self.0 |= token_type.bit();
    }

    pub fn remove(&mut self, token_type: TokenType) {
        self.0 &= !token_type.bit();
    }

    pub fn union(self, other: TypeSet) -> TypeSet {
        TypeSet(self.0 | other.0)
    }

    pub fn intersection(self, other: TypeSet) -> TypeSet {
        TypeSet(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = TokenType> {
        TokenType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<TokenType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TokenType>>(iter: I) -> Self {
        let mut set = TypeSet::EMPTY;
        for token_type in iter {
            set.insert(token_type);
        }
        set
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Comma separated, e.g. `field,group`.
impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(TokenType::as_str).collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for TypeSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for TypeSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let types = Vec::<TokenType>::deserialize(deserializer)?;
        Ok(types.into_iter().collect())
    }
}

/// Candidate types of the first slot of an expression.
pub const INITIAL_TYPES: TypeSet = TypeSet(1 << TokenType::Field as u8 | 1 << TokenType::Group as u8);

/// Types legal immediately after a token of the given type.
pub fn next_legal_types(token_type: TokenType) -> TypeSet {
    use TokenType::*;
    match token_type {
        Field => TypeSet::of(&[Operator]),
        Operator => TypeSet::of(&[Value]),
        Value => TypeSet::of(&[Combinator, Group]),
        Combinator => TypeSet::of(&[Field, Group]),
        Group => TypeSet::of(&[Field, Combinator, Group]),
    }
}
