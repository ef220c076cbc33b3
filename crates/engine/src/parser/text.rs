/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Free-text front end. Splits a typed query into lexemes and feeds them
 * through the same resolve path the slot editor uses.
 */

use std::sync::OnceLock;

use log::trace;
use regex::Regex;
use serde::Serialize;
use strsim::levenshtein;

use crate::ast::RuleGroup;
use crate::error::TextError;
use crate::grammar::{TokenType, TypeSet};
use crate::schema::{Combinator, GroupBracket, Schema};
use crate::sequence::{is_quoted, TokenSequence};
use crate::suggest::{suggest_matching, MatchKey, Suggestion};

/// Lexical class of a word, as far as it can be told without context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LexemeKind {
    Bracket,
    Field,
    Operator,
    Combinator,
    Value,
    Invalid,
}

impl LexemeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LexemeKind::Bracket => "bracket",
            LexemeKind::Field => "field",
            LexemeKind::Operator => "operator",
            LexemeKind::Combinator => "combinator",
            LexemeKind::Value => "value",
            LexemeKind::Invalid => "invalid",
        }
    }
}

/// One word of query text with its byte span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lexeme {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub kind: LexemeKind,
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[()]|"[^"]*"|'[^']*'|[^\s()]+"#).expect("token pattern is a valid regex")
    })
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is a valid regex"))
}

/// Split `text` into classified lexemes.
pub fn lex(schema: &Schema, text: &str) -> Vec<Lexeme> {
    token_pattern()
        .find_iter(text)
        .map(|m| Lexeme {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            kind: classify(schema, m.as_str()),
        })
        .collect()
}

fn classify(schema: &Schema, word: &str) -> LexemeKind {
    if GroupBracket::parse(word).is_some() {
        LexemeKind::Bracket
    } else if is_quoted(word) || date_pattern().is_match(word) {
        LexemeKind::Value
    } else if Combinator::parse(word).is_some() {
        LexemeKind::Combinator
    } else if schema.field(&word.to_lowercase()).is_some() {
        LexemeKind::Field
    } else if schema.operator(word).is_some() {
        LexemeKind::Operator
    } else {
        LexemeKind::Invalid
    }
}

/// Resolve every lexeme of `text` into a token sequence.
///
/// A slot waiting for a value takes any word; bare words are quoted.
///
/// # Errors
///
/// `TextError::UnexpectedToken` at the first word that cannot go where it
/// stands, with the closest legal name as a hint.
pub fn build_sequence<'s>(schema: &'s Schema, text: &str) -> Result<TokenSequence<'s>, TextError> {
    let lexemes = lex(schema, text);
    let mut sequence = TokenSequence::new(schema);
    for (index, lexeme) in lexemes.iter().enumerate() {
        push_lexeme(&mut sequence, index, lexeme)?;
    }
    Ok(sequence)
}

fn push_lexeme(
    sequence: &mut TokenSequence<'_>,
    index: usize,
    lexeme: &Lexeme,
) -> Result<(), TextError> {
    let candidates = sequence.candidate_types(index)?;
    let (name, token_type) = if candidates == TypeSet::single(TokenType::Value)
        && lexeme.kind != LexemeKind::Bracket
    {
        (lexeme.text.clone(), TokenType::Value)
    } else {
        match lexeme.kind {
            LexemeKind::Bracket => (lexeme.text.clone(), TokenType::Group),
            LexemeKind::Combinator => (lexeme.text.to_uppercase(), TokenType::Combinator),
            LexemeKind::Field => (lexeme.text.to_lowercase(), TokenType::Field),
            LexemeKind::Operator => (lexeme.text.clone(), TokenType::Operator),
            LexemeKind::Value => (lexeme.text.clone(), TokenType::Value),
            LexemeKind::Invalid => return Err(unexpected(sequence, index, lexeme)),
        }
    };

    trace!("lexeme '{}' -> {token_type} at slot {index}", lexeme.text);
    sequence
        .resolve(index, &name, token_type)
        .map_err(|_| unexpected(sequence, index, lexeme))
}

fn unexpected(sequence: &TokenSequence<'_>, index: usize, lexeme: &Lexeme) -> TextError {
    let expected = sequence
        .legal_values(index)
        .map(|legal| legal.types())
        .unwrap_or(TypeSet::EMPTY);
    let hint = sequence
        .suggest(index, "")
        .ok()
        .and_then(|suggestions| closest_name(&lexeme.text, &suggestions));
    TextError::UnexpectedToken {
        position: lexeme.start,
        text: lexeme.text.clone(),
        expected,
        hint,
    }
}

fn closest_name(word: &str, suggestions: &[Suggestion]) -> Option<String> {
    let word = word.to_lowercase();
    suggestions
        .iter()
        .map(|s| (s, levenshtein(&word, &s.name.to_lowercase())))
        .filter(|(s, distance)| *distance > 0 && *distance <= word.len().max(s.name.len()) / 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(s, _)| s.name.clone())
}

/// Build, validate and parse a query typed as text.
///
/// # Errors
///
/// `TextError::UnexpectedToken` for a misplaced word, or
/// `TextError::Edit(EditError::Invalid)` when the finished query breaks a
/// sequence rule such as an unclosed bracket.
pub fn parse_query(schema: &Schema, text: &str) -> Result<RuleGroup, TextError> {
    let sequence = build_sequence(schema, text)?;
    Ok(sequence.to_rule_group()?)
}

/// Completion candidates at the end of `text`.
///
/// The last word is treated as a partial entry unless the text ends in
/// whitespace or the word is a bracket or a closed quote.
///
/// # Errors
///
/// `TextError::UnexpectedToken` if the words before the partial one do not
/// form a valid prefix.
pub fn complete(schema: &Schema, text: &str) -> Result<Vec<Suggestion>, TextError> {
    let mut lexemes = lex(schema, text);
    let ends_open = !text.ends_with(char::is_whitespace);
    let partial = match lexemes.last() {
        Some(last)
            if ends_open
                && last.end == text.len()
                && last.kind != LexemeKind::Bracket
                && !is_quoted(&last.text) =>
        {
            lexemes.pop().map(|l| l.text).unwrap_or_default()
        }
        _ => String::new(),
    };

    let mut sequence = TokenSequence::new(schema);
    for (index, lexeme) in lexemes.iter().enumerate() {
        push_lexeme(&mut sequence, index, lexeme)?;
    }
    Ok(suggest_matching(
        &sequence,
        lexemes.len(),
        &partial,
        MatchKey::LabelOrName,
    )?)
}
