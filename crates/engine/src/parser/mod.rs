/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Recursive-descent parser folding resolved tokens into a rule-group AST.
 * The free-text front end lives in `text`.
 */

pub mod text;

use log::debug;

use crate::ast::{Rule, RuleGroup};
use crate::schema::{Combinator, GroupBracket};
use crate::sequence::Token;

/// Parse resolved tokens into a rule group.
///
/// The parser is permissive: incomplete rules are dropped, groups without
/// rules are left out, an unterminated group is returned as built so far,
/// and a stray top-level `)` ends the parse. Run
/// [`TokenSequence::validate`](crate::sequence::TokenSequence::validate)
/// first when that matters.
pub fn parse(tokens: &[Token]) -> RuleGroup {
    let mut parser = GroupParser { tokens, current: 0 };
    let group = parser.parse_group(Combinator::default());
    if !parser.is_at_end() {
        debug!(
            "ignoring {} token(s) after unmatched ')'",
            tokens.len() - parser.current
        );
    }
    group
}

struct GroupParser<'t> {
    tokens: &'t [Token],
    current: usize,
}

#[derive(Default)]
struct PendingRule {
    start: usize,
    field: Option<String>,
    operator: Option<String>,
    value: Option<String>,
}

impl PendingRule {
    fn take_complete(&mut self) -> Option<Rule> {
        if self.field.is_none() || self.operator.is_none() || self.value.is_none() {
            return None;
        }
        let pending = std::mem::take(self);
        Some(Rule {
            field: pending.field?.to_lowercase(),
            operator: pending.operator?,
            value: pending.value?,
        })
    }

    fn discard(&mut self) {
        if self.field.is_some() || self.operator.is_some() || self.value.is_some() {
            debug!("dropping incomplete rule starting at token {}", self.start);
            *self = PendingRule::default();
        }
    }
}

impl<'t> GroupParser<'t> {
    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.current);
        self.current += 1;
        token
    }

    /// Parse one bracket scope. Returns after consuming its `)` or at end of input.
    fn parse_group(&mut self, combinator: Combinator) -> RuleGroup {
        let mut group = RuleGroup::new(combinator);
        let mut pending = PendingRule::default();

        while let Some(token) = self.advance() {
            match token {
                Token::Group(GroupBracket::Open) => {
                    let child = self.parse_group(Combinator::default());
                    if child.is_empty() {
                        debug!("skipping empty group before token {}", self.current);
                    } else {
                        group.rules.push(child.into());
                    }
                }
                Token::Group(GroupBracket::Close) => {
                    pending.discard();
                    return group;
                }
                Token::Combinator(next) => {
                    pending.discard();
                    group.combinator = *next;
                }
                Token::Field(name) => {
                    pending.discard();
                    pending.start = self.current - 1;
                    pending.field = Some(name.clone());
                }
                Token::Operator(name) => pending.operator = Some(name.clone()),
                Token::Value(raw) => {
                    pending.value = Some(unquote(raw).to_string());
                    if let Some(rule) = pending.take_complete() {
                        group.rules.push(rule.into());
                    }
                }
            }
        }

        pending.discard();
        group
    }
}

/// Strip one matching pair of quote characters.
pub(crate) fn unquote(raw: &str) -> &str {
    if crate::sequence::is_quoted(raw) {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RuleNode;

    fn f(name: &str) -> Token {
        Token::Field(name.to_string())
    }

    fn op(name: &str) -> Token {
        Token::Operator(name.to_string())
    }

    fn v(text: &str) -> Token {
        Token::Value(format!("\"{text}\""))
    }

    const OPEN: Token = Token::Group(GroupBracket::Open);
    const CLOSE: Token = Token::Group(GroupBracket::Close);
    const AND: Token = Token::Combinator(Combinator::And);
    const OR: Token = Token::Combinator(Combinator::Or);

    fn expect_rule(node: &RuleNode) -> &Rule {
        match node {
            RuleNode::Rule(rule) => rule,
            RuleNode::Group(_) => panic!("Expected Rule"),
        }
    }

    fn expect_group(node: &RuleNode) -> &RuleGroup {
        match node {
            RuleNode::Group(group) => group,
            RuleNode::Rule(_) => panic!("Expected RuleGroup"),
        }
    }

    #[test]
    fn test_parse_single_rule() {
        let group = parse(&[f("text"), op("contains"), v("abc")]);
        assert_eq!(group.combinator, Combinator::And);
        assert_eq!(group.rules.len(), 1);
        let rule = expect_rule(&group.rules[0]);
        assert_eq!(rule.field, "text");
        assert_eq!(rule.operator, "contains");
        assert_eq!(rule.value, "abc");
    }

    #[test]
    fn test_parse_bracketed_rules_become_groups() {
        let group = parse(&[
            OPEN,
            f("text"),
            op("contains"),
            v("abc"),
            CLOSE,
            AND,
            OPEN,
            f("created_date"),
            op(">"),
            v("2024-01-01"),
            CLOSE,
        ]);
        assert_eq!(group.combinator, Combinator::And);
        assert_eq!(group.rules.len(), 2);

        let first = expect_group(&group.rules[0]);
        assert_eq!(first.combinator, Combinator::And);
        assert_eq!(expect_rule(&first.rules[0]).value, "abc");

        let second = expect_group(&group.rules[1]);
        let rule = expect_rule(&second.rules[0]);
        assert_eq!(rule.field, "created_date");
        assert_eq!(rule.operator, ">");
        assert_eq!(rule.value, "2024-01-01");
    }

    #[test]
    fn test_parse_combinator_is_scoped_per_group() {
        let group = parse(&[
            f("text"),
            op("in"),
            v("a"),
            AND,
            OPEN,
            f("text"),
            op("in"),
            v("b"),
            OR,
            f("text"),
            op("in"),
            v("c"),
            CLOSE,
        ]);
        assert_eq!(group.combinator, Combinator::And);
        assert_eq!(group.rules.len(), 2);
        let inner = expect_group(&group.rules[1]);
        assert_eq!(inner.combinator, Combinator::Or);
        assert_eq!(inner.rules.len(), 2);
    }

    #[test]
    fn test_parse_continues_after_nested_group() {
        let group = parse(&[
            OPEN,
            OPEN,
            f("text"),
            op("in"),
            v("a"),
            CLOSE,
            OR,
            f("classifier"),
            op("in"),
            v("b"),
            CLOSE,
            AND,
            f("text"),
            op("in"),
            v("c"),
        ]);
        assert_eq!(group.rules.len(), 2);
        let outer = expect_group(&group.rules[0]);
        assert_eq!(outer.combinator, Combinator::Or);
        assert_eq!(outer.rules.len(), 2);
        assert_eq!(expect_rule(&group.rules[1]).value, "c");
    }

    #[test]
    fn test_parse_drops_incomplete_rules() {
        let group = parse(&[f("text"), op("in"), AND, f("text"), op("in"), v("a"), OR, f("text")]);
        assert_eq!(group.combinator, Combinator::Or);
        assert_eq!(group.rules.len(), 1);
        assert_eq!(expect_rule(&group.rules[0]).value, "a");
    }

    #[test]
    fn test_parse_unterminated_group_returns_partial() {
        let group = parse(&[OPEN, f("text"), op("in"), v("a")]);
        assert_eq!(group.rules.len(), 1);
        assert_eq!(expect_group(&group.rules[0]).rules.len(), 1);
    }

    #[test]
    fn test_parse_leading_combinator_only_sets_combinator() {
        let group = parse(&[OR, f("text"), op("in"), v("a")]);
        assert_eq!(group.combinator, Combinator::Or);
        assert_eq!(group.rules.len(), 1);
    }

    #[test]
    fn test_parse_lowercases_fields_and_unquotes_values() {
        let group = parse(&[f("Text"), op("in"), Token::Value("'single'".to_string())]);
        let rule = expect_rule(&group.rules[0]);
        assert_eq!(rule.field, "text");
        assert_eq!(rule.value, "single");
    }

    #[test]
    fn test_parse_leaves_out_empty_groups() {
        let group = parse(&[OPEN, CLOSE, AND, f("text"), op("in"), v("a")]);
        assert_eq!(group.rules.len(), 1);
        assert_eq!(expect_rule(&group.rules[0]).value, "a");

        // a group holding only empty groups is empty too
        assert!(parse(&[OPEN, OPEN, CLOSE, CLOSE]).is_empty());
    }

    #[test]
    fn test_parse_stops_at_unmatched_close() {
        let group = parse(&[f("text"), op("in"), v("a"), CLOSE, OR, f("text"), op("in"), v("b")]);
        assert_eq!(group.combinator, Combinator::And);
        assert_eq!(group.rules.len(), 1);
        assert_eq!(expect_rule(&group.rules[0]).value, "a");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse(&[]).is_empty());
    }
}
