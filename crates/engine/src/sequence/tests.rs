//! Editing tests for the token sequence

use serde_json::json;

use crate::error::EditError;
use crate::grammar::{next_legal_types, TokenType, TypeSet, INITIAL_TYPES};
use crate::schema::{Combinator, GroupBracket, Schema};
use crate::sequence::{Slot, Token, TokenSequence, Violation};

fn names(sequence: &TokenSequence<'_>, index: usize) -> Vec<String> {
    sequence
        .suggest(index, "")
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect()
}

/// `text contains "abc"` followed by an empty slot.
fn text_contains_abc(schema: &Schema) -> TokenSequence<'_> {
    let mut seq = TokenSequence::new(schema);
    seq.resolve(0, "text", TokenType::Field).unwrap();
    seq.resolve(1, "contains", TokenType::Operator).unwrap();
    seq.resolve(2, "abc", TokenType::Value).unwrap();
    seq
}

#[test]
fn test_new_sequence_has_initial_slot() {
    let schema = Schema::default_schema();
    let seq = TokenSequence::new(&schema);
    assert_eq!(seq.len(), 1);
    assert_eq!(seq.candidate_types(0).unwrap(), INITIAL_TYPES);
    assert!(seq.validate().is_empty());
}

#[test]
fn test_resolve_appends_follower() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "text", TokenType::Field).unwrap();
    assert_eq!(seq.len(), 2);
    assert!(matches!(seq.slot(1).unwrap(), Slot::Pending { .. }));
    assert_eq!(
        seq.candidate_types(1).unwrap(),
        TypeSet::single(TokenType::Operator)
    );
}

#[test]
fn test_resolve_rejects_stale_selection() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "text", TokenType::Field).unwrap();
    let before = seq.clone();

    let err = seq.resolve(1, ">", TokenType::Operator).unwrap_err();
    assert_eq!(
        err,
        EditError::InvalidSelection {
            index: 1,
            name: ">".to_string(),
            token_type: TokenType::Operator
        }
    );
    assert_eq!(seq, before);

    let err = seq.resolve(0, "contains", TokenType::Operator).unwrap_err();
    assert!(matches!(err, EditError::InvalidSelection { index: 0, .. }));
    assert_eq!(seq, before);
}

#[test]
fn test_resolve_quotes_values() {
    let schema = Schema::default_schema();
    let seq = text_contains_abc(&schema);
    assert_eq!(seq.tokens()[2], Token::Value("\"abc\"".to_string()));

    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "classifier", TokenType::Field).unwrap();
    seq.resolve(1, "in", TokenType::Operator).unwrap();
    seq.resolve(2, "'news'", TokenType::Value).unwrap();
    assert_eq!(seq.tokens()[2], Token::Value("'news'".to_string()));
}

#[test]
fn test_out_of_range() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);
    assert_eq!(
        seq.resolve(5, "text", TokenType::Field).unwrap_err(),
        EditError::SlotOutOfRange { index: 5, len: 1 }
    );
    assert!(matches!(
        seq.delete_slot(3),
        Err(EditError::SlotOutOfRange { index: 3, .. })
    ));
}

#[test]
fn test_group_editing_builds_nested_rule_groups() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);

    assert_eq!(seq.insert_group(0).unwrap(), 1);
    seq.resolve(1, "text", TokenType::Field).unwrap();
    // ')' cannot follow a field, so an operator slot opens in between
    assert_eq!(seq.len(), 5);
    assert_eq!(
        seq.candidate_types(2).unwrap(),
        TypeSet::single(TokenType::Operator)
    );
    seq.resolve(2, "contains", TokenType::Operator).unwrap();
    seq.edit_value(3, "\"abc\"").unwrap();
    seq.commit_value(3).unwrap();
    assert_eq!(seq.len(), 6);
    assert!(seq.validate().is_empty());

    seq.resolve(5, "AND", TokenType::Combinator).unwrap();
    assert_eq!(seq.insert_group(6).unwrap(), 7);
    seq.resolve(7, "created_date", TokenType::Field).unwrap();
    seq.resolve(8, ">", TokenType::Operator).unwrap();
    seq.edit_value(9, "\"2024-01-01\"").unwrap();
    seq.commit_value(9).unwrap();

    assert!(seq.validate().is_empty());
    let group = seq.to_rule_group().unwrap();
    assert_eq!(
        serde_json::to_value(&group).unwrap(),
        json!({
            "combinator": "AND",
            "rules": [
                {"combinator": "AND", "rules": [
                    {"field": "text", "operator": "contains", "value": "abc"}
                ]},
                {"combinator": "AND", "rules": [
                    {"field": "created_date", "operator": ">", "value": "2024-01-01"}
                ]}
            ]
        })
    );
}

#[test]
fn test_bracket_suggestions() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "(", TokenType::Group).unwrap();

    let after_open = names(&seq, 1);
    assert!(!after_open.contains(&"(".to_string()));
    assert!(after_open.contains(&")".to_string()));
    assert!(!after_open.contains(&"AND".to_string()));

    seq.resolve(1, ")", TokenType::Group).unwrap();
    let after_close = names(&seq, 2);
    assert_eq!(after_close, vec!["AND", "OR"]);
}

#[test]
fn test_operator_suggestions_follow_field_kind() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "created_date", TokenType::Field).unwrap();
    assert_eq!(names(&seq, 1), vec!["=", "!=", "<", ">", "<=", ">="]);

    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "text", TokenType::Field).unwrap();
    let operators = names(&seq, 1);
    assert_eq!(operators.len(), 8);
    assert!(!operators.contains(&">".to_string()));
}

#[test]
fn test_reselect_keeps_successor_valid() {
    let schema = Schema::default_schema();
    let mut seq = text_contains_abc(&schema);
    let before = seq.clone();

    // 'contains' cannot apply to a date field
    let err = seq.resolve(0, "created_date", TokenType::Field).unwrap_err();
    assert!(matches!(err, EditError::InvalidSelection { index: 0, .. }));
    assert_eq!(seq, before);

    seq.resolve(0, "classifier", TokenType::Field).unwrap();
    assert_eq!(seq.tokens()[0], Token::Field("classifier".to_string()));
    assert_eq!(seq.len(), before.len());
}

#[test]
fn test_value_quotes_are_protected() {
    let schema = Schema::default_schema();
    let mut seq = text_contains_abc(&schema);

    assert_eq!(
        seq.delete_slot(2).unwrap_err(),
        EditError::ProtectedDeletion { index: 2 }
    );
    assert_eq!(
        seq.edit_value(2, "\"abc").unwrap_err(),
        EditError::ProtectedDeletion { index: 2 }
    );
    assert_eq!(
        seq.edit_value(2, "abc\"").unwrap_err(),
        EditError::ProtectedDeletion { index: 2 }
    );

    seq.edit_value(2, "\"\"").unwrap();
    seq.delete_slot(2).unwrap();
    assert_eq!(seq.len(), 3);
    // the slot after the operator waits for a value again
    assert_eq!(
        seq.candidate_types(2).unwrap(),
        TypeSet::single(TokenType::Value)
    );
    assert_eq!(seq.slot(2).unwrap().text(), "\"\"");
}

#[test]
fn test_edit_value_rejects_non_value_slot() {
    let schema = Schema::default_schema();
    let mut seq = text_contains_abc(&schema);
    assert!(matches!(
        seq.edit_value(0, "\"x\""),
        Err(EditError::InvalidSelection { index: 0, .. })
    ));
}

#[test]
fn test_delete_reseeds_and_never_empties() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "text", TokenType::Field).unwrap();

    seq.delete_slot(0).unwrap();
    assert_eq!(seq.len(), 1);
    assert_eq!(seq.candidate_types(0).unwrap(), INITIAL_TYPES);

    seq.delete_slot(0).unwrap();
    assert_eq!(seq.len(), 1);
    assert_eq!(seq.candidate_types(0).unwrap(), INITIAL_TYPES);
}

#[test]
fn test_insert_group_rejected_where_value_expected() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "text", TokenType::Field).unwrap();
    seq.resolve(1, "contains", TokenType::Operator).unwrap();
    let before = seq.clone();

    assert!(matches!(
        seq.insert_group(2),
        Err(EditError::InvalidSelection {
            index: 2,
            token_type: TokenType::Group,
            ..
        })
    ));
    assert_eq!(seq, before);
}

#[test]
fn test_to_rule_group_requires_valid_sequence() {
    let schema = Schema::default_schema();
    let mut seq = TokenSequence::new(&schema);
    seq.resolve(0, "text", TokenType::Field).unwrap();
    seq.resolve(1, "contains", TokenType::Operator).unwrap();

    assert_eq!(
        seq.to_rule_group().unwrap_err(),
        EditError::Invalid(vec![Violation::IncompleteRule {
            index: 0,
            missing: TokenType::Value
        }])
    );
}

#[test]
fn test_validate_is_idempotent() {
    let schema = Schema::default_schema();
    let seq = TokenSequence::from_slots(
        &schema,
        vec![
            Slot::resolved(Token::Group(GroupBracket::Open)),
            Slot::resolved(Token::Combinator(Combinator::Or)),
            Slot::resolved(Token::Field("created_date".to_string())),
            Slot::resolved(Token::Operator("in".to_string())),
        ],
    );
    let first = seq.validate();
    assert!(!first.is_empty());
    assert_eq!(first, seq.validate());
}

/// Walk the editor by always picking some offered suggestion. Every state
/// reached may be unfinished but never structurally wrong.
#[test]
fn test_edits_through_suggestions_stay_well_formed() {
    let schema = Schema::default_schema();
    for seed in 0..24usize {
        let mut seq = TokenSequence::new(&schema);
        for step in 0..30usize {
            let index = seq.len() - 1;
            let candidates = seq.candidate_types(index).unwrap();
            if candidates == TypeSet::single(TokenType::Value) {
                seq.resolve(index, "v", TokenType::Value).unwrap();
            } else {
                let suggestions = seq.suggest(index, "").unwrap();
                assert!(!suggestions.is_empty(), "no suggestions at {index}");
                let pick = &suggestions[(seed * 7 + step * 3) % suggestions.len()];
                seq.resolve(index, &pick.name, pick.token_type).unwrap();
                assert_eq!(
                    seq.candidate_types(index + 1).unwrap(),
                    next_legal_types(pick.token_type)
                );
            }

            // now and then swap an earlier combinator for another offered one
            if step % 5 == 4 {
                let combinators: Vec<usize> = (0..seq.len())
                    .filter(|&i| matches!(seq.slot(i).unwrap().token(), Some(Token::Combinator(_))))
                    .collect();
                if !combinators.is_empty() {
                    let at = combinators[(seed + step) % combinators.len()];
                    let offered: Vec<_> = seq
                        .suggest(at, "")
                        .unwrap()
                        .into_iter()
                        .filter(|s| s.token_type == TokenType::Combinator)
                        .collect();
                    assert!(!offered.is_empty(), "no combinator offered at {at}");
                    let pick = &offered[(seed + step) % offered.len()];
                    seq.resolve(at, &pick.name, pick.token_type).unwrap();
                }
            }

            for violation in seq.validate() {
                assert!(
                    matches!(
                        violation,
                        Violation::IncompleteRule { .. }
                            | Violation::DanglingCombinator { .. }
                            | Violation::UnbalancedGroup {
                                bracket: GroupBracket::Open,
                                ..
                            }
                    ),
                    "seed {seed} step {step}: {violation}"
                );
            }
        }
    }
}

#[test]
fn test_reselected_combinator_must_match_its_group() {
    let schema = Schema::default_schema();
    let mut seq =
        crate::parser::text::build_sequence(&schema, "text in a AND text in b AND text in c")
            .unwrap();

    // the later AND fixes the scope, so the first one cannot become OR
    assert_eq!(names(&seq, 3), vec!["AND"]);
    assert!(matches!(
        seq.resolve(3, "OR", TokenType::Combinator),
        Err(EditError::InvalidSelection { index: 3, .. })
    ));
    assert!(seq.validate().is_empty());

    // a nested group keeps its own combinator
    let mut nested =
        crate::parser::text::build_sequence(&schema, "text in a AND (text in b OR text in c)")
            .unwrap();
    assert_eq!(names(&nested, 3), vec!["AND", "OR"]);
    assert_eq!(names(&nested, 8), vec!["AND", "OR"]);
    nested.resolve(8, "AND", TokenType::Combinator).unwrap();
    assert!(nested.validate().is_empty());
}
