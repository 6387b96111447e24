use indoc::indoc;

use super::*;

#[test]
fn parse_minimal_grammar() {
    let json = indoc! {r#"
        {
          "name": "calc",
          "rules": {
            "source_file": { "type": "SYMBOL", "name": "expression" },
            "expression": { "type": "STRING", "value": "x" }
          }
        }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(grammar.name, "calc");
    assert_eq!(grammar.rules.len(), 2);
    assert_eq!(grammar.start_rule(), Some("source_file"));
}

#[test]
fn parse_precedence_wrappers() {
    let json = indoc! {r#"
        {
          "name": "calc",
          "rules": {
            "sum": {
              "type": "PREC_LEFT",
              "value": 10,
              "content": {
                "type": "SEQ",
                "members": [
                  { "type": "SYMBOL", "name": "sum" },
                  { "type": "STRING", "value": "+" },
                  { "type": "SYMBOL", "name": "sum" }
                ]
              }
            },
            "named": {
              "type": "PREC",
              "value": "call",
              "content": { "type": "BLANK" }
            }
          }
        }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert!(matches!(
        grammar.rules[0].1,
        Rule::PrecLeft {
            value: Precedence::Integer(10),
            ..
        }
    ));
    assert!(matches!(
        &grammar.rules[1].1,
        Rule::Prec { value: Precedence::Name(name), .. } if name == "call"
    ));
}

#[test]
fn parse_extras_conflicts_and_reserved() {
    let json = indoc! {r#"
        {
          "name": "gloss",
          "extras": [
            { "type": "PATTERN", "value": "\\s" },
            { "type": "SYMBOL", "name": "comment" }
          ],
          "conflicts": [["statement", "expression"]],
          "reserved": {
            "global": [{ "type": "STRING", "value": "fn" }]
          },
          "rules": {
            "statement": { "type": "SYMBOL", "name": "expression" },
            "expression": { "type": "STRING", "value": "x" },
            "comment": {
              "type": "TOKEN",
              "content": {
                "type": "SEQ",
                "members": [
                  { "type": "STRING", "value": "//" },
                  { "type": "PATTERN", "value": ".*" }
                ]
              }
            }
          }
        }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(grammar.extras.len(), 2);
    assert_eq!(grammar.conflicts, vec![vec!["statement", "expression"]]);
    assert_eq!(grammar.reserved[0].0, "global");
    assert_eq!(grammar.reserved[0].1, vec![Rule::String("fn".into())]);
}

#[test]
fn preserves_rule_order() {
    let json = r#"{
        "name": "test",
        "rules": {
            "zebra": { "type": "BLANK" },
            "apple": { "type": "BLANK" },
            "mango": { "type": "BLANK" }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    let names: Vec<_> = grammar.rules.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["zebra", "apple", "mango"]);
}

#[test]
fn alias_and_field() {
    let json = r#"{
        "name": "test",
        "rules": {
            "pattern": {
                "type": "FIELD",
                "name": "wildcard",
                "content": {
                    "type": "ALIAS",
                    "content": { "type": "STRING", "value": "_" },
                    "value": "catch_all_pattern",
                    "named": true
                }
            }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    let Rule::Field { name, content } = &grammar.rules[0].1 else {
        panic!("expected field");
    };
    assert_eq!(name, "wildcard");
    assert!(matches!(**content, Rule::Alias { named: true, .. }));
}

#[test]
fn invalid_json_is_a_load_error() {
    let err = Grammar::from_json("{ not json").unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
    assert!(err.to_string().starts_with("grammar JSON parse error"));
}

#[test]
fn unknown_rule_type_is_rejected() {
    let json = r#"{ "name": "t", "rules": { "a": { "type": "LOOKAHEAD" } } }"#;
    let err = Grammar::from_json(json).unwrap_err();

    insta::assert_snapshot!(err, @"invalid grammar at `rules.a`: unknown rule type `LOOKAHEAD`");
}

#[test]
fn shape_errors_name_the_nested_path() {
    let json = indoc! {r#"
        {
          "name": "t",
          "rules": {
            "sum": {
              "type": "PREC_LEFT",
              "value": 1,
              "content": {
                "type": "SEQ",
                "members": [
                  { "type": "SYMBOL", "name": "sum" },
                  { "type": "STRING", "value": 43 }
                ]
              }
            }
          }
        }
    "#};
    let err = Grammar::from_json(json).unwrap_err();

    insta::assert_snapshot!(
        err,
        @"invalid grammar at `rules.sum.content.members[1]`: `value` should be a string, found a number"
    );
}

#[test]
fn missing_fields_and_bad_precedence() {
    let json = r#"{ "name": "t", "rules": { "a": { "type": "FIELD", "name": "x" } } }"#;
    let err = Grammar::from_json(json).unwrap_err();
    assert_eq!(err.to_string(), "invalid grammar at `rules.a`: missing `content`");

    let json = r#"{ "name": "t", "rules": { "a": { "type": "PREC", "value": true, "content": { "type": "BLANK" } } } }"#;
    let err = Grammar::from_json(json).unwrap_err();
    assert!(err.to_string().contains("an integer or a name"), "{err}");

    let json = r#"{ "name": "t", "rules": { "a": "STRING" } }"#;
    let err = Grammar::from_json(json).unwrap_err();
    assert!(err.to_string().ends_with("expected a rule object, found a string"), "{err}");
}

#[test]
fn extras_and_precedence_entries_are_checked() {
    let json = r#"{ "name": "t", "rules": { "a": { "type": "BLANK" } }, "extras": [{ "type": "SEQ" }] }"#;
    let err = Grammar::from_json(json).unwrap_err();
    assert!(err.to_string().starts_with("invalid grammar at `extras[0]`"), "{err}");

    let json = r#"{ "name": "t", "rules": { "a": { "type": "BLANK" } }, "precedences": [[{ "type": "BLANK" }]] }"#;
    let err = Grammar::from_json(json).unwrap_err();
    assert!(err.to_string().starts_with("invalid grammar at `precedences[0][0]`"), "{err}");
}

#[test]
fn grammar_without_rules_has_no_start() {
    let err = Grammar::from_json(r#"{ "name": "empty", "rules": {} }"#).unwrap_err();

    assert!(matches!(&err, LoadError::NoRules { grammar } if grammar == "empty"));
    insta::assert_snapshot!(err, @"grammar `empty` defines no rules, so it has no start rule");
}

#[test]
fn null_pattern_flags_and_named_precedence_entries() {
    let json = r#"{
        "name": "t",
        "rules": { "a": { "type": "PATTERN", "value": "x+", "flags": null } },
        "precedences": [[{ "type": "STRING", "value": "call" }, { "type": "SYMBOL", "name": "a" }]]
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(
        grammar.rules[0].1,
        Rule::Pattern {
            value: "x+".into(),
            flags: None
        }
    );
    assert_eq!(
        grammar.precedences,
        vec![vec![
            PrecedenceEntry::Name("call".into()),
            PrecedenceEntry::Symbol("a".into())
        ]]
    );
}
