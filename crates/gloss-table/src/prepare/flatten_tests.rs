use gloss_core::grammar::dsl::*;

use super::prepare;
use crate::Associativity;

fn shapes(grammar: &gloss_core::Grammar) -> Vec<String> {
    let prepared = prepare(grammar).unwrap();
    prepared
        .productions
        .iter()
        .map(|p| {
            let rhs: Vec<&str> = p
                .steps
                .iter()
                .map(|s| prepared.symbol_name(s.symbol))
                .collect();
            format!("{} -> {}", prepared.symbol_name(p.lhs), rhs.join(" "))
        })
        .collect()
}

#[test]
fn optional_and_choice_expand() {
    let grammar = GrammarBuilder::new("g")
        .rule(
            "call",
            seq([
                sym("name"),
                lit("("),
                optional(sym("name")),
                choice([lit(")"), lit("]")]),
            ]),
        )
        .rule("name", pattern("[a-z]+"))
        .build();

    insta::assert_snapshot!(shapes(&grammar).join("\n"), @r"
    call -> name ( name )
    call -> name ( name ]
    call -> name ( )
    call -> name ( ]
    ");
}

#[test]
fn repeat_content_is_shared() {
    let grammar = GrammarBuilder::new("g")
        .rule("a", seq([repeat(lit("x")), lit(";"), repeat(lit("x"))]))
        .build();

    insta::assert_snapshot!(shapes(&grammar).join("\n"), @r"
    a_repeat1 -> a_repeat1 x
    a_repeat1 -> x
    a -> a_repeat1 ; a_repeat1
    a -> a_repeat1 ;
    a -> ; a_repeat1
    a -> ;
    ");
}

#[test]
fn multi_step_alias_gets_its_own_rule() {
    let grammar = GrammarBuilder::new("g")
        .rule("a", alias(seq([lit("x"), lit("y")]), "pair"))
        .build();
    let prepared = prepare(&grammar).unwrap();

    insta::assert_snapshot!(shapes(&grammar).join("\n"), @r"
    a_alias1 -> x y
    a -> a_alias1
    ");
    let step = &prepared.productions[1].steps[0];
    assert_eq!(step.alias.as_ref().map(|a| a.name.as_str()), Some("pair"));
}

#[test]
fn precedence_and_associativity_annotate_every_step() {
    let grammar = GrammarBuilder::new("g")
        .rule(
            "e",
            choice([
                lit("n"),
                prec_right(3, seq([sym("e"), lit("^"), sym("e")])),
            ]),
        )
        .build();
    let prepared = prepare(&grammar).unwrap();

    let power = &prepared.productions[1];
    assert!(power.steps.iter().all(|s| s.precedence == Some(3)));
    assert!(power
        .steps
        .iter()
        .all(|s| s.associativity == Some(Associativity::Right)));
    assert_eq!(prepared.productions[0].steps[0].precedence, None);
}

#[test]
fn dynamic_precedence_marks_the_production() {
    let grammar = GrammarBuilder::new("g")
        .rule(
            "a",
            choice([prec_dynamic(-1, lit("x")), prec_dynamic(2, seq([lit("x"), lit("y")]))]),
        )
        .build();
    let prepared = prepare(&grammar).unwrap();

    let dynamic: Vec<i32> = prepared
        .productions
        .iter()
        .map(|p| p.dynamic_precedence)
        .collect();
    assert_eq!(dynamic, [-1, 2]);
}

#[test]
fn auxiliary_rules_map_to_their_origin() {
    let grammar = GrammarBuilder::new("g")
        .rule("list", repeat1(lit("x")))
        .build();
    let prepared = prepare(&grammar).unwrap();

    let list = prepared.start;
    let aux = prepared.productions[0].lhs;
    assert_ne!(aux, list);
    assert_eq!(prepared.origin(aux), list);
    assert_eq!(prepared.origin(list), list);
}

#[test]
fn hidden_rules() {
    let grammar = GrammarBuilder::new("g")
        .rule("program", seq([sym("_expr"), sym("stmt"), sym("value")]))
        .rule("_expr", seq([lit("a"), lit("b")]))
        .rule("stmt", seq([lit("c"), lit("d")]))
        .rule("value", seq([lit("e"), lit("f")]))
        .inline("stmt")
        .supertype("value")
        .build();
    let prepared = prepare(&grammar).unwrap();

    let visible: Vec<(&str, bool)> = prepared.symbols[prepared.terminal_count..]
        .iter()
        .map(|s| (s.name.as_str(), s.visible))
        .collect();
    assert_eq!(
        visible,
        [("program", true), ("_expr", false), ("stmt", false), ("value", false)]
    );
}
