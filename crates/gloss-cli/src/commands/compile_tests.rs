use super::compile::{conflict_notes, summary};
use super::test_utils::*;

#[test]
fn summary_names_the_grammar() {
    let table = table(CALC_JSON);
    let text = summary(&table);

    assert!(text.starts_with("calc ("), "{text}");
    assert!(text.contains(&format!("{} symbols", table.symbol_count())));
    assert!(text.contains(&format!("{} states", table.state_count())));
}

#[test]
fn unambiguous_grammar_has_no_notes() {
    assert_eq!(conflict_notes(&table(CALC_JSON)), "");
}

#[test]
fn declared_conflicts_are_noted() {
    let notes = conflict_notes(&table(PAIRS_JSON));

    assert!(notes.starts_with("note: declared conflict ["), "{notes}");
    assert!(notes.contains("reduce s/2"), "{notes}");
    assert!(notes.contains(" | "), "{notes}");
}

#[test]
fn grammar_errors_surface_through_the_library() {
    let err = gloss_lib::compile_grammar(r#"{ "name": "x", "rules": {} }"#).unwrap_err();
    assert!(matches!(err, gloss_lib::Error::Load(_)), "{err}");
    assert!(err.to_string().contains("defines no rules"), "{err}");
}
