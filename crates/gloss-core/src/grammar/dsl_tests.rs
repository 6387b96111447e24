use super::dsl::*;
use super::*;

#[test]
fn optional_is_choice_with_blank() {
    assert_eq!(optional(lit("a")), Rule::Choice(vec![lit("a"), Rule::Blank]));
}

#[test]
fn comma_sep1_shape() {
    let rule = comma_sep1(sym("x"));
    let expected = Rule::Seq(vec![
        sym("x"),
        Rule::Repeat(Box::new(Rule::Seq(vec![lit(","), sym("x")]))),
    ]);
    assert_eq!(rule, expected);
}

#[test]
fn precedence_from_int_and_name() {
    assert!(matches!(
        prec(3, lit("a")),
        Rule::Prec {
            value: Precedence::Integer(3),
            ..
        }
    ));
    assert!(matches!(
        prec_right("assign", lit("a")),
        Rule::PrecRight { value: Precedence::Name(n), .. } if n == "assign"
    ));
}

#[test]
fn builder_keeps_declaration_order() {
    let grammar = GrammarBuilder::new("g")
        .rule("start", sym("b"))
        .rule("b", lit("b"))
        .inline("b")
        .supertype("start")
        .word("b")
        .external(sym("heredoc"))
        .build();

    assert_eq!(grammar.start_rule(), Some("start"));
    assert_eq!(grammar.inline, ["b"]);
    assert_eq!(grammar.supertypes, ["start"]);
    assert_eq!(grammar.word.as_deref(), Some("b"));
    assert_eq!(grammar.externals, [sym("heredoc")]);
    assert_eq!(grammar.rule("b"), Some(&lit("b")));
}

#[test]
fn lexical_rules() {
    assert!(lit("x").is_lexical());
    assert!(pattern("x+").is_lexical());
    assert!(token(seq([lit("//"), pattern(".*")])).is_lexical());
    assert!(prec(2, pattern("[0-9]+")).is_lexical());
    assert!(!seq([lit("a"), lit("b")]).is_lexical());
    assert!(!sym("x").is_lexical());
    assert!(!choice([lit("true"), lit("false")]).is_lexical());
}

#[test]
fn wrappers_expose_their_content() {
    let rule = field("left", prec_left(1, lit("a")));

    assert_eq!(rule.kind(), "FIELD");
    let inner = rule.content().unwrap();
    assert_eq!(inner.kind(), "PREC_LEFT");
    assert_eq!(inner.content(), Some(&lit("a")));
    assert!(inner.is_lexical());
    assert!(!rule.is_lexical());
    assert_eq!(seq([lit("a")]).content(), None);
}
