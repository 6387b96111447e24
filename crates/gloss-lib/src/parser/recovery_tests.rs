use crate::diagnostics::{DiagnosticKind, text_range};
use crate::parser::Parser;
use crate::test_utils::*;

fn kinds(tree: &crate::Tree) -> Vec<DiagnosticKind> {
    tree.diagnostics().iter().map(|d| d.kind()).collect()
}

#[test]
fn missing_operand_keeps_left_side() {
    let table = compile_ok(&calc_grammar());
    let tree = parse_ok(&table, "1+");

    insta::assert_snapshot!(tree.to_sexp(), @r#"
    (expr
      (expr
        (NUMBER "1"))
      (ERROR "+"))
    "#);
    assert_eq!(tree.root_node().byte_range(), 0..2);
    assert!(tree.is_complete());
    assert_covers(&tree);
}

#[test]
fn error_node_is_a_fragile_extra() {
    let table = compile_ok(&calc_grammar());
    let tree = parse_ok(&table, "1+");

    let error = tree
        .root_subtree()
        .children()
        .iter()
        .find(|c| c.is_error())
        .unwrap();
    assert!(error.is_extra());
    assert!(error.is_fragile());
    assert!(error.error_cost() > 0);
    assert!(tree.root_subtree().has_error());
}

#[test]
fn skipped_token_and_unwound_keyword() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, "let = 1;");

    insta::assert_snapshot!(tree.to_sexp(), @r#"
    (source_file
      (ERROR "let =")
      (source_file
        (expression_statement
          (number "1"))))
    "#);
    assert_eq!(kinds(&tree), vec![DiagnosticKind::UnexpectedToken]);
    assert_covers(&tree);
}

#[test]
fn unwound_input_is_pointed_at() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, "let = 1;");

    let lines: Vec<String> = tree.diagnostics().iter().map(|d| d.to_string()).collect();
    insta::assert_snapshot!(lines.join("\n"), @"error at 4..5: unexpected `=` (related: discarded while recovering at 0..3)");
}

#[test]
fn unrecognized_bytes() {
    let table = compile_ok(&calc_grammar());
    let tree = parse_ok(&table, "1 @ 2");

    insta::assert_snapshot!(tree.to_sexp(), @r#"
    (expr
      (ERROR
        (NUMBER "1")
        (ERROR "@"))
      (expr
        (NUMBER "2")))
    "#);

    let diagnostics: Vec<_> = tree.diagnostics().iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), DiagnosticKind::UnrecognizedInput);
    assert_eq!(diagnostics[0].range(), text_range(2..3));
    assert_eq!(diagnostics[0].message(), "unrecognized input `@`");
}

#[test]
fn empty_input_without_empty_rule() {
    let table = compile_ok(&calc_grammar());
    let tree = parse_ok(&table, "");

    assert_eq!(tree.to_sexp(), "(ERROR)");
    let diagnostics: Vec<_> = tree.diagnostics().iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), DiagnosticKind::MissingInput);
    assert_eq!(diagnostics[0].message(), "expected NUMBER");
}

#[test]
fn lone_operator_gives_up_token_by_token() {
    let table = compile_ok(&calc_grammar());
    let tree = parse_ok(&table, "+");

    insta::assert_snapshot!(tree.to_sexp(), @r#"
    (ERROR
      (ERROR "+"))
    "#);
    assert_eq!(
        kinds(&tree),
        vec![DiagnosticKind::UnexpectedToken, DiagnosticKind::MissingInput]
    );
    assert_covers(&tree);
}

#[test]
fn zero_recovery_budget_wraps_everything() {
    let table = compile_ok(&calc_grammar());
    let mut parser = Parser::builder(table.clone()).max_recovery_cost(0).build();
    let tree = parser.parse("1+", None).unwrap();

    insta::assert_snapshot!(tree.to_sexp(), @r#"
    (ERROR
      (expr
        (NUMBER "1")))
    "#);
    assert!(tree.diagnostics().has_kind(DiagnosticKind::MissingInput));
    assert_covers(&tree);
}

#[test]
fn later_statements_survive() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, "let x = 1 1;\nlet y = 2;");

    let root = tree.root_node();
    assert!(root.has_error());
    let source = root.to_sexp();
    assert!(source.contains(r#"name: (identifier "y")"#), "{source}");
    assert!(source.contains(r#"value: (number "2")"#), "{source}");
    assert_covers(&tree);
}

#[test]
fn garbage_terminates() {
    let table = compile_ok(&gloss_grammar());
    let inputs = [
        "))))",
        "let let let",
        "{ { { ",
        "\"unterminated",
        "f(,,,);",
        "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20",
        "}}}}}}{{{{",
        "a +* b ;; ) ( let = = =",
    ];
    for input in inputs {
        let tree = parse_ok(&table, input);
        assert!(tree.is_complete(), "{input}");
        assert!(tree.root_node().has_error(), "{input}");
        assert!(tree.diagnostics().has_errors(), "{input}");
        assert_covers(&tree);
    }
}

#[test]
fn tight_skip_limit_still_terminates() {
    let table = compile_ok(&gloss_grammar());
    let mut parser = Parser::builder(table.clone()).max_skip(0).build();
    let tree = parser.parse("let = = = 1;", None).unwrap();

    assert!(tree.root_node().has_error());
    assert_covers(&tree);
}

#[test]
fn errors_do_not_leak_into_clean_siblings() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, "a;\n)\nb;");

    let statements: Vec<_> = tree
        .root_node()
        .named_children()
        .into_iter()
        .filter(|n| n.kind() == "expression_statement")
        .collect();
    assert!(!statements.is_empty());
    assert!(statements.iter().all(|s| !s.has_error()));
}
