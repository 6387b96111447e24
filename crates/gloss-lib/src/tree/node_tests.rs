use crate::test_utils::*;
use crate::tree::{Point, SyntaxNode, syntax_kind};

const SOURCE: &str = "let x = 1;\nfoo(x);";

#[test]
fn root_and_children() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, SOURCE);
    let root = tree.root_node();

    assert_eq!(root.kind(), "source_file");
    assert_eq!(root.byte_range(), 0..18);
    assert_eq!(root.child_count(), 2);
    assert!(root.parent().is_none());

    let declaration = root.child(0).unwrap();
    let kinds: Vec<&str> = declaration.children().iter().map(|c| c.kind()).collect();
    assert_eq!(kinds, vec!["let", "identifier", "=", "number", ";"]);

    let named: Vec<&str> = declaration.named_children().iter().map(|c| c.text()).collect();
    assert_eq!(named, vec!["x", "1"]);
    assert_eq!(declaration.named_child_count(), 2);
}

#[test]
fn siblings_and_parents() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, SOURCE);
    let root = tree.root_node();

    let declaration = root.child(0).unwrap();
    let statement = declaration.next_sibling().unwrap();
    assert_eq!(statement.kind(), "expression_statement");
    assert!(statement.next_sibling().is_none());
    assert_eq!(statement.prev_sibling().unwrap().kind(), "declaration");
    assert!(declaration.prev_sibling().is_none());

    let name = declaration.child(1).unwrap();
    assert_eq!(name.parent().unwrap().kind(), "declaration");
    assert_eq!(name.next_named_sibling().unwrap().text(), "1");
    assert!(name.prev_named_sibling().is_none());
    assert_eq!(name.next_sibling().unwrap().kind(), "=");
}

#[test]
fn positions() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, SOURCE);

    let statement = tree.root_node().child(1).unwrap();
    assert_eq!(statement.byte_range(), 11..18);
    assert_eq!(statement.start_position(), Point::new(1, 0));
    assert_eq!(statement.end_position(), Point::new(1, 7));
    assert_eq!(tree.root_node().end_position(), Point::new(1, 7));
    assert_eq!(format!("{statement:?}"), "expression_statement [11..18]");
}

#[test]
fn descendant_for_byte_range() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, SOURCE);
    let root = tree.root_node();

    let argument = root.descendant_for_byte_range(15, 16).unwrap();
    assert_eq!(argument.kind(), "identifier");
    assert_eq!(argument.parent().unwrap().kind(), "arguments");

    let paren = root.descendant_for_byte_range(14, 15).unwrap();
    assert_eq!(paren.kind(), "(");
    assert!(!paren.is_named());

    let call = root.descendant_for_byte_range(12, 15).unwrap();
    assert_eq!(call.kind(), "call_expression");

    assert_eq!(root.descendant_for_byte_range(0, 18).unwrap().kind(), "source_file");
    assert!(root.descendant_for_byte_range(3, 40).is_none());
}

#[test]
fn cursor_walk() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, SOURCE);
    let mut cursor = tree.walk();

    assert_eq!(cursor.node().kind(), "source_file");
    assert!(cursor.field_name().is_none());

    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "declaration");
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "let");
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.field_name(), Some("name"));
    assert_eq!(cursor.depth(), 2);

    assert!(cursor.goto_parent());
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind(), "expression_statement");
    assert!(!cursor.goto_next_sibling());

    cursor.reset();
    assert_eq!(cursor.depth(), 0);
    assert!(!cursor.goto_parent());
}

#[test]
fn cursor_child_for_offset() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, SOURCE);
    let mut cursor = tree.walk();

    assert_eq!(cursor.goto_first_child_for_point(Point::new(1, 2)), Some(1));
    assert_eq!(cursor.node().kind(), "expression_statement");

    cursor.reset();
    cursor.goto_first_child();
    assert_eq!(cursor.goto_first_child_for_byte(5), Some(2));
    assert_eq!(cursor.node().kind(), "=");
    assert_eq!(cursor.goto_first_child_for_byte(100), None);
}

#[test]
fn walk_all_nodes_iteratively() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, SOURCE);
    let mut cursor = tree.walk();
    let mut named = Vec::new();

    loop {
        let node = cursor.node();
        if node.is_named() {
            named.push(node.kind());
        }
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                assert_eq!(
                    named,
                    vec![
                        "source_file",
                        "declaration",
                        "identifier",
                        "number",
                        "expression_statement",
                        "call_expression",
                        "identifier",
                        "arguments",
                        "identifier",
                    ]
                );
                return;
            }
        }
    }
}

#[test]
fn leaves_include_hidden_tokens() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, "a; // note");

    let leaves = tree.leaves();
    assert_eq!(leaves.len(), 4);
    assert_eq!(leaves[1].range, 1..2);
    assert!(leaves[2].is_extra);
    assert_eq!(leaves[3].range, 3..10);
    assert!(leaves.iter().all(|l| !l.is_error));
    assert_covers(&tree);
}

#[test]
fn error_nodes_are_visible() {
    let table = compile_ok(&calc_grammar());
    let tree = parse_ok(&table, "1+");
    let root = tree.root_node();

    assert!(root.has_error());
    assert!(!root.is_error());
    let error = root.child(1).unwrap();
    assert!(error.is_error());
    assert!(error.is_extra());
    assert_eq!(error.kind(), "ERROR");
    assert_eq!(error.text(), "+");
}

#[test]
fn green_tree_is_lossless() {
    let table = compile_ok(&gloss_grammar());
    let source = "let  x=1 ; // c\n{ f(\"s\\n\"); }";
    let tree = parse_ok(&table, source);

    let root = SyntaxNode::new_root(tree.to_green());
    assert_eq!(root.text().to_string(), source);
    assert_eq!(root.kind(), syntax_kind(table.start_symbol()));
}

#[test]
fn node_ids_are_stable_within_a_tree() {
    let table = compile_ok(&gloss_grammar());
    let tree = parse_ok(&table, SOURCE);

    let first = tree.root_node().child(0).unwrap();
    let again = tree.root_node().child(0).unwrap();
    assert_eq!(first.id(), again.id());
    assert!(first.same_subtree(&again));
    assert_ne!(first.id(), tree.root_node().child(1).unwrap().id());
}
