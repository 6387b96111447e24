//! Fixture grammars and helpers shared by the runtime tests.

use std::sync::Arc;

use gloss_core::Grammar;
use gloss_core::grammar::dsl::*;
use gloss_table::{GrammarTable, compile};

use crate::lexer::{ExternalScanner, ExternalToken};
use crate::tree::{SexpOptions, Tree};
use crate::{Parser, parse};

pub fn compile_ok(grammar: &Grammar) -> Arc<GrammarTable> {
    match compile(grammar) {
        Ok(table) => Arc::new(table),
        Err(e) => panic!("grammar failed to compile: {e}"),
    }
}

/// `expr := NUMBER | prec_left(1, expr '+' expr)`
pub fn calc_grammar() -> Grammar {
    GrammarBuilder::new("calc")
        .rule(
            "expr",
            choice([
                sym("NUMBER"),
                prec_left(1, seq([sym("expr"), lit("+"), sym("expr")])),
            ]),
        )
        .rule("NUMBER", pattern(r"\d+"))
        .extra(pattern(r"\s"))
        .build()
}

/// A small language: declarations, blocks, calls, binary operators with
/// named precedences, strings with escapes, and line comments.
pub fn gloss_grammar() -> Grammar {
    let binary = |level: &str, ops: [&str; 2]| {
        prec_left(
            level,
            seq([
                field("left", sym("_expression")),
                field("operator", choice(ops.map(lit))),
                field("right", sym("_expression")),
            ]),
        )
    };

    GrammarBuilder::new("gloss")
        .rule("source_file", repeat(sym("_statement")))
        .rule(
            "_statement",
            choice([sym("declaration"), sym("expression_statement"), sym("block")]),
        )
        .rule(
            "declaration",
            seq([
                lit("let"),
                field("name", sym("identifier")),
                lit("="),
                field("value", sym("_expression")),
                lit(";"),
            ]),
        )
        .rule("expression_statement", seq([sym("_expression"), lit(";")]))
        .rule("block", seq([lit("{"), repeat(sym("_statement")), lit("}")]))
        .rule(
            "_expression",
            choice([
                sym("identifier"),
                sym("number"),
                sym("string"),
                sym("binary_expression"),
                sym("call_expression"),
                sym("parenthesized_expression"),
            ]),
        )
        .rule(
            "binary_expression",
            choice([binary("sum", ["+", "-"]), binary("product", ["*", "/"])]),
        )
        .rule(
            "call_expression",
            prec(
                "call",
                seq([
                    field("function", sym("identifier")),
                    field("arguments", sym("arguments")),
                ]),
            ),
        )
        .rule(
            "arguments",
            seq([lit("("), comma_sep(sym("_expression")), lit(")")]),
        )
        .rule(
            "parenthesized_expression",
            seq([lit("("), sym("_expression"), lit(")")]),
        )
        .rule(
            "string",
            seq([
                lit("\""),
                repeat(choice([sym("string_content"), sym("escape_sequence")])),
                lit("\""),
            ]),
        )
        .rule(
            "string_content",
            token_immediate(prec(1, pattern(r#"[^"\\\n]+"#))),
        )
        .rule(
            "escape_sequence",
            token_immediate(seq([lit("\\"), pattern(".")])),
        )
        .rule("identifier", pattern(r"[a-zA-Z_][a-zA-Z0-9_]*"))
        .rule("number", pattern(r"\d+"))
        .rule("comment", token(seq([lit("//"), pattern(r"[^\n]*")])))
        .extra(pattern(r"\s"))
        .extra(sym("comment"))
        .supertype("_expression")
        .precedences(&["call", "product", "sum"])
        .word("identifier")
        .reserved("global", [lit("let")])
        .build()
}

/// `1+2` has a left and a right reading; dynamic precedence picks one.
pub fn ambiguous_sum_grammar(left: i32, right: i32) -> Grammar {
    GrammarBuilder::new("sums")
        .rule("program", sym("expr"))
        .rule(
            "expr",
            choice([sym("NUMBER"), sym("left_sum"), sym("right_sum")]),
        )
        .rule(
            "left_sum",
            prec_dynamic(left, seq([sym("expr"), lit("+"), sym("NUMBER")])),
        )
        .rule(
            "right_sum",
            prec_dynamic(right, seq([sym("NUMBER"), lit("+"), sym("expr")])),
        )
        .rule("NUMBER", pattern(r"\d+"))
        .extra(pattern(r"\s"))
        .conflict(&["expr", "left_sum", "right_sum"])
        .build()
}

/// `s := s s | 'a'`, ambiguous for three or more `a`s.
pub fn pairs_grammar() -> Grammar {
    GrammarBuilder::new("pairs")
        .rule("s", choice([seq([sym("s"), sym("s")]), lit("a")]))
        .conflict(&["s"])
        .build()
}

/// Words and `%...%` raw chunks recognised by [`PercentScanner`].
pub fn raw_grammar() -> Grammar {
    GrammarBuilder::new("raw")
        .rule("document", repeat(choice([sym("word"), sym("raw")])))
        .rule("word", pattern(r"[a-z]+"))
        .external(sym("raw"))
        .extra(pattern(r"\s"))
        .build()
}

/// Scans `%...%` and counts the chunks it produced in its state.
#[derive(Debug, Default)]
pub struct PercentScanner {
    pub seen: u8,
}

impl ExternalScanner for PercentScanner {
    fn scan(&mut self, input: &[u8], position: usize, valid: &[bool]) -> Option<ExternalToken> {
        if !valid.first().copied().unwrap_or(false) || input.get(position) != Some(&b'%') {
            return None;
        }
        let close = input[position + 1..].iter().position(|&b| b == b'%')?;
        self.seen = self.seen.saturating_add(1);
        Some(ExternalToken {
            index: 0,
            len: close + 2,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        if self.seen == 0 {
            Vec::new()
        } else {
            vec![self.seen]
        }
    }

    fn deserialize(&mut self, state: &[u8]) {
        self.seen = state.first().copied().unwrap_or(0);
    }
}

pub fn parse_ok(table: &Arc<GrammarTable>, text: &str) -> Tree {
    match parse(table, text, None) {
        Ok(tree) => tree,
        Err(e) => panic!("parse failed: {e}"),
    }
}

pub fn sexp(table: &Arc<GrammarTable>, text: &str) -> String {
    parse_ok(table, text).to_sexp()
}

pub fn raw_sexp(table: &Arc<GrammarTable>, text: &str) -> String {
    parse_ok(table, text).to_sexp_with(SexpOptions {
        include_anonymous: true,
        spans: false,
    })
}

/// Panics unless the leaves tile `0..len` without gaps.
pub fn assert_covers(tree: &Tree) {
    let mut offset = 0;
    for leaf in tree.leaves() {
        assert_eq!(leaf.range.start, offset, "gap or overlap before {leaf:?}");
        offset = leaf.range.end;
    }
    assert_eq!(offset, tree.text().len(), "leaves stop short of the end");
}

/// Symbol, range and shape of every node, for comparing trees.
pub fn structure(tree: &Tree) -> Vec<(u16, usize, usize, usize)> {
    let mut out = Vec::new();
    let mut stack = vec![(tree.root_subtree(), 0usize, 0usize)];
    while let Some((subtree, start, depth)) = stack.pop() {
        out.push((subtree.symbol().0, start, start + subtree.len(), depth));
        let mut offset = start;
        let mut children = Vec::new();
        for child in subtree.children() {
            children.push((child, offset, depth + 1));
            offset += child.len();
        }
        stack.extend(children.into_iter().rev());
    }
    out
}

pub fn parser_for(table: &Arc<GrammarTable>) -> Parser {
    Parser::new(Arc::clone(table))
}
