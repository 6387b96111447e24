//! Fixture grammars and a deterministic LR driver for table tests.

use gloss_core::Grammar;
use gloss_core::grammar::dsl::*;

use crate::{GrammarTable, ParseAction, StateId, SymbolId, compile};

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

/// Sums, products, and right-associative assignment.
pub fn arithmetic_grammar() -> Grammar {
    GrammarBuilder::new("arith")
        .rule(
            "expr",
            choice([
                sym("number"),
                sym("name"),
                prec_right(0, seq([sym("name"), lit("="), sym("expr")])),
                prec_left(1, seq([sym("expr"), lit("+"), sym("expr")])),
                prec_left(2, seq([sym("expr"), lit("*"), sym("expr")])),
            ]),
        )
        .rule("number", pattern(r"\d+"))
        .rule("name", pattern(r"[a-z]+"))
        .extra(pattern(r"\s"))
        .build()
}

pub fn compile_ok(grammar: &Grammar) -> GrammarTable {
    match compile(grammar) {
        Ok(table) => table,
        Err(e) => panic!("grammar failed to compile: {e}"),
    }
}

fn terminal(table: &GrammarTable, name: &str) -> SymbolId {
    table
        .symbol_for_name(name, false)
        .or_else(|| table.symbol_for_name(name, true))
        .filter(|&s| table.is_terminal(s))
        .unwrap_or_else(|| panic!("no terminal named {name}"))
}

/// Run the table over terminal names, taking the first action of every cell.
///
/// Returns the reductions as `lhs/len` in order.
pub fn drive(table: &GrammarTable, tokens: &[&str]) -> Result<Vec<String>, String> {
    let mut input: Vec<SymbolId> = tokens.iter().map(|t| terminal(table, t)).collect();
    input.push(SymbolId::END);

    let mut stack: Vec<StateId> = vec![table.initial_state()];
    let mut reductions = Vec::new();
    let mut pos = 0;

    loop {
        let state = *stack.last().ok_or("empty stack")?;
        let lookahead = input[pos];
        let Some(action) = table.actions(state, lookahead).first() else {
            return Err(format!(
                "no action in state {} on {}",
                state.0,
                table.symbol_name(lookahead)
            ));
        };
        match *action {
            ParseAction::Shift { state } => {
                stack.push(state);
                pos += 1;
            }
            ParseAction::ShiftExtra => pos += 1,
            ParseAction::Reduce { production } => {
                let production = table.production(production);
                stack.truncate(stack.len() - production.len());
                let top = *stack.last().ok_or("empty stack")?;
                let next = table
                    .goto(top, production.lhs)
                    .ok_or_else(|| format!("no goto on {}", table.symbol_name(production.lhs)))?;
                stack.push(next);
                reductions.push(format!(
                    "{}/{}",
                    table.symbol_name(production.lhs),
                    production.len()
                ));
            }
            ParseAction::Accept => return Ok(reductions),
        }
    }
}
