//! Action table construction and precedence-based conflict resolution.

use std::collections::BTreeSet;

use super::{Automaton, Item, LrGrammar};
use crate::GrammarError;
use crate::symbol::{ProductionId, StateId, SymbolId};
use crate::table::{Associativity, ConflictInfo, ParseAction};

pub(crate) struct ActionTable {
    /// `state * terminal_count + terminal`
    pub actions: Vec<Vec<ParseAction>>,
    /// `state * nonterminal_count + (symbol - terminal_count)`
    pub gotos: Vec<Option<StateId>>,
    pub conflicts: Vec<ConflictInfo>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Shift,
    Reduce,
    Unresolved,
}

pub(crate) fn build_actions(
    grammar: &LrGrammar,
    automaton: &Automaton,
) -> Result<ActionTable, GrammarError> {
    let terminal_count = grammar.terminal_count();
    let nonterminal_count = grammar.prepared.symbols.len() - terminal_count;
    let state_count = automaton.states.len();

    let mut table = ActionTable {
        actions: vec![Vec::new(); state_count * terminal_count],
        gotos: vec![None; state_count * nonterminal_count],
        conflicts: Vec::new(),
    };

    for (s, state) in automaton.states.iter().enumerate() {
        for (&symbol, &target) in &state.transitions {
            if !grammar.is_terminal(symbol) {
                table.gotos[s * nonterminal_count + symbol.index() - terminal_count] =
                    Some(StateId(target as u16));
            }
        }

        for t in 0..terminal_count {
            let terminal = SymbolId(t as u16);
            let shift = state
                .transitions
                .get(&terminal)
                .map(|&target| StateId(target as u16));

            let shift_items: Vec<Item> = state
                .items
                .iter()
                .map(|(item, _)| *item)
                .filter(|&item| grammar.next_symbol(item) == Some(terminal))
                .collect();

            let mut accept_item = None;
            let mut reduces = Vec::new();
            for (item, lookahead) in &state.items {
                if !grammar.is_complete(*item) || !lookahead.contains(t) {
                    continue;
                }
                if grammar.is_augmented(*item) {
                    accept_item = Some(*item);
                } else {
                    reduces.push(item.production);
                }
            }

            let cell = Cell {
                state: StateId(s as u16),
                terminal,
                shift,
                accept_item,
                shift_items,
                reduces,
            };
            let (actions, conflict) = resolve(grammar, cell)?;
            table.actions[s * terminal_count + t] = actions;
            table.conflicts.extend(conflict);
        }

        for &extra in &grammar.prepared.extras {
            let cell = &mut table.actions[s * terminal_count + extra.index()];
            if cell.is_empty() {
                cell.push(ParseAction::ShiftExtra);
            }
        }
    }

    Ok(table)
}

struct Cell {
    state: StateId,
    terminal: SymbolId,
    shift: Option<StateId>,
    accept_item: Option<Item>,
    shift_items: Vec<Item>,
    reduces: Vec<u32>,
}

fn resolve(
    grammar: &LrGrammar,
    mut cell: Cell,
) -> Result<(Vec<ParseAction>, Option<ConflictInfo>), GrammarError> {
    let mut unresolved = false;

    if cell.reduces.len() > 1 {
        let best = cell
            .reduces
            .iter()
            .map(|&p| grammar.production(p).precedence().unwrap_or(0))
            .max()
            .unwrap_or(0);
        cell.reduces
            .retain(|&p| grammar.production(p).precedence().unwrap_or(0) == best);
        unresolved = cell.reduces.len() > 1;
    }

    let mut keep_shift = cell.shift.is_some() || cell.accept_item.is_some();
    if keep_shift && !cell.reduces.is_empty() {
        if let Some(item) = cell.accept_item {
            cell.shift_items.push(item);
        }
        let shift_prec = ShiftPrecedence::of(grammar, &cell.shift_items);

        keep_shift = false;
        let mut kept = Vec::new();
        for &p in &cell.reduces {
            match compare(grammar, p, &shift_prec) {
                Outcome::Reduce => kept.push(p),
                Outcome::Shift => keep_shift = true,
                Outcome::Unresolved => {
                    unresolved = true;
                    keep_shift = true;
                    kept.push(p);
                }
            }
        }
        if keep_shift && !kept.is_empty() {
            unresolved = true;
        }
        cell.reduces = kept;
    }

    let mut actions = Vec::new();
    if keep_shift {
        if let Some(state) = cell.shift {
            actions.push(ParseAction::Shift { state });
        }
        if cell.accept_item.is_some() {
            actions.push(ParseAction::Accept);
        }
    }
    cell.reduces.sort_unstable();
    actions.extend(cell.reduces.iter().map(|&p| ParseAction::Reduce {
        production: ProductionId(p),
    }));

    if !unresolved {
        return Ok((actions, None));
    }

    let rules = participating_rules(grammar, &cell);
    let declared = grammar
        .prepared
        .conflicts
        .iter()
        .any(|set| rules.iter().all(|r| set.contains(r)));

    let rule_names: Vec<String> = rules
        .iter()
        .map(|&r| grammar.prepared.symbol_name(r).to_owned())
        .collect();

    if declared {
        let info = ConflictInfo {
            state: cell.state,
            lookahead: cell.terminal,
            rules: rule_names,
            actions: actions.clone(),
        };
        return Ok((actions, Some(info)));
    }

    let reduce_items = cell.reduces.iter().map(|&p| Item {
        production: p,
        dot: grammar.production(p).len() as u16,
    });
    let mut items: Vec<String> = cell
        .shift_items
        .iter()
        .copied()
        .chain(reduce_items)
        .map(|item| format!("  {}", grammar.describe_item(item)))
        .collect();
    items.dedup();

    Err(GrammarError::UnresolvedConflict {
        state: cell.state.0,
        lookahead: grammar.display_symbol(cell.terminal),
        rules: rule_names,
        items: items.join("\n"),
    })
}

/// Grammar rules involved in a conflict, with auxiliaries mapped to their origin.
fn participating_rules(grammar: &LrGrammar, cell: &Cell) -> BTreeSet<SymbolId> {
    let mut rules = BTreeSet::new();
    for &p in &cell.reduces {
        rules.insert(grammar.prepared.origin(grammar.production(p).lhs));
    }

    let advanced: Vec<Item> = cell
        .shift_items
        .iter()
        .copied()
        .filter(|item| item.dot > 0 && !grammar.is_augmented(*item))
        .collect();
    let shift_items = if advanced.is_empty() {
        &cell.shift_items
    } else {
        &advanced
    };
    for &item in shift_items {
        if !grammar.is_augmented(item) {
            rules.insert(grammar.prepared.origin(grammar.production(item.production).lhs));
        }
    }
    rules
}

/// Precedence range of the shift side: the step before the dot of every
/// shift item past its first step.
struct ShiftPrecedence {
    min: i32,
    max: i32,
    declared: bool,
}

impl ShiftPrecedence {
    fn of(grammar: &LrGrammar, items: &[Item]) -> Self {
        let mut range: Option<(i32, i32)> = None;
        let mut declared = false;
        for item in items.iter().filter(|item| item.dot > 0) {
            let step = &grammar.production(item.production).steps[item.dot as usize - 1];
            declared |= step.precedence.is_some();
            let p = step.precedence.unwrap_or(0);
            range = Some(match range {
                Some((lo, hi)) => (lo.min(p), hi.max(p)),
                None => (p, p),
            });
        }
        let (min, max) = range.unwrap_or((0, 0));
        Self { min, max, declared }
    }
}

fn compare(grammar: &LrGrammar, production: u32, shift: &ShiftPrecedence) -> Outcome {
    let production = grammar.production(production);
    let declared = production.precedence();
    if declared.is_none() && !shift.declared {
        return Outcome::Unresolved;
    }

    let reduce = declared.unwrap_or(0);
    if reduce > shift.max {
        Outcome::Reduce
    } else if reduce < shift.min {
        Outcome::Shift
    } else if shift.min == shift.max {
        match production.associativity() {
            Some(Associativity::Right) => Outcome::Shift,
            Some(Associativity::Left) | None => Outcome::Reduce,
        }
    } else {
        Outcome::Unresolved
    }
}
