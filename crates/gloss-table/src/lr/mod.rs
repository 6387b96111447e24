//! LALR(1) construction.
//!
//! States are keyed by their kernel item cores. Lookaheads of states that
//! share a core are merged, and merged states are reprocessed until the
//! lookahead sets stop growing.

mod actions;
mod automaton;
mod first;

#[cfg(test)]
mod automaton_tests;

pub(crate) use actions::{ActionTable, build_actions};
pub(crate) use automaton::{Automaton, build_automaton};

use crate::prepare::PreparedGrammar;
use crate::symbol::SymbolId;
use crate::table::{Production, ProductionStep};
use first::FirstSets;

/// Production with a dot position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Item {
    pub production: u32,
    pub dot: u16,
}

impl Item {
    fn advance(self) -> Item {
        Item {
            production: self.production,
            dot: self.dot + 1,
        }
    }
}

/// Prepared grammar plus the augmented start production `S' -> start`.
pub(crate) struct LrGrammar<'a> {
    pub prepared: &'a PreparedGrammar,
    augmented: Production,
    by_lhs: Vec<Vec<u32>>,
    first: FirstSets,
}

impl<'a> LrGrammar<'a> {
    pub fn new(prepared: &'a PreparedGrammar) -> Self {
        let mut by_lhs = vec![Vec::new(); prepared.symbols.len()];
        for (i, production) in prepared.productions.iter().enumerate() {
            by_lhs[production.lhs.index()].push(i as u32);
        }
        Self {
            prepared,
            augmented: Production {
                lhs: prepared.start,
                steps: vec![ProductionStep::new(prepared.start)],
                dynamic_precedence: 0,
            },
            by_lhs,
            first: FirstSets::compute(prepared),
        }
    }

    pub fn augmented_id(&self) -> u32 {
        self.prepared.productions.len() as u32
    }

    pub fn is_augmented(&self, item: Item) -> bool {
        item.production == self.augmented_id()
    }

    pub fn production(&self, id: u32) -> &Production {
        self.prepared
            .productions
            .get(id as usize)
            .unwrap_or(&self.augmented)
    }

    pub fn next_symbol(&self, item: Item) -> Option<SymbolId> {
        self.production(item.production)
            .steps
            .get(item.dot as usize)
            .map(|s| s.symbol)
    }

    pub fn is_complete(&self, item: Item) -> bool {
        item.dot as usize >= self.production(item.production).len()
    }

    pub fn is_terminal(&self, symbol: SymbolId) -> bool {
        symbol.index() < self.prepared.terminal_count
    }

    pub fn terminal_count(&self) -> usize {
        self.prepared.terminal_count
    }

    fn productions_of(&self, lhs: SymbolId) -> &[u32] {
        &self.by_lhs[lhs.index()]
    }

    /// `lhs -> a b • c` rendering used in conflict reports.
    pub fn describe_item(&self, item: Item) -> String {
        let production = self.production(item.production);
        let lhs = if self.is_augmented(item) {
            "<start>"
        } else {
            self.prepared.symbol_name(production.lhs)
        };
        let mut out = format!("{lhs} ->");
        for (i, step) in production.steps.iter().enumerate() {
            if i == item.dot as usize {
                out.push_str(" •");
            }
            out.push(' ');
            out.push_str(&self.display_symbol(step.symbol));
        }
        if self.is_complete(item) {
            out.push_str(" •");
        }
        out
    }

    pub fn display_symbol(&self, symbol: SymbolId) -> String {
        let info = &self.prepared.symbols[symbol.index()];
        if self.is_terminal(symbol) && !info.named && info.visible {
            format!("'{}'", info.name)
        } else {
            info.name.clone()
        }
    }
}
