//! Compilation pipeline: prepare, build the automaton, resolve actions,
//! intern lexical modes.

use gloss_core::Grammar;
use indexmap::IndexSet;

use crate::lr::{self, LrGrammar};
use crate::prepare;
use crate::symbol::{LexModeId, SymbolId};
use crate::table::{GrammarTable, TableData};
use crate::GrammarError;

/// Compile a grammar description into an immutable parse table.
pub fn compile(grammar: &Grammar) -> Result<GrammarTable, GrammarError> {
    let prepared = prepare::prepare(grammar)?;
    let lr_grammar = LrGrammar::new(&prepared);
    let automaton = lr::build_automaton(&lr_grammar)?;
    let table = lr::build_actions(&lr_grammar, &automaton)?;

    let terminal_count = prepared.terminal_count;
    let state_count = automaton.states.len();

    let mut lex_modes: IndexSet<Vec<SymbolId>> = IndexSet::new();
    let mut state_lex_modes = Vec::with_capacity(state_count);
    for s in 0..state_count {
        let row = &table.actions[s * terminal_count..(s + 1) * terminal_count];
        let valid: Vec<SymbolId> = row
            .iter()
            .enumerate()
            .filter(|(_, actions)| !actions.is_empty())
            .map(|(t, _)| SymbolId(t as u16))
            .collect();
        let (mode, _) = lex_modes.insert_full(valid);
        state_lex_modes.push(LexModeId(mode as u16));
    }

    let data = TableData {
        name: prepared.name,
        symbols: prepared.symbols,
        terminal_count: terminal_count as u16,
        start_symbol: prepared.start,
        productions: prepared.productions,
        fields: prepared.fields,
        state_count: state_count as u16,
        actions: table.actions,
        gotos: table.gotos,
        state_lex_modes,
        lex_modes: lex_modes.into_iter().collect(),
        lex_rules: prepared.lex_rules,
        extras: prepared.extras,
        externals: prepared.externals,
        reserved_words: prepared.reserved_words,
        keyword_sources: prepared.keyword_sources,
        conflicts: table.conflicts,
    };

    GrammarTable::from_data(data).map_err(|e| GrammarError::Regex {
        pattern: String::new(),
        message: e.to_string(),
    })
}
