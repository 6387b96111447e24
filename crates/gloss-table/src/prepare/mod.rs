//! Grammar preparation: validation, token extraction, and flattening.
//!
//! The output is a symbol table plus flat productions, ready for the LR
//! construction.

mod extract;
mod flatten;
mod precedence;
mod validate;

#[cfg(test)]
mod flatten_tests;

use gloss_core::Grammar;

use crate::GrammarError;
use crate::lex::LexRule;
use crate::symbol::{SymbolId, SymbolInfo};
use crate::table::Production;

#[derive(Debug)]
pub(crate) struct PreparedGrammar {
    pub name: String,
    /// Terminals, then grammar nonterminals, then auxiliaries.
    pub symbols: Vec<SymbolInfo>,
    pub terminal_count: usize,
    pub lex_rules: Vec<LexRule>,
    pub productions: Vec<Production>,
    pub start: SymbolId,
    pub fields: Vec<String>,
    pub extras: Vec<SymbolId>,
    pub externals: Vec<SymbolId>,
    /// Declared conflict sets.
    pub conflicts: Vec<Vec<SymbolId>>,
    /// Per symbol, the grammar rule it belongs to.
    pub origins: Vec<SymbolId>,
    pub reserved_words: Vec<(String, SymbolId)>,
    pub keyword_sources: Vec<SymbolId>,
}

impl PreparedGrammar {
    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbols
            .get(id.index())
            .map(|s| s.name.as_str())
            .unwrap_or("ERROR")
    }

    pub fn origin(&self, id: SymbolId) -> SymbolId {
        self.origins.get(id.index()).copied().unwrap_or(id)
    }
}

pub(crate) fn prepare(grammar: &Grammar) -> Result<PreparedGrammar, GrammarError> {
    let precs = precedence::PrecedenceTable::new(grammar);
    validate::validate(grammar, &precs)?;

    let lexicon = extract::extract(grammar, &precs)?;
    let flat = flatten::flatten(grammar, &lexicon, &precs)?;

    let terminal_count = lexicon.terminal_count();
    let mut symbols = lexicon.symbols;
    symbols.extend(flat.symbols);

    let origins = (0..symbols.len())
        .map(|i| {
            let id = SymbolId(i as u16);
            flat.origins.get(&id).copied().unwrap_or(id)
        })
        .collect();

    Ok(PreparedGrammar {
        name: grammar.name.clone(),
        symbols,
        terminal_count,
        lex_rules: lexicon.lex_rules,
        productions: flat.productions,
        start: flat.start,
        fields: flat.fields,
        extras: lexicon.extras,
        externals: lexicon.externals,
        conflicts: flat.conflicts,
        origins,
        reserved_words: lexicon.reserved_words,
        keyword_sources: lexicon.keyword_sources,
    })
}
