#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Parse table compiler for Gloss.
//!
//! [`compile`] turns a [`gloss_core::Grammar`] into a [`GrammarTable`]: an
//! immutable map from (state, symbol) to parse actions, plus the lexical
//! automata the runtime lexer drives. Tables serialize to a checksummed
//! binary form with [`GrammarTable::to_binary`].

mod binary;
mod bitset;
mod build;
mod error;
mod lex;
mod lr;
mod prepare;
mod symbol;
mod table;

#[cfg(test)]
mod bitset_tests;
#[cfg(test)]
mod test_utils;

pub use binary::{FORMAT_VERSION, HEADER_SIZE, MAGIC};
pub use build::compile;
pub use error::{GrammarError, TableFormatError};
pub use lex::{LexMatch, LexRule};
pub use symbol::{
    FieldId, LexModeId, ProductionId, StateId, SymbolId, SymbolInfo, SymbolKind,
};
pub use table::{
    Alias, Associativity, ConflictInfo, GrammarTable, ParseAction, Production, ProductionStep,
};
