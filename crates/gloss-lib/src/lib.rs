//! Gloss: incremental GLR parsing for tree-sitter-style grammars.
//!
//! # Example
//!
//! ```
//! use gloss_lib::{Edit, compile_grammar, parse};
//!
//! let json = r#"{
//!     "name": "calc",
//!     "rules": {
//!         "expr": { "type": "CHOICE", "members": [
//!             { "type": "SYMBOL", "name": "number" },
//!             { "type": "PREC_LEFT", "value": 1, "content": { "type": "SEQ", "members": [
//!                 { "type": "SYMBOL", "name": "expr" },
//!                 { "type": "STRING", "value": "+" },
//!                 { "type": "SYMBOL", "name": "expr" }
//!             ] } }
//!         ] },
//!         "number": { "type": "PATTERN", "value": "\\d+" }
//!     },
//!     "extras": [{ "type": "PATTERN", "value": "\\s" }]
//! }"#;
//!
//! let table = compile_grammar(json).expect("valid grammar");
//! let tree = parse(&table, "1 + 2", None).expect("no edit given");
//! assert!(!tree.root_node().has_error());
//!
//! let edit = Edit::replace("1 + 2", 4..5, "30");
//! let edited = tree.edit(&edit, "1 + 30").expect("consistent edit");
//! assert_eq!(edited.tree.root_node().end_byte(), 6);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod edit;
pub mod lexer;
pub mod parser;
pub mod trace;
pub mod tree;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use edit::{Edit, EditError, EditedTree};
pub use gloss_table::GrammarTable;
pub use lexer::{ExternalScanner, ExternalToken};
pub use parser::{CancellationFlag, ParseOptions, Parser, ParserBuilder};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use tree::{Leaf, Node, ParseStatus, Point, SexpOptions, Tree, TreeCursor};

/// Errors from loading grammars and tables, and from malformed edits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] gloss_core::LoadError),

    #[error(transparent)]
    Grammar(#[from] gloss_table::GrammarError),

    #[error(transparent)]
    Table(#[from] gloss_table::TableFormatError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compile `grammar.json` source into a shareable table.
pub fn compile_grammar(source: &str) -> Result<Arc<GrammarTable>> {
    let grammar = gloss_core::Grammar::from_json(source)?;
    Ok(Arc::new(gloss_table::compile(&grammar)?))
}

/// Load a table written by [`GrammarTable::to_binary`].
pub fn load_table(bytes: &[u8]) -> Result<Arc<GrammarTable>> {
    Ok(Arc::new(GrammarTable::from_binary(bytes)?))
}

/// Parse `text` with default options, reusing `previous` when given.
pub fn parse(
    table: &Arc<GrammarTable>,
    text: &str,
    previous: Option<(&Tree, &edit::Edit)>,
) -> std::result::Result<Tree, EditError> {
    Parser::new(Arc::clone(table)).parse(text, previous)
}
