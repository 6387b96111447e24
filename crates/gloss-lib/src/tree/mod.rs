//! Parse trees.
//!
//! A [`Tree`] owns a root [`Subtree`] plus the text and table it was parsed
//! with. [`Node`] and [`TreeCursor`] are positioned views over it that hide
//! auxiliary structure and apply aliases and fields.

mod cursor;
mod green;
mod node;
mod point;
mod render;
mod subtree;

#[cfg(test)]
mod node_tests;

use std::ops::Range;
use std::sync::Arc;

use gloss_table::{GrammarTable, SymbolId};

use crate::diagnostics::Diagnostics;
use crate::edit::{Edit, EditError, EditedTree};
use crate::parser::Parser;

pub use cursor::TreeCursor;
pub use green::{GlossLanguage, SyntaxNode, syntax_kind};
pub use node::Node;
pub use point::{Length, LineIndex, Point};
pub use render::SexpOptions;
pub use subtree::Subtree;

pub(crate) use subtree::{NodeSpec, ROOT_STATE};

/// How a parse ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParseStatus {
    #[default]
    Complete,
    Cancelled,
    FuelExhausted,
}

impl std::fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseStatus::Complete => write!(f, "complete"),
            ParseStatus::Cancelled => write!(f, "cancelled"),
            ParseStatus::FuelExhausted => write!(f, "fuel exhausted"),
        }
    }
}

/// A token of the tree with its absolute range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    pub symbol: SymbolId,
    pub range: Range<usize>,
    pub is_extra: bool,
    pub is_error: bool,
}

/// Immutable result of a parse. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Tree {
    root: Subtree,
    text: Arc<str>,
    table: Arc<GrammarTable>,
    version: u64,
    diagnostics: Diagnostics,
    status: ParseStatus,
}

impl Tree {
    pub(crate) fn new(
        root: Subtree,
        text: Arc<str>,
        table: Arc<GrammarTable>,
        version: u64,
        diagnostics: Diagnostics,
        status: ParseStatus,
    ) -> Self {
        Self {
            root,
            text,
            table,
            version,
            diagnostics,
            status,
        }
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::root(self)
    }

    pub fn root_subtree(&self) -> &Subtree {
        &self.root
    }

    /// 0 for a fresh parse, one more than the previous tree's after an edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn table(&self) -> &Arc<GrammarTable> {
        &self.table
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn status(&self) -> ParseStatus {
        self.status
    }

    /// Whether the parse ran to the end. Syntax errors do not count.
    pub fn is_complete(&self) -> bool {
        self.status == ParseStatus::Complete
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root_node())
    }

    /// Every token in document order, hidden ones included.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut out = Vec::new();
        let mut offset = 0;
        let mut stack = vec![&self.root];
        while let Some(subtree) = stack.pop() {
            if subtree.is_leaf() {
                out.push(Leaf {
                    symbol: subtree.symbol(),
                    range: offset..offset + subtree.len(),
                    is_extra: subtree.is_extra(),
                    is_error: subtree.is_error(),
                });
                offset += subtree.len();
                continue;
            }
            stack.extend(subtree.children().iter().rev());
        }
        out
    }

    /// Named nodes as an indented s-expression.
    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }

    pub fn to_sexp_with(&self, options: SexpOptions) -> String {
        render::to_sexp(&self.root_node(), options)
    }

    /// Lossless `rowan` tree. Kinds are raw symbol ids (see [`syntax_kind`]).
    pub fn to_green(&self) -> rowan::GreenNode {
        green::to_green(&self.root, &self.text)
    }

    /// Reparse after `edit`, reusing this tree.
    ///
    /// Uses default options and no external scanner. Grammars with externals
    /// should go through a configured [`Parser`] instead.
    pub fn edit(&self, edit: &Edit, new_text: &str) -> Result<EditedTree, EditError> {
        Parser::new(Arc::clone(&self.table)).edit(self, edit, new_text)
    }
}
