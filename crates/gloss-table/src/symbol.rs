//! Identifiers and per-symbol metadata.

use serde::{Deserialize, Serialize};

/// Grammar symbol. Terminals come first (`END` is 0), nonterminals follow.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SymbolId(pub u16);

impl SymbolId {
    /// End of input.
    pub const END: SymbolId = SymbolId(0);
    /// Error nodes and error tokens.
    pub const ERROR: SymbolId = SymbolId(u16::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct StateId(pub u16);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct ProductionId(pub u32);

impl ProductionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct FieldId(pub u16);

impl FieldId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interned set of terminals valid in a parse state.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct LexModeId(pub u16);

impl LexModeId {
    /// Every terminal is valid. Used when lexing for error recovery.
    pub const ERROR: LexModeId = LexModeId(u16::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
    /// Generated by the compiler (repetition helpers, multi-step aliases).
    Auxiliary,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    /// Hidden symbols are spliced out of the public tree.
    pub visible: bool,
    pub named: bool,
    /// Declared in `extras`.
    pub extra: bool,
    /// Produced by an external scanner.
    pub external: bool,
    /// Counted when error recovery skips tokens.
    pub recovery: bool,
}

impl SymbolInfo {
    pub(crate) fn end() -> Self {
        Self {
            name: "end".to_owned(),
            kind: SymbolKind::Terminal,
            visible: false,
            named: false,
            extra: false,
            external: false,
            recovery: false,
        }
    }

    pub(crate) fn error() -> Self {
        Self {
            name: "ERROR".to_owned(),
            kind: SymbolKind::NonTerminal,
            visible: true,
            named: true,
            extra: false,
            external: false,
            recovery: false,
        }
    }
}
