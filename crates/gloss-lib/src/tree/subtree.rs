//! Shareable green subtrees.
//!
//! A `Subtree` knows its symbol, children and byte length, but not its
//! position or parent. That makes it shareable between tree versions: an
//! incremental parse pushes old subtrees into the new tree unchanged.

use std::sync::Arc;

use gloss_table::{LexModeId, ProductionId, StateId, SymbolId};

use crate::lexer::{LexSnapshot, ScannerState, Token};
use crate::tree::Length;

/// Parse state recorded on roots, which no table state equals.
pub(crate) const ROOT_STATE: StateId = StateId(u16::MAX);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Flags {
    pub extra: bool,
    pub error: bool,
    pub has_error: bool,
    pub fragile: bool,
    pub immediate_ok: bool,
}

#[derive(Debug)]
pub(crate) struct SubtreeData {
    symbol: SymbolId,
    size: Length,
    children: Vec<Subtree>,
    production: Option<ProductionId>,
    /// State on top of the stack before this subtree was pushed.
    parse_state: StateId,
    /// Bytes examined while building this subtree, counted from its start.
    lookahead_bytes: usize,
    lex_mode: LexModeId,
    /// Lex mode of the token that followed this subtree when it was reduced.
    follow_mode: LexModeId,
    flags: Flags,
    error_cost: u32,
    dynamic_precedence: i32,
    scanner_before: ScannerState,
    scanner_after: ScannerState,
}

impl Drop for SubtreeData {
    // Left-recursive repetitions nest as deep as the input is long.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let Ok(mut data) = Arc::try_unwrap(child.0) {
                pending.append(&mut data.children);
            }
        }
    }
}

/// Immutable, `Arc`-shared tree element.
#[derive(Clone, Debug)]
pub struct Subtree(Arc<SubtreeData>);

/// Inputs for an interior subtree.
pub(crate) struct NodeSpec {
    pub symbol: SymbolId,
    pub production: Option<ProductionId>,
    pub children: Vec<Subtree>,
    pub parse_state: StateId,
    /// Absolute end of the reduce lookahead, or of any bytes examined after
    /// the children.
    pub lookahead_end: usize,
    pub start: usize,
    pub extra: bool,
    pub fragile: bool,
    pub error_cost: u32,
    pub dynamic_precedence: i32,
    /// Lexer state to record when there is no non-empty child.
    pub entry: LexSnapshot,
    pub follow_mode: LexModeId,
}

impl Subtree {
    pub(crate) fn leaf(token: &Token, size: Length, parse_state: StateId) -> Self {
        Subtree(Arc::new(SubtreeData {
            symbol: token.symbol,
            size,
            children: Vec::new(),
            production: None,
            parse_state,
            lookahead_bytes: token.lookahead_end.saturating_sub(token.start_byte),
            lex_mode: token.lex_mode,
            follow_mode: LexModeId::ERROR,
            flags: Flags {
                extra: token.is_extra,
                error: token.is_error,
                has_error: token.is_error,
                fragile: false,
                immediate_ok: token.immediate_ok,
            },
            error_cost: 0,
            dynamic_precedence: 0,
            scanner_before: token.scanner_before.clone(),
            scanner_after: token.scanner_after.clone(),
        }))
    }

    pub(crate) fn node(spec: NodeSpec) -> Self {
        let NodeSpec {
            symbol,
            production,
            children,
            parse_state,
            lookahead_end,
            start,
            extra,
            fragile,
            error_cost,
            dynamic_precedence,
            entry,
            follow_mode,
        } = spec;

        let mut size = Length::ZERO;
        let mut lookahead_bytes = lookahead_end.saturating_sub(start);
        let mut has_error = symbol.is_error();
        let mut fragile = fragile;
        let mut cost = error_cost;
        let mut dynamic = dynamic_precedence;
        for child in &children {
            lookahead_bytes = lookahead_bytes.max(size.bytes + child.0.lookahead_bytes);
            size = size + child.0.size;
            has_error |= child.0.flags.has_error;
            fragile |= child.0.flags.fragile;
            cost += child.0.error_cost;
            dynamic += child.0.dynamic_precedence;
        }

        let first = children.iter().find(|c| c.len() > 0);
        let last = children.iter().rev().find(|c| c.len() > 0);
        let (lex_mode, immediate_ok, scanner_before) = match first {
            Some(c) => (c.0.lex_mode, c.0.flags.immediate_ok, c.0.scanner_before.clone()),
            None => (entry.mode, entry.immediate_ok, entry.scanner_state.clone()),
        };
        let scanner_after = match last {
            Some(c) => c.0.scanner_after.clone(),
            None => entry.scanner_state,
        };

        Subtree(Arc::new(SubtreeData {
            symbol,
            size,
            children,
            production,
            parse_state,
            lookahead_bytes,
            lex_mode,
            follow_mode,
            flags: Flags {
                extra,
                error: symbol.is_error(),
                has_error,
                fragile,
                immediate_ok,
            },
            error_cost: cost,
            dynamic_precedence: dynamic,
            scanner_before,
            scanner_after,
        }))
    }

    /// This subtree as pushed with the given flags, sharing it when nothing
    /// changes.
    pub(crate) fn for_push(&self, parse_state: StateId, extra: bool, fragile: bool) -> Subtree {
        let data = &self.0;
        let fragile = fragile || data.flags.fragile;
        let parse_state = if self.is_leaf() {
            parse_state
        } else {
            data.parse_state
        };
        if data.flags.extra == extra
            && data.flags.fragile == fragile
            && data.parse_state == parse_state
        {
            return self.clone();
        }
        Subtree(Arc::new(SubtreeData {
            symbol: data.symbol,
            size: data.size,
            children: data.children.clone(),
            production: data.production,
            parse_state,
            lookahead_bytes: data.lookahead_bytes,
            lex_mode: data.lex_mode,
            follow_mode: data.follow_mode,
            flags: Flags {
                extra,
                fragile,
                ..data.flags
            },
            error_cost: data.error_cost,
            dynamic_precedence: data.dynamic_precedence,
            scanner_before: data.scanner_before.clone(),
            scanner_after: data.scanner_after.clone(),
        }))
    }

    #[inline]
    pub fn symbol(&self) -> SymbolId {
        self.0.symbol
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.size.bytes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.size.bytes == 0
    }

    #[inline]
    pub fn size(&self) -> Length {
        self.0.size
    }

    #[inline]
    pub fn children(&self) -> &[Subtree] {
        &self.0.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.0.children.is_empty() && self.0.production.is_none()
    }

    pub fn production(&self) -> Option<ProductionId> {
        self.0.production
    }

    pub fn parse_state(&self) -> StateId {
        self.0.parse_state
    }

    pub fn lookahead_bytes(&self) -> usize {
        self.0.lookahead_bytes
    }

    pub fn lex_mode(&self) -> LexModeId {
        self.0.lex_mode
    }

    /// Mode to lex the token after this subtree in when it is reused.
    pub fn follow_mode(&self) -> LexModeId {
        self.0.follow_mode
    }

    pub fn immediate_ok(&self) -> bool {
        self.0.flags.immediate_ok
    }

    #[inline]
    pub fn is_extra(&self) -> bool {
        self.0.flags.extra
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.0.flags.error
    }

    #[inline]
    pub fn has_error(&self) -> bool {
        self.0.flags.has_error
    }

    #[inline]
    pub fn is_fragile(&self) -> bool {
        self.0.flags.fragile
    }

    pub fn error_cost(&self) -> u32 {
        self.0.error_cost
    }

    pub fn dynamic_precedence(&self) -> i32 {
        self.0.dynamic_precedence
    }

    pub fn scanner_before(&self) -> &ScannerState {
        &self.0.scanner_before
    }

    pub fn scanner_after(&self) -> &ScannerState {
        &self.0.scanner_after
    }

    /// Address of the shared allocation. Equal ids mean the same subtree.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &Subtree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Lexer state this subtree's first token was lexed in.
    pub(crate) fn entry_snapshot(&self, position: usize) -> LexSnapshot {
        LexSnapshot {
            position,
            mode: self.0.lex_mode,
            immediate_ok: self.0.flags.immediate_ok,
            scanner_state: self.0.scanner_before.clone(),
        }
    }
}
