//! External scanner hook.
//!
//! Grammars can declare `externals`: terminals recognised by caller-supplied
//! code instead of the table's DFAs. The lexer consults the scanner first
//! whenever one of them is valid.

use std::sync::Arc;

/// Token produced by an external scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExternalToken {
    /// Index into the grammar's `externals` list.
    pub index: usize,
    /// Bytes consumed. Must be at least one.
    pub len: usize,
}

/// Caller-supplied scanner for external terminals.
///
/// A scanner may decide based on the bytes of its token and at most one byte
/// past its end. Incremental reuse relies on that bound.
pub trait ExternalScanner {
    /// Try to recognise an external token at `position`.
    ///
    /// `valid[i]` tells whether external `i` can be accepted here. Returning
    /// `None` declines, and the scanner state is then rolled back.
    fn scan(&mut self, input: &[u8], position: usize, valid: &[bool]) -> Option<ExternalToken>;

    /// Snapshot of the scanner's mutable state.
    fn serialize(&self) -> Vec<u8>;

    /// Restore a snapshot taken by [`serialize`](Self::serialize). An empty
    /// slice resets the scanner.
    fn deserialize(&mut self, state: &[u8]);
}

/// Serialized external scanner state, shared between leaves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScannerState(Option<Arc<[u8]>>);

impl ScannerState {
    pub fn new(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Self(None)
        } else {
            Self(Some(Arc::from(bytes)))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_deref().unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}
