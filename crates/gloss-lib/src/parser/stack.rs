//! Graph-structured parse stack.
//!
//! Implements the cactus stack pattern: entries are append-only and each
//! points at the entry below it, so a stack version is just a head index.
//! Forking copies the head. Popping moves it down without touching entries
//! other versions may still reference.

use gloss_table::StateId;

use crate::tree::Subtree;

#[derive(Clone, Debug)]
pub(crate) struct StackEntry {
    pub state: StateId,
    /// `None` only for the bottom entry.
    pub subtree: Option<Subtree>,
    pub prev: Option<u32>,
    /// Byte offset just past this entry's subtree.
    pub end: usize,
}

/// One live parse branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StackVersion {
    pub head: u32,
    pub error_cost: u32,
    pub dynamic_precedence: i32,
    /// Creation order. Breaks every tie.
    pub id: u32,
}

impl StackVersion {
    pub fn fork(&self, id: u32) -> Self {
        Self { id, ..*self }
    }

    /// Lower error cost, then higher dynamic precedence, then earlier creation.
    pub fn preference_key(&self) -> (u32, std::cmp::Reverse<i32>, u32) {
        (
            self.error_cost,
            std::cmp::Reverse(self.dynamic_precedence),
            self.id,
        )
    }
}

/// Entries taken off a version for a reduction or a recovery.
#[derive(Debug)]
pub(crate) struct Popped {
    /// Entry left on top.
    pub base: u32,
    /// Popped subtrees in document order, without trailing extras.
    pub children: Vec<Subtree>,
    /// Extras that sat above the last non-extra entry, in document order.
    pub trailing: Vec<Subtree>,
}

#[derive(Debug)]
pub(crate) struct StackArena {
    entries: Vec<StackEntry>,
}

impl StackArena {
    /// Arena with a single bottom entry, index 0.
    pub fn new(initial: StateId) -> Self {
        Self {
            entries: vec![StackEntry {
                state: initial,
                subtree: None,
                prev: None,
                end: 0,
            }],
        }
    }

    pub fn push(&mut self, head: u32, state: StateId, subtree: Subtree) -> u32 {
        let end = self.entry(head).end + subtree.len();
        let idx = self.entries.len() as u32;
        self.entries.push(StackEntry {
            state,
            subtree: Some(subtree),
            prev: Some(head),
            end,
        });
        idx
    }

    #[inline]
    pub fn entry(&self, idx: u32) -> &StackEntry {
        &self.entries[idx as usize]
    }

    #[inline]
    pub fn state(&self, head: u32) -> StateId {
        self.entry(head).state
    }

    #[inline]
    pub fn end(&self, head: u32) -> usize {
        self.entry(head).end
    }

    /// Pop `count` non-extra entries plus the extras between and above them.
    ///
    /// Returns `None` when the version holds fewer than `count` non-extra
    /// entries.
    pub fn pop(&self, head: u32, count: usize) -> Option<Popped> {
        let mut idx = head;
        let mut trailing = Vec::new();
        let mut children = Vec::new();
        let mut remaining = count;

        while remaining > 0 {
            let entry = self.entry(idx);
            let subtree = entry.subtree.as_ref()?;
            let prev = entry.prev?;
            if subtree.is_extra() {
                if children.is_empty() {
                    trailing.push(subtree.clone());
                } else {
                    children.push(subtree.clone());
                }
            } else {
                children.push(subtree.clone());
                remaining -= 1;
            }
            idx = prev;
        }

        if count == 0 {
            // Epsilon reductions sit below the trailing extras.
            while let Some(subtree) = self.entry(idx).subtree.as_ref() {
                if !subtree.is_extra() {
                    break;
                }
                trailing.push(subtree.clone());
                idx = self.entry(idx).prev?;
            }
        }

        children.reverse();
        trailing.reverse();
        Some(Popped {
            base: idx,
            children,
            trailing,
        })
    }

    /// States of the non-extra entries from the bottom up.
    pub fn states(&self, head: u32) -> Vec<StateId> {
        let mut states = Vec::new();
        let mut idx = Some(head);
        while let Some(i) = idx {
            let entry = self.entry(i);
            if !entry.subtree.as_ref().is_some_and(Subtree::is_extra) {
                states.push(entry.state);
            }
            idx = entry.prev;
        }
        states.reverse();
        states
    }

    /// Subtrees from the bottom up.
    pub fn subtrees(&self, head: u32) -> Vec<Subtree> {
        let mut out = Vec::new();
        let mut idx = Some(head);
        while let Some(i) = idx {
            let entry = self.entry(i);
            out.extend(entry.subtree.clone());
            idx = entry.prev;
        }
        out.reverse();
        out
    }

    /// Whether two heads hold the same state sequence.
    pub fn same_states(&self, a: u32, b: u32) -> bool {
        let (mut a, mut b) = (Some(a), Some(b));
        loop {
            match (a, b) {
                (None, None) => return true,
                (Some(x), Some(y)) if x == y => return true,
                (Some(x), Some(y)) => {
                    let (ex, ey) = (self.entry(x), self.entry(y));
                    if ex.state != ey.state {
                        return false;
                    }
                    a = ex.prev;
                    b = ey.prev;
                }
                _ => return false,
            }
        }
    }

    /// Entries allocated so far, including abandoned ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
