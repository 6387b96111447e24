//! Walks the previous tree in document order for subtrees that can be reused
//! at the current position of an incremental parse.

use crate::edit::Edit;
use crate::tree::Subtree;

pub(crate) struct ReuseCursor {
    edit: Edit,
    /// Pending subtrees with their old start offsets; the top is the next
    /// one in document order.
    stack: Vec<(Subtree, usize)>,
}

impl ReuseCursor {
    pub fn new(root: Subtree, edit: Edit) -> Self {
        Self {
            edit,
            stack: vec![(root, 0)],
        }
    }

    /// Old offset for a new offset, if the byte there came from the old text.
    pub fn old_position(&self, position: usize) -> Option<usize> {
        if position < self.edit.start_byte {
            Some(position)
        } else if position >= self.edit.new_end_byte {
            Some(position - self.edit.new_end_byte + self.edit.old_end_byte)
        } else {
            None
        }
    }

    /// Whether every byte `subtree` examined at `old_start` survived the edit.
    pub fn unchanged(&self, subtree: &Subtree, old_start: usize) -> bool {
        old_start + subtree.lookahead_bytes() <= self.edit.start_byte
            || old_start >= self.edit.old_end_byte
    }

    /// Old subtrees starting at new offset `position`, outermost first.
    ///
    /// Positions must be queried in non-decreasing order. Subtrees ending at
    /// or before the position are dropped; ones straddling it are opened.
    pub fn candidates(&mut self, position: usize) -> Vec<(Subtree, usize)> {
        let Some(old) = self.old_position(position) else {
            return Vec::new();
        };

        loop {
            let Some((top, start)) = self.stack.last() else {
                return Vec::new();
            };
            let start = *start;
            let end = start + top.len();

            if end <= old {
                self.stack.pop();
            } else if start < old {
                let Some((top, start)) = self.stack.pop() else {
                    return Vec::new();
                };
                let mut offsets = Vec::with_capacity(top.children().len());
                let mut offset = start;
                for child in top.children() {
                    offsets.push(offset);
                    offset += child.len();
                }
                for (child, offset) in top.children().iter().zip(offsets).rev() {
                    self.stack.push((child.clone(), offset));
                }
            } else if start > old {
                return Vec::new();
            } else {
                return chain(top, start);
            }
        }
    }
}

/// `subtree` and its leading descendants that start at the same offset and
/// are not empty.
fn chain(subtree: &Subtree, start: usize) -> Vec<(Subtree, usize)> {
    let mut out = vec![(subtree.clone(), start)];
    let mut current = subtree.clone();
    while let Some(child) = current.children().iter().find(|c| !c.is_empty()).cloned() {
        out.push((child.clone(), start));
        current = child;
    }
    out
}
