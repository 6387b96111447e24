//! Text edits and their validation.

use std::ops::Range;

use crate::tree::{Length, LineIndex, Point, Tree};

/// A single replacement: bytes `start_byte..old_end_byte` of the old text
/// became `start_byte..new_end_byte` of the new text.
///
/// Points are optional. When present they are checked against both texts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_point: Option<Point>,
    pub old_end_point: Option<Point>,
    pub new_end_point: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("inconsistent edit: {reason}")]
    Inconsistent { reason: String },
}

impl EditError {
    fn inconsistent(reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            reason: reason.into(),
        }
    }
}

/// Result of an incremental reparse.
#[derive(Debug)]
pub struct EditedTree {
    pub tree: Tree,
    /// Byte ranges of the new text that were re-lexed, merged and ordered.
    pub changed_ranges: Vec<Range<usize>>,
}

impl Edit {
    /// Byte offsets only.
    pub fn new(start_byte: usize, old_end_byte: usize, new_end_byte: usize) -> Self {
        Self {
            start_byte,
            old_end_byte,
            new_end_byte,
            start_point: None,
            old_end_point: None,
            new_end_point: None,
        }
    }

    /// Edit replacing `range` of `old_text` with `replacement`, points included.
    pub fn replace(old_text: &str, range: Range<usize>, replacement: &str) -> Self {
        let lines = LineIndex::new(old_text);
        let start_point = lines.point(range.start);
        Self {
            start_byte: range.start,
            old_end_byte: range.end,
            new_end_byte: range.start + replacement.len(),
            start_point: Some(start_point),
            old_end_point: Some(lines.point(range.end)),
            new_end_point: Some(start_point + Length::of(replacement).extent),
        }
    }

    /// Apply to `old_text`. Out-of-range or misaligned edits are rejected.
    pub fn apply(old_text: &str, range: Range<usize>, replacement: &str) -> Result<String, EditError> {
        if range.start > range.end
            || range.end > old_text.len()
            || !old_text.is_char_boundary(range.start)
            || !old_text.is_char_boundary(range.end)
        {
            return Err(EditError::inconsistent(format!(
                "range {}..{} does not fit a text of {} bytes",
                range.start,
                range.end,
                old_text.len()
            )));
        }
        let mut text = String::with_capacity(old_text.len() + replacement.len());
        text.push_str(&old_text[..range.start]);
        text.push_str(replacement);
        text.push_str(&old_text[range.end..]);
        Ok(text)
    }

    /// Signed change in text length.
    pub fn delta(&self) -> isize {
        self.new_end_byte as isize - self.old_end_byte as isize
    }

    pub fn old_range(&self) -> Range<usize> {
        self.start_byte..self.old_end_byte
    }

    pub fn new_range(&self) -> Range<usize> {
        self.start_byte..self.new_end_byte
    }

    pub(crate) fn validate(&self, old_text: &str, new_text: &str) -> Result<(), EditError> {
        let (start, old_end, new_end) = (self.start_byte, self.old_end_byte, self.new_end_byte);

        if start > old_end || start > new_end {
            return Err(EditError::inconsistent(format!(
                "start {start} is after old end {old_end} or new end {new_end}"
            )));
        }
        if old_end > old_text.len() {
            return Err(EditError::inconsistent(format!(
                "old end {old_end} is past the previous text ({} bytes)",
                old_text.len()
            )));
        }
        let expected = old_text.len() - (old_end - start) + (new_end - start);
        if new_text.len() != expected {
            return Err(EditError::inconsistent(format!(
                "new text is {} bytes, edit implies {expected}",
                new_text.len()
            )));
        }
        if !old_text.is_char_boundary(start)
            || !old_text.is_char_boundary(old_end)
            || !new_text.is_char_boundary(start)
            || !new_text.is_char_boundary(new_end)
        {
            return Err(EditError::inconsistent("offset splits a character"));
        }
        if old_text[..start] != new_text[..start] {
            return Err(EditError::inconsistent(format!(
                "text before {start} differs"
            )));
        }
        if old_text[old_end..] != new_text[new_end..] {
            return Err(EditError::inconsistent(format!(
                "text after old end {old_end} differs"
            )));
        }

        let old_lines = LineIndex::new(old_text);
        let new_lines = LineIndex::new(new_text);
        check_point("start", self.start_point, old_lines.point(start))?;
        check_point("old end", self.old_end_point, old_lines.point(old_end))?;
        check_point("new end", self.new_end_point, new_lines.point(new_end))?;
        Ok(())
    }
}

fn check_point(what: &str, given: Option<Point>, actual: Point) -> Result<(), EditError> {
    match given {
        Some(point) if point != actual => Err(EditError::inconsistent(format!(
            "{what} point {point} does not match the text ({actual})"
        ))),
        _ => Ok(()),
    }
}

/// Merge overlapping or touching ranges. Input must be sorted by start.
pub(crate) fn merge_ranges(ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
