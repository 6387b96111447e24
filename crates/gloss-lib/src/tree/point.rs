//! Row/column positions and subtree extents.

use std::ops::Add;

/// Zero-based row and byte column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}

/// Byte length plus the row/column extent it spans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Length {
    pub bytes: usize,
    pub extent: Point,
}

impl Length {
    pub const ZERO: Length = Length {
        bytes: 0,
        extent: Point::new(0, 0),
    };

    pub fn of(text: &str) -> Self {
        let mut extent = Point::default();
        for b in text.bytes() {
            if b == b'\n' {
                extent.row += 1;
                extent.column = 0;
            } else {
                extent.column += 1;
            }
        }
        Self {
            bytes: text.len(),
            extent,
        }
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length {
            bytes: self.bytes + rhs.bytes,
            extent: self.extent + rhs.extent,
        }
    }
}

impl Add for Point {
    type Output = Point;

    /// Advance `self` by an extent.
    fn add(self, rhs: Point) -> Point {
        if rhs.row > 0 {
            Point::new(self.row + rhs.row, rhs.column)
        } else {
            Point::new(self.row, self.column + rhs.column)
        }
    }
}

/// Byte offset to `Point` lookup over a fixed text.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Offsets past the end clamp to the end of the text.
    pub fn point(&self, offset: usize) -> Point {
        let offset = offset.min(self.len);
        let row = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Point::new(row, offset - self.line_starts[row])
    }
}
