use std::ops::Range;

/// A byte range inside a declaration or cache file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Synthetic zero location for errors that do not come from a file.
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Span covering `len` bytes starting at `offset`.
    pub fn at(offset: usize, len: usize) -> Self {
        Self {
            start: offset as u32,
            end: (offset + len) as u32,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}
