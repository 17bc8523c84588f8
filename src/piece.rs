//! Piece descriptors.
//!
//! A piece names a contiguous byte range inside one of the two physical
//! buffers. Pieces are plain values: splitting or trimming one produces new
//! pieces and never touches the bytes they refer to.

use std::ops::Range;

/// Which physical buffer a piece points into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Source {
    /// The immutable buffer the document was created from.
    #[default]
    Original,
    /// The append-only buffer holding every inserted byte.
    Added,
}

/// A contiguous range of bytes in one buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Piece {
    pub source: Source,
    pub start: usize,
    pub len: usize,
}

impl Piece {
    pub fn new(source: Source, start: usize, len: usize) -> Piece {
        Piece { source, start, len }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last buffer offset covered by this piece.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// The buffer range covered by this piece.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Split into `[0, at)` and `[at, len)`.
    ///
    /// Panics if `at > len`.
    pub fn split_at(self, at: usize) -> (Piece, Piece) {
        assert!(at <= self.len, "split point {} past piece length {}", at, self.len);
        let head = Piece::new(self.source, self.start, at);
        let tail = Piece::new(self.source, self.start + at, self.len - at);
        (head, tail)
    }

    /// Keep only the first `len` bytes.
    pub fn truncate(self, len: usize) -> Piece {
        Piece::new(self.source, self.start, len.min(self.len))
    }

    /// Drop the first `count` bytes.
    pub fn advance(self, count: usize) -> Piece {
        let count = count.min(self.len);
        Piece::new(self.source, self.start + count, self.len - count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_source_and_covers_range() {
        let piece = Piece::new(Source::Added, 10, 8);
        let (head, tail) = piece.split_at(3);
        assert_eq!(head, Piece::new(Source::Added, 10, 3));
        assert_eq!(tail, Piece::new(Source::Added, 13, 5));
        assert_eq!(head.end(), tail.start);
        assert_eq!(tail.end(), piece.end());
    }

    #[test]
    fn split_at_edges() {
        let piece = Piece::new(Source::Original, 0, 4);
        let (head, tail) = piece.split_at(0);
        assert!(head.is_empty());
        assert_eq!(tail, piece);

        let (head, tail) = piece.split_at(4);
        assert_eq!(head, piece);
        assert!(tail.is_empty());
    }

    #[test]
    #[should_panic]
    fn split_past_end_panics() {
        Piece::new(Source::Original, 0, 4).split_at(5);
    }

    #[test]
    fn truncate_and_advance() {
        let piece = Piece::new(Source::Original, 5, 10);
        assert_eq!(piece.truncate(4).range(), 5..9);
        assert_eq!(piece.advance(4).range(), 9..15);
        assert_eq!(piece.advance(20).len, 0);
        assert_eq!(piece.truncate(20), piece);
    }
}
