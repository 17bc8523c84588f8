//! Physical byte storage behind a piece table.
//!
//! The original buffer is fixed at construction. The edit buffer only grows:
//! bytes are appended and never rewritten, so a piece stays valid for the
//! lifetime of the buffers that produced it.

use crate::piece::Piece;
use crate::piece::Source;

/// The two buffers a document's pieces point into.
#[derive(Clone, Debug, Default)]
pub struct Buffers {
    original: Box<[u8]>,
    edits: Vec<u8>,
}

impl Buffers {
    /// Create buffers around the original document bytes.
    pub fn new(original: impl Into<Vec<u8>>) -> Buffers {
        Buffers {
            original: original.into().into_boxed_slice(),
            edits: Vec::new(),
        }
    }

    /// A piece covering the whole original buffer.
    pub fn original_piece(&self) -> Piece {
        Piece::new(Source::Original, 0, self.original.len())
    }

    /// Length of the original buffer.
    pub fn original_len(&self) -> usize {
        self.original.len()
    }

    /// Length of the edit buffer.
    pub fn edit_len(&self) -> usize {
        self.edits.len()
    }

    /// Append bytes to the edit buffer, returning the offset they start at.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let start = self.edits.len();
        self.edits.extend_from_slice(bytes);
        start
    }

    /// Read `len` bytes of the original buffer starting at `start`.
    ///
    /// Panics if the range is out of bounds.
    pub fn read_original(&self, start: usize, len: usize) -> &[u8] {
        &self.original[start..start + len]
    }

    /// Read `len` bytes of the edit buffer starting at `start`.
    ///
    /// Panics if the range is out of bounds.
    pub fn read_edit(&self, start: usize, len: usize) -> &[u8] {
        &self.edits[start..start + len]
    }

    /// Resolve a piece to the bytes it refers to.
    pub fn read(&self, piece: &Piece) -> &[u8] {
        match piece.source {
            Source::Original => self.read_original(piece.start, piece.len),
            Source::Added => self.read_edit(piece.start, piece.len),
        }
    }
}
