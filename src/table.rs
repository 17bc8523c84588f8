//! The document facade: buffers plus a skip list of pieces.

use std::fmt;

use tracing::debug;

use crate::buffer::Buffers;
use crate::config::Config;
use crate::error::Result;
use crate::piece::Piece;
use crate::piece::Source;
use crate::skip_list::SkipList;

/// An editable document stored as pieces of two buffers.
pub struct PieceTable {
    buffers: Buffers,
    pieces: SkipList,
}

impl PieceTable {
    /// Create a document holding `text`.
    pub fn new(text: impl Into<Vec<u8>>) -> PieceTable {
        PieceTable::with_config(text, &Config::default())
    }

    pub fn with_config(text: impl Into<Vec<u8>>, config: &Config) -> PieceTable {
        let buffers = Buffers::new(text);
        let mut pieces = SkipList::with_config(config);
        pieces.insert(buffers.original_piece(), 0);
        PieceTable { buffers, pieces }
    }

    /// Document length in bytes.
    pub fn len(&self) -> usize {
        self.pieces.document_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `text` at byte `offset`. Offsets past the end append.
    pub fn insert(&mut self, text: &[u8], offset: usize) {
        if text.is_empty() {
            return;
        }
        let start = self.buffers.append(text);
        debug!(offset, len = text.len(), start, "insert");
        self.pieces.insert(Piece::new(Source::Added, start, text.len()), offset);
    }

    /// Delete bytes `start..end`. See [`SkipList::delete_range`].
    pub fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        debug!(start, end, "delete");
        self.pieces.delete_range(start, end)
    }

    /// The whole document.
    pub fn flatten(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for piece in self.pieces.pieces() {
            out.extend_from_slice(self.buffers.read(&piece));
        }
        out
    }

    /// Bytes `start..end`, or `None` if the range is invalid.
    pub fn slice(&self, start: usize, end: usize) -> Option<Vec<u8>> {
        if start > end || end > self.len() {
            return None;
        }
        let mut out = Vec::with_capacity(end - start);
        if start == end {
            return Some(out);
        }

        let cursor = self.pieces.search(start)?;
        let mut skip = cursor.residual;
        for piece in self.pieces.pieces_from(cursor.leaf) {
            let bytes = &self.buffers.read(&piece)[skip..];
            skip = 0;
            let want = end - start - out.len();
            out.extend_from_slice(&bytes[..bytes.len().min(want)]);
            if out.len() == end - start {
                break;
            }
        }
        Some(out)
    }

    /// The byte at `offset`.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        if offset >= self.len() {
            return None;
        }
        let cursor = self.pieces.search(offset)?;
        self.buffers.read(&cursor.piece).get(cursor.residual).copied()
    }

    pub fn buffers(&self) -> &Buffers {
        &self.buffers
    }

    /// The positional index.
    pub fn index(&self) -> &SkipList {
        &self.pieces
    }
}

impl fmt::Display for PieceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.flatten()))
    }
}
