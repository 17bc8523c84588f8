//! Skiptable - a piece table indexed by an augmented skip list.
//!
//! The document is a sequence of pieces pointing into an immutable original
//! buffer and an append-only edit buffer. Pieces are kept in a skip list whose
//! nodes carry the byte length of everything below them, so locating, splitting
//! and removing pieces by offset takes logarithmic time in expectation.
//!
//! # Quick Start
//!
//! ```
//! use skiptable::PieceTable;
//!
//! let mut doc = PieceTable::new("hello world!");
//! doc.insert(b" editor", 5);
//! assert_eq!(doc.to_string(), "hello editor world!");
//!
//! doc.delete(5, 12).unwrap();
//! assert_eq!(doc.to_string(), "hello world!");
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod piece;
pub mod skip_list;
mod table;

pub use buffer::Buffers;
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use piece::Piece;
pub use piece::Source;
pub use skip_list::SkipList;
pub use table::PieceTable;
