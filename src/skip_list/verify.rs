//! Structural invariant checks.

use std::fmt;

use rustc_hash::FxHashSet;

use super::Idx;
use super::NULL;
use super::SkipList;

/// A broken invariant, found by [`SkipList::verify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// An empty list with leftover size, leaves or levels.
    EmptyNotReset { levels: usize, size: usize, leaves: usize },
    /// More levels than the configured maximum.
    TooTall { levels: usize, max: usize },
    /// A level's head has a predecessor.
    HeadHasPrev { level: usize },
    /// A level that links back into itself.
    Cycle { level: usize },
    /// `node.next.prev != node`.
    BrokenLink { level: usize, position: usize },
    /// `node.up.down != node`, or an up link on the top level.
    DanglingUp { level: usize, position: usize },
    /// An index node without `down`, or a leaf with one.
    WrongLevel { level: usize, position: usize },
    /// A leaf whose span is zero or differs from its piece length.
    LeafSpan { position: usize, span: usize, piece_len: usize },
    /// An index node whose span differs from the range below it.
    RangeSpan { level: usize, position: usize, span: usize, actual: usize },
    /// A node inside a range that also starts some other range.
    RangeOverlap { level: usize, position: usize },
    /// A level whose spans do not add up to the document size.
    LevelSpan { level: usize, sum: usize, size: usize },
    /// The leaf counter disagrees with level 0.
    LeafCount { counted: usize, expected: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNotReset { levels, size, leaves } => {
                write!(f, "empty list has {levels} levels, size {size}, {leaves} leaves")
            }
            Self::TooTall { levels, max } => write!(f, "{levels} levels exceed maximum {max}"),
            Self::HeadHasPrev { level } => write!(f, "head of level {level} has a predecessor"),
            Self::Cycle { level } => write!(f, "level {level} contains a cycle"),
            Self::BrokenLink { level, position } => {
                write!(f, "level {level} node {position}: prev link does not match")
            }
            Self::DanglingUp { level, position } => {
                write!(f, "level {level} node {position}: up link is not reciprocal")
            }
            Self::WrongLevel { level, position } => {
                write!(f, "level {level} node {position}: down link inconsistent with level")
            }
            Self::LeafSpan { position, span, piece_len } => {
                write!(f, "leaf {position}: span {span} but piece length {piece_len}")
            }
            Self::RangeSpan { level, position, span, actual } => {
                write!(f, "level {level} node {position}: span {span} but range holds {actual}")
            }
            Self::RangeOverlap { level, position } => {
                write!(f, "level {level} node {position}: range contains another range start")
            }
            Self::LevelSpan { level, sum, size } => {
                write!(f, "level {level} spans sum to {sum}, document size is {size}")
            }
            Self::LeafCount { counted, expected } => {
                write!(f, "counted {counted} leaves, expected {expected}")
            }
        }
    }
}

impl std::error::Error for Violation {}

impl<R> SkipList<R> {
    /// Check every structural invariant. `Err` means the list is corrupt.
    pub fn verify(&self) -> Result<(), Violation> {
        if self.top == NULL {
            if self.levels != 0 || self.document_size != 0 || self.leaf_count != 0 {
                return Err(Violation::EmptyNotReset {
                    levels: self.levels,
                    size: self.document_size,
                    leaves: self.leaf_count,
                });
            }
            return Ok(());
        }
        if self.levels == 0 || self.levels > self.max_level {
            return Err(Violation::TooTall {
                levels: self.levels,
                max: self.max_level,
            });
        }

        let mut seen: FxHashSet<Idx> = FxHashSet::default();
        let mut head = self.top;
        for level in (0..self.levels).rev() {
            self.verify_level(level, head, &mut seen)?;
            if level > 0 {
                head = self.node(head).down;
            }
        }
        Ok(())
    }

    fn verify_level(&self, level: usize, head: Idx, seen: &mut FxHashSet<Idx>) -> Result<(), Violation> {
        if self.node(head).prev != NULL {
            return Err(Violation::HeadHasPrev { level });
        }
        let is_top = level + 1 == self.levels;

        let mut sum = 0;
        let mut position = 0;
        let mut prev = NULL;
        let mut idx = head;
        while idx != NULL {
            if !seen.insert(idx) {
                return Err(Violation::Cycle { level });
            }
            let node = self.node(idx);
            if node.prev != prev {
                return Err(Violation::BrokenLink { level, position });
            }
            if node.up != NULL && (is_top || self.node(node.up).down != idx) {
                return Err(Violation::DanglingUp { level, position });
            }
            if idx == head && !is_top && node.up == NULL {
                return Err(Violation::DanglingUp { level, position });
            }

            if level == 0 {
                if node.down != NULL {
                    return Err(Violation::WrongLevel { level, position });
                }
                if node.span == 0 || node.span != node.piece.len {
                    return Err(Violation::LeafSpan {
                        position,
                        span: node.span,
                        piece_len: node.piece.len,
                    });
                }
            } else {
                if node.down == NULL || self.node(node.down).up != idx {
                    return Err(Violation::WrongLevel { level, position });
                }
                let actual = self.range_span(idx, level, position)?;
                if actual != node.span {
                    return Err(Violation::RangeSpan {
                        level,
                        position,
                        span: node.span,
                        actual,
                    });
                }
            }

            sum += node.span;
            prev = idx;
            idx = node.next;
            position += 1;
        }

        if sum != self.document_size {
            return Err(Violation::LevelSpan {
                level,
                sum,
                size: self.document_size,
            });
        }
        if level == 0 && position != self.leaf_count {
            return Err(Violation::LeafCount {
                counted: position,
                expected: self.leaf_count,
            });
        }
        Ok(())
    }

    /// Sum the spans of the range an index node stands on.
    fn range_span(&self, idx: Idx, level: usize, position: usize) -> Result<usize, Violation> {
        let node = self.node(idx);
        let stop = if node.next == NULL {
            NULL
        } else {
            self.node(node.next).down
        };

        let mut actual = 0;
        let mut child = node.down;
        while child != stop {
            if child == NULL {
                // The successor's range start was never reached.
                return Err(Violation::RangeOverlap { level, position });
            }
            let below = self.node(child);
            if child != node.down && below.up != NULL {
                return Err(Violation::RangeOverlap { level, position });
            }
            actual += below.span;
            child = below.next;
        }
        Ok(actual)
    }
}
