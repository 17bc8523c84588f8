//! Range deletion and node removal.

use rand_core::RngCore;
use tracing::trace;

use super::Idx;
use super::NULL;
use super::SkipList;
use crate::error::Error;
use crate::error::Result;

/// What trimming a leaf did to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trim {
    /// The leaf lost bytes at one end.
    Shrunk,
    /// The whole leaf was cut and it is gone.
    Removed,
    /// The cut was interior; the kept suffix is a new leaf.
    Split(Idx),
}

impl Trim {
    /// Number of leaves the trim took out of the list.
    fn removed(self) -> usize {
        match self {
            Trim::Removed => 1,
            Trim::Shrunk | Trim::Split(_) => 0,
        }
    }
}

impl<R: RngCore> SkipList<R> {
    /// Delete the logical bytes `start..end`.
    ///
    /// `start > end` is an error. An `end` past the document clamps to it,
    /// and an empty range is a no-op.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Err(Error::OutOfRange {
                start,
                end,
                len: self.document_size,
            });
        }
        let end = end.min(self.document_size);
        if start >= end {
            return Ok(());
        }

        let (first, cut_start) = self.find(start);
        let (last, cut_end) = self.find(end);
        let mut suffix = None;
        let mut removed = 0;

        if first == last {
            match self.trim_leaf(first, cut_start, cut_end) {
                Trim::Split(tail) => suffix = Some(tail),
                trim => removed += trim.removed(),
            }
        } else {
            let mut doomed = Vec::new();
            let mut idx = self.node(first).next;
            while idx != last {
                doomed.push(idx);
                idx = self.node(idx).next;
            }
            for idx in doomed {
                let span = self.node(idx).span;
                let trim = self.trim_leaf(idx, 0, span);
                debug_assert_eq!(trim, Trim::Removed);
                removed += trim.removed();
            }
            if cut_end > 0 {
                let trim = self.trim_leaf(last, 0, cut_end);
                debug_assert!(!matches!(trim, Trim::Split(_)));
                removed += trim.removed();
            }
            // Last, so a removed head hands its tower to a survivor.
            let span = self.node(first).span;
            let trim = self.trim_leaf(first, cut_start, span);
            debug_assert!(!matches!(trim, Trim::Split(_)));
            removed += trim.removed();
        }
        trace!(start, end, removed, "deleted range");

        self.document_size -= end - start;
        self.collapse_levels();
        if let Some(tail) = suffix {
            self.promote(tail);
        }
        self.check_invariants();
        Ok(())
    }

    /// Cut `from..to` out of one leaf and fix every span above it.
    fn trim_leaf(&mut self, leaf: Idx, from: usize, to: usize) -> Trim {
        let span = self.node(leaf).span;
        debug_assert!(from < to && to <= span);
        self.fix_list(leaf, -((to - from) as isize));

        if from == 0 && to == span {
            self.delete_entry(leaf);
            return Trim::Removed;
        }

        let piece = self.node(leaf).piece;
        if to == span {
            let node = self.node_mut(leaf);
            node.piece = piece.truncate(from);
            node.span = from;
            return Trim::Shrunk;
        }
        if from == 0 {
            let node = self.node_mut(leaf);
            node.piece = piece.advance(to);
            node.span = span - to;
            return Trim::Shrunk;
        }

        let tail = self.split_leaf(leaf, to);
        let node = self.node_mut(leaf);
        node.piece = piece.truncate(from);
        node.span = from;
        Trim::Split(tail)
    }

    /// Unlink a leaf whose span has already been taken out of its ancestors,
    /// releasing its tower.
    fn delete_entry(&mut self, leaf: Idx) {
        self.leaf_count -= 1;
        let (prev, next) = {
            let node = self.node(leaf);
            (node.prev, node.next)
        };

        if prev != NULL {
            self.fold_tower(leaf);
            self.unlink(leaf);
            self.release(leaf);
            return;
        }

        if next == NULL {
            for idx in self.tower(leaf) {
                self.release(idx);
            }
            self.release(leaf);
            self.top = NULL;
            self.levels = 0;
            trace!("document emptied");
            return;
        }

        // The head tower reaches every level, so the successor inherits it and
        // its own tower merges into the head's.
        self.fold_tower(next);
        let up = self.node(leaf).up;
        self.unlink(leaf);
        self.node_mut(next).up = up;
        if up != NULL {
            self.node_mut(up).down = next;
        } else {
            self.top = next;
        }
        self.release(leaf);
    }

    /// Remove the index nodes above `idx`, top down, merging each one's range
    /// into its left neighbour.
    fn fold_tower(&mut self, idx: Idx) {
        let tower = self.tower(idx);
        for &node in tower.iter().rev() {
            let (span, left) = {
                let node = self.node(node);
                (node.span, node.prev)
            };
            debug_assert!(left != NULL, "tower node of a non-head leaf heads its level");
            self.node_mut(left).span += span;
            self.unlink(node);
            self.release(node);
        }
        self.node_mut(idx).up = NULL;
    }

    /// Drop top levels that consist of a lone head.
    fn collapse_levels(&mut self) {
        while self.levels > 1 && self.node(self.top).next == NULL {
            let old = self.top;
            let below = self.node(old).down;
            self.node_mut(below).up = NULL;
            self.top = below;
            self.levels -= 1;
            self.release(old);
            trace!(levels = self.levels, "collapsed level");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::fixture;
    use super::*;
    use crate::piece::Piece;
    use crate::piece::Source;

    fn spans(list: &SkipList) -> Vec<usize> {
        list.pieces().map(|p| p.len).collect()
    }

    #[test]
    fn delete_everything() {
        let mut list = fixture();
        list.delete_range(0, 130).expect("well formed");
        assert!(list.is_empty());
        assert_eq!(list.levels(), 0);
        assert_eq!(list.document_size(), 0);
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn delete_after_insert_everything() {
        let mut list = fixture();
        list.insert(Piece::new(Source::Added, 10, 30), 15);
        list.delete_range(0, 160).expect("well formed");
        assert!(list.is_empty());
        assert_eq!(list.verify(), Ok(()));

        // The emptied list is reusable.
        list.insert(Piece::new(Source::Added, 0, 4), 0);
        assert_eq!(list.document_size(), 4);
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn malformed_range_is_rejected() {
        let mut list = fixture();
        assert_eq!(
            list.delete_range(40, 20),
            Err(Error::OutOfRange { start: 40, end: 20, len: 130 })
        );
        assert_eq!(list.document_size(), 130);
    }

    #[test]
    fn empty_range_is_noop() {
        let mut list = fixture();
        let before = list.to_string();
        for k in [0, 30, 77, 130, 500] {
            list.delete_range(k, k).expect("well formed");
        }
        assert_eq!(list.to_string(), before);
    }

    #[test]
    fn end_past_document_clamps() {
        let mut list = fixture();
        list.delete_range(120, 1_000).expect("well formed");
        assert_eq!(list.document_size(), 120);
        assert_eq!(spans(&list), vec![30, 50, 10, 20, 5, 5]);
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn single_leaf_tail_cut() {
        let mut list = fixture();
        list.delete_range(40, 80).expect("well formed");
        assert_eq!(spans(&list), vec![30, 10, 10, 20, 5, 10, 5]);
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn single_leaf_head_cut() {
        let mut list = fixture();
        list.delete_range(30, 45).expect("well formed");
        assert_eq!(spans(&list), vec![30, 35, 10, 20, 5, 10, 5]);
        let cursor = list.search(30).expect("in range");
        assert_eq!(cursor.piece, Piece::new(Source::Original, 45, 35));
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn single_leaf_interior_cut_splits() {
        let mut list = fixture();
        list.delete_range(40, 50).expect("well formed");
        assert_eq!(spans(&list), vec![30, 10, 30, 10, 20, 5, 10, 5]);
        let pieces: Vec<Piece> = list.pieces().collect();
        assert_eq!(pieces[1], Piece::new(Source::Original, 30, 10));
        assert_eq!(pieces[2], Piece::new(Source::Original, 50, 30));
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn trim_leaf_reports_what_it_did() {
        let mut list = fixture();
        let (leaf, _) = list.find(30);

        assert_eq!(list.trim_leaf(leaf, 0, 10), Trim::Shrunk);
        assert_eq!(list.node(leaf).piece, Piece::new(Source::Original, 40, 40));

        let tail = match list.trim_leaf(leaf, 10, 20) {
            Trim::Split(tail) => tail,
            other => panic!("expected a split, got {:?}", other),
        };
        assert_eq!(list.node(leaf).piece, Piece::new(Source::Original, 40, 10));
        assert_eq!(list.node(tail).piece, Piece::new(Source::Original, 60, 20));

        let id = list.id(leaf);
        assert_eq!(list.trim_leaf(leaf, 0, 10), Trim::Removed);
        assert_eq!(list.piece(id), None);

        list.document_size -= 30;
        assert_eq!(spans(&list), vec![30, 20, 10, 20, 5, 10, 5]);
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn whole_leaf_with_tower_is_removed() {
        let mut list = fixture();
        // Leaf 20 carries the level 1 node of span 25.
        list.delete_range(90, 110).expect("well formed");
        assert_eq!(spans(&list), vec![30, 50, 10, 5, 10, 5]);
        assert_eq!(list.verify(), Ok(()));
        assert_eq!(list.levels(), 3);
    }

    #[test]
    fn removing_head_hands_tower_to_successor() {
        let mut list = fixture();
        list.delete_range(0, 30).expect("well formed");
        assert_eq!(spans(&list), vec![50, 10, 20, 5, 10, 5]);
        assert_eq!(list.levels(), 3);
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn removing_head_merges_successor_tower() {
        let mut list = fixture();
        // The new head is the 10, which carries towers on levels 1 and 2.
        list.delete_range(0, 115).expect("well formed");
        assert_eq!(spans(&list), vec![10, 5]);
        assert_eq!(list.verify(), Ok(()));
        // Both upper levels are left with a lone head and collapse.
        assert_eq!(list.levels(), 1);
    }

    #[test]
    fn multi_leaf_range_trims_both_ends() {
        let mut list = fixture();
        list.delete_range(20, 100).expect("well formed");
        assert_eq!(spans(&list), vec![20, 10, 5, 10, 5]);
        let pieces: Vec<Piece> = list.pieces().collect();
        assert_eq!(pieces[0], Piece::new(Source::Original, 0, 20));
        assert_eq!(pieces[1], Piece::new(Source::Original, 100, 10));
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn range_ending_on_boundary_keeps_next_leaf() {
        let mut list = fixture();
        list.delete_range(30, 90).expect("well formed");
        assert_eq!(spans(&list), vec![30, 20, 5, 10, 5]);
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn deleting_towered_leaves_collapses_levels() {
        let mut list = fixture();
        // Only the head range on level 2 survives.
        list.delete_range(115, 130).expect("well formed");
        assert_eq!(list.verify(), Ok(()));
        assert_eq!(spans(&list), vec![30, 50, 10, 20, 5]);
        assert_eq!(list.levels(), 2);
    }
}
