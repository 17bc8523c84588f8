//! Insertion and promotion.

use rand_core::RngCore;
use smallvec::SmallVec;
use tracing::trace;

use super::Idx;
use super::NULL;
use super::SkipList;
use crate::piece::Piece;

impl<R: RngCore> SkipList<R> {
    /// Insert `piece` so that it starts at logical `offset`.
    ///
    /// Empty pieces are ignored. Offsets past the end append.
    pub fn insert(&mut self, piece: Piece, offset: usize) {
        if piece.is_empty() {
            return;
        }
        let offset = offset.min(self.document_size);

        if self.top == NULL {
            let leaf = self.alloc(piece.len, piece);
            self.top = leaf;
            self.levels = 1;
            self.leaf_count = 1;
            self.document_size = piece.len;
            self.check_invariants();
            return;
        }

        // Spans above the target grow during the search itself.
        let (target, residual) = self.locate(offset, piece.len);
        let span = self.node(target).span;
        let leaf = self.alloc(piece.len, piece);
        let mut fresh: SmallVec<[Idx; 2]> = SmallVec::new();

        if residual == 0 {
            let was_head = self.node(target).prev == NULL;
            self.link_before(target, leaf);
            if self.node(target).up != NULL {
                // The target's tower now stands on the new leaf, so the range
                // the search grew is exactly the range the leaf joined.
                self.move_tower(target, leaf);
            } else if was_head {
                self.top = leaf;
            } else {
                fresh.push(leaf);
            }
        } else if residual == span {
            self.link_after(target, leaf);
            fresh.push(leaf);
        } else {
            let tail = self.split_leaf(target, residual);
            self.link_after(target, leaf);
            fresh.push(leaf);
            fresh.push(tail);
        }

        self.leaf_count += 1;
        self.document_size += piece.len;
        for idx in fresh {
            self.promote(idx);
        }
        self.check_invariants();
    }

    /// Shrink `leaf` to `at` bytes and put the rest in a new leaf after it.
    /// Ancestor spans are unchanged: both halves stay in the same range.
    pub(super) fn split_leaf(&mut self, leaf: Idx, at: usize) -> Idx {
        let (head, tail) = self.node(leaf).piece.split_at(at);
        {
            let node = self.node_mut(leaf);
            node.piece = head;
            node.span = head.len;
        }
        let idx = self.alloc(tail.len, tail);
        self.link_after(leaf, idx);
        self.leaf_count += 1;
        idx
    }

    fn move_tower(&mut self, from: Idx, to: Idx) {
        let up = self.node(from).up;
        self.node_mut(from).up = NULL;
        self.node_mut(to).up = up;
        self.node_mut(up).down = to;
    }

    /// Give a tower-less, non-head node a random number of index nodes.
    pub(super) fn promote(&mut self, leaf: Idx) {
        let height = self.random_height();
        let mut current = leaf;

        for level in 0..height {
            if level + 1 >= self.max_level {
                break;
            }

            // The nearest node to the left that owns a tower starts the range
            // we are in. `before` is the part of that range left of `current`.
            let mut before = 0;
            let mut root = self.node(current).prev;
            while root != NULL {
                before += self.node(root).span;
                if self.node(root).up != NULL {
                    break;
                }
                root = self.node(root).prev;
            }

            // Only the top level has no tower roots.
            let parent = if root == NULL {
                self.push_level()
            } else {
                self.node(root).up
            };

            let parent_span = self.node(parent).span;
            debug_assert!(parent_span > before);
            let idx = self.alloc(parent_span - before, Piece::default());
            self.node_mut(parent).span = before;
            self.link_after(parent, idx);
            self.node_mut(idx).down = current;
            self.node_mut(current).up = idx;

            current = idx;
        }
    }

    /// Put a new head above the current top level, spanning everything.
    fn push_level(&mut self) -> Idx {
        let below = self.top;
        let head = self.alloc(self.document_size, Piece::default());
        self.node_mut(head).down = below;
        self.node_mut(below).up = head;
        self.top = head;
        self.levels += 1;
        trace!(levels = self.levels, "allocated level");
        head
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::fixture;
    use super::*;
    use crate::config::Config;
    use crate::piece::Source;

    fn seeded(seed: u64) -> SkipList {
        SkipList::with_config(&Config::default().with_seed(seed))
    }

    fn spans(list: &SkipList) -> Vec<usize> {
        list.pieces().map(|p| p.len).collect()
    }

    #[test]
    fn insert_into_empty() {
        let mut list = seeded(1);
        list.insert(Piece::new(Source::Original, 0, 12), 0);
        assert_eq!(list.len(), 1);
        assert_eq!(list.levels(), 1);
        assert_eq!(list.document_size(), 12);
        assert_eq!(list.verify(), Ok(()));
    }

    #[test]
    fn empty_piece_is_ignored() {
        let mut list = seeded(1);
        list.insert(Piece::new(Source::Added, 3, 0), 0);
        assert!(list.is_empty());
        assert_eq!(list.levels(), 0);
    }

    #[test]
    fn insert_splits_leaf() {
        let mut list = fixture();
        let piece = Piece::new(Source::Added, 10, 30);
        list.insert(piece, 15);

        assert_eq!(list.document_size(), 160);
        assert_eq!(list.verify(), Ok(()));
        assert_eq!(spans(&list), vec![15, 30, 15, 50, 10, 20, 5, 10, 5]);
        let cursor = list.search(16).expect("in range");
        assert_eq!(cursor.piece, piece);
        assert_eq!(cursor.residual, 1);

        let pieces: Vec<Piece> = list.pieces().collect();
        assert_eq!(pieces[0], Piece::new(Source::Original, 0, 15));
        assert_eq!(pieces[2], Piece::new(Source::Original, 15, 15));
    }

    #[test]
    fn insert_at_front_takes_over_tower() {
        let mut list = fixture();
        let piece = Piece::new(Source::Added, 0, 4);
        list.insert(piece, 0);

        assert_eq!(list.verify(), Ok(()));
        assert_eq!(list.levels(), 3);
        assert_eq!(spans(&list), vec![4, 30, 50, 10, 20, 5, 10, 5]);
        let first = list.first_leaf();
        assert_eq!(list.node(first).piece, piece);
        assert_ne!(list.node(first).up, NULL);
    }

    #[test]
    fn insert_at_range_boundary_joins_that_range() {
        let mut list = fixture();
        // Offset 90 starts the range of the 25 node on level 1.
        list.insert(Piece::new(Source::Added, 0, 7), 90);
        assert_eq!(list.verify(), Ok(()));
        let cursor = list.search(90).expect("in range");
        assert_eq!(cursor.piece, Piece::new(Source::Added, 0, 7));
        assert_eq!(cursor.residual, 0);
    }

    #[test]
    fn insert_at_end_appends() {
        let mut list = fixture();
        list.insert(Piece::new(Source::Added, 0, 3), 130);
        list.insert(Piece::new(Source::Added, 3, 3), 10_000);
        assert_eq!(list.verify(), Ok(()));
        assert_eq!(list.document_size(), 136);
        assert_eq!(spans(&list), vec![30, 50, 10, 20, 5, 10, 5, 3, 3]);
    }

    #[test]
    fn single_level_front_insert_replaces_head() {
        let mut list = seeded(5).with_max(1);
        list.insert(Piece::new(Source::Original, 0, 5), 0);
        list.insert(Piece::new(Source::Added, 0, 2), 0);
        assert_eq!(list.verify(), Ok(()));
        assert_eq!(spans(&list), vec![2, 5]);
        assert_eq!(list.levels(), 1);
    }

    #[test]
    fn max_level_caps_towers() {
        let mut list = seeded(11).with_max(3);
        for i in 0..500 {
            list.insert(Piece::new(Source::Added, i, 1), i);
        }
        assert_eq!(list.verify(), Ok(()));
        assert!(list.levels() <= 3);
    }

    #[test]
    fn many_inserts_grow_levels() {
        let mut list = seeded(42);
        for i in 0..1000 {
            list.insert(Piece::new(Source::Added, i, 1), i / 2);
        }
        assert_eq!(list.verify(), Ok(()));
        assert_eq!(list.document_size(), 1000);
        assert!(list.levels() > 3, "levels = {}", list.levels());
    }

    impl SkipList {
        fn with_max(mut self, max_level: usize) -> SkipList {
            self.max_level = max_level;
            self
        }
    }
}
