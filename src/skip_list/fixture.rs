//! A hand-wired three level list for tests that must not depend on `insert`.
//!
//! ```text
//! L2 | 115----------- 15--
//! L1 | 90 ------ 25-- 15--
//! L0 | 30  50 10 20 5 10 5
//! ```

use super::Idx;
use super::SkipList;
use crate::config::Config;
use crate::piece::Piece;
use crate::piece::Source;

pub(super) fn fixture() -> SkipList {
    let mut list = SkipList::with_config(&Config::default().with_seed(7));

    let mut leaves: Vec<Idx> = Vec::new();
    let mut start = 0;
    for span in [30, 50, 10, 20, 5, 10, 5] {
        let idx = list.alloc(span, Piece::new(Source::Original, start, span));
        if let Some(&last) = leaves.last() {
            list.link_after(last, idx);
        }
        leaves.push(idx);
        start += span;
    }
    list.leaf_count = leaves.len();
    list.document_size = start;

    let level1 = stack(&mut list, &[(leaves[0], 90), (leaves[3], 25), (leaves[5], 15)]);
    let level2 = stack(&mut list, &[(level1[0], 115), (level1[2], 15)]);
    list.top = level2[0];
    list.levels = 3;
    list
}

/// Build one level of index nodes standing on the given nodes.
fn stack(list: &mut SkipList, below: &[(Idx, usize)]) -> Vec<Idx> {
    let mut level: Vec<Idx> = Vec::new();
    for &(down, span) in below {
        let idx = list.alloc(span, Piece::default());
        list.node_mut(idx).down = down;
        list.node_mut(down).up = idx;
        if let Some(&last) = level.last() {
            list.link_after(last, idx);
        }
        level.push(idx);
    }
    level
}
