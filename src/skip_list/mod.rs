//! Augmented skip list over pieces.
//!
//! The bottom level is a doubly linked list of leaves in document order, one
//! piece per leaf. Every level above it partitions the level below into
//! ranges: an index node stands on the first node of its range (`down`) and
//! its span is the number of document bytes in that range.
//!
//! ```text
//! L2 | 115----------- 15--
//! L1 | 90 ------ 25-- 15--
//! L0 | 30  50 10 20 5 10 5
//! ```
//!
//! # Invariants
//!
//! - Every level is a doubly linked list whose spans sum to the document size.
//! - A leaf's span equals its piece length and is never zero.
//! - An index node's span is the sum of the spans from its `down` node up to
//!   (not including) the `down` node of its successor.
//! - The head of each level stands on the head of the level below.
//! - `up` and `down` are reciprocal.
//! - The top level has at least two nodes unless it is level 0.
//!
//! # Operations
//!
//! - `search(offset)`: walks each level while the offset covers the whole
//!   span, then drops down. Landing on a node whose span equals the remaining
//!   offset moves past it, so the result is the first leaf that strictly
//!   contains the offset (or the last leaf at the document end).
//! - `insert(piece, offset)`: one top-down pass that also grows every span on
//!   the way, then a splice at level 0 and a coin-flip promotion.
//! - `delete_range(start, end)`: trims the two boundary leaves, removes the
//!   leaves between them and folds removed towers into their left neighbours.
//!
//! Nodes live in an arena and refer to each other by index. Freed slots are
//! reused and carry a generation so stale [`NodeId`]s are detected.

mod delete;
mod display;
mod insert;
mod rng;
mod verify;

#[cfg(test)]
mod fixture;

pub use rng::Xorshift;
pub use verify::Violation;

use rand_core::RngCore;
use rand_core::SeedableRng;
use smallvec::SmallVec;

use crate::config::Config;
use crate::piece::Piece;

/// Hard cap on the number of levels, counting level 0. Promotion draws one
/// `u32` and counts its trailing ones, so taller towers never occur.
pub const MAX_LEVEL: usize = u32::BITS as usize;

/// Node index type.
type Idx = u32;

/// Null index marker.
const NULL: Idx = Idx::MAX;

/// The chain of index nodes above a leaf, bottom first.
type Tower = SmallVec<[Idx; 8]>;

/// A node at any level. Leaves carry a piece; index nodes carry an empty one.
struct Node {
    span: usize,
    piece: Piece,
    prev: Idx,
    next: Idx,
    up: Idx,
    down: Idx,
    /// Bumped every time the slot is released.
    generation: u32,
}

impl Node {
    fn new(span: usize, piece: Piece) -> Node {
        Node {
            span,
            piece,
            prev: NULL,
            next: NULL,
            up: NULL,
            down: NULL,
            generation: 0,
        }
    }
}

/// A handle to a leaf. Becomes stale once the leaf is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: Idx,
    generation: u32,
}

/// The result of a search: the leaf holding an offset and where in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub leaf: NodeId,
    pub piece: Piece,
    /// Offset of the searched position within `piece`.
    pub residual: usize,
}

/// A skip list of pieces indexed by logical byte offset.
pub struct SkipList<R = Xorshift> {
    /// Arena of nodes.
    nodes: Vec<Node>,
    /// Released slots ready for reuse.
    free_list: Vec<Idx>,
    /// Head of the top level, or `NULL` when empty.
    top: Idx,
    /// Number of levels including level 0. Zero when empty.
    levels: usize,
    /// Sum of all leaf spans.
    document_size: usize,
    /// Number of leaves.
    leaf_count: usize,
    max_level: usize,
    rng: R,
}

impl SkipList<Xorshift> {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => Xorshift::seed_from_u64(seed),
            None => Xorshift::from_os(),
        };
        Self::with_rng(rng, config.max_level)
    }
}

impl Default for SkipList<Xorshift> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> SkipList<R> {
    /// Build an empty list drawing promotion coins from `rng`.
    pub fn with_rng(rng: R, max_level: usize) -> Self {
        SkipList {
            nodes: Vec::new(),
            free_list: Vec::new(),
            top: NULL,
            levels: 0,
            document_size: 0,
            leaf_count: 0,
            max_level: max_level.clamp(1, MAX_LEVEL),
            rng,
        }
    }

    /// Total number of bytes in the document.
    pub fn document_size(&self) -> usize {
        self.document_size
    }

    /// Number of pieces.
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Number of levels, counting level 0.
    pub fn levels(&self) -> usize {
        self.levels
    }

    // --- Node access helpers ---

    fn node(&self, idx: Idx) -> &Node {
        &self.nodes[idx as usize]
    }

    fn node_mut(&mut self, idx: Idx) -> &mut Node {
        &mut self.nodes[idx as usize]
    }

    fn alloc(&mut self, span: usize, piece: Piece) -> Idx {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.node(idx).generation;
            *self.node_mut(idx) = Node { generation, ..Node::new(span, piece) };
            return idx;
        }
        let idx = self.nodes.len() as Idx;
        self.nodes.push(Node::new(span, piece));
        idx
    }

    fn release(&mut self, idx: Idx) {
        let node = self.node_mut(idx);
        let generation = node.generation.wrapping_add(1);
        *node = Node { generation, ..Node::new(0, Piece::default()) };
        self.free_list.push(idx);
    }

    fn id(&self, idx: Idx) -> NodeId {
        NodeId {
            index: idx,
            generation: self.node(idx).generation,
        }
    }

    /// Resolve a handle, rejecting stale ones and index nodes.
    fn resolve(&self, id: NodeId) -> Option<Idx> {
        let node = self.nodes.get(id.index as usize)?;
        if node.generation != id.generation || node.down != NULL || node.span == 0 {
            return None;
        }
        Some(id.index)
    }

    /// Head of level 0.
    fn first_leaf(&self) -> Idx {
        let mut idx = self.top;
        while idx != NULL && self.node(idx).down != NULL {
            idx = self.node(idx).down;
        }
        idx
    }

    fn link_after(&mut self, anchor: Idx, idx: Idx) {
        let next = self.node(anchor).next;
        {
            let node = self.node_mut(idx);
            node.prev = anchor;
            node.next = next;
        }
        if next != NULL {
            self.node_mut(next).prev = idx;
        }
        self.node_mut(anchor).next = idx;
    }

    fn link_before(&mut self, anchor: Idx, idx: Idx) {
        let prev = self.node(anchor).prev;
        {
            let node = self.node_mut(idx);
            node.prev = prev;
            node.next = anchor;
        }
        if prev != NULL {
            self.node_mut(prev).next = idx;
        }
        self.node_mut(anchor).prev = idx;
    }

    fn unlink(&mut self, idx: Idx) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        if prev != NULL {
            self.node_mut(prev).next = next;
        }
        if next != NULL {
            self.node_mut(next).prev = prev;
        }
        let node = self.node_mut(idx);
        node.prev = NULL;
        node.next = NULL;
    }

    fn tower(&self, idx: Idx) -> Tower {
        let mut tower = Tower::new();
        let mut up = self.node(idx).up;
        while up != NULL {
            tower.push(up);
            up = self.node(up).up;
        }
        tower
    }

    // --- Search ---

    /// Walk right along one level while the offset covers a whole span.
    fn walk(&self, mut idx: Idx, mut offset: usize) -> (Idx, usize) {
        loop {
            let node = self.node(idx);
            if node.next == NULL || offset < node.span {
                return (idx, offset);
            }
            offset -= node.span;
            idx = node.next;
        }
    }

    /// Find the leaf containing `offset`. The list must not be empty.
    fn find(&self, offset: usize) -> (Idx, usize) {
        let (mut idx, mut offset) = (self.top, offset);
        loop {
            (idx, offset) = self.walk(idx, offset);
            let down = self.node(idx).down;
            if down == NULL {
                return (idx, offset);
            }
            idx = down;
        }
    }

    /// Like `find`, but adds `grow` to every index node descended through.
    fn locate(&mut self, offset: usize, grow: usize) -> (Idx, usize) {
        let (mut idx, mut offset) = (self.top, offset);
        loop {
            (idx, offset) = self.walk(idx, offset);
            let node = self.node_mut(idx);
            if node.down == NULL {
                return (idx, offset);
            }
            node.span += grow;
            idx = node.down;
        }
    }

    /// Find the leaf holding the byte at `offset`.
    ///
    /// `offset == document_size()` yields the last leaf with its full span
    /// as the residual. Returns `None` when empty or past the end.
    pub fn search(&self, offset: usize) -> Option<Cursor> {
        if self.top == NULL || offset > self.document_size {
            return None;
        }
        let (idx, residual) = self.find(offset);
        Some(Cursor {
            leaf: self.id(idx),
            piece: self.node(idx).piece,
            residual,
        })
    }

    /// The piece held by a leaf, if the handle is still live.
    pub fn piece(&self, id: NodeId) -> Option<Piece> {
        let idx = self.resolve(id)?;
        Some(self.node(idx).piece)
    }

    /// Iterate over all pieces in document order.
    pub fn pieces(&self) -> Pieces<'_, R> {
        Pieces {
            list: self,
            current: self.first_leaf(),
        }
    }

    /// Iterate over pieces starting at `id`. Empty for a stale handle.
    pub fn pieces_from(&self, id: NodeId) -> Pieces<'_, R> {
        Pieces {
            list: self,
            current: self.resolve(id).unwrap_or(NULL),
        }
    }

    // --- Span propagation ---

    /// Add `delta` to every index node whose range contains `idx`.
    fn fix_list(&mut self, mut idx: Idx, delta: isize) {
        if delta == 0 {
            return;
        }
        loop {
            while self.node(idx).up == NULL {
                idx = self.node(idx).prev;
                if idx == NULL {
                    return;
                }
            }
            idx = self.node(idx).up;
            let node = self.node_mut(idx);
            debug_assert!(delta >= 0 || node.span >= delta.unsigned_abs());
            node.span = node.span.wrapping_add_signed(delta);
        }
    }

    // --- Invariant checking ---

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        if let Err(violation) = self.verify() {
            panic!("INVARIANT VIOLATED: {}", violation);
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn check_invariants(&self) {}
}

impl<R: RngCore> SkipList<R> {
    /// Number of levels to add above a fresh leaf: count heads before the
    /// first tails.
    fn random_height(&mut self) -> usize {
        self.rng.next_u32().trailing_ones() as usize
    }
}

/// In-order iterator over the pieces of a skip list.
pub struct Pieces<'a, R> {
    list: &'a SkipList<R>,
    current: Idx,
}

impl<'a, R> Iterator for Pieces<'a, R> {
    type Item = Piece;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NULL {
            return None;
        }
        let node = self.list.node(self.current);
        self.current = node.next;
        Some(node.piece)
    }
}
