//! Level-by-level rendering for debugging.
//!
//! Each row is one level, top first. A node is printed in the column of the
//! leaf its tower stands on, and dashes fill the columns its range covers.

use std::fmt;

use rustc_hash::FxHashMap;

use super::Idx;
use super::NULL;
use super::SkipList;

impl<R> SkipList<R> {
    /// The leaf a node's tower stands on.
    fn foot(&self, mut idx: Idx) -> Idx {
        while self.node(idx).down != NULL {
            idx = self.node(idx).down;
        }
        idx
    }
}

impl<R> fmt::Display for SkipList<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.top == NULL {
            return writeln!(f, "L0 | (empty)");
        }

        let mut column: FxHashMap<Idx, usize> = FxHashMap::default();
        let mut idx = self.first_leaf();
        while idx != NULL {
            column.insert(idx, column.len());
            idx = self.node(idx).next;
        }

        // (column, span) per level, top level first.
        let mut rows: Vec<Vec<(usize, usize)>> = Vec::with_capacity(self.levels);
        let mut widths = vec![1; column.len()];
        let mut head = self.top;
        while head != NULL {
            let mut row = Vec::new();
            let mut idx = head;
            while idx != NULL {
                let node = self.node(idx);
                let col = column.get(&self.foot(idx)).copied().unwrap_or_default();
                widths[col] = widths[col].max(node.span.to_string().len());
                row.push((col, node.span));
                idx = node.next;
            }
            rows.push(row);
            head = self.node(head).down;
        }

        for (i, row) in rows.iter().enumerate() {
            write!(f, "L{:<2}|", self.levels - 1 - i)?;
            let mut cells = row.iter().peekable();
            for (col, &width) in widths.iter().enumerate() {
                match cells.next_if(|(c, _)| *c == col) {
                    Some((_, span)) => write!(f, " {span:<width$}")?,
                    None => write!(f, "-{}", "-".repeat(width))?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
