//! The arena (§4.1): an append-only heap of typed symbolic cells with three
//! named out-edge lists (`has`, `dom`, `cdm`) and watermark-based
//! snapshot/restore that mirrors the SMT solver's push/pop stack.
//!
//! Cells and edges are both recorded in append-only logs. Snapshotting
//! records the length of the cell log *and of each edge log*; restoring
//! truncates all four back to their recorded lengths. This is what makes
//! restore undo edges added to a cell that predates the snapshot, not just
//! cells allocated after it (§3.2's "recording the current length of the
//! cell sequence and of each edge table").

use crate::types::CellType;
use std::fmt;

/// A reference to a cell, a `Copy` newtype over its allocation index. Four
/// billion cells is far beyond what any single bounded-unrolling run
/// produces, so a `u32` avoids widening every edge table to 64 bits.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct CellRef(u32);

impl CellRef {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Snapshot handle: the watermark of the cell log and each edge log at the
/// moment `snapshot` was called.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ArenaSnapshot {
    cells: usize,
    has_edges: usize,
    dom_edges: usize,
    cdm_edges: usize,
}

/// The append-only cell heap, §3.2/§4.1.
#[derive(Clone, Debug)]
pub struct Arena {
    types: Vec<CellType>,
    has_edges: Vec<(CellRef, CellRef)>,
    dom_edges: Vec<(CellRef, CellRef)>,
    cdm_edges: Vec<(CellRef, CellRef)>,
    cell_true: CellRef,
    cell_false: CellRef,
}

impl Arena {
    /// Allocate a fresh arena with the two distinguished boolean cells.
    pub fn new() -> Self {
        let types = vec![CellType::Bool, CellType::Bool];
        Arena {
            types,
            has_edges: Vec::new(),
            dom_edges: Vec::new(),
            cdm_edges: Vec::new(),
            cell_true: CellRef(0),
            cell_false: CellRef(1),
        }
    }

    pub fn cell_true(&self) -> CellRef {
        self.cell_true
    }

    pub fn cell_false(&self) -> CellRef {
        self.cell_false
    }

    /// Append a new cell of the given type, returning its reference.
    pub fn alloc_cell(&mut self, ty: CellType) -> CellRef {
        let id = self.types.len() as u32;
        self.types.push(ty);
        CellRef(id)
    }

    /// Record a `has` edge: `c` now also has `e` among its members/contents.
    pub fn append_has(&mut self, c: CellRef, e: CellRef) {
        self.has_edges.push((c, e));
    }

    /// Set the `dom` edge for `c` (functions, function-sets, records).
    pub fn set_dom(&mut self, c: CellRef, d: CellRef) {
        self.dom_edges.push((c, d));
    }

    /// Set the `cdm` edge for `c` (functions, function-sets).
    pub fn set_cdm(&mut self, c: CellRef, r: CellRef) {
        self.cdm_edges.push((c, r));
    }

    pub fn cell_type(&self, c: CellRef) -> &CellType {
        &self.types[c.0 as usize]
    }

    /// The ordered `has` list for a cell; empty if it never had one.
    pub fn has(&self, c: CellRef) -> Vec<CellRef> {
        self.has_edges
            .iter()
            .filter(|(from, _)| *from == c)
            .map(|(_, to)| *to)
            .collect()
    }

    /// The `dom` edge for a cell, if any was set (the most recent `set_dom`
    /// call still within the current restore horizon wins).
    pub fn dom(&self, c: CellRef) -> Option<CellRef> {
        self.dom_edges
            .iter()
            .rev()
            .find(|(from, _)| *from == c)
            .map(|(_, to)| *to)
    }

    pub fn cdm(&self, c: CellRef) -> Option<CellRef> {
        self.cdm_edges
            .iter()
            .rev()
            .find(|(from, _)| *from == c)
            .map(|(_, to)| *to)
    }

    /// Number of cells currently allocated.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Record the current length of every log as a checkpoint. Pairs with
    /// the SMT gateway's `push` and the equality cache's `push` at the same
    /// logical moment (§5's lock-step scope stack).
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            cells: self.types.len(),
            has_edges: self.has_edges.len(),
            dom_edges: self.dom_edges.len(),
            cdm_edges: self.cdm_edges.len(),
        }
    }

    /// Truncate every log back to a prior snapshot. Idempotent when applied
    /// to the same handle repeatedly, since truncating an already-short
    /// vector to the same length is a no-op.
    pub fn restore(&mut self, snapshot: ArenaSnapshot) {
        self.types.truncate(snapshot.cells);
        self.has_edges.truncate(snapshot.has_edges);
        self.dom_edges.truncate(snapshot.dom_edges);
        self.cdm_edges.truncate(snapshot.cdm_edges);
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinguished_cells_are_allocated_at_init() {
        let arena = Arena::new();
        assert_eq!(arena.cell_true().id(), 0);
        assert_eq!(arena.cell_false().id(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn accessors_on_edgeless_cell_are_empty() {
        let mut arena = Arena::new();
        let c = arena.alloc_cell(CellType::FinSet(Box::new(CellType::Int)));
        assert!(arena.has(c).is_empty());
        assert_eq!(arena.dom(c), None);
        assert_eq!(arena.cdm(c), None);
    }

    #[test]
    fn has_edges_accumulate_in_order() {
        let mut arena = Arena::new();
        let set = arena.alloc_cell(CellType::FinSet(Box::new(CellType::Int)));
        let a = arena.alloc_cell(CellType::Int);
        let b = arena.alloc_cell(CellType::Int);
        arena.append_has(set, a);
        arena.append_has(set, b);
        assert_eq!(arena.has(set), vec![a, b]);
    }

    #[test]
    fn snapshot_restore_undoes_edges_on_old_cells() {
        let mut arena = Arena::new();
        let snap = arena.snapshot();
        let c1 = arena.alloc_cell(CellType::Int);
        // attach an edge to cell_true, which predates the snapshot
        arena.append_has(arena.cell_true(), c1);
        assert_eq!(arena.has(arena.cell_true()), vec![c1]);

        arena.restore(snap);
        assert_eq!(arena.len(), snap.cells);
        assert!(arena.has(arena.cell_true()).is_empty());
    }

    #[test]
    fn restore_is_idempotent() {
        let mut arena = Arena::new();
        let snap = arena.snapshot();
        arena.alloc_cell(CellType::Int);
        arena.restore(snap);
        let len_after_first = arena.len();
        arena.restore(snap);
        assert_eq!(arena.len(), len_after_first);
    }
}
