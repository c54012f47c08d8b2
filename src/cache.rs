//! The equality cache (§3.3/§4.3): a scoped mapping from an unordered cell
//! pair to an [`EqEntry`], stacked to match the SMT gateway's push/pop
//! depth.

use crate::arena::CellRef;
use std::collections::HashMap;

/// An unordered pair of cells, used as the cache key. Cells are ordered by
/// id so that `{a, b}` and `{b, a}` hash identically.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CellPair(CellRef, CellRef);

impl CellPair {
    pub fn new(a: CellRef, b: CellRef) -> Self {
        if a <= b {
            CellPair(a, b)
        } else {
            CellPair(b, a)
        }
    }
}

/// One of the four possible cache entries (§3.3).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EqEntry {
    /// `a = b` has been proven.
    True,
    /// `a = b` is impossible.
    False,
    /// Structural constraints have been asserted; native SMT `=` is sound.
    Eq,
    /// `a = b` is equivalent to the boolean cell `p`.
    Expr(CellRef),
}

#[derive(Clone, Copy, Debug)]
struct TaggedEntry {
    entry: EqEntry,
    level: usize,
}

/// The scoped equality cache. Each `push` records the map's size at that
/// moment; `pop` discards every entry inserted since, mirroring the arena
/// and the SMT solver's own scope stacks (§5).
#[derive(Debug, Default)]
pub struct EqualityCache {
    map: HashMap<CellPair, TaggedEntry>,
    /// insertion order, so pop can find exactly which keys to remove
    /// without scanning the whole map by level.
    order: Vec<CellPair>,
    scope_marks: Vec<usize>,
}

/// Recoverable snapshot of the cache's insertion history, usable across
/// distinct `EqualityCache` instances of the same structural shape (i.e.
/// built up through the same sequence of operations) — enabling
/// speculative exploration of search branches without committing state
/// until a branch is chosen.
#[derive(Clone, Debug)]
pub struct CacheSnapshot {
    order_len: usize,
}

impl EqualityCache {
    pub fn new() -> Self {
        EqualityCache::default()
    }

    pub fn get(&self, a: CellRef, b: CellRef) -> Option<EqEntry> {
        if a == b {
            return Some(EqEntry::True);
        }
        self.map.get(&CellPair::new(a, b)).map(|t| t.entry)
    }

    pub fn put(&mut self, a: CellRef, b: CellRef, entry: EqEntry) {
        let key = CellPair::new(a, b);
        let level = self.scope_marks.len();
        if self.map.insert(key, TaggedEntry { entry, level }).is_none() {
            self.order.push(key);
        }
    }

    pub fn context_level(&self) -> usize {
        self.scope_marks.len()
    }

    pub fn push(&mut self) {
        self.scope_marks.push(self.order.len());
    }

    pub fn pop(&mut self) {
        if let Some(mark) = self.scope_marks.pop() {
            for key in self.order.drain(mark..) {
                self.map.remove(&key);
            }
        }
    }

    /// Capture the current insertion-history length as a recoverable point.
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            order_len: self.order.len(),
        }
    }

    /// Roll back to a previously captured snapshot. Differs from `pop` in
    /// that it does not require the snapshot to align with a scope
    /// boundary — any snapshot taken earlier in the same insertion history
    /// can be recovered, which is what lets the equality engine explore a
    /// branch and abandon it without the caller also managing explicit
    /// `push`/`pop` pairs for every speculative step.
    pub fn recover(&mut self, snapshot: &CacheSnapshot) {
        for key in self.order.drain(snapshot.order_len..) {
            self.map.remove(&key);
        }
        self.scope_marks.retain(|&m| m <= snapshot.order_len);
    }
}
