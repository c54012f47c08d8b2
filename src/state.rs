//! Per-rewrite binder environment (§3.4's bindings component). §3.4 also
//! describes the engine's overall state as arena + focus + bindings
//! threaded functionally, one fresh state per rewrite step; this crate's
//! [`crate::rewrite::Rewriter`] instead owns its arena, cache and bindings
//! as plain fields and mutates them in place across one pass over the IR
//! (see its module doc comment). The arena is still append-only, so a
//! cell handed out earlier never changes meaning, but there is no
//! separate `SymbolicState`/`Focus` value threaded between rules — "the
//! previous state" is just "the arena before this call returned", and
//! nothing in this crate needs to reconstruct it.

use crate::arena::CellRef;
use std::collections::HashMap;

/// A single binding scope: variable name to the cell it is currently bound
/// to (used by `Filter`/`Map`'s bound variable and by hybrid-style binder
/// nodes in the IR of §3.6).
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    frames: Vec<HashMap<String, CellRef>>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings { frames: vec![HashMap::new()] }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn bind(&mut self, name: &str, cell: CellRef) {
        self.frames
            .last_mut()
            .expect("bindings always has at least one frame")
            .insert(name.to_string(), cell);
    }

    /// Look a name up, innermost frame first.
    pub fn lookup(&self, name: &str) -> Option<CellRef> {
        self.frames.iter().rev().find_map(|f| f.get(name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn bindings_shadow_innermost_first() {
        let mut arena = Arena::new();
        let mut b = Bindings::new();
        let outer = arena.cell_true();
        let inner = arena.cell_false();
        b.bind("x", outer);
        b.push_frame();
        b.bind("x", inner);
        assert_eq!(b.lookup("x"), Some(inner));
        b.pop_frame();
        assert_eq!(b.lookup("x"), Some(outer));
    }
}
