//! Tuples: a cell whose `has` list holds its elements in positional
//! order. Unlike records, there is no name to look a field up by, so
//! `TupleGet` indexes `has` directly.

use crate::arena::CellRef;
use crate::error::{CoreResult, Error};
use crate::ir::{IrExpr, NodeId};
use crate::rewrite::Rewriter;
use crate::types::CellType;

pub fn tuple_lit(rw: &mut Rewriter, ty: &CellType, node: NodeId, xs: &[IrExpr]) -> CoreResult<CellRef> {
    let _ = node;
    let cell = rw.arena.alloc_cell(ty.clone());
    for x in xs {
        let e = rw.rewrite(x)?;
        rw.arena.append_has(cell, e);
    }
    Ok(cell)
}

pub fn tuple_get(rw: &mut Rewriter, node: NodeId, t: &IrExpr, idx: usize) -> CoreResult<CellRef> {
    let ct = rw.rewrite(t)?;
    rw.arena
        .has(ct)
        .get(idx)
        .copied()
        .ok_or(Error::MalformedIr { node, expected: "an index within the tuple's length" })
}
