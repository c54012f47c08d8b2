//! Sequences, laid out as a cell whose `has` list is the element order.
//! `crate::equality`'s sequence comparison compares `has`-list lengths
//! directly rather than a symbolic `end - start` window (this crate's
//! minimal SMT term language has no arithmetic to assert one), so
//! construction here keeps that same concrete-length reading: there is no
//! separate `start`/`end` pair of cells to maintain.

use crate::arena::CellRef;
use crate::error::{CoreResult, Error};
use crate::ir::{IrExpr, NodeId};
use crate::rewrite::Rewriter;
use crate::types::CellType;

pub fn seq_lit(rw: &mut Rewriter, ty: &CellType, node: NodeId, xs: &[IrExpr]) -> CoreResult<CellRef> {
    let _ = node;
    let cell = rw.arena.alloc_cell(ty.clone());
    for x in xs {
        let e = rw.rewrite(x)?;
        rw.arena.append_has(cell, e);
    }
    Ok(cell)
}

pub fn seq_head(rw: &mut Rewriter, node: NodeId, s: &IrExpr) -> CoreResult<CellRef> {
    let cs = rw.rewrite(s)?;
    rw.arena
        .has(cs)
        .first()
        .copied()
        .ok_or(Error::MalformedIr { node, expected: "a nonempty sequence" })
}

pub fn seq_tail(rw: &mut Rewriter, ty: &CellType, node: NodeId, s: &IrExpr) -> CoreResult<CellRef> {
    let cs = rw.rewrite(s)?;
    let elements = rw.arena.has(cs);
    if elements.is_empty() {
        return Err(Error::MalformedIr { node, expected: "a nonempty sequence" });
    }
    let result = rw.arena.alloc_cell(ty.clone());
    for e in &elements[1..] {
        rw.arena.append_has(result, *e);
    }
    Ok(result)
}

pub fn seq_append(rw: &mut Rewriter, ty: &CellType, node: NodeId, s: &IrExpr, x: &IrExpr) -> CoreResult<CellRef> {
    let _ = node;
    let cs = rw.rewrite(s)?;
    let cx = rw.rewrite(x)?;
    let result = rw.arena.alloc_cell(ty.clone());
    for e in rw.arena.has(cs) {
        rw.arena.append_has(result, e);
    }
    rw.arena.append_has(result, cx);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::ir::{IrKind, NodeIdGen};
    use crate::smt::TextGateway;

    fn leaf(gen: &mut NodeIdGen, ty: CellType, kind: IrKind) -> IrExpr {
        IrExpr { id: gen.next(), ty, kind }
    }

    #[test]
    fn tail_drops_exactly_the_head() {
        let mut gw = TextGateway::new();
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();
        let seq_e1 = leaf(&mut gen, CellType::Int, IrKind::IntLit(1));
        let seq_e2 = leaf(&mut gen, CellType::Int, IrKind::IntLit(2));
        let seq_e3 = leaf(&mut gen, CellType::Int, IrKind::IntLit(3));
        let seq = leaf(
            &mut gen,
            CellType::Seq(Box::new(CellType::Int)),
            IrKind::SeqLit(vec![seq_e1, seq_e2, seq_e3]),
        );
        let tail = leaf(&mut gen, CellType::Seq(Box::new(CellType::Int)), IrKind::SeqTail(Box::new(seq)));
        let cell = rw.rewrite(&tail).unwrap();
        assert_eq!(rw.arena.has(cell).len(), 2);
    }

    #[test]
    fn head_of_empty_sequence_is_malformed_ir() {
        let mut gw = TextGateway::new();
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();
        let seq = leaf(&mut gen, CellType::Seq(Box::new(CellType::Int)), IrKind::SeqLit(vec![]));
        let head = leaf(&mut gen, CellType::Int, IrKind::SeqHead(Box::new(seq)));
        assert!(matches!(rw.rewrite(&head), Err(Error::MalformedIr { .. })));
    }
}
