//! Boolean connectives and the two predicates that bottom out in the
//! equality engine: `Eq` and `In`.

use crate::arena::CellRef;
use crate::error::CoreResult;
use crate::ir::{IrExpr, NodeId};
use crate::rewrite::Rewriter;
use crate::smt::SmtTerm;

fn materialize(rw: &mut Rewriter, term: SmtTerm) -> CoreResult<CellRef> {
    rw.eq_engine().materialize_bool(term)
}

pub fn and(rw: &mut Rewriter, node: NodeId, xs: &[IrExpr]) -> CoreResult<CellRef> {
    let _ = node;
    if xs.is_empty() {
        return Ok(rw.arena.cell_true());
    }
    let cells: Vec<CellRef> = xs.iter().map(|x| rw.rewrite(x)).collect::<CoreResult<_>>()?;
    materialize(rw, SmtTerm::And(cells.into_iter().map(SmtTerm::BoolVar).collect()))
}

pub fn or(rw: &mut Rewriter, node: NodeId, xs: &[IrExpr]) -> CoreResult<CellRef> {
    let _ = node;
    if xs.is_empty() {
        return Ok(rw.arena.cell_false());
    }
    let cells: Vec<CellRef> = xs.iter().map(|x| rw.rewrite(x)).collect::<CoreResult<_>>()?;
    materialize(rw, SmtTerm::Or(cells.into_iter().map(SmtTerm::BoolVar).collect()))
}

pub fn not(rw: &mut Rewriter, node: NodeId, x: &IrExpr) -> CoreResult<CellRef> {
    let _ = node;
    let c = rw.rewrite(x)?;
    materialize(rw, SmtTerm::not(SmtTerm::BoolVar(c)))
}

pub fn eq(rw: &mut Rewriter, node: NodeId, a: &IrExpr, b: &IrExpr) -> CoreResult<CellRef> {
    let ca = rw.rewrite(a)?;
    let cb = rw.rewrite(b)?;
    rw.eq_engine().eq_as_cell(node, ca, cb)
}

/// `a ∈ b`: under this engine's has-is-membership reading (see
/// `crate::equality`), membership is "equal to some element of `has(b)`".
pub fn in_set(rw: &mut Rewriter, node: NodeId, a: &IrExpr, b: &IrExpr) -> CoreResult<CellRef> {
    let ca = rw.rewrite(a)?;
    let cb = rw.rewrite(b)?;
    member_of(rw, node, ca, cb)
}

/// `elem ∈ set_cell` on already-rewritten cells, shared by `In` and by the
/// assignment-candidate rule, which needs exactly the same membership
/// predicate for its freshly allocated next-state cell.
pub(crate) fn member_of(rw: &mut Rewriter, node: NodeId, elem: CellRef, set_cell: CellRef) -> CoreResult<CellRef> {
    let members = rw.arena.has(set_cell);
    if members.is_empty() {
        return Ok(rw.arena.cell_false());
    }
    let mut disjuncts = Vec::with_capacity(members.len());
    for e in members {
        let eq_cell = rw.eq_engine().eq_as_cell(node, elem, e)?;
        disjuncts.push(SmtTerm::BoolVar(eq_cell));
    }
    materialize(rw, SmtTerm::Or(disjuncts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::ir::{IrKind, NodeIdGen};
    use crate::smt::TextGateway;
    use crate::types::CellType;

    fn leaf(gen: &mut NodeIdGen, ty: CellType, kind: IrKind) -> IrExpr {
        IrExpr { id: gen.next(), ty, kind }
    }

    #[test]
    fn not_of_true_is_materialized_distinctly() {
        let mut gw = TextGateway::new();
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();
        let t = leaf(&mut gen, CellType::Bool, IrKind::BoolLit(true));
        let negated = not(&mut rw, NodeId::from_raw(0), &t).unwrap();
        assert_ne!(negated, rw.arena.cell_true());
    }

    #[test]
    fn membership_in_empty_set_is_false() {
        let mut gw = TextGateway::new();
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();
        let elem = leaf(&mut gen, CellType::Int, IrKind::IntLit(1));
        let empty = leaf(&mut gen, CellType::FinSet(Box::new(CellType::Int)), IrKind::EmptySet(Box::new(CellType::Int)));
        let cell = in_set(&mut rw, NodeId::from_raw(0), &elem, &empty).unwrap();
        assert_eq!(cell, rw.arena.cell_false());
    }
}
