//! The assignment-candidate leaf (§3.5/§4.6): `lhs' ∈ rhs`. The rewriter's
//! job here is only to give the candidate a concrete next-state cell and
//! the membership predicate that makes it a well-formed boolean term; the
//! assignment *strategy* itself — choosing which candidates actually fire,
//! and in what order — is [`crate::strategy`]'s job, working from the IR
//! tree, not from this cell.

use crate::arena::CellRef;
use crate::error::CoreResult;
use crate::ir::{IrExpr, NodeId};
use crate::rewrite::rules::booleans::member_of;
use crate::rewrite::Rewriter;
use crate::types::CellType;

pub fn assign(rw: &mut Rewriter, node: NodeId, lhs: &str, rhs: &IrExpr) -> CoreResult<CellRef> {
    let crhs = rw.rewrite(rhs)?;
    let next_key = format!("{lhs}'");
    let next_cell = match rw.bindings.lookup(&next_key) {
        Some(c) => c,
        None => {
            let elem_ty = match rw.arena.cell_type(crhs) {
                CellType::FinSet(e) => (**e).clone(),
                other => other.clone(),
            };
            let c = rw.arena.alloc_cell(elem_ty);
            rw.bindings.bind(&next_key, c);
            c
        }
    };
    member_of(rw, node, next_cell, crhs)
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
    fn assign_binds_a_next_state_cell_for_the_variable() {
        let mut gw = TextGateway::new();
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();
        let rhs_elem = leaf(&mut gen, CellType::Int, IrKind::IntLit(5));
        let rhs = leaf(&mut gen, CellType::FinSet(Box::new(CellType::Int)), IrKind::SetEnum(vec![rhs_elem]));
        let candidate = leaf(
            &mut gen,
            CellType::Bool,
            IrKind::Assign { lhs: "v".to_string(), rhs: Box::new(rhs) },
        );
        rw.rewrite(&candidate).unwrap();
        assert!(rw.bindings.lookup("v'").is_some());
    }
}
