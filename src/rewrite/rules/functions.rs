//! Functions are modelled as a pair of edges on a single cell: `dom` is
//! the domain set, `cdm` is the underlying relation represented as a set
//! of pairs (here: a set cell whose members are two-element tuple cells).
//! `FunSet(dom, cdm)` builds the function-*set* cell that owns those same
//! two edges one level up, per §4.4's function-set equality rule.

use crate::arena::CellRef;
use crate::error::{CoreResult, Error};
use crate::ir::{IrExpr, NodeId};
use crate::rewrite::Rewriter;
use crate::types::CellType;

/// `f[x]`: find the pair in `f`'s relation whose first component equals
/// `x`, and return its second component.
///
/// Only a *definite* match is accepted: `eq_as_cell` must collapse all the
/// way to the arena's distinguished `true` cell, which happens for an
/// identical cell reference or for two cells the equality engine has
/// already proven equal, not merely cached as `Eq` (an SMT-level equality
/// still open to either a true or false model). Building the fully
/// symbolic form — an `ite` chain over every candidate key, well-defined
/// whenever exactly one key matches in the chosen model — is future work;
/// for a concrete argument drawn from the same literal pool as the
/// relation's keys (the common case once `Eq` rewriting and constant
/// pooling are in play) this is exact. An argument that turns out not to
/// match anything concretely is a malformed-IR condition here (the full
/// system would instead consult the `Fun`'s declared default/`other` arm,
/// out of scope of this module).
pub fn fun_app(rw: &mut Rewriter, node: NodeId, f: &IrExpr, x: &IrExpr) -> CoreResult<CellRef> {
    let cf = rw.rewrite(f)?;
    let cx = rw.rewrite(x)?;
    let relation = rw
        .arena
        .cdm(cf)
        .ok_or(Error::MalformedIr { node, expected: "a function cell with a cdm edge" })?;
    for pair in rw.arena.has(relation) {
        let components = rw.arena.has(pair);
        let (Some(&key), Some(&value)) = (components.first(), components.get(1)) else {
            return Err(Error::MalformedIr { node, expected: "a two-element relation pair" });
        };
        let matches = rw.eq_engine().eq_as_cell(node, cx, key)?;
        if matches == rw.arena.cell_true() {
            return Ok(value);
        }
    }
    Err(Error::MalformedIr { node, expected: "an argument present in the function's domain" })
}

pub fn fun_set(rw: &mut Rewriter, ty: &CellType, node: NodeId, dom: &IrExpr, cdm: &IrExpr) -> CoreResult<CellRef> {
    let _ = node;
    let cdom = rw.rewrite(dom)?;
    let ccdm = rw.rewrite(cdm)?;
    let cell = rw.arena.alloc_cell(ty.clone());
    rw.arena.set_dom(cell, cdom);
    rw.arena.set_cdm(cell, ccdm);
    Ok(cell)
}
