//! Leaves with no sub-expressions to rewrite: integer literals get a fresh
//! cell pinned to their value; string and model-value literals are pooled
//! so that repeated occurrences of "the same" constant share one cell
//! (needed for `Eq` to see them as identical without a solver round trip).

use crate::arena::CellRef;
use crate::error::CoreResult;
use crate::rewrite::Rewriter;
use crate::smt::SmtTerm;

pub fn int_lit(rw: &mut Rewriter, n: i64) -> CoreResult<CellRef> {
    let cell = rw.arena.alloc_cell(crate::types::CellType::Int);
    rw.gateway.declare_int(cell);
    let pin = SmtTerm::Eq(Box::new(SmtTerm::IntVar(cell)), Box::new(SmtTerm::IntConst(n)));
    rw.gateway.assert_ground(&pin)?;
    Ok(cell)
}

pub fn str_lit(rw: &mut Rewriter, s: &str) -> CellRef {
    rw.str_cell(s)
}

pub fn const_lit(rw: &mut Rewriter, sort: &str, tag: &str) -> CellRef {
    rw.const_cell(sort, tag)
}
