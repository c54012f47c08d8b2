//! Records: a cell whose `has` list holds one value cell per field, in
//! the order the cell's own `CellType::Record` schema lists them.

use crate::arena::CellRef;
use crate::error::{CoreResult, Error};
use crate::ir::{IrExpr, NodeId};
use crate::rewrite::Rewriter;
use crate::types::CellType;

pub fn record_lit(rw: &mut Rewriter, ty: &CellType, node: NodeId, fields: &[(String, IrExpr)]) -> CoreResult<CellRef> {
    let _ = node;
    let cell = rw.arena.alloc_cell(ty.clone());
    for (_, value) in fields {
        let v = rw.rewrite(value)?;
        rw.arena.append_has(cell, v);
    }
    Ok(cell)
}

pub fn record_get(rw: &mut Rewriter, node: NodeId, r: &IrExpr, field: &str) -> CoreResult<CellRef> {
    let cr = rw.rewrite(r)?;
    let schema = match rw.arena.cell_type(cr) {
        CellType::Record(fields) => fields.clone(),
        _ => return Err(Error::MalformedIr { node, expected: "a record cell" }),
    };
    let index = schema
        .iter()
        .position(|(name, _)| name == field)
        .ok_or(Error::MalformedIr { node, expected: "a field present in the record's schema" })?;
    rw.arena
        .has(cr)
        .get(index)
        .copied()
        .ok_or(Error::MalformedIr { node, expected: "a value cell for every schema field" })
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
    fn record_get_reads_back_the_written_field() {
        let mut gw = TextGateway::new();
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();
        let ty = CellType::Record(vec![("x".to_string(), CellType::Int), ("y".to_string(), CellType::Int)]);
        let lit_x = leaf(&mut gen, CellType::Int, IrKind::IntLit(1));
        let lit_y = leaf(&mut gen, CellType::Int, IrKind::IntLit(2));
        let lit = leaf(
            &mut gen,
            ty,
            IrKind::RecordLit(vec![("x".to_string(), lit_x), ("y".to_string(), lit_y)]),
        );
        let get_y = leaf(&mut gen, CellType::Int, IrKind::RecordGet(Box::new(lit), "y".to_string()));
        let cell = rw.rewrite(&get_y).unwrap();
        assert_eq!(*rw.arena.cell_type(cell), CellType::Int);
    }
}
