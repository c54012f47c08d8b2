//! End-to-end exercises of the rewriter driving the lazy equality engine.
//!
//! Everything that the equality cache can resolve *structurally* — an
//! outright type/shape mismatch collapsing to `EqEntry::False` — is
//! checked directly against a [`TextGateway`], no solver required. Claims
//! that only hold once the asserted SMT constraints are actually decided
//! (two sets built from the same literal pool, a record field pinned to
//! different integers) are checked against a live [`Z3Gateway`] by proving
//! the negation of the expected fact is unsatisfiable.

use apalache_symbolic_core::arena::Arena;
use apalache_symbolic_core::ir::{IrExpr, IrKind, NodeIdGen};
use apalache_symbolic_core::rewrite::Rewriter;
use apalache_symbolic_core::smt::{SmtGateway, SmtTerm, TextGateway};
use apalache_symbolic_core::types::CellType;

fn leaf(gen: &mut NodeIdGen, ty: CellType, kind: IrKind) -> IrExpr {
    IrExpr { id: gen.next(), ty, kind }
}

#[test]
fn records_with_mismatched_schemas_are_never_equal() {
    let mut gw = TextGateway::new();
    let mut rw = Rewriter::new(Arena::new(), &mut gw);
    let mut gen = NodeIdGen::new();

    let ty_a = CellType::Record(vec![("x".to_string(), CellType::Int)]);
    let ty_b = CellType::Record(vec![("x".to_string(), CellType::Int), ("y".to_string(), CellType::Int)]);

    let a_x = leaf(&mut gen, CellType::Int, IrKind::IntLit(1));
    let a = leaf(&mut gen, ty_a, IrKind::RecordLit(vec![("x".to_string(), a_x)]));
    let b_x = leaf(&mut gen, CellType::Int, IrKind::IntLit(1));
    let b_y = leaf(&mut gen, CellType::Int, IrKind::IntLit(2));
    let b = leaf(
        &mut gen,
        ty_b,
        IrKind::RecordLit(vec![("x".to_string(), b_x), ("y".to_string(), b_y)]),
    );
    let eq = leaf(&mut gen, CellType::Bool, IrKind::Eq(Box::new(a), Box::new(b)));

    let cell = rw.rewrite(&eq).unwrap();
    assert_eq!(cell, rw.arena.cell_false());
}

#[cfg(feature = "z3-backend")]
mod semantic {
    use super::*;
    use apalache_symbolic_core::smt::{SatResult, Z3Gateway};
    use z3::{Config, Context};

    /// Prove `result` is forced `true` in every model by checking that
    /// asserting its negation is unsatisfiable.
    fn assert_provably_true(gw: &mut dyn SmtGateway, result: apalache_symbolic_core::arena::CellRef) {
        gw.push();
        gw.assert_ground(&SmtTerm::not(SmtTerm::BoolVar(result))).unwrap();
        assert_eq!(gw.check_sat().unwrap(), SatResult::Unsat);
        gw.pop();
    }

    /// Prove `result` is forced `false` in every model.
    fn assert_provably_false(gw: &mut dyn SmtGateway, result: apalache_symbolic_core::arena::CellRef) {
        gw.push();
        gw.assert_ground(&SmtTerm::BoolVar(result)).unwrap();
        assert_eq!(gw.check_sat().unwrap(), SatResult::Unsat);
        gw.pop();
    }

    #[test]
    fn two_empty_sets_are_provably_equal() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut gw = Z3Gateway::new(&ctx);
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();

        let a = leaf(
            &mut gen,
            CellType::FinSet(Box::new(CellType::Unknown)),
            IrKind::EmptySet(Box::new(CellType::Unknown)),
        );
        let b = leaf(
            &mut gen,
            CellType::FinSet(Box::new(CellType::Unknown)),
            IrKind::EmptySet(Box::new(CellType::Unknown)),
        );
        let eq = leaf(&mut gen, CellType::Bool, IrKind::Eq(Box::new(a), Box::new(b)));
        let result = rw.rewrite(&eq).unwrap();
        assert_provably_true(rw.gateway, result);
    }

    #[test]
    fn two_singletons_sharing_a_pooled_element_are_provably_equal() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut gw = Z3Gateway::new(&ctx);
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();

        let mk_singleton = |gen: &mut NodeIdGen| {
            leaf(
                gen,
                CellType::FinSet(Box::new(CellType::Str)),
                IrKind::SetEnum(vec![leaf(gen, CellType::Str, IrKind::StrLit("p".to_string()))]),
            )
        };
        let a = mk_singleton(&mut gen);
        let b = mk_singleton(&mut gen);
        let eq = leaf(&mut gen, CellType::Bool, IrKind::Eq(Box::new(a), Box::new(b)));
        let result = rw.rewrite(&eq).unwrap();
        assert_provably_true(rw.gateway, result);
    }

    #[test]
    fn records_pinned_to_different_field_values_are_provably_unequal() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut gw = Z3Gateway::new(&ctx);
        let mut rw = Rewriter::new(Arena::new(), &mut gw);
        let mut gen = NodeIdGen::new();

        let ty = CellType::Record(vec![("x".to_string(), CellType::Int)]);
        let a = leaf(
            &mut gen,
            ty.clone(),
            IrKind::RecordLit(vec![("x".to_string(), leaf(&mut gen, CellType::Int, IrKind::IntLit(1)))]),
        );
        let b = leaf(
            &mut gen,
            ty,
            IrKind::RecordLit(vec![("x".to_string(), leaf(&mut gen, CellType::Int, IrKind::IntLit(2)))]),
        );
        let eq = leaf(&mut gen, CellType::Bool, IrKind::Eq(Box::new(a), Box::new(b)));
        let result = rw.rewrite(&eq).unwrap();
        assert_provably_false(rw.gateway, result);
    }
}
