//! End-to-end transition extraction: a next-state formula in disjunctive
//! normal-enough form splits into one [`Transition`] per satisfiable
//! top-level disjunct, each solved in its own scratch scope.

#![cfg(feature = "z3-backend")]

use apalache_symbolic_core::arena::Arena;
use apalache_symbolic_core::ir::{IrExpr, IrKind, NodeIdGen};
use apalache_symbolic_core::smt::Z3Gateway;
use apalache_symbolic_core::transitions::extract_transitions;
use apalache_symbolic_core::types::CellType;
use z3::{Config, Context};

fn leaf(gen: &mut NodeIdGen, ty: CellType, kind: IrKind) -> IrExpr {
    IrExpr { id: gen.next(), ty, kind }
}

fn assign_leaf(gen: &mut NodeIdGen, lhs: &str, reads: &[&str]) -> IrExpr {
    let rhs = if reads.is_empty() {
        leaf(gen, CellType::Bool, IrKind::BoolLit(true))
    } else {
        let vars: Vec<IrExpr> = reads
            .iter()
            .map(|r| leaf(gen, CellType::Int, IrKind::Variable(r.to_string())))
            .collect();
        leaf(gen, CellType::FinSet(Box::new(CellType::Int)), IrKind::SetEnum(vars))
    };
    leaf(gen, CellType::Bool, IrKind::Assign { lhs: lhs.to_string(), rhs: Box::new(rhs) })
}

#[test]
fn one_satisfiable_and_one_cyclic_disjunct_yields_a_single_transition() {
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let mut gw = Z3Gateway::new(&ctx);
    let mut arena = Arena::new();
    let mut gen = NodeIdGen::new();
    let variables = vec!["x".to_string(), "y".to_string()];

    let good = leaf(
        &mut gen,
        CellType::Bool,
        IrKind::And(vec![assign_leaf(&mut gen, "x", &[]), assign_leaf(&mut gen, "y", &[])]),
    );
    let bad = leaf(
        &mut gen,
        CellType::Bool,
        IrKind::And(vec![assign_leaf(&mut gen, "x", &["y"]), assign_leaf(&mut gen, "y", &["x"])]),
    );
    let formula = leaf(&mut gen, CellType::Bool, IrKind::Or(vec![good, bad]));

    let transitions = extract_transitions(&mut gw, &mut arena, &formula, &variables, "Next").unwrap();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].strategy.order.len(), 2);
}

#[test]
fn nested_or_nodes_flatten_into_independent_transitions() {
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let mut gw = Z3Gateway::new(&ctx);
    let mut arena = Arena::new();
    let mut gen = NodeIdGen::new();
    let variables = vec!["x".to_string()];

    let inner = leaf(
        &mut gen,
        CellType::Bool,
        IrKind::Or(vec![assign_leaf(&mut gen, "x", &[]), assign_leaf(&mut gen, "x", &[])]),
    );
    let formula = leaf(&mut gen, CellType::Bool, IrKind::Or(vec![inner, assign_leaf(&mut gen, "x", &[])]));

    let transitions = extract_transitions(&mut gw, &mut arena, &formula, &variables, "Next").unwrap();
    assert_eq!(transitions.len(), 3);
}

#[test]
fn a_bare_and_formula_with_no_or_stays_a_single_transition() {
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let mut gw = Z3Gateway::new(&ctx);
    let mut arena = Arena::new();
    let mut gen = NodeIdGen::new();
    let variables = vec!["x".to_string(), "y".to_string()];

    let formula = leaf(
        &mut gen,
        CellType::Bool,
        IrKind::And(vec![assign_leaf(&mut gen, "x", &[]), assign_leaf(&mut gen, "y", &["x"])]),
    );

    let transitions = extract_transitions(&mut gw, &mut arena, &formula, &variables, "Next").unwrap();
    assert_eq!(transitions.len(), 1);
}
