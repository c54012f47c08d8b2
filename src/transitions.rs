//! The transition extractor (§4.7, L7): splits a next-state formula into
//! its maximal top-level disjuncts and runs the assignment-strategy solver
//! (§4.6) on each independently, discarding any that turn out unsatisfiable
//! and keeping the rest as concrete, orderable transitions.
//!
//! "Maximal disjunctive" means recursively flattening nested `Or` nodes
//! only; an `And` node is never distributed over a sibling `Or`, since
//! doing so would be full disjunctive-normal-form expansion and is
//! explicitly out of scope here — the typed IR is expected to already
//! express a specification's actions as a top-level disjunction of
//! conjunctive bodies, which is the normal shape a TLA+ next-state
//! relation takes.

use crate::arena::Arena;
use crate::error::CoreResult;
use crate::ir::{IrExpr, IrKind};
use crate::smt::SmtGateway;
use crate::strategy::{solve_strategy, Strategy};

/// One surviving disjunct of the next-state formula, paired with the
/// assignment order the strategy solver found for it.
#[derive(Debug)]
pub struct Transition<'a> {
    /// §4.7's "concatenation of the transition prefix and an index":
    /// `prefix` followed by this disjunct's position among its siblings in
    /// the flattened top-level disjunction, e.g. `Next_0`, `Next_1`.
    pub key: String,
    pub formula: &'a IrExpr,
    pub strategy: Strategy,
}

fn flatten_or(expr: &IrExpr) -> Vec<&IrExpr> {
    match &expr.kind {
        IrKind::Or(xs) => xs.iter().flat_map(flatten_or).collect(),
        _ => vec![expr],
    }
}

/// Extract every satisfiable transition from `formula`. Each candidate
/// disjunct is explored in its own arena/gateway scope (mirroring §5's
/// lock-step push/pop discipline) so that an unsatisfiable disjunct's
/// cells and assertions never leak into the next one's encoding.
///
/// Transitions are returned in ascending IR node id order: deterministic
/// regardless of which disjuncts happened to solve first.
///
/// `prefix` names the next-state relation being split (e.g. `"Next"`);
/// each surviving transition's [`Transition::key`] concatenates it with
/// the disjunct's index among all top-level disjuncts, satisfied or not,
/// so a key always identifies the same source disjunct across runs.
pub fn extract_transitions<'a>(
    gateway: &mut dyn SmtGateway,
    arena: &mut Arena,
    formula: &'a IrExpr,
    variables: &[String],
    prefix: &str,
) -> CoreResult<Vec<Transition<'a>>> {
    let disjuncts = flatten_or(formula);
    let mut transitions = Vec::with_capacity(disjuncts.len());
    for (index, d) in disjuncts.into_iter().enumerate() {
        let snapshot = arena.snapshot();
        gateway.push();
        let result = solve_strategy(gateway, arena, d, variables);
        gateway.pop();
        arena.restore(snapshot);
        if let Some(strategy) = result? {
            transitions.push(Transition { key: format!("{prefix}_{index}"), formula: d, strategy });
        }
    }
    transitions.sort_by_key(|t| t.formula.id);
    Ok(transitions)
}

#[cfg(all(test, feature = "z3-backend"))]
mod tests {
    use super::*;
    use crate::ir::NodeIdGen;
    use crate::smt::Z3Gateway;
    use crate::types::CellType;
    use z3::{Config, Context};

    fn assign_leaf(gen: &mut NodeIdGen, lhs: &str, reads: &[&str]) -> IrExpr {
        let rhs_vars: Vec<IrExpr> = reads
            .iter()
            .map(|r| IrExpr { id: gen.next(), ty: CellType::Int, kind: IrKind::Variable(r.to_string()) })
            .collect();
        let rhs = IrExpr {
            id: gen.next(),
            ty: CellType::FinSet(Box::new(CellType::Int)),
            kind: IrKind::SetEnum(rhs_vars),
        };
        IrExpr {
            id: gen.next(),
            ty: CellType::Bool,
            kind: IrKind::Assign { lhs: lhs.to_string(), rhs: Box::new(rhs) },
        }
    }

    #[test]
    fn each_disjunct_becomes_its_own_transition() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut gw = Z3Gateway::new(&ctx);
        let mut arena = Arena::new();
        let mut gen = NodeIdGen::new();
        let a = assign_leaf(&mut gen, "x", &[]);
        let b = assign_leaf(&mut gen, "x", &[]);
        let formula = IrExpr { id: gen.next(), ty: CellType::Bool, kind: IrKind::Or(vec![a, b]) };
        let transitions = extract_transitions(&mut gw, &mut arena, &formula, &["x".to_string()], "Next").unwrap();
        assert_eq!(transitions.len(), 2);
        let mut keys: Vec<&str> = transitions.iter().map(|t| t.key.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["Next_0", "Next_1"]);
    }

    #[test]
    fn an_unsatisfiable_disjunct_is_discarded() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut gw = Z3Gateway::new(&ctx);
        let mut arena = Arena::new();
        let mut gen = NodeIdGen::new();
        let good = IrExpr {
            id: gen.next(),
            ty: CellType::Bool,
            kind: IrKind::And(vec![assign_leaf(&mut gen, "x", &[]), assign_leaf(&mut gen, "y", &[])]),
        };
        let bad = IrExpr {
            id: gen.next(),
            ty: CellType::Bool,
            kind: IrKind::And(vec![
                assign_leaf(&mut gen, "x", &["y"]),
                assign_leaf(&mut gen, "y", &["x"]),
            ]),
        };
        let formula = IrExpr { id: gen.next(), ty: CellType::Bool, kind: IrKind::Or(vec![good, bad]) };
        // `bad`'s two candidates mutually read each other's variable, so
        // its (cyclic) ordering constraint is unsatisfiable on its own;
        // `good` has no such cycle and survives.
        let transitions =
            extract_transitions(&mut gw, &mut arena, &formula, &["x".to_string(), "y".to_string()], "Next").unwrap();
        assert_eq!(transitions.len(), 1);
    }

    #[test]
    fn a_nonsplittable_and_node_stays_a_single_transition() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut gw = Z3Gateway::new(&ctx);
        let mut arena = Arena::new();
        let mut gen = NodeIdGen::new();
        let a = assign_leaf(&mut gen, "x", &[]);
        let b = assign_leaf(&mut gen, "y", &[]);
        let formula = IrExpr { id: gen.next(), ty: CellType::Bool, kind: IrKind::And(vec![a, b]) };
        let transitions =
            extract_transitions(&mut gw, &mut arena, &formula, &["x".to_string(), "y".to_string()], "Next").unwrap();
        assert_eq!(transitions.len(), 1);
    }
}
