//! The assignment-strategy solver (§4.6): given a next-state formula built
//! from nested `/\`/`\/` over `Assign` leaves, decide whether some subset
//! of the candidates can be chosen and totally ordered so that evaluating
//! them in that order is well-defined (every candidate's right-hand side
//! only reads variables already assigned by an earlier candidate in the
//! same disjunctive branch), and if so, produce one such order.
//!
//! The abstract design calls for an uninterpreted function `R : Int -> Int`
//! ranking the chosen candidates. The candidate set is finite and known
//! before encoding, so this gateway gives each candidate its own plain
//! integer cell instead of declaring a genuine SMT uninterpreted function —
//! the two are equisatisfiable here, and it collapses the nominal
//! `QF_UFLIA` logic this module would otherwise need down to `QF_LIA`
//! (recorded as a deliberate scope decision, not an oversight).

use crate::arena::Arena;
use crate::error::{CoreResult, Error};
use crate::ir::{IrExpr, IrKind, NodeId};
use crate::smt::{SatResult, SmtGateway, SmtTerm};
use crate::types::CellType;
use std::collections::{HashMap, HashSet};

/// One `lhs' \in rhs` leaf of the next-state formula, with its read set
/// already extracted (§4.6's `rvars(j)`).
#[derive(Clone, Debug)]
pub struct Candidate {
    pub id: NodeId,
    pub lvar: String,
    pub rvars: HashSet<String>,
}

/// A satisfying assignment order: the candidates to fire, earliest first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Strategy {
    pub order: Vec<NodeId>,
}

/// `δ_v(φ)`: the condition, expressed over the candidates' firing
/// booleans, under which the formula commits to assigning `v` somewhere in
/// its tree. Kept as its own small tree rather than an `SmtTerm` so the
/// And/Or-inversion simplification can happen before any cells exist.
#[derive(Clone, Debug)]
enum Delta {
    False,
    Candidate(NodeId),
    And(Vec<Delta>),
    Or(Vec<Delta>),
}

fn simplify_and(parts: Vec<Delta>) -> Delta {
    let mut kept = Vec::new();
    for p in parts {
        match p {
            Delta::False => return Delta::False,
            Delta::And(xs) => kept.extend(xs),
            other => kept.push(other),
        }
    }
    match kept.len() {
        0 => Delta::False,
        1 => kept.into_iter().next().unwrap(),
        _ => Delta::And(kept),
    }
}

fn simplify_or(parts: Vec<Delta>) -> Delta {
    let mut kept = Vec::new();
    for p in parts {
        match p {
            Delta::False => {}
            Delta::Or(xs) => kept.extend(xs),
            other => kept.push(other),
        }
    }
    match kept.len() {
        0 => Delta::False,
        1 => kept.into_iter().next().unwrap(),
        _ => Delta::Or(kept),
    }
}

/// `δ_v` by structural recursion (§4.6): a leaf contributes itself iff it
/// assigns `v`; an `∧`-node's `δ_v` is the *disjunction* of its children's
/// (any conjunct committing to `v` is enough); an `∨`-node's is the
/// *conjunction* (every disjunctive branch must commit, since only one
/// branch will actually be taken). Every other node kind is an opaque
/// guard and contributes `False`.
fn delta_of(expr: &IrExpr, v: &str) -> Delta {
    match &expr.kind {
        IrKind::Assign { lhs, .. } => {
            if lhs == v {
                Delta::Candidate(expr.id)
            } else {
                Delta::False
            }
        }
        IrKind::And(xs) => simplify_or(xs.iter().map(|x| delta_of(x, v)).collect()),
        IrKind::Or(xs) => simplify_and(xs.iter().map(|x| delta_of(x, v)).collect()),
        _ => Delta::False,
    }
}

fn delta_to_term(delta: &Delta, a_cells: &HashMap<NodeId, crate::arena::CellRef>) -> SmtTerm {
    match delta {
        Delta::False => SmtTerm::BoolConst(false),
        Delta::Candidate(id) => SmtTerm::BoolVar(a_cells[id]),
        Delta::And(xs) => SmtTerm::And(xs.iter().map(|x| delta_to_term(x, a_cells)).collect()),
        Delta::Or(xs) => SmtTerm::Or(xs.iter().map(|x| delta_to_term(x, a_cells)).collect()),
    }
}

fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a.raw() <= b.raw() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Walk the formula once, collecting every `Assign` leaf as a [`Candidate`]
/// and recording, for each pair reachable under a common `And`/`Or` node,
/// whether their nearest common ancestor is an `Or` (independent) or an
/// `And` (dependent). A pair never reached by this walk (disjoint subtrees
/// of an ancestor neither of them is under) never needs a constraint.
fn collect(
    expr: &IrExpr,
    candidates: &mut Vec<Candidate>,
    independent: &mut HashMap<(NodeId, NodeId), bool>,
) -> Vec<NodeId> {
    match &expr.kind {
        IrKind::And(xs) | IrKind::Or(xs) => {
            let is_or = matches!(expr.kind, IrKind::Or(_));
            let groups: Vec<Vec<NodeId>> = xs.iter().map(|x| collect(x, candidates, independent)).collect();
            for i in 0..groups.len() {
                for j in (i + 1)..groups.len() {
                    for &a in &groups[i] {
                        for &b in &groups[j] {
                            independent.insert(pair_key(a, b), is_or);
                        }
                    }
                }
            }
            groups.into_iter().flatten().collect()
        }
        IrKind::Assign { lhs, rhs } => {
            let mut rvars = HashSet::new();
            rhs.free_vars(&mut rvars);
            candidates.push(Candidate {
                id: expr.id,
                lvar: lhs.clone(),
                rvars,
            });
            vec![expr.id]
        }
        _ => Vec::new(),
    }
}

/// Solve the assignment-strategy problem for `formula` over `variables`
/// (the state variables a complete transition must assign). Returns
/// `Ok(None)` if no consistent choice and ordering exists — a legitimate,
/// non-fatal outcome, not an error — and `Err(Error::SolverUnknown)` only
/// if the backend genuinely could not decide.
///
/// `gateway` and `arena` are expected to be in a scope the caller is
/// willing to unwind: every cell and assertion this call makes is new and
/// can be discarded wholesale by restoring to a snapshot taken beforehand.
pub fn solve_strategy(
    gateway: &mut dyn SmtGateway,
    arena: &mut Arena,
    formula: &IrExpr,
    variables: &[String],
) -> CoreResult<Option<Strategy>> {
    let mut candidates = Vec::new();
    let mut independent = HashMap::new();
    collect(formula, &mut candidates, &mut independent);

    if candidates.is_empty() {
        return Ok(Some(Strategy { order: Vec::new() }));
    }

    let mut a_cells = HashMap::with_capacity(candidates.len());
    let mut r_cells = HashMap::with_capacity(candidates.len());
    for c in &candidates {
        let a = arena.alloc_cell(CellType::Bool);
        gateway.declare_bool(a);
        a_cells.insert(c.id, a);
        let r = arena.alloc_cell(CellType::Int);
        gateway.declare_int(r);
        r_cells.insert(c.id, r);
    }

    // phi_A: the formula must commit to assigning every variable in scope.
    let phi_a: Vec<SmtTerm> = variables
        .iter()
        .map(|v| delta_to_term(&delta_of(formula, v), &a_cells))
        .collect();
    if !phi_a.is_empty() {
        gateway.assert_ground(&SmtTerm::And(phi_a))?;
    }

    // phi_uniq: at most one firing candidate per variable.
    let mut by_var: HashMap<&str, Vec<NodeId>> = HashMap::new();
    for c in &candidates {
        by_var.entry(c.lvar.as_str()).or_default().push(c.id);
    }
    for ids in by_var.values() {
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let both = SmtTerm::And(vec![
                    SmtTerm::BoolVar(a_cells[&ids[i]]),
                    SmtTerm::BoolVar(a_cells[&ids[j]]),
                ]);
                gateway.assert_ground(&SmtTerm::not(both))?;
            }
        }
    }

    // phi_R: a dependent pair that reads what the other writes must fire
    // in the order the read demands. `rvars` does not distinguish a read
    // of `v` from a read of `v'` (see `IrExpr::free_vars`), so this is a
    // sound over-approximation: it orders a pair whenever `j`'s right-hand
    // side merely mentions `i`'s variable, not only when it reads `i`'s
    // primed value.
    for ci in &candidates {
        for cj in &candidates {
            if ci.id == cj.id {
                continue;
            }
            let dependent = !independent.get(&pair_key(ci.id, cj.id)).copied().unwrap_or(false);
            if dependent && cj.rvars.contains(&ci.lvar) {
                let both = SmtTerm::And(vec![
                    SmtTerm::BoolVar(a_cells[&ci.id]),
                    SmtTerm::BoolVar(a_cells[&cj.id]),
                ]);
                let ordered = SmtTerm::Lt(
                    Box::new(SmtTerm::IntVar(r_cells[&ci.id])),
                    Box::new(SmtTerm::IntVar(r_cells[&cj.id])),
                );
                gateway.assert_ground(&SmtTerm::Implies(Box::new(both), Box::new(ordered)))?;
            }
        }
    }

    // phi_inj: every pair of candidates that both fire gets distinct ranks,
    // so the chosen set always induces a single total order.
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            let ci = &candidates[i];
            let cj = &candidates[j];
            let both = SmtTerm::And(vec![SmtTerm::BoolVar(a_cells[&ci.id]), SmtTerm::BoolVar(a_cells[&cj.id])]);
            let distinct = SmtTerm::not(SmtTerm::Eq(
                Box::new(SmtTerm::IntVar(r_cells[&ci.id])),
                Box::new(SmtTerm::IntVar(r_cells[&cj.id])),
            ));
            gateway.assert_ground(&SmtTerm::Implies(Box::new(both), Box::new(distinct)))?;
        }
    }

    match gateway.check_sat()? {
        SatResult::Unsat => Ok(None),
        SatResult::Unknown => Err(Error::SolverUnknown { node: formula.id }),
        SatResult::Sat => {
            let mut chosen = Vec::new();
            for c in &candidates {
                if gateway.get_interp_bool(a_cells[&c.id])?.unwrap_or(false) {
                    let rank = gateway.get_interp_int(r_cells[&c.id])?.unwrap_or(0);
                    chosen.push((c.id, rank));
                }
            }
            chosen.sort_by_key(|&(_, rank)| rank);
            Ok(Some(Strategy {
                order: chosen.into_iter().map(|(id, _)| id).collect(),
            }))
        }
    }
}
