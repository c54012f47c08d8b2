//! The typed intermediate representation this crate consumes (§3.6).
//!
//! The real parser, type checker and JSON/text serializers of the full
//! system are out of scope (§1); this module concretises just enough of
//! "a typed IR module" for the core to compile and be driven standalone —
//! a tree of operator applications, each node carrying a unique id and its
//! type-1 result type.

mod node_id;

pub use node_id::NodeId;
pub use node_id::NodeIdGen;

use crate::types::CellType;
use serde::{Deserialize, Serialize};

/// A node in the typed IR tree. Every node carries its own [`NodeId`] and
/// the `CellType` the (out-of-scope) type checker assigned to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IrExpr {
    pub id: NodeId,
    pub ty: CellType,
    pub kind: IrKind,
}

/// The minimal on-disk unit the `mc-core` binary loads: a next-state
/// formula plus the state variables a complete transition must assign.
/// Stands in for the real system's module format (out of scope, §1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Module {
    pub variables: Vec<String>,
    pub formula: IrExpr,
}

/// The operators the rewriter (L5) dispatches over. Grouped by the type
/// family they primarily operate on, mirroring §3.1's families.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum IrKind {
    // --- leaves ---
    Variable(String),
    /// The primed form `v'`, as it occurs on the left of an assignment
    /// candidate (§3.5) or as a plain read of the next-state value.
    NextVariable(String),
    BoolLit(bool),
    IntLit(i64),
    StrLit(String),
    ConstLit { sort: String, tag: String },

    // --- boolean connectives ---
    And(Vec<IrExpr>),
    Or(Vec<IrExpr>),
    Not(Box<IrExpr>),
    Eq(Box<IrExpr>, Box<IrExpr>),
    In(Box<IrExpr>, Box<IrExpr>),

    // --- sets ---
    SetEnum(Vec<IrExpr>),
    EmptySet(Box<CellType>),
    Union(Box<IrExpr>, Box<IrExpr>),
    Intersect(Box<IrExpr>, Box<IrExpr>),
    Setminus(Box<IrExpr>, Box<IrExpr>),
    Subseteq(Box<IrExpr>, Box<IrExpr>),
    /// `{ v \in set : predicate }`, `predicate` closes over `v`.
    Filter {
        var: String,
        set: Box<IrExpr>,
        predicate: Box<IrExpr>,
    },
    /// `{ body : v \in set }`, `body` closes over `v`.
    Map {
        var: String,
        set: Box<IrExpr>,
        body: Box<IrExpr>,
    },

    // --- functions ---
    FunApp(Box<IrExpr>, Box<IrExpr>),
    FunSet(Box<IrExpr>, Box<IrExpr>),

    // --- records ---
    RecordLit(Vec<(String, IrExpr)>),
    RecordGet(Box<IrExpr>, String),

    // --- tuples ---
    TupleLit(Vec<IrExpr>),
    TupleGet(Box<IrExpr>, usize),

    // --- sequences ---
    SeqLit(Vec<IrExpr>),
    SeqHead(Box<IrExpr>),
    SeqTail(Box<IrExpr>),
    SeqAppend(Box<IrExpr>, Box<IrExpr>),

    // --- assignment candidates (§3.5) ---
    /// `lhs' \in rhs`, a leaf of the next-state formula from the assignment
    /// strategy solver's point of view. `id` already uniquely identifies
    /// it, so the candidate carries no separate identity of its own.
    Assign { lhs: String, rhs: Box<IrExpr> },
}

impl IrExpr {
    /// Free variables read by this expression (for the `rvars(j)` relation
    /// of §4.6); does not descend into `Assign` left-hand sides, since
    /// those are *written*, not read.
    pub fn free_vars(&self, out: &mut std::collections::HashSet<String>) {
        match &self.kind {
            IrKind::Variable(v) | IrKind::NextVariable(v) => {
                out.insert(v.clone());
            }
            IrKind::BoolLit(_) | IrKind::IntLit(_) | IrKind::StrLit(_) | IrKind::ConstLit { .. } => {}
            IrKind::And(xs) | IrKind::Or(xs) | IrKind::SetEnum(xs) | IrKind::SeqLit(xs)
            | IrKind::TupleLit(xs) => {
                for x in xs {
                    x.free_vars(out);
                }
            }
            IrKind::Not(x) | IrKind::SeqHead(x) | IrKind::SeqTail(x) => x.free_vars(out),
            IrKind::Eq(a, b)
            | IrKind::In(a, b)
            | IrKind::Union(a, b)
            | IrKind::Intersect(a, b)
            | IrKind::Setminus(a, b)
            | IrKind::Subseteq(a, b)
            | IrKind::FunApp(a, b)
            | IrKind::FunSet(a, b)
            | IrKind::SeqAppend(a, b) => {
                a.free_vars(out);
                b.free_vars(out);
            }
            IrKind::EmptySet(_) => {}
            IrKind::Filter { set, predicate, .. } => {
                set.free_vars(out);
                predicate.free_vars(out);
            }
            IrKind::Map { set, body, .. } => {
                set.free_vars(out);
                body.free_vars(out);
            }
            IrKind::RecordLit(fields) => {
                for (_, v) in fields {
                    v.free_vars(out);
                }
            }
            IrKind::RecordGet(x, _) | IrKind::TupleGet(x, _) => x.free_vars(out),
            IrKind::Assign { rhs, .. } => rhs.free_vars(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn free_vars_collects_through_assign_rhs() {
        let mut gen = NodeIdGen::new();
        let rhs = IrExpr {
            id: gen.next(),
            ty: CellType::FinSet(Box::new(CellType::Int)),
            kind: IrKind::SetEnum(vec![IrExpr {
                id: gen.next(),
                ty: CellType::Int,
                kind: IrKind::Variable("w".to_string()),
            }]),
        };
        let assign = IrExpr {
            id: gen.next(),
            ty: CellType::Bool,
            kind: IrKind::Assign {
                lhs: "v".to_string(),
                rhs: Box::new(rhs),
            },
        };
        let mut vars = HashSet::new();
        assign.free_vars(&mut vars);
        assert_eq!(vars, HashSet::from(["w".to_string()]));
    }
}
