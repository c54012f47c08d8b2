//! The cell type lattice (§3.1): an algebraic description of the types a
//! symbolic cell can carry, the comparability relation between two types,
//! and the canonical SMT sort signature each type maps to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An uninterpreted sort tag, used for model/specification constants that
/// the core does not otherwise interpret (e.g. a TLA+ model value).
pub type UninterpretedSort = String;

/// A cell type, per §3.1. `Unknown` is the placeholder carried only by the
/// empty-set constant before it has been unified with a concrete element
/// type.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Unknown,
    Bool,
    Int,
    Str,
    Constant(UninterpretedSort),
    FinSet(Box<CellType>),
    Fun(Box<CellType>, Box<CellType>),
    FinFunSet(Box<CellType>, Box<CellType>),
    Record(Vec<(String, CellType)>),
    Tuple(Vec<CellType>),
    Seq(Box<CellType>),
}

/// The canonical SMT sort signature a type maps to. Two comparable types
/// always share a signature; the rewriter/equality engine uses this to
/// decide when native SMT `=` is directly applicable.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Signature {
    Bool,
    Int,
    Str,
    Uninterpreted(UninterpretedSort),
    /// Structural container signatures carry no further SMT sort of their
    /// own: their equality is always mediated through the lazy equality
    /// engine rather than native `=`, except once an `Eq` cache entry has
    /// been installed for a *specific pair* (see cache.rs).
    Set,
    Function,
    FunctionSet,
    Record,
    Tuple,
    Sequence,
    /// `Unknown` has no fixed signature; it is compatible with anything.
    Unknown,
}

impl CellType {
    /// The canonical SMT sort signature for this type (§3.1).
    pub fn signature(&self) -> Signature {
        match self {
            CellType::Unknown => Signature::Unknown,
            CellType::Bool => Signature::Bool,
            CellType::Int => Signature::Int,
            CellType::Str => Signature::Str,
            CellType::Constant(sort) => Signature::Uninterpreted(sort.clone()),
            CellType::FinSet(_) => Signature::Set,
            CellType::Fun(_, _) => Signature::Function,
            CellType::FinFunSet(_, _) => Signature::FunctionSet,
            CellType::Record(_) => Signature::Record,
            CellType::Tuple(_) => Signature::Tuple,
            CellType::Seq(_) => Signature::Sequence,
        }
    }

    /// Two types are *comparable* iff the lazy equality engine is permitted
    /// to relate cells of these types (§3.1). The relation is symmetric,
    /// reflexive, and holds when: both are the same scalar kind, both are
    /// structural containers of the same shape whose component types are
    /// pairwise comparable, or either side is `Unknown`.
    pub fn is_comparable_to(&self, other: &CellType) -> bool {
        match (self, other) {
            (CellType::Unknown, _) | (_, CellType::Unknown) => true,
            (CellType::Bool, CellType::Bool) => true,
            (CellType::Int, CellType::Int) => true,
            (CellType::Str, CellType::Str) => true,
            (CellType::Constant(a), CellType::Constant(b)) => a == b,
            (CellType::FinSet(a), CellType::FinSet(b)) => a.is_comparable_to(b),
            (CellType::Fun(a1, a2), CellType::Fun(b1, b2)) => {
                a1.is_comparable_to(b1) && a2.is_comparable_to(b2)
            }
            (CellType::FinFunSet(a1, a2), CellType::FinFunSet(b1, b2)) => {
                a1.is_comparable_to(b1) && a2.is_comparable_to(b2)
            }
            (CellType::Record(a), CellType::Record(b)) => {
                // Comparable regardless of exact field sets: field-presence
                // mismatches are handled by the equality engine (§4.4),
                // which forces inequality rather than refusing comparison.
                // Fields shared by name must have comparable types.
                for (name, ty_a) in a {
                    if let Some((_, ty_b)) = b.iter().find(|(n, _)| n == name) {
                        if !ty_a.is_comparable_to(ty_b) {
                            return false;
                        }
                    }
                }
                true
            }
            (CellType::Tuple(a), CellType::Tuple(b)) => {
                // Length mismatch is type-incomparable (§4.4).
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_comparable_to(y))
            }
            (CellType::Seq(a), CellType::Seq(b)) => a.is_comparable_to(b),
            _ => false,
        }
    }

    /// True iff this is the statically-empty-set marker type used by the
    /// empty-set special case of §4.4: `FinSet(Unknown)`.
    pub fn is_unknown_empty_set(&self) -> bool {
        matches!(self, CellType::FinSet(elem) if matches!(**elem, CellType::Unknown))
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellType::Unknown => write!(f, "Unknown"),
            CellType::Bool => write!(f, "Bool"),
            CellType::Int => write!(f, "Int"),
            CellType::Str => write!(f, "Str"),
            CellType::Constant(sort) => write!(f, "Constant({sort})"),
            CellType::FinSet(e) => write!(f, "FinSet({e})"),
            CellType::Fun(a, r) => write!(f, "Fun({a} -> {r})"),
            CellType::FinFunSet(d, c) => write!(f, "FinFunSet({d} -> {c})"),
            CellType::Record(fields) => {
                write!(f, "Record{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, "}}")
            }
            CellType::Tuple(types) => {
                write!(f, "Tuple(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
            CellType::Seq(e) => write!(f, "Seq({e})"),
        }
    }
}
