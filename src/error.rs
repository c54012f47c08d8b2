//! The error taxonomy of the symbolic core.
//!
//! Fatal variants represent programmer errors (a malformed IR, an equality
//! queried without the structural constraints being cached, a rewrite rule
//! that does not exist for some operator). They are never caught inside the
//! core; they propagate with `?` all the way to whichever binary embeds it.
//! Non-fatal outcomes, such as an assignment problem with no solution, are
//! not represented here at all — they are plain `Ok(None)` values returned
//! from the relevant operation (see [`crate::strategy::solve_strategy`]).

use crate::ir::NodeId;
use crate::types::CellType;

/// Result alias used throughout the crate.
pub type CoreResult<T> = Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An equality was requested between two cells whose types are not
    /// comparable (§3.1's comparability relation does not hold).
    #[error("node {node}: types are not comparable: {left:?} vs {right:?}")]
    Incomparable {
        node: NodeId,
        left: CellType,
        right: CellType,
    },

    /// `safeEq` was called on a pair for which `cacheEq` has not yet run.
    #[error("node {node}: equality queried via safeEq before caching (cell {a}, cell {b})")]
    UncachedEquality { node: NodeId, a: u32, b: u32 },

    /// The rewriter's driver found no applicable rule for the focused node.
    #[error("node {node}: no applicable rewrite rule")]
    NoApplicableRule { node: NodeId },

    /// The IR did not have the structural shape a rule expected.
    #[error("node {node}: malformed IR, expected {expected}")]
    MalformedIr { node: NodeId, expected: &'static str },

    /// The SMT solver returned `unknown` for a query the core cannot retry
    /// or mask; the verification result this yields is indeterminate.
    #[error("SMT solver returned unknown for node {node}")]
    SolverUnknown { node: NodeId },

    /// A failure raised by the SMT gateway itself: an ill-sorted term
    /// reaching a backend that cannot translate it, a `parse_smt_lib`
    /// result (`SmtTerm::Raw`) handed to a gateway instance other than the
    /// one that parsed it, or a solver process failure.
    #[error("SMT gateway error: {0}")]
    Smt(String),

    /// A reference to a cell id that does not exist in the arena.
    #[error("dangling cell reference: {0}")]
    DanglingCell(u32),
}
