//! A symbolic rewriting engine for a bounded model checker: an arena of
//! typed cells (§3.2/§4.1), a lazy structural equality engine (§3.3/§4.4),
//! a rewriter that drives a typed IR down to arena cells (§4.5), and an
//! assignment-strategy solver that turns a next-state formula into a set
//! of orderable transitions (§4.6/§4.7).
//!
//! The layers are meant to be composed bottom-up by an embedder: construct
//! an [`smt::SmtGateway`], build an [`arena::Arena`], drive IR through
//! [`rewrite::Rewriter`], then hand the resulting boolean cell's owning
//! formula to [`transitions::extract_transitions`]. None of these layers
//! spawn threads or hold global state; everything is explicit values
//! threaded by the caller (§9's design note).

pub mod arena;
pub mod cache;
pub mod config;
pub mod equality;
pub mod error;
pub mod ir;
pub mod rewrite;
pub mod smt;
pub mod state;
pub mod strategy;
pub mod transitions;
pub mod types;
