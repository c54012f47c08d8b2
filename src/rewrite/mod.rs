//! The rewriter (§4.5): drives the typed IR down to a single arena cell,
//! one operator at a time.
//!
//! The abstract design names a `Rule` as an `applicable?`/`apply` pair,
//! picked by a first-match driver. Here `IrKind` is already a closed enum,
//! so a single `match` in [`Rewriter::rewrite`] *is* that driver: every
//! arm is mutually exclusive by construction, and the one rule handling a
//! given node is chosen by the compiler, not a runtime scan. Each arm
//! delegates to a function in `rules/`, grouped by the type family it
//! operates on.
//!
//! Rules may rewrite sub-expressions, allocate cells, assert SMT
//! constraints and insert cache entries; per §4.5 they must never retract
//! or rewrite a constraint asserted earlier.

pub mod rules;

use crate::arena::{Arena, CellRef};
use crate::cache::EqualityCache;
use crate::equality::EqEngine;
use crate::error::{CoreResult, Error};
use crate::ir::{IrExpr, IrKind, NodeId};
use crate::smt::SmtGateway;
use crate::state::Bindings;
use crate::types::CellType;
use std::collections::HashMap;

/// Everything a rewrite rule needs: the three lock-step structures of §5,
/// the current binder environment, and small pools that give repeated
/// literals a stable cell identity instead of reallocating on every use.
pub struct Rewriter<'a> {
    pub arena: Arena,
    pub cache: EqualityCache,
    pub gateway: &'a mut dyn SmtGateway,
    pub bindings: Bindings,
    const_pool: HashMap<(String, String), CellRef>,
    str_pool: HashMap<String, CellRef>,
}

impl<'a> Rewriter<'a> {
    pub fn new(arena: Arena, gateway: &'a mut dyn SmtGateway) -> Self {
        Rewriter {
            arena,
            cache: EqualityCache::new(),
            gateway,
            bindings: Bindings::new(),
            const_pool: HashMap::new(),
            str_pool: HashMap::new(),
        }
    }

    /// Borrow the three lock-step structures as an [`EqEngine`] for this
    /// call only.
    pub fn eq_engine(&mut self) -> EqEngine<'_> {
        EqEngine::new(&mut self.arena, &mut self.cache, self.gateway)
    }

    /// `rewriteUntilDone`: reduce `expr` to the cell it denotes. For this
    /// IR every node reduces in one pass (there is no separate "focus"
    /// rewinding as in a stateful rewrite-in-place design), so the
    /// fixpoint loop of the abstract spec collapses to plain recursion;
    /// reaching a cell reference is therefore guaranteed by structural
    /// induction on `IrExpr` rather than needing a runtime progress check.
    pub fn rewrite(&mut self, expr: &IrExpr) -> CoreResult<CellRef> {
        match &expr.kind {
            IrKind::Variable(name) => self.lookup_var(expr.id, name),
            IrKind::NextVariable(name) => self.lookup_var(expr.id, &format!("{name}'")),
            IrKind::BoolLit(b) => Ok(if *b { self.arena.cell_true() } else { self.arena.cell_false() }),
            IrKind::IntLit(n) => rules::scalars::int_lit(self, *n),
            IrKind::StrLit(s) => Ok(rules::scalars::str_lit(self, s)),
            IrKind::ConstLit { sort, tag } => Ok(rules::scalars::const_lit(self, sort, tag)),

            IrKind::And(xs) => rules::booleans::and(self, expr.id, xs),
            IrKind::Or(xs) => rules::booleans::or(self, expr.id, xs),
            IrKind::Not(x) => rules::booleans::not(self, expr.id, x),
            IrKind::Eq(a, b) => rules::booleans::eq(self, expr.id, a, b),
            IrKind::In(a, b) => rules::booleans::in_set(self, expr.id, a, b),

            IrKind::SetEnum(xs) => rules::sets::set_enum(self, &expr.ty, expr.id, xs),
            IrKind::EmptySet(elem_ty) => Ok(rules::sets::empty_set(self, elem_ty)),
            IrKind::Union(a, b) => rules::sets::union(self, &expr.ty, expr.id, a, b),
            IrKind::Intersect(a, b) => rules::sets::intersect(self, &expr.ty, expr.id, a, b),
            IrKind::Setminus(a, b) => rules::sets::setminus(self, &expr.ty, expr.id, a, b),
            IrKind::Subseteq(a, b) => rules::sets::subseteq(self, expr.id, a, b),
            IrKind::Filter { var, set, predicate } => {
                rules::sets::filter(self, &expr.ty, expr.id, var, set, predicate)
            }
            IrKind::Map { var, set, body } => rules::sets::map(self, &expr.ty, expr.id, var, set, body),

            IrKind::FunApp(f, x) => rules::functions::fun_app(self, expr.id, f, x),
            IrKind::FunSet(dom, cdm) => rules::functions::fun_set(self, &expr.ty, expr.id, dom, cdm),

            IrKind::RecordLit(fields) => rules::records::record_lit(self, &expr.ty, expr.id, fields),
            IrKind::RecordGet(r, field) => rules::records::record_get(self, expr.id, r, field),

            IrKind::TupleLit(xs) => rules::tuples::tuple_lit(self, &expr.ty, expr.id, xs),
            IrKind::TupleGet(t, idx) => rules::tuples::tuple_get(self, expr.id, t, *idx),

            IrKind::SeqLit(xs) => rules::sequences::seq_lit(self, &expr.ty, expr.id, xs),
            IrKind::SeqHead(s) => rules::sequences::seq_head(self, expr.id, s),
            IrKind::SeqTail(s) => rules::sequences::seq_tail(self, &expr.ty, expr.id, s),
            IrKind::SeqAppend(s, x) => rules::sequences::seq_append(self, &expr.ty, expr.id, s, x),

            IrKind::Assign { lhs, rhs } => rules::assign::assign(self, expr.id, lhs, rhs),
        }
    }

    fn lookup_var(&self, node: NodeId, name: &str) -> CoreResult<CellRef> {
        self.bindings
            .lookup(name)
            .ok_or(Error::MalformedIr { node, expected: "a bound variable" })
    }

    fn const_cell(&mut self, sort: &str, tag: &str) -> CellRef {
        *self
            .const_pool
            .entry((sort.to_string(), tag.to_string()))
            .or_insert_with(|| self.arena.alloc_cell(CellType::Constant(sort.to_string())))
    }

    fn str_cell(&mut self, s: &str) -> CellRef {
        *self
            .str_pool
            .entry(s.to_string())
            .or_insert_with(|| self.arena.alloc_cell(CellType::Str))
    }
}
