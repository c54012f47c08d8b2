//! The lazy equality engine (§4.4): the only component allowed to assert
//! that two cells are equal, and the only component allowed to decide that
//! they cannot be.
//!
//! `safeEq`/`cachedEq` never do structural work themselves; they look up
//! what `cacheEq` has already installed. Splitting lookup from construction
//! is what lets the rewriter ask "is this cached yet?" without accidentally
//! re-asserting the same constraints twice.
//!
//! Two architectural simplifications, both forced by the minimal [`SmtTerm`]
//! language this crate works with (no integer arithmetic terms), are
//! recorded here rather than left implicit:
//!
//! - `has(c)` is treated as *definite* membership for every cell that
//!   produces a finite set (`SetEnum`, `Union`, `Intersect`, `Setminus`).
//!   There is no separate membership cache; a conditionally-filtered set
//!   (`Filter`) is expected to only append the elements that actually
//!   passed the predicate. This keeps subset-equal's "`e ∉ L`" clause
//!   meaningful without inventing a second cache the distilled design never
//!   names.
//! - Sequences are compared by their concrete `has`-list length (a host
//!   value, not a symbolic one) rather than a symbolic `end - start`
//!   window, since [`SmtTerm`] has no subtraction operator to assert one.

use crate::arena::{Arena, CellRef};
use crate::cache::{EqEntry, EqualityCache};
use crate::error::{CoreResult, Error};
use crate::ir::NodeId;
use crate::smt::{SmtGateway, SmtTerm};
use crate::types::{CellType, Signature};

/// Bundles the three structures §5 requires to stay in lock-step: the
/// arena, the equality cache, and the SMT gateway. The rewriter owns all
/// three for the run's lifetime and hands out a fresh `EqEngine` borrow
/// per rewrite step.
pub struct EqEngine<'a> {
    pub arena: &'a mut Arena,
    pub cache: &'a mut EqualityCache,
    pub gateway: &'a mut dyn SmtGateway,
}

impl<'a> EqEngine<'a> {
    pub fn new(arena: &'a mut Arena, cache: &'a mut EqualityCache, gateway: &'a mut dyn SmtGateway) -> Self {
        EqEngine { arena, cache, gateway }
    }

    /// `safeEq(a, b)`: the cached entry for an already-comparable,
    /// already-cached pair. Fatal if either precondition does not hold.
    pub fn safe_eq(&mut self, ctx: NodeId, a: CellRef, b: CellRef) -> CoreResult<EqEntry> {
        if a == b {
            return Ok(EqEntry::True);
        }
        let (ty_a, ty_b) = self.types_of(a, b);
        if !ty_a.is_comparable_to(&ty_b) {
            return Err(Error::Incomparable { node: ctx, left: ty_a, right: ty_b });
        }
        self.cache
            .get(a, b)
            .ok_or(Error::UncachedEquality { node: ctx, a: a.id(), b: b.id() })
    }

    /// `cachedEq(a, b)`: like `safe_eq`, but incomparable types fold to the
    /// literal `false` instead of erroring.
    pub fn cached_eq(&mut self, ctx: NodeId, a: CellRef, b: CellRef) -> CoreResult<EqEntry> {
        if a == b {
            return Ok(EqEntry::True);
        }
        let (ty_a, ty_b) = self.types_of(a, b);
        if !ty_a.is_comparable_to(&ty_b) {
            return Ok(EqEntry::False);
        }
        self.cache
            .get(a, b)
            .ok_or(Error::UncachedEquality { node: ctx, a: a.id(), b: b.id() })
    }

    /// `cacheEq(pair)`: generate and assert the structural constraints for
    /// `a = b`, dispatching by type family, and install the resulting
    /// cache entry. Idempotent: a pair that is already cached is returned
    /// unchanged without re-asserting anything.
    pub fn cache_eq(&mut self, ctx: NodeId, a: CellRef, b: CellRef) -> CoreResult<EqEntry> {
        if a == b {
            return Ok(EqEntry::True);
        }
        if let Some(entry) = self.cache.get(a, b) {
            return Ok(entry);
        }
        let (ty_a, ty_b) = self.types_of(a, b);
        if !ty_a.is_comparable_to(&ty_b) {
            return Err(Error::Incomparable { node: ctx, left: ty_a, right: ty_b });
        }
        let entry = match &ty_a {
            CellType::Bool | CellType::Int | CellType::Str | CellType::Constant(_) | CellType::Unknown => {
                self.declare(a);
                self.declare(b);
                EqEntry::Eq
            }
            CellType::FinSet(_) => self.cache_eq_set(ctx, a, b, &ty_a, &ty_b)?,
            CellType::FinFunSet(_, _) => self.cache_eq_fun_set(ctx, a, b)?,
            CellType::Fun(_, _) => self.cache_eq_fun(ctx, a, b)?,
            CellType::Record(_) => self.cache_eq_record(ctx, a, b, &ty_a, &ty_b)?,
            CellType::Tuple(_) => self.cache_eq_tuple(ctx, a, b)?,
            CellType::Seq(_) => self.cache_eq_seq(ctx, a, b)?,
        };
        self.cache.put(a, b, entry);
        Ok(entry)
    }

    /// Bulk form: cache every pair, short-circuiting on the first failure.
    pub fn cache_eq_all(&mut self, ctx: NodeId, pairs: &[(CellRef, CellRef)]) -> CoreResult<()> {
        for &(a, b) in pairs {
            self.cache_eq(ctx, a, b)?;
        }
        Ok(())
    }

    /// `a = b` reduced all the way to a single boolean cell: `cache_eq`
    /// followed by collapsing whatever [`EqEntry`] it installs down to a
    /// concrete cell (the arena's `true`/`false` cells, an existing `Expr`
    /// cell, or a freshly materialised one for `Eq`). The rewriter's `Eq`
    /// and `In` rules are built entirely on top of this.
    pub fn eq_as_cell(&mut self, ctx: NodeId, a: CellRef, b: CellRef) -> CoreResult<CellRef> {
        let entry = self.cache_eq(ctx, a, b)?;
        match entry {
            EqEntry::True => Ok(self.arena.cell_true()),
            EqEntry::False => Ok(self.arena.cell_false()),
            EqEntry::Expr(c) => Ok(c),
            EqEntry::Eq => {
                let term = self.entry_to_term(entry, a, b);
                self.materialize_bool(term)
            }
        }
    }

    /// Materialise an arbitrary boolean term as a fresh cell unconditionally
    /// (unlike [`Self::materialize`], which leaves a bare variable alone).
    pub fn materialize_bool(&mut self, term: SmtTerm) -> CoreResult<CellRef> {
        self.alloc_materialized(term)
    }

    /// Like `materialize_bool`, but a literal or an already-a-cell term
    /// returns the existing cell (`true`/`false`/the variable itself)
    /// rather than allocating a redundant wrapper.
    pub fn term_to_cell(&mut self, term: SmtTerm) -> CoreResult<CellRef> {
        match term {
            SmtTerm::BoolConst(true) => Ok(self.arena.cell_true()),
            SmtTerm::BoolConst(false) => Ok(self.arena.cell_false()),
            SmtTerm::BoolVar(c) => Ok(c),
            other => self.alloc_materialized(other),
        }
    }

    /// The back-door: install `Eq` without performing or checking any
    /// structural work. Sound only when the caller can prove the equality
    /// by construction (e.g. two references drawn from the same pool
    /// slot). Misuse silently poisons every future query on this pair —
    /// there is no way to detect it later. Do not call this unless you can
    /// point at the specific invariant that makes it safe.
    pub fn declare_eq_unchecked(&mut self, a: CellRef, b: CellRef) {
        self.cache.put(a, b, EqEntry::Eq);
    }

    /// `L ⊆ R` as a boolean term, per §4.4's subset-equal routine.
    pub fn subset_eq(&mut self, ctx: NodeId, l: CellRef, r: CellRef) -> CoreResult<SmtTerm> {
        let members_l = self.arena.has(l);
        if members_l.is_empty() {
            return Ok(SmtTerm::BoolConst(true));
        }
        let members_r = self.arena.has(r);
        if members_r.is_empty() {
            // Every `e` in `has(L)` is a definite member under this
            // engine's has-is-membership reading, so `e ∉ L` is always
            // false here; the conjunction over a nonempty list is false.
            return Ok(SmtTerm::BoolConst(false));
        }
        for &l_i in &members_l {
            for &r_j in &members_r {
                self.cache_eq(ctx, l_i, r_j)?;
            }
        }
        let mut conjuncts = Vec::with_capacity(members_l.len());
        for l_i in members_l {
            let mut disjuncts = Vec::with_capacity(members_r.len());
            for &r_j in &members_r {
                let entry = self.cache.get(l_i, r_j).expect("just cached above");
                disjuncts.push(self.entry_to_term(entry, l_i, r_j));
            }
            let predicate = self.materialize(SmtTerm::Or(disjuncts))?;
            conjuncts.push(predicate);
        }
        Ok(SmtTerm::And(conjuncts))
    }

    fn cache_eq_set(&mut self, ctx: NodeId, a: CellRef, b: CellRef, ty_a: &CellType, ty_b: &CellType) -> CoreResult<EqEntry> {
        if ty_a.is_unknown_empty_set() || ty_b.is_unknown_empty_set() {
            let other = if ty_a.is_unknown_empty_set() { b } else { a };
            let predicate = if self.arena.has(other).is_empty() {
                SmtTerm::BoolConst(true)
            } else {
                SmtTerm::BoolConst(false)
            };
            let cell = self.alloc_materialized(predicate)?;
            return Ok(EqEntry::Expr(cell));
        }
        let a_sub_b = self.subset_eq(ctx, a, b)?;
        let b_sub_a = self.subset_eq(ctx, b, a)?;
        self.assert_native_eq_iff(a, b, SmtTerm::And(vec![a_sub_b, b_sub_a]))?;
        Ok(EqEntry::Eq)
    }

    fn cache_eq_fun_set(&mut self, ctx: NodeId, a: CellRef, b: CellRef) -> CoreResult<EqEntry> {
        let dom_a = self.required_dom(ctx, a)?;
        let dom_b = self.required_dom(ctx, b)?;
        let cdm_a = self.required_cdm(ctx, a)?;
        let cdm_b = self.required_cdm(ctx, b)?;
        let dom_eq = self.cache_eq(ctx, dom_a, dom_b)?;
        let cdm_eq = self.cache_eq(ctx, cdm_a, cdm_b)?;
        let dom_term = self.entry_to_term(dom_eq, dom_a, dom_b);
        let cdm_term = self.entry_to_term(cdm_eq, cdm_a, cdm_b);
        self.assert_native_eq_iff(a, b, SmtTerm::And(vec![dom_term, cdm_term]))?;
        Ok(EqEntry::Eq)
    }

    fn cache_eq_fun(&mut self, ctx: NodeId, a: CellRef, b: CellRef) -> CoreResult<EqEntry> {
        // A function's relation-as-a-set lives at its `cdm` edge; function
        // equality reduces entirely to that set's equality.
        let rel_a = self.required_cdm(ctx, a)?;
        let rel_b = self.required_cdm(ctx, b)?;
        let rel_eq = self.cache_eq(ctx, rel_a, rel_b)?;
        let rel_term = self.entry_to_term(rel_eq, rel_a, rel_b);
        self.assert_native_eq_iff(a, b, rel_term)?;
        Ok(EqEntry::Eq)
    }

    fn cache_eq_record(&mut self, ctx: NodeId, a: CellRef, b: CellRef, ty_a: &CellType, ty_b: &CellType) -> CoreResult<EqEntry> {
        let (fields_a, fields_b) = match (ty_a, ty_b) {
            (CellType::Record(fa), CellType::Record(fb)) => (fa, fb),
            _ => unreachable!("dispatched only for Record types"),
        };
        let names_a: Vec<&str> = fields_a.iter().map(|(n, _)| n.as_str()).collect();
        let names_b: Vec<&str> = fields_b.iter().map(|(n, _)| n.as_str()).collect();
        if names_a.len() != names_b.len() || !names_a.iter().all(|n| names_b.contains(n)) {
            // A field present in only one schema is present in the
            // instance (record shape is part of the cell's static type),
            // so the records can never actually be equal.
            return Ok(EqEntry::False);
        }
        let values_a = self.arena.has(a);
        let values_b = self.arena.has(b);
        let mut conjuncts = Vec::with_capacity(fields_a.len());
        for i in 0..fields_a.len() {
            let va = values_a[i];
            let vb = values_b[i];
            let entry = self.cache_eq(ctx, va, vb)?;
            conjuncts.push(self.entry_to_term(entry, va, vb));
        }
        self.assert_native_eq_iff(a, b, SmtTerm::And(conjuncts))?;
        Ok(EqEntry::Eq)
    }

    fn cache_eq_tuple(&mut self, ctx: NodeId, a: CellRef, b: CellRef) -> CoreResult<EqEntry> {
        let values_a = self.arena.has(a);
        let values_b = self.arena.has(b);
        let mut conjuncts = Vec::with_capacity(values_a.len());
        for (&va, &vb) in values_a.iter().zip(values_b.iter()) {
            let entry = self.cache_eq(ctx, va, vb)?;
            conjuncts.push(self.entry_to_term(entry, va, vb));
        }
        self.assert_native_eq_iff(a, b, SmtTerm::And(conjuncts))?;
        Ok(EqEntry::Eq)
    }

    fn cache_eq_seq(&mut self, ctx: NodeId, a: CellRef, b: CellRef) -> CoreResult<EqEntry> {
        let values_a = self.arena.has(a);
        let values_b = self.arena.has(b);
        if values_a.len() != values_b.len() {
            return Ok(EqEntry::False);
        }
        let mut conjuncts = Vec::with_capacity(values_a.len());
        for (&va, &vb) in values_a.iter().zip(values_b.iter()) {
            let entry = self.cache_eq(ctx, va, vb)?;
            conjuncts.push(self.entry_to_term(entry, va, vb));
        }
        self.assert_native_eq_iff(a, b, SmtTerm::And(conjuncts))?;
        Ok(EqEntry::Eq)
    }

    fn required_dom(&self, ctx: NodeId, c: CellRef) -> CoreResult<CellRef> {
        self.arena.dom(c).ok_or(Error::MalformedIr { node: ctx, expected: "a dom edge" })
    }

    fn required_cdm(&self, ctx: NodeId, c: CellRef) -> CoreResult<CellRef> {
        self.arena.cdm(c).ok_or(Error::MalformedIr { node: ctx, expected: "a cdm edge" })
    }

    /// Assert `(a = b) ⇔ rhs` to the gateway, declaring both cells' native
    /// SMT representation first. Native `=` is sound for this pair from
    /// this point on, which is why the caller always installs `Eq`.
    fn assert_native_eq_iff(&mut self, a: CellRef, b: CellRef, rhs: SmtTerm) -> CoreResult<()> {
        self.declare(a);
        self.declare(b);
        let native_eq = SmtTerm::Eq(Box::new(self.term_for(a)), Box::new(self.term_for(b)));
        self.gateway.assert_ground(&SmtTerm::iff(native_eq, rhs))
    }

    /// Declare a cell's native SMT representation, idempotently, per its
    /// signature: booleans and integers get their native sort, everything
    /// else (including `Str`, which this crate's minimal gateway has no
    /// dedicated sort for) an uninterpreted sort tagged by its cell type.
    fn declare(&mut self, cell: CellRef) {
        let ty = self.arena.cell_type(cell).clone();
        match ty.signature() {
            Signature::Bool => self.gateway.declare_bool(cell),
            Signature::Int => self.gateway.declare_int(cell),
            _ => self.gateway.declare_opaque(cell, &ty.to_string()),
        }
    }

    fn term_for(&self, cell: CellRef) -> SmtTerm {
        match self.arena.cell_type(cell).signature() {
            Signature::Bool => SmtTerm::BoolVar(cell),
            Signature::Int => SmtTerm::IntVar(cell),
            _ => SmtTerm::OpaqueVar(cell),
        }
    }

    fn entry_to_term(&self, entry: EqEntry, a: CellRef, b: CellRef) -> SmtTerm {
        match entry {
            EqEntry::True => SmtTerm::BoolConst(true),
            EqEntry::False => SmtTerm::BoolConst(false),
            EqEntry::Expr(c) => SmtTerm::BoolVar(c),
            EqEntry::Eq => SmtTerm::Eq(Box::new(self.term_for(a)), Box::new(self.term_for(b))),
        }
    }

    /// Materialise a term per §4.4's mandatory policy: constants and bare
    /// variables are returned unchanged, everything else becomes a fresh
    /// boolean cell whose equivalence to the term is asserted.
    fn materialize(&mut self, term: SmtTerm) -> CoreResult<SmtTerm> {
        match &term {
            SmtTerm::BoolVar(_) | SmtTerm::BoolConst(_) => Ok(term),
            _ => {
                let cell = self.alloc_materialized(term)?;
                Ok(SmtTerm::BoolVar(cell))
            }
        }
    }

    fn alloc_materialized(&mut self, term: SmtTerm) -> CoreResult<CellRef> {
        let cell = self.arena.alloc_cell(CellType::Bool);
        self.gateway.declare_bool(cell);
        let iff = SmtTerm::iff(SmtTerm::BoolVar(cell), term);
        self.gateway.assert_ground(&iff)?;
        Ok(cell)
    }

    fn types_of(&self, a: CellRef, b: CellRef) -> (CellType, CellType) {
        (self.arena.cell_type(a).clone(), self.arena.cell_type(b).clone())
    }
}
