//! The SMT gateway (§4.2): an abstraction over the underlying solver that
//! hides its API behind `assertGround`/`push`/`pop`/`sat`/`getInterp`, and
//! guarantees that calls to `push`/`pop` on its stack are paired with
//! identical operations on the arena and the equality cache (the caller's
//! responsibility; the gateway only guarantees its *own* stack is sound).

#[cfg(feature = "z3-backend")]
mod z3_gateway;
mod text_gateway;

#[cfg(feature = "z3-backend")]
pub use z3_gateway::Z3Gateway;
pub use text_gateway::TextGateway;

use crate::arena::CellRef;
use crate::error::CoreResult;

/// The result of a `check-sat` query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown,
}

/// A ground boolean/integer term built over declared cell variables. This
/// is the payload `assertGround` accepts; the equality engine and rewriter
/// are the only callers that construct these.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SmtTerm {
    BoolVar(CellRef),
    IntVar(CellRef),
    /// A cell declared via [`SmtGateway::declare_opaque`]: an uninterpreted
    /// sort constant. Structural cells (sets, functions, records, tuples,
    /// sequences) are represented this way — their "native SMT equality"
    /// (§3.1's signature-sharing rule) is the solver's congruence equality
    /// over this constant, sound only once the structural bi-implication
    /// has been asserted (§4.4's caching rule).
    OpaqueVar(CellRef),
    BoolConst(bool),
    IntConst(i64),
    Not(Box<SmtTerm>),
    And(Vec<SmtTerm>),
    Or(Vec<SmtTerm>),
    Iff(Box<SmtTerm>, Box<SmtTerm>),
    Implies(Box<SmtTerm>, Box<SmtTerm>),
    Eq(Box<SmtTerm>, Box<SmtTerm>),
    /// Strict integer ordering, needed only by the assignment-strategy
    /// solver's `R(i) < R(j)` clauses (§4.6).
    Lt(Box<SmtTerm>, Box<SmtTerm>),
    /// A term handed back by [`SmtGateway::parse_smt_lib`]. Opaque to
    /// everything but the gateway that produced it: `Raw`'s payload is
    /// whatever internal key or verbatim text that gateway needs to make
    /// sense of itself again in `assert_ground`, not a portable AST the
    /// caller can pattern-match on or recombine with the other
    /// constructors.
    Raw(String),
}

impl SmtTerm {
    pub fn and(terms: Vec<SmtTerm>) -> SmtTerm {
        SmtTerm::And(terms)
    }

    pub fn or(terms: Vec<SmtTerm>) -> SmtTerm {
        SmtTerm::Or(terms)
    }

    pub fn not(t: SmtTerm) -> SmtTerm {
        SmtTerm::Not(Box::new(t))
    }

    pub fn iff(a: SmtTerm, b: SmtTerm) -> SmtTerm {
        SmtTerm::Iff(Box::new(a), Box::new(b))
    }
}

/// The SMT gateway contract of §4.2. Implementors own a live solver
/// instance (or a text-only stand-in) for their entire lifetime (§5's
/// "shared resource policy").
pub trait SmtGateway {
    /// Declare a boolean-sorted cell as an SMT constant, idempotently.
    fn declare_bool(&mut self, cell: CellRef);

    /// Declare an integer-sorted cell as an SMT constant, idempotently.
    fn declare_int(&mut self, cell: CellRef);

    /// Declare a structurally-typed cell as a constant of an uninterpreted
    /// sort named `sort_tag` (cells that share a tag share a sort, which is
    /// what makes congruence equality between them sound once caching
    /// installs `EqEntry::Eq` for the pair). Idempotent.
    fn declare_opaque(&mut self, cell: CellRef, sort_tag: &str);

    /// Assert a ground term. Declarations for any variable it mentions
    /// must already have happened.
    fn assert_ground(&mut self, term: &SmtTerm) -> CoreResult<()>;

    /// Open a new scope. Must be paired with `pop`.
    fn push(&mut self);

    /// Close the most recently opened scope, discarding its assertions.
    fn pop(&mut self);

    /// Close `n` scopes at once.
    fn pop_n(&mut self, n: usize) {
        for _ in 0..n {
            self.pop();
        }
    }

    /// Decide satisfiability of the current assertion set.
    fn check_sat(&mut self) -> CoreResult<SatResult>;

    /// Extract the boolean interpretation of a declared cell from the most
    /// recent `Sat` model. `None` if the model does not constrain it.
    fn get_interp_bool(&mut self, cell: CellRef) -> CoreResult<Option<bool>>;

    /// Extract the integer interpretation of a declared cell from the most
    /// recent `Sat` model. `None` if the model does not constrain it. Used
    /// by the assignment-strategy solver to read back each candidate's
    /// position in the chosen ordering (§4.6).
    fn get_interp_int(&mut self, cell: CellRef) -> CoreResult<Option<i64>>;

    /// Parse a self-contained fragment of SMT-LIB2 text (one or more
    /// `assert`/`declare-*` commands) into a [`SmtTerm::Raw`] standing for
    /// the conjunction of whatever it asserts. The text must declare any
    /// symbol it introduces itself; this is not a way to reference cells
    /// this gateway already knows about under their internal names. The
    /// returned term is only valid passed back to `assert_ground` on this
    /// same gateway instance.
    fn parse_smt_lib(&mut self, text: &str) -> CoreResult<SmtTerm>;

    /// Write a line to whatever trace the gateway keeps (debugging aid
    /// only; never part of the correctness contract).
    fn log(&mut self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smt_term_constructors_compose() {
        let a = SmtTerm::BoolConst(true);
        let b = SmtTerm::BoolConst(false);
        let t = SmtTerm::iff(a, SmtTerm::not(b));
        assert!(matches!(t, SmtTerm::Iff(_, _)));
    }
}
