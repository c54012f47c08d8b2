//! The few knobs §5/§9 leave as "the caller's responsibility": SMT
//! timeouts, which gateway backend to use, and the guard that triggers the
//! subset-equal materialisation policy of §4.4.

/// Which [`crate::smt::SmtGateway`] implementation to construct.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolverBackend {
    /// A live `z3` process via [`crate::smt::Z3Gateway`].
    Z3,
    /// SMT-LIB2 text emission only, no solving — see [`crate::smt::TextGateway`].
    TextOnly,
}

/// Core configuration, threaded explicitly rather than read from a global.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    /// Milliseconds before the solver gives up and returns `unknown`. The
    /// core never retries a timed-out query (§7); it is purely advisory to
    /// the backend that honors it (`Z3Gateway`).
    pub smt_timeout_ms: u32,
    pub backend: SolverBackend,
    /// Once a subset-equal predicate's non-constant sub-expression count
    /// would exceed this, every such sub-expression is materialised as its
    /// own boolean cell rather than inlined, per §4.4's mandatory policy.
    /// The policy itself is unconditional; this only controls how
    /// aggressively intermediate cells are introduced versus reusing
    /// already-materialised ones within a single subset-equal call.
    pub max_subset_pairs_inline: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            smt_timeout_ms: 10_000,
            backend: SolverBackend::Z3,
            max_subset_pairs_inline: 64,
        }
    }
}
