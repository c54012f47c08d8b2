//! A solver-agnostic gateway that only emits SMT-LIB2 text and never
//! actually decides satisfiability. Used by tests that don't want a live
//! Z3 process, and by the assignment-strategy solver's file-output path
//! (§6: "File output (optional) prepends `(set-logic QF_UFLIA)` and
//! appends `(check-sat) (get-model) (exit)`").

use crate::arena::CellRef;
use crate::error::CoreResult;
use crate::smt::{SatResult, SmtGateway, SmtTerm};
use std::collections::HashSet;
use std::fmt::Write as _;

/// Gateway backend with no attached solver process. `check_sat` always
/// reports `Unknown`, since there is genuinely nothing deciding it; this
/// is a deliberate, documented limitation, not an oversight (see
/// `SPEC_FULL.md` §4.2).
#[derive(Debug, Default)]
pub struct TextGateway {
    declared_bool: HashSet<CellRef>,
    declared_int: HashSet<CellRef>,
    declared_opaque: Vec<(CellRef, String)>,
    /// One entry per currently open scope: the number of assertion lines
    /// emitted before that scope was opened, so `pop` can truncate.
    scope_marks: Vec<usize>,
    assertions: Vec<String>,
    trace: Vec<String>,
}

impl TextGateway {
    pub fn new() -> Self {
        TextGateway::default()
    }

    /// Render the term to SMT-LIB2 syntax.
    fn render(term: &SmtTerm) -> String {
        match term {
            SmtTerm::BoolVar(c) | SmtTerm::IntVar(c) | SmtTerm::OpaqueVar(c) => c.to_string(),
            SmtTerm::BoolConst(true) => "true".to_string(),
            SmtTerm::BoolConst(false) => "false".to_string(),
            SmtTerm::IntConst(n) => n.to_string(),
            SmtTerm::Not(t) => format!("(not {})", Self::render(t)),
            SmtTerm::And(ts) => {
                let mut s = String::from("(and");
                for t in ts {
                    let _ = write!(s, " {}", Self::render(t));
                }
                s.push(')');
                s
            }
            SmtTerm::Or(ts) => {
                let mut s = String::from("(or");
                for t in ts {
                    let _ = write!(s, " {}", Self::render(t));
                }
                s.push(')');
                s
            }
            SmtTerm::Iff(a, b) => format!("(= {} {})", Self::render(a), Self::render(b)),
            SmtTerm::Implies(a, b) => format!("(=> {} {})", Self::render(a), Self::render(b)),
            SmtTerm::Eq(a, b) => format!("(= {} {})", Self::render(a), Self::render(b)),
            SmtTerm::Lt(a, b) => format!("(< {} {})", Self::render(a), Self::render(b)),
            SmtTerm::Raw(text) => text.clone(),
        }
    }

    /// Declarations plus assertions currently in scope, as an SMT-LIB2
    /// script body (without the logic prologue or trailing commands).
    pub fn render_script_body(&self) -> String {
        let mut out = String::new();
        let mut bools: Vec<_> = self.declared_bool.iter().collect();
        bools.sort();
        for c in bools {
            let _ = writeln!(out, "(declare-const {c} Bool)");
        }
        let mut ints: Vec<_> = self.declared_int.iter().collect();
        ints.sort();
        for c in ints {
            let _ = writeln!(out, "(declare-const {c} Int)");
        }
        for (c, sort_tag) in &self.declared_opaque {
            let _ = writeln!(out, "(declare-const {c} {sort_tag})");
        }
        for a in &self.assertions {
            let _ = writeln!(out, "(assert {a})");
        }
        out
    }

    /// The full file-output form described in §6.
    pub fn render_file(&self, logic: &str) -> String {
        format!(
            "(set-logic {logic})\n{}(check-sat) (get-model) (exit)\n",
            self.render_script_body()
        )
    }

    /// Split `text` into its top-level parenthesized forms (declarations,
    /// `assert` commands, or bare terms), ignoring everything else as
    /// whitespace. Paren-depth tracking only; no quoting/escaping support,
    /// which this gateway's own `render` never produces anyway.
    fn top_level_forms(text: &str) -> Vec<&str> {
        let mut forms = Vec::new();
        let mut depth = 0usize;
        let mut start = None;
        for (i, ch) in text.char_indices() {
            match ch {
                '(' => {
                    if depth == 0 {
                        start = Some(i);
                    }
                    depth += 1;
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        if let Some(s) = start.take() {
                            forms.push(&text[s..=i]);
                        }
                    }
                }
                _ => {}
            }
        }
        forms
    }

    /// Strip a top-level `(assert X)` wrapper down to `X`; a bare term
    /// (e.g. a declaration-free boolean expression) passes through as-is.
    fn strip_assert(form: &str) -> &str {
        let inner = form.trim();
        if let Some(rest) = inner.strip_prefix("(assert") {
            rest.trim().strip_suffix(')').unwrap_or(rest).trim()
        } else {
            inner
        }
    }
}

impl SmtGateway for TextGateway {
    fn declare_bool(&mut self, cell: CellRef) {
        self.declared_bool.insert(cell);
    }

    fn declare_int(&mut self, cell: CellRef) {
        self.declared_int.insert(cell);
    }

    fn declare_opaque(&mut self, cell: CellRef, sort_tag: &str) {
        if !self.declared_opaque.iter().any(|(c, _)| *c == cell) {
            self.declared_opaque.push((cell, sort_tag.to_string()));
        }
    }

    fn assert_ground(&mut self, term: &SmtTerm) -> CoreResult<()> {
        self.assertions.push(Self::render(term));
        Ok(())
    }

    fn push(&mut self) {
        self.scope_marks.push(self.assertions.len());
    }

    fn pop(&mut self) {
        if let Some(mark) = self.scope_marks.pop() {
            self.assertions.truncate(mark);
        }
    }

    fn check_sat(&mut self) -> CoreResult<SatResult> {
        Ok(SatResult::Unknown)
    }

    fn get_interp_bool(&mut self, _cell: CellRef) -> CoreResult<Option<bool>> {
        Ok(None)
    }

    fn get_interp_int(&mut self, _cell: CellRef) -> CoreResult<Option<i64>> {
        Ok(None)
    }

    fn parse_smt_lib(&mut self, text: &str) -> CoreResult<SmtTerm> {
        let asserted: Vec<String> = Self::top_level_forms(text)
            .into_iter()
            .filter(|f| !f.trim_start().starts_with("(declare-"))
            .map(|f| Self::strip_assert(f).to_string())
            .collect();
        let body = match asserted.len() {
            0 => "true".to_string(),
            1 => asserted.into_iter().next().unwrap(),
            _ => format!("(and {})", asserted.join(" ")),
        };
        Ok(SmtTerm::Raw(body))
    }

    fn log(&mut self, message: &str) {
        self.trace.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn pop_discards_assertions_made_since_push() {
        let mut arena = Arena::new();
        let mut gw = TextGateway::new();
        let a = arena.cell_true();
        gw.declare_bool(a);
        gw.assert_ground(&SmtTerm::BoolVar(a)).unwrap();
        gw.push();
        gw.assert_ground(&SmtTerm::not(SmtTerm::BoolVar(a))).unwrap();
        assert_eq!(gw.assertions.len(), 2);
        gw.pop();
        assert_eq!(gw.assertions.len(), 1);
    }

    #[test]
    fn render_file_wraps_logic_and_epilogue() {
        let mut gw = TextGateway::new();
        let arena = Arena::new();
        gw.declare_bool(arena.cell_true());
        gw.assert_ground(&SmtTerm::BoolVar(arena.cell_true())).unwrap();
        let text = gw.render_file("QF_UFLIA");
        assert!(text.starts_with("(set-logic QF_UFLIA)\n"));
        assert!(text.trim_end().ends_with("(check-sat) (get-model) (exit)"));
        assert!(text.contains("(declare-const c0 Bool)"));
    }

    #[test]
    fn parse_smt_lib_strips_assert_and_conjoins_multiple_forms() {
        let mut gw = TextGateway::new();
        let term = gw.parse_smt_lib("(declare-const c0 Bool) (assert (= c0 true)) (assert (not c0))").unwrap();
        assert_eq!(term, SmtTerm::Raw("(and (= c0 true) (not c0))".to_string()));
    }

    #[test]
    fn parse_smt_lib_round_trips_through_assert_ground() {
        let mut gw = TextGateway::new();
        let term = gw.parse_smt_lib("(assert (= c0 c1))").unwrap();
        gw.assert_ground(&term).unwrap();
        assert_eq!(gw.assertions.last().unwrap(), "(= c0 c1)");
    }
}
