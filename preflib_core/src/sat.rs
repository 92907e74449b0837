/*!
Satisfiability backends for the single-peakedness test.

Formulas are given in conjunctive normal form with DIMACS literals: the
variable `v` (starting at 1) is the literal `v`, its negation is `-v`.

[CdclSolver] wraps the `varisat` clause-learning solver and is used by
default. [DpllSolver] is a plain DPLL with two watched literals and
chronological backtracking. It only suits a few dozen alternatives, but it
can stop after a fixed number of decisions. Any other backend can be used by
implementing [SatSolver].
*/

use std::collections::HashSet;

use log::{debug, warn};
use varisat::{ExtendFormula, Lit};

/// A DIMACS literal.
pub type Literal = i32;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SatOutcome {
    /// A model, one literal per variable from 1 to the largest variable seen.
    Satisfiable(Vec<Literal>),
    Unsatisfiable,
    /// The decision budget ran out before an answer was found.
    Unknown { decisions: u64 },
}

/// A CNF satisfiability backend.
pub trait SatSolver {
    fn add_clause(&mut self, clause: &[Literal]);

    /// Solves all the clauses added so far. Can be called again after more
    /// clauses were added.
    fn solve(&mut self) -> SatOutcome;
}

/// Incremental CDCL search through `varisat`.
pub struct CdclSolver {
    solver: varisat::Solver<'static>,
    num_vars: usize,
    num_clauses: usize,
}

impl CdclSolver {
    pub fn new() -> CdclSolver {
        CdclSolver {
            solver: varisat::Solver::new(),
            num_vars: 0,
            num_clauses: 0,
        }
    }

    pub fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}

impl Default for CdclSolver {
    fn default() -> Self {
        CdclSolver::new()
    }
}

impl SatSolver for CdclSolver {
    fn add_clause(&mut self, clause: &[Literal]) {
        let lits: Vec<Lit> = clause
            .iter()
            .map(|l| Lit::from_dimacs(*l as isize))
            .collect();
        for lit in clause.iter() {
            self.num_vars = self.num_vars.max(var_of(*lit));
        }
        self.solver.add_clause(&lits);
        self.num_clauses += 1;
    }

    fn solve(&mut self) -> SatOutcome {
        debug!(
            "solve (cdcl): {} variables, {} clauses",
            self.num_vars, self.num_clauses
        );
        match self.solver.solve() {
            Ok(false) => SatOutcome::Unsatisfiable,
            Ok(true) => {
                // Variables the solver never saw are left positive.
                let mut model: Vec<Literal> = (1..=self.num_vars as Literal).collect();
                for lit in self.solver.model().unwrap_or_default() {
                    let dimacs = lit.to_dimacs();
                    let var = dimacs.unsigned_abs();
                    if var >= 1 && var <= self.num_vars {
                        model[var - 1] = dimacs as Literal;
                    }
                }
                SatOutcome::Satisfiable(model)
            }
            Err(e) => {
                warn!("solve (cdcl): the search stopped: {:?}", e);
                SatOutcome::Unknown { decisions: 0 }
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Reason {
    Decision,
    // A decision whose other branch is being explored.
    Flipped,
    Implied,
}

#[derive(Debug, Clone, Default)]
pub struct DpllSolver {
    max_decisions: Option<u64>,
    clauses: Vec<Vec<Literal>>,
    seen: HashSet<Vec<Literal>>,
    has_empty_clause: bool,
    num_vars: usize,
    // Search state, rebuilt by every call to solve.
    assignment: Vec<Option<bool>>,
    trail: Vec<(Literal, Reason)>,
    watches: Vec<Vec<usize>>,
    queue_head: usize,
}

fn var_of(lit: Literal) -> usize {
    lit.unsigned_abs() as usize
}

// Index of a literal in the watch lists.
fn watch_index(lit: Literal) -> usize {
    2 * (var_of(lit) - 1) + usize::from(lit < 0)
}

fn lit_value(assignment: &[Option<bool>], lit: Literal) -> Option<bool> {
    assignment[var_of(lit)].map(|v| if lit > 0 { v } else { !v })
}

impl DpllSolver {
    pub fn new(max_decisions: Option<u64>) -> DpllSolver {
        DpllSolver {
            max_decisions,
            ..DpllSolver::default()
        }
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn assign(&mut self, lit: Literal, reason: Reason) {
        self.assignment[var_of(lit)] = Some(lit > 0);
        self.trail.push((lit, reason));
    }

    // Returns false on conflict.
    fn propagate(&mut self) -> bool {
        while self.queue_head < self.trail.len() {
            let false_lit = -self.trail[self.queue_head].0;
            self.queue_head += 1;
            let watchers = std::mem::take(&mut self.watches[watch_index(false_lit)]);
            let mut kept: Vec<usize> = Vec::with_capacity(watchers.len());
            let mut conflict = false;
            for ci in watchers {
                if conflict {
                    kept.push(ci);
                    continue;
                }
                let clause = &mut self.clauses[ci];
                if clause[0] == false_lit {
                    clause.swap(0, 1);
                }
                if lit_value(&self.assignment, clause[0]) == Some(true) {
                    kept.push(ci);
                    continue;
                }
                let replacement = (2..clause.len())
                    .find(|k| lit_value(&self.assignment, clause[*k]) != Some(false));
                if let Some(k) = replacement {
                    clause.swap(1, k);
                    self.watches[watch_index(clause[1])].push(ci);
                    continue;
                }
                kept.push(ci);
                let other = clause[0];
                match lit_value(&self.assignment, other) {
                    None => self.assign(other, Reason::Implied),
                    _ => conflict = true,
                }
            }
            self.watches[watch_index(false_lit)] = kept;
            if conflict {
                return false;
            }
        }
        true
    }

    // Undoes the trail up to the last unexplored decision and takes its other
    // branch. Returns false when the search space is exhausted.
    fn backtrack(&mut self) -> bool {
        while let Some((lit, reason)) = self.trail.pop() {
            self.assignment[var_of(lit)] = None;
            if reason == Reason::Decision {
                self.assign(-lit, Reason::Flipped);
                self.queue_head = self.trail.len() - 1;
                return true;
            }
        }
        false
    }

    fn reset(&mut self) -> bool {
        self.assignment = vec![None; self.num_vars + 1];
        self.trail.clear();
        self.watches = vec![Vec::new(); 2 * self.num_vars];
        self.queue_head = 0;
        for ci in 0..self.clauses.len() {
            let clause = &self.clauses[ci];
            if clause.len() == 1 {
                let lit = clause[0];
                match lit_value(&self.assignment, lit) {
                    Some(false) => return false,
                    Some(true) => {}
                    None => self.assign(lit, Reason::Implied),
                }
            } else {
                let (first, second) = (clause[0], clause[1]);
                self.watches[watch_index(first)].push(ci);
                self.watches[watch_index(second)].push(ci);
            }
        }
        true
    }

    fn model(&self) -> Vec<Literal> {
        (1..=self.num_vars)
            .map(|v| {
                let lit = v as Literal;
                if self.assignment[v] == Some(false) {
                    -lit
                } else {
                    lit
                }
            })
            .collect()
    }
}

impl SatSolver for DpllSolver {
    fn add_clause(&mut self, clause: &[Literal]) {
        let mut lits: Vec<Literal> = clause.to_vec();
        lits.sort_unstable();
        lits.dedup();
        if lits.is_empty() {
            self.has_empty_clause = true;
            return;
        }
        // Tautologies never constrain anything.
        if lits.iter().any(|l| lits.binary_search(&-l).is_ok()) {
            return;
        }
        if !self.seen.insert(lits.clone()) {
            return;
        }
        for lit in lits.iter() {
            self.num_vars = self.num_vars.max(var_of(*lit));
        }
        self.clauses.push(lits);
    }

    fn solve(&mut self) -> SatOutcome {
        debug!(
            "solve: {} variables, {} clauses",
            self.num_vars,
            self.clauses.len()
        );
        if self.has_empty_clause || !self.reset() {
            return SatOutcome::Unsatisfiable;
        }
        let mut decisions: u64 = 0;
        if !self.propagate() {
            return SatOutcome::Unsatisfiable;
        }
        loop {
            let free_var = (1..=self.num_vars).find(|v| self.assignment[*v].is_none());
            let var = match free_var {
                Some(v) => v,
                None => {
                    debug!("solve: satisfiable after {} decisions", decisions);
                    return SatOutcome::Satisfiable(self.model());
                }
            };
            if let Some(max) = self.max_decisions {
                if decisions >= max {
                    debug!("solve: giving up after {} decisions", decisions);
                    return SatOutcome::Unknown { decisions };
                }
            }
            decisions += 1;
            self.assign(var as Literal, Reason::Decision);
            while !self.propagate() {
                if !self.backtrack() {
                    debug!("solve: unsatisfiable after {} decisions", decisions);
                    return SatOutcome::Unsatisfiable;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn solver_with(clauses: &[Vec<Literal>]) -> DpllSolver {
        let mut solver = DpllSolver::new(None);
        for c in clauses {
            solver.add_clause(c);
        }
        solver
    }

    fn cdcl_with(clauses: &[Vec<Literal>]) -> CdclSolver {
        let mut solver = CdclSolver::new();
        for c in clauses {
            solver.add_clause(c);
        }
        solver
    }

    fn satisfies(model: &[Literal], clauses: &[Vec<Literal>]) -> bool {
        clauses
            .iter()
            .all(|c| c.iter().any(|l| model[var_of(*l) - 1] == *l))
    }

    #[test]
    fn finds_a_model() {
        let clauses = vec![vec![1, 2], vec![-1, 3], vec![-3, -2], vec![2, 3]];
        let mut solver = solver_with(&clauses);
        match solver.solve() {
            SatOutcome::Satisfiable(model) => assert!(satisfies(&model, &clauses)),
            other => panic!("expected a model, got {:?}", other),
        }
    }

    #[test]
    fn contradicting_units() {
        let mut solver = solver_with(&[vec![1], vec![-1]]);
        assert_eq!(solver.solve(), SatOutcome::Unsatisfiable);
    }

    #[test]
    fn empty_clause_is_unsatisfiable() {
        let mut solver = solver_with(&[vec![1, 2], vec![]]);
        assert_eq!(solver.solve(), SatOutcome::Unsatisfiable);
    }

    #[test]
    fn pigeonhole_three_in_two() {
        // p(i, h): pigeon i sits in hole h.
        let p = |i: i32, h: i32| i * 2 + h + 1;
        let mut clauses: Vec<Vec<Literal>> = (0..3).map(|i| vec![p(i, 0), p(i, 1)]).collect();
        for h in 0..2 {
            for i in 0..3 {
                for j in (i + 1)..3 {
                    clauses.push(vec![-p(i, h), -p(j, h)]);
                }
            }
        }
        let mut solver = solver_with(&clauses);
        assert_eq!(solver.solve(), SatOutcome::Unsatisfiable);
    }

    #[test]
    fn tautologies_and_duplicates_are_dropped() {
        let mut solver = solver_with(&[vec![1, -1], vec![2, 3], vec![3, 2, 2]]);
        assert_eq!(solver.num_clauses(), 1);
        assert!(matches!(solver.solve(), SatOutcome::Satisfiable(_)));
    }

    #[test]
    fn clauses_can_be_added_between_calls() {
        let mut solver = solver_with(&[vec![1, 2]]);
        assert!(matches!(solver.solve(), SatOutcome::Satisfiable(_)));
        solver.add_clause(&[-1]);
        solver.add_clause(&[-2]);
        assert_eq!(solver.solve(), SatOutcome::Unsatisfiable);
    }

    #[test]
    fn cdcl_finds_a_model_and_accepts_new_clauses() {
        let clauses = vec![vec![1, 2], vec![-1, 3], vec![-3, -2], vec![2, 3]];
        let mut solver = cdcl_with(&clauses);
        match solver.solve() {
            SatOutcome::Satisfiable(model) => {
                assert_eq!(model.len(), 3);
                assert!(satisfies(&model, &clauses));
            }
            other => panic!("expected a model, got {:?}", other),
        }
        solver.add_clause(&[-2]);
        solver.add_clause(&[-3]);
        assert_eq!(solver.solve(), SatOutcome::Unsatisfiable);
        assert_eq!(solver.num_clauses(), 6);
    }

    #[test]
    fn cdcl_pigeonhole_eight_in_seven() {
        // p(i, h): pigeon i sits in hole h.
        let p = |i: i32, h: i32| i * 7 + h + 1;
        let mut solver = CdclSolver::new();
        for i in 0..8 {
            let clause: Vec<Literal> = (0..7).map(|h| p(i, h)).collect();
            solver.add_clause(&clause);
        }
        for h in 0..7 {
            for i in 0..8 {
                for j in (i + 1)..8 {
                    solver.add_clause(&[-p(i, h), -p(j, h)]);
                }
            }
        }
        assert_eq!(solver.solve(), SatOutcome::Unsatisfiable);
    }

    #[test]
    fn decision_budget() {
        let mut solver = DpllSolver::new(Some(0));
        solver.add_clause(&[1, 2]);
        assert_eq!(solver.solve(), SatOutcome::Unknown { decisions: 0 });
    }

    fn brute_force(num_vars: usize, clauses: &[Vec<Literal>]) -> bool {
        (0..(1u32 << num_vars)).any(|bits| {
            let model: Vec<Literal> = (0..num_vars)
                .map(|v| {
                    let lit = (v + 1) as Literal;
                    if bits & (1 << v) != 0 {
                        lit
                    } else {
                        -lit
                    }
                })
                .collect();
            satisfies(&model, clauses)
        })
    }

    fn arb_clause() -> impl Strategy<Value = Vec<Literal>> {
        prop::collection::vec((1..=6i32, any::<bool>()), 1..=3)
            .prop_map(|lits| lits.into_iter().map(|(v, neg)| if neg { -v } else { v }).collect())
    }

    proptest! {
        #[test]
        fn agrees_with_brute_force(clauses in prop::collection::vec(arb_clause(), 1..30)) {
            let mut solver = solver_with(&clauses);
            match solver.solve() {
                SatOutcome::Satisfiable(model) => {
                    let mut padded = model.clone();
                    for v in (padded.len() + 1)..=6 {
                        padded.push(v as Literal);
                    }
                    prop_assert!(satisfies(&padded, &clauses));
                }
                SatOutcome::Unsatisfiable => prop_assert!(!brute_force(6, &clauses)),
                SatOutcome::Unknown { .. } => prop_assert!(false, "no budget was set"),
            }
        }

        #[test]
        fn backends_agree(clauses in prop::collection::vec(arb_clause(), 1..30)) {
            let dpll = solver_with(&clauses).solve();
            let cdcl = cdcl_with(&clauses).solve();
            prop_assert_eq!(
                matches!(dpll, SatOutcome::Satisfiable(_)),
                matches!(cdcl, SatOutcome::Satisfiable(_))
            );
            if let SatOutcome::Satisfiable(model) = cdcl {
                prop_assert!(satisfies(&model, &clauses));
            }
        }
    }
}
