/*!
Single-peakedness of strict complete profiles.

A profile is single-peaked when the alternatives can be laid out on an axis
such that every voter prefers alternatives closer to their peak. Following
Bartholdi and Trick, this is the case exactly when the matrix whose rows are
the top-k sets of every ballot has the consecutive-ones property. That
property is checked with a SAT encoding over the variables
`leftof(x, y)`: "column x is placed left of column y".

Large instances are encoded incrementally: the columns are added by batches
and the search stops as soon as a batch is unsatisfiable.
*/

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use snafu::prelude::*;

use crate::config::*;
use crate::instance::PreflibInstance;
use crate::sat::{CdclSolver, DpllSolver, Literal, SatOutcome, SatSolver};

// Columns are the alternatives shifted to start at 0.
struct ConsecutiveOnes {
    num_cols: usize,
    rows: Vec<Vec<bool>>,
    added: HashSet<Vec<Literal>>,
}

impl ConsecutiveOnes {
    fn from_orders(orders: &[Vec<AltId>], num_cols: usize) -> PreflibResult<ConsecutiveOnes> {
        // Every leftof(x, y) must be a valid DIMACS variable.
        let num_vars = num_cols
            .checked_mul(num_cols)
            .and_then(|n| Literal::try_from(n).ok());
        ensure!(
            num_vars.is_some(),
            TooManyAlternativesSnafu {
                num_alternatives: num_cols
            }
        );
        let mut rows: Vec<Vec<bool>> = Vec::new();
        for order in orders {
            let mut row = vec![false; num_cols];
            // The last prefix contains every column and constrains nothing.
            for alt in order.iter().take(order.len().saturating_sub(1)) {
                let col = (*alt as usize).checked_sub(1).filter(|c| *c < num_cols);
                match col {
                    Some(c) => row[c] = true,
                    None => {
                        return InvalidOrderSnafu {
                            order: order.iter().map(|a| vec![*a]).collect::<Order>(),
                            reason: "alternative outside of the profile",
                        }
                        .fail()
                    }
                }
                rows.push(row.clone());
            }
        }
        Ok(ConsecutiveOnes {
            num_cols,
            rows,
            added: HashSet::new(),
        })
    }

    fn leftof(&self, x: usize, y: usize) -> Literal {
        // In range: from_orders checked num_cols * num_cols.
        (x * self.num_cols + y + 1) as Literal
    }

    fn add<S: SatSolver>(&mut self, solver: &mut S, clause: Vec<Literal>) {
        if !self.added.contains(&clause) {
            solver.add_clause(&clause);
            self.added.insert(clause);
        }
    }

    /// Adds the constraints restricted to the columns `0..cols`.
    fn encode<S: SatSolver>(&mut self, solver: &mut S, cols: usize) {
        let mut clauses: Vec<Vec<Literal>> = Vec::new();
        for x in 0..cols {
            for y in 0..cols {
                if x == y {
                    continue;
                }
                if x < y {
                    clauses.push(vec![-self.leftof(x, y), -self.leftof(y, x)]);
                    clauses.push(vec![self.leftof(x, y), self.leftof(y, x)]);
                }
                for z in 0..cols {
                    if z != x && z != y {
                        clauses.push(vec![
                            -self.leftof(x, y),
                            -self.leftof(y, z),
                            self.leftof(x, z),
                        ]);
                    }
                }
            }
        }
        for row in self.rows.iter() {
            let ones: Vec<usize> = (0..cols).filter(|c| row[*c]).collect();
            let zeros: Vec<usize> = (0..cols).filter(|c| !row[*c]).collect();
            for (i, &x) in ones.iter().enumerate() {
                for &y in ones[i + 1..].iter() {
                    for &z in zeros.iter() {
                        // No zero strictly between two ones, in both directions.
                        clauses.push(vec![-self.leftof(x, z), -self.leftof(z, y)]);
                        clauses.push(vec![-self.leftof(y, z), -self.leftof(z, x)]);
                    }
                }
            }
        }
        let before = self.added.len();
        for clause in clauses {
            self.add(solver, clause);
        }
        debug!(
            "encode: {} columns, {} new clauses",
            cols,
            self.added.len() - before
        );
    }

    /// Alternatives sorted by the number of columns they are left of.
    fn axis(&self, model: &[Literal]) -> Vec<AltId> {
        let is_true = |lit: Literal| model.get((lit - 1) as usize).map_or(false, |l| *l > 0);
        let mut positions: Vec<(usize, usize)> = (0..self.num_cols)
            .map(|x| {
                let left_of = (0..self.num_cols)
                    .filter(|&y| y != x && is_true(self.leftof(x, y)))
                    .count();
                (left_of, x)
            })
            .collect();
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.into_iter().map(|(_, x)| (x + 1) as AltId).collect()
    }
}

/// Checks whether a `soc` profile is single-peaked, using the backend chosen
/// in the configuration.
///
/// Returns a witnessing axis (alternatives from left to right) or `None`.
pub fn is_single_peaked(
    instance: &PreflibInstance,
    config: &SinglePeakedConfig,
) -> PreflibResult<Option<Vec<AltId>>> {
    match config.solver {
        SolverChoice::Cdcl => {
            if config.max_decisions.is_some() {
                warn!("is_single_peaked: the decision budget only applies to the dpll backend");
            }
            is_single_peaked_with(instance, config, &mut CdclSolver::new())
        }
        SolverChoice::Dpll => {
            let mut solver = DpllSolver::new(config.max_decisions);
            is_single_peaked_with(instance, config, &mut solver)
        }
    }
}

/// Same as [is_single_peaked] with a caller-provided SAT backend.
///
/// The solver must not contain any clause yet.
pub fn is_single_peaked_with<S: SatSolver>(
    instance: &PreflibInstance,
    config: &SinglePeakedConfig,
    solver: &mut S,
) -> PreflibResult<Option<Vec<AltId>>> {
    ensure!(
        instance.data_type == DataType::Soc,
        PropertyNotApplicableSnafu {
            property: "isSP",
            data_type: instance.data_type
        }
    );
    ensure!(!instance.orders.is_empty(), EmptyProfileSnafu);
    let orders: Vec<Vec<AltId>> = instance
        .flatten_strict()?
        .into_iter()
        .map(|(order, _)| order)
        .collect();
    let num_cols = instance.num_alternatives;
    let mut matrix = ConsecutiveOnes::from_orders(&orders, num_cols)?;
    debug!(
        "is_single_peaked: {} rows, {} columns",
        matrix.rows.len(),
        num_cols
    );

    let step = config.column_step.max(1);
    let mut cols = config.initial_columns.max(1).min(num_cols);
    loop {
        matrix.encode(solver, cols);
        match solver.solve() {
            SatOutcome::Unsatisfiable => {
                info!(
                    "is_single_peaked: {:?} is not single-peaked ({} columns)",
                    instance.file_name, cols
                );
                return Ok(None);
            }
            SatOutcome::Unknown { decisions } => {
                return SolverTimeoutSnafu { decisions }.fail();
            }
            SatOutcome::Satisfiable(model) => {
                if cols >= num_cols {
                    let axis = matrix.axis(&model);
                    debug!("is_single_peaked: axis {:?}", axis);
                    return Ok(Some(axis));
                }
            }
        }
        cols = (cols + step).min(num_cols);
    }
}

/// Checks that every order is single-peaked with respect to the given axis.
///
/// Each prefix of a single-peaked order occupies an interval of the axis.
pub fn is_single_peaked_on(orders: &[Vec<AltId>], axis: &[AltId]) -> bool {
    let position: HashMap<AltId, usize> = axis.iter().enumerate().map(|(i, a)| (*a, i)).collect();
    orders.iter().all(|order| {
        let mut positions = order.iter().map(|a| position.get(a).copied());
        let (mut lo, mut hi) = match positions.next() {
            Some(Some(p)) => (p, p),
            Some(None) => return false,
            None => return true,
        };
        for p in positions {
            match p {
                Some(p) if p + 1 == lo => lo = p,
                Some(p) if p == hi + 1 => hi = p,
                _ => return false,
            }
        }
        true
    })
}
