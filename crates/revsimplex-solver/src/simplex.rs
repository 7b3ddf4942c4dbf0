use log::{debug, info};

use crate::canonical::{CanonicalForm, DEFAULT_TOLERANCE, Pivot, SimplexError, StepOutcome};
use crate::problem::Problem;
use crate::solution::{Solution, SolutionStatus};

/// Revised simplex driver for problems in standard maximization form
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve starting from the all-slack basis
    pub fn solve(&self, problem: &Problem) -> Result<Solution, SimplexError> {
        self.solve_with_observer(problem, |_, _| {})
    }

    /// Like [`Solver::solve`], calling `observer` with the dictionary after every pivot
    pub fn solve_with_observer<F>(&self, problem: &Problem, observer: F) -> Result<Solution, SimplexError>
    where
        F: FnMut(&CanonicalForm, &Pivot),
    {
        let mut cf = CanonicalForm::from_problem(problem)?;
        self.run(&mut cf, observer)
    }

    /// Drive an existing dictionary until it is terminal or the iteration cap is hit.
    ///
    /// The solver's tolerance replaces whatever `cf` was configured with.
    pub fn run<F>(&self, cf: &mut CanonicalForm, mut observer: F) -> Result<Solution, SimplexError>
    where
        F: FnMut(&CanonicalForm, &Pivot),
    {
        cf.set_tolerance(self.tolerance);
        let mut iterations = 0;
        let mut status = SolutionStatus::IterationLimit;

        for _ in 0..self.max_iterations {
            match cf.step(None)? {
                StepOutcome::Pivoted(pivot) => {
                    iterations += 1;
                    debug!(
                        "pivot {}: x{} enters at row {}, x{} leaves, step {}",
                        iterations, pivot.entering_variable, pivot.leaving_row, pivot.leaving_variable, pivot.step
                    );
                    observer(cf, &pivot);
                }
                StepOutcome::Optimal => {
                    status = SolutionStatus::Optimal;
                    break;
                }
                StepOutcome::Unbounded { entering_variable, .. } => {
                    debug!("x{} can increase without bound", entering_variable);
                    status = SolutionStatus::Unbounded;
                    break;
                }
            }
        }

        // The cap may land exactly on an optimal vertex; check without pivoting
        if status == SolutionStatus::IterationLimit && cf.find_entering(&cf.find_y()?, None)?.is_none() {
            status = SolutionStatus::Optimal;
        }

        let (values, objective_value) = cf.extract_result();
        let analysis = cf.analysis()?;
        info!(
            "{:?} after {} pivots, objective {}",
            status, iterations, objective_value
        );

        Ok(Solution {
            status,
            iterations,
            values,
            objective_value,
            num_variables: cf.num_variables(),
            analysis,
        })
    }
}

/// Solve `problem` with the default solver and at most `max_iterations` pivots
pub fn solve(problem: &Problem, max_iterations: usize) -> Result<Solution, SimplexError> {
    Solver::new().with_max_iterations(max_iterations).solve(problem)
}
