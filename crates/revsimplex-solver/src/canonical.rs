//! The canonical-form dictionary and its pivot engine.
//!
//! The augmented matrix `A = [AN | B]` lives in one owned `DMatrix`. Columns
//! `0..n` always form the non-basis and columns `n..n+m` the basis; a pivot
//! swaps the physical columns rather than re-slicing, so `B`, `AN`, `cB` and
//! `cN` are plain views computed on demand.

use log::{debug, trace, warn};
use nalgebra::{DMatrix, DMatrixView, DVector};
use thiserror::Error;

use crate::problem::Problem;
use crate::solution::Analysis;

/// Relative tolerance for the positivity tests of pricing and the ratio test.
///
/// A reduced cost counts as positive when it exceeds this times the largest
/// objective coefficient; a direction entry when it exceeds this times the
/// largest entry of its direction.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimplexError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Basis matrix is singular")]
    SingularBasis,
}

/// One basis exchange, as applied by [`CanonicalForm::update`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pivot {
    /// Non-basis column the entering variable occupied
    pub entering_column: usize,
    /// Basis row the leaving variable occupied
    pub leaving_row: usize,
    /// Augmented index of the variable that became basic
    pub entering_variable: usize,
    /// Augmented index of the variable that became non-basic
    pub leaving_variable: usize,
    /// Value taken by the entering variable
    pub step: f64,
}

/// Result of a single call to [`CanonicalForm::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// A pivot was applied; the dictionary may still improve
    Pivoted(Pivot),
    /// No non-basic column has a positive reduced cost
    Optimal,
    /// The entering column can grow without bound
    Unbounded {
        entering_column: usize,
        entering_variable: usize,
    },
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepOutcome::Pivoted(_))
    }
}

/// Dictionary of a problem `max c·x, A·x <= b, x >= 0` after adding slacks
#[derive(Debug, Clone)]
pub struct CanonicalForm {
    /// Structural variables
    n: usize,
    /// Constraints, also the number of slacks and of basic variables
    m: usize,
    /// Augmented matrix (m, n+m)
    a: DMatrix<f64>,
    /// Augmented cost row (1, n+m), permuted alongside `a`
    c: DMatrix<f64>,
    /// Original right-hand side
    b: DVector<f64>,
    /// Values of the basic variables, row-ordered like the basis
    x_b_star: DVector<f64>,
    /// Augmented variable held by each physical column of `a`
    column_var: Vec<usize>,
    /// Physical column of each augmented variable
    var_column: Vec<usize>,
    /// Largest objective coefficient in magnitude; scales the pricing threshold
    cost_scale: f64,
    tolerance: f64,
    terminal: Option<StepOutcome>,
}

fn max_abs<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    values.into_iter().fold(0.0, |acc, v| acc.max(v.abs()))
}

impl CanonicalForm {
    /// Build the all-slack dictionary.
    ///
    /// `c` must be a single row of length n, `a` an m x n' matrix with
    /// n' <= n, and `b` an m x 1 column. Missing trailing columns of `a` are
    /// treated as zero. `b` is taken as-is: a negative entry makes the
    /// starting basis infeasible, which is only logged.
    pub fn new(c: &DMatrix<f64>, a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<Self, SimplexError> {
        if c.nrows() != 1 {
            return Err(SimplexError::InvalidInput(format!(
                "objective must be a single row, got {} rows",
                c.nrows()
            )));
        }
        let n = c.ncols();

        if a.ncols() > n {
            return Err(SimplexError::InvalidInput(format!(
                "constraint matrix has {} columns but the objective has {} entries",
                a.ncols(),
                n
            )));
        }
        let m = a.nrows();

        if b.shape() != (m, 1) {
            return Err(SimplexError::InvalidInput(format!(
                "right-hand side must be a {}x1 column, got {}x{}",
                m,
                b.nrows(),
                b.ncols()
            )));
        }
        let b: DVector<f64> = b.column(0).into_owned();
        if let Some(i) = b.iter().position(|&v| v < 0.0) {
            warn!(
                "right-hand side entry {} is negative ({}); the slack basis is infeasible",
                i, b[i]
            );
        }

        let mut augmented = DMatrix::zeros(m, n + m);
        augmented.view_mut((0, 0), (m, a.ncols())).copy_from(a);
        augmented.view_mut((0, n), (m, m)).fill_with_identity();

        let mut costs = DMatrix::zeros(1, n + m);
        costs.columns_mut(0, n).copy_from(c);

        debug!("canonical form with {} variables and {} constraints", n, m);
        trace!("A: {}", augmented);

        Ok(Self {
            n,
            m,
            a: augmented,
            c: costs,
            x_b_star: b.clone(),
            b,
            column_var: (0..n + m).collect(),
            var_column: (0..n + m).collect(),
            cost_scale: max_abs(c.iter()),
            tolerance: DEFAULT_TOLERANCE,
            terminal: None,
        })
    }

    pub fn from_problem(problem: &Problem) -> Result<Self, SimplexError> {
        let a = problem.constraint_matrix()?;
        Self::new(&problem.objective_matrix(), &a, &problem.rhs_matrix())
    }

    pub fn set_tolerance(&mut self, tol: f64) {
        self.tolerance = tol;
    }

    pub fn num_variables(&self) -> usize {
        self.n
    }

    pub fn num_constraints(&self) -> usize {
        self.m
    }

    /// The augmented coefficient matrix in its current column order
    pub fn augmented(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// The augmented cost row in its current column order
    pub fn costs(&self) -> &DMatrix<f64> {
        &self.c
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.b
    }

    /// Current values of the basic variables, indexed by basis row
    pub fn basic_values(&self) -> &DVector<f64> {
        &self.x_b_star
    }

    /// Basis matrix `B`
    pub fn basis(&self) -> DMatrixView<'_, f64> {
        self.a.columns(self.n, self.m)
    }

    /// Non-basis matrix `AN`
    pub fn non_basis(&self) -> DMatrixView<'_, f64> {
        self.a.columns(0, self.n)
    }

    /// Costs of the basic columns, `cB`
    pub fn basis_costs(&self) -> DMatrixView<'_, f64> {
        self.c.columns(self.n, self.m)
    }

    /// Costs of the non-basic columns, `cN`
    pub fn non_basis_costs(&self) -> DMatrixView<'_, f64> {
        self.c.columns(0, self.n)
    }

    /// Augmented index of the variable that is basic at `row`
    pub fn basic_variable(&self, row: usize) -> usize {
        self.column_var[self.n + row]
    }

    /// Augmented indices of the basic variables, in basis row order
    pub fn basic_variables(&self) -> &[usize] {
        &self.column_var[self.n..]
    }

    /// Augmented indices of the non-basic variables, in non-basis column order
    pub fn non_basic_variables(&self) -> &[usize] {
        &self.column_var[..self.n]
    }

    /// Basis row of `var`, or `None` when it is non-basic
    pub fn basis_row(&self, var: usize) -> Option<usize> {
        let column = *self.var_column.get(var)?;
        column.checked_sub(self.n)
    }

    /// The terminal outcome reached so far, if any
    pub fn terminal(&self) -> Option<StepOutcome> {
        self.terminal
    }

    /// Simplex multipliers `y = cB · B⁻¹`
    pub fn find_y(&self) -> Result<DMatrix<f64>, SimplexError> {
        let b_inv = self
            .basis()
            .clone_owned()
            .try_inverse()
            .ok_or(SimplexError::SingularBasis)?;
        let y = self.basis_costs() * b_inv;
        trace!("y: {}", y);
        Ok(y)
    }

    /// Reduced costs `r = cN - y · AN`, one per non-basis column
    pub fn reduced_costs(&self, y: &DMatrix<f64>) -> DMatrix<f64> {
        self.non_basis_costs() - y * self.non_basis()
    }

    /// Pick the entering non-basis column.
    ///
    /// The column with the largest positive reduced cost wins, the first one
    /// on ties. `None` means the dictionary is optimal.
    ///
    /// `forced` names the column to enter when its reduced cost is positive.
    /// When it is not, the override is dropped and the largest-coefficient
    /// rule picks instead. An unhonored override is deliberately not a
    /// terminal outcome: `None` is returned only when no column improves.
    pub fn find_entering(
        &self,
        y: &DMatrix<f64>,
        forced: Option<usize>,
    ) -> Result<Option<usize>, SimplexError> {
        let r = self.reduced_costs(y);
        trace!("reduced costs: {}", r);
        let threshold = self.tolerance * self.cost_scale;

        if let Some(k) = forced {
            if k >= self.n {
                return Err(SimplexError::InvalidInput(format!(
                    "forced entering column {} out of range for {} non-basic columns",
                    k, self.n
                )));
            }
            if r[(0, k)] > threshold {
                debug!("entering column {} (forced)", k);
                return Ok(Some(k));
            }
            debug!(
                "forced column {} has reduced cost {}, using largest coefficient instead",
                k,
                r[(0, k)]
            );
        }

        let mut max = threshold;
        let mut entering = None;
        for j in 0..self.n {
            if r[(0, j)] > max {
                max = r[(0, j)];
                entering = Some(j);
            }
        }
        debug!("entering column {:?}", entering);
        Ok(entering)
    }

    /// Solve `B · d = AN[:, k]`
    pub fn solve_direction(&self, k: usize) -> Result<DVector<f64>, SimplexError> {
        if k >= self.n {
            return Err(SimplexError::InvalidInput(format!(
                "column {} out of range for {} non-basic columns",
                k, self.n
            )));
        }
        let column: DVector<f64> = self.a.column(k).into_owned();
        let d = self
            .basis()
            .clone_owned()
            .lu()
            .solve(&column)
            .ok_or(SimplexError::SingularBasis)?;
        trace!("d: {}", d);
        Ok(d)
    }

    /// Ratio test over `d`, which must have one entry per basis row.
    ///
    /// Returns the step size and leaving row, or `None` when no entry of `d`
    /// is positive (the entering direction is unbounded). The first row wins
    /// ties.
    pub fn find_leaving(&self, d: &DVector<f64>) -> Option<(f64, usize)> {
        let threshold = self.tolerance * max_abs(d.iter());
        let mut best: Option<(f64, usize)> = None;
        for (i, &di) in d.iter().enumerate().take(self.m) {
            if di <= threshold {
                continue;
            }
            let ratio = self.x_b_star[i] / di;
            trace!("row {} ratio {}", i, ratio);
            if best.is_none_or(|(x, _)| ratio < x) {
                best = Some((ratio, i));
            }
        }
        debug!("leaving {:?}", best);
        best
    }

    /// Apply a pivot: move along `d` by `step`, then exchange non-basis column
    /// `entering` with basis row `leaving`.
    ///
    /// Arguments are checked before anything is written.
    pub fn update(
        &mut self,
        d: &DVector<f64>,
        step: f64,
        entering: usize,
        leaving: usize,
    ) -> Result<Pivot, SimplexError> {
        if entering >= self.n || leaving >= self.m {
            return Err(SimplexError::InvalidInput(format!(
                "pivot ({}, {}) out of range for {} non-basic columns and {} rows",
                entering, leaving, self.n, self.m
            )));
        }
        if d.len() != self.m {
            return Err(SimplexError::InvalidInput(format!(
                "direction must have {} entries, got {}",
                self.m,
                d.len()
            )));
        }

        self.x_b_star -= d * step;
        self.x_b_star[leaving] = step;

        let basis_column = self.n + leaving;
        self.a.swap_columns(entering, basis_column);
        self.c.swap_columns(entering, basis_column);

        let entering_variable = self.column_var[entering];
        let leaving_variable = self.column_var[basis_column];
        self.column_var.swap(entering, basis_column);
        self.var_column[entering_variable] = basis_column;
        self.var_column[leaving_variable] = entering;
        self.terminal = None;

        trace!("xBStar: {}", self.x_b_star);
        trace!("A: {}", self.a);
        trace!("cB: {}", self.basis_costs());

        Ok(Pivot {
            entering_column: entering,
            leaving_row: leaving,
            entering_variable,
            leaving_variable,
            step,
        })
    }

    /// Run one iteration: price, choose entering and leaving, pivot.
    ///
    /// Once a terminal outcome is reached it is returned again by every
    /// later call without touching the dictionary.
    pub fn step(&mut self, forced: Option<usize>) -> Result<StepOutcome, SimplexError> {
        if let Some(outcome) = self.terminal {
            return Ok(outcome);
        }

        let y = self.find_y()?;
        let Some(entering) = self.find_entering(&y, forced)? else {
            self.terminal = Some(StepOutcome::Optimal);
            return Ok(StepOutcome::Optimal);
        };

        let d = self.solve_direction(entering)?;
        let Some((step, leaving)) = self.find_leaving(&d) else {
            let outcome = StepOutcome::Unbounded {
                entering_column: entering,
                entering_variable: self.column_var[entering],
            };
            self.terminal = Some(outcome);
            return Ok(outcome);
        };

        let pivot = self.update(&d, step, entering, leaving)?;
        Ok(StepOutcome::Pivoted(pivot))
    }

    /// Current basic solution over all n+m augmented variables, and its
    /// objective value. Slack values do not contribute to the objective.
    pub fn extract_result(&self) -> (Vec<f64>, f64) {
        let mut values = vec![0.0; self.n + self.m];
        let mut total = 0.0;
        for row in 0..self.m {
            let var = self.basic_variable(row);
            let value = self.x_b_star[row];
            values[var] = value;
            if var < self.n {
                total += value * self.c[(0, self.n + row)];
            }
        }
        (values, total)
    }

    pub fn objective_value(&self) -> f64 {
        self.extract_result().1
    }

    /// Shadow prices, reduced costs and binding constraints of the current dictionary
    pub fn analysis(&self) -> Result<Analysis, SimplexError> {
        let y = self.find_y()?;
        let r = self.reduced_costs(&y);

        let mut reduced_costs = vec![0.0; self.n + self.m];
        for (j, &var) in self.non_basic_variables().iter().enumerate() {
            reduced_costs[var] = r[(0, j)];
        }

        // Slacks are compared against the size of the right-hand side
        let slack_threshold = self.tolerance * max_abs(self.b.iter());
        let (values, _) = self.extract_result();
        let binding_constraints = (0..self.m)
            .filter(|&i| values[self.n + i].abs() <= slack_threshold)
            .collect();

        Ok(Analysis {
            shadow_prices: y.iter().copied().collect(),
            reduced_costs,
            binding_constraints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rows(nrows: usize, ncols: usize, data: &[f64]) -> DMatrix<f64> {
        DMatrix::from_row_slice(nrows, ncols, data)
    }

    fn row(data: &[f64]) -> DMatrix<f64> {
        DMatrix::from_row_slice(1, data.len(), data)
    }

    fn column(data: &[f64]) -> DMatrix<f64> {
        DMatrix::from_column_slice(data.len(), 1, data)
    }

    fn form(c: &[f64], a: DMatrix<f64>, b: &[f64]) -> CanonicalForm {
        CanonicalForm::new(&row(c), &a, &column(b)).unwrap()
    }

    fn scenario_a() -> CanonicalForm {
        form(
            &[7.0, 9.0, 18.0, 17.0],
            rows(3, 4, &[2.0, 4.0, 5.0, 7.0, 1.0, 1.0, 2.0, 2.0, 1.0, 2.0, 3.0, 3.0]),
            &[42.0, 17.0, 24.0],
        )
    }

    #[test]
    fn test_construction() {
        let cf = scenario_a();
        assert_eq!(cf.num_variables(), 4);
        assert_eq!(cf.num_constraints(), 3);

        let expected = rows(
            3,
            7,
            &[
                2.0, 4.0, 5.0, 7.0, 1.0, 0.0, 0.0, //
                1.0, 1.0, 2.0, 2.0, 0.0, 1.0, 0.0, //
                1.0, 2.0, 3.0, 3.0, 0.0, 0.0, 1.0,
            ],
        );
        assert_eq!(cf.augmented(), &expected);
        assert_eq!(cf.costs(), &row(&[7.0, 9.0, 18.0, 17.0, 0.0, 0.0, 0.0]));
        assert_eq!(cf.basic_values(), &DVector::from_vec(vec![42.0, 17.0, 24.0]));
        assert_eq!(cf.rhs(), cf.basic_values());

        assert_eq!(cf.basis().clone_owned(), DMatrix::identity(3, 3));
        assert_eq!(cf.non_basis().clone_owned(), expected.columns(0, 4).clone_owned());
        assert_eq!(cf.basis_costs().clone_owned(), DMatrix::zeros(1, 3));
        assert_eq!(cf.non_basis_costs().clone_owned(), row(&[7.0, 9.0, 18.0, 17.0]));

        assert_eq!(cf.basic_variables(), &[4, 5, 6]);
        assert_eq!(cf.non_basic_variables(), &[0, 1, 2, 3]);
        assert_eq!(cf.basis_row(5), Some(1));
        assert_eq!(cf.basis_row(2), None);
        assert_eq!(cf.basis_row(42), None);
        assert_eq!(cf.terminal(), None);
    }

    #[test]
    fn test_narrow_constraint_matrix_is_padded() {
        let cf = form(&[1.0, 2.0, 3.0], rows(1, 2, &[1.0, 1.0]), &[4.0]);
        assert_eq!(cf.augmented(), &row(&[1.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_invalid_input() {
        let a = rows(1, 2, &[1.0, 1.0]);
        let b = column(&[1.0]);

        let two_rows = DMatrix::zeros(2, 2);
        assert!(matches!(
            CanonicalForm::new(&two_rows, &a, &b),
            Err(SimplexError::InvalidInput(_))
        ));

        assert!(matches!(
            CanonicalForm::new(&row(&[1.0]), &a, &b),
            Err(SimplexError::InvalidInput(_))
        ));

        assert!(matches!(
            CanonicalForm::new(&row(&[1.0, 1.0]), &a, &column(&[1.0, 2.0])),
            Err(SimplexError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_single_pivot_by_parts() {
        let mut cf = scenario_a();

        let y = cf.find_y().unwrap();
        assert_eq!(y, DMatrix::zeros(1, 3));

        let entering = cf.find_entering(&y, Some(2)).unwrap();
        assert_eq!(entering, Some(2));

        let d = cf.solve_direction(2).unwrap();
        assert_relative_eq!(d, DVector::from_vec(vec![5.0, 2.0, 3.0]), epsilon = 1e-12);

        let (step, leaving) = cf.find_leaving(&d).unwrap();
        assert_eq!(leaving, 2);
        assert_relative_eq!(step, 8.0, epsilon = 1e-12);

        let pivot = cf.update(&d, step, 2, leaving).unwrap();
        assert_eq!(pivot.entering_variable, 2);
        assert_eq!(pivot.leaving_variable, 6);

        assert_relative_eq!(
            cf.basic_values().clone(),
            DVector::from_vec(vec![2.0, 1.0, 8.0]),
            epsilon = 1e-12
        );
        assert_eq!(
            cf.basis().clone_owned(),
            rows(3, 3, &[1.0, 0.0, 5.0, 0.0, 1.0, 2.0, 0.0, 0.0, 3.0])
        );
        assert_eq!(cf.basis_costs().clone_owned(), row(&[0.0, 0.0, 18.0]));
        assert_eq!(cf.basis_row(2), Some(2));
        assert_eq!(cf.basis_row(6), None);
    }

    #[test]
    fn test_iterations_swap_columns() {
        let mut cf = scenario_a();

        let outcome = cf.step(Some(2)).unwrap();
        assert!(!outcome.is_terminal());
        let expected = rows(
            3,
            7,
            &[
                2.0, 4.0, 0.0, 7.0, 1.0, 0.0, 5.0, //
                1.0, 1.0, 0.0, 2.0, 0.0, 1.0, 2.0, //
                1.0, 2.0, 1.0, 3.0, 0.0, 0.0, 3.0,
            ],
        );
        assert_eq!(cf.augmented(), &expected);
        assert_eq!(cf.costs(), &row(&[7.0, 9.0, 0.0, 17.0, 0.0, 0.0, 18.0]));
        assert_eq!(cf.rhs(), &DVector::from_vec(vec![42.0, 17.0, 24.0]));

        let outcome = cf.step(None).unwrap();
        let StepOutcome::Pivoted(pivot) = outcome else {
            panic!("expected a pivot, got {:?}", outcome);
        };
        assert_eq!(pivot.entering_variable, 0);
        assert_eq!(pivot.leaving_variable, 5);
        assert_eq!(pivot.leaving_row, 1);

        let expected = rows(
            3,
            7,
            &[
                0.0, 4.0, 0.0, 7.0, 1.0, 2.0, 5.0, //
                1.0, 1.0, 0.0, 2.0, 0.0, 1.0, 2.0, //
                0.0, 2.0, 1.0, 3.0, 0.0, 1.0, 3.0,
            ],
        );
        assert_eq!(cf.augmented(), &expected);
        assert_eq!(cf.costs(), &row(&[0.0, 9.0, 0.0, 17.0, 0.0, 7.0, 18.0]));
        assert_relative_eq!(
            cf.basic_values().clone(),
            DVector::from_vec(vec![1.0, 3.0, 7.0]),
            epsilon = 1e-9
        );
        assert_eq!(
            cf.basis().clone_owned(),
            rows(3, 3, &[1.0, 2.0, 5.0, 0.0, 1.0, 2.0, 0.0, 1.0, 3.0])
        );
        assert_eq!(cf.basic_variables(), &[4, 0, 2]);

        assert_eq!(cf.step(None).unwrap(), StepOutcome::Optimal);
        let (values, score) = cf.extract_result();
        assert_relative_eq!(
            values.as_slice(),
            [3.0, 0.0, 7.0, 0.0, 1.0, 0.0, 0.0].as_slice(),
            epsilon = 1e-6
        );
        assert_relative_eq!(score, 147.0, epsilon = 1e-9);

        // Stepping again after the optimum changes nothing
        let before = cf.clone();
        assert_eq!(cf.step(None).unwrap(), StepOutcome::Optimal);
        assert_eq!(cf.augmented(), before.augmented());
        assert_eq!(cf.basic_values(), before.basic_values());
        assert_eq!(cf.extract_result(), before.extract_result());
    }

    #[test]
    fn test_force_column_zero() {
        let mut cf = scenario_a();
        let y = cf.find_y().unwrap();
        assert_eq!(cf.find_entering(&y, None).unwrap(), Some(2));
        assert_eq!(cf.find_entering(&y, Some(0)).unwrap(), Some(0));

        let StepOutcome::Pivoted(pivot) = cf.step(Some(0)).unwrap() else {
            panic!("expected a pivot");
        };
        assert_eq!(pivot.entering_variable, 0);
    }

    #[test]
    fn test_forced_column_without_gain_falls_back() {
        let mut cf = scenario_a();
        cf.step(Some(2)).unwrap();

        // Column 1 now has reduced cost -3; column 0 is the only improving one
        let y = cf.find_y().unwrap();
        let r = cf.reduced_costs(&y);
        assert_relative_eq!(r, row(&[1.0, -3.0, -6.0, -1.0]), epsilon = 1e-9);

        let StepOutcome::Pivoted(pivot) = cf.step(Some(1)).unwrap() else {
            panic!("expected a pivot");
        };
        assert_eq!(pivot.entering_column, 0);
    }

    #[test]
    fn test_forced_column_out_of_range() {
        let mut cf = scenario_a();
        assert!(matches!(cf.step(Some(4)), Err(SimplexError::InvalidInput(_))));
        // A rejected step leaves the dictionary untouched
        assert_eq!(cf.basic_variables(), &[4, 5, 6]);
    }

    #[test]
    fn test_entering_tie_takes_lowest_column() {
        let cf = form(&[5.0, 5.0, 1.0], rows(1, 3, &[1.0, 1.0, 1.0]), &[10.0]);
        let y = cf.find_y().unwrap();
        assert_eq!(cf.find_entering(&y, None).unwrap(), Some(0));

        let cf = form(&[1.0, 5.0, 5.0], rows(1, 3, &[1.0, 1.0, 1.0]), &[10.0]);
        let y = cf.find_y().unwrap();
        assert_eq!(cf.find_entering(&y, None).unwrap(), Some(1));
    }

    #[test]
    fn test_leaving_tie_takes_lowest_row() {
        // Both rows allow x0 = 2
        let mut cf = form(&[1.0], rows(2, 1, &[1.0, 2.0]), &[2.0, 4.0]);
        let d = cf.solve_direction(0).unwrap();
        assert_eq!(cf.find_leaving(&d), Some((2.0, 0)));

        let StepOutcome::Pivoted(pivot) = cf.step(None).unwrap() else {
            panic!("expected a pivot");
        };
        assert_eq!(pivot.leaving_row, 0);
        assert_eq!(pivot.leaving_variable, 1);
        assert_eq!(cf.basic_variables(), &[0, 2]);
    }

    #[test]
    fn test_small_direction_entry_still_bounds() {
        // 1e-10 * x <= 1 stops x at 1e10
        let mut cf = form(&[1.0], rows(1, 1, &[1e-10]), &[1.0]);
        let d = cf.solve_direction(0).unwrap();
        let (step, leaving) = cf.find_leaving(&d).unwrap();
        assert_eq!(leaving, 0);
        assert_relative_eq!(step, 1e10, max_relative = 1e-12);

        while !cf.step(None).unwrap().is_terminal() {}
        assert_eq!(cf.terminal(), Some(StepOutcome::Optimal));
        assert_relative_eq!(cf.objective_value(), 1e10, max_relative = 1e-12);
    }

    #[test]
    fn test_small_reduced_cost_still_enters() {
        let cf = form(&[1e-10], rows(1, 1, &[1.0]), &[1e9]);
        let y = cf.find_y().unwrap();
        assert_eq!(cf.find_entering(&y, None).unwrap(), Some(0));
    }

    #[test]
    fn test_tolerance_scales_with_costs() {
        let mut cf = form(&[1e-10], rows(1, 1, &[1.0]), &[1e9]);
        cf.set_tolerance(2.0);
        assert_eq!(cf.step(None).unwrap(), StepOutcome::Optimal);
    }

    #[test]
    fn test_unbounded_is_terminal() {
        let mut cf = form(&[1.0], rows(1, 1, &[-1.0]), &[1.0]);

        let expected = StepOutcome::Unbounded {
            entering_column: 0,
            entering_variable: 0,
        };
        assert_eq!(cf.step(None).unwrap(), expected);
        assert_eq!(cf.step(None).unwrap(), expected);
        assert_eq!(cf.terminal(), Some(expected));
        assert_eq!(cf.extract_result(), (vec![0.0, 1.0], 0.0));
    }

    #[test]
    fn test_singular_basis_propagates() {
        let mut cf = form(&[1.0, 1.0], rows(2, 2, &[1.0, 0.0, 0.0, 0.0]), &[1.0, 1.0]);

        // Swap an all-zero column into the basis
        cf.update(&DVector::zeros(2), 0.0, 1, 0).unwrap();
        assert_eq!(cf.find_y(), Err(SimplexError::SingularBasis));
        assert_eq!(cf.solve_direction(0), Err(SimplexError::SingularBasis));
        assert_eq!(cf.step(None), Err(SimplexError::SingularBasis));
    }

    #[test]
    fn test_update_rejects_bad_arguments() {
        let mut cf = scenario_a();
        let d = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        assert!(cf.update(&d, 1.0, 4, 0).is_err());
        assert!(cf.update(&d, 1.0, 0, 3).is_err());
        assert!(cf.update(&DVector::from_vec(vec![1.0]), 1.0, 0, 0).is_err());
        assert_eq!(cf.basic_values(), &DVector::from_vec(vec![42.0, 17.0, 24.0]));
    }

    #[test]
    fn test_initial_result() {
        let cf = scenario_a();
        let (values, score) = cf.extract_result();
        assert_eq!(values, vec![0.0, 0.0, 0.0, 0.0, 42.0, 17.0, 24.0]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_analysis_at_optimum() {
        let mut cf = scenario_a();
        while !cf.step(None).unwrap().is_terminal() {}

        let analysis = cf.analysis().unwrap();
        assert_eq!(analysis.shadow_prices.len(), 3);
        assert_eq!(analysis.reduced_costs.len(), 7);
        assert!(analysis.reduced_costs.iter().all(|&r| r <= 1e-9));
        for var in cf.basic_variables() {
            assert_eq!(analysis.reduced_costs[*var], 0.0);
        }
        // Slack of the first constraint is 1, the other two are tight
        assert_eq!(analysis.binding_constraints, vec![1, 2]);

        let dual: f64 = analysis
            .shadow_prices
            .iter()
            .zip([42.0, 17.0, 24.0])
            .map(|(y, b)| y * b)
            .sum();
        assert_relative_eq!(dual, 147.0, epsilon = 1e-9);
    }
}
