use nalgebra::DMatrix;

use crate::canonical::SimplexError;

/// A linear program in standard maximization form:
/// maximize `objective · x` subject to `constraints · x <= rhs`, `x >= 0`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Problem {
    /// Objective coefficients, one per structural variable
    pub objective: Vec<f64>,
    /// Constraint rows; each may be shorter than the objective
    pub constraints: Vec<Vec<f64>>,
    /// Right-hand side, one entry per constraint row
    pub rhs: Vec<f64>,
}

impl Problem {
    pub fn new(objective: Vec<f64>) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
            rhs: Vec::new(),
        }
    }

    pub fn add_constraint(&mut self, coefficients: Vec<f64>, rhs: f64) {
        self.constraints.push(coefficients);
        self.rhs.push(rhs);
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective as a 1xn row
    pub fn objective_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(1, self.objective.len(), &self.objective)
    }

    /// Constraint rows as an m x n' matrix; ragged rows are rejected
    pub fn constraint_matrix(&self) -> Result<DMatrix<f64>, SimplexError> {
        let cols = self.constraints.first().map_or(0, Vec::len);
        if let Some(i) = self.constraints.iter().position(|r| r.len() != cols) {
            return Err(SimplexError::InvalidInput(format!(
                "constraint row {} has {} entries, expected {}",
                i,
                self.constraints[i].len(),
                cols
            )));
        }
        Ok(DMatrix::from_fn(self.constraints.len(), cols, |i, j| self.constraints[i][j]))
    }

    /// Right-hand side as an m x 1 column
    pub fn rhs_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_column_slice(self.rhs.len(), 1, &self.rhs)
    }
}
