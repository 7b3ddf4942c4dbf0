/// The result of driving a problem to a terminal state
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Number of pivots performed
    pub iterations: usize,
    /// Values of all n+m augmented variables; structural ones first, then slacks
    pub values: Vec<f64>,
    /// Objective value of the reported vertex
    pub objective_value: f64,
    /// Number of structural variables at the front of `values`
    pub num_variables: usize,
    /// Dual information for the reported dictionary
    pub analysis: Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolutionStatus {
    /// No entering column remains
    Optimal,
    /// Some entering column has no positive entry in its direction vector
    Unbounded,
    /// The iteration cap was reached first; the last vertex is reported
    IterationLimit,
}

/// Dual information read off a dictionary
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analysis {
    /// Simplex multipliers, one per constraint.
    /// At an optimum, the objective gain per unit increase of that constraint's RHS
    pub shadow_prices: Vec<f64>,

    /// Reduced cost of every augmented variable (zero for basic ones)
    pub reduced_costs: Vec<f64>,

    /// Constraints whose slack is zero
    pub binding_constraints: Vec<usize>,
}

impl Solution {
    /// Values of the structural variables
    pub fn structural(&self) -> &[f64] {
        &self.values[..self.num_variables]
    }

    /// Leftover capacity of each constraint
    pub fn slacks(&self) -> &[f64] {
        &self.values[self.num_variables..]
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
