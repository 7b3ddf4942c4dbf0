mod canonical;
mod problem;
mod simplex;
mod solution;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use canonical::{CanonicalForm, DEFAULT_TOLERANCE, Pivot, SimplexError, StepOutcome};
pub use problem::Problem;
pub use simplex::{Solver, solve};
pub use solution::{Analysis, Solution, SolutionStatus};
