//! WASM bindings for the solver
//!
//! Problems and solutions cross the boundary as plain JavaScript objects
//! with the same field names as [`Problem`] and [`Solution`].

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

use crate::problem::Problem;
use crate::simplex::Solver;
use crate::solution::Solution;

/// Solve a `{ objective, constraints, rhs }` object and return the solution object
#[wasm_bindgen]
pub fn solve(problem: JsValue, max_iterations: usize) -> Result<JsValue, JsValue> {
    let problem: Problem =
        serde_wasm_bindgen::from_value(problem).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let solution = Solver::new()
        .with_max_iterations(max_iterations)
        .solve(&problem)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&solution)
}

/// Solve a problem given as typed arrays; `constraints` is row-major with one row per `rhs` entry
#[wasm_bindgen]
pub fn solve_dense(
    objective: &Float64Array,
    constraints: &Float64Array,
    rhs: &Float64Array,
    max_iterations: usize,
) -> Result<JsValue, JsValue> {
    let rhs = rhs.to_vec();
    let data = constraints.to_vec();
    let cols = if rhs.is_empty() { 0 } else { data.len() / rhs.len() };
    if cols * rhs.len() != data.len() {
        return Err(JsValue::from_str(&format!(
            "{} constraint entries do not split into {} rows",
            data.len(),
            rhs.len()
        )));
    }

    let problem = Problem {
        objective: objective.to_vec(),
        constraints: (0..rhs.len()).map(|i| data[i * cols..(i + 1) * cols].to_vec()).collect(),
        rhs,
    };
    let solution = Solver::new()
        .with_max_iterations(max_iterations)
        .solve(&problem)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&solution)
}

fn to_js(solution: &Solution) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(solution).map_err(|e| JsValue::from_str(&e.to_string()))
}
