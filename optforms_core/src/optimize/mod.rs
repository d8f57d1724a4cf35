//! Module for constructing and solving optimization problems

pub mod constraint;
pub mod expression;
pub mod objective;
pub mod problem;
pub mod solvers;
pub mod variable;

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::Serialize;

use crate::optimize::solvers::SolverError;

/// Struct representing the solution to an optimization problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemSolution {
    /// How the solver reached the solution, either [`OptimizationStatus::Optimal`] or
    /// [`OptimizationStatus::AlmostOptimal`]
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    pub objective_value: f64,
    /// Values of the variables at the optimum, keyed by variable id, in the order the
    /// variables were added to the problem
    pub variable_values: IndexMap<String, f64>,
    /// Values of the dual variables at the optimum
    ///
    /// Some(IndexMap), keyed by constraint id, if the solver supports retrieving the
    /// dual values, None otherwise
    pub dual_values: Option<IndexMap<String, f64>>,
}

impl ProblemSolution {
    /// Value of a variable by id
    pub fn value(&self, variable_id: &str) -> Option<f64> {
        self.variable_values.get(variable_id).copied()
    }

    /// Variable values in problem order
    pub fn values(&self) -> Vec<f64> {
        self.variable_values.values().copied().collect()
    }
}

/// Terminal outcome of solving a problem
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The solver found an optimal assignment
    Optimal(ProblemSolution),
    /// The solver proved no feasible assignment exists
    Infeasible,
    /// The solver failed for any other reason
    Error(SolverError),
}

impl SolveOutcome {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveOutcome::Optimal(_))
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveOutcome::Infeasible)
    }

    pub fn solution(&self) -> Option<&ProblemSolution> {
        match self {
            SolveOutcome::Optimal(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<ProblemSolution> {
        match self {
            SolveOutcome::Optimal(solution) => Some(solution),
            _ => None,
        }
    }

    /// Summary status of the outcome
    pub fn status(&self) -> OptimizationStatus {
        match self {
            SolveOutcome::Optimal(solution) => solution.status,
            SolveOutcome::Infeasible => OptimizationStatus::Infeasible,
            SolveOutcome::Error(SolverError::Unbounded) => OptimizationStatus::Unbounded,
            SolveOutcome::Error(SolverError::NumericalError) => OptimizationStatus::NumericalError,
            SolveOutcome::Error(SolverError::Halted(_)) => OptimizationStatus::SolverHalted,
            SolveOutcome::Error(_) => OptimizationStatus::SolverError,
        }
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStatus {
    /// Problem has been optimized
    Optimal,
    /// An approximate solution has been found
    AlmostOptimal,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// A numerical error occurred during solving
    NumericalError,
    /// The solver hit the maximum allowed iterations, or max time, or made insufficient progress
    SolverHalted,
    /// The solver failed, or couldn't handle the problem
    SolverError,
}

impl Display for OptimizationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            OptimizationStatus::Optimal => "OPTIMAL",
            OptimizationStatus::AlmostOptimal => "ALMOST OPTIMAL",
            OptimizationStatus::Infeasible => "INFEASIBLE",
            OptimizationStatus::Unbounded => "UNBOUNDED",
            OptimizationStatus::NumericalError => "NUMERICAL ERROR",
            OptimizationStatus::SolverHalted => "SOLVER HALTED",
            OptimizationStatus::SolverError => "SOLVER ERROR",
        };
        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution() -> ProblemSolution {
        let mut variable_values = IndexMap::new();
        variable_values.insert("x".to_string(), 1.5);
        variable_values.insert("y".to_string(), 2.);
        ProblemSolution {
            status: OptimizationStatus::Optimal,
            objective_value: 3.5,
            variable_values,
            dual_values: None,
        }
    }

    #[test]
    fn solution_access() {
        let sol = solution();
        assert_eq!(sol.value("y"), Some(2.));
        assert_eq!(sol.value("z"), None);
        assert_eq!(sol.values(), vec![1.5, 2.]);
    }

    #[test]
    fn outcome_status() {
        let optimal = SolveOutcome::Optimal(solution());
        assert!(optimal.is_optimal());
        assert_eq!(optimal.status(), OptimizationStatus::Optimal);
        assert_eq!(optimal.clone().into_solution(), Some(solution()));

        assert!(SolveOutcome::Infeasible.is_infeasible());
        assert!(SolveOutcome::Infeasible.solution().is_none());
        assert_eq!(
            SolveOutcome::Error(SolverError::Unbounded).status(),
            OptimizationStatus::Unbounded
        );
        assert_eq!(
            SolveOutcome::Error(SolverError::Internal("boom".to_string())).status(),
            OptimizationStatus::SolverError
        );
    }
}
