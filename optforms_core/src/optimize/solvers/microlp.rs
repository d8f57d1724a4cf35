//! Implements a solver interface for microlp
use ::microlp::{ComparisonOp, OptimizationDirection};
use indexmap::IndexMap;
use tracing::debug;

use crate::optimize::constraint::Relation;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::VariableType;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Pure rust simplex solver with branch and bound for integer variables
#[derive(Clone, Copy, Debug, Default)]
pub struct MicrolpSolver;

impl Solver for MicrolpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn integer_variable_capable(&self) -> bool {
        true
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let direction = match problem.objective().sense() {
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
        };
        let mut lp = ::microlp::Problem::new(direction);

        let objective = problem.objective().dense_coefficients(problem.num_variables());
        let variables: Vec<::microlp::Variable> = problem
            .variables()
            .values()
            .zip(objective)
            .map(|(var, coef)| {
                let (lower, upper) = var.effective_bounds();
                match var.variable_type {
                    VariableType::Continuous => lp.add_var(coef, (lower, upper)),
                    VariableType::Binary if lower <= 0. && upper >= 1. => lp.add_binary_var(coef),
                    VariableType::Binary | VariableType::Integer => lp.add_integer_var(
                        coef,
                        (integer_lower_bound(lower), integer_upper_bound(upper)),
                    ),
                }
            })
            .collect();

        for constraint in problem.constraints().values() {
            let expr: Vec<(::microlp::Variable, f64)> = constraint
                .terms()
                .iter()
                .filter(|t| t.coefficient != 0.)
                .map(|t| (variables[t.variable], t.coefficient))
                .collect();
            if expr.is_empty() {
                // An all-zero row is either trivially satisfied or can never be
                if constraint.relation().holds(0., constraint.rhs(), 0.) {
                    continue;
                }
                debug!(constraint = constraint.id(), "all-zero row can't be satisfied");
                return Err(SolverError::Infeasible);
            }
            lp.add_constraint(expr, comparison(constraint.relation()), constraint.rhs());
        }

        let solution = match lp.solve() {
            Ok(solution) => solution,
            Err(::microlp::Error::Infeasible) => return Err(SolverError::Infeasible),
            Err(::microlp::Error::Unbounded) => return Err(SolverError::Unbounded),
            #[allow(unreachable_patterns)]
            Err(other) => return Err(SolverError::Internal(other.to_string())),
        };

        let variable_values: IndexMap<String, f64> = problem
            .variables()
            .keys()
            .zip(&variables)
            .map(|(id, var)| (id.clone(), solution[*var]))
            .collect();

        Ok(ProblemSolution {
            status: OptimizationStatus::Optimal,
            objective_value: solution.objective(),
            variable_values,
            dual_values: None,
        })
    }
}

fn comparison(relation: Relation) -> ComparisonOp {
    match relation {
        Relation::LessEqual => ComparisonOp::Le,
        Relation::GreaterEqual => ComparisonOp::Ge,
        Relation::Equal => ComparisonOp::Eq,
    }
}

/// microlp takes integer bounds as i32, unbounded sides are clamped to the i32 range
fn integer_lower_bound(bound: f64) -> i32 {
    if bound.is_finite() {
        bound.ceil().clamp(i32::MIN as f64, i32::MAX as f64) as i32
    } else {
        i32::MIN
    }
}

fn integer_upper_bound(bound: f64) -> i32 {
    if bound.is_finite() {
        bound.floor().clamp(i32::MIN as f64, i32::MAX as f64) as i32
    } else {
        i32::MAX
    }
}
