//! Implements a solver interface for Clarabel
//!
//! Clarabel solves `min 1/2 x'Px + q'x` subject to `Ax + s = b` with `s` in a product of
//! cones. Equality rows go in a zero cone, every other row (including finite variable
//! bounds) is rewritten as `a'x <= b` and goes in a nonnegative cone.
use ::clarabel::algebra::CscMatrix;
use ::clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use indexmap::IndexMap;
use nalgebra_sparse::{CooMatrix, CscMatrix as SparseCsc};
use tracing::{debug, warn};

use crate::optimize::constraint::Relation;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::{Problem, ProblemType};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Interior point solver, only handles continuous problems
#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    /// Print Clarabel's iteration log
    pub verbose: bool,
    /// Iteration limit passed to Clarabel
    pub max_iter: u32,
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        ClarabelSolver {
            verbose: false,
            max_iter: 200,
        }
    }
}

/// A row of the constraint matrix in `a'x (cone) b` form
struct Row {
    /// Constraint id, None for rows that come from variable bounds
    constraint: Option<String>,
    /// -1 when the row was negated to turn `>=` into `<=`
    sign: f64,
    terms: Vec<(usize, f64)>,
    rhs: f64,
}

impl Solver for ClarabelSolver {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn integer_variable_capable(&self) -> bool {
        false
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        if problem.problem_type() != ProblemType::LinearContinuous {
            return Err(SolverError::UnsupportedProblemType {
                solver: self.name(),
                problem_type: problem.problem_type(),
            });
        }
        let n = problem.num_variables();
        let sign = match problem.objective().sense() {
            ObjectiveSense::Minimize => 1.,
            ObjectiveSense::Maximize => -1.,
        };
        let q: Vec<f64> = problem
            .objective()
            .dense_coefficients(n)
            .into_iter()
            .map(|c| sign * c)
            .collect();

        let (equalities, inequalities) = collect_rows(problem);
        let rows: Vec<&Row> = equalities.iter().chain(inequalities.iter()).collect();
        let m = rows.len();

        let mut coo = CooMatrix::new(m, n);
        let mut b = Vec::with_capacity(m);
        for (i, row) in rows.iter().enumerate() {
            for &(j, value) in &row.terms {
                if value != 0. {
                    coo.push(i, j, value);
                }
            }
            b.push(row.rhs);
        }
        let a = to_clarabel_csc(&SparseCsc::from(&coo));
        let p = CscMatrix::zeros((n, n));

        let mut cones = Vec::new();
        if !equalities.is_empty() {
            cones.push(SupportedConeT::ZeroConeT(equalities.len()));
        }
        if !inequalities.is_empty() {
            cones.push(SupportedConeT::NonnegativeConeT(inequalities.len()));
        }

        let settings = DefaultSettingsBuilder::default()
            .verbose(self.verbose)
            .max_iter(self.max_iter)
            .build()
            .map_err(|e| SolverError::Internal(format!("invalid clarabel settings: {:?}", e)))?;
        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        debug!(rows = m, columns = n, "running clarabel");
        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => {
                warn!("clarabel only reached reduced accuracy");
                OptimizationStatus::AlmostOptimal
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                return Err(SolverError::Infeasible)
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                return Err(SolverError::Unbounded)
            }
            SolverStatus::MaxIterations => {
                return Err(SolverError::Halted("max iterations reached".to_string()))
            }
            SolverStatus::MaxTime => return Err(SolverError::Halted("time limit reached".to_string())),
            SolverStatus::InsufficientProgress => {
                return Err(SolverError::Halted("insufficient progress".to_string()))
            }
            SolverStatus::NumericalError => return Err(SolverError::NumericalError),
            #[allow(unreachable_patterns)]
            other => return Err(SolverError::Internal(format!("{:?}", other))),
        };

        let x = &solver.solution.x;
        let variable_values: IndexMap<String, f64> = problem
            .variables()
            .keys()
            .zip(x.iter())
            .map(|(id, value)| (id.clone(), *value))
            .collect();

        let z = &solver.solution.z;
        let dual_values: IndexMap<String, f64> = rows
            .iter()
            .zip(z.iter())
            .filter_map(|(row, dual)| {
                row.constraint
                    .as_ref()
                    .map(|id| (id.clone(), -row.sign * sign * *dual))
            })
            .collect();

        Ok(ProblemSolution {
            status,
            objective_value: problem.evaluate_objective(x),
            variable_values,
            dual_values: Some(dual_values),
        })
    }
}

/// Split the problem into equality rows and `<=` rows
fn collect_rows(problem: &Problem) -> (Vec<Row>, Vec<Row>) {
    let mut equalities = Vec::new();
    let mut inequalities = Vec::new();
    for constraint in problem.constraints().values() {
        let terms: Vec<(usize, f64)> = constraint
            .terms()
            .iter()
            .map(|t| (t.variable, t.coefficient))
            .collect();
        let id = Some(constraint.id().to_string());
        match constraint.relation() {
            Relation::Equal => equalities.push(Row {
                constraint: id,
                sign: 1.,
                terms,
                rhs: constraint.rhs(),
            }),
            Relation::LessEqual => inequalities.push(Row {
                constraint: id,
                sign: 1.,
                terms,
                rhs: constraint.rhs(),
            }),
            Relation::GreaterEqual => inequalities.push(Row {
                constraint: id,
                sign: -1.,
                terms: terms.into_iter().map(|(j, c)| (j, -c)).collect(),
                rhs: -constraint.rhs(),
            }),
        }
    }
    for (j, var) in problem.variables().values().enumerate() {
        let (lower, upper) = var.effective_bounds();
        if lower.is_finite() {
            inequalities.push(Row {
                constraint: None,
                sign: -1.,
                terms: vec![(j, -1.)],
                rhs: -lower,
            });
        }
        if upper.is_finite() {
            inequalities.push(Row {
                constraint: None,
                sign: 1.,
                terms: vec![(j, 1.)],
                rhs: upper,
            });
        }
    }
    (equalities, inequalities)
}

fn to_clarabel_csc(matrix: &SparseCsc<f64>) -> CscMatrix<f64> {
    CscMatrix::new(
        matrix.nrows(),
        matrix.ncols(),
        matrix.col_offsets().to_vec(),
        matrix.row_indices().to_vec(),
        matrix.values().to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::problem::ProblemBuilder;
    use crate::optimize::solvers::microlp::MicrolpSolver;
    use crate::optimize::variable::VariableType;
    use crate::optimize::SolveOutcome;

    fn production_problem() -> Problem {
        // maximize 3x + 2y st x + y <= 4, x + 3y <= 6, 0 <= x <= 3, y >= 0
        let mut builder = ProblemBuilder::new_maximization();
        builder
            .add_new_variable("x", None, VariableType::Continuous, 0., 3.)
            .unwrap();
        builder
            .add_new_variable("y", None, VariableType::Continuous, 0., f64::INFINITY)
            .unwrap();
        builder.add_new_linear_objective_term_by_id("x", 3.).unwrap();
        builder.add_new_linear_objective_term_by_id("y", 2.).unwrap();
        builder
            .add_new_constraint_by_id("c1", None, &["x", "y"], &[1., 1.], Relation::LessEqual, 4.)
            .unwrap();
        builder
            .add_new_constraint_by_id("c2", None, &["x", "y"], &[1., 3.], Relation::LessEqual, 6.)
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn matches_microlp() {
        let problem = production_problem();
        let clarabel = ClarabelSolver::default().solve(&problem).unwrap();
        let microlp = MicrolpSolver.solve(&problem).unwrap();
        assert!((clarabel.objective_value - 11.).abs() < 1e-5);
        assert!((clarabel.objective_value - microlp.objective_value).abs() < 1e-5);
        assert!((clarabel.value("x").unwrap() - 3.).abs() < 1e-5);
        assert!((clarabel.value("y").unwrap() - 1.).abs() < 1e-5);
        assert!(problem.is_feasible(&clarabel.values(), 1e-5));
        // Loosening a <= row can only help a maximization
        let duals = clarabel.dual_values.unwrap();
        assert_eq!(duals.len(), 2);
        assert!(duals.values().all(|d| *d > -1e-6));
    }

    #[test]
    fn rejects_integer_problems() {
        let mut builder = ProblemBuilder::new_minimization();
        builder
            .add_new_variable("x", None, VariableType::Integer, 0., 5.)
            .unwrap();
        let problem = builder.build().unwrap();
        let outcome = problem.solve(&ClarabelSolver::default());
        assert!(matches!(
            outcome,
            SolveOutcome::Error(SolverError::UnsupportedProblemType { .. })
        ));
    }

    #[test]
    fn detects_infeasibility() {
        let mut builder = ProblemBuilder::new_minimization();
        builder
            .add_new_variable("x", None, VariableType::Continuous, 0., f64::INFINITY)
            .unwrap();
        builder
            .add_new_variable("y", None, VariableType::Continuous, 0., f64::INFINITY)
            .unwrap();
        builder.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        builder.add_new_linear_objective_term_by_id("y", 1.).unwrap();
        builder
            .add_new_constraint_by_id("c1", None, &["x", "y"], &[1., 1.], Relation::GreaterEqual, 10.)
            .unwrap();
        builder
            .add_new_constraint_by_id("c2", None, &["x", "y"], &[1., 1.], Relation::LessEqual, 5.)
            .unwrap();
        let problem = builder.build().unwrap();
        assert!(problem.solve(&ClarabelSolver::default()).is_infeasible());
    }

    #[test]
    fn equality_rows() {
        // minimize x + 2y st x + y = 3, x <= 2
        let mut builder = ProblemBuilder::new_minimization();
        builder
            .add_new_variable("x", None, VariableType::Continuous, 0., 2.)
            .unwrap();
        builder
            .add_new_variable("y", None, VariableType::Continuous, 0., f64::INFINITY)
            .unwrap();
        builder.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        builder.add_new_linear_objective_term_by_id("y", 2.).unwrap();
        builder
            .add_new_constraint_by_id("sum", None, &["x", "y"], &[1., 1.], Relation::Equal, 3.)
            .unwrap();
        let problem = builder.build().unwrap();
        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert!((solution.objective_value - 4.).abs() < 1e-5);
        assert!((solution.value("x").unwrap() - 2.).abs() < 1e-5);
    }
}
