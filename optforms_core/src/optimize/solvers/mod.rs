//! Solver interfaces, each backend turns a [`Problem`] into a [`ProblemSolution`]

pub mod clarabel;
pub mod microlp;

use thiserror::Error;

use crate::configuration::SolverKind;
use crate::optimize::problem::{Problem, ProblemType};
use crate::optimize::ProblemSolution;

/// An external solver library
///
/// Solvers take an immutable problem, so the same problem can be handed to several
/// solvers, or to the same one several times.
pub trait Solver {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Whether the solver accepts integer variables
    fn integer_variable_capable(&self) -> bool;

    /// Whether the solver accepts binary variables
    fn binary_variable_capable(&self) -> bool {
        self.integer_variable_capable()
    }

    /// Solve the problem to optimality
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

impl SolverKind {
    /// Create the solver this kind refers to
    pub fn create(self) -> Box<dyn Solver> {
        match self {
            SolverKind::Microlp => Box::new(self::microlp::MicrolpSolver),
            SolverKind::Clarabel => Box::new(self::clarabel::ClarabelSolver::default()),
        }
    }
}

/// Errors reported by the solver backends
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// No assignment satisfies every constraint
    #[error("problem is infeasible")]
    Infeasible,
    /// The objective can be improved without limit
    #[error("problem is unbounded")]
    Unbounded,
    /// The solver doesn't support the kind of variables in the problem
    #[error("{solver} can't solve {problem_type:?} problems")]
    UnsupportedProblemType {
        solver: &'static str,
        problem_type: ProblemType,
    },
    /// The solver stopped before reaching a conclusion
    #[error("solver halted: {0}")]
    Halted(String),
    /// The solver ran into numerical trouble
    #[error("solver hit a numerical error")]
    NumericalError,
    /// Any other solver failure
    #[error("internal solver error: {0}")]
    Internal(String),
}
