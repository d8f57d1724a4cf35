//! Provides structs representing an optimization problem
//!
//! A problem is assembled with a [`ProblemBuilder`], which validates every variable,
//! constraint and objective term as it is added. [`ProblemBuilder::build`] then produces an
//! immutable [`Problem`], which can be solved any number of times.
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::configuration::{self, SolverKind};
use crate::optimize::constraint::{Constraint, Relation};
use crate::optimize::expression::LinearTerm;
use crate::optimize::objective::{Objective, ObjectiveSense};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::{Variable, VariableBuilder, VariableBuilderError, VariableType};
use crate::optimize::SolveOutcome;

// region Builder
/// Mutable, not yet validated-as-a-whole optimization problem
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    /// Name used in logs and rendered output
    name: Option<String>,
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem
    constraints: IndexMap<String, Constraint>,
    /// Type of problem
    problem_type: ProblemType,
}

impl ProblemBuilder {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            name: None,
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            problem_type: ProblemType::LinearContinuous,
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    /// Give the problem a name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
    // endregion Creation Functions

    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.set_sense(sense);
    }

    /// Index of a variable by id
    pub fn variable_index(&self, id: &str) -> Option<usize> {
        self.variables.get_index_of(id)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    // region Adding Variables
    /// Add a variable to the optimization problem, returning its index
    pub fn add_variable(&mut self, variable: Variable) -> Result<usize, ProblemError> {
        self.validate_variable(&variable)?;
        if variable.is_integral() {
            self.problem_type = ProblemType::LinearMixedInteger;
        }
        let (index, _) = self.variables.insert_full(variable.id.clone(), variable);
        Ok(index)
    }

    /// Create a new variable and add it to the optimization problem, returning its index
    pub fn add_new_variable(
        &mut self,
        id: &str,
        name: Option<&str>,
        variable_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, ProblemError> {
        let mut builder = VariableBuilder::default();
        builder
            .id(id)
            .variable_type(variable_type)
            .lower_bound(lower_bound)
            .upper_bound(upper_bound);
        if let Some(name) = name {
            builder.name(name);
        }
        self.add_variable(builder.build()?)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Create a new constraint over variables given by index, and add it to the problem
    pub fn add_new_constraint(
        &mut self,
        id: &str,
        name: Option<&str>,
        variables: &[usize],
        coefficients: &[f64],
        relation: Relation,
        rhs: f64,
    ) -> Result<(), ProblemError> {
        if self.constraints.contains_key(id) {
            return Err(ProblemError::ConstraintAlreadyExists(id.to_string()));
        }
        if variables.len() != coefficients.len() {
            return Err(ProblemError::MismatchedTerms {
                variables: variables.len(),
                coefficients: coefficients.len(),
            });
        }
        if !rhs.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFiniteValue(id.to_string()));
        }
        let terms = self.resolve_terms(variables, coefficients)?;
        self.constraints.insert(
            id.to_string(),
            Constraint::new(id, name, terms, relation, rhs),
        );
        Ok(())
    }

    /// Create a new constraint using variable ids rather than indices, and add it to the problem
    pub fn add_new_constraint_by_id(
        &mut self,
        id: &str,
        name: Option<&str>,
        variables: &[&str],
        coefficients: &[f64],
        relation: Relation,
        rhs: f64,
    ) -> Result<(), ProblemError> {
        let indices = variables
            .iter()
            .map(|v_id| {
                self.variable_index(v_id)
                    .ok_or_else(|| ProblemError::NonExistentVariable(v_id.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.add_new_constraint(id, name, &indices, coefficients, relation, rhs)
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new linear term to the objective
    pub fn add_new_linear_objective_term(
        &mut self,
        variable: usize,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        if !coefficient.is_finite() {
            return Err(ProblemError::NonFiniteValue("objective".to_string()));
        }
        let mut terms = self.resolve_terms(&[variable], &[coefficient])?;
        if let Some(term) = terms.pop() {
            self.objective.add_term(term);
        }
        Ok(())
    }

    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term_by_id(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        let variable = self
            .variable_index(variable_id)
            .ok_or_else(|| ProblemError::NonExistentVariable(variable_id.to_string()))?;
        self.add_new_linear_objective_term(variable, coefficient)
    }
    // endregion Adding Objective Terms

    /// Update the bounds of a variable
    pub fn update_variable_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        if lower_bound > upper_bound || lower_bound.is_nan() || upper_bound.is_nan() {
            return Err(ProblemError::InvalidVariableBounds(id.to_string()));
        }
        match self.variables.get_mut(id) {
            Some(var) => {
                var.lower_bound = lower_bound;
                var.upper_bound = upper_bound;
                Ok(())
            }
            None => Err(ProblemError::NonExistentVariable(id.to_string())),
        }
    }

    /// Finish building, the returned problem can no longer be changed
    pub fn build(self) -> Result<Problem, ProblemError> {
        if self.variables.is_empty() {
            return Err(ProblemError::NoVariables);
        }
        debug!(
            name = self.name.as_deref().unwrap_or("unnamed"),
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            problem_type = ?self.problem_type,
            "built problem"
        );
        Ok(Problem {
            name: self.name,
            objective: self.objective,
            variables: self.variables,
            constraints: self.constraints,
            problem_type: self.problem_type,
        })
    }

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists(variable.id.clone()));
        }
        let (lb, ub) = (variable.lower_bound, variable.upper_bound);
        if lb > ub || lb.is_nan() || ub.is_nan() {
            return Err(ProblemError::InvalidVariableBounds(variable.id.clone()));
        }
        Ok(())
    }

    /// Turn variable indices and coefficients into labelled terms
    fn resolve_terms(
        &self,
        variables: &[usize],
        coefficients: &[f64],
    ) -> Result<Vec<LinearTerm>, ProblemError> {
        variables
            .iter()
            .zip(coefficients)
            .map(|(&index, &coefficient)| match self.variables.get_index(index) {
                Some((_, var)) => Ok(LinearTerm {
                    variable: index,
                    label: var.display_name().to_string(),
                    coefficient,
                }),
                None => Err(ProblemError::NonExistentVariable(format!("#{}", index))),
            })
            .collect()
    }
    // endregion Validation Functions
}
// endregion Builder

// region Problem
/// A fully assembled optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    name: Option<String>,
    objective: Objective,
    variables: IndexMap<String, Variable>,
    constraints: IndexMap<String, Constraint>,
    problem_type: ProblemType,
}

impl Problem {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    pub fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn has_integer_variables(&self) -> bool {
        self.variables.values().any(|v| v.is_integral())
    }

    pub fn has_binary_variables(&self) -> bool {
        self.variables
            .values()
            .any(|v| v.variable_type == VariableType::Binary)
    }

    /// Whether `solver` accepts every kind of variable in the problem
    pub fn supported_by(&self, solver: &dyn Solver) -> bool {
        let integers = self
            .variables
            .values()
            .any(|v| v.variable_type == VariableType::Integer);
        (!integers || solver.integer_variable_capable())
            && (!self.has_binary_variables() || solver.binary_variable_capable())
    }

    /// Objective value of an assignment given in variable order
    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// Largest violation of any constraint, bound or integrality requirement
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        let constraint_violation = self
            .constraints
            .values()
            .map(|c| c.violation(values))
            .fold(0., f64::max);
        let variable_violation = self
            .variables
            .values()
            .zip(values)
            .map(|(var, value)| var.violation(*value))
            .fold(0., f64::max);
        constraint_violation.max(variable_violation)
    }

    /// Whether an assignment satisfies the whole problem within `tolerance`
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.variables.len() && self.max_violation(values) <= tolerance
    }

    /// [`is_feasible`](Self::is_feasible) with the tolerance from the configuration
    pub fn is_feasible_default(&self, values: &[f64]) -> bool {
        self.is_feasible(values, configuration::current().tolerance)
    }

    /// Solve the problem with the given solver
    ///
    /// The problem is not modified, so solving again gives the same objective value.
    pub fn solve(&self, solver: &dyn Solver) -> SolveOutcome {
        info!(
            name = self.name.as_deref().unwrap_or("unnamed"),
            solver = solver.name(),
            variables = self.num_variables(),
            constraints = self.num_constraints(),
            "solving problem"
        );
        if !self.supported_by(solver) {
            warn!(solver = solver.name(), problem_type = ?self.problem_type, "unsupported problem");
            return SolveOutcome::Error(SolverError::UnsupportedProblemType {
                solver: solver.name(),
                problem_type: self.problem_type,
            });
        }
        let outcome = match solver.solve(self) {
            Ok(solution) => SolveOutcome::Optimal(solution),
            Err(SolverError::Infeasible) => SolveOutcome::Infeasible,
            Err(err) => {
                warn!(solver = solver.name(), error = %err, "solver failed");
                SolveOutcome::Error(err)
            }
        };
        info!(status = %outcome.status(), "solve finished");
        outcome
    }

    /// Solve the problem with the solver chosen in the configuration
    ///
    /// Mixed integer problems go to microlp if the configured solver only handles
    /// continuous variables.
    pub fn solve_with_default(&self) -> SolveOutcome {
        let mut kind = configuration::current().solver;
        if self.has_integer_variables() && !kind.integer_capable() {
            debug!(configured = ?kind, "configured solver can't handle integer variables, using microlp");
            kind = SolverKind::Microlp;
        }
        let solver = kind.create();
        self.solve(solver.as_ref())
    }

    /// Render the whole formulation as LaTeX, one line per row
    pub fn to_latex(&self) -> Vec<String> {
        let mut lines = vec![self.objective.to_latex(), "\\text{subject to}".to_string()];
        lines.extend(self.constraints.values().map(|c| c.to_latex()));
        lines.extend(self.bound_lines(true));
        lines
    }

    /// Bound and domain lines, grouped the way the formulation is usually written
    fn bound_lines(&self, latex: bool) -> Vec<String> {
        let label = |v: &Variable| {
            if latex {
                crate::optimize::expression::latex_label(v.display_name())
            } else {
                v.display_name().to_string()
            }
        };
        let (le, ge) = if latex { ("\\le", "\\ge") } else { ("≤", "≥") };
        let mut lines = Vec::new();
        let mut binaries = Vec::new();
        for v in self.variables.values() {
            if v.variable_type == VariableType::Binary {
                binaries.push(label(v));
                continue;
            }
            let name = label(v);
            let line = match (v.lower_bound.is_finite(), v.upper_bound.is_finite()) {
                (true, true) => format!("{} {} {} {} {}", v.lower_bound, le, name, le, v.upper_bound),
                (true, false) => format!("{} {} {}", name, ge, v.lower_bound),
                (false, true) => format!("{} {} {}", name, le, v.upper_bound),
                (false, false) => format!("{} free", name),
            };
            let line = if v.variable_type == VariableType::Integer {
                if latex {
                    format!("{}, \\ {} \\in \\mathbb{{Z}}", line, name)
                } else {
                    format!("{}, {} integer", line, name)
                }
            } else {
                line
            };
            lines.push(line);
        }
        if !binaries.is_empty() {
            if latex {
                lines.push(format!("{} \\in \\{{0, 1\\}}", binaries.join(", ")));
            } else {
                lines.push(format!("{} binary", binaries.join(", ")));
            }
        }
        lines
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.objective)?;
        writeln!(f, "subject to")?;
        for c in self.constraints.values() {
            match c.name() {
                Some(name) => writeln!(f, "  {}: {}", name, c)?,
                None => writeln!(f, "  {}: {}", c.id(), c)?,
            }
        }
        for line in self.bound_lines(false) {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}
// endregion Problem

/// Types of optimization problems
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemType {
    /// Problem with linear objectives and constraints, and continuous variables
    LinearContinuous,
    /// Problem with linear objective and constraints, with integer and continuous variables
    LinearMixedInteger,
}

/// Errors associated with the Problem
#[derive(Error, Debug)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add variable '{0}' with the same id as an existing variable")]
    VariableIdAlreadyExists(String),
    /// Error when trying to add variable with invalid bounds
    #[error("Tried to give variable '{0}' a lower_bound > upper_bound")]
    InvalidVariableBounds(String),
    /// Error when the variable builder is missing required fields
    #[error("Unable to build variable: {0}")]
    UnableToBuildVariable(#[from] VariableBuilderError),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add constraint '{0}' with the same id as an existing constraint")]
    ConstraintAlreadyExists(String),
    /// Error when the number of variables and coefficients of a row differ
    #[error("Got {variables} variables but {coefficients} coefficients")]
    MismatchedTerms { variables: usize, coefficients: usize },
    /// Error when a coefficient or right hand side is NaN or infinite
    #[error("Non-finite coefficient or right hand side in '{0}'")]
    NonFiniteValue(String),
    /// Error when trying to reference a variable that doesn't exist
    #[error("Tried to access variable '{0}' which doesn't exist")]
    NonExistentVariable(String),
    /// Error when building a problem without any variables
    #[error("A problem needs at least one variable")]
    NoVariables,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solvers::microlp::MicrolpSolver;
    use crate::optimize::ProblemSolution;

    fn two_variable_builder() -> ProblemBuilder {
        let mut builder = ProblemBuilder::new_maximization().with_name("test");
        builder
            .add_new_variable("x", None, VariableType::Continuous, 0., 10.)
            .unwrap();
        builder
            .add_new_variable("y", Some("Y"), VariableType::Continuous, 0., f64::INFINITY)
            .unwrap();
        builder
    }

    #[test]
    fn new_problem() {
        let max_problem = ProblemBuilder::new_maximization();
        assert_eq!(max_problem.objective.sense(), ObjectiveSense::Maximize);

        let mut min_problem = ProblemBuilder::new_minimization();
        assert_eq!(min_problem.objective.sense(), ObjectiveSense::Minimize);
        min_problem.update_objective_sense(ObjectiveSense::Maximize);
        assert_eq!(min_problem.objective.sense(), ObjectiveSense::Maximize);
    }

    #[test]
    fn add_variables() {
        let mut builder = ProblemBuilder::new_maximization();
        let x = builder
            .add_new_variable("x", None, VariableType::Continuous, 64., 100.)
            .unwrap();
        assert_eq!(x, 0);
        assert_eq!(builder.problem_type, ProblemType::LinearContinuous);

        let y = builder
            .add_new_variable("y", None, VariableType::Integer, 64., 100.)
            .unwrap();
        assert_eq!(y, 1);
        assert_eq!(builder.problem_type, ProblemType::LinearMixedInteger);

        let var = builder.variables.get("y").unwrap();
        assert_eq!(var.variable_type, VariableType::Integer);
        assert!((var.lower_bound - 64.).abs() < 1e-25);
        assert!((var.upper_bound - 100.).abs() < 1e-25);
    }

    #[test]
    fn add_bad_variable() {
        let mut builder = ProblemBuilder::new_maximization();
        let res = builder.add_new_variable("x", None, VariableType::Continuous, 100., 64.);
        assert!(matches!(res, Err(ProblemError::InvalidVariableBounds(_))));

        builder
            .add_new_variable("x", None, VariableType::Continuous, 0., 1.)
            .unwrap();
        let res = builder.add_new_variable("x", None, VariableType::Continuous, 0., 1.);
        assert!(matches!(res, Err(ProblemError::VariableIdAlreadyExists(_))));
    }

    #[test]
    fn add_constraint() {
        let mut builder = two_variable_builder();
        builder
            .add_new_constraint_by_id("c1", None, &["x", "y"], &[2., 0.], Relation::LessEqual, 20.)
            .unwrap();
        let cons = builder.constraints.get("c1").unwrap();
        assert_eq!(cons.terms().len(), 2);
        assert_eq!(cons.terms()[1].coefficient, 0.);
        assert_eq!(cons.relation(), Relation::LessEqual);
        assert!((cons.rhs() - 20.).abs() < 1e-25);
    }

    #[test]
    fn add_bad_constraint() {
        let mut builder = two_variable_builder();
        let res =
            builder.add_new_constraint_by_id("c1", None, &["x", "z"], &[1., 1.], Relation::Equal, 1.);
        assert!(matches!(res, Err(ProblemError::NonExistentVariable(_))));

        let res = builder.add_new_constraint("c1", None, &[0, 1], &[1.], Relation::Equal, 1.);
        assert!(matches!(res, Err(ProblemError::MismatchedTerms { .. })));

        let res =
            builder.add_new_constraint("c1", None, &[0], &[f64::NAN], Relation::Equal, 1.);
        assert!(matches!(res, Err(ProblemError::NonFiniteValue(_))));

        builder
            .add_new_constraint("c1", None, &[0], &[1.], Relation::Equal, 1.)
            .unwrap();
        let res = builder.add_new_constraint("c1", None, &[1], &[1.], Relation::Equal, 1.);
        assert!(matches!(res, Err(ProblemError::ConstraintAlreadyExists(_))));
    }

    #[test]
    fn objective_terms_and_bounds() {
        let mut builder = two_variable_builder();
        builder.add_new_linear_objective_term_by_id("x", 3.).unwrap();
        assert!(matches!(
            builder.add_new_linear_objective_term_by_id("z", 3.),
            Err(ProblemError::NonExistentVariable(_))
        ));
        builder.update_variable_bounds("x", 1., 2.).unwrap();
        assert!(matches!(
            builder.update_variable_bounds("x", 3., 2.),
            Err(ProblemError::InvalidVariableBounds(_))
        ));
        let problem = builder.build().unwrap();
        assert_eq!(problem.variable("x").unwrap().upper_bound, 2.);
        assert!((problem.evaluate_objective(&[2., 5.]) - 6.).abs() < 1e-12);
    }

    #[test]
    fn empty_problem_is_rejected() {
        assert!(matches!(
            ProblemBuilder::new_minimization().build(),
            Err(ProblemError::NoVariables)
        ));
    }

    #[test]
    fn feasibility_check() {
        let mut builder = two_variable_builder();
        builder
            .add_new_constraint_by_id("c1", None, &["x", "y"], &[1., 1.], Relation::LessEqual, 4.)
            .unwrap();
        let problem = builder.build().unwrap();
        assert!(problem.is_feasible(&[1., 3.], 1e-9));
        assert!(!problem.is_feasible(&[2., 3.], 1e-9));
        assert!(!problem.is_feasible(&[11., 0.], 1e-9));
        assert!(!problem.is_feasible(&[1.], 1e-9));
        assert!((problem.max_violation(&[2., 3.]) - 1.).abs() < 1e-12);
    }

    #[test]
    fn feasibility_with_configured_tolerance() {
        let mut builder = two_variable_builder();
        builder
            .add_new_constraint_by_id("c1", None, &["x", "y"], &[1., 1.], Relation::LessEqual, 4.)
            .unwrap();
        let problem = builder.build().unwrap();
        let tolerance = configuration::current().tolerance;
        assert!(problem.is_feasible_default(&[1., 3. + tolerance / 2.]));
        assert!(!problem.is_feasible_default(&[1., 3. + tolerance * 10.]));
    }

    /// Accepts integer variables but not binary ones
    struct NoBinarySolver;

    impl Solver for NoBinarySolver {
        fn name(&self) -> &'static str {
            "no-binary"
        }

        fn integer_variable_capable(&self) -> bool {
            true
        }

        fn binary_variable_capable(&self) -> bool {
            false
        }

        fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
            MicrolpSolver.solve(problem)
        }
    }

    #[test]
    fn solver_capabilities_are_checked() {
        let mut builder = ProblemBuilder::new_maximization();
        builder
            .add_new_variable("n", None, VariableType::Integer, 0., 3.)
            .unwrap();
        builder.add_new_linear_objective_term_by_id("n", 1.).unwrap();
        let integer_only = builder.clone().build().unwrap();
        assert!(integer_only.has_integer_variables());
        assert!(!integer_only.has_binary_variables());
        assert!(integer_only.supported_by(&NoBinarySolver));
        assert!(integer_only.solve(&NoBinarySolver).is_optimal());

        builder
            .add_new_variable("b", None, VariableType::Binary, 0., 1.)
            .unwrap();
        let with_binary = builder.build().unwrap();
        assert!(with_binary.has_binary_variables());
        assert!(!with_binary.supported_by(&NoBinarySolver));
        assert!(matches!(
            with_binary.solve(&NoBinarySolver),
            SolveOutcome::Error(SolverError::UnsupportedProblemType { .. })
        ));
        assert!(with_binary.supported_by(&MicrolpSolver));
    }

    #[test]
    fn display_formulation() {
        let mut builder = two_variable_builder();
        builder.add_new_linear_objective_term_by_id("x", 3.).unwrap();
        builder.add_new_linear_objective_term_by_id("y", 2.).unwrap();
        builder
            .add_new_constraint_by_id("c1", Some("limit"), &["x", "y"], &[1., 0.], Relation::LessEqual, 4.)
            .unwrap();
        let problem = builder.build().unwrap();
        let text = format!("{}", problem);
        assert!(text.starts_with("maximize 3 x + 2 Y\nsubject to\n"));
        assert!(text.contains("  limit: x ≤ 4\n"));
        assert!(text.contains("  0 ≤ x ≤ 10\n"));
        assert!(text.contains("  Y ≥ 0\n"));

        let latex = problem.to_latex();
        assert_eq!(latex[0], "\\text{maximize} \\quad 3 x + 2 Y");
        assert_eq!(latex[2], "x \\le 4");
    }

    #[test]
    fn solve_is_repeatable() {
        // maximize 3x + 2y st x + y <= 4, x + 3y <= 6, x <= 3
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
        let problem = builder.build().unwrap();

        let first = problem.solve(&MicrolpSolver);
        let second = problem.solve(&MicrolpSolver);
        let first = first.solution().unwrap();
        let second = second.solution().unwrap();
        assert!((first.objective_value - 11.).abs() < 1e-6);
        assert!((first.objective_value - second.objective_value).abs() < 1e-9);
        assert!((problem.evaluate_objective(&first.values()) - first.objective_value).abs() < 1e-6);
        assert!(problem.is_feasible(&first.values(), 1e-6));
    }

    #[test]
    fn solve_with_default_handles_integers() {
        let mut builder = ProblemBuilder::new_maximization();
        builder
            .add_new_variable("x", None, VariableType::Integer, 0., 10.)
            .unwrap();
        builder.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        builder
            .add_new_constraint_by_id("c1", None, &["x"], &[2.], Relation::LessEqual, 7.)
            .unwrap();
        let problem = builder.build().unwrap();
        let outcome = problem.solve_with_default();
        let solution = outcome.solution().unwrap();
        assert!((solution.value("x").unwrap() - 3.).abs() < 1e-6);
    }
}
