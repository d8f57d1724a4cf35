//! Generic LP/MIP template: N non-negative variables, an objective row, and M constraint rows
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::optimize::constraint::Relation;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::{Problem, ProblemBuilder};
use crate::optimize::variable::VariableType;
use crate::templates::{check_row_length, name_or_default, parse_number, parse_relation, TemplateError};

/// A generic linear problem with typed values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericInput {
    /// Maximize or minimize
    pub sense: ObjectiveSense,
    /// Domain shared by every variable, continuous (LP) or integer (MIP)
    #[serde(default = "continuous")]
    pub variable_type: VariableType,
    /// One entry per variable, blank names become `x1`, `x2`, ...
    pub variable_names: Vec<String>,
    /// Objective coefficient of every variable
    pub objective: Vec<f64>,
    /// Constraint rows
    pub constraints: Vec<ConstraintRow>,
}

fn continuous() -> VariableType {
    VariableType::Continuous
}

/// One row of the constraint matrix with its operator and right hand side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRow {
    #[serde(default)]
    pub name: Option<String>,
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

impl GenericInput {
    pub fn num_variables(&self) -> usize {
        self.variable_names.len()
    }

    /// Dense M×N coefficient matrix of the constraint rows
    pub fn coefficient_matrix(&self) -> Result<DMatrix<f64>, TemplateError> {
        let n = self.num_variables();
        for (i, row) in self.constraints.iter().enumerate() {
            check_row_length(&format!("constraint {}", i + 1), row.coefficients.len(), n)?;
        }
        Ok(DMatrix::from_fn(self.constraints.len(), n, |i, j| {
            self.constraints[i].coefficients[j]
        }))
    }

    /// Variable names with placeholders filled in
    pub fn resolved_names(&self) -> Vec<String> {
        self.variable_names
            .iter()
            .enumerate()
            .map(|(i, name)| name_or_default(Some(name), format!("x{}", i + 1)))
            .collect()
    }
}

/// A generic linear problem as typed into a form, every cell still free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGenericInput {
    pub sense: String,
    #[serde(default = "continuous")]
    pub variable_type: VariableType,
    pub variable_names: Vec<String>,
    pub objective: Vec<String>,
    pub constraints: Vec<RawConstraintRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawConstraintRow {
    #[serde(default)]
    pub name: Option<String>,
    pub coefficients: Vec<String>,
    pub relation: String,
    pub rhs: String,
}

impl RawGenericInput {
    /// Convert every cell, reporting the first one that isn't a number
    ///
    /// Objective cells, constraint cells and right hand sides all follow the same rule,
    /// nothing is silently replaced by 0.
    pub fn parse(&self) -> Result<GenericInput, TemplateError> {
        let sense = self
            .sense
            .parse::<ObjectiveSense>()
            .map_err(|_| TemplateError::Parse {
                field: "objective sense".to_string(),
                value: self.sense.clone(),
            })?;
        let objective = self
            .objective
            .iter()
            .enumerate()
            .map(|(j, cell)| parse_number(&format!("objective coefficient {}", j + 1), cell))
            .collect::<Result<Vec<_>, _>>()?;
        let constraints = self
            .constraints
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let coefficients = row
                    .coefficients
                    .iter()
                    .enumerate()
                    .map(|(j, cell)| {
                        parse_number(&format!("constraint {} coefficient {}", i + 1, j + 1), cell)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ConstraintRow {
                    name: row.name.clone(),
                    coefficients,
                    relation: parse_relation(&format!("constraint {}", i + 1), &row.relation)?,
                    rhs: parse_number(&format!("constraint {} right hand side", i + 1), &row.rhs)?,
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;
        Ok(GenericInput {
            sense,
            variable_type: self.variable_type,
            variable_names: self.variable_names.clone(),
            objective,
            constraints,
        })
    }
}

/// Build the generic problem, every variable gets the bounds `x >= 0`
pub fn build_generic(input: &GenericInput) -> Result<Problem, TemplateError> {
    let n = input.num_variables();
    if n == 0 {
        return Err(TemplateError::Dimension("at least one variable is required".to_string()));
    }
    check_row_length("objective", input.objective.len(), n)?;
    let matrix = input.coefficient_matrix()?;

    let mut builder = ProblemBuilder::new(input.sense).with_name("generic");
    let names = input.resolved_names();
    let variables = names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            builder.add_new_variable(
                &format!("x{}", j + 1),
                Some(name),
                input.variable_type,
                0.,
                f64::INFINITY,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (&var, &coef) in variables.iter().zip(&input.objective) {
        builder.add_new_linear_objective_term(var, coef)?;
    }

    for (i, row) in input.constraints.iter().enumerate() {
        let coefficients: Vec<f64> = matrix.row(i).iter().copied().collect();
        let id = format!("c{}", i + 1);
        builder.add_new_constraint(
            &id,
            row.name.as_deref(),
            &variables,
            &coefficients,
            row.relation,
            row.rhs,
        )?;
    }
    debug!(variables = n, constraints = input.constraints.len(), "assembled generic problem");
    Ok(builder.build()?)
}
