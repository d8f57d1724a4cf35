//! Resource allocation template
//!
//! Minimize the cost of the allocation subject to "at least" requirements. Every
//! allocation is kept strictly positive by a floor taken from the configuration unless
//! the input sets one.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::configuration;
use crate::optimize::constraint::Relation;
use crate::optimize::problem::{Problem, ProblemBuilder};
use crate::optimize::variable::VariableType;
use crate::templates::{check_non_negative, check_row_length, name_or_default, TemplateError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub name: String,
    /// Cost of one unit
    pub cost: f64,
}

/// Weighted sum of allocations that must reach `limit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub name: Option<String>,
    pub coefficients: Vec<f64>,
    pub limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInput {
    pub resources: Vec<Resource>,
    pub requirements: Vec<Requirement>,
    /// Smallest allocation of any resource
    #[serde(default)]
    pub floor: Option<f64>,
}

pub fn build_resource(input: &ResourceInput) -> Result<Problem, TemplateError> {
    let n = input.resources.len();
    if n == 0 {
        return Err(TemplateError::Dimension("at least one resource is required".to_string()));
    }
    if input.requirements.is_empty() {
        return Err(TemplateError::Dimension("at least one requirement is required".to_string()));
    }
    let floor = input
        .floor
        .unwrap_or_else(|| configuration::current().positivity_floor);
    if !floor.is_finite() || floor <= 0. {
        return Err(TemplateError::Domain {
            field: "floor".to_string(),
            value: floor,
            reason: "must be strictly positive",
        });
    }

    let mut builder = ProblemBuilder::new_minimization().with_name("resource allocation");
    let mut variables = Vec::with_capacity(n);
    for (j, resource) in input.resources.iter().enumerate() {
        let name = name_or_default(Some(&resource.name), format!("x{}", j + 1));
        check_non_negative(&format!("{} cost", name), resource.cost)?;
        let var = builder.add_new_variable(
            &format!("x{}", j + 1),
            Some(&name),
            VariableType::Continuous,
            floor,
            f64::INFINITY,
        )?;
        builder.add_new_linear_objective_term(var, resource.cost)?;
        variables.push(var);
    }

    for (i, requirement) in input.requirements.iter().enumerate() {
        let id = format!("r{}", i + 1);
        check_row_length(&id, requirement.coefficients.len(), n)?;
        builder.add_new_constraint(
            &id,
            requirement.name.as_deref(),
            &variables,
            &requirement.coefficients,
            Relation::GreaterEqual,
            requirement.limit,
        )?;
    }
    debug!(resources = n, requirements = input.requirements.len(), floor, "assembled resource problem");
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solvers::clarabel::ClarabelSolver;
    use crate::optimize::solvers::microlp::MicrolpSolver;
    use crate::optimize::SolveOutcome;

    fn resources(costs: &[f64]) -> Vec<Resource> {
        costs
            .iter()
            .map(|&cost| Resource {
                name: String::new(),
                cost,
            })
            .collect()
    }

    fn requirement(coefficients: &[f64], limit: f64) -> Requirement {
        Requirement {
            name: None,
            coefficients: coefficients.to_vec(),
            limit,
        }
    }

    #[test]
    fn allocations_stay_above_floor() {
        let input = ResourceInput {
            resources: resources(&[4., 1., 3.]),
            requirements: vec![requirement(&[1., 2., 1.], 6.), requirement(&[2., 0., 1.], 2.)],
            floor: None,
        };
        let problem = build_resource(&input).unwrap();
        let floor = configuration::current().positivity_floor;
        for outcome in [
            problem.solve(&MicrolpSolver),
            problem.solve(&ClarabelSolver::default()),
        ] {
            let solution = outcome.into_solution().unwrap();
            let values = solution.values();
            assert!(values.iter().all(|v| *v >= floor - 1e-6));
            assert!(problem.is_feasible(&values, 1e-5));
        }
    }

    #[test]
    fn explicit_floor() {
        let input = ResourceInput {
            resources: resources(&[1., 1.]),
            requirements: vec![requirement(&[1., 0.], 1.)],
            floor: Some(0.5),
        };
        let problem = build_resource(&input).unwrap();
        let solution = problem.solve(&MicrolpSolver).into_solution().unwrap();
        assert!((solution.value("x2").unwrap() - 0.5).abs() < 1e-6);
        assert!((solution.objective_value - 1.5).abs() < 1e-6);
    }

    #[test]
    fn unsatisfiable_requirements() {
        let input = ResourceInput {
            resources: resources(&[1., 1.]),
            requirements: vec![requirement(&[1., 1.], 10.), requirement(&[-1., -1.], 0.)],
            floor: None,
        };
        let problem = build_resource(&input).unwrap();
        assert_eq!(problem.solve(&MicrolpSolver), SolveOutcome::Infeasible);
    }

    #[test]
    fn domain_errors() {
        for floor in [0., -1.] {
            let input = ResourceInput {
                resources: resources(&[1.]),
                requirements: vec![requirement(&[1.], 1.)],
                floor: Some(floor),
            };
            assert!(matches!(build_resource(&input), Err(TemplateError::Domain { .. })));
        }
        let input = ResourceInput {
            resources: resources(&[-2.]),
            requirements: vec![requirement(&[1.], 1.)],
            floor: None,
        };
        assert!(matches!(build_resource(&input), Err(TemplateError::Domain { .. })));

        let input = ResourceInput {
            resources: resources(&[1.]),
            requirements: vec![],
            floor: None,
        };
        assert!(matches!(build_resource(&input), Err(TemplateError::Dimension(_))));
    }
}
