//! Module providing JSON IO for template inputs and solve outcomes
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::optimize::problem::Problem;
use crate::optimize::solvers::Solver;
use crate::optimize::{OptimizationStatus, SolveOutcome};
use crate::templates::diet::{build_diet, DietInput};
use crate::templates::generic::{build_generic, GenericInput, RawGenericInput};
use crate::templates::resource::{build_resource, ResourceInput};
use crate::templates::tsp::{build_tsp, Tour, TourError, TspInput, TspOutcome};
use crate::templates::{BuiltTemplate, TemplateError, TemplateKind};

/// Read a JSON file into any template input
pub fn read_input<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, JsonError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
    };
    parse_input(&data)
}

pub fn parse_input<T: DeserializeOwned>(data: &str) -> Result<T, JsonError> {
    serde_json::from_str::<T>(data).map_err(|err| JsonError::UnableToParse(err.to_string()))
}

impl BuiltTemplate {
    /// Read the input for `kind` from a JSON file and build it
    pub fn read_json<P: AsRef<Path>>(kind: TemplateKind, path: P) -> Result<Self, JsonError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        Self::from_json_str(kind, &data)
    }

    pub fn from_json_str(kind: TemplateKind, data: &str) -> Result<Self, JsonError> {
        debug!(template = %kind, "reading template input");
        let built = match kind {
            TemplateKind::Generic => {
                BuiltTemplate::Linear(build_generic(&parse_input::<GenericInput>(data)?)?)
            }
            TemplateKind::Form => {
                let raw = parse_input::<RawGenericInput>(data)?;
                BuiltTemplate::Linear(build_generic(&raw.parse()?)?)
            }
            TemplateKind::Diet => BuiltTemplate::Linear(build_diet(&parse_input::<DietInput>(data)?)?),
            TemplateKind::Resource => {
                BuiltTemplate::Linear(build_resource(&parse_input::<ResourceInput>(data)?)?)
            }
            TemplateKind::Tsp => BuiltTemplate::Tsp(build_tsp(&parse_input::<TspInput>(data)?)?),
        };
        Ok(built)
    }

    /// Solve and summarize the outcome
    pub fn solve_to_report(&self, solver: &dyn Solver) -> OutcomeReport {
        match self {
            BuiltTemplate::Linear(problem) => {
                OutcomeReport::from_outcome(problem, &problem.solve(solver))
            }
            BuiltTemplate::Tsp(model) => OutcomeReport::from_tsp(&model.solve(solver)),
        }
    }
}

/// Serializable summary of a solve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeReport {
    pub status: OptimizationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,
    /// Variable values keyed by display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<IndexMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dual_values: Option<IndexMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour: Option<Tour>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomeReport {
    fn empty(status: OptimizationStatus) -> Self {
        OutcomeReport {
            status,
            objective_value: None,
            values: None,
            dual_values: None,
            tour: None,
            error: None,
        }
    }

    pub fn from_outcome(problem: &Problem, outcome: &SolveOutcome) -> Self {
        let mut report = Self::empty(outcome.status());
        match outcome {
            SolveOutcome::Optimal(solution) => {
                report.objective_value = Some(solution.objective_value);
                report.values = Some(
                    solution
                        .variable_values
                        .iter()
                        .map(|(id, value)| {
                            let name = problem
                                .variable(id)
                                .map(|v| v.display_name().to_string())
                                .unwrap_or_else(|| id.clone());
                            (name, *value)
                        })
                        .collect(),
                );
                report.dual_values = solution.dual_values.clone();
            }
            SolveOutcome::Infeasible => {}
            SolveOutcome::Error(err) => report.error = Some(err.to_string()),
        }
        report
    }

    pub fn from_tsp(outcome: &TspOutcome) -> Self {
        match outcome {
            TspOutcome::Optimal(tour) => {
                let mut report = Self::empty(OptimizationStatus::Optimal);
                report.objective_value = Some(tour.length);
                report.tour = Some(tour.clone());
                report
            }
            TspOutcome::Infeasible => Self::empty(OptimizationStatus::Infeasible),
            TspOutcome::Error(err) => {
                let status = match err {
                    TourError::Solver(solver_err) => {
                        SolveOutcome::Error(solver_err.clone()).status()
                    }
                    TourError::NotATour(_) => OptimizationStatus::SolverError,
                };
                let mut report = Self::empty(status);
                report.error = Some(err.to_string());
                report
            }
        }
    }

    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Invalid template input: {0}")]
    InvalidInput(#[from] TemplateError),
    #[error("Serde json error")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
