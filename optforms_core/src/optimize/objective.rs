//! Provides struct for representing an optimization problem's objective
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::optimize::expression::{LinearExpression, LinearTerm};

/// Represents the Objective of an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Terms included in the objective
    expression: LinearExpression,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            expression: LinearExpression::new(),
            sense,
        }
    }

    /// Create a new empty maximization objective
    pub fn new_maximize() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new empty minimization objective
    pub fn new_minimize() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Add a new linear term to the objective
    pub(crate) fn add_term(&mut self, term: LinearTerm) {
        self.expression.push(term);
    }

    pub fn terms(&self) -> &[LinearTerm] {
        self.expression.terms()
    }

    pub fn expression(&self) -> &LinearExpression {
        &self.expression
    }

    /// Objective value for a vector of variable values
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.expression.evaluate(values)
    }

    /// Objective coefficient of every variable, summed over repeated terms
    pub fn dense_coefficients(&self, num_variables: usize) -> Vec<f64> {
        self.expression.dense_coefficients(num_variables)
    }

    pub fn to_latex(&self) -> String {
        format!("\\text{{{}}} \\quad {}", self.sense, self.expression.to_latex())
    }
}

impl Display for Objective {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.sense, self.expression)
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveSense {
    /// The objective should be minimized
    #[serde(alias = "min")]
    Minimize,
    /// The objective should be maximized
    #[serde(alias = "max")]
    Maximize,
}

impl Display for ObjectiveSense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "minimize"),
            ObjectiveSense::Maximize => write!(f, "maximize"),
        }
    }
}

impl FromStr for ObjectiveSense {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" | "minimize" | "minimise" => Ok(ObjectiveSense::Minimize),
            "max" | "maximize" | "maximise" => Ok(ObjectiveSense::Maximize),
            other => Err(format!("unknown objective sense '{}'", other)),
        }
    }
}
