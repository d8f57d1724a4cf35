//! Provides struct for representing a constraint in an optimization problem
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimize::expression::{LinearExpression, LinearTerm};

/// Represents a linear constraint `terms (relation) rhs` in an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Used to identify the constraint
    id: String,
    /// Human-readable constraint name
    name: Option<String>,
    /// Left hand side of the constraint
    expression: LinearExpression,
    /// How the left hand side is compared to the right hand side
    relation: Relation,
    /// The right hand side of the constraint
    rhs: f64,
}

impl Constraint {
    /// Create a new constraint from parallel slices of terms
    ///
    /// Only the problem builder creates constraints, since it has to resolve variable
    /// indices and labels first.
    pub(crate) fn new(
        id: &str,
        name: Option<&str>,
        terms: Vec<LinearTerm>,
        relation: Relation,
        rhs: f64,
    ) -> Self {
        let mut expression = LinearExpression::new();
        terms.into_iter().for_each(|t| expression.push(t));
        Constraint {
            id: id.to_string(),
            name: name.map(str::to_string),
            expression,
            relation,
            rhs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn expression(&self) -> &LinearExpression {
        &self.expression
    }

    pub fn terms(&self) -> &[LinearTerm] {
        self.expression.terms()
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Value of the left hand side for a vector of variable values
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.expression.evaluate(values)
    }

    /// How far the constraint is from being satisfied by `values` (0 when satisfied)
    pub fn violation(&self, values: &[f64]) -> f64 {
        self.relation.violation(self.evaluate(values), self.rhs)
    }

    /// Render the constraint as LaTeX
    pub fn to_latex(&self) -> String {
        format!(
            "{} {} {}",
            self.expression.to_latex(),
            self.relation.latex(),
            self.rhs
        )
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.expression, self.relation, self.rhs)
    }
}

/// Relational operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Left hand side is at most the right hand side
    #[serde(rename = "<=", alias = "≤")]
    LessEqual,
    /// Left hand side is at least the right hand side
    #[serde(rename = ">=", alias = "≥")]
    GreaterEqual,
    /// Left hand side equals the right hand side
    #[serde(rename = "=", alias = "==")]
    Equal,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::LessEqual => "≤",
            Relation::GreaterEqual => "≥",
            Relation::Equal => "=",
        }
    }

    pub fn latex(&self) -> &'static str {
        match self {
            Relation::LessEqual => "\\le",
            Relation::GreaterEqual => "\\ge",
            Relation::Equal => "=",
        }
    }

    /// Amount by which `lhs (relation) rhs` is violated
    pub fn violation(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Relation::LessEqual => (lhs - rhs).max(0.),
            Relation::GreaterEqual => (rhs - lhs).max(0.),
            Relation::Equal => (lhs - rhs).abs(),
        }
    }

    /// Whether `lhs (relation) rhs` holds within `tolerance`
    pub fn holds(&self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        self.violation(lhs, rhs) <= tolerance
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Relation {
    type Err = RelationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "≤" | "<=" | "=<" => Ok(Relation::LessEqual),
            "≥" | ">=" | "=>" => Ok(Relation::GreaterEqual),
            "=" | "==" => Ok(Relation::Equal),
            other => Err(RelationParseError(other.to_string())),
        }
    }
}

/// Error when a relational operator isn't one of ≤, ≥, =
#[derive(Error, Debug, Clone, PartialEq)]
#[error("'{0}' is not a relational operator, expected one of ≤, ≥, =")]
pub struct RelationParseError(pub String);
