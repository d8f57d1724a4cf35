//! Problem templates
//!
//! Each template takes a plain input value and produces an immutable
//! [`Problem`](crate::optimize::problem::Problem):
//! - [`generic`]: arbitrary LP/MIP given as a coefficient matrix
//! - [`diet`]: minimum cost blend of items with per-item quantity bounds
//! - [`resource`]: minimum cost allocation meeting "at least" requirements, every
//!   allocation strictly positive
//! - [`tsp`]: traveling salesman tour with Miller-Tucker-Zemlin subtour elimination,
//!   optionally with blocked edges

pub mod diet;
pub mod distance;
pub mod generic;
pub mod resource;
pub mod tsp;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimize::constraint::{Relation, RelationParseError};
use crate::optimize::problem::{Problem, ProblemError};
use crate::templates::tsp::TspModel;

/// The available templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// [`generic::GenericInput`]
    Generic,
    /// [`generic::RawGenericInput`], every cell is text
    Form,
    Diet,
    Resource,
    /// Also covers blocked edges
    Tsp,
}

impl TemplateKind {
    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Generic => "generic",
            TemplateKind::Form => "form",
            TemplateKind::Diet => "diet",
            TemplateKind::Resource => "resource",
            TemplateKind::Tsp => "tsp",
        }
    }
}

impl Display for TemplateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "lp" | "mip" => Ok(TemplateKind::Generic),
            "form" => Ok(TemplateKind::Form),
            "diet" | "blending" => Ok(TemplateKind::Diet),
            "resource" | "allocation" => Ok(TemplateKind::Resource),
            "tsp" => Ok(TemplateKind::Tsp),
            other => Err(format!("unknown template '{}'", other)),
        }
    }
}

/// Output of any template builder
#[derive(Debug, Clone)]
pub enum BuiltTemplate {
    Linear(Problem),
    Tsp(TspModel),
}

impl BuiltTemplate {
    pub fn problem(&self) -> &Problem {
        match self {
            BuiltTemplate::Linear(problem) => problem,
            BuiltTemplate::Tsp(model) => model.problem(),
        }
    }
}

/// Errors raised while validating template input and assembling the problem
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A numeric field couldn't be parsed
    #[error("Unable to parse {field}: '{value}' is not a number")]
    Parse { field: String, value: String },
    /// A relational operator couldn't be parsed
    #[error("Invalid operator for {field}: {source}")]
    Relation {
        field: String,
        source: RelationParseError,
    },
    /// A value is outside the domain the template accepts
    #[error("Invalid {field} ({value}): {reason}")]
    Domain {
        field: String,
        value: f64,
        reason: &'static str,
    },
    /// Counts or row lengths don't line up
    #[error("Dimension mismatch: {0}")]
    Dimension(String),
    /// A blocked edge starts and ends at the same point
    #[error("Blocked edge ({point}, {point}) is a self-loop")]
    SelfLoop { point: usize },
    /// A blocked edge references a point that doesn't exist
    #[error("Point {point} doesn't exist")]
    UnknownPoint { point: usize },
    /// The assembled problem was rejected
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

/// Parse a free-text numeric field, rejecting anything that isn't a finite number
pub fn parse_number(field: &str, text: &str) -> Result<f64, TemplateError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TemplateError::Parse {
            field: field.to_string(),
            value: text.to_string(),
        }),
    }
}

/// Parse a free-text relational operator
pub fn parse_relation(field: &str, text: &str) -> Result<Relation, TemplateError> {
    text.parse::<Relation>()
        .map_err(|source| TemplateError::Relation {
            field: field.to_string(),
            source,
        })
}

/// Use `name` unless it is blank, in which case fall back to the placeholder
pub(crate) fn name_or_default(name: Option<&str>, placeholder: String) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => placeholder,
    }
}

/// Check that a row has one entry per variable
pub(crate) fn check_row_length(
    row: &str,
    length: usize,
    expected: usize,
) -> Result<(), TemplateError> {
    if length != expected {
        return Err(TemplateError::Dimension(format!(
            "{} has {} coefficients, expected {}",
            row, length, expected
        )));
    }
    Ok(())
}

/// Reject zero, negative and non-finite values
pub(crate) fn check_positive(field: &str, value: f64) -> Result<(), TemplateError> {
    check_non_negative(field, value)?;
    if value == 0. {
        return Err(TemplateError::Domain {
            field: field.to_string(),
            value,
            reason: "must be greater than 0",
        });
    }
    Ok(())
}

/// Reject negative values, and non-finite ones
pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<(), TemplateError> {
    if !value.is_finite() {
        return Err(TemplateError::Domain {
            field: field.to_string(),
            value,
            reason: "must be a finite number",
        });
    }
    if value < 0. {
        return Err(TemplateError::Domain {
            field: field.to_string(),
            value,
            reason: "must not be negative",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numbers() {
        assert_eq!(parse_number("a", " 2.5 ").unwrap(), 2.5);
        assert_eq!(parse_number("a", "-3").unwrap(), -3.);
        for bad in ["", "abc", "1,5", "NaN", "inf"] {
            match parse_number("cell (1, 2)", bad) {
                Err(TemplateError::Parse { field, value }) => {
                    assert_eq!(field, "cell (1, 2)");
                    assert_eq!(value, bad);
                }
                other => panic!("'{}' should not parse, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn parse_relations() {
        assert_eq!(parse_relation("r", "≥").unwrap(), Relation::GreaterEqual);
        assert!(matches!(
            parse_relation("r", "!="),
            Err(TemplateError::Relation { .. })
        ));
    }

    #[test]
    fn default_names() {
        assert_eq!(name_or_default(Some("bread"), "x1".to_string()), "bread");
        assert_eq!(name_or_default(Some("  "), "x1".to_string()), "x1");
        assert_eq!(name_or_default(None, "x2".to_string()), "x2");
    }

    #[test]
    fn template_kinds() {
        assert_eq!("TSP".parse::<TemplateKind>().unwrap(), TemplateKind::Tsp);
        assert_eq!("blending".parse::<TemplateKind>().unwrap(), TemplateKind::Diet);
        assert!("knapsack".parse::<TemplateKind>().is_err());
        assert_eq!(TemplateKind::Resource.to_string(), "resource");
    }

    #[test]
    fn domain_checks() {
        assert!(check_non_negative("price", 0.).is_ok());
        assert!(matches!(
            check_non_negative("price", -1.),
            Err(TemplateError::Domain { .. })
        ));
        assert!(check_non_negative("price", f64::INFINITY).is_err());
        assert!(check_row_length("row 1", 2, 3).is_err());

        assert!(check_positive("price", 0.5).is_ok());
        for bad in [0., -0., -2., f64::NAN] {
            assert!(matches!(
                check_positive("price", bad),
                Err(TemplateError::Domain { .. })
            ));
        }
    }
}
