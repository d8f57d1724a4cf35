//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::configuration;

/// A decision variable of an optimization problem
///
/// # Examples
/// ```rust
/// use optforms_core::optimize::variable::{VariableBuilder, VariableType};
/// let x = VariableBuilder::default()
///     .id("x")
///     .name("Flour")
///     .lower_bound(0.0)
///     .upper_bound(20.)
///     .build()
///     .unwrap();
/// assert_eq!(x.variable_type, VariableType::Continuous);
/// assert_eq!(x.display_name(), "Flour");
/// ```
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Variable {
    /// Used to identify the variable, unique within a problem
    pub id: String,
    /// Human-readable name, used when rendering the formulation
    #[builder(setter(into, strip_option), default = "None")]
    pub name: Option<String>,
    /// Domain of the variable
    #[builder(default = "VariableType::Continuous")]
    pub variable_type: VariableType,
    /// Lowest value the variable can take
    #[builder(default = "configuration::current().lower_bound")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "configuration::current().upper_bound")]
    pub upper_bound: f64,
}

impl Variable {
    /// The name if one was given, otherwise the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Whether the solver must assign an integral value
    pub fn is_integral(&self) -> bool {
        !matches!(self.variable_type, VariableType::Continuous)
    }

    /// Effective bounds, binary variables are additionally clamped to [0, 1]
    pub fn effective_bounds(&self) -> (f64, f64) {
        match self.variable_type {
            VariableType::Binary => (self.lower_bound.max(0.), self.upper_bound.min(1.)),
            _ => (self.lower_bound, self.upper_bound),
        }
    }

    /// How far `value` lies outside the domain of the variable (0 when inside)
    pub fn violation(&self, value: f64) -> f64 {
        let (lower, upper) = self.effective_bounds();
        let bound_violation = (lower - value).max(value - upper).max(0.);
        if self.is_integral() {
            bound_violation.max((value - value.round()).abs())
        } else {
            bound_violation
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.display_name(), self.variable_type)
    }
}

/// Represents the type of variable in an optimization problem
///
/// # Notes:
/// Not all variable types are supported for all solvers, currently Clarabel only supports
/// Continuous variables, while microlp supports all types
#[derive(Debug, PartialEq, Clone, Copy, Hash, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary Variable
    Binary,
}

impl Display for VariableType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Continuous => write!(f, "CONTINUOUS"),
            VariableType::Integer => write!(f, "INTEGER"),
            VariableType::Binary => write!(f, "BINARY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let x = VariableBuilder::default().id("x").build().unwrap();
        assert_eq!(x.id, "x");
        assert_eq!(x.name, None);
        assert_eq!(x.variable_type, VariableType::Continuous);
        assert_eq!(x.lower_bound, 0.);
        assert!(x.upper_bound.is_infinite());
        assert_eq!(x.display_name(), "x");
        assert_eq!(format!("{}", x), "x:CONTINUOUS");
    }

    #[test]
    fn builder_requires_id() {
        assert!(VariableBuilder::default().lower_bound(1.).build().is_err());
    }

    #[test]
    fn violation() {
        let x = VariableBuilder::default()
            .id("x")
            .variable_type(VariableType::Integer)
            .lower_bound(1.)
            .upper_bound(3.)
            .build()
            .unwrap();
        assert_eq!(x.violation(2.), 0.);
        assert!((x.violation(0.5) - 0.5).abs() < 1e-12);
        assert!((x.violation(2.25) - 0.25).abs() < 1e-12);
        assert!((x.violation(4.) - 1.).abs() < 1e-12);

        let b = VariableBuilder::default()
            .id("b")
            .variable_type(VariableType::Binary)
            .build()
            .unwrap();
        assert_eq!(b.effective_bounds(), (0., 1.));
        assert!((b.violation(2.) - 1.).abs() < 1e-12);
    }
}
