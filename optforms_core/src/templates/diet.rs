//! Diet / blending template
//!
//! Choose a quantity of every item so the weighted sums meet their limits at the
//! lowest total price. Quantities are continuous and bounded per item.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::optimize::constraint::Relation;
use crate::optimize::problem::{Problem, ProblemBuilder};
use crate::optimize::variable::VariableType;
use crate::templates::{
    check_non_negative, check_positive, check_row_length, name_or_default, TemplateError,
};

/// Something that can go into the blend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietItem {
    #[serde(default)]
    pub name: String,
    /// Price of one unit
    pub price: f64,
    /// Smallest allowed quantity, 0 when missing
    #[serde(default)]
    pub min_quantity: Option<f64>,
    /// Largest allowed quantity, unbounded when missing
    #[serde(default)]
    pub max_quantity: Option<f64>,
}

/// A weighted sum of item quantities compared against a limit, e.g. total protein >= 50
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedConstraint {
    #[serde(default)]
    pub name: Option<String>,
    /// One weight per item
    pub contributions: Vec<f64>,
    pub relation: Relation,
    pub limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietInput {
    pub items: Vec<DietItem>,
    pub constraints: Vec<WeightedConstraint>,
}

impl DietItem {
    /// Quantity bounds after defaults, checked against each other
    fn bounds(&self, field: &str) -> Result<(f64, f64), TemplateError> {
        let lower = self.min_quantity.unwrap_or(0.);
        let upper = self.max_quantity.unwrap_or(f64::INFINITY);
        check_non_negative(&format!("{} minimum quantity", field), lower)?;
        if upper.is_nan() || upper < 0. {
            return Err(TemplateError::Domain {
                field: format!("{} maximum quantity", field),
                value: upper,
                reason: "must not be negative",
            });
        }
        if lower > upper {
            return Err(TemplateError::Domain {
                field: format!("{} minimum quantity", field),
                value: lower,
                reason: "must not exceed the maximum quantity",
            });
        }
        Ok((lower, upper))
    }
}

/// Build the minimum cost blend
pub fn build_diet(input: &DietInput) -> Result<Problem, TemplateError> {
    let n = input.items.len();
    if n == 0 {
        return Err(TemplateError::Dimension("at least one item is required".to_string()));
    }

    let mut builder = ProblemBuilder::new_minimization().with_name("diet");
    let mut variables = Vec::with_capacity(n);
    for (j, item) in input.items.iter().enumerate() {
        let name = name_or_default(Some(&item.name), format!("item{}", j + 1));
        check_positive(&format!("{} price", name), item.price)?;
        let (lower, upper) = item.bounds(&name)?;
        let var = builder.add_new_variable(
            &format!("x{}", j + 1),
            Some(&name),
            VariableType::Continuous,
            lower,
            upper,
        )?;
        builder.add_new_linear_objective_term(var, item.price)?;
        variables.push(var);
    }

    for (i, constraint) in input.constraints.iter().enumerate() {
        let id = format!("c{}", i + 1);
        check_row_length(&id, constraint.contributions.len(), n)?;
        builder.add_new_constraint(
            &id,
            constraint.name.as_deref(),
            &variables,
            &constraint.contributions,
            constraint.relation,
            constraint.limit,
        )?;
    }
    debug!(items = n, constraints = input.constraints.len(), "assembled diet problem");
    Ok(builder.build()?)
}
