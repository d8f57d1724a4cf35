//! Crate wide defaults used when building and solving problems
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Serialize};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Default lower bound for new variables
    pub lower_bound: f64,
    /// Default upper bound for new variables
    pub upper_bound: f64,
    /// Tolerance used when checking a solution against its problem
    pub tolerance: f64,
    /// Solver used by [`Problem::solve_with_default`](crate::optimize::problem::Problem::solve_with_default)
    pub solver: SolverKind,
    /// Floor every resource allocation variable must reach
    pub positivity_floor: f64,
    /// Largest number of points accepted by the TSP templates
    pub max_points: usize,
    /// Values within this distance of an integer are treated as integral
    pub integrality_tolerance: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: 0.,
            upper_bound: f64::INFINITY,
            tolerance: 1e-06,
            solver: SolverKind::Microlp,
            positivity_floor: 1e-02,
            max_points: 10,
            integrality_tolerance: 1e-06,
        }
    }
}

/// Snapshot of the current configuration
///
/// A poisoned lock still holds valid data (nothing panics while holding the write lock
/// half way through an update), so the inner value is used in that case.
pub fn current() -> Configuration {
    match CONFIGURATION.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Enum used to specify the default solver to use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    /// Use the microlp simplex and branch and bound solver, supports integer variables
    Microlp,
    /// Use the Clarabel interior point solver, continuous problems only
    Clarabel,
}

impl SolverKind {
    /// Whether the solver can handle integer and binary variables
    pub fn integer_capable(&self) -> bool {
        match self {
            SolverKind::Microlp => true,
            SolverKind::Clarabel => false,
        }
    }
}

impl std::str::FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "microlp" => Ok(SolverKind::Microlp),
            "clarabel" => Ok(SolverKind::Clarabel),
            other => Err(format!("unknown solver '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert_eq!(config.lower_bound, 0.);
        assert!(config.upper_bound.is_infinite());
        assert_eq!(config.solver, SolverKind::Microlp);
        assert!(config.positivity_floor > 0.);
        assert_eq!(config.max_points, 10);
    }

    #[test]
    fn parse_solver_kind() {
        assert_eq!("microlp".parse::<SolverKind>(), Ok(SolverKind::Microlp));
        assert_eq!(" Clarabel ".parse::<SolverKind>(), Ok(SolverKind::Clarabel));
        assert!("gurobi".parse::<SolverKind>().is_err());
        assert!(SolverKind::Microlp.integer_capable());
        assert!(!SolverKind::Clarabel.integer_capable());
    }
}
