//! Traveling salesman template
//!
//! Formulated as an assignment problem over binary edge variables `x_i_j` (one per
//! ordered pair of distinct points), with Miller-Tucker-Zemlin ordinals `u_i` removing
//! subtours:
//! - every point is left exactly once and entered exactly once
//! - for every ordered pair of points other than point 0, `u_i - u_j + N x_i_j <= N - 1`
//!
//! Blocked edges are fixed to zero with an extra equality row.
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::configuration;
use crate::optimize::constraint::Relation;
use crate::optimize::problem::{Problem, ProblemBuilder};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::VariableType;
use crate::optimize::SolveOutcome;
use crate::templates::distance::{DistanceMatrix, Point};
use crate::templates::{name_or_default, TemplateError};

/// Where the points are, either as coordinates or as a full distance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locations {
    Points(Vec<Point>),
    Distances(DistanceMatrix),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TspInput {
    /// Point names, empty to use `p0`, `p1`, ...
    #[serde(default)]
    pub names: Vec<String>,
    pub locations: Locations,
    /// Ordered pairs `(from, to)` that may not be traveled
    #[serde(default)]
    pub blocked: BTreeSet<(usize, usize)>,
}

impl TspInput {
    pub fn from_points(points: Vec<Point>) -> Self {
        TspInput {
            names: Vec::new(),
            locations: Locations::Points(points),
            blocked: BTreeSet::new(),
        }
    }

    pub fn from_distances(distances: DistanceMatrix) -> Self {
        TspInput {
            names: Vec::new(),
            locations: Locations::Distances(distances),
            blocked: BTreeSet::new(),
        }
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn with_blocked<I: IntoIterator<Item = (usize, usize)>>(mut self, blocked: I) -> Self {
        self.blocked.extend(blocked);
        self
    }

    pub fn distance_matrix(&self) -> Result<DistanceMatrix, TemplateError> {
        match &self.locations {
            Locations::Points(points) => DistanceMatrix::from_points(points),
            Locations::Distances(distances) => Ok(distances.clone()),
        }
    }
}

/// Edge variable and the pair of points it connects
#[derive(Debug, Clone, Copy, PartialEq)]
struct EdgeVariable {
    from: usize,
    to: usize,
    index: usize,
}

/// An assembled TSP problem, plus what is needed to read a tour back out of a solution
#[derive(Debug, Clone)]
pub struct TspModel {
    problem: Problem,
    names: Vec<String>,
    distances: DistanceMatrix,
    edges: Vec<EdgeVariable>,
}

/// Build the MTZ formulation
pub fn build_tsp(input: &TspInput) -> Result<TspModel, TemplateError> {
    let distances = input.distance_matrix()?;
    let n = distances.len();
    let max_points = configuration::current().max_points;
    if n < 2 || n > max_points {
        return Err(TemplateError::Dimension(format!(
            "{} points given, between 2 and {} are supported",
            n, max_points
        )));
    }
    if !input.names.is_empty() && input.names.len() != n {
        return Err(TemplateError::Dimension(format!(
            "{} names given for {} points",
            input.names.len(),
            n
        )));
    }
    for &(from, to) in &input.blocked {
        if from == to {
            return Err(TemplateError::SelfLoop { point: from });
        }
        for point in [from, to] {
            if point >= n {
                return Err(TemplateError::UnknownPoint { point });
            }
        }
    }
    let names: Vec<String> = (0..n)
        .map(|i| name_or_default(input.names.get(i).map(String::as_str), format!("p{}", i)))
        .collect();

    let mut builder = ProblemBuilder::new_minimization().with_name("tsp");
    let mut edges = Vec::with_capacity(n * (n - 1));
    for from in 0..n {
        for to in (0..n).filter(|&to| to != from) {
            let index = builder.add_new_variable(
                &format!("x_{}_{}", from, to),
                None,
                VariableType::Binary,
                0.,
                1.,
            )?;
            builder.add_new_linear_objective_term(index, distances.get(from, to))?;
            edges.push(EdgeVariable { from, to, index });
        }
    }
    // point 0 is the reference, it has no ordinal
    let mut ordinals = vec![None; n];
    for (i, ordinal) in ordinals.iter_mut().enumerate().skip(1) {
        *ordinal = Some(builder.add_new_variable(
            &format!("u_{}", i),
            None,
            VariableType::Continuous,
            1.,
            (n - 1) as f64,
        )?);
    }

    for point in 0..n {
        let leaving: Vec<usize> = edges
            .iter()
            .filter(|e| e.from == point)
            .map(|e| e.index)
            .collect();
        let entering: Vec<usize> = edges
            .iter()
            .filter(|e| e.to == point)
            .map(|e| e.index)
            .collect();
        let ones = vec![1.; n - 1];
        let out_id = format!("out_{}", point);
        builder.add_new_constraint(&out_id, None, &leaving, &ones, Relation::Equal, 1.)?;
        let in_id = format!("in_{}", point);
        builder.add_new_constraint(&in_id, None, &entering, &ones, Relation::Equal, 1.)?;
    }

    let big_n = n as f64;
    for edge in &edges {
        if let (Some(u_from), Some(u_to)) = (ordinals[edge.from], ordinals[edge.to]) {
            builder.add_new_constraint(
                &format!("mtz_{}_{}", edge.from, edge.to),
                None,
                &[u_from, u_to, edge.index],
                &[1., -1., big_n],
                Relation::LessEqual,
                big_n - 1.,
            )?;
        }
    }

    for &(from, to) in &input.blocked {
        let edge = edges
            .iter()
            .find(|e| e.from == from && e.to == to)
            .ok_or(TemplateError::UnknownPoint { point: to })?;
        builder.add_new_constraint(
            &format!("blocked_{}_{}", from, to),
            None,
            &[edge.index],
            &[1.],
            Relation::Equal,
            0.,
        )?;
    }

    debug!(points = n, blocked = input.blocked.len(), "assembled tsp problem");
    Ok(TspModel {
        problem: builder.build()?,
        names,
        distances,
        edges,
    })
}

/// A closed route visiting every point once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tour {
    /// Points in visiting order, starting at point 0, the return leg is implied
    pub order: Vec<usize>,
    /// Names of the points in visiting order
    pub stops: Vec<String>,
    /// Traveled edges in visiting order, including the return leg
    pub edges: Vec<(usize, usize)>,
    /// Total distance
    pub length: f64,
}

impl Display for Tour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut route = self.stops.clone();
        if let Some(first) = self.stops.first() {
            route.push(first.clone());
        }
        write!(f, "{} (length {})", route.join(" -> "), self.length)
    }
}

/// The solved problem didn't give a usable tour
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TourError {
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("selected edges don't form a single tour: {0}")]
    NotATour(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TspOutcome {
    Optimal(Tour),
    Infeasible,
    Error(TourError),
}

impl TspOutcome {
    pub fn tour(&self) -> Option<&Tour> {
        match self {
            TspOutcome::Optimal(tour) => Some(tour),
            _ => None,
        }
    }
}

impl TspModel {
    /// The underlying optimization problem
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_points(&self) -> usize {
        self.names.len()
    }

    pub fn solve(&self, solver: &dyn Solver) -> TspOutcome {
        self.tour_from(self.problem.solve(solver))
    }

    pub fn solve_with_default(&self) -> TspOutcome {
        self.tour_from(self.problem.solve_with_default())
    }

    fn tour_from(&self, outcome: SolveOutcome) -> TspOutcome {
        match outcome {
            SolveOutcome::Optimal(solution) => match self.read_tour(&solution.values()) {
                Ok(tour) => {
                    info!(length = tour.length, "found tour");
                    TspOutcome::Optimal(tour)
                }
                Err(err) => {
                    warn!(error = %err, "solution isn't a tour");
                    TspOutcome::Error(err)
                }
            },
            SolveOutcome::Infeasible => TspOutcome::Infeasible,
            SolveOutcome::Error(err) => TspOutcome::Error(err.into()),
        }
    }

    /// Follow the selected edges from point 0 until the route closes
    ///
    /// Edge values must be within the configured integrality tolerance of 0 or 1.
    fn read_tour(&self, values: &[f64]) -> Result<Tour, TourError> {
        let n = self.num_points();
        let tolerance = configuration::current().integrality_tolerance;
        let mut successor = vec![None; n];
        for edge in &self.edges {
            let value = values[edge.index];
            if value.abs() <= tolerance {
                continue;
            }
            if (value - 1.).abs() > tolerance {
                return Err(TourError::NotATour(format!(
                    "edge ({}, {}) has the fractional value {}",
                    edge.from, edge.to, value
                )));
            }
            if successor[edge.from].replace(edge.to).is_some() {
                return Err(TourError::NotATour(format!(
                    "point {} is left more than once",
                    edge.from
                )));
            }
        }

        let mut order = vec![0];
        let mut visited = vec![false; n];
        visited[0] = true;
        let mut current = 0;
        loop {
            let next = successor[current].ok_or_else(|| {
                TourError::NotATour(format!("point {} is never left", current))
            })?;
            if next == 0 {
                break;
            }
            if visited[next] {
                return Err(TourError::NotATour(format!("point {} is visited twice", next)));
            }
            visited[next] = true;
            order.push(next);
            current = next;
        }
        if order.len() != n {
            return Err(TourError::NotATour(format!(
                "route through point 0 only visits {} of {} points",
                order.len(),
                n
            )));
        }

        let edges: Vec<(usize, usize)> = order
            .iter()
            .zip(order.iter().cycle().skip(1))
            .map(|(&from, &to)| (from, to))
            .collect();
        let length = edges.iter().map(|&(from, to)| self.distances.get(from, to)).sum();
        Ok(Tour {
            stops: order.iter().map(|&i| self.names[i].clone()).collect(),
            order,
            edges,
            length,
        })
    }
}
