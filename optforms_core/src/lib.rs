//! Optimization model templates
//!
//! Small, structured problem descriptions (a generic LP/MIP, diet blending, resource
//! allocation and the traveling salesman problem) are turned into immutable
//! [`Problem`](optimize::problem::Problem)s, which are handed to an external solver
//! library. Every solve ends in a [`SolveOutcome`](optimize::SolveOutcome): an optimal
//! assignment, proven infeasibility, or a solver error.

pub mod configuration;
pub mod io;
pub mod optimize;
pub mod templates;
