//! # exsched-core: examination timetabling engine
//!
//! This crate solves the examination timetabling problem: every exam of a
//! university session gets a period and a set of rooms such that the hard
//! constraints (seating capacity, availability, exclusive room use, hard
//! distribution rules) hold, while a weighted sum of soft-constraint
//! penalties is minimized by iterative local search.
//!
//! The engine runs through phases: optional graph-coloring construction,
//! iterative forward-search construction, conflict-statistics/tabu repair,
//! hill climbing, simulated annealing or great deluge, and a closing
//! hill-climbing sweep over the restored best solution. All scoring goes
//! through [`criteria::Criterion`] implementations whose cached totals are
//! maintained incrementally by the assignment store.
//!
//! ## Quick example
//!
//! ```no_run
//! use exsched_core::config::SolverConfig;
//! use exsched_core::io::{ExamXmlLoader, ExamXmlWriter, ProblemLoader, SolutionWriter};
//! use exsched_core::solver::{Solution, Solver};
//! use std::sync::Arc;
//!
//! let mut config = SolverConfig::new();
//! config.set("Termination.MaxIters", "100000");
//! config.set("Termination.TimeOut", "30");
//! config.set("General.Seed", "42");
//!
//! let xml = std::fs::read_to_string("exam.xml")?;
//! let model = Arc::new(ExamXmlLoader.load(&xml, &config)?);
//! let mut solution = Solution::new(model);
//!
//! let mut solver = Solver::new(config)?;
//! solver.solve(&mut solution)?;
//!
//! println!("total value: {}", solution.total_value());
//! std::fs::write("solution.xml", ExamXmlWriter.save(&solution)?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assignment;
pub mod config;
pub mod construction;
pub mod criteria;
pub mod io;
pub mod model;
pub mod neighbours;
pub mod selection;
pub mod solver;

use config::{ConfigError, SolverConfig};
use io::{ExamXmlLoader, ProblemLoader};
use solver::{ParallelSolver, Solution, Solver};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the solver and its collaborators.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Unparseable input or a broken entity invariant. Fatal; the load is
    /// aborted.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Unknown key or unparseable value in the configuration. Fatal at
    /// solver start.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An incrementally maintained criterion total no longer matches the
    /// from-scratch recomputation; a criterion contract bug.
    #[error("criterion {criterion} drifted: cached {cached}, recomputed {fresh}")]
    InvariantViolation {
        criterion: String,
        cached: f64,
        fresh: f64,
    },

    /// External stop signal; the current iteration completes and the best
    /// solution is restored before this is reported.
    #[error("solver interrupted")]
    Interrupted,

    /// A worker thread failed.
    #[error("internal solver failure: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One-call front end: loads the problem named by `General.Input`, runs the
/// configured solver (parallel when `Parallel.NrSolvers` > 1) and returns the
/// solution with its best snapshot restored.
pub fn solve_problem(config: &SolverConfig) -> Result<Solution, SolverError> {
    config.validate_keys()?;
    let input = config
        .get("General.Input")
        .ok_or_else(|| SolverError::MalformedInput("General.Input not set".into()))?;
    let xml = std::fs::read_to_string(input)?;
    let model = Arc::new(ExamXmlLoader.load(&xml, config)?);

    let nr_solvers = config.get_usize("Parallel.NrSolvers", 1)?;
    if nr_solvers > 1 {
        ParallelSolver::new(config.clone())?.solve(model)
    } else {
        let mut solution = Solution::new(model);
        let mut solver = Solver::new(config.clone())?;
        solver.solve(&mut solution)?;
        Ok(solution)
    }
}
