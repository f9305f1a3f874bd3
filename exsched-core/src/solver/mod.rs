//! Solver drivers and the solution they operate on.
//!
//! A [`Solution`] bundles the shared immutable model with one mutable
//! [`Assignment`] and the best snapshot taken so far. The single-threaded
//! [`Solver`] runs the iterate–select–apply loop; [`ParallelSolver`] runs one
//! such loop per worker against isolated assignments and promotes strict
//! improvements into a shared best slot.

mod display;
mod parallel;
mod termination;

pub use parallel::ParallelSolver;
pub use termination::{GeneralTermination, TerminationCondition};

use crate::assignment::Assignment;
use crate::config::SolverConfig;
use crate::criteria::Criterion;
use crate::model::{ExamModel, ExamPlacement};
use crate::neighbours::NeighbourSelection;
use crate::selection;
use crate::SolverError;
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

/// Tolerance for the cached-versus-recomputed criterion cross-check.
const DRIFT_TOLERANCE: f64 = 1e-6;

/// A snapshot of the best assignment seen so far.
#[derive(Debug, Clone)]
pub struct BestSnapshot {
    pub placements: Vec<Option<ExamPlacement>>,
    pub total: f64,
    pub unassigned: usize,
    pub iteration: u64,
    pub elapsed: f64,
}

/// Receives solution life-cycle events. Listeners observe; they never mutate
/// the assignment. All listeners see events in registration order.
pub trait SolutionListener: Send {
    fn best_saved(&mut self, solution: &Solution) {
        let _ = solution;
    }
    fn best_restored(&mut self, solution: &Solution) {
        let _ = solution;
    }
    fn best_cleared(&mut self, solution: &Solution) {
        let _ = solution;
    }
    fn solution_updated(&mut self, solution: &Solution) {
        let _ = solution;
    }
}

/// The model, the current assignment and the best snapshot.
pub struct Solution {
    model: Arc<ExamModel>,
    pub assignment: Assignment,
    pub iteration: u64,
    created: Instant,
    best: Option<BestSnapshot>,
}

impl Solution {
    pub fn new(model: Arc<ExamModel>) -> Self {
        let assignment = Assignment::new(&model);
        Self {
            model,
            assignment,
            iteration: 0,
            created: Instant::now(),
            best: None,
        }
    }

    pub fn model(&self) -> &ExamModel {
        &self.model
    }

    pub fn model_arc(&self) -> Arc<ExamModel> {
        Arc::clone(&self.model)
    }

    /// Seconds since this solution was created.
    pub fn elapsed(&self) -> f64 {
        self.created.elapsed().as_secs_f64()
    }

    pub fn total_value(&self) -> f64 {
        self.model.total_value(&self.assignment)
    }

    pub fn is_complete(&self) -> bool {
        self.assignment.nr_unassigned() == 0
    }

    /// Assigns a placement at the current iteration; see
    /// [`ExamModel::assign`] for the feasibility obligations.
    pub fn assign(&mut self, placement: ExamPlacement) {
        self.model
            .assign(&mut self.assignment, self.iteration, placement);
    }

    pub fn unassign(&mut self, exam: usize) -> Option<ExamPlacement> {
        self.model.unassign(&mut self.assignment, self.iteration, exam)
    }

    pub fn best(&self) -> Option<&BestSnapshot> {
        self.best.as_ref()
    }

    pub fn clear_best(&mut self) {
        self.best = None;
    }

    /// Saves the current assignment as best when `(unassigned, total)`
    /// lexicographically improves on the recorded best and the unassigned
    /// count passes the `General.SaveBestUnassigned` gate (−1 disables the
    /// gate). Returns whether a save happened.
    pub fn save_best_if_improved(&mut self, save_best_unassigned: i64) -> bool {
        let unassigned = self.assignment.nr_unassigned();
        if save_best_unassigned >= 0 && unassigned as i64 > save_best_unassigned {
            return false;
        }
        let total = self.total_value();
        let improved = match &self.best {
            None => true,
            Some(best) => {
                unassigned < best.unassigned
                    || (unassigned == best.unassigned && total < best.total)
            }
        };
        if improved {
            self.best = Some(BestSnapshot {
                placements: self.assignment.snapshot(),
                total,
                unassigned,
                iteration: self.iteration,
                elapsed: self.elapsed(),
            });
        }
        improved
    }

    /// Replays the best snapshot into the assignment. Differing exams are
    /// unassigned first so that every snapshot placement lands on free rooms;
    /// contexts stay exact because the replay goes through the regular
    /// assign/unassign events.
    pub fn restore_best(&mut self) {
        let placements = match &self.best {
            Some(best) => best.placements.clone(),
            None => return,
        };
        for exam in 0..placements.len() {
            let differs = match (&placements[exam], self.assignment.placement(exam)) {
                (Some(want), Some(have)) => want != have,
                (None, Some(_)) => true,
                _ => false,
            };
            if differs {
                self.unassign(exam);
            }
        }
        for placement in placements.into_iter().flatten() {
            if self.assignment.placement(placement.exam).is_none() {
                self.assign(placement);
            }
        }
    }

    /// Multi-line breakdown of the weighted total per criterion; criteria
    /// with a zero total are skipped.
    pub fn format_score_breakdown(&self) -> String {
        use std::fmt::Write as _;
        let mut out = format!(
            "total {:.2} ({} assigned, {} unassigned)\n",
            self.total_value(),
            self.assignment.nr_assigned(),
            self.assignment.nr_unassigned()
        );
        for criterion in self.model.criteria() {
            let total = criterion.total(&self.model, &self.assignment);
            if total != 0.0 {
                let _ = writeln!(
                    out,
                    "  {}: {:.2} (weight {})",
                    criterion.name(),
                    total,
                    criterion.weight()
                );
            }
        }
        out
    }

    /// Cross-checks every cached criterion total against the from-scratch
    /// recomputation.
    pub fn check_consistency(&self) -> Result<(), SolverError> {
        for criterion in self.model.criteria() {
            let cached = criterion.total(&self.model, &self.assignment);
            let fresh = criterion.compute_total(&self.model, &self.assignment);
            if (cached - fresh).abs() > DRIFT_TOLERANCE {
                return Err(SolverError::InvariantViolation {
                    criterion: criterion.name().to_string(),
                    cached,
                    fresh,
                });
            }
        }
        Ok(())
    }
}

/// Single-threaded iterative solver.
pub struct Solver {
    config: SolverConfig,
    stop: Arc<AtomicBool>,
    listeners: Vec<Box<dyn SolutionListener>>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        config.validate_keys()?;
        Ok(Self {
            config,
            stop: Arc::new(AtomicBool::new(false)),
            listeners: Vec::new(),
        })
    }

    /// Same solver with an externally owned stop flag (used by the parallel
    /// driver and by signal handlers).
    pub fn with_stop(config: SolverConfig, stop: Arc<AtomicBool>) -> Result<Self, SolverError> {
        let mut solver = Self::new(config)?;
        solver.stop = stop;
        Ok(solver)
    }

    /// Shared flag that requests a cooperative stop: the current iteration
    /// completes, the best solution is restored, and `solve` returns.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn add_listener(&mut self, listener: Box<dyn SolutionListener>) {
        self.listeners.push(listener);
    }

    /// Runs the search with the seed from `General.Seed`.
    pub fn solve(&mut self, solution: &mut Solution) -> Result<(), SolverError> {
        let seed = self.config.get_u64("General.Seed", 0)?;
        self.solve_seeded(solution, seed)
    }

    /// Runs the search with an explicit seed (each parallel worker offsets
    /// the master seed by its index).
    pub fn solve_seeded(&mut self, solution: &mut Solution, seed: u64) -> Result<(), SolverError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut root = selection::create_root(&self.config)?;
        root.init(solution);
        let termination = GeneralTermination::from_config(&self.config, self.stop.clone())?;
        let save_best_unassigned = self.config.get_i64("General.SaveBestUnassigned", -1)?;
        let log_frequency = self.config.get_u64("General.LogFrequency", 0)?;
        let validate = self.config.get_bool("General.ValidateInvariants", false)?
            || cfg!(feature = "invariant-checks");

        info!(
            "starting solver: seed={}, {} exams, {} periods, {} rooms",
            seed,
            solution.model().exams().len(),
            solution.model().periods().len(),
            solution.model().rooms().len()
        );

        loop {
            if !termination.can_continue(solution) && !root.on_termination(solution) {
                debug!("termination accepted at iteration {}", solution.iteration);
                break;
            }
            solution.iteration += 1;
            let neighbour = match root.select(solution, &mut rng) {
                Some(n) => n,
                None => {
                    debug!("no candidate at iteration {}", solution.iteration);
                    break;
                }
            };
            neighbour.assign(solution);
            for listener in &mut self.listeners {
                listener.solution_updated(solution);
            }
            if solution.save_best_if_improved(save_best_unassigned) {
                for listener in &mut self.listeners {
                    listener.best_saved(solution);
                }
            }
            if validate && solution.iteration % 1000 == 0 {
                solution.check_consistency()?;
            }
            if log_frequency > 0 && solution.iteration % log_frequency == 0 {
                info!(
                    "iter {}: total={:.2}, unassigned={}, best={:?}",
                    solution.iteration,
                    solution.total_value(),
                    solution.assignment.nr_unassigned(),
                    solution.best().map(|b| b.total)
                );
            }
        }

        // Shutdown: one canonical restore of whatever best exists.
        if solution.best().is_some() {
            solution.restore_best();
            for listener in &mut self.listeners {
                listener.best_restored(solution);
            }
        }
        if validate {
            solution.check_consistency()?;
        }
        info!(
            "solver finished after {} iterations in {:.2}s: total={:.2}, unassigned={}",
            solution.iteration,
            solution.elapsed(),
            solution.total_value(),
            solution.assignment.nr_unassigned()
        );
        debug!("final {}", solution.format_score_breakdown());
        Ok(())
    }
}
