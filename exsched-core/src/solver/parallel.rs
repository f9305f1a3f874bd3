//! Parallel solver: a fixed pool of independent workers over one model.
//!
//! Each worker owns a full `Solution` (assignment, contexts, RNG seeded from
//! the master seed plus the worker index) and runs the same phase-driven loop
//! as the single-threaded solver. Whenever a worker saves a new local best
//! that also beats the shared best, it promotes its snapshot under the single
//! shared mutex. Shutdown is cooperative: the stop flag lets every worker
//! finish its current iteration, and the canonical final read of the shared
//! slot happens after all workers joined.

use super::{Solution, SolutionListener, Solver};
use crate::config::{ConfigError, SolverConfig};
use crate::model::{ExamModel, ExamPlacement};
use crate::neighbours::NeighbourSelection;
use crate::selection;
use crate::SolverError;
use log::info;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

#[derive(Default)]
struct SharedBest {
    placements: Option<Vec<Option<ExamPlacement>>>,
    total: f64,
    unassigned: usize,
}

impl SharedBest {
    fn improves(&self, unassigned: usize, total: f64) -> bool {
        match self.placements {
            None => true,
            Some(_) => {
                unassigned < self.unassigned
                    || (unassigned == self.unassigned && total < self.total)
            }
        }
    }
}

fn lock_shared(shared: &Mutex<SharedBest>) -> MutexGuard<'_, SharedBest> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Promotes a worker's local best into the shared slot on strict improvement.
struct PromotingListener {
    shared: Arc<Mutex<SharedBest>>,
}

impl SolutionListener for PromotingListener {
    fn best_saved(&mut self, solution: &Solution) {
        let best = match solution.best() {
            Some(b) => b,
            None => return,
        };
        let mut shared = lock_shared(&self.shared);
        if shared.improves(best.unassigned, best.total) {
            shared.placements = Some(best.placements.clone());
            shared.total = best.total;
            shared.unassigned = best.unassigned;
        }
    }
}

pub struct ParallelSolver {
    config: SolverConfig,
    stop: Arc<AtomicBool>,
}

impl ParallelSolver {
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        config.validate_keys()?;
        Ok(Self {
            config,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Runs `Parallel.NrSolvers` workers and returns a solution carrying the
    /// globally best snapshot.
    pub fn solve(&self, model: Arc<ExamModel>) -> Result<Solution, SolverError> {
        let nr_solvers = self.config.get_usize("Parallel.NrSolvers", 1)?.max(1);
        let master_seed = self.config.get_u64("General.Seed", 0)?;

        // Order-dependent selections cannot run side by side; rejected here
        // rather than mid-run.
        let probe = selection::create_root(&self.config)?;
        if nr_solvers > 1 && !probe.supports_parallel() {
            return Err(ConfigError::InvalidValue {
                key: "Parallel.NrSolvers".into(),
                value: nr_solvers.to_string(),
                expected: "a selection that supports parallel execution",
            }
            .into());
        }
        drop(probe);

        let shared = Arc::new(Mutex::new(SharedBest::default()));
        let mut workers = Vec::with_capacity(nr_solvers);
        info!("starting {} workers, master seed {}", nr_solvers, master_seed);
        for worker in 0..nr_solvers {
            let config = self.config.clone();
            let stop = self.stop.clone();
            let shared = Arc::clone(&shared);
            let model = Arc::clone(&model);
            let handle = thread::Builder::new()
                .name(format!("solver-{}", worker))
                .spawn(move || -> Result<(), SolverError> {
                    let mut solver = Solver::with_stop(config, stop)?;
                    solver.add_listener(Box::new(PromotingListener { shared }));
                    let mut solution = Solution::new(model);
                    solver.solve_seeded(&mut solution, master_seed + worker as u64)
                })?;
            workers.push(handle);
        }

        let mut first_error = None;
        for handle in workers {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => first_error = first_error.or(Some(e)),
                Err(_) => {
                    first_error =
                        first_error.or(Some(SolverError::Internal("worker panicked".into())))
                }
            }
        }
        if let Some(error) = first_error {
            return Err(error);
        }

        // All workers joined; this is the one canonical final read.
        let best = lock_shared(&shared);
        let mut solution = Solution::new(model);
        if let Some(placements) = best.placements.clone() {
            for placement in placements.into_iter().flatten() {
                solution.assign(placement);
            }
            solution.save_best_if_improved(-1);
            info!(
                "parallel best: total={:.2}, unassigned={}",
                best.total, best.unassigned
            );
        }
        Ok(solution)
    }
}
