//! The multi-phase controller.
//!
//! Sequences graph-coloring construction, forward-search construction,
//! CBS/tabu repair, hill climbing and the configured metaheuristic. A phase
//! advances exactly when its selection reports no candidate; the phase index
//! never decreases. The final hill-climbing sweep is latched by the one-shot
//! termination message and runs over the restored best assignment.

use crate::config::SolverConfig;
use crate::construction::{ColoringConstruction, ExamConstruction};
use crate::neighbours::{Neighbour, NeighbourSelection};
use crate::selection::{self, ExamGreatDeluge, ExamHillClimbing, ExamSimulatedAnnealing, ExamTabuSearch, DEFAULT_NEIGHBOURS};
use crate::solver::Solution;
use crate::SolverError;
use log::info;
use rand_chacha::ChaCha8Rng;

/// Search phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Init,
    Coloring,
    Construction,
    Repair,
    HillClimb,
    Meta,
    Final,
    Done,
}

impl Phase {
    /// Numeric index; `Final` sits far above the iterative phases.
    pub fn index(&self) -> i32 {
        match self {
            Phase::Init => -1,
            Phase::Coloring | Phase::Construction => 0,
            Phase::Repair => 1,
            Phase::HillClimb => 2,
            Phase::Meta => 3,
            Phase::Final => 9999,
            Phase::Done => 10000,
        }
    }
}

pub struct ExamNeighbourSelection {
    phase: Phase,
    coloring: Option<ColoringConstruction>,
    construction: ExamConstruction,
    repair: ExamTabuSearch,
    hill: ExamHillClimbing,
    meta: Box<dyn NeighbourSelection>,
    final_sweep: ExamHillClimbing,
    final_granted: bool,
}

impl ExamNeighbourSelection {
    pub fn from_config(config: &SolverConfig) -> Result<Self, SolverError> {
        let coloring = if config.get_bool("Exam.ColoringConstruction", false)? {
            Some(ColoringConstruction::new())
        } else {
            None
        };
        let meta: Box<dyn NeighbourSelection> = if config.get_bool("Exam.GreatDeluge", false)? {
            Box::new(ExamGreatDeluge::from_config(config)?)
        } else {
            Box::new(ExamSimulatedAnnealing::from_config(config)?)
        };
        let final_generators =
            selection::create_list(DEFAULT_NEIGHBOURS, config)?;
        Ok(Self {
            phase: Phase::Init,
            coloring,
            construction: ExamConstruction::new(
                config.get_u64("Construction.MaxAttempts", 50)? as u32,
            ),
            repair: ExamTabuSearch::from_config(config)?,
            hill: ExamHillClimbing::from_config(config)?,
            meta,
            final_sweep: ExamHillClimbing::new(
                "ExamFinalHillClimbing",
                final_generators,
                config.get_u64("Final.MaxIdle", 1000)?,
            ),
            final_granted: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn advance(&mut self, to: Phase, solution: &mut Solution) {
        info!(
            "phase {:?} ({}) -> {:?} ({}) at iteration {}, unassigned {}",
            self.phase,
            self.phase.index(),
            to,
            to.index(),
            solution.iteration,
            solution.assignment.nr_unassigned()
        );
        self.phase = to;
    }
}

impl NeighbourSelection for ExamNeighbourSelection {
    fn name(&self) -> &'static str {
        "ExamNeighbourSelection"
    }

    fn init(&mut self, _solution: &mut Solution) {
        self.phase = Phase::Init;
        self.final_granted = false;
    }

    fn select(
        &mut self,
        solution: &mut Solution,
        rng: &mut ChaCha8Rng,
    ) -> Option<Box<dyn Neighbour>> {
        loop {
            match self.phase {
                Phase::Init => {
                    if let Some(coloring) = &mut self.coloring {
                        coloring.init(solution);
                        self.advance(Phase::Coloring, solution);
                    } else {
                        self.construction.init(solution);
                        self.advance(Phase::Construction, solution);
                    }
                }
                Phase::Coloring => {
                    if let Some(coloring) = &mut self.coloring {
                        if let Some(neighbour) = coloring.select(solution, rng) {
                            return Some(neighbour);
                        }
                    }
                    self.construction.init(solution);
                    self.advance(Phase::Construction, solution);
                }
                Phase::Construction => match self.construction.select(solution, rng) {
                    Some(neighbour) => return Some(neighbour),
                    None => {
                        self.repair.init(solution);
                        self.advance(Phase::Repair, solution);
                    }
                },
                Phase::Repair => match self.repair.select(solution, rng) {
                    Some(neighbour) => return Some(neighbour),
                    None => {
                        self.hill.init(solution);
                        self.advance(Phase::HillClimb, solution);
                    }
                },
                Phase::HillClimb => match self.hill.select(solution, rng) {
                    Some(neighbour) => return Some(neighbour),
                    None => {
                        self.meta.init(solution);
                        self.advance(Phase::Meta, solution);
                    }
                },
                Phase::Meta => match self.meta.select(solution, rng) {
                    Some(neighbour) => return Some(neighbour),
                    None => {
                        self.advance(Phase::Done, solution);
                        return None;
                    }
                },
                Phase::Final => match self.final_sweep.select(solution, rng) {
                    Some(neighbour) => return Some(neighbour),
                    None => {
                        self.advance(Phase::Done, solution);
                        return None;
                    }
                },
                Phase::Done => return None,
            }
        }
    }

    fn on_termination(&mut self, solution: &mut Solution) -> bool {
        if self.final_granted {
            // The final sweep keeps the solver alive only while it runs.
            return self.phase == Phase::Final;
        }
        self.final_granted = true;
        solution.restore_best();
        self.final_sweep.init(solution);
        self.advance(Phase::Final, solution);
        true
    }
}
