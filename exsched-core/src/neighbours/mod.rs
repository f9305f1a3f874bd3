//! Neighbourhood moves: reversible deltas against the current assignment.
//!
//! A [`Neighbour`] carries one candidate placement change together with its
//! predicted weighted delta; applying it unassigns the conflicting exams and
//! assigns the new placement. Move generators are [`NeighbourSelection`]s
//! that propose candidates without mutating the assignment; acceptance is the
//! wrapping phase's business.

mod random_move;
mod room_move;
mod time_move;

pub use random_move::ExamRandomMove;
pub use room_move::ExamRoomMove;
pub use time_move::ExamTimeMove;

use crate::model::ExamPlacement;
use crate::solver::Solution;
use rand_chacha::ChaCha8Rng;

/// A reversible delta over the assignment.
pub trait Neighbour: Send {
    /// Predicted weighted criterion delta of applying this move.
    fn value(&self, solution: &Solution) -> f64;

    /// Exams that must be unassigned for this move to be feasible.
    fn conflicts(&self, solution: &Solution) -> Vec<usize>;

    /// Applies the move: evicts the conflicts, then assigns.
    fn assign(&self, solution: &mut Solution);
}

/// The standard neighbour: one exam gets one new placement.
pub struct ExamSimpleNeighbour {
    placement: ExamPlacement,
    value: f64,
}

impl ExamSimpleNeighbour {
    pub fn new(placement: ExamPlacement, value: f64) -> Self {
        Self { placement, value }
    }

    pub fn placement(&self) -> &ExamPlacement {
        &self.placement
    }
}

impl Neighbour for ExamSimpleNeighbour {
    fn value(&self, _solution: &Solution) -> f64 {
        self.value
    }

    fn conflicts(&self, solution: &Solution) -> Vec<usize> {
        solution
            .model()
            .conflicts(&solution.assignment, &self.placement)
    }

    fn assign(&self, solution: &mut Solution) {
        for exam in self.conflicts(solution) {
            solution.unassign(exam);
        }
        solution.assign(self.placement.clone());
    }
}

/// Proposes neighbours; phases own acceptance. Implementations keep their
/// per-assignment caches in the assignment's context store, never in
/// assignment-independent fields.
pub trait NeighbourSelection: Send {
    fn name(&self) -> &'static str;

    /// Called when the wrapping phase (re)enters this selection.
    fn init(&mut self, solution: &mut Solution);

    /// Next candidate, or `None` when this selection is exhausted.
    fn select(
        &mut self,
        solution: &mut Solution,
        rng: &mut ChaCha8Rng,
    ) -> Option<Box<dyn Neighbour>>;

    /// One-shot message posted when the outer termination condition first
    /// rejects continuation. Returning `true` claims a final sweep and keeps
    /// the solver running until `select` reports no candidate.
    fn on_termination(&mut self, solution: &mut Solution) -> bool {
        let _ = solution;
        false
    }

    /// Whether this selection may run under the parallel solver.
    fn supports_parallel(&self) -> bool {
        true
    }
}
