//! Fully random placement move.

use super::{ExamSimpleNeighbour, Neighbour, NeighbourSelection};
use crate::model::ExamPlacement;
use crate::solver::Solution;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

/// Picks a random exam, a random allowed period and a feasible room set.
/// Conflict-free by construction; gives up after a bounded retry budget.
pub struct ExamRandomMove {
    attempts: usize,
}

impl ExamRandomMove {
    pub fn new() -> Self {
        Self { attempts: 25 }
    }
}

impl Default for ExamRandomMove {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighbourSelection for ExamRandomMove {
    fn name(&self) -> &'static str {
        "ExamRandomMove"
    }

    fn init(&mut self, _solution: &mut Solution) {}

    fn select(
        &mut self,
        solution: &mut Solution,
        rng: &mut ChaCha8Rng,
    ) -> Option<Box<dyn Neighbour>> {
        let model = solution.model_arc();
        let nr_exams = model.exams().len();
        if nr_exams == 0 {
            return None;
        }
        for _ in 0..self.attempts {
            let exam = rng.random_range(0..nr_exams);
            let periods = model.allowed_periods(exam);
            if periods.is_empty() {
                continue;
            }
            let (period, _) = periods[rng.random_range(0..periods.len())];
            let rooms = match model.random_rooms(&solution.assignment, exam, period, false, rng) {
                Some(rooms) => rooms,
                None => continue,
            };
            let placement = ExamPlacement::new(exam, period, rooms);
            if solution.assignment.placement(exam) == Some(&placement) {
                continue;
            }
            if !model.is_valid(&solution.assignment, &placement) {
                continue;
            }
            let value = model.move_value(&solution.assignment, &placement);
            return Some(Box::new(ExamSimpleNeighbour::new(placement, value)));
        }
        None
    }
}
