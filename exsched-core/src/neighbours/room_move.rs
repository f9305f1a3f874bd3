//! Room-only move: keep the period, replace the room set.

use super::{ExamSimpleNeighbour, Neighbour, NeighbourSelection};
use crate::model::ExamPlacement;
use crate::solver::Solution;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

pub struct ExamRoomMove {
    attempts: usize,
}

impl ExamRoomMove {
    pub fn new() -> Self {
        Self { attempts: 25 }
    }
}

impl Default for ExamRoomMove {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighbourSelection for ExamRoomMove {
    fn name(&self) -> &'static str {
        "ExamRoomMove"
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
            let current = match solution.assignment.placement(exam) {
                Some(p) => p.clone(),
                None => continue,
            };
            let rooms =
                match model.random_rooms(&solution.assignment, exam, current.period, false, rng) {
                    Some(rooms) => rooms,
                    None => continue,
                };
            let placement = ExamPlacement::new(exam, current.period, rooms);
            if placement == current {
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
