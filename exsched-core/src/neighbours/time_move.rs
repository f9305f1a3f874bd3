//! Period move: change the period, keep the room set when it still fits.

use super::{ExamSimpleNeighbour, Neighbour, NeighbourSelection};
use crate::model::ExamPlacement;
use crate::solver::Solution;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

pub struct ExamTimeMove {
    attempts: usize,
}

impl ExamTimeMove {
    pub fn new() -> Self {
        Self { attempts: 25 }
    }
}

impl Default for ExamTimeMove {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighbourSelection for ExamTimeMove {
    fn name(&self) -> &'static str {
        "ExamTimeMove"
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
            let periods = model.allowed_periods(exam);
            if periods.len() < 2 {
                continue;
            }
            let (period, _) = periods[rng.random_range(0..periods.len())];
            if period == current.period {
                continue;
            }
            // Keep the current rooms when they are free and still valid in
            // the new period; fall back to a fresh random room set.
            let keep_rooms = current.rooms.iter().all(|&room| {
                model.room(room).available[period]
                    && solution
                        .assignment
                        .room_occupant(room, period)
                        .is_none_or(|occ| occ == exam)
            });
            let rooms = if keep_rooms {
                current.rooms.clone()
            } else {
                match model.random_rooms(&solution.assignment, exam, period, false, rng) {
                    Some(rooms) => rooms,
                    None => continue,
                }
            };
            let placement = ExamPlacement::new(exam, period, rooms);
            if !model.is_valid(&solution.assignment, &placement) {
                continue;
            }
            let value = model.move_value(&solution.assignment, &placement);
            return Some(Box::new(ExamSimpleNeighbour::new(placement, value)));
        }
        None
    }
}
