//! Iterative forward-search construction.
//!
//! Repeatedly takes the most constrained unassigned exam and gives it the
//! placement with the lowest predicted delta, where evicting an already
//! placed exam costs extra in proportion to how often that exam has been
//! reassigned before. An exam whose retry budget runs out is left unassigned
//! for the repair phase.

use crate::model::ExamPlacement;
use crate::neighbours::{ExamSimpleNeighbour, Neighbour, NeighbourSelection};
use crate::solver::Solution;
use log::warn;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// Eviction surcharge per conflicting exam, scaled by its reassign count.
const EVICTION_COST: f64 = 100.0;

pub struct ExamConstruction {
    max_attempts: u32,
    attempts: Vec<u32>,
    given_up: HashSet<usize>,
}

impl ExamConstruction {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts: Vec::new(),
            given_up: HashSet::new(),
        }
    }
}

impl NeighbourSelection for ExamConstruction {
    fn name(&self) -> &'static str {
        "ExamConstruction"
    }

    fn init(&mut self, solution: &mut Solution) {
        self.attempts = vec![0; solution.model().exams().len()];
        self.given_up.clear();
    }

    fn select(
        &mut self,
        solution: &mut Solution,
        _rng: &mut ChaCha8Rng,
    ) -> Option<Box<dyn Neighbour>> {
        let model = solution.model_arc();
        loop {
            // Most constrained first: fewest allowed periods, biggest size.
            let exam = solution
                .assignment
                .unassigned_exams()
                .into_iter()
                .filter(|e| !self.given_up.contains(e))
                .min_by_key(|&e| {
                    (
                        model.exam(e).periods.len(),
                        std::cmp::Reverse(model.exam(e).size),
                    )
                })?;

            let mut best: Option<(f64, ExamPlacement, f64)> = None;
            for (period, _) in model.allowed_periods(exam) {
                let rooms = match model.best_rooms(&solution.assignment, exam, period, true) {
                    Some(rooms) => rooms,
                    None => continue,
                };
                let placement = ExamPlacement::new(exam, period, rooms);
                if !model.is_valid(&solution.assignment, &placement) {
                    continue;
                }
                let value = model.move_value(&solution.assignment, &placement);
                let eviction: f64 = model
                    .conflicts(&solution.assignment, &placement)
                    .iter()
                    .map(|&c| EVICTION_COST * (1.0 + self.attempts[c] as f64))
                    .sum();
                let score = value + eviction;
                if best.as_ref().is_none_or(|(s, _, _)| score < *s) {
                    best = Some((score, placement, value));
                }
            }

            match best {
                Some((_, placement, value)) => {
                    self.attempts[exam] += 1;
                    if self.attempts[exam] >= self.max_attempts {
                        self.given_up.insert(exam);
                    }
                    return Some(Box::new(ExamSimpleNeighbour::new(placement, value)));
                }
                None => {
                    warn!(
                        "construction: no feasible placement for exam {}",
                        model.exam(exam).external_id
                    );
                    self.given_up.insert(exam);
                }
            }
        }
    }
}
