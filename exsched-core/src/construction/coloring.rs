//! Graph-coloring construction.
//!
//! Builds the conflict graph (an edge between exams sharing a student, an
//! instructor, or a hard period-separating distribution constraint) and
//! colors it DSATUR-style: the uncolored exam with the most
//! differently-colored neighbours goes first, ties broken by degree and then
//! by size descending. Rooms are chosen largest-fit-first; exams with no
//! conflict-free feasible period are left for the repair phase.

use crate::model::{DistributionType, ExamPlacement};
use crate::neighbours::{ExamSimpleNeighbour, Neighbour, NeighbourSelection};
use crate::solver::Solution;
use log::warn;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

pub struct ColoringConstruction {
    adjacency: Vec<Vec<usize>>,
    skipped: HashSet<usize>,
}

impl ColoringConstruction {
    pub fn new() -> Self {
        Self {
            adjacency: Vec::new(),
            skipped: HashSet::new(),
        }
    }

    fn build_adjacency(&mut self, solution: &Solution) {
        let model = solution.model();
        let nr_exams = model.exams().len();
        let mut edges: Vec<HashSet<usize>> = vec![HashSet::new(); nr_exams];
        let mut connect_all = |exams: &[usize], edges: &mut Vec<HashSet<usize>>| {
            for (i, &e1) in exams.iter().enumerate() {
                for &e2 in &exams[i + 1..] {
                    if e1 != e2 {
                        edges[e1].insert(e2);
                        edges[e2].insert(e1);
                    }
                }
            }
        };
        for person in model.students().iter().chain(model.instructors()) {
            connect_all(&person.exams, &mut edges);
        }
        for dc in model.distributions() {
            if !dc.hard {
                continue;
            }
            let separates = matches!(
                dc.dtype,
                DistributionType::DifferentPeriod
                    | DistributionType::DifferentDay
                    | DistributionType::Precedence
            );
            if separates {
                connect_all(&dc.exams, &mut edges);
            }
        }
        self.adjacency = edges
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect();
    }

    /// Periods already taken by colored neighbours of an exam.
    fn neighbour_periods(&self, solution: &Solution, exam: usize) -> HashSet<usize> {
        self.adjacency[exam]
            .iter()
            .filter_map(|&other| solution.assignment.placement(other))
            .map(|p| p.period)
            .collect()
    }
}

impl Default for ColoringConstruction {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighbourSelection for ColoringConstruction {
    fn name(&self) -> &'static str {
        "ExamColoringConstruction"
    }

    fn init(&mut self, solution: &mut Solution) {
        self.skipped.clear();
        self.build_adjacency(solution);
    }

    fn select(
        &mut self,
        solution: &mut Solution,
        _rng: &mut ChaCha8Rng,
    ) -> Option<Box<dyn Neighbour>> {
        let model = solution.model_arc();
        loop {
            // DSATUR pick: max saturation, ties by degree, then size.
            let exam = (0..model.exams().len())
                .filter(|&e| {
                    solution.assignment.placement(e).is_none() && !self.skipped.contains(&e)
                })
                .max_by_key(|&e| {
                    (
                        self.neighbour_periods(solution, e).len(),
                        self.adjacency[e].len(),
                        model.exam(e).size,
                    )
                })?;

            let taken = self.neighbour_periods(solution, exam);
            let mut chosen = None;
            for (period, _) in model.allowed_periods(exam) {
                if taken.contains(&period) {
                    continue;
                }
                let rooms = match model.best_rooms(&solution.assignment, exam, period, false) {
                    Some(rooms) => rooms,
                    None => continue,
                };
                let placement = ExamPlacement::new(exam, period, rooms);
                if model.is_valid(&solution.assignment, &placement) {
                    chosen = Some(placement);
                    break;
                }
            }
            match chosen {
                Some(placement) => {
                    let value = model.move_value(&solution.assignment, &placement);
                    return Some(Box::new(ExamSimpleNeighbour::new(placement, value)));
                }
                None => {
                    warn!(
                        "coloring: no conflict-free period for exam {}",
                        model.exam(exam).external_id
                    );
                    self.skipped.insert(exam);
                }
            }
        }
    }
}
