//! Conflict-based-statistics tabu repair.
//!
//! While exams remain unassigned, each step picks one of them and scores all
//! of its feasible placements by `value + β · cbs`, where the CBS table
//! remembers how often assigning that (exam, period) evicted other exams
//! before. A short tabu list blocks immediate reversals; a conflict-free
//! improving placement overrides the tabu (aspiration). The CBS table, tabu
//! list and idle counter live in an assignment context.

use crate::config::SolverConfig;
use crate::model::ExamPlacement;
use crate::neighbours::{ExamSimpleNeighbour, Neighbour, NeighbourSelection};
use crate::solver::Solution;
use crate::SolverError;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Default)]
struct TabuContext {
    list: VecDeque<(usize, usize)>,
    set: HashSet<(usize, usize)>,
    /// `(exam, period)` → how many evictions that assignment has caused.
    cbs: HashMap<(usize, usize), f64>,
    idle: u64,
}

impl TabuContext {
    fn push_tabu(&mut self, entry: (usize, usize), length: usize) {
        if length == 0 {
            return;
        }
        if self.set.insert(entry) {
            self.list.push_back(entry);
        }
        while self.list.len() > length {
            if let Some(old) = self.list.pop_front() {
                self.set.remove(&old);
            }
        }
    }
}

pub struct ExamTabuSearch {
    tabu_length: usize,
    max_idle: u64,
    cbs_weight: f64,
    component: Option<usize>,
}

impl ExamTabuSearch {
    pub fn from_config(config: &SolverConfig) -> Result<Self, SolverError> {
        Ok(Self {
            tabu_length: config.get_usize("Tabu.Length", 20)?,
            max_idle: config.get_u64("Tabu.MaxIdle", 10_000)?,
            cbs_weight: config.get_f64("Tabu.CbsWeight", 10.0)?,
            component: None,
        })
    }
}

impl NeighbourSelection for ExamTabuSearch {
    fn name(&self) -> &'static str {
        "ExamTabuSearch"
    }

    fn init(&mut self, solution: &mut Solution) {
        let component = solution.model().register_component();
        self.component = Some(component);
        solution
            .assignment
            .context_mut(component, TabuContext::default);
    }

    fn select(
        &mut self,
        solution: &mut Solution,
        rng: &mut ChaCha8Rng,
    ) -> Option<Box<dyn Neighbour>> {
        let component = match self.component {
            Some(c) => c,
            None => {
                self.init(solution);
                self.component?
            }
        };
        let model = solution.model_arc();
        loop {
            if solution.assignment.nr_unassigned() == 0 {
                return None;
            }
            let idle = solution
                .assignment
                .context::<TabuContext>(component)
                .map(|c| c.idle)
                .unwrap_or(0);
            if idle >= self.max_idle {
                return None;
            }

            let unassigned = solution.assignment.unassigned_exams();
            let exam = unassigned[rng.random_range(0..unassigned.len())];

            let mut best: Option<(f64, ExamPlacement, f64, bool)> = None;
            {
                let ctx = solution.assignment.context::<TabuContext>(component);
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
                    let conflict_free = model.conflicts(&solution.assignment, &placement).is_empty();
                    let tabu = ctx
                        .map(|c| c.set.contains(&(exam, period)))
                        .unwrap_or(false);
                    if tabu && !(conflict_free && value < 0.0) {
                        continue;
                    }
                    let cbs = ctx
                        .and_then(|c| c.cbs.get(&(exam, period)))
                        .copied()
                        .unwrap_or(0.0);
                    let score = value + self.cbs_weight * cbs;
                    if best.as_ref().is_none_or(|(s, _, _, _)| score < *s) {
                        best = Some((score, placement, value, conflict_free));
                    }
                }
            }

            let tabu_length = self.tabu_length;
            match best {
                Some((_, placement, value, conflict_free)) => {
                    let evictions = model.conflicts(&solution.assignment, &placement).len();
                    let entry = (exam, placement.period);
                    let ctx = solution
                        .assignment
                        .context_mut(component, TabuContext::default);
                    if evictions > 0 {
                        *ctx.cbs.entry(entry).or_insert(0.0) += evictions as f64;
                    }
                    ctx.push_tabu(entry, tabu_length);
                    if conflict_free {
                        ctx.idle = 0;
                    } else {
                        ctx.idle += 1;
                    }
                    return Some(Box::new(ExamSimpleNeighbour::new(placement, value)));
                }
                None => {
                    let ctx = solution
                        .assignment
                        .context_mut(component, TabuContext::default);
                    ctx.idle += 1;
                }
            }
        }
    }
}
