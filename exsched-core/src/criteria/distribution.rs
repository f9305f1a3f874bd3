//! Distribution-constraint criteria.

use super::{Criterion, CriterionBase};
use crate::assignment::Assignment;
use crate::model::{ExamModel, ExamPlacement};
use std::collections::HashSet;

/// Shared pair walk: violated pairs between `q` and the assigned partners of
/// its constraints, filtered to hard or soft constraints. Each violated pair
/// is scored by `score(constraint_weight)`.
fn violated_pairs(
    model: &ExamModel,
    assignment: &Assignment,
    q: &ExamPlacement,
    removed: &HashSet<usize>,
    hard: bool,
    score: impl Fn(f64) -> f64,
) -> f64 {
    let mut value = 0.0;
    for &d in &model.exam(q.exam).distributions {
        let dc = model.distribution(d);
        if dc.hard != hard {
            continue;
        }
        let pos = match dc.position(q.exam) {
            Some(p) => p,
            None => continue,
        };
        for (other_pos, &other) in dc.exams.iter().enumerate() {
            if other == q.exam || removed.contains(&other) {
                continue;
            }
            if let Some(other_placement) = assignment.placement(other) {
                let satisfied = if other_pos < pos {
                    dc.is_satisfied_pair(model, other_placement, q)
                } else {
                    dc.is_satisfied_pair(model, q, other_placement)
                };
                if !satisfied {
                    value += score(dc.weight);
                }
            }
        }
    }
    value
}

fn total_violated_pairs(
    model: &ExamModel,
    assignment: &Assignment,
    hard: bool,
    score: impl Fn(f64) -> f64,
) -> f64 {
    let mut total = 0.0;
    for dc in model.distributions() {
        if dc.hard != hard {
            continue;
        }
        for (i, &e1) in dc.exams.iter().enumerate() {
            for &e2 in &dc.exams[i + 1..] {
                if let (Some(p1), Some(p2)) = (assignment.placement(e1), assignment.placement(e2))
                {
                    if !dc.is_satisfied_pair(model, p1, p2) {
                        total += score(dc.weight);
                    }
                }
            }
        }
    }
    total
}

/// Weighted violations of soft distribution constraints.
pub struct DistributionPenalty {
    base: CriterionBase,
}

impl DistributionPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for DistributionPenalty {
    fn name(&self) -> &'static str {
        "DistributionPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn contribution(
        &self,
        model: &ExamModel,
        assignment: &Assignment,
        q: &ExamPlacement,
        removed: &HashSet<usize>,
    ) -> f64 {
        violated_pairs(model, assignment, q, removed, false, |w| w)
    }

    fn compute_total(&self, model: &ExamModel, assignment: &Assignment) -> f64 {
        total_violated_pairs(model, assignment, false, |w| w)
    }
}

/// Breached hard distribution constraints, counted (not weighted) when
/// `Exams.SoftDistributions` demotes them to soft.
pub struct DistributionViolation {
    base: CriterionBase,
}

impl DistributionViolation {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for DistributionViolation {
    fn name(&self) -> &'static str {
        "DistributionViolation"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn contribution(
        &self,
        model: &ExamModel,
        assignment: &Assignment,
        q: &ExamPlacement,
        removed: &HashSet<usize>,
    ) -> f64 {
        if !model.settings.soft_distributions {
            return 0.0;
        }
        violated_pairs(model, assignment, q, removed, true, |_| 1.0)
    }

    fn compute_total(&self, model: &ExamModel, assignment: &Assignment) -> f64 {
        if !model.settings.soft_distributions {
            return 0.0;
        }
        total_violated_pairs(model, assignment, true, |_| 1.0)
    }
}
