//! Perturbation criteria for re-solving an existing timetable, plus the
//! violation counters that take over when hard preferences are softened.

use super::{Criterion, CriterionBase};
use crate::model::{ExamModel, ExamPlacement};

/// Exams moved away from their initial period.
pub struct PerturbationPenalty {
    base: CriterionBase,
}

impl PerturbationPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for PerturbationPenalty {
    fn name(&self) -> &'static str {
        "PerturbationPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        match &model.exam(q.exam).initial {
            Some((period, _)) if *period != q.period => 1.0,
            _ => 0.0,
        }
    }
}

/// Exams kept in their initial period but moved to different rooms.
pub struct RoomPerturbationPenalty {
    base: CriterionBase,
}

impl RoomPerturbationPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for RoomPerturbationPenalty {
    fn name(&self) -> &'static str {
        "RoomPerturbationPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        match &model.exam(q.exam).initial {
            Some((_, rooms)) if *rooms != q.rooms => 1.0,
            _ => 0.0,
        }
    }
}

/// Exams sitting in a period their preference list prohibits; active only
/// under `Exams.SoftPeriods`.
pub struct PeriodViolation {
    base: CriterionBase,
}

impl PeriodViolation {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for PeriodViolation {
    fn name(&self) -> &'static str {
        "PeriodViolation"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        if model.settings.soft_periods && model.exam(q.exam).period_weight(q.period).is_none() {
            1.0
        } else {
            0.0
        }
    }
}

/// Prohibited rooms in use; active only under `Exams.SoftRooms`. Each
/// prohibited room of the placement counts once.
pub struct RoomViolation {
    base: CriterionBase,
}

impl RoomViolation {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for RoomViolation {
    fn name(&self) -> &'static str {
        "RoomViolation"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        if !model.settings.soft_rooms {
            return 0.0;
        }
        let exam = model.exam(q.exam);
        q.rooms
            .iter()
            .filter(|&&room| exam.room_weight(room).is_none())
            .count() as f64
    }
}
