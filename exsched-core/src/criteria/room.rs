//! Room-related unary criteria.

use super::{Criterion, CriterionBase};
use crate::model::{ExamModel, ExamPlacement};

/// Exam-and-room preference weights of the assigned room set.
pub struct RoomPenalty {
    base: CriterionBase,
}

impl RoomPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for RoomPenalty {
    fn name(&self) -> &'static str {
        "RoomPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        let exam = model.exam(q.exam);
        q.rooms
            .iter()
            .map(|&room| {
                let pref = exam.room_weight(room).unwrap_or(0);
                (pref + model.room(room).period_weights[q.period]) as f64
            })
            .sum()
    }
}

/// Wasted seats: seating capacity of the room set beyond the exam size.
pub struct RoomSizePenalty {
    base: CriterionBase,
}

impl RoomSizePenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for RoomSizePenalty {
    fn name(&self) -> &'static str {
        "RoomSizePenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        let exam = model.exam(q.exam);
        let capacity: usize = q
            .rooms
            .iter()
            .map(|&room| model.room(room).capacity(exam.alt_seating))
            .sum();
        capacity.saturating_sub(exam.size) as f64
    }
}

/// Quadratic penalty for splitting an exam across several rooms.
pub struct RoomSplitPenalty {
    base: CriterionBase,
}

impl RoomSplitPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for RoomSplitPenalty {
    fn name(&self) -> &'static str {
        "RoomSplitPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, _model: &ExamModel, q: &ExamPlacement) -> f64 {
        q.split_penalty()
    }
}

/// Worst pairwise distance inside a split room set.
pub struct RoomSplitDistancePenalty {
    base: CriterionBase,
}

impl RoomSplitDistancePenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for RoomSplitDistancePenalty {
    fn name(&self) -> &'static str {
        "RoomSplitDistancePenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        if q.rooms.len() < 2 {
            return 0.0;
        }
        let mut max = 0.0f64;
        for (i, &r1) in q.rooms.iter().enumerate() {
            for &r2 in &q.rooms[i + 1..] {
                max = max.max(model.room_distance(r1, r2));
            }
        }
        max
    }
}
