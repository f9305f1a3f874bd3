//! Period-related unary criteria.

use super::{Criterion, CriterionBase};
use crate::model::{ExamModel, ExamPlacement};

/// Combined period preference of a placement: the exam-specific weight plus
/// the period's global weight. A softened prohibited period contributes no
/// preference here; [`super::PeriodViolation`] accounts for it.
fn period_weight(model: &ExamModel, q: &ExamPlacement) -> f64 {
    let exam_pref = model.exam(q.exam).period_weight(q.period).unwrap_or(0);
    (exam_pref + model.period(q.period).weight) as f64
}

/// Exam-and-period preference weights of the assigned periods.
pub struct PeriodPenalty {
    base: CriterionBase,
}

impl PeriodPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for PeriodPenalty {
    fn name(&self) -> &'static str {
        "PeriodPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        period_weight(model, q)
    }
}

/// Index of the assigned period; favors front-loading the session.
pub struct PeriodIndexPenalty {
    base: CriterionBase,
}

impl PeriodIndexPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for PeriodIndexPenalty {
    fn name(&self) -> &'static str {
        "PeriodIndexPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        model.period(q.period).id as f64
    }
}

/// Period preference scaled by exam size, so moving a big exam out of a bad
/// period pays more than moving a small one.
pub struct PeriodSizePenalty {
    base: CriterionBase,
}

impl PeriodSizePenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for PeriodSizePenalty {
    fn name(&self) -> &'static str {
        "PeriodSizePenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        period_weight(model, q) * model.exam(q.exam).size as f64
    }
}

/// Large exams placed after the configured fraction of the period range.
pub struct LargeExamsPenalty {
    base: CriterionBase,
}

impl LargeExamsPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for LargeExamsPenalty {
    fn name(&self) -> &'static str {
        "LargeExamsPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        if !model.exam(q.exam).large {
            return 0.0;
        }
        let threshold =
            (model.settings.large_period_fraction * model.periods().len() as f64) as usize;
        if model.period(q.period).id >= threshold {
            1.0
        } else {
            0.0
        }
    }
}

/// Year-over-year rotation: exams with a historical average period are pushed
/// towards the opposite end of the session.
pub struct ExamRotationPenalty {
    base: CriterionBase,
}

impl ExamRotationPenalty {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }
}

impl Criterion for ExamRotationPenalty {
    fn name(&self) -> &'static str {
        "ExamRotationPenalty"
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        match model.exam(q.exam).average_period {
            Some(average) => ((model.period(q.period).id + 1) * (average as usize + 1)) as f64,
            None => 0.0,
        }
    }
}
