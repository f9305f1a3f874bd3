//! The criteria framework: weighted, incrementally maintained scorers.
//!
//! Every criterion is stateless; its running total per assignment lives in a
//! [`ValueContext`](crate::assignment::ValueContext) slot of the assignment's
//! context store. The contract every implementation must honor:
//!
//! - `contribution(m, a, q, removed)` is the marginal value of placement `q`
//!   being assigned, given that the exams in `removed` are treated as gone.
//!   It must run in time proportional to the local neighbourhood of `q`.
//! - `value(m, a, p, conflicts)` is the delta of unassigning `conflicts` and
//!   then assigning `p`; the default sums marginals so that every pair is
//!   counted exactly once.
//! - `compute_total` recomputes the closed-form total; it must equal the sum
//!   of sequential marginals over any assign/unassign history (the invariant
//!   the tests pin down).

mod conflicts;
mod distribution;
mod period;
mod perturbation;
mod room;

pub use conflicts::{BackToBackConflicts, DirectConflicts, DistanceBackToBackConflicts, MoreThan2ADay, NotAvailable};
pub use distribution::{DistributionPenalty, DistributionViolation};
pub use period::{ExamRotationPenalty, LargeExamsPenalty, PeriodIndexPenalty, PeriodPenalty, PeriodSizePenalty};
pub use perturbation::{PeriodViolation, PerturbationPenalty, RoomPerturbationPenalty, RoomViolation};
pub use room::{RoomPenalty, RoomSizePenalty, RoomSplitDistancePenalty, RoomSplitPenalty};

use crate::assignment::Assignment;
use crate::config::SolverConfig;
use crate::model::{ExamModel, ExamPlacement, ModelSettings, Person};
use crate::SolverError;
use std::collections::HashSet;

/// Registration slot and weight shared by all criteria.
#[derive(Debug, Clone, Copy)]
pub struct CriterionBase {
    pub index: usize,
    pub weight: f64,
}

/// A named, weighted scorer with an incremental delta contract.
pub trait Criterion: Send + Sync {
    fn name(&self) -> &'static str;
    fn base(&self) -> &CriterionBase;
    fn base_mut(&mut self) -> &mut CriterionBase;

    fn weight(&self) -> f64 {
        self.base().weight
    }

    /// Context slot index, assigned at registration.
    fn index(&self) -> usize {
        self.base().index
    }

    /// Marginal value of `q` being assigned, with `removed` treated as
    /// unassigned. Unary criteria leave the default, which ignores `removed`.
    fn contribution(
        &self,
        model: &ExamModel,
        assignment: &Assignment,
        q: &ExamPlacement,
        removed: &HashSet<usize>,
    ) -> f64 {
        let _ = (assignment, removed);
        self.placement_value(model, q)
    }

    /// Assignment-independent value of a single placement; the whole story
    /// for unary criteria.
    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        let _ = (model, q);
        0.0
    }

    /// Delta if `conflicts` were unassigned and `placement` assigned. The
    /// exam's own current placement must be part of `conflicts` when it is
    /// assigned.
    fn value(
        &self,
        model: &ExamModel,
        assignment: &Assignment,
        placement: &ExamPlacement,
        conflicts: &[ExamPlacement],
    ) -> f64 {
        let mut removed = HashSet::new();
        let mut delta = 0.0;
        for conflict in conflicts {
            delta -= self.contribution(model, assignment, conflict, &removed);
            removed.insert(conflict.exam);
        }
        delta + self.contribution(model, assignment, placement, &removed)
    }

    /// Cached total under the assignment.
    fn total(&self, _model: &ExamModel, assignment: &Assignment) -> f64 {
        assignment.criterion_total(self.index())
    }

    /// Total recomputed from scratch; the oracle for the cached value.
    fn compute_total(&self, model: &ExamModel, assignment: &Assignment) -> f64 {
        assignment
            .placements()
            .map(|p| self.placement_value(model, p))
            .sum()
    }

    /// `(min, max)` used for normalization and reporting.
    fn bounds(&self, model: &ExamModel, assignment: &Assignment) -> (f64, f64) {
        let _ = (model, assignment);
        (0.0, f64::INFINITY)
    }
}

/// Which population a person-based criterion scores over. The student and
/// instructor variants of each conflict criterion differ only in this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum People {
    Students,
    Instructors,
}

impl People {
    pub fn of<'a>(&self, model: &'a ExamModel, exam: usize) -> &'a [usize] {
        match self {
            People::Students => &model.exam(exam).students,
            People::Instructors => &model.exam(exam).instructors,
        }
    }

    pub fn exams_at<'a>(
        &self,
        assignment: &'a Assignment,
        person: usize,
        period: usize,
    ) -> &'a [usize] {
        match self {
            People::Students => assignment.student_exams(person, period),
            People::Instructors => assignment.instructor_exams(person, period),
        }
    }

    pub fn all<'a>(&self, model: &'a ExamModel) -> &'a [Person] {
        match self {
            People::Students => model.students(),
            People::Instructors => model.instructors(),
        }
    }

    pub fn person<'a>(&self, model: &'a ExamModel, id: usize) -> &'a Person {
        match self {
            People::Students => model.student(id),
            People::Instructors => model.instructor(id),
        }
    }
}

/// Builds the full criteria roster with weights from the configuration.
/// Order is fixed; the position doubles as the context slot index.
pub fn register_all(
    config: &SolverConfig,
    settings: &ModelSettings,
) -> Result<Vec<Box<dyn Criterion>>, SolverError> {
    let _ = settings;
    let mut out: Vec<Box<dyn Criterion>> = Vec::new();

    fn push(out: &mut Vec<Box<dyn Criterion>>, mut c: Box<dyn Criterion>) {
        c.base_mut().index = out.len();
        out.push(c);
    }

    let w = |key: &str, default: f64| config.get_f64(key, default);

    push(
        &mut out,
        Box::new(DirectConflicts::new(
            People::Students,
            w("Exams.DirectConflictWeight", 1000.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(NotAvailable::new(
            People::Students,
            w("Exams.NotAvailableWeight", 5000.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(BackToBackConflicts::new(
            People::Students,
            w("Exams.BackToBackConflictWeight", 10.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(DistanceBackToBackConflicts::new(
            w("Exams.DistanceBackToBackConflictWeight", 25.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(MoreThan2ADay::new(
            People::Students,
            w("Exams.MoreThan2ADayWeight", 100.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(DirectConflicts::new(
            People::Instructors,
            w("Exams.InstructorDirectConflictWeight", 1000.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(NotAvailable::new(
            People::Instructors,
            w("Exams.InstructorNotAvailableWeight", 5000.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(BackToBackConflicts::new(
            People::Instructors,
            w("Exams.InstructorBackToBackConflictWeight", 10.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(MoreThan2ADay::new(
            People::Instructors,
            w("Exams.InstructorMoreThan2ADayWeight", 100.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(PeriodPenalty::new(w("Exams.PeriodWeight", 1.0)?)),
    );
    push(
        &mut out,
        Box::new(PeriodIndexPenalty::new(w("Exams.PeriodIndexWeight", 0.0)?)),
    );
    push(
        &mut out,
        Box::new(PeriodSizePenalty::new(w("Exams.PeriodSizeWeight", 0.0)?)),
    );
    push(&mut out, Box::new(RoomPenalty::new(w("Exams.RoomWeight", 1.0)?)));
    push(
        &mut out,
        Box::new(RoomSizePenalty::new(w("Exams.RoomSizeWeight", 0.001)?)),
    );
    push(
        &mut out,
        Box::new(RoomSplitPenalty::new(w("Exams.RoomSplitWeight", 10.0)?)),
    );
    push(
        &mut out,
        Box::new(RoomSplitDistancePenalty::new(
            w("Exams.RoomSplitDistanceWeight", 0.01)?,
        )),
    );
    push(
        &mut out,
        Box::new(LargeExamsPenalty::new(w("Exams.LargeWeight", 5000.0)?)),
    );
    push(
        &mut out,
        Box::new(ExamRotationPenalty::new(w("Exams.RotationWeight", 0.001)?)),
    );
    push(
        &mut out,
        Box::new(DistributionPenalty::new(w("Exams.DistributionWeight", 1.0)?)),
    );
    push(
        &mut out,
        Box::new(PerturbationPenalty::new(w("Exams.PerturbationWeight", 0.0)?)),
    );
    push(
        &mut out,
        Box::new(RoomPerturbationPenalty::new(
            w("Exams.RoomPerturbationWeight", 0.0)?,
        )),
    );
    push(
        &mut out,
        Box::new(PeriodViolation::new(w("Exams.PeriodViolationWeight", 500.0)?)),
    );
    push(
        &mut out,
        Box::new(RoomViolation::new(w("Exams.RoomViolationWeight", 500.0)?)),
    );
    push(
        &mut out,
        Box::new(DistributionViolation::new(
            w("Exams.DistributionViolationWeight", 500.0)?,
        )),
    );

    Ok(out)
}
