//! Person-based conflict criteria, instantiated for students and instructors.

use super::{Criterion, CriterionBase, People};
use crate::assignment::Assignment;
use crate::model::{ExamModel, ExamPlacement};
use std::collections::HashSet;

/// Pairs of exams of one person placed in the same period.
pub struct DirectConflicts {
    base: CriterionBase,
    people: People,
    name: &'static str,
}

impl DirectConflicts {
    pub fn new(people: People, weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
            people,
            name: match people {
                People::Students => "StudentDirectConflicts",
                People::Instructors => "InstructorDirectConflicts",
            },
        }
    }
}

impl Criterion for DirectConflicts {
    fn name(&self) -> &'static str {
        self.name
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
        let mut conflicts = 0usize;
        for &person in self.people.of(model, q.exam) {
            for &other in self.people.exams_at(assignment, person, q.period) {
                if other != q.exam && !removed.contains(&other) {
                    conflicts += 1;
                }
            }
        }
        conflicts as f64
    }

    fn compute_total(&self, model: &ExamModel, assignment: &Assignment) -> f64 {
        let mut total = 0usize;
        for person in self.people.all(model) {
            for period in 0..model.periods().len() {
                let k = self.people.exams_at(assignment, person.id, period).len();
                total += k * k.saturating_sub(1) / 2;
            }
        }
        total as f64
    }

    fn bounds(&self, model: &ExamModel, _assignment: &Assignment) -> (f64, f64) {
        let max: usize = self
            .people
            .all(model)
            .iter()
            .map(|p| p.exams.len() * p.exams.len().saturating_sub(1) / 2)
            .sum();
        (0.0, max as f64)
    }
}

/// Pairs of exams of one person in back-to-back periods.
pub struct BackToBackConflicts {
    base: CriterionBase,
    people: People,
    name: &'static str,
}

impl BackToBackConflicts {
    pub fn new(people: People, weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
            people,
            name: match people {
                People::Students => "StudentBackToBackConflicts",
                People::Instructors => "InstructorBackToBackConflicts",
            },
        }
    }

    fn adjacent_periods(&self, model: &ExamModel, period: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(2);
        if period > 0 && model.is_back_to_back(period - 1, period) {
            out.push(period - 1);
        }
        if period + 1 < model.periods().len() && model.is_back_to_back(period, period + 1) {
            out.push(period + 1);
        }
        out
    }
}

impl Criterion for BackToBackConflicts {
    fn name(&self) -> &'static str {
        self.name
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
        let mut conflicts = 0usize;
        let adjacent = self.adjacent_periods(model, q.period);
        for &person in self.people.of(model, q.exam) {
            for &period in &adjacent {
                for &other in self.people.exams_at(assignment, person, period) {
                    if other != q.exam && !removed.contains(&other) {
                        conflicts += 1;
                    }
                }
            }
        }
        conflicts as f64
    }

    fn compute_total(&self, model: &ExamModel, assignment: &Assignment) -> f64 {
        let mut total = 0usize;
        for person in self.people.all(model) {
            for period in 1..model.periods().len() {
                if model.is_back_to_back(period - 1, period) {
                    total += self.people.exams_at(assignment, person.id, period - 1).len()
                        * self.people.exams_at(assignment, person.id, period).len();
                }
            }
        }
        total as f64
    }
}

/// Student back-to-back pairs whose rooms are further apart than the
/// configured distance limit. Disabled while the limit is negative.
pub struct DistanceBackToBackConflicts {
    base: CriterionBase,
}

impl DistanceBackToBackConflicts {
    pub fn new(weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
        }
    }

    fn is_distant(&self, model: &ExamModel, a: &ExamPlacement, b: &ExamPlacement) -> bool {
        let limit = model.settings.back_to_back_distance;
        limit >= 0.0 && model.placement_distance(a, b) > limit
    }
}

impl Criterion for DistanceBackToBackConflicts {
    fn name(&self) -> &'static str {
        "StudentDistanceBackToBackConflicts"
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
        if model.settings.back_to_back_distance < 0.0 {
            return 0.0;
        }
        let mut conflicts = 0usize;
        let mut adjacent = Vec::with_capacity(2);
        if q.period > 0 && model.is_back_to_back(q.period - 1, q.period) {
            adjacent.push(q.period - 1);
        }
        if q.period + 1 < model.periods().len() && model.is_back_to_back(q.period, q.period + 1) {
            adjacent.push(q.period + 1);
        }
        for &person in &model.exam(q.exam).students {
            for &period in &adjacent {
                for &other in assignment.student_exams(person, period) {
                    if other == q.exam || removed.contains(&other) {
                        continue;
                    }
                    if let Some(other_placement) = assignment.placement(other) {
                        if self.is_distant(model, q, other_placement) {
                            conflicts += 1;
                        }
                    }
                }
            }
        }
        conflicts as f64
    }

    fn compute_total(&self, model: &ExamModel, assignment: &Assignment) -> f64 {
        if model.settings.back_to_back_distance < 0.0 {
            return 0.0;
        }
        let mut total = 0usize;
        for person in model.students() {
            for period in 1..model.periods().len() {
                if !model.is_back_to_back(period - 1, period) {
                    continue;
                }
                for &e1 in assignment.student_exams(person.id, period - 1) {
                    for &e2 in assignment.student_exams(person.id, period) {
                        if let (Some(p1), Some(p2)) =
                            (assignment.placement(e1), assignment.placement(e2))
                        {
                            if self.is_distant(model, p1, p2) {
                                total += 1;
                            }
                        }
                    }
                }
            }
        }
        total as f64
    }
}

/// People with three or more exams on one day; each exam past the second
/// counts once.
pub struct MoreThan2ADay {
    base: CriterionBase,
    people: People,
    name: &'static str,
}

impl MoreThan2ADay {
    pub fn new(people: People, weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
            people,
            name: match people {
                People::Students => "StudentMoreThan2ADay",
                People::Instructors => "InstructorMoreThan2ADay",
            },
        }
    }
}

impl Criterion for MoreThan2ADay {
    fn name(&self) -> &'static str {
        self.name
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
        let day = model.period(q.period).day_index;
        let mut value = 0usize;
        for &person in self.people.of(model, q.exam) {
            let existing: usize = model
                .day_periods(day)
                .iter()
                .map(|&period| {
                    self.people
                        .exams_at(assignment, person, period)
                        .iter()
                        .filter(|&&e| e != q.exam && !removed.contains(&e))
                        .count()
                })
                .sum();
            if existing >= 2 {
                value += 1;
            }
        }
        value as f64
    }

    fn compute_total(&self, model: &ExamModel, assignment: &Assignment) -> f64 {
        let mut total = 0usize;
        for person in self.people.all(model) {
            for day in 0..model.nr_days() {
                let k: usize = model
                    .day_periods(day)
                    .iter()
                    .map(|&period| self.people.exams_at(assignment, person.id, period).len())
                    .sum();
                total += k.saturating_sub(2);
            }
        }
        total as f64
    }
}

/// Exams placed in periods their students (or instructors) cannot attend.
pub struct NotAvailable {
    base: CriterionBase,
    people: People,
    name: &'static str,
}

impl NotAvailable {
    pub fn new(people: People, weight: f64) -> Self {
        Self {
            base: CriterionBase { index: 0, weight },
            people,
            name: match people {
                People::Students => "StudentNotAvailable",
                People::Instructors => "InstructorNotAvailable",
            },
        }
    }
}

impl Criterion for NotAvailable {
    fn name(&self) -> &'static str {
        self.name
    }
    fn base(&self) -> &CriterionBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut CriterionBase {
        &mut self.base
    }

    fn placement_value(&self, model: &ExamModel, q: &ExamPlacement) -> f64 {
        self.people
            .of(model, q.exam)
            .iter()
            .filter(|&&person| !self.people.person(model, person).is_available(q.period))
            .count() as f64
    }
}
