//! The assignment store: exam → placement mapping plus derived tables.
//!
//! The assignment is the only authoritative record of what is placed where;
//! the occupancy tables, per-person conflict sets and cached criterion totals
//! it carries are caches maintained in lock-step by
//! [`ExamModel::assign`](crate::model::ExamModel::assign) /
//! [`ExamModel::unassign`](crate::model::ExamModel::unassign). The parallel
//! solver hands each worker its own exclusively-owned `Assignment`; there is
//! no shared mutable state inside one store.

mod context;

pub use context::{ContextStore, ValueContext};

use crate::model::{ExamModel, ExamPlacement};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ASSIGNMENT_ID: AtomicU64 = AtomicU64::new(0);

/// A mapping exam → optional placement with incrementally maintained
/// conflict tables.
pub struct Assignment {
    /// Monotone store id, allocated per construction.
    id: u64,
    placements: Vec<Option<ExamPlacement>>,
    nr_assigned: usize,
    /// `room_table[room][period]` → occupying exam. Rooms are exclusive.
    room_table: Vec<Vec<Option<usize>>>,
    /// Exams assigned to each period.
    period_exams: Vec<Vec<usize>>,
    /// `student_table[student][period]` → exams of that student placed there.
    student_table: Vec<Vec<Vec<usize>>>,
    /// Same per instructor.
    instructor_table: Vec<Vec<Vec<usize>>>,
    contexts: ContextStore,
    iteration: u64,
}

impl Assignment {
    pub fn new(model: &ExamModel) -> Self {
        let nr_periods = model.periods().len();
        Self {
            id: NEXT_ASSIGNMENT_ID.fetch_add(1, Ordering::Relaxed),
            placements: vec![None; model.exams().len()],
            nr_assigned: 0,
            room_table: vec![vec![None; nr_periods]; model.rooms().len()],
            period_exams: vec![Vec::new(); nr_periods],
            student_table: vec![vec![Vec::new(); nr_periods]; model.students().len()],
            instructor_table: vec![vec![Vec::new(); nr_periods]; model.instructors().len()],
            contexts: ContextStore::default(),
            iteration: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Iteration number of the last mutation.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    // === QUERIES ===

    pub fn placement(&self, exam: usize) -> Option<&ExamPlacement> {
        self.placements[exam].as_ref()
    }

    pub fn placements(&self) -> impl Iterator<Item = &ExamPlacement> {
        self.placements.iter().flatten()
    }

    pub fn nr_assigned(&self) -> usize {
        self.nr_assigned
    }

    pub fn nr_unassigned(&self) -> usize {
        self.placements.len() - self.nr_assigned
    }

    pub fn unassigned_exams(&self) -> Vec<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(e, _)| e)
            .collect()
    }

    pub fn room_occupant(&self, room: usize, period: usize) -> Option<usize> {
        self.room_table[room][period]
    }

    pub fn exams_in_period(&self, period: usize) -> &[usize] {
        &self.period_exams[period]
    }

    /// Exams of one student placed in one period; the incrementally
    /// maintained conflict set behind the student criteria.
    pub fn student_exams(&self, student: usize, period: usize) -> &[usize] {
        &self.student_table[student][period]
    }

    pub fn instructor_exams(&self, instructor: usize, period: usize) -> &[usize] {
        &self.instructor_table[instructor][period]
    }

    /// Copy of the placement vector, the form best snapshots are kept in.
    pub fn snapshot(&self) -> Vec<Option<ExamPlacement>> {
        self.placements.clone()
    }

    // === CONTEXTS ===

    pub fn context_mut<C: std::any::Any + Send>(
        &mut self,
        component: usize,
        init: impl FnOnce() -> C,
    ) -> &mut C {
        self.contexts.get_or_insert_with(component, init)
    }

    pub fn context<C: std::any::Any + Send>(&self, component: usize) -> Option<&C> {
        self.contexts.get(component)
    }

    /// Cached total of the criterion registered at `index`, zero before the
    /// first event.
    pub fn criterion_total(&self, index: usize) -> f64 {
        self.contexts
            .get::<ValueContext>(index)
            .map(|c| c.total)
            .unwrap_or(0.0)
    }

    // === MUTATION (driven by ExamModel::assign / unassign) ===

    /// Inserts a placement into all tables and credits each criterion's
    /// cached total with its marginal delta. `deltas` is aligned with the
    /// model's criteria order and was computed against the pre-insert state.
    pub(crate) fn insert(
        &mut self,
        model: &ExamModel,
        placement: ExamPlacement,
        deltas: &[f64],
        iteration: u64,
    ) {
        let exam = placement.exam;
        let period = placement.period;
        for &room in &placement.rooms {
            debug_assert!(self.room_table[room][period].is_none());
            self.room_table[room][period] = Some(exam);
        }
        self.period_exams[period].push(exam);
        for &student in &model.exam(exam).students {
            self.student_table[student][period].push(exam);
        }
        for &instructor in &model.exam(exam).instructors {
            self.instructor_table[instructor][period].push(exam);
        }
        self.placements[exam] = Some(placement);
        self.nr_assigned += 1;
        self.add_totals(deltas);
        self.iteration = iteration;
    }

    /// Removes the exam from all tables, returning its placement. The caller
    /// settles the criterion totals against the post-remove state.
    pub(crate) fn remove(
        &mut self,
        model: &ExamModel,
        exam: usize,
        iteration: u64,
    ) -> Option<ExamPlacement> {
        let placement = self.placements[exam].take()?;
        let period = placement.period;
        for &room in &placement.rooms {
            self.room_table[room][period] = None;
        }
        self.period_exams[period].retain(|&e| e != exam);
        for &student in &model.exam(exam).students {
            self.student_table[student][period].retain(|&e| e != exam);
        }
        for &instructor in &model.exam(exam).instructors {
            self.instructor_table[instructor][period].retain(|&e| e != exam);
        }
        self.nr_assigned -= 1;
        self.iteration = iteration;
        Some(placement)
    }

    fn add_totals(&mut self, deltas: &[f64]) {
        for (index, delta) in deltas.iter().enumerate() {
            self.contexts
                .get_or_insert_with(index, ValueContext::default)
                .total += delta;
        }
    }

    pub(crate) fn sub_totals(&mut self, deltas: &[f64]) {
        for (index, delta) in deltas.iter().enumerate() {
            self.contexts
                .get_or_insert_with(index, ValueContext::default)
                .total -= delta;
        }
    }
}
