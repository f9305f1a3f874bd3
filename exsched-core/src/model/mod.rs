//! The examination timetabling model: entities, domains and scoring.
//!
//! The model is immutable after [`ModelBuilder::build`] and shared read-only
//! between solver workers. It owns all entities, the criteria registry and
//! the precomputed room distance matrix; the mutable search state lives in
//! [`crate::assignment::Assignment`].

mod distribution;
mod entities;

pub use distribution::{DistributionConstraint, DistributionType};
pub use entities::{Exam, ExamPlacement, Period, PeriodPref, Person, Room, RoomPref};

use crate::assignment::Assignment;
use crate::config::SolverConfig;
use crate::criteria::{self, Criterion};
use crate::SolverError;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::RngExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ordering weight used for prohibited periods/rooms when the corresponding
/// softening flag is on; keeps them at the very end of every domain.
const SOFTENED_WEIGHT: i32 = 1000;

/// Problem-semantics knobs read from the configuration at build time.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// When set, periods on different days can still count as back-to-back.
    pub day_break_back_to_back: bool,
    /// Distance limit for the distance back-to-back criterion; negative
    /// disables the criterion.
    pub back_to_back_distance: f64,
    /// Exams of at least this size are `large`; 0 disables the notion.
    pub large_size: usize,
    /// Fraction of the period range after which a large exam is penalized.
    pub large_period_fraction: f64,
    /// Prohibited periods become soft violations instead of domain holes.
    pub soft_periods: bool,
    /// Prohibited rooms become soft violations instead of domain holes.
    pub soft_rooms: bool,
    /// Hard distribution constraints become counted soft violations.
    pub soft_distributions: bool,
    /// Default room-split maximum for exams that do not override it.
    pub max_rooms: usize,
}

impl ModelSettings {
    pub fn from_config(config: &SolverConfig) -> Result<Self, SolverError> {
        Ok(Self {
            day_break_back_to_back: config.get_bool("Exams.IsDayBreakBackToBack", false)?,
            back_to_back_distance: config.get_f64("Exams.BackToBackDistance", -1.0)?,
            large_size: config.get_usize("Exams.LargeSize", 0)?,
            large_period_fraction: config.get_f64("Exams.LargePeriod", 0.67)?,
            soft_periods: config.get_bool("Exams.SoftPeriods", false)?,
            soft_rooms: config.get_bool("Exams.SoftRooms", false)?,
            soft_distributions: config.get_bool("Exams.SoftDistributions", false)?,
            max_rooms: config.get_usize("Exams.MaxRooms", 4)?,
        })
    }
}

/// The immutable problem model.
pub struct ExamModel {
    exams: Vec<Exam>,
    periods: Vec<Period>,
    rooms: Vec<Room>,
    students: Vec<Person>,
    instructors: Vec<Person>,
    distributions: Vec<DistributionConstraint>,

    exam_index: HashMap<String, usize>,
    period_index: HashMap<String, usize>,
    room_index: HashMap<String, usize>,

    /// Periods of each calendar day, day-indexed.
    day_periods: Vec<Vec<usize>>,
    /// Pairwise Euclidean room distances; zero when coordinates are missing.
    room_distances: Vec<Vec<f64>>,

    criteria: Vec<Box<dyn Criterion>>,
    criterion_index: HashMap<&'static str, usize>,
    /// Context component id allocator; criteria occupy `0..criteria.len()`.
    components: AtomicUsize,

    pub settings: ModelSettings,
}

impl std::fmt::Debug for ExamModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamModel")
            .field("exams", &self.exams)
            .field("periods", &self.periods)
            .field("rooms", &self.rooms)
            .field("students", &self.students)
            .field("instructors", &self.instructors)
            .field("distributions", &self.distributions)
            .field("exam_index", &self.exam_index)
            .field("period_index", &self.period_index)
            .field("room_index", &self.room_index)
            .field("day_periods", &self.day_periods)
            .field("room_distances", &self.room_distances)
            .field("criteria_count", &self.criteria.len())
            .field("criterion_index", &self.criterion_index)
            .field("components", &self.components)
            .field("settings", &self.settings)
            .finish()
    }
}

impl ExamModel {
    // === ENTITY ACCESS ===

    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }
    pub fn exam(&self, id: usize) -> &Exam {
        &self.exams[id]
    }
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }
    pub fn period(&self, id: usize) -> &Period {
        &self.periods[id]
    }
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }
    pub fn room(&self, id: usize) -> &Room {
        &self.rooms[id]
    }
    pub fn students(&self) -> &[Person] {
        &self.students
    }
    pub fn student(&self, id: usize) -> &Person {
        &self.students[id]
    }
    pub fn instructors(&self) -> &[Person] {
        &self.instructors
    }
    pub fn instructor(&self, id: usize) -> &Person {
        &self.instructors[id]
    }
    pub fn distributions(&self) -> &[DistributionConstraint] {
        &self.distributions
    }
    pub fn distribution(&self, id: usize) -> &DistributionConstraint {
        &self.distributions[id]
    }

    pub fn exam_by_external(&self, external_id: &str) -> Option<usize> {
        self.exam_index.get(external_id).copied()
    }
    pub fn period_by_external(&self, external_id: &str) -> Option<usize> {
        self.period_index.get(external_id).copied()
    }
    pub fn room_by_external(&self, external_id: &str) -> Option<usize> {
        self.room_index.get(external_id).copied()
    }

    pub fn nr_days(&self) -> usize {
        self.day_periods.len()
    }
    pub fn day_periods(&self, day: usize) -> &[usize] {
        &self.day_periods[day]
    }

    // === DISTANCES AND ADJACENCY ===

    /// Physical distance between two rooms.
    pub fn room_distance(&self, r1: usize, r2: usize) -> f64 {
        self.room_distances[r1][r2]
    }

    /// Worst-case walking distance between two placements: the maximum over
    /// all room pairs of the two room sets.
    pub fn placement_distance(&self, a: &ExamPlacement, b: &ExamPlacement) -> f64 {
        let mut max = 0.0f64;
        for &ra in &a.rooms {
            for &rb in &b.rooms {
                max = max.max(self.room_distance(ra, rb));
            }
        }
        max
    }

    /// Whether two periods count as back-to-back: adjacent in the global
    /// order and, unless day breaks are bridged, on the same day.
    pub fn is_back_to_back(&self, p1: usize, p2: usize) -> bool {
        let (a, b) = (&self.periods[p1], &self.periods[p2]);
        if a.id.abs_diff(b.id) != 1 {
            return false;
        }
        self.settings.day_break_back_to_back || a.day_index == b.day_index
    }

    // === CRITERIA ===

    pub fn criteria(&self) -> &[Box<dyn Criterion>] {
        &self.criteria
    }

    pub fn criterion(&self, name: &str) -> Option<&dyn Criterion> {
        self.criterion_index
            .get(name)
            .map(|&i| self.criteria[i].as_ref())
    }

    /// Hands out a fresh context component id (criteria take the first
    /// `criteria.len()` slots at registration).
    pub fn register_component(&self) -> usize {
        self.components.fetch_add(1, Ordering::Relaxed)
    }

    /// Total weighted criterion value of the assignment, from cached totals.
    pub fn total_value(&self, assignment: &Assignment) -> f64 {
        self.criteria
            .iter()
            .map(|c| c.weight() * c.total(self, assignment))
            .sum()
    }

    /// Total weighted criterion value recomputed from scratch; the oracle
    /// the cached totals are validated against.
    pub fn total_value_from_scratch(&self, assignment: &Assignment) -> f64 {
        self.criteria
            .iter()
            .map(|c| c.weight() * c.compute_total(self, assignment))
            .sum()
    }

    // === DOMAIN ===

    /// Candidate periods of an exam in static heuristic order (best first).
    /// With `Exams.SoftPeriods` on, prohibited periods trail the list.
    pub fn allowed_periods(&self, exam: usize) -> Vec<(usize, i32)> {
        let ex = &self.exams[exam];
        let mut out: Vec<(usize, i32)> = ex.periods.iter().map(|p| (p.period, p.weight)).collect();
        if self.settings.soft_periods {
            for period in 0..self.periods.len() {
                if ex.period_weight(period).is_none() {
                    out.push((period, SOFTENED_WEIGHT));
                }
            }
        }
        out.sort_by_key(|&(period, weight)| (weight, period));
        out
    }

    /// Candidate rooms of an exam at one period: available, allowed (or
    /// softened) and, unless `allow_occupied`, currently free.
    fn candidate_rooms(
        &self,
        assignment: &Assignment,
        exam: usize,
        period: usize,
        allow_occupied: bool,
    ) -> Vec<(usize, i32, usize)> {
        let ex = &self.exams[exam];
        let mut out = Vec::new();
        let mut push = |room: usize, weight: i32| {
            let r = &self.rooms[room];
            if !r.available[period] {
                return;
            }
            let cap = r.capacity(ex.alt_seating);
            if cap == 0 {
                return;
            }
            if !allow_occupied {
                if let Some(occ) = assignment.room_occupant(room, period) {
                    if occ != exam {
                        return;
                    }
                }
            }
            out.push((room, weight + r.period_weights[period], cap));
        };
        for pref in &ex.rooms {
            push(pref.room, pref.weight);
        }
        if self.settings.soft_rooms {
            for room in 0..self.rooms.len() {
                if ex.room_weight(room).is_none() {
                    push(room, SOFTENED_WEIGHT);
                }
            }
        }
        out
    }

    /// Deterministically picks the best room set for an exam at a period:
    /// the least-penalized, tightest-fitting single room when one suffices,
    /// otherwise a greedy largest-fit-first split.
    pub fn best_rooms(
        &self,
        assignment: &Assignment,
        exam: usize,
        period: usize,
        allow_occupied: bool,
    ) -> Option<Vec<usize>> {
        let ex = &self.exams[exam];
        let candidates = self.candidate_rooms(assignment, exam, period, allow_occupied);
        let single = candidates
            .iter()
            .filter(|&&(_, _, cap)| cap >= ex.size)
            .min_by_key(|&&(room, weight, cap)| (weight, cap - ex.size, room));
        if let Some(&(room, _, _)) = single {
            return Some(vec![room]);
        }
        self.greedy_split(ex, candidates)
    }

    /// Random room-set selection for move generators: a uniformly chosen
    /// fitting single room, or a shuffled greedy split as fallback.
    pub fn random_rooms<R: Rng>(
        &self,
        assignment: &Assignment,
        exam: usize,
        period: usize,
        allow_occupied: bool,
        rng: &mut R,
    ) -> Option<Vec<usize>> {
        let ex = &self.exams[exam];
        let mut candidates = self.candidate_rooms(assignment, exam, period, allow_occupied);
        let singles: Vec<usize> = candidates
            .iter()
            .filter(|&&(_, _, cap)| cap >= ex.size)
            .map(|&(room, _, _)| room)
            .collect();
        if !singles.is_empty() {
            return Some(vec![singles[rng.random_range(0..singles.len())]]);
        }
        candidates.shuffle(rng);
        // A shuffled greedy pass keeps the room choice diverse; the sorted
        // pass below is the completeness fallback.
        let mut total = 0usize;
        let mut set = Vec::new();
        for &(room, _, cap) in &candidates {
            if set.len() == ex.max_rooms {
                break;
            }
            set.push(room);
            total += cap;
            if total >= ex.size {
                return Some(set);
            }
        }
        self.greedy_split(ex, candidates)
    }

    fn greedy_split(&self, ex: &Exam, mut candidates: Vec<(usize, i32, usize)>) -> Option<Vec<usize>> {
        if ex.max_rooms < 2 {
            return None;
        }
        candidates.sort_by_key(|&(room, weight, cap)| (std::cmp::Reverse(cap), weight, room));
        let mut total = 0usize;
        let mut set = Vec::new();
        for &(room, _, cap) in &candidates {
            if set.len() == ex.max_rooms {
                break;
            }
            set.push(room);
            total += cap;
            if total >= ex.size {
                return Some(set);
            }
        }
        None
    }

    /// Smallest number of rooms any feasible split of this exam can use.
    pub fn min_rooms(&self, exam: usize) -> usize {
        let ex = &self.exams[exam];
        let mut caps: Vec<usize> = ex
            .rooms
            .iter()
            .map(|p| self.rooms[p.room].capacity(ex.alt_seating))
            .collect();
        caps.sort_unstable_by(|a, b| b.cmp(a));
        let mut total = 0usize;
        for (i, cap) in caps.iter().enumerate() {
            total += cap;
            if total >= ex.size {
                return i + 1;
            }
        }
        caps.len().max(1)
    }

    // === FEASIBILITY ===

    /// Validates the hard-feasibility predicates of a placement, ignoring
    /// room occupancy (occupants are reported by [`Self::conflicts`]).
    pub fn validate_placement(
        &self,
        assignment: &Assignment,
        placement: &ExamPlacement,
    ) -> Result<(), &'static str> {
        let ex = &self.exams[placement.exam];
        if placement.rooms.is_empty() {
            return Err("no room assigned");
        }
        if placement.rooms.len() > ex.max_rooms {
            return Err("room split above the exam's maximum");
        }
        if !self.settings.soft_periods && ex.period_weight(placement.period).is_none() {
            return Err("period prohibited for the exam");
        }
        let mut capacity = 0usize;
        for &room in &placement.rooms {
            let r = &self.rooms[room];
            if !r.available[placement.period] {
                return Err("room unavailable in the period");
            }
            if !self.settings.soft_rooms && ex.room_weight(room).is_none() {
                return Err("room prohibited for the exam");
            }
            capacity += r.capacity(ex.alt_seating);
        }
        if capacity < ex.size {
            return Err("room set below the exam size");
        }
        if !self.settings.soft_distributions {
            for &d in &ex.distributions {
                let dc = &self.distributions[d];
                if !dc.hard {
                    continue;
                }
                if !self.distribution_holds(assignment, dc, placement) {
                    return Err("hard distribution constraint violated");
                }
            }
        }
        Ok(())
    }

    /// Whether a hard distribution constraint stays satisfied if `placement`
    /// replaced the current value of its exam.
    fn distribution_holds(
        &self,
        assignment: &Assignment,
        dc: &DistributionConstraint,
        placement: &ExamPlacement,
    ) -> bool {
        let pos = match dc.position(placement.exam) {
            Some(p) => p,
            None => return true,
        };
        for (other_pos, &other) in dc.exams.iter().enumerate() {
            if other == placement.exam {
                continue;
            }
            if let Some(other_placement) = assignment.placement(other) {
                let ok = if other_pos < pos {
                    dc.is_satisfied_pair(self, other_placement, placement)
                } else {
                    dc.is_satisfied_pair(self, placement, other_placement)
                };
                if !ok {
                    return false;
                }
            }
        }
        true
    }

    pub fn is_valid(&self, assignment: &Assignment, placement: &ExamPlacement) -> bool {
        self.validate_placement(assignment, placement).is_ok()
    }

    /// Exams currently occupying any room of the placement in its period.
    pub fn conflicts(&self, assignment: &Assignment, placement: &ExamPlacement) -> Vec<usize> {
        let mut out = Vec::new();
        for &room in &placement.rooms {
            if let Some(occ) = assignment.room_occupant(room, placement.period) {
                if occ != placement.exam && !out.contains(&occ) {
                    out.push(occ);
                }
            }
        }
        out
    }

    // === ASSIGN / UNASSIGN ===

    /// Assigns a placement, replacing the exam's previous value. Every room
    /// of the placement must be free of other exams and the placement must be
    /// hard-feasible; violating either is a caller bug.
    ///
    /// # Panics
    ///
    /// Panics on an infeasible placement or an occupied room.
    pub fn assign(&self, assignment: &mut Assignment, iteration: u64, placement: ExamPlacement) {
        if assignment.placement(placement.exam).is_some() {
            self.unassign(assignment, iteration, placement.exam);
        }
        if let Err(reason) = self.validate_placement(assignment, &placement) {
            panic!(
                "infeasible placement for exam {}: {}",
                self.exams[placement.exam].external_id, reason
            );
        }
        if let Some(other) = self.conflicts(assignment, &placement).first() {
            panic!(
                "rooms of exam {} still occupied by exam {}",
                self.exams[placement.exam].external_id, self.exams[*other].external_id
            );
        }
        let deltas: Vec<f64> = self
            .criteria
            .iter()
            .map(|c| c.value(self, assignment, &placement, &[]))
            .collect();
        assignment.insert(self, placement, &deltas, iteration);
    }

    /// Removes the exam's value, if any. Unassigning an unassigned exam is a
    /// no-op.
    pub fn unassign(
        &self,
        assignment: &mut Assignment,
        iteration: u64,
        exam: usize,
    ) -> Option<ExamPlacement> {
        let placement = assignment.remove(self, exam, iteration)?;
        let deltas: Vec<f64> = self
            .criteria
            .iter()
            .map(|c| c.value(self, assignment, &placement, &[]))
            .collect();
        assignment.sub_totals(&deltas);
        Some(placement)
    }

    /// Predicted weighted delta of assigning `placement`, with the exam's own
    /// current value and all room occupants counted as unassigned.
    pub fn move_value(&self, assignment: &Assignment, placement: &ExamPlacement) -> f64 {
        let mut conflicting: Vec<ExamPlacement> = Vec::new();
        if let Some(current) = assignment.placement(placement.exam) {
            conflicting.push(current.clone());
        }
        for exam in self.conflicts(assignment, placement) {
            if let Some(p) = assignment.placement(exam) {
                conflicting.push(p.clone());
            }
        }
        self.criteria
            .iter()
            .map(|c| c.weight() * c.value(self, assignment, placement, &conflicting))
            .sum()
    }
}

// === BUILDER ===

/// Accumulates entities and produces a validated [`ExamModel`].
pub struct ModelBuilder {
    exams: Vec<Exam>,
    periods: Vec<Period>,
    rooms: Vec<Room>,
    students: Vec<Person>,
    instructors: Vec<Person>,
    distributions: Vec<DistributionConstraint>,
    days: Vec<String>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            exams: Vec::new(),
            periods: Vec::new(),
            rooms: Vec::new(),
            students: Vec::new(),
            instructors: Vec::new(),
            distributions: Vec::new(),
            days: Vec::new(),
        }
    }

    pub fn add_period(
        &mut self,
        external_id: &str,
        day: &str,
        time: &str,
        length: u32,
        weight: i32,
    ) -> usize {
        let day_index = match self.days.iter().position(|d| d == day) {
            Some(i) => i,
            None => {
                self.days.push(day.to_string());
                self.days.len() - 1
            }
        };
        let id = self.periods.len();
        self.periods.push(Period {
            id,
            external_id: external_id.to_string(),
            day: day.to_string(),
            time: time.to_string(),
            length,
            weight,
            day_index,
        });
        id
    }

    pub fn add_room(
        &mut self,
        external_id: &str,
        name: &str,
        size: usize,
        alt_size: usize,
        coordinates: Option<(f64, f64)>,
    ) -> usize {
        let id = self.rooms.len();
        self.rooms.push(Room {
            id,
            external_id: external_id.to_string(),
            name: name.to_string(),
            size,
            alt_size,
            coordinates,
            available: Vec::new(),
            period_weights: Vec::new(),
        });
        id
    }

    pub fn set_room_availability(&mut self, room: usize, period: usize, available: bool) {
        let r = &mut self.rooms[room];
        if r.available.len() <= period {
            r.available.resize(period + 1, true);
        }
        r.available[period] = available;
    }

    pub fn set_room_period_weight(&mut self, room: usize, period: usize, weight: i32) {
        let r = &mut self.rooms[room];
        if r.period_weights.len() <= period {
            r.period_weights.resize(period + 1, 0);
        }
        r.period_weights[period] = weight;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_exam(
        &mut self,
        external_id: &str,
        length: u32,
        size: usize,
        max_rooms: Option<usize>,
        alt_seating: bool,
        average_period: Option<u32>,
    ) -> usize {
        let id = self.exams.len();
        self.exams.push(Exam {
            id,
            external_id: external_id.to_string(),
            length,
            size,
            max_rooms: max_rooms.unwrap_or(0),
            alt_seating,
            average_period,
            large: false,
            periods: Vec::new(),
            rooms: Vec::new(),
            students: Vec::new(),
            instructors: Vec::new(),
            distributions: Vec::new(),
            initial: None,
        });
        id
    }

    pub fn allow_period(&mut self, exam: usize, period: usize, weight: i32) {
        self.exams[exam].periods.push(PeriodPref { period, weight });
    }

    pub fn allow_room(&mut self, exam: usize, room: usize, weight: i32) {
        self.exams[exam].rooms.push(RoomPref { room, weight });
    }

    pub fn set_initial(&mut self, exam: usize, period: usize, mut rooms: Vec<usize>) {
        rooms.sort_unstable();
        self.exams[exam].initial = Some((period, rooms));
    }

    pub fn add_student(&mut self, external_id: &str) -> usize {
        let id = self.students.len();
        self.students.push(Person {
            id,
            external_id: external_id.to_string(),
            exams: Vec::new(),
            unavailable: Vec::new(),
        });
        id
    }

    pub fn add_instructor(&mut self, external_id: &str) -> usize {
        let id = self.instructors.len();
        self.instructors.push(Person {
            id,
            external_id: external_id.to_string(),
            exams: Vec::new(),
            unavailable: Vec::new(),
        });
        id
    }

    pub fn enroll_student(&mut self, student: usize, exam: usize) {
        self.students[student].exams.push(exam);
        self.exams[exam].students.push(student);
    }

    pub fn assign_instructor(&mut self, instructor: usize, exam: usize) {
        self.instructors[instructor].exams.push(exam);
        self.exams[exam].instructors.push(instructor);
    }

    pub fn set_student_unavailable(&mut self, student: usize, period: usize) {
        let s = &mut self.students[student];
        if s.unavailable.len() <= period {
            s.unavailable.resize(period + 1, false);
        }
        s.unavailable[period] = true;
    }

    pub fn set_instructor_unavailable(&mut self, instructor: usize, period: usize) {
        let s = &mut self.instructors[instructor];
        if s.unavailable.len() <= period {
            s.unavailable.resize(period + 1, false);
        }
        s.unavailable[period] = true;
    }

    pub fn add_distribution(
        &mut self,
        dtype: DistributionType,
        hard: bool,
        weight: f64,
        exams: Vec<usize>,
    ) -> usize {
        let id = self.distributions.len();
        for &e in &exams {
            self.exams[e].distributions.push(id);
        }
        self.distributions.push(DistributionConstraint {
            id,
            dtype,
            hard,
            weight,
            exams,
        });
        id
    }

    /// Validates the accumulated entities, fills derived data and registers
    /// the criteria. Broken entity invariants surface as `MalformedInput`.
    pub fn build(mut self, config: &SolverConfig) -> Result<ExamModel, SolverError> {
        let settings = ModelSettings::from_config(config)?;
        let nr_periods = self.periods.len();
        if nr_periods == 0 {
            return Err(SolverError::MalformedInput("no periods defined".into()));
        }

        let exam_index = unique_index(self.exams.iter().map(|e| e.external_id.clone()), "exam")?;
        let period_index =
            unique_index(self.periods.iter().map(|p| p.external_id.clone()), "period")?;
        let room_index = unique_index(self.rooms.iter().map(|r| r.external_id.clone()), "room")?;

        for room in &mut self.rooms {
            room.available.resize(nr_periods, true);
            room.period_weights.resize(nr_periods, 0);
        }
        for person in self.students.iter_mut().chain(self.instructors.iter_mut()) {
            person.unavailable.resize(nr_periods, false);
        }

        let nr_rooms = self.rooms.len();
        for exam in &mut self.exams {
            if exam.size == 0 {
                exam.size = exam.students.len();
            }
            if exam.max_rooms == 0 {
                exam.max_rooms = settings.max_rooms;
            }
            exam.large = settings.large_size > 0 && exam.size >= settings.large_size;
            if exam.periods.is_empty() {
                exam.periods = (0..nr_periods)
                    .map(|period| PeriodPref { period, weight: 0 })
                    .collect();
            }
            if exam.rooms.is_empty() {
                exam.rooms = (0..nr_rooms)
                    .map(|room| RoomPref { room, weight: 0 })
                    .collect();
            }
        }

        // A room set of max_rooms largest allowed rooms must seat the exam,
        // otherwise no feasible placement can ever exist.
        for exam in &self.exams {
            let mut caps: Vec<usize> = exam
                .rooms
                .iter()
                .map(|p| self.rooms[p.room].capacity(exam.alt_seating))
                .collect();
            caps.sort_unstable_by(|a, b| b.cmp(a));
            let reachable: usize = caps.iter().take(exam.max_rooms.max(1)).sum();
            if reachable < exam.size {
                return Err(SolverError::MalformedInput(format!(
                    "exam {} (size {}) cannot be seated in any allowed room set",
                    exam.external_id, exam.size
                )));
            }
        }

        for dc in &self.distributions {
            if dc.exams.len() < 2 {
                return Err(SolverError::MalformedInput(format!(
                    "distribution constraint {} ({}) needs at least two exams",
                    dc.id,
                    dc.dtype.name()
                )));
            }
        }

        let mut day_periods = vec![Vec::new(); self.days.len()];
        for period in &self.periods {
            day_periods[period.day_index].push(period.id);
        }

        let mut room_distances = vec![vec![0.0; nr_rooms]; nr_rooms];
        for i in 0..nr_rooms {
            for j in (i + 1)..nr_rooms {
                if let (Some((x1, y1)), Some((x2, y2))) =
                    (self.rooms[i].coordinates, self.rooms[j].coordinates)
                {
                    let d = ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt();
                    room_distances[i][j] = d;
                    room_distances[j][i] = d;
                }
            }
        }

        let criteria = criteria::register_all(config, &settings)?;
        let criterion_index = criteria
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name(), i))
            .collect();
        let nr_criteria = criteria.len();

        Ok(ExamModel {
            exams: self.exams,
            periods: self.periods,
            rooms: self.rooms,
            students: self.students,
            instructors: self.instructors,
            distributions: self.distributions,
            exam_index,
            period_index,
            room_index,
            day_periods,
            room_distances,
            criteria,
            criterion_index,
            components: AtomicUsize::new(nr_criteria),
            settings,
        })
    }
}

fn unique_index(
    ids: impl Iterator<Item = String>,
    kind: &str,
) -> Result<HashMap<String, usize>, SolverError> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(SolverError::MalformedInput(format!(
                "duplicate {} id: {}",
                kind, id
            )));
        }
    }
    Ok(index)
}
