//! Problem entities: exams, periods, rooms, people and placements.
//!
//! All entities are addressed by dense integer indices assigned at load time;
//! the external string identifiers from the input file survive only in the
//! model's id tables. Cross-references (exam ↔ student ↔ instructor) are kept
//! as index lists on both sides, so there are no pointer cycles.

use serde::{Deserialize, Serialize};

/// An examination period a candidate exam can be placed into, together with
/// its exam-specific preference weight (lower is better, 0 = neutral).
/// A period that does not appear in an exam's list is prohibited for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodPref {
    pub period: usize,
    pub weight: i32,
}

/// A room a candidate exam can use, with its exam-specific preference weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomPref {
    pub room: usize,
    pub weight: i32,
}

/// A scheduling variable: one examination to be placed into a period and a
/// set of rooms.
#[derive(Debug, Clone)]
pub struct Exam {
    /// Dense model index.
    pub id: usize,
    /// External identifier from the input file.
    pub external_id: String,
    /// Duration in minutes.
    pub length: u32,
    /// Number of seated students (explicit, or the student-list length).
    pub size: usize,
    /// Maximum number of rooms this exam may be split across.
    pub max_rooms: usize,
    /// Whether the exam uses the alternative seating layout of its rooms.
    pub alt_seating: bool,
    /// Rotation target: the average period index of past terms, if tracked.
    pub average_period: Option<u32>,
    /// Set during model build from `Exams.LargeSize`.
    pub large: bool,
    /// Allowed periods in input order; empty input lists are expanded to all
    /// periods by the loader.
    pub periods: Vec<PeriodPref>,
    /// Allowed rooms; empty input lists are expanded to all rooms.
    pub rooms: Vec<RoomPref>,
    /// Students attending this exam.
    pub students: Vec<usize>,
    /// Instructors supervising this exam.
    pub instructors: Vec<usize>,
    /// Distribution constraints this exam participates in.
    pub distributions: Vec<usize>,
    /// Initial placement `(period, rooms)` when re-solving an existing
    /// timetable; drives the perturbation criteria.
    pub initial: Option<(usize, Vec<usize>)>,
}

impl Exam {
    /// Exam-specific preference weight of a period, `None` when prohibited.
    pub fn period_weight(&self, period: usize) -> Option<i32> {
        self.periods
            .iter()
            .find(|p| p.period == period)
            .map(|p| p.weight)
    }

    /// Exam-specific preference weight of a room, `None` when prohibited.
    pub fn room_weight(&self, room: usize) -> Option<i32> {
        self.rooms.iter().find(|r| r.room == room).map(|r| r.weight)
    }
}

/// A discrete time slot. Periods are globally ordered by `index`; that order
/// drives precedence constraints and back-to-back detection.
#[derive(Debug, Clone)]
pub struct Period {
    pub id: usize,
    pub external_id: String,
    /// Calendar day label from the input (e.g. `2026-06-01`).
    pub day: String,
    /// Start time label (e.g. `08:00`).
    pub time: String,
    /// Duration in minutes.
    pub length: u32,
    /// Global preference weight of scheduling anything here.
    pub weight: i32,
    /// Dense index of `day` among all distinct days, in first-seen order.
    pub day_index: usize,
}

/// A physical room with per-period availability.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: usize,
    pub external_id: String,
    pub name: String,
    /// Seating capacity in the normal layout.
    pub size: usize,
    /// Seating capacity in the alternative layout.
    pub alt_size: usize,
    /// Optional coordinates used for the distance matrix.
    pub coordinates: Option<(f64, f64)>,
    /// Availability per period index.
    pub available: Vec<bool>,
    /// Room penalty per period index (independent of the exam).
    pub period_weights: Vec<i32>,
}

impl Room {
    /// Capacity under the seating layout the exam requires.
    pub fn capacity(&self, alt_seating: bool) -> usize {
        if alt_seating {
            self.alt_size
        } else {
            self.size
        }
    }
}

/// A student or an instructor: a set of exams plus per-period availability.
#[derive(Debug, Clone)]
pub struct Person {
    pub id: usize,
    pub external_id: String,
    pub exams: Vec<usize>,
    /// `true` at a period index when the person cannot attend then.
    pub unavailable: Vec<bool>,
}

impl Person {
    pub fn is_available(&self, period: usize) -> bool {
        !self.unavailable.get(period).copied().unwrap_or(false)
    }
}

/// A value for one exam: the chosen period and room set.
///
/// `rooms` is kept sorted ascending; that is the canonical form used by
/// equality, hashing and the XML writer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExamPlacement {
    pub exam: usize,
    pub period: usize,
    pub rooms: Vec<usize>,
}

impl ExamPlacement {
    pub fn new(exam: usize, period: usize, mut rooms: Vec<usize>) -> Self {
        rooms.sort_unstable();
        Self {
            exam,
            period,
            rooms,
        }
    }

    /// Room-split count penalty: quadratic in the number of extra rooms.
    pub fn split_penalty(&self) -> f64 {
        let extra = self.rooms.len().saturating_sub(1);
        (extra * extra) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_rooms_are_canonicalized() {
        let p = ExamPlacement::new(0, 3, vec![7, 2, 5]);
        assert_eq!(p.rooms, vec![2, 5, 7]);
        assert_eq!(p, ExamPlacement::new(0, 3, vec![5, 7, 2]));
    }

    #[test]
    fn split_penalty_is_quadratic() {
        assert_eq!(ExamPlacement::new(0, 0, vec![1]).split_penalty(), 0.0);
        assert_eq!(ExamPlacement::new(0, 0, vec![1, 2]).split_penalty(), 1.0);
        assert_eq!(ExamPlacement::new(0, 0, vec![1, 2, 3]).split_penalty(), 4.0);
    }
}
