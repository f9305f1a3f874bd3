//! CSV report tables.

use crate::criteria::Criterion;
use crate::solver::Solution;
use crate::SolverError;
use std::collections::HashSet;
use std::path::Path;

/// A rectangular report: header plus string rows.
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Produces one report table from a solution.
pub trait Report: Send {
    fn name(&self) -> &'static str;
    fn report(&self, solution: &Solution) -> Table;
}

/// Writes a table as CSV.
pub fn save_csv(table: &Table, path: &Path) -> Result<(), SolverError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| SolverError::Internal(format!("cannot open {}: {}", path.display(), e)))?;
    writer
        .write_record(&table.header)
        .and_then(|_| {
            for row in &table.rows {
                writer.write_record(row)?;
            }
            writer.flush().map_err(csv::Error::from)
        })
        .map_err(|e| SolverError::Internal(format!("CSV write error: {}", e)))
}

/// The shipped report set; `seed` goes into the run summary for
/// reproducibility.
pub fn all_reports(seed: u64) -> Vec<Box<dyn Report>> {
    vec![
        Box::new(ExamScheduleReport),
        Box::new(StudentConflictReport),
        Box::new(InstructorConflictReport),
        Box::new(PeriodUsageReport),
        Box::new(RoomScheduleReport),
        Box::new(RoomSplitReport),
        Box::new(MeetingsPerDayReport),
        Box::new(SummaryReport { seed }),
    ]
}

/// Per-exam schedule: period, rooms, seating.
pub struct ExamScheduleReport;

impl Report for ExamScheduleReport {
    fn name(&self) -> &'static str {
        "exam-schedule"
    }

    fn report(&self, solution: &Solution) -> Table {
        let model = solution.model();
        let mut rows = Vec::new();
        for exam in model.exams() {
            let (period, rooms, seats) = match solution.assignment.placement(exam.id) {
                Some(p) => {
                    let seats: usize = p
                        .rooms
                        .iter()
                        .map(|&r| model.room(r).capacity(exam.alt_seating))
                        .sum();
                    let rooms = p
                        .rooms
                        .iter()
                        .map(|&r| model.room(r).external_id.clone())
                        .collect::<Vec<_>>()
                        .join(" ");
                    (model.period(p.period).external_id.clone(), rooms, seats)
                }
                None => (String::new(), String::new(), 0),
            };
            rows.push(vec![
                exam.external_id.clone(),
                exam.size.to_string(),
                period,
                rooms,
                seats.to_string(),
            ]);
        }
        Table {
            header: str_row(&["exam", "size", "period", "rooms", "seats"]),
            rows,
        }
    }
}

/// Per-exam student conflict counts: direct, back-to-back, more-than-2-a-day.
pub struct StudentConflictReport;

impl Report for StudentConflictReport {
    fn name(&self) -> &'static str {
        "student-conflicts"
    }

    fn report(&self, solution: &Solution) -> Table {
        let model = solution.model();
        let empty = HashSet::new();
        let mut rows = Vec::new();
        for exam in model.exams() {
            let placement = match solution.assignment.placement(exam.id) {
                Some(p) => p,
                None => continue,
            };
            let count = |name: &str| -> f64 {
                model
                    .criterion(name)
                    .map(|c| c.contribution(model, &solution.assignment, placement, &empty))
                    .unwrap_or(0.0)
            };
            let direct = count("StudentDirectConflicts");
            let back_to_back = count("StudentBackToBackConflicts");
            let more_than_2 = count("StudentMoreThan2ADay");
            if direct == 0.0 && back_to_back == 0.0 && more_than_2 == 0.0 {
                continue;
            }
            rows.push(vec![
                exam.external_id.clone(),
                direct.to_string(),
                back_to_back.to_string(),
                more_than_2.to_string(),
            ]);
        }
        Table {
            header: str_row(&["exam", "direct", "back-to-back", "more-than-2-a-day"]),
            rows,
        }
    }
}

/// Per-exam instructor conflict counts.
pub struct InstructorConflictReport;

impl Report for InstructorConflictReport {
    fn name(&self) -> &'static str {
        "instructor-conflicts"
    }

    fn report(&self, solution: &Solution) -> Table {
        let model = solution.model();
        let empty = HashSet::new();
        let mut rows = Vec::new();
        for exam in model.exams() {
            let placement = match solution.assignment.placement(exam.id) {
                Some(p) => p,
                None => continue,
            };
            let count = |name: &str| -> f64 {
                model
                    .criterion(name)
                    .map(|c| c.contribution(model, &solution.assignment, placement, &empty))
                    .unwrap_or(0.0)
            };
            let direct = count("InstructorDirectConflicts");
            let back_to_back = count("InstructorBackToBackConflicts");
            let more_than_2 = count("InstructorMoreThan2ADay");
            if direct == 0.0 && back_to_back == 0.0 && more_than_2 == 0.0 {
                continue;
            }
            rows.push(vec![
                exam.external_id.clone(),
                direct.to_string(),
                back_to_back.to_string(),
                more_than_2.to_string(),
            ]);
        }
        Table {
            header: str_row(&["exam", "direct", "back-to-back", "more-than-2-a-day"]),
            rows,
        }
    }
}

/// Histogram of exams-per-student for each day: how many students sit one,
/// two, or three-plus exams.
pub struct MeetingsPerDayReport;

impl Report for MeetingsPerDayReport {
    fn name(&self) -> &'static str {
        "meetings-per-day"
    }

    fn report(&self, solution: &Solution) -> Table {
        let model = solution.model();
        let mut rows = Vec::new();
        for day in 0..model.nr_days() {
            let mut one = 0usize;
            let mut two = 0usize;
            let mut three_plus = 0usize;
            for student in model.students() {
                let k: usize = model
                    .day_periods(day)
                    .iter()
                    .map(|&period| solution.assignment.student_exams(student.id, period).len())
                    .sum();
                match k {
                    0 => {}
                    1 => one += 1,
                    2 => two += 1,
                    _ => three_plus += 1,
                }
            }
            let day_label = model
                .day_periods(day)
                .first()
                .map(|&p| model.period(p).day.clone())
                .unwrap_or_default();
            rows.push(vec![
                day_label,
                one.to_string(),
                two.to_string(),
                three_plus.to_string(),
            ]);
        }
        Table {
            header: str_row(&["day", "one-exam", "two-exams", "three-or-more"]),
            rows,
        }
    }
}

/// Exams and seated students per period.
pub struct PeriodUsageReport;

impl Report for PeriodUsageReport {
    fn name(&self) -> &'static str {
        "period-usage"
    }

    fn report(&self, solution: &Solution) -> Table {
        let model = solution.model();
        let mut rows = Vec::new();
        for period in model.periods() {
            let exams = solution.assignment.exams_in_period(period.id);
            let students: usize = exams.iter().map(|&e| model.exam(e).size).sum();
            rows.push(vec![
                period.external_id.clone(),
                period.day.clone(),
                period.time.clone(),
                exams.len().to_string(),
                students.to_string(),
            ]);
        }
        Table {
            header: str_row(&["period", "day", "time", "exams", "students"]),
            rows,
        }
    }
}

/// Room occupancy per period.
pub struct RoomScheduleReport;

impl Report for RoomScheduleReport {
    fn name(&self) -> &'static str {
        "room-schedule"
    }

    fn report(&self, solution: &Solution) -> Table {
        let model = solution.model();
        let mut rows = Vec::new();
        for room in model.rooms() {
            for period in model.periods() {
                if let Some(exam) = solution.assignment.room_occupant(room.id, period.id) {
                    rows.push(vec![
                        room.external_id.clone(),
                        period.external_id.clone(),
                        model.exam(exam).external_id.clone(),
                        model.exam(exam).size.to_string(),
                    ]);
                }
            }
        }
        Table {
            header: str_row(&["room", "period", "exam", "size"]),
            rows,
        }
    }
}

/// Exams split across several rooms.
pub struct RoomSplitReport;

impl Report for RoomSplitReport {
    fn name(&self) -> &'static str {
        "room-splits"
    }

    fn report(&self, solution: &Solution) -> Table {
        let model = solution.model();
        let mut rows = Vec::new();
        for placement in solution.assignment.placements() {
            if placement.rooms.len() < 2 {
                continue;
            }
            let rooms = placement
                .rooms
                .iter()
                .map(|&r| model.room(r).external_id.clone())
                .collect::<Vec<_>>()
                .join(" ");
            let mut distance = 0.0f64;
            for (i, &r1) in placement.rooms.iter().enumerate() {
                for &r2 in &placement.rooms[i + 1..] {
                    distance = distance.max(model.room_distance(r1, r2));
                }
            }
            rows.push(vec![
                model.exam(placement.exam).external_id.clone(),
                placement.rooms.len().to_string(),
                rooms,
                format!("{:.1}", distance),
            ]);
        }
        Table {
            header: str_row(&["exam", "rooms", "room-ids", "max-distance"]),
            rows,
        }
    }
}

/// Run summary: seed, totals and bounds per criterion, overall value.
pub struct SummaryReport {
    pub seed: u64,
}

impl Report for SummaryReport {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn report(&self, solution: &Solution) -> Table {
        let model = solution.model();
        let mut rows = vec![
            vec!["seed".into(), self.seed.to_string(), String::new()],
            vec![
                "total".into(),
                format!("{:.2}", solution.total_value()),
                String::new(),
            ],
            vec![
                "unassigned".into(),
                solution.assignment.nr_unassigned().to_string(),
                String::new(),
            ],
        ];
        for criterion in model.criteria() {
            rows.push(vec![
                criterion.name().to_string(),
                format!("{:.2}", criterion.total(model, &solution.assignment)),
                format!("{}", criterion.weight()),
            ]);
        }
        Table {
            header: str_row(&["key", "value", "weight"]),
            rows,
        }
    }
}

fn str_row(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
