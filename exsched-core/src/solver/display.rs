//! Human-readable timetable rendering.

use super::Solution;
use std::fmt::Write as _;

impl Solution {
    /// Formats the current assignment as one block per period:
    ///
    /// ```text
    /// ========== p1 (day1 08:00) ==========
    /// MATH101 [120]: A, B
    /// PHYS204 [45]: C
    /// ```
    ///
    /// Unassigned exams are listed at the end. Exams within a period are
    /// sorted by external id for stable output.
    pub fn display_timetable(&self) -> String {
        let model = self.model();
        let mut out = String::new();
        for period in model.periods() {
            let _ = writeln!(
                out,
                "========== {} ({} {}) ==========",
                period.external_id, period.day, period.time
            );
            let mut exams: Vec<usize> = self.assignment.exams_in_period(period.id).to_vec();
            exams.sort_by(|&a, &b| model.exam(a).external_id.cmp(&model.exam(b).external_id));
            for exam in exams {
                let placement = match self.assignment.placement(exam) {
                    Some(p) => p,
                    None => continue,
                };
                let rooms = placement
                    .rooms
                    .iter()
                    .map(|&r| model.room(r).external_id.clone())
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(
                    out,
                    "{} [{}]: {}",
                    model.exam(exam).external_id,
                    model.exam(exam).size,
                    rooms
                );
            }
            out.push('\n');
        }
        let mut unassigned: Vec<&str> = (0..model.exams().len())
            .filter(|&e| self.assignment.placement(e).is_none())
            .map(|e| model.exam(e).external_id.as_str())
            .collect();
        if !unassigned.is_empty() {
            unassigned.sort_unstable();
            let _ = writeln!(out, "unassigned: {}", unassigned.join(", "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SolverConfig;
    use crate::model::{ExamPlacement, ModelBuilder};
    use crate::solver::Solution;
    use std::sync::Arc;

    #[test]
    fn timetable_lists_periods_and_unassigned() {
        let mut b = ModelBuilder::new();
        b.add_period("1", "day1", "08:00", 120, 0);
        b.add_period("2", "day1", "10:00", 120, 0);
        b.add_room("A", "Hall A", 50, 50, None);
        b.add_exam("MATH101", 120, 30, None, false, None);
        b.add_exam("PHYS204", 120, 20, None, false, None);
        let model = Arc::new(b.build(&SolverConfig::new()).unwrap());
        let mut solution = Solution::new(model);
        solution.assign(ExamPlacement::new(0, 0, vec![0]));
        let text = solution.display_timetable();
        assert!(text.contains("========== 1 (day1 08:00) =========="));
        assert!(text.contains("MATH101 [30]: A"));
        assert!(text.contains("unassigned: PHYS204"));
    }
}
