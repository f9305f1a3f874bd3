//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use exsched_core::config::SolverConfig;
use exsched_core::model::{ExamModel, ModelBuilder};
use exsched_core::solver::Solution;
use std::sync::Arc;

/// A configuration with tight budgets suitable for tests.
pub fn test_config() -> SolverConfig {
    let mut config = SolverConfig::new();
    config.set("Termination.MaxIters", "20000");
    config.set("Termination.StopWhenComplete", "false");
    config.set("General.Seed", "42");
    config.set("HillClimber.MaxIdle", "500");
    config.set("Tabu.MaxIdle", "500");
    config.set("Final.MaxIdle", "200");
    config.set("SimulatedAnnealing.TemperatureLength", "500");
    config
}

/// Builds a model through the closure and wraps it for sharing.
pub fn model_with(
    config: &SolverConfig,
    build: impl FnOnce(&mut ModelBuilder),
) -> Arc<ExamModel> {
    let mut builder = ModelBuilder::new();
    build(&mut builder);
    Arc::new(builder.build(config).expect("fixture model must build"))
}

/// A pseudo-random instance: `nr_exams` exams over `nr_days × 3` periods and
/// `nr_rooms` rooms, with students enrolled in two exams each by a fixed
/// mixing pattern.
pub fn random_instance(
    config: &SolverConfig,
    nr_exams: usize,
    nr_days: usize,
    nr_rooms: usize,
    nr_students: usize,
) -> Arc<ExamModel> {
    model_with(config, |b| {
        for day in 0..nr_days {
            for (slot, time) in ["08:00", "12:00", "16:00"].iter().enumerate() {
                b.add_period(
                    &format!("p{}-{}", day, slot),
                    &format!("day{}", day),
                    time,
                    120,
                    (slot % 2) as i32,
                );
            }
        }
        for room in 0..nr_rooms {
            b.add_room(
                &format!("r{}", room),
                &format!("Room {}", room),
                40 + 20 * (room % 3),
                50 + 20 * (room % 3),
                Some(((room % 5) as f64 * 40.0, (room / 5) as f64 * 40.0)),
            );
        }
        for exam in 0..nr_exams {
            b.add_exam(&format!("e{}", exam), 120, 0, None, false, None);
        }
        // Deterministic mixing: student i takes exams i mod n and (i*7+3) mod n.
        for student in 0..nr_students {
            let s = b.add_student(&format!("s{}", student));
            let first = student % nr_exams;
            let second = (student * 7 + 3) % nr_exams;
            b.enroll_student(s, first);
            if second != first {
                b.enroll_student(s, second);
            }
        }
    })
}

/// Asserts hard feasibility of every assigned placement plus exclusive room
/// use, the invariant any accepted move must preserve.
pub fn assert_feasible(solution: &Solution) {
    let model = solution.model();
    let mut seen_rooms = std::collections::HashSet::new();
    for placement in solution.assignment.placements() {
        let exam = model.exam(placement.exam);
        let capacity: usize = placement
            .rooms
            .iter()
            .map(|&r| model.room(r).capacity(exam.alt_seating))
            .sum();
        assert!(
            capacity >= exam.size,
            "exam {} seated {} of {}",
            exam.external_id,
            capacity,
            exam.size
        );
        assert!(placement.rooms.len() <= exam.max_rooms);
        assert!(
            exam.period_weight(placement.period).is_some(),
            "exam {} in prohibited period",
            exam.external_id
        );
        for &room in &placement.rooms {
            assert!(model.room(room).available[placement.period]);
            assert!(
                seen_rooms.insert((room, placement.period)),
                "room {} double-booked in period {}",
                room,
                placement.period
            );
        }
    }
    for dc in model.distributions() {
        if !dc.hard {
            continue;
        }
        for (i, &e1) in dc.exams.iter().enumerate() {
            for &e2 in &dc.exams[i + 1..] {
                if let (Some(p1), Some(p2)) = (
                    solution.assignment.placement(e1),
                    solution.assignment.placement(e2),
                ) {
                    assert!(
                        dc.is_satisfied_pair(model, p1, p2),
                        "hard {} constraint broken between {} and {}",
                        dc.dtype.name(),
                        e1,
                        e2
                    );
                }
            }
        }
    }
}
