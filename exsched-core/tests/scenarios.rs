//! Seeded end-to-end scenarios and the solver-level invariants.

mod common;

use common::{assert_feasible, model_with, random_instance, test_config};
use exsched_core::config::SolverConfig;
use exsched_core::criteria::Criterion;
use exsched_core::io::{ExamXmlLoader, ExamXmlWriter, ProblemLoader, SolutionWriter};
use exsched_core::neighbours::{Neighbour, NeighbourSelection};
use exsched_core::selection::{ExamNeighbourSelection, Phase};
use exsched_core::solver::{ParallelSolver, Solution, SolutionListener, Solver};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Instant;

fn criterion_total(solution: &Solution, name: &str) -> f64 {
    let model = solution.model();
    model
        .criterion(name)
        .map(|c| c.total(model, &solution.assignment))
        .unwrap_or(f64::NAN)
}

fn solve(config: &SolverConfig, solution: &mut Solution) {
    let mut solver = Solver::new(config.clone()).unwrap();
    solver.solve(solution).unwrap();
}

/// S1: two independent exams find distinct slots with zero conflicts.
#[test]
fn s1_trivial_instance_solves_cleanly() {
    let config = test_config();
    let model = model_with(&config, |b| {
        b.add_period("1", "day1", "08:00", 120, 0);
        b.add_period("2", "day1", "10:00", 120, 0);
        b.add_room("A", "A", 20, 20, None);
        b.add_room("B", "B", 20, 20, None);
        let e0 = b.add_exam("X", 60, 0, None, false, None);
        let e1 = b.add_exam("Y", 60, 0, None, false, None);
        for i in 0..8 {
            let s = b.add_student(&format!("s{}", i));
            b.enroll_student(s, if i < 4 { e0 } else { e1 });
        }
    });
    let mut solution = Solution::new(model);
    solve(&config, &mut solution);

    assert!(solution.is_complete());
    assert_eq!(criterion_total(&solution, "StudentDirectConflicts"), 0.0);
    assert_feasible(&solution);
}

/// S2: a shared cohort forces the two exams into distinct periods.
#[test]
fn s2_direct_conflict_is_avoided() {
    let config = test_config();
    let model = model_with(&config, |b| {
        b.add_period("1", "day1", "08:00", 120, 0);
        b.add_period("2", "day1", "10:00", 120, 0);
        b.add_room("A", "A", 20, 20, None);
        let e0 = b.add_exam("X", 60, 0, None, false, None);
        let e1 = b.add_exam("Y", 60, 0, None, false, None);
        for i in 0..10 {
            let s = b.add_student(&format!("s{}", i));
            b.enroll_student(s, e0);
            b.enroll_student(s, e1);
        }
    });
    let mut solution = Solution::new(model);
    solve(&config, &mut solution);

    assert!(solution.is_complete());
    let p0 = solution.assignment.placement(0).unwrap().period;
    let p1 = solution.assignment.placement(1).unwrap().period;
    assert_ne!(p0, p1);
    assert_eq!(criterion_total(&solution, "StudentDirectConflicts"), 0.0);
}

/// S3: with a single period the conflict is unavoidable but the best
/// solution is still saved.
#[test]
fn s3_forced_conflict_is_recorded() {
    let config = test_config();
    let model = model_with(&config, |b| {
        b.add_period("1", "day1", "08:00", 120, 0);
        b.add_room("A", "A", 20, 20, None);
        b.add_room("B", "B", 20, 20, None);
        let e0 = b.add_exam("X", 60, 0, None, false, None);
        let e1 = b.add_exam("Y", 60, 0, None, false, None);
        for i in 0..5 {
            let s = b.add_student(&format!("s{}", i));
            b.enroll_student(s, e0);
            b.enroll_student(s, e1);
        }
    });
    let mut solution = Solution::new(model);
    solve(&config, &mut solution);

    assert!(solution.is_complete());
    assert_eq!(criterion_total(&solution, "StudentDirectConflicts"), 5.0);
    assert!(solution.best().is_some());
}

/// S4: an exam larger than every room gets split across two.
#[test]
fn s4_oversized_exam_splits_rooms() {
    let config = test_config();
    let model = model_with(&config, |b| {
        b.add_period("1", "day1", "08:00", 120, 0);
        b.add_room("A", "A", 100, 100, None);
        b.add_room("B", "B", 150, 150, None);
        b.add_exam("X", 120, 200, None, false, None);
    });
    let mut solution = Solution::new(model);
    solve(&config, &mut solution);

    assert!(solution.is_complete());
    let placement = solution.assignment.placement(0).unwrap();
    assert_eq!(placement.rooms.len(), 2);
    assert_eq!(criterion_total(&solution, "RoomSplitPenalty"), 1.0);
    assert_feasible(&solution);
}

/// S5: consecutive same-day periods count as back-to-back; the pair across
/// the day break does not while the cross-day flag is off.
#[test]
fn s5_back_to_back_respects_day_break() {
    let config = test_config();
    let same_day = model_with(&config, |b| {
        b.add_period("1", "day1", "08:00", 120, 0);
        b.add_period("2", "day1", "10:00", 120, 0);
        b.add_room("A", "A", 20, 20, None);
        b.add_room("B", "B", 20, 20, None);
        let e0 = b.add_exam("X", 60, 0, None, false, None);
        let e1 = b.add_exam("Y", 60, 0, None, false, None);
        b.allow_period(e0, 0, 0);
        b.allow_period(e1, 1, 0);
        let s = b.add_student("s0");
        b.enroll_student(s, e0);
        b.enroll_student(s, e1);
    });
    let mut solution = Solution::new(same_day);
    solve(&config, &mut solution);
    assert!(solution.is_complete());
    assert_eq!(criterion_total(&solution, "StudentBackToBackConflicts"), 1.0);

    let cross_day = model_with(&config, |b| {
        b.add_period("1", "day1", "16:00", 120, 0);
        b.add_period("2", "day2", "08:00", 120, 0);
        b.add_room("A", "A", 20, 20, None);
        b.add_room("B", "B", 20, 20, None);
        let e0 = b.add_exam("X", 60, 0, None, false, None);
        let e1 = b.add_exam("Y", 60, 0, None, false, None);
        b.allow_period(e0, 0, 0);
        b.allow_period(e1, 1, 0);
        let s = b.add_student("s0");
        b.enroll_student(s, e0);
        b.enroll_student(s, e1);
    });
    let mut solution = Solution::new(cross_day);
    solve(&config, &mut solution);
    assert_eq!(criterion_total(&solution, "StudentBackToBackConflicts"), 0.0);
}

/// S6: the one-second wall-clock budget holds on a 100-exam instance and a
/// best snapshot is written.
#[test]
fn s6_timeout_is_honored() {
    let mut config = test_config();
    config.set("Termination.MaxIters", "100000000");
    config.set("Termination.TimeOut", "1");
    let model = random_instance(&config, 100, 4, 14, 300);
    let mut solution = Solution::new(model);

    let started = Instant::now();
    solve(&config, &mut solution);
    let elapsed = started.elapsed().as_secs_f64();

    assert!(elapsed < 1.2, "solver ran {:.2}s past the budget", elapsed);
    assert!(solution.best().is_some());
    let xml = ExamXmlWriter.save(&solution).unwrap();
    assert!(xml.contains("<assignments>"));
    assert_feasible(&solution);
}

/// An exam with an empty effective domain stays unassigned; the run still
/// finishes and records a best.
#[test]
fn infeasible_exam_is_left_unassigned() {
    let config = test_config();
    let model = model_with(&config, |b| {
        b.add_period("1", "day1", "08:00", 120, 0);
        b.add_period("2", "day1", "10:00", 120, 0);
        b.add_room("A", "A", 20, 20, None);
        b.add_room("B", "B", 20, 20, None);
        let e0 = b.add_exam("X", 60, 0, None, false, None);
        let blocked = b.add_exam("Y", 60, 0, None, false, None);
        // Y may only sit in period 1 using room B, which is closed then.
        b.allow_period(blocked, 0, 0);
        b.allow_room(blocked, 1, 0);
        b.set_room_availability(1, 0, false);
        let _ = e0;
    });
    let mut solution = Solution::new(model);
    solve(&config, &mut solution);

    assert_eq!(solution.assignment.nr_unassigned(), 1);
    assert!(solution.assignment.placement(0).is_some());
    assert!(solution.best().is_some());
}

/// Property 3: the written assignment section round-trips through the
/// loader, with room sets canonical.
#[test]
fn assignment_round_trip() {
    let config = test_config();
    let model = random_instance(&config, 12, 2, 5, 30);
    let mut solution = Solution::new(model.clone());
    solve(&config, &mut solution);
    assert!(solution.is_complete());

    let xml = ExamXmlWriter.save(&solution).unwrap();
    let reloaded = ExamXmlLoader.load(&xml, &config).unwrap();
    for exam in reloaded.exams() {
        let original = solution
            .assignment
            .placement(model.exam_by_external(&exam.external_id).unwrap())
            .unwrap();
        let (period, rooms) = exam.initial.as_ref().expect("assignment survived the trip");
        assert_eq!(
            reloaded.period(*period).external_id,
            model.period(original.period).external_id
        );
        let reloaded_rooms: Vec<&str> = rooms
            .iter()
            .map(|&r| reloaded.room(r).external_id.as_str())
            .collect();
        let original_rooms: Vec<&str> = original
            .rooms
            .iter()
            .map(|&r| model.room(r).external_id.as_str())
            .collect();
        assert_eq!(reloaded_rooms, original_rooms);
    }
}

#[derive(Default)]
struct BestTracker {
    history: Arc<Mutex<Vec<(usize, f64)>>>,
}

impl SolutionListener for BestTracker {
    fn best_saved(&mut self, solution: &Solution) {
        if let Some(best) = solution.best() {
            if let Ok(mut history) = self.history.lock() {
                history.push((best.unassigned, best.total));
            }
        }
    }
}

/// Property 6: recorded bests improve lexicographically, so the best total
/// never worsens at a fixed unassigned count.
#[test]
fn best_is_monotone() {
    let config = test_config();
    let model = random_instance(&config, 20, 2, 6, 60);
    let mut solution = Solution::new(model);
    let history = Arc::new(Mutex::new(Vec::new()));
    let mut solver = Solver::new(config).unwrap();
    solver.add_listener(Box::new(BestTracker {
        history: history.clone(),
    }));
    solver.solve(&mut solution).unwrap();

    let history = history.lock().unwrap();
    assert!(!history.is_empty());
    for pair in history.windows(2) {
        let (u1, t1) = pair[0];
        let (u2, t2) = pair[1];
        assert!(
            u2 < u1 || (u2 == u1 && t2 < t1),
            "best regressed from ({}, {}) to ({}, {})",
            u1,
            t1,
            u2,
            t2
        );
    }
}

/// Property 7: the phase index never decreases, and the final phase latches
/// only through the termination message.
#[test]
fn phase_index_is_monotone() {
    let config = test_config();
    let model = random_instance(&config, 10, 2, 4, 25);
    let mut solution = Solution::new(model);
    let mut controller = ExamNeighbourSelection::from_config(&config).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    controller.init(&mut solution);
    let mut last_index = controller.phase().index();
    for _ in 0..5000 {
        solution.iteration += 1;
        let candidate = controller.select(&mut solution, &mut rng);
        let index = controller.phase().index();
        assert!(index >= last_index, "phase went from {} to {}", last_index, index);
        last_index = index;
        match candidate {
            Some(neighbour) => {
                neighbour.assign(&mut solution);
                solution.save_best_if_improved(-1);
            }
            None => break,
        }
        if controller.phase() >= Phase::Meta {
            break;
        }
    }

    assert!(controller.on_termination(&mut solution));
    assert_eq!(controller.phase(), Phase::Final);
    assert!(controller.phase().index() >= last_index);
}

/// Parallel mode: several workers, shared best, bounded assertions only.
#[test]
fn parallel_workers_promote_a_best() {
    let mut config = test_config();
    config.set("Parallel.NrSolvers", "3");
    config.set("Termination.MaxIters", "4000");
    let model = random_instance(&config, 12, 2, 5, 30);
    let solver = ParallelSolver::new(config).unwrap();
    let solution = solver.solve(model).unwrap();

    assert!(solution.is_complete());
    assert_feasible(&solution);
    assert!(criterion_total(&solution, "StudentDirectConflicts") >= 0.0);
}
