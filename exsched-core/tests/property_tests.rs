//! Property-based tests for the criterion and assignment invariants.
//!
//! These pin down the two contracts everything else leans on: incrementally
//! maintained criterion totals equal the from-scratch recomputation after any
//! assign/unassign history, and the predicted delta of a move equals the
//! actual total change once the move is applied.

mod common;

use common::{random_instance, test_config};
use exsched_core::model::ExamPlacement;
use exsched_core::solver::Solution;
use proptest::prelude::*;

/// One scripted operation against the assignment.
#[derive(Debug, Clone)]
enum Op {
    /// Assign the exam somewhere in its domain (evicting room occupants).
    Assign { exam: usize, pick: usize },
    /// Unassign the exam (may be a no-op).
    Unassign { exam: usize },
}

fn op_strategy(nr_exams: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..nr_exams, 0..64usize).prop_map(|(exam, pick)| Op::Assign { exam, pick }),
        1 => (0..nr_exams).prop_map(|exam| Op::Unassign { exam }),
    ]
}

/// Applies an op through the regular event path, neighbour-style: room
/// occupants are evicted before the assignment lands.
fn apply(solution: &mut Solution, op: &Op) {
    match op {
        Op::Unassign { exam } => {
            solution.iteration += 1;
            solution.unassign(*exam);
        }
        Op::Assign { exam, pick } => {
            let model = solution.model_arc();
            let periods = model.allowed_periods(*exam);
            if periods.is_empty() {
                return;
            }
            let (period, _) = periods[pick % periods.len()];
            let rooms = match model.best_rooms(&solution.assignment, *exam, period, true) {
                Some(rooms) => rooms,
                None => return,
            };
            let placement = ExamPlacement::new(*exam, period, rooms);
            if !model.is_valid(&solution.assignment, &placement) {
                return;
            }
            solution.iteration += 1;
            for conflict in model.conflicts(&solution.assignment, &placement) {
                solution.unassign(conflict);
            }
            solution.assign(placement);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: after any event history, every cached criterion total equals
    /// the from-scratch recomputation.
    #[test]
    fn incremental_totals_match_recomputation(ops in prop::collection::vec(op_strategy(8), 1..40)) {
        let config = test_config();
        let model = random_instance(&config, 8, 2, 4, 20);
        let mut solution = Solution::new(model.clone());
        for op in &ops {
            apply(&mut solution, op);
            solution.check_consistency().expect("criterion total drifted");
        }
        let cached = solution.total_value();
        let fresh = model.total_value_from_scratch(&solution.assignment);
        prop_assert!((cached - fresh).abs() < 1e-6, "cached {} fresh {}", cached, fresh);
    }

    /// Property: the predicted weighted delta of a feasible move equals the
    /// actual change of the total once applied.
    #[test]
    fn move_delta_matches_actual_change(
        ops in prop::collection::vec(op_strategy(8), 1..25),
        exam in 0..8usize,
        pick in 0..64usize,
    ) {
        let config = test_config();
        let model = random_instance(&config, 8, 2, 4, 20);
        let mut solution = Solution::new(model.clone());
        for op in &ops {
            apply(&mut solution, op);
        }

        let periods = model.allowed_periods(exam);
        prop_assume!(!periods.is_empty());
        let (period, _) = periods[pick % periods.len()];
        let rooms = model.best_rooms(&solution.assignment, exam, period, true);
        prop_assume!(rooms.is_some());
        let placement = ExamPlacement::new(exam, period, rooms.unwrap());
        prop_assume!(model.is_valid(&solution.assignment, &placement));

        let before = model.total_value_from_scratch(&solution.assignment);
        let predicted = model.move_value(&solution.assignment, &placement);
        solution.iteration += 1;
        for conflict in model.conflicts(&solution.assignment, &placement) {
            solution.unassign(conflict);
        }
        solution.assign(placement);
        let after = model.total_value_from_scratch(&solution.assignment);

        prop_assert!(
            (after - before - predicted).abs() < 1e-6,
            "predicted {} actual {}",
            predicted,
            after - before
        );
    }

    /// Property: unassigning an unassigned exam changes nothing.
    #[test]
    fn unassign_is_idempotent(ops in prop::collection::vec(op_strategy(6), 0..20), exam in 0..6usize) {
        let config = test_config();
        let model = random_instance(&config, 6, 2, 3, 12);
        let mut solution = Solution::new(model.clone());
        for op in &ops {
            apply(&mut solution, op);
        }
        solution.unassign(exam);
        let assigned = solution.assignment.nr_assigned();
        let total = solution.total_value();

        solution.unassign(exam);
        prop_assert_eq!(solution.assignment.nr_assigned(), assigned);
        prop_assert!((solution.total_value() - total).abs() < 1e-9);
        solution.check_consistency().expect("criterion total drifted");
    }

    /// Property: the assignment's derived tables always agree with the
    /// placements (no phantom or missing occupancy).
    #[test]
    fn occupancy_tables_stay_in_lockstep(ops in prop::collection::vec(op_strategy(8), 1..40)) {
        let config = test_config();
        let model = random_instance(&config, 8, 2, 4, 20);
        let mut solution = Solution::new(model.clone());
        for op in &ops {
            apply(&mut solution, op);
        }
        let mut occupied = 0;
        for room in 0..model.rooms().len() {
            for period in 0..model.periods().len() {
                if let Some(exam) = solution.assignment.room_occupant(room, period) {
                    occupied += 1;
                    let placement = solution.assignment.placement(exam).expect("occupant unassigned");
                    prop_assert_eq!(placement.period, period);
                    prop_assert!(placement.rooms.contains(&room));
                }
            }
        }
        let from_placements: usize = solution.assignment.placements().map(|p| p.rooms.len()).sum();
        prop_assert_eq!(occupied, from_placements);
    }
}
