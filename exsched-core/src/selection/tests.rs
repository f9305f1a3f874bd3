use super::*;
use crate::config::SolverConfig;
use crate::model::{ExamModel, ExamPlacement, ModelBuilder};
use crate::neighbours::{Neighbour, NeighbourSelection};
use crate::solver::Solution;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

fn quick_config() -> SolverConfig {
    let mut config = SolverConfig::new();
    config.set("HillClimber.MaxIdle", "200");
    config.set("Tabu.MaxIdle", "100");
    config.set("SimulatedAnnealing.TemperatureLength", "50");
    config
}

/// Four exams over four periods and two rooms; exams 0 and 1 share students.
fn conflicted_model(config: &SolverConfig) -> Arc<ExamModel> {
    let mut b = ModelBuilder::new();
    for i in 0..4 {
        b.add_period(&format!("{}", i + 1), "day1", &format!("{:02}:00", 8 + 2 * i), 120, 0);
    }
    b.add_room("A", "A", 30, 30, None);
    b.add_room("B", "B", 30, 30, None);
    for i in 0..4 {
        b.add_exam(&format!("e{}", i), 120, 0, None, false, None);
    }
    for i in 0..6 {
        let s = b.add_student(&format!("s{}", i));
        b.enroll_student(s, 0);
        b.enroll_student(s, 1);
    }
    Arc::new(b.build(config).unwrap())
}

#[test]
fn registry_resolves_every_documented_name() {
    let config = quick_config();
    for name in [
        "ExamRandomMove",
        "ExamRoomMove",
        "ExamTimeMove",
        "ExamColoringConstruction",
        "ExamConstruction",
        "ExamTabuSearch",
        "ExamHillClimbing",
        "ExamSimulatedAnnealing",
        "ExamGreatDeluge",
        "ExamNeighbourSelection",
    ] {
        let selection = create(name, &config).unwrap();
        assert_eq!(selection.name(), name);
    }
}

#[test]
fn registry_rejects_unknown_names() {
    let config = quick_config();
    assert!(create("ExamMagicMove", &config).is_err());
}

#[test]
fn neighbour_lists_are_split_on_semicolons() {
    let config = quick_config();
    let list = create_list("ExamRandomMove; ExamTimeMove;", &config).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].name(), "ExamRandomMove");
    assert_eq!(list[1].name(), "ExamTimeMove");
}

#[test]
fn root_selection_defaults_to_the_phase_controller() {
    let config = quick_config();
    assert_eq!(create_root(&config).unwrap().name(), "ExamNeighbourSelection");
}

#[test]
fn hill_climber_only_returns_non_deteriorating_moves() {
    let config = quick_config();
    let model = conflicted_model(&config);
    let mut solution = Solution::new(model.clone());
    // Worst case start: the conflicting exams share a period.
    solution.assign(ExamPlacement::new(0, 0, vec![0]));
    solution.assign(ExamPlacement::new(1, 0, vec![1]));
    solution.assign(ExamPlacement::new(2, 1, vec![0]));
    solution.assign(ExamPlacement::new(3, 2, vec![0]));

    let mut hill = ExamHillClimbing::from_config(&config).unwrap();
    hill.init(&mut solution);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let start_total = solution.total_value();
    let mut accepted = 0;
    while let Some(neighbour) = hill.select(&mut solution, &mut rng) {
        assert!(neighbour.value(&solution) <= 0.0);
        solution.iteration += 1;
        neighbour.assign(&mut solution);
        accepted += 1;
        if accepted > 2000 {
            break;
        }
    }
    assert!(accepted > 0);
    assert!(solution.total_value() < start_total);
    solution.check_consistency().unwrap();
}

#[test]
fn tabu_search_places_unassigned_exams() {
    let config = quick_config();
    let model = conflicted_model(&config);
    let mut solution = Solution::new(model.clone());
    // Exams 2 and 3 hold both rooms of period 0; exam 0 starts unassigned.
    solution.assign(ExamPlacement::new(2, 0, vec![0]));
    solution.assign(ExamPlacement::new(3, 0, vec![1]));

    let mut tabu = ExamTabuSearch::from_config(&config).unwrap();
    tabu.init(&mut solution);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..200 {
        if solution.assignment.nr_unassigned() == 0 {
            break;
        }
        match tabu.select(&mut solution, &mut rng) {
            Some(neighbour) => {
                solution.iteration += 1;
                neighbour.assign(&mut solution);
            }
            None => break,
        }
    }
    assert_eq!(solution.assignment.nr_unassigned(), 0);
    solution.check_consistency().unwrap();
}

#[test]
fn annealing_produces_applicable_neighbours() {
    let config = quick_config();
    let model = conflicted_model(&config);
    let mut solution = Solution::new(model.clone());
    solution.assign(ExamPlacement::new(0, 0, vec![0]));
    solution.assign(ExamPlacement::new(1, 1, vec![0]));

    let mut annealing = ExamSimulatedAnnealing::from_config(&config).unwrap();
    annealing.init(&mut solution);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..300 {
        if let Some(neighbour) = annealing.select(&mut solution, &mut rng) {
            solution.iteration += 1;
            neighbour.assign(&mut solution);
        }
    }
    solution.check_consistency().unwrap();
}

#[test]
fn great_deluge_accepts_within_the_bound() {
    let config = quick_config();
    let model = conflicted_model(&config);
    let mut solution = Solution::new(model.clone());
    solution.assign(ExamPlacement::new(0, 0, vec![0]));
    solution.assign(ExamPlacement::new(1, 0, vec![1]));

    let mut deluge = ExamGreatDeluge::from_config(&config).unwrap();
    deluge.init(&mut solution);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let start_total = solution.total_value();
    for _ in 0..300 {
        if let Some(neighbour) = deluge.select(&mut solution, &mut rng) {
            solution.iteration += 1;
            neighbour.assign(&mut solution);
            solution.save_best_if_improved(-1);
        }
    }
    // The shared-student clash is the dominating term; the deluge must have
    // washed it away.
    assert!(solution.best().map(|b| b.total).unwrap_or(start_total) < start_total);
    solution.check_consistency().unwrap();
}

#[test]
fn phase_controller_reaches_the_metaheuristic() {
    let config = quick_config();
    let model = conflicted_model(&config);
    let mut solution = Solution::new(model);
    let mut controller = ExamNeighbourSelection::from_config(&config).unwrap();
    controller.init(&mut solution);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    for _ in 0..3000 {
        solution.iteration += 1;
        match controller.select(&mut solution, &mut rng) {
            Some(neighbour) => neighbour.assign(&mut solution),
            None => break,
        }
        if controller.phase() == Phase::Meta {
            break;
        }
    }
    assert!(solution.is_complete());
    assert!(controller.phase() >= Phase::HillClimb);
}
