//! Performance benchmarks for exsched-core
//!
//! Run with: cargo bench -p exsched-core --bench solver_perf
//!
//! Results are stored in target/criterion/ for historical comparison.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use exsched_core::config::SolverConfig;
use exsched_core::model::{ExamModel, ExamPlacement, ModelBuilder};
use exsched_core::solver::{Solution, Solver};
use std::sync::Arc;

/// An instance with `nr_exams` exams over `nr_exams / 8` days of three
/// periods, two-exam enrollments per student.
fn make_model(nr_exams: usize) -> Arc<ExamModel> {
    let mut b = ModelBuilder::new();
    let nr_days = (nr_exams / 8).max(2);
    for day in 0..nr_days {
        for (slot, time) in ["08:00", "12:00", "16:00"].iter().enumerate() {
            b.add_period(
                &format!("p{}-{}", day, slot),
                &format!("day{}", day),
                time,
                120,
                0,
            );
        }
    }
    for room in 0..(nr_exams / 6).max(4) {
        b.add_room(
            &format!("r{}", room),
            &format!("Room {}", room),
            60,
            80,
            Some(((room % 4) as f64 * 30.0, (room / 4) as f64 * 30.0)),
        );
    }
    for exam in 0..nr_exams {
        b.add_exam(&format!("e{}", exam), 120, 0, None, false, None);
    }
    for student in 0..(nr_exams * 10) {
        let s = b.add_student(&format!("s{}", student));
        b.enroll_student(s, student % nr_exams);
        let second = (student * 13 + 5) % nr_exams;
        if second != student % nr_exams {
            b.enroll_student(s, second);
        }
    }
    Arc::new(b.build(&bench_config()).expect("bench model"))
}

fn bench_config() -> SolverConfig {
    let mut config = SolverConfig::new();
    config.set("Termination.MaxIters", "20000");
    config.set("General.Seed", "1");
    config.set("HillClimber.MaxIdle", "2000");
    config.set("Tabu.MaxIdle", "2000");
    config.set("Final.MaxIdle", "500");
    config.set("SimulatedAnnealing.TemperatureLength", "2000");
    config
}

/// Delta evaluation cost: the per-iteration hot path.
fn bench_move_value(c: &mut Criterion) {
    let model = make_model(48);
    let mut solution = Solution::new(model.clone());
    // Seed a schedule so deltas touch populated conflict tables.
    for exam in 0..model.exams().len() {
        let period = exam % model.periods().len();
        if let Some(rooms) = model.best_rooms(&solution.assignment, exam, period, false) {
            solution.iteration += 1;
            solution.assign(ExamPlacement::new(exam, period, rooms));
        }
    }
    let probe = ExamPlacement::new(
        0,
        model.periods().len() - 1,
        model
            .best_rooms(&solution.assignment, 0, model.periods().len() - 1, true)
            .expect("probe rooms"),
    );
    c.bench_function("move_value", |b| {
        b.iter(|| black_box(model.move_value(&solution.assignment, black_box(&probe))))
    });
}

/// End-to-end solve at two instance sizes.
fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    for nr_exams in [24usize, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(nr_exams),
            &nr_exams,
            |b, &nr_exams| {
                let model = make_model(nr_exams);
                let config = bench_config();
                b.iter(|| {
                    let mut solution = Solution::new(model.clone());
                    let mut solver = Solver::new(config.clone()).expect("solver");
                    solver.solve(&mut solution).expect("solve");
                    black_box(solution.total_value())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_move_value, bench_solve);
criterion_main!(benches);
