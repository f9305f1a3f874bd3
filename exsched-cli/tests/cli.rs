//! End-to-end CLI tests against the compiled binary.

use std::fs;
use std::process::Command;

const INPUT_XML: &str = r#"<examtt>
  <periods>
    <period id="1" day="day1" time="08:00" length="120" penalty="0"/>
    <period id="2" day="day1" time="10:00" length="120" penalty="0"/>
  </periods>
  <rooms>
    <room id="A" name="Hall A" size="20" alt="20"/>
    <room id="B" name="Hall B" size="20" alt="20"/>
  </rooms>
  <exams>
    <exam id="X" length="60"/>
    <exam id="Y" length="60"/>
  </exams>
  <students>
    <student id="s1"><exam id="X"/><exam id="Y"/></student>
    <student id="s2"><exam id="X"/><exam id="Y"/></student>
  </students>
</examtt>
"#;

const CONFIG: &str = "Termination.MaxIters = 5000\n\
General.Seed = 7\n\
HillClimber.MaxIdle = 200\n\
Tabu.MaxIdle = 200\n\
Final.MaxIdle = 100\n\
SimulatedAnnealing.TemperatureLength = 200\n";

#[test]
fn solves_a_problem_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("solver.cfg");
    let input_path = dir.path().join("exam.xml");
    let output_path = dir.path().join("solution.xml");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&input_path, INPUT_XML).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_exsched"))
        .arg(&config_path)
        .arg(&input_path)
        .arg(&output_path)
        .output()
        .expect("binary runs");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let solution = fs::read_to_string(&output_path).unwrap();
    assert!(solution.contains("<assignment"));
    assert!(solution.contains("exam=\"X\""));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["unassigned"], 0);
    assert_eq!(summary["criteria"]["StudentDirectConflicts"], 0.0);
}

#[test]
fn reports_are_emitted_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("solver.cfg");
    let input_path = dir.path().join("exam.xml");
    let report_dir = dir.path().join("reports");
    let config = format!(
        "{}General.Reports = true\nGeneral.Output = {}\n",
        CONFIG,
        report_dir.display()
    );
    fs::write(&config_path, config).unwrap();
    fs::write(&input_path, INPUT_XML).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_exsched"))
        .arg(&config_path)
        .arg(&input_path)
        .output()
        .expect("binary runs");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    for name in ["exam-schedule", "period-usage", "summary"] {
        let path = report_dir.join(format!("{}.csv", name));
        assert!(path.exists(), "missing report {:?}", path);
    }
}

#[test]
fn fails_fast_on_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("solver.cfg");
    let input_path = dir.path().join("exam.xml");
    fs::write(&config_path, CONFIG).unwrap();
    // Student enrolls into an exam that does not exist.
    fs::write(
        &input_path,
        INPUT_XML.replace("<exam id=\"X\"/><exam id=\"Y\"/>", "<exam id=\"missing\"/>"),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_exsched"))
        .arg(&config_path)
        .arg(&input_path)
        .output()
        .expect("binary runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed input"), "stderr: {}", stderr);
}

#[test]
fn rejects_unknown_configuration_key() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("solver.cfg");
    let input_path = dir.path().join("exam.xml");
    fs::write(&config_path, format!("{}Termination.MaxIter = 5\n", CONFIG)).unwrap();
    fs::write(&input_path, INPUT_XML).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_exsched"))
        .arg(&config_path)
        .arg(&input_path)
        .output()
        .expect("binary runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid configuration"), "stderr: {}", stderr);
}
