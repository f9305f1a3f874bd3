//! exsched: command-line front end for the examination timetabling solver.
//!
//! Usage: `exsched <config> [<input>] [<output>]`
//!
//! The configuration file is a flat key/value bag (properties or flat JSON).
//! The input and output paths, when given, override `General.Input` and
//! `General.OutputFile`. On success the best solution is written as XML, the
//! optional CSV reports are emitted next to `General.Output`, and a JSON
//! summary goes to stdout. Exit code 0 means the best solution was saved;
//! a fatal load or configuration failure exits non-zero.

use anyhow::{Context, Result};
use clap::Parser;
use exsched_core::config::SolverConfig;
use exsched_core::criteria::Criterion;
use exsched_core::io::{all_reports, save_csv, ExamXmlWriter, SolutionWriter};
use exsched_core::solver::Solution;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exsched")]
#[command(version)]
#[command(about = "Examination timetabling solver", long_about = None)]
struct Cli {
    /// Solver configuration file (properties or flat JSON)
    config: PathBuf,

    /// Input problem XML (overrides General.Input)
    input: Option<PathBuf>,

    /// Output solution XML (overrides General.OutputFile)
    output: Option<PathBuf>,
}

/// Machine-readable run summary printed to stdout.
#[derive(Serialize)]
struct Summary {
    total_value: f64,
    assigned: usize,
    unassigned: usize,
    iterations: u64,
    elapsed_seconds: f64,
    criteria: BTreeMap<String, f64>,
}

impl Summary {
    fn of(solution: &Solution) -> Self {
        let model = solution.model();
        let criteria = model
            .criteria()
            .iter()
            .map(|c| (c.name().to_string(), c.total(model, &solution.assignment)))
            .collect();
        Self {
            total_value: solution.total_value(),
            assigned: solution.assignment.nr_assigned(),
            unassigned: solution.assignment.nr_unassigned(),
            iterations: solution.iteration,
            elapsed_seconds: solution.elapsed(),
            criteria,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = SolverConfig::from_file(&cli.config)
        .with_context(|| format!("failed to read configuration {:?}", cli.config))?;
    if let Some(input) = &cli.input {
        config.set("General.Input", &input.to_string_lossy());
    }
    if let Some(output) = &cli.output {
        config.set("General.OutputFile", &output.to_string_lossy());
    }
    config.validate_keys().context("invalid configuration")?;

    let solution = exsched_core::solve_problem(&config)
        .map_err(|e| anyhow::anyhow!("solver failed: {}", e))?;
    debug!("timetable:\n{}", solution.display_timetable());

    if let Some(path) = config.get("General.OutputFile") {
        let xml = ExamXmlWriter
            .save(&solution)
            .map_err(|e| anyhow::anyhow!("cannot render solution: {}", e))?;
        fs::write(path, xml).with_context(|| format!("failed to write {}", path))?;
        info!("solution written to {}", path);
    }

    if config
        .get_bool("General.Reports", false)
        .context("invalid General.Reports")?
    {
        let directory = PathBuf::from(config.get_str_or("General.Output", "."));
        fs::create_dir_all(&directory)
            .with_context(|| format!("cannot create report directory {:?}", directory))?;
        let seed = config.get_u64("General.Seed", 0).context("invalid seed")?;
        for report in all_reports(seed) {
            let table = report.report(&solution);
            let path = directory.join(format!("{}.csv", report.name()));
            save_csv(&table, &path)
                .map_err(|e| anyhow::anyhow!("cannot write report {:?}: {}", path, e))?;
        }
        info!("reports written to {:?}", directory);
    }

    println!("{}", serde_json::to_string_pretty(&Summary::of(&solution))?);
    Ok(())
}
