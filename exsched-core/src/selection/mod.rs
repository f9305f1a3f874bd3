//! Neighbour selections: repair, hill climbing, annealing, great deluge and
//! the phase controller, plus the name-keyed registry the configuration
//! drives.

mod annealing;
mod great_deluge;
mod hill_climber;
mod phase;
mod tabu;
#[cfg(test)]
mod tests;

pub use annealing::ExamSimulatedAnnealing;
pub use great_deluge::ExamGreatDeluge;
pub use hill_climber::ExamHillClimbing;
pub use phase::{ExamNeighbourSelection, Phase};
pub use tabu::ExamTabuSearch;

use crate::config::{ConfigError, SolverConfig};
use crate::construction::{ColoringConstruction, ExamConstruction};
use crate::neighbours::{ExamRandomMove, ExamRoomMove, ExamTimeMove, NeighbourSelection};
use crate::SolverError;

/// Default move-generator mix of the improvement phases.
pub const DEFAULT_NEIGHBOURS: &str = "ExamRandomMove;ExamRoomMove;ExamTimeMove";

/// Builds one selection by its registered name.
pub fn create(name: &str, config: &SolverConfig) -> Result<Box<dyn NeighbourSelection>, SolverError> {
    let selection: Box<dyn NeighbourSelection> = match name {
        "ExamRandomMove" => Box::new(ExamRandomMove::new()),
        "ExamRoomMove" => Box::new(ExamRoomMove::new()),
        "ExamTimeMove" => Box::new(ExamTimeMove::new()),
        "ExamColoringConstruction" => Box::new(ColoringConstruction::new()),
        "ExamConstruction" => Box::new(ExamConstruction::new(
            config.get_u64("Construction.MaxAttempts", 50)? as u32,
        )),
        "ExamTabuSearch" => Box::new(ExamTabuSearch::from_config(config)?),
        "ExamHillClimbing" => Box::new(ExamHillClimbing::from_config(config)?),
        "ExamSimulatedAnnealing" => Box::new(ExamSimulatedAnnealing::from_config(config)?),
        "ExamGreatDeluge" => Box::new(ExamGreatDeluge::from_config(config)?),
        "ExamNeighbourSelection" => Box::new(ExamNeighbourSelection::from_config(config)?),
        other => {
            return Err(ConfigError::InvalidValue {
                key: "Neighbour.Class".into(),
                value: other.into(),
                expected: "registered selection name",
            }
            .into())
        }
    };
    Ok(selection)
}

/// Parses a semicolon-separated list of selection names.
pub fn create_list(
    spec: &str,
    config: &SolverConfig,
) -> Result<Vec<Box<dyn NeighbourSelection>>, SolverError> {
    spec.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| create(name, config))
        .collect()
}

/// The solver's root selection, `Neighbour.Class` (the phase controller by
/// default).
pub fn create_root(config: &SolverConfig) -> Result<Box<dyn NeighbourSelection>, SolverError> {
    let name = config.get_str_or("Neighbour.Class", "ExamNeighbourSelection");
    create(&name, config)
}
