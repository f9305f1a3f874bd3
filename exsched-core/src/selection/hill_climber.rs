//! Hill climbing over a mix of move generators.

use crate::config::SolverConfig;
use crate::neighbours::{Neighbour, NeighbourSelection};
use crate::selection::{self, DEFAULT_NEIGHBOURS};
use crate::solver::Solution;
use crate::SolverError;
use log::debug;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

/// Accepts only non-deteriorating moves; gives up after a configured number
/// of idle proposals in a row.
pub struct ExamHillClimbing {
    name: &'static str,
    generators: Vec<Box<dyn NeighbourSelection>>,
    max_idle: u64,
    idle: u64,
}

impl ExamHillClimbing {
    pub fn from_config(config: &SolverConfig) -> Result<Self, SolverError> {
        let spec = config.get_str_or("HillClimber.Neighbours", DEFAULT_NEIGHBOURS);
        Ok(Self::new(
            "ExamHillClimbing",
            selection::create_list(&spec, config)?,
            config.get_u64("HillClimber.MaxIdle", 25_000)?,
        ))
    }

    pub fn new(
        name: &'static str,
        generators: Vec<Box<dyn NeighbourSelection>>,
        max_idle: u64,
    ) -> Self {
        Self {
            name,
            generators,
            max_idle,
            idle: 0,
        }
    }
}

impl NeighbourSelection for ExamHillClimbing {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init(&mut self, solution: &mut Solution) {
        self.idle = 0;
        for generator in &mut self.generators {
            generator.init(solution);
        }
    }

    fn select(
        &mut self,
        solution: &mut Solution,
        rng: &mut ChaCha8Rng,
    ) -> Option<Box<dyn Neighbour>> {
        if self.generators.is_empty() {
            return None;
        }
        while self.idle < self.max_idle {
            let pick = rng.random_range(0..self.generators.len());
            let candidate = self.generators[pick].select(solution, rng);
            match candidate {
                Some(neighbour) => {
                    let delta = neighbour.value(solution);
                    if delta < 0.0 {
                        self.idle = 0;
                        return Some(neighbour);
                    }
                    self.idle += 1;
                    if delta == 0.0 {
                        return Some(neighbour);
                    }
                }
                None => {
                    self.idle += 1;
                }
            }
        }
        debug!("{}: idle budget {} exhausted", self.name, self.max_idle);
        None
    }
}
