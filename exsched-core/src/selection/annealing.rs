//! Simulated annealing.
//!
//! Metropolis acceptance over the shared move-generator mix: improving moves
//! always pass, deteriorating ones with probability `exp(−Δ/T)`. The
//! temperature cools geometrically after every `TemperatureLength` accepted
//! iterations and optionally reheats on long stagnation. The temperature
//! state lives in an assignment context, so each parallel worker anneals its
//! own schedule.

use crate::config::SolverConfig;
use crate::neighbours::{Neighbour, NeighbourSelection};
use crate::selection::{self, DEFAULT_NEIGHBOURS};
use crate::solver::Solution;
use crate::SolverError;
use log::debug;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

/// Proposal budget of one `select` call; past it the phase reads as stuck.
const MAX_ATTEMPTS: usize = 1000;

struct SaContext {
    iteration: u64,
    temperature: f64,
    last_improving: u64,
    reheats: u64,
}

pub struct ExamSimulatedAnnealing {
    generators: Vec<Box<dyn NeighbourSelection>>,
    initial_temperature: f64,
    cooling_rate: f64,
    temperature_length: u64,
    reheat_length_coef: f64,
    component: Option<usize>,
}

impl ExamSimulatedAnnealing {
    pub fn from_config(config: &SolverConfig) -> Result<Self, SolverError> {
        let spec = config.get_str_or("SimulatedAnnealing.Neighbours", DEFAULT_NEIGHBOURS);
        Ok(Self {
            generators: selection::create_list(&spec, config)?,
            initial_temperature: config.get_f64("SimulatedAnnealing.InitialTemperature", 1.5)?,
            cooling_rate: config.get_f64("SimulatedAnnealing.CoolingRate", 0.95)?,
            temperature_length: config
                .get_u64("SimulatedAnnealing.TemperatureLength", 25_000)?
                .max(1),
            reheat_length_coef: config.get_f64("SimulatedAnnealing.ReheatLengthCoef", 5.0)?,
            component: None,
        })
    }
}

impl NeighbourSelection for ExamSimulatedAnnealing {
    fn name(&self) -> &'static str {
        "ExamSimulatedAnnealing"
    }

    fn init(&mut self, solution: &mut Solution) {
        let component = solution.model().register_component();
        self.component = Some(component);
        let initial = self.initial_temperature;
        solution.assignment.context_mut(component, || SaContext {
            iteration: 0,
            temperature: initial,
            last_improving: 0,
            reheats: 0,
        });
    }

    fn select(
        &mut self,
        solution: &mut Solution,
        rng: &mut ChaCha8Rng,
    ) -> Option<Box<dyn Neighbour>> {
        if self.generators.is_empty() {
            return None;
        }
        let component = match self.component {
            Some(c) => c,
            None => {
                self.init(solution);
                self.component?
            }
        };

        // One select call is one annealing iteration.
        let initial = self.initial_temperature;
        let (temperature, iteration) = {
            let ctx = solution.assignment.context_mut(component, || SaContext {
                iteration: 0,
                temperature: initial,
                last_improving: 0,
                reheats: 0,
            });
            ctx.iteration += 1;
            if ctx.iteration % self.temperature_length == 0 {
                ctx.temperature *= self.cooling_rate;
            }
            let reheat_length =
                (self.reheat_length_coef * self.temperature_length as f64) as u64;
            if self.reheat_length_coef > 0.0
                && reheat_length > 0
                && ctx.iteration - ctx.last_improving > reheat_length
            {
                ctx.temperature = initial;
                ctx.last_improving = ctx.iteration;
                ctx.reheats += 1;
                debug!("annealing reheat #{}", ctx.reheats);
            }
            (ctx.temperature, ctx.iteration)
        };

        for _ in 0..MAX_ATTEMPTS {
            let pick = rng.random_range(0..self.generators.len());
            let neighbour = match self.generators[pick].select(solution, rng) {
                Some(n) => n,
                None => continue,
            };
            let delta = neighbour.value(solution);
            let accept = delta <= 0.0
                || (temperature > 0.0 && rng.random::<f64>() < (-delta / temperature).exp());
            if accept {
                if delta < 0.0 {
                    let ctx = solution.assignment.context_mut(component, || SaContext {
                        iteration: 0,
                        temperature: initial,
                        last_improving: 0,
                        reheats: 0,
                    });
                    ctx.last_improving = iteration;
                }
                return Some(neighbour);
            }
        }
        debug!("annealing stuck at temperature {:.5}", temperature);
        None
    }
}
