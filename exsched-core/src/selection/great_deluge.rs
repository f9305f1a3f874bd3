//! Great-deluge acceptance.
//!
//! A bound starts above the current total and sinks multiplicatively each
//! iteration; any move keeping the total at or under the bound is accepted.
//! When the bound reaches the lower-rate band of the best value, it resets to
//! the current total plus slack. Bound state lives in an assignment context.

use crate::config::SolverConfig;
use crate::neighbours::{Neighbour, NeighbourSelection};
use crate::selection::{self, DEFAULT_NEIGHBOURS};
use crate::solver::Solution;
use crate::SolverError;
use log::debug;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

const MAX_ATTEMPTS: usize = 1000;

struct GdContext {
    bound: f64,
    resets: u64,
}

pub struct ExamGreatDeluge {
    generators: Vec<Box<dyn NeighbourSelection>>,
    upper_bound_rate: f64,
    lower_bound_rate: f64,
    cool_rate: f64,
    component: Option<usize>,
}

impl ExamGreatDeluge {
    pub fn from_config(config: &SolverConfig) -> Result<Self, SolverError> {
        let spec = config.get_str_or("GreatDeluge.Neighbours", DEFAULT_NEIGHBOURS);
        Ok(Self {
            generators: selection::create_list(&spec, config)?,
            upper_bound_rate: config.get_f64("GreatDeluge.UpperBoundRate", 1.05)?,
            lower_bound_rate: config.get_f64("GreatDeluge.LowerBoundRate", 0.97)?,
            cool_rate: config.get_f64("GreatDeluge.CoolRate", 0.999_999_5)?,
            component: None,
        })
    }

    fn initial_bound(&self, total: f64) -> f64 {
        if total > 0.0 {
            total * self.upper_bound_rate
        } else {
            total + 1.0
        }
    }
}

impl NeighbourSelection for ExamGreatDeluge {
    fn name(&self) -> &'static str {
        "ExamGreatDeluge"
    }

    fn init(&mut self, solution: &mut Solution) {
        let component = solution.model().register_component();
        self.component = Some(component);
        let bound = self.initial_bound(solution.total_value());
        solution
            .assignment
            .context_mut(component, || GdContext { bound, resets: 0 });
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
        let total = solution.total_value();
        let best = solution.best().map(|b| b.total).unwrap_or(total);
        let init_bound = self.initial_bound(total);

        let bound = {
            let ctx = solution.assignment.context_mut(component, || GdContext {
                bound: init_bound,
                resets: 0,
            });
            ctx.bound *= self.cool_rate;
            if ctx.bound < best * self.lower_bound_rate {
                // Stagnation: lift the water level back above the surface.
                ctx.bound = init_bound;
                ctx.resets += 1;
                debug!("great deluge reset #{} to bound {:.2}", ctx.resets, ctx.bound);
            }
            ctx.bound
        };

        for _ in 0..MAX_ATTEMPTS {
            let pick = rng.random_range(0..self.generators.len());
            let neighbour = match self.generators[pick].select(solution, rng) {
                Some(n) => n,
                None => continue,
            };
            let delta = neighbour.value(solution);
            if delta <= 0.0 || total + delta <= bound {
                return Some(neighbour);
            }
        }
        debug!("great deluge stuck at bound {:.2}", bound);
        None
    }
}
