//! Termination conditions.

use super::Solution;
use crate::config::SolverConfig;
use crate::SolverError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Decides whether the solver may run another iteration.
pub trait TerminationCondition: Send {
    fn can_continue(&self, solution: &Solution) -> bool;
}

/// The standard condition: iteration budget, wall-clock budget, optional
/// stop-on-complete, and the cooperative stop flag.
pub struct GeneralTermination {
    stop_when_complete: bool,
    max_iters: Option<u64>,
    timeout: Option<f64>,
    started: Instant,
    stop: Arc<AtomicBool>,
}

impl GeneralTermination {
    pub fn from_config(config: &SolverConfig, stop: Arc<AtomicBool>) -> Result<Self, SolverError> {
        let max_iters = match config.get_u64("Termination.MaxIters", 0)? {
            0 => None,
            n => Some(n),
        };
        let timeout = match config.get_f64("Termination.TimeOut", 0.0)? {
            t if t > 0.0 => Some(t),
            _ => None,
        };
        Ok(Self {
            stop_when_complete: config.get_bool("Termination.StopWhenComplete", false)?,
            max_iters,
            timeout,
            started: Instant::now(),
            stop,
        })
    }
}

impl TerminationCondition for GeneralTermination {
    fn can_continue(&self, solution: &Solution) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return false;
        }
        if let Some(max) = self.max_iters {
            if solution.iteration >= max {
                return false;
            }
        }
        if let Some(timeout) = self.timeout {
            if self.started.elapsed().as_secs_f64() >= timeout {
                return false;
            }
        }
        if self.stop_when_complete && solution.is_complete() {
            return false;
        }
        true
    }
}
