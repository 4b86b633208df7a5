//! # Arrival Models

use std::collections::VecDeque;

use dcsim_core::SimulationError;
use rand_distr::Poisson;

use super::ArrivalProcess;
use crate::rng::SimulationRng;

/// Poisson arrivals: the count per step is drawn from Poisson(λ·step),
/// which is exact for a Poisson process over that interval.
#[derive(Debug, Clone)]
pub struct PoissonArrivals {
    mean: f64,
    // `None` when the mean is zero; no draw is made in that case.
    distribution: Option<Poisson<f64>>,
}

impl PoissonArrivals {
    /// Creates a model for rate `arrival_rate` over steps of length `step`.
    ///
    /// # Errors
    /// - `SimulationError::InvalidParameter` - the mean λ·step is negative,
    ///   not finite, or too large to sample
    pub fn new(arrival_rate: f64, step: f64) -> Result<Self, SimulationError> {
        let mean = arrival_rate * step;
        if !mean.is_finite() || mean < 0.0 {
            return Err(SimulationError::invalid(
                "arrival_rate",
                format!("mean arrivals per step must be finite and non-negative, got {mean}"),
            ));
        }
        let distribution = if mean == 0.0 {
            None
        } else {
            Some(
                Poisson::new(mean)
                    .map_err(|err| SimulationError::invalid("arrival_rate", err.to_string()))?,
            )
        };
        Ok(Self { mean, distribution })
    }

    /// Expected arrivals per step.
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl ArrivalProcess for PoissonArrivals {
    fn arrivals(&mut self, rng: &mut SimulationRng) -> u64 {
        match &self.distribution {
            Some(poisson) => rng.sample::<f64, _>(poisson) as u64,
            None => 0,
        }
    }
}

/// Replays a fixed list of per-step arrival counts, then produces none.
#[derive(Debug, Clone, Default)]
pub struct ScriptedArrivals {
    counts: VecDeque<u64>,
}

impl ScriptedArrivals {
    pub fn new(counts: impl IntoIterator<Item = u64>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
        }
    }
}

impl ArrivalProcess for ScriptedArrivals {
    fn arrivals(&mut self, _rng: &mut SimulationRng) -> u64 {
        self.counts.pop_front().unwrap_or(0)
    }
}
