//! # Service-Time Models

use dcsim_core::{SimTime, SimulationError};
use rand_distr::Exp;

use super::ServiceTimeModel;
use crate::rng::SimulationRng;

/// Exponential service times with rate μ (mean 1/μ).
#[derive(Debug, Clone)]
pub struct ExponentialService {
    distribution: Exp<f64>,
}

impl ExponentialService {
    /// # Errors
    /// - `SimulationError::InvalidParameter` - `service_rate` is not a
    ///   positive finite number
    pub fn new(service_rate: f64) -> Result<Self, SimulationError> {
        if !service_rate.is_finite() || service_rate <= 0.0 {
            return Err(SimulationError::invalid(
                "service_rate",
                format!("must be positive and finite, got {service_rate}"),
            ));
        }
        let distribution = Exp::new(service_rate)
            .map_err(|err| SimulationError::invalid("service_rate", err.to_string()))?;
        Ok(Self { distribution })
    }
}

impl ServiceTimeModel for ExponentialService {
    fn service_duration(&mut self, rng: &mut SimulationRng) -> SimTime {
        rng.sample(&self.distribution)
    }
}

/// Deterministic service: every request takes `duration`.
#[derive(Debug, Clone, Copy)]
pub struct ConstantService {
    duration: SimTime,
}

impl ConstantService {
    pub fn new(duration: SimTime) -> Self {
        Self { duration }
    }
}

impl ServiceTimeModel for ConstantService {
    fn service_duration(&mut self, _rng: &mut SimulationRng) -> SimTime {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_mean() {
        let mut model = ExponentialService::new(1.5).unwrap();
        let mut rng = SimulationRng::from_seed(42);
        let iterations = 20_000;
        let samples: Vec<f64> = (0..iterations)
            .map(|_| model.service_duration(&mut rng))
            .collect();
        assert!(samples.iter().all(|s| *s >= 0.0));
        let mean = samples.iter().sum::<f64>() / iterations as f64;
        assert!((mean - 1.0 / 1.5).abs() < 0.03, "observed mean {mean}");
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(ExponentialService::new(0.0).is_err());
        assert!(ExponentialService::new(-2.0).is_err());
        assert!(ExponentialService::new(f64::NAN).is_err());
    }

    #[test]
    fn test_constant_service() {
        let mut model = ConstantService::new(2.5);
        let mut rng = SimulationRng::from_seed(0);
        assert_eq!(model.service_duration(&mut rng), 2.5);
        assert_eq!(model.service_duration(&mut rng), 2.5);
    }
}
