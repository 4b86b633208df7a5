//! ## dcsim-simulator::workload
//! **Arrival and service-time models**
//!
//! The engine asks an [`ArrivalProcess`] how many requests arrive in each
//! step and a [`ServiceTimeModel`] for each request's service duration, in
//! that order. Both draw from the engine's single [`SimulationRng`].
//!
//! ### Models:
//! - `PoissonArrivals`: exact Poisson arrival counts per step
//! - `ScriptedArrivals`: replays a fixed sequence of per-step counts
//! - `ExponentialService`: exponential service times with mean 1/μ
//! - `ConstantService`: every request takes the same time

use dcsim_core::SimTime;

use crate::rng::SimulationRng;

mod arrivals;
mod service;

pub use arrivals::{PoissonArrivals, ScriptedArrivals};
pub use service::{ConstantService, ExponentialService};

/// Number of arrivals in one clock step.
pub trait ArrivalProcess: Send {
    fn arrivals(&mut self, rng: &mut SimulationRng) -> u64;
}

/// Service duration of one request, sampled once at creation.
pub trait ServiceTimeModel: Send {
    fn service_duration(&mut self, rng: &mut SimulationRng) -> SimTime;
}
