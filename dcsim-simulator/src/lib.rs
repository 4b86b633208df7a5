// dcsim-simulator/src/lib.rs

/*!
# dcsim Simulator

Discrete-time simulation of request handling in a data center. Requests
arrive as a Poisson process, a dispatcher routes each one to a server, and
servers work through their FIFO queues with exponential service times.

## Key Components:
- **Virtual Clock:** Fixed-step simulated time starting at zero.
- **Random Stream:** One seedable stream per run; a seed reproduces the run.
- **Workload Models:** Poisson arrivals and exponential service times, with
  scripted and constant variants for controlled experiments.
- **Engine:** The per-tick pipeline and the end-of-run drain.
- **Report:** Summary statistics plus a BLAKE3 fingerprint of the run.
*/

pub mod engine;
pub mod report;
pub mod rng;
pub mod virtual_clock;
pub mod workload;

pub use engine::{SimulationEngine, TickOutcome};
pub use report::SimulationReport;
pub use rng::SimulationRng;
pub use virtual_clock::VirtualClock;
