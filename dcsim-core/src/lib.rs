//! # dcsim-core
//!
//! Domain model for the data center load simulation.
//!
//! ### Key Submodules:
//! - `request`: Client requests and their timing lifecycle
//! - `server`: FIFO server state machine advanced one tick at a time
//! - `dispatch`: Load-balancing policies (cyclic, least-loaded)
//! - `metrics`: Completion/drop counters and response-time statistics
//!
//! Everything in this crate is synchronous and deterministic. Randomness and
//! the clock are owned by the simulation engine in `dcsim-simulator`.

pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod request;
pub mod server;

pub use dispatch::{DispatchPolicy, Dispatcher, DispatcherStatus};
pub use error::SimulationError;
pub use metrics::MetricsCollector;
pub use request::{Request, RequestId, RequestIdGenerator, SimTime};
pub use server::{Server, ServerId};
