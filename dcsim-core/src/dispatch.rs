//! # Dispatch
//!
//! Chooses which server receives each new request.
//!
//! ## Policies:
//! - `Cyclic`: rotates through the servers in construction order, ignoring load.
//! - `LeastLoaded`: picks the server with the shortest waiting queue; ties go
//!   to the lowest server identifier.
//!
//! The dispatcher does not own the servers. The engine owns them for the
//! length of a run and lends them to [`Dispatcher::dispatch`] on every call.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::trace;

use crate::error::SimulationError;
use crate::request::Request;
use crate::server::{Server, ServerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchPolicy {
    Cyclic,
    LeastLoaded,
}

impl DispatchPolicy {
    pub const ALL: [DispatchPolicy; 2] = [DispatchPolicy::Cyclic, DispatchPolicy::LeastLoaded];

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchPolicy::Cyclic => "cyclic",
            DispatchPolicy::LeastLoaded => "least-loaded",
        }
    }
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchPolicy {
    type Err = SimulationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cyclic" | "round-robin" | "round_robin" => Ok(DispatchPolicy::Cyclic),
            "least-loaded" | "least_loaded" => Ok(DispatchPolicy::LeastLoaded),
            _ => Err(SimulationError::UnknownPolicy(name.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    policy: DispatchPolicy,
    rotation: u64,
}

impl Dispatcher {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self {
            policy,
            rotation: 0,
        }
    }

    /// Builds a dispatcher from a policy name.
    ///
    /// # Errors
    /// - `SimulationError::UnknownPolicy` - the name is not a recognized policy
    pub fn from_name(name: &str) -> Result<Self, SimulationError> {
        name.parse().map(Self::new)
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Selects a server per policy, enqueues `request` there and returns the
    /// chosen server's identifier.
    ///
    /// # Errors
    /// - `SimulationError::NoServers` - `servers` is empty
    pub fn dispatch(
        &mut self,
        servers: &mut [Server],
        request: Request,
    ) -> Result<ServerId, SimulationError> {
        if servers.is_empty() {
            return Err(SimulationError::NoServers);
        }

        let index = match self.policy {
            DispatchPolicy::Cyclic => self.next_in_rotation(servers.len()),
            DispatchPolicy::LeastLoaded => least_loaded(servers),
        };

        let target = &mut servers[index];
        trace!(request = %request.id(), server = %target.id(), policy = %self.policy, "dispatch");
        target.enqueue(request);
        Ok(target.id())
    }

    /// Diagnostic view of `servers` as seen by this dispatcher.
    pub fn status<'a>(&self, servers: &'a [Server]) -> DispatcherStatus<'a> {
        DispatcherStatus {
            policy: self.policy,
            servers,
        }
    }

    fn next_in_rotation(&mut self, server_count: usize) -> usize {
        let index = (self.rotation % server_count as u64) as usize;
        self.rotation += 1;
        index
    }
}

/// Multi-line summary: a header naming the policy, then one line per server.
pub struct DispatcherStatus<'a> {
    policy: DispatchPolicy,
    servers: &'a [Server],
}

impl fmt::Display for DispatcherStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dispatcher [{}]", self.policy)?;
        for server in self.servers {
            write!(f, "\n  {server}")?;
        }
        Ok(())
    }
}

/// Index of the first server with the shortest waiting queue.
fn least_loaded(servers: &[Server]) -> usize {
    let mut best = 0;
    for (index, server) in servers.iter().enumerate().skip(1) {
        if server.queue_length() < servers[best].queue_length() {
            best = index;
        }
    }
    best
}
