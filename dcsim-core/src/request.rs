//! Client requests and their timing lifecycle.

use std::fmt;

use serde::Serialize;

/// Simulation time in abstract time units.
pub type SimTime = f64;

/// Unique, monotonically increasing request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Hands out request identifiers for a single simulation run.
///
/// Owned by the engine so that concurrent runs never share a counter.
#[derive(Debug, Default, Clone)]
pub struct RequestIdGenerator {
    issued: u64,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next identifier. The first one issued is `1`.
    pub fn next_id(&mut self) -> RequestId {
        self.issued += 1;
        RequestId(self.issued)
    }

    /// Number of identifiers issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

/// A single client request.
///
/// Arrival time, service duration and timeout are fixed at creation. The
/// start and completion timestamps stay `None` until the owning server sets
/// them, so "not yet happened" is never confused with "happened at t = 0".
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    id: RequestId,
    arrival_time: SimTime,
    service_duration: SimTime,
    timeout: SimTime,
    start_time: Option<SimTime>,
    completion_time: Option<SimTime>,
}

impl Request {
    /// Creates a request with an unbounded timeout.
    pub fn new(id: RequestId, arrival_time: SimTime, service_duration: SimTime) -> Self {
        Self::with_timeout(id, arrival_time, service_duration, SimTime::INFINITY)
    }

    pub fn with_timeout(
        id: RequestId,
        arrival_time: SimTime,
        service_duration: SimTime,
        timeout: SimTime,
    ) -> Self {
        debug_assert!(timeout >= 0.0, "timeout must be non-negative");
        Self {
            id,
            arrival_time,
            service_duration,
            timeout,
            start_time: None,
            completion_time: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn arrival_time(&self) -> SimTime {
        self.arrival_time
    }

    pub fn service_duration(&self) -> SimTime {
        self.service_duration
    }

    pub fn timeout(&self) -> SimTime {
        self.timeout
    }

    pub fn start_time(&self) -> Option<SimTime> {
        self.start_time
    }

    pub fn completion_time(&self) -> Option<SimTime> {
        self.completion_time
    }

    /// Time spent waiting in a queue before service started.
    pub fn wait_time(&self) -> Option<SimTime> {
        self.start_time.map(|start| start - self.arrival_time)
    }

    /// Total time from arrival to completion (wait + service).
    pub fn response_time(&self) -> Option<SimTime> {
        self.completion_time
            .map(|completion| completion - self.arrival_time)
    }

    /// True when the request is still waiting and has waited longer than its
    /// timeout. A request in service is never timed out.
    pub fn is_timed_out(&self, now: SimTime) -> bool {
        if self.start_time.is_some() {
            return false;
        }
        now - self.arrival_time > self.timeout
    }

    pub fn has_started(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }

    /// Marks the start of service and schedules the completion.
    pub(crate) fn begin_service(&mut self, now: SimTime) {
        self.start_time = Some(now);
        self.completion_time = Some(now + self.service_duration);
    }

    pub(crate) fn set_completion(&mut self, at: SimTime) {
        self.completion_time = Some(at);
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (arrival={:.3}, service={:.3}, timeout={})",
            self.id, self.arrival_time, self.service_duration, self.timeout
        )
    }
}
