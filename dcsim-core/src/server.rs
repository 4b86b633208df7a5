//! # Server
//!
//! A single server node: a FIFO waiting queue plus at most one request in
//! service. The server advances only when the engine ticks it.
//!
//! ## States:
//! - **idle**: no request in service
//! - **busy**: one request in service with a scheduled completion time

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::request::{Request, SimTime};

/// Server identifier, assigned in construction order starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ServerId(pub usize);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Server {
    id: ServerId,
    service_rate: f64,
    queue: VecDeque<Request>,
    current: Option<Request>,
}

impl Server {
    pub fn new(id: ServerId, service_rate: f64) -> Self {
        Self {
            id,
            service_rate,
            queue: VecDeque::new(),
            current: None,
        }
    }

    pub fn id(&self) -> ServerId {
        self.id
    }

    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    /// Number of waiting requests. The request in service is not counted.
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    /// The request currently in service, if any.
    pub fn current(&self) -> Option<&Request> {
        self.current.as_ref()
    }

    /// Waiting requests in FIFO order.
    pub fn waiting(&self) -> impl Iterator<Item = &Request> {
        self.queue.iter()
    }

    /// Appends a request to the tail of the waiting queue.
    pub fn enqueue(&mut self, request: Request) {
        self.queue.push_back(request);
    }

    /// Advances the server by one tick.
    ///
    /// Completes the request in service if its completion time has been
    /// reached, then starts the next waiting request if the server is idle.
    /// Both can happen in the same call. Returns the completed requests.
    pub fn advance(&mut self, now: SimTime) -> Vec<Request> {
        let mut completed = Vec::new();

        let finished = self
            .current
            .as_ref()
            .and_then(Request::completion_time)
            .is_some_and(|completion| now >= completion);
        if finished {
            if let Some(mut request) = self.current.take() {
                // Snap to the tick boundary; never leave completion in the future.
                request.set_completion(now);
                completed.push(request);
            }
        }

        if self.current.is_none() {
            if let Some(mut next) = self.queue.pop_front() {
                next.begin_service(now);
                self.current = Some(next);
            }
        }

        completed
    }

    /// Removes and returns every waiting request that has timed out at `now`.
    ///
    /// Kept requests retain their relative order. The request in service is
    /// never inspected.
    pub fn evict_timed_out(&mut self, now: SimTime) -> Vec<Request> {
        let (timed_out, kept): (Vec<_>, Vec<_>) = self
            .queue
            .drain(..)
            .partition(|request| request.is_timed_out(now));
        self.queue = kept.into();
        timed_out
    }

    /// Finalizes the request in service at the end of a run.
    ///
    /// A completion scheduled after `final_time` is clipped to `final_time`.
    /// Waiting requests are left where they are.
    pub fn drain(&mut self, final_time: SimTime) -> Option<Request> {
        let mut request = self.current.take()?;
        let completion = request
            .completion_time()
            .map_or(final_time, |scheduled| scheduled.min(final_time));
        request.set_completion(completion);
        Some(request)
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_busy() { "busy" } else { "idle" };
        write!(
            f,
            "{} (mu={}, status={}, queue_len={})",
            self.id,
            self.service_rate,
            status,
            self.queue_length()
        )
    }
}
