//! Completion and drop accounting for a simulation run.

use std::fmt;

use crate::request::{Request, SimTime};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MetricsCollector {
    completed: u64,
    dropped: u64,
    total_response_time: SimTime,
    response_times: Vec<SimTime>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a completed request. Requests without a completion time are
    /// ignored.
    pub fn record_completion(&mut self, request: &Request) {
        let Some(response_time) = request.response_time() else {
            return;
        };
        self.completed += 1;
        self.total_response_time += response_time;
        self.response_times.push(response_time);
    }

    /// Registers a request dropped on timeout. Drops carry no response time.
    pub fn record_drop(&mut self, _request: &Request) {
        self.dropped += 1;
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Response times in completion order.
    pub fn response_times(&self) -> &[SimTime] {
        &self.response_times
    }

    pub fn total_requests(&self) -> u64 {
        self.completed + self.dropped
    }

    pub fn average_response_time(&self) -> SimTime {
        if self.completed == 0 {
            return 0.0;
        }
        self.total_response_time / self.completed as f64
    }

    /// Fraction of all handled requests that were dropped.
    pub fn drop_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        self.dropped as f64 / total as f64
    }

    /// Order-statistic percentile of response times, `0 <= p <= 100`.
    ///
    /// Uses index `max(0, floor(n * p / 100) - 1)` into the sorted values with
    /// no interpolation. Returns 0.0 when nothing has completed.
    pub fn percentile(&self, p: f64) -> SimTime {
        if self.response_times.is_empty() {
            return 0.0;
        }
        let mut sorted = self.response_times.clone();
        sorted.sort_by(f64::total_cmp);
        let rank = (sorted.len() as f64 * p / 100.0).floor() as usize;
        let index = rank.saturating_sub(1).min(sorted.len() - 1);
        sorted[index]
    }
}

impl fmt::Display for MetricsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "completed={}, dropped={}, avg_rt={:.4}",
            self.completed,
            self.dropped,
            self.average_response_time()
        )
    }
}
