//! Discrete-time simulation engine.
//!
//! Each tick runs a fixed pipeline: advance the clock, generate and dispatch
//! arrivals, evict timed-out waiting requests, then advance every server.
//! Servers are always visited in construction order.

use dcsim_config::SimulationConfig;
use dcsim_core::{
    DispatchPolicy, Dispatcher, MetricsCollector, Request, RequestIdGenerator, Server, ServerId,
    SimTime, SimulationError,
};
use dcsim_telemetry::{EventLogger, MetricsRecorder};
use tracing::{debug, info, info_span};

use crate::report::{fingerprint, SimulationReport};
use crate::rng::SimulationRng;
use crate::virtual_clock::VirtualClock;
use crate::workload::{ArrivalProcess, ExponentialService, PoissonArrivals, ServiceTimeModel};

#[cfg(test)]
mod tests;

/// What happened during a single tick.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub time: SimTime,
    pub arrivals: u64,
    /// Requests evicted on timeout, in server order.
    pub dropped: Vec<Request>,
    /// Requests completed by the servers, in server order.
    pub completed: Vec<Request>,
}

impl TickOutcome {
    fn is_quiet(&self) -> bool {
        self.arrivals == 0 && self.dropped.is_empty() && self.completed.is_empty()
    }
}

pub struct SimulationEngine {
    clock: VirtualClock,
    duration: SimTime,
    total_ticks: u64,
    arrival_rate: f64,
    service_rate: f64,
    request_timeout: SimTime,
    utilization: f64,
    rng: SimulationRng,
    arrivals: Box<dyn ArrivalProcess>,
    service: Box<dyn ServiceTimeModel>,
    ids: RequestIdGenerator,
    servers: Vec<Server>,
    dispatcher: Dispatcher,
    metrics: MetricsCollector,
    recorder: Option<MetricsRecorder>,
    drained: bool,
}

impl SimulationEngine {
    /// Builds an engine with Poisson arrivals and exponential service times.
    ///
    /// # Errors
    /// - `SimulationError::InvalidParameter` - a numeric parameter is out of range
    /// - `SimulationError::UnknownPolicy` - the policy name is not recognized
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        validate_parameters(config)?;
        let arrivals = PoissonArrivals::new(config.arrival_rate, config.step)?;
        let service = ExponentialService::new(config.service_rate)?;
        Self::with_workload(
            config,
            SimulationRng::new(config.seed),
            Box::new(arrivals),
            Box::new(service),
        )
    }

    /// Builds an engine around caller-supplied workload models and stream.
    ///
    /// `config.arrival_rate`, `config.service_rate` and `config.seed` are then
    /// only used for the reported utilization.
    pub fn with_workload(
        config: &SimulationConfig,
        rng: SimulationRng,
        arrivals: Box<dyn ArrivalProcess>,
        service: Box<dyn ServiceTimeModel>,
    ) -> Result<Self, SimulationError> {
        validate_parameters(config)?;
        let dispatcher = Dispatcher::from_name(&config.policy)?;

        let servers = (0..config.servers)
            .map(|index| Server::new(ServerId(index), config.service_rate))
            .collect();

        Ok(Self {
            clock: VirtualClock::new(config.step),
            duration: config.duration,
            total_ticks: (config.duration / config.step).floor() as u64,
            arrival_rate: config.arrival_rate,
            service_rate: config.service_rate,
            request_timeout: config.request_timeout.unwrap_or(SimTime::INFINITY),
            utilization: config.utilization(),
            rng,
            arrivals,
            service,
            ids: RequestIdGenerator::new(),
            servers,
            dispatcher,
            metrics: MetricsCollector::new(),
            recorder: None,
            drained: false,
        })
    }

    /// Mirrors every arrival, drop and completion into `recorder`.
    pub fn with_recorder(mut self, recorder: MetricsRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.dispatcher.policy()
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Theoretical utilization ρ = λ / (N·μ).
    pub fn utilization(&self) -> f64 {
        self.utilization
    }

    /// Ticks in a full run: `floor(duration / step)`.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Requests created so far.
    pub fn generated(&self) -> u64 {
        self.ids.issued()
    }

    /// One line per server under a dispatcher header.
    pub fn status(&self) -> String {
        self.dispatcher.status(&self.servers).to_string()
    }

    pub fn is_finished(&self) -> bool {
        self.drained
    }

    /// Runs every remaining tick, drains the servers and reports.
    ///
    /// Calling `run` again on a finished engine returns the same report
    /// without advancing.
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        let span = info_span!("simulation_run", policy = %self.policy(), seed = self.seed());
        let _entered = span.enter();

        if !self.drained {
            info!(
                "Starting simulation λ={}, μ={}, ρ={:.3}, duration={}, step={}",
                self.arrival_rate,
                self.service_rate,
                self.utilization,
                self.duration,
                self.clock.step()
            );
            info!(servers = self.servers.len(), policy = %self.policy(), "Servers ready");

            while self.clock.ticks() < self.total_ticks {
                self.step()?;
            }
            self.drain();
            debug!("{}", self.dispatcher.status(&self.servers));
        }

        let report = self.report();
        info!(
            completed = report.completed,
            dropped = report.dropped,
            abandoned = report.abandoned,
            "Simulation complete"
        );
        Ok(report)
    }

    /// Executes one tick: arrivals, then eviction, then server advancement.
    ///
    /// # Errors
    /// - `SimulationError::RunFinished` - every tick of the duration has run,
    ///   or the engine has already drained
    /// - `SimulationError::NoServers` - dispatch found no server to target
    pub fn step(&mut self) -> Result<TickOutcome, SimulationError> {
        if self.drained || self.clock.ticks() >= self.total_ticks {
            return Err(SimulationError::RunFinished(self.clock.now()));
        }
        let now = self.clock.advance();
        let mut outcome = TickOutcome {
            time: now,
            ..TickOutcome::default()
        };

        // Arrival count first, then one service draw per arrival.
        outcome.arrivals = self.arrivals.arrivals(&mut self.rng);
        for _ in 0..outcome.arrivals {
            let service_duration = self.service.service_duration(&mut self.rng);
            let request = Request::with_timeout(
                self.ids.next_id(),
                now,
                service_duration,
                self.request_timeout,
            );
            if let Some(recorder) = &self.recorder {
                recorder.inc_arrived();
            }
            self.dispatcher.dispatch(&mut self.servers, request)?;
        }

        outcome.dropped = self
            .servers
            .iter_mut()
            .flat_map(|server| server.evict_timed_out(now))
            .collect();
        for request in &outcome.dropped {
            self.record_drop(request);
        }

        outcome.completed = self
            .servers
            .iter_mut()
            .flat_map(|server| server.advance(now))
            .collect();
        for request in &outcome.completed {
            self.record_completion(request);
        }

        if !outcome.is_quiet() {
            debug!(
                time = now,
                arrivals = outcome.arrivals,
                dropped = outcome.dropped.len(),
                completed = outcome.completed.len(),
                "tick"
            );
        }
        Ok(outcome)
    }

    /// Force-completes every in-service request at the current clock.
    ///
    /// Requests still waiting in a queue are abandoned: they are counted
    /// neither as completed nor as dropped.
    fn drain(&mut self) {
        let final_time = self.clock.now();
        let drained: Vec<Request> = self
            .servers
            .iter_mut()
            .filter_map(|server| server.drain(final_time))
            .collect();
        for request in &drained {
            self.record_completion(request);
        }
        self.drained = true;
    }

    fn record_drop(&mut self, request: &Request) {
        EventLogger::log_outcome("dropped", request.id().0, self.clock.now());
        self.metrics.record_drop(request);
        if let Some(recorder) = &self.recorder {
            recorder.inc_dropped();
        }
    }

    fn record_completion(&mut self, request: &Request) {
        if let Some(completion) = request.completion_time() {
            EventLogger::log_outcome("completed", request.id().0, completion);
        }
        self.metrics.record_completion(request);
        if let (Some(recorder), Some(response_time)) = (&self.recorder, request.response_time()) {
            recorder.observe_completion(response_time);
        }
    }

    /// Requests currently waiting in any queue.
    fn waiting(&self) -> u64 {
        self.servers
            .iter()
            .map(|server| server.queue_length() as u64)
            .sum()
    }

    /// Summary of the run so far.
    pub fn report(&self) -> SimulationReport {
        let generated = self.generated();
        let abandoned = self.waiting();
        SimulationReport {
            policy: self.policy(),
            seed: self.seed(),
            servers: self.servers.len(),
            utilization: self.utilization,
            final_time: self.clock.now(),
            generated,
            completed: self.metrics.completed(),
            dropped: self.metrics.dropped(),
            abandoned,
            drop_rate: self.metrics.drop_rate(),
            average_response_time: self.metrics.average_response_time(),
            median_response_time: self.metrics.percentile(50.0),
            p95_response_time: self.metrics.percentile(95.0),
            fingerprint: fingerprint(generated, abandoned, &self.metrics),
        }
    }
}

/// Rejects parameter values the tick loop cannot run with.
fn validate_parameters(config: &SimulationConfig) -> Result<(), SimulationError> {
    if config.servers == 0 {
        return Err(SimulationError::invalid("servers", "at least one server is required"));
    }
    if !config.step.is_finite() || config.step <= 0.0 {
        return Err(SimulationError::invalid(
            "step",
            format!("must be positive and finite, got {}", config.step),
        ));
    }
    if !config.service_rate.is_finite() || config.service_rate <= 0.0 {
        return Err(SimulationError::invalid(
            "service_rate",
            format!("must be positive and finite, got {}", config.service_rate),
        ));
    }
    if !config.arrival_rate.is_finite() || config.arrival_rate < 0.0 {
        return Err(SimulationError::invalid(
            "arrival_rate",
            format!("must be non-negative and finite, got {}", config.arrival_rate),
        ));
    }
    if !config.duration.is_finite() || config.duration < 0.0 {
        return Err(SimulationError::invalid(
            "duration",
            format!("must be non-negative and finite, got {}", config.duration),
        ));
    }
    if let Some(timeout) = config.request_timeout {
        if timeout.is_nan() || timeout < 0.0 {
            return Err(SimulationError::invalid(
                "request_timeout",
                format!("must be non-negative, got {timeout}"),
            ));
        }
    }
    Ok(())
}
