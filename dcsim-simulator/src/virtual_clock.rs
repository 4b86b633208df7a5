//! # Virtual Clock for Simulation
//!
//! A fixed-step clock. Time starts at zero and only moves forward, one step
//! per tick. Steps are accumulated, so the clock after `n` ticks equals the
//! floating-point sum of `n` steps.

use dcsim_core::SimTime;

#[derive(Debug, Clone)]
pub struct VirtualClock {
    now: SimTime,
    step: SimTime,
    ticks: u64,
}

impl VirtualClock {
    /// Creates a clock at time zero advancing by `step` per tick.
    pub fn new(step: SimTime) -> Self {
        Self {
            now: 0.0,
            step,
            ticks: 0,
        }
    }

    /// Returns the current simulation time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    #[inline]
    pub fn step(&self) -> SimTime {
        self.step
    }

    /// Number of ticks taken so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances the clock by one step and returns the new time.
    #[inline]
    pub fn advance(&mut self) -> SimTime {
        self.now += self.step;
        self.ticks += 1;
        self.now
    }
}
