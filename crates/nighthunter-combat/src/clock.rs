//! Simulation clock.
//!
//! The core never reads wall-clock time. Every timed rule (fire cooldown,
//! reload, shield expiry, ability cooldown) compares against [`Clock::now`],
//! and every multi-tick state machine advances by [`Clock::delta_time`].

/// Source of simulation time, in seconds.
pub trait Clock {
    /// Current simulation time (monotonic).
    fn now(&self) -> f32;
    /// Length of the current tick.
    fn delta_time(&self) -> f32;
}

/// Clock advanced explicitly by the owner of the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManualClock {
    now: f32,
    delta: f32,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: 0.0,
            delta: 0.0,
        }
    }

    /// Advances time by `dt` seconds and records it as the tick length.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.now += dt;
        self.delta = dt;
    }

    /// Jumps to an absolute time (never backwards).
    pub fn set(&mut self, now: f32) {
        let now = now.max(self.now);
        self.delta = now - self.now;
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f32 {
        self.now
    }

    fn delta_time(&self) -> f32 {
        self.delta
    }
}

/// Clock stepping at a fixed rate, as used by the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepClock {
    inner: ManualClock,
    step: f32,
    ticks: u64,
}

impl FixedStepClock {
    /// Creates a fixed-step clock running at `hz` ticks per second.
    #[must_use]
    pub fn from_hz(hz: f32) -> Self {
        Self {
            inner: ManualClock::new(),
            step: 1.0 / hz.max(1.0),
            ticks: 0,
        }
    }

    /// Advances one tick.
    pub fn tick(&mut self) {
        self.ticks += 1;
        // Derived from the tick count, never accumulated.
        let now = self.ticks as f32 * self.step;
        self.inner.set(now);
    }

    /// Number of ticks taken so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Seconds per tick.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }
}

impl Clock for FixedStepClock {
    fn now(&self) -> f32 {
        self.inner.now()
    }

    fn delta_time(&self) -> f32 {
        self.inner.delta_time()
    }
}
