//! Frame timing and the fixed-step accumulator
//!
//! Per-frame gameplay (input sampling, facing, AI decisions) runs on the
//! variable frame clock; movement and physics run on a fixed 60 Hz step
//! drained from the accumulator.

/// Fixed physics step, in seconds
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Cap on a single frame's delta so a stall cannot flood the accumulator
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Time manager for tracking frame timing and elapsed time.
///
/// Deltas are supplied by the caller rather than sampled from a wall
/// clock, so sessions can be stepped deterministically.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// Time elapsed over the last frame (in seconds)
    delta: f32,
    /// Total time elapsed since the session started (in seconds)
    elapsed: f64,
    /// Unconsumed time waiting to become fixed steps
    accumulator: f32,
    /// Number of fixed steps consumed so far
    fixed_ticks: u64,
}

impl Time {
    pub fn new() -> Self {
        Self {
            delta: 0.0,
            elapsed: 0.0,
            accumulator: 0.0,
            fixed_ticks: 0,
        }
    }

    /// Advance by one frame. Call once per frame before draining fixed steps.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_TIME);
        self.delta = dt;
        self.elapsed += f64::from(dt);
        self.accumulator += dt;
    }

    /// Consume one fixed step from the accumulator if enough time is banked.
    ///
    /// Drive with `while time.consume_fixed_step() { ... }`.
    pub fn consume_fixed_step(&mut self) -> bool {
        if self.accumulator >= FIXED_TIMESTEP {
            self.accumulator -= FIXED_TIMESTEP;
            self.fixed_ticks += 1;
            true
        } else {
            false
        }
    }

    /// Time elapsed over the last frame in seconds
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Total time elapsed since the session started in seconds
    #[inline]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Number of fixed steps consumed so far
    #[inline]
    pub fn fixed_ticks(&self) -> u64 {
        self.fixed_ticks
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
