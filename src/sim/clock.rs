//! Fixed-timestep driver
//!
//! Frame deltas from the host vary; the session should always see `SIM_DT`.

use crate::consts::*;

/// Accumulates frame time and hands out whole simulation steps
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStep {
    step: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStep {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add a frame's worth of time and run `tick` once per whole step.
    /// Long frames are clamped so a stall can't snowball. Returns the
    /// number of steps run.
    pub fn advance(&mut self, frame_dt: f32, mut tick: impl FnMut(f32)) -> u32 {
        let frame_dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            tick(self.step);
            self.accumulator -= self.step;
            substeps += 1;
        }
        substeps
    }

    /// Fraction of a step left over, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    /// Drop leftover time (pause, round restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
