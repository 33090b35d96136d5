//! Score, combo points and the bonus multiplier
//!
//! Rules:
//! - 1 fruit = 1 point
//! - N fruits in one cut group = N + (N - 1) points
//! - The active multiplier (x2, x4, x6...) applies to the group total

use serde::{Deserialize, Serialize};

use super::entity::FruitType;
use crate::consts::*;

/// Round score and multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringState {
    pub score: u64,
    /// Always >= 1; 1 means no multiplier
    pub multiplier: u32,
    /// Seconds left on the multiplier (0 when `multiplier == 1`)
    pub multiplier_remaining: f32,
}

impl Default for ScoringState {
    fn default() -> Self {
        Self {
            score: 0,
            multiplier: 1,
            multiplier_remaining: 0.0,
        }
    }
}

impl ScoringState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Base points for a group of `count` fruits cut together
    pub fn group_points(count: u32) -> u64 {
        match count {
            0 => 0,
            1 => 1,
            n => n as u64 + (n as u64 - 1),
        }
    }

    /// Score a cut group. Returns the points awarded.
    pub fn add_cut_group(&mut self, fruit_count: u32) -> u64 {
        let points = Self::group_points(fruit_count) * self.multiplier as u64;
        self.score = self.score.saturating_add(points);
        points
    }

    /// Remove points, never below zero
    pub fn apply_penalty(&mut self, amount: u64) {
        self.score = self.score.saturating_sub(amount);
    }

    #[inline]
    pub fn has_multiplier(&self) -> bool {
        self.multiplier > 1
    }

    /// Start a multiplier, or stack onto the running one and restart its timer
    pub fn activate_or_stack_multiplier(&mut self) -> u32 {
        if self.has_multiplier() {
            self.multiplier += MULTIPLIER_INCREMENT;
        } else {
            self.multiplier = MULTIPLIER_BASE;
        }
        self.multiplier_remaining = MULTIPLIER_DURATION;
        self.multiplier
    }

    /// Run the multiplier timer down; expiry drops back to x1
    pub fn tick(&mut self, dt: f32) {
        if self.multiplier_remaining > 0.0 {
            self.multiplier_remaining -= dt;
            if self.multiplier_remaining <= 0.0 {
                self.multiplier = 1;
                self.multiplier_remaining = 0.0;
            }
        }
    }
}

/// Fills one notch per same-type pair in a cut group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusGauge {
    pub notches: u32,
}

impl BonusGauge {
    pub fn reset(&mut self) {
        self.notches = 0;
    }

    /// Add one notch. Returns true (and empties the gauge) when it fills.
    pub fn add_notch(&mut self) -> bool {
        self.notches += 1;
        if self.notches >= MAX_NOTCHES {
            self.notches = 0;
            return true;
        }
        false
    }

    /// Feed a cut group; every fruit type appearing twice or more adds a
    /// notch. Returns how many times the gauge filled.
    pub fn register_group(&mut self, fruit_types: &[FruitType]) -> u32 {
        let mut counts = [0u32; FruitType::ALL.len()];
        for fruit_type in fruit_types {
            counts[fruit_type.index()] += 1;
        }

        let mut filled = 0;
        for count in counts {
            if count >= 2 && self.add_notch() {
                filled += 1;
            }
        }
        filled
    }

    /// 0.0 to 1.0, for the HUD
    pub fn fill_ratio(&self) -> f32 {
        self.notches as f32 / MAX_NOTCHES as f32
    }
}
