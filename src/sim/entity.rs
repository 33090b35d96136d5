//! Sliceable objects: fruits, bombs and ice pickups
//!
//! All three share one kinematic body and hitbox; the kind carries the only
//! variant-specific payload (a bomb never has a fruit type).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{point_in_circle, segment_intersects_circle};
use crate::consts::*;

/// Fruit varieties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FruitType {
    Apple,
    Banana,
    Grape,
    Melon,
    Watermelon,
}

impl FruitType {
    pub const ALL: [FruitType; 5] = [
        FruitType::Apple,
        FruitType::Banana,
        FruitType::Grape,
        FruitType::Melon,
        FruitType::Watermelon,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FruitType::Apple => "apple",
            FruitType::Banana => "banana",
            FruitType::Grape => "grape",
            FruitType::Melon => "melon",
            FruitType::Watermelon => "watermelon",
        }
    }
}

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Fruit { fruit_type: FruitType },
    /// Ends a Classic round, costs points in Challenge
    Bomb,
    /// Freezes fruits when cut (Classic only)
    Ice,
}

/// Exactly one of these holds at any time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// In flight, can be cut or missed
    Active,
    Sliced,
    /// Left the zone without being cut
    Missed,
}

/// Position, velocity and constant downward acceleration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    /// Negative y is upward
    pub vel: Vec2,
    pub gravity: f32,
}

impl Body {
    /// Semi-implicit Euler step
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.vel.y += self.gravity * dt;
        self.pos += self.vel * dt;
    }
}

/// A sliceable object in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub body: Body,
    /// Hitbox radius (smaller than the sprite)
    pub radius: f32,
    pub disposition: Disposition,
    /// Frozen entities do not move
    pub frozen: bool,
    /// Keyboard mode key
    pub letter: Option<char>,
    /// Seconds a sliced fruit stays visible before removal
    linger: f32,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, vel: Vec2, gravity: f32) -> Self {
        Self {
            id,
            kind,
            body: Body { pos, vel, gravity },
            radius: ENTITY_RADIUS,
            disposition: Disposition::Active,
            frozen: false,
            letter: None,
            linger: 0.0,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.disposition == Disposition::Active
    }

    #[inline]
    pub fn is_sliced(&self) -> bool {
        self.disposition == Disposition::Sliced
    }

    #[inline]
    pub fn is_missed(&self) -> bool {
        self.disposition == Disposition::Missed
    }

    pub fn fruit_type(&self) -> Option<FruitType> {
        match self.kind {
            EntityKind::Fruit { fruit_type } => Some(fruit_type),
            _ => None,
        }
    }

    #[inline]
    pub fn is_fruit(&self) -> bool {
        matches!(self.kind, EntityKind::Fruit { .. })
    }

    /// Advance kinematics by `dt`.
    ///
    /// A cut fruit stays where it was cut until its linger time runs out;
    /// cut bombs and ice keep falling.
    pub fn advance(&mut self, dt: f32) {
        if self.frozen {
            return;
        }
        if self.is_sliced() && self.is_fruit() {
            self.linger = (self.linger - dt).max(0.0);
            return;
        }
        self.body.integrate(dt);
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point_in_circle(point, self.body.pos, self.radius)
    }

    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        segment_intersects_circle(a, b, self.body.pos, self.radius)
    }

    /// Returns false if the entity was not active
    pub fn mark_sliced(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.disposition = Disposition::Sliced;
        self.frozen = false;
        self.linger = SLICED_LINGER;
        true
    }

    /// Returns false if the entity was not active
    pub fn mark_missed(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.disposition = Disposition::Missed;
        true
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// True once the entity is below the bottom of the play zone
    #[inline]
    pub fn is_out_of_bounds(&self, zone_bottom: f32) -> bool {
        self.body.pos.y > zone_bottom
    }

    /// Missed, or sliced and either gone from the zone or done lingering
    pub fn should_remove(&self, zone_bottom: f32) -> bool {
        match self.disposition {
            Disposition::Active => false,
            Disposition::Missed => true,
            Disposition::Sliced => {
                self.is_out_of_bounds(zone_bottom) || (self.is_fruit() && self.linger <= 0.0)
            }
        }
    }
}
