//! Events emitted by the simulation for achievements, audio and UI.
//!
//! The session only appends to its queue; whoever drives the round drains it.

use serde::{Deserialize, Serialize};

use super::session::Outcome;

/// Discrete gameplay event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A cut group was scored
    FruitsSliced { count: u32, points: u64 },
    IceSliced,
    FreezeStarted { duration: f32 },
    FreezeEnded,
    /// Classic fruit miss
    HeartLost { remaining: u32 },
    /// A bomb left the zone uncut
    BombAvoided,
    BombExploded,
    /// Challenge bomb cost
    BombPenalty { amount: u64 },
    MultiplierActivated { multiplier: u32 },
    ScoreChanged { score: u64 },
    RoundEnded { outcome: Outcome, final_score: u64 },
}

/// Event stamped with when it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub tick: u64,
    /// Round time in seconds
    pub time: f32,
    pub event: GameEvent,
}
