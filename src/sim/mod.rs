//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod clock;
pub mod collision;
pub mod entity;
pub mod events;
pub mod input;
pub mod scoring;
pub mod session;
pub mod spawner;

pub use clock::FixedStep;
pub use collision::{closest_point_on_segment, point_in_circle, segment_intersects_circle};
pub use entity::{Body, Disposition, Entity, EntityKind, FruitType};
pub use events::{GameEvent, TimedEvent};
pub use input::{InputEvent, SliceDetector};
pub use scoring::{BonusGauge, ScoringState};
pub use session::{Outcome, RoundSetup, RoundState, RoundStats, RoundSummary, Session};
pub use spawner::{Launch, Spawner};
