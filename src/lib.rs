//! Fruit Slicer - gameplay core for a fruit slicing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, kinematics, slicing, scoring, round flow)
//! - `config`: Enum-keyed difficulty table with load-time validation
//! - `achievements`: Achievement tracking fed by simulation events
//! - `highscores`: Per-category leaderboard

pub mod achievements;
pub mod config;
pub mod highscores;
pub mod sim;

pub use achievements::{AchievementTracker, PlayerStats};
pub use config::{ConfigError, ConfigTable, ControlMode, Difficulty, GameMode};
pub use highscores::HighScores;

/// Game configuration constants
pub mod consts {
    /// Simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the clock will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Full field dimensions
    pub const FIELD_WIDTH: f32 = 1920.0;
    pub const FIELD_HEIGHT: f32 = 1080.0;
    /// Active play zone, centered in the field
    pub const PLAY_ZONE_WIDTH: f32 = 1260.0;
    pub const PLAY_ZONE_HEIGHT: f32 = 770.0;
    /// Fraction of the zone width kept free on each side when spawning
    pub const SPAWN_MARGIN: f32 = 0.15;

    /// Sprite bounds of every sliceable object
    pub const FRUIT_SIZE: f32 = 223.0;
    /// Hitbox is this much smaller than half the sprite
    pub const HITBOX_INSET: f32 = 20.0;
    pub const ENTITY_RADIUS: f32 = FRUIT_SIZE / 2.0 - HITBOX_INSET;

    /// Classic mode lives
    pub const MAX_HEARTS: u32 = 3;

    /// Chance a wave forces its first two fruits to the same type
    pub const IDENTICAL_PAIR_CHANCE: f32 = 0.25;

    /// Bonus gauge notches needed to earn a multiplier
    pub const MAX_NOTCHES: u32 = 5;
    /// First multiplier value
    pub const MULTIPLIER_BASE: u32 = 2;
    /// Added on top of an already running multiplier
    pub const MULTIPLIER_INCREMENT: u32 = 2;
    /// Seconds a multiplier stays active
    pub const MULTIPLIER_DURATION: f32 = 10.0;

    /// Letters handed out in keyboard mode
    pub const KEYBOARD_LETTERS: [char; 14] = [
        'A', 'Z', 'E', 'R', 'T', 'Q', 'S', 'D', 'F', 'G', 'W', 'X', 'C', 'V',
    ];

    /// Drag trail points kept for slicing and rendering
    pub const TRAIL_LENGTH: usize = 20;
    /// A drag segment shorter than this (squared px) never cuts
    pub const MIN_SLICE_MOVEMENT_SQ: f32 = 25.0;

    /// Seconds a sliced fruit stays on screen before it is removed
    pub const SLICED_LINGER: f32 = 0.5;
}
