//! Difficulty and mode configuration
//!
//! A round runs on an immutable profile resolved from this table at setup.
//! Unknown keys and out-of-range values are rejected up front; nothing falls
//! back to a default mid-round.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Setup-time configuration failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown difficulty `{0}` (expected easy, normal or hard)")]
    UnknownDifficulty(String),
    #[error("unknown game mode `{0}` (expected classic or challenge)")]
    UnknownMode(String),
    #[error("unknown control mode `{0}` (expected mouse or keyboard)")]
    UnknownControl(String),
    #[error("{field}: min {min} exceeds max {max}")]
    InvalidRange { field: String, min: f32, max: f32 },
    #[error("{field}: chance {value} is outside [0, 1]")]
    InvalidChance { field: String, value: f32 },
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: &'static str },
    #[error("difficulty cannot change during a challenge round")]
    DifficultyInChallenge,
    #[error("round is already over")]
    RoundEnded,
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Classic mode difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Hearts, bombs end the round, ice freezes fruits
    #[default]
    Classic,
    /// Countdown, bombs cost points, no hearts
    Challenge,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Challenge => "challenge",
        }
    }
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Ok(GameMode::Classic),
            "challenge" => Ok(GameMode::Challenge),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the player slices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Drag trail, combos scored per stroke
    #[default]
    Mouse,
    /// One letter per object, combos scored per tick
    Keyboard,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Mouse => "mouse",
            ControlMode::Keyboard => "keyboard",
        }
    }
}

impl FromStr for ControlMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mouse" => Ok(ControlMode::Mouse),
            "keyboard" => Ok(ControlMode::Keyboard),
            _ => Err(ConfigError::UnknownControl(s.to_string())),
        }
    }
}

/// Rectangle where objects fly and can be sliced (screen coords, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayZone {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PlayZone {
    fn default() -> Self {
        Self {
            left: (FIELD_WIDTH - PLAY_ZONE_WIDTH) / 2.0,
            top: (FIELD_HEIGHT - PLAY_ZONE_HEIGHT) / 2.0,
            width: PLAY_ZONE_WIDTH,
            height: PLAY_ZONE_HEIGHT,
        }
    }
}

impl PlayZone {
    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Range of spawn center x, keeping the side margin and the whole sprite inside
    pub fn spawn_x_range(&self) -> (f32, f32) {
        let margin = self.width * SPAWN_MARGIN;
        let half = FRUIT_SIZE / 2.0;
        (self.left + margin + half, self.right() - margin - half)
    }
}

/// One Classic difficulty row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DifficultyConfig {
    pub speed_x: (f32, f32),
    /// Negative is upward
    pub speed_y: (f32, f32),
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    pub spawn_delay: (f32, f32),
    pub fruits_per_spawn: (u32, u32),
    pub bomb_chance: f32,
    pub ice_chance: f32,
    pub freeze_duration: f32,
}

/// Challenge mode rules. Kinematics come from the `normal` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChallengeConfig {
    /// Round length in seconds
    pub duration: f32,
    pub spawn_delay: (f32, f32),
    pub fruits_per_spawn: (u32, u32),
    pub bomb_chance: f32,
    /// Points removed per bomb cut
    pub bomb_penalty: u64,
}

/// Classic rows, one per difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassicTable {
    pub easy: DifficultyConfig,
    pub normal: DifficultyConfig,
    pub hard: DifficultyConfig,
}

impl ClassicTable {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultyConfig {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// Resolved spawning parameters for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnProfile {
    pub speed_x: (f32, f32),
    pub speed_y: (f32, f32),
    pub gravity: f32,
    pub spawn_delay: (f32, f32),
    pub fruits_per_spawn: (u32, u32),
    pub bomb_chance: f32,
    pub ice_chance: f32,
}

/// Complete gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigTable {
    pub play_zone: PlayZone,
    pub max_hearts: u32,
    pub classic: ClassicTable,
    pub challenge: ChallengeConfig,
}

impl Default for ConfigTable {
    fn default() -> Self {
        Self {
            play_zone: PlayZone::default(),
            max_hearts: MAX_HEARTS,
            classic: ClassicTable {
                easy: DifficultyConfig {
                    speed_x: (-50.0, 50.0),
                    speed_y: (-500.0, -400.0),
                    gravity: 400.0,
                    spawn_delay: (1.5, 2.0),
                    fruits_per_spawn: (1, 2),
                    bomb_chance: 0.05,
                    ice_chance: 0.10,
                    freeze_duration: 5.0,
                },
                normal: DifficultyConfig {
                    speed_x: (-100.0, 100.0),
                    speed_y: (-600.0, -500.0),
                    gravity: 500.0,
                    spawn_delay: (1.0, 1.5),
                    fruits_per_spawn: (1, 3),
                    bomb_chance: 0.10,
                    ice_chance: 0.07,
                    freeze_duration: 4.0,
                },
                hard: DifficultyConfig {
                    speed_x: (-150.0, 150.0),
                    speed_y: (-750.0, -600.0),
                    gravity: 600.0,
                    spawn_delay: (0.6, 1.0),
                    fruits_per_spawn: (2, 4),
                    bomb_chance: 0.15,
                    ice_chance: 0.04,
                    freeze_duration: 3.0,
                },
            },
            challenge: ChallengeConfig {
                duration: 60.0,
                spawn_delay: (0.8, 1.2),
                fruits_per_spawn: (1, 3),
                bomb_chance: 0.10,
                bomb_penalty: 10,
            },
        }
    }
}

impl ConfigTable {
    /// Parse and validate a JSON table
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: ConfigTable = serde_json::from_str(json)?;
        table.validate()?;
        log::info!("Loaded gameplay config ({} hearts)", table.max_hearts);
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject anything a round could not run on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zone = &self.play_zone;
        check_positive("play_zone.width", zone.width)?;
        check_positive("play_zone.height", zone.height)?;
        let (min_x, max_x) = zone.spawn_x_range();
        if !(min_x <= max_x) {
            return Err(ConfigError::InvalidValue {
                field: "play_zone.width".into(),
                reason: "too narrow to fit a sprite inside the spawn margins",
            });
        }
        if self.max_hearts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_hearts".into(),
                reason: "must be at least 1",
            });
        }

        for difficulty in Difficulty::ALL {
            let row = self.classic.get(difficulty);
            let key = format!("classic.{}", difficulty);
            check_range(&format!("{key}.speed_x"), row.speed_x)?;
            check_range(&format!("{key}.speed_y"), row.speed_y)?;
            // Launches must rise, and gravity must bring them back down
            if !(row.speed_y.1 < 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{key}.speed_y"),
                    reason: "must be negative (upward) over the whole range",
                });
            }
            check_positive(&format!("{key}.gravity"), row.gravity)?;
            check_delay(&format!("{key}.spawn_delay"), row.spawn_delay)?;
            check_count(&format!("{key}.fruits_per_spawn"), row.fruits_per_spawn)?;
            check_chances(&key, row.bomb_chance, row.ice_chance)?;
            check_non_negative(&format!("{key}.freeze_duration"), row.freeze_duration)?;
        }

        let challenge = &self.challenge;
        check_positive("challenge.duration", challenge.duration)?;
        check_delay("challenge.spawn_delay", challenge.spawn_delay)?;
        check_count("challenge.fruits_per_spawn", challenge.fruits_per_spawn)?;
        check_chances("challenge", challenge.bomb_chance, 0.0)?;
        Ok(())
    }

    /// Spawning parameters for a round. Challenge never spawns ice.
    pub fn spawn_profile(&self, mode: GameMode, difficulty: Difficulty) -> SpawnProfile {
        match mode {
            GameMode::Classic => {
                let row = self.classic.get(difficulty);
                SpawnProfile {
                    speed_x: row.speed_x,
                    speed_y: row.speed_y,
                    gravity: row.gravity,
                    spawn_delay: row.spawn_delay,
                    fruits_per_spawn: row.fruits_per_spawn,
                    bomb_chance: row.bomb_chance,
                    ice_chance: row.ice_chance,
                }
            }
            GameMode::Challenge => {
                let motion = &self.classic.normal;
                SpawnProfile {
                    speed_x: motion.speed_x,
                    speed_y: motion.speed_y,
                    gravity: motion.gravity,
                    spawn_delay: self.challenge.spawn_delay,
                    fruits_per_spawn: self.challenge.fruits_per_spawn,
                    bomb_chance: self.challenge.bomb_chance,
                    ice_chance: 0.0,
                }
            }
        }
    }

    pub fn freeze_duration(&self, difficulty: Difficulty) -> f32 {
        self.classic.get(difficulty).freeze_duration
    }
}

fn check_range(field: &str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    // NaN fails the comparison too
    if !(min <= max) || !min.is_finite() || !max.is_finite() {
        return Err(ConfigError::InvalidRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

fn check_delay(field: &str, range: (f32, f32)) -> Result<(), ConfigError> {
    check_range(field, range)?;
    check_non_negative(field, range.0)
}

fn check_count(field: &str, (min, max): (u32, u32)) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange {
            field: field.to_string(),
            min: min as f32,
            max: max as f32,
        });
    }
    Ok(())
}

fn check_chances(key: &str, bomb: f32, ice: f32) -> Result<(), ConfigError> {
    for (name, value) in [("bomb_chance", bomb), ("ice_chance", ice)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidChance {
                field: format!("{key}.{name}"),
                value,
            });
        }
    }
    if bomb + ice > 1.0 {
        return Err(ConfigError::InvalidChance {
            field: format!("{key}.bomb_chance + ice_chance"),
            value: bomb + ice,
        });
    }
    Ok(())
}

fn check_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must be a positive number",
        });
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must be zero or positive",
        });
    }
    Ok(())
}
