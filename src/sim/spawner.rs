//! Spawn scheduling
//!
//! Decides when a wave appears, how many objects it holds, what each one is,
//! and where it starts. All randomness comes from the spawner's own seeded RNG.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, FruitType};
use crate::config::{PlayZone, SpawnProfile};
use crate::consts::*;

/// Everything needed to put one new object in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
    pub letter: Option<char>,
}

/// Wave scheduler
#[derive(Debug, Clone)]
pub struct Spawner {
    profile: SpawnProfile,
    zone: PlayZone,
    rng: Pcg32,
    /// Seconds until the next wave
    until_next: f32,
    used_letters: BTreeSet<char>,
}

impl Spawner {
    pub fn new(profile: SpawnProfile, zone: PlayZone, seed: u64) -> Self {
        let mut spawner = Self {
            profile,
            zone,
            rng: Pcg32::seed_from_u64(seed),
            until_next: 0.0,
            used_letters: BTreeSet::new(),
        };
        spawner.schedule_next_spawn();
        spawner
    }

    pub fn profile(&self) -> &SpawnProfile {
        &self.profile
    }

    /// Swap the spawning parameters; the pending countdown is kept
    pub fn set_difficulty(&mut self, profile: SpawnProfile) {
        self.profile = profile;
    }

    /// Forget letters in use and restart the countdown
    pub fn reset(&mut self) {
        self.used_letters.clear();
        self.schedule_next_spawn();
    }

    fn schedule_next_spawn(&mut self) {
        self.until_next = sample(&mut self.rng, self.profile.spawn_delay);
    }

    /// Count down and return a wave once the interval has elapsed
    pub fn update(&mut self, dt: f32, keyboard_mode: bool) -> Vec<Launch> {
        self.until_next -= dt;
        if self.until_next > 0.0 {
            return Vec::new();
        }

        self.schedule_next_spawn();
        self.spawn_wave(keyboard_mode)
    }

    fn spawn_wave(&mut self, keyboard_mode: bool) -> Vec<Launch> {
        let (min_count, max_count) = self.profile.fruits_per_spawn;
        let count = self.rng.random_range(min_count..=max_count);

        // Forcing a pair keeps the bonus gauge reachable
        let identical = if self.rng.random::<f32>() < IDENTICAL_PAIR_CHANCE {
            Some(self.random_fruit())
        } else {
            None
        };

        let bomb_chance = self.profile.bomb_chance;
        let ice_chance = self.profile.ice_chance;
        let mut fruit_slots = 0;
        let mut wave = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let roll = self.rng.random::<f32>();
            let kind = if roll < bomb_chance {
                EntityKind::Bomb
            } else if roll < bomb_chance + ice_chance {
                EntityKind::Ice
            } else {
                let fruit_type = match identical {
                    Some(fruit_type) if fruit_slots < 2 => fruit_type,
                    _ => self.random_fruit(),
                };
                fruit_slots += 1;
                EntityKind::Fruit { fruit_type }
            };

            let mut launch = self.launch(kind);
            if keyboard_mode {
                launch.letter = Some(self.assign_letter());
            }
            wave.push(launch);
        }

        log::debug!(
            "Spawned wave of {} ({} fruit, pair: {:?})",
            wave.len(),
            fruit_slots,
            identical
        );
        wave
    }

    fn random_fruit(&mut self) -> FruitType {
        FruitType::ALL[self.rng.random_range(0..FruitType::ALL.len())]
    }

    /// Launch parameters for `kind` at a random point along the zone bottom
    pub fn launch(&mut self, kind: EntityKind) -> Launch {
        let x = sample(&mut self.rng, self.zone.spawn_x_range());
        let vx = sample(&mut self.rng, self.profile.speed_x);
        let vy = sample(&mut self.rng, self.profile.speed_y);
        Launch {
            kind,
            pos: Vec2::new(x, self.zone.bottom()),
            vel: Vec2::new(vx, vy),
            gravity: self.profile.gravity,
            letter: None,
        }
    }

    /// Pick a free letter. With the alphabet exhausted a letter in use is
    /// handed out again, so two objects may share it for a while.
    pub fn assign_letter(&mut self) -> char {
        let available: Vec<char> = KEYBOARD_LETTERS
            .iter()
            .copied()
            .filter(|l| !self.used_letters.contains(l))
            .collect();

        if available.is_empty() {
            return KEYBOARD_LETTERS[self.rng.random_range(0..KEYBOARD_LETTERS.len())];
        }

        let letter = available[self.rng.random_range(0..available.len())];
        self.used_letters.insert(letter);
        letter
    }

    pub fn release_letter(&mut self, letter: char) {
        self.used_letters.remove(&letter);
    }

    pub fn letters_in_use(&self) -> usize {
        self.used_letters.len()
    }
}

/// Uniform sample from an inclusive range (validated min <= max)
fn sample(rng: &mut Pcg32, (min, max): (f32, f32)) -> f32 {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigTable, Difficulty, GameMode};

    fn normal_profile() -> SpawnProfile {
        ConfigTable::default().spawn_profile(GameMode::Classic, Difficulty::Normal)
    }

    fn drain_waves(spawner: &mut Spawner, waves: usize, keyboard: bool) -> Vec<Vec<Launch>> {
        let mut out = Vec::new();
        while out.len() < waves {
            let wave = spawner.update(0.1, keyboard);
            if !wave.is_empty() {
                out.push(wave);
            }
        }
        out
    }

    #[test]
    fn test_no_wave_before_min_delay() {
        let profile = normal_profile();
        let min_delay = profile.spawn_delay.0;
        let mut spawner = Spawner::new(profile, PlayZone::default(), 7);
        let mut elapsed = 0.0;
        while elapsed + 0.01 < min_delay - 0.01 {
            assert!(spawner.update(0.01, false).is_empty());
            elapsed += 0.01;
        }
    }

    #[test]
    fn test_waves_respect_profile() {
        let profile = normal_profile();
        let zone = PlayZone::default();
        let (min_x, max_x) = zone.spawn_x_range();
        let mut spawner = Spawner::new(profile.clone(), zone, 42);

        for wave in drain_waves(&mut spawner, 200, false) {
            let n = wave.len() as u32;
            assert!(n >= profile.fruits_per_spawn.0 && n <= profile.fruits_per_spawn.1);
            for launch in wave {
                assert!(launch.pos.x >= min_x && launch.pos.x <= max_x);
                assert_eq!(launch.pos.y, zone.bottom());
                assert!(launch.vel.y >= profile.speed_y.0 && launch.vel.y <= profile.speed_y.1);
                assert!(launch.vel.x >= profile.speed_x.0 && launch.vel.x <= profile.speed_x.1);
                assert!(launch.vel.y < 0.0);
                assert_eq!(launch.gravity, profile.gravity);
                assert_eq!(launch.letter, None);
            }
        }
    }

    #[test]
    fn test_kind_selection_thresholds() {
        let mut profile = normal_profile();
        profile.bomb_chance = 1.0;
        profile.ice_chance = 0.0;
        let mut spawner = Spawner::new(profile.clone(), PlayZone::default(), 1);
        for wave in drain_waves(&mut spawner, 20, false) {
            assert!(wave.iter().all(|l| l.kind == EntityKind::Bomb));
        }

        profile.bomb_chance = 0.0;
        profile.ice_chance = 1.0;
        let mut spawner = Spawner::new(profile, PlayZone::default(), 1);
        for wave in drain_waves(&mut spawner, 20, false) {
            assert!(wave.iter().all(|l| l.kind == EntityKind::Ice));
        }
    }

    #[test]
    fn test_challenge_never_spawns_ice() {
        let profile = ConfigTable::default().spawn_profile(GameMode::Challenge, Difficulty::Normal);
        let mut spawner = Spawner::new(profile, PlayZone::default(), 99);
        for wave in drain_waves(&mut spawner, 300, false) {
            assert!(wave.iter().all(|l| l.kind != EntityKind::Ice));
        }
    }

    #[test]
    fn test_identical_pairs_are_injected() {
        let mut profile = normal_profile();
        profile.fruits_per_spawn = (2, 2);
        profile.bomb_chance = 0.0;
        profile.ice_chance = 0.0;
        let mut spawner = Spawner::new(profile, PlayZone::default(), 2024);

        let waves = drain_waves(&mut spawner, 2000, false);
        let pairs = waves.iter().filter(|w| w[0].kind == w[1].kind).count();
        // Forced pairs (25%) plus chance matches (15% of the rest)
        let ratio = pairs as f32 / waves.len() as f32;
        assert!(ratio > 0.3, "pair ratio {ratio}");
        assert!(ratio < 0.5, "pair ratio {ratio}");
    }

    #[test]
    fn test_letters_unique_until_exhausted() {
        let mut spawner = Spawner::new(normal_profile(), PlayZone::default(), 5);
        let mut seen = BTreeSet::new();
        for _ in 0..KEYBOARD_LETTERS.len() {
            assert!(seen.insert(spawner.assign_letter()));
        }
        assert_eq!(spawner.letters_in_use(), KEYBOARD_LETTERS.len());

        // Exhausted: a used letter comes back
        let reused = spawner.assign_letter();
        assert!(KEYBOARD_LETTERS.contains(&reused));
        assert_eq!(spawner.letters_in_use(), KEYBOARD_LETTERS.len());

        spawner.release_letter('A');
        assert_eq!(spawner.assign_letter(), 'A');

        spawner.reset();
        assert_eq!(spawner.letters_in_use(), 0);
    }

    #[test]
    fn test_keyboard_waves_carry_letters() {
        let mut spawner = Spawner::new(normal_profile(), PlayZone::default(), 11);
        let wave = drain_waves(&mut spawner, 1, true).remove(0);
        let letters: BTreeSet<char> = wave.iter().filter_map(|l| l.letter).collect();
        assert_eq!(letters.len(), wave.len());
    }

    #[test]
    fn test_same_seed_same_waves() {
        let mut a = Spawner::new(normal_profile(), PlayZone::default(), 31337);
        let mut b = Spawner::new(normal_profile(), PlayZone::default(), 31337);
        assert_eq!(drain_waves(&mut a, 50, true), drain_waves(&mut b, 50, true));
    }

    #[test]
    fn test_set_difficulty_changes_profile() {
        let table = ConfigTable::default();
        let mut spawner = Spawner::new(normal_profile(), table.play_zone, 3);
        let hard = table.spawn_profile(GameMode::Classic, Difficulty::Hard);
        spawner.set_difficulty(hard.clone());
        assert_eq!(spawner.profile(), &hard);
        for wave in drain_waves(&mut spawner, 30, false) {
            assert!(wave.len() >= 2);
        }
    }
}
