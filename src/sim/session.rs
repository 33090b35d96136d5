//! Round controller
//!
//! A `Session` owns everything one round needs: the entity list, scoring,
//! bonus gauge, spawner, slice detector and round clock. It advances only
//! through `tick` and `handle_input`, both called from the game loop thread.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, FruitType};
use super::events::{GameEvent, TimedEvent};
use super::input::{InputEvent, SliceDetector};
use super::scoring::{BonusGauge, ScoringState};
use super::spawner::{Launch, Spawner};
use crate::config::{ConfigError, ConfigTable, ControlMode, Difficulty, GameMode};

/// How the round stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    /// Classic bomb cut
    ExplodedOut,
    /// Classic hearts ran out
    HeartsDepleted,
    /// Challenge countdown ran out
    TimeUp,
}

/// Caller's choices for a new round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSetup {
    pub mode: GameMode,
    /// Ignored in Challenge
    pub difficulty: Difficulty,
    pub control: ControlMode,
    pub seed: u64,
}

impl Default for RoundSetup {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            difficulty: Difficulty::Normal,
            control: ControlMode::Mouse,
            seed: 0,
        }
    }
}

/// Round clock, lives and freeze state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub control: ControlMode,
    /// Classic only
    pub hearts: u32,
    /// Seconds played
    pub elapsed: f32,
    /// Challenge countdown (None in Classic)
    pub time_remaining: Option<f32>,
    pub is_frozen: bool,
    pub freeze_remaining: f32,
    pub outcome: Outcome,
}

/// Per-round counters for achievements and the results screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub fruits_sliced: u32,
    /// Largest group scored at once
    pub best_combo: u32,
    /// Groups of 3 or more
    pub combos: u32,
    pub ice_sliced: u32,
    pub bombs_avoided: u32,
    pub hearts_lost: u32,
}

/// Read-only result handed to the game-over screen and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub final_score: u64,
    pub outcome: Outcome,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub control: ControlMode,
    pub elapsed: f32,
    pub stats: RoundStats,
}

/// Fruits cut during one drag stroke, scored together when it ends
#[derive(Debug, Clone)]
struct PendingStroke {
    stroke: u64,
    fruits: Vec<FruitType>,
}

/// One round of play
#[derive(Debug, Clone)]
pub struct Session {
    table: ConfigTable,
    round: RoundState,
    scoring: ScoringState,
    gauge: BonusGauge,
    spawner: Spawner,
    detector: SliceDetector,
    /// Sorted by id (spawn order)
    entities: Vec<Entity>,
    pending: Option<PendingStroke>,
    stats: RoundStats,
    events: Vec<TimedEvent>,
    tick: u64,
    next_id: u32,
}

impl Session {
    /// Set up a round. Fails if the table does not validate.
    pub fn new(setup: RoundSetup, table: ConfigTable) -> Result<Self, ConfigError> {
        table.validate()?;

        let profile = table.spawn_profile(setup.mode, setup.difficulty);
        let spawner = Spawner::new(profile, table.play_zone, setup.seed);
        let time_remaining = match setup.mode {
            GameMode::Classic => None,
            GameMode::Challenge => Some(table.challenge.duration),
        };

        log::info!(
            "Round start: {} {} ({}), seed {}",
            setup.mode,
            setup.difficulty,
            setup.control.as_str(),
            setup.seed
        );

        Ok(Self {
            round: RoundState {
                mode: setup.mode,
                difficulty: setup.difficulty,
                control: setup.control,
                hearts: table.max_hearts,
                elapsed: 0.0,
                time_remaining,
                is_frozen: false,
                freeze_remaining: 0.0,
                outcome: Outcome::InProgress,
            },
            table,
            scoring: ScoringState::default(),
            gauge: BonusGauge::default(),
            spawner,
            detector: SliceDetector::new(setup.control),
            entities: Vec::new(),
            pending: None,
            stats: RoundStats::default(),
            events: Vec::new(),
            tick: 0,
            next_id: 1,
        })
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn scoring(&self) -> &ScoringState {
        &self.scoring
    }

    pub fn gauge(&self) -> &BonusGauge {
        &self.gauge
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn detector(&self) -> &SliceDetector {
        &self.detector
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn stats(&self) -> &RoundStats {
        &self.stats
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn outcome(&self) -> Outcome {
        self.round.outcome
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        self.round.outcome != Outcome::InProgress
    }

    /// Final result, once the round has ended
    pub fn summary(&self) -> Option<RoundSummary> {
        if !self.is_ended() {
            return None;
        }
        Some(RoundSummary {
            final_score: self.scoring.score,
            outcome: self.round.outcome,
            mode: self.round.mode,
            difficulty: self.round.difficulty,
            control: self.round.control,
            elapsed: self.round.elapsed,
            stats: self.stats.clone(),
        })
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forward a raw input event (ignored once the round is over)
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.is_ended() {
            return;
        }
        self.detector.handle_raw_input(event);
    }

    /// Switch Classic difficulty mid-round
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), ConfigError> {
        if self.is_ended() {
            return Err(ConfigError::RoundEnded);
        }
        if self.round.mode == GameMode::Challenge {
            return Err(ConfigError::DifficultyInChallenge);
        }
        self.round.difficulty = difficulty;
        self.spawner
            .set_difficulty(self.table.spawn_profile(GameMode::Classic, difficulty));
        log::info!("Difficulty changed to {}", difficulty);
        Ok(())
    }

    /// Put an object in flight with the round's gravity. Returns its id,
    /// or None once the round is over.
    pub fn launch(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2) -> Option<u32> {
        if self.is_ended() {
            return None;
        }
        let letter = match self.round.control {
            ControlMode::Keyboard => Some(self.spawner.assign_letter()),
            ControlMode::Mouse => None,
        };
        let launch = Launch {
            kind,
            pos,
            vel,
            gravity: self.spawner.profile().gravity,
            letter,
        };
        Some(self.insert(launch))
    }

    fn insert(&mut self, launch: Launch) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let mut entity = Entity::new(id, launch.kind, launch.pos, launch.vel, launch.gravity);
        entity.letter = launch.letter;
        self.entities.push(entity);
        id
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(TimedEvent {
            tick: self.tick,
            time: self.round.elapsed,
            event,
        });
    }

    /// Advance the round by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if self.is_ended() {
            return;
        }
        let dt = dt.max(0.0);
        self.tick += 1;
        self.round.elapsed += dt;

        // Challenge countdown
        if let Some(remaining) = self.round.time_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                *remaining = 0.0;
                self.end(Outcome::TimeUp);
                return;
            }
        }

        if self.round.is_frozen {
            self.round.freeze_remaining -= dt;
            if self.round.freeze_remaining <= 0.0 {
                self.unfreeze_all();
            }
        }

        self.scoring.tick(dt);

        if !self.round.is_frozen {
            let keyboard = self.detector.mode() == ControlMode::Keyboard;
            for launch in self.spawner.update(dt, keyboard) {
                self.insert(launch);
            }
        }

        for entity in &mut self.entities {
            entity.advance(dt);
        }

        self.resolve_input();
        if self.is_ended() {
            return;
        }

        // Stroke over (or replaced by a new one): score what it cut
        let stroke = self.detector.stroke_id();
        let stroke_over = !self.detector.is_actively_slicing()
            || self.pending.as_ref().is_some_and(|p| p.stroke != stroke);
        if stroke_over {
            self.finalize_stroke();
        }

        self.check_freeze_end();

        self.sweep_misses();
        if self.is_ended() {
            return;
        }

        self.cleanup();
    }

    fn resolve_input(&mut self) {
        let cut = self.detector.resolve(&self.entities);
        if cut.is_empty() {
            return;
        }

        let mut bomb_cut = false;
        let mut ice_cut = false;
        let mut fruits = Vec::new();
        let mut freed_letters = Vec::new();

        for id in cut {
            let Some(entity) = self.entities.iter_mut().find(|e| e.id == id) else {
                continue;
            };
            if !entity.mark_sliced() {
                continue;
            }
            if let Some(letter) = entity.letter.take() {
                freed_letters.push(letter);
            }
            match entity.kind {
                EntityKind::Fruit { fruit_type } => fruits.push(fruit_type),
                EntityKind::Bomb => bomb_cut = true,
                EntityKind::Ice => ice_cut = true,
            }
        }

        for letter in freed_letters {
            self.release_letter(letter);
        }

        // Priority: bomb > ice > fruit
        if bomb_cut {
            self.on_bomb_cut();
            return;
        }
        if ice_cut {
            self.on_ice_cut();
        }
        if !fruits.is_empty() {
            self.on_fruits_cut(fruits);
        }
    }

    fn on_bomb_cut(&mut self) {
        self.emit(GameEvent::BombExploded);
        match self.round.mode {
            GameMode::Classic => self.end(Outcome::ExplodedOut),
            GameMode::Challenge => {
                let amount = self.table.challenge.bomb_penalty;
                let before = self.scoring.score;
                self.scoring.apply_penalty(amount);
                self.emit(GameEvent::BombPenalty { amount });
                if self.scoring.score != before {
                    self.emit(GameEvent::ScoreChanged {
                        score: self.scoring.score,
                    });
                }
            }
        }
    }

    fn on_ice_cut(&mut self) {
        if self.round.mode == GameMode::Challenge {
            return;
        }
        self.stats.ice_sliced += 1;
        self.emit(GameEvent::IceSliced);
        let duration = self.table.freeze_duration(self.round.difficulty);
        self.freeze_all(duration);
    }

    fn on_fruits_cut(&mut self, fruits: Vec<FruitType>) {
        match self.detector.mode() {
            ControlMode::Mouse => {
                let stroke = self.detector.stroke_id();
                // Leftovers from a stroke that ended between ticks
                if self.pending.as_ref().is_some_and(|p| p.stroke != stroke) {
                    self.finalize_stroke();
                }
                self.pending
                    .get_or_insert_with(|| PendingStroke {
                        stroke,
                        fruits: Vec::new(),
                    })
                    .fruits
                    .extend(fruits);
            }
            ControlMode::Keyboard => self.score_group(&fruits),
        }
    }

    fn finalize_stroke(&mut self) {
        if let Some(stroke) = self.pending.take() {
            if !stroke.fruits.is_empty() {
                self.score_group(&stroke.fruits);
            }
        }
    }

    fn score_group(&mut self, fruits: &[FruitType]) {
        let count = fruits.len() as u32;
        let points = self.scoring.add_cut_group(count);

        self.stats.fruits_sliced += count;
        self.stats.best_combo = self.stats.best_combo.max(count);
        if count >= 3 {
            self.stats.combos += 1;
        }
        self.emit(GameEvent::FruitsSliced { count, points });

        for _ in 0..self.gauge.register_group(fruits) {
            let multiplier = self.scoring.activate_or_stack_multiplier();
            log::info!("Multiplier x{} active", multiplier);
            self.emit(GameEvent::MultiplierActivated { multiplier });
        }

        self.emit(GameEvent::ScoreChanged {
            score: self.scoring.score,
        });
    }

    /// Freeze active fruits; bombs and ice keep moving
    fn freeze_all(&mut self, duration: f32) {
        self.round.is_frozen = true;
        self.round.freeze_remaining = duration;
        for entity in &mut self.entities {
            if entity.is_fruit() && entity.is_active() {
                entity.freeze();
            }
        }
        log::info!("Freeze for {:.1}s", duration);
        self.emit(GameEvent::FreezeStarted { duration });
    }

    fn unfreeze_all(&mut self) {
        self.round.is_frozen = false;
        self.round.freeze_remaining = 0.0;
        for entity in &mut self.entities {
            if entity.is_fruit() {
                entity.unfreeze();
            }
        }
        log::debug!("Freeze ended");
        self.emit(GameEvent::FreezeEnded);
    }

    /// Nothing left frozen: end the freeze early
    fn check_freeze_end(&mut self) {
        if !self.round.is_frozen {
            return;
        }
        let any_frozen = self
            .entities
            .iter()
            .any(|e| e.is_fruit() && e.frozen && e.is_active());
        if !any_frozen {
            self.unfreeze_all();
        }
    }

    fn sweep_misses(&mut self) {
        let bottom = self.table.play_zone.bottom();

        for i in 0..self.entities.len() {
            let entity = &mut self.entities[i];
            if !entity.is_active() || !entity.is_out_of_bounds(bottom) {
                continue;
            }
            entity.mark_missed();
            let kind = entity.kind;

            match kind {
                EntityKind::Fruit { .. } => {
                    if self.round.mode == GameMode::Challenge {
                        continue;
                    }
                    self.round.hearts = self.round.hearts.saturating_sub(1);
                    self.stats.hearts_lost += 1;
                    self.emit(GameEvent::HeartLost {
                        remaining: self.round.hearts,
                    });
                    if self.round.hearts == 0 {
                        self.end(Outcome::HeartsDepleted);
                        return;
                    }
                }
                EntityKind::Bomb => {
                    self.stats.bombs_avoided += 1;
                    self.emit(GameEvent::BombAvoided);
                }
                EntityKind::Ice => {}
            }
        }
    }

    fn cleanup(&mut self) {
        let bottom = self.table.play_zone.bottom();
        let mut freed_letters = Vec::new();
        self.entities.retain_mut(|entity| {
            if !entity.should_remove(bottom) {
                return true;
            }
            if let Some(letter) = entity.letter.take() {
                freed_letters.push(letter);
            }
            false
        });
        for letter in freed_letters {
            self.release_letter(letter);
        }
    }

    /// Return a letter to the pool unless another entity still shows it
    fn release_letter(&mut self, letter: char) {
        if !self.entities.iter().any(|e| e.letter == Some(letter)) {
            self.spawner.release_letter(letter);
        }
    }

    fn end(&mut self, outcome: Outcome) {
        // A bomb voids the stroke in progress
        if outcome != Outcome::ExplodedOut {
            self.finalize_stroke();
        }
        self.round.outcome = outcome;
        let final_score = self.scoring.score;
        log::info!(
            "Round over: {:?}, score {} after {:.1}s",
            outcome,
            final_score,
            self.round.elapsed
        );
        self.emit(GameEvent::RoundEnded {
            outcome,
            final_score,
        });
    }
}
