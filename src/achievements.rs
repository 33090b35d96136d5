//! Achievement tracking
//!
//! The tracker listens to the session's event stream during a round, then
//! folds the round into the player's lifetime stats when it ends. Each
//! achievement unlocks once per player; new unlocks queue up until the
//! caller takes them for display.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ControlMode;
use crate::sim::{GameEvent, Outcome, RoundSummary, TimedEvent};

/// Grouping for the achievements screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fruits,
    Score,
    Combos,
    Ice,
    Survival,
    Bombs,
    Special,
}

/// What an achievement measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Lifetime fruits sliced
    TotalFruits,
    /// Score reached in one round
    Score,
    /// Fruits in a single cut group
    Combo,
    /// Lifetime groups of 3+
    TotalCombos,
    IceInRound,
    TotalIce,
    /// Round over without losing a heart or exploding
    NoHeartsLost,
    /// Hearts left at the end (not exploded)
    HeartsRemaining,
    TotalGames,
    Exploded,
    BombsAvoidedInRound,
    TotalExplosions,
    /// Score reached within the first 30 seconds
    SpeedRun,
    /// Seconds survived in one round
    SurvivalTime,
    /// Score reached without losing a heart
    Perfect,
    ScoreKeyboard,
    ScoreMouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub category: Category,
    pub condition: Condition,
    pub threshold: u64,
}

const fn def(
    id: &'static str,
    category: Category,
    condition: Condition,
    threshold: u64,
) -> Achievement {
    Achievement {
        id,
        category,
        condition,
        threshold,
    }
}

/// Seconds allowed for a speed run
pub const SPEED_RUN_WINDOW: f32 = 30.0;

/// Every achievement, in unlock-check order
pub const ACHIEVEMENTS: &[Achievement] = &[
    def("first_bite", Category::Fruits, Condition::TotalFruits, 10),
    def("growing_appetite", Category::Fruits, Condition::TotalFruits, 50),
    def("green_glutton", Category::Fruits, Condition::TotalFruits, 100),
    def("bottomless", Category::Fruits, Condition::TotalFruits, 250),
    def("island_legend", Category::Fruits, Condition::TotalFruits, 500),
    def("master_gourmet", Category::Fruits, Condition::TotalFruits, 1000),
    def("hatchling", Category::Score, Condition::Score, 10),
    def("junior", Category::Score, Condition::Score, 25),
    def("seasoned", Category::Score, Condition::Score, 50),
    def("super", Category::Score, Condition::Score, 75),
    def("superstar", Category::Score, Condition::Score, 100),
    def("legendary", Category::Score, Condition::Score, 150),
    def("agile_tongue", Category::Combos, Condition::Combo, 3),
    def("lightning_tongue", Category::Combos, Condition::Combo, 4),
    def("divine_tongue", Category::Combos, Condition::Combo, 5),
    def("combo_addict", Category::Combos, Condition::TotalCombos, 10),
    def("combo_master", Category::Combos, Condition::TotalCombos, 50),
    def("fresh_welcome", Category::Ice, Condition::IceInRound, 1),
    def("frost_master", Category::Ice, Condition::TotalIce, 10),
    def("ice_king", Category::Ice, Condition::TotalIce, 25),
    def("freeze_strategist", Category::Ice, Condition::IceInRound, 3),
    def("intact_heart", Category::Survival, Condition::NoHeartsLost, 1),
    def("caution", Category::Survival, Condition::HeartsRemaining, 2),
    def("survivor", Category::Survival, Condition::TotalGames, 10),
    def("persistent", Category::Survival, Condition::TotalGames, 25),
    def("unbreakable", Category::Survival, Condition::TotalGames, 50),
    def("oops", Category::Bombs, Condition::Exploded, 1),
    def("amateur_deminer", Category::Bombs, Condition::BombsAvoidedInRound, 10),
    def("explosives_expert", Category::Bombs, Condition::BombsAvoidedInRound, 25),
    def("workplace_accident", Category::Bombs, Condition::TotalExplosions, 10),
    def("speed_runner", Category::Special, Condition::SpeedRun, 20),
    def("marathon", Category::Special, Condition::SurvivalTime, 120),
    def("perfect", Category::Special, Condition::Perfect, 50),
    def("keyboard_virtuoso", Category::Special, Condition::ScoreKeyboard, 50),
    def("mouse_ninja", Category::Special, Condition::ScoreMouse, 50),
];

/// Look up a definition by id
pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Lifetime stats and unlocks, saved by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub total_fruits_sliced: u64,
    pub total_games_played: u64,
    pub total_combos: u64,
    pub total_ice_sliced: u64,
    pub total_bomb_explosions: u64,
    pub total_bombs_avoided: u64,
    pub unlocked: BTreeSet<String>,
}

/// What the tracker has seen of the current round
#[derive(Debug, Clone, Default)]
struct RoundProgress {
    control: ControlMode,
    score: u64,
    ice_sliced: u64,
    hearts_lost: u32,
    starting_hearts: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AchievementTracker {
    player: PlayerStats,
    round: RoundProgress,
    pending: Vec<&'static Achievement>,
}

impl AchievementTracker {
    pub fn new(player: PlayerStats) -> Self {
        Self {
            player,
            round: RoundProgress::default(),
            pending: Vec::new(),
        }
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.player
    }

    pub fn into_stats(self) -> PlayerStats {
        self.player
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.player.unlocked.contains(id)
    }

    /// (unlocked, total)
    pub fn progress(&self) -> (usize, usize) {
        let unlocked = ACHIEVEMENTS
            .iter()
            .filter(|a| self.is_unlocked(a.id))
            .count();
        (unlocked, ACHIEVEMENTS.len())
    }

    /// Clear per-round counters. Pending notifications from the last round
    /// are dropped.
    pub fn start_round(&mut self, control: ControlMode, hearts: u32) {
        self.round = RoundProgress {
            control,
            starting_hearts: hearts,
            ..Default::default()
        };
        self.pending.clear();
    }

    /// Feed one simulation event
    pub fn observe(&mut self, event: &TimedEvent) {
        match event.event {
            GameEvent::FruitsSliced { count, .. } => {
                if count >= 3 {
                    self.check(Condition::Combo, count as u64);
                }
            }
            GameEvent::ScoreChanged { score } => self.on_score(score, event.time),
            GameEvent::IceSliced => {
                self.round.ice_sliced += 1;
                self.check(Condition::IceInRound, self.round.ice_sliced);
            }
            GameEvent::HeartLost { .. } => self.round.hearts_lost += 1,
            _ => {}
        }
        self.check(Condition::SurvivalTime, event.time as u64);
    }

    fn on_score(&mut self, score: u64, time: f32) {
        self.round.score = score;
        self.check(Condition::Score, score);

        if time <= SPEED_RUN_WINDOW {
            self.check(Condition::SpeedRun, score);
        }
        let by_control = match self.round.control {
            ControlMode::Keyboard => Condition::ScoreKeyboard,
            ControlMode::Mouse => Condition::ScoreMouse,
        };
        self.check(by_control, score);
        if self.round.hearts_lost == 0 {
            self.check(Condition::Perfect, score);
        }
    }

    /// Fold the finished round into lifetime stats and run the end-of-round
    /// checks.
    pub fn finish_round(&mut self, summary: &RoundSummary) {
        let stats = &summary.stats;
        let exploded = summary.outcome == Outcome::ExplodedOut;

        let player = &mut self.player;
        player.total_fruits_sliced += stats.fruits_sliced as u64;
        player.total_combos += stats.combos as u64;
        player.total_ice_sliced += stats.ice_sliced as u64;
        player.total_bombs_avoided += stats.bombs_avoided as u64;
        player.total_games_played += 1;
        if exploded {
            player.total_bomb_explosions += 1;
        }

        self.check(Condition::TotalFruits, self.player.total_fruits_sliced);
        self.check(Condition::TotalCombos, self.player.total_combos);
        self.check(Condition::TotalIce, self.player.total_ice_sliced);
        self.check(Condition::TotalGames, self.player.total_games_played);
        self.check(Condition::TotalExplosions, self.player.total_bomb_explosions);
        self.check(Condition::BombsAvoidedInRound, stats.bombs_avoided as u64);
        self.check(Condition::SurvivalTime, summary.elapsed as u64);

        if exploded {
            self.check(Condition::Exploded, 1);
        } else {
            if stats.hearts_lost == 0 {
                self.check(Condition::NoHeartsLost, 1);
            }
            let remaining = self.round.starting_hearts.saturating_sub(stats.hearts_lost);
            self.check(Condition::HeartsRemaining, remaining as u64);
        }
    }

    /// Unlock every achievement of `condition` whose threshold `value` meets
    fn check(&mut self, condition: Condition, value: u64) {
        for achievement in ACHIEVEMENTS {
            if achievement.condition == condition && value >= achievement.threshold {
                self.unlock(achievement);
            }
        }
    }

    fn unlock(&mut self, achievement: &'static Achievement) {
        if self.player.unlocked.insert(achievement.id.to_string()) {
            log::info!("Achievement unlocked: {}", achievement.id);
            self.pending.push(achievement);
        }
    }

    /// Take new unlocks, oldest first
    pub fn take_unlocked(&mut self) -> Vec<&'static Achievement> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, GameMode};
    use crate::sim::RoundStats;

    fn at(time: f32, event: GameEvent) -> TimedEvent {
        TimedEvent {
            tick: (time * 60.0) as u64,
            time,
            event,
        }
    }

    fn summary(outcome: Outcome, stats: RoundStats, elapsed: f32) -> RoundSummary {
        RoundSummary {
            final_score: 0,
            outcome,
            mode: GameMode::Classic,
            difficulty: Difficulty::Normal,
            control: ControlMode::Mouse,
            elapsed,
            stats,
        }
    }

    fn ids(unlocked: &[&'static Achievement]) -> Vec<&'static str> {
        unlocked.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: BTreeSet<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
        assert_eq!(find("marathon").map(|a| a.threshold), Some(120));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_score_thresholds_unlock_in_order() {
        let mut tracker = AchievementTracker::default();
        tracker.start_round(ControlMode::Mouse, 3);
        tracker.observe(&at(45.0, GameEvent::ScoreChanged { score: 30 }));
        assert_eq!(ids(&tracker.take_unlocked()), vec!["hatchling", "junior"]);

        // Already unlocked: no repeat
        tracker.observe(&at(50.0, GameEvent::ScoreChanged { score: 30 }));
        assert!(tracker.take_unlocked().is_empty());
    }

    #[test]
    fn test_speed_run_only_early() {
        let mut tracker = AchievementTracker::default();
        tracker.start_round(ControlMode::Mouse, 3);
        tracker.observe(&at(31.0, GameEvent::ScoreChanged { score: 20 }));
        assert!(!tracker.is_unlocked("speed_runner"));
        tracker.observe(&at(29.0, GameEvent::ScoreChanged { score: 21 }));
        assert!(tracker.is_unlocked("speed_runner"));
    }

    #[test]
    fn test_perfect_needs_full_hearts() {
        let mut tracker = AchievementTracker::default();
        tracker.start_round(ControlMode::Keyboard, 3);
        tracker.observe(&at(40.0, GameEvent::HeartLost { remaining: 2 }));
        tracker.observe(&at(90.0, GameEvent::ScoreChanged { score: 55 }));
        assert!(!tracker.is_unlocked("perfect"));
        assert!(tracker.is_unlocked("keyboard_virtuoso"));
        assert!(!tracker.is_unlocked("mouse_ninja"));

        tracker.start_round(ControlMode::Mouse, 3);
        tracker.observe(&at(90.0, GameEvent::ScoreChanged { score: 55 }));
        assert!(tracker.is_unlocked("perfect"));
        assert!(tracker.is_unlocked("mouse_ninja"));
    }

    #[test]
    fn test_combo_and_ice_in_round() {
        let mut tracker = AchievementTracker::default();
        tracker.start_round(ControlMode::Mouse, 3);
        tracker.observe(&at(1.0, GameEvent::FruitsSliced { count: 4, points: 7 }));
        for _ in 0..3 {
            tracker.observe(&at(2.0, GameEvent::IceSliced));
        }
        assert_eq!(
            ids(&tracker.take_unlocked()),
            vec!["agile_tongue", "lightning_tongue", "fresh_welcome", "freeze_strategist"]
        );
    }

    #[test]
    fn test_finish_round_folds_totals() {
        let mut tracker = AchievementTracker::new(PlayerStats {
            total_fruits_sliced: 45,
            total_games_played: 9,
            ..Default::default()
        });
        tracker.start_round(ControlMode::Mouse, 3);
        let stats = RoundStats {
            fruits_sliced: 6,
            combos: 1,
            bombs_avoided: 10,
            hearts_lost: 3,
            ..Default::default()
        };
        tracker.finish_round(&summary(Outcome::HeartsDepleted, stats, 125.0));

        assert_eq!(tracker.stats().total_fruits_sliced, 51);
        assert_eq!(tracker.stats().total_games_played, 10);
        let unlocked = ids(&tracker.take_unlocked());
        assert!(unlocked.contains(&"growing_appetite"));
        assert!(unlocked.contains(&"survivor"));
        assert!(unlocked.contains(&"amateur_deminer"));
        assert!(unlocked.contains(&"marathon"));
        assert!(!unlocked.contains(&"intact_heart"));
        assert!(!unlocked.contains(&"caution"));
    }

    #[test]
    fn test_explosion_blocks_survival_awards() {
        let mut tracker = AchievementTracker::default();
        tracker.start_round(ControlMode::Mouse, 3);
        tracker.finish_round(&summary(Outcome::ExplodedOut, RoundStats::default(), 12.0));
        assert!(tracker.is_unlocked("oops"));
        assert!(!tracker.is_unlocked("intact_heart"));
        assert!(!tracker.is_unlocked("caution"));
        assert_eq!(tracker.stats().total_bomb_explosions, 1);

        tracker.start_round(ControlMode::Mouse, 3);
        let stats = RoundStats {
            hearts_lost: 1,
            ..Default::default()
        };
        tracker.finish_round(&summary(Outcome::HeartsDepleted, stats, 12.0));
        assert!(tracker.is_unlocked("caution"));
        assert!(!tracker.is_unlocked("intact_heart"));
    }

    #[test]
    fn test_stats_round_trip_json() {
        let mut tracker = AchievementTracker::default();
        tracker.start_round(ControlMode::Mouse, 3);
        tracker.observe(&at(5.0, GameEvent::ScoreChanged { score: 12 }));
        let json = serde_json::to_string(tracker.stats()).unwrap();
        let restored: PlayerStats = serde_json::from_str(&json).unwrap();
        let tracker = AchievementTracker::new(restored);
        assert!(tracker.is_unlocked("hatchling"));
        assert_eq!(tracker.progress(), (1, ACHIEVEMENTS.len()));

        // Older saves without the unlock list still load
        let legacy: PlayerStats = serde_json::from_str(r#"{"total_games_played":3}"#).unwrap();
        assert_eq!(legacy.total_games_played, 3);
        assert!(legacy.unlocked.is_empty());
    }
}
