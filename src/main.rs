//! Fruit Slicer headless demo
//!
//! Plays one seeded round with a simple autopilot, driving the session
//! through the fixed-step clock the way a frontend would.
//!
//! Usage: `fruit-slicer [seed] [classic|challenge] [easy|normal|hard] [mouse|keyboard]`

use std::str::FromStr;

use fruit_slicer::config::{ConfigError, ControlMode, Difficulty, GameMode};
use fruit_slicer::consts::*;
use fruit_slicer::sim::{EntityKind, FixedStep, InputEvent, RoundSetup, Session};
use fruit_slicer::{AchievementTracker, ConfigTable, HighScores, PlayerStats};

/// Frame deltas a real display loop might produce
const FRAME_PATTERN: [f32; 4] = [0.016, 0.017, 0.016, 0.033];
/// Classic rounds with a good autopilot can run forever
const MAX_ROUND_SECONDS: f32 = 300.0;
/// Half-length of an autopilot swipe
const SWIPE_REACH: f32 = 120.0;
/// Fruits closer than this to a bomb are left alone
const BOMB_CLEARANCE: f32 = 250.0;

/// Picks targets for the demo round
#[derive(Default)]
struct Autopilot {
    swiping: bool,
}

impl Autopilot {
    fn plan(&mut self, session: &Session) -> Vec<InputEvent> {
        match session.round().control {
            ControlMode::Mouse => self.plan_swipe(session),
            ControlMode::Keyboard => Self::plan_keys(session),
        }
    }

    fn plan_swipe(&mut self, session: &Session) -> Vec<InputEvent> {
        if self.swiping {
            self.swiping = false;
            return vec![InputEvent::PointerUp { x: 0.0, y: 0.0 }];
        }

        let entities = session.entities();
        let target = entities
            .iter()
            .filter(|e| e.is_fruit() && e.is_active())
            .filter(|e| {
                !entities.iter().any(|b| {
                    b.kind == EntityKind::Bomb
                        && b.is_active()
                        && b.pos().distance(e.pos()) < BOMB_CLEARANCE
                })
            })
            .min_by(|a, b| b.pos().y.total_cmp(&a.pos().y));

        let Some(target) = target else {
            return Vec::new();
        };
        self.swiping = true;
        let pos = target.pos();
        vec![
            InputEvent::PointerDown {
                x: pos.x - SWIPE_REACH,
                y: pos.y,
            },
            InputEvent::PointerMove {
                x: pos.x + SWIPE_REACH,
                y: pos.y,
            },
        ]
    }

    fn plan_keys(session: &Session) -> Vec<InputEvent> {
        session
            .entities()
            .iter()
            .filter(|e| e.is_fruit() && e.is_active())
            .filter_map(|e| e.letter)
            .take(1)
            .map(InputEvent::KeyDown)
            .collect()
    }
}

fn parse_args() -> Result<RoundSetup, ConfigError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut setup = RoundSetup::default();
    if let Some(seed) = args.first() {
        setup.seed = seed.parse().unwrap_or_else(|_| {
            log::warn!("Seed {:?} is not a number, using 0", seed);
            0
        });
    }
    if let Some(mode) = args.get(1) {
        setup.mode = GameMode::from_str(mode)?;
    }
    if let Some(difficulty) = args.get(2) {
        setup.difficulty = Difficulty::from_str(difficulty)?;
    }
    if let Some(control) = args.get(3) {
        setup.control = ControlMode::from_str(control)?;
    }
    Ok(setup)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let setup = parse_args()?;
    let mut session = Session::new(setup, ConfigTable::default())?;
    let mut clock = FixedStep::default();
    let mut pilot = Autopilot::default();
    let mut tracker = AchievementTracker::new(PlayerStats::default());
    tracker.start_round(setup.control, session.round().hearts);

    let mut frame = 0;
    while !session.is_ended() && session.round().elapsed < MAX_ROUND_SECONDS {
        for event in pilot.plan(&session) {
            session.handle_input(event);
        }

        let frame_dt = FRAME_PATTERN[frame % FRAME_PATTERN.len()];
        clock.advance(frame_dt, |dt| session.tick(dt));
        frame += 1;

        for event in session.drain_events() {
            log::debug!("[{:>6}] {:?}", event.tick, event.event);
            tracker.observe(&event);
        }
    }

    let Some(summary) = session.summary() else {
        log::info!("Stopped after {:.0}s with the round still running", MAX_ROUND_SECONDS);
        log::info!("Score: {}", session.scoring().score);
        return Ok(());
    };

    tracker.finish_round(&summary);
    for achievement in tracker.take_unlocked() {
        log::info!("Unlocked {} ({:?})", achievement.id, achievement.category);
    }

    let mut scores = HighScores::new();
    scores.record_round("Autopilot", &summary);

    println!("{}", serde_json::to_string_pretty(&summary)?);
    log::info!(
        "{} fruit sliced over {:.1}s at {} Hz",
        summary.stats.fruits_sliced,
        summary.elapsed,
        (1.0 / SIM_DT).round()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Fruit Slicer (headless) starting...");

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
