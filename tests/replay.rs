//! Deterministic replay tests: whole rounds driven through the public API

use fruit_slicer::config::{ConfigTable, ControlMode, Difficulty, GameMode};
use fruit_slicer::consts::*;
use fruit_slicer::sim::{
    EntityKind, FixedStep, GameEvent, InputEvent, Outcome, RoundSetup, Session, TimedEvent,
};

/// Scripted swipes: a long diagonal every 12 ticks, released 4 ticks later
fn scripted_input(tick: u64) -> Vec<InputEvent> {
    let phase = tick % 12;
    let sweep = (tick / 12 % 5) as f32 * 150.0;
    match phase {
        0 => vec![InputEvent::PointerDown {
            x: 350.0 + sweep,
            y: 250.0,
        }],
        1..=3 => vec![InputEvent::PointerMove {
            x: 350.0 + sweep + phase as f32 * 200.0,
            y: 250.0 + phase as f32 * 200.0,
        }],
        4 => vec![InputEvent::PointerUp { x: 0.0, y: 0.0 }],
        _ => Vec::new(),
    }
}

fn play(setup: RoundSetup, ticks: u64) -> (Session, Vec<TimedEvent>) {
    let mut session = Session::new(setup, ConfigTable::default()).unwrap();
    let mut events = Vec::new();
    for tick in 0..ticks {
        for input in scripted_input(tick) {
            session.handle_input(input);
        }
        session.tick(SIM_DT);
        events.extend(session.drain_events());
    }
    (session, events)
}

/// Invariants that hold after every tick
fn check_invariants(session: &Session) {
    let round = session.round();
    let scoring = session.scoring();
    assert!(round.hearts <= MAX_HEARTS);
    assert!(scoring.multiplier >= 1);
    if scoring.multiplier == 1 {
        assert_eq!(scoring.multiplier_remaining, 0.0);
    }
    assert!(session.gauge().notches < MAX_NOTCHES);
    assert!(session.entities().windows(2).all(|w| w[0].id < w[1].id));
    if let Some(remaining) = round.time_remaining {
        assert!(remaining >= 0.0);
    }
    if round.is_frozen {
        assert!(round.freeze_remaining > 0.0);
    }
    for entity in session.entities() {
        assert!(entity.radius > 0.0);
        if !entity.is_fruit() {
            assert!(!entity.frozen);
        }
    }
}

#[test]
fn test_determinism() {
    let setup = RoundSetup {
        seed: 99999,
        ..Default::default()
    };
    let (a, events_a) = play(setup, 1800);
    let (b, events_b) = play(setup, 1800);

    assert_eq!(events_a, events_b);
    assert_eq!(a.entities(), b.entities());
    assert_eq!(a.scoring(), b.scoring());
    assert_eq!(a.round(), b.round());
}

#[test]
fn test_different_seeds_diverge() {
    let (a, _) = play(RoundSetup { seed: 1, ..Default::default() }, 300);
    let (b, _) = play(RoundSetup { seed: 2, ..Default::default() }, 300);
    assert_ne!(a.entities(), b.entities());
}

#[test]
fn test_clock_matches_direct_ticks() {
    let setup = RoundSetup {
        seed: 7,
        ..Default::default()
    };
    let mut paced = Session::new(setup, ConfigTable::default()).unwrap();
    let mut clock = FixedStep::default();
    let frames = [0.016, 0.017, 0.033, 0.005, 0.25];
    let mut steps = 0;
    for i in 0..400 {
        steps += clock.advance(frames[i % frames.len()], |dt| paced.tick(dt));
    }

    let mut direct = Session::new(setup, ConfigTable::default()).unwrap();
    for _ in 0..steps {
        direct.tick(SIM_DT);
    }

    assert_eq!(paced.tick_count(), steps as u64);
    assert_eq!(paced.entities(), direct.entities());
    assert_eq!(paced.drain_events(), direct.drain_events());
}

#[test]
fn test_classic_round_runs_to_an_end() {
    for difficulty in Difficulty::ALL {
        let setup = RoundSetup {
            seed: 4242,
            difficulty,
            ..Default::default()
        };
        let mut session = Session::new(setup, ConfigTable::default()).unwrap();
        let mut last_score = 0;
        let mut tick = 0;
        // Scripted swipes never cover the whole zone: fruit gets missed
        while !session.is_ended() && tick < 60 * 600 {
            for input in scripted_input(tick) {
                session.handle_input(input);
            }
            session.tick(SIM_DT);
            check_invariants(&session);
            // No penalties in Classic
            assert!(session.scoring().score >= last_score);
            last_score = session.scoring().score;
            tick += 1;
        }

        assert!(session.is_ended(), "{difficulty} round never ended");
        let summary = session.summary().unwrap();
        assert_ne!(summary.outcome, Outcome::TimeUp);
        assert_eq!(summary.final_score, session.scoring().score);
        let ended = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e.event, GameEvent::RoundEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }
}

#[test]
fn test_challenge_round_times_out() {
    let setup = RoundSetup {
        seed: 31337,
        mode: GameMode::Challenge,
        ..Default::default()
    };
    let mut session = Session::new(setup, ConfigTable::default()).unwrap();
    let mut events = Vec::new();
    let mut tick = 0;
    while !session.is_ended() && tick < 60 * 120 {
        for input in scripted_input(tick) {
            session.handle_input(input);
        }
        session.tick(SIM_DT);
        check_invariants(&session);
        assert!(session.entities().iter().all(|e| e.kind != EntityKind::Ice));
        events.extend(session.drain_events());
        tick += 1;
    }

    assert_eq!(session.outcome(), Outcome::TimeUp);
    assert_eq!(session.round().hearts, MAX_HEARTS);
    assert!(!events
        .iter()
        .any(|e| matches!(e.event, GameEvent::HeartLost { .. } | GameEvent::FreezeStarted { .. })));
}

#[test]
fn test_keyboard_round_letters() {
    let setup = RoundSetup {
        seed: 5,
        control: ControlMode::Keyboard,
        ..Default::default()
    };
    let mut session = Session::new(setup, ConfigTable::default()).unwrap();
    let mut sliced = 0;

    for tick in 0..60 * 20 {
        // Every active object shows a letter from the keyboard set
        for entity in session.entities().iter().filter(|e| e.is_active()) {
            let letter = entity.letter.unwrap();
            assert!(KEYBOARD_LETTERS.contains(&letter));
        }

        // Press the letter of the oldest active fruit every half second
        if tick % 30 == 0 {
            let target = session
                .entities()
                .iter()
                .find(|e| e.is_fruit() && e.is_active())
                .and_then(|e| e.letter);
            if let Some(letter) = target {
                session.handle_input(InputEvent::KeyDown(letter));
            }
        }
        session.tick(SIM_DT);
        check_invariants(&session);
        for event in session.drain_events() {
            if let GameEvent::FruitsSliced { count, .. } = event.event {
                sliced += count;
            }
        }
        if session.is_ended() {
            break;
        }
    }

    assert!(sliced > 0);
    // Mouse input is ignored in keyboard rounds
    let before = session.stats().clone();
    session.handle_input(InputEvent::PointerDown { x: 330.0, y: 500.0 });
    session.handle_input(InputEvent::PointerMove { x: 1590.0, y: 500.0 });
    session.tick(SIM_DT);
    assert_eq!(session.stats().fruits_sliced, before.fruits_sliced);
}

#[test]
fn test_events_serialize() {
    let (_, events) = play(RoundSetup::default(), 600);
    assert!(!events.is_empty());
    let json = serde_json::to_string(&events).unwrap();
    let back: Vec<TimedEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, events);
}
