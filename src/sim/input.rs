//! Input resolution
//!
//! Turns raw pointer/key events into the list of objects cut this tick.
//! The rest of the simulation never knows which control mode is active.

use std::collections::{BTreeSet, HashSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::config::ControlMode;
use crate::consts::*;

/// Raw input, in play-field coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    KeyDown(char),
    KeyUp(char),
}

/// Per-round slice detector
#[derive(Debug, Clone)]
pub struct SliceDetector {
    mode: ControlMode,
    pointer_down: bool,
    /// Drag history, oldest first
    trail: VecDeque<Vec2>,
    /// Bumped on every pointer down
    stroke: u64,
    /// Entities already cut during the current stroke
    stroke_hits: HashSet<u32>,
    pressed_keys: BTreeSet<char>,
}

impl SliceDetector {
    pub fn new(mode: ControlMode) -> Self {
        Self {
            mode,
            pointer_down: false,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
            stroke: 0,
            stroke_hits: HashSet::new(),
            pressed_keys: BTreeSet::new(),
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Identifies the current (or last) drag stroke
    pub fn stroke_id(&self) -> u64 {
        self.stroke
    }

    /// Feed one raw event. Events for the other control mode are ignored.
    pub fn handle_raw_input(&mut self, event: InputEvent) {
        match (self.mode, event) {
            (ControlMode::Mouse, InputEvent::PointerDown { x, y }) => {
                self.pointer_down = true;
                self.stroke += 1;
                self.trail.clear();
                self.push_trail(Vec2::new(x, y));
                self.stroke_hits.clear();
            }
            (ControlMode::Mouse, InputEvent::PointerMove { x, y }) => {
                if self.pointer_down {
                    self.push_trail(Vec2::new(x, y));
                }
            }
            (ControlMode::Mouse, InputEvent::PointerUp { .. }) => {
                self.pointer_down = false;
                self.trail.clear();
                self.stroke_hits.clear();
            }
            (ControlMode::Keyboard, InputEvent::KeyDown(key)) => {
                self.pressed_keys.insert(key.to_ascii_uppercase());
            }
            (ControlMode::Keyboard, InputEvent::KeyUp(key)) => {
                self.pressed_keys.remove(&key.to_ascii_uppercase());
            }
            _ => {}
        }
    }

    fn push_trail(&mut self, point: Vec2) {
        self.trail.push_back(point);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }

    /// Ids of the active entities cut by the current input
    pub fn resolve(&mut self, entities: &[Entity]) -> Vec<u32> {
        match self.mode {
            ControlMode::Mouse => self.resolve_drag(entities),
            ControlMode::Keyboard => self.resolve_keys(entities),
        }
    }

    fn resolve_drag(&mut self, entities: &[Entity]) -> Vec<u32> {
        if !self.pointer_down || self.trail.len() < 2 {
            return Vec::new();
        }

        // Only the newest segment is tested
        let p2 = self.trail[self.trail.len() - 1];
        let p1 = self.trail[self.trail.len() - 2];
        if p1.distance_squared(p2) < MIN_SLICE_MOVEMENT_SQ {
            return Vec::new();
        }

        let mut cut = Vec::new();
        for entity in entities {
            if !entity.is_active() || self.stroke_hits.contains(&entity.id) {
                continue;
            }
            if entity.intersects_segment(p1, p2) {
                cut.push(entity.id);
                self.stroke_hits.insert(entity.id);
            }
        }
        cut
    }

    fn resolve_keys(&mut self, entities: &[Entity]) -> Vec<u32> {
        if self.pressed_keys.is_empty() {
            return Vec::new();
        }

        let cut = entities
            .iter()
            .filter(|e| e.is_active())
            .filter(|e| e.letter.is_some_and(|l| self.pressed_keys.contains(&l)))
            .map(|e| e.id)
            .collect();

        // One press, one cut
        self.pressed_keys.clear();
        cut
    }

    /// Drag button held, or any key down
    pub fn is_actively_slicing(&self) -> bool {
        match self.mode {
            ControlMode::Mouse => self.pointer_down,
            ControlMode::Keyboard => !self.pressed_keys.is_empty(),
        }
    }

    /// Drag trail for rendering, oldest first
    pub fn trail_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.trail.iter().copied()
    }
}
