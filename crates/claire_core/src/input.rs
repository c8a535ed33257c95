//! Edge-triggered keyboard state.
//!
//! `is_just_pressed(key)` is true only during the frame the key went down.
//! It is cleared by `end_frame()`, which the main loop calls after the face
//! controller has consumed the frame. Holding a key (OS key repeat) never
//! produces a second press; the key has to be released first.

use std::collections::HashSet;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    Escape,
    Q,
    W,
    E,
    R,
    A,
    D,
}

impl Key {
    /// Label shown in on-screen instructions.
    pub fn label(self) -> &'static str {
        match self {
            Self::Escape => "Esc",
            Self::Q => "Q",
            Self::W => "W",
            Self::E => "E",
            Self::R => "R",
            Self::A => "A",
            Self::D => "D",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Press and release within the same frame. Used by replays.
    pub fn tap(&mut self, key: Key) {
        self.key_down(key);
        self.key_up(key);
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
