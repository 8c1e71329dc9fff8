//! Animation capability the presentation layer implements
//!
//! The core only names states; it never inspects visual types.

use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationState {
    Idle,
    Move,
    Attack,
    Hurt,
    Death,
}

impl AnimationState {
    pub fn name(&self) -> &'static str {
        match self {
            AnimationState::Idle => "Idle",
            AnimationState::Move => "Move",
            AnimationState::Attack => "Attack",
            AnimationState::Hurt => "Hurt",
            AnimationState::Death => "Death",
        }
    }
}

pub trait AnimationPort {
    fn play_state(&mut self, unit: UnitId, state: AnimationState);
}

/// Port for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnimation;

impl AnimationPort for NullAnimation {
    fn play_state(&mut self, _unit: UnitId, _state: AnimationState) {}
}

/// Port that remembers every request (tests, replays)
#[derive(Debug, Clone, Default)]
pub struct RecordingAnimation {
    pub played: Vec<(UnitId, AnimationState)>,
}

impl AnimationPort for RecordingAnimation {
    fn play_state(&mut self, unit: UnitId, state: AnimationState) {
        self.played.push((unit, state));
    }
}
