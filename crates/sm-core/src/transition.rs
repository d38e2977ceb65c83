//! Level transition state machine
//!
//! Reaching the exit plays a fixed-length transition, then the next level is
//! generated and the maze reset. Time is fed in as elapsed milliseconds, so
//! nothing here depends on a clock.

use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum TransitionState {
    /// Normal play
    #[default]
    Idle,
    /// Exit reached, transition playing
    Transitioning,
    /// Waiting for the next level to be built
    Generating,
    /// Next level built, waiting for the maze to be reset
    Resetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    ExitReached,
    Elapsed(u64),
    LevelGenerated,
    ResetComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTransition {
    state: TransitionState,
    elapsed_ms: u64,
    duration_ms: u64,
}

impl LevelTransition {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            state: TransitionState::Idle,
            elapsed_ms: 0,
            duration_ms,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransitionState::Idle
    }

    /// Fraction of the transition played, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        match self.state {
            TransitionState::Idle => 0.0,
            TransitionState::Transitioning if self.duration_ms > 0 => {
                (self.elapsed_ms as f64 / self.duration_ms as f64).min(1.0)
            }
            _ => 1.0,
        }
    }

    /// Feed one event; pairs that make no sense leave the state alone
    pub fn advance(&mut self, event: TransitionEvent) -> TransitionState {
        use TransitionEvent as E;
        use TransitionState as S;

        let next = match (self.state, event) {
            (S::Idle, E::ExitReached) => {
                self.elapsed_ms = 0;
                S::Transitioning
            }
            (S::Transitioning, E::Elapsed(ms)) => {
                self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
                if self.elapsed_ms >= self.duration_ms {
                    S::Generating
                } else {
                    S::Transitioning
                }
            }
            (S::Generating, E::LevelGenerated) => S::Resetting,
            (S::Resetting, E::ResetComplete) => S::Idle,
            (state, _) => state,
        };

        if next != self.state {
            log::debug!("transition {} -> {}", self.state, next);
        }
        self.state = next;
        next
    }
}
