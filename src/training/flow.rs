//! Training / state-check / rest session flow
//!
//! ```text
//!   Training --block full--> StateCheck --thumb up----> Training
//!      |                        |--------thumb side--> Rest --timer--> Training
//!      |                        '--------thumb down--> Stopped
//!      '--target reached--> Stopped
//! ```
//!
//! Driven by an external tick; every timer is a plain accumulator.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::events::RehabEvent;
use crate::core::config::{FlowConfig, ThumbConfig};
use crate::recognition::thumb::{ThumbDirection, ThumbDirectionClassifier, ThumbReading};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Training,
    StateCheck,
    Rest,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Training => "training",
            SessionState::StateCheck => "state_check",
            SessionState::Rest => "rest",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// The configured total round count was reached
    TargetReached,
    /// Thumb down during a state check
    StoppedByUser,
}

impl EndReason {
    pub fn message(&self) -> &'static str {
        match self {
            EndReason::TargetReached => "All rounds completed",
            EndReason::StoppedByUser => "Training stopped by user",
        }
    }
}

/// Block-based session state machine
#[derive(Debug, Clone)]
pub struct TrainingFlow {
    config: FlowConfig,
    thumb: ThumbDirectionClassifier,
    state: SessionState,
    total_rounds: u32,
    rounds_in_block: u32,
    warmup_left: f32,
    hold: f32,
    held_direction: ThumbDirection,
    rest_left: f32,
    last_reading: ThumbReading,
    end_reason: Option<EndReason>,
}

impl Default for TrainingFlow {
    fn default() -> Self {
        Self::new(FlowConfig::default(), ThumbConfig::default())
    }
}

impl TrainingFlow {
    pub fn new(config: FlowConfig, thumb: ThumbConfig) -> Self {
        Self {
            config,
            thumb: ThumbDirectionClassifier::new(thumb),
            state: SessionState::Training,
            total_rounds: 0,
            rounds_in_block: 0,
            warmup_left: 0.0,
            hold: 0.0,
            held_direction: ThumbDirection::Unknown,
            rest_left: 0.0,
            last_reading: ThumbReading::default(),
            end_reason: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_training(&self) -> bool {
        self.state == SessionState::Training
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SessionState::Stopped
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn rounds_in_block(&self) -> u32 {
        self.rounds_in_block
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn rest_remaining(&self) -> f32 {
        self.rest_left.max(0.0)
    }

    /// Thumb hold progress during a state check, 0..1
    pub fn hold_progress(&self) -> f32 {
        if self.config.thumb_hold_secs <= 0.0 {
            return 0.0;
        }
        (self.hold / self.config.thumb_hold_secs).clamp(0.0, 1.0)
    }

    /// Measurements from the most recent state-check frame
    pub fn last_reading(&self) -> &ThumbReading {
        &self.last_reading
    }

    /// Count a completed round. Ignored outside Training.
    pub fn record_round(&mut self) -> Vec<RehabEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Training {
            return events;
        }

        self.total_rounds += 1;
        self.rounds_in_block += 1;

        if self.config.total_rounds_target > 0 && self.total_rounds >= self.config.total_rounds_target {
            self.end(EndReason::TargetReached, &mut events);
        } else if self.config.rounds_per_block > 0 && self.rounds_in_block >= self.config.rounds_per_block {
            self.start_state_check(&mut events);
        }
        events
    }

    /// Advance timers. `points` are the current image-plane landmarks, if a hand is visible.
    pub fn tick(&mut self, points: Option<&[Vec2]>, dt: f32) -> Vec<RehabEvent> {
        let mut events = Vec::new();
        match self.state {
            SessionState::StateCheck => self.tick_state_check(points, dt, &mut events),
            SessionState::Rest => {
                self.rest_left -= dt;
                if self.rest_left <= 0.0 {
                    self.resume_training(&mut events);
                }
            }
            SessionState::Training | SessionState::Stopped => {}
        }
        events
    }

    fn tick_state_check(&mut self, points: Option<&[Vec2]>, dt: f32, events: &mut Vec<RehabEvent>) {
        // stale gestures from the last training frame are discarded here
        if self.warmup_left > 0.0 {
            self.warmup_left -= dt;
            self.hold = 0.0;
            return;
        }

        self.last_reading = points.map(|p| self.thumb.classify(p)).unwrap_or_default();
        let direction = self.last_reading.direction;

        if direction == ThumbDirection::Unknown {
            self.hold = 0.0;
            self.held_direction = ThumbDirection::Unknown;
            return;
        }
        if direction != self.held_direction {
            self.held_direction = direction;
            self.hold = 0.0;
        }

        self.hold += dt;
        if self.hold < self.config.thumb_hold_secs {
            return;
        }

        info!(?direction, "state check answered");
        events.push(RehabEvent::StateCheckResult { direction });
        match direction {
            ThumbDirection::Up => self.resume_training(events),
            ThumbDirection::Down => self.end(EndReason::StoppedByUser, events),
            ThumbDirection::Side => self.start_rest(events),
            ThumbDirection::Unknown => {}
        }
    }

    fn transition(&mut self, to: SessionState, events: &mut Vec<RehabEvent>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        info!(%from, %to, "session state changed");
        events.push(RehabEvent::SessionStateChanged { from, to });
    }

    fn start_state_check(&mut self, events: &mut Vec<RehabEvent>) {
        self.rounds_in_block = 0;
        self.hold = 0.0;
        self.held_direction = ThumbDirection::Unknown;
        self.warmup_left = self.config.state_check_warmup_secs;
        self.transition(SessionState::StateCheck, events);
    }

    fn start_rest(&mut self, events: &mut Vec<RehabEvent>) {
        self.rest_left = self.config.rest_secs;
        debug!(secs = self.rest_left, "rest started");
        self.transition(SessionState::Rest, events);
    }

    fn resume_training(&mut self, events: &mut Vec<RehabEvent>) {
        self.hold = 0.0;
        self.held_direction = ThumbDirection::Unknown;
        self.warmup_left = 0.0;
        self.rest_left = 0.0;
        self.transition(SessionState::Training, events);
    }

    fn end(&mut self, reason: EndReason, events: &mut Vec<RehabEvent>) {
        self.end_reason = Some(reason);
        self.transition(SessionState::Stopped, events);
        info!(total_rounds = self.total_rounds, reason = reason.message(), "session ended");
        events.push(RehabEvent::SessionEnded {
            total_rounds: self.total_rounds,
            reason,
        });
    }
}
