//! Menu mode selection by raised fingers
//!
//! Five raised fingers pick random mode, one isolated raised fingertip picks
//! card mode. The same choice has to be held before it is confirmed, and a
//! selector confirms only once.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::SelectionConfig;
use crate::landmarks::fingers::Finger;
use crate::landmarks::frame::LandmarkFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainingMode {
    Card,
    Random,
}

impl TrainingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingMode::Card => "card",
            TrainingMode::Random => "random",
        }
    }
}

/// Fingers whose tip is above their MCP (smaller image y)
pub fn count_fingers_up(frame: &LandmarkFrame) -> usize {
    if !frame.is_complete() {
        return 0;
    }
    Finger::ALL
        .iter()
        .filter(|f| frame.point(f.tip()).y < frame.point(f.knuckle()).y)
        .count()
}

/// True if some raised fingertip sits well apart from the other four
pub fn has_isolated_finger(frame: &LandmarkFrame, isolation_distance: f32) -> bool {
    if !frame.is_complete() {
        return false;
    }
    Finger::ALL.iter().any(|finger| {
        let tip = frame.point(finger.tip());
        let total: f32 = Finger::ALL
            .iter()
            .filter(|other| *other != finger)
            .map(|other| tip.distance(frame.point(other.tip())))
            .sum();
        let average = total / (Finger::ALL.len() - 1) as f32;
        average > isolation_distance && tip.y < frame.point(finger.knuckle()).y
    })
}

/// Hold-to-confirm mode selector
#[derive(Debug, Clone)]
pub struct ModeSelector {
    config: SelectionConfig,
    candidate: Option<TrainingMode>,
    held: f32,
    confirmed: Option<TrainingMode>,
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}

impl ModeSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            candidate: None,
            held: 0.0,
            confirmed: None,
        }
    }

    /// What a single frame would select
    pub fn detect(&self, frame: &LandmarkFrame) -> Option<TrainingMode> {
        if count_fingers_up(frame) == 5 {
            Some(TrainingMode::Random)
        } else if has_isolated_finger(frame, self.config.isolation_distance) {
            Some(TrainingMode::Card)
        } else {
            None
        }
    }

    pub fn candidate(&self) -> Option<TrainingMode> {
        self.candidate
    }

    pub fn confirmed(&self) -> Option<TrainingMode> {
        self.confirmed
    }

    /// Hold progress of the current candidate, 0..1
    pub fn progress(&self) -> f32 {
        if self.config.hold_secs <= 0.0 {
            return if self.candidate.is_some() { 1.0 } else { 0.0 };
        }
        (self.held / self.config.hold_secs).clamp(0.0, 1.0)
    }

    /// Advance by `dt` seconds. Returns the mode on the tick it is confirmed.
    pub fn update(&mut self, frame: Option<&LandmarkFrame>, dt: f32) -> Option<TrainingMode> {
        if self.confirmed.is_some() {
            return None;
        }

        let Some(detected) = frame.and_then(|f| self.detect(f)) else {
            self.candidate = None;
            self.held = 0.0;
            return None;
        };

        if self.candidate != Some(detected) {
            debug!(mode = detected.as_str(), "selection candidate");
            self.candidate = Some(detected);
            self.held = 0.0;
        } else {
            self.held += dt;
        }

        if self.held >= self.config.hold_secs {
            info!(mode = detected.as_str(), "training mode selected");
            self.confirmed = Some(detected);
            return Some(detected);
        }
        None
    }
}
