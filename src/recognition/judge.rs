//! Hold-to-complete judge for card tasks

use tracing::debug;

use super::stabilizer::Gesture;
use crate::core::config::JudgeConfig;

/// Shortest hold a card may ask for
pub const MIN_HOLD_SECS: f32 = 0.1;

/// Result of one judge tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JudgeTick {
    /// Hold progress 0..1
    Progress(f32),
    /// The target was held for the full duration
    Success,
}

/// Accumulates hold time while the confirmed gesture matches the armed target
#[derive(Debug, Clone)]
pub struct TaskJudge {
    require_arming: bool,
    default_hold: f32,
    target: Gesture,
    required_hold: f32,
    timer: f32,
    armed: bool,
}

impl Default for TaskJudge {
    fn default() -> Self {
        Self::new(JudgeConfig::default())
    }
}

impl TaskJudge {
    pub fn new(config: JudgeConfig) -> Self {
        Self {
            require_arming: config.require_arming,
            default_hold: config.default_hold_secs.max(MIN_HOLD_SECS),
            target: Gesture::Open,
            required_hold: config.default_hold_secs.max(MIN_HOLD_SECS),
            timer: 0.0,
            armed: false,
        }
    }

    /// Start a task. A missing hold uses the configured default.
    pub fn arm(&mut self, target: Gesture, hold_secs: Option<f32>) {
        self.target = target;
        self.required_hold = hold_secs.unwrap_or(self.default_hold).max(MIN_HOLD_SECS);
        self.timer = 0.0;
        self.armed = true;
        debug!(target = %target, hold = self.required_hold, "task armed");
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.timer = 0.0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether ticks are judged right now
    pub fn is_active(&self) -> bool {
        self.armed || !self.require_arming
    }

    pub fn set_require_arming(&mut self, require: bool) {
        self.require_arming = require;
    }

    pub fn target(&self) -> Gesture {
        self.target
    }

    pub fn progress(&self) -> f32 {
        (self.timer / self.required_hold.max(1e-4)).clamp(0.0, 1.0)
    }

    /// Advance by `dt` seconds with the classifier's confirmed gesture
    ///
    /// Unknown keeps the accumulated time; any other non-target gesture
    /// resets it.
    pub fn tick(&mut self, confirmed: Gesture, dt: f32) -> JudgeTick {
        if !self.is_active() {
            self.timer = 0.0;
            return JudgeTick::Progress(0.0);
        }

        if confirmed == self.target {
            self.timer += dt;
            if self.timer >= self.required_hold {
                self.timer = 0.0;
                if self.require_arming {
                    self.armed = false;
                }
                debug!(target = %self.target, "task held");
                return JudgeTick::Success;
            }
        } else if confirmed != Gesture::Unknown {
            self.timer = 0.0;
        }
        JudgeTick::Progress(self.progress())
    }
}
