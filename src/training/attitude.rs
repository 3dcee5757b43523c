//! Periodic Good/Bad attitude confirmation
//!
//! Every few rounds the session asks for a thumbs-up or thumbs-down. The
//! detector turns one frame into an expressed attitude; the controller
//! requires that attitude to be held before it counts.

use tracing::{debug, info};

use crate::core::config::AttitudeConfig;
use crate::core::types::{Attitude, Handedness};
use crate::landmarks::frame::{HandLandmark, LandmarkFrame};
use crate::scoring::gesture_class::GestureClass;
use crate::scoring::rules::RuleScorer;
use crate::scoring::template::{ReferenceTemplate, TemplateLibrary, TemplateScorer};

/// Per-frame attitude from like/dislike scores plus thumb height
#[derive(Debug, Clone, Default)]
pub struct AttitudeDetector {
    config: AttitudeConfig,
    rules: RuleScorer,
    templates: TemplateScorer,
    like: Option<ReferenceTemplate>,
    dislike: Option<ReferenceTemplate>,
}

impl AttitudeDetector {
    pub fn new(config: AttitudeConfig, rules: RuleScorer) -> Self {
        Self {
            config,
            rules,
            templates: TemplateScorer::new(),
            like: None,
            dislike: None,
        }
    }

    /// Use the library's like/dislike captures as reference templates
    pub fn with_references(mut self, library: &TemplateLibrary) -> Self {
        self.like = library.like_reference().cloned();
        self.dislike = library.dislike_reference().cloned();
        self
    }

    pub fn has_references(&self) -> bool {
        self.like.is_some() || self.dislike.is_some()
    }

    /// Like and dislike scores for a frame, each the better of rule and template
    pub fn scores(&self, frame: &LandmarkFrame) -> (u8, u8) {
        // attitude is judged with right-hand axes regardless of the label
        let rule_like = self
            .rules
            .score_with_handedness(GestureClass::Like, frame, Handedness::Right);
        let rule_dislike = self
            .rules
            .score_with_handedness(GestureClass::Dislike, frame, Handedness::Right);
        let template_like = self.like.as_ref().map_or(0, |t| self.templates.score(frame, Some(t)));
        let template_dislike = self
            .dislike
            .as_ref()
            .map_or(0, |t| self.templates.score(frame, Some(t)));

        (rule_like.max(template_like), rule_dislike.max(template_dislike))
    }

    pub fn detect(&self, frame: Option<&LandmarkFrame>) -> Attitude {
        let Some(frame) = frame.filter(|f| f.is_complete()) else {
            return Attitude::Neutral;
        };
        let (like, dislike) = self.scores(frame);

        let thumb_y = frame.point(HandLandmark::ThumbTip).y;
        let wrist_y = frame.point(HandLandmark::Wrist).y;
        let hand_up = thumb_y < wrist_y - self.config.vertical_offset;
        let hand_down = thumb_y > wrist_y + self.config.vertical_offset;

        if like as f32 >= self.config.score_threshold && hand_up {
            Attitude::Good
        } else if dislike as f32 >= self.config.score_threshold && hand_down {
            Attitude::Bad
        } else {
            Attitude::Neutral
        }
    }
}

/// Hold-to-confirm timer for the attitude sub-flow
#[derive(Debug, Clone, Default)]
pub struct AttitudeController {
    config: AttitudeConfig,
    active: bool,
    countdown_left: f32,
    cycle_left: f32,
    target: Attitude,
    pending: Attitude,
    hold: f32,
}

impl AttitudeController {
    pub fn new(config: AttitudeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Whether the sub-flow is due after `completed_rounds` rounds
    pub fn is_due(&self, completed_rounds: usize) -> bool {
        let interval = self.config.round_interval as usize;
        interval > 0 && completed_rounds > 0 && completed_rounds % interval == 0
    }

    pub fn enter(&mut self) {
        self.active = true;
        self.countdown_left = self.config.countdown_secs;
        self.cycle_left = self.config.cycle_secs;
        self.target = Attitude::Good;
        self.pending = Attitude::Neutral;
        self.hold = 0.0;
        info!(countdown = self.countdown_left, "attitude check started");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The attitude currently shown as the prompt
    pub fn target(&self) -> Attitude {
        self.target
    }

    pub fn pending(&self) -> Attitude {
        self.pending
    }

    pub fn remaining(&self) -> f32 {
        self.countdown_left.max(0.0)
    }

    pub fn hold_progress(&self) -> f32 {
        if self.config.hold_secs <= 0.0 {
            return 1.0;
        }
        (self.hold / self.config.hold_secs).clamp(0.0, 1.0)
    }

    /// Feed this frame's detected attitude. Returns the result once the sub-flow ends.
    pub fn tick(&mut self, detected: Attitude, dt: f32) -> Option<Attitude> {
        if !self.active {
            return None;
        }

        self.cycle_left -= dt;
        if self.cycle_left <= 0.0 {
            self.cycle_left = self.config.cycle_secs;
            self.target = self.target.flipped();
        }

        if detected == Attitude::Neutral {
            self.pending = Attitude::Neutral;
            self.hold = 0.0;
        } else if detected == self.pending {
            self.hold += dt;
            if self.hold >= self.config.hold_secs {
                info!(attitude = ?detected, "attitude confirmed");
                self.active = false;
                return Some(detected);
            }
        } else {
            debug!(attitude = ?detected, "attitude candidate");
            self.pending = detected;
            self.hold = 0.0;
        }

        self.countdown_left -= dt;
        if self.countdown_left <= 0.0 {
            info!("attitude check timed out");
            self.active = false;
            return Some(Attitude::Neutral);
        }
        None
    }
}
