//! Single-round scoring engine
//!
//! A round runs a main countdown until the blended live score reaches the
//! success threshold, then a short final countdown that keeps the peak live
//! score. Rounds that never reach the threshold time out with a finish
//! score of 0.

use tracing::{debug, warn};

use crate::core::config::RoundConfig;
use crate::core::types::Attitude;
use crate::landmarks::frame::LandmarkFrame;
use crate::scoring::gesture_class::GestureClass;
use crate::scoring::rules::RuleScorer;
use crate::scoring::template::{ReferenceTemplate, TemplateScorer};

use super::records::round2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoundPhase {
    #[default]
    Idle,
    /// Waiting for the live score to reach the threshold
    Main,
    /// Threshold reached, tracking the peak
    FinalCountdown,
}

/// Result of advancing a round by one tick
#[derive(Debug, Clone, PartialEq)]
pub enum RoundTick {
    Idle,
    Running,
    FinalCountdownStarted { live_score: u8 },
    Completed(RoundOutcome),
}

/// Everything a finished round reports before attitude and difficulty are applied
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub gesture_name: String,
    /// Peak live score in the final countdown, 0 on timeout
    pub finish_score: u8,
    /// Seconds until the threshold was reached, capped at the main countdown
    pub time_taken: f32,
    pub reference_score: u8,
    pub rule_score: u8,
    pub reached_threshold: bool,
}

#[derive(Debug, Clone)]
struct ActiveRound {
    gesture_name: String,
    class: GestureClass,
    reference: Option<ReferenceTemplate>,
    phase: RoundPhase,
    elapsed: f32,
    final_left: f32,
    time_taken: f32,
    rule_score: u8,
    reference_score: u8,
    live_score: u8,
    peak: u8,
}

/// Blend finish score, speed and attitude into a 0..100 final score
///
/// `0.4 * finish/100 + 0.4 * (1 - time/main_countdown) + 0.2 * attitude`
pub fn final_score(finish_score: u8, time_taken: f32, attitude: Attitude, main_countdown: f32) -> f32 {
    let score_factor = finish_score as f32 / 100.0;
    let time_factor = if main_countdown > 0.0 {
        (1.0 - time_taken / main_countdown).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let blended = 0.4 * score_factor + 0.4 * time_factor + 0.2 * attitude.factor();
    round2((blended * 100.0).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, Default)]
pub struct RoundEngine {
    config: RoundConfig,
    rules: RuleScorer,
    templates: TemplateScorer,
    round: Option<ActiveRound>,
}

impl RoundEngine {
    pub fn new(config: RoundConfig, rules: RuleScorer) -> Self {
        Self {
            config,
            rules,
            templates: TemplateScorer::new(),
            round: None,
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleScorer {
        &self.rules
    }

    /// Begin a round for a catalog gesture, replacing any round in progress
    pub fn start_round(&mut self, gesture_name: impl Into<String>, reference: Option<ReferenceTemplate>) {
        let gesture_name = gesture_name.into();
        let class = GestureClass::from_name(&gesture_name);
        if !class.has_rule() {
            warn!(
                gesture = %gesture_name,
                fallback = self.rules.fallback_score(),
                "no scoring rule for gesture, using fallback rule score"
            );
        }
        if reference.is_none() {
            debug!(gesture = %gesture_name, "no reference template, template score stays 0");
        }

        self.round = Some(ActiveRound {
            gesture_name,
            class,
            reference,
            phase: RoundPhase::Main,
            elapsed: 0.0,
            final_left: 0.0,
            time_taken: 0.0,
            rule_score: 0,
            reference_score: 0,
            live_score: 0,
            peak: 0,
        });
    }

    pub fn is_active(&self) -> bool {
        self.round.is_some()
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.as_ref().map(|r| r.phase).unwrap_or_default()
    }

    pub fn gesture_name(&self) -> Option<&str> {
        self.round.as_ref().map(|r| r.gesture_name.as_str())
    }

    pub fn live_score(&self) -> u8 {
        self.round.as_ref().map(|r| r.live_score).unwrap_or(0)
    }

    pub fn rule_score(&self) -> u8 {
        self.round.as_ref().map(|r| r.rule_score).unwrap_or(0)
    }

    pub fn reference_score(&self) -> u8 {
        self.round.as_ref().map(|r| r.reference_score).unwrap_or(0)
    }

    /// Seconds left on whichever countdown is running
    pub fn remaining(&self) -> f32 {
        match &self.round {
            Some(r) if r.phase == RoundPhase::Main => (self.config.main_countdown_secs - r.elapsed).max(0.0),
            Some(r) => r.final_left.max(0.0),
            None => 0.0,
        }
    }

    /// Score a frame. Without a hand every score drops to 0; the
    /// final-countdown peak is kept.
    pub fn observe(&mut self, frame: Option<&LandmarkFrame>) {
        let Some(frame) = frame.filter(|f| f.is_complete()) else {
            self.observe_scores(0, 0);
            return;
        };
        let Some(round) = &self.round else {
            return;
        };
        let rule = self.rules.score(round.class, frame);
        let template = self.templates.score(frame, round.reference.as_ref());
        self.observe_scores(rule, template);
    }

    /// Feed precomputed rule and template scores
    pub fn observe_scores(&mut self, rule_score: u8, template_score: u8) {
        let live = self.blend(rule_score, template_score);
        if let Some(round) = self.round.as_mut() {
            round.rule_score = rule_score.min(100);
            round.reference_score = template_score.min(100);
            round.live_score = live;
        }
    }

    fn blend(&self, rule_score: u8, template_score: u8) -> u8 {
        let live = rule_score.min(100) as f32 * self.config.rule_weight
            + template_score.min(100) as f32 * self.config.template_weight;
        live.round().clamp(0.0, 100.0) as u8
    }

    /// Advance the running countdown
    pub fn tick(&mut self, dt: f32) -> RoundTick {
        let Some(round) = self.round.as_mut() else {
            return RoundTick::Idle;
        };

        match round.phase {
            RoundPhase::Idle => RoundTick::Idle,
            RoundPhase::Main => {
                round.elapsed += dt;
                if round.live_score >= self.config.success_threshold {
                    round.phase = RoundPhase::FinalCountdown;
                    round.time_taken = round.elapsed;
                    round.peak = round.live_score;
                    round.final_left = self.config.final_countdown_secs;
                    debug!(
                        gesture = %round.gesture_name,
                        live_score = round.live_score,
                        elapsed = round.elapsed,
                        "final countdown started"
                    );
                    return RoundTick::FinalCountdownStarted {
                        live_score: round.live_score,
                    };
                }
                if round.elapsed >= self.config.main_countdown_secs {
                    let outcome = RoundOutcome {
                        gesture_name: round.gesture_name.clone(),
                        finish_score: 0,
                        time_taken: self.config.main_countdown_secs,
                        reference_score: round.reference_score,
                        rule_score: round.rule_score,
                        reached_threshold: false,
                    };
                    debug!(gesture = %outcome.gesture_name, "round timed out");
                    self.round = None;
                    return RoundTick::Completed(outcome);
                }
                RoundTick::Running
            }
            RoundPhase::FinalCountdown => {
                round.peak = round.peak.max(round.live_score);
                round.final_left -= dt;
                if round.final_left > 0.0 {
                    return RoundTick::Running;
                }
                let outcome = RoundOutcome {
                    gesture_name: round.gesture_name.clone(),
                    finish_score: round.peak,
                    time_taken: round2(round.time_taken.min(self.config.main_countdown_secs)),
                    reference_score: round.reference_score,
                    rule_score: round.rule_score,
                    reached_threshold: true,
                };
                self.round = None;
                RoundTick::Completed(outcome)
            }
        }
    }

    /// Drop the round in progress without an outcome
    pub fn cancel(&mut self) {
        self.round = None;
    }
}
