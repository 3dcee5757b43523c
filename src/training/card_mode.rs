//! Card mode: scan a card, perform its gesture, hold until the bar fills
//!
//! Each card names one of the stabilized gestures, a hold time and a
//! difficulty preset. Completed cards count as rounds for the block flow.

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::events::RehabEvent;
use super::flow::{SessionState, TrainingFlow};
use crate::core::config::RehabConfig;
use crate::landmarks::frame::LandmarkFrame;
use crate::recognition::judge::{JudgeTick, TaskJudge};
use crate::recognition::stabilizer::{Gesture, GestureClassifier, PresetLevel};

/// One scanned card
#[derive(Debug, Clone, PartialEq)]
pub struct CardTask {
    pub card_id: String,
    pub gesture: Gesture,
    /// None uses the judge's default hold
    pub hold_secs: Option<f32>,
    pub level: PresetLevel,
}

/// Card payload as printed on the physical cards
#[derive(Debug, Deserialize)]
struct CardPayload {
    #[serde(default)]
    card_id: String,
    #[serde(default)]
    gesture: String,
    #[serde(default)]
    hold_secs: Option<f32>,
    #[serde(default)]
    difficulty: String,
}

impl CardTask {
    pub fn new(gesture: Gesture) -> Self {
        Self {
            card_id: String::new(),
            gesture,
            hold_secs: None,
            level: PresetLevel::Medium,
        }
    }

    pub fn with_hold(mut self, secs: f32) -> Self {
        self.hold_secs = Some(secs);
        self
    }

    pub fn with_level(mut self, level: PresetLevel) -> Self {
        self.level = level;
        self
    }

    /// Parse a decoded card payload
    ///
    /// `{"card_id":"C-07","gesture":"fist","hold_secs":1.5,"difficulty":"hard"}`.
    /// Returns None for anything that is not a card or names an unsupported gesture.
    pub fn from_payload(payload: &str) -> Option<Self> {
        let raw: CardPayload = serde_json::from_str(payload).ok()?;
        let gesture = Gesture::from_name(&raw.gesture);
        if gesture == Gesture::Unknown {
            return None;
        }
        Some(Self {
            card_id: raw.card_id,
            gesture,
            hold_secs: raw.hold_secs,
            level: PresetLevel::from_name(&raw.difficulty),
        })
    }
}

pub struct CardSession {
    classifier: GestureClassifier,
    judge: TaskJudge,
    flow: TrainingFlow,
    task: Option<CardTask>,
    last_progress: f32,
    completed: Vec<CardTask>,
}

impl Default for CardSession {
    fn default() -> Self {
        Self::new(&RehabConfig::default())
    }
}

impl CardSession {
    pub fn new(config: &RehabConfig) -> Self {
        Self {
            classifier: GestureClassifier::new(config.recognizer.clone()),
            judge: TaskJudge::new(config.judge.clone()),
            flow: TrainingFlow::new(config.flow.clone(), config.thumb.clone()),
            task: None,
            last_progress: 0.0,
            completed: Vec::new(),
        }
    }

    pub fn flow(&self) -> &TrainingFlow {
        &self.flow
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn judge(&self) -> &TaskJudge {
        &self.judge
    }

    pub fn current_task(&self) -> Option<&CardTask> {
        self.task.as_ref()
    }

    pub fn completed(&self) -> &[CardTask] {
        &self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.flow.is_stopped()
    }

    /// Start a card. Ignored (returns false) outside Training.
    pub fn arm(&mut self, task: CardTask) -> bool {
        if !self.flow.is_training() {
            debug!(card = %task.card_id, state = %self.flow.state(), "card ignored outside training");
            return false;
        }
        if task.gesture == Gesture::Unknown {
            warn!(card = %task.card_id, "card has no recognizable gesture");
            return false;
        }

        self.classifier.apply_preset(task.level.preset());
        self.classifier.gate_to(task.gesture);
        self.judge.set_require_arming(true);
        self.judge.arm(task.gesture, task.hold_secs);
        self.last_progress = 0.0;
        info!(card = %task.card_id, gesture = %task.gesture, level = ?task.level, "card armed");
        self.task = Some(task);
        true
    }

    /// Advance one frame
    pub fn tick(&mut self, frame: Option<&LandmarkFrame>, dt: f32) -> Vec<RehabEvent> {
        let mut events = Vec::new();
        let before = self.flow.state();

        match before {
            SessionState::Training => self.tick_training(frame, dt, &mut events),
            SessionState::StateCheck => {
                self.classifier.update(frame);
                let hand_visible = frame.map_or(false, |f| f.is_complete());
                let points = if hand_visible {
                    self.classifier.smoothed_points()
                } else {
                    None
                };
                events.extend(self.flow.tick(points, dt));
            }
            SessionState::Rest => events.extend(self.flow.tick(None, dt)),
            SessionState::Stopped => {}
        }

        let after = self.flow.state();
        if after != before {
            self.on_state_change(after);
        }
        events
    }

    fn tick_training(&mut self, frame: Option<&LandmarkFrame>, dt: f32, events: &mut Vec<RehabEvent>) {
        if let Some(gesture) = self.classifier.update(frame) {
            events.push(RehabEvent::GestureConfirmed { gesture });
        }
        if !self.judge.is_active() {
            return;
        }

        match self.judge.tick(self.classifier.current(), dt) {
            JudgeTick::Progress(progress) => {
                if progress != self.last_progress {
                    self.last_progress = progress;
                    events.push(RehabEvent::TaskProgress { progress });
                }
            }
            JudgeTick::Success => {
                let gesture = self.judge.target();
                events.push(RehabEvent::TaskCompleted { gesture });
                self.last_progress = 0.0;
                self.classifier.clear_gate();
                self.classifier.set_gate_enabled(true);
                if let Some(task) = self.task.take() {
                    info!(card = %task.card_id, gesture = %gesture, "card completed");
                    self.completed.push(task);
                }
                events.extend(self.flow.record_round());
            }
        }
    }

    fn on_state_change(&mut self, state: SessionState) {
        match state {
            SessionState::StateCheck | SessionState::Rest => {
                // thumb classification needs ungated landmarks
                self.classifier.set_gate_enabled(false);
                self.judge.disarm();
            }
            SessionState::Training => {
                self.classifier.set_gate_enabled(true);
                self.judge.set_require_arming(true);
            }
            SessionState::Stopped => {
                self.classifier.clear_gate();
                self.judge.disarm();
                self.task = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::synthetic::SyntheticHand;

    fn run(session: &mut CardSession, frame: Option<&LandmarkFrame>, secs: f32) -> Vec<RehabEvent> {
        let mut events = Vec::new();
        let steps = (secs / 0.05).round() as usize;
        for _ in 0..steps {
            events.extend(session.tick(frame, 0.05));
        }
        events
    }

    #[test]
    fn test_payload_parsing() {
        let task = CardTask::from_payload(r#"{"card_id":"C-07","gesture":"FIST","hold_secs":1.5,"difficulty":"hard"}"#)
            .unwrap();
        assert_eq!(task.card_id, "C-07");
        assert_eq!(task.gesture, Gesture::Fist);
        assert_eq!(task.hold_secs, Some(1.5));
        assert_eq!(task.level, PresetLevel::Hard);

        let task = CardTask::from_payload(r#"{"gesture":"open"}"#).unwrap();
        assert_eq!(task.level, PresetLevel::Medium);
        assert_eq!(task.hold_secs, None);

        assert!(CardTask::from_payload("https://example.org").is_none());
        assert!(CardTask::from_payload(r#"{"gesture":"wave"}"#).is_none());
    }

    #[test]
    fn test_held_card_completes() {
        let mut session = CardSession::default();
        assert!(session.arm(CardTask::new(Gesture::Fist)));

        let fist = SyntheticHand::fist().build();
        let events = run(&mut session, Some(&fist), 2.0);

        assert!(events.contains(&RehabEvent::GestureConfirmed { gesture: Gesture::Fist }));
        assert!(events.contains(&RehabEvent::TaskCompleted { gesture: Gesture::Fist }));
        assert_eq!(session.completed().len(), 1);
        assert_eq!(session.flow().total_rounds(), 1);
        assert!(session.current_task().is_none());
        assert!(!session.judge().is_armed());
    }

    #[test]
    fn test_gate_hides_other_gestures() {
        let mut session = CardSession::default();
        session.arm(CardTask::new(Gesture::Fist));

        let open = SyntheticHand::open_palm().build();
        let events = run(&mut session, Some(&open), 2.0);

        assert!(events.is_empty());
        assert_eq!(session.classifier().current(), Gesture::Unknown);
        assert_eq!(session.flow().total_rounds(), 0);
    }

    #[test]
    fn test_unarmed_session_does_not_count() {
        let mut session = CardSession::default();
        let fist = SyntheticHand::fist().build();
        run(&mut session, Some(&fist), 3.0);
        assert_eq!(session.flow().total_rounds(), 0);
    }

    #[test]
    fn test_block_enters_state_check_and_resumes() {
        let mut session = CardSession::default();
        let fist = SyntheticHand::fist().build();
        for _ in 0..3 {
            assert!(session.arm(CardTask::new(Gesture::Fist)));
            run(&mut session, Some(&fist), 2.0);
        }
        assert_eq!(session.flow().state(), SessionState::StateCheck);
        assert!(session.classifier().gate_target().is_none());
        assert!(!session.arm(CardTask::new(Gesture::Fist)));

        let up = SyntheticHand::thumbs_up().build();
        run(&mut session, Some(&up), 3.0);
        assert_eq!(session.flow().state(), SessionState::Training);
        assert!(session.arm(CardTask::new(Gesture::Open)));
    }

    #[test]
    fn test_thumb_down_finishes_session() {
        let mut session = CardSession::default();
        let fist = SyntheticHand::fist().build();
        for _ in 0..3 {
            session.arm(CardTask::new(Gesture::Fist));
            run(&mut session, Some(&fist), 2.0);
        }
        let down = SyntheticHand::thumbs_down().build();
        let events = run(&mut session, Some(&down), 3.0);
        assert!(session.is_finished());
        assert!(events.iter().any(|e| matches!(e, RehabEvent::SessionEnded { total_rounds: 3, .. })));
    }
}
