//! Random mode: timed rounds over the template catalog with adaptive difficulty
//!
//! ```text
//!   Pause --> Round --timeout / final countdown--> [Attitude] --> record --> Pause
//! ```
//!
//! The block flow (state check, rest, stop) wraps the whole cycle; while it
//! is outside Training no rounds run.

use chrono::NaiveDateTime;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::attitude::{AttitudeController, AttitudeDetector};
use super::difficulty::{next_difficulty, DifficultyHistory};
use super::events::RehabEvent;
use super::flow::{SessionState, TrainingFlow};
use super::records::{SessionLog, SessionRoundRecord};
use super::round::{final_score, RoundEngine, RoundOutcome, RoundTick};
use crate::core::config::{DifficultyConfig, RehabConfig};
use crate::core::error::{RehabError, Result};
use crate::core::types::{Attitude, DifficultyLevel};
use crate::landmarks::frame::LandmarkFrame;
use crate::recognition::stabilizer::GestureClassifier;
use crate::scoring::gesture_class::difficulty_prefix;
use crate::scoring::rules::RuleScorer;
use crate::scoring::template::TemplateLibrary;

/// What the session is doing while the flow is in Training
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RandomPhase {
    /// Between rounds; detector input is ignored
    Pause { remaining: f32 },
    Round,
    /// Waiting for the attitude sub-flow before the round is recorded
    Attitude,
}

pub struct RandomSession {
    library: TemplateLibrary,
    engine: RoundEngine,
    detector: AttitudeDetector,
    attitude: AttitudeController,
    flow: TrainingFlow,
    /// Smooths landmarks for the thumb state check
    smoother: GestureClassifier,
    difficulty: DifficultyConfig,
    history: DifficultyHistory,
    level: DifficultyLevel,
    log: SessionLog,
    rng: ChaCha8Rng,
    phase: RandomPhase,
    pause_secs: f32,
    /// Finished round waiting on the attitude sub-flow
    pending: Option<RoundOutcome>,
}

impl RandomSession {
    /// Fails with `NoGestures` when the library is empty
    pub fn new(
        config: &RehabConfig,
        library: TemplateLibrary,
        started: NaiveDateTime,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        if library.is_empty() {
            return Err(RehabError::NoGestures);
        }

        let rules = RuleScorer::new(config.fingers.clone(), config.rules.clone());
        let detector = AttitudeDetector::new(config.attitude.clone(), rules.clone()).with_references(&library);
        let level = DifficultyLevel::default();

        info!(gestures = library.len(), "random session started");
        Ok(Self {
            engine: RoundEngine::new(config.round.clone(), rules),
            detector,
            attitude: AttitudeController::new(config.attitude.clone()),
            flow: TrainingFlow::new(config.flow.clone(), config.thumb.clone()),
            smoother: GestureClassifier::new(config.recognizer.clone()),
            difficulty: config.difficulty.clone(),
            history: DifficultyHistory::seeded(config.difficulty.history_size, level),
            level,
            log: SessionLog::new(started),
            rng,
            phase: RandomPhase::Pause { remaining: 0.0 },
            pause_secs: config.round.transition_pause_secs,
            pending: None,
            library,
        })
    }

    pub fn level(&self) -> DifficultyLevel {
        self.level
    }

    pub fn phase(&self) -> RandomPhase {
        self.phase
    }

    pub fn flow(&self) -> &TrainingFlow {
        &self.flow
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    pub fn attitude(&self) -> &AttitudeController {
        &self.attitude
    }

    pub fn history(&self) -> &DifficultyHistory {
        &self.history
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn into_log(self) -> SessionLog {
        self.log
    }

    pub fn is_finished(&self) -> bool {
        self.flow.is_stopped()
    }

    /// Catalog names eligible at `level`: those prefixed with its digit, else all
    pub fn candidates(&self, level: DifficultyLevel) -> Vec<&str> {
        candidate_names(&self.library, level)
    }

    /// Advance one frame
    pub fn tick(&mut self, frame: Option<&LandmarkFrame>, dt: f32) -> Vec<RehabEvent> {
        let mut events = Vec::new();
        if self.flow.is_stopped() {
            return events;
        }
        self.smoother.update(frame);

        match self.flow.state() {
            SessionState::Training => self.tick_training(frame, dt, &mut events),
            SessionState::StateCheck => {
                let hand_visible = frame.map_or(false, |f| f.is_complete());
                let points = if hand_visible {
                    self.smoother.smoothed_points()
                } else {
                    None
                };
                events.extend(self.flow.tick(points, dt));
                if self.flow.is_training() {
                    self.phase = RandomPhase::Pause {
                        remaining: self.pause_secs,
                    };
                }
            }
            SessionState::Rest => {
                events.extend(self.flow.tick(None, dt));
                if self.flow.is_training() {
                    self.phase = RandomPhase::Pause {
                        remaining: self.pause_secs,
                    };
                }
            }
            SessionState::Stopped => {}
        }
        events
    }

    fn tick_training(&mut self, frame: Option<&LandmarkFrame>, dt: f32, events: &mut Vec<RehabEvent>) {
        match self.phase {
            RandomPhase::Pause { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = RandomPhase::Pause { remaining };
                } else {
                    self.start_round(events);
                }
            }
            RandomPhase::Round => {
                self.engine.observe(frame);
                match self.engine.tick(dt) {
                    RoundTick::FinalCountdownStarted { live_score } => {
                        events.push(RehabEvent::FinalCountdownStarted { live_score });
                    }
                    RoundTick::Completed(outcome) => self.on_round_finished(outcome, events),
                    RoundTick::Running | RoundTick::Idle => {}
                }
            }
            RandomPhase::Attitude => {
                let detected = self.detector.detect(frame);
                if let Some(attitude) = self.attitude.tick(detected, dt) {
                    events.push(RehabEvent::AttitudeConfirmed { attitude });
                    if let Some(outcome) = self.pending.take() {
                        self.complete_round(outcome, attitude, events);
                    }
                }
            }
        }
    }

    fn start_round(&mut self, events: &mut Vec<RehabEvent>) {
        // library is never empty, so neither is the candidate list
        let candidates = candidate_names(&self.library, self.level);
        let pick = self.rng.gen_range(0..candidates.len());
        let name = candidates[pick].to_string();
        let reference = self.library.get(&name).cloned();

        info!(gesture = %name, difficulty = %self.level, "round started");
        self.engine.start_round(name.clone(), reference);
        self.phase = RandomPhase::Round;
        events.push(RehabEvent::RoundStarted {
            gesture: name,
            difficulty: self.level,
        });
    }

    fn on_round_finished(&mut self, outcome: RoundOutcome, events: &mut Vec<RehabEvent>) {
        if outcome.reached_threshold {
            self.history.push(self.level);
        }

        let completed = self.log.rounds.len() + 1;
        if self.attitude.is_due(completed) {
            self.attitude.enter();
            self.pending = Some(outcome);
            self.phase = RandomPhase::Attitude;
            events.push(RehabEvent::AttitudeRequested);
        } else {
            self.complete_round(outcome, Attitude::Neutral, events);
        }
    }

    fn complete_round(&mut self, outcome: RoundOutcome, attitude: Attitude, events: &mut Vec<RehabEvent>) {
        let main_countdown = self.engine.config().main_countdown_secs;
        let score = final_score(outcome.finish_score, outcome.time_taken, attitude, main_countdown);
        let next = next_difficulty(self.level, &self.history, score, &self.difficulty, &mut self.rng);

        let succeeded = outcome.reached_threshold;
        let record = SessionRoundRecord {
            gesture_name: outcome.gesture_name,
            final_score: score,
            finish_score: outcome.finish_score,
            reference_score: outcome.reference_score,
            rule_score: outcome.rule_score,
            time_taken: outcome.time_taken,
            attitude,
            next_difficulty: next,
        };
        info!(
            gesture = %record.gesture_name,
            finish = record.finish_score,
            final_score = record.final_score,
            next = %next,
            "round completed"
        );
        self.log.push(record.clone());
        events.push(RehabEvent::RoundCompleted { record });

        if next != self.level {
            debug!(from = %self.level, to = %next, "difficulty changed");
            events.push(RehabEvent::DifficultyChanged { from: self.level, to: next });
            self.level = next;
        }

        self.phase = RandomPhase::Pause {
            remaining: self.pause_secs,
        };
        // only successes count toward the block and the target
        if succeeded {
            events.extend(self.flow.record_round());
        }
    }
}

fn candidate_names(library: &TemplateLibrary, level: DifficultyLevel) -> Vec<&str> {
    let matching: Vec<&str> = library
        .names()
        .filter(|name| difficulty_prefix(name) == Some(level.get()))
        .collect();
    if matching.is_empty() {
        library.names().collect()
    } else {
        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::synthetic::SyntheticHand;
    use crate::recognition::thumb::ThumbDirectionClassifier;
    use crate::scoring::template::ReferenceTemplate;
    use chrono::NaiveDate;
    use rand::SeedableRng;

    fn started() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn library() -> TemplateLibrary {
        let mut library = TemplateLibrary::new();
        library.insert(ReferenceTemplate::from_raw("1fist", &SyntheticHand::fist().build().points).unwrap());
        library.insert(ReferenceTemplate::from_raw("2palm", &SyntheticHand::open_palm().build().points).unwrap());
        library.insert(ReferenceTemplate::from_raw("3like", &SyntheticHand::thumbs_up().build().points).unwrap());
        library
    }

    fn session(config: &RehabConfig) -> RandomSession {
        RandomSession::new(config, library(), started(), ChaCha8Rng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn test_empty_library_is_an_error() {
        let result = RandomSession::new(
            &RehabConfig::default(),
            TemplateLibrary::new(),
            started(),
            ChaCha8Rng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(RehabError::NoGestures)));
    }

    #[test]
    fn test_candidates_by_prefix() {
        let s = session(&RehabConfig::default());
        assert_eq!(s.candidates(DifficultyLevel::new(1)), vec!["1fist"]);
        assert_eq!(s.candidates(DifficultyLevel::new(3)), vec!["3like"]);
        assert_eq!(s.candidates(DifficultyLevel::new(5)).len(), 3);
    }

    #[test]
    fn test_first_round_starts_at_level_one() {
        let mut s = session(&RehabConfig::default());
        let events = s.tick(None, 0.1);
        assert_eq!(
            events,
            vec![RehabEvent::RoundStarted {
                gesture: "1fist".to_string(),
                difficulty: DifficultyLevel::new(1),
            }]
        );
        assert_eq!(s.phase(), RandomPhase::Round);
    }

    #[test]
    fn test_matching_hand_completes_round() {
        let mut s = session(&RehabConfig::default());
        let fist = SyntheticHand::fist().build();
        let mut completed = None;
        for _ in 0..200 {
            for event in s.tick(Some(&fist), 0.1) {
                if let RehabEvent::RoundCompleted { record } = event {
                    completed = Some(record);
                }
            }
            if completed.is_some() {
                break;
            }
        }

        let record = completed.unwrap();
        assert_eq!(record.gesture_name, "1fist");
        assert_eq!(record.finish_score, 100);
        assert_eq!(record.rule_score, 100);
        assert_eq!(record.reference_score, 100);
        assert_eq!(record.attitude, Attitude::Neutral);
        assert!(record.time_taken <= 0.2);
        // strong score from a non-uniform history jumps two levels
        assert_eq!(record.next_difficulty.get(), 3);
        assert_eq!(s.level().get(), 3);
        assert_eq!(s.log().rounds.len(), 1);
        assert!(matches!(s.phase(), RandomPhase::Pause { .. }));
    }

    #[test]
    fn test_absent_hand_times_out() {
        let mut s = session(&RehabConfig::default());
        let mut records = Vec::new();
        for _ in 0..120 {
            for event in s.tick(None, 0.1) {
                if let RehabEvent::RoundCompleted { record } = event {
                    records.push(record);
                }
            }
        }
        let record = &records[0];
        assert_eq!(record.finish_score, 0);
        assert_eq!(record.time_taken, 10.0);
        assert_eq!(record.final_score, 10.0);
        // timeouts never enter the difficulty history
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_attitude_requested_on_interval() {
        let mut config = RehabConfig::default();
        config.attitude.round_interval = 1;
        config.flow.rounds_per_block = 0;
        let mut s = session(&config);

        let mut requested = false;
        for _ in 0..150 {
            if s.tick(None, 0.1).contains(&RehabEvent::AttitudeRequested) {
                requested = true;
                break;
            }
        }
        assert!(requested);
        assert_eq!(s.phase(), RandomPhase::Attitude);
        assert!(s.log().is_empty());

        // hold a thumbs up through the sub-flow
        let up = SyntheticHand::thumbs_up().build();
        let mut confirmed = None;
        for _ in 0..60 {
            for event in s.tick(Some(&up), 0.1) {
                if let RehabEvent::AttitudeConfirmed { attitude } = event {
                    confirmed = Some(attitude);
                }
            }
            if confirmed.is_some() {
                break;
            }
        }
        assert_eq!(confirmed, Some(Attitude::Good));
        assert_eq!(s.log().rounds[0].attitude, Attitude::Good);
        assert_eq!(s.log().rounds[0].final_score, 20.0);
    }

    #[test]
    fn test_state_check_pauses_rounds() {
        let mut config = RehabConfig::default();
        config.flow.rounds_per_block = 1;
        let mut s = session(&config);
        let fist = SyntheticHand::fist().build();
        for _ in 0..120 {
            s.tick(Some(&fist), 0.1);
            if s.flow().state() == SessionState::StateCheck {
                break;
            }
        }
        assert_eq!(s.flow().state(), SessionState::StateCheck);
        assert_eq!(s.log().rounds.len(), 1);
        assert_eq!(s.flow().total_rounds(), 1);

        // nothing happens without a thumb
        for _ in 0..100 {
            assert!(s.tick(None, 0.1).is_empty());
        }

        let up = SyntheticHand::thumbs_up().build();
        for _ in 0..40 {
            s.tick(Some(&up), 0.1);
            if s.flow().is_training() {
                break;
            }
        }
        assert!(s.flow().is_training());
        assert!(matches!(s.phase(), RandomPhase::Pause { .. }));
    }

    #[test]
    fn test_state_check_reads_smoothed_landmarks() {
        let mut config = RehabConfig::default();
        config.flow.rounds_per_block = 1;
        let mut s = session(&config);
        let mut reference = GestureClassifier::new(config.recognizer.clone());
        let fist = SyntheticHand::fist().build();
        for _ in 0..120 {
            s.tick(Some(&fist), 0.1);
            reference.update(Some(&fist));
            if s.flow().state() == SessionState::StateCheck {
                break;
            }
        }
        for _ in 0..10 {
            s.tick(None, 0.1);
            reference.update(None);
        }

        let up = SyntheticHand::thumbs_up().build();
        s.tick(Some(&up), 0.1);
        reference.update(Some(&up));

        let thumb = ThumbDirectionClassifier::new(config.thumb.clone());
        let expected = thumb.classify(reference.smoothed_points().unwrap());
        let raw: Vec<_> = up.points.iter().map(|p| p.truncate()).collect();
        assert_eq!(*s.flow().last_reading(), expected);
        assert_ne!(*s.flow().last_reading(), thumb.classify(&raw));
    }

    #[test]
    fn test_timeouts_do_not_count_toward_target() {
        let mut config = RehabConfig::default();
        config.flow.total_rounds_target = 2;
        config.flow.rounds_per_block = 1;
        let mut s = session(&config);
        let mut ended = false;
        for _ in 0..400 {
            for event in s.tick(None, 0.1) {
                if matches!(event, RehabEvent::SessionEnded { .. }) {
                    ended = true;
                }
            }
        }
        assert!(!ended);
        assert!(!s.is_finished());
        assert_eq!(s.flow().state(), SessionState::Training);
        assert_eq!(s.flow().total_rounds(), 0);
        // every timeout is still recorded
        assert!(s.log().rounds.len() >= 3);
        assert!(s.log().rounds.iter().all(|r| r.finish_score == 0));
    }
}
