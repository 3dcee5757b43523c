//! Integration tests for complete training sessions
//!
//! These tests run whole sessions frame by frame through the public API:
//! - Menu selection of the training mode
//! - Card mode through a block, the state check and a rest
//! - Random mode to the configured round target
//! - Frames arriving through the single-slot detector handoff

use chrono::NaiveDate;
use handrehab::core::config::RehabConfig;
use handrehab::landmarks::{Detection, Finger, LandmarkFrame, LatestFrameSlot, Pose, SyntheticHand};
use handrehab::recognition::{Gesture, ModeSelector, TrainingMode};
use handrehab::scoring::template::{ReferenceTemplate, TemplateLibrary};
use handrehab::training::{
    CardSession, CardTask, EndReason, RandomPhase, RandomSession, RehabEvent, SessionState,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DT: f32 = 1.0 / 30.0;

fn run_card(session: &mut CardSession, frame: Option<&LandmarkFrame>, secs: f32) -> Vec<RehabEvent> {
    let mut events = Vec::new();
    for _ in 0..(secs / DT).round() as usize {
        events.extend(session.tick(frame, DT));
    }
    events
}

fn library() -> TemplateLibrary {
    [
        ("1fist", SyntheticHand::fist()),
        ("2palm", SyntheticHand::open_palm()),
        ("3like", SyntheticHand::thumbs_up()),
        ("4dislike", SyntheticHand::thumbs_down()),
    ]
    .iter()
    .filter_map(|(name, hand)| ReferenceTemplate::from_raw(*name, &hand.build().points))
    .collect()
}

/// Hand that performs whatever gesture the random session is asking for
fn mimic(name: &str) -> SyntheticHand {
    if name.contains("dislike") {
        SyntheticHand::thumbs_down()
    } else if name.contains("like") {
        SyntheticHand::thumbs_up()
    } else if name.contains("fist") {
        SyntheticHand::fist()
    } else {
        SyntheticHand::open_palm()
    }
}

// ============================================================================
// Menu selection
// ============================================================================

#[test]
fn test_menu_selects_each_mode() {
    let config = RehabConfig::default();
    let palm = SyntheticHand::open_palm().build();
    let pointing = SyntheticHand::fist().finger(Finger::Index, Pose::Straight).build();

    let mut selector = ModeSelector::new(config.selection.clone());
    let mut chosen = None;
    for _ in 0..90 {
        if let Some(mode) = selector.update(Some(&palm), DT) {
            chosen = Some(mode);
        }
    }
    assert_eq!(chosen, Some(TrainingMode::Random));

    let mut selector = ModeSelector::new(config.selection);
    let mut chosen = None;
    for _ in 0..90 {
        if let Some(mode) = selector.update(Some(&pointing), DT) {
            chosen = Some(mode);
        }
    }
    assert_eq!(chosen, Some(TrainingMode::Card));
}

// ============================================================================
// Card mode
// ============================================================================

/// Integration test: one full card block
///
/// 1. Three cards are armed and held
/// 2. The session enters the state check
/// 3. Thumb sideways sends the user to rest
/// 4. Rest expires and training resumes for the next card
#[test]
fn test_card_block_with_rest() {
    let mut config = RehabConfig::default();
    config.flow.rest_secs = 5.0;
    let mut session = CardSession::new(&config);

    let fist = SyntheticHand::fist().build();
    let palm = SyntheticHand::open_palm().build();
    let cards = [
        (r#"{"card_id":"A1","gesture":"fist","hold_secs":1.0,"difficulty":"easy"}"#, &fist),
        (r#"{"card_id":"A2","gesture":"open","hold_secs":0.5}"#, &palm),
        (r#"{"card_id":"A3","gesture":"fist","difficulty":"hard"}"#, &fist),
    ];
    for (payload, hand) in cards {
        let task = CardTask::from_payload(payload).unwrap();
        assert!(session.arm(task));
        let events = run_card(&mut session, Some(hand), 2.5);
        assert!(events.iter().any(|e| matches!(e, RehabEvent::TaskCompleted { .. })));
    }
    assert_eq!(session.flow().state(), SessionState::StateCheck);
    assert_eq!(session.completed().len(), 3);

    let side = SyntheticHand::thumb_sideways().build();
    run_card(&mut session, Some(&side), 3.0);
    assert_eq!(session.flow().state(), SessionState::Rest);

    run_card(&mut session, None, 6.0);
    assert_eq!(session.flow().state(), SessionState::Training);
    assert!(session.arm(CardTask::new(Gesture::Open)));
}

#[test]
fn test_card_progress_kept_while_gated() {
    let mut session = CardSession::default();
    session.arm(CardTask::new(Gesture::Fist).with_hold(2.0));

    let fist = SyntheticHand::fist().build();
    run_card(&mut session, Some(&fist), 1.0);
    let before = session.judge().progress();
    assert!(before > 0.0);

    // the gate hides the palm, so once smoothing catches up the judge
    // sees Unknown and keeps its time
    let palm = SyntheticHand::open_palm().build();
    run_card(&mut session, Some(&palm), 0.5);
    let held = session.judge().progress();
    assert!(held >= before && held < 1.0);
    run_card(&mut session, Some(&palm), 1.0);
    assert_eq!(session.judge().progress(), held);
    assert_eq!(session.flow().total_rounds(), 0);
}

// ============================================================================
// Random mode
// ============================================================================

/// Integration test: a random session played to its round target
///
/// Every round is performed correctly, every state check is answered with a
/// thumbs up and every attitude check with a thumbs up.
#[test]
fn test_random_session_reaches_target() {
    let mut config = RehabConfig::default();
    config.flow.total_rounds_target = 6;
    config.attitude.round_interval = 3;
    let started = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
    let mut session = RandomSession::new(&config, library(), started, ChaCha8Rng::seed_from_u64(99)).unwrap();

    let up = SyntheticHand::thumbs_up().build();
    let mut ended = None;
    let mut attitude_checks = 0;
    for _ in 0..(600.0 / DT) as usize {
        let frame = match (session.flow().state(), session.phase()) {
            (SessionState::StateCheck, _) | (_, RandomPhase::Attitude) => Some(up.clone()),
            (SessionState::Training, RandomPhase::Round) => session.engine().gesture_name().map(|n| mimic(n).build()),
            _ => None,
        };
        for event in session.tick(frame.as_ref(), DT) {
            match event {
                RehabEvent::AttitudeRequested => attitude_checks += 1,
                RehabEvent::SessionEnded { total_rounds, reason } => ended = Some((total_rounds, reason)),
                _ => {}
            }
        }
        if session.is_finished() {
            break;
        }
    }

    assert_eq!(ended, Some((6, EndReason::TargetReached)));
    assert_eq!(attitude_checks, 2);
    let log = session.log();
    assert_eq!(log.rounds.len(), 6);
    assert!(log.rounds.iter().all(|r| r.finish_score >= 60));
    assert!(log.rounds.iter().all(|r| (1..=5).contains(&r.next_difficulty.get())));
    assert_eq!(log.rounds[2].attitude, handrehab::core::types::Attitude::Good);
    assert_eq!(log.summary().successful_rounds, 6);
}

#[test]
fn test_seeded_sessions_are_reproducible() {
    let started = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
    let run = || {
        let mut session =
            RandomSession::new(&RehabConfig::default(), library(), started, ChaCha8Rng::seed_from_u64(5)).unwrap();
        let mut names = Vec::new();
        for _ in 0..(120.0 / DT) as usize {
            for event in session.tick(None, DT) {
                if let RehabEvent::RoundStarted { gesture, .. } = event {
                    names.push(gesture);
                }
            }
        }
        names
    };
    assert_eq!(run(), run());
}

// ============================================================================
// Detector handoff
// ============================================================================

#[test]
fn test_frames_through_latest_slot() {
    let slot = LatestFrameSlot::new();
    let producer = slot.clone();
    let fist = SyntheticHand::fist().build();

    let handle = std::thread::spawn(move || {
        for _ in 0..10 {
            producer.publish(Detection::Absent);
        }
        producer.publish(Detection::Hand(fist));
    });
    handle.join().unwrap();

    // only the newest detection survives
    let latest = slot.take().unwrap();
    assert!(latest.frame().is_some());
    assert!(slot.take().is_none());
}
