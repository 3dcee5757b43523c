//! Integration tests for templates and session logs on disk
//!
//! - Recording templates and loading a directory back into a library
//! - Skipping malformed and short template files
//! - Session logs written after every round and read back
//! - Configuration files layered over the defaults

use chrono::NaiveDate;
use handrehab::core::config::RehabConfig;
use handrehab::core::error::RehabError;
use handrehab::core::types::{Attitude, DifficultyLevel};
use handrehab::landmarks::SyntheticHand;
use handrehab::scoring::template::TemplateScorer;
use handrehab::storage::{load_template_dir, save_template, template_file_name, SessionStore, TemplateRecord};
use handrehab::training::{SessionLog, SessionRoundRecord};
use std::fs;
use tempfile::tempdir;

fn record(name: &str, score: f32) -> SessionRoundRecord {
    SessionRoundRecord {
        gesture_name: name.to_string(),
        final_score: score,
        finish_score: 90,
        reference_score: 80,
        rule_score: 100,
        time_taken: 1.25,
        attitude: Attitude::Good,
        next_difficulty: DifficultyLevel::new(3),
    }
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_recorded_templates_load_in_name_order() {
    let dir = tempdir().unwrap();
    let palm = SyntheticHand::open_palm().build();
    let like = SyntheticHand::thumbs_up().build();

    save_template(dir.path(), &TemplateRecord::capture("2palm", &palm)).unwrap();
    let path = save_template(dir.path(), &TemplateRecord::capture("3like", &like)).unwrap();
    assert_eq!(path.file_name().unwrap().to_str(), Some(template_file_name("3like").as_str()));

    let library = load_template_dir(dir.path()).unwrap();
    assert_eq!(library.names().collect::<Vec<_>>(), vec!["2palm", "3like"]);
    assert_eq!(library.like_reference().map(|t| t.name()), Some("3like"));
    assert!(library.dislike_reference().is_none());

    // a recorded template matches the pose it was captured from
    let score = TemplateScorer::new().score(&palm, library.get("2palm"));
    assert_eq!(score, 100);
}

#[test]
fn test_bad_template_files_are_skipped() {
    let dir = tempdir().unwrap();
    save_template(dir.path(), &TemplateRecord::capture("1fist", &SyntheticHand::fist().build())).unwrap();

    let mut short = TemplateRecord::capture("2short", &SyntheticHand::open_palm().build());
    short.landmarks.truncate(20);
    save_template(dir.path(), &short).unwrap();

    fs::write(dir.path().join("gesture_3broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let library = load_template_dir(dir.path()).unwrap();
    assert_eq!(library.len(), 1);
    assert!(library.get("1fist").is_some());
}

#[test]
fn test_missing_template_dir_is_empty() {
    let dir = tempdir().unwrap();
    let library = load_template_dir(&dir.path().join("nowhere")).unwrap();
    assert!(library.is_empty());
}

#[test]
fn test_template_record_field_names() {
    let record = TemplateRecord::capture("4ok", &SyntheticHand::ok_sign().build());
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"GestureId\":\"4ok\""));
    assert!(json.contains("\"ScreenshotFileName\":\"N/A\""));
    assert_eq!(record.landmarks.len(), 21);
}

// ============================================================================
// Session logs
// ============================================================================

#[test]
fn test_session_log_saved_after_each_round() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("sessions"));
    let started = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap().and_hms_opt(14, 5, 7).unwrap();
    let mut log = SessionLog::new(started);

    log.push(record("1fist", 88.5));
    let path = store.save(&log).unwrap();
    assert_eq!(path.file_name().unwrap().to_str(), Some("random_20250309_140507.json"));

    log.push(record("2palm", 40.0));
    let again = store.save(&log).unwrap();
    assert_eq!(path, again);

    let loaded = SessionStore::load(&path).unwrap();
    assert_eq!(loaded, log);
    assert_eq!(loaded.session_start_time, "2025-03-09 14:05:07");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"Mode\": \"Good\""));
    assert!(text.contains("\"NextDifficulty\": 3"));
}

#[test]
fn test_save_into_a_file_path_fails() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("taken");
    fs::write(&blocker, "").unwrap();

    let store = SessionStore::new(&blocker);
    let log = SessionLog::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
    assert!(matches!(store.save(&log), Err(RehabError::IoError(_))));
}

#[test]
fn test_loading_garbage_log_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("random_bad.json");
    fs::write(&path, "[1, 2").unwrap();
    assert!(matches!(SessionStore::load(&path), Err(RehabError::SerdeError(_))));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_shipped_config_matches_defaults() {
    let shipped = RehabConfig::from_toml_str(include_str!("../config/default.toml")).unwrap();
    assert_eq!(shipped, RehabConfig::default());
}

#[test]
fn test_config_file_overrides_one_section() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rehab.toml");
    fs::write(&path, "[flow]\ntotal_rounds_target = 12\n").unwrap();

    let config = RehabConfig::load(&path).unwrap();
    assert_eq!(config.flow.total_rounds_target, 12);
    assert_eq!(config.round, RehabConfig::default().round);
}
