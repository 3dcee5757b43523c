//! Persisted per-round records and session logs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::{Attitude, DifficultyLevel};

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Round to two decimal places
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// One completed round, appended exactly once per round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionRoundRecord {
    pub gesture_name: String,
    /// Blended final score, 0..100, two decimals
    pub final_score: f32,
    /// Peak live score in the final countdown, 0 on timeout
    pub finish_score: u8,
    /// Template score on the last observed frame
    pub reference_score: u8,
    /// Rule score on the last observed frame
    pub rule_score: u8,
    /// Seconds to reach the success threshold, two decimals
    pub time_taken: f32,
    #[serde(rename = "Mode")]
    pub attitude: Attitude,
    pub next_difficulty: DifficultyLevel,
}

/// Append-only log of a training session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionLog {
    pub session_id: Uuid,
    /// Local start time, `YYYY-MM-DD HH:MM:SS`
    pub session_start_time: String,
    pub rounds: Vec<SessionRoundRecord>,
}

impl SessionLog {
    pub fn new(started: NaiveDateTime) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            session_start_time: started.format(START_TIME_FORMAT).to_string(),
            rounds: Vec::new(),
        }
    }

    pub fn push(&mut self, record: SessionRoundRecord) {
        self.rounds.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// `random_YYYYMMDD_HHMMSS.json`, or the session id if the start time is unreadable
    pub fn file_name(&self) -> String {
        match NaiveDateTime::parse_from_str(&self.session_start_time, START_TIME_FORMAT) {
            Ok(started) => format!("random_{}.json", started.format(FILE_STAMP_FORMAT)),
            Err(_) => format!("random_{}.json", self.session_id),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_log(self)
    }
}

/// Aggregate statistics over a session log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_rounds: usize,
    /// Rounds that reached the success threshold
    pub successful_rounds: usize,
    pub total_finish_score: u32,
    pub average_finish_score: f32,
    pub average_final_score: f32,
    pub average_time_taken: f32,
}

impl SessionSummary {
    pub fn from_log(log: &SessionLog) -> Self {
        let n = log.rounds.len();
        if n == 0 {
            return Self::default();
        }
        let total_finish_score: u32 = log.rounds.iter().map(|r| r.finish_score as u32).sum();
        let final_sum: f32 = log.rounds.iter().map(|r| r.final_score).sum();
        let time_sum: f32 = log.rounds.iter().map(|r| r.time_taken).sum();

        Self {
            total_rounds: n,
            successful_rounds: log.rounds.iter().filter(|r| r.finish_score > 0).count(),
            total_finish_score,
            average_finish_score: round2(total_finish_score as f32 / n as f32),
            average_final_score: round2(final_sum / n as f32),
            average_time_taken: round2(time_sum / n as f32),
        }
    }

    /// Human-readable block for terminal output
    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str("=== SESSION SUMMARY ===\n");
        output.push_str(&format!("Rounds: {} ({} successful)\n", self.total_rounds, self.successful_rounds));
        output.push_str(&format!("Total finish score: {}\n", self.total_finish_score));
        output.push_str(&format!("Average finish score: {:.2}\n", self.average_finish_score));
        output.push_str(&format!("Average final score: {:.2}\n", self.average_final_score));
        output.push_str(&format!("Average time taken: {:.2}s\n", self.average_time_taken));
        output
    }
}
