//! Outbound events for display, charting and logging consumers

use serde::Serialize;

use super::flow::{EndReason, SessionState};
use super::records::SessionRoundRecord;
use crate::core::types::{Attitude, DifficultyLevel};
use crate::recognition::stabilizer::Gesture;
use crate::recognition::thumb::ThumbDirection;

/// Something a session wants the outside world to know about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RehabEvent {
    /// The stabilized classifier confirmed a new gesture
    GestureConfirmed { gesture: Gesture },
    /// Card task hold progress, 0..1
    TaskProgress { progress: f32 },
    /// A card task was held long enough
    TaskCompleted { gesture: Gesture },
    RoundStarted { gesture: String, difficulty: DifficultyLevel },
    /// Live score crossed the success threshold
    FinalCountdownStarted { live_score: u8 },
    RoundCompleted { record: SessionRoundRecord },
    /// The attitude sub-flow began
    AttitudeRequested,
    AttitudeConfirmed { attitude: Attitude },
    DifficultyChanged { from: DifficultyLevel, to: DifficultyLevel },
    SessionStateChanged { from: SessionState, to: SessionState },
    /// A thumb direction was held through a state check
    StateCheckResult { direction: ThumbDirection },
    SessionEnded { total_rounds: u32, reason: EndReason },
}
