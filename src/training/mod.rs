//! Rounds, sessions and the adaptive difficulty loop

pub mod attitude;
pub mod card_mode;
pub mod difficulty;
pub mod events;
pub mod flow;
pub mod random_mode;
pub mod records;
pub mod round;

pub use attitude::{AttitudeController, AttitudeDetector};
pub use card_mode::{CardSession, CardTask};
pub use difficulty::{next_difficulty, DifficultyHistory};
pub use events::RehabEvent;
pub use flow::{EndReason, SessionState, TrainingFlow};
pub use random_mode::{RandomPhase, RandomSession};
pub use records::{SessionLog, SessionRoundRecord, SessionSummary};
pub use round::{final_score, RoundEngine, RoundOutcome, RoundPhase, RoundTick};
