//! Stabilized gesture recognition, thumb state check, task judging and menu selection

pub mod judge;
pub mod selector;
pub mod stabilizer;
pub mod thumb;

pub use judge::{JudgeTick, TaskJudge};
pub use selector::{ModeSelector, TrainingMode};
pub use stabilizer::{Gesture, GestureClassifier, GesturePreset, PresetLevel, StableGestureState};
pub use thumb::{ThumbDirection, ThumbDirectionClassifier, ThumbReading};
