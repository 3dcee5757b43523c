//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Which hand the detector reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parse the detector's handedness label ("Left" / "Right", any case)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// Engagement signal expressed with a thumbs-up / thumbs-down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attitude {
    #[default]
    Neutral,
    Good,
    Bad,
}

impl Attitude {
    /// Contribution of this attitude to the round's final score (0.0 to 1.0)
    pub fn factor(&self) -> f32 {
        match self {
            Self::Good => 1.0,
            Self::Bad => 0.0,
            Self::Neutral => 0.5,
        }
    }

    /// The other displayed target when cycling Good/Bad
    pub fn flipped(&self) -> Self {
        match self {
            Self::Good => Self::Bad,
            Self::Bad | Self::Neutral => Self::Good,
        }
    }
}

/// Training difficulty, always within [`DifficultyLevel::MIN`, `DifficultyLevel::MAX`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "u8")]
pub struct DifficultyLevel(u8);

impl DifficultyLevel {
    pub const MIN: DifficultyLevel = DifficultyLevel(1);
    pub const MAX: DifficultyLevel = DifficultyLevel(5);

    /// Build a level, clamping out-of-range values into 1..=5
    pub fn new(level: i32) -> Self {
        Self(level.clamp(Self::MIN.0 as i32, Self::MAX.0 as i32) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Move by `delta` levels, saturating at the bounds
    pub fn step(&self, delta: i32) -> Self {
        Self::new(self.0 as i32 + delta)
    }

    pub fn is_max(&self) -> bool {
        *self == Self::MAX
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<i32> for DifficultyLevel {
    fn from(level: i32) -> Self {
        Self::new(level)
    }
}

impl From<DifficultyLevel> for u8 {
    fn from(level: DifficultyLevel) -> Self {
        level.0
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_clamps_on_construction() {
        assert_eq!(DifficultyLevel::new(0).get(), 1);
        assert_eq!(DifficultyLevel::new(-7).get(), 1);
        assert_eq!(DifficultyLevel::new(3).get(), 3);
        assert_eq!(DifficultyLevel::new(99).get(), 5);
    }

    #[test]
    fn test_difficulty_step_saturates() {
        let four = DifficultyLevel::new(4);
        assert_eq!(four.step(2), DifficultyLevel::MAX);
        assert_eq!(DifficultyLevel::MIN.step(-1), DifficultyLevel::MIN);
        assert!(four.step(1).is_max());
    }

    #[test]
    fn test_attitude_factor() {
        assert_eq!(Attitude::Good.factor(), 1.0);
        assert_eq!(Attitude::Bad.factor(), 0.0);
        assert_eq!(Attitude::Neutral.factor(), 0.5);
    }

    #[test]
    fn test_handedness_label() {
        assert_eq!(Handedness::from_label("Right"), Some(Handedness::Right));
        assert_eq!(Handedness::from_label(" left "), Some(Handedness::Left));
        assert_eq!(Handedness::from_label("both"), None);
    }

    #[test]
    fn test_difficulty_serializes_as_number() {
        let json = serde_json::to_string(&DifficultyLevel::new(4)).unwrap();
        assert_eq!(json, "4");

        let parsed: DifficultyLevel = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, DifficultyLevel::MAX);
    }
}
