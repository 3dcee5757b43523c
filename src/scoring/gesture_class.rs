//! Closed set of gestures the rule scorer knows about

use serde::{Deserialize, Serialize};
use std::fmt;

/// A gesture with a heuristic scoring rule, or `TemplateOnly` for names
/// that can only be judged against a reference template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureClass {
    Fist,
    Like,
    Dislike,
    One,
    Point,
    Peace,
    Palm,
    Three,
    Four,
    Ok,
    Call,
    Rock,
    FingersCrossed,
    TemplateOnly,
}

impl GestureClass {
    pub const RULED: [GestureClass; 13] = [
        Self::Fist,
        Self::Like,
        Self::Dislike,
        Self::One,
        Self::Point,
        Self::Peace,
        Self::Palm,
        Self::Three,
        Self::Four,
        Self::Ok,
        Self::Call,
        Self::Rock,
        Self::FingersCrossed,
    ];

    /// Resolve a catalog name such as `"3peace"`, `"two_up"` or `"Fingers crossed"`
    ///
    /// Leading difficulty digits are stripped, case is ignored, and spaces or
    /// hyphens count as underscores. Anything unmatched is `TemplateOnly`.
    pub fn from_name(name: &str) -> Self {
        let key = rule_key(name);
        match key.as_str() {
            "fist" | "grabbing" => Self::Fist,
            "like" => Self::Like,
            "dislike" => Self::Dislike,
            "one" => Self::One,
            "point" => Self::Point,
            "peace" | "two_up" => Self::Peace,
            "palm" | "stop" | "open" => Self::Palm,
            "three" => Self::Three,
            "four" => Self::Four,
            "ok" => Self::Ok,
            "call" => Self::Call,
            "rock" => Self::Rock,
            "fingers_crossed" => Self::FingersCrossed,
            _ => Self::TemplateOnly,
        }
    }

    pub fn has_rule(&self) -> bool {
        *self != Self::TemplateOnly
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fist => "fist",
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::One => "one",
            Self::Point => "point",
            Self::Peace => "peace",
            Self::Palm => "palm",
            Self::Three => "three",
            Self::Four => "four",
            Self::Ok => "ok",
            Self::Call => "call",
            Self::Rock => "rock",
            Self::FingersCrossed => "fingers_crossed",
            Self::TemplateOnly => "template_only",
        }
    }
}

impl fmt::Display for GestureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leading difficulty digit of a catalog name, if any
pub fn difficulty_prefix(name: &str) -> Option<u8> {
    name.chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
}

/// Lookup key for a catalog name: digits stripped, lowercase, `_` separated
pub fn rule_key(name: &str) -> String {
    name.trim_start_matches(|c: char| c.is_ascii_digit())
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
