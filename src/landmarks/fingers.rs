//! Per-finger straight/curled classification
//!
//! Finger state is a ratio test in the image plane: how far the fingertip
//! is from the wrist compared to how far its knuckle is. The thumb uses its
//! own, looser threshold pair.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::frame::{HandLandmark, LandmarkFrame};
use crate::core::config::FingerThresholds;

/// Added to curl denominators so a collapsed joint never divides by zero
pub const CURL_EPSILON: f32 = 1e-5;

/// Bend of one finger, 0.0 = fully straight, 1.0 = tip folded onto the knuckle
///
/// `curl = 1 - clamp01(|tip - mcp| / (|pip - mcp| + eps))`
pub fn curl(tip: Vec2, pip: Vec2, mcp: Vec2) -> f32 {
    let ratio = tip.distance(mcp) / (pip.distance(mcp) + CURL_EPSILON);
    1.0 - ratio.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// The four long fingers (everything except the thumb)
    pub const LONG: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn slot(self) -> usize {
        self as usize
    }

    /// Knuckle used as the ratio reference (MCP for the thumb too)
    pub fn knuckle(self) -> HandLandmark {
        match self {
            Finger::Thumb => HandLandmark::ThumbMcp,
            Finger::Index => HandLandmark::IndexMcp,
            Finger::Middle => HandLandmark::MiddleMcp,
            Finger::Ring => HandLandmark::RingMcp,
            Finger::Pinky => HandLandmark::PinkyMcp,
        }
    }

    /// Middle joint (IP for the thumb)
    pub fn pip(self) -> HandLandmark {
        match self {
            Finger::Thumb => HandLandmark::ThumbIp,
            Finger::Index => HandLandmark::IndexPip,
            Finger::Middle => HandLandmark::MiddlePip,
            Finger::Ring => HandLandmark::RingPip,
            Finger::Pinky => HandLandmark::PinkyPip,
        }
    }

    pub fn tip(self) -> HandLandmark {
        match self {
            Finger::Thumb => HandLandmark::ThumbTip,
            Finger::Index => HandLandmark::IndexTip,
            Finger::Middle => HandLandmark::MiddleTip,
            Finger::Ring => HandLandmark::RingTip,
            Finger::Pinky => HandLandmark::PinkyTip,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FingerState {
    #[default]
    Unknown,
    Straight,
    Curled,
}

/// States of all five fingers for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerStates([FingerState; 5]);

impl FingerStates {
    pub fn new(states: [FingerState; 5]) -> Self {
        Self(states)
    }

    pub fn get(&self, finger: Finger) -> FingerState {
        self.0[finger.slot()]
    }

    pub fn is_straight(&self, finger: Finger) -> bool {
        self.get(finger) == FingerState::Straight
    }

    pub fn is_curled(&self, finger: Finger) -> bool {
        self.get(finger) == FingerState::Curled
    }

    /// Count of fingers among `fingers` in the given state
    pub fn count(&self, fingers: &[Finger], state: FingerState) -> usize {
        fingers.iter().filter(|f| self.get(**f) == state).count()
    }
}

/// Derives [`FingerStates`] from a landmark frame
#[derive(Debug, Clone, Default)]
pub struct FingerStateClassifier {
    thresholds: FingerThresholds,
}

impl FingerStateClassifier {
    pub fn new(thresholds: FingerThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &FingerThresholds {
        &self.thresholds
    }

    /// Classify every finger. Incomplete frames are all Unknown.
    pub fn classify(&self, frame: &LandmarkFrame) -> FingerStates {
        if !frame.is_complete() {
            return FingerStates::default();
        }
        let mut states = [FingerState::Unknown; 5];
        for finger in Finger::ALL {
            states[finger.slot()] = self.classify_finger(frame, finger);
        }
        FingerStates(states)
    }

    /// Classify one finger by its tip-to-wrist / knuckle-to-wrist ratio
    pub fn classify_finger(&self, frame: &LandmarkFrame, finger: Finger) -> FingerState {
        if !frame.is_complete() {
            return FingerState::Unknown;
        }

        let wrist = frame.xy(HandLandmark::Wrist);
        let tip_dist = frame.xy(finger.tip()).distance(wrist);
        let knuckle_dist = frame.xy(finger.knuckle()).distance(wrist);

        if knuckle_dist < self.thresholds.min_knuckle_distance {
            return FingerState::Unknown;
        }
        let ratio = tip_dist / knuckle_dist;

        let (straight, curled) = match finger {
            Finger::Thumb => (self.thresholds.thumb_straight, self.thresholds.thumb_curled),
            _ => (self.thresholds.finger_straight, self.thresholds.finger_curled),
        };

        if ratio > straight {
            FingerState::Straight
        } else if ratio < curled {
            FingerState::Curled
        } else {
            FingerState::Unknown
        }
    }
}

/// Mean curl of the four long fingers
pub fn average_long_finger_curl(frame: &LandmarkFrame) -> f32 {
    let total: f32 = Finger::LONG
        .iter()
        .map(|f| curl(frame.xy(f.tip()), frame.xy(f.pip()), frame.xy(f.knuckle())))
        .sum();
    total / Finger::LONG.len() as f32
}
