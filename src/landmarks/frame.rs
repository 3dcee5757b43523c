//! Raw per-tick landmark frames from the hand detector

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::types::Handedness;

/// Number of landmarks in a complete hand skeleton
pub const LANDMARK_COUNT: usize = 21;

/// The 21 hand landmarks in detector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl HandLandmark {
    pub const ALL: [HandLandmark; LANDMARK_COUNT] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexMcp,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleMcp,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingMcp,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    /// Position of this landmark in the detector's point array
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb_cmc",
            Self::ThumbMcp => "thumb_mcp",
            Self::ThumbIp => "thumb_ip",
            Self::ThumbTip => "thumb_tip",
            Self::IndexMcp => "index_mcp",
            Self::IndexPip => "index_pip",
            Self::IndexDip => "index_dip",
            Self::IndexTip => "index_tip",
            Self::MiddleMcp => "middle_mcp",
            Self::MiddlePip => "middle_pip",
            Self::MiddleDip => "middle_dip",
            Self::MiddleTip => "middle_tip",
            Self::RingMcp => "ring_mcp",
            Self::RingPip => "ring_pip",
            Self::RingDip => "ring_dip",
            Self::RingTip => "ring_tip",
            Self::PinkyMcp => "pinky_mcp",
            Self::PinkyPip => "pinky_pip",
            Self::PinkyDip => "pinky_dip",
            Self::PinkyTip => "pinky_tip",
        }
    }
}

/// One detector tick's worth of hand landmarks
///
/// x and y are image-normalized (0..1, y grows downward), z is relative depth.
/// A frame with fewer than [`LANDMARK_COUNT`] points is incomplete and every
/// classifier treats it as "no usable hand".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub points: Vec<Vec3>,
    #[serde(default)]
    pub handedness: Option<Handedness>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<Vec3>, handedness: Option<Handedness>) -> Self {
        Self { points, handedness }
    }

    /// Build from `[x, y, z]` triples as delivered by the detector
    pub fn from_triples(triples: &[[f32; 3]], handedness: Option<Handedness>) -> Self {
        Self {
            points: triples.iter().map(|&p| Vec3::from_array(p)).collect(),
            handedness,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }

    /// Landmark position, or the origin if the frame is too short
    pub fn point(&self, landmark: HandLandmark) -> Vec3 {
        self.points
            .get(landmark.index())
            .copied()
            .unwrap_or(Vec3::ZERO)
    }

    /// Landmark position projected onto the image plane
    pub fn xy(&self, landmark: HandLandmark) -> Vec2 {
        self.point(landmark).truncate()
    }

    /// Handedness, assuming right when the detector gave no label
    pub fn handedness_or_right(&self) -> Handedness {
        self.handedness.unwrap_or(Handedness::Right)
    }
}
