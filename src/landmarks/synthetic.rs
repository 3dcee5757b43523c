//! Procedural hand poses
//!
//! Builds plausible 21-point skeletons in image coordinates (y down) for the
//! demo stream and for tests. Geometry is a flat, palm-facing right hand with
//! the wrist at (0.5, 0.8).

use glam::{Vec2, Vec3};

use super::fingers::Finger;
use super::frame::{HandLandmark, LandmarkFrame, LANDMARK_COUNT};
use crate::core::types::Handedness;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Straight,
    Curled,
    /// Index bent over to meet the thumb tip (OK sign)
    Hooked,
    /// Leaning sideways; index leans toward the thumb, others away from it
    Crossed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbPose {
    /// Spread out to the side, as in an open palm
    Side,
    /// Folded across the palm
    Tucked,
    Up,
    Down,
    /// Pointing straight out horizontally
    Horizontal,
    /// Tip touching a hooked index tip
    Pinch,
}

const WRIST: Vec2 = Vec2::new(0.5, 0.8);
const THUMB_CMC: Vec2 = Vec2::new(0.42, 0.75);
const THUMB_MCP: Vec2 = Vec2::new(0.37, 0.68);

fn mcp_for(finger: Finger) -> Vec2 {
    match finger {
        Finger::Thumb => THUMB_MCP,
        Finger::Index => Vec2::new(0.44, 0.61),
        Finger::Middle => Vec2::new(0.50, 0.60),
        Finger::Ring => Vec2::new(0.56, 0.61),
        Finger::Pinky => Vec2::new(0.62, 0.63),
    }
}

/// Offsets of (pip, dip, tip) from the MCP
fn finger_offsets(pose: Pose) -> [Vec2; 3] {
    match pose {
        Pose::Straight => [
            Vec2::new(0.0, -0.06),
            Vec2::new(0.0, -0.115),
            Vec2::new(0.0, -0.17),
        ],
        Pose::Curled => [
            Vec2::new(0.0, -0.05),
            Vec2::new(0.0, -0.03),
            Vec2::new(0.0, 0.02),
        ],
        Pose::Hooked => [
            Vec2::new(-0.03, -0.06),
            Vec2::new(-0.06, -0.05),
            Vec2::new(-0.07, -0.01),
        ],
        Pose::Crossed => [
            Vec2::new(0.025, -0.055),
            Vec2::new(0.05, -0.105),
            Vec2::new(0.075, -0.155),
        ],
    }
}

/// (ip, tip) for each thumb pose
fn thumb_points(pose: ThumbPose) -> [Vec2; 2] {
    match pose {
        ThumbPose::Side => [Vec2::new(0.31, 0.62), Vec2::new(0.26, 0.57)],
        ThumbPose::Tucked => [Vec2::new(0.40, 0.64), Vec2::new(0.44, 0.66)],
        ThumbPose::Up => [Vec2::new(0.37, 0.60), Vec2::new(0.37, 0.52)],
        ThumbPose::Down => [Vec2::new(0.33, 0.82), Vec2::new(0.30, 0.95)],
        ThumbPose::Horizontal => [Vec2::new(0.30, 0.68), Vec2::new(0.22, 0.68)],
        ThumbPose::Pinch => [Vec2::new(0.35, 0.64), Vec2::new(0.36, 0.61)],
    }
}

/// Fluent builder for a synthetic hand skeleton
#[derive(Debug, Clone)]
pub struct SyntheticHand {
    poses: [Pose; 4],
    thumb: ThumbPose,
    offset: Vec2,
    scale: f32,
    handedness: Option<Handedness>,
}

impl Default for SyntheticHand {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticHand {
    /// Open palm, right hand
    pub fn new() -> Self {
        Self {
            poses: [Pose::Straight; 4],
            thumb: ThumbPose::Side,
            offset: Vec2::ZERO,
            scale: 1.0,
            handedness: Some(Handedness::Right),
        }
    }

    pub fn open_palm() -> Self {
        Self::new()
    }

    pub fn fist() -> Self {
        Self {
            poses: [Pose::Curled; 4],
            thumb: ThumbPose::Tucked,
            ..Self::new()
        }
    }

    pub fn thumbs_up() -> Self {
        Self::fist().thumb(ThumbPose::Up)
    }

    pub fn thumbs_down() -> Self {
        Self::fist().thumb(ThumbPose::Down)
    }

    pub fn thumb_sideways() -> Self {
        Self::fist().thumb(ThumbPose::Horizontal)
    }

    pub fn ok_sign() -> Self {
        Self::new()
            .finger(Finger::Index, Pose::Hooked)
            .thumb(ThumbPose::Pinch)
    }

    /// Set a long finger's pose. The thumb is set with [`SyntheticHand::thumb`].
    pub fn finger(mut self, finger: Finger, pose: Pose) -> Self {
        if finger != Finger::Thumb {
            self.poses[finger.slot() - 1] = pose;
        }
        self
    }

    pub fn thumb(mut self, pose: ThumbPose) -> Self {
        self.thumb = pose;
        self
    }

    pub fn handedness(mut self, handedness: Option<Handedness>) -> Self {
        self.handedness = handedness;
        self
    }

    /// Shift the whole hand in image space
    pub fn translate(mut self, dx: f32, dy: f32) -> Self {
        self.offset += Vec2::new(dx, dy);
        self
    }

    /// Scale the hand about its wrist
    pub fn scale(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }

    pub fn build(&self) -> LandmarkFrame {
        let mut points = [Vec2::ZERO; LANDMARK_COUNT];
        points[HandLandmark::Wrist.index()] = WRIST;
        points[HandLandmark::ThumbCmc.index()] = THUMB_CMC;
        points[HandLandmark::ThumbMcp.index()] = THUMB_MCP;

        let [ip, tip] = thumb_points(self.thumb);
        points[HandLandmark::ThumbIp.index()] = ip;
        points[HandLandmark::ThumbTip.index()] = tip;

        for (finger, pose) in Finger::LONG.iter().zip(self.poses) {
            let mcp = mcp_for(*finger);
            let mut offsets = finger_offsets(pose);
            if pose == Pose::Crossed && *finger == Finger::Index {
                for offset in offsets.iter_mut() {
                    offset.x = -offset.x;
                }
            }
            let [pip, dip, tip] = offsets;
            let base = finger.knuckle().index();
            points[base] = mcp;
            points[base + 1] = mcp + pip;
            points[base + 2] = mcp + dip;
            points[base + 3] = mcp + tip;
        }

        let points = points
            .iter()
            .map(|p| {
                let scaled = WRIST + (*p - WRIST) * self.scale + self.offset;
                Vec3::new(scaled.x, scaled.y, 0.0)
            })
            .collect();

        LandmarkFrame::new(points, self.handedness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_complete() {
        let frame = SyntheticHand::fist().build();
        assert_eq!(frame.points.len(), LANDMARK_COUNT);
        assert_eq!(frame.xy(HandLandmark::Wrist), WRIST);
    }

    #[test]
    fn test_translate_moves_wrist() {
        let frame = SyntheticHand::new().translate(0.1, -0.2).build();
        let wrist = frame.xy(HandLandmark::Wrist);
        assert!((wrist - Vec2::new(0.6, 0.6)).length() < 1e-6);
    }

    #[test]
    fn test_ok_sign_tips_touch() {
        let frame = SyntheticHand::ok_sign().build();
        let gap = frame
            .xy(HandLandmark::ThumbTip)
            .distance(frame.xy(HandLandmark::IndexTip));
        assert!(gap < 0.03);
    }
}
