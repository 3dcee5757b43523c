//! Wrist-relative, scale-invariant landmark sets

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::frame::{HandLandmark, LandmarkFrame, LANDMARK_COUNT};

/// Wrist-to-middle-knuckle distances below this are treated as degenerate
const MIN_SCALE: f32 = 0.001;

/// A hand translated to the wrist and scaled by the wrist-to-middle-knuckle span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmarkSet {
    points: [Vec3; LANDMARK_COUNT],
}

impl NormalizedLandmarkSet {
    /// Normalize a detector frame. Returns `None` for incomplete frames.
    pub fn from_frame(frame: &LandmarkFrame) -> Option<Self> {
        if !frame.is_complete() {
            return None;
        }
        Self::from_points(&frame.points[..LANDMARK_COUNT])
    }

    /// Normalize raw points. Returns `None` unless at least 21 are given.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.len() < LANDMARK_COUNT {
            return None;
        }

        let wrist = points[HandLandmark::Wrist.index()];
        let span = points[HandLandmark::MiddleMcp.index()].distance(wrist);
        let scale = if span < MIN_SCALE { 1.0 } else { span };

        let mut out = [Vec3::ZERO; LANDMARK_COUNT];
        for (dst, src) in out.iter_mut().zip(points) {
            *dst = (*src - wrist) / scale;
        }
        Some(Self { points: out })
    }

    /// Wrap points that are already normalized (e.g. a stored template)
    pub fn from_normalized(points: [Vec3; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] {
        &self.points
    }

    pub fn point(&self, landmark: HandLandmark) -> Vec3 {
        self.points[landmark.index()]
    }

    /// Sum of per-landmark 3D distances to another set
    pub fn total_distance(&self, other: &NormalizedLandmarkSet) -> f32 {
        self.points
            .iter()
            .zip(other.points.iter())
            .map(|(a, b)| a.distance(*b))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::synthetic::SyntheticHand;

    #[test]
    fn test_wrist_maps_to_origin_and_span_to_one() {
        let frame = SyntheticHand::open_palm().build();
        let set = NormalizedLandmarkSet::from_frame(&frame).unwrap();

        assert_eq!(set.point(HandLandmark::Wrist), Vec3::ZERO);
        let span = set.point(HandLandmark::MiddleMcp).length();
        assert!((span - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_translation_and_scale_invariant() {
        let base = SyntheticHand::open_palm().build();
        let moved = SyntheticHand::open_palm()
            .translate(0.2, -0.1)
            .scale(1.7)
            .build();

        let a = NormalizedLandmarkSet::from_frame(&base).unwrap();
        let b = NormalizedLandmarkSet::from_frame(&moved).unwrap();
        assert!(a.total_distance(&b) < 1e-3);
    }

    #[test]
    fn test_degenerate_span_uses_unit_scale() {
        let mut points = vec![Vec3::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        points[HandLandmark::IndexTip.index()] = Vec3::new(0.6, 0.5, 0.0);
        let set = NormalizedLandmarkSet::from_points(&points).unwrap();

        let tip = set.point(HandLandmark::IndexTip);
        assert!(tip.is_finite());
        assert!((tip.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_incomplete_frame_is_none() {
        let frame = LandmarkFrame::new(vec![Vec3::ZERO; 5], None);
        assert!(NormalizedLandmarkSet::from_frame(&frame).is_none());
    }
}
