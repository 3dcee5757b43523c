//! Heuristic per-gesture scoring
//!
//! Each gesture hands out fixed points for the finger states it expects and,
//! for some gestures, a bonus for a finger pointing along one of the hand's
//! own axes. Points are summed as floats and truncated, and no rule can
//! exceed 100.

use glam::Vec2;

use super::gesture_class::GestureClass;
use crate::core::config::{FingerThresholds, RuleConfig};
use crate::core::types::Handedness;
use crate::landmarks::fingers::{Finger, FingerStateClassifier, FingerStates};
use crate::landmarks::frame::{HandLandmark, LandmarkFrame};

/// Hand-relative directions in the image plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAxes {
    /// Wrist towards the middle knuckle
    pub up: Vec2,
    /// Across the knuckles, signed by handedness
    pub right: Vec2,
}

impl HandAxes {
    pub fn from_frame(frame: &LandmarkFrame, handedness: Handedness) -> Self {
        let wrist = frame.xy(HandLandmark::Wrist);
        let index = frame.xy(HandLandmark::IndexMcp);
        let middle = frame.xy(HandLandmark::MiddleMcp);

        let up = (middle - wrist).normalize_or_zero();
        let right = match handedness {
            Handedness::Right => (index - middle).normalize_or_zero(),
            Handedness::Left => (middle - index).normalize_or_zero(),
        };
        Self { up, right }
    }
}

/// Unit direction from one landmark to another in the image plane
fn direction(frame: &LandmarkFrame, from: HandLandmark, to: HandLandmark) -> Vec2 {
    (frame.xy(to) - frame.xy(from)).normalize_or_zero()
}

/// Rule-based scorer for every [`GestureClass`] with a rule
#[derive(Debug, Clone, Default)]
pub struct RuleScorer {
    fingers: FingerStateClassifier,
    config: RuleConfig,
}

impl RuleScorer {
    pub fn new(thresholds: FingerThresholds, config: RuleConfig) -> Self {
        Self {
            fingers: FingerStateClassifier::new(thresholds),
            config,
        }
    }

    pub fn finger_classifier(&self) -> &FingerStateClassifier {
        &self.fingers
    }

    /// Rule score given to names without a rule
    pub fn fallback_score(&self) -> u8 {
        self.config.unknown_gesture_score.min(100)
    }

    /// Score a catalog gesture name against a frame
    pub fn score_named(&self, name: &str, frame: &LandmarkFrame) -> u8 {
        self.score(GestureClass::from_name(name), frame)
    }

    /// Score a frame against a gesture class using the frame's handedness
    ///
    /// Frames without a handedness label are scored as right hands.
    pub fn score(&self, class: GestureClass, frame: &LandmarkFrame) -> u8 {
        self.score_with_handedness(class, frame, frame.handedness_or_right())
    }

    /// Score with an explicit handedness. Incomplete frames score 0.
    pub fn score_with_handedness(
        &self,
        class: GestureClass,
        frame: &LandmarkFrame,
        handedness: Handedness,
    ) -> u8 {
        if !frame.is_complete() {
            return 0;
        }

        let states = self.fingers.classify(frame);
        let axes = HandAxes::from_frame(frame, handedness);

        let points = match class {
            GestureClass::Fist => curled_points(&states, &Finger::LONG, 25.0),
            GestureClass::Like => self.thumb_vertical(frame, &states, axes, 1.0),
            GestureClass::Dislike => self.thumb_vertical(frame, &states, axes, -1.0),
            GestureClass::One => {
                let index_dir = direction(frame, HandLandmark::IndexMcp, HandLandmark::IndexTip);
                let aligned = index_dir.dot(axes.up) > self.config.direction_dot;
                single_index(&states) + bonus(aligned, 15.0)
            }
            GestureClass::Point => {
                let index_dir = direction(frame, HandLandmark::IndexMcp, HandLandmark::IndexTip);
                let aligned = index_dir.dot(axes.right).abs() > self.config.direction_dot;
                single_index(&states) + bonus(aligned, 15.0)
            }
            GestureClass::Peace => {
                straight_points(&states, &[Finger::Index, Finger::Middle], 35.0)
                    + curled_points(&states, &[Finger::Ring, Finger::Pinky], 15.0)
            }
            GestureClass::Palm => straight_points(&states, &Finger::ALL, 20.0),
            GestureClass::Three => {
                straight_points(&states, &[Finger::Index, Finger::Middle, Finger::Ring], 30.0)
                    + curled_points(&states, &[Finger::Pinky], 10.0)
            }
            GestureClass::Four => {
                curled_points(&states, &[Finger::Thumb], 20.0)
                    + straight_points(&states, &Finger::LONG, 20.0)
            }
            GestureClass::Ok => {
                let gap = frame
                    .xy(HandLandmark::ThumbTip)
                    .distance(frame.xy(HandLandmark::IndexTip));
                straight_points(&states, &[Finger::Middle, Finger::Ring, Finger::Pinky], 20.0)
                    + bonus(gap < self.config.ok_distance, 40.0)
            }
            GestureClass::Call => {
                straight_points(&states, &[Finger::Thumb, Finger::Pinky], 30.0)
                    + curled_points(&states, &[Finger::Index, Finger::Middle, Finger::Ring], 13.3)
            }
            GestureClass::Rock => {
                straight_points(&states, &[Finger::Index, Finger::Pinky], 35.0)
                    + curled_points(&states, &[Finger::Middle, Finger::Ring], 15.0)
            }
            GestureClass::FingersCrossed => {
                curled_points(&states, &[Finger::Ring, Finger::Pinky], 15.0)
                    + straight_points(&states, &[Finger::Index, Finger::Middle], 15.0)
                    + bonus(self.fingers_crossed(frame, axes, handedness), 40.0)
            }
            GestureClass::TemplateOnly => self.config.unknown_gesture_score as f32,
        };

        points.clamp(0.0, 100.0) as u8
    }

    /// Like/dislike: curled long fingers, straight thumb, thumb along `sign * up`
    fn thumb_vertical(&self, frame: &LandmarkFrame, states: &FingerStates, axes: HandAxes, sign: f32) -> f32 {
        let thumb_dir = direction(frame, HandLandmark::ThumbMcp, HandLandmark::ThumbTip);
        let aligned = sign * thumb_dir.dot(axes.up) > self.config.direction_dot;
        curled_points(states, &Finger::LONG, 12.5)
            + straight_points(states, &[Finger::Thumb], 25.0)
            + bonus(aligned, 25.0)
    }

    fn fingers_crossed(&self, frame: &LandmarkFrame, axes: HandAxes, handedness: Handedness) -> bool {
        let index_dot = direction(frame, HandLandmark::IndexMcp, HandLandmark::IndexTip).dot(axes.right);
        let middle_dot = direction(frame, HandLandmark::MiddleMcp, HandLandmark::MiddleTip).dot(axes.right);
        let t = self.config.crossed_dot;
        match handedness {
            Handedness::Right => index_dot > t && middle_dot < -t,
            Handedness::Left => index_dot < -t && middle_dot > t,
        }
    }
}

fn single_index(states: &FingerStates) -> f32 {
    straight_points(states, &[Finger::Index], 40.0)
        + curled_points(states, &[Finger::Middle, Finger::Ring, Finger::Pinky], 15.0)
}

fn straight_points(states: &FingerStates, fingers: &[Finger], each: f32) -> f32 {
    fingers.iter().filter(|f| states.is_straight(**f)).count() as f32 * each
}

fn curled_points(states: &FingerStates, fingers: &[Finger], each: f32) -> f32 {
    fingers.iter().filter(|f| states.is_curled(**f)).count() as f32 * each
}

fn bonus(condition: bool, points: f32) -> f32 {
    if condition {
        points
    } else {
        0.0
    }
}
