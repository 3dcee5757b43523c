//! Thumb direction classifier for the between-block state check

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::config::ThumbConfig;
use crate::landmarks::fingers::{curl, Finger};
use crate::landmarks::frame::{HandLandmark, LandmarkFrame, LANDMARK_COUNT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThumbDirection {
    #[default]
    Unknown,
    Up,
    Down,
    Side,
}

/// A classification plus the measurements behind it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThumbReading {
    pub direction: ThumbDirection,
    /// atan2 of the thumb vector in degrees, -180..180, up = +90
    pub angle_deg: f32,
    /// Length of the tip-minus-IP vector
    pub magnitude: f32,
    /// Mean curl of the four long fingers
    pub avg_curl: f32,
    /// 1 - curl of the thumb
    pub straightness: f32,
}

/// Wrap an angle into [-180, 180]
fn wrap_degrees(mut a: f32) -> f32 {
    while a > 180.0 {
        a -= 360.0;
    }
    while a < -180.0 {
        a += 360.0;
    }
    a
}

#[derive(Debug, Clone, Default)]
pub struct ThumbDirectionClassifier {
    config: ThumbConfig,
}

impl ThumbDirectionClassifier {
    pub fn new(config: ThumbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThumbConfig {
        &self.config
    }

    pub fn classify_frame(&self, frame: &LandmarkFrame) -> ThumbReading {
        let points: Vec<Vec2> = frame.points.iter().map(|p| p.truncate()).collect();
        self.classify(&points)
    }

    /// Classify image-plane points
    ///
    /// Vertical (Up/Down) is tested before horizontal, and each needs its
    /// axis to dominate the thumb vector, so angles near 45 degrees read as
    /// Unknown instead of flickering between two answers.
    pub fn classify(&self, points: &[Vec2]) -> ThumbReading {
        let mut reading = ThumbReading::default();
        if points.len() < LANDMARK_COUNT {
            return reading;
        }
        let at = |l: HandLandmark| points[l.index()];
        let cfg = &self.config;

        reading.avg_curl = Finger::LONG
            .iter()
            .map(|f| curl(at(f.tip()), at(f.pip()), at(f.knuckle())))
            .sum::<f32>()
            / 4.0;
        if cfg.need_other_fingers_curled && reading.avg_curl < cfg.four_fingers_curl_min {
            return reading;
        }

        reading.straightness = 1.0
            - curl(
                at(HandLandmark::ThumbTip),
                at(HandLandmark::ThumbIp),
                at(HandLandmark::ThumbMcp),
            );
        if reading.straightness < cfg.thumb_straight_min {
            return reading;
        }

        let mut v = at(HandLandmark::ThumbTip) - at(HandLandmark::ThumbIp);
        if cfg.invert_y {
            v.y = -v.y;
        }
        reading.magnitude = v.length();
        if reading.magnitude < cfg.min_vector_length {
            return reading;
        }

        let angle = v.y.atan2(v.x).to_degrees();
        reading.angle_deg = angle;

        let vert_tol = cfg.angle_tolerance_deg.clamp(5.0, 60.0);
        let horiz_tol = vert_tol * cfg.horizontal_tolerance_ratio;
        let (ax, ay) = (v.x.abs(), v.y.abs());

        let up_delta = wrap_degrees(angle - 90.0).abs();
        let down_delta = wrap_degrees(angle + 90.0).abs();
        let side_delta = wrap_degrees(angle)
            .abs()
            .min(wrap_degrees(angle - 180.0).abs())
            .min(wrap_degrees(angle + 180.0).abs());

        reading.direction = if ay >= ax && up_delta <= vert_tol {
            ThumbDirection::Up
        } else if ay >= ax && down_delta <= vert_tol {
            ThumbDirection::Down
        } else if ax > ay && side_delta <= horiz_tol {
            ThumbDirection::Side
        } else {
            ThumbDirection::Unknown
        };
        reading
    }
}
