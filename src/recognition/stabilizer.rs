//! Temporally stabilized Open / Fist / OK classification
//!
//! Raw landmarks are low-pass filtered, classified with fixed geometric
//! thresholds, optionally gated to one target gesture, and only confirmed
//! after the same raw result has been seen for N consecutive frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::core::config::RecognizerConfig;
use crate::landmarks::fingers::{curl, Finger};
use crate::landmarks::frame::{HandLandmark, LandmarkFrame, LANDMARK_COUNT};

/// Output of the stabilized classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    #[default]
    Unknown,
    Ok,
    Fist,
    Open,
}

impl Gesture {
    /// Parse "ok" / "fist" / "open" (any case). Anything else is Unknown.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "ok" => Self::Ok,
            "fist" => Self::Fist,
            "open" => Self::Open,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ok => "ok",
            Self::Fist => "fist",
            Self::Open => "open",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three classification thresholds that vary with task difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GesturePreset {
    pub ok_tip_distance: f32,
    pub fist_avg_curl: f32,
    pub open_avg_spread: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl PresetLevel {
    /// Parse a level name. Unrecognized names fall back to Medium.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }

    pub fn preset(&self) -> GesturePreset {
        match self {
            Self::Easy => GesturePreset {
                ok_tip_distance: 0.10,
                fist_avg_curl: 0.16,
                open_avg_spread: 0.20,
            },
            Self::Medium => GesturePreset {
                ok_tip_distance: 0.08,
                fist_avg_curl: 0.18,
                open_avg_spread: 0.22,
            },
            Self::Hard => GesturePreset {
                ok_tip_distance: 0.06,
                fist_avg_curl: 0.20,
                open_avg_spread: 0.24,
            },
        }
    }
}

/// Per-frame bookkeeping for the consecutive-frame gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StableGestureState {
    /// This frame's classification after gating
    pub raw: Gesture,
    /// Previous frame's raw classification
    pub last_frame: Gesture,
    /// Consecutive frames `raw` has been unchanged
    pub stable_frames: u32,
    /// Gesture confirmed by the gate, Unknown until stable
    pub confirmed: Gesture,
}

/// Stabilized classifier fed once per tick
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: RecognizerConfig,
    smoothed: Vec<Vec2>,
    state: StableGestureState,
    gate_enabled: bool,
    gate_target: Gesture,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(RecognizerConfig::default())
    }
}

impl GestureClassifier {
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            smoothed: Vec::new(),
            state: StableGestureState::default(),
            gate_enabled: true,
            gate_target: Gesture::Unknown,
        }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Swap in a difficulty preset's three thresholds
    pub fn apply_preset(&mut self, preset: GesturePreset) {
        self.config.ok_tip_distance = preset.ok_tip_distance;
        self.config.fist_avg_curl = preset.fist_avg_curl;
        self.config.open_avg_spread = preset.open_avg_spread;
    }

    /// Only recognize `target` from now on
    pub fn gate_to(&mut self, target: Gesture) {
        self.gate_target = target;
        self.gate_enabled = true;
    }

    pub fn clear_gate(&mut self) {
        self.gate_target = Gesture::Unknown;
        self.gate_enabled = false;
    }

    /// Suspend or resume gating without forgetting the target
    pub fn set_gate_enabled(&mut self, enabled: bool) {
        self.gate_enabled = enabled;
    }

    pub fn gate_target(&self) -> Option<Gesture> {
        (self.gate_enabled && self.gate_target != Gesture::Unknown).then_some(self.gate_target)
    }

    pub fn state(&self) -> &StableGestureState {
        &self.state
    }

    pub fn current(&self) -> Gesture {
        self.state.confirmed
    }

    /// The smoothed points from the last complete frame, if any
    pub fn smoothed_points(&self) -> Option<&[Vec2]> {
        (self.smoothed.len() >= LANDMARK_COUNT).then_some(self.smoothed.as_slice())
    }

    /// Feed one tick. `None` means no hand was detected.
    ///
    /// Returns the newly confirmed gesture when the confirmed value changes
    /// to something other than Unknown, so each confirmation is reported once.
    pub fn update(&mut self, frame: Option<&LandmarkFrame>) -> Option<Gesture> {
        let Some(frame) = frame.filter(|f| f.is_complete()) else {
            self.state.confirmed = Gesture::Unknown;
            self.state.raw = Gesture::Unknown;
            self.state.stable_frames = 0;
            self.state.last_frame = Gesture::Unknown;
            return None;
        };

        self.smooth(frame);

        let mut raw = classify_points(&self.smoothed, &self.config);
        if let Some(target) = self.gate_target() {
            if raw != target {
                raw = Gesture::Unknown;
            }
        }

        if raw == self.state.last_frame {
            self.state.stable_frames = self.state.stable_frames.saturating_add(1);
        } else {
            self.state.stable_frames = 1;
            self.state.last_frame = raw;
        }
        self.state.raw = raw;

        let previous = self.state.confirmed;
        self.state.confirmed = if self.state.stable_frames >= self.config.required_stable_frames {
            raw
        } else {
            Gesture::Unknown
        };

        let confirmed = self.state.confirmed;
        if confirmed != previous && confirmed != Gesture::Unknown {
            debug!(gesture = %confirmed, frames = self.state.stable_frames, "gesture confirmed");
            return Some(confirmed);
        }
        None
    }

    fn smooth(&mut self, frame: &LandmarkFrame) {
        let points = frame.points.iter().map(|p| p.truncate());
        if self.smoothed.len() != frame.points.len() {
            self.smoothed = points.collect();
            return;
        }
        let t = self.config.smooth_factor;
        for (s, p) in self.smoothed.iter_mut().zip(points) {
            *s = s.lerp(p, t);
        }
    }
}

/// Classify 21 image-plane points, checking OK, then Fist, then Open
pub fn classify_points(points: &[Vec2], config: &RecognizerConfig) -> Gesture {
    if points.len() < LANDMARK_COUNT {
        return Gesture::Unknown;
    }
    let at = |l: HandLandmark| points[l.index()];

    let thumb_index = at(HandLandmark::ThumbTip).distance(at(HandLandmark::IndexTip));
    let avg_curl = Finger::LONG
        .iter()
        .map(|f| curl(at(f.tip()), at(f.pip()), at(f.knuckle())))
        .sum::<f32>()
        / 4.0;
    let wrist = at(HandLandmark::Wrist);
    let spread = Finger::LONG
        .iter()
        .map(|f| at(f.tip()).distance(wrist))
        .sum::<f32>()
        / 4.0;

    if thumb_index < config.ok_tip_distance && avg_curl < config.ok_max_curl {
        Gesture::Ok
    } else if avg_curl > config.fist_avg_curl {
        Gesture::Fist
    } else if spread > config.open_avg_spread && avg_curl < config.open_max_curl {
        Gesture::Open
    } else {
        Gesture::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::synthetic::SyntheticHand;

    fn feed_n(classifier: &mut GestureClassifier, frame: &LandmarkFrame, n: usize) -> Vec<Option<Gesture>> {
        (0..n).map(|_| classifier.update(Some(frame))).collect()
    }

    #[test]
    fn test_classify_reference_poses() {
        let config = RecognizerConfig::default();
        let xy = |f: LandmarkFrame| f.points.iter().map(|p| p.truncate()).collect::<Vec<_>>();

        assert_eq!(classify_points(&xy(SyntheticHand::open_palm().build()), &config), Gesture::Open);
        assert_eq!(classify_points(&xy(SyntheticHand::fist().build()), &config), Gesture::Fist);
        assert_eq!(classify_points(&xy(SyntheticHand::ok_sign().build()), &config), Gesture::Ok);
        assert_eq!(classify_points(&[Vec2::ZERO; 4], &config), Gesture::Unknown);
    }

    #[test]
    fn test_ok_wins_over_open() {
        // an OK sign also has a wide spread; priority must pick OK
        let mut config = RecognizerConfig::default();
        config.open_avg_spread = 0.0;
        let points: Vec<Vec2> = SyntheticHand::ok_sign().build().points.iter().map(|p| p.truncate()).collect();
        assert_eq!(classify_points(&points, &config), Gesture::Ok);
    }

    #[test]
    fn test_confirms_on_nth_frame_only() {
        let mut classifier = GestureClassifier::default();
        let fist = SyntheticHand::fist().build();

        let events = feed_n(&mut classifier, &fist, 5);
        assert_eq!(events[..4], [None, None, None, None]);
        assert_eq!(events[4], Some(Gesture::Fist));
        assert_eq!(classifier.current(), Gesture::Fist);

        // staying confirmed does not re-emit
        assert_eq!(classifier.update(Some(&fist)), None);
        assert_eq!(classifier.current(), Gesture::Fist);
    }

    #[test]
    fn test_dropped_hand_resets_immediately() {
        let mut classifier = GestureClassifier::default();
        let fist = SyntheticHand::fist().build();
        feed_n(&mut classifier, &fist, 6);

        classifier.update(None);
        assert_eq!(classifier.current(), Gesture::Unknown);
        assert_eq!(classifier.state().stable_frames, 0);

        let short = LandmarkFrame::new(fist.points[..12].to_vec(), None);
        classifier.update(Some(&short));
        assert_eq!(classifier.current(), Gesture::Unknown);
    }

    #[test]
    fn test_gate_suppresses_other_gestures() {
        let mut classifier = GestureClassifier::default();
        classifier.gate_to(Gesture::Open);

        let fist = SyntheticHand::fist().build();
        let events = feed_n(&mut classifier, &fist, 8);
        assert!(events.iter().all(|e| e.is_none()));
        assert_eq!(classifier.current(), Gesture::Unknown);
        assert_eq!(classifier.state().raw, Gesture::Unknown);

        classifier.clear_gate();
        assert_eq!(classifier.gate_target(), None);
    }

    #[test]
    fn test_disabled_gate_keeps_target() {
        let mut classifier = GestureClassifier::default();
        classifier.gate_to(Gesture::Ok);
        classifier.set_gate_enabled(false);
        assert_eq!(classifier.gate_target(), None);
        classifier.set_gate_enabled(true);
        assert_eq!(classifier.gate_target(), Some(Gesture::Ok));
    }

    #[test]
    fn test_smoothing_lags_pose_change() {
        let mut config = RecognizerConfig::default();
        config.required_stable_frames = 1;
        let mut classifier = GestureClassifier::new(config);

        classifier.update(Some(&SyntheticHand::open_palm().build()));
        assert_eq!(classifier.current(), Gesture::Open);

        // one fist frame only moves the buffer 30% of the way
        let fist = SyntheticHand::fist().build();
        classifier.update(Some(&fist));
        assert_eq!(classifier.current(), Gesture::Open);

        let mut reached_fist = false;
        for _ in 0..20 {
            classifier.update(Some(&fist));
            reached_fist |= classifier.current() == Gesture::Fist;
        }
        assert!(reached_fist);
    }

    #[test]
    fn test_preset_levels() {
        assert_eq!(PresetLevel::from_name("EASY"), PresetLevel::Easy);
        assert_eq!(PresetLevel::from_name("nightmare"), PresetLevel::Medium);
        assert_eq!(PresetLevel::Hard.preset().ok_tip_distance, 0.06);

        let mut classifier = GestureClassifier::default();
        classifier.apply_preset(PresetLevel::Easy.preset());
        assert_eq!(classifier.config().fist_avg_curl, 0.16);
        assert_eq!(classifier.config().required_stable_frames, 5);
    }
}
