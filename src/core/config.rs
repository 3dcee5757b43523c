//! Engine configuration with documented defaults
//!
//! Every tunable threshold, duration and weight lives here. Sections are
//! loaded from TOML; any section or field left out keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::Result;

/// Distance-ratio thresholds for per-finger straight/curled detection
///
/// The ratio is `|tip - wrist| / |knuckle - wrist|`. Above the straight
/// threshold a finger is Straight, below the curled threshold it is Curled,
/// anything between is Unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerThresholds {
    /// Straight threshold for the thumb (knuckle = thumb MCP)
    pub thumb_straight: f32,
    /// Curled threshold for the thumb
    pub thumb_curled: f32,
    /// Straight threshold for index/middle/ring/pinky
    pub finger_straight: f32,
    /// Curled threshold for index/middle/ring/pinky
    pub finger_curled: f32,
    /// Knuckle-to-wrist distances below this make the ratio meaningless
    pub min_knuckle_distance: f32,
}

impl Default for FingerThresholds {
    fn default() -> Self {
        Self {
            thumb_straight: 1.3,
            thumb_curled: 1.1,
            finger_straight: 1.6,
            finger_curled: 1.3,
            min_knuckle_distance: 0.01,
        }
    }
}

/// Constants used by the per-gesture rule scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Thumb-index tip distance (image units) that counts as touching for "ok"
    pub ok_distance: f32,
    /// Minimum |dot| between a finger direction and a hand axis to count as aligned
    pub direction_dot: f32,
    /// Minimum signed dot for index/middle to count as crossed
    pub crossed_dot: f32,
    /// Score returned for gesture names no rule exists for
    pub unknown_gesture_score: u8,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            ok_distance: 0.08,
            direction_dot: 0.6,
            crossed_dot: 0.1,
            unknown_gesture_score: 50,
        }
    }
}

/// Stabilized Open/Fist/OK classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Thumb-index tip distance below which OK is considered
    pub ok_tip_distance: f32,
    /// Average four-finger curl above which the hand is a fist
    pub fist_avg_curl: f32,
    /// Average tip-to-wrist spread above which the hand is open
    pub open_avg_spread: f32,
    /// OK also requires the four fingers to be this straight
    pub ok_max_curl: f32,
    /// Open also requires the four fingers to be this straight
    pub open_max_curl: f32,
    /// Consecutive identical raw classifications before a gesture is confirmed
    pub required_stable_frames: u32,
    /// Weight of each new frame in the exponential moving average (0..1)
    ///
    /// Lower = smoother but laggier. 0.2 to 0.4 works well at 30 fps.
    pub smooth_factor: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            ok_tip_distance: 0.08,
            fist_avg_curl: 0.18,
            open_avg_spread: 0.22,
            ok_max_curl: 0.12,
            open_max_curl: 0.15,
            required_stable_frames: 5,
            smooth_factor: 0.3,
        }
    }
}

/// Thumb-direction ("state check") classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbConfig {
    /// Flip the Y axis (texture coordinates grow downward)
    pub invert_y: bool,
    /// Minimum thumb straightness (0..1) before a direction is read
    pub thumb_straight_min: f32,
    /// Minimum length of the tip-minus-IP vector
    pub min_vector_length: f32,
    /// Vertical tolerance around +/-90 degrees (clamped to 5..60)
    pub angle_tolerance_deg: f32,
    /// Horizontal tolerance as a fraction of the vertical tolerance
    pub horizontal_tolerance_ratio: f32,
    /// Require the other four fingers to be curled
    pub need_other_fingers_curled: bool,
    /// Minimum average four-finger curl when the above is set
    pub four_fingers_curl_min: f32,
}

impl Default for ThumbConfig {
    fn default() -> Self {
        Self {
            invert_y: true,
            thumb_straight_min: 0.10,
            min_vector_length: 0.03,
            angle_tolerance_deg: 25.0,
            horizontal_tolerance_ratio: 0.6,
            need_other_fingers_curled: false,
            four_fingers_curl_min: 0.16,
        }
    }
}

/// Block / state-check / rest flow settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Completed rounds that end the session (0 = unlimited)
    pub total_rounds_target: u32,
    /// Completed rounds per block before a state check (0 = never)
    pub rounds_per_block: u32,
    /// Seconds a thumb direction must be held during a state check
    pub thumb_hold_secs: f32,
    /// Rest countdown in seconds
    pub rest_secs: f32,
    /// Seconds of ignored input at the start of every state check
    ///
    /// Discards gesture state carried over from the last training frame.
    pub state_check_warmup_secs: f32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            total_rounds_target: 10,
            rounds_per_block: 3,
            thumb_hold_secs: 0.6,
            rest_secs: 300.0,
            state_check_warmup_secs: 0.7,
        }
    }
}

/// Per-round scoring and countdown settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Weight of the rule score in the live score
    pub rule_weight: f32,
    /// Weight of the template score in the live score
    pub template_weight: f32,
    /// Live score that starts the final countdown
    pub success_threshold: u8,
    /// Seconds allowed to reach the success threshold
    pub main_countdown_secs: f32,
    /// Seconds the peak score is tracked after reaching the threshold
    pub final_countdown_secs: f32,
    /// Pause between rounds during which detector input is ignored
    pub transition_pause_secs: f32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            rule_weight: 0.6,
            template_weight: 0.4,
            success_threshold: 60,
            main_countdown_secs: 10.0,
            final_countdown_secs: 3.5,
            transition_pause_secs: 1.0,
        }
    }
}

/// Attitude (mood) sub-flow settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttitudeConfig {
    /// Enter the sub-flow after every Nth completed round (0 = never)
    pub round_interval: u32,
    /// Seconds before the sub-flow gives up with Neutral
    pub countdown_secs: f32,
    /// Seconds between Good/Bad target swaps
    pub cycle_secs: f32,
    /// Seconds a candidate attitude must be held
    pub hold_secs: f32,
    /// Minimum like/dislike score for a candidate attitude
    pub score_threshold: f32,
    /// Thumb tip must be this far above/below the wrist (image units)
    pub vertical_offset: f32,
}

impl Default for AttitudeConfig {
    fn default() -> Self {
        Self {
            round_interval: 5,
            countdown_secs: 30.0,
            cycle_secs: 5.0,
            hold_secs: 3.0,
            score_threshold: 70.0,
            vertical_offset: 0.1,
        }
    }
}

/// Difficulty controller settings
///
/// Levels themselves are always 1..=5; see `DifficultyLevel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Oscillation window: this many identical levels in a row count as
    /// stuck. Defaults to 3.
    pub history_size: usize,
    /// Final score that steps difficulty up by one
    pub step_up_score: f32,
    /// Final score that jumps difficulty up by two
    pub jump_score: f32,
    /// Level to drop to when stuck at the maximum
    pub stuck_reset_level: i32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            history_size: 3,
            step_up_score: 60.0,
            jump_score: 80.0,
            stuck_reset_level: 3,
        }
    }
}

/// Menu mode selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Seconds a selection gesture must be held
    pub hold_secs: f32,
    /// Average tip distance for a single raised finger to count as isolated
    pub isolation_distance: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            hold_secs: 2.0,
            isolation_distance: 0.08,
        }
    }
}

/// Card-mode task judge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Hold time used when a card does not specify one
    pub default_hold_secs: f32,
    /// Only judge after a card has armed the task
    pub require_arming: bool,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            default_hold_secs: 1.0,
            require_arming: true,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RehabConfig {
    pub fingers: FingerThresholds,
    pub rules: RuleConfig,
    pub recognizer: RecognizerConfig,
    pub thumb: ThumbConfig,
    pub flow: FlowConfig,
    pub round: RoundConfig,
    pub attitude: AttitudeConfig,
    pub difficulty: DifficultyConfig,
    pub selection: SelectionConfig,
    pub judge: JudgeConfig,
}

impl RehabConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RehabConfig = toml::from_str(content)?;
        config
            .validate()
            .map_err(crate::core::error::RehabError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let f = &self.fingers;
        if f.thumb_curled > f.thumb_straight || f.finger_curled > f.finger_straight {
            return Err(format!(
                "curled thresholds must not exceed straight thresholds (thumb {}/{}, finger {}/{})",
                f.thumb_curled, f.thumb_straight, f.finger_curled, f.finger_straight
            ));
        }

        let r = &self.recognizer;
        if !(0.0..=1.0).contains(&r.smooth_factor) || r.smooth_factor == 0.0 {
            return Err(format!("smooth_factor ({}) must be in (0, 1]", r.smooth_factor));
        }
        if r.required_stable_frames == 0 {
            return Err("required_stable_frames must be at least 1".into());
        }

        let w = &self.round;
        if w.rule_weight < 0.0 || w.template_weight < 0.0 || w.rule_weight + w.template_weight > 1.0 + 1e-4 {
            return Err(format!(
                "score weights must be non-negative and sum to at most 1 (rule {}, template {})",
                w.rule_weight, w.template_weight
            ));
        }
        if w.main_countdown_secs <= 0.0 || w.final_countdown_secs <= 0.0 {
            return Err("countdown durations must be positive".into());
        }
        if w.success_threshold > 100 {
            return Err(format!("success_threshold ({}) must be at most 100", w.success_threshold));
        }

        let d = &self.difficulty;
        if d.step_up_score > d.jump_score {
            return Err(format!(
                "step_up_score ({}) should be <= jump_score ({})",
                d.step_up_score, d.jump_score
            ));
        }
        if d.history_size == 0 {
            return Err("difficulty history_size must be at least 1".into());
        }

        if self.flow.thumb_hold_secs < 0.0 || self.flow.rest_secs < 0.0 || self.flow.state_check_warmup_secs < 0.0 {
            return Err("flow durations must not be negative".into());
        }
        if self.attitude.hold_secs <= 0.0 || self.attitude.cycle_secs <= 0.0 {
            return Err("attitude hold and cycle durations must be positive".into());
        }

        Ok(())
    }
}
