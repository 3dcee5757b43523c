//! Adaptive difficulty controller
//!
//! Pure function of the current level, a short history of past levels and
//! the last round's final score. The only randomness is the coin flip that
//! decides whether a weak round drops a level; callers supply the RNG so
//! sessions stay reproducible under a seed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::config::DifficultyConfig;
use crate::core::types::DifficultyLevel;

/// Bounded record of recent difficulty levels, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyHistory {
    levels: VecDeque<DifficultyLevel>,
    capacity: usize,
}

impl Default for DifficultyHistory {
    fn default() -> Self {
        Self::new(DifficultyConfig::default().history_size)
    }
}

impl DifficultyHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            levels: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// History seeded with a single starting level
    pub fn seeded(capacity: usize, level: DifficultyLevel) -> Self {
        let mut history = Self::new(capacity);
        history.push(level);
        history
    }

    /// Append a level, dropping the oldest when full
    pub fn push(&mut self, level: DifficultyLevel) {
        if self.levels.len() == self.capacity {
            self.levels.pop_front();
        }
        self.levels.push_back(level);
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> impl Iterator<Item = DifficultyLevel> + '_ {
        self.levels.iter().copied()
    }

    /// Full and every remembered level is the same
    pub fn is_uniform(&self) -> bool {
        self.levels.len() >= self.capacity
            && self
                .levels
                .iter()
                .all(|l| Some(l) == self.levels.back())
    }
}

/// Level for the next round
///
/// 1. History uniform: at the maximum level drop to the stuck-reset level,
///    otherwise step one up on a passing score and one down on a failing one.
/// 2. Otherwise: jump two on a strong score, one on a passing score, and on
///    a failing score drop one or stay put with equal chance.
pub fn next_difficulty<R: Rng + ?Sized>(
    current: DifficultyLevel,
    history: &DifficultyHistory,
    final_score: f32,
    config: &DifficultyConfig,
    rng: &mut R,
) -> DifficultyLevel {
    if history.is_uniform() {
        if current.is_max() {
            return DifficultyLevel::new(config.stuck_reset_level);
        }
        return if final_score >= config.step_up_score {
            current.step(1)
        } else {
            current.step(-1)
        };
    }

    if final_score >= config.jump_score {
        current.step(2)
    } else if final_score >= config.step_up_score {
        current.step(1)
    } else if rng.gen_bool(0.5) {
        current.step(-1)
    } else {
        current
    }
}
