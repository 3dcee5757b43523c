pub mod config;
pub mod error;
pub mod types;

pub use config::RehabConfig;
pub use error::{RehabError, Result};
pub use types::{Attitude, DifficultyLevel, Handedness};
