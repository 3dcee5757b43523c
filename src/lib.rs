//! Hand Rehab - gesture recognition, scoring and adaptive training sessions

pub mod core;
pub mod landmarks;
pub mod recognition;
pub mod scoring;
pub mod storage;
pub mod training;
