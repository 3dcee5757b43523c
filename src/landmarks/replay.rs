//! Recorded detector output, one JSON value per line
//!
//! Each line is either `null` (no hand that tick) or
//! `{"landmarks":[[x,y,z], ...],"handedness":"Right"}`.

use serde::{Deserialize, Serialize};
use std::io::BufRead;

use super::frame::LandmarkFrame;
use super::handoff::Detection;
use crate::core::error::Result;
use crate::core::types::Handedness;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub landmarks: Vec<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<String>,
}

impl ReplayRecord {
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        Self {
            landmarks: frame.points.iter().map(|p| p.to_array()).collect(),
            handedness: frame.handedness.map(|h| h.as_str().to_string()),
        }
    }

    pub fn to_frame(&self) -> LandmarkFrame {
        let handedness = self.handedness.as_deref().and_then(Handedness::from_label);
        LandmarkFrame::from_triples(&self.landmarks, handedness)
    }
}

/// Parse one line. Blank lines and `null` are ticks without a hand.
pub fn parse_line(line: &str) -> Result<Detection> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Detection::Absent);
    }
    let record: Option<ReplayRecord> = serde_json::from_str(line)?;
    Ok(match record {
        Some(record) => Detection::Hand(record.to_frame()),
        None => Detection::Absent,
    })
}

/// Read a whole stream, failing on the first malformed line
pub fn read_stream<R: BufRead>(reader: R) -> Result<Vec<Detection>> {
    reader.lines().map(|line| parse_line(&line?)).collect()
}

/// Serialize detections back into the line format
pub fn to_line(detection: &Detection) -> String {
    let record = detection.frame().map(ReplayRecord::from_frame);
    serde_json::to_string(&record).unwrap_or_else(|_| "null".to_string())
}
