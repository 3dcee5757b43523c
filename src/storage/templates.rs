//! Reference template records on disk
//!
//! One JSON file per gesture, `gesture_<name>.json`:
//!
//! ```json
//! { "GestureId": "2peace", "Landmarks": [{"x":0.5,"y":0.8,"z":0.0}, ...], "ScreenshotFileName": "N/A" }
//! ```
//!
//! Landmarks are stored raw and normalized when loaded.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::error::Result;
use crate::landmarks::frame::{LandmarkFrame, LANDMARK_COUNT};
use crate::scoring::template::{ReferenceTemplate, TemplateLibrary};

const FILE_PREFIX: &str = "gesture_";
const NO_SCREENSHOT: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for LandmarkPoint {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<LandmarkPoint> for Vec3 {
    fn from(p: LandmarkPoint) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// A captured gesture as written by the recording step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateRecord {
    #[serde(default)]
    pub gesture_id: String,
    #[serde(default)]
    pub landmarks: Vec<LandmarkPoint>,
    #[serde(default)]
    pub screenshot_file_name: String,
}

impl TemplateRecord {
    /// Capture a live frame under a gesture id
    pub fn capture(gesture_id: impl Into<String>, frame: &LandmarkFrame) -> Self {
        Self {
            gesture_id: gesture_id.into(),
            landmarks: frame.points.iter().copied().map(LandmarkPoint::from).collect(),
            screenshot_file_name: NO_SCREENSHOT.to_string(),
        }
    }

    /// Normalized template, or None unless there are exactly 21 landmarks
    pub fn to_template(&self, name: &str) -> Option<ReferenceTemplate> {
        let points: Vec<Vec3> = self.landmarks.iter().copied().map(Vec3::from).collect();
        ReferenceTemplate::from_raw(name, &points)
    }
}

/// `gesture_<name>.json`
pub fn template_file_name(gesture: &str) -> String {
    format!("{FILE_PREFIX}{gesture}.json")
}

/// Catalog name for a template file: the stem without its `gesture_` prefix
pub fn gesture_name_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem.strip_prefix(FILE_PREFIX).unwrap_or(stem);
    (!name.is_empty()).then(|| name.to_string())
}

pub fn load_template_file(path: &Path) -> Result<TemplateRecord> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a record into `dir`, creating it if needed
pub fn save_template(dir: &Path, record: &TemplateRecord) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(template_file_name(&record.gesture_id));
    fs::write(&path, serde_json::to_string_pretty(record)?)?;
    info!(path = %path.display(), gesture = %record.gesture_id, "template saved");
    Ok(path)
}

/// Load every template in a directory
///
/// Unreadable files and records without exactly 21 landmarks are skipped
/// with a warning. A missing directory gives an empty library. Files are
/// read in name order so the catalog order is stable.
pub fn load_template_dir(dir: &Path) -> Result<TemplateLibrary> {
    let mut library = TemplateLibrary::new();
    if !dir.is_dir() {
        warn!(path = %dir.display(), "template directory not found");
        return Ok(library);
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let Some(name) = gesture_name_from_path(&path) else {
            continue;
        };
        let record = match load_template_file(&path) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable template");
                continue;
            }
        };
        match record.to_template(&name) {
            Some(template) => {
                debug!(gesture = %name, "template loaded");
                library.insert(template);
            }
            None => warn!(
                path = %path.display(),
                landmarks = record.landmarks.len(),
                expected = LANDMARK_COUNT,
                "skipping template with wrong landmark count"
            ),
        }
    }

    info!(count = library.len(), path = %dir.display(), "templates loaded");
    Ok(library)
}
