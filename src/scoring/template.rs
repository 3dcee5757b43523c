//! Distance-based scoring against recorded reference poses

use ahash::AHashMap;
use glam::Vec3;

use crate::landmarks::frame::{LandmarkFrame, LANDMARK_COUNT};
use crate::landmarks::normalize::NormalizedLandmarkSet;

/// Summed landmark distance at which the template score bottoms out
pub const MAX_TOTAL_DISTANCE: f32 = 5.0;

/// A named, normalized reference pose. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTemplate {
    name: String,
    landmarks: NormalizedLandmarkSet,
}

impl ReferenceTemplate {
    /// Build from raw recorded points. Exactly 21 points are required.
    pub fn from_raw(name: impl Into<String>, points: &[Vec3]) -> Option<Self> {
        if points.len() != LANDMARK_COUNT {
            return None;
        }
        Some(Self {
            name: name.into(),
            landmarks: NormalizedLandmarkSet::from_points(points)?,
        })
    }

    pub fn from_normalized(name: impl Into<String>, landmarks: NormalizedLandmarkSet) -> Self {
        Self {
            name: name.into(),
            landmarks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn landmarks(&self) -> &NormalizedLandmarkSet {
        &self.landmarks
    }
}

/// Name-indexed collection of reference templates
///
/// Keeps insertion order so the catalog iterates deterministically.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<ReferenceTemplate>,
    index: AHashMap<String, usize>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, replacing any existing one with the same name
    pub fn insert(&mut self, template: ReferenceTemplate) {
        match self.index.get(template.name()) {
            Some(&slot) => self.templates[slot] = template,
            None => {
                self.index.insert(template.name().to_string(), self.templates.len());
                self.templates.push(template);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ReferenceTemplate> {
        self.index.get(name).map(|&slot| &self.templates[slot])
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceTemplate> {
        self.templates.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name())
    }

    /// Reference pose for a thumbs-up: a name containing "like" but not "dislike"
    pub fn like_reference(&self) -> Option<&ReferenceTemplate> {
        self.templates.iter().find(|t| {
            let name = t.name().to_ascii_lowercase();
            name.contains("like") && !name.contains("dislike")
        })
    }

    /// Reference pose for a thumbs-down: a name containing "dislike"
    pub fn dislike_reference(&self) -> Option<&ReferenceTemplate> {
        self.templates
            .iter()
            .find(|t| t.name().to_ascii_lowercase().contains("dislike"))
    }
}

impl FromIterator<ReferenceTemplate> for TemplateLibrary {
    fn from_iter<I: IntoIterator<Item = ReferenceTemplate>>(iter: I) -> Self {
        let mut library = TemplateLibrary::new();
        for template in iter {
            library.insert(template);
        }
        library
    }
}

/// Scores live frames by their summed distance to a reference pose
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateScorer;

impl TemplateScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a live frame. Missing templates and incomplete frames score 0.
    pub fn score(&self, frame: &LandmarkFrame, template: Option<&ReferenceTemplate>) -> u8 {
        let (Some(template), Some(live)) = (template, NormalizedLandmarkSet::from_frame(frame)) else {
            return 0;
        };
        self.score_sets(&live, template.landmarks())
    }

    /// `round(100 * (1 - min(total, 5) / 5))`
    pub fn score_sets(&self, live: &NormalizedLandmarkSet, reference: &NormalizedLandmarkSet) -> u8 {
        let total = live.total_distance(reference);
        // NaN from corrupt input lands on the far end of the scale
        let clamped = if total.is_nan() {
            MAX_TOTAL_DISTANCE
        } else {
            total.clamp(0.0, MAX_TOTAL_DISTANCE)
        };
        (100.0 * (1.0 - clamped / MAX_TOTAL_DISTANCE)).round() as u8
    }
}
