//! Typed option bundle for use-case configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::geometry::{CropRect, Resolution, Rotation};

/// Option keys understood by the video-capture use case
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OptionKey {
    TargetRotation,
    TargetAspectRatio,
    TargetName,
    /// Computed by resolution negotiation; rejected when set by callers
    TargetResolution,
    DefaultResolution,
    MaxResolution,
    SurfaceOccupancyPriority,
    ViewportCrop,
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKey::TargetRotation => "target_rotation",
            OptionKey::TargetAspectRatio => "target_aspect_ratio",
            OptionKey::TargetName => "target_name",
            OptionKey::TargetResolution => "target_resolution",
            OptionKey::DefaultResolution => "default_resolution",
            OptionKey::MaxResolution => "max_resolution",
            OptionKey::SurfaceOccupancyPriority => "surface_occupancy_priority",
            OptionKey::ViewportCrop => "viewport_crop",
        };
        write!(f, "{}", name)
    }
}

/// Aspect ratio hint for output selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    Ratio4x3,
    Ratio16x9,
}

/// Loosely-typed option values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionValue {
    Rotation(Rotation),
    Resolution(Resolution),
    AspectRatio(AspectRatio),
    Crop(CropRect),
    Priority(i32),
    Text(String),
}

/// Option map with last-write-wins semantics
///
/// The bundle itself stays loosely typed; the typed accessors below are the
/// boundary the rest of the crate reads through. An accessor returns `None`
/// both when the key is absent and when it holds a value of the wrong kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionBundle {
    options: BTreeMap<OptionKey, OptionValue>,
}

impl OptionBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an option; the latest write wins
    pub fn insert(&mut self, key: OptionKey, value: OptionValue) {
        self.options.insert(key, value);
    }

    pub fn retrieve(&self, key: OptionKey) -> Option<&OptionValue> {
        self.options.get(&key)
    }

    pub fn contains(&self, key: OptionKey) -> bool {
        self.options.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Merge this bundle over `defaults`
    ///
    /// Keys present here win; everything else comes from `defaults`.
    pub fn merged_over(&self, defaults: &OptionBundle) -> OptionBundle {
        let mut merged = defaults.clone();
        for (key, value) in &self.options {
            merged.insert(*key, value.clone());
        }
        merged
    }

    pub fn target_rotation(&self) -> Option<Rotation> {
        match self.retrieve(OptionKey::TargetRotation) {
            Some(OptionValue::Rotation(rotation)) => Some(*rotation),
            _ => None,
        }
    }

    pub fn target_aspect_ratio(&self) -> Option<AspectRatio> {
        match self.retrieve(OptionKey::TargetAspectRatio) {
            Some(OptionValue::AspectRatio(ratio)) => Some(*ratio),
            _ => None,
        }
    }

    pub fn target_name(&self) -> Option<&str> {
        match self.retrieve(OptionKey::TargetName) {
            Some(OptionValue::Text(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn target_resolution(&self) -> Option<Resolution> {
        match self.retrieve(OptionKey::TargetResolution) {
            Some(OptionValue::Resolution(resolution)) => Some(*resolution),
            _ => None,
        }
    }

    pub fn default_resolution(&self) -> Option<Resolution> {
        match self.retrieve(OptionKey::DefaultResolution) {
            Some(OptionValue::Resolution(resolution)) => Some(*resolution),
            _ => None,
        }
    }

    pub fn max_resolution(&self) -> Option<Resolution> {
        match self.retrieve(OptionKey::MaxResolution) {
            Some(OptionValue::Resolution(resolution)) => Some(*resolution),
            _ => None,
        }
    }

    pub fn surface_occupancy_priority(&self) -> Option<i32> {
        match self.retrieve(OptionKey::SurfaceOccupancyPriority) {
            Some(OptionValue::Priority(priority)) => Some(*priority),
            _ => None,
        }
    }

    pub fn viewport_crop(&self) -> Option<CropRect> {
        match self.retrieve(OptionKey::ViewportCrop) {
            Some(OptionValue::Crop(crop)) => Some(*crop),
            _ => None,
        }
    }
}
