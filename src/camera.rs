//! Camera identity and capability queries
//!
//! The camera enumeration subsystem lives outside this crate; the use case
//! only asks it for quality tiers, concrete resolutions and sensor rotation
//! through the [`CameraCapabilities`] trait.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Resolution, Rotation};
use crate::quality::Quality;

/// Identifier of a camera known to the camera service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraId(String);

impl CameraId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CameraId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CameraId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Capability queries answered by the camera enumeration subsystem
///
/// Implementations are supplied by the camera service. The use case queries
/// them during resolution negotiation and when computing the transformation
/// info attached to a surface request.
pub trait CameraCapabilities: Send + Sync + 'static {
    /// Identity of the camera answering the queries
    fn camera_id(&self) -> CameraId;

    /// Quality tiers this camera can capture at
    ///
    /// An empty list means the device reports no usable tier at all; the
    /// negotiator falls back to a default resolution in that case.
    fn supported_qualities(&self) -> Vec<Quality>;

    /// Concrete capture resolution for a supported tier
    fn resolution_for(&self, quality: Quality) -> Option<Resolution>;

    /// Sensor rotation relative to the given target rotation, in degrees
    fn sensor_rotation_degrees(&self, target_rotation: Rotation) -> u32;
}
