//! Quality tiers and resolution negotiation
//!
//! A consumer expresses the desired capture quality as a [`QualitySelector`]
//! policy; [`negotiate_resolution`] resolves it against a camera's supported
//! tiers into the concrete resolution the pipeline is built for.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::camera::CameraCapabilities;
use crate::error::{CaptureError, Result};
use crate::geometry::{Resolution, Rotation};
use crate::output::MediaSpec;

/// Resolution used when a camera reports no supported quality tier at all
pub const FALLBACK_RESOLUTION: Resolution = Resolution::HD1080;

/// Discrete video quality tiers, ordered lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Quality {
    /// Standard definition (480p)
    Sd,
    /// High definition (720p)
    Hd,
    /// Full high definition (1080p)
    Fhd,
    /// Ultra high definition (2160p)
    Uhd,
}

impl Quality {
    /// Nominal resolution of the tier
    ///
    /// Cameras may report different concrete resolutions for a tier; this is
    /// the canonical size used when nothing more specific is known.
    pub fn nominal_resolution(&self) -> Resolution {
        match self {
            Quality::Sd => Resolution::new(720, 480),
            Quality::Hd => Resolution::HD720,
            Quality::Fhd => Resolution::HD1080,
            Quality::Uhd => Resolution::UHD4K,
        }
    }

    /// All tiers, lowest first
    pub fn all() -> &'static [Quality] {
        &[Quality::Sd, Quality::Hd, Quality::Fhd, Quality::Uhd]
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quality::Sd => "SD",
            Quality::Hd => "HD",
            Quality::Fhd => "FHD",
            Quality::Uhd => "UHD",
        };
        write!(f, "{}", name)
    }
}

/// Policy describing which quality tier to capture at
///
/// Resolved against a camera's supported tiers at negotiation time. A
/// selector either matches a concrete tier or yields no match; the only
/// silent fallback is the empty-capability case documented on
/// [`negotiate_resolution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitySelector {
    /// Highest tier the camera supports
    Highest,
    /// Lowest tier the camera supports
    Lowest,
    /// First supported tier from an ordered preference list
    Preferred(Vec<Quality>),
}

impl QualitySelector {
    /// Resolve the selector against the camera's supported tiers
    ///
    /// Returns `None` when nothing matches.
    pub fn select(&self, supported: &[Quality]) -> Option<Quality> {
        match self {
            QualitySelector::Highest => supported.iter().copied().max(),
            QualitySelector::Lowest => supported.iter().copied().min(),
            QualitySelector::Preferred(preferences) => preferences
                .iter()
                .copied()
                .find(|quality| supported.contains(quality)),
        }
    }
}

impl fmt::Display for QualitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualitySelector::Highest => write!(f, "highest"),
            QualitySelector::Lowest => write!(f, "lowest"),
            QualitySelector::Preferred(preferences) => {
                write!(f, "preferred[")?;
                for (i, quality) in preferences.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", quality)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Negotiate the capture resolution for a camera
///
/// Resolves the media spec's quality selector against the camera's supported
/// tiers, then adjusts for sensor rotation:
///
/// - No media spec available yet: the consumer has not decided what it wants,
///   negotiating would be guessing. Fails with a precondition error.
/// - Camera reports no supported tier at all: returns [`FALLBACK_RESOLUTION`]
///   and logs a warning. Without this even the most permissive selector could
///   never match and the use case could never attach.
/// - Selector matches nothing in a non-empty tier set: fails with a
///   configuration error naming the selector.
/// - Relative sensor rotation of 90 or 270 degrees transposes the result.
pub fn negotiate_resolution(
    media_spec: Option<MediaSpec>,
    camera: &dyn CameraCapabilities,
    target_rotation: Rotation,
) -> Result<Resolution> {
    let spec = media_spec.ok_or_else(|| {
        CaptureError::Precondition(
            "cannot negotiate resolution before the output sink has produced a media spec"
                .to_string(),
        )
    })?;

    let supported = camera.supported_qualities();
    let resolution = if supported.is_empty() {
        warn!(
            camera = %camera.camera_id(),
            "camera reports no supported quality, using fallback resolution {}",
            FALLBACK_RESOLUTION
        );
        FALLBACK_RESOLUTION
    } else {
        let selector = &spec.video.quality_selector;
        let quality = selector.select(&supported).ok_or_else(|| {
            CaptureError::InvalidConfig(format!(
                "no supported quality matches selector {}",
                selector
            ))
        })?;
        debug!(%quality, %selector, "selected quality tier");

        camera.resolution_for(quality).ok_or_else(|| {
            CaptureError::InvalidConfig(format!(
                "camera {} reports no resolution for quality {}",
                camera.camera_id(),
                quality
            ))
        })?
    };

    let relative_rotation = camera.sensor_rotation_degrees(target_rotation);
    let resolution = if relative_rotation == 90 || relative_rotation == 270 {
        resolution.transposed()
    } else {
        resolution
    };
    debug!(relative_rotation, %resolution, "negotiated capture resolution");

    Ok(resolution)
}
