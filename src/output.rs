//! Output sink boundary
//!
//! The downstream consumer of the capture stream implements [`OutputSink`].
//! The use case requests a write endpoint from it during pipeline builds and
//! mirrors its stream state; it never owns the sink's lifetime.

use serde::{Deserialize, Serialize};

use crate::observable::{Observable, ObservableState};
use crate::pipeline::SurfaceRequest;
use crate::quality::QualitySelector;

/// Whether the consumer is currently producing output from the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    Active,
    Inactive,
}

/// Video parameters requested by the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSpec {
    /// Quality tier policy, resolved at negotiation time
    pub quality_selector: QualitySelector,
    /// Encoder bitrate hint (kbps)
    pub bitrate_kbps: Option<u32>,
    /// Encoder frame rate hint
    pub frame_rate: Option<u32>,
}

impl VideoSpec {
    pub fn new(quality_selector: QualitySelector) -> Self {
        Self {
            quality_selector,
            bitrate_kbps: None,
            frame_rate: None,
        }
    }
}

/// Media parameters observed from the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSpec {
    pub video: VideoSpec,
}

impl MediaSpec {
    pub fn new(video: VideoSpec) -> Self {
        Self { video }
    }

    /// Spec carrying only a quality selector, no encoding hints
    pub fn with_selector(quality_selector: QualitySelector) -> Self {
        Self::new(VideoSpec::new(quality_selector))
    }
}

/// Downstream consumer of the capture stream
///
/// `on_surface_requested` must return promptly; the consumer answers the
/// request later, on whatever executor it chooses, through the request
/// handle itself. Never answering is allowed and leaves the pipeline
/// published without a surface.
pub trait OutputSink: Send + Sync + 'static {
    /// A new pipeline generation needs a write endpoint
    fn on_surface_requested(&self, request: SurfaceRequest);

    /// Whether the consumer is producing output
    fn stream_state(&self) -> Observable<StreamState>;

    /// Media parameters, absent until the consumer has decided them
    fn media_spec(&self) -> Observable<MediaSpec>;
}

/// Sink that declines every surface request
///
/// Stand-in consumer for use cases constructed without a real output.
pub struct DiscardingSink {
    stream_state: ObservableState<StreamState>,
    media_spec: ObservableState<MediaSpec>,
}

impl DiscardingSink {
    pub fn new() -> Self {
        Self {
            stream_state: ObservableState::with_initial(StreamState::Inactive),
            media_spec: ObservableState::new(),
        }
    }
}

impl Default for DiscardingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for DiscardingSink {
    fn on_surface_requested(&self, request: SurfaceRequest) {
        request.will_not_provide_surface();
    }

    fn stream_state(&self) -> Observable<StreamState> {
        self.stream_state.observable()
    }

    fn media_spec(&self) -> Observable<MediaSpec> {
        self.media_spec.observable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraId;
    use crate::geometry::Resolution;
    use crate::pipeline::SurfaceState;

    #[test]
    fn test_discarding_sink_declines() {
        let sink = DiscardingSink::new();
        let request = SurfaceRequest::new(Resolution::HD720, CameraId::new("cam"), 1, false);

        sink.on_surface_requested(request.clone());
        assert_eq!(request.surface_state(), SurfaceState::WillNotProvide);
    }

    #[test]
    fn test_discarding_sink_observables() {
        let sink = DiscardingSink::new();
        assert_eq!(sink.stream_state().snapshot(), Some(StreamState::Inactive));
        assert_eq!(sink.media_spec().snapshot(), None);
    }
}
