//! Video capture use case
//!
//! [`VideoCapture`] ties the configuration surface, the output sink and the
//! pipeline coordinator together. Binding it to a camera negotiates the
//! capture resolution from the sink's media spec, requests a write endpoint
//! from the sink and publishes the assembled pipeline to the session
//! manager. Session errors are recovered by rebuilding the pipeline in
//! place; changing the sink's quality policy after attaching has no effect
//! until the use case is detached and re-attached.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::camera::CameraCapabilities;
use crate::config::{AspectRatio, ConfigStore, OptionBundle, OptionKey, OptionValue};
use crate::error::{CaptureError, Result};
use crate::events::EventBus;
use crate::geometry::{CropRect, Resolution, Rotation};
use crate::output::{DiscardingSink, OutputSink};
use crate::pipeline::{LifecycleState, PipelineController, SessionManager};
use crate::quality::FALLBACK_RESOLUTION;

/// Surface occupancy priority assigned when the caller does not set one
pub const DEFAULT_SURFACE_OCCUPANCY_PRIORITY: i32 = 3;

/// Immutable configuration a use case is created from
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    name: String,
    options: OptionBundle,
}

impl CaptureConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &OptionBundle {
        &self.options
    }
}

/// Fluent builder for [`VideoCapture`]
///
/// Collects options into a mutable bundle and freezes them into a
/// [`CaptureConfig`] when built. Defaults are merged underneath the caller's
/// options, last write wins.
pub struct VideoCaptureBuilder {
    sink: Arc<dyn OutputSink>,
    options: OptionBundle,
}

impl VideoCaptureBuilder {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            options: OptionBundle::new(),
        }
    }

    /// Replace the output sink the use case will feed
    pub fn output(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Desired rotation of the output video
    pub fn target_rotation(mut self, rotation: Rotation) -> Self {
        self.options
            .insert(OptionKey::TargetRotation, OptionValue::Rotation(rotation));
        self
    }

    /// Aspect ratio hint for output selection
    pub fn target_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.options
            .insert(OptionKey::TargetAspectRatio, OptionValue::AspectRatio(ratio));
        self
    }

    /// Name identifying the use case in logs; generated when not set
    pub fn target_name(mut self, name: impl Into<String>) -> Self {
        self.options
            .insert(OptionKey::TargetName, OptionValue::Text(name.into()));
        self
    }

    /// Resolution used when the camera reports no supported quality
    pub fn default_resolution(mut self, resolution: Resolution) -> Self {
        self.options.insert(
            OptionKey::DefaultResolution,
            OptionValue::Resolution(resolution),
        );
        self
    }

    /// Upper bound for output selection
    pub fn max_resolution(mut self, resolution: Resolution) -> Self {
        self.options
            .insert(OptionKey::MaxResolution, OptionValue::Resolution(resolution));
        self
    }

    /// Priority when use cases compete for camera surfaces
    pub fn surface_occupancy_priority(mut self, priority: i32) -> Self {
        self.options.insert(
            OptionKey::SurfaceOccupancyPriority,
            OptionValue::Priority(priority),
        );
        self
    }

    /// Viewport crop attached to surface requests
    pub fn viewport_crop(mut self, crop: CropRect) -> Self {
        self.options
            .insert(OptionKey::ViewportCrop, OptionValue::Crop(crop));
        self
    }

    /// Not supported on video capture
    ///
    /// The capture resolution is derived from quality negotiation against
    /// the camera and may not be set directly.
    pub fn target_resolution(self, _resolution: Resolution) -> Result<Self> {
        Err(CaptureError::UnsupportedOption(OptionKey::TargetResolution))
    }

    /// Freeze the current state into an immutable configuration
    pub fn to_config(&self) -> CaptureConfig {
        let mut defaults = OptionBundle::new();
        defaults.insert(
            OptionKey::SurfaceOccupancyPriority,
            OptionValue::Priority(DEFAULT_SURFACE_OCCUPANCY_PRIORITY),
        );
        defaults.insert(
            OptionKey::DefaultResolution,
            OptionValue::Resolution(FALLBACK_RESOLUTION),
        );

        let options = self.options.merged_over(&defaults);
        let name = options
            .target_name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("VideoCapture-{}", Uuid::new_v4()));
        CaptureConfig { name, options }
    }

    /// Build the use case and spawn its coordinator
    pub fn build(self) -> VideoCapture {
        let config = self.to_config();
        VideoCapture::from_config(config, self.sink)
    }
}

impl Default for VideoCaptureBuilder {
    /// Builder feeding a [`DiscardingSink`] until an output is set
    fn default() -> Self {
        Self::new(Arc::new(DiscardingSink::new()))
    }
}

/// A use case providing a camera stream to a video consumer
pub struct VideoCapture {
    name: String,
    sink: Arc<dyn OutputSink>,
    config: ConfigStore,
    events: Arc<EventBus>,
    controller: PipelineController,
}

impl VideoCapture {
    /// Create a use case bound to `sink` with default configuration
    pub fn with_output(sink: Arc<dyn OutputSink>) -> Self {
        Self::builder(sink).build()
    }

    pub fn builder(sink: Arc<dyn OutputSink>) -> VideoCaptureBuilder {
        VideoCaptureBuilder::new(sink)
    }

    fn from_config(config: CaptureConfig, sink: Arc<dyn OutputSink>) -> Self {
        let store = ConfigStore::new(config.options);
        let events = Arc::new(EventBus::new());
        let controller = PipelineController::spawn(
            config.name.clone(),
            sink.clone(),
            store.clone(),
            events.clone(),
        );
        Self {
            name: config.name,
            sink,
            config: store,
            events,
            controller,
        }
    }

    /// Name identifying this use case in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The output sink this use case feeds
    pub fn output(&self) -> Arc<dyn OutputSink> {
        self.sink.clone()
    }

    /// Lifecycle notifications for observers
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Snapshot of the current option bundle
    pub fn options(&self) -> Arc<OptionBundle> {
        self.config.get()
    }

    /// Attach to a camera and publish the first pipeline
    ///
    /// Negotiates the capture resolution from the sink's media spec and the
    /// camera's supported qualities. Fails with a precondition error when
    /// the sink has not produced a media spec yet, and with a configuration
    /// error when the quality selector matches nothing; in both cases
    /// nothing is published and the use case stays detached.
    pub async fn attach(
        &self,
        camera: Arc<dyn CameraCapabilities>,
        session: Arc<dyn SessionManager>,
    ) -> Result<Resolution> {
        self.controller.attach(camera, session).await
    }

    /// Rebuild the pipeline in place for a camera-suggested resolution
    pub async fn update_resolution(&self, resolution: Resolution) -> Result<()> {
        self.controller.update_resolution(resolution).await
    }

    /// Tear the pipeline down and unbind the camera
    pub async fn detach(&self) {
        self.controller.detach().await;
    }

    /// Desired rotation of the output video
    ///
    /// Takes effect at the next pipeline build.
    pub fn set_target_rotation(&self, rotation: Rotation) {
        self.config
            .set(OptionKey::TargetRotation, OptionValue::Rotation(rotation));
    }

    /// Current lifecycle state
    pub async fn state(&self) -> LifecycleState {
        self.controller
            .snapshot()
            .await
            .map(|snapshot| snapshot.state)
            .unwrap_or(LifecycleState::Detached)
    }
}

impl fmt::Display for VideoCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoCapture:{}", self.name)
    }
}

impl Drop for VideoCapture {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}
