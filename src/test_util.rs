//! Shared fakes for unit tests

use parking_lot::Mutex;

use crate::camera::{CameraCapabilities, CameraId};
use crate::geometry::{Resolution, Rotation};
use crate::observable::{Observable, ObservableState};
use crate::output::{MediaSpec, OutputSink, StreamState};
use crate::pipeline::{SessionDescriptor, SessionManager, SurfaceRequest};
use crate::quality::{Quality, QualitySelector};

/// Install a tracing subscriber once so `RUST_LOG` works in tests
pub(crate) fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Camera with a fixed capability set
pub(crate) struct FixedCamera {
    id: CameraId,
    qualities: Vec<Quality>,
    sensor_rotation: u32,
}

impl FixedCamera {
    pub(crate) fn new(id: &str, qualities: Vec<Quality>) -> Self {
        Self {
            id: CameraId::new(id),
            qualities,
            sensor_rotation: 0,
        }
    }

    pub(crate) fn with_sensor_rotation(mut self, degrees: u32) -> Self {
        self.sensor_rotation = degrees;
        self
    }
}

impl CameraCapabilities for FixedCamera {
    fn camera_id(&self) -> CameraId {
        self.id.clone()
    }

    fn supported_qualities(&self) -> Vec<Quality> {
        self.qualities.clone()
    }

    fn resolution_for(&self, quality: Quality) -> Option<Resolution> {
        self.qualities
            .contains(&quality)
            .then(|| quality.nominal_resolution())
    }

    fn sensor_rotation_degrees(&self, _target_rotation: Rotation) -> u32 {
        self.sensor_rotation
    }
}

/// Output sink that records every dispatched surface request
pub(crate) struct CollectingSink {
    stream_state: ObservableState<StreamState>,
    media_spec: ObservableState<MediaSpec>,
    requests: Mutex<Vec<SurfaceRequest>>,
    /// Per dispatch: whether every previously dispatched round was already
    /// cancelled when this one arrived
    priors_cancelled: Mutex<Vec<bool>>,
}

impl CollectingSink {
    pub(crate) fn new(selector: Option<QualitySelector>) -> Self {
        let media_spec = ObservableState::new();
        if let Some(selector) = selector {
            media_spec.publish(MediaSpec::with_selector(selector));
        }
        Self {
            stream_state: ObservableState::new(),
            media_spec,
            requests: Mutex::new(Vec::new()),
            priors_cancelled: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_stream_state(&self, state: StreamState) {
        self.stream_state.publish(state);
    }

    pub(crate) fn requests(&self) -> Vec<SurfaceRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn last_request(&self) -> Option<SurfaceRequest> {
        self.requests.lock().last().cloned()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn priors_cancelled_at_each_dispatch(&self) -> bool {
        self.priors_cancelled.lock().iter().all(|cancelled| *cancelled)
    }
}

impl OutputSink for CollectingSink {
    fn on_surface_requested(&self, request: SurfaceRequest) {
        let mut requests = self.requests.lock();
        let priors = requests.iter().all(|prior| prior.is_cancelled());
        self.priors_cancelled.lock().push(priors);
        requests.push(request);
    }

    fn stream_state(&self) -> Observable<StreamState> {
        self.stream_state.observable()
    }

    fn media_spec(&self) -> Observable<MediaSpec> {
        self.media_spec.observable()
    }
}

/// Session manager recording every published descriptor
pub(crate) struct RecordingSession {
    descriptors: Mutex<Vec<SessionDescriptor>>,
}

impl RecordingSession {
    pub(crate) fn new() -> Self {
        Self {
            descriptors: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn descriptors(&self) -> Vec<SessionDescriptor> {
        self.descriptors.lock().clone()
    }
}

impl SessionManager for RecordingSession {
    fn publish(&self, descriptor: SessionDescriptor) {
        self.descriptors.lock().push(descriptor);
    }
}
