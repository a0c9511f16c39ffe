//! Surface request handshake and deferred pipeline resources
//!
//! Each pipeline generation opens exactly one [`SurfaceRequest`] and hands it
//! to the output sink. The sink answers later, on an executor of its own
//! choosing, through the request handle. The controller keeps the matching
//! [`PipelineResources`] and releases it before any newer generation is
//! built, so a late answer to a superseded round can never reach a newer
//! pipeline.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::camera::CameraId;
use crate::geometry::{CropRect, Resolution, Rotation};

/// Write endpoint supplied by the output sink
///
/// Opaque to the pipeline: the use case routes it, pixels flow outside this
/// crate. The provider label is used only for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    id: Uuid,
    provider: String,
}

impl Surface {
    /// Create a surface tagged with the name of its provider
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider: provider.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.provider, self.id)
    }
}

/// How the pipeline maps sensor output onto the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformationInfo {
    /// Region of the buffer the consumer should use
    pub crop_rect: CropRect,
    /// Sensor rotation relative to the target, in degrees
    pub sensor_rotation_degrees: u32,
    /// Rotation of the intended target
    pub target_rotation: Rotation,
}

/// Outcome reported to a sink answering a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceResponse {
    /// The answer was recorded and wired into the pipeline
    Accepted,
    /// The round was superseded or torn down before the answer arrived
    RequestCancelled,
    /// The round had already been answered
    AlreadyComplete,
}

/// State of the write endpoint for one pipeline generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceState {
    /// The sink has not answered yet; a valid steady state
    Pending,
    /// The sink supplied a surface
    Provided(Surface),
    /// The sink declined; the pipeline stays published without a surface
    WillNotProvide,
    /// The round was superseded or torn down
    Released,
}

/// Shared state of one negotiation round
///
/// Transitions may arrive from the sink's executor and from the coordinator
/// concurrently; the mutex is the authority, the watch channel mirrors it
/// for observers.
struct RequestCore {
    resolution: Resolution,
    camera_id: CameraId,
    generation: u64,
    surface_required: bool,
    state: Mutex<SurfaceState>,
    state_tx: watch::Sender<SurfaceState>,
    transformation_tx: watch::Sender<Option<TransformationInfo>>,
}

impl RequestCore {
    fn snapshot(&self) -> SurfaceState {
        self.state.lock().clone()
    }

    fn provide(&self, surface: Surface) -> SurfaceResponse {
        let mut state = self.state.lock();
        match &*state {
            SurfaceState::Pending => {
                debug!(
                    camera = %self.camera_id,
                    generation = self.generation,
                    %surface,
                    "surface provided"
                );
                *state = SurfaceState::Provided(surface);
                self.state_tx.send_replace(state.clone());
                SurfaceResponse::Accepted
            }
            SurfaceState::Released => SurfaceResponse::RequestCancelled,
            _ => SurfaceResponse::AlreadyComplete,
        }
    }

    fn decline(&self) -> SurfaceResponse {
        let mut state = self.state.lock();
        match &*state {
            SurfaceState::Pending => {
                debug!(
                    camera = %self.camera_id,
                    generation = self.generation,
                    "sink will not provide a surface"
                );
                *state = SurfaceState::WillNotProvide;
                self.state_tx.send_replace(state.clone());
                SurfaceResponse::Accepted
            }
            SurfaceState::Released => SurfaceResponse::RequestCancelled,
            _ => SurfaceResponse::AlreadyComplete,
        }
    }

    /// Terminal transition; returns the prior state if anything changed
    fn release(&self) -> Option<SurfaceState> {
        let mut state = self.state.lock();
        match &*state {
            SurfaceState::Released => None,
            _ => {
                let prior = std::mem::replace(&mut *state, SurfaceState::Released);
                self.state_tx.send_replace(SurfaceState::Released);
                Some(prior)
            }
        }
    }
}

/// One surface negotiation round
///
/// Created fresh for every pipeline build and dispatched synchronously into
/// the output sink; the sink's answer arrives asynchronously through this
/// handle. Cloning shares the round.
#[derive(Clone)]
pub struct SurfaceRequest {
    core: Arc<RequestCore>,
}

impl SurfaceRequest {
    pub(crate) fn new(
        resolution: Resolution,
        camera_id: CameraId,
        generation: u64,
        surface_required: bool,
    ) -> Self {
        let (state_tx, _) = watch::channel(SurfaceState::Pending);
        let (transformation_tx, _) = watch::channel(None);
        Self {
            core: Arc::new(RequestCore {
                resolution,
                camera_id,
                generation,
                surface_required,
                state: Mutex::new(SurfaceState::Pending),
                state_tx,
                transformation_tx,
            }),
        }
    }

    /// Resolution the surface must be able to take frames at
    pub fn resolution(&self) -> Resolution {
        self.core.resolution
    }

    /// Camera this round was opened for
    pub fn camera_id(&self) -> &CameraId {
        &self.core.camera_id
    }

    /// Pipeline generation the round belongs to
    pub fn generation(&self) -> u64 {
        self.core.generation
    }

    /// Whether the pipeline is unusable until a surface is supplied
    ///
    /// Video capture tolerates an unfulfilled round: the pipeline stays
    /// published without a surface, so this reports `false` there.
    pub fn is_surface_required(&self) -> bool {
        self.core.surface_required
    }

    /// Current state of the round
    pub fn surface_state(&self) -> SurfaceState {
        self.core.snapshot()
    }

    /// Whether the round was superseded or torn down
    pub fn is_cancelled(&self) -> bool {
        matches!(self.core.snapshot(), SurfaceState::Released)
    }

    /// Transformation info, absent until the pipeline build attaches it
    pub fn transformation(&self) -> Option<TransformationInfo> {
        *self.core.transformation_tx.borrow()
    }

    /// Watch transformation info updates
    ///
    /// The info is attached shortly after the request is dispatched, so a
    /// sink that needs it can wait here instead of polling.
    pub fn transformation_updates(&self) -> watch::Receiver<Option<TransformationInfo>> {
        self.core.transformation_tx.subscribe()
    }

    pub(crate) fn set_transformation(&self, info: TransformationInfo) {
        self.core.transformation_tx.send_replace(Some(info));
    }

    /// Supply the write endpoint for this round
    ///
    /// Safe to call from any execution context. Returns
    /// [`SurfaceResponse::RequestCancelled`] when the round was superseded
    /// before the answer arrived; the surface then stays with the caller.
    pub fn provide_surface(&self, surface: Surface) -> SurfaceResponse {
        self.core.provide(surface)
    }

    /// Tell the pipeline no surface will come for this round
    pub fn will_not_provide_surface(&self) -> SurfaceResponse {
        self.core.decline()
    }

    /// Deferred resource handle for this round, owned by the controller
    pub(crate) fn resources(&self) -> PipelineResources {
        PipelineResources {
            core: self.core.clone(),
            state_rx: self.core.state_tx.subscribe(),
            closed: false,
        }
    }
}

impl fmt::Debug for SurfaceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRequest")
            .field("camera_id", &self.core.camera_id)
            .field("resolution", &self.core.resolution)
            .field("generation", &self.core.generation)
            .field("state", &self.core.snapshot())
            .finish()
    }
}

/// Deferred handle over the surface negotiated for one pipeline generation
///
/// Owned exclusively by the lifecycle controller. [`close`](Self::close) is
/// terminal and idempotent; it must run before a newer generation is built
/// and again on teardown, whichever comes first.
pub struct PipelineResources {
    core: Arc<RequestCore>,
    state_rx: watch::Receiver<SurfaceState>,
    closed: bool,
}

impl PipelineResources {
    pub fn generation(&self) -> u64 {
        self.core.generation
    }

    /// Current state of the underlying round
    pub fn state(&self) -> SurfaceState {
        self.core.snapshot()
    }

    /// The surface, if the sink has provided one
    pub fn surface(&self) -> Option<Surface> {
        match self.core.snapshot() {
            SurfaceState::Provided(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SurfaceState> {
        self.state_rx.clone()
    }

    /// Release the round
    ///
    /// Cancels a pending request and detaches a provided surface. Closing an
    /// already-closed handle is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            debug!(
                generation = self.core.generation,
                "pipeline resources already closed"
            );
            return;
        }
        self.closed = true;

        if let Some(prior) = self.core.release() {
            debug!(
                camera = %self.core.camera_id,
                generation = self.core.generation,
                ?prior,
                "pipeline resources released"
            );
        }
    }

    /// Wait until the sink answers the round
    ///
    /// Resolves to the surface once provided, or `None` when the sink
    /// declined or the round was released. Pends forever on a silent sink.
    pub async fn await_surface(&self) -> Option<Surface> {
        let mut rx = self.state_rx.clone();
        loop {
            match rx.borrow_and_update().clone() {
                SurfaceState::Pending => {}
                SurfaceState::Provided(surface) => return Some(surface),
                SurfaceState::WillNotProvide | SurfaceState::Released => return None,
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

impl fmt::Debug for PipelineResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineResources")
            .field("camera_id", &self.core.camera_id)
            .field("generation", &self.core.generation)
            .field("state", &self.core.snapshot())
            .field("closed", &self.closed)
            .finish()
    }
}
