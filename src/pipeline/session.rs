//! Published session descriptors and the session-manager boundary
//!
//! The session manager owns the actual hardware capture session. The use
//! case hands it a read-only [`SessionDescriptor`] per pipeline generation
//! and learns about session failures through the descriptor's error
//! callback.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::camera::CameraId;
use crate::geometry::Resolution;

use super::surface::{Surface, SurfaceState};

/// Failure reported by the session manager for a published session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The session's surfaces need to be recreated
    SurfaceNeedsReset,
    /// Unspecified session failure
    Unknown,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::SurfaceNeedsReset => write!(f, "surface needs reset"),
            SessionError::Unknown => write!(f, "unknown session error"),
        }
    }
}

type ErrorCallback = dyn Fn(&SessionDescriptor, SessionError) + Send + Sync;

struct DescriptorInner {
    camera_id: CameraId,
    resolution: Resolution,
    generation: u64,
    surface_occupancy_priority: i32,
    surface_rx: watch::Receiver<SurfaceState>,
    error_callback: Box<ErrorCallback>,
}

/// Read-only snapshot of a pipeline, published to the session manager
///
/// Cloning shares the snapshot. The session manager may reference it but
/// never mutates it; publishing a newer descriptor supersedes this one at
/// the session-manager boundary.
#[derive(Clone)]
pub struct SessionDescriptor {
    inner: Arc<DescriptorInner>,
}

impl SessionDescriptor {
    pub(crate) fn new(
        camera_id: CameraId,
        resolution: Resolution,
        generation: u64,
        surface_occupancy_priority: i32,
        surface_rx: watch::Receiver<SurfaceState>,
        error_callback: Box<ErrorCallback>,
    ) -> Self {
        Self {
            inner: Arc::new(DescriptorInner {
                camera_id,
                resolution,
                generation,
                surface_occupancy_priority,
                surface_rx,
                error_callback,
            }),
        }
    }

    pub fn camera_id(&self) -> &CameraId {
        &self.inner.camera_id
    }

    pub fn resolution(&self) -> Resolution {
        self.inner.resolution
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    pub fn surface_occupancy_priority(&self) -> i32 {
        self.inner.surface_occupancy_priority
    }

    /// Current state of the session's write endpoint
    pub fn surface_state(&self) -> SurfaceState {
        self.inner.surface_rx.borrow().clone()
    }

    /// The write endpoint, once the sink has provided it
    pub fn surface(&self) -> Option<Surface> {
        match self.surface_state() {
            SurfaceState::Provided(surface) => Some(surface),
            _ => None,
        }
    }

    /// Report a session failure against this descriptor
    ///
    /// Safe to call from any execution context; recovery is marshaled onto
    /// the use case's coordinator. Reports against superseded descriptors
    /// are ignored there.
    pub fn report_error(&self, error: SessionError) {
        (self.inner.error_callback)(self, error);
    }
}

impl fmt::Debug for SessionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDescriptor")
            .field("camera_id", &self.inner.camera_id)
            .field("resolution", &self.inner.resolution)
            .field("generation", &self.inner.generation)
            .field("surface_state", &self.surface_state())
            .finish()
    }
}

/// External owner of hardware capture sessions
///
/// Publishing a descriptor installs it as the current session composition;
/// a later publish implicitly supersedes it.
pub trait SessionManager: Send + Sync + 'static {
    fn publish(&self, descriptor: SessionDescriptor);
}
