//! Pipeline construction and lifecycle
//!
//! A pipeline is the chain from a negotiated resolution through a consumer
//! write endpoint to the session manager. This module owns the surface
//! handshake, the published session descriptor and the lifecycle coordinator
//! that builds, resets and tears pipelines down.

mod builder;
pub mod controller;
pub mod session;
pub mod surface;

pub use controller::{ControllerSnapshot, LifecycleState, PipelineController};
pub use session::{SessionDescriptor, SessionError, SessionManager};
pub use surface::{
    PipelineResources, Surface, SurfaceRequest, SurfaceResponse, SurfaceState, TransformationInfo,
};
