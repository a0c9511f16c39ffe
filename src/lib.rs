//! videocap - video-capture pipeline lifecycle for camera abstraction layers
//!
//! This crate implements the video-capture use case of a camera stack: it
//! negotiates a capture resolution from a consumer's quality policy and a
//! camera's capabilities, requests a write endpoint ("surface") from the
//! consumer, and owns the attach/reset/detach lifecycle of the resulting
//! pipeline, including automatic reconstruction after hardware session
//! errors.

pub mod camera;
pub mod capture;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod observable;
pub mod output;
pub mod pipeline;
pub mod quality;

#[cfg(test)]
pub(crate) mod test_util;

pub use capture::{CaptureConfig, VideoCapture, VideoCaptureBuilder};
pub use error::{CaptureError, Result};
