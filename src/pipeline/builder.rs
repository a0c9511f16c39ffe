//! Pipeline assembly
//!
//! One call builds one pipeline generation: open the surface request,
//! dispatch it into the sink, attach transformation info and wrap the result
//! in a session descriptor whose error callback schedules a reset for
//! exactly this camera and generation. Runs only on the coordinator.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::camera::CameraCapabilities;
use crate::capture::DEFAULT_SURFACE_OCCUPANCY_PRIORITY;
use crate::config::ConfigStore;
use crate::geometry::{CropRect, Resolution};
use crate::output::OutputSink;

use super::controller::Command;
use super::session::SessionDescriptor;
use super::surface::{PipelineResources, SurfaceRequest, TransformationInfo};

/// Everything produced by one pipeline build
pub(crate) struct BuiltPipeline {
    pub(crate) request: SurfaceRequest,
    pub(crate) resources: PipelineResources,
    pub(crate) descriptor: SessionDescriptor,
}

/// Assemble a new pipeline generation for `camera` at `resolution`
pub(crate) fn build_pipeline(
    camera: &Arc<dyn CameraCapabilities>,
    sink: &Arc<dyn OutputSink>,
    config: &ConfigStore,
    resolution: Resolution,
    generation: u64,
    commands: mpsc::UnboundedSender<Command>,
) -> BuiltPipeline {
    let camera_id = camera.camera_id();
    // Video tolerates an unfulfilled request, so the surface is not required.
    let request = SurfaceRequest::new(resolution, camera_id.clone(), generation, false);

    // Dispatch first; the sink answers asynchronously through the request,
    // and may pick the transformation info up once it lands below.
    sink.on_surface_requested(request.clone());

    let options = config.get();
    let target_rotation = options.target_rotation().unwrap_or_default();
    let crop_rect = options
        .viewport_crop()
        .unwrap_or_else(|| CropRect::full(resolution));
    request.set_transformation(TransformationInfo {
        crop_rect,
        sensor_rotation_degrees: camera.sensor_rotation_degrees(target_rotation),
        target_rotation,
    });

    let resources = request.resources();

    let priority = options
        .surface_occupancy_priority()
        .unwrap_or(DEFAULT_SURFACE_OCCUPANCY_PRIORITY);

    let callback_camera = camera_id.clone();
    let descriptor = SessionDescriptor::new(
        camera_id.clone(),
        resolution,
        generation,
        priority,
        resources.subscribe(),
        Box::new(move |descriptor, error| {
            warn!(
                camera = %callback_camera,
                generation = descriptor.generation(),
                %error,
                "session error reported, scheduling pipeline reset"
            );
            // May fire on any thread; recovery runs on the coordinator. The
            // send fails only when the use case is already gone.
            let _ = commands.send(Command::Reset {
                camera_id: callback_camera.clone(),
                generation: descriptor.generation(),
            });
        }),
    );

    debug!(camera = %camera_id, %resolution, generation, "pipeline built");

    BuiltPipeline {
        request,
        resources,
        descriptor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionBundle, OptionKey, OptionValue};
    use crate::geometry::Rotation;
    use crate::pipeline::surface::SurfaceState;
    use crate::quality::QualitySelector;
    use crate::test_util::{CollectingSink, FixedCamera};

    fn fixtures() -> (Arc<dyn CameraCapabilities>, Arc<CollectingSink>) {
        let camera: Arc<dyn CameraCapabilities> =
            Arc::new(FixedCamera::new("cam", vec![]).with_sensor_rotation(90));
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        (camera, sink)
    }

    #[tokio::test]
    async fn test_build_dispatches_and_attaches_transformation() {
        let (camera, sink) = fixtures();
        let dyn_sink: Arc<dyn OutputSink> = sink.clone();
        let config = ConfigStore::new(OptionBundle::new());
        let (tx, _rx) = mpsc::unbounded_channel();

        let built = build_pipeline(&camera, &dyn_sink, &config, Resolution::HD720, 1, tx);

        let dispatched = sink.last_request().expect("request dispatched");
        assert_eq!(dispatched.generation(), 1);
        assert_eq!(dispatched.resolution(), Resolution::HD720);

        let info = dispatched.transformation().expect("transformation attached");
        assert_eq!(info.crop_rect, CropRect::full(Resolution::HD720));
        assert_eq!(info.sensor_rotation_degrees, 90);
        assert_eq!(info.target_rotation, Rotation::Deg0);

        assert_eq!(built.resources.state(), SurfaceState::Pending);
        assert_eq!(built.descriptor.resolution(), Resolution::HD720);
        assert_eq!(
            built.descriptor.surface_occupancy_priority(),
            DEFAULT_SURFACE_OCCUPANCY_PRIORITY
        );
    }

    #[tokio::test]
    async fn test_error_callback_schedules_reset_for_own_generation() {
        let (camera, sink) = fixtures();
        let dyn_sink: Arc<dyn OutputSink> = sink.clone();
        let config = ConfigStore::new(OptionBundle::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let built = build_pipeline(&camera, &dyn_sink, &config, Resolution::HD720, 4, tx);
        built
            .descriptor
            .report_error(crate::pipeline::SessionError::Unknown);

        match rx.recv().await {
            Some(Command::Reset {
                camera_id,
                generation,
            }) => {
                assert_eq!(camera_id.as_str(), "cam");
                assert_eq!(generation, 4);
            }
            other => panic!("expected reset command, got {:?}", other.is_some()),
        }
    }

    #[tokio::test]
    async fn test_build_honors_configured_options() {
        let (camera, sink) = fixtures();
        let dyn_sink: Arc<dyn OutputSink> = sink.clone();

        let mut options = OptionBundle::new();
        options.insert(
            OptionKey::TargetRotation,
            OptionValue::Rotation(Rotation::Deg180),
        );
        options.insert(OptionKey::SurfaceOccupancyPriority, OptionValue::Priority(1));
        options.insert(
            OptionKey::ViewportCrop,
            OptionValue::Crop(CropRect::new(0, 0, 640, 360)),
        );
        let config = ConfigStore::new(options);
        let (tx, _rx) = mpsc::unbounded_channel();

        let built = build_pipeline(&camera, &dyn_sink, &config, Resolution::HD720, 1, tx);

        let info = sink
            .last_request()
            .and_then(|request| request.transformation())
            .expect("transformation attached");
        assert_eq!(info.target_rotation, Rotation::Deg180);
        assert_eq!(info.crop_rect, CropRect::new(0, 0, 640, 360));
        assert_eq!(built.descriptor.surface_occupancy_priority(), 1);
    }
}
