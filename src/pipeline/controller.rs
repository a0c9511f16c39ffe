//! Pipeline lifecycle coordination
//!
//! All lifecycle transitions (attach, resolution update, reset, detach) run
//! on a single coordinator task that owns the pipeline state outright. The
//! public handle sends commands into that task, so callers on any runtime
//! thread are redirected onto the coordination context instead of racing on
//! shared state, and no locks are needed around the pipeline structures.

use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::camera::{CameraCapabilities, CameraId};
use crate::config::{ConfigStore, OptionKey, OptionValue};
use crate::error::{CaptureError, Result};
use crate::events::{EventBus, UseCaseEvent};
use crate::geometry::Resolution;
use crate::output::{OutputSink, StreamState};
use crate::quality::negotiate_resolution;

use super::builder::build_pipeline;
use super::session::SessionManager;
use super::surface::{PipelineResources, SurfaceRequest, SurfaceState};

/// Lifecycle states of the capture pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No camera bound, no pipeline resources held
    Detached,
    /// A pipeline is being assembled
    Building,
    /// A descriptor is published and its resources are held
    Live,
    /// The live pipeline is being torn down and rebuilt in place
    Resetting,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Detached => "detached",
            LifecycleState::Building => "building",
            LifecycleState::Live => "live",
            LifecycleState::Resetting => "resetting",
        };
        write!(f, "{}", name)
    }
}

pub(crate) enum Command {
    Attach {
        camera: Arc<dyn CameraCapabilities>,
        session: Arc<dyn SessionManager>,
        reply: oneshot::Sender<Result<Resolution>>,
    },
    UpdateResolution {
        resolution: Resolution,
        reply: oneshot::Sender<Result<()>>,
    },
    Reset {
        camera_id: CameraId,
        generation: u64,
    },
    Detach {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<ControllerSnapshot>,
    },
    Shutdown,
}

/// Introspection snapshot of the coordinator's state
#[derive(Debug, Clone)]
pub struct ControllerSnapshot {
    pub state: LifecycleState,
    pub camera: Option<CameraId>,
    pub resolution: Option<Resolution>,
    pub generation: u64,
    /// State of the outstanding surface round, absent while detached
    pub surface_state: Option<SurfaceState>,
}

/// Handle to the coordinator task of one use case
#[derive(Clone)]
pub struct PipelineController {
    commands: mpsc::UnboundedSender<Command>,
}

impl PipelineController {
    /// Spawn the coordinator task for one use case
    pub(crate) fn spawn(
        name: String,
        sink: Arc<dyn OutputSink>,
        config: ConfigStore,
        events: Arc<EventBus>,
    ) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let state = PipelineState {
            name,
            sink,
            config,
            events,
            commands: commands.clone(),
            lifecycle: LifecycleState::Detached,
            camera: None,
            session: None,
            request: None,
            resources: None,
            resolution: None,
            generation: 0,
            bridge: None,
        };
        tokio::spawn(state.run(receiver));
        Self { commands }
    }

    /// Attach to a camera and publish the first pipeline
    ///
    /// Fails without touching any state when resolution negotiation fails.
    pub async fn attach(
        &self,
        camera: Arc<dyn CameraCapabilities>,
        session: Arc<dyn SessionManager>,
    ) -> Result<Resolution> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Attach {
                camera,
                session,
                reply,
            })
            .map_err(|_| coordinator_gone())?;
        response.await.map_err(|_| coordinator_gone())?
    }

    /// Rebuild the pipeline in place for a camera-suggested resolution
    pub async fn update_resolution(&self, resolution: Resolution) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::UpdateResolution { resolution, reply })
            .map_err(|_| coordinator_gone())?;
        response.await.map_err(|_| coordinator_gone())?
    }

    /// Tear the pipeline down and unbind the camera
    ///
    /// Idempotent; detaching a detached use case is a no-op.
    pub async fn detach(&self) {
        let (reply, response) = oneshot::channel();
        if self.commands.send(Command::Detach { reply }).is_err() {
            return;
        }
        let _ = response.await;
    }

    /// Current coordinator state
    pub async fn snapshot(&self) -> Result<ControllerSnapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .map_err(|_| coordinator_gone())?;
        response.await.map_err(|_| coordinator_gone())
    }

    /// Stop the coordinator task; used when the owning use case is dropped
    pub(crate) fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

fn coordinator_gone() -> CaptureError {
    CaptureError::Coordinator("command channel closed".to_string())
}

/// State owned exclusively by the coordinator task
struct PipelineState {
    name: String,
    sink: Arc<dyn OutputSink>,
    config: ConfigStore,
    events: Arc<EventBus>,
    commands: mpsc::UnboundedSender<Command>,
    lifecycle: LifecycleState,
    camera: Option<Arc<dyn CameraCapabilities>>,
    session: Option<Arc<dyn SessionManager>>,
    request: Option<SurfaceRequest>,
    resources: Option<PipelineResources>,
    resolution: Option<Resolution>,
    generation: u64,
    bridge: Option<CancellationToken>,
}

impl PipelineState {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Attach {
                    camera,
                    session,
                    reply,
                } => {
                    let _ = reply.send(self.attach(camera, session));
                }
                Command::UpdateResolution { resolution, reply } => {
                    let _ = reply.send(self.update_resolution(resolution));
                }
                Command::Reset {
                    camera_id,
                    generation,
                } => self.reset(camera_id, generation),
                Command::Detach { reply } => {
                    self.detach();
                    let _ = reply.send(());
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                Command::Shutdown => break,
            }
        }

        // The use case is gone; release whatever is still held.
        self.detach();
    }

    fn attach(
        &mut self,
        camera: Arc<dyn CameraCapabilities>,
        session: Arc<dyn SessionManager>,
    ) -> Result<Resolution> {
        if self.lifecycle != LifecycleState::Detached {
            let current = self
                .camera
                .as_ref()
                .map(|camera| camera.camera_id().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(CaptureError::AlreadyAttached(current));
        }

        let camera_id = camera.camera_id();
        let target_rotation = self.config.get().target_rotation().unwrap_or_default();
        let resolution = negotiate_resolution(
            self.sink.media_spec().snapshot(),
            camera.as_ref(),
            target_rotation,
        )?;

        // Record the negotiated value; callers cannot write this option
        // themselves.
        self.config.set(
            OptionKey::TargetResolution,
            OptionValue::Resolution(resolution),
        );

        self.lifecycle = LifecycleState::Building;
        self.camera = Some(camera);
        self.session = Some(session);
        self.resolution = Some(resolution);
        self.subscribe_stream_state(camera_id.clone());
        self.build_and_publish();
        self.lifecycle = LifecycleState::Live;

        info!(
            use_case = %self.name,
            camera = %camera_id,
            %resolution,
            "pipeline attached"
        );
        self.events.publish(UseCaseEvent::Attached {
            camera: camera_id,
            resolution,
        });
        Ok(resolution)
    }

    fn update_resolution(&mut self, resolution: Resolution) -> Result<()> {
        if self.lifecycle == LifecycleState::Detached {
            return Err(CaptureError::NotAttached);
        }

        info!(
            use_case = %self.name,
            %resolution,
            "rebuilding pipeline for updated resolution"
        );
        self.config.set(
            OptionKey::TargetResolution,
            OptionValue::Resolution(resolution),
        );
        self.resolution = Some(resolution);
        self.lifecycle = LifecycleState::Building;
        self.clear_pipeline();
        self.build_and_publish();
        self.lifecycle = LifecycleState::Live;
        Ok(())
    }

    /// Tear down and rebuild after a session error
    ///
    /// Only called through a published descriptor's error callback. The
    /// camera-identity and generation guards make resets for a detached,
    /// rebound or superseded pipeline no-ops.
    fn reset(&mut self, camera_id: CameraId, generation: u64) {
        let current_camera = self.camera.as_ref().map(|camera| camera.camera_id());
        if self.lifecycle == LifecycleState::Detached
            || current_camera.as_ref() != Some(&camera_id)
        {
            debug!(
                camera = %camera_id,
                "ignoring reset for a camera that is no longer attached"
            );
            return;
        }
        if generation != self.generation {
            debug!(
                camera = %camera_id,
                generation,
                current_generation = self.generation,
                "ignoring reset for a superseded pipeline generation"
            );
            return;
        }

        info!(
            use_case = %self.name,
            camera = %camera_id,
            generation,
            "resetting pipeline after session error"
        );
        self.lifecycle = LifecycleState::Resetting;
        self.clear_pipeline();
        self.build_and_publish();
        self.lifecycle = LifecycleState::Live;
        self.events.publish(UseCaseEvent::PipelineReset {
            camera: camera_id,
            generation: self.generation,
        });
    }

    fn detach(&mut self) {
        if self.lifecycle == LifecycleState::Detached {
            return;
        }
        let camera_id = self.camera.as_ref().map(|camera| camera.camera_id());

        self.clear_pipeline();
        if let Some(bridge) = self.bridge.take() {
            bridge.cancel();
        }
        self.camera = None;
        self.session = None;
        self.resolution = None;
        self.lifecycle = LifecycleState::Detached;

        if let Some(camera) = camera_id {
            info!(use_case = %self.name, camera = %camera, "pipeline detached");
            self.events.publish(UseCaseEvent::Detached { camera });
        }
    }

    /// Release the current generation so the next one can be built
    ///
    /// Closing the resources cancels the outstanding round, so a consumer
    /// answer arriving later reports `RequestCancelled` instead of reaching
    /// a newer pipeline.
    fn clear_pipeline(&mut self) {
        if let Some(mut resources) = self.resources.take() {
            resources.close();
        }
        self.request = None;
    }

    /// Build the next generation and publish its descriptor
    ///
    /// `clear_pipeline` must have released any prior generation first.
    fn build_and_publish(&mut self) {
        debug_assert!(
            self.resources.is_none(),
            "previous pipeline resources still attached"
        );
        let (Some(camera), Some(session), Some(resolution)) =
            (self.camera.clone(), self.session.clone(), self.resolution)
        else {
            warn!(use_case = %self.name, "pipeline build without an attached camera");
            return;
        };

        self.generation += 1;
        let built = build_pipeline(
            &camera,
            &self.sink,
            &self.config,
            resolution,
            self.generation,
            self.commands.clone(),
        );
        self.request = Some(built.request);
        self.resources = Some(built.resources);
        session.publish(built.descriptor);
    }

    /// Forward the sink's stream state to the use case's observers
    ///
    /// The subscription lives until the returned token is cancelled on
    /// detach; a detached use case produces no further notifications.
    fn subscribe_stream_state(&mut self, camera_id: CameraId) {
        let token = CancellationToken::new();
        let guard = token.clone();
        let mut updates = self.sink.stream_state().subscribe();
        let events = self.events.clone();
        let use_case = self.name.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = guard.cancelled() => break,
                    changed = updates.changed() => {
                        if changed.is_err() {
                            // Producer went away; log it, never fail the
                            // use case over an observer error.
                            warn!(
                                use_case = %use_case,
                                camera = %camera_id,
                                "stream state observable closed"
                            );
                            break;
                        }
                        let state = *updates.borrow_and_update();
                        debug!(
                            use_case = %use_case,
                            camera = %camera_id,
                            ?state,
                            "stream state update"
                        );
                        let event = match state {
                            Some(StreamState::Active) => UseCaseEvent::Active {
                                camera: camera_id.clone(),
                            },
                            _ => UseCaseEvent::Inactive {
                                camera: camera_id.clone(),
                            },
                        };
                        events.publish(event);
                    }
                }
            }
        });

        self.bridge = Some(token);
    }

    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.lifecycle,
            camera: self.camera.as_ref().map(|camera| camera.camera_id()),
            resolution: self.resolution,
            generation: self.generation,
            surface_state: self
                .request
                .as_ref()
                .map(|request| request.surface_state()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionBundle;
    use crate::pipeline::session::SessionError;
    use crate::pipeline::surface::{Surface, SurfaceState};
    use crate::quality::{Quality, QualitySelector};
    use crate::test_util::{CollectingSink, FixedCamera, RecordingSession};
    use std::time::Duration;
    use tokio::sync::broadcast;

    fn controller_with(
        sink: Arc<CollectingSink>,
    ) -> (PipelineController, Arc<EventBus>, ConfigStore) {
        let events = Arc::new(EventBus::new());
        let config = ConfigStore::new(OptionBundle::new());
        let controller = PipelineController::spawn(
            "VideoCapture-test".to_string(),
            sink,
            config.clone(),
            events.clone(),
        );
        (controller, events, config)
    }

    fn camera(id: &str) -> Arc<dyn CameraCapabilities> {
        Arc::new(FixedCamera::new(id, vec![Quality::Hd, Quality::Fhd]))
    }

    async fn wait_for_event(
        rx: &mut broadcast::Receiver<UseCaseEvent>,
        matches: fn(&UseCaseEvent) -> bool,
    ) -> UseCaseEvent {
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let event = rx.recv().await.unwrap();
                if matches(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("event not observed in time")
    }

    #[tokio::test]
    async fn test_attach_publishes_descriptor() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, _events, config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());

        let resolution = controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::HD1080);

        let descriptors = session.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].resolution(), Resolution::HD1080);
        assert_eq!(descriptors[0].generation(), 1);

        // The negotiated value lands in the config store.
        assert_eq!(config.get().target_resolution(), Some(Resolution::HD1080));

        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.state, LifecycleState::Live);
        assert_eq!(snapshot.camera, Some(CameraId::new("cam-a")));
        assert_eq!(snapshot.surface_state, Some(SurfaceState::Pending));

        assert_eq!(sink.request_count(), 1);
    }

    #[tokio::test]
    async fn test_attach_fails_without_media_spec() {
        let sink = Arc::new(CollectingSink::new(None));
        let (controller, _events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());

        let result = controller.attach(camera("cam-a"), session.clone()).await;
        assert!(matches!(result, Err(CaptureError::Precondition(_))));

        // No partial pipeline is left behind.
        assert!(session.descriptors().is_empty());
        assert_eq!(sink.request_count(), 0);
        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.state, LifecycleState::Detached);
    }

    #[tokio::test]
    async fn test_attach_fails_when_no_quality_matches() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Preferred(vec![
            Quality::Uhd,
        ]))));
        let (controller, _events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());

        let result = controller.attach(camera("cam-a"), session.clone()).await;
        assert!(matches!(result, Err(CaptureError::InvalidConfig(_))));
        assert!(session.descriptors().is_empty());
    }

    #[tokio::test]
    async fn test_attach_twice_fails() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, _events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        let result = controller.attach(camera("cam-b"), session.clone()).await;
        assert!(matches!(result, Err(CaptureError::AlreadyAttached(_))));
        assert_eq!(session.descriptors().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_rebuilds_cleanly() {
        crate::test_util::init_test_logging();
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());
        let mut rx = events.subscribe();

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        let first = session.descriptors().remove(0);
        sink.requests()[0].provide_surface(Surface::new("recorder"));
        assert!(matches!(first.surface_state(), SurfaceState::Provided(_)));

        first.report_error(SessionError::SurfaceNeedsReset);
        let event = wait_for_event(&mut rx, |event| {
            matches!(event, UseCaseEvent::PipelineReset { .. })
        })
        .await;
        assert!(matches!(
            event,
            UseCaseEvent::PipelineReset { generation: 2, .. }
        ));

        let descriptors = session.descriptors();
        assert_eq!(descriptors.len(), 2);
        // The superseded round is released, the new one pending.
        assert_eq!(descriptors[0].surface_state(), SurfaceState::Released);
        assert_eq!(descriptors[1].surface_state(), SurfaceState::Pending);
        assert_eq!(descriptors[1].generation(), 2);

        // Every dispatch happened with all prior rounds already cancelled.
        assert!(sink.priors_cancelled_at_each_dispatch());

        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.state, LifecycleState::Live);
        assert_eq!(snapshot.generation, 2);

        // The stream-state path survives the rebuild.
        sink.set_stream_state(StreamState::Active);
        wait_for_event(&mut rx, |event| matches!(event, UseCaseEvent::Active { .. })).await;
    }

    #[tokio::test]
    async fn test_stale_reset_after_detach_is_a_noop() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, _events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        let first = session.descriptors().remove(0);
        controller.detach().await;

        first.report_error(SessionError::Unknown);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(session.descriptors().len(), 1);
        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.state, LifecycleState::Detached);
    }

    #[tokio::test]
    async fn test_stale_reset_after_rebind_is_a_noop() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, _events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        let first = session.descriptors().remove(0);

        controller.detach().await;
        controller
            .attach(camera("cam-b"), session.clone())
            .await
            .unwrap();
        assert_eq!(session.descriptors().len(), 2);

        // The error belongs to cam-a's pipeline; cam-b must be untouched.
        first.report_error(SessionError::Unknown);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(session.descriptors().len(), 2);
        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.camera, Some(CameraId::new("cam-b")));
    }

    #[tokio::test]
    async fn test_stale_generation_reset_is_a_noop() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, _events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        let first = session.descriptors().remove(0);

        controller
            .update_resolution(Resolution::HD720)
            .await
            .unwrap();
        assert_eq!(session.descriptors().len(), 2);

        // Generation 1 was superseded by the resolution update.
        first.report_error(SessionError::Unknown);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.descriptors().len(), 2);
    }

    #[tokio::test]
    async fn test_at_most_one_live_pipeline() {
        crate::test_util::init_test_logging();
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());
        let mut rx = events.subscribe();

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        controller
            .update_resolution(Resolution::HD720)
            .await
            .unwrap();
        session
            .descriptors()
            .last()
            .unwrap()
            .report_error(SessionError::Unknown);
        wait_for_event(&mut rx, |event| {
            matches!(event, UseCaseEvent::PipelineReset { .. })
        })
        .await;
        controller.detach().await;

        assert_eq!(session.descriptors().len(), 3);
        // No dispatch ever happened while an older round was still alive,
        // and teardown released the last one.
        assert!(sink.priors_cancelled_at_each_dispatch());
        assert!(sink.requests().iter().all(|request| request.is_cancelled()));
    }

    #[tokio::test]
    async fn test_bridge_forwards_stream_state() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());
        let mut rx = events.subscribe();

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();

        sink.set_stream_state(StreamState::Active);
        wait_for_event(&mut rx, |event| matches!(event, UseCaseEvent::Active { .. })).await;

        sink.set_stream_state(StreamState::Inactive);
        wait_for_event(&mut rx, |event| {
            matches!(event, UseCaseEvent::Inactive { .. })
        })
        .await;
    }

    #[tokio::test]
    async fn test_bridge_unsubscribed_after_detach() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, events, _config) = controller_with(sink.clone());
        let session = Arc::new(RecordingSession::new());
        let mut rx = events.subscribe();

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        controller.detach().await;
        wait_for_event(&mut rx, |event| {
            matches!(event, UseCaseEvent::Detached { .. })
        })
        .await;

        sink.set_stream_state(StreamState::Active);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_update_resolution_requires_attach() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, _events, _config) = controller_with(sink);

        let result = controller.update_resolution(Resolution::HD720).await;
        assert!(matches!(result, Err(CaptureError::NotAttached)));
    }

    #[tokio::test]
    async fn test_detach_is_idempotent() {
        let sink = Arc::new(CollectingSink::new(Some(QualitySelector::Highest)));
        let (controller, _events, _config) = controller_with(sink);
        let session = Arc::new(RecordingSession::new());

        controller
            .attach(camera("cam-a"), session.clone())
            .await
            .unwrap();
        controller.detach().await;
        controller.detach().await;

        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.state, LifecycleState::Detached);
        assert_eq!(snapshot.surface_state, None);
    }
}
