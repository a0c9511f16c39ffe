//! Use-case event notifications
//!
//! Observers of a use case subscribe here for lifecycle notifications:
//! stream activity from the output sink, attach/detach transitions, and
//! pipeline resets after session errors.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::camera::CameraId;
use crate::geometry::Resolution;

/// Event channel capacity (ring buffer size)
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Lifecycle notifications published by a use case
///
/// All events are tagged with their event name for serialization.
/// The `serde(tag = "event", content = "data")` attribute creates a
/// JSON structure like:
/// ```json
/// {
///   "event": "pipeline.reset",
///   "data": { "camera": "camera-0", "generation": 2 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum UseCaseEvent {
    /// The output sink reported it is consuming frames
    #[serde(rename = "use_case.active")]
    Active { camera: CameraId },

    /// The output sink stopped consuming frames
    #[serde(rename = "use_case.inactive")]
    Inactive { camera: CameraId },

    /// A pipeline was built and its descriptor published
    #[serde(rename = "pipeline.attached")]
    Attached {
        camera: CameraId,
        resolution: Resolution,
    },

    /// The pipeline was torn down
    #[serde(rename = "pipeline.detached")]
    Detached { camera: CameraId },

    /// The pipeline was rebuilt in place after a session error
    #[serde(rename = "pipeline.reset")]
    PipelineReset { camera: CameraId, generation: u64 },
}

impl UseCaseEvent {
    /// Event name used in the serialized form
    pub fn event_name(&self) -> &'static str {
        match self {
            UseCaseEvent::Active { .. } => "use_case.active",
            UseCaseEvent::Inactive { .. } => "use_case.inactive",
            UseCaseEvent::Attached { .. } => "pipeline.attached",
            UseCaseEvent::Detached { .. } => "pipeline.detached",
            UseCaseEvent::PipelineReset { .. } => "pipeline.reset",
        }
    }
}

/// Broadcast bus distributing use-case events to all subscribers
///
/// Events are delivered to every active subscriber through a tokio broadcast
/// channel. If there are no subscribers an event is silently dropped; events
/// are fire-and-forget notifications.
pub struct EventBus {
    tx: broadcast::Sender<UseCaseEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: UseCaseEvent) {
        // If no subscribers, send returns Err which is normal
        let _ = self.tx.send(event);
    }

    /// Subscribe to events
    ///
    /// The receiver uses a ring buffer, so a subscriber that falls too far
    /// behind receives a `Lagged` error and misses events.
    pub fn subscribe(&self) -> broadcast::Receiver<UseCaseEvent> {
        self.tx.subscribe()
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraId {
        CameraId::new("camera-0")
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(UseCaseEvent::Active { camera: camera() });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, UseCaseEvent::Active { .. }));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(UseCaseEvent::Detached { camera: camera() });

        assert!(matches!(
            rx1.recv().await.unwrap(),
            UseCaseEvent::Detached { .. }
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            UseCaseEvent::Detached { .. }
        ));
    }

    #[test]
    fn test_no_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        // Should not panic when publishing with no subscribers
        bus.publish(UseCaseEvent::Inactive { camera: camera() });
    }

    #[test]
    fn test_serialization() {
        let event = UseCaseEvent::PipelineReset {
            camera: camera(),
            generation: 2,
        };
        assert_eq!(event.event_name(), "pipeline.reset");

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("pipeline.reset"));
        assert!(json.contains("camera-0"));

        let deserialized: UseCaseEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            deserialized,
            UseCaseEvent::PipelineReset { generation: 2, .. }
        ));
    }
}
