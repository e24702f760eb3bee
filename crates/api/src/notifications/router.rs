//! Event-to-WebSocket routing.
//!
//! [`NotificationRouter`] subscribes to the platform event bus and forwards
//! each event's payload to the WebSocket connections subscribed to the
//! affected course. The payload published on the bus is already the
//! client-facing frame, so routing is a pure fan-out.

use std::sync::Arc;

use axum::extract::ws::Message;
use studia_events::PlatformEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes platform events to subscribed WebSocket clients.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    /// Create a new router over the given WebSocket manager.
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](studia_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Push a single event to the subscribers of its course.
    ///
    /// Events without a course id have no realtime audience; they are
    /// visible via polling only.
    async fn route_event(&self, event: &PlatformEvent) {
        let Some(course_id) = event.course_id else {
            tracing::debug!(event_type = %event.event_type, "Event without course, not routed");
            return;
        };

        let frame = Message::Text(event.payload.to_string().into());
        let delivered = self.ws_manager.send_to_course(course_id, frame).await;
        tracing::debug!(
            event_type = %event.event_type,
            course_id,
            delivered,
            "Routed event to course subscribers"
        );
    }
}
