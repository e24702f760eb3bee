//! Wire messages exchanged with the server over WebSocket.

use serde::{Deserialize, Serialize};
use studia_core::types::DbId;

/// Outbound subscription request.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    Subscribe { course_id: DbId },
    #[serde(rename_all = "camelCase")]
    Unsubscribe { course_id: DbId },
}

/// Inbound realtime frames pushed by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// A course cover finished generating and was written to the course.
    #[serde(rename = "course.cover_updated", rename_all = "camelCase")]
    CoverUpdated {
        course_id: DbId,
        image_url: String,
        prediction_id: String,
    },

    /// A module illustration finished generating and was prepended.
    #[serde(rename = "module.image_added", rename_all = "camelCase")]
    ImageAdded {
        course_id: DbId,
        module_id: DbId,
        image_url: String,
        prediction_id: String,
    },

    /// A prediction failed — provider-reported or reaped after timeout.
    #[serde(rename = "prediction.failed", rename_all = "camelCase")]
    Failed {
        prediction_id: String,
        #[serde(default)]
        error: Option<String>,
    },
}

impl ServerFrame {
    /// The prediction this frame is about.
    pub fn prediction_id(&self) -> &str {
        match self {
            ServerFrame::CoverUpdated { prediction_id, .. }
            | ServerFrame::ImageAdded { prediction_id, .. }
            | ServerFrame::Failed { prediction_id, .. } => prediction_id,
        }
    }
}
