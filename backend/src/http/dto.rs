//! Data Transfer Objects for the HTTP API.
//!
//! Lessons and orders travel as raw [`Document`](crate::models::Document)s;
//! only the acknowledgement bodies have fixed shapes.

use serde::{Deserialize, Serialize};

use crate::models::DocumentId;

/// `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response for a stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlacedResponse {
    pub message: String,
    /// Identifier of the new order document
    #[serde(rename = "orderId")]
    pub order_id: DocumentId,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Store status: "connected", "disconnected" or "error: ..."
    pub store: String,
}
