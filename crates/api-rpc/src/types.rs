//! RPC Request/Response Types
//!
//! Field names follow the external wire contract (`messageId`, `type`).

use serde::{Deserialize, Serialize};

/// job.submit.v1 - Submit a job
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "type")]
    pub job_type: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub topic: String,
    pub success: bool,
}

/// job.read.v1 - Poll the current state record
#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    #[serde(rename = "messageId")]
    pub message_id: String,
}

// The read response is the StateRecord itself: {"messageId", "type", "state"}.

/// job.subscribe.v1 - Open a push subscription on a topic
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub topic: String,
}
