//! SDK Request/Response Types
//!
//! Mirrors the wire types from the api-rpc crate.

use serde::{Deserialize, Serialize};

/// Response from a job submission
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub topic: String,
    pub success: bool,
}

/// A job's persisted state record, as returned by reads and pushed to
/// subscribers: `{"messageId", "type", "state"}` with state one of
/// `"requested"`, `"in_progress"`, `"done"`, `"failed"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(rename = "messageId")]
    pub message_id: String,

    #[serde(rename = "type")]
    pub job_type: i64,

    pub state: String,
}
