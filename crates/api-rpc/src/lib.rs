//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server for Offload Job Engine: the submit
//! gateway, the polling read fallback, and the topic subscription push
//! channel (WebSocket).

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use server::RpcServer;
