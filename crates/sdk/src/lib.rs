//! Offload SDK - Rust Client Library
//!
//! Provides a convenient client for interacting with the Offload Job Engine
//! daemon: submit and read over HTTP, push notifications over WebSocket.
//!
//! # Example
//!
//! ```no_run
//! use offload_sdk::{OffloadClient, OffloadSubscriber};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Submit a job
//!     let client = OffloadClient::connect("http://127.0.0.1:9630")?;
//!     let receipt = client.submit(1).await?;
//!     println!("Job submitted: {}", receipt.message_id);
//!
//!     // Wait for the completion push on the job's topic
//!     let subscriber = OffloadSubscriber::connect("ws://127.0.0.1:9630").await?;
//!     let record = subscriber.wait_for_done(&receipt.topic).await?;
//!     println!("Job finished: {}", record.state);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{OffloadClient, OffloadSubscriber};
pub use error::{Result, SdkError};
pub use types::{StateRecord, SubmitResponse};
