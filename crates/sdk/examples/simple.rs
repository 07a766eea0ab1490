//! Simple SDK Example
//!
//! Submits a job, subscribes to its topic, and waits for the completion push.
//!
//! # Usage
//!
//! 1. Start the daemon (short work delay so the example finishes quickly):
//!    ```bash
//!    OFFLOAD_WORK_DELAY_MS=2000 cargo run --package offload-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package offload-sdk --example simple
//!    ```

use offload_sdk::{OffloadClient, OffloadSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Offload SDK - Simple Example");
    println!("============================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = OffloadClient::connect("http://127.0.0.1:9630")?;
    let subscriber = OffloadSubscriber::connect("ws://127.0.0.1:9630").await?;
    println!("   ok\n");

    // 2. Submit a job
    println!("2. Submitting a job...");
    let receipt = client.submit(1).await?;
    println!("   ok:");
    println!("     - messageId: {}", receipt.message_id);
    println!("     - topic: {}\n", receipt.topic);

    // 3. Poll once - the job cannot be done yet
    println!("3. Reading state right after submit...");
    let record = client.read(&receipt.message_id).await?;
    println!("   state = {}\n", record.state);

    // 4. Wait for the completion push (subscribe before the work finishes!)
    println!("4. Waiting for the completion notification...");
    let done = subscriber.wait_for_done(&receipt.topic).await?;
    println!("   pushed: messageId={} state={}\n", done.message_id, done.state);

    // 5. The store agrees with the push
    let final_record = client.read(&receipt.message_id).await?;
    println!("5. Final polled state = {}", final_record.state);

    println!("\nExample completed successfully");

    Ok(())
}
