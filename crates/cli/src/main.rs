//! Offload CLI - Command-line interface for the Offload Job Engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use offload_sdk::{OffloadClient, OffloadSubscriber};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "offload")]
#[command(about = "Offload Job Engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "OFFLOAD_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new job
    Submit {
        /// Job type (positive integer)
        #[arg(short = 't', long, default_value = "1")]
        job_type: i64,
    },

    /// Read a job's current state (polling fallback)
    Read {
        /// Message ID returned by submit
        message_id: String,
    },

    /// Subscribe to a topic and print the first notification
    Watch {
        /// Topic returned by submit
        topic: String,
    },
}

/// The subscription endpoint lives on the same listener, spoken over WebSocket.
fn ws_url(rpc_url: &str) -> String {
    if let Some(rest) = rpc_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if let Some(rest) = rpc_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else {
        rpc_url.to_string()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit { job_type } => {
            let client =
                OffloadClient::connect(&cli.rpc_url).context("Failed to connect to daemon")?;
            let receipt = client.submit(job_type).await?;

            println!("{}", "Job submitted".green().bold());
            println!("  messageId: {}", receipt.message_id);
            println!("  topic:     {}", receipt.topic);
        }

        Commands::Read { message_id } => {
            let client =
                OffloadClient::connect(&cli.rpc_url).context("Failed to connect to daemon")?;
            let record = client.read(&message_id).await?;

            let state = match record.state.as_str() {
                "done" => record.state.green(),
                "failed" => record.state.red(),
                _ => record.state.yellow(),
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
            println!("state: {}", state);
        }

        Commands::Watch { topic } => {
            let subscriber = OffloadSubscriber::connect(ws_url(&cli.rpc_url))
                .await
                .context("Failed to connect to daemon")?;

            eprintln!("Watching topic {} ...", topic);
            let record = subscriber.wait_for_done(&topic).await?;

            println!("{}", serde_json::to_string_pretty(&record)?);
            if record.state == "done" {
                println!("{}", "Job completed".green().bold());
            } else {
                println!("{}", format!("Job ended: {}", record.state).red().bold());
            }
        }
    }

    Ok(())
}
