//! Stdio Wire
//!
//! Connects a [`Node`] to the Maelstrom workbench: envelopes arrive as JSON lines on
//! stdin and leave as JSON lines on stdout. Logs must go to stderr.

use super::service::Node;
use super::types::Message;

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Runs until stdin closes.
pub async fn run_stdio(node: Arc<Node>, outbound: mpsc::UnboundedReceiver<Message>) -> Result<()> {
    let writer = tokio::spawn(write_loop(outbound));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Message>(&line) {
            Ok(msg) => {
                tracing::debug!("<- {} {} {}", msg.src, msg.body.kind, line);
                node.spawn_dispatch(msg);
            }
            Err(e) => {
                tracing::warn!("Failed to parse inbound line: {} ({})", e, line);
            }
        }
    }

    tracing::info!("Stdin closed, shutting down");
    writer.abort();

    Ok(())
}

async fn write_loop(mut outbound: mpsc::UnboundedReceiver<Message>) {
    let mut stdout = tokio::io::stdout();

    while let Some(msg) = outbound.recv().await {
        let mut line = match serde_json::to_vec(&msg) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to serialize message to {}: {}", msg.dest, e);
                continue;
            }
        };
        line.push(b'\n');

        if let Err(e) = stdout.write_all(&line).await {
            tracing::error!("Failed to write to stdout: {}", e);
            break;
        }
        if let Err(e) = stdout.flush().await {
            tracing::error!("Failed to flush stdout: {}", e);
            break;
        }
    }
}
