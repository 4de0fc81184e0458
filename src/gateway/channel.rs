//! Channel-backed command sink and the JSON-lines command writer.

use super::error::GatewayError;
use super::types::Command;
use super::Gateway;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Gateway sink that forwards commands over an unbounded channel.
///
/// Unbounded so that `send` never waits on the consumer.
pub struct ChannelGateway {
    tx: mpsc::UnboundedSender<Command>,
}

impl ChannelGateway {
    /// Wrap the sending half of a command channel.
    pub fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }
}

impl Gateway for ChannelGateway {
    fn send(&mut self, command: Command) {
        let order_id = command.order_id();
        if self.tx.send(command).is_err() {
            warn!(order_id, "Command channel closed, command dropped");
        }
    }
}

/// Drain a command channel, writing each command as one JSON line.
///
/// Returns the number of commands written once the channel closes.
pub async fn write_commands<W>(
    mut rx: mpsc::UnboundedReceiver<Command>,
    mut writer: W,
) -> Result<u64, GatewayError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;

    while let Some(command) = rx.recv().await {
        let mut line = serde_json::to_vec(&command).map_err(GatewayError::Encode)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        written += 1;
    }

    debug!(written, "Command channel drained");
    Ok(written)
}
