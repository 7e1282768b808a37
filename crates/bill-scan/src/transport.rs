use async_trait::async_trait;
use bill_protocol::Notification;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};

use crate::error::{ScanError, ScanResult};
use crate::traits::Transport;

/// Hands notifications to an in-process receiver.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, message: &Notification) -> ScanResult<()> {
        self.tx
            .send(message.clone())
            .map_err(|_| ScanError::Transport("receiver dropped".into()))
    }
}

/// Writes each notification as one line of JSON.
pub struct WriterTransport<W> {
    writer: Mutex<W>,
}

impl<W> WriterTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Transport for WriterTransport<W> {
    async fn send(&self, message: &Notification) -> ScanResult<()> {
        let mut line = message
            .to_json()
            .map_err(|e| ScanError::Transport(e.to_string()))?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ScanError::Transport(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| ScanError::Transport(e.to_string()))
    }
}
