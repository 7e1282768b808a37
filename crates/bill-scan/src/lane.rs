use std::sync::Arc;

use bill_protocol::Notification;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::{ScanError, ScanResult};
use crate::traits::Transport;

enum LaneMessage {
    Deliver(Notification),
    Flush(oneshot::Sender<()>),
}

/// Single ordering point in front of the transport.
///
/// One task owns the transport and delivers messages strictly in enqueue
/// order. Enqueueing never blocks, so callers may enqueue while holding a
/// synchronous lock, which is how related messages are kept adjacent.
pub struct OrderingLane {
    tx: mpsc::UnboundedSender<LaneMessage>,
    worker: JoinHandle<()>,
}

impl OrderingLane {
    /// Spawn the delivery task. Must be called within a Tokio runtime.
    pub fn spawn(transport: Arc<dyn Transport>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LaneMessage>();
        let worker = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    LaneMessage::Deliver(notification) => {
                        if let Err(e) = transport.send(&notification).await {
                            warn!(serial = notification.serial(), error = %e, "notification not delivered");
                        }
                    }
                    LaneMessage::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });
        Self { tx, worker }
    }

    pub fn enqueue(&self, notification: Notification) -> ScanResult<()> {
        self.tx
            .send(LaneMessage::Deliver(notification))
            .map_err(|_| ScanError::LaneClosed)
    }

    /// Wait until everything enqueued so far has been handed to the transport.
    pub async fn flush(&self) -> ScanResult<()> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(LaneMessage::Flush(ack))
            .map_err(|_| ScanError::LaneClosed)?;
        done.await.map_err(|_| ScanError::LaneClosed)
    }
}

impl Drop for OrderingLane {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
