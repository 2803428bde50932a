use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::types::{ChangeEvent, Topic};

const CHANNEL_CAPACITY: usize = 64;

/// Handle to a running change feed.
///
/// A background task owns the broadcast receiver, keeps the events that
/// match the topic and forwards them in order. Dropping the handle stops
/// the task.
pub struct Subscription {
    topic: Topic,
    events: mpsc::Receiver<ChangeEvent>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut source: broadcast::Receiver<ChangeEvent>, topic: Topic) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let filter = topic.clone();
        let task = tokio::spawn(async move {
            loop {
                match source.recv().await {
                    Ok(event) if filter.matches(&event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Rows are full snapshots, the next one resynchronises
                        tracing::warn!(skipped, topic = ?filter, "subscription lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Subscription {
            topic,
            events: rx,
            task,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Next matching event; `None` once the source is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
