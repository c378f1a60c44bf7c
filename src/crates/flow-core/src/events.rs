//! Non-blocking fan-out of run events to currently connected subscribers.
//!
//! Every event is decorated with its originating `thread_id` before
//! broadcast. Delivery is best-effort: each subscriber has a bounded channel
//! and a full or closed channel is dropped silently rather than stalling the
//! emitting task, matching §4.F's explicit non-blocking requirement.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// A node's lifecycle status as reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventNodeStatus {
    Running,
    Completed,
    Failed,
    Skipped,
    Cancelled,
    Resuming,
    Restarting,
}

/// Which merged stream a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// One event emitted onto the bus, always tagged with the run it belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Event {
    #[serde(rename = "node_status")]
    NodeStatus {
        thread_id: String,
        node_id: String,
        status: EventNodeStatus,
    },
    #[serde(rename = "node_log")]
    NodeLog {
        thread_id: String,
        node_id: String,
        log: String,
        #[serde(rename = "type")]
        stream: LogStream,
    },
    #[serde(rename = "interrupt")]
    Interrupt {
        thread_id: String,
        node_id: String,
        reason: String,
    },
}

impl Event {
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

type Subscriber = mpsc::Sender<Event>;

/// Broadcast hub. Callers share one instance behind an `Arc` across the HTTP
/// surface and every active run's executor.
pub struct EventBus {
    capacity: usize,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a new subscriber, returning the receiving half of its
    /// channel. The channel capacity is fixed at bus-construction time so a
    /// single slow subscriber can never grow unboundedly.
    pub async fn subscribe(&self) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers.write().await.push(tx);
        rx
    }

    async fn broadcast(&self, event: Event) {
        let subscribers = self.subscribers.read().await;
        for sub in subscribers.iter() {
            if sub.try_send(event.clone()).is_err() {
                debug!("dropping event for a full or closed subscriber channel");
            }
        }
    }

    /// Drop subscribers whose receiver has gone away. Called periodically by
    /// the surface layer rather than on every broadcast, since a copy of the
    /// subscriber list is taken under a read lock during broadcast.
    pub async fn prune_closed(&self) {
        self.subscribers.write().await.retain(|s| !s.is_closed());
    }

    pub async fn emit_node_status(&self, thread_id: &str, node_id: &str, status: EventNodeStatus) {
        self.broadcast(Event::NodeStatus {
            thread_id: thread_id.to_string(),
            node_id: node_id.to_string(),
            status,
        })
        .await;
    }

    pub async fn emit_node_log(&self, thread_id: &str, node_id: &str, log: String, is_stderr: bool) {
        self.broadcast(Event::NodeLog {
            thread_id: thread_id.to_string(),
            node_id: node_id.to_string(),
            log,
            stream: if is_stderr { LogStream::Stderr } else { LogStream::Stdout },
        })
        .await;
    }

    pub async fn emit_interrupt(&self, thread_id: &str, node_id: &str, reason: impl Into<String>) {
        self.broadcast(Event::Interrupt {
            thread_id: thread_id.to_string(),
            node_id: node_id.to_string(),
            reason: reason.into(),
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_broadcast_status() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe().await;
        bus.emit_node_status("t1", "start", EventNodeStatus::Running).await;
        let event = rx.recv().await.unwrap();
        match event {
            Event::NodeStatus { thread_id, node_id, status } => {
                assert_eq!(thread_id, "t1");
                assert_eq!(node_id, "start");
                assert_eq!(status, EventNodeStatus::Running);
            }
            _ => panic!("wrong event variant"),
        }
    }

    #[tokio::test]
    async fn closed_subscriber_is_pruned() {
        let bus = EventBus::new(8);
        {
            let _rx = bus.subscribe().await;
        }
        bus.prune_closed().await;
        assert_eq!(bus.subscribers.read().await.len(), 0);
    }
}
