//! Events streamed from a running agent.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

/// Node that produced an event.
pub const MODEL_NODE: &str = "model";
pub const TOOLS_NODE: &str = "tools";

/// One unit of the agent's output stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// A token-level chunk of a model reply, or a tool result.
    Message { node: String, content: String },
    /// State produced by a finished step, keyed by the node that ran it.
    Update { node: String, update: Value },
    /// Payload emitted by a tool while it runs.
    Custom(Value),
}

impl AgentEvent {
    /// Stream the event belongs to.
    pub fn mode(&self) -> &'static str {
        match self {
            AgentEvent::Message { .. } => "messages",
            AgentEvent::Update { .. } => "updates",
            AgentEvent::Custom(_) => "custom",
        }
    }
}

/// Sending half of an event stream.
#[derive(Debug, Clone)]
pub struct EventWriter {
    tx: mpsc::Sender<AgentEvent>,
}

/// Create a bounded event stream.
pub fn event_channel(capacity: usize) -> (EventWriter, mpsc::Receiver<AgentEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventWriter { tx }, rx)
}

impl EventWriter {
    pub fn new(tx: mpsc::Sender<AgentEvent>) -> Self {
        Self { tx }
    }

    /// Send an event. A dropped receiver is not an error; the run continues.
    pub async fn send(&self, event: AgentEvent) {
        if self.tx.send(event).await.is_err() {
            trace!("Event receiver dropped");
        }
    }

    pub async fn message(&self, node: &str, content: impl Into<String>) {
        self.send(AgentEvent::Message {
            node: node.to_string(),
            content: content.into(),
        })
        .await;
    }

    pub async fn update(&self, node: &str, update: Value) {
        self.send(AgentEvent::Update {
            node: node.to_string(),
            update,
        })
        .await;
    }

    pub async fn custom(&self, payload: Value) {
        self.send(AgentEvent::Custom(payload)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (writer, mut rx) = event_channel(8);
        writer.message(MODEL_NODE, "Hel").await;
        writer.update(TOOLS_NODE, json!({"ok": true})).await;
        writer.custom(json!({"status": "started"})).await;
        drop(writer);

        let modes: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.mode())
            .collect();
        assert_eq!(modes, vec!["messages", "updates", "custom"]);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_ignored() {
        let (writer, rx) = event_channel(1);
        drop(rx);
        writer.message(MODEL_NODE, "nobody listens").await;
    }
}
