//! `/ws/workflow` — subscribes the connecting client to every event the
//! event bus broadcasts for the lifetime of the socket.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use crate::state::AppState;

pub async fn workflow_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut rx = state.events.subscribe().await;
    let (mut sender, mut receiver) = socket.split();

    // The client never sends anything meaningful on this socket; draining its
    // frames just detects disconnect promptly instead of leaking the task.
    let drain = tokio::spawn(async move { while receiver.next().await.is_some() {} });

    while let Some(event) = rx.recv().await {
        let frame = serde_json::json!({"type": event_type(&event), "data": event.to_json()});
        let Ok(text) = serde_json::to_string(&frame) else { continue };
        if sender.send(Message::Text(text)).await.is_err() {
            break;
        }
    }

    drain.abort();
}

fn event_type(event: &flow_core::Event) -> &'static str {
    match event {
        flow_core::Event::NodeStatus { .. } => "node_status",
        flow_core::Event::NodeLog { .. } => "node_log",
        flow_core::Event::Interrupt { .. } => "interrupt",
    }
}
