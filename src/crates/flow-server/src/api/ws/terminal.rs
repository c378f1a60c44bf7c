//! `/ws/terminal` — an interactive PTY session multiplexed over a
//! WebSocket, independent of [`flow_toolkit::pty::execute_in_pty`]'s
//! single-shot command runner: a human is on the other end of this socket,
//! so sudo (when the `?sudo=true` query flag is set) is authenticated by the
//! operator typing their password into the terminal themselves rather than
//! through the sentinel handshake the non-interactive runner uses.

use std::io::{Read, Write};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TerminalQuery {
    #[serde(default)]
    pub sudo: bool,
}

/// Client control frame carried as WebSocket text; raw `Message::Binary`
/// frames are keystrokes and need no envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientFrame {
    Input { data: String },
    Resize { cols: u16, rows: u16 },
}

pub async fn terminal_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<TerminalQuery>,
    State(_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, query.sudo))
}

async fn handle_socket(socket: WebSocket, sudo: bool) {
    let pty_system = native_pty_system();
    let pair = match pty_system.openpty(PtySize { rows: 40, cols: 160, pixel_width: 0, pixel_height: 0 }) {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(%err, "failed to open terminal pty");
            return;
        }
    };

    let mut cmd = CommandBuilder::new("bash");
    if sudo {
        cmd = CommandBuilder::new("sudo");
        cmd.arg("-i");
    }

    let mut child = match pair.slave.spawn_command(cmd) {
        Ok(child) => child,
        Err(err) => {
            tracing::error!(%err, "failed to spawn terminal shell");
            return;
        }
    };
    drop(pair.slave);
    let mut killer = child.clone_killer();

    let Ok(mut reader) = pair.master.try_clone_reader() else { return };
    let Ok(mut writer) = pair.master.take_writer() else { return };
    let master = pair.master;

    let (chunk_tx, mut chunk_rx) = mpsc::channel::<Vec<u8>>(64);
    let reader_handle = std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if chunk_tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            chunk = chunk_rx.recv() => {
                match chunk {
                    Some(bytes) => {
                        if sender.send(Message::Binary(bytes)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            client_msg = receiver.next() => {
                match client_msg {
                    Some(Ok(Message::Binary(bytes))) => {
                        if writer.write_all(&bytes).is_err() {
                            break;
                        }
                        let _ = writer.flush();
                    }
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(frame) = serde_json::from_str::<ClientFrame>(&text) {
                            match frame {
                                ClientFrame::Input { data } => {
                                    if writer.write_all(data.as_bytes()).is_err() {
                                        break;
                                    }
                                    let _ = writer.flush();
                                }
                                ClientFrame::Resize { cols, rows } => {
                                    let _ = master.resize(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 });
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    drop(writer);
    let _ = killer.kill();
    let _ = child.wait();
    let _ = reader_handle.join();
}
