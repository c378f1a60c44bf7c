//! Pseudo-terminal command execution with sudo credential injection.
//!
//! Runs a shell command on a real PTY so that tools expecting an interactive
//! terminal (most notably `sudo`) behave the same way they would for a human
//! operator. When a sudo password is supplied the command is wrapped in a
//! small shell preamble that primes `sudo` non-interactively, keeps the
//! credential cache warm with a background refresher, and guarantees that
//! refresher is killed no matter how the wrapped command exits.
//!
//! The PTY merges stdout and stderr into a single byte stream — there is no
//! way to tell them apart once they have passed through the terminal layer.
//! Every chunk produced during normal execution is therefore labeled
//! [`StreamLabel::Stdout`]; [`StreamLabel::Stderr`] is reserved for the two
//! synthetic error chunks this module manufactures itself (a rejected sudo
//! password, or a failure to spawn the child at all).

mod sudo;

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

pub use sudo::wrap_with_sudo;

/// Size of each read performed against the PTY master, matching the ground
/// truth's non-blocking 4 KiB poll.
const CHUNK_SIZE: usize = 4096;
/// How long the auth phase waits for the sentinel prompt to appear.
const AUTH_TIMEOUT: Duration = Duration::from_secs(5);
/// How long the auth phase waits, after sending the password, for a
/// rejection to show up before assuming success.
const REJECTION_WINDOW: Duration = Duration::from_secs(1);
/// Text `sudo` prints on stdin-fed authentication failure.
const SUDO_REJECTION_TEXT: &str = "Sorry, try again.";
/// Prompt string substituted for the real sudo prompt so the runner can
/// reliably detect the credential-input point without guessing at locale or
/// hostname-dependent prompt text.
pub const SENTINEL_PROMPT: &str = "FLOWCORE_SUDO_SENTINEL::";

/// Errors that can occur while driving a command through the PTY.
#[derive(Debug, Error)]
pub enum PtyError {
    /// The pseudo-terminal itself could not be allocated.
    #[error("failed to open pseudo-terminal: {0}")]
    OpenPty(String),
    /// The child process failed to spawn.
    #[error("failed to spawn command: {0}")]
    Spawn(String),
    /// I/O error while reading from or writing to the PTY.
    #[error("I/O error communicating with child: {0}")]
    Io(#[from] std::io::Error),
}

/// Which merged stream a chunk of output is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamLabel {
    Stdout,
    Stderr,
}

/// A chunk of output produced while the command runs.
#[derive(Debug, Clone)]
pub struct OutputChunk {
    pub label: StreamLabel,
    pub text: String,
}

/// The final result of a PTY-driven command execution.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Run `command` on a pseudo-TTY, optionally injecting `sudo_password`.
///
/// Chunks are pushed to `chunk_tx` as they arrive so a caller can forward
/// them onto the event bus in real time; the full concatenated stdout and
/// stderr are also returned once the command completes. `cancel` is observed
/// at every suspension point: when it fires the child and its process group
/// receive SIGTERM.
pub async fn execute_in_pty(
    command: &str,
    sudo_password: Option<&str>,
    cancel: CancellationToken,
    chunk_tx: mpsc::Sender<OutputChunk>,
) -> Result<ExecutionOutcome, PtyError> {
    let script = match sudo_password {
        Some(_) => wrap_with_sudo(command),
        None => command.to_string(),
    };

    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize {
            rows: 40,
            cols: 160,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| PtyError::OpenPty(e.to_string()))?;

    let mut cmd = CommandBuilder::new("bash");
    cmd.arg("-c");
    cmd.arg(&script);

    let mut child = pair
        .slave
        .spawn_command(cmd)
        .map_err(|e| PtyError::Spawn(e.to_string()))?;
    drop(pair.slave);

    let killer = child.clone_killer();
    let mut reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| PtyError::OpenPty(e.to_string()))?;
    let mut writer = pair
        .master
        .take_writer()
        .map_err(|e| PtyError::OpenPty(e.to_string()))?;

    // The PTY reader is a blocking handle; pump it on a dedicated OS thread
    // and forward raw chunks to the async side over a channel.
    let (raw_tx, mut raw_rx) = mpsc::channel::<String>(64);
    let reader_handle = std::thread::spawn(move || {
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                    if raw_tx.blocking_send(text).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let cancel_for_killer = cancel.clone();
    let killer = Arc::new(parking_lot::Mutex::new(killer));
    let killer_for_cancel = killer.clone();
    let cancel_watch = tokio::spawn(async move {
        cancel_for_killer.cancelled().await;
        let _ = killer_for_cancel.lock().kill();
    });

    let mut stdout_acc = String::new();
    let mut stderr_acc = String::new();
    let has_password = sudo_password.is_some();
    let mut authenticated = !has_password;
    let mut pending_password = sudo_password.map(|p| format!("{p}\n"));
    let mut auth_buffer = String::new();

    // --- Auth phase: wait for the sentinel, send the password, then watch
    // for a rejection string before trusting the credential. ---
    if has_password {
        let seen_sentinel = loop {
            match timeout(AUTH_TIMEOUT, raw_rx.recv()).await {
                Ok(Some(chunk)) => {
                    auth_buffer.push_str(&chunk);
                    if auth_buffer.contains(SENTINEL_PROMPT) {
                        break true;
                    }
                }
                Ok(None) => break false,
                Err(_) => break false,
            }
        };

        if seen_sentinel {
            if let Some(pw) = pending_password.take() {
                let _ = writer.write_all(pw.as_bytes());
                let _ = writer.flush();
            }

            let rejected = loop {
                match timeout(REJECTION_WINDOW, raw_rx.recv()).await {
                    Ok(Some(chunk)) => {
                        auth_buffer.push_str(&chunk);
                        if auth_buffer.contains(SUDO_REJECTION_TEXT) {
                            break true;
                        }
                    }
                    Ok(None) => break false,
                    Err(_) => break false,
                }
            };

            if rejected {
                let _ = killer.lock().kill();
                cancel_watch.abort();
                let _ = reader_handle.join();
                let stderr = "\n[flow-toolkit] Incorrect sudo password.\n".to_string();
                let _ = chunk_tx
                    .send(OutputChunk {
                        label: StreamLabel::Stderr,
                        text: stderr.clone(),
                    })
                    .await;
                return Ok(ExecutionOutcome {
                    exit_code: 1,
                    stdout: filter_sentinel(&auth_buffer),
                    stderr,
                });
            }
        }

        authenticated = true;
        let forwardable = filter_sentinel(&auth_buffer);
        if !forwardable.is_empty() {
            stdout_acc.push_str(&forwardable);
            let _ = chunk_tx
                .send(OutputChunk {
                    label: StreamLabel::Stdout,
                    text: forwardable,
                })
                .await;
        }
    }
    let _ = authenticated;

    // --- Streaming phase: forward every subsequent chunk, minus any that
    // carry the sentinel, accumulating the full output. ---
    while let Some(chunk) = raw_rx.recv().await {
        if chunk.contains(SENTINEL_PROMPT) {
            continue;
        }
        stdout_acc.push_str(&chunk);
        if chunk_tx
            .send(OutputChunk {
                label: StreamLabel::Stdout,
                text: chunk,
            })
            .await
            .is_err()
        {
            break;
        }
    }

    let _ = reader_handle.join();
    cancel_watch.abort();

    let exit_code = match child.wait() {
        Ok(status) => status.exit_code() as i32,
        Err(e) => {
            let msg = format!("{e}");
            stderr_acc.push_str(&msg);
            let _ = chunk_tx
                .send(OutputChunk {
                    label: StreamLabel::Stderr,
                    text: msg,
                })
                .await;
            1
        }
    };

    Ok(ExecutionOutcome {
        exit_code,
        stdout: stdout_acc,
        stderr: stderr_acc,
    })
}

fn filter_sentinel(buffer: &str) -> String {
    buffer
        .lines()
        .filter(|line| !line.contains(SENTINEL_PROMPT))
        .collect::<Vec<_>>()
        .join("\n")
}
