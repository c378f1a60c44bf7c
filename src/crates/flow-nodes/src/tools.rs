//! Tool implementations dispatched by name.
//!
//! Python's push-engine lets a tool-provider node drop a literal function
//! object into a sibling node's `output.implementation` field; `serde_json`
//! has no such carrier, so this system instead keeps one static dispatch
//! table here. A tool-provider node's `execute` advertises only the
//! serializable half of a capability (`{type, definition}`); the ReAct agent
//! grants itself permission to call `dispatch` by name once it has seen that
//! `TOOL_DEF` in its inputs, per `original_source/plugins/ReActAgent/backend/
//! tools.py`'s `TOOL_IMPLEMENTATIONS` registry.

use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const SHELL_TIMEOUT: Duration = Duration::from_secs(15);
const READ_FILE_LIMIT: usize = 2000;

/// Run `args` as a shell command under a 15s timeout, mirroring
/// `tools.py::_run_shell`'s `subprocess.run(..., timeout=15)`.
async fn run_shell(args: &str) -> String {
    let child = Command::new("sh").arg("-c").arg(args).output();
    match timeout(SHELL_TIMEOUT, child).await {
        Ok(Ok(output)) => {
            if output.status.success() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                format!("Error: {}", String::from_utf8_lossy(&output.stderr).trim())
            }
        }
        Ok(Err(e)) => format!("System Error: {e}"),
        Err(_) => "System Error: command timed out after 15 seconds".to_string(),
    }
}

/// Read up to 2 KiB of a file's contents, mirroring `tools.py::_read_file`.
fn read_file(args: &str) -> String {
    let path = args.trim();
    if !std::path::Path::new(path).exists() {
        return "File not found.".to_string();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => content.chars().take(READ_FILE_LIMIT).collect(),
        Err(e) => format!("System Error: {e}"),
    }
}

/// Dispatch a granted tool call by name. Returns a permission-denied message
/// for any name not in this table — the agent is expected to have already
/// filtered `action` against its granted capability set before calling this,
/// but the fallback keeps the function total.
pub async fn dispatch(name: &str, args: &str) -> String {
    match name {
        "run_shell" => run_shell(args).await,
        "read_file" => read_file(args),
        other => format!("Error: Permission Denied. Tool '{other}' is not connected."),
    }
}

/// Whether `name` names an implementation this table can actually dispatch.
pub fn is_known(name: &str) -> bool {
    matches!(name, "run_shell" | "read_file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_shell_captures_stdout() {
        let output = run_shell("echo hello").await;
        assert_eq!(output, "hello");
    }

    #[tokio::test]
    async fn run_shell_reports_nonzero_exit() {
        let output = run_shell("exit 1").await;
        assert!(output.starts_with("Error:"));
    }

    #[test]
    fn read_file_reports_missing_file() {
        assert_eq!(read_file("/no/such/path/for/flow-nodes-test"), "File not found.");
    }

    #[tokio::test]
    async fn dispatch_denies_unknown_tool() {
        let output = dispatch("delete_everything", "").await;
        assert!(output.contains("Permission Denied"));
    }

    #[test]
    fn is_known_matches_registered_tools() {
        assert!(is_known("run_shell"));
        assert!(is_known("read_file"));
        assert!(!is_known("anything_else"));
    }
}
