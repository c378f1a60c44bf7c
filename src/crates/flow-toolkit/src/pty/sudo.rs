//! Builds the shell preamble that primes `sudo`, keeps its credential cache
//! warm in the background, and guarantees the refresher never outlives the
//! command it was spawned for.

use super::SENTINEL_PROMPT;

/// Seconds between background `sudo -n -v` credential refreshes.
const REFRESH_INTERVAL_SECS: u64 = 50;

/// Wrap `command` so that, when run on a PTY fed the sudo password on stdin,
/// it primes sudo non-interactively, refreshes the credential cache every
/// [`REFRESH_INTERVAL_SECS`] seconds in the background, and kills that
/// refresher via a `trap` on shell exit no matter how the command itself
/// terminates.
///
/// The user's command is quoted as a single shell word before being handed
/// to `eval`, so it is reconstituted exactly rather than re-split on
/// whitespace.
pub fn wrap_with_sudo(command: &str) -> String {
    let quoted = shell_words::quote(command);
    format!(
        "sudo -S -k -p \"{sentinel}\" -v\n\
         ( while true; do sudo -n -v 2>/dev/null; sleep {interval}; done ) &\n\
         __FLOWCORE_REFRESHER_PID=$!\n\
         trap \"kill $__FLOWCORE_REFRESHER_PID 2>/dev/null\" EXIT\n\
         eval {quoted}\n\
         __FLOWCORE_EXIT_CODE=$?\n\
         exit $__FLOWCORE_EXIT_CODE\n",
        sentinel = SENTINEL_PROMPT,
        interval = REFRESH_INTERVAL_SECS,
        quoted = quoted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_with_sentinel_and_refresher() {
        let script = wrap_with_sudo("apt-get update");
        assert!(script.contains(SENTINEL_PROMPT));
        assert!(script.contains("sudo -n -v"));
        assert!(script.contains("trap"));
        assert!(script.contains("eval"));
        assert!(script.contains("apt-get update"));
    }

    #[test]
    fn quotes_command_with_embedded_quotes() {
        let script = wrap_with_sudo("echo 'hello world'");
        assert!(script.contains("eval"));
        // shell_words quoting must not leave the inner quotes unescaped
        // such that eval would re-split the command.
        assert!(script.contains("hello world"));
    }

    #[test]
    fn refresher_is_killed_via_trap_on_exit() {
        let script = wrap_with_sudo("true");
        assert!(script.contains("trap \"kill $__FLOWCORE_REFRESHER_PID 2>/dev/null\" EXIT"));
    }
}
