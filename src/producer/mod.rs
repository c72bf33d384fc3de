// Producers - background tasks that feed pane content
//
// Producers run on the tokio runtime and only ever touch panes through
// `ContentHandle`s, never the Session. Three shapes exist:
// - Poller: re-runs a command on an interval and replaces a pane's content
// - InfoCache: per-row command output with a TTL, used as a binding transform
// - FollowFeed: streams a long-running command's output into a pane

pub mod cache;
pub mod follow;

pub use cache::InfoCache;
pub use follow::{FollowFeed, FollowHook};

use crate::pane::{Content, ContentHandle};
use anyhow::{bail, Context, Result};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Default interval between poller runs
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Expand `{}` in a command template to the quoted first positional argument
pub fn expand_template(template: &str) -> String {
    template.replace("{}", "\"$1\"")
}

/// Build a `sh -c` command; `arg` is passed as `$1` so row text is never
/// interpolated into the script itself
pub fn shell_command(template: &str, arg: Option<&str>) -> Command {
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(expand_template(template))
        .arg("paneboard")
        .arg(arg.unwrap_or_default())
        .stdin(Stdio::null())
        .kill_on_drop(true);
    command
}

/// Run a command template to completion and return its stdout
pub async fn run_capture(template: &str, arg: Option<&str>) -> Result<String> {
    let output = shell_command(template, arg)
        .output()
        .await
        .with_context(|| format!("Failed to spawn `{}`", template))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            bail!("exited with {}", output.status);
        }
        bail!("exited with {}: {}", output.status, stderr);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Placeholder shown in a pane when its command fails
pub fn failure_line(template: &str, error: &anyhow::Error) -> String {
    format!("{} failed: {:#}", template, error)
}

/// Spawn a task that runs `command` every `interval` and publishes its output
/// to `target` until `running` clears.
pub fn spawn_poller(
    runtime: &Handle,
    command: String,
    interval: Duration,
    target: ContentHandle,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::debug!("Poller started for `{}` every {:?}", command, interval);

        loop {
            ticker.tick().await;
            if !running.load(Ordering::SeqCst) {
                break;
            }
            let content = match run_capture(&command, None).await {
                Ok(stdout) => Content::Text(stdout),
                Err(e) => {
                    tracing::warn!("Poller command `{}` failed: {:#}", command, e);
                    Content::Text(failure_line(&command, &e))
                }
            };
            target.set(content);
        }

        tracing::debug!("Poller for `{}` stopped", command);
    })
}
