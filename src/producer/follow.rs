// Streaming feed for the selected row
//
// A FollowFeed runs a long-lived command for one row and appends each output
// line to a bounded ring published into a target pane. Only one stream is
// active per feed; starting a new one stops the previous stream first.
//
// Stop is cooperative: the task checks a flag between lines and is woken by a
// Notify so a quiet stream still notices. `stop()` waits (bounded) for the
// task to report completion before the slot is reused.

use super::shell_command;
use crate::pane::{Binding, Content, ContentHandle, Pane, Siblings};
use crate::session::KeyHook;
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::Notify;

/// Lines kept from a stream
pub const RING_CAPACITY: usize = 1000;

/// Upper bound on waiting for a stream task to finish
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

struct Active {
    key: String,
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    done: mpsc::Receiver<()>,
}

pub struct FollowFeed {
    command: String,
    target: ContentHandle,
    runtime: Handle,
    active: Option<Active>,
}

impl FollowFeed {
    pub fn new(command: impl Into<String>, target: ContentHandle, runtime: Handle) -> Self {
        Self {
            command: command.into(),
            target,
            runtime,
            active: None,
        }
    }

    pub fn is_following(&self) -> bool {
        self.active.is_some()
    }

    /// Row currently being followed
    pub fn following(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.key.as_str())
    }

    /// Start streaming for `key`, replacing any running stream
    pub fn start(&mut self, key: &str) {
        self.stop();

        let stop = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let (done_tx, done) = mpsc::channel();

        self.target.set(format!("Following {}...", key));
        tracing::info!("Following {} with `{}`", key, self.command);

        // Merge stderr into the stream so errors show up in the pane
        let template = format!("exec 2>&1; {}", self.command);
        let target = self.target.clone();
        let task_stop = Arc::clone(&stop);
        let task_wake = Arc::clone(&wake);
        let arg = key.to_string();

        self.runtime.spawn(async move {
            stream_lines(&template, &arg, target, task_stop, task_wake).await;
            let _ = done_tx.send(());
        });

        self.active = Some(Active {
            key: key.to_string(),
            stop,
            wake,
            done,
        });
    }

    /// Signal the running stream and wait for it to finish
    pub fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.stop.store(true, Ordering::SeqCst);
        active.wake.notify_one();

        match active.done.recv_timeout(JOIN_TIMEOUT) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::debug!("Stopped following {}", active.key);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!("Stream for {} did not stop within {:?}", active.key, JOIN_TIMEOUT);
            }
        }
    }
}

impl Drop for FollowFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for FollowFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowFeed")
            .field("command", &self.command)
            .field("following", &self.following())
            .finish_non_exhaustive()
    }
}

async fn stream_lines(
    template: &str,
    arg: &str,
    target: ContentHandle,
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
) {
    let mut command = shell_command(template, Some(arg));
    command.stdout(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::error!("Failed to start stream `{}`: {}", template, e);
            target.set(format!("{} failed: {}", template, e));
            return;
        }
    };
    let Some(stdout) = child.stdout.take() else {
        return;
    };

    let mut lines = BufReader::new(stdout).lines();
    let mut ring: VecDeque<String> = VecDeque::with_capacity(RING_CAPACITY);

    while !stop.load(Ordering::SeqCst) {
        tokio::select! {
            _ = wake.notified() => {}
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if ring.len() == RING_CAPACITY {
                        ring.pop_front();
                    }
                    ring.push_back(line);
                    target.set(Content::Lines(ring.iter().cloned().collect()));
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Stream read failed: {}", e);
                    break;
                }
            },
        }
    }

    if let Err(e) = child.kill().await {
        tracing::trace!("Stream process already exited: {}", e);
    }
}

/// Toggles a FollowFeed with `f` while its source list pane is focused.
///
/// While following, bindings wrapped with [`FollowHook::guard`] are
/// suspended so they do not overwrite the stream.
#[derive(Debug)]
pub struct FollowHook {
    source: String,
    feed: FollowFeed,
    suspended: Arc<AtomicBool>,
}

impl FollowHook {
    pub fn new(source: impl Into<String>, feed: FollowFeed) -> Self {
        Self {
            source: source.into(),
            feed,
            suspended: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wrap a binding so it yields nothing while the feed is running
    pub fn guard(&self, binding: Binding) -> Binding {
        let suspended = Arc::clone(&self.suspended);
        let target = binding.target().to_string();
        Binding::new(target, move |selected| {
            if suspended.load(Ordering::SeqCst) {
                None
            } else {
                binding.apply(selected)
            }
        })
    }

    #[cfg(test)]
    pub fn feed(&self) -> &FollowFeed {
        &self.feed
    }
}

impl KeyHook for FollowHook {
    fn on_key(&mut self, key: &KeyEvent, focused: &Pane, _siblings: &Siblings) {
        if key.code != KeyCode::Char('f') || focused.name() != self.source {
            return;
        }
        if self.feed.is_following() {
            self.feed.stop();
            self.suspended.store(false, Ordering::SeqCst);
        } else if let Some(row) = focused.selected_content() {
            self.suspended.store(true, Ordering::SeqCst);
            self.feed.start(&row);
        }
    }

    fn shutdown(&mut self) {
        self.feed.stop();
    }
}
