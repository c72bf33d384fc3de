// Per-row command output with a time-to-live
//
// Lookups never block the control thread: a fresh entry is returned as is,
// anything else schedules at most one background refresh per key and returns
// the stale text (or a placeholder) in the meantime.

use super::{failure_line, run_capture};
use crate::pane::{Binding, Content};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

/// How long a cached entry is served without a refresh
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct Entry {
    text: String,
    fetched_at: Instant,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    in_flight: HashSet<String>,
}

#[derive(Debug)]
pub struct InfoCache {
    command: String,
    ttl: Duration,
    state: Arc<Mutex<State>>,
    runtime: Handle,
}

impl InfoCache {
    pub fn new(command: impl Into<String>, ttl: Duration, runtime: Handle) -> Self {
        Self {
            command: command.into(),
            ttl,
            state: Arc::new(Mutex::new(State::default())),
            runtime,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached text for `key`, refreshing in the background when stale
    pub fn lookup(&self, key: &str) -> Content {
        let mut state = self.lock();

        let cached = state.entries.get(key);
        if let Some(entry) = cached {
            if entry.fetched_at.elapsed() < self.ttl {
                return Content::Text(entry.text.clone());
            }
        }
        let fallback = cached
            .map(|entry| entry.text.clone())
            .unwrap_or_else(|| format!("Fetching {}...", key));

        if state.in_flight.insert(key.to_string()) {
            self.spawn_refresh(key.to_string());
        }
        Content::Text(fallback)
    }

    /// Keys with a refresh currently running
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    fn spawn_refresh(&self, key: String) {
        let command = self.command.clone();
        let state = Arc::clone(&self.state);
        tracing::trace!("Refreshing `{}` for {}", command, key);

        self.runtime.spawn(async move {
            let text = match run_capture(&command, Some(&key)).await {
                Ok(stdout) => stdout,
                Err(e) => {
                    tracing::debug!("Info command `{}` failed for {}: {:#}", command, key, e);
                    failure_line(&command, &e)
                }
            };

            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.in_flight.remove(&key);
            state.entries.insert(
                key,
                Entry {
                    text,
                    fetched_at: Instant::now(),
                },
            );
        });
    }

    /// Binding that shows the cached info for the selected row in `target`
    pub fn into_binding(self, target: impl Into<String>) -> Binding {
        Binding::new(target, move |selected| {
            selected.map(|row| self.lookup(row))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: Content) -> String {
        match content {
            Content::Text(text) => text,
            Content::Lines(lines) => lines.join("\n"),
        }
    }

    fn settle(cache: &InfoCache) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while cache.in_flight() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_miss_returns_placeholder_then_result() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let cache = InfoCache::new("echo info {}", DEFAULT_TTL, rt.handle().clone());

        assert_eq!(text(cache.lookup("/talker")), "Fetching /talker...");
        settle(&cache);
        assert_eq!(text(cache.lookup("/talker")), "info /talker\n");
        assert_eq!(cache.in_flight(), 0);
    }

    #[test]
    fn test_one_refresh_per_key() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let cache = InfoCache::new("sleep 0.3; echo {}", DEFAULT_TTL, rt.handle().clone());

        cache.lookup("a");
        cache.lookup("a");
        cache.lookup("a");
        assert_eq!(cache.in_flight(), 1);

        cache.lookup("b");
        assert_eq!(cache.in_flight(), 2);
        settle(&cache);
    }

    #[test]
    fn test_stale_entry_served_while_refreshing() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let cache = InfoCache::new("sleep 0.2; date +%N", Duration::ZERO, rt.handle().clone());

        cache.lookup("k");
        settle(&cache);
        let first = text(cache.lookup("k"));
        assert!(!first.starts_with("Fetching"));
        assert_eq!(cache.in_flight(), 1);
        settle(&cache);
    }

    #[test]
    fn test_failure_is_cached_as_placeholder() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let cache = InfoCache::new("exit 2", DEFAULT_TTL, rt.handle().clone());

        cache.lookup("x");
        settle(&cache);
        assert!(text(cache.lookup("x")).starts_with("exit 2 failed:"));
    }

    #[test]
    fn test_binding_ignores_empty_selection() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let binding =
            InfoCache::new("echo {}", DEFAULT_TTL, rt.handle().clone()).into_binding("info");

        assert_eq!(binding.target(), "info");
        assert_eq!(binding.apply(None), None);
        assert_eq!(
            binding.apply(Some("row")),
            Some(Content::from("Fetching row..."))
        );
    }
}
