// Demo mode: a self-contained dashboard that needs no configuration
//
// Shows every pane feature with synthetic data:
// - "services": list pane refreshed by a background task
// - "load": text pane with a ticking load readout
// - "help": text pane fed by its own content source
// - "detail": right-hand pane driven by the services selection; press `f`
//   on a service to stream a fake log instead
//
// Run with: paneboard --demo

use crate::pane::{Binding, Content, ContentHandle, ContentSource, Pane, Side};
use crate::producer::{FollowFeed, FollowHook};
use crate::session::Session;
use anyhow::Result;
use chrono::Local;
use ratatui::backend::Backend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::sleep;

const SERVICES: &[&str] = &[
    "api-gateway",
    "auth",
    "billing",
    "catalog",
    "checkout",
    "inventory",
    "mailer",
    "notifications",
    "orders",
    "payments",
    "recommendations",
    "search",
    "sessions",
    "shipping",
    "thumbnails",
    "users",
];

const STATES: &[&str] = &["running", "running", "running", "degraded", "restarting"];

/// Cheap varying number from the clock; enough for fake readings
fn jitter(seed: usize) -> usize {
    let nanos = Local::now().timestamp_subsec_nanos() as usize;
    (nanos / 1000 + seed * 7919) % 100
}

/// One-shot help text published on the first run
struct HelpSource {
    shown: bool,
}

impl ContentSource for HelpSource {
    fn produce_content(&mut self) -> Option<Content> {
        if self.shown {
            return None;
        }
        self.shown = true;
        Some(Content::Lines(vec![
            "Left/Right  move focus".to_string(),
            "Up/Down j/k move selection".to_string(),
            "f           follow selected service".to_string(),
            "q Ctrl-C    quit".to_string(),
        ]))
    }
}

/// Detail text for a service row
fn describe(service: &str) -> String {
    let seed = service.len();
    let state = STATES[jitter(seed) % STATES.len()];
    format!(
        "service: {}\nstate:   {}\nreplicas: {}\nlatency: {} ms\nchecked: {}",
        service,
        state,
        1 + seed % 4,
        10 + jitter(seed),
        Local::now().format("%H:%M:%S")
    )
}

async fn feed_services(target: ContentHandle, running: Arc<AtomicBool>) {
    while running.load(Ordering::SeqCst) {
        let rows: Vec<String> = SERVICES.iter().map(|s| s.to_string()).collect();
        target.set(rows);
        sleep(Duration::from_secs(2)).await;
    }
}

async fn feed_load(target: ContentHandle, running: Arc<AtomicBool>) {
    let mut samples: Vec<usize> = Vec::new();
    while running.load(Ordering::SeqCst) {
        samples.push(jitter(samples.len()));
        if samples.len() > 20 {
            samples.remove(0);
        }
        let bars: String = samples
            .iter()
            .map(|v| match v {
                0..=24 => '▁',
                25..=49 => '▃',
                50..=74 => '▅',
                _ => '▇',
            })
            .collect();
        let latest = samples.last().copied().unwrap_or_default();
        target.set(format!(
            "{}\ncpu {:>3}%\n{}",
            Local::now().format("%H:%M:%S"),
            latest,
            bars
        ));
        sleep(Duration::from_millis(500)).await;
    }
}

/// Register the demo panes, producers and hooks
pub fn install<B: Backend>(session: &mut Session<B>, runtime: &Handle) -> Result<()> {
    let detail = Pane::text("detail", Side::Right);
    let feed = FollowFeed::new(
        "i=0; while true; do i=$((i+1)); echo \"$(date +%T) {} request $i ok\"; sleep 0.5; done",
        detail.content_handle(),
        runtime.clone(),
    );
    let follow = FollowHook::new("services", feed);
    let binding = follow.guard(Binding::new("detail", |selected| {
        selected.map(|service| Content::from(describe(service)))
    }));

    let services = Pane::list("services", Side::Left, vec![binding]);
    let load = Pane::text("load", Side::Left);
    let help = Pane::text("help", Side::Left).with_source(HelpSource { shown: false });

    runtime.spawn(feed_services(services.content_handle(), session.stop_handle()));
    runtime.spawn(feed_load(load.content_handle(), session.stop_handle()));

    session.add_hook(Box::new(follow));
    session.add_pane(services)?;
    session.add_pane(load)?;
    session.add_pane(help)?;
    session.add_pane(detail)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::input::ScriptedInput;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_help_source_publishes_once() {
        let mut source = HelpSource { shown: false };
        assert!(source.produce_content().is_some());
        assert!(source.produce_content().is_none());
    }

    #[test]
    fn test_describe_names_service() {
        let text = describe("billing");
        assert!(text.starts_with("service: billing\n"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_demo_dashboard_drives_detail() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let keys = vec![None, Some(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE))];
        let mut session = Session::new(
            Terminal::new(TestBackend::new(100, 30)).unwrap(),
            Box::new(ScriptedInput::new(keys)),
            Duration::from_millis(1),
            Arc::new(AtomicBool::new(true)),
        )
        .unwrap();

        install(&mut session, rt.handle()).unwrap();
        assert_eq!(
            session.pane_names().collect::<Vec<_>>(),
            vec!["services", "load", "help", "detail"]
        );
        assert_eq!(session.pane("help").unwrap().content().map(|c| c.into_lines().len()), Some(4));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while session.pane("services").unwrap().content().is_none()
            && std::time::Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(10));
        }
        session.cycle().unwrap();
        session.cycle().unwrap();

        let detail = session.pane("detail").unwrap().visible_lines();
        assert_eq!(detail.first().map(String::as_str), Some("service: auth"));
        session.stop();
    }
}
