// Dashboard assembly - turns configuration into registered panes
//
// Panes are created first so every binding can resolve its target's content
// handle, whatever order the panes were declared in. Producers (pollers,
// caches, follow feeds) are started on the tokio runtime and stop with the
// session's running flag.

use crate::config::{Config, PaneConfig, PaneKindConfig};
use crate::demo;
use crate::logging::{spawn_log_feed, LogBuffer};
use crate::pane::{Binding, ContentHandle, Pane, Side};
use crate::producer::{self, cache, FollowFeed, FollowHook, InfoCache};
use crate::session::Session;
use anyhow::{bail, Context, Result};
use ratatui::backend::Backend;
use std::collections::HashMap;
use tokio::runtime::Handle;

/// Name of the pane showing captured logs
pub const LOGS_PANE: &str = "logs";

/// Register panes, bindings, producers and hooks described by `config`
pub fn build<B: Backend>(
    session: &mut Session<B>,
    config: &Config,
    runtime: &Handle,
    logs: &LogBuffer,
) -> Result<()> {
    if config.runs_demo() {
        tracing::info!("No panes configured or demo requested, starting demo dashboard");
        demo::install(session, runtime)?;
    } else {
        install_configured(session, &config.panes, runtime)?;
    }

    if config.logging.pane {
        let pane = Pane::tailing_text(LOGS_PANE, Side::Right);
        spawn_log_feed(
            runtime,
            logs.clone(),
            pane.content_handle(),
            config.tick,
            session.stop_handle(),
        );
        session
            .add_pane(pane)
            .context("The logs pane needs the name \"logs\"")?;
    }
    Ok(())
}

fn create_pane(config: &PaneConfig) -> Pane {
    match config.kind {
        PaneKindConfig::List => Pane::list(&config.name, config.side, Vec::new()),
        PaneKindConfig::Text if config.tail => Pane::tailing_text(&config.name, config.side),
        PaneKindConfig::Text => Pane::text(&config.name, config.side),
    }
}

fn install_configured<B: Backend>(
    session: &mut Session<B>,
    configs: &[PaneConfig],
    runtime: &Handle,
) -> Result<()> {
    let mut panes: Vec<Pane> = configs.iter().map(create_pane).collect();
    let handles: HashMap<String, ContentHandle> = panes
        .iter()
        .map(|pane| (pane.name().to_string(), pane.content_handle()))
        .collect();

    for (config, pane) in configs.iter().zip(panes.iter_mut()) {
        for binding_config in &config.bindings {
            let Some(target) = handles.get(&binding_config.target) else {
                bail!(
                    "Pane {} has a binding to unknown pane {}",
                    config.name,
                    binding_config.target
                );
            };

            let mut binding: Option<Binding> = binding_config.command.as_ref().map(|command| {
                InfoCache::new(
                    command.clone(),
                    binding_config.ttl().unwrap_or(cache::DEFAULT_TTL),
                    runtime.clone(),
                )
                .into_binding(&binding_config.target)
            });

            if let Some(follow) = &binding_config.follow {
                let feed = FollowFeed::new(follow.clone(), target.clone(), runtime.clone());
                let hook = FollowHook::new(&config.name, feed);
                binding = binding.map(|b| hook.guard(b));
                session.add_hook(Box::new(hook));
            }

            if let Some(binding) = binding {
                if !pane.add_binding(binding) {
                    bail!("Pane {} cannot have bindings", config.name);
                }
            }
        }

        if let Some(command) = &config.command {
            producer::spawn_poller(
                runtime,
                command.clone(),
                config.interval().unwrap_or(producer::DEFAULT_POLL_INTERVAL),
                pane.content_handle(),
                session.stop_handle(),
            );
        }
    }

    for pane in panes {
        session.add_pane(pane)?;
    }
    tracing::info!("Dashboard ready with {} configured panes", configs.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BindingConfig, PaneConfig};
    use crate::pane::Content;
    use crate::session::input::ScriptedInput;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn session() -> Session<TestBackend> {
        Session::new(
            Terminal::new(TestBackend::new(90, 30)).unwrap(),
            Box::new(ScriptedInput::new(Vec::new())),
            Duration::from_millis(1),
            Arc::new(AtomicBool::new(true)),
        )
        .unwrap()
    }

    fn pane(name: &str, side: Side, kind: PaneKindConfig) -> PaneConfig {
        PaneConfig {
            name: name.to_string(),
            side,
            kind,
            command: None,
            interval_ms: None,
            tail: false,
            bindings: Vec::new(),
        }
    }

    fn cycle_until<F>(session: &mut Session<TestBackend>, condition: F) -> bool
    where
        F: Fn(&Session<TestBackend>) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            session.cycle().unwrap();
            if condition(session) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_configured_panes_poll_and_bind() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut topics = pane("topics", Side::Left, PaneKindConfig::List);
        topics.command = Some("printf 'alpha\\nbeta\\n'".to_string());
        topics.interval_ms = Some(50);
        // The target is declared after its source
        topics.bindings.push(BindingConfig {
            target: "info".to_string(),
            command: Some("echo about {}".to_string()),
            ttl_ms: None,
            follow: None,
        });
        let config = Config {
            panes: vec![topics, pane("info", Side::Right, PaneKindConfig::Text)],
            ..Config::default()
        };

        let mut s = session();
        build(&mut s, &config, rt.handle(), &LogBuffer::new()).unwrap();
        assert_eq!(s.pane_names().collect::<Vec<_>>(), vec!["topics", "info"]);

        assert!(cycle_until(&mut s, |s| {
            s.pane("info").unwrap().content() == Some(Content::from("about alpha\n"))
        }));
        assert_eq!(
            s.pane("topics").unwrap().visible_lines(),
            vec!["alpha", "beta"]
        );
        s.stop();
    }

    #[test]
    fn test_logs_pane_added_on_request() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut config = Config {
            panes: vec![pane("only", Side::Left, PaneKindConfig::Text)],
            ..Config::default()
        };
        config.logging.pane = true;

        let mut s = session();
        build(&mut s, &config, rt.handle(), &LogBuffer::new()).unwrap();
        assert_eq!(s.pane_names().collect::<Vec<_>>(), vec!["only", LOGS_PANE]);
        assert_eq!(s.pane(LOGS_PANE).unwrap().side(), Side::Right);
        s.stop();
    }

    #[test]
    fn test_logs_pane_name_clash_is_an_error() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut config = Config {
            panes: vec![pane(LOGS_PANE, Side::Left, PaneKindConfig::Text)],
            ..Config::default()
        };
        config.logging.pane = true;

        let mut s = session();
        assert!(build(&mut s, &config, rt.handle(), &LogBuffer::new()).is_err());
        s.stop();
    }

    #[test]
    fn test_follow_binding_installs_hook() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut topics = pane("topics", Side::Left, PaneKindConfig::List);
        topics.bindings.push(BindingConfig {
            target: "echo".to_string(),
            command: None,
            ttl_ms: None,
            follow: Some("echo streaming {}".to_string()),
        });
        let config = Config {
            panes: vec![topics, pane("echo", Side::Right, PaneKindConfig::Text)],
            ..Config::default()
        };

        let mut s = session();
        build(&mut s, &config, rt.handle(), &LogBuffer::new()).unwrap();
        s.pane("topics")
            .unwrap()
            .content_handle()
            .set(vec!["/chatter".to_string()]);
        s.handle_key(None);
        s.handle_key(Some(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('f'),
            crossterm::event::KeyModifiers::NONE,
        )));

        assert!(cycle_until(&mut s, |s| {
            s.pane("echo").unwrap().content()
                == Some(Content::Lines(vec!["streaming /chatter".to_string()]))
        }));
        s.stop();
    }
}
