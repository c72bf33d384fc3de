//! Pane definitions: which panes exist, what feeds them, and how list
//! selections drive other panes

use crate::pane::Side;
use anyhow::{bail, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Pane behaviour chosen in the config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneKindConfig {
    #[default]
    Text,
    List,
}

impl PaneKindConfig {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::List => "list",
        }
    }
}

/// One `[[panes]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaneConfig {
    pub name: String,
    pub side: Side,
    #[serde(default)]
    pub kind: PaneKindConfig,
    /// Command polled for content (stdout replaces the pane's content)
    pub command: Option<String>,
    pub interval_ms: Option<u64>,
    /// Keep the newest lines in view (text panes)
    #[serde(default)]
    pub tail: bool,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

impl PaneConfig {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms.map(Duration::from_millis)
    }
}

/// One `[[panes.bindings]]` entry on a list pane
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BindingConfig {
    pub target: String,
    /// Command run for the selected row, `{}` is the row
    pub command: Option<String>,
    pub ttl_ms: Option<u64>,
    /// Streaming command started with `f`, `{}` is the row
    pub follow: Option<String>,
}

impl BindingConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}

/// Reject pane sets the dashboard cannot be built from
pub fn validate(panes: &[PaneConfig]) -> Result<()> {
    let mut names = HashSet::new();
    for pane in panes {
        if pane.name.trim().is_empty() {
            bail!("Pane names must not be empty");
        }
        if !names.insert(pane.name.as_str()) {
            bail!("Pane {} is defined more than once", pane.name);
        }
    }

    for pane in panes {
        if !pane.bindings.is_empty() && pane.kind != PaneKindConfig::List {
            bail!(
                "Pane {} has bindings but is a {} pane; only list panes have a selection",
                pane.name,
                pane.kind.as_str()
            );
        }
        if pane.interval_ms == Some(0) {
            bail!("Pane {} has interval_ms = 0", pane.name);
        }
        for binding in &pane.bindings {
            if binding.target == pane.name {
                bail!("Pane {} has a binding to itself", pane.name);
            }
            if !names.contains(binding.target.as_str()) {
                bail!(
                    "Pane {} has a binding to unknown pane {}",
                    pane.name,
                    binding.target
                );
            }
            if binding.command.is_none() && binding.follow.is_none() {
                bail!(
                    "Binding from {} to {} needs a command or a follow command",
                    pane.name,
                    binding.target
                );
            }
        }
    }
    Ok(())
}
