//! Raw pane content and the handles producers use to publish it

use crate::sync_cell::SyncCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Raw content pushed into a pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Free text; split on newlines for display
    Text(String),
    /// Pre-split rows
    Lines(Vec<String>),
}

impl Content {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Content::Text(text) => text.lines().map(str::to_string).collect(),
            Content::Lines(lines) => lines,
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Vec<String>> for Content {
    fn from(lines: Vec<String>) -> Self {
        Content::Lines(lines)
    }
}

/// Write-only view of a pane's raw content cell
///
/// Cheap to clone and safe to move into producer threads. Each `set`
/// replaces the previous value; nothing is merged.
#[derive(Debug, Clone)]
pub struct ContentHandle {
    cell: Arc<SyncCell<Content>>,
}

impl ContentHandle {
    pub(super) fn new(cell: Arc<SyncCell<Content>>) -> Self {
        Self { cell }
    }

    pub fn set(&self, content: impl Into<Content>) {
        self.cell.set(content.into());
    }
}

/// Name-keyed snapshot of the other panes in a session
///
/// Rebuilt by the Session before each input cycle. Holding a name never keeps
/// a pane alive; a removed pane simply stops resolving.
#[derive(Debug, Clone, Default)]
pub struct Siblings {
    handles: HashMap<String, ContentHandle>,
}

impl Siblings {
    pub fn new(handles: impl IntoIterator<Item = (String, ContentHandle)>) -> Self {
        Self {
            handles: handles.into_iter().collect(),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&ContentHandle> {
        self.handles.get(name)
    }
}

/// A pane that generates its own content
///
/// Called from `Pane::run`; a returned value is published exactly as an
/// external producer would publish it.
pub trait ContentSource {
    fn produce_content(&mut self) -> Option<Content>;
}
