//! Panes - bordered regions of the terminal, each showing one content source
//!
//! A pane owns its geometry, an off-screen surface, a raw content cell that
//! producers write into, and the derived visible lines it draws. The kinds of
//! pane form a closed set ([`PaneKind`]) chosen at construction; the Session
//! only talks to them through [`Pane`].
//!
//! # Lifecycle
//!
//! ```text
//! producer ──set──▶ content cell ──refresh_content──▶ visible lines ──render──▶ surface
//!                                        │
//!                                        └─ list panes: selection + fan-out to siblings
//! ```

pub mod binding;
pub mod content;
pub mod geometry;
pub mod list;
pub mod surface;
pub mod text;

pub use binding::Binding;
pub use content::{Content, ContentHandle, ContentSource, Siblings};
pub use geometry::Geometry;
pub use list::ListPane;
pub use surface::Surface;
pub use text::TextPane;

use crate::sync_cell::SyncCell;
use crossterm::event::KeyEvent;
use serde::Deserialize;
use std::sync::Arc;

/// Which column group a pane is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Result of handing a key to a pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Event was consumed by the pane
    Yes,
    /// Event was not handled, should bubble up
    No,
}

/// Pane-specific behaviour
#[derive(Debug)]
pub enum PaneKind {
    Text(TextPane),
    List(ListPane),
}

pub struct Pane {
    name: String,
    side: Side,
    kind: PaneKind,
    geometry: Option<Geometry>,
    surface: Option<Surface>,
    requires_update: bool,
    requires_clear: bool,
    focused: bool,
    content: Arc<SyncCell<Content>>,
    visible: SyncCell<Vec<String>>,
    seen_generation: u64,
    siblings: Siblings,
    source: Option<Box<dyn ContentSource>>,
}

impl Pane {
    fn with_kind(name: impl Into<String>, side: Side, kind: PaneKind) -> Self {
        Self {
            name: name.into(),
            side,
            kind,
            geometry: None,
            surface: None,
            requires_update: true,
            requires_clear: true,
            focused: false,
            content: Arc::new(SyncCell::new()),
            visible: SyncCell::new(),
            seen_generation: 0,
            siblings: Siblings::default(),
            source: None,
        }
    }

    pub fn text(name: impl Into<String>, side: Side) -> Self {
        Self::with_kind(name, side, PaneKind::Text(TextPane::new()))
    }

    /// Text pane that keeps its newest lines in view
    pub fn tailing_text(name: impl Into<String>, side: Side) -> Self {
        Self::with_kind(name, side, PaneKind::Text(TextPane::tailing()))
    }

    pub fn list(name: impl Into<String>, side: Side, bindings: Vec<Binding>) -> Self {
        Self::with_kind(name, side, PaneKind::List(ListPane::new(bindings)))
    }

    /// Attach a source polled by `run()`
    pub fn with_source(mut self, source: impl ContentSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach a binding; returns false for text panes, which have no selection
    pub fn add_binding(&mut self, binding: Binding) -> bool {
        match &mut self.kind {
            PaneKind::List(list) => {
                list.add_binding(binding);
                true
            }
            PaneKind::Text(_) => false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    #[cfg(test)]
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    #[cfg(test)]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[cfg(test)]
    pub fn is_dirty(&self) -> bool {
        self.requires_update
    }

    /// Published setter for producers
    pub fn content_handle(&self) -> ContentHandle {
        ContentHandle::new(Arc::clone(&self.content))
    }

    /// Same as publishing through a [`ContentHandle`]
    #[allow(dead_code)]
    pub fn set_content(&self, content: impl Into<Content>) {
        self.content.set(content.into());
    }

    /// Raw content as last published
    #[cfg(test)]
    pub fn content(&self) -> Option<Content> {
        self.content.get()
    }

    #[cfg(test)]
    pub fn visible_lines(&self) -> Vec<String> {
        self.visible.get().unwrap_or_default()
    }

    /// Whether a producer wrote since the last refresh
    pub fn has_new_content(&self) -> bool {
        self.content.generation() != self.seen_generation
    }

    /// The highlighted row of a list pane (None for text panes or empty lists)
    pub fn selected_content(&self) -> Option<String> {
        match &self.kind {
            PaneKind::List(list) => {
                let row = list.selection().cursor()?;
                self.visible.get()?.get(row).cloned()
            }
            PaneKind::Text(_) => None,
        }
    }

    /// Replace the geometry and allocate or reshape the surface.
    ///
    /// Surface failures are logged; the previous surface stays in place until
    /// a later geometry succeeds.
    pub fn update_geometry(&mut self, geometry: Geometry, terminal: (u16, u16)) {
        self.geometry = Some(geometry);
        match self.surface.as_mut() {
            None => match Surface::new(geometry, terminal) {
                Ok(surface) => self.surface = Some(surface),
                Err(e) => tracing::warn!("Error creating surface for pane {}: {}", self.name, e),
            },
            Some(surface) => {
                if let Err(e) = surface.reshape(geometry, terminal) {
                    tracing::warn!("Error resizing pane {}: {}", self.name, e);
                }
            }
        }
        self.requires_update = true;
        self.requires_clear = true;
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
        self.requires_update = true;
    }

    pub fn set_siblings(&mut self, siblings: Siblings) {
        self.siblings = siblings;
    }

    /// Draw visible lines into the surface if anything changed
    pub fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if !self.requires_update {
            return;
        }
        if self.requires_clear {
            surface.clear();
            self.requires_clear = false;
        }

        let highlighted = match &self.kind {
            PaneKind::List(list) => list.selection().cursor(),
            PaneKind::Text(_) => None,
        };
        let lines = self.visible.get().unwrap_or_default();
        for (row, line) in lines.iter().enumerate() {
            surface.draw_line(row, line, highlighted == Some(row));
        }
        surface.draw_border(&self.name, self.focused);
        self.requires_update = false;
    }

    /// Pull raw content into visible lines.
    ///
    /// Returns the names of sibling panes that received new content from this
    /// pane's bindings; the caller refreshes them in the same cycle.
    pub fn refresh_content(&mut self) -> Vec<String> {
        let (content, generation) = self.content.snapshot();
        self.seen_generation = generation;
        let capacity = self.geometry.map(|g| g.capacity()).unwrap_or(0);

        let touched = match &mut self.kind {
            PaneKind::Text(text) => {
                self.visible.set(text.project(content, capacity));
                Vec::new()
            }
            PaneKind::List(list) => {
                let rows = content.map(Content::into_lines).unwrap_or_default();
                let visible = list.project(&rows, capacity);
                let touched = list.fan_out(&visible, &self.siblings);
                self.visible.set(visible);
                touched
            }
        };

        self.requires_update = true;
        self.requires_clear = true;
        touched
    }

    pub fn handle_input(&mut self, key: &KeyEvent) -> Handled {
        match &mut self.kind {
            PaneKind::List(list) => list.handle_key(key),
            PaneKind::Text(_) => Handled::No,
        }
    }

    /// Full refresh cycle, then poll the pane's own source if it has one
    pub fn run(&mut self) -> Vec<String> {
        let touched = self.refresh_content();
        if let Some(content) = self.source.as_mut().and_then(|s| s.produce_content()) {
            self.content.set(content);
        }
        touched
    }
}

impl std::fmt::Debug for Pane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pane")
            .field("name", &self.name)
            .field("side", &self.side)
            .field("kind", &self.kind)
            .field("geometry", &self.geometry)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}
