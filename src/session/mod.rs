// Session - pane registry, layout, focus and the draw/input loop
//
// One control thread drives everything here. Producers only ever touch pane
// content cells through `ContentHandle`s, so the registry, layout and
// selection state need no locking.
//
// Each cycle:
//   1. detect terminal resize (re-layout + full clear)
//   2. render dirty panes and compose every surface into the frame
//   3. wait up to one tick for a key
//   4. focus cycling (Left/Right), quit (q / Ctrl-C)
//   5. forward the key to the focused pane, run it, cascade its fan-out
//   6. key hooks, then refresh unfocused panes whose producers wrote

pub mod input;
pub mod layout;
pub mod terminal;

use crate::pane::{Handled, Pane, Siblings};
use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent};
use indexmap::IndexMap;
use input::{is_quit, InputSource};
use ratatui::{backend::Backend, Terminal};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Session-level reaction to keys the focused pane sees
///
/// Hooks see the keys the focused pane left unhandled, with a snapshot of
/// the other panes' content handles.
pub trait KeyHook {
    fn on_key(&mut self, key: &KeyEvent, focused: &Pane, siblings: &Siblings);

    /// Called once when the session loop exits
    fn shutdown(&mut self) {}
}

pub struct Session<B: Backend> {
    terminal: Terminal<B>,
    panes: IndexMap<String, Pane>,
    size: (u16, u16),
    focused: Option<String>,
    running: Arc<AtomicBool>,
    input: Box<dyn InputSource>,
    hooks: Vec<Box<dyn KeyHook>>,
    tick: Duration,
}

impl<B: Backend> Session<B> {
    pub fn new(
        terminal: Terminal<B>,
        input: Box<dyn InputSource>,
        tick: Duration,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        let size = terminal.size().context("Failed to read terminal size")?;
        running.store(true, Ordering::SeqCst);
        Ok(Self {
            terminal,
            panes: IndexMap::new(),
            size: (size.width, size.height),
            focused: None,
            running,
            input,
            hooks: Vec::new(),
            tick,
        })
    }

    /// Register a pane and recompute the layout.
    ///
    /// The first pane registered takes focus. The new pane is run once so a
    /// pane with its own source has content before it is ever focused.
    pub fn add_pane(&mut self, pane: Pane) -> Result<()> {
        let name = pane.name().to_string();
        if self.panes.contains_key(&name) {
            bail!("Pane {} is already registered", name);
        }
        tracing::debug!("Adding pane {} on the {} side", name, pane.side().as_str());
        self.panes.insert(name.clone(), pane);

        if self.focused.is_none() {
            self.set_focus(Some(name.clone()));
        }
        self.relayout();
        self.run_pane(&name, None);
        Ok(())
    }

    /// Remove a pane and recompute the layout; bindings naming it go quiet
    #[allow(dead_code)]
    pub fn remove_pane(&mut self, name: &str) -> Option<Pane> {
        let pane = self.panes.shift_remove(name)?;
        tracing::debug!("Removed pane {}", name);

        if self.focused.as_deref() == Some(name) {
            self.focused = None;
            let first = self.panes.keys().next().cloned();
            self.set_focus(first);
        }
        // Clear the whole frame so the removed pane's cells do not linger
        if let Err(e) = self.terminal.clear() {
            tracing::warn!("Failed to clear terminal: {}", e);
        }
        self.relayout();
        Some(pane)
    }

    #[cfg(test)]
    pub fn pane(&self, name: &str) -> Option<&Pane> {
        self.panes.get(name)
    }

    #[cfg(test)]
    pub fn pane_names(&self) -> impl Iterator<Item = &str> {
        self.panes.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    #[cfg(test)]
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn add_hook(&mut self, hook: Box<dyn KeyHook>) {
        self.hooks.push(hook);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared flag; clearing it stops the loop after the current cycle
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Assign fresh geometry to every pane from the current terminal size
    pub fn compute_layout(&mut self) {
        let sides: Vec<_> = self.panes.values().map(|p| p.side()).collect();
        let geometries = layout::compute_layout(&sides, self.size.0, self.size.1);
        tracing::debug!(
            "Layout for {} panes on a {}x{} terminal",
            sides.len(),
            self.size.0,
            self.size.1
        );
        for (pane, geometry) in self.panes.values_mut().zip(geometries) {
            pane.update_geometry(geometry, self.size);
        }
    }

    /// Layout, then re-project every pane against its new capacity
    fn relayout(&mut self) {
        self.compute_layout();
        let names: Vec<String> = self.panes.keys().cloned().collect();
        for name in names {
            self.refresh_pane(&name);
        }
    }

    fn detect_resize(&mut self) -> Result<bool> {
        let size = self.terminal.size().context("Failed to read terminal size")?;
        if (size.width, size.height) == self.size {
            return Ok(false);
        }
        tracing::debug!(
            "Terminal resized from {}x{} to {}x{}",
            self.size.0,
            self.size.1,
            size.width,
            size.height
        );
        self.size = (size.width, size.height);
        Ok(true)
    }

    /// Render dirty panes and compose all surfaces into the terminal
    pub fn draw(&mut self) -> Result<()> {
        for pane in self.panes.values_mut() {
            pane.render();
        }
        let panes = &self.panes;
        self.terminal
            .draw(|frame| {
                let buffer = frame.buffer_mut();
                for pane in panes.values() {
                    if let Some(surface) = pane.surface() {
                        surface.flush_into(buffer);
                    }
                }
            })
            .context("Failed to draw terminal")?;
        Ok(())
    }

    fn set_focus(&mut self, name: Option<String>) {
        if let Some(previous) = self.focused.take() {
            if let Some(pane) = self.panes.get_mut(&previous) {
                pane.set_focus(false);
            }
        }
        if let Some(next) = &name {
            if let Some(pane) = self.panes.get_mut(next) {
                pane.set_focus(true);
            }
        }
        self.focused = name;
    }

    /// Left/Right move focus through the registry in insertion order, wrapping
    fn toggle_focus(&mut self, key: &KeyEvent) {
        let count = self.panes.len();
        if count == 0 {
            return;
        }
        let current = self
            .focused
            .as_deref()
            .and_then(|name| self.panes.get_index_of(name))
            .unwrap_or(0);
        let next = match key.code {
            KeyCode::Left => (current + count - 1) % count,
            KeyCode::Right => (current + 1) % count,
            _ => return,
        };
        let name = self.panes.get_index(next).map(|(name, _)| name.clone());
        self.set_focus(name);
    }

    fn siblings_for(&self, name: &str) -> Siblings {
        Siblings::new(
            self.panes
                .iter()
                .filter(|(other, _)| other.as_str() != name)
                .map(|(other, pane)| (other.clone(), pane.content_handle())),
        )
    }

    /// Handle one key (or an idle tick) for the focused pane
    pub fn handle_key(&mut self, key: Option<KeyEvent>) {
        if let Some(key) = &key {
            if is_quit(key) {
                tracing::info!("Quit requested");
                self.stop();
                return;
            }
            self.toggle_focus(key);
        }

        if let Some(name) = self.focused.clone() {
            let handled = self.run_pane(&name, key.as_ref());

            // Keys the pane consumed stop there; the rest bubble up to hooks
            if let (Some(key), Handled::No) = (&key, handled) {
                let siblings = self.siblings_for(&name);
                if let Some(pane) = self.panes.get(&name) {
                    for hook in self.hooks.iter_mut() {
                        hook.on_key(key, pane, &siblings);
                    }
                }
            }
        }

        self.refresh_changed();
    }

    fn run_pane(&mut self, name: &str, key: Option<&KeyEvent>) -> Handled {
        let siblings = self.siblings_for(name);
        let Some(pane) = self.panes.get_mut(name) else {
            return Handled::No;
        };
        pane.set_siblings(siblings);
        let handled = key.map_or(Handled::No, |key| pane.handle_input(key));
        let touched = pane.run();
        self.cascade(name, touched);
        handled
    }

    fn refresh_pane(&mut self, name: &str) {
        let siblings = self.siblings_for(name);
        let Some(pane) = self.panes.get_mut(name) else {
            return;
        };
        pane.set_siblings(siblings);
        let touched = pane.refresh_content();
        self.cascade(name, touched);
    }

    /// Refresh panes that received fan-out content, following their own
    /// bindings in turn. Each pane refreshes at most once per cascade.
    fn cascade(&mut self, origin: &str, touched: Vec<String>) {
        let mut visited: HashSet<String> = HashSet::from([origin.to_string()]);
        let mut queue: VecDeque<String> = touched.into();

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let siblings = self.siblings_for(&name);
            if let Some(pane) = self.panes.get_mut(&name) {
                pane.set_siblings(siblings);
                queue.extend(pane.refresh_content());
            }
        }
    }

    /// Pick up producer writes on panes that are not focused
    fn refresh_changed(&mut self) {
        let changed: Vec<String> = self
            .panes
            .iter()
            .filter(|(_, pane)| pane.has_new_content())
            .map(|(name, _)| name.clone())
            .collect();
        for name in changed {
            self.refresh_pane(&name);
        }
    }

    /// One loop iteration
    pub fn cycle(&mut self) -> Result<()> {
        if self.detect_resize()? {
            self.terminal.clear().context("Failed to clear terminal")?;
            self.relayout();
        }
        self.draw()?;
        let key = self.input.next_key(self.tick)?;
        self.handle_key(key);
        Ok(())
    }

    fn run_until_stopped(&mut self) -> Result<()> {
        while self.is_running() {
            self.cycle()?;
        }
        Ok(())
    }

    /// Run until stopped by a quit key or the stop handle
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("Session started with {} panes", self.panes.len());
        let result = self.run_until_stopped();

        for hook in self.hooks.iter_mut() {
            hook.shutdown();
        }
        self.stop();
        tracing::info!("Session stopped");
        result
    }

    #[cfg(test)]
    fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}
