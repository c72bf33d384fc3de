//! Selection fan-out from a list pane to dependent panes

use super::content::{Content, Siblings};

/// Turns the selected row into content for another pane.
/// Returning `None` leaves the target untouched.
pub type Transform = Box<dyn Fn(Option<&str>) -> Option<Content>>;

/// A (target pane name, transform) pair owned by a list pane
pub struct Binding {
    target: String,
    transform: Transform,
}

impl Binding {
    pub fn new<F>(target: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Option<&str>) -> Option<Content> + 'static,
    {
        Self {
            target: target.into(),
            transform: Box::new(transform),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn apply(&self, selected: Option<&str>) -> Option<Content> {
        (self.transform)(selected)
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Run every binding against `selected` and publish into the resolved targets.
///
/// Returns the names of the panes that received new content, in binding order.
pub fn fan_out(bindings: &[Binding], selected: Option<&str>, siblings: &Siblings) -> Vec<String> {
    let mut touched = Vec::new();
    for binding in bindings {
        let Some(handle) = siblings.resolve(binding.target()) else {
            tracing::debug!("Binding target {} is not registered, skipping", binding.target());
            continue;
        };
        if let Some(content) = binding.apply(selected) {
            handle.set(content);
            touched.push(binding.target().to_string());
        }
    }
    touched
}
