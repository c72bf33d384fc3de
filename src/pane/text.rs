//! Text pane: no selection, content passes straight through

use super::content::Content;

#[derive(Debug, Default, Clone)]
pub struct TextPane {
    /// Show the newest `capacity` lines instead of the first ones
    tail: bool,
}

impl TextPane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pane that keeps the end of long content in view (log and feed panes)
    pub fn tailing() -> Self {
        Self { tail: true }
    }

    pub fn project(&self, content: Option<Content>, capacity: usize) -> Vec<String> {
        let lines = content.map(Content::into_lines).unwrap_or_default();
        if self.tail && capacity > 0 && lines.len() > capacity {
            lines[lines.len() - capacity..].to_vec()
        } else {
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_content_through() {
        let pane = TextPane::new();
        let lines = pane.project(Some(Content::from("a\nb\nc\nd")), 2);
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn tailing_keeps_newest_lines() {
        let pane = TextPane::tailing();
        let lines = pane.project(Some(Content::from("a\nb\nc\nd")), 2);
        assert_eq!(lines, vec!["c", "d"]);
    }

    #[test]
    fn no_content_is_empty() {
        assert!(TextPane::new().project(None, 5).is_empty());
    }
}
