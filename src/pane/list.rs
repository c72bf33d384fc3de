// List pane - scrollable selection over an ordered list of rows
//
// Selection state is (n = content rows, c = viewport capacity, cursor, anchor):
// - cursor: row inside the viewport that is highlighted
// - anchor: content index drawn at the viewport midpoint (c / 2)
//
// Once content outgrows the viewport the cursor sits near the middle and the
// anchor moves instead ("centred cursor" paging). Short lists never scroll.
//
// Anchor range, held as an invariant after every projection:
//
//   upper = c / 2                 (window starts at row 0)
//   lower = n - c + c / 2         (window ends at row n), when n >= c
//
// so the visible window [anchor - c/2, anchor - c/2 + c) always has exactly
// c rows and never runs past either end of the content.

use super::binding::{fan_out, Binding};
use super::content::Siblings;
use super::Handled;
use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

/// Cursor/anchor state machine behind a list pane
#[derive(Debug, Clone, Default)]
pub struct Selection {
    cursor: Option<usize>,
    anchor: Option<usize>,
    pending: Vec<Move>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a move; it takes effect on the next projection
    pub fn push_move(&mut self, mv: Move) {
        self.pending.push(mv);
    }

    /// Highlighted row inside the viewport
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[cfg(test)]
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Apply queued moves against `content` and return the rows to display
    pub fn project(&mut self, content: &[String], capacity: usize) -> Vec<String> {
        let moves = std::mem::take(&mut self.pending);
        let n = content.len();

        if n == 0 {
            self.cursor = None;
            self.anchor = None;
            return Vec::new();
        }
        // No layout yet: nothing is drawable, keep whatever state we had
        if capacity == 0 {
            return Vec::new();
        }

        let half = capacity / 2;
        let rows = n.min(capacity);
        let upper = half;
        let lower = if n >= capacity { n - capacity + half } else { half };

        // Content or capacity may have changed since the last projection
        let mut cursor = self.cursor.unwrap_or(0).min(rows - 1);
        let mut anchor = self.anchor.unwrap_or(half).clamp(upper, lower);

        for mv in moves {
            match mv {
                Move::Down => {
                    if cursor + 1 < rows {
                        cursor += 1;
                    } else if anchor < lower {
                        anchor += 1;
                    } else {
                        // Past the last row: wrap to the top
                        cursor = 0;
                        anchor = upper;
                    }
                }
                Move::Up => {
                    if cursor > 0 {
                        cursor -= 1;
                    } else if anchor > upper {
                        anchor -= 1;
                    } else {
                        // Before the first row: wrap to the last row of the list
                        cursor = rows - 1;
                        anchor = lower;
                    }
                }
            }
            recentre(&mut cursor, &mut anchor, half, upper, lower);
        }
        // A resize or new content moves the midpoint even without a key
        recentre(&mut cursor, &mut anchor, half, upper, lower);

        self.cursor = Some(cursor);
        self.anchor = Some(anchor);

        if n >= capacity {
            let start = anchor - half;
            content[start..start + capacity].to_vec()
        } else {
            content.to_vec()
        }
    }

    /// Absolute content index of the highlighted row
    #[cfg(test)]
    pub fn selected_index(&self, n: usize, capacity: usize) -> Option<usize> {
        let cursor = self.cursor?;
        if n >= capacity {
            Some(self.anchor? - capacity / 2 + cursor)
        } else {
            Some(cursor)
        }
    }
}

/// Scroll the window under a stationary cursor until the cursor sits at the
/// viewport midpoint or the anchor reaches its bound. The absolute selected
/// row does not change.
fn recentre(cursor: &mut usize, anchor: &mut usize, half: usize, upper: usize, lower: usize) {
    while *cursor > half && *anchor < lower {
        *cursor -= 1;
        *anchor += 1;
    }
    while *cursor < half && *anchor > upper {
        *cursor += 1;
        *anchor -= 1;
    }
}

/// A pane showing a selectable list, fanning the selection out to other panes
#[derive(Debug, Default)]
pub struct ListPane {
    selection: Selection,
    bindings: Vec<Binding>,
}

impl ListPane {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self {
            selection: Selection::new(),
            bindings,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn add_binding(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    pub fn project(&mut self, content: &[String], capacity: usize) -> Vec<String> {
        self.selection.project(content, capacity)
    }

    /// Push the selected row through every binding
    pub fn fan_out(&self, visible: &[String], siblings: &Siblings) -> Vec<String> {
        let selected = self
            .selection
            .cursor()
            .and_then(|row| visible.get(row))
            .map(String::as_str);
        fan_out(&self.bindings, selected, siblings)
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Handled {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selection.push_move(Move::Up);
                Handled::Yes
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selection.push_move(Move::Down);
                Handled::Yes
            }
            _ => Handled::No,
        }
    }
}
