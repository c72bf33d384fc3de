//! Off-screen drawing surface for a single pane
//!
//! Each pane draws into its own `Buffer` sized to its geometry. The Session
//! copies every surface into the terminal frame on each draw, so a pane that
//! is not dirty keeps showing what it last drew.

use super::geometry::Geometry;
use ratatui::{
    buffer::Buffer,
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
};
use std::fmt;
use unicode_width::UnicodeWidthChar;

/// Why a surface could not be created or reshaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Geometry is smaller than a border plus one content row
    TooSmall { width: u16, height: u16 },
    /// Geometry extends past the terminal edge
    OutOfBounds {
        geometry: Geometry,
        terminal: (u16, u16),
    },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::TooSmall { width, height } => {
                write!(f, "surface {}x{} is smaller than 3x3", width, height)
            }
            SurfaceError::OutOfBounds { geometry, terminal } => write!(
                f,
                "surface {}x{} at ({}, {}) does not fit terminal {}x{}",
                geometry.width, geometry.height, geometry.x, geometry.y, terminal.0, terminal.1
            ),
        }
    }
}

impl std::error::Error for SurfaceError {}

fn validate(geometry: Geometry, terminal: (u16, u16)) -> Result<(), SurfaceError> {
    if !geometry.is_drawable() {
        return Err(SurfaceError::TooSmall {
            width: geometry.width,
            height: geometry.height,
        });
    }
    if !geometry.fits_within(terminal.0, terminal.1) {
        return Err(SurfaceError::OutOfBounds { geometry, terminal });
    }
    Ok(())
}

pub struct Surface {
    buffer: Buffer,
}

impl Surface {
    /// Allocate a surface for `geometry` inside a terminal of size `terminal`
    pub fn new(geometry: Geometry, terminal: (u16, u16)) -> Result<Self, SurfaceError> {
        validate(geometry, terminal)?;
        Ok(Self {
            buffer: Buffer::empty(geometry.into()),
        })
    }

    /// Resize and move in one step; on error the surface is left untouched
    pub fn reshape(&mut self, geometry: Geometry, terminal: (u16, u16)) -> Result<(), SurfaceError> {
        validate(geometry, terminal)?;
        self.buffer.resize(geometry.into());
        Ok(())
    }

    #[cfg(test)]
    pub fn area(&self) -> ratatui::layout::Rect {
        self.buffer.area
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.reset();
    }

    /// Draw one content line at interior row `row` (0-based, below the top border)
    pub fn draw_line(&mut self, row: usize, text: &str, highlighted: bool) {
        let area = self.buffer.area;
        let inner_width = area.width.saturating_sub(2) as usize;
        let capacity = area.height.saturating_sub(2) as usize;
        if row >= capacity || inner_width == 0 {
            return;
        }

        let line = truncate_to_width(text, inner_width);
        let style = if highlighted {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.buffer.set_stringn(
            area.x + 1,
            area.y + 1 + row as u16,
            line,
            inner_width,
            style,
        );
    }

    /// Draw the border and title; focused panes get the accent colour
    pub fn draw_border(&mut self, title: &str, focused: bool) {
        let color = if focused { Color::Green } else { Color::White };
        let area = self.buffer.area;
        let mut block = Block::bordered().border_style(Style::default().fg(color));
        if !title.is_empty() {
            block = block.title(format!(" {} ", title));
        }
        block.render(area, &mut self.buffer);
    }

    /// Copy this surface into `target`, skipping cells outside its area
    pub fn flush_into(&self, target: &mut Buffer) {
        let visible = self.buffer.area.intersection(target.area);
        for y in visible.top()..visible.bottom() {
            for x in visible.left()..visible.right() {
                if let (Some(src), Some(dst)) = (self.buffer.cell((x, y)), target.cell_mut((x, y)))
                {
                    *dst = src.clone();
                }
            }
        }
    }
}

/// Cut `text` so it fits `width` display columns, marking the cut with `...`
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }

    let budget = width.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    if width >= 3 {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn row_text(surface: &Surface, row: u16) -> String {
        let area = surface.area();
        (area.left()..area.right())
            .map(|x| surface.buffer().cell((x, area.y + row)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn test_rejects_too_small() {
        let err = Surface::new(Geometry::new(0, 0, 10, 2), (80, 24)).err();
        assert_eq!(err, Some(SurfaceError::TooSmall { width: 10, height: 2 }));
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let g = Geometry::new(70, 0, 20, 10);
        assert!(matches!(
            Surface::new(g, (80, 24)),
            Err(SurfaceError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_failed_reshape_keeps_previous_area() {
        let mut surface = Surface::new(Geometry::new(0, 0, 20, 10), (80, 24)).unwrap();
        let result = surface.reshape(Geometry::new(0, 0, 200, 10), (80, 24));
        assert!(result.is_err());
        assert_eq!(surface.area(), Rect::new(0, 0, 20, 10));
    }

    #[test]
    fn test_draw_line_inside_border() {
        let mut surface = Surface::new(Geometry::new(2, 1, 10, 4), (80, 24)).unwrap();
        surface.draw_line(0, "alpha", false);
        surface.draw_border("", false);

        assert_eq!(row_text(&surface, 0), "┌────────┐");
        assert_eq!(row_text(&surface, 1), "│alpha   │");
        assert_eq!(row_text(&surface, 3), "└────────┘");
    }

    #[test]
    fn test_rows_past_capacity_are_ignored() {
        let mut surface = Surface::new(Geometry::new(0, 0, 10, 3), (80, 24)).unwrap();
        surface.draw_line(1, "overflow", false);
        assert_eq!(row_text(&surface, 2), "          ");
    }

    #[test]
    fn test_truncate_marks_cut() {
        assert_eq!(truncate_to_width("short", 8), "short");
        assert_eq!(truncate_to_width("a-very-long-line", 8), "a-ver...");
        assert_eq!(truncate_to_width("日本語テキスト", 8), "日本...");
    }

    #[test]
    fn test_flush_clips_to_target() {
        let surface = Surface::new(Geometry::new(0, 0, 10, 5), (80, 24)).unwrap();
        let mut target = Buffer::empty(Rect::new(0, 0, 6, 3));
        surface.flush_into(&mut target);
        assert_eq!(target.area, Rect::new(0, 0, 6, 3));
    }
}
