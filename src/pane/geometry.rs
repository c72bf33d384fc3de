/// Placement of a pane on the terminal grid, in cells.
///
/// Always replaced wholesale by the layout engine, never patched field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Smallest size that fits a border plus one content row
pub const MIN_EXTENT: u16 = 3;

impl Geometry {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of content rows inside the border
    pub fn capacity(&self) -> usize {
        self.height.saturating_sub(2) as usize
    }

    /// Number of content columns inside the border
    pub fn inner_width(&self) -> usize {
        self.width.saturating_sub(2) as usize
    }

    pub fn is_drawable(&self) -> bool {
        self.width >= MIN_EXTENT && self.height >= MIN_EXTENT
    }

    /// Whether this geometry lies entirely inside a terminal of the given size
    pub fn fits_within(&self, width: u16, height: u16) -> bool {
        u32::from(self.x) + u32::from(self.width) <= u32::from(width)
            && u32::from(self.y) + u32::from(self.height) <= u32::from(height)
    }
}

impl From<Geometry> for ratatui::layout::Rect {
    fn from(g: Geometry) -> Self {
        ratatui::layout::Rect::new(g.x, g.y, g.width, g.height)
    }
}
