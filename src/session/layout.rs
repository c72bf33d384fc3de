//! Two-column layout engine.
//!
//! LEFT panes share the first third of the width and RIGHT panes the
//! remaining two thirds. When one side is empty the other takes the full
//! width. Within a side, panes stack top to bottom in registry order and
//! split the height evenly; remainder rows stay uncovered.

use crate::pane::{Geometry, Side};

/// Compute one geometry per entry of `sides`, in the same order
pub fn compute_layout(sides: &[Side], width: u16, height: u16) -> Vec<Geometry> {
    let left_count = sides.iter().filter(|s| **s == Side::Left).count() as u16;
    let right_count = sides.iter().filter(|s| **s == Side::Right).count() as u16;

    let (left_width, right_start, right_width) = match (left_count, right_count) {
        (0, 0) => return Vec::new(),
        (0, _) => (0, 0, width),
        (_, 0) => (width, 0, 0),
        _ => (width / 3, width / 3, (width / 3) * 2),
    };
    let left_height = height.checked_div(left_count).unwrap_or(0);
    let right_height = height.checked_div(right_count).unwrap_or(0);

    let mut left_index = 0;
    let mut right_index = 0;
    sides
        .iter()
        .map(|side| match side {
            Side::Left => {
                let g = Geometry::new(0, left_index * left_height, left_width, left_height);
                left_index += 1;
                g
            }
            Side::Right => {
                let g = Geometry::new(
                    right_start,
                    right_index * right_height,
                    right_width,
                    right_height,
                );
                right_index += 1;
                g
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_has_no_layout() {
        assert!(compute_layout(&[], 80, 24).is_empty());
    }

    #[test]
    fn test_left_only_takes_full_width() {
        let layout = compute_layout(&[Side::Left, Side::Left, Side::Left], 80, 25);
        assert_eq!(
            layout,
            vec![
                Geometry::new(0, 0, 80, 8),
                Geometry::new(0, 8, 80, 8),
                Geometry::new(0, 16, 80, 8),
            ]
        );
    }

    #[test]
    fn test_right_only_starts_at_column_zero() {
        let layout = compute_layout(&[Side::Right, Side::Right], 81, 24);
        assert_eq!(
            layout,
            vec![Geometry::new(0, 0, 81, 12), Geometry::new(0, 12, 81, 12)]
        );
    }

    #[test]
    fn test_both_sides_split_one_third_two_thirds() {
        let layout = compute_layout(&[Side::Left, Side::Right, Side::Left], 100, 30);
        assert_eq!(
            layout,
            vec![
                Geometry::new(0, 0, 33, 15),
                Geometry::new(33, 0, 66, 30),
                Geometry::new(0, 15, 33, 15),
            ]
        );
    }

    #[test]
    fn test_registry_order_sets_stacking() {
        let layout = compute_layout(&[Side::Right, Side::Left, Side::Right], 90, 20);
        assert_eq!(layout[0].y, 0);
        assert_eq!(layout[2].y, 10);
        assert_eq!(layout[1], Geometry::new(0, 0, 30, 20));
    }
}
