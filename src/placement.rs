//! Anchors the lookup menu next to a selection without leaving the viewport.

use serde::{Deserialize, Serialize};

/// Bounding rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Fixed size of the lookup menu plus the margin kept around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MenuGeometry {
    pub width: f32,
    pub height: f32,
    pub gap: f32,
}

impl MenuGeometry {
    pub const DEFAULT_WIDTH: f32 = 260.0;
    pub const DEFAULT_HEIGHT: f32 = 176.0;
    pub const DEFAULT_GAP: f32 = 8.0;

    /// Top-left corner for the menu. Prefers just below the selection, flips
    /// above it when the bottom edge would overflow, and never starts left of
    /// or above `gap`.
    pub fn place(&self, rect: Rect, viewport: Viewport) -> Point {
        let max_x = (viewport.width - self.width - self.gap).max(self.gap);
        let x = rect.left.clamp(self.gap, max_x);

        let mut y = rect.bottom + self.gap;
        if y + self.height > viewport.height {
            y = rect.top - self.gap - self.height;
        }
        Point {
            x,
            y: y.max(self.gap),
        }
    }
}

impl Default for MenuGeometry {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            gap: Self::DEFAULT_GAP,
        }
    }
}

/// Places a menu of the default geometry.
pub fn place(rect: Rect, viewport: Viewport) -> Point {
    MenuGeometry::default().place(rect, viewport)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOMETRY: MenuGeometry = MenuGeometry {
        width: 260.0,
        height: 176.0,
        gap: 8.0,
    };
    const VIEWPORT: Viewport = Viewport::new(1280.0, 800.0);

    #[test]
    fn menu_sits_below_selection_when_room() {
        let rect = Rect::new(100.0, 200.0, 180.0, 220.0);
        let point = GEOMETRY.place(rect, VIEWPORT);
        assert_eq!(point, Point { x: 100.0, y: 228.0 });
    }

    #[test]
    fn menu_flips_above_near_bottom_edge() {
        let rect = Rect::new(100.0, 700.0, 180.0, 720.0);
        assert!(rect.bottom + GEOMETRY.gap + GEOMETRY.height > VIEWPORT.height);
        let point = GEOMETRY.place(rect, VIEWPORT);
        assert_eq!(point.y, 700.0 - 8.0 - 176.0);
    }

    #[test]
    fn menu_is_clamped_horizontally() {
        let max_x = VIEWPORT.width - GEOMETRY.width - GEOMETRY.gap;
        for left in [max_x + 1.0, 1200.0, 5000.0] {
            let point = GEOMETRY.place(Rect::new(left, 10.0, left + 20.0, 30.0), VIEWPORT);
            assert!(point.x <= max_x);
        }
        let point = GEOMETRY.place(Rect::new(-40.0, 10.0, 0.0, 30.0), VIEWPORT);
        assert_eq!(point.x, GEOMETRY.gap);
    }

    #[test]
    fn flipped_menu_never_goes_above_gap() {
        let tiny = Viewport::new(300.0, 120.0);
        let point = GEOMETRY.place(Rect::new(20.0, 40.0, 60.0, 60.0), tiny);
        assert_eq!(point.y, GEOMETRY.gap);
        assert_eq!(point.x, 20.0f32.clamp(8.0, 32.0));
    }

    #[test]
    fn narrow_viewport_pins_menu_to_gap() {
        let narrow = Viewport::new(200.0, 800.0);
        let point = GEOMETRY.place(Rect::new(150.0, 10.0, 190.0, 30.0), narrow);
        assert_eq!(point.x, GEOMETRY.gap);
    }

    #[test]
    fn degenerate_rect_still_places_menu() {
        let point = place(Rect::default(), VIEWPORT);
        assert_eq!(point, Point { x: 8.0, y: 8.0 });
    }
}
