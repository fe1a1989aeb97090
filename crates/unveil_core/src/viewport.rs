//! Viewport signal
//!
//! The scroll position and size of the visible area. Bindings only ever read
//! it; the host is the single writer.

use crate::element::Rect;

/// Visible area of the document
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    /// The viewport rectangle in document coordinates
    pub fn document_rect(&self) -> Rect {
        Rect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }

    /// Convert a document rectangle to client (viewport-relative) coordinates
    pub fn client_rect(&self, rect: &Rect) -> Rect {
        rect.translate(-self.scroll_x, -self.scroll_y)
    }

    /// Fraction (0.0 to 1.0) of `rect`'s area currently inside the viewport
    pub fn visible_ratio(&self, rect: &Rect) -> f32 {
        let area = rect.width * rect.height;
        if area <= 0.0 {
            // Zero-area elements count as fully visible while their origin is in view
            return if self.document_rect().contains(rect.x, rect.y) {
                1.0
            } else {
                0.0
            };
        }
        let view = self.document_rect();
        let w = (rect.right().min(view.right()) - rect.left().max(view.left())).max(0.0);
        let h = (rect.bottom().min(view.bottom()) - rect.top().max(view.top())).max(0.0);
        (w * h / area).clamp(0.0, 1.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_ratio() {
        let mut viewport = Viewport::new(1000.0, 800.0);
        let rect = Rect::new(0.0, 700.0, 100.0, 200.0);

        assert!((viewport.visible_ratio(&rect) - 0.5).abs() < 1e-5);

        viewport.scroll_y = 100.0;
        assert!((viewport.visible_ratio(&rect) - 1.0).abs() < 1e-5);

        viewport.scroll_y = 2000.0;
        assert_eq!(viewport.visible_ratio(&rect), 0.0);
    }

    #[test]
    fn test_client_rect() {
        let mut viewport = Viewport::new(1000.0, 800.0);
        viewport.scroll_y = 250.0;
        let client = viewport.client_rect(&Rect::new(10.0, 300.0, 50.0, 50.0));
        assert_eq!(client, Rect::new(10.0, 50.0, 50.0, 50.0));
    }
}
