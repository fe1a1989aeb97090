//! Visibility and scroll-position observers
//!
//! Observers write no style; they expose a boolean the host polls through
//! [`crate::ScrollRuntime::is_active`]. They share the binding lifecycle so
//! they are released with their scope like any other binding.

use unveil_core::{ElementId, ElementTree, Viewport};

/// Whether an element's visible area meets a threshold
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct VisibilityObserver {
    pub element: ElementId,
    /// Required visible fraction; 0 means any overlap
    pub threshold: f32,
    /// Stop observing after the first time the element becomes visible
    pub once: bool,
    pub visible: bool,
}

impl VisibilityObserver {
    pub fn new(element: ElementId, threshold: f32, once: bool) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            tracing::warn!(threshold, "non-finite visibility threshold, using 0.1");
            0.1
        };
        Self {
            element,
            threshold,
            once,
            visible: false,
        }
    }

    /// Re-evaluate; returns the new value if it changed
    pub fn update(&mut self, elements: &ElementTree, viewport: &Viewport) -> Option<bool> {
        if self.once && self.visible {
            return None;
        }
        let rect = elements.get(self.element)?.rect;
        let ratio = viewport.visible_ratio(&rect);
        let visible = if self.threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.threshold
        };
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(visible)
    }
}

/// Whether the page has scrolled past a fixed offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScrollThreshold {
    pub offset: f32,
    pub passed: bool,
}

impl ScrollThreshold {
    pub fn new(offset: f32) -> Self {
        Self {
            offset,
            passed: false,
        }
    }

    /// Re-evaluate; returns the new value if it changed
    pub fn update(&mut self, viewport: &Viewport) -> Option<bool> {
        let passed = viewport.scroll_y > self.offset;
        if passed == self.passed {
            return None;
        }
        self.passed = passed;
        Some(passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_core::{Element, Rect};

    #[test]
    fn test_visibility_threshold() {
        let mut tree = ElementTree::new();
        let section = tree.insert(Element::new(Rect::new(0.0, 1000.0, 800.0, 400.0)));
        let mut viewport = Viewport::new(800.0, 800.0);
        let mut observer = VisibilityObserver::new(section, 0.1, false);

        assert_eq!(observer.update(&tree, &viewport), None);

        // 20 of 400 rows visible: below 10%
        viewport.scroll_y = 220.0;
        assert_eq!(observer.update(&tree, &viewport), None);

        viewport.scroll_y = 300.0;
        assert_eq!(observer.update(&tree, &viewport), Some(true));

        viewport.scroll_y = 0.0;
        assert_eq!(observer.update(&tree, &viewport), Some(false));
    }

    #[test]
    fn test_once_latches() {
        let mut tree = ElementTree::new();
        let section = tree.insert(Element::new(Rect::new(0.0, 100.0, 800.0, 100.0)));
        let mut viewport = Viewport::new(800.0, 800.0);
        let mut observer = VisibilityObserver::new(section, 0.1, true);

        assert_eq!(observer.update(&tree, &viewport), Some(true));
        viewport.scroll_y = 5000.0;
        assert_eq!(observer.update(&tree, &viewport), None);
        assert!(observer.visible);
    }

    #[test]
    fn test_scroll_threshold_is_strict() {
        let mut viewport = Viewport::new(800.0, 600.0);
        let mut threshold = ScrollThreshold::new(50.0);
        viewport.scroll_y = 50.0;
        assert_eq!(threshold.update(&viewport), None);
        viewport.scroll_y = 51.0;
        assert_eq!(threshold.update(&viewport), Some(true));
        viewport.scroll_y = 10.0;
        assert_eq!(threshold.update(&viewport), Some(false));
    }
}
