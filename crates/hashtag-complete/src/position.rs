//! Floating panel placement
//!
//! Places the suggestion panel just below the trigger character. When the
//! panel would run past the bottom of the visible viewport it flips above the
//! trigger, and when it would run past the right edge it is pulled back so
//! its right edge meets the viewport edge. Top and left edges are not
//! clamped, so the result may be negative on very small viewports.

/// An axis-aligned rectangle in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Measured size of the suggestion panel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

impl PanelSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Scroll offsets and size of the visible viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_x: f64, scroll_y: f64, width: f64, height: f64) -> Self {
        Self {
            scroll_x,
            scroll_y,
            width,
            height,
        }
    }

    /// Document coordinate of the visible right edge
    pub fn right_edge(&self) -> f64 {
        self.scroll_x + self.width
    }

    /// Document coordinate of the visible bottom edge
    pub fn bottom_edge(&self) -> f64 {
        self.scroll_y + self.height
    }
}

/// Panel placement in document-root coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelPosition {
    pub top: f64,
    pub left: f64,
}

/// Configured gap between trigger and panel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlacementOffsets {
    pub top: f64,
    pub left: f64,
}

/// Where the panel is anchored
///
/// `trigger` is relative to `container`, as editors report character bounds
/// relative to their own root element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub container: Rect,
    pub trigger: Rect,
    pub viewport: Viewport,
}

/// Computes panel placement; holds no state beyond its offsets
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionEngine {
    offsets: PlacementOffsets,
}

impl PositionEngine {
    pub fn new(offsets: PlacementOffsets) -> Self {
        Self { offsets }
    }

    pub fn offsets(&self) -> PlacementOffsets {
        self.offsets
    }

    /// Compute the panel position for an anchor and a measured panel size
    pub fn position(&self, anchor: &Anchor, panel: PanelSize) -> PanelPosition {
        let Anchor {
            container,
            trigger,
            viewport,
        } = anchor;

        let mut top = viewport.scroll_y + container.top + trigger.bottom() + self.offsets.top;
        let mut left = viewport.scroll_x + container.left + trigger.left + self.offsets.left;

        if top + panel.height > viewport.bottom_edge() {
            let above = viewport.scroll_y + container.top + trigger.top;
            top = above - (panel.height + self.offsets.top);
        }

        if left + panel.width > viewport.right_edge() {
            left = viewport.right_edge() - (panel.width + self.offsets.left);
        }

        PanelPosition { top, left }
    }
}
