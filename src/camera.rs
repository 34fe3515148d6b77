//! Pan/zoom view transform for 2D rendering
//!
//! Maps world (simulation) coordinates to screen pixels with
//! `screen = (world + translate) * scale`. The transform is driven by pointer
//! gestures and never touches simulated positions.

use tracing::warn;

use crate::config::ViewConfig;
use crate::layout::{BoundingBox, LayoutSnapshot, PositionedNode};
use crate::simulation::sanitize_extent;

/// Zoom factor applied per wheel notch
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Pointer drag state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Button held; `last` is the pointer position of the previous event
    Dragging { last: (f64, f64) },
}

/// View transform state
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
    /// Zoom level (1.0 = 100%)
    pub scale: f64,
    /// Pan in world coordinates
    pub translate_x: f64,
    pub translate_y: f64,
    min_scale: f64,
    max_scale: f64,
    drag: DragState,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(800.0, 600.0, ViewConfig::default())
    }
}

impl ViewTransform {
    /// Create an identity transform for a viewport
    ///
    /// An invalid scale range falls back to the default one.
    pub fn new(width: f64, height: f64, config: ViewConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!(%err, "invalid view config, using default scale range");
                ViewConfig::default()
            }
        };
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
            scale: 1.0_f64.clamp(config.min_scale, config.max_scale),
            translate_x: 0.0,
            translate_y: 0.0,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            drag: DragState::Idle,
        }
    }

    /// Allowed scale range
    pub fn scale_range(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Convert world coordinates to screen coordinates
    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x + self.translate_x) * self.scale,
            (y + self.translate_y) * self.scale,
        )
    }

    /// Convert screen coordinates to world coordinates
    pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            sx / self.scale - self.translate_x,
            sy / self.scale - self.translate_y,
        )
    }

    /// Whether a screen point is inside the viewport
    pub fn contains(&self, sx: f64, sy: f64) -> bool {
        (0.0..=self.width).contains(&sx) && (0.0..=self.height).contains(&sy)
    }

    /// Pointer/touch down; starts a drag only inside the viewport
    pub fn on_drag_start(&mut self, pointer: (f64, f64)) -> bool {
        if !self.contains(pointer.0, pointer.1) {
            return false;
        }
        self.drag = DragState::Dragging { last: pointer };
        true
    }

    /// Pointer/touch move; pans by the delta since the previous event
    ///
    /// Returns true if the view changed.
    pub fn on_drag_move(&mut self, pointer: (f64, f64)) -> bool {
        let DragState::Dragging { last } = self.drag else {
            return false;
        };
        self.pan(pointer.0 - last.0, pointer.1 - last.1);
        self.drag = DragState::Dragging { last: pointer };
        true
    }

    /// Pointer/touch up
    pub fn on_drag_end(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Pointer left the viewport; a held drag is released
    pub fn on_pointer_leave(&mut self) {
        if self.is_dragging() {
            self.on_drag_end();
        }
    }

    /// Pan the view by delta pixels
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.translate_x += dx / self.scale;
        self.translate_y += dy / self.scale;
    }

    /// Zoom by `factor`, keeping the screen point `pivot` fixed
    ///
    /// The resulting scale is clamped to the configured range. Non-finite and
    /// non-positive factors are ignored.
    pub fn on_zoom(&mut self, factor: f64, pivot: (f64, f64)) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if new_scale == self.scale {
            return;
        }

        let (wx, wy) = self.to_world(pivot.0, pivot.1);
        self.scale = new_scale;
        self.translate_x = pivot.0 / new_scale - wx;
        self.translate_y = pivot.1 / new_scale - wy;
    }

    /// Mouse wheel: scrolling up zooms in, down zooms out
    pub fn on_wheel(&mut self, delta_y: f64, pivot: (f64, f64)) {
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        };
        self.on_zoom(factor, pivot);
    }

    /// Reset view to identity
    pub fn reset(&mut self) {
        self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
        self.translate_x = 0.0;
        self.translate_y = 0.0;
        self.drag = DragState::Idle;
    }

    /// Scale and center so `bounds` fills the viewport minus `padding`
    pub fn fit_to_bounds(&mut self, bounds: &BoundingBox, padding: f64) {
        if bounds.is_empty() {
            return;
        }

        let available_width = (self.width - 2.0 * padding).max(1.0);
        let available_height = (self.height - 2.0 * padding).max(1.0);
        let scale = (available_width / bounds.width())
            .min(available_height / bounds.height())
            .clamp(self.min_scale, self.max_scale);

        self.scale = scale;
        self.translate_x = self.width / (2.0 * scale) - bounds.center_x();
        self.translate_y = self.height / (2.0 * scale) - bounds.center_y();
    }

    /// Resize the viewport dimensions
    ///
    /// Non-finite extents and extents below one pixel become one pixel.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = sanitize_extent(width);
        self.height = sanitize_extent(height);
    }

    /// Node under a screen-space point
    pub fn node_at<'a>(
        &self,
        snapshot: &'a LayoutSnapshot,
        sx: f64,
        sy: f64,
    ) -> Option<&'a PositionedNode> {
        let (x, y) = self.to_world(sx, sy);
        snapshot.node_at(x, y)
    }
}
