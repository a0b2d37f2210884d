//! Pointer position tracking in screen and normalized device coordinates.

use nalgebra::{Point2, Vector2};

/// Current and previous pointer samples for one viewport.
#[derive(Debug, Clone)]
pub(crate) struct PointerTracker {
    width: f32,
    height: f32,
    /// Pointer position in viewport pixels
    current: Point2<f32>,
    /// Pointer position before the latest move
    previous: Point2<f32>,
    /// Pointer position when the last frame settled
    frame_anchor: Point2<f32>,
    /// Pointer position in normalized device coordinates (-1 to 1, Y up)
    normalized: Point2<f32>,
}

impl PointerTracker {
    pub(crate) fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            current: Point2::origin(),
            previous: Point2::origin(),
            frame_anchor: Point2::origin(),
            normalized: Point2::origin(),
        }
    }

    /// Update the viewport size used for normalization.
    ///
    /// Zero-sized viewports are ignored so normalization never divides by zero.
    pub(crate) fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
            self.normalized = self.normalize(self.current);
        }
    }

    pub(crate) fn on_move(&mut self, screen_x: f32, screen_y: f32) {
        self.previous = self.current;
        self.current = Point2::new(screen_x, screen_y);
        self.normalized = self.normalize(self.current);
    }

    /// Mark the end of a frame once its movement has been consumed.
    pub(crate) fn settle(&mut self) {
        self.previous = self.current;
        self.frame_anchor = self.current;
    }

    /// Screen-space movement since the last settled frame, summed over every move in it
    pub(crate) fn delta(&self) -> Vector2<f32> {
        self.current - self.frame_anchor
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Point2<f32> {
        self.current
    }

    #[cfg(test)]
    pub(crate) fn previous(&self) -> Point2<f32> {
        self.previous
    }

    pub(crate) fn normalized(&self) -> Point2<f32> {
        self.normalized
    }

    fn normalize(&self, screen: Point2<f32>) -> Point2<f32> {
        Point2::new(
            2.0 * screen.x / self.width - 1.0,
            -(2.0 * screen.y / self.height - 1.0),
        )
    }
}
