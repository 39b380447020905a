use std::ops::{Deref, DerefMut};

use super::Canvas;

/// Saves the coordinate transform on creation and restores it on drop.
///
/// Derefs to the canvas, so drawing goes through the guard:
///
/// ```ignore
/// let mut c = canvas.coordinate_scope();
/// c.translate(Vec2::new(100.0, 0.0));
/// c.fill_circle();
/// // transform restored here, even on early return
/// ```
pub struct CoordinateScope<'a> {
    canvas: &'a mut Canvas,
}

impl<'a> CoordinateScope<'a> {
    pub(super) fn new(canvas: &'a mut Canvas) -> Self {
        canvas.push_coordinate();
        Self { canvas }
    }
}

impl Deref for CoordinateScope<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.canvas
    }
}

impl DerefMut for CoordinateScope<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.canvas
    }
}

impl Drop for CoordinateScope<'_> {
    fn drop(&mut self) {
        self.canvas.pop_coordinate();
    }
}

/// Saves the current style on creation and restores it on drop.
pub struct StyleScope<'a> {
    canvas: &'a mut Canvas,
}

impl<'a> StyleScope<'a> {
    pub(super) fn new(canvas: &'a mut Canvas) -> Self {
        canvas.push_style();
        Self { canvas }
    }
}

impl Deref for StyleScope<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.canvas
    }
}

impl DerefMut for StyleScope<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.canvas
    }
}

impl Drop for StyleScope<'_> {
    fn drop(&mut self) {
        self.canvas.pop_style();
    }
}
