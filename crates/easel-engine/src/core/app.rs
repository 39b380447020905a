use winit::event::WindowEvent;

use crate::canvas::Canvas;
use crate::render::Resources;
use crate::time::FrameTime;

/// Control directive returned by sketch callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// A program drawn on the canvas.
///
/// Per frame the runtime calls `begin_frame` on the canvas, then
/// [`update`](Self::update), then [`draw`](Self::draw), then renders what was drawn.
pub trait Sketch {
    /// Called once after the window and GPU exist. Load fonts and images here.
    fn setup(&mut self, canvas: &mut Canvas, resources: &mut Resources<'_>) -> anyhow::Result<()> {
        let _ = (canvas, resources);
        Ok(())
    }

    /// Advances state. `resources` allows streaming texture updates.
    fn update(&mut self, time: FrameTime, resources: &mut Resources<'_>) -> AppControl {
        let _ = (time, resources);
        AppControl::Continue
    }

    fn draw(&mut self, canvas: &mut Canvas);

    /// Raw window events, before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }
}
