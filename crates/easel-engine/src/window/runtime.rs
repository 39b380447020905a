use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::canvas::{Canvas, CanvasConfig};
use crate::core::{AppControl, Sketch};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::render::{FrameComposer, RenderTarget, Resources};
use crate::time::FrameClock;

/// Window and canvas configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub canvas: CanvasConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "easel".to_string(),
            initial_size: LogicalSize::new(450.0, 800.0),
            canvas: CanvasConfig::default(),
        }
    }
}

/// Entry point: opens a window and drives a [`Sketch`] until it exits.
pub struct Runtime;

impl Runtime {
    pub fn run<S>(config: RuntimeConfig, gpu_init: GpuInit, sketch: S) -> Result<()>
    where
        S: Sketch + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, sketch);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<S: Sketch + 'static> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    sketch: S,

    canvas: Canvas,
    composer: FrameComposer,
    window: Option<WindowEntry>,

    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<S: Sketch + 'static> AppState<S> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, sketch: S) -> Self {
        let canvas = Canvas::new(config.canvas.clone());
        Self {
            config,
            gpu_init,
            sketch,
            canvas,
            composer: FrameComposer::new(),
            window: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let (sketch, canvas, composer) = (&mut self.sketch, &mut self.canvas, &mut self.composer);
        entry.with_gpu(|gpu| {
            canvas.begin_frame(gpu.device_size());
            let mut resources = Resources::new(gpu.render_ctx(), composer);
            sketch.setup(canvas, &mut resources)
        })
        .context("sketch setup failed")?;

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
        Ok(())
    }

    /// Records and presents one frame. Returns `false` when the loop should stop.
    fn redraw(&mut self) -> bool {
        let Some(entry) = self.window.as_mut() else { return true };
        let (sketch, canvas, composer) = (&mut self.sketch, &mut self.canvas, &mut self.composer);

        entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let gpu = fields.gpu;

            canvas.begin_frame(gpu.device_size());
            let control = {
                let mut resources = Resources::new(gpu.render_ctx(), composer);
                sketch.update(time, &mut resources)
            };
            if control == AppControl::Exit {
                return false;
            }
            sketch.draw(canvas);

            let mut frame = match gpu.begin_frame() {
                Ok(f) => f,
                Err(err) => {
                    log::debug!("surface acquire failed: {err}");
                    return gpu.handle_surface_error(err) != SurfaceErrorAction::Fatal;
                }
            };

            let size = gpu.size();
            {
                let ctx = gpu.render_ctx();
                let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, (size.width, size.height));
                composer.render(&ctx, &mut target, canvas.frame());
            }

            fields.window.pre_present_notify();
            gpu.submit(frame);
            true
        })
    }
}

impl<S: Sketch + 'static> ApplicationHandler for AppState<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw; the canvas is immediate-mode.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.sketch.on_window_event(&event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => {
                if !self.redraw() {
                    self.exit_requested = true;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}
