use core::f32::consts::{PI, TAU};

use easel_engine::asset::{Asset, Image, StorageOrigin, Texture};
use easel_engine::canvas::Canvas;
use easel_engine::coords::{Rect, Vec2};
use easel_engine::core::{AppControl, Sketch};
use easel_engine::device::GpuInit;
use easel_engine::logging::{init_logging, LoggingConfig};
use easel_engine::paint::Color;
use easel_engine::render::Resources;
use easel_engine::style::{Anchor, LineCap};
use easel_engine::time::FrameTime;
use easel_engine::window::{Runtime, RuntimeConfig};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

const FEED_SIZE: u32 = 64;

/// Tour of every primitive family on a 720×1280 canvas.
struct Studio {
    t: f32,
    checker: Asset<Image>,
    feed: Option<Texture>,
    feed_pixels: Vec<u8>,
    has_font: bool,
}

impl Studio {
    fn new() -> Self {
        Self {
            t: 0.0,
            checker: Asset::Pending,
            feed: None,
            feed_pixels: Vec::new(),
            has_font: false,
        }
    }
}

impl Sketch for Studio {
    fn setup(&mut self, canvas: &mut Canvas, resources: &mut Resources<'_>) -> anyhow::Result<()> {
        canvas.set_background(Color::from_srgb_u8(18, 20, 28, 255));
        canvas.set_border_color(Color::from_srgb_u8(6, 6, 8, 255));

        // Stored bottom row first, so it exercises the flipped quad.
        let checker = checkerboard(32, 8);
        self.checker = Asset::Ready(resources.upload_image(&checker, 32, 32, StorageOrigin::BottomLeft)?);

        self.feed_pixels = vec![0; (FEED_SIZE * FEED_SIZE * 4) as usize];
        self.feed = Some(resources.upload_texture(
            &self.feed_pixels,
            FEED_SIZE,
            FEED_SIZE,
            StorageOrigin::TopLeft,
            1,
        )?);

        match load_font() {
            Some(bytes) => {
                let font = canvas.load_font(&bytes)?;
                canvas.set_font(Some(font));
                canvas.set_font_size(28.0)?;
                self.has_font = true;
            }
            None => log::warn!("no system font found; text is skipped"),
        }
        Ok(())
    }

    fn update(&mut self, time: FrameTime, resources: &mut Resources<'_>) -> AppControl {
        self.t = time.elapsed;

        if let Some(feed) = self.feed.as_ref() {
            fill_feed(&mut self.feed_pixels, self.t);
            if let Err(err) = resources.update_texture(feed, &self.feed_pixels) {
                log::error!("feed update failed: {err:#}");
            }
        }
        AppControl::Continue
    }

    fn draw(&mut self, canvas: &mut Canvas) {
        let size = canvas.canvas_size();

        // Orbiting filled circles, sharing one cached mesh.
        canvas.with_coordinates(|c| {
            c.translate(Vec2::new(size.x * 0.5, 220.0));
            for i in 0..8 {
                let a = self.t + i as f32 * TAU / 8.0;
                let hue = i as f32 / 8.0;
                c.set_color(Color::from_straight(hue, 0.6, 1.0 - hue, 1.0));
                c.fill_circle_at(Vec2::new(a.cos(), a.sin()) * 140.0, 24.0);
            }
            c.set_color(Color::WHITE.with_alpha(0.5));
            c.set_line_width(4.0).ok();
            c.draw_circle_at(Vec2::zero(), 140.0);
        });

        // Anchored, rotating rectangles.
        {
            let mut c = canvas.style_scope();
            c.set_rect_anchor(Anchor::Center);
            c.set_color(Color::from_srgb_u8(240, 180, 40, 255));
            c.fill_rect_at(Rect::new(180.0, 560.0, 160.0, 90.0), self.t * 0.7);
            c.set_color(Color::from_srgb_u8(90, 200, 250, 255));
            c.set_line_width(6.0).ok();
            c.draw_rect_at(Rect::new(540.0, 560.0, 160.0, 90.0), -self.t * 0.7);
        }

        // Lines with both caps.
        canvas.with_style(|c| {
            c.set_line_width(12.0).ok();
            c.set_color(Color::from_srgb_u8(220, 80, 120, 255));
            c.set_line_cap(LineCap::Butt);
            c.draw_line_at(Vec2::new(80.0, 720.0), Vec2::new(640.0, 720.0));
            c.set_line_cap(LineCap::Square);
            c.draw_line_at(Vec2::new(80.0, 770.0), Vec2::new(640.0, 770.0));
        });

        // Images and the streaming texture.
        canvas.with_style(|c| {
            c.set_rect_anchor(Anchor::Center);
            c.draw_image_at(&self.checker, Rect::new(200.0, 930.0, 180.0, 180.0), 0.0);
            if let Some(feed) = self.feed.as_ref() {
                c.draw_texture_at(feed, Rect::new(520.0, 930.0, 180.0, 180.0), (self.t * 0.5).sin() * PI * 0.1);
            }
        });

        // Text with a translucent backdrop.
        if self.has_font {
            canvas.with_style(|c| {
                let label = "easel: immediate-mode canvas";
                let extent = c.measure_text(label);
                c.set_rect_anchor(Anchor::Center);
                c.set_color(Color::BLACK.with_alpha(0.6));
                c.fill_rect_at(Rect::from_origin_size(Vec2::new(size.x * 0.5, 1160.0), extent + Vec2::splat(24.0)), 0.0);
                c.set_text_anchor(Anchor::Center);
                c.set_color(Color::WHITE);
                c.draw_text_at(label, Vec2::new(size.x * 0.5, 1160.0), 0.0);
            });
        }
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event
            && event.state == ElementState::Pressed
            && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
        {
            return AppControl::Exit;
        }
        AppControl::Continue
    }
}

fn checkerboard(size: u32, cell: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            // Bottom rows tinted so the orientation is visible.
            let warm = y < size / 4;
            match (on, warm) {
                (true, true) => [250, 120, 60, 255],
                (true, false) => [235, 235, 235, 255],
                (false, _) => [40, 40, 48, 255],
            }
        })
        .collect()
}

fn fill_feed(pixels: &mut [u8], t: f32) {
    for (i, px) in pixels.chunks_exact_mut(4).enumerate() {
        let x = (i as u32 % FEED_SIZE) as f32 / FEED_SIZE as f32;
        let y = (i as u32 / FEED_SIZE) as f32 / FEED_SIZE as f32;
        let wave = ((x * 6.0 + t).sin() * 0.5 + 0.5) * 255.0;
        px.copy_from_slice(&[wave as u8, (y * 255.0) as u8, 160, 255]);
    }
}

fn load_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Easel Studio".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), Studio::new())
}
