use super::{Affine, Rect, Vec2};

/// Maps the logical canvas onto the physical device surface.
///
/// The whole canvas is always visible: the canvas is scaled uniformly by the
/// smaller of the two axis ratios and centered, leaving a letterbox border on the
/// other axis.
///
/// Units:
/// - `canvas` and `border` are canvas units
/// - `device` is physical pixels
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasMapping {
    canvas: Vec2,
    device: Vec2,
    units_per_pixel: f32,
    border: Vec2,
}

impl CanvasMapping {
    /// Creates a mapping. Non-positive sizes fall back to 1×1.
    pub fn new(canvas: Vec2, device: Vec2) -> Self {
        let mut m = Self {
            canvas: Vec2::splat(1.0),
            device: Vec2::splat(1.0),
            units_per_pixel: 1.0,
            border: Vec2::zero(),
        };
        m.configure(canvas, device);
        m
    }

    /// Recomputes scale and border.
    ///
    /// Returns `true` if the mapping changed. Invalid sizes (non-positive or
    /// non-finite) are rejected per axis pair and the previous value is kept.
    pub fn configure(&mut self, canvas: Vec2, device: Vec2) -> bool {
        let canvas = if is_valid_size(canvas) { canvas } else { self.canvas };
        let device = if is_valid_size(device) { device } else { self.device };

        if canvas == self.canvas && device == self.device {
            return false;
        }

        self.canvas = canvas;
        self.device = device;
        self.units_per_pixel = (canvas.x / device.x).max(canvas.y / device.y);

        let mapped = device * self.units_per_pixel;
        self.border = (mapped - canvas) * 0.5;

        log::debug!(
            "canvas mapping: canvas={}x{} device={}x{} scale={:.4} border=({:.2}, {:.2})",
            canvas.x,
            canvas.y,
            device.x,
            device.y,
            self.scale(),
            self.border.x,
            self.border.y
        );
        true
    }

    #[inline]
    pub fn canvas_size(&self) -> Vec2 {
        self.canvas
    }

    #[inline]
    pub fn device_size(&self) -> Vec2 {
        self.device
    }

    /// Canvas units covered by one device pixel: `max(canvas / device)` per axis.
    #[inline]
    pub fn units_per_pixel(&self) -> f32 {
        self.units_per_pixel
    }

    /// Device pixels per canvas unit.
    #[inline]
    pub fn scale(&self) -> f32 {
        1.0 / self.units_per_pixel
    }

    /// Letterbox padding on each side, in canvas units.
    #[inline]
    pub fn border(&self) -> Vec2 {
        self.border
    }

    #[inline]
    pub fn canvas_to_device(&self, p: Vec2) -> Vec2 {
        (p + self.border) / self.units_per_pixel
    }

    #[inline]
    pub fn device_to_canvas(&self, p: Vec2) -> Vec2 {
        p * self.units_per_pixel - self.border
    }

    /// The canvas region on the device surface, in pixels.
    pub fn canvas_rect_in_device(&self) -> Rect {
        let origin = self.canvas_to_device(Vec2::zero());
        let max = self.canvas_to_device(self.canvas);
        Rect::from_origin_size(origin, max - origin)
    }

    /// Affine form of [`canvas_to_device`](Self::canvas_to_device).
    pub fn canvas_to_device_affine(&self) -> Affine {
        Affine::from_translate(self.border).mul(Affine::from_scale(Vec2::splat(self.scale())))
    }
}

impl Default for CanvasMapping {
    fn default() -> Self {
        Self::new(Vec2::new(720.0, 1280.0), Vec2::new(720.0, 1280.0))
    }
}

#[inline]
fn is_valid_size(v: Vec2) -> bool {
    v.is_finite() && v.x > 0.0 && v.y > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    // ── letterboxing ──────────────────────────────────────────────────────

    #[test]
    fn matching_aspect_has_no_border() {
        let m = CanvasMapping::new(Vec2::new(720.0, 1280.0), Vec2::new(1080.0, 1920.0));
        assert!(approx(m.scale(), 1.5, 1e-5));
        assert!(approx(m.border().x, 0.0, 1e-3));
        assert!(approx(m.border().y, 0.0, 1e-3));
    }

    #[test]
    fn portrait_canvas_on_landscape_device_pads_horizontally() {
        let m = CanvasMapping::new(Vec2::new(720.0, 1280.0), Vec2::new(1920.0, 1080.0));
        // max(720/1920, 1280/1080) = 1280/1080
        assert!(approx(m.units_per_pixel(), 1280.0 / 1080.0, 1e-5));
        // mapped device width = 1920 * 1.185 ≈ 2275.6
        let expected = (1920.0 * (1280.0 / 1080.0) - 720.0) / 2.0;
        assert!(approx(m.border().x, expected, 1e-2));
        assert!(approx(m.border().y, 0.0, 1e-3));
        assert!(approx(m.border().x, 777.78, 0.1));
    }

    #[test]
    fn canvas_rect_is_centered_on_device() {
        let m = CanvasMapping::new(Vec2::new(100.0, 100.0), Vec2::new(400.0, 200.0));
        let r = m.canvas_rect_in_device();
        assert!(approx(r.origin.x, 100.0, 1e-3));
        assert!(approx(r.origin.y, 0.0, 1e-3));
        assert!(approx(r.size.x, 200.0, 1e-3));
        assert!(approx(r.size.y, 200.0, 1e-3));
    }

    // ── round trip ────────────────────────────────────────────────────────

    #[test]
    fn canvas_device_round_trip() {
        let sizes = [
            (Vec2::new(720.0, 1280.0), Vec2::new(1920.0, 1080.0)),
            (Vec2::new(720.0, 1280.0), Vec2::new(1080.0, 1920.0)),
            (Vec2::new(320.0, 240.0), Vec2::new(333.0, 1017.0)),
        ];
        for (canvas, device) in sizes {
            let m = CanvasMapping::new(canvas, device);
            for p in [Vec2::zero(), Vec2::new(13.5, 77.25), canvas * 0.999] {
                let q = m.device_to_canvas(m.canvas_to_device(p));
                assert!(approx(q.x, p.x, 1e-2) && approx(q.y, p.y, 1e-2), "{p:?} -> {q:?}");
            }
        }
    }

    #[test]
    fn affine_matches_point_mapping() {
        let m = CanvasMapping::new(Vec2::new(720.0, 1280.0), Vec2::new(1920.0, 1080.0));
        let p = Vec2::new(100.0, 200.0);
        let a = m.canvas_to_device_affine().apply(p);
        let b = m.canvas_to_device(p);
        assert!(approx(a.x, b.x, 1e-3) && approx(a.y, b.y, 1e-3));
    }

    // ── configure ─────────────────────────────────────────────────────────

    #[test]
    fn configure_reports_changes_only() {
        let mut m = CanvasMapping::new(Vec2::new(100.0, 100.0), Vec2::new(200.0, 200.0));
        assert!(!m.configure(Vec2::new(100.0, 100.0), Vec2::new(200.0, 200.0)));
        assert!(m.configure(Vec2::new(100.0, 100.0), Vec2::new(300.0, 200.0)));
    }

    #[test]
    fn configure_rejects_zero_device() {
        let mut m = CanvasMapping::new(Vec2::new(100.0, 100.0), Vec2::new(200.0, 200.0));
        assert!(!m.configure(Vec2::new(100.0, 100.0), Vec2::new(0.0, 0.0)));
        assert_eq!(m.device_size(), Vec2::new(200.0, 200.0));
    }
}
