use std::collections::HashMap;
use std::rc::Rc;

use crate::asset::{Asset, Image, ImageOrientation, Texture, TextureId};
use crate::cache::ExpiringCache;
use crate::coords::{Affine, CanvasMapping, Rect, Vec2};
use crate::geometry::{self, Mesh, MeshId, ScratchPool};
use crate::paint::{Color, Material, TextureSource};
use crate::scene::{DepthCounter, DrawCmd, FrameLists, MeshRef};
use crate::style::{Anchor, LineCap, StateStack, Style, StyleError};
use crate::text::{self, AtlasError, FontId, FontLoadError, FontSystem, GlyphAtlas, TextBlock};

use super::{CanvasConfig, CoordinateScope, Drawable, FrameStats, FrameView, StyleScope};

/// Cache key for text meshes. The anchor only moves the block, but entries stay
/// per anchor so a re-anchored string ages independently.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct TextKey {
    text: String,
    color: [u32; 4],
    font: FontId,
    size: u32,
    anchor: Anchor,
}

/// Output of the resolve step: what to draw, where, and how.
struct Resolved {
    mesh: MeshRef,
    transform: Affine,
    material: Material,
}

/// Immediate-mode drawing surface.
///
/// Owns all per-frame state: the current style and coordinate transform, their
/// save/restore stacks, the geometry and text caches, the scratch mesh pool and
/// the two command lists the renderer consumes.
///
/// Frame protocol:
/// 1. [`begin_frame`](Self::begin_frame) with the current device size
/// 2. any number of draw calls
/// 3. [`frame`](Self::frame) to hand the recorded commands to the renderer
pub struct Canvas {
    config: CanvasConfig,
    mapping: CanvasMapping,
    raster_scale: f32,

    style: Style,
    transform: Affine,
    coordinates: StateStack<Affine>,
    styles: StateStack<Style>,

    circles: ExpiringCache<u32, Rc<Mesh>>,
    texts: ExpiringCache<TextKey, TextBlock>,
    quads: HashMap<ImageOrientation, Rc<Mesh>>,
    scratch: ScratchPool,

    lists: FrameLists,
    depth: DepthCounter,

    fonts: FontSystem,
    atlas: GlyphAtlas,

    released: Vec<MeshId>,
    stats: FrameStats,
    last_logged: FrameStats,
}

impl Canvas {
    pub fn new(config: CanvasConfig) -> Self {
        let mapping = CanvasMapping::new(config.canvas_size, config.canvas_size);
        Self {
            mapping,
            raster_scale: quantize_raster_scale(mapping.scale()),
            style: config.style,
            transform: Affine::IDENTITY,
            coordinates: StateStack::new("coordinate"),
            styles: StateStack::new("style"),
            circles: ExpiringCache::new(),
            texts: ExpiringCache::new(),
            quads: HashMap::new(),
            scratch: ScratchPool::new(),
            lists: FrameLists::default(),
            depth: DepthCounter::default(),
            fonts: FontSystem::new(),
            atlas: GlyphAtlas::new(config.atlas_size),
            released: Vec::new(),
            stats: FrameStats::default(),
            last_logged: FrameStats::default(),
            config,
        }
    }

    // ── frame ──────────────────────────────────────────────────────────────

    /// Starts a new frame against a device surface of `device_size` pixels.
    ///
    /// Reconfigures the mapping if the size changed, resets the command lists,
    /// the depth counter and the coordinate transform, ages the caches and
    /// returns every scratch mesh to the pool. The current style carries over.
    pub fn begin_frame(&mut self, device_size: Vec2) {
        if self.mapping.configure(self.config.canvas_size, device_size) {
            let scale = quantize_raster_scale(self.mapping.scale());
            if scale != self.raster_scale {
                self.raster_scale = scale;
                let released = &mut self.released;
                self.texts.clear(|_, block| released.push(block.mesh.id()));
                log::debug!("text raster scale now {scale}; text cache cleared");
            }
        }

        if !self.coordinates.is_empty() || !self.styles.is_empty() {
            log::warn!(
                "frame ended with unbalanced stacks (coordinate depth {}, style depth {})",
                self.coordinates.depth(),
                self.styles.depth()
            );
            self.coordinates.clear();
            self.styles.clear();
        }

        self.lists.clear();
        self.depth.reset();
        self.transform = Affine::IDENTITY;

        let released = &mut self.released;
        self.circles.tick(|_, mesh| released.push(mesh.id()));
        self.texts.tick(|_, block| released.push(block.mesh.id()));
        self.scratch.recycle();

        self.stats = FrameStats::default();
    }

    /// Commands recorded since [`begin_frame`](Self::begin_frame), ready for the renderer.
    ///
    /// Drains the released-mesh list, so call it once per frame. The atlas dirty band
    /// stays pending until the renderer uploads it.
    pub fn frame(&mut self) -> FrameView<'_> {
        self.stats.opaque = self.lists.opaque.len();
        self.stats.transparent = self.lists.transparent.len();
        self.stats.scratch_meshes = self.scratch.in_use();
        self.stats.cached_circles = self.circles.len();
        self.stats.cached_texts = self.texts.len();

        if !same_shape(&self.stats, &self.last_logged) {
            log::debug!("frame stats: {:?}", self.stats);
            self.last_logged = self.stats;
        }

        let released = std::mem::take(&mut self.released);

        FrameView {
            mapping: &self.mapping,
            background: self.config.background,
            border: self.config.border,
            opaque: self.lists.opaque.items(),
            transparent: self.lists.transparent.items(),
            scratch: &self.scratch,
            atlas: &mut self.atlas,
            released,
            stats: self.stats,
        }
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    // ── mapping ────────────────────────────────────────────────────────────

    #[inline]
    pub fn mapping(&self) -> &CanvasMapping {
        &self.mapping
    }

    #[inline]
    pub fn canvas_size(&self) -> Vec2 {
        self.mapping.canvas_size()
    }

    #[inline]
    pub fn device_size(&self) -> Vec2 {
        self.mapping.device_size()
    }

    #[inline]
    pub fn canvas_to_device(&self, p: Vec2) -> Vec2 {
        self.mapping.canvas_to_device(p)
    }

    #[inline]
    pub fn device_to_canvas(&self, p: Vec2) -> Vec2 {
        self.mapping.device_to_canvas(p)
    }

    pub fn set_background(&mut self, color: Color) {
        self.config.background = color;
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.config.background
    }

    pub fn set_border_color(&mut self, color: Color) {
        self.config.border = color;
    }

    #[inline]
    pub fn border_color(&self) -> Color {
        self.config.border
    }

    // ── style ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.style.color
    }

    /// Rejects non-positive or non-finite widths and keeps the previous value.
    pub fn set_line_width(&mut self, width: f32) -> Result<(), StyleError> {
        self.style
            .try_set_line_width(width)
            .inspect_err(|e| log::warn!("set_line_width rejected: {e}"))
    }

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.style.line_width()
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.style.line_cap = cap;
    }

    #[inline]
    pub fn line_cap(&self) -> LineCap {
        self.style.line_cap
    }

    /// Rejects resolutions below 3 and keeps the previous value.
    pub fn set_circle_resolution(&mut self, resolution: u32) -> Result<(), StyleError> {
        self.style
            .try_set_circle_resolution(resolution)
            .inspect_err(|e| log::warn!("set_circle_resolution rejected: {e}"))
    }

    #[inline]
    pub fn circle_resolution(&self) -> u32 {
        self.style.circle_resolution()
    }

    pub fn set_font(&mut self, font: Option<FontId>) {
        self.style.font = font;
    }

    #[inline]
    pub fn font(&self) -> Option<FontId> {
        self.style.font
    }

    /// Rejects sizes below 1 and keeps the previous value.
    pub fn set_font_size(&mut self, size: f32) -> Result<(), StyleError> {
        self.style
            .try_set_font_size(size)
            .inspect_err(|e| log::warn!("set_font_size rejected: {e}"))
    }

    #[inline]
    pub fn font_size(&self) -> f32 {
        self.style.font_size()
    }

    pub fn set_rect_anchor(&mut self, anchor: Anchor) {
        self.style.rect_anchor = anchor;
    }

    #[inline]
    pub fn rect_anchor(&self) -> Anchor {
        self.style.rect_anchor
    }

    pub fn set_text_anchor(&mut self, anchor: Anchor) {
        self.style.text_anchor = anchor;
    }

    #[inline]
    pub fn text_anchor(&self) -> Anchor {
        self.style.text_anchor
    }

    // ── fonts ──────────────────────────────────────────────────────────────

    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        self.fonts.load_font(bytes)
    }

    #[inline]
    pub fn fonts(&self) -> &FontSystem {
        &self.fonts
    }

    /// Extent of `text` in the current font and size; zero without a font.
    pub fn measure_text(&self, text: &str) -> Vec2 {
        match self.style.font {
            Some(id) => self.fonts.measure_text(text, id, self.style.font_size()),
            None => Vec2::zero(),
        }
    }

    // ── coordinate transform ───────────────────────────────────────────────

    #[inline]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn translate(&mut self, offset: Vec2) {
        if !offset.is_finite() {
            log::trace!("translate ignored: non-finite offset");
            return;
        }
        self.transform = Affine::from_translate(offset).mul(self.transform);
    }

    pub fn rotate(&mut self, radians: f32) {
        if !radians.is_finite() {
            log::trace!("rotate ignored: non-finite angle");
            return;
        }
        self.transform = Affine::from_rotate(radians).mul(self.transform);
    }

    /// A zero component would collapse everything drawn after it; such calls are ignored.
    pub fn scale(&mut self, factor: Vec2) {
        if !factor.is_finite() || factor.x == 0.0 || factor.y == 0.0 {
            log::trace!("scale ignored: {factor:?}");
            return;
        }
        self.transform = Affine::from_scale(factor).mul(self.transform);
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    pub fn clear_transform(&mut self) {
        self.transform = Affine::IDENTITY;
    }

    // ── stacks ─────────────────────────────────────────────────────────────

    pub fn push_coordinate(&mut self) {
        self.coordinates.push(self.transform);
    }

    /// # Panics
    /// If there is no matching [`push_coordinate`](Self::push_coordinate).
    #[track_caller]
    pub fn pop_coordinate(&mut self) {
        self.transform = self.coordinates.pop();
    }

    pub fn push_style(&mut self) {
        self.styles.push(self.style);
    }

    /// # Panics
    /// If there is no matching [`push_style`](Self::push_style).
    #[track_caller]
    pub fn pop_style(&mut self) {
        self.style = self.styles.pop();
    }

    /// Guard that restores the coordinate transform when dropped.
    pub fn coordinate_scope(&mut self) -> CoordinateScope<'_> {
        CoordinateScope::new(self)
    }

    /// Guard that restores the style when dropped.
    pub fn style_scope(&mut self) -> StyleScope<'_> {
        StyleScope::new(self)
    }

    pub fn with_coordinates<R>(&mut self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        let mut scope = self.coordinate_scope();
        f(&mut scope)
    }

    pub fn with_style<R>(&mut self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        let mut scope = self.style_scope();
        f(&mut scope)
    }

    // ── draw calls ─────────────────────────────────────────────────────────

    /// Unit-radius circle at the origin.
    pub fn fill_circle(&mut self) {
        self.fill_circle_at(Vec2::zero(), 1.0);
    }

    pub fn fill_circle_at(&mut self, center: Vec2, radius: f32) {
        self.draw(Drawable::FillCircle { center, radius });
    }

    pub fn draw_circle(&mut self) {
        self.draw_circle_at(Vec2::zero(), 1.0);
    }

    pub fn draw_circle_at(&mut self, center: Vec2, radius: f32) {
        self.draw(Drawable::StrokeCircle { center, radius });
    }

    /// Unit square at the origin, placed by the rect anchor.
    pub fn fill_rect(&mut self) {
        self.fill_rect_at(Rect::unit(), 0.0);
    }

    /// `rect.origin` is where the rect anchor lands; rotation is about that point.
    pub fn fill_rect_at(&mut self, rect: Rect, rotation: f32) {
        self.draw(Drawable::FillRect { rect, rotation });
    }

    pub fn draw_rect(&mut self) {
        self.draw_rect_at(Rect::unit(), 0.0);
    }

    pub fn draw_rect_at(&mut self, rect: Rect, rotation: f32) {
        self.draw(Drawable::StrokeRect { rect, rotation });
    }

    /// Unit segment along +X from the origin.
    pub fn draw_line(&mut self) {
        self.draw_line_at(Vec2::zero(), Vec2::new(1.0, 0.0));
    }

    pub fn draw_line_at(&mut self, from: Vec2, to: Vec2) {
        self.draw(Drawable::Line { from, to });
    }

    /// Draws the image at its natural size at the origin. Skipped unless `Ready`.
    pub fn draw_image(&mut self, image: &Asset<Image>) {
        if let Some(&image) = self.ready_or_skip(image, "draw_image") {
            self.draw(Drawable::Image { image, rect: None, rotation: 0.0 });
        }
    }

    pub fn draw_image_at(&mut self, image: &Asset<Image>, rect: Rect, rotation: f32) {
        if let Some(&image) = self.ready_or_skip(image, "draw_image") {
            self.draw(Drawable::Image { image, rect: Some(rect), rotation });
        }
    }

    pub fn draw_text(&mut self, text: &str) {
        self.draw_text_at(text, Vec2::zero(), 0.0);
    }

    /// `position` is where the text anchor lands; rotation is about that point.
    pub fn draw_text_at(&mut self, text: &str, position: Vec2, rotation: f32) {
        self.draw(Drawable::Text { text, position, rotation });
    }

    /// Draws the texture upright at its display size at the origin.
    pub fn draw_texture(&mut self, texture: &Texture) {
        self.draw(Drawable::Texture { texture: *texture, rect: None, rotation: 0.0 });
    }

    pub fn draw_texture_at(&mut self, texture: &Texture, rect: Rect, rotation: f32) {
        self.draw(Drawable::Texture { texture: *texture, rect: Some(rect), rotation });
    }

    /// Validates, resolves and enqueues one primitive.
    ///
    /// Invalid or degenerate primitives are dropped without consuming a depth value.
    pub fn draw(&mut self, drawable: Drawable<'_>) {
        let Some(resolved) = self.resolve(&drawable) else {
            log::trace!("{} skipped: {:?}", drawable.kind(), drawable);
            self.stats.skipped += 1;
            return;
        };
        if !resolved.transform.is_finite() {
            log::trace!("{} skipped: non-finite transform", drawable.kind());
            self.stats.skipped += 1;
            return;
        }

        let depth = self.depth.next();
        self.lists.enqueue(DrawCmd {
            mesh: resolved.mesh,
            transform: resolved.transform,
            depth,
            material: resolved.material,
        });
    }

    fn ready_or_skip<'a, T: std::fmt::Debug>(&mut self, asset: &'a Asset<T>, kind: &str) -> Option<&'a T> {
        let ready = asset.ready();
        if ready.is_none() {
            log::trace!("{kind} skipped: asset {asset:?}");
            self.stats.skipped += 1;
        }
        ready
    }

    // ── resolve ────────────────────────────────────────────────────────────

    fn resolve(&mut self, drawable: &Drawable<'_>) -> Option<Resolved> {
        let style = self.style;
        let current = self.transform;
        let solid = Material::Solid(style.color);

        match *drawable {
            Drawable::FillCircle { center, radius } => {
                let local = circle_local(center, radius)?;
                let mesh = self.circle_mesh(style.circle_resolution());
                Some(Resolved {
                    mesh: MeshRef::Shared(mesh),
                    transform: local.mul(current),
                    material: solid,
                })
            }
            Drawable::StrokeCircle { center, radius } => {
                let ring = circle_local(center, radius)?.mul(current);
                let (resolution, width) = (style.circle_resolution(), style.line_width());
                let id = self
                    .scratch
                    .build(|mesh| geometry::wire_circle(mesh, ring, resolution, width))?;
                Some(Resolved {
                    mesh: MeshRef::Scratch(id),
                    transform: Affine::IDENTITY,
                    material: solid,
                })
            }
            Drawable::FillRect { rect, rotation } => {
                let local = rect_local(rect, rotation)?;
                Some(Resolved {
                    mesh: MeshRef::Shared(self.quad(ImageOrientation::UPRIGHT)),
                    transform: unit_anchor(style.rect_anchor).mul(local).mul(current),
                    material: solid,
                })
            }
            Drawable::StrokeRect { rect, rotation } => {
                let full = unit_anchor(style.rect_anchor).mul(rect_local(rect, rotation)?).mul(current);
                let corners = Rect::unit().corners().map(|c| full.apply(c));
                let width = style.line_width();
                let id = self
                    .scratch
                    .build(|mesh| geometry::wire_rect(mesh, corners, width))?;
                Some(Resolved {
                    mesh: MeshRef::Scratch(id),
                    transform: Affine::IDENTITY,
                    material: solid,
                })
            }
            Drawable::Line { from, to } => {
                let (a, b) = (current.apply(from), current.apply(to));
                let (width, cap) = (style.line_width(), style.line_cap);
                let id = self
                    .scratch
                    .build(|mesh| geometry::line_segment(mesh, a, b, width, cap))?;
                Some(Resolved {
                    mesh: MeshRef::Scratch(id),
                    transform: Affine::IDENTITY,
                    material: solid,
                })
            }
            Drawable::Image { image, rect, rotation } => {
                let natural = Vec2::new(image.width as f32, image.height as f32);
                self.resolve_textured(image.texture, image.orientation(), natural, rect, rotation)
            }
            Drawable::Texture { texture, rect, rotation } => {
                let (w, h) = texture.display_size();
                let natural = Vec2::new(w as f32, h as f32);
                self.resolve_textured(texture.texture, texture.orientation(), natural, rect, rotation)
            }
            Drawable::Text { text, position, rotation } => self.resolve_text(text, position, rotation),
        }
    }

    fn resolve_textured(
        &mut self,
        texture: TextureId,
        orientation: ImageOrientation,
        natural: Vec2,
        rect: Option<Rect>,
        rotation: f32,
    ) -> Option<Resolved> {
        let rect = rect.unwrap_or(Rect::from_origin_size(Vec2::zero(), natural));
        let local = rect_local(rect, rotation)?;
        Some(Resolved {
            mesh: MeshRef::Shared(self.quad(orientation)),
            transform: unit_anchor(self.style.rect_anchor).mul(local).mul(self.transform),
            material: Material::Textured {
                source: TextureSource::Texture(texture),
                tint: Color::WHITE,
            },
        })
    }

    fn resolve_text(&mut self, text: &str, position: Vec2, rotation: f32) -> Option<Resolved> {
        if text.is_empty() || !position.is_finite() || !rotation.is_finite() {
            return None;
        }
        let style = self.style;
        let font = style.font?;

        let key = TextKey {
            text: text.to_owned(),
            color: style.color.key_bits(),
            font,
            size: style.font_size().to_bits(),
            anchor: style.text_anchor,
        };
        let block = match self.texts.get(&key) {
            Some(block) => block.clone(),
            None => {
                let block = self.layout_text(font, text, style.font_size(), style.color)?;
                if let Some(rejected) = self.texts.insert(key, block.clone(), self.config.text_ttl) {
                    self.released.push(rejected.mesh.id());
                }
                block
            }
        };
        if block.mesh.is_empty() {
            return None;
        }

        let local = Affine::from_rotate(rotation).mul(Affine::from_translate(position));
        Some(Resolved {
            mesh: MeshRef::Shared(block.mesh),
            transform: style.text_anchor.pre_translation(block.extent).mul(local).mul(self.transform),
            material: Material::Textured {
                source: TextureSource::GlyphAtlas,
                tint: Color::WHITE,
            },
        })
    }

    /// Lays out text, rebuilding the atlas once if it runs out of room.
    ///
    /// A rebuild invalidates every cached text mesh and every glyph command already
    /// recorded this frame; those commands are dropped. Glyphs too large for any
    /// atlas are left out by the layout and never trigger a rebuild.
    fn layout_text(&mut self, font: FontId, text: &str, size: f32, color: Color) -> Option<TextBlock> {
        let face = self.fonts.get(font)?;
        match text::layout_text(face, &mut self.atlas, text, size, self.raster_scale, color) {
            Ok(block) => return Some(block),
            Err(AtlasError::Full) => {}
            Err(err) => {
                log::warn!("text skipped: {err}");
                return None;
            }
        }

        log::warn!("glyph atlas full; rebuilding");
        self.atlas.rebuild();
        self.stats.atlas_rebuilds += 1;
        let released = &mut self.released;
        self.texts.clear(|_, block| released.push(block.mesh.id()));
        self.lists.transparent.retain(|cmd| {
            !matches!(cmd.material, Material::Textured { source: TextureSource::GlyphAtlas, .. })
        });

        match text::layout_text(face, &mut self.atlas, text, size, self.raster_scale, color) {
            Ok(block) => Some(block),
            Err(_) => {
                log::warn!("text does not fit an empty glyph atlas ({} chars at size {size})", text.len());
                None
            }
        }
    }

    fn circle_mesh(&mut self, resolution: u32) -> Rc<Mesh> {
        if let Some(mesh) = self.circles.get(&resolution) {
            return Rc::clone(mesh);
        }
        let mesh = Rc::new(geometry::fill_circle(resolution));
        log::trace!("built circle mesh, resolution {resolution}");
        if let Some(rejected) = self.circles.insert(resolution, Rc::clone(&mesh), self.config.circle_ttl) {
            self.released.push(rejected.id());
        }
        mesh
    }

    fn quad(&mut self, orientation: ImageOrientation) -> Rc<Mesh> {
        Rc::clone(
            self.quads
                .entry(orientation)
                .or_insert_with(|| Rc::new(geometry::unit_quad(orientation))),
        )
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

#[inline]
fn quantize_raster_scale(scale: f32) -> f32 {
    ((scale * 4.0).round() / 4.0).max(0.25)
}

/// Whether two stat snapshots match, ignoring per-frame skip and scratch counts.
fn same_shape(a: &FrameStats, b: &FrameStats) -> bool {
    a.opaque == b.opaque
        && a.transparent == b.transparent
        && a.cached_circles == b.cached_circles
        && a.cached_texts == b.cached_texts
        && a.atlas_rebuilds == b.atlas_rebuilds
}

fn circle_local(center: Vec2, radius: f32) -> Option<Affine> {
    if !(radius > 0.0) || !radius.is_finite() || !center.is_finite() {
        return None;
    }
    Some(Affine::from_scale(Vec2::splat(radius)).mul(Affine::from_translate(center)))
}

/// Unit quad → `rect`, rotated about `rect.origin`.
fn rect_local(rect: Rect, rotation: f32) -> Option<Affine> {
    if !rect.is_finite() || !rotation.is_finite() || rect.is_empty() {
        return None;
    }
    Some(Affine::from_trs(rect.origin, rotation, rect.size))
}

/// Anchor offset for unit-quad geometry; the rect size is applied after it.
#[inline]
fn unit_anchor(anchor: Anchor) -> Affine {
    anchor.pre_translation(Vec2::splat(1.0))
}
