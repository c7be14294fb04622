//! Raster surface with a DPI-scaled backing store and logical-unit drawing.

use crate::{RenderError, Result};
use glam::Vec2;
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, Paint, PathBuilder, Pixmap, PixmapPaint, PixmapRef,
    Rect, Stroke, Transform,
};
use tracing::debug;
use waveflow_core::Rgb;

/// Raster target for one visualizer.
///
/// The backing pixmap is sized `logical × device_pixel_ratio`; all drawing
/// happens in logical units through a uniform scale transform. The backing
/// store is reallocated only when the logical size or the pixel ratio
/// actually changes, never per frame.
pub struct Surface {
    pixmap: Pixmap,
    logical_width: f32,
    logical_height: f32,
    dpr: f32,
}

impl Surface {
    /// Allocate a surface for the given logical size and pixel ratio.
    pub fn new(width: u32, height: u32, dpr: f32) -> Result<Self> {
        let (bw, bh) = backing_dims(width, height, dpr);
        let pixmap =
            Pixmap::new(bw, bh).ok_or(RenderError::InvalidSurfaceSize(width, height, dpr))?;
        debug!("Surface created: {}x{} @ {} ({}x{} backing)", width, height, dpr, bw, bh);
        Ok(Self {
            pixmap,
            logical_width: width as f32,
            logical_height: height as f32,
            dpr: dpr.max(0.1),
        })
    }

    /// Resize the backing store; a no-op when nothing changed.
    ///
    /// Returns true when the surface was actually replaced (logical size or
    /// pixel ratio changed), so the host knows to re-initialize the active
    /// renderer.
    pub fn resize(&mut self, width: u32, height: u32, dpr: f32) -> Result<bool> {
        let dpr = dpr.max(0.1);
        if self.logical_width == width as f32
            && self.logical_height == height as f32
            && self.dpr == dpr
        {
            return Ok(false);
        }
        let (bw, bh) = backing_dims(width, height, dpr);
        self.pixmap =
            Pixmap::new(bw, bh).ok_or(RenderError::InvalidSurfaceSize(width, height, dpr))?;
        self.logical_width = width as f32;
        self.logical_height = height as f32;
        self.dpr = dpr;
        debug!("Surface resized: {}x{} @ {} ({}x{} backing)", width, height, dpr, bw, bh);
        Ok(true)
    }

    /// Logical size in drawing units
    pub fn logical_size(&self) -> (f32, f32) {
        (self.logical_width, self.logical_height)
    }

    /// Backing-store size in device pixels
    pub fn backing_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Device pixel ratio
    pub fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    /// Full clear to opaque black, or to transparent when a background
    /// layer sits behind the canvas.
    pub fn clear(&mut self, to_transparent: bool) {
        if to_transparent {
            self.pixmap.fill(Color::TRANSPARENT);
        } else {
            self.pixmap.fill(Color::BLACK);
        }
    }

    /// Low-opacity trail blend over the previous frame.
    ///
    /// With `erase` the fade removes image (destination-out), leaving any
    /// background layer behind the canvas undarkened; otherwise it is a
    /// translucent black fill.
    pub fn trail_fade(&mut self, alpha: f32, erase: bool) {
        let alpha = alpha.clamp(0.0, 1.0);
        let rect = match Rect::from_xywh(
            0.0,
            0.0,
            self.pixmap.width() as f32,
            self.pixmap.height() as f32,
        ) {
            Some(rect) => rect,
            None => return,
        };
        let mut paint = Paint::default();
        if erase {
            paint.set_color(Color::from_rgba(1.0, 1.0, 1.0, alpha).unwrap_or(Color::WHITE));
            paint.blend_mode = BlendMode::DestinationOut;
        } else {
            paint.set_color(Color::from_rgba(0.0, 0.0, 0.0, alpha).unwrap_or(Color::BLACK));
            paint.blend_mode = BlendMode::SourceOver;
        }
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Borrow a logical-unit drawing handle for one frame.
    pub fn canvas(&mut self) -> Canvas<'_> {
        let transform = Transform::from_scale(self.dpr, self.dpr);
        Canvas {
            width: self.logical_width,
            height: self.logical_height,
            pixmap: &mut self.pixmap,
            transform,
        }
    }

    /// Read access to the presented pixels
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

fn backing_dims(width: u32, height: u32, dpr: f32) -> (u32, u32) {
    let bw = (width as f32 * dpr.max(0.1)).round() as u32;
    let bh = (height as f32 * dpr.max(0.1)).round() as u32;
    (bw, bh)
}

/// Logical-unit drawing handle over the surface pixmap.
///
/// Every primitive guards its numeric inputs: non-finite coordinates,
/// non-positive radii and widths degrade to a no-op rather than reaching
/// the rasterizer.
pub struct Canvas<'a> {
    width: f32,
    height: f32,
    pixmap: &'a mut Pixmap,
    transform: Transform,
}

impl Canvas<'_> {
    /// Logical width
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Logical height
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Fill a circle.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb, alpha: f32) {
        self.fill_circle_blend(cx, cy, r, color, alpha, BlendMode::SourceOver);
    }

    /// Fill a circle with additive blending; used for glow embellishments.
    pub fn glow_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb, alpha: f32) {
        self.fill_circle_blend(cx, cy, r, color, alpha, BlendMode::Plus);
    }

    fn fill_circle_blend(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        color: Rgb,
        alpha: f32,
        blend_mode: BlendMode,
    ) {
        if !finite3(cx, cy, r) || r <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.push_circle(cx, cy, r);
        let Some(path) = pb.finish() else { return };
        let mut paint = solid_paint(color, alpha);
        paint.blend_mode = blend_mode;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }

    /// Stroke a circle outline.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, width: f32, color: Rgb, alpha: f32) {
        if !finite3(cx, cy, r) || r <= 0.0 || width <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.push_circle(cx, cy, r);
        let Some(path) = pb.finish() else { return };
        self.stroke(&path, width, color, alpha);
    }

    /// Stroke a line segment.
    pub fn stroke_line(&mut self, a: Vec2, b: Vec2, width: f32, color: Rgb, alpha: f32) {
        if !finite2(a) || !finite2(b) || width <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(a.x, a.y);
        pb.line_to(b.x, b.y);
        let Some(path) = pb.finish() else { return };
        self.stroke(&path, width, color, alpha);
    }

    /// Stroke an open polyline through `points`.
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgb, alpha: f32) {
        if points.len() < 2 || width <= 0.0 || points.iter().any(|p| !finite2(*p)) {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(points[0].x, points[0].y);
        for p in &points[1..] {
            pb.line_to(p.x, p.y);
        }
        let Some(path) = pb.finish() else { return };
        self.stroke(&path, width, color, alpha);
    }

    /// Stroke a circular arc from `start` sweeping `sweep` radians.
    pub fn stroke_arc(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        start: f32,
        sweep: f32,
        width: f32,
        color: Rgb,
        alpha: f32,
    ) {
        if !finite3(cx, cy, r) || !start.is_finite() || !sweep.is_finite() || r <= 0.0 {
            return;
        }
        // Flatten into segments; enough for smooth arcs at screen radii
        let segments = ((sweep.abs() * 16.0).ceil() as usize).clamp(2, 64);
        let mut points = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let angle = start + sweep * i as f32 / segments as f32;
            points.push(Vec2::new(cx + angle.cos() * r, cy + angle.sin() * r));
        }
        self.stroke_polyline(&points, width, color, alpha);
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        if !finite3(x, y, w) || !h.is_finite() || w <= 0.0 || h <= 0.0 {
            return;
        }
        let Some(rect) = Rect::from_xywh(x, y, w, h) else { return };
        let paint = solid_paint(color, alpha);
        self.pixmap.fill_rect(rect, &paint, self.transform, None);
    }

    /// Fill a closed polygon.
    pub fn fill_polygon(&mut self, points: &[Vec2], color: Rgb, alpha: f32) {
        if points.len() < 3 || points.iter().any(|p| !finite2(*p)) {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(points[0].x, points[0].y);
        for p in &points[1..] {
            pb.line_to(p.x, p.y);
        }
        pb.close();
        let Some(path) = pb.finish() else { return };
        let paint = solid_paint(color, alpha);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }

    /// Draw a pre-rendered sprite centered at `(cx, cy)` with independent
    /// x/y scales (non-uniform scale carries the wobble deformation).
    pub fn draw_sprite(
        &mut self,
        sprite: PixmapRef<'_>,
        cx: f32,
        cy: f32,
        scale_x: f32,
        scale_y: f32,
        opacity: f32,
    ) {
        if !finite3(cx, cy, scale_x) || !scale_y.is_finite() || scale_x <= 0.0 || scale_y <= 0.0 {
            return;
        }
        let half_w = sprite.width() as f32 * 0.5;
        let half_h = sprite.height() as f32 * 0.5;
        let transform = Transform::from_scale(scale_x, scale_y)
            .post_translate(cx - scale_x * half_w, cy - scale_y * half_h)
            .post_concat(self.transform);
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(0, 0, sprite, &paint, transform, None);
    }

    fn stroke(&mut self, path: &tiny_skia::Path, width: f32, color: Rgb, alpha: f32) {
        let paint = solid_paint(color, alpha);
        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, self.transform, None);
    }
}

fn solid_paint(color: Rgb, alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(
        color.r,
        color.g,
        color.b,
        (alpha.clamp(0.0, 1.0) * 255.0) as u8,
    );
    paint.anti_alias = true;
    paint
}

fn finite2(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

fn finite3(a: f32, b: f32, c: f32) -> bool {
    a.is_finite() && b.is_finite() && c.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_store_follows_dpr() {
        let surface = Surface::new(800, 600, 2.0).unwrap();
        assert_eq!(surface.backing_size(), (1600, 1200));
        assert_eq!(surface.logical_size(), (800.0, 600.0));
    }

    #[test]
    fn test_zero_size_is_an_error() {
        assert!(Surface::new(0, 100, 1.0).is_err());
        assert!(Surface::new(100, 0, 1.0).is_err());
    }

    #[test]
    fn test_resize_is_noop_for_same_dims() {
        let mut surface = Surface::new(400, 300, 1.0).unwrap();
        // Scribble something so we can detect a reallocation
        surface.canvas().fill_rect(0.0, 0.0, 10.0, 10.0, Rgb::new(255, 0, 0), 1.0);
        let before: Vec<u8> = surface.pixmap().data().to_vec();
        assert!(!surface.resize(400, 300, 1.0).unwrap());
        assert_eq!(surface.pixmap().data(), &before[..], "no-op resize must keep pixels");
        // Same backing store but new logical size still counts as a change
        assert!(surface.resize(800, 600, 0.5).unwrap());
    }

    #[test]
    fn test_nonfinite_primitives_are_skipped() {
        let mut surface = Surface::new(64, 64, 1.0).unwrap();
        let mut canvas = surface.canvas();
        canvas.fill_circle(f32::NAN, 10.0, 5.0, Rgb::new(255, 255, 255), 1.0);
        canvas.stroke_line(
            Vec2::new(0.0, f32::INFINITY),
            Vec2::new(10.0, 10.0),
            1.0,
            Rgb::new(255, 255, 255),
            1.0,
        );
        canvas.fill_rect(0.0, 0.0, -5.0, 5.0, Rgb::new(255, 255, 255), 1.0);
        // Nothing drawn: surface stays fully transparent
        assert!(surface.pixmap().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_trail_fade_darkens_but_keeps_content() {
        let mut surface = Surface::new(32, 32, 1.0).unwrap();
        surface.clear(false);
        surface
            .canvas()
            .fill_rect(8.0, 8.0, 16.0, 16.0, Rgb::new(255, 255, 255), 1.0);
        surface.trail_fade(0.2, false);
        let px = surface.pixmap().pixel(16, 16).unwrap();
        // Still clearly bright, but no longer pure white
        assert!(px.red() > 150 && px.red() < 255);
    }

    #[test]
    fn test_trail_fade_erase_reduces_alpha() {
        let mut surface = Surface::new(32, 32, 1.0).unwrap();
        surface.clear(true);
        surface
            .canvas()
            .fill_rect(0.0, 0.0, 32.0, 32.0, Rgb::new(0, 255, 0), 1.0);
        surface.trail_fade(0.5, true);
        let px = surface.pixmap().pixel(16, 16).unwrap();
        assert!(px.alpha() < 200, "destination-out must cut alpha, got {}", px.alpha());
    }
}
