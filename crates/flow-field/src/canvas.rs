//! Trail canvas.
//!
//! Instead of clearing between frames, the canvas is composited against
//! itself with a `destination-in` fill at a fixed alpha. Old strokes lose a
//! constant fraction of their opacity every frame, which is what makes a
//! particle's recent path read as a fading trail. The fade alpha therefore
//! sets the trail length and must match the configured value exactly.

use map_common::{PixelPoint, PixelSize};
use tiny_skia::{BlendMode, Color, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::error::{FlowFieldError, Result};
use crate::png;

/// RGBA raster that particle trails are drawn onto.
pub struct TrailCanvas {
    pixmap: Pixmap,
}

impl TrailCanvas {
    pub fn new(size: PixelSize) -> Result<Self> {
        let pixmap = Pixmap::new(size.width, size.height).ok_or(
            FlowFieldError::InvalidCanvasSize {
                width: size.width,
                height: size.height,
            },
        )?;
        Ok(Self { pixmap })
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.pixmap.width(), self.pixmap.height())
    }

    /// Multiply every pixel's alpha by `alpha` (destination-in composite).
    pub fn fade(&mut self, alpha: f32) {
        let Some(color) = Color::from_rgba(1.0, 1.0, 1.0, alpha) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(
            0.0,
            0.0,
            self.pixmap.width() as f32,
            self.pixmap.height() as f32,
        ) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.blend_mode = BlendMode::DestinationIn;
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Draw all segments as one white stroke at `opacity`.
    pub fn stroke_segments(
        &mut self,
        segments: &[(PixelPoint, PixelPoint)],
        opacity: f32,
        line_width: f32,
    ) {
        if segments.is_empty() {
            return;
        }

        let mut pb = PathBuilder::new();
        for (from, to) in segments {
            pb.move_to(from.x as f32, from.y as f32);
            pb.line_to(to.x as f32, to.y as f32);
        }
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 255, 255, (opacity.clamp(0.0, 1.0) * 255.0).round() as u8);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: line_width,
            line_cap: LineCap::Butt,
            ..Stroke::default()
        };

        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Erase everything.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Alpha of one pixel, `None` outside the canvas.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.alpha())
    }

    /// Number of pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
    }

    /// Straight-alpha RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Encode the current frame as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let size = self.size();
        png::create_png(&self.to_rgba(), size.width as usize, size.height as usize)
    }
}
