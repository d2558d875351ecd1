//! Procedural image drawing for dynamic textures.
//!
//! A [`Painter`] draws shapes, other images and text onto an off-screen RGBA
//! buffer. Shapes overwrite pixels; images and text are alpha blended. The
//! finished image is wrapped in a [`Texture`] and registered with the cache
//! as a dynamic entry by whoever owns it.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::Texture;
use crate::geometry::Rect;

/// How a string should be rasterized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: u32,
    pub color: Rgba<u8>,
    /// Wrap lines wider than this many pixels.
    pub wrap_width: Option<u32>,
}

impl TextStyle {
    pub fn new(font_size: u32, color: Rgba<u8>) -> Self {
        Self {
            font_size,
            color,
            wrap_width: None,
        }
    }

    pub fn wrap_width(mut self, width: u32) -> Self {
        self.wrap_width = Some(width);
        self
    }
}

/// Black-box text rasterizer.
///
/// Shaping and glyph rendering live outside this crate; implementors return
/// the rendered string as a straight-alpha RGBA image, or `None` on failure.
pub trait TextRenderer {
    fn render_text(&self, text: &str, style: &TextStyle) -> Option<RgbaImage>;
}

/// Off-screen drawing surface.
pub struct Painter {
    image: RgbaImage,
}

impl Painter {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Fill the whole surface with one colour.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.image.pixels_mut() {
            *px = color;
        }
    }

    /// Set a single pixel; out-of-bounds coordinates are ignored.
    pub fn pixel(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x < self.image.width() && y < self.image.height() {
            self.image.put_pixel(x, y, color);
        }
    }

    /// Draw a rectangle, clipped to the surface.
    pub fn rect(&mut self, rect: Rect, color: Rgba<u8>, filled: bool) {
        let bounds = Rect::new(0, 0, self.width() as i32, self.height() as i32);
        let Some(area) = rect.intersect(&bounds) else {
            return;
        };

        if filled {
            for y in area.y..area.bottom() {
                for x in area.x..area.right() {
                    self.pixel(x, y, color);
                }
            }
            return;
        }

        for x in area.x..area.right() {
            self.pixel(x, area.y, color);
            self.pixel(x, area.bottom() - 1, color);
        }
        for y in area.y..area.bottom() {
            self.pixel(area.x, y, color);
            self.pixel(area.right() - 1, y, color);
        }
    }

    /// Draw a circle. Outlines use the midpoint algorithm.
    pub fn circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba<u8>, filled: bool) {
        if radius <= 0 {
            return;
        }

        if filled {
            let r = i64::from(radius);
            let (cx, cy) = (i64::from(cx), i64::from(cy));
            // Only visit the part of the bounding box that lies on the surface.
            let x0 = (cx - r).max(0);
            let x1 = (cx + r).min(i64::from(self.width()) - 1);
            let y0 = (cy - r).max(0);
            let y1 = (cy + r).min(i64::from(self.height()) - 1);
            for py in y0..=y1 {
                for px in x0..=x1 {
                    let (dx, dy) = (px - cx, py - cy);
                    if dx * dx + dy * dy <= r * r {
                        self.image.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
            return;
        }

        let (mut x, mut y, mut err) = (radius, 0i32, 0i64);
        while x >= y {
            for (px, py) in [
                (x, y),
                (-x, y),
                (x, -y),
                (-x, -y),
                (y, x),
                (-y, x),
                (y, -x),
                (-y, -x),
            ] {
                self.pixel(cx.saturating_add(px), cy.saturating_add(py), color);
            }
            if err <= 0 {
                y += 1;
                err += 2 * i64::from(y) + 1;
            }
            if err > 0 {
                x -= 1;
                err -= 2 * i64::from(x) + 1;
            }
        }
    }

    /// Blend `source` (or a sub-rect of it) at `(x, y)` without scaling.
    pub fn draw_image(&mut self, source: &RgbaImage, x: i32, y: i32, src_rect: Option<Rect>) {
        let Some(region) = crop(source, src_rect) else {
            return;
        };
        imageops::overlay(&mut self.image, &region, i64::from(x), i64::from(y));
    }

    /// Blend `source` (or a sub-rect of it) stretched into `dst`.
    pub fn draw_image_scaled(&mut self, source: &RgbaImage, dst: Rect, src_rect: Option<Rect>) {
        if dst.is_empty() {
            return;
        }
        let Some(region) = crop(source, src_rect) else {
            return;
        };
        let scaled = if region.dimensions() == (dst.w as u32, dst.h as u32) {
            region
        } else {
            imageops::resize(&region, dst.w as u32, dst.h as u32, FilterType::Triangle)
        };
        imageops::overlay(&mut self.image, &scaled, i64::from(dst.x), i64::from(dst.y));
    }

    /// Render text through `renderer` and blend it with its top-left at `(x, y)`.
    pub fn draw_text(
        &mut self,
        renderer: &dyn TextRenderer,
        text: &str,
        x: i32,
        y: i32,
        style: &TextStyle,
    ) {
        match renderer.render_text(text, style) {
            Some(glyphs) => self.draw_image(&glyphs, x, y, None),
            None => log::warn!("Text rendering failed for {:?}", text),
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Finish drawing and wrap the pixels in a texture handle.
    pub fn into_texture(self) -> Option<Texture> {
        Texture::from_image(self.image)
    }
}

fn crop(source: &RgbaImage, src_rect: Option<Rect>) -> Option<RgbaImage> {
    let Some(r) = src_rect else {
        return Some(source.clone());
    };
    let bounds = Rect::new(0, 0, source.width() as i32, source.height() as i32);
    let r = r.intersect(&bounds)?;
    Some(imageops::crop_imm(source, r.x as u32, r.y as u32, r.w as u32, r.h as u32).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    struct BlockText;

    impl TextRenderer for BlockText {
        fn render_text(&self, text: &str, style: &TextStyle) -> Option<RgbaImage> {
            if text.is_empty() {
                return None;
            }
            let mut width = text.chars().count() as u32 * style.font_size / 2;
            if let Some(wrap) = style.wrap_width {
                width = width.min(wrap);
            }
            Some(RgbaImage::from_pixel(width, style.font_size, style.color))
        }
    }

    #[test]
    fn test_fill_and_pixel() {
        let mut p = Painter::new(4, 4);
        assert_eq!(*p.image().get_pixel(0, 0), CLEAR);
        p.fill(RED);
        p.pixel(1, 2, BLUE);
        p.pixel(-1, 2, BLUE);
        p.pixel(9, 9, BLUE);
        assert_eq!(*p.image().get_pixel(1, 2), BLUE);
        assert_eq!(*p.image().get_pixel(0, 0), RED);
    }

    #[test]
    fn test_rect_filled_and_outline() {
        let mut p = Painter::new(10, 10);
        p.rect(Rect::new(-5, -5, 8, 8), RED, true);
        assert_eq!(*p.image().get_pixel(2, 2), RED);
        assert_eq!(*p.image().get_pixel(3, 3), CLEAR);

        let mut p = Painter::new(10, 10);
        p.rect(Rect::new(2, 2, 5, 5), BLUE, false);
        assert_eq!(*p.image().get_pixel(2, 4), BLUE);
        assert_eq!(*p.image().get_pixel(6, 6), BLUE);
        assert_eq!(*p.image().get_pixel(4, 4), CLEAR);
    }

    #[test]
    fn test_circle() {
        let mut p = Painter::new(11, 11);
        p.circle(5, 5, 4, RED, true);
        assert_eq!(*p.image().get_pixel(5, 5), RED);
        assert_eq!(*p.image().get_pixel(5, 1), RED);
        assert_eq!(*p.image().get_pixel(0, 0), CLEAR);

        let mut p = Painter::new(11, 11);
        p.circle(5, 5, 4, RED, false);
        assert_eq!(*p.image().get_pixel(9, 5), RED);
        assert_eq!(*p.image().get_pixel(5, 5), CLEAR);
    }

    #[test]
    fn test_huge_circle_is_clipped_to_surface() {
        let mut p = Painter::new(8, 8);
        p.circle(4, 4, 100_000, RED, true);
        assert!(p.image().pixels().all(|px| *px == RED));

        let mut p = Painter::new(8, 8);
        p.circle(i32::MAX - 10, 4, 50_000, BLUE, true);
        assert!(p.image().pixels().all(|px| *px == CLEAR));
    }

    #[test]
    fn test_draw_image_and_scaled() {
        let src = RgbaImage::from_pixel(2, 2, BLUE);
        let mut p = Painter::new(8, 8);
        p.draw_image(&src, 3, 3, None);
        assert_eq!(*p.image().get_pixel(4, 4), BLUE);
        assert_eq!(*p.image().get_pixel(5, 5), CLEAR);

        let mut p = Painter::new(8, 8);
        p.draw_image_scaled(&src, Rect::new(0, 0, 8, 4), None);
        assert_eq!(*p.image().get_pixel(7, 3), BLUE);
        assert_eq!(*p.image().get_pixel(7, 4), CLEAR);
    }

    #[test]
    fn test_draw_text_through_renderer() {
        let mut p = Painter::new(20, 10);
        p.draw_text(&BlockText, "hi", 1, 1, &TextStyle::new(8, RED));
        assert_eq!(*p.image().get_pixel(1, 1), RED);
        assert_eq!(*p.image().get_pixel(8, 8), RED);
        assert_eq!(*p.image().get_pixel(9, 1), CLEAR);

        // Failed rendering leaves the surface untouched
        p.draw_text(&BlockText, "", 12, 1, &TextStyle::new(8, BLUE));
        assert_eq!(*p.image().get_pixel(12, 1), CLEAR);

        let mut q = Painter::new(20, 10);
        q.draw_text(&BlockText, "wide", 0, 0, &TextStyle::new(8, BLUE).wrap_width(5));
        assert_eq!(*q.image().get_pixel(4, 0), BLUE);
        assert_eq!(*q.image().get_pixel(5, 0), CLEAR);

        let texture = p.into_texture().unwrap();
        assert_eq!(texture.size(), (20, 10));
    }
}
