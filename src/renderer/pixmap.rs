//! Software canvas rasterizing into a `tiny_skia` pixmap.
//!
//! Source textures are converted to premultiplied pixmaps once and cached by
//! texture serial, evicting the least recently used when the cache grows.

use std::collections::HashMap;

use image::RgbaImage;
use resvg::tiny_skia::{
    self, BlendMode, Color, ColorU8, FillRule, FilterQuality, Mask, PathBuilder, Pixmap,
    PixmapPaint, Transform,
};

use super::Canvas;
use crate::geometry::Rect;
use crate::texture::{Texture, TextureSerial};

const MAX_CACHED_PIXMAPS: usize = 64;

struct CachedPixmap {
    pixmap: Pixmap,
    last_used_frame: u64,
}

/// CPU render target.
pub struct PixmapCanvas {
    target: Pixmap,
    background: [u8; 4],
    cache: HashMap<TextureSerial, CachedPixmap>,
    current_frame: u64,
}

impl PixmapCanvas {
    /// Create a canvas cleared to `background` at the start of every frame.
    /// Returns `None` for a zero-sized target.
    pub fn new(width: u32, height: u32, background: [u8; 4]) -> Option<Self> {
        let mut target = Pixmap::new(width, height)?;
        target.fill(to_color(background));
        Some(Self {
            target,
            background,
            cache: HashMap::new(),
            current_frame: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.target.width()
    }

    pub fn height(&self) -> u32 {
        self.target.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.target
    }

    /// Copy the target into a straight-alpha RGBA image.
    pub fn to_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.target.width(), self.target.height());
        for (dst, src) in image.pixels_mut().zip(self.target.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }

    pub fn into_image(self) -> RgbaImage {
        self.to_image()
    }

    fn evict_oldest(&mut self) {
        let target_size = MAX_CACHED_PIXMAPS / 2;
        while self.cache.len() > target_size {
            let oldest = self
                .cache
                .iter()
                .min_by_key(|(_, v)| v.last_used_frame)
                .map(|(k, _)| *k);
            match oldest {
                Some(key) => {
                    self.cache.remove(&key);
                }
                None => break,
            }
        }
    }

    fn clip_mask(&self, clip: Rect) -> Option<Mask> {
        let rect = tiny_skia::Rect::from_xywh(
            clip.x as f32,
            clip.y as f32,
            clip.w as f32,
            clip.h as f32,
        )?;
        let mut mask = Mask::new(self.target.width(), self.target.height())?;
        mask.fill_path(
            &PathBuilder::from_rect(rect),
            FillRule::Winding,
            false,
            Transform::identity(),
        );
        Some(mask)
    }
}

impl Canvas for PixmapCanvas {
    fn begin_frame(&mut self) {
        self.current_frame += 1;
        if self.cache.len() > MAX_CACHED_PIXMAPS {
            self.evict_oldest();
        }
        self.target.fill(to_color(self.background));
    }

    fn draw_texture(
        &mut self,
        texture: &Texture,
        dst: Rect,
        rotation: f32,
        alpha: f32,
        clip: Option<Rect>,
    ) {
        if dst.is_empty() || alpha <= 0.0 {
            return;
        }

        let mask = match clip {
            Some(clip) => match self.clip_mask(clip) {
                Some(mask) => Some(mask),
                // Clip lies entirely outside the target.
                None => return,
            },
            None => None,
        };

        let (tw, th) = texture.size();
        let (cx, cy) = (
            dst.x as f32 + dst.w as f32 / 2.0,
            dst.y as f32 + dst.h as f32 / 2.0,
        );
        let transform = Transform::from_scale(dst.w as f32 / tw as f32, dst.h as f32 / th as f32)
            .post_translate(dst.x as f32, dst.y as f32)
            .post_concat(Transform::from_rotate_at(rotation, cx, cy));
        let paint = PixmapPaint {
            opacity: alpha.clamp(0.0, 1.0),
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };

        let Some(source) = cached_source(&mut self.cache, self.current_frame, texture) else {
            log::warn!("Skipping draw of unusable texture {:?}", texture);
            return;
        };
        self.target
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, mask.as_ref());
    }
}

fn cached_source<'a>(
    cache: &'a mut HashMap<TextureSerial, CachedPixmap>,
    frame: u64,
    texture: &Texture,
) -> Option<&'a Pixmap> {
    let serial = texture.serial();
    if !cache.contains_key(&serial) {
        let pixmap = premultiplied(texture.image())?;
        cache.insert(
            serial,
            CachedPixmap {
                pixmap,
                last_used_frame: frame,
            },
        );
    }
    let cached = cache.get_mut(&serial)?;
    cached.last_used_frame = frame;
    Some(&cached.pixmap)
}

fn to_color(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn premultiplied(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}
