//! Stretchable-border ("patch") texture synthesis.
//!
//! A nine-patch splits the source into a 3x3 grid by exact thirds: corners
//! keep their pixel size, edges stretch along one axis, the center along
//! both. A three-patch splits horizontally only, keeping the end caps at the
//! source aspect ratio so pill shapes do not distort when the height changes.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::geometry::Rect;

/// Source and destination regions of a nine-patch, in row-major order
/// (top-left, top, top-right, left, center, right, bottom-left, bottom,
/// bottom-right).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NinePatchLayout {
    pub src: [Rect; 9],
    pub dst: [Rect; 9],
}

impl NinePatchLayout {
    /// Compute the region layout for stretching a `src_w` x `src_h` source
    /// into `width` x `height`. Returns `None` for non-positive sizes.
    pub fn compute(src_w: i32, src_h: i32, width: i32, height: i32) -> Option<Self> {
        if src_w <= 0 || src_h <= 0 || width <= 0 || height <= 0 {
            return None;
        }

        let (src_left, src_center_w, src_right) = split_thirds(src_w);
        let (src_top, src_center_h, src_bottom) = split_thirds(src_h);

        let (dst_left, dst_center_w, dst_right) = fit_corners(src_left, src_right, width);
        let (dst_top, dst_center_h, dst_bottom) = fit_corners(src_top, src_bottom, height);

        let src = grid(
            [src_left, src_center_w, src_right],
            [src_top, src_center_h, src_bottom],
        );
        let dst = grid(
            [dst_left, dst_center_w, dst_right],
            [dst_top, dst_center_h, dst_bottom],
        );
        Some(Self { src, dst })
    }

    /// Width of the destination corner columns (left, right).
    pub fn corner_widths(&self) -> (i32, i32) {
        (self.dst[0].w, self.dst[2].w)
    }

    /// Height of the destination corner rows (top, bottom).
    pub fn corner_heights(&self) -> (i32, i32) {
        (self.dst[0].h, self.dst[6].h)
    }
}

/// Source and destination regions of a horizontal three-patch
/// (left cap, center, right cap).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreePatchLayout {
    pub src: [Rect; 3],
    pub dst: [Rect; 3],
}

impl ThreePatchLayout {
    pub fn compute(src_w: i32, src_h: i32, width: i32, height: i32) -> Option<Self> {
        if src_w <= 0 || src_h <= 0 || width <= 0 || height <= 0 {
            return None;
        }

        let (src_left, src_center, src_right) = split_thirds(src_w);

        // Caps follow the height so they keep the source aspect ratio.
        let scale_h = height as f32 / src_h as f32;
        let mut left = round_px(src_left as f32 * scale_h).max(1);
        let mut right = round_px(src_right as f32 * scale_h).max(1);
        if left + right > width {
            let scale_w = width as f32 / (left + right) as f32;
            left = round_px(left as f32 * scale_w).max(1);
            right = round_px(right as f32 * scale_w).max(1);
        }
        let center = (width - left - right).max(0);

        let src = [
            Rect::new(0, 0, src_left, src_h),
            Rect::new(src_left, 0, src_center, src_h),
            Rect::new(src_left + src_center, 0, src_right, src_h),
        ];
        let dst = [
            Rect::new(0, 0, left, height),
            Rect::new(left, 0, center, height),
            Rect::new(left + center, 0, right, height),
        ];
        Some(Self { src, dst })
    }
}

/// Stretch `source` into a `width` x `height` nine-patch image.
pub fn nine_patch(source: &RgbaImage, width: i32, height: i32) -> Option<RgbaImage> {
    let (src_w, src_h) = dimensions(source);
    let layout = NinePatchLayout::compute(src_w, src_h, width, height)?;
    log::debug!(
        "Creating nine-patch: src={}x{}, dst={}x{}",
        src_w,
        src_h,
        width,
        height
    );
    Some(compose(source, width, height, &layout.src, &layout.dst))
}

/// Stretch `source` into a `width` x `height` horizontal three-patch image.
pub fn three_patch(source: &RgbaImage, width: i32, height: i32) -> Option<RgbaImage> {
    let (src_w, src_h) = dimensions(source);
    let layout = ThreePatchLayout::compute(src_w, src_h, width, height)?;
    log::debug!(
        "Creating three-patch: src={}x{}, dst={}x{}",
        src_w,
        src_h,
        width,
        height
    );
    Some(compose(source, width, height, &layout.src, &layout.dst))
}

fn dimensions(image: &RgbaImage) -> (i32, i32) {
    (
        i32::try_from(image.width()).unwrap_or(i32::MAX),
        i32::try_from(image.height()).unwrap_or(i32::MAX),
    )
}

/// Split a length into exact thirds, folding the remainder into the last.
fn split_thirds(len: i32) -> (i32, i32, i32) {
    let third = len / 3;
    (third, third, len - third * 2)
}

/// Keep corner sizes unless they overflow `available`, in which case both
/// shrink proportionally (never below one pixel). The middle absorbs what is
/// left and may be zero.
fn fit_corners(start: i32, end: i32, available: i32) -> (i32, i32, i32) {
    let mut start = start;
    let mut end = end;
    if start + end > available {
        let scale = available as f32 / (start + end) as f32;
        start = ((start as f32 * scale) as i32).max(1);
        end = ((end as f32 * scale) as i32).max(1);
    }

    let middle = available - start - end;
    if middle < 0 {
        let start = available / 2;
        return (start, 0, available - start);
    }
    (start, middle, end)
}

fn round_px(value: f32) -> i32 {
    (value + 0.5) as i32
}

fn grid(cols: [i32; 3], rows: [i32; 3]) -> [Rect; 9] {
    let xs = [0, cols[0], cols[0] + cols[1]];
    let ys = [0, rows[0], rows[0] + rows[1]];
    let mut out = [Rect::ZERO; 9];
    for row in 0..3 {
        for col in 0..3 {
            out[row * 3 + col] = Rect::new(xs[col], ys[row], cols[col], rows[row]);
        }
    }
    out
}

/// Copy each source region into its destination region on a transparent
/// canvas, stretching where the sizes differ.
fn compose(source: &RgbaImage, width: i32, height: i32, src: &[Rect], dst: &[Rect]) -> RgbaImage {
    let mut out = RgbaImage::new(width as u32, height as u32);
    let mut rendered = 0;

    for (s, d) in src.iter().zip(dst) {
        if s.is_empty() || d.is_empty() {
            continue;
        }
        let region = imageops::crop_imm(source, s.x as u32, s.y as u32, s.w as u32, s.h as u32)
            .to_image();
        let region = if (s.w, s.h) == (d.w, d.h) {
            region
        } else {
            imageops::resize(&region, d.w as u32, d.h as u32, FilterType::Nearest)
        };
        imageops::overlay(&mut out, &region, i64::from(d.x), i64::from(d.y));
        rendered += 1;
    }

    log::debug!("Rendered {} patches", rendered);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 30x30 source where every 10x10 cell has its own red channel value.
    fn grid_source() -> RgbaImage {
        RgbaImage::from_fn(30, 30, |x, y| {
            let cell = (y / 10) * 3 + (x / 10);
            Rgba([cell as u8 * 20, 0, 0, 255])
        })
    }

    #[test]
    fn test_nine_patch_keeps_corners_when_they_fit() {
        // 10 + 10 <= 60 horizontally and 10 + 10 <= 20 vertically: no shrink.
        let layout = NinePatchLayout::compute(30, 30, 60, 20).unwrap();
        assert_eq!(layout.corner_widths(), (10, 10));
        assert_eq!(layout.corner_heights(), (10, 10));
        // Center absorbs the remaining width, and zero height.
        assert_eq!(layout.dst[4], Rect::new(10, 10, 40, 0));
        assert_eq!(layout.dst[2], Rect::new(50, 0, 10, 10));
    }

    #[test]
    fn test_nine_patch_shrinks_corners_proportionally() {
        let layout = NinePatchLayout::compute(30, 30, 10, 16).unwrap();
        // 20 > 10: scale 0.5
        assert_eq!(layout.corner_widths(), (5, 5));
        assert_eq!(layout.dst[1].w, 0);
        // 20 > 16: scale 0.8
        assert_eq!(layout.corner_heights(), (8, 8));
        assert_eq!(layout.dst[3].h, 0);
    }

    #[test]
    fn test_nine_patch_uneven_source_folds_remainder() {
        let layout = NinePatchLayout::compute(31, 32, 100, 100).unwrap();
        assert_eq!(layout.src[0], Rect::new(0, 0, 10, 10));
        assert_eq!(layout.src[8], Rect::new(20, 20, 11, 12));
        assert_eq!(layout.corner_widths(), (10, 11));
        assert_eq!(layout.corner_heights(), (10, 12));
        assert_eq!(layout.dst[4], Rect::new(10, 10, 79, 78));
    }

    #[test]
    fn test_nine_patch_one_pixel_floor() {
        // 20 corners squeezed into 1px: both floor to 1, middle goes negative
        // and the corners split the pixel instead.
        let layout = NinePatchLayout::compute(30, 30, 1, 30).unwrap();
        assert_eq!(layout.corner_widths(), (0, 1));
        assert_eq!(layout.dst[1].w, 0);
    }

    #[test]
    fn test_nine_patch_rejects_invalid_sizes() {
        assert!(NinePatchLayout::compute(30, 30, 0, 10).is_none());
        assert!(NinePatchLayout::compute(30, 30, 10, -1).is_none());
        assert!(nine_patch(&grid_source(), 0, 0).is_none());
    }

    #[test]
    fn test_nine_patch_pixels() {
        let out = nine_patch(&grid_source(), 60, 40).unwrap();
        assert_eq!(out.dimensions(), (60, 40));
        // Corners keep their source cell
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(59, 0)[0], 40);
        assert_eq!(out.get_pixel(0, 39)[0], 120);
        assert_eq!(out.get_pixel(59, 39)[0], 160);
        // Stretched center
        assert_eq!(out.get_pixel(30, 20)[0], 80);
        // Top edge stretched horizontally
        assert_eq!(out.get_pixel(45, 5)[0], 20);
    }

    #[test]
    fn test_three_patch_caps_follow_height() {
        // 30x10 source, thirds of 10. Height 20 doubles the caps.
        let layout = ThreePatchLayout::compute(30, 10, 100, 20).unwrap();
        assert_eq!(layout.dst[0], Rect::new(0, 0, 20, 20));
        assert_eq!(layout.dst[1], Rect::new(20, 0, 60, 20));
        assert_eq!(layout.dst[2], Rect::new(80, 0, 20, 20));
    }

    #[test]
    fn test_three_patch_caps_shrink_to_width() {
        let layout = ThreePatchLayout::compute(30, 10, 20, 20).unwrap();
        // 20 + 20 > 20: scaled by 0.5
        assert_eq!(layout.dst[0].w, 10);
        assert_eq!(layout.dst[2].w, 10);
        assert_eq!(layout.dst[1].w, 0);
    }

    #[test]
    fn test_three_patch_pixels() {
        let source = RgbaImage::from_fn(30, 10, |x, _| Rgba([(x / 10) as u8 * 100, 0, 0, 255]));
        let out = three_patch(&source, 100, 20).unwrap();
        assert_eq!(out.dimensions(), (100, 20));
        assert_eq!(out.get_pixel(5, 10)[0], 0);
        assert_eq!(out.get_pixel(50, 10)[0], 100);
        assert_eq!(out.get_pixel(95, 10)[0], 200);
    }
}
