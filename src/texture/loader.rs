//! Decoding of static image files into RGBA pixels.
//!
//! Raster formats (PNG, JPEG, GIF, WebP) go through the `image` crate, SVG
//! files are rasterized with `resvg` at their intrinsic size.

use std::path::Path;

use image::RgbaImage;

use super::TextureError;

/// Whether a path names an SVG document, judged by extension.
pub fn is_svg(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Load any supported image file into RGBA pixels.
pub fn load_image_file(path: &Path) -> Result<RgbaImage, TextureError> {
    let image = if is_svg(path) {
        let data = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        rasterize_svg(&data)?
    } else {
        image::open(path)?.to_rgba8()
    };

    if image.width() == 0 || image.height() == 0 {
        return Err(TextureError::Empty);
    }
    Ok(image)
}

/// Rasterize an SVG document at its intrinsic size.
pub fn rasterize_svg(bytes: &[u8]) -> Result<RgbaImage, TextureError> {
    let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())
        .map_err(|e| TextureError::Svg(e.to_string()))?;
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or(TextureError::Empty)?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    // tiny-skia stores premultiplied alpha; textures are straight RGBA.
    let mut image = RgbaImage::new(width, height);
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(image)
}
