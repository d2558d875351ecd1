//! Texture handles, the resource cache that owns them, and patch synthesis.
//!
//! Textures are CPU-side RGBA images behind a cheap, clonable handle. A
//! backend (GPU or software) keys its own uploads on [`Texture::serial`], so
//! the same pixels are uploaded once no matter how many elements bind them.

pub mod cache;
pub mod loader;
pub mod manifest;
pub mod painter;
pub mod patch;

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbaImage;

pub use cache::{TextureCache, DYNAMIC_PREFIX};
pub use manifest::{ResourceEntry, ResourceManifest};
pub use painter::{Painter, TextRenderer, TextStyle};
pub use patch::{NinePatchLayout, ThreePatchLayout};

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Errors raised while loading image data from disk or parsing resource lists.
///
/// These only surface from setup-time calls; per-frame lookups log them and
/// return `None` instead.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to rasterize svg: {0}")]
    Svg(String),
    #[error("invalid resource manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("image has no pixels")]
    Empty,
}

/// Unique identity of a texture's pixel data, stable for the handle's life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureSerial(u64);

struct TextureInner {
    serial: TextureSerial,
    image: RgbaImage,
}

/// Shared handle to immutable RGBA pixel data.
///
/// Cloning a handle is cheap. Two handles are the same texture when their
/// serials match.
#[derive(Clone)]
pub struct Texture {
    inner: Arc<TextureInner>,
}

impl Texture {
    /// Wrap decoded pixels. Returns `None` for zero-sized images.
    pub fn from_image(image: RgbaImage) -> Option<Self> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        let serial = TextureSerial(NEXT_SERIAL.fetch_add(1, Ordering::Relaxed));
        Some(Self {
            inner: Arc::new(TextureInner { serial, image }),
        })
    }

    /// A texture filled with one colour, mostly useful for placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Option<Self> {
        Self::from_image(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    pub fn serial(&self) -> TextureSerial {
        self.inner.serial
    }

    pub fn image(&self) -> &RgbaImage {
        &self.inner.image
    }

    pub fn width(&self) -> u32 {
        self.inner.image.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.image.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.inner.image.dimensions()
    }

    /// Whether both handles point to the same pixel data.
    pub fn same_as(&self, other: &Texture) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("serial", &self.inner.serial.0)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
