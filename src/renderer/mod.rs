//! Drawing backends.
//!
//! The element store does not know how pixels reach the screen. Each frame it
//! resolves every visible element to a texture, a destination rectangle in
//! screen pixels, a rotation about that rectangle's center, an opacity and an
//! optional axis-aligned clip, and hands those to a [`Canvas`].

pub mod pixmap;

use crate::geometry::Rect;
use crate::texture::Texture;

pub use pixmap::PixmapCanvas;

/// Sink for the textured quads produced by a render pass.
pub trait Canvas {
    /// Called once before the first draw of a frame.
    fn begin_frame(&mut self) {}

    /// Name of the element whose draws follow. Most backends ignore it.
    fn set_element(&mut self, _name: &str) {}

    /// Draw `texture` stretched into `dst`, rotated by `rotation` degrees
    /// around the center of `dst`, at opacity `alpha` (already clamped to
    /// `0.0..=1.0`). When `clip` is set nothing outside it may be touched.
    fn draw_texture(
        &mut self,
        texture: &Texture,
        dst: Rect,
        rotation: f32,
        alpha: f32,
        clip: Option<Rect>,
    );
}

/// A single recorded draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Name of the element that produced the draw
    pub element: String,
    pub texture: Texture,
    /// Destination rectangle in screen pixels
    pub dst: Rect,
    /// Rotation in degrees around the center of `dst`
    pub rotation: f32,
    pub alpha: f32,
    pub clip: Option<Rect>,
}

/// Canvas that records draw commands instead of rasterizing them.
///
/// Useful for batching backends and for asserting on draw order.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    current: String,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Names of the drawn elements, in draw order.
    pub fn element_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.element.as_str()).collect()
    }

    pub fn find(&self, element: &str) -> Option<&DrawCommand> {
        self.commands.iter().find(|c| c.element == element)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.current.clear();
    }
}

impl Canvas for DrawList {
    fn begin_frame(&mut self) {
        self.clear();
    }

    fn set_element(&mut self, name: &str) {
        self.current.clear();
        self.current.push_str(name);
    }

    fn draw_texture(
        &mut self,
        texture: &Texture,
        dst: Rect,
        rotation: f32,
        alpha: f32,
        clip: Option<Rect>,
    ) {
        self.commands.push(DrawCommand {
            element: self.current.clone(),
            texture: texture.clone(),
            dst,
            rotation,
            alpha,
            clip,
        });
    }
}
