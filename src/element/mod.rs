//! UI elements and the store that owns them.
//!
//! Elements are plain records kept in insertion order inside an
//! [`ElementStore`]. Hierarchy links are element *names*, re-resolved on
//! every query, so the store can reorder and remove entries freely without
//! leaving stale references behind.

mod render;
pub mod spec;
mod store;
mod transform;

use crate::geometry::Rect;
use crate::texture::Texture;

pub use spec::{ElementSpec, SpecError};
pub use store::ElementStore;

/// A drawable node.
///
/// Built with the consuming setters below and handed to
/// [`ElementStore::add_element`]; afterwards it is only mutated through the
/// store.
#[derive(Debug, Clone)]
pub struct UiElement {
    /// Unique key. Empty means "generate one on insert".
    pub name: String,
    pub texture: Option<Texture>,
    /// Cache id of `texture`, used to release dynamic textures on change.
    pub texture_id: String,
    /// Position and size in parent-local pixels.
    pub rect: Rect,
    pub scale: f32,
    /// Degrees, clockwise.
    pub rotation: f32,
    pub alpha: f32,
    pub visible: bool,
    /// Hit-test eligibility only.
    pub clickable: bool,
    /// Re-synthesize a nine-patch when the texture is swapped.
    pub use_nine_patch: bool,
    /// Re-synthesize a three-patch when the texture is swapped.
    pub use_three_patch: bool,
    /// Draw in the second render pass, above everything else.
    pub always_on_top: bool,
    /// Parent element name, `None` for roots.
    pub parent: Option<String>,
}

impl UiElement {
    pub fn new(rect: Rect) -> Self {
        Self {
            name: String::new(),
            texture: None,
            texture_id: String::new(),
            rect,
            scale: 1.0,
            rotation: 0.0,
            alpha: 1.0,
            visible: true,
            clickable: false,
            use_nine_patch: false,
            use_three_patch: false,
            always_on_top: false,
            parent: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Bind a texture together with the cache id it was obtained under.
    pub fn texture(mut self, id: impl Into<String>, texture: Texture) -> Self {
        self.texture_id = id.into();
        self.texture = Some(texture);
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    pub fn nine_patch(mut self, enabled: bool) -> Self {
        self.use_nine_patch = enabled;
        self
    }

    pub fn three_patch(mut self, enabled: bool) -> Self {
        self.use_three_patch = enabled;
        self
    }

    pub fn always_on_top(mut self, on_top: bool) -> Self {
        self.always_on_top = on_top;
        self
    }

    /// Parent to assign once the element is inserted. The link goes through
    /// [`ElementStore::set_parent`], so unknown parents and cycles are
    /// rejected there.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

impl Default for UiElement {
    fn default() -> Self {
        Self::new(Rect::ZERO)
    }
}
