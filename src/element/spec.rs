//! Declarative element descriptions.
//!
//! ```json
//! { "name": "ok_button", "loc": [10, 20, 110, 60], "image": "button_9p",
//!   "alpha": 0.8, "clickable": true, "parent": "dialog" }
//! ```
//!
//! `loc` holds absolute corner coordinates `[x0, y0, x1, y1]` and becomes the
//! element's local rect.

use serde::{Deserialize, Serialize};

use super::{ElementStore, UiElement};
use crate::geometry::Rect;
use crate::texture::TextureCache;

#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("invalid element description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("element '{name}' has invalid size {width}x{height}")]
    InvalidSize {
        name: String,
        width: i32,
        height: i32,
    },
    #[error("texture not found: {0}")]
    TextureNotFound(String),
    #[error("element '{0}' already exists")]
    DuplicateName(String),
    #[error("animation target not found: {0}")]
    UnknownTarget(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    #[serde(default)]
    pub name: String,
    pub loc: [i32; 4],
    pub image: String,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub rotate: Option<f32>,
    #[serde(default)]
    pub alpha: Option<f32>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub clickable: Option<bool>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub use_nine_patch: Option<bool>,
    #[serde(default)]
    pub use_three_patch: Option<bool>,
}

impl ElementSpec {
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON array of element descriptions.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn rect(&self) -> Rect {
        let [x0, y0, x1, y1] = self.loc;
        Rect::from_corners(x0, y0, x1, y1)
    }

    /// Patch flags after defaults: nine-patch is implied by `_9patch` or
    /// `_9p` in the image name and wins over three-patch.
    pub fn patch_mode(&self) -> (bool, bool) {
        let nine = self
            .use_nine_patch
            .unwrap_or_else(|| self.image.contains("_9patch") || self.image.contains("_9p"));
        let three = self.use_three_patch.unwrap_or(false) && !nine;
        (nine, three)
    }
}

impl ElementStore {
    /// Create an element from a declarative description and return its name.
    ///
    /// The image is resolved through `cache`; patch elements get a texture
    /// synthesized at their size and registered as dynamic. The parent link
    /// is assigned after insertion, so an unknown parent leaves a root.
    pub fn add_from_spec(
        &mut self,
        cache: &mut TextureCache,
        spec: &ElementSpec,
    ) -> Result<String, SpecError> {
        let rect = spec.rect();
        if rect.is_empty() {
            log::error!("Invalid image size for element: {}", spec.name);
            return Err(SpecError::InvalidSize {
                name: spec.name.clone(),
                width: rect.w,
                height: rect.h,
            });
        }
        if !spec.name.is_empty() && self.contains(&spec.name) {
            return Err(SpecError::DuplicateName(spec.name.clone()));
        }

        let Some(base) = cache.get_texture(&spec.image) else {
            log::error!("Texture not found: {}", spec.image);
            return Err(SpecError::TextureNotFound(spec.image.clone()));
        };

        let (nine, three) = spec.patch_mode();
        let patched = if nine {
            cache.create_nine_patch_texture(&base, rect.w, rect.h)
        } else if three {
            cache.create_three_patch_texture(&base, rect.w, rect.h)
        } else {
            None
        };
        let (texture_id, texture) = match patched {
            Some(texture) => (cache.register_texture(texture.clone(), None), texture),
            None => (spec.image.clone(), base),
        };

        let mut element = UiElement::new(rect)
            .name(spec.name.clone())
            .texture(texture_id.clone(), texture)
            .nine_patch(nine)
            .three_patch(three);
        if let Some(scale) = spec.scale {
            element = element.scale(scale);
        }
        if let Some(rotate) = spec.rotate {
            element = element.rotation(rotate);
        }
        if let Some(alpha) = spec.alpha {
            element = element.alpha(alpha);
        }
        if let Some(visible) = spec.visible {
            element = element.visible(visible);
        }
        if let Some(clickable) = spec.clickable {
            element = element.clickable(clickable);
        }
        if let Some(parent) = spec.parent.as_deref().filter(|p| !p.is_empty()) {
            element = element.parent(parent);
        }

        match self.add_element(element) {
            Some(name) => Ok(name),
            None => {
                // Release the patch texture registered above.
                if texture_id != spec.image {
                    cache.unregister_texture(&texture_id);
                }
                Err(SpecError::DuplicateName(spec.name.clone()))
            }
        }
    }
}
