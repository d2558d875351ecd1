//! Ordered element storage with a name index.
//!
//! Elements live in a dense `Vec` in insertion order, which doubles as the
//! default draw order. A `HashMap` maps names to positions and is rebuilt
//! whenever a removal shifts the tail. Removal is order-preserving: draw
//! order must survive.

use std::collections::HashMap;

use super::UiElement;
use crate::geometry::Rect;
use crate::texture::{TextureCache, DYNAMIC_PREFIX};

/// Owner of every [`UiElement`].
#[derive(Debug, Default)]
pub struct ElementStore {
    pub(super) elements: Vec<UiElement>,
    pub(super) index: HashMap<String, usize>,
    name_counter: u64,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element at the top of the draw order and return its name.
    ///
    /// An empty name is replaced with a generated `element_<n>`. Returns
    /// `None` when the name is already taken. A parent named on the element
    /// is assigned after insertion through [`set_parent`](Self::set_parent).
    pub fn add_element(&mut self, mut element: UiElement) -> Option<String> {
        if element.name.is_empty() {
            element.name = self.next_element_name();
        } else if self.index.contains_key(&element.name) {
            log::error!("Element '{}' already exists", element.name);
            return None;
        }

        let name = element.name.clone();
        let parent = element.parent.take();
        self.index.insert(name.clone(), self.elements.len());
        self.elements.push(element);

        if let Some(parent) = parent {
            self.set_parent(&name, &parent);
        }
        Some(name)
    }

    /// Remove an element, keeping the order of the rest.
    ///
    /// Children that name it as parent are left untouched; their link dangles
    /// until re-parented.
    pub fn remove_element(&mut self, name: &str) -> bool {
        let Some(idx) = self.index.remove(name) else {
            return false;
        };
        self.elements.remove(idx);
        self.reindex_from(idx);
        true
    }

    /// Remove an element and release its texture if it was dynamic.
    pub fn remove_element_with_texture(&mut self, cache: &mut TextureCache, name: &str) -> bool {
        let Some(idx) = self.index.remove(name) else {
            return false;
        };
        let element = self.elements.remove(idx);
        self.reindex_from(idx);
        if element.texture_id.starts_with(DYNAMIC_PREFIX) {
            cache.unregister_texture(&element.texture_id);
        }
        true
    }

    /// Drop every element. Textures are not touched.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.index.clear();
    }

    pub fn get(&self, name: &str) -> Option<&UiElement> {
        self.index.get(name).map(|&i| &self.elements[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Elements in draw order.
    pub fn elements(&self) -> impl Iterator<Item = &UiElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // Geometry setters

    pub fn set_rect(&mut self, name: &str, rect: Rect) {
        if let Some(e) = self.get_mut_logged(name) {
            e.rect = rect;
        }
    }

    /// Shift an element by a relative offset.
    pub fn move_by(&mut self, name: &str, dx: i32, dy: i32) {
        if let Some(e) = self.get_mut_logged(name) {
            e.rect.x += dx;
            e.rect.y += dy;
        }
    }

    pub fn move_to(&mut self, name: &str, x: i32, y: i32) {
        if let Some(e) = self.get_mut_logged(name) {
            e.rect.x = x;
            e.rect.y = y;
        }
    }

    pub fn resize(&mut self, name: &str, w: i32, h: i32) {
        if let Some(e) = self.get_mut_logged(name) {
            e.rect.w = w;
            e.rect.h = h;
        }
    }

    // Visual state setters

    pub fn set_alpha(&mut self, name: &str, alpha: f32) {
        if let Some(e) = self.get_mut_logged(name) {
            e.alpha = alpha;
        }
    }

    pub fn set_rotation(&mut self, name: &str, degrees: f32) {
        if let Some(e) = self.get_mut_logged(name) {
            e.rotation = degrees;
        }
    }

    pub fn set_scale(&mut self, name: &str, scale: f32) {
        if let Some(e) = self.get_mut_logged(name) {
            e.scale = scale;
        }
    }

    pub fn set_visible(&mut self, name: &str, visible: bool) {
        if let Some(e) = self.get_mut_logged(name) {
            e.visible = visible;
        }
    }

    pub fn set_clickable(&mut self, name: &str, clickable: bool) {
        if let Some(e) = self.get_mut_logged(name) {
            e.clickable = clickable;
        }
    }

    pub fn set_always_on_top(&mut self, name: &str, on_top: bool) {
        if let Some(e) = self.get_mut_logged(name) {
            e.always_on_top = on_top;
        }
    }

    pub fn set_patch_mode(&mut self, name: &str, nine_patch: bool, three_patch: bool) {
        if let Some(e) = self.get_mut_logged(name) {
            e.use_nine_patch = nine_patch;
            e.use_three_patch = three_patch && !nine_patch;
        }
    }

    // Getters. Unknown names yield the neutral value for each property.

    pub fn left(&self, name: &str) -> i32 {
        self.get(name).map_or(0, |e| e.rect.x)
    }

    pub fn top(&self, name: &str) -> i32 {
        self.get(name).map_or(0, |e| e.rect.y)
    }

    pub fn right(&self, name: &str) -> i32 {
        self.get(name).map_or(0, |e| e.rect.right())
    }

    pub fn bottom(&self, name: &str) -> i32 {
        self.get(name).map_or(0, |e| e.rect.bottom())
    }

    pub fn width(&self, name: &str) -> i32 {
        self.get(name).map_or(0, |e| e.rect.w)
    }

    pub fn height(&self, name: &str) -> i32 {
        self.get(name).map_or(0, |e| e.rect.h)
    }

    pub fn alpha(&self, name: &str) -> f32 {
        self.get(name).map_or(1.0, |e| e.alpha)
    }

    pub fn scale(&self, name: &str) -> f32 {
        self.get(name).map_or(1.0, |e| e.scale)
    }

    pub fn rotation(&self, name: &str) -> f32 {
        self.get(name).map_or(0.0, |e| e.rotation)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.visible)
    }

    pub fn is_clickable(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.clickable)
    }

    /// Cache id of the bound texture, empty for unknown elements.
    pub fn texture_id(&self, name: &str) -> &str {
        self.get(name).map_or("", |e| e.texture_id.as_str())
    }

    // Hierarchy

    /// Make `parent` the parent of `child`.
    ///
    /// Rejected without any mutation when the child is unknown, the parent
    /// is unknown, or the link would form a cycle. Returns whether the
    /// parent was assigned.
    pub fn set_parent(&mut self, child: &str, parent: &str) -> bool {
        if !self.contains(child) {
            log::error!("Child element not found: {}", child);
            return false;
        }
        if self.would_create_cycle(child, parent) {
            log::error!(
                "Cannot set parent: would create cycle. Child: {}, Parent: {}",
                child,
                parent
            );
            return false;
        }
        if !self.contains(parent) {
            log::error!("Parent element not found: {}", parent);
            return false;
        }

        self.remove_parent(child);
        if let Some(e) = self.get_mut(child) {
            e.parent = Some(parent.to_string());
        }
        true
    }

    /// Detach an element from its parent, making it a root.
    pub fn remove_parent(&mut self, child: &str) {
        if let Some(e) = self.get_mut(child) {
            e.parent = None;
        }
    }

    /// Name of the parent link, which may dangle if the parent was removed.
    pub fn parent(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|e| e.parent.as_deref())
    }

    /// Whether making `parent` the parent of `child` would form a cycle,
    /// i.e. `child` is `parent` or one of its ancestors.
    pub fn would_create_cycle(&self, child: &str, parent: &str) -> bool {
        if child == parent {
            return true;
        }
        let mut current = Some(parent);
        // Bounded by the element count so a corrupt chain cannot spin forever.
        for _ in 0..=self.elements.len() {
            let Some(name) = current else {
                return false;
            };
            if name == child {
                return true;
            }
            current = self.parent(name);
        }
        true
    }

    // Textures

    /// Swap an element's texture for the cache entry `image`.
    ///
    /// Elements flagged for patch scaling get a freshly synthesized patch
    /// texture at their current size, registered as dynamic. A previously
    /// bound dynamic texture is released either way. Returns whether a
    /// texture was bound.
    pub fn change_texture(&mut self, cache: &mut TextureCache, name: &str, image: &str) -> bool {
        let Some(idx) = self.index.get(name).copied() else {
            log::error!("Element not found: {}", name);
            return false;
        };
        let Some(base) = cache.get_texture(image) else {
            log::error!("Texture not found for image: {}", image);
            return false;
        };

        let element = &mut self.elements[idx];
        let (w, h) = (element.rect.w, element.rect.h);
        let use_patch = element.use_nine_patch || element.use_three_patch;

        if element.texture_id.starts_with(DYNAMIC_PREFIX) && element.texture_id != image {
            cache.unregister_texture(&element.texture_id);
        }

        if use_patch && w > 0 && h > 0 {
            let patched = if element.use_nine_patch {
                cache.create_nine_patch_texture(&base, w, h)
            } else {
                cache.create_three_patch_texture(&base, w, h)
            };
            match patched {
                Some(texture) => {
                    element.texture_id = cache.register_texture(texture.clone(), None);
                    element.texture = Some(texture);
                }
                None => {
                    element.texture_id = image.to_string();
                    element.texture = Some(base);
                }
            }
        } else {
            element.texture_id = image.to_string();
            element.texture = Some(base);
        }
        true
    }

    /// Bind an already registered texture by id, without patch synthesis.
    pub fn change_texture_by_id(&mut self, cache: &mut TextureCache, name: &str, id: &str) -> bool {
        if !self.contains(name) {
            log::error!("Element not found: {}", name);
            return false;
        }
        let Some(texture) = cache.get_texture(id) else {
            log::error!("Texture not found for id: {}", id);
            return false;
        };
        if let Some(e) = self.get_mut(name) {
            e.texture_id = id.to_string();
            e.texture = Some(texture);
        }
        true
    }

    // Internals

    pub(super) fn get_mut(&mut self, name: &str) -> Option<&mut UiElement> {
        let idx = *self.index.get(name)?;
        self.elements.get_mut(idx)
    }

    fn get_mut_logged(&mut self, name: &str) -> Option<&mut UiElement> {
        let found = self.get_mut(name);
        if found.is_none() {
            log::debug!("Element not found: {}", name);
        }
        found
    }

    pub(super) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Position of `idx`'s parent, `None` for roots and dangling links.
    pub(super) fn parent_index(&self, idx: usize) -> Option<usize> {
        let parent = self.elements.get(idx)?.parent.as_deref()?;
        self.index_of(parent)
    }

    /// Positions of every resolvable ancestor, nearest first.
    pub(super) fn ancestors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let mut current = idx;
        std::iter::from_fn(move || {
            let parent = self.parent_index(current)?;
            current = parent;
            Some(parent)
        })
        .take(self.elements.len())
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, e) in self.elements.iter().enumerate().skip(start) {
            self.index.insert(e.name.clone(), i);
        }
    }

    fn next_element_name(&mut self) -> String {
        loop {
            self.name_counter += 1;
            let name = format!("element_{}", self.name_counter);
            if !self.index.contains_key(&name) {
                return name;
            }
        }
    }
}
