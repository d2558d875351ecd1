//! The resource cache: sole owner of every texture.
//!
//! Two disjoint populations live here:
//!
//! - **Static** textures, known by name through an image-path map and decoded
//!   lazily on first request. They are never reference counted and are only
//!   released by [`TextureCache::clear`].
//! - **Dynamic** textures created at runtime (composited text, patch
//!   textures, procedurally drawn images). They start with a count of one and
//!   are dropped from the cache when the count reaches zero.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::manifest::ResourceManifest;
use super::{loader, patch, Texture, TextureError};

/// Prefix of auto-generated dynamic texture ids.
pub const DYNAMIC_PREFIX: &str = "dynamic_";

/// A cached texture and, for dynamic entries, its reference count.
struct CacheEntry {
    texture: Texture,
    /// `None` marks a static entry that is never freed mid-run.
    ref_count: Option<u32>,
}

/// Name-keyed texture cache with lazy static loading and ref-counted
/// dynamic registration.
pub struct TextureCache {
    entries: HashMap<String, CacheEntry>,
    image_paths: HashMap<String, PathBuf>,
    /// Static names whose load failed; not retried until re-registered.
    failed: HashSet<String>,
    resource_folder: PathBuf,
    dynamic_counter: u64,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            image_paths: HashMap::new(),
            failed: HashSet::new(),
            resource_folder: PathBuf::new(),
            dynamic_counter: 0,
        }
    }

    /// Create a cache that resolves relative image paths against `folder`.
    pub fn with_resource_folder(folder: impl Into<PathBuf>) -> Self {
        Self {
            resource_folder: folder.into(),
            ..Self::new()
        }
    }

    pub fn resource_folder(&self) -> &Path {
        &self.resource_folder
    }

    pub fn set_resource_folder(&mut self, folder: impl Into<PathBuf>) {
        self.resource_folder = folder.into();
    }

    /// Make a static image known by name without loading it.
    ///
    /// Re-registering a name clears any earlier load failure, which is the
    /// only way a failed load is attempted again.
    pub fn register_image_path(&mut self, name: impl Into<String>, path: impl AsRef<Path>) {
        let name = name.into();
        let path = path.as_ref();
        let full = if path.is_relative() {
            self.resource_folder.join(path)
        } else {
            path.to_path_buf()
        };
        self.failed.remove(&name);
        self.image_paths.insert(name, full);
    }

    /// Read a resource manifest and register its image entries.
    ///
    /// A `resource_folder` in the manifest replaces the cache's folder.
    /// Returns the number of image paths registered.
    pub fn load_manifest(&mut self, path: impl AsRef<Path>) -> Result<usize, TextureError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = ResourceManifest::from_json(&content)?;
        Ok(self.apply_manifest(&manifest))
    }

    /// Register the image entries of an already parsed manifest.
    pub fn apply_manifest(&mut self, manifest: &ResourceManifest) -> usize {
        if let Some(folder) = &manifest.resource_folder {
            log::info!("Resource folder: {}", folder);
            self.resource_folder = PathBuf::from(folder);
        }

        let mut count = 0;
        for entry in &manifest.resources {
            if entry.is_image() {
                self.register_image_path(entry.name.clone(), &entry.path);
                count += 1;
            } else {
                log::debug!(
                    "Skipping resource '{}' of type '{}'",
                    entry.name,
                    entry.kind
                );
            }
        }
        log::info!("Registered {} image paths (loaded on demand)", count);
        count
    }

    /// Look up a texture by name, loading a static image on first use.
    ///
    /// Returns `None` when the name is unknown or its image fails to load.
    pub fn get_texture(&mut self, name: &str) -> Option<Texture> {
        if let Some(entry) = self.entries.get(name) {
            return Some(entry.texture.clone());
        }

        let path = self.image_paths.get(name)?;
        if self.failed.contains(name) {
            return None;
        }

        let texture = match loader::load_image_file(path).map(Texture::from_image) {
            Ok(Some(texture)) => texture,
            Ok(None) => {
                log::error!("Image '{}' at {:?} has no pixels", name, path);
                self.failed.insert(name.to_string());
                return None;
            }
            Err(e) => {
                log::error!("Unable to load image '{}' from {:?}: {}", name, path, e);
                self.failed.insert(name.to_string());
                return None;
            }
        };

        log::debug!(
            "Loaded texture '{}' ({}x{})",
            name,
            texture.width(),
            texture.height()
        );
        self.entries.insert(
            name.to_string(),
            CacheEntry {
                texture: texture.clone(),
                ref_count: None,
            },
        );
        Some(texture)
    }

    /// Register a runtime texture and return its id.
    ///
    /// With a `name` that is already cached the existing entry is shared:
    /// a dynamic entry gains a reference, a static entry stays permanent, and
    /// the passed handle is dropped. Without a name an id of the form
    /// `dynamic_<n>` is generated.
    pub fn register_texture(&mut self, texture: Texture, name: Option<&str>) -> String {
        let id = match name {
            Some(name) => name.to_string(),
            None => self.next_dynamic_id(),
        };

        if let Some(entry) = self.entries.get_mut(&id) {
            if let Some(count) = entry.ref_count.as_mut() {
                *count += 1;
            }
            return id;
        }

        self.entries.insert(
            id.clone(),
            CacheEntry {
                texture,
                ref_count: Some(1),
            },
        );
        id
    }

    /// Release one reference to a dynamic texture, freeing it at zero.
    ///
    /// Static and unknown ids are ignored, so releasing twice past zero is a
    /// no-op.
    pub fn unregister_texture(&mut self, id: &str) {
        let Some(entry) = self.entries.get_mut(id) else {
            log::debug!("Unregister of unknown texture '{}' ignored", id);
            return;
        };
        let Some(count) = entry.ref_count.as_mut() else {
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            self.entries.remove(id);
            log::debug!("Released dynamic texture '{}'", id);
        }
    }

    /// Current reference count of a dynamic texture; `None` for static or
    /// unknown ids.
    pub fn ref_count(&self, id: &str) -> Option<u32> {
        self.entries.get(id).and_then(|e| e.ref_count)
    }

    pub fn is_dynamic(&self, id: &str) -> bool {
        self.ref_count(id).is_some()
    }

    /// Whether a texture is currently loaded under this name. Registered but
    /// not yet loaded image paths do not count.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether a static image path is registered under this name.
    pub fn has_image_path(&self, name: &str) -> bool {
        self.image_paths.contains_key(name)
    }

    /// Number of loaded textures, static and dynamic.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a nine-patch texture of the given size. The result is not
    /// registered; callers that keep it should pass it to
    /// [`register_texture`](Self::register_texture).
    pub fn create_nine_patch_texture(
        &self,
        source: &Texture,
        width: i32,
        height: i32,
    ) -> Option<Texture> {
        if width <= 0 || height <= 0 {
            log::warn!("Nine-patch requested with invalid size {}x{}", width, height);
            return None;
        }
        patch::nine_patch(source.image(), width, height).and_then(Texture::from_image)
    }

    /// Build a horizontal three-patch texture of the given size, unregistered.
    pub fn create_three_patch_texture(
        &self,
        source: &Texture,
        width: i32,
        height: i32,
    ) -> Option<Texture> {
        if width <= 0 || height <= 0 {
            log::warn!("Three-patch requested with invalid size {}x{}", width, height);
            return None;
        }
        patch::three_patch(source.image(), width, height).and_then(Texture::from_image)
    }

    /// Full teardown: drop every texture and forget all image paths.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.image_paths.clear();
        self.failed.clear();
    }

    fn next_dynamic_id(&mut self) -> String {
        loop {
            self.dynamic_counter += 1;
            let id = format!("{}{}", DYNAMIC_PREFIX, self.dynamic_counter);
            if !self.entries.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}
