pub mod animation;
pub mod element;
pub mod geometry;
pub mod renderer;
pub mod texture;

use animation::{Scheduler, Timeline};
use element::{ElementSpec, ElementStore, SpecError};
use renderer::{Canvas, PixmapCanvas};
use texture::TextureCache;

pub mod prelude {
    pub use crate::animation::{AnimationStep, PropertyFlags, Scheduler, StepSpec, Timeline};
    pub use crate::element::{ElementSpec, ElementStore, SpecError, UiElement};
    pub use crate::geometry::Rect;
    pub use crate::renderer::{Canvas, DrawCommand, DrawList, PixmapCanvas};
    pub use crate::texture::{
        Painter, ResourceManifest, TextRenderer, TextStyle, Texture, TextureCache, TextureError,
    };
    pub use crate::{Stage, StageConfig};
}

pub struct StageConfig {
    pub width: u32,
    pub height: u32,
    /// RGBA clear colour of the frame.
    pub background: [u8; 4],
    /// Prefix for relative image paths.
    pub resource_folder: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            background: [26, 26, 38, 255],
            resource_folder: String::new(),
        }
    }
}

/// Owns the element store, the texture cache and the animation scheduler,
/// and drives them once per frame.
pub struct Stage {
    config: StageConfig,
    store: ElementStore,
    cache: TextureCache,
    scheduler: Scheduler,
}

impl Stage {
    pub fn new() -> Self {
        Self::with_config(StageConfig::default())
    }

    pub fn with_config(config: StageConfig) -> Self {
        let cache = TextureCache::with_resource_folder(&config.resource_folder);
        Self {
            config,
            store: ElementStore::new(),
            cache,
            scheduler: Scheduler::new(),
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.config.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.config.height = height;
        self
    }

    pub fn background(mut self, color: [u8; 4]) -> Self {
        self.config.background = color;
        self
    }

    pub fn resource_folder(mut self, folder: impl Into<String>) -> Self {
        self.config.resource_folder = folder.into();
        self.cache.set_resource_folder(&self.config.resource_folder);
        self
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ElementStore {
        &mut self.store
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TextureCache {
        &mut self.cache
    }

    /// Handle to the scheduler; clones share the same bindings.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// A software canvas sized and cleared per the config.
    pub fn create_canvas(&self) -> Option<PixmapCanvas> {
        PixmapCanvas::new(self.config.width, self.config.height, self.config.background)
    }

    /// Create an element from a declarative description.
    pub fn add_from_spec(&mut self, spec: &ElementSpec) -> Result<String, SpecError> {
        self.store.add_from_spec(&mut self.cache, spec)
    }

    /// Create every element of a JSON array, in order, and return their
    /// names. Stops at the first element that cannot be created.
    pub fn load_elements_json(&mut self, json: &str) -> Result<Vec<String>, SpecError> {
        let specs = ElementSpec::list_from_json(json)?;
        let mut names = Vec::with_capacity(specs.len());
        for spec in &specs {
            names.push(self.add_from_spec(spec)?);
        }
        log::info!("Loaded {} elements", names.len());
        Ok(names)
    }

    /// Bind a timeline to an element.
    pub fn animate(&mut self, target: &str, timeline: Timeline) -> bool {
        self.scheduler.add(&self.store, target, timeline)
    }

    pub fn load_animation_json(&mut self, target: &str, json: &str) -> Result<(), SpecError> {
        self.scheduler.load_from_json(&self.store, target, json)
    }

    /// Remove an element, release its dynamic texture and cancel its
    /// timelines. Children keep their (now dangling) parent link.
    pub fn remove_element(&mut self, name: &str) -> bool {
        self.scheduler.remove(name);
        self.store.remove_element_with_texture(&mut self.cache, name)
    }

    pub fn find_element_at(&self, x: i32, y: i32) -> Option<&str> {
        self.store.find_element_at(x, y)
    }

    /// Advance all timelines by `dt_ms`.
    pub fn update(&mut self, dt_ms: f32) {
        self.scheduler.update(dt_ms, &mut self.store, &mut self.cache);
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        canvas.begin_frame();
        self.store.render(canvas);
    }

    /// One frame: animation output is written before anything is drawn.
    pub fn frame(&mut self, dt_ms: f32, canvas: &mut dyn Canvas) {
        self.update(dt_ms);
        self.render(canvas);
    }

    /// Drop every timeline, element and texture.
    pub fn clear(&mut self) {
        self.scheduler.clear();
        self.store.clear();
        self.cache.clear();
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
