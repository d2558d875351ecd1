//! Resource manifest: the list of named static images the cache may load.
//!
//! ```json
//! {
//!   "resource_folder": "assets",
//!   "resources": [
//!     { "name": "button_bg", "path": "ui/button_9patch.png", "type": "image" },
//!     { "name": "intro", "path": "scenes/intro.json", "type": "scene" }
//!   ]
//! }
//! ```
//!
//! Only `image` entries concern the texture cache; other kinds are left to
//! whatever data layer owns them.

use serde::{Deserialize, Serialize};

use super::TextureError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceManifest {
    #[serde(default)]
    pub resource_folder: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResourceEntry {
    pub fn is_image(&self) -> bool {
        self.kind == "image"
    }
}

impl ResourceManifest {
    pub fn from_json(json: &str) -> Result<Self, TextureError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureCache;

    #[test]
    fn test_parse_manifest() {
        let manifest = ResourceManifest::from_json(
            r#"{
                "resource_folder": "assets",
                "initial_scene": "intro",
                "resources": [
                    { "name": "bg", "path": "bg.png", "type": "image" },
                    { "name": "intro", "path": "intro.json", "type": "scene" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.resource_folder.as_deref(), Some("assets"));
        assert_eq!(manifest.resources.len(), 2);
        assert!(manifest.resources[0].is_image());
        assert!(!manifest.resources[1].is_image());
    }

    #[test]
    fn test_apply_manifest_registers_images_only() {
        let manifest = ResourceManifest::from_json(
            r#"{ "resources": [
                { "name": "a", "path": "a.png", "type": "image" },
                { "name": "b", "path": "b.txt", "type": "text" },
                { "name": "c", "path": "c.svg", "type": "image" }
            ] }"#,
        )
        .unwrap();
        let mut cache = TextureCache::new();
        assert_eq!(cache.apply_manifest(&manifest), 2);
        assert!(cache.has_image_path("a"));
        assert!(!cache.has_image_path("b"));
        assert!(cache.has_image_path("c"));
    }

    #[test]
    fn test_malformed_manifest() {
        assert!(matches!(
            ResourceManifest::from_json("{ \"resources\": 3 }"),
            Err(TextureError::Manifest(_))
        ));
    }

    #[test]
    fn test_load_manifest_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "stagehand_manifest_{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{ "resource_folder": "res", "resources": [
                { "name": "icon", "path": "icon.png", "type": "image" }
            ] }"#,
        )
        .unwrap();

        let mut cache = TextureCache::new();
        assert_eq!(cache.load_manifest(&path).unwrap(), 1);
        assert_eq!(cache.resource_folder(), std::path::Path::new("res"));
        let _ = std::fs::remove_file(path);

        assert!(matches!(
            cache.load_manifest("/no/such/manifest.json"),
            Err(TextureError::Io { .. })
        ));
    }
}
