use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use snapstrip_core::config::AssetsConfig;
use snapstrip_core::{SnapConfig, SnapResult};

use crate::node::ViewNode;
use crate::templates::{FilmstripTemplate, GridTemplate, StripsTemplate};

/// Arranges an ordered capture sequence into a fixed visual template.
///
/// Implementations must be pure: the same captures always yield the same
/// tree, and slots past the end of `captures` render as empty placeholders.
pub trait LayoutRenderer: Send + Sync {
    /// Build the template populated with `captures` (image `src` strings,
    /// usually PNG data URLs).
    fn render(&self, captures: &[String]) -> ViewNode;

    /// Number of photo slots the template has.
    fn slot_count(&self) -> usize;
}

/// An immutable catalog entry.
#[derive(Clone)]
pub struct LayoutDescriptor {
    pub id: String,
    pub label: String,
    /// Captures needed before the session can be finalized; at least 1.
    pub required: usize,
    pub renderer: Arc<dyn LayoutRenderer>,
}

impl LayoutDescriptor {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        required: usize,
        renderer: Arc<dyn LayoutRenderer>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required: required.max(1),
            renderer,
        }
    }

    pub fn render(&self, captures: &[String]) -> ViewNode {
        self.renderer.render(captures)
    }
}

impl fmt::Debug for LayoutDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("slots", &self.renderer.slot_count())
            .finish()
    }
}

/// Process-wide lookup table from layout identifier to descriptor.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    entries: Vec<LayoutDescriptor>,
    index: HashMap<String, usize>,
}

impl LayoutCatalog {
    pub fn new(entries: Vec<LayoutDescriptor>) -> Self {
        let mut catalog = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    /// The built-in layouts with default assets.
    pub fn builtin() -> Self {
        Self::with_assets(&AssetsConfig::default())
    }

    fn with_assets(assets: &AssetsConfig) -> Self {
        let dir: &Path = &assets.dir;
        Self::new(vec![
            LayoutDescriptor::new(
                "Layout A",
                "Twin Strips",
                6,
                Arc::new(StripsTemplate::new(assets.caption.clone())),
            ),
            LayoutDescriptor::new(
                "Layout B",
                "Filmstrip",
                4,
                Arc::new(FilmstripTemplate::new(dir.join(FilmstripTemplate::BACKDROP))),
            ),
            LayoutDescriptor::new(
                "Layout C",
                "Grid",
                4,
                Arc::new(GridTemplate::new(dir.join(GridTemplate::BACKDROP))),
            ),
        ])
    }

    /// Built-in layouts using the configured assets, with per-layout
    /// `required` and `label` overrides applied.
    pub fn from_config(config: &SnapConfig) -> SnapResult<Self> {
        let mut catalog = Self::with_assets(&config.assets);
        for (id, overrides) in &config.layouts {
            let Some(&i) = catalog.index.get(&normalize(id)) else {
                tracing::warn!(layout = %id, "override for unknown layout ignored");
                continue;
            };
            let entry = &mut catalog.entries[i];
            if let Some(required) = overrides.required {
                entry.required = (required as usize).max(1);
            }
            if let Some(label) = &overrides.label {
                entry.label = label.clone();
            }
            tracing::debug!(layout = %entry.id, required = entry.required, "applied layout override");
        }
        Ok(catalog)
    }

    fn insert(&mut self, descriptor: LayoutDescriptor) {
        match self.index.get(&normalize(&descriptor.id)) {
            Some(&i) => self.entries[i] = descriptor,
            None => {
                self.index
                    .insert(normalize(&descriptor.id), self.entries.len());
                self.entries.push(descriptor);
            }
        }
    }

    pub fn resolve(&self, id: &str) -> Option<&LayoutDescriptor> {
        self.index.get(&normalize(id)).map(|&i| &self.entries[i])
    }

    /// Required capture count, or 1 for an unknown layout.
    pub fn required_count(&self, id: &str) -> usize {
        match self.resolve(id) {
            Some(layout) => layout.required,
            None => {
                tracing::warn!(layout = id, "unknown layout, requiring a single capture");
                1
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(id: &str) -> String {
    id.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapstrip_core::config::LayoutOverride;

    #[test]
    fn test_builtin_counts() {
        let catalog = LayoutCatalog::builtin();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.required_count("Layout A"), 6);
        assert_eq!(catalog.required_count("Layout B"), 4);
        assert_eq!(catalog.required_count("Layout C"), 4);
    }

    #[test]
    fn test_resolve_is_lenient_about_case_and_spacing() {
        let catalog = LayoutCatalog::builtin();
        assert_eq!(catalog.resolve("  layout   c ").unwrap().id, "Layout C");
    }

    #[test]
    fn test_unknown_layout() {
        let catalog = LayoutCatalog::builtin();
        assert!(catalog.resolve("Layout Z").is_none());
        assert_eq!(catalog.required_count("Layout Z"), 1);
    }

    #[test]
    fn test_config_overrides() {
        let mut config = SnapConfig::default();
        config.assets.dir = "assets".into();
        config.layouts.insert(
            "layout b".into(),
            LayoutOverride {
                required: Some(6),
                label: Some("Long Strip".into()),
            },
        );
        config.layouts.insert(
            "Layout Q".into(),
            LayoutOverride {
                required: Some(2),
                label: None,
            },
        );
        let catalog = LayoutCatalog::from_config(&config).unwrap();
        let b = catalog.resolve("Layout B").unwrap();
        assert_eq!(b.required, 6);
        assert_eq!(b.label, "Long Strip");
        assert_eq!(catalog.len(), 3);

        let tree = b.render(&[]);
        assert!(tree
            .image_sources()
            .iter()
            .any(|s| **s == crate::ImageSource::Asset("assets/image.png".into())));
    }

    #[test]
    fn test_descriptor_required_is_never_zero() {
        let d = LayoutDescriptor::new("x", "x", 0, Arc::new(StripsTemplate::new("")));
        assert_eq!(d.required, 1);
    }
}
