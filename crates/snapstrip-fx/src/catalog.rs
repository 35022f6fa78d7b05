use std::collections::HashMap;

use serde::Serialize;
use snapstrip_core::{SnapConfig, SnapResult};

use crate::ast::FilterChain;

/// Identifier of the no-op filter every unknown identifier resolves to.
pub const NONE_FILTER: &str = "none";

/// An immutable catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct FilterDescriptor {
    pub id: String,
    pub label: String,
    /// The drawing-surface filter expression as written.
    pub expression: String,
    /// Style token the UI puts on the live preview.
    pub style_class: String,
    #[serde(skip)]
    pub chain: FilterChain,
}

impl FilterDescriptor {
    pub fn new(
        id: &str,
        label: &str,
        expression: &str,
        style_class: &str,
    ) -> SnapResult<Self> {
        Ok(Self {
            id: normalize(id),
            label: label.to_string(),
            expression: expression.to_string(),
            style_class: style_class.to_string(),
            chain: crate::parse(expression)?,
        })
    }
}

const BUILTIN: &[(&str, &str, &str, &str)] = &[
    (NONE_FILTER, "No Filter", "none", ""),
    ("grayscale", "Grayscale", "grayscale(100%)", "grayscale"),
    ("sepia", "Retro (Sepia)", "sepia(100%)", "sepia"),
    ("noir", "Noir", "grayscale(100%) contrast(160%)", "noir"),
    (
        "vintage",
        "Vintage",
        "sepia(60%) contrast(110%) brightness(105%) saturate(85%)",
        "vintage",
    ),
];

/// Process-wide lookup table from filter identifier to descriptor.
#[derive(Debug, Clone)]
pub struct FilterCatalog {
    entries: Vec<FilterDescriptor>,
    index: HashMap<String, usize>,
}

impl FilterCatalog {
    /// The built-in filters.
    pub fn builtin() -> Self {
        let mut catalog = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for (id, label, expression, class) in BUILTIN {
            // Built-in expressions are covered by tests; a parse failure here
            // would be a programming error, so fall back to the identity chain.
            let descriptor = FilterDescriptor::new(id, label, expression, class).unwrap_or_else(
                |err| {
                    tracing::error!(filter = id, %err, "invalid built-in filter expression");
                    FilterDescriptor {
                        id: id.to_string(),
                        label: label.to_string(),
                        expression: NONE_FILTER.to_string(),
                        style_class: class.to_string(),
                        chain: FilterChain::none(),
                    }
                },
            );
            catalog.insert(descriptor);
        }
        catalog
    }

    /// Built-ins plus the `[[filters]]` entries of `config`; a config entry
    /// with a built-in identifier replaces it.
    pub fn from_config(config: &SnapConfig) -> SnapResult<Self> {
        let mut catalog = Self::builtin();
        for entry in &config.filters {
            let id = normalize(&entry.id);
            let descriptor = FilterDescriptor::new(
                &id,
                entry.label.as_deref().unwrap_or(&entry.id),
                &entry.expression,
                entry.style_class.as_deref().unwrap_or(&id),
            )?;
            tracing::debug!(filter = %descriptor.id, expression = %descriptor.expression, "registered filter");
            catalog.insert(descriptor);
        }
        Ok(catalog)
    }

    fn insert(&mut self, descriptor: FilterDescriptor) {
        match self.index.get(&descriptor.id) {
            Some(&i) => self.entries[i] = descriptor,
            None => {
                self.index.insert(descriptor.id.clone(), self.entries.len());
                self.entries.push(descriptor);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&FilterDescriptor> {
        self.index.get(&normalize(id)).map(|&i| &self.entries[i])
    }

    /// Look up `id`, falling back to the no-op filter for unknown identifiers.
    pub fn resolve(&self, id: &str) -> &FilterDescriptor {
        match self.get(id) {
            Some(descriptor) => descriptor,
            None => {
                tracing::warn!(filter = id, "unknown filter, using '{}'", NONE_FILTER);
                self.none()
            }
        }
    }

    pub fn none(&self) -> &FilterDescriptor {
        // `none` is inserted first by `builtin` and never removed.
        &self.entries[self.index.get(NONE_FILTER).copied().unwrap_or(0)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Case- and whitespace-insensitive identifier.
pub fn normalize(id: &str) -> String {
    id.trim().to_lowercase()
}
