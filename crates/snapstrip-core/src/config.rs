use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SnapError, SnapResult};

/// Preview and capture surface settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Fixed target width of the preview and of every capture surface.
    pub preview_width: u32,
    /// Width/height ratio assumed when the stream reports an unusable one.
    pub fallback_aspect: f64,
    /// Mirror captures so they match the selfie-style preview.
    pub mirror: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            preview_width: 320,
            fallback_aspect: 4.0 / 3.0,
            mirror: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
    pub output_dir: PathBuf,
    pub device_pixel_ratio: f64,
    /// Extra over-sampling on top of the device pixel ratio.
    pub zoom: f64,
    /// CSS color painted under the layout; "transparent" keeps alpha.
    pub background: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "layout.png".to_string(),
            output_dir: PathBuf::from("."),
            device_pixel_ratio: 1.0,
            zoom: 2.0,
            background: "transparent".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding template backdrops (`image.png`, `layoutC.png`).
    pub dir: PathBuf,
    /// Font used for captions. Captions are skipped when unset.
    pub font: Option<PathBuf>,
    /// Default caption for layouts that print one.
    pub caption: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public"),
            font: None,
            caption: "Jane & Johnny\n1-16-2019".to_string(),
        }
    }
}

/// Per-layout overrides keyed by layout identifier.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LayoutOverride {
    pub required: Option<u32>,
    pub label: Option<String>,
}

/// An additional (or replacement) filter catalog entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterEntry {
    pub id: String,
    pub label: Option<String>,
    pub expression: String,
    pub style_class: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SnapConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub layouts: BTreeMap<String, LayoutOverride>,
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
}

impl SnapConfig {
    pub fn from_toml_str(contents: &str) -> SnapResult<Self> {
        let config: SnapConfig =
            toml::from_str(contents).map_err(|e| SnapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> SnapResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> SnapResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| SnapError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values that would make capture or export degenerate.
    pub fn validate(&self) -> SnapResult<()> {
        if self.capture.preview_width == 0 {
            return Err(SnapError::Config("capture.preview_width must be > 0".into()));
        }
        if !(self.capture.fallback_aspect.is_finite() && self.capture.fallback_aspect > 0.0) {
            return Err(SnapError::Config(
                "capture.fallback_aspect must be a positive number".into(),
            ));
        }
        for (name, value) in [
            ("export.device_pixel_ratio", self.export.device_pixel_ratio),
            ("export.zoom", self.export.zoom),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SnapError::Config(format!("{} must be a positive number", name)));
            }
        }
        if self.export.file_name.trim().is_empty() {
            return Err(SnapError::Config("export.file_name must not be empty".into()));
        }
        for (id, layout) in &self.layouts {
            if layout.required == Some(0) {
                return Err(SnapError::Config(format!(
                    "layouts.\"{}\".required must be at least 1",
                    id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SnapConfig::default();
        assert_eq!(config.capture.preview_width, 320);
        assert_eq!(config.export.file_name, "layout.png");
        assert_eq!(config.export.zoom, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = SnapConfig::from_toml_str(
            r#"
            [export]
            zoom = 1.0

            [layouts."Layout B"]
            required = 6

            [[filters]]
            id = "noir"
            expression = "grayscale(100%) contrast(160%)"
            "#,
        )
        .unwrap();
        assert_eq!(config.export.zoom, 1.0);
        assert_eq!(config.export.file_name, "layout.png");
        assert_eq!(config.layouts["Layout B"].required, Some(6));
        assert_eq!(config.filters[0].id, "noir");
        assert_eq!(config.capture.preview_width, 320);
    }

    #[test]
    fn test_rejects_zero_required_count() {
        let err = SnapConfig::from_toml_str(
            r#"
            [layouts."Layout A"]
            required = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_rejects_non_positive_zoom() {
        assert!(SnapConfig::from_toml_str("[export]\nzoom = 0.0\n").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join("snapstrip_test_config.toml");
        let mut config = SnapConfig::default();
        config.export.zoom = 3.0;
        config.save_to_file(&path).unwrap();
        let reloaded = SnapConfig::load_from_file(&path).unwrap();
        assert_eq!(reloaded.export.zoom, 3.0);
        let _ = std::fs::remove_file(&path);
    }
}
