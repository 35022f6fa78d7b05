//! Wiring shared by the commands: config, catalogs, camera and exporter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use snapstrip_capture::{CameraSource, StillCamera, SyntheticBehavior, SyntheticCamera};
use snapstrip_core::SnapConfig;
use snapstrip_fx::FilterCatalog;
use snapstrip_layout::LayoutCatalog;
use snapstrip_render::{DirectorySaver, ExportOptions, Exporter, Rasterizer, TextRenderer};

/// Everything a command needs, built once from the config.
pub struct Pipeline {
    pub config: SnapConfig,
    pub layouts: Arc<LayoutCatalog>,
    pub filters: Arc<FilterCatalog>,
}

impl Pipeline {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => SnapConfig::load_from_file(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
            None => SnapConfig::default(),
        };
        config.validate().context("invalid configuration")?;

        let layouts = LayoutCatalog::from_config(&config).context("failed to build layout catalog")?;
        let filters = FilterCatalog::from_config(&config).context("failed to build filter catalog")?;
        tracing::debug!(layouts = layouts.len(), filters = filters.len(), "catalogs ready");

        Ok(Self {
            config,
            layouts: Arc::new(layouts),
            filters: Arc::new(filters),
        })
    }

    /// An exporter saving into `out`, or the configured output directory.
    pub fn exporter(&self, out: Option<PathBuf>) -> Exporter {
        let text = match &self.config.assets.font {
            Some(path) => TextRenderer::from_path(path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "caption font unavailable, captions skipped");
                TextRenderer::new()
            }),
            None => TextRenderer::new(),
        };
        let dir = out.unwrap_or_else(|| self.config.export.output_dir.clone());
        Exporter::new(
            Arc::new(Rasterizer::new(text)),
            Arc::new(DirectorySaver::new(dir)),
            ExportOptions::from(&self.config.export),
        )
    }
}

/// Parse the `--camera` argument.
pub fn camera_from_arg(arg: &str) -> Arc<dyn CameraSource> {
    match arg {
        "synthetic" => Arc::new(SyntheticCamera::default()),
        "deny" => Arc::new(SyntheticCamera::default().with_behavior(SyntheticBehavior::PermissionDenied)),
        "none" => Arc::new(SyntheticCamera::default().with_behavior(SyntheticBehavior::NoDevice)),
        dir => Arc::new(StillCamera::new(dir)),
    }
}

/// Filter for the `shot`-th capture (0-based): the list is applied in
/// order and its last entry repeats.
pub fn filter_for_shot(filters: &[String], shot: usize) -> &str {
    filters
        .get(shot)
        .or_else(|| filters.last())
        .map(String::as_str)
        .unwrap_or(snapstrip_fx::NONE_FILTER)
}
