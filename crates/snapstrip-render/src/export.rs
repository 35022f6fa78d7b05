//! Layout export: rasterize a mounted subtree, encode it as PNG and hand it
//! to a [`FileSaver`].
//!
//! An export either produces exactly one file or none at all.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use snapstrip_core::config::ExportConfig;
use snapstrip_core::frame::FrameBuffer;
use snapstrip_core::hash::{hash_frame, ContentHash};
use snapstrip_core::{SnapError, SnapResult};
use snapstrip_encode::PngEncoder;
use snapstrip_layout::{Stage, SubtreeHandle};
use tokio::task;

use crate::rasterizer::{exclude_controls, ExclusionPredicate, Rasterizer};

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub file_name: String,
    pub device_pixel_ratio: f64,
    pub zoom: f64,
    pub background: String,
}

impl ExportOptions {
    /// Device pixels per CSS pixel in the exported bitmap.
    pub fn scale(&self) -> f64 {
        self.device_pixel_ratio * self.zoom
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            file_name: config.file_name.clone(),
            device_pixel_ratio: config.device_pixel_ratio,
            zoom: config.zoom,
            background: config.background.clone(),
        }
    }
}

/// What a successful export wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub hash: ContentHash,
}

/// Destination of exported files (a download, a directory, ...).
#[async_trait]
pub trait FileSaver: Send + Sync {
    /// Persist `bytes` under `file_name` and return where they ended up.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> SnapResult<PathBuf>;
}

/// Saves into a directory. Files appear atomically: bytes are written to a
/// hidden temporary file first and renamed into place.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FileSaver for DirectorySaver {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> SnapResult<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| SnapError::Config(format!("invalid export file name '{}'", file_name)))?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.dir.join(name);
        let partial = self.dir.join(format!(
            ".{}.{}.part",
            name.to_string_lossy(),
            uuid::Uuid::new_v4()
        ));
        if let Err(e) = tokio::fs::write(&partial, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tracing::debug!(path = %target.display(), bytes = bytes.len(), "saved file");
        Ok(target)
    }
}

/// Rasterizes mounted subtrees and saves them as PNG.
pub struct Exporter {
    rasterizer: Arc<Rasterizer>,
    saver: Arc<dyn FileSaver>,
    options: ExportOptions,
    exclude: ExclusionPredicate,
}

impl Exporter {
    pub fn new(rasterizer: Arc<Rasterizer>, saver: Arc<dyn FileSaver>, options: ExportOptions) -> Self {
        Self {
            rasterizer,
            saver,
            options,
            exclude: exclude_controls(),
        }
    }

    /// Replace the default predicate (interactive controls) deciding which
    /// nodes are left out of the bitmap.
    pub fn with_exclusion(mut self, exclude: ExclusionPredicate) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Rasterize the subtree behind `handle` without saving it.
    pub async fn rasterize(&self, stage: &Stage, handle: SubtreeHandle) -> SnapResult<FrameBuffer> {
        let tree = stage
            .get(handle)
            .cloned()
            .ok_or_else(|| SnapError::render(format!("{} is not mounted", handle)))?;
        let rasterizer = Arc::clone(&self.rasterizer);
        let exclude = Arc::clone(&self.exclude);
        let scale = self.options.scale();
        let background = self.options.background.clone();

        task::spawn_blocking(move || rasterizer.rasterize(&tree, scale, &background, exclude.as_ref()))
            .await
            .map_err(|e| SnapError::render(format!("rasterizer task failed: {}", e)))?
    }

    /// Rasterize, encode and save the subtree behind `handle`.
    ///
    /// On failure nothing is written and the stage is left untouched.
    pub async fn export(&self, stage: &Stage, handle: SubtreeHandle) -> SnapResult<ExportReport> {
        match self.export_inner(stage, handle).await {
            Ok(report) => {
                tracing::info!(
                    path = %report.path.display(),
                    width = report.width,
                    height = report.height,
                    hash = %report.hash,
                    "exported layout"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(%handle, error = %e, "layout export failed");
                Err(e)
            }
        }
    }

    async fn export_inner(&self, stage: &Stage, handle: SubtreeHandle) -> SnapResult<ExportReport> {
        let frame = self.rasterize(stage, handle).await?;
        let hash = hash_frame(&frame);
        let (width, height) = (frame.width, frame.height);
        let bytes = task::spawn_blocking(move || PngEncoder::encode(&frame))
            .await
            .map_err(|e| SnapError::Encode(format!("encoder task failed: {}", e)))??;
        let path = self.saver.save(&self.options.file_name, &bytes).await?;
        Ok(ExportReport {
            path,
            width,
            height,
            hash,
        })
    }
}
