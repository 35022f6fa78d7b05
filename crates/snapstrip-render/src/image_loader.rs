//! Image loading for the rasterizer.
//! Decodes capture data URLs and local template assets into FrameBuffers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use snapstrip_core::frame::FrameBuffer;
use snapstrip_core::{SnapError, SnapResult};
use snapstrip_encode::decode_data_url;
use snapstrip_layout::{ImageSource, ObjectFit};

/// Loads decoded images. Template assets are cached by path; capture data
/// URLs belong to one session and are decoded on every call.
#[derive(Debug, Default)]
pub struct ImageLoader {
    assets: DashMap<PathBuf, Arc<FrameBuffer>>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `source`.
    ///
    /// Returns `Ok(None)` for a local asset that is missing or unreadable:
    /// the template then renders without it. Capture data that cannot be
    /// decoded and cross-origin sources fail the whole rasterization.
    pub fn load(&self, source: &ImageSource) -> SnapResult<Option<Arc<FrameBuffer>>> {
        match source {
            ImageSource::DataUrl(url) => decode_data_url(url)
                .map(|fb| Some(Arc::new(fb)))
                .map_err(|e| SnapError::render(format!("unreadable capture: {}", e))),
            ImageSource::Asset(path) => Ok(self.load_asset(path)),
            ImageSource::Remote(url) => Err(SnapError::render(format!(
                "cross-origin image {} cannot be read back",
                url
            ))),
        }
    }

    fn load_asset(&self, path: &Path) -> Option<Arc<FrameBuffer>> {
        if let Some(cached) = self.assets.get(path) {
            return Some(Arc::clone(cached.value()));
        }
        match load_image(path) {
            Ok(fb) => {
                let decoded = Arc::new(fb);
                self.assets.insert(path.to_path_buf(), Arc::clone(&decoded));
                Some(decoded)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "asset unavailable, rendering without it");
                None
            }
        }
    }

    /// Number of cached template assets.
    pub fn cached(&self) -> usize {
        self.assets.len()
    }
}

/// Load an image file and convert it to a FrameBuffer.
pub fn load_image(path: &Path) -> SnapResult<FrameBuffer> {
    let img = image::open(path).map_err(|e| {
        SnapError::asset(
            format!("failed to load image '{}': {}", path.display(), e),
            path,
        )
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer::from_rgba(width, height, rgba.into_raw())
        .ok_or_else(|| SnapError::asset("decoded image has an inconsistent size", path))
}

/// Scale `src` into a `width`x`height` box. `Cover` keeps the aspect ratio
/// and crops the overflow evenly on both sides; `Fill` stretches.
pub fn fit_image(src: &FrameBuffer, width: u32, height: u32, fit: ObjectFit) -> FrameBuffer {
    if src.is_empty() || width == 0 || height == 0 {
        return FrameBuffer::new(width, height, snapstrip_core::PixelFormat::Rgba8);
    }
    let (scaled_w, scaled_h) = match fit {
        ObjectFit::Fill => (width, height),
        ObjectFit::Cover => {
            let scale = (width as f64 / src.width as f64).max(height as f64 / src.height as f64);
            (
                ((src.width as f64 * scale).ceil() as u32).max(width),
                ((src.height as f64 * scale).ceil() as u32).max(height),
            )
        }
    };

    let scaled = if (scaled_w, scaled_h) == (src.width, src.height) {
        src.clone()
    } else {
        match ImageBuffer::<Rgba<u8>, _>::from_raw(src.width, src.height, src.data.clone()) {
            Some(img) => {
                let resized = imageops::resize(&img, scaled_w, scaled_h, FilterType::Triangle);
                FrameBuffer::from_rgba(scaled_w, scaled_h, resized.into_raw())
                    .unwrap_or_else(|| FrameBuffer::new(scaled_w, scaled_h, src.format))
            }
            None => return FrameBuffer::new(width, height, snapstrip_core::PixelFormat::Rgba8),
        }
    };

    if (scaled.width, scaled.height) == (width, height) {
        return scaled;
    }
    let x = (scaled.width - width) as f64 / 2.0;
    let y = (scaled.height - height) as f64 / 2.0;
    scaled.crop(snapstrip_core::Rect::new(x.floor(), y.floor(), width as f64, height as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapstrip_core::Color;
    use snapstrip_encode::{frame_to_data_url, PngEncoder};

    #[test]
    fn test_load_image_missing_file() {
        assert!(load_image(Path::new("/nonexistent/image.png")).is_err());
    }

    #[test]
    fn test_missing_asset_is_skipped() {
        let loader = ImageLoader::new();
        let source = ImageSource::Asset("/nonexistent/layoutC.png".into());
        assert!(loader.load(&source).unwrap().is_none());
    }

    #[test]
    fn test_remote_source_fails() {
        let loader = ImageLoader::new();
        let err = loader
            .load(&ImageSource::Remote("https://example.com/a.png".into()))
            .unwrap_err();
        assert!(matches!(err, SnapError::CaptureRenderFailure(_)));
    }

    #[test]
    fn test_only_assets_are_cached() {
        let dir = std::env::temp_dir().join(format!("snapstrip_loader_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("layoutC.png");
        std::fs::write(&path, PngEncoder::encode(&FrameBuffer::solid(3, 3, &Color::BLUE)).unwrap()).unwrap();

        let loader = ImageLoader::new();
        let asset = ImageSource::Asset(path);
        let a = loader.load(&asset).unwrap().unwrap();
        let b = loader.load(&asset).unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        for color in [Color::RED, Color::GREEN, Color::WHITE] {
            let url = frame_to_data_url(&FrameBuffer::solid(3, 3, &color)).unwrap();
            let fb = loader.load(&ImageSource::DataUrl(url)).unwrap().unwrap();
            assert_eq!(fb.get_pixel(1, 1), Some(color.to_rgba8()));
        }
        assert_eq!(loader.cached(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cover_crops_the_long_side() {
        // 4x2 source: left half red, right half blue.
        let mut src = FrameBuffer::solid(4, 2, &Color::BLUE);
        for y in 0..2 {
            for x in 0..2 {
                src.set_pixel(x, y, [255, 0, 0, 255]);
            }
        }
        let out = fit_image(&src, 2, 2, ObjectFit::Cover);
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(1, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_fill_stretches() {
        let out = fit_image(&FrameBuffer::solid(4, 2, &Color::GREEN), 3, 5, ObjectFit::Fill);
        assert_eq!((out.width, out.height), (3, 5));
    }
}
