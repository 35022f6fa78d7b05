use std::path::{Path, PathBuf};

use async_trait::async_trait;
use snapstrip_core::{FrameBuffer, SnapError, SnapResult};

use crate::camera::{CameraSource, CameraStream, StreamDimensions, StreamRequest};

const EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Replays the images of a directory, in file-name order, as a live feed.
#[derive(Debug, Clone)]
pub struct StillCamera {
    dir: PathBuf,
}

impl StillCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn load_frames(dir: &Path) -> SnapResult<Vec<FrameBuffer>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SnapError::camera(format!("cannot open {}: {}", dir.display(), e)))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        match image::open(&path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (w, h) = rgba.dimensions();
                if let Some(fb) = FrameBuffer::from_rgba(w, h, rgba.into_raw()) {
                    frames.push(fb);
                }
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable frame"),
        }
    }
    Ok(frames)
}

#[async_trait]
impl CameraSource for StillCamera {
    async fn open(&self, request: &StreamRequest) -> SnapResult<Box<dyn CameraStream>> {
        if !request.video {
            return Err(SnapError::camera("no video track requested"));
        }
        let dir = self.dir.clone();
        let frames = tokio::task::spawn_blocking(move || load_frames(&dir))
            .await
            .map_err(|e| SnapError::camera(format!("frame loader failed: {}", e)))??;
        if frames.is_empty() {
            return Err(SnapError::camera(format!(
                "no video input device found ({} has no images)",
                self.dir.display()
            )));
        }
        tracing::debug!(dir = %self.dir.display(), frames = frames.len(), "still stream opened");
        Ok(Box::new(StillStream {
            frames,
            cursor: 0,
            playing: false,
            stopped: false,
        }))
    }

    fn name(&self) -> &str {
        "still"
    }
}

struct StillStream {
    frames: Vec<FrameBuffer>,
    cursor: usize,
    playing: bool,
    stopped: bool,
}

#[async_trait]
impl CameraStream for StillStream {
    async fn wait_for_metadata(&mut self) -> SnapResult<StreamDimensions> {
        let first = self
            .frames
            .first()
            .ok_or_else(|| SnapError::camera("stream has no frames"))?;
        Ok(StreamDimensions::new(first.width, first.height))
    }

    async fn play(&mut self) -> SnapResult<()> {
        if self.stopped {
            return Err(SnapError::camera("stream already stopped"));
        }
        self.playing = true;
        Ok(())
    }

    fn latest_frame(&mut self) -> SnapResult<FrameBuffer> {
        if !self.is_live() {
            return Err(SnapError::render("video is not playing"));
        }
        let frame = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor += 1;
        Ok(frame)
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.playing = false;
    }

    fn is_live(&self) -> bool {
        self.playing && !self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapstrip_core::Color;
    use snapstrip_encode::PngEncoder;

    #[tokio::test]
    async fn test_replays_directory_in_name_order() {
        let dir = std::env::temp_dir().join(format!("snapstrip_still_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        for (name, color) in [("b.png", Color::BLUE), ("a.png", Color::RED)] {
            let png = PngEncoder::encode(&FrameBuffer::solid(4, 2, &color)).unwrap();
            std::fs::write(dir.join(name), png).unwrap();
        }
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut stream = StillCamera::new(&dir)
            .open(&StreamRequest::video_only())
            .await
            .unwrap();
        assert_eq!(
            stream.wait_for_metadata().await.unwrap(),
            StreamDimensions::new(4, 2)
        );
        stream.play().await.unwrap();
        assert_eq!(stream.latest_frame().unwrap().get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(stream.latest_frame().unwrap().get_pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(stream.latest_frame().unwrap().get_pixel(0, 0), Some([255, 0, 0, 255]));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_empty_directory_is_no_device() {
        let dir = std::env::temp_dir().join(format!("snapstrip_still_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let err = StillCamera::new(&dir)
            .open(&StreamRequest::video_only())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SnapError::CameraUnavailable(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
