use async_trait::async_trait;
use snapstrip_core::{Color, FrameBuffer, Rect, SnapError, SnapResult};

use crate::camera::{CameraSource, CameraStream, StreamDimensions, StreamRequest};

/// How a [`SyntheticCamera`] responds to a stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntheticBehavior {
    #[default]
    Available,
    /// The user declines the permission prompt.
    PermissionDenied,
    /// No video input device is present.
    NoDevice,
    /// The stream announces a zero width in its metadata.
    ZeroWidth,
}

const BARS: [[u8; 4]; 7] = [
    [235, 235, 235, 255],
    [235, 235, 16, 255],
    [16, 235, 235, 255],
    [16, 235, 16, 255],
    [235, 16, 235, 255],
    [235, 16, 16, 255],
    [16, 16, 235, 255],
];

/// An animated color-bar test pattern.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    behavior: SyntheticBehavior,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            behavior: SyntheticBehavior::Available,
        }
    }

    pub fn with_behavior(mut self, behavior: SyntheticBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn behavior(&self) -> SyntheticBehavior {
        self.behavior
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

#[async_trait]
impl CameraSource for SyntheticCamera {
    async fn open(&self, request: &StreamRequest) -> SnapResult<Box<dyn CameraStream>> {
        if !request.video {
            return Err(SnapError::camera("no video track requested"));
        }
        match self.behavior {
            SyntheticBehavior::PermissionDenied => {
                Err(SnapError::camera("permission denied by user"))
            }
            SyntheticBehavior::NoDevice => Err(SnapError::camera("no video input device found")),
            SyntheticBehavior::Available | SyntheticBehavior::ZeroWidth => {
                tracing::debug!(width = self.width, height = self.height, "synthetic stream opened");
                Ok(Box::new(SyntheticStream {
                    width: self.width,
                    height: self.height,
                    zero_width: self.behavior == SyntheticBehavior::ZeroWidth,
                    tick: 0,
                    playing: false,
                    stopped: false,
                }))
            }
        }
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    zero_width: bool,
    tick: u32,
    playing: bool,
    stopped: bool,
}

impl SyntheticStream {
    fn render_pattern(&self) -> FrameBuffer {
        let mut fb = FrameBuffer::solid(self.width, self.height, &Color::BLACK);
        let bar_width = (self.width as usize).div_ceil(BARS.len()).max(1);
        for y in 0..self.height {
            for x in 0..self.width {
                fb.set_pixel(x, y, BARS[(x as usize / bar_width).min(BARS.len() - 1)]);
            }
        }
        // A square that walks across the frame so consecutive frames differ.
        let side = (self.height / 6).max(1) as f64;
        let travel = (self.width as f64 - side).max(1.0);
        let x = (self.tick as f64 * side / 2.0) % travel;
        fb.fill_rect(
            Rect::new(x, self.height as f64 / 2.0 - side / 2.0, side, side),
            0.0,
            &Color::WHITE,
        );
        fb
    }
}

#[async_trait]
impl CameraStream for SyntheticStream {
    async fn wait_for_metadata(&mut self) -> SnapResult<StreamDimensions> {
        if self.stopped {
            return Err(SnapError::camera("stream already stopped"));
        }
        let width = if self.zero_width { 0 } else { self.width };
        Ok(StreamDimensions::new(width, self.height))
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
        let frame = self.render_pattern();
        self.tick = self.tick.wrapping_add(1);
        Ok(frame)
    }

    fn stop(&mut self) {
        if !self.stopped {
            tracing::debug!("synthetic stream stopped");
        }
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

    #[tokio::test]
    async fn test_pattern_stream_lifecycle() {
        let camera = SyntheticCamera::new(70, 30);
        let mut stream = camera.open(&StreamRequest::video_only()).await.unwrap();
        assert_eq!(
            stream.wait_for_metadata().await.unwrap(),
            StreamDimensions::new(70, 30)
        );
        assert!(stream.latest_frame().is_err());

        stream.play().await.unwrap();
        let first = stream.latest_frame().unwrap();
        assert_eq!((first.width, first.height), (70, 30));
        assert_eq!(first.get_pixel(0, 0), Some(BARS[0]));
        assert_eq!(first.get_pixel(69, 0), Some(BARS[6]));
        assert_ne!(stream.latest_frame().unwrap(), first);

        stream.stop();
        stream.stop();
        assert!(!stream.is_live());
        assert!(stream.latest_frame().is_err());
    }

    #[tokio::test]
    async fn test_denied_and_missing_devices() {
        for behavior in [SyntheticBehavior::PermissionDenied, SyntheticBehavior::NoDevice] {
            let camera = SyntheticCamera::default().with_behavior(behavior);
            let err = camera.open(&StreamRequest::video_only()).await.err().unwrap();
            assert!(matches!(err, SnapError::CameraUnavailable(_)));
        }
    }

    #[tokio::test]
    async fn test_zero_width_metadata() {
        let camera = SyntheticCamera::default().with_behavior(SyntheticBehavior::ZeroWidth);
        let mut stream = camera.open(&StreamRequest::video_only()).await.unwrap();
        assert_eq!(stream.wait_for_metadata().await.unwrap().width, 0);
    }
}
