use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snapstrip_core::{FrameBuffer, SnapResult};

/// What the orchestrator asks the host for: a video-only stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRequest {
    pub video: bool,
    pub audio: bool,
}

impl StreamRequest {
    pub fn video_only() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// Intrinsic dimensions announced by a stream once its metadata is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDimensions {
    pub width: u32,
    pub height: u32,
}

impl StreamDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A host camera: permission prompt plus device lookup.
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Request a stream. Permission denial and missing devices are reported
    /// as `SnapError::CameraUnavailable`.
    async fn open(&self, request: &StreamRequest) -> SnapResult<Box<dyn CameraStream>>;

    fn name(&self) -> &str;
}

/// A live video stream. Owned exclusively by whoever opened it.
#[async_trait]
pub trait CameraStream: Send + Sync {
    /// Suspends until the stream announces its intrinsic dimensions.
    async fn wait_for_metadata(&mut self) -> SnapResult<StreamDimensions>;

    /// Start playback; frames are available afterwards.
    async fn play(&mut self) -> SnapResult<()>;

    /// The most recently produced frame. There is no queue: calling this
    /// twice in a row may return the same frame.
    fn latest_frame(&mut self) -> SnapResult<FrameBuffer>;

    /// Stop every track. Must be idempotent.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}
