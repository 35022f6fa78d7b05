//! # snapstrip-capture
//!
//! The capture orchestrator. It owns the camera stream, derives the preview
//! size from the stream's native aspect ratio, burns the active filter into
//! each snapshot and keeps the bounded sequence of captures for the selected
//! layout.

pub mod camera;
pub mod orchestrator;
pub mod session;
pub mod sources;
pub mod surface;

pub use camera::{CameraSource, CameraStream, StreamDimensions, StreamRequest};
pub use orchestrator::{derive_preview_height, CaptureOrchestrator, CaptureOutcome, CaptureState};
pub use session::{Capture, CaptureSession};
pub use sources::{StillCamera, SyntheticBehavior, SyntheticCamera};
