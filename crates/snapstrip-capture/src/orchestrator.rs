use std::sync::Arc;

use serde::{Deserialize, Serialize};
use snapstrip_core::config::CaptureConfig;
use snapstrip_core::{Size2D, SnapError, SnapResult};
use snapstrip_encode::frame_to_data_url;
use snapstrip_fx::FilterCatalog;
use snapstrip_layout::{compose_result_view, LayoutCatalog, LayoutDescriptor, Stage, SubtreeHandle};

use crate::camera::{CameraSource, CameraStream, StreamDimensions, StreamRequest};
use crate::session::{Capture, CaptureSession};
use crate::surface::draw_capture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureState {
    /// No layout chosen.
    Idle,
    /// Layout chosen, camera requested or about to be.
    Acquiring,
    /// Preview playing, captures accepted.
    Live,
    /// Finalized; camera released.
    Complete,
}

/// Result of a single `capture()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Stored at `index`; `complete` once the required count is reached.
    Stored { index: usize, complete: bool },
    /// The cap was already reached; the frame was discarded.
    Dropped,
}

/// Widest (and, inverted, tallest) stream aspect ratio used as-is.
pub const MAX_STREAM_ASPECT: f64 = 8.0;

/// Height of the preview for `target_width`, keeping the stream's native
/// aspect ratio. A zero or non-finite ratio, or one more extreme than
/// [`MAX_STREAM_ASPECT`] in either direction, falls back to `fallback_aspect`.
pub fn derive_preview_height(
    target_width: u32,
    native: StreamDimensions,
    fallback_aspect: f64,
) -> u32 {
    let ratio = Size2D::new(native.width as f64, native.height as f64).aspect_ratio();
    let usable = ratio.is_finite() && (1.0 / MAX_STREAM_ASPECT..=MAX_STREAM_ASPECT).contains(&ratio);
    let ratio = if usable {
        ratio
    } else {
        tracing::debug!(
            width = native.width,
            height = native.height,
            fallback_aspect,
            "unusable stream aspect ratio"
        );
        fallback_aspect
    };
    ((target_width as f64 / ratio).round() as u32).max(1)
}

/// Owns the camera lifecycle and the capture session.
///
/// The stream handle never leaves the orchestrator, and every path out of
/// `Live` (finalize, reselection, returning to selection, drop) stops it
/// before anything else happens.
pub struct CaptureOrchestrator {
    layouts: Arc<LayoutCatalog>,
    filters: Arc<FilterCatalog>,
    camera: Arc<dyn CameraSource>,
    settings: CaptureConfig,
    state: CaptureState,
    session: CaptureSession,
    stream: Option<Box<dyn CameraStream>>,
    /// Derived preview size; present only while a stream is attached.
    preview: Option<StreamDimensions>,
}

impl CaptureOrchestrator {
    pub fn new(
        layouts: Arc<LayoutCatalog>,
        filters: Arc<FilterCatalog>,
        camera: Arc<dyn CameraSource>,
        settings: CaptureConfig,
    ) -> Self {
        Self {
            layouts,
            filters,
            camera,
            settings,
            state: CaptureState::Idle,
            session: CaptureSession::new(),
            stream: None,
            preview: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Size of the preview and of every capture surface while `Live`.
    pub fn preview_size(&self) -> Option<StreamDimensions> {
        self.preview
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn layout(&self) -> Option<&LayoutDescriptor> {
        self.session
            .layout
            .as_deref()
            .and_then(|id| self.layouts.resolve(id))
    }

    /// Choose a layout. Unknown identifiers are ignored (returns `false`).
    /// Otherwise any held stream is stopped, the frames are cleared and the
    /// orchestrator waits in `Acquiring` for [`acquire_camera`](Self::acquire_camera).
    pub fn select_layout(&mut self, id: &str) -> bool {
        let Some(layout) = self.layouts.resolve(id) else {
            tracing::warn!(layout = id, "ignoring unknown layout");
            return false;
        };
        let (layout_id, required) = (layout.id.clone(), layout.required);

        self.release_stream();
        let filter = std::mem::take(&mut self.session.active_filter);
        self.session = CaptureSession::for_layout(&layout_id, required, filter);
        self.session.camera_active = true;
        self.state = CaptureState::Acquiring;
        tracing::info!(layout = %layout_id, required, session = %self.session.id, "layout selected");
        true
    }

    /// Request a video-only stream, wait for its dimensions, derive the
    /// preview size and start playback. Returns the preview size.
    pub async fn acquire_camera(&mut self) -> SnapResult<StreamDimensions> {
        if self.state != CaptureState::Acquiring {
            return Err(SnapError::InvalidState(format!(
                "cannot acquire the camera while {:?}",
                self.state
            )));
        }
        self.release_stream();
        self.session.camera_active = true;

        match self.open_stream().await {
            Ok((stream, preview)) => {
                self.stream = Some(stream);
                self.preview = Some(preview);
                self.state = CaptureState::Live;
                tracing::info!(
                    camera = self.camera.name(),
                    width = preview.width,
                    height = preview.height,
                    "camera live"
                );
                Ok(preview)
            }
            Err(err) => {
                self.session.camera_active = false;
                tracing::warn!(camera = self.camera.name(), error = %err, "camera acquisition failed");
                Err(err)
            }
        }
    }

    async fn open_stream(&self) -> SnapResult<(Box<dyn CameraStream>, StreamDimensions)> {
        let mut stream = self.camera.open(&StreamRequest::video_only()).await?;

        let native = match stream.wait_for_metadata().await {
            Ok(native) => native,
            Err(err) => {
                stream.stop();
                return Err(as_camera_error(err));
            }
        };
        let width = self.settings.preview_width;
        let height = derive_preview_height(width, native, self.settings.fallback_aspect);

        if let Err(err) = stream.play().await {
            stream.stop();
            return Err(as_camera_error(err));
        }
        Ok((stream, StreamDimensions::new(width, height)))
    }

    /// Change the filter used for subsequent captures. Unknown identifiers
    /// select `none`.
    pub fn set_filter(&mut self, id: &str) {
        let resolved = self.filters.resolve(id).id.clone();
        tracing::debug!(filter = %resolved, "active filter changed");
        self.session.active_filter = resolved;
    }

    /// Snapshot the most recent video frame through the active filter.
    pub async fn capture(&mut self) -> SnapResult<CaptureOutcome> {
        if self.state != CaptureState::Live {
            return Err(SnapError::InvalidState(format!(
                "capture requires a live camera (state is {:?})",
                self.state
            )));
        }
        let (Some(stream), Some(preview)) = (self.stream.as_mut(), self.preview) else {
            return Err(SnapError::InvalidState("no stream attached".into()));
        };

        let descriptor = self.filters.resolve(&self.session.active_filter);
        let (filter, expression, chain) = (
            descriptor.id.clone(),
            descriptor.expression.clone(),
            descriptor.chain.clone(),
        );
        let mirror = self.settings.mirror;

        let drawn = match stream.latest_frame() {
            Ok(frame) => tokio::task::spawn_blocking(move || -> SnapResult<String> {
                let surface = draw_capture(&frame, preview.width, preview.height, mirror, &chain)?;
                frame_to_data_url(&surface).map_err(|e| SnapError::render(e.to_string()))
            })
            .await
            .map_err(|e| SnapError::render(format!("capture worker failed: {}", e)))
            .and_then(|drawn| drawn),
            Err(err) => Err(err),
        };
        let data_url = match drawn {
            Ok(data_url) => data_url,
            Err(err) => {
                tracing::warn!(filter = %filter, error = %err, "capture failed");
                return Err(err);
            }
        };

        let capture = Capture {
            data_url,
            filter,
            expression,
            width: preview.width,
            height: preview.height,
        };
        let outcome = match self.session.push(capture) {
            Some(index) => CaptureOutcome::Stored {
                index,
                complete: self.session.is_complete(),
            },
            None => CaptureOutcome::Dropped,
        };
        match outcome {
            CaptureOutcome::Stored { index, complete } => tracing::info!(
                index,
                complete,
                filter = %self.session.active_filter,
                "captured frame {}/{}",
                index + 1,
                self.session.required
            ),
            CaptureOutcome::Dropped => {
                tracing::debug!(required = self.session.required, "capture cap reached, frame dropped")
            }
        }
        Ok(outcome)
    }

    /// Finish the session once the required captures exist: releases the
    /// camera and enters `Complete`.
    pub fn finalize(&mut self) -> SnapResult<()> {
        if self.state != CaptureState::Live || !self.session.is_complete() {
            return Err(SnapError::InvalidState(format!(
                "cannot finalize with {}/{} captures while {:?}",
                self.session.len(),
                self.session.required,
                self.state
            )));
        }
        self.release_stream();
        self.state = CaptureState::Complete;
        tracing::info!(frames = self.session.len(), "session finalized");
        Ok(())
    }

    /// Release the camera for any reason other than finalizing. Frames are
    /// kept; a session that was not complete goes back to `Idle`.
    pub fn teardown(&mut self) {
        self.release_stream();
        if self.state != CaptureState::Complete {
            self.state = CaptureState::Idle;
        }
    }

    /// Leave the result or preview screen: release the camera and forget the
    /// layout selection and frames.
    pub fn return_to_selection(&mut self) {
        self.release_stream();
        let filter = std::mem::take(&mut self.session.active_filter);
        self.session = CaptureSession {
            active_filter: filter,
            ..CaptureSession::new()
        };
        self.state = CaptureState::Idle;
    }

    /// Render the selected layout with the current frames plus the export
    /// trigger, mounted on `stage`.
    pub fn compose(&self, stage: &mut Stage) -> SnapResult<SubtreeHandle> {
        let layout = self
            .layout()
            .ok_or_else(|| SnapError::InvalidState("no layout selected".into()))?;
        Ok(compose_result_view(layout, &self.session.sources(), stage))
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!(camera = self.camera.name(), "camera released");
        }
        self.preview = None;
        self.session.camera_active = false;
    }
}

impl Drop for CaptureOrchestrator {
    fn drop(&mut self) {
        self.release_stream();
    }
}

fn as_camera_error(err: SnapError) -> SnapError {
    match err {
        SnapError::CameraUnavailable(_) => err,
        other => SnapError::camera(format!("stream never became playable: {}", other)),
    }
}
