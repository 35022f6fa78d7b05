use serde::{Deserialize, Serialize};
use uuid::Uuid;

use snapstrip_fx::NONE_FILTER;

/// One encoded still taken from the live feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    /// `data:image/png;base64,...`
    pub data_url: String,
    /// Filter identifier active when the capture was drawn.
    pub filter: String,
    /// The expression that was burned in.
    pub expression: String,
    pub width: u32,
    pub height: u32,
}

/// Observable state of one photo-booth session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSession {
    pub id: Uuid,
    /// Unset until a layout is selected.
    pub layout: Option<String>,
    /// Capture cap for the selected layout.
    pub required: usize,
    pub frames: Vec<Capture>,
    pub active_filter: String,
    pub camera_active: bool,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            layout: None,
            required: 1,
            frames: Vec::new(),
            active_filter: NONE_FILTER.to_string(),
            camera_active: false,
        }
    }

    /// A fresh session for `layout`; the active filter carries over.
    pub(crate) fn for_layout(layout: &str, required: usize, active_filter: String) -> Self {
        Self {
            layout: Some(layout.to_string()),
            required: required.max(1),
            active_filter,
            ..Self::new()
        }
    }

    /// Append a capture, then truncate to the cap. Returns the index it was
    /// stored at, or `None` if the cap had already been reached.
    pub(crate) fn push(&mut self, capture: Capture) -> Option<usize> {
        let before = self.frames.len();
        self.frames.push(capture);
        self.frames.truncate(self.required);
        (self.frames.len() > before).then_some(before)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The required number of captures has been reached.
    pub fn is_complete(&self) -> bool {
        self.layout.is_some() && self.frames.len() >= self.required
    }

    /// Image sources in capture order, ready for a layout renderer.
    pub fn sources(&self) -> Vec<String> {
        self.frames.iter().map(|c| c.data_url.clone()).collect()
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(n: u32) -> Capture {
        Capture {
            data_url: format!("data:image/png;base64,{}", n),
            filter: NONE_FILTER.into(),
            expression: "none".into(),
            width: 320,
            height: 240,
        }
    }

    #[test]
    fn test_push_caps_the_sequence() {
        let mut session = CaptureSession::for_layout("Layout C", 2, NONE_FILTER.into());
        assert_eq!(session.push(capture(1)), Some(0));
        assert!(!session.is_complete());
        assert_eq!(session.push(capture(2)), Some(1));
        assert!(session.is_complete());
        assert_eq!(session.push(capture(3)), None);
        assert_eq!(session.len(), 2);
        assert_eq!(session.frames[1], capture(2));
    }

    #[test]
    fn test_new_session_is_unselected() {
        let session = CaptureSession::new();
        assert!(session.layout.is_none());
        assert!(!session.is_complete());
        assert_eq!(session.active_filter, "none");
    }

    #[test]
    fn test_session_serializes_for_display() {
        let mut session = CaptureSession::for_layout("Layout A", 6, "sepia".into());
        session.push(capture(1));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["layout"], "Layout A");
        assert_eq!(json["active_filter"], "sepia");
        assert_eq!(json["frames"].as_array().unwrap().len(), 1);
        let back: CaptureSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }
}
