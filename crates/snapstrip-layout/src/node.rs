use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use snapstrip_core::Rect;

/// Identifier of a node within a view tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an image node gets its pixels from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    /// An inline `data:` URL, as produced by the capture pipeline.
    DataUrl(String),
    /// A file under the local assets directory.
    Asset(PathBuf),
    /// A cross-origin URL. Never readable by the rasterizer.
    Remote(String),
}

impl ImageSource {
    /// Classify an image reference the way an `<img src>` would be.
    pub fn parse(src: &str) -> Self {
        let trimmed = src.trim();
        let lower = trimmed.get(..8).unwrap_or(trimmed).to_ascii_lowercase();
        if lower.starts_with("data:") {
            ImageSource::DataUrl(trimmed.to_string())
        } else if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
        {
            ImageSource::Remote(trimmed.to_string())
        } else {
            ImageSource::Asset(PathBuf::from(trimmed))
        }
    }
}

/// How an image is fitted into its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectFit {
    /// Scale to fill the frame, cropping the overflow evenly.
    #[default]
    Cover,
    /// Stretch to the frame.
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
}

/// The content of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A box that only paints its background and children.
    Container,
    Image {
        source: ImageSource,
        fit: ObjectFit,
    },
    Text {
        content: String,
        font_size: f64,
        /// CSS color string.
        color: String,
        align: TextAlign,
    },
    /// An interactive button (e.g. the export trigger).
    Button { label: String },
    /// An editable single-line text control.
    TextInput { value: String, placeholder: String },
}

/// A node of a retained view tree. `frame` is relative to the parent's
/// origin; children paint in order, later children on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub frame: Rect,
    /// CSS color string painted under the content.
    pub background: Option<String>,
    pub corner_radius: f64,
    /// Clip children to the (rounded) frame.
    pub clip: bool,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, frame: Rect) -> Self {
        Self {
            id: NodeId::new(id),
            kind,
            frame,
            background: None,
            corner_radius: 0.0,
            clip: false,
            children: Vec::new(),
        }
    }

    pub fn container(id: impl Into<String>, frame: Rect) -> Self {
        Self::new(id, NodeKind::Container, frame)
    }

    /// An object-cover image.
    pub fn image(id: impl Into<String>, frame: Rect, source: ImageSource) -> Self {
        Self::new(
            id,
            NodeKind::Image {
                source,
                fit: ObjectFit::Cover,
            },
            frame,
        )
    }

    pub fn text(
        id: impl Into<String>,
        frame: Rect,
        content: impl Into<String>,
        font_size: f64,
        color: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            NodeKind::Text {
                content: content.into(),
                font_size,
                color: color.into(),
                align: TextAlign::Center,
            },
            frame,
        )
    }

    pub fn button(id: impl Into<String>, frame: Rect, label: impl Into<String>) -> Self {
        Self::new(
            id,
            NodeKind::Button {
                label: label.into(),
            },
            frame,
        )
    }

    pub fn text_input(
        id: impl Into<String>,
        frame: Rect,
        value: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            NodeKind::TextInput {
                value: value.into(),
                placeholder: placeholder.into(),
            },
            frame,
        )
    }

    /// Builder: set the background paint.
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    /// Builder: round the corners.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Builder: clip children to this node.
    pub fn with_clip(mut self) -> Self {
        self.clip = true;
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: ViewNode) {
        self.children.push(child);
    }

    /// Buttons and text inputs: things a user interacts with rather than looks at.
    pub fn is_control(&self) -> bool {
        matches!(self.kind, NodeKind::Button { .. } | NodeKind::TextInput { .. })
    }

    /// Depth-first pre-order visit.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ViewNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn find(&self, id: &str) -> Option<&ViewNode> {
        if self.id.0 == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ViewNode> {
        if self.id.0 == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Image sources in paint order.
    pub fn image_sources(&self) -> Vec<&ImageSource> {
        let mut sources = Vec::new();
        self.walk(&mut |node| {
            if let NodeKind::Image { source, .. } = &node.kind {
                sources.push(source);
            }
        });
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_source_classification() {
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAAA"),
            ImageSource::DataUrl(_)
        ));
        assert!(matches!(
            ImageSource::parse("HTTPS://cdn.example.com/a.png"),
            ImageSource::Remote(_)
        ));
        assert_eq!(
            ImageSource::parse("public/image.png"),
            ImageSource::Asset(PathBuf::from("public/image.png"))
        );
    }

    #[test]
    fn test_builders_and_queries() {
        let tree = ViewNode::container("root", Rect::sized(100.0, 50.0))
            .with_background("#000")
            .with_radius(4.0)
            .with_clip()
            .with_child(ViewNode::image(
                "photo",
                Rect::sized(50.0, 50.0),
                ImageSource::parse("data:image/png;base64,AAAA"),
            ))
            .with_child(ViewNode::button("go", Rect::new(50.0, 0.0, 50.0, 20.0), "Go"));

        assert_eq!(tree.background.as_deref(), Some("#000"));
        assert!(tree.clip);
        assert!(tree.find("go").unwrap().is_control());
        assert!(!tree.find("photo").unwrap().is_control());
        assert!(tree.find("missing").is_none());
        assert_eq!(tree.image_sources().len(), 1);

        let mut count = 0;
        tree.walk(&mut |_| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_tree_serializes() {
        let node = ViewNode::text_input("caption", Rect::sized(250.0, 38.0), "Hi", "Enter caption");
        let json = serde_json::to_string(&node).unwrap();
        let back: ViewNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
