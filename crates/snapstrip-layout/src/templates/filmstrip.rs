use std::path::PathBuf;

use snapstrip_core::Rect;

use crate::catalog::LayoutRenderer;
use crate::node::{ImageSource, ViewNode};
use crate::templates::photo_slot;

const WIDTH: f64 = 320.0;
const HEIGHT: f64 = 800.0;
const SLOT_LEFT: f64 = 28.0;
const SLOT_WIDTH: f64 = 263.0;
const SLOT_HEIGHT: f64 = 175.0;
const SLOT_TOPS: [f64; 4] = [35.0, 225.0, 418.0, 610.0];

/// A vertical filmstrip. The backdrop is painted over the photos; its
/// transparent windows line up with the slots.
#[derive(Debug, Clone)]
pub struct FilmstripTemplate {
    backdrop: PathBuf,
}

impl FilmstripTemplate {
    pub const BACKDROP: &'static str = "image.png";

    pub fn new(backdrop: impl Into<PathBuf>) -> Self {
        Self {
            backdrop: backdrop.into(),
        }
    }
}

impl LayoutRenderer for FilmstripTemplate {
    fn render(&self, captures: &[String]) -> ViewNode {
        let mut root = ViewNode::container("layout-b", Rect::sized(WIDTH, HEIGHT));
        for (i, top) in SLOT_TOPS.iter().enumerate() {
            root.add_child(
                photo_slot(
                    i,
                    Rect::new(SLOT_LEFT, *top, SLOT_WIDTH, SLOT_HEIGHT),
                    0.0,
                    captures.get(i),
                )
                .with_radius(2.0),
            );
        }
        root.with_child(ViewNode::image(
            "backdrop",
            Rect::sized(WIDTH, HEIGHT),
            ImageSource::Asset(self.backdrop.clone()),
        ))
    }

    fn slot_count(&self) -> usize {
        SLOT_TOPS.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backdrop_paints_last() {
        let tree = FilmstripTemplate::new("public/image.png").render(&[]);
        assert_eq!(tree.children.len(), 5);
        assert_eq!(tree.children.last().unwrap().id.0, "backdrop");
    }

    #[test]
    fn test_slot_positions() {
        let tree = FilmstripTemplate::new("public/image.png").render(&[]);
        let tops: Vec<f64> = tree.children[..4].iter().map(|s| s.frame.y).collect();
        assert_eq!(tops, vec![35.0, 225.0, 418.0, 610.0]);
        assert!(tree.children[..4].iter().all(|s| s.frame.x == 28.0
            && s.frame.width == 263.0
            && s.frame.height == 175.0));
    }

    #[test]
    fn test_extra_captures_are_ignored() {
        let captures: Vec<String> = (0..6).map(|i| format!("data:image/png;base64,{}", i)).collect();
        let tree = FilmstripTemplate::new("b.png").render(&captures);
        // four photos plus the backdrop
        assert_eq!(tree.image_sources().len(), 5);
    }
}
