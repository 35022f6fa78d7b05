use std::path::PathBuf;

use snapstrip_core::Rect;

use crate::catalog::LayoutRenderer;
use crate::node::{ImageSource, ViewNode};
use crate::templates::photo_slot;

const WIDTH: f64 = 370.0;
const HEIGHT: f64 = 460.0;
const PADDING: f64 = 6.0;

/// A 2x2 grid of photos over a backdrop.
#[derive(Debug, Clone)]
pub struct GridTemplate {
    backdrop: PathBuf,
}

impl GridTemplate {
    pub const BACKDROP: &'static str = "layoutC.png";

    pub fn new(backdrop: impl Into<PathBuf>) -> Self {
        Self {
            backdrop: backdrop.into(),
        }
    }
}

impl LayoutRenderer for GridTemplate {
    fn render(&self, captures: &[String]) -> ViewNode {
        let (cell_w, cell_h) = (WIDTH / 2.0, HEIGHT / 2.0);
        let mut root = ViewNode::container("layout-c", Rect::sized(WIDTH, HEIGHT)).with_child(
            ViewNode::image(
                "backdrop",
                Rect::sized(WIDTH, HEIGHT),
                ImageSource::Asset(self.backdrop.clone()),
            ),
        );
        for i in 0..4 {
            let (col, row) = ((i % 2) as f64, (i / 2) as f64);
            root.add_child(photo_slot(
                i,
                Rect::new(col * cell_w, row * cell_h, cell_w, cell_h),
                PADDING,
                captures.get(i),
            ));
        }
        root
    }

    fn slot_count(&self) -> usize {
        4
    }
}
