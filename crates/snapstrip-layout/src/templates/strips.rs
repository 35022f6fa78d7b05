use snapstrip_core::Rect;

use crate::catalog::LayoutRenderer;
use crate::node::{NodeKind, ViewNode};
use crate::templates::photo_slot;

const INPUT_WIDTH: f64 = 250.0;
const INPUT_HEIGHT: f64 = 38.0;
const INPUT_GAP: f64 = 24.0;
const STRIP_WIDTH: f64 = 100.0;
const STRIP_HEIGHT: f64 = 300.0;
const STRIP_GAP: f64 = 32.0;
const SLOTS_PER_STRIP: usize = 3;
const CAPTION_HEIGHT: f64 = 20.0;
const CAPTION_FONT_SIZE: f64 = 10.0;

/// Two black photo strips side by side, three photos each with a caption
/// band underneath, below an editable caption field.
#[derive(Debug, Clone)]
pub struct StripsTemplate {
    caption: String,
}

impl StripsTemplate {
    pub const CAPTION_INPUT_ID: &'static str = "caption-input";

    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
        }
    }

    /// Update the caption field and every caption band of a rendered tree.
    pub fn apply_caption(root: &mut ViewNode, caption: &str) {
        let band_text = collapse_whitespace(caption);
        if let Some(input) = root.find_mut(Self::CAPTION_INPUT_ID) {
            if let NodeKind::TextInput { value, .. } = &mut input.kind {
                *value = caption.to_string();
            }
        }
        for strip in 0..2 {
            if let Some(band) = root.find_mut(&caption_text_id(strip)) {
                if let NodeKind::Text { content, .. } = &mut band.kind {
                    content.clone_from(&band_text);
                }
            }
        }
    }

    fn strip(&self, strip: usize, x: f64, captures: &[String]) -> ViewNode {
        let slot_height = (STRIP_HEIGHT - CAPTION_HEIGHT) / SLOTS_PER_STRIP as f64;
        let mut node = ViewNode::container(
            format!("strip-{}", strip + 1),
            Rect::new(x, 0.0, STRIP_WIDTH, STRIP_HEIGHT),
        )
        .with_background("#000")
        .with_radius(4.0)
        .with_clip();

        for row in 0..SLOTS_PER_STRIP {
            let index = strip * SLOTS_PER_STRIP + row;
            node.add_child(photo_slot(
                index,
                Rect::new(0.0, row as f64 * slot_height, STRIP_WIDTH, slot_height),
                0.0,
                captures.get(index),
            ));
        }

        let band = Rect::new(0.0, STRIP_HEIGHT - CAPTION_HEIGHT, STRIP_WIDTH, CAPTION_HEIGHT);
        node.add_child(
            ViewNode::container(format!("caption-band-{}", strip + 1), band)
                .with_background("#000")
                .with_child(ViewNode::text(
                    caption_text_id(strip),
                    Rect::sized(STRIP_WIDTH, CAPTION_HEIGHT),
                    collapse_whitespace(&self.caption),
                    CAPTION_FONT_SIZE,
                    "#fff",
                )),
        );
        node
    }
}

impl LayoutRenderer for StripsTemplate {
    fn render(&self, captures: &[String]) -> ViewNode {
        let row_width = 2.0 * STRIP_WIDTH + STRIP_GAP;
        let row_top = INPUT_HEIGHT + INPUT_GAP;

        let input = ViewNode::text_input(
            Self::CAPTION_INPUT_ID,
            Rect::sized(INPUT_WIDTH, INPUT_HEIGHT),
            self.caption.clone(),
            "Enter caption",
        )
        .with_background("#fff")
        .with_radius(4.0);

        let strips = ViewNode::container(
            "strips",
            Rect::new((INPUT_WIDTH - row_width) / 2.0, row_top, row_width, STRIP_HEIGHT),
        )
        .with_child(self.strip(0, 0.0, captures))
        .with_child(self.strip(1, STRIP_WIDTH + STRIP_GAP, captures));

        ViewNode::container("layout-a", Rect::sized(INPUT_WIDTH, row_top + STRIP_HEIGHT))
            .with_child(input)
            .with_child(strips)
    }

    fn slot_count(&self) -> usize {
        2 * SLOTS_PER_STRIP
    }
}

fn caption_text_id(strip: usize) -> String {
    format!("caption-{}", strip + 1)
}

// Text in a block box collapses runs of whitespace, newlines included.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
