//! The built-in collage templates.

mod filmstrip;
mod grid;
mod strips;

pub use filmstrip::FilmstripTemplate;
pub use grid::GridTemplate;
pub use strips::StripsTemplate;

use snapstrip_core::Rect;

use crate::node::{ImageSource, ViewNode};

/// A photo slot: a box holding the capture, if there is one, as an
/// object-cover image inset by `padding`. Without a capture it stays an
/// empty placeholder.
pub(crate) fn photo_slot(
    index: usize,
    frame: Rect,
    padding: f64,
    capture: Option<&String>,
) -> ViewNode {
    let mut slot = ViewNode::container(format!("slot-{}", index + 1), frame).with_clip();
    if let Some(src) = capture {
        slot.add_child(ViewNode::image(
            format!("photo-{}", index + 1),
            Rect::sized(frame.width, frame.height).inset(padding),
            ImageSource::parse(src),
        ));
    }
    slot
}
