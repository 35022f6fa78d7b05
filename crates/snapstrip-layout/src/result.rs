use snapstrip_core::Rect;

use crate::catalog::LayoutDescriptor;
use crate::node::ViewNode;
use crate::stage::{Stage, SubtreeHandle};

pub const DOWNLOAD_BUTTON_LABEL: &str = "Download Layout";
pub const DOWNLOAD_BUTTON_ID: &str = "download-layout";

const BUTTON_WIDTH: f64 = 150.0;
const BUTTON_HEIGHT: f64 = 40.0;
const BUTTON_TOP: f64 = 16.0;
// Tailwind green-600.
const BUTTON_BACKGROUND: &str = "oklch(62.7% 0.194 149.214)";

/// Build the result screen (the populated layout with the export trigger
/// beside it) and mount it on `stage`. The returned handle is what the
/// exporter rasterizes.
pub fn compose_result_view(
    layout: &LayoutDescriptor,
    captures: &[String],
    stage: &mut Stage,
) -> SubtreeHandle {
    if captures.len() < layout.required {
        tracing::debug!(
            layout = %layout.id,
            captures = captures.len(),
            required = layout.required,
            "composing with empty slots"
        );
    }
    let populated = layout.render(captures);
    let size = populated.frame.size();

    let button = ViewNode::button(
        DOWNLOAD_BUTTON_ID,
        Rect::new(size.width, BUTTON_TOP, BUTTON_WIDTH, BUTTON_HEIGHT),
        DOWNLOAD_BUTTON_LABEL,
    )
    .with_background(BUTTON_BACKGROUND)
    .with_radius(4.0);

    let root = ViewNode::container(
        "result",
        Rect::sized(
            size.width + BUTTON_WIDTH,
            size.height.max(BUTTON_TOP + BUTTON_HEIGHT),
        ),
    )
    .with_child(populated)
    .with_child(button);

    stage.mount(root)
}
