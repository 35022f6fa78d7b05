//! Color neutralization pass.
//!
//! The painter only understands sRGB colors. Before a subtree is painted,
//! every color string in it is rewritten to a hex value: `oklch()`/`oklab()`
//! are converted, other unsupported spaces become `#000000`.

use snapstrip_core::color::{neutralize_css, Neutralized};
use snapstrip_layout::{NodeKind, ViewNode};

/// Rewrite every color of `root` (and its descendants) into a paintable
/// form. Returns the number of substituted values.
pub fn neutralize_tree(root: &mut ViewNode) -> usize {
    let mut substituted = 0;
    let id = root.id.0.clone();
    if let Some(background) = root.background.as_mut() {
        substituted += neutralize_value(&id, "background", background);
    }
    if let NodeKind::Text { color, .. } = &mut root.kind {
        substituted += neutralize_value(&id, "color", color);
    }
    for child in &mut root.children {
        substituted += neutralize_tree(child);
    }
    substituted
}

fn neutralize_value(node: &str, property: &str, value: &mut String) -> usize {
    let outcome = neutralize_css(value);
    if !outcome.was_substituted() {
        return 0;
    }
    match &outcome {
        Neutralized::Converted { from, to } => {
            tracing::debug!(node, property, %from, to = %to, "converted color")
        }
        Neutralized::Coerced { from, to } => {
            tracing::warn!(node, property, %from, to = %to, "unsupported color replaced")
        }
        Neutralized::Kept(_) => {}
    }
    *value = outcome.color().to_string();
    1
}
