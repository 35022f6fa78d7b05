//! CPU rasterizer for view subtrees.
//!
//! Paints a [`ViewNode`] tree into a single RGBA FrameBuffer at a given
//! scale. Frames are CSS pixels; the output is `ceil(size * scale)` device
//! pixels. Nodes matching the exclusion predicate are skipped together with
//! their descendants.

use std::sync::Arc;

use snapstrip_core::color::neutralize_css;
use snapstrip_core::frame::FrameBuffer;
use snapstrip_core::{Color, PixelFormat, Rect, SnapError, SnapResult};
use snapstrip_layout::{NodeKind, TextAlign, ViewNode};

use crate::image_loader::{fit_image, ImageLoader};
use crate::neutralize::neutralize_tree;
use crate::text::TextRenderer;

/// Decides which nodes stay out of the exported bitmap.
pub type ExclusionPredicate = Arc<dyn Fn(&ViewNode) -> bool + Send + Sync>;

/// The default predicate: interactive controls are never exported.
pub fn exclude_controls() -> ExclusionPredicate {
    Arc::new(|node: &ViewNode| node.is_control())
}

const CONTROL_FONT_SIZE: f64 = 14.0;
const CONTROL_PADDING: f64 = 8.0;

#[derive(Debug, Default)]
pub struct Rasterizer {
    loader: ImageLoader,
    text: TextRenderer,
}

impl Rasterizer {
    pub fn new(text: TextRenderer) -> Self {
        Self {
            loader: ImageLoader::new(),
            text,
        }
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Paint `root` over `background` at `scale` device pixels per CSS pixel.
    ///
    /// The root is placed at the origin regardless of its own offset.
    pub fn rasterize(
        &self,
        root: &ViewNode,
        scale: f64,
        background: &str,
        exclude: &dyn Fn(&ViewNode) -> bool,
    ) -> SnapResult<FrameBuffer> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(SnapError::render(format!("invalid export scale {}", scale)));
        }
        let width = (root.frame.width * scale).ceil();
        let height = (root.frame.height * scale).ceil();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(SnapError::render(format!(
                "subtree '{}' has no area ({}x{})",
                root.id, root.frame.width, root.frame.height
            )));
        }

        let mut tree = root.clone();
        tree.frame.x = 0.0;
        tree.frame.y = 0.0;
        let substituted = neutralize_tree(&mut tree);

        let background = neutralize_css(background).color();
        let mut target = FrameBuffer::new(width as u32, height as u32, PixelFormat::Rgba8);
        target.fill_rect(Rect::sized(width, height), 0.0, &background);

        self.paint_node(&tree, &Rect::default(), scale, &mut target, exclude)?;
        tracing::debug!(
            root = %tree.id,
            width = target.width,
            height = target.height,
            substituted,
            "rasterized subtree"
        );
        Ok(target)
    }

    /// Paint `node` inside `parent`, its parent's box in device pixels of
    /// `target`.
    fn paint_node(
        &self,
        node: &ViewNode,
        parent: &Rect,
        scale: f64,
        target: &mut FrameBuffer,
        exclude: &dyn Fn(&ViewNode) -> bool,
    ) -> SnapResult<()> {
        if exclude(node) {
            tracing::trace!(node = %node.id, "excluded from export");
            return Ok(());
        }
        let rect = node.frame.scale(scale).offset(parent);

        if !node.clip {
            return self.paint_content(node, rect, scale, target, exclude);
        }
        let bounds = Rect::sized(target.width as f64, target.height as f64);
        if bounds.intersect(&rect).is_none() {
            return Ok(());
        }

        // Clipped nodes paint into their own layer, which is then masked to
        // the node's rounded box.
        let (ox, oy) = (rect.x.floor(), rect.y.floor());
        let local = Rect::new(rect.x - ox, rect.y - oy, rect.width, rect.height);
        let layer_w = local.right().ceil() as u32;
        let layer_h = local.bottom().ceil() as u32;
        if layer_w == 0 || layer_h == 0 {
            return Ok(());
        }
        let mut layer = FrameBuffer::new(layer_w, layer_h, PixelFormat::Rgba8);
        self.paint_content(node, local, scale, &mut layer, exclude)?;
        mask_rounded(&mut layer, local, node.corner_radius * scale);
        target.composite_over(&layer, ox as i32, oy as i32);
        Ok(())
    }

    fn paint_content(
        &self,
        node: &ViewNode,
        rect: Rect,
        scale: f64,
        target: &mut FrameBuffer,
        exclude: &dyn Fn(&ViewNode) -> bool,
    ) -> SnapResult<()> {
        let radius = node.corner_radius * scale;
        if let Some(background) = &node.background {
            target.fill_rect(rect, radius, &neutralize_css(background).color());
        }

        match &node.kind {
            NodeKind::Container => {}
            NodeKind::Image { source, fit } => {
                if let Some(img) = self.loader.load(source)? {
                    let (x, y) = (rect.x.round(), rect.y.round());
                    let w = (rect.right().round() - x).max(0.0) as u32;
                    let h = (rect.bottom().round() - y).max(0.0) as u32;
                    let mut fitted = fit_image(&img, w, h, *fit);
                    if radius > 0.0 {
                        mask_rounded(&mut fitted, Rect::sized(w as f64, h as f64), radius);
                    }
                    target.composite_over(&fitted, x as i32, y as i32);
                }
            }
            NodeKind::Text {
                content,
                font_size,
                color,
                align,
            } => {
                let color = neutralize_css(color).color();
                self.paint_text(content, font_size * scale, &color, *align, rect, target);
            }
            NodeKind::Button { label } => {
                self.paint_text(
                    label,
                    CONTROL_FONT_SIZE * scale,
                    &Color::WHITE,
                    TextAlign::Center,
                    rect,
                    target,
                );
            }
            NodeKind::TextInput { value, .. } => {
                let pad = CONTROL_PADDING * scale;
                let inner = Rect::new(rect.x + pad, rect.y, (rect.width - 2.0 * pad).max(0.0), rect.height);
                self.paint_text(
                    value.lines().next().unwrap_or_default(),
                    CONTROL_FONT_SIZE * scale,
                    &Color::BLACK,
                    TextAlign::Left,
                    inner,
                    target,
                );
            }
        }

        for child in &node.children {
            self.paint_node(child, &rect, scale, target, exclude)?;
        }
        Ok(())
    }

    fn paint_text(
        &self,
        text: &str,
        font_size: f64,
        color: &Color,
        align: TextAlign,
        rect: Rect,
        target: &mut FrameBuffer,
    ) {
        let (x, y) = (rect.x.round(), rect.y.round());
        let w = (rect.right().round() - x).max(0.0) as u32;
        let h = (rect.bottom().round() - y).max(0.0) as u32;
        if let Some(run) = self.text.render_in_box(text, font_size as f32, color, w, h, align) {
            target.composite_over(&run, x as i32, y as i32);
        }
    }
}

/// Clear every pixel of `fb` that falls outside `rect` rounded by `radius`.
fn mask_rounded(fb: &mut FrameBuffer, rect: Rect, radius: f64) {
    for y in 0..fb.height {
        for x in 0..fb.width {
            if !rect.contains_rounded(x as f64 + 0.5, y as f64 + 0.5, radius) {
                fb.set_pixel(x, y, [0, 0, 0, 0]);
            }
        }
    }
}
