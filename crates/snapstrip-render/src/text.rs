//! Text rendering module.
//! Uses fontdue for CPU-based font rasterization of single-line labels.
//!
//! No font ships with the crate: one is loaded from the configured path.
//! Without a font, text nodes are skipped and only their boxes are painted.

use std::fmt;
use std::path::Path;

use fontdue::{Font, FontSettings};
use snapstrip_core::frame::FrameBuffer;
use snapstrip_core::{Color, PixelFormat, SnapError, SnapResult};
use snapstrip_layout::TextAlign;

/// Rasterizes text runs into FrameBuffers.
#[derive(Default)]
pub struct TextRenderer {
    font: Option<Font>,
}

impl fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextRenderer")
            .field("font", &self.font.as_ref().and_then(|f| f.name()))
            .finish()
    }
}

impl TextRenderer {
    /// A renderer with no font; every text run is skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a font from a file path.
    pub fn from_path(path: &Path) -> SnapResult<Self> {
        let data = std::fs::read(path).map_err(|e| {
            SnapError::asset(format!("failed to read font file: {}", e), path)
        })?;
        Self::from_bytes(data).map_err(|e| SnapError::asset(e.to_string(), path))
    }

    pub fn from_bytes(data: Vec<u8>) -> SnapResult<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| SnapError::Config(format!("failed to parse font: {}", e)))?;
        Ok(Self { font: Some(font) })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render `text` into a `width`x`height` transparent box, vertically
    /// centered and horizontally placed per `align`. Returns `None` when no
    /// font is loaded or the box is empty.
    pub fn render_in_box(
        &self,
        text: &str,
        font_size: f32,
        color: &Color,
        width: u32,
        height: u32,
        align: TextAlign,
    ) -> Option<FrameBuffer> {
        let font = self.font.as_ref()?;
        if width == 0 || height == 0 {
            return None;
        }
        let mut fb = FrameBuffer::new(width, height, PixelFormat::Rgba8);
        if text.is_empty() {
            return Some(fb);
        }

        let measure = measure_line(font, text, font_size);
        let x_offset = match align {
            TextAlign::Left => 0,
            TextAlign::Center => (width as i32 - measure.width) / 2,
        };
        let y_offset = (height as i32 - (measure.ascent + measure.descent)) / 2;
        render_line_into(
            &mut fb,
            font,
            text,
            font_size,
            color.to_rgba8(),
            x_offset,
            y_offset,
            measure.ascent,
        );
        Some(fb)
    }
}

/// Measurements for a single line of text.
#[derive(Debug, Clone)]
struct LineMeasure {
    /// Total advance width.
    width: i32,
    /// Max ascent (above baseline).
    ascent: i32,
    /// Max descent (below baseline).
    descent: i32,
}

fn measure_line(font: &Font, text: &str, font_size: f32) -> LineMeasure {
    let mut width = 0;
    let mut ascent = 0;
    let mut descent = 0;
    for ch in text.chars() {
        let metrics = font.metrics(ch, font_size);
        ascent = ascent.max(metrics.height as i32 + metrics.ymin);
        descent = descent.max(-metrics.ymin);
        width += metrics.advance_width as i32;
    }
    LineMeasure {
        width,
        ascent,
        descent,
    }
}

#[allow(clippy::too_many_arguments)]
fn render_line_into(
    fb: &mut FrameBuffer,
    font: &Font,
    text: &str,
    font_size: f32,
    color_rgba: [u8; 4],
    x_offset: i32,
    y_offset: i32,
    line_ascent: i32,
) {
    let [r, g, b, a] = color_rgba;
    let mut cursor_x = x_offset;

    for ch in text.chars() {
        let (metrics, bitmap) = font.rasterize(ch, font_size);
        let glyph_x = cursor_x + metrics.xmin;
        let glyph_y = y_offset + line_ascent - (metrics.height as i32 + metrics.ymin);

        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let coverage = bitmap[gy * metrics.width + gx];
                if coverage == 0 {
                    continue;
                }
                let px = glyph_x + gx as i32;
                let py = glyph_y + gy as i32;
                if px >= 0 && px < fb.width as i32 && py >= 0 && py < fb.height as i32 {
                    let alpha = (coverage as f32 / 255.0) * (a as f32 / 255.0);
                    fb.set_pixel(px as u32, py as u32, [r, g, b, (alpha * 255.0) as u8]);
                }
            }
        }

        cursor_x += metrics.advance_width as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_font_skips_text() {
        let renderer = TextRenderer::new();
        assert!(!renderer.has_font());
        assert!(renderer
            .render_in_box("Hello", 10.0, &Color::WHITE, 100, 20, TextAlign::Center)
            .is_none());
    }

    #[test]
    fn test_load_missing_font() {
        let err = TextRenderer::from_path(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, SnapError::Asset { .. }));
    }

    #[test]
    fn test_garbage_font_bytes_rejected() {
        assert!(TextRenderer::from_bytes(vec![0, 1, 2, 3]).is_err());
    }
}
