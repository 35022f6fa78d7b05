use serde::{Deserialize, Serialize};

use crate::math::Rect;
use crate::Color;

/// Pixel format of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA (4 bytes per pixel).
    Rgba8,
    /// 8-bit RGB (3 bytes per pixel, no alpha).
    Rgb8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// A raster surface: a camera frame, a capture, or a rasterized layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let size = (width as usize) * (height as usize) * format.bytes_per_pixel();
        Self {
            data: vec![0u8; size],
            width,
            height,
            format,
        }
    }

    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let pixel = color.to_rgba8();
        let pixel_count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data,
            width,
            height,
            format: PixelFormat::Rgba8,
        }
    }

    /// Wrap raw RGBA bytes. Returns `None` when the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
            format: PixelFormat::Rgba8,
        })
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * bpp;
        match self.format {
            PixelFormat::Rgba8 => Some([
                self.data[offset],
                self.data[offset + 1],
                self.data[offset + 2],
                self.data[offset + 3],
            ]),
            PixelFormat::Rgb8 => Some([
                self.data[offset],
                self.data[offset + 1],
                self.data[offset + 2],
                255,
            ]),
        }
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * bpp;
        self.data[offset..offset + bpp].copy_from_slice(&rgba[..bpp]);
    }

    /// Convert to RGBA8 (no-op when already RGBA8).
    pub fn into_rgba(self) -> FrameBuffer {
        if self.format == PixelFormat::Rgba8 {
            return self;
        }
        let mut data = Vec::with_capacity(self.pixel_count() * 4);
        for px in self.data.chunks_exact(3) {
            data.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        FrameBuffer {
            data,
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8,
        }
    }

    /// Mirror the buffer around its vertical axis, like a selfie preview.
    pub fn flip_horizontal(&mut self) {
        let bpp = self.format.bytes_per_pixel();
        let stride = self.width as usize * bpp;
        if stride == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(stride) {
            let w = row.len() / bpp;
            for x in 0..w / 2 {
                let (a, b) = (x * bpp, (w - 1 - x) * bpp);
                for c in 0..bpp {
                    row.swap(a + c, b + c);
                }
            }
        }
    }

    /// Copy out the part of this buffer covered by `rect` (clamped to bounds).
    pub fn crop(&self, rect: Rect) -> FrameBuffer {
        let x0 = rect.x.max(0.0).floor() as u32;
        let y0 = rect.y.max(0.0).floor() as u32;
        let x1 = (rect.right().ceil().max(0.0) as u32).min(self.width);
        let y1 = (rect.bottom().ceil().max(0.0) as u32).min(self.height);
        let (w, h) = (x1.saturating_sub(x0), y1.saturating_sub(y0));
        let mut out = FrameBuffer::new(w, h, self.format);
        let bpp = self.format.bytes_per_pixel();
        for row in 0..h {
            let src = (((y0 + row) * self.width + x0) as usize) * bpp;
            let dst = (row * w) as usize * bpp;
            let len = w as usize * bpp;
            out.data[dst..dst + len].copy_from_slice(&self.data[src..src + len]);
        }
        out
    }

    /// Fill `rect` with `color`, alpha-blending over existing content.
    /// Pixels outside a rounded corner of `radius` are left untouched.
    pub fn fill_rect(&mut self, rect: Rect, radius: f64, color: &Color) {
        if self.format != PixelFormat::Rgba8 {
            return;
        }
        let [r, g, b, a] = color.to_rgba8();
        if a == 0 {
            return;
        }
        let x0 = rect.x.max(0.0).round() as u32;
        let y0 = rect.y.max(0.0).round() as u32;
        let x1 = (rect.right().round().max(0.0) as u32).min(self.width);
        let y1 = (rect.bottom().round().max(0.0) as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                if !rect.contains_rounded(x as f64 + 0.5, y as f64 + 0.5, radius) {
                    continue;
                }
                let idx = ((y * self.width + x) * 4) as usize;
                blend_pixel(&mut self.data[idx..idx + 4], [r, g, b, a]);
            }
        }
    }

    /// Alpha-composite `src` on top of `self` at position (dx, dy).
    /// Uses integer math so the inner loop auto-vectorizes.
    pub fn composite_over(&mut self, src: &FrameBuffer, dx: i32, dy: i32) {
        if self.format != PixelFormat::Rgba8 || src.format != PixelFormat::Rgba8 {
            return;
        }

        let dst_width = self.width as i32;
        let dst_height = self.height as i32;

        let mut start_y = 0;
        let mut end_y = src.height as i32;
        let mut start_x = 0;
        let mut end_x = src.width as i32;

        if dy < 0 {
            start_y = -dy;
        }
        if dy + end_y > dst_height {
            end_y = dst_height - dy;
        }
        if dx < 0 {
            start_x = -dx;
        }
        if dx + end_x > dst_width {
            end_x = dst_width - dx;
        }

        if start_x >= end_x || start_y >= end_y {
            return;
        }

        let src_stride = (src.width * 4) as usize;
        let dst_stride = (self.width * 4) as usize;

        for sy in start_y..end_y {
            let dst_y = dy + sy;
            let src_row_start = (sy as usize * src_stride) + (start_x as usize * 4);
            let dst_row_start = (dst_y as usize * dst_stride) + ((dx + start_x) as usize * 4);
            let len = (end_x - start_x) as usize * 4;

            let src_slice = &src.data[src_row_start..src_row_start + len];
            let dst_slice = &mut self.data[dst_row_start..dst_row_start + len];

            for (s, d) in src_slice.chunks_exact(4).zip(dst_slice.chunks_exact_mut(4)) {
                blend_pixel(d, [s[0], s[1], s[2], s[3]]);
            }
        }
    }
}

/// Porter-Duff "over" for a single RGBA8 pixel.
#[inline]
fn blend_pixel(d: &mut [u8], s: [u8; 4]) {
    let sa = s[3] as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        d.copy_from_slice(&s);
        return;
    }

    let da = d[3] as u32;
    let inv_sa = 255 - sa;
    let out_a = sa + ((da * inv_sa) / 255);
    if out_a == 0 {
        return;
    }

    for c in 0..3 {
        let v = (s[c] as u32 * sa * 255 + d[c] as u32 * da * inv_sa) / (out_a * 255);
        d[c] = v as u8;
    }
    d[3] = out_a as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_new() {
        let fb = FrameBuffer::new(320, 240, PixelFormat::Rgba8);
        assert_eq!(fb.width, 320);
        assert_eq!(fb.height, 240);
        assert_eq!(fb.data.len(), 320 * 240 * 4);
        assert_eq!(fb.pixel_count(), 320 * 240);
    }

    #[test]
    fn test_frame_buffer_solid() {
        let fb = FrameBuffer::solid(2, 2, &Color::RED);
        assert_eq!(fb.get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(fb.get_pixel(1, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_from_rgba_rejects_short_buffer() {
        assert!(FrameBuffer::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(FrameBuffer::from_rgba(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn test_frame_buffer_out_of_bounds() {
        let fb = FrameBuffer::new(10, 10, PixelFormat::Rgba8);
        assert_eq!(fb.get_pixel(10, 0), None);
        assert_eq!(fb.get_pixel(0, 10), None);
    }

    #[test]
    fn test_flip_horizontal() {
        let mut fb = FrameBuffer::new(3, 1, PixelFormat::Rgba8);
        fb.set_pixel(0, 0, [255, 0, 0, 255]);
        fb.set_pixel(2, 0, [0, 0, 255, 255]);
        fb.flip_horizontal();
        assert_eq!(fb.get_pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(fb.get_pixel(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(fb.get_pixel(2, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_rgb_to_rgba() {
        let mut fb = FrameBuffer::new(1, 1, PixelFormat::Rgb8);
        fb.set_pixel(0, 0, [10, 20, 30, 0]);
        let rgba = fb.into_rgba();
        assert_eq!(rgba.format, PixelFormat::Rgba8);
        assert_eq!(rgba.get_pixel(0, 0), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let mut fb = FrameBuffer::solid(4, 4, &Color::BLUE);
        fb.set_pixel(3, 3, [255, 0, 0, 255]);
        let out = fb.crop(Rect::new(2.0, 2.0, 10.0, 10.0));
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.get_pixel(1, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_fill_rect_rounded_corner_untouched() {
        let mut fb = FrameBuffer::new(20, 20, PixelFormat::Rgba8);
        fb.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), 8.0, &Color::WHITE);
        assert_eq!(fb.get_pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(fb.get_pixel(10, 10), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_composite_over_opaque() {
        let mut dst = FrameBuffer::solid(4, 4, &Color::BLUE);
        let src = FrameBuffer::solid(2, 2, &Color::RED);
        dst.composite_over(&src, 1, 1);
        assert_eq!(dst.get_pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(dst.get_pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(dst.get_pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_composite_over_transparent() {
        let mut dst = FrameBuffer::solid(4, 4, &Color::WHITE);
        let src = FrameBuffer::new(2, 2, PixelFormat::Rgba8);
        dst.composite_over(&src, 0, 0);
        assert_eq!(dst.get_pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_composite_over_semi_transparent() {
        let mut dst = FrameBuffer::solid(2, 2, &Color::WHITE);
        let mut src = FrameBuffer::new(1, 1, PixelFormat::Rgba8);
        src.set_pixel(0, 0, [255, 0, 0, 128]);

        dst.composite_over(&src, 0, 0);

        let pixel = dst.get_pixel(0, 0).unwrap();
        assert!(pixel[0] > 200);
        assert!(pixel[1] > 50 && pixel[1] < 200);
        assert!(pixel[2] > 50 && pixel[2] < 200);
    }
}
