//! The off-screen drawing surface a capture is rendered onto.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use snapstrip_core::frame::PixelFormat;
use snapstrip_core::{FrameBuffer, SnapError, SnapResult};
use snapstrip_fx::{apply_chain, FilterChain};

/// Draw `frame` onto a `width`x`height` surface: stretched to the surface,
/// mirrored around the vertical axis when `mirror` is set, then filtered.
pub fn draw_capture(
    frame: &FrameBuffer,
    width: u32,
    height: u32,
    mirror: bool,
    chain: &FilterChain,
) -> SnapResult<FrameBuffer> {
    if frame.is_empty() {
        return Err(SnapError::render("video frame has no pixels"));
    }
    if width == 0 || height == 0 {
        return Err(SnapError::render(format!(
            "capture surface is {}x{}",
            width, height
        )));
    }

    let source = if frame.format == PixelFormat::Rgba8 {
        frame.clone()
    } else {
        frame.clone().into_rgba()
    };
    let mut surface = if (source.width, source.height) == (width, height) {
        source
    } else {
        let img = ImageBuffer::<Rgba<u8>, _>::from_raw(source.width, source.height, source.data)
            .ok_or_else(|| SnapError::render("video frame size does not match its data"))?;
        let resized = imageops::resize(&img, width, height, FilterType::Triangle);
        FrameBuffer::from_rgba(width, height, resized.into_raw())
            .ok_or_else(|| SnapError::render("resized surface has an inconsistent size"))?
    };

    if mirror {
        surface.flip_horizontal();
    }
    apply_chain(&mut surface, chain);
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapstrip_core::Color;

    fn two_tone() -> FrameBuffer {
        let mut fb = FrameBuffer::solid(4, 2, &Color::BLUE);
        for y in 0..2 {
            fb.set_pixel(0, y, [255, 0, 0, 255]);
        }
        fb
    }

    #[test]
    fn test_mirror_moves_left_edge_right() {
        let out = draw_capture(&two_tone(), 4, 2, true, &FilterChain::none()).unwrap();
        assert_eq!(out.get_pixel(3, 0), Some([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_unmirrored_keeps_orientation() {
        let out = draw_capture(&two_tone(), 4, 2, false, &FilterChain::none()).unwrap();
        assert_eq!(out.get_pixel(0, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_surface_is_resized_then_filtered() {
        let chain = snapstrip_fx::parse("grayscale(100%)").unwrap();
        let out = draw_capture(&FrameBuffer::solid(8, 6, &Color::RED), 4, 3, true, &chain).unwrap();
        assert_eq!((out.width, out.height), (4, 3));
        assert_eq!(out.get_pixel(1, 1), Some([54, 54, 54, 255]));
    }

    #[test]
    fn test_empty_frame_is_a_render_failure() {
        let empty = FrameBuffer::new(0, 0, PixelFormat::Rgba8);
        let err = draw_capture(&empty, 4, 3, true, &FilterChain::none()).unwrap_err();
        assert!(matches!(err, SnapError::CaptureRenderFailure(_)));
    }
}
