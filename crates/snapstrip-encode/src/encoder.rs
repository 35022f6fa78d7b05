use snapstrip_core::frame::{FrameBuffer, PixelFormat};
use snapstrip_core::{SnapError, SnapResult};

/// Still PNG encoder using the `png` crate.
pub struct PngEncoder;

impl PngEncoder {
    /// Encode a frame buffer as an 8-bit RGBA PNG. RGB buffers are widened
    /// with an opaque alpha channel.
    pub fn encode(frame: &FrameBuffer) -> SnapResult<Vec<u8>> {
        if frame.is_empty() {
            return Err(SnapError::Encode(format!(
                "cannot encode an empty {}x{} frame",
                frame.width, frame.height
            )));
        }

        let widened;
        let frame = if frame.format == PixelFormat::Rgba8 {
            frame
        } else {
            widened = frame.clone().into_rgba();
            &widened
        };

        let mut out = Vec::with_capacity(frame.data.len() / 2);
        {
            let mut encoder = png::Encoder::new(&mut out, frame.width, frame.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| SnapError::Encode(format!("failed to write PNG header: {}", e)))?;
            writer
                .write_image_data(&frame.data)
                .map_err(|e| SnapError::Encode(format!("failed to write PNG data: {}", e)))?;
            writer
                .finish()
                .map_err(|e| SnapError::Encode(format!("failed to finalize PNG: {}", e)))?;
        }

        tracing::debug!(
            width = frame.width,
            height = frame.height,
            bytes = out.len(),
            "encoded PNG"
        );
        Ok(out)
    }
}

/// Decode any image format the `image` crate recognizes into an RGBA buffer.
pub fn decode_image(bytes: &[u8]) -> SnapResult<FrameBuffer> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| SnapError::Encode(format!("failed to decode image: {}", e)))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    FrameBuffer::from_rgba(width, height, img.into_raw())
        .ok_or_else(|| SnapError::Encode("decoded image has an inconsistent size".into()))
}
