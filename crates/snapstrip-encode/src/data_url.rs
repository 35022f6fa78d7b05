use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use snapstrip_core::frame::FrameBuffer;
use snapstrip_core::{SnapError, SnapResult};

use crate::encoder::{decode_image, PngEncoder};

pub const PNG_MIME: &str = "image/png";

/// A base64 `data:` URL, the form a capture travels in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    pub fn png(data: Vec<u8>) -> Self {
        Self::new(PNG_MIME, data)
    }

    pub fn is_data_url(s: &str) -> bool {
        s.trim_start()
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
    }
}

impl FromStr for DataUrl {
    type Err = SnapError;

    fn from_str(s: &str) -> SnapResult<Self> {
        let s = s.trim();
        if !DataUrl::is_data_url(s) {
            return Err(SnapError::Encode("not a data URL".into()));
        }
        let (header, payload) = s[5..]
            .split_once(',')
            .ok_or_else(|| SnapError::Encode("data URL has no payload separator".into()))?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim();
        let mime = if mime.is_empty() {
            "text/plain"
        } else {
            mime
        };
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(SnapError::Encode(format!(
                "only base64 data URLs are supported (got '{}')",
                header
            )));
        }

        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| SnapError::Encode(format!("invalid base64 payload: {}", e)))?;
        Ok(DataUrl::new(mime.to_ascii_lowercase(), data))
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

/// Encode `frame` as a `data:image/png;base64,...` URL.
pub fn frame_to_data_url(frame: &FrameBuffer) -> SnapResult<String> {
    Ok(DataUrl::png(PngEncoder::encode(frame)?).to_string())
}

/// Decode an image `data:` URL into an RGBA buffer.
pub fn decode_data_url(url: &str) -> SnapResult<FrameBuffer> {
    let parsed: DataUrl = url.parse()?;
    if !parsed.mime.starts_with("image/") {
        return Err(SnapError::Encode(format!(
            "data URL does not carry an image ({})",
            parsed.mime
        )));
    }
    decode_image(&parsed.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapstrip_core::Color;

    #[test]
    fn test_frame_url_has_png_prefix() {
        let url = frame_to_data_url(&FrameBuffer::solid(2, 2, &Color::BLUE)).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_decode_frame_url() {
        let fb = FrameBuffer::solid(3, 7, &Color::GREEN);
        let url = frame_to_data_url(&fb).unwrap();
        assert_eq!(decode_data_url(&url).unwrap(), fb);
    }

    #[test]
    fn test_parse_header_variants() {
        let url: DataUrl = "DATA:Image/PNG;charset=x;BASE64,AAEC".parse().unwrap();
        assert_eq!(url.mime, "image/png");
        assert_eq!(url.data, vec![0, 1, 2]);
    }

    #[test]
    fn test_rejects_non_data_and_plain_urls() {
        assert!("https://example.com/a.png".parse::<DataUrl>().is_err());
        assert!("data:image/png,raw".parse::<DataUrl>().is_err());
        assert!("data:image/png;base64".parse::<DataUrl>().is_err());
        assert!(decode_data_url("data:text/plain;base64,AAEC").is_err());
    }
}
