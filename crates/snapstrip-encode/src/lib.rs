//! # snapstrip-encode
//!
//! Encoding module: turns raw FrameBuffers into PNG bytes and `data:` URLs,
//! and decodes them back for compositing.

pub mod data_url;
pub mod encoder;

pub use data_url::{decode_data_url, frame_to_data_url, DataUrl};
pub use encoder::{decode_image, PngEncoder};
