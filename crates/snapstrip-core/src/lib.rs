//! # snapstrip-core
//!
//! Core types and primitives for the snapstrip photo booth.
//! This crate contains the foundational types shared across all snapstrip crates:
//! frame buffers, colors, geometry, content hashes, configuration and the error type.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod math;

pub use color::{Color, CssColor};
pub use config::SnapConfig;
pub use error::{SnapError, SnapResult};
pub use frame::{FrameBuffer, PixelFormat};
pub use math::{Rect, Size2D};
