//! # snapstrip-render
//!
//! Rasterizes mounted view subtrees into a single bitmap and saves it.
//!
//! The pipeline: neutralize colors the rasterizer cannot paint, paint the
//! tree (skipping interactive controls), encode to PNG and hand the bytes
//! to a [`FileSaver`].

pub mod export;
pub mod image_loader;
pub mod neutralize;
pub mod rasterizer;
pub mod text;

pub use export::{DirectorySaver, ExportOptions, ExportReport, Exporter, FileSaver};
pub use image_loader::ImageLoader;
pub use neutralize::neutralize_tree;
pub use rasterizer::{exclude_controls, ExclusionPredicate, Rasterizer};
pub use text::TextRenderer;
