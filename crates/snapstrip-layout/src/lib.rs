//! # snapstrip-layout
//!
//! The layout catalog. A layout is a fixed collage template: it knows how
//! many captures it needs and arranges an ordered capture sequence into a
//! retained tree of [`ViewNode`]s positioned in CSS pixels. Populated trees
//! are mounted on a [`Stage`], which hands out the [`SubtreeHandle`] the
//! exporter rasterizes.

pub mod catalog;
pub mod node;
pub mod result;
pub mod stage;
pub mod templates;

pub use catalog::{LayoutCatalog, LayoutDescriptor, LayoutRenderer};
pub use node::{ImageSource, NodeId, NodeKind, ObjectFit, TextAlign, ViewNode};
pub use result::{compose_result_view, DOWNLOAD_BUTTON_ID, DOWNLOAD_BUTTON_LABEL};
pub use stage::{Stage, SubtreeHandle};
