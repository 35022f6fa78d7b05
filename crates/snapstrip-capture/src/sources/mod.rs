//! Bundled camera sources. Real device drivers plug in behind the same
//! [`CameraSource`](crate::camera::CameraSource) trait.

mod still;
mod synthetic;

pub use still::StillCamera;
pub use synthetic::{SyntheticBehavior, SyntheticCamera};
