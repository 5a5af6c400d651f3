//! Stateless image operations applied to loopback frames before generation.

pub mod affine;
pub mod color_correction;
pub mod noise;
pub mod perspective;
pub(crate) mod raster;

pub use affine::transform_frame;
pub use color_correction::ColorReference;
pub use noise::add_noise;
pub use perspective::{Homography, perspective_warp, unsharp_mask};
pub use raster::gaussian_blur;
