#![deny(missing_docs)]
//! Image value types and dtypes for the fovea video/image veneer

/// Image representation with compile-time channel count.
pub mod image;

/// Pixel dtype trait and runtime dtype tags.
pub mod dtype;

/// Runtime-typed image variants for the codec boundary.
pub mod dynamic;

/// Error types for the image module.
pub mod error;

pub use crate::dtype::{Dtype, PixelData};
pub use crate::dynamic::DynImage;
pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
