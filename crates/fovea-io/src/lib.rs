#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// High level image reading and writing across the supported codecs.
pub mod functional;

/// OpenEXR image encoding and decoding.
pub mod exr;

/// JPEG image encoding and decoding.
pub mod jpeg;

/// PNG image encoding and decoding.
pub mod png;

/// TIFF image encoding and decoding.
pub mod tiff;

/// WebP image encoding and decoding.
pub mod webp;

/// Video readers, writers and display windows.
#[cfg(feature = "gstreamer")]
pub mod stream;

mod conv_utils;
pub(crate) use conv_utils::{convert_buf_u16_u8, convert_buf_u8_u16, convert_buf_u8_u16_into_slice};

pub use crate::error::IoError;
pub use crate::functional::{decode_image, read_image, write_image, ColorMode, ImageFormat, ReduceRatio};
