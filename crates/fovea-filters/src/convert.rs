use fovea_image::Image;
use image::imageops;

use crate::buffer::{gray_from_buffer, gray_to_buffer, rgb_from_buffer, rgb_to_buffer};
use crate::error::FilterError;

/// Convert an RGB image to grayscale with Rec. 709 luma weights.
///
/// # Arguments
///
/// * `src` - The RGB image to convert.
pub fn gray_from_rgb(src: &Image<u8, 3>) -> Result<Image<u8, 1>, FilterError> {
    let buf = rgb_to_buffer(src)?;
    gray_from_buffer(imageops::grayscale(&buf))
}

/// Convert a grayscale image to RGB by replicating the plane.
///
/// # Arguments
///
/// * `src` - The grayscale image to convert.
pub fn rgb_from_gray(src: &Image<u8, 1>) -> Result<Image<u8, 3>, FilterError> {
    let buf = gray_to_buffer(src)?;
    rgb_from_buffer(image::DynamicImage::ImageLuma8(buf).into_rgb8())
}
