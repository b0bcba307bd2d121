use fovea_image::Image;
use image::imageops::{self, FilterType};

use crate::buffer::per_channel;
use crate::error::FilterError;

/// Downsample an image to the next pyramid level.
///
/// The output is Gaussian-smoothed and has size `((w + 1) / 2, (h + 1) / 2)`.
///
/// # Arguments
///
/// * `src` - The image to downsample.
pub fn pyr_down<const C: usize>(src: &Image<u8, C>) -> Result<Image<u8, C>, FilterError> {
    let dst_width = (src.width() + 1) / 2;
    let dst_height = (src.height() + 1) / 2;
    per_channel(src, |buf| {
        imageops::resize(
            buf,
            dst_width as u32,
            dst_height as u32,
            FilterType::Gaussian,
        )
    })
}

/// Upsample an image to the previous pyramid level.
///
/// The output is Gaussian-interpolated and has size `(w * 2, h * 2)`.
///
/// # Arguments
///
/// * `src` - The image to upsample.
pub fn pyr_up<const C: usize>(src: &Image<u8, C>) -> Result<Image<u8, C>, FilterError> {
    let dst_width = src.width() * 2;
    let dst_height = src.height() * 2;
    per_channel(src, |buf| {
        imageops::resize(
            buf,
            dst_width as u32,
            dst_height as u32,
            FilterType::Gaussian,
        )
    })
}

/// Build a Gaussian pyramid with `levels` reductions of `src`.
///
/// The result holds `levels + 1` images; level 0 is a copy of the input.
///
/// # Arguments
///
/// * `src` - The base image.
/// * `levels` - How many times to halve.
///
/// # Examples
///
/// ```
/// use fovea_filters::build_pyramid;
/// use fovea_image::Image;
///
/// let img = Image::<u8, 1>::from_size_val([8, 8].into(), 50).unwrap();
/// let pyramid = build_pyramid(&img, 2).unwrap();
/// assert_eq!(pyramid.len(), 3);
/// assert_eq!(pyramid[2].size().width, 2);
/// ```
pub fn build_pyramid<const C: usize>(
    src: &Image<u8, C>,
    levels: usize,
) -> Result<Vec<Image<u8, C>>, FilterError> {
    let mut pyramid = Vec::with_capacity(levels + 1);
    pyramid.push(src.clone());
    for _ in 0..levels {
        let next = pyr_down(pyramid.last().unwrap_or(src))?;
        pyramid.push(next);
    }
    Ok(pyramid)
}
