use fovea_image::Image;

use crate::border::MorphShape;
use crate::buffer::{copy_back, per_channel};
use crate::error::FilterError;

/// Grayscale erosion: each pixel becomes the minimum over the structuring
/// element centered on it.
///
/// # Arguments
///
/// * `src` - The image to erode.
/// * `shape` - The structuring element shape.
/// * `radius` - The element radius; the element spans `2 * radius + 1`
///   pixels per axis.
///
/// # Examples
///
/// ```
/// use fovea_filters::{erode, MorphShape};
/// use fovea_image::Image;
///
/// let img = Image::<u8, 1>::from_size_val([5, 5].into(), 255).unwrap();
/// let out = erode(&img, MorphShape::Rect, 1).unwrap();
/// assert_eq!(out.as_slice(), img.as_slice());
/// ```
pub fn erode<const C: usize>(
    src: &Image<u8, C>,
    shape: MorphShape,
    radius: u8,
) -> Result<Image<u8, C>, FilterError> {
    let mask = shape.mask(radius);
    per_channel(src, |buf| {
        imageproc::morphology::grayscale_erode(buf, &mask)
    })
}

/// In-place variant of [`erode`]: the result lands in `img`'s buffer.
pub fn erode_in_place<const C: usize>(
    img: &mut Image<u8, C>,
    shape: MorphShape,
    radius: u8,
) -> Result<(), FilterError> {
    let result = erode(&*img, shape, radius)?;
    copy_back("erode", img, result);
    Ok(())
}

/// Grayscale dilation: each pixel becomes the maximum over the structuring
/// element centered on it.
///
/// # Arguments
///
/// * `src` - The image to dilate.
/// * `shape` - The structuring element shape.
/// * `radius` - The element radius; the element spans `2 * radius + 1`
///   pixels per axis.
pub fn dilate<const C: usize>(
    src: &Image<u8, C>,
    shape: MorphShape,
    radius: u8,
) -> Result<Image<u8, C>, FilterError> {
    let mask = shape.mask(radius);
    per_channel(src, |buf| {
        imageproc::morphology::grayscale_dilate(buf, &mask)
    })
}

/// In-place variant of [`dilate`]: the result lands in `img`'s buffer.
pub fn dilate_in_place<const C: usize>(
    img: &mut Image<u8, C>,
    shape: MorphShape,
    radius: u8,
) -> Result<(), FilterError> {
    let result = dilate(&*img, shape, radius)?;
    copy_back("dilate", img, result);
    Ok(())
}
