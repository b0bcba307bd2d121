//! Bridges between [`Image`] values and the native buffer types the pixel
//! libraries operate on.

use fovea_image::{Image, ImageSize};
use image::{GrayImage, RgbImage};

use crate::error::FilterError;

pub(crate) fn gray_to_buffer(img: &Image<u8, 1>) -> Result<GrayImage, FilterError> {
    GrayImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.as_slice().to_vec(),
    )
    .ok_or(FilterError::BufferConversion)
}

pub(crate) fn gray_from_buffer(buf: GrayImage) -> Result<Image<u8, 1>, FilterError> {
    let size = ImageSize {
        width: buf.width() as usize,
        height: buf.height() as usize,
    };
    Ok(Image::new(size, buf.into_raw())?)
}

pub(crate) fn rgb_to_buffer(img: &Image<u8, 3>) -> Result<RgbImage, FilterError> {
    RgbImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.as_slice().to_vec(),
    )
    .ok_or(FilterError::BufferConversion)
}

pub(crate) fn rgb_from_buffer(buf: RgbImage) -> Result<Image<u8, 3>, FilterError> {
    let size = ImageSize {
        width: buf.width() as usize,
        height: buf.height() as usize,
    };
    Ok(Image::new(size, buf.into_raw())?)
}

/// Land `result` in `img`'s existing buffer.
///
/// The backends allocate their outputs, so the in-place entry points compute
/// into a scratch image and copy back; the caller's allocation is preserved.
pub(crate) fn copy_back<const C: usize>(op: &str, img: &mut Image<u8, C>, result: Image<u8, C>) {
    log::warn!(
        "{}: backend cannot write in place, falling back to copy semantics",
        op
    );
    img.as_slice_mut().copy_from_slice(result.as_slice());
}

/// Run a grayscale native operation over every channel plane of `src` and
/// reassemble the result.
pub(crate) fn per_channel<const C: usize, F>(
    src: &Image<u8, C>,
    op: F,
) -> Result<Image<u8, C>, FilterError>
where
    F: Fn(&GrayImage) -> GrayImage,
{
    let planes = src.split_channels()?;
    let mut out = Vec::with_capacity(C);
    for plane in &planes {
        let buf = gray_to_buffer(plane)?;
        out.push(gray_from_buffer(op(&buf))?);
    }
    Ok(Image::merge_channels(&out)?)
}
