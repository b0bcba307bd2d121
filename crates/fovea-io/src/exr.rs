use crate::error::IoError;
use fovea_image::Image;
use image::codecs::openexr::{OpenExrDecoder, OpenExrEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use std::{
    fs::File,
    io::{BufReader, Cursor},
    path::Path,
};

/// Read an EXR image as RGB with single precision floating point values.
///
/// # Arguments
///
/// * `file_path` - The path to the EXR file.
///
/// # Returns
///
/// The Rgbf32 typed image.
pub fn read_image_exr_rgb32f(file_path: impl AsRef<Path>) -> Result<Image<f32, 3>, IoError> {
    let img = read_exr_impl(file_path)?.into_rgb32f();
    let size = [img.width() as usize, img.height() as usize];
    Ok(Image::new(size.into(), img.into_raw())?)
}

/// Read an EXR image as a single channel floating point image.
///
/// Multi channel files are reduced to their first channel, which keeps
/// depth and luminance maps stored as replicated rgb intact.
///
/// # Arguments
///
/// * `file_path` - The path to the EXR file.
///
/// # Returns
///
/// The Grayf32 typed image.
pub fn read_image_exr_mono32f(file_path: impl AsRef<Path>) -> Result<Image<f32, 1>, IoError> {
    let img = read_exr_impl(file_path)?.into_rgb32f();
    let size = [img.width() as usize, img.height() as usize];
    let data = img.into_raw().chunks_exact(3).map(|px| px[0]).collect();
    Ok(Image::new(size.into(), data)?)
}

/// Decodes an EXR image as Rgbf32 from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the exr file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_exr_rgb32f(src: &[u8], dst: &mut Image<f32, 3>) -> Result<(), IoError> {
    let decoder = OpenExrDecoder::new(Cursor::new(src))?;
    let img = DynamicImage::from_decoder(decoder)?.into_rgb32f();

    if [img.height() as usize, img.width() as usize] != [dst.height(), dst.width()] {
        return Err(IoError::DecodeMismatchResolution(
            img.height() as usize,
            img.width() as usize,
            dst.height(),
            dst.width(),
        ));
    }

    dst.as_slice_mut().copy_from_slice(&img.into_raw());
    Ok(())
}

/// Writes the given EXR _(rgbf32)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the EXR image.
/// - `image` - The image containing the EXR image data.
pub fn write_image_exr_rgb32f(
    file_path: impl AsRef<Path>,
    image: &Image<f32, 3>,
) -> Result<(), IoError> {
    write_exr_impl(
        file_path,
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
    )
}

/// Writes the given EXR _(grayf32)_ data to the given file path.
///
/// The encoder only accepts rgb input, so the single channel is
/// replicated across all three.
///
/// # Arguments
///
/// - `file_path` - The path to the EXR image.
/// - `image` - The image containing the EXR image data.
pub fn write_image_exr_mono32f(
    file_path: impl AsRef<Path>,
    image: &Image<f32, 1>,
) -> Result<(), IoError> {
    let mut rgb_data = Vec::with_capacity(image.as_slice().len() * 3);
    for &value in image.as_slice() {
        rgb_data.extend_from_slice(&[value, value, value]);
    }

    write_exr_impl(
        file_path,
        &rgb_data,
        image.width() as u32,
        image.height() as u32,
    )
}

fn read_exr_impl(file_path: impl AsRef<Path>) -> Result<DynamicImage, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if file_path
        .extension()
        .map_or(true, |ext| !ext.eq_ignore_ascii_case("exr"))
    {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let file_reader = BufReader::new(File::open(file_path)?);
    let decoder = OpenExrDecoder::new(file_reader)?;
    Ok(DynamicImage::from_decoder(decoder)?)
}

fn write_exr_impl(
    file_path: impl AsRef<Path>,
    image_data: &[f32],
    width: u32,
    height: u32,
) -> Result<(), IoError> {
    // the encoder wants native endian bytes
    let mut bytes = Vec::with_capacity(image_data.len() * 4);
    for value in image_data {
        bytes.extend_from_slice(&value.to_ne_bytes());
    }

    let file = File::create(file_path)?;
    let encoder = OpenExrEncoder::new(file);
    encoder
        .write_image(&bytes, width, height, ExtendedColorType::Rgb32F)
        .map_err(IoError::ImageEncodeError)?;
    Ok(())
}
