use crate::error::IoError;
use fovea_image::Image;
use image::codecs::webp::{WebPDecoder, WebPEncoder};
use image::{DynamicImage, ExtendedColorType, ImageDecoder};
use std::{
    fs::File,
    io::{BufReader, Cursor},
    path::Path,
};

/// Read a WEBP image as RGB8.
///
/// # Arguments
///
/// * `file_path` - The path to the WEBP file.
///
/// # Returns
///
/// A RGB8 typed image.
pub fn read_image_webp_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let img = read_webp_impl(file_path)?.into_rgb8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(Image::new(size.into(), img.into_raw())?)
}

/// Read a WEBP image as RGBA8.
///
/// # Arguments
///
/// * `file_path` - The path to the WEBP file.
///
/// # Returns
///
/// A RGBA8 typed image.
pub fn read_image_webp_rgba8(file_path: impl AsRef<Path>) -> Result<Image<u8, 4>, IoError> {
    let img = read_webp_impl(file_path)?.into_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(Image::new(size.into(), img.into_raw())?)
}

/// Read a WEBP image as grayscale (mono8).
///
/// # Arguments
///
/// * `file_path` - The path to the WEBP file.
///
/// # Returns
///
/// A grayscale image with a single channel (mono8).
pub fn read_image_webp_gray8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let img = read_webp_impl(file_path)?.into_luma8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(Image::new(size.into(), img.into_raw())?)
}

/// Decodes a WEBP image as RGB8 from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the webp file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_webp_rgb8(src: &[u8], dst: &mut Image<u8, 3>) -> Result<(), IoError> {
    decode_webp_impl(src, dst, |img| img.into_rgb8().into_raw())
}

/// Decodes a WEBP image as RGBA8 from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the webp file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_webp_rgba8(src: &[u8], dst: &mut Image<u8, 4>) -> Result<(), IoError> {
    decode_webp_impl(src, dst, |img| img.into_rgba8().into_raw())
}

/// Decodes a WEBP image as grayscale (mono8) from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the webp file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_webp_gray8(src: &[u8], dst: &mut Image<u8, 1>) -> Result<(), IoError> {
    decode_webp_impl(src, dst, |img| img.into_luma8().into_raw())
}

/// Writes the given WEBP _(rgb8)_ data to the given file path.
///
/// The image is encoded losslessly.
///
/// # Arguments
///
/// - `file_path` - The path to the WEBP image.
/// - `image` - The image containing the WEBP image data.
pub fn write_image_webp_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    write_webp_impl(
        file_path,
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        ExtendedColorType::Rgb8,
    )
}

/// Writes the given WEBP _(rgba8)_ data to the given file path.
///
/// The image is encoded losslessly.
///
/// # Arguments
///
/// - `file_path` - The path to the WEBP image.
/// - `image` - The image containing the WEBP image data.
pub fn write_image_webp_rgba8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 4>,
) -> Result<(), IoError> {
    write_webp_impl(
        file_path,
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        ExtendedColorType::Rgba8,
    )
}

/// Writes the given WEBP _(grayscale)_ data to the given file path.
///
/// The image is encoded losslessly. The encoder only accepts rgb8 and
/// rgba8 input, so each pixel is replicated across three channels.
///
/// # Arguments
///
/// - `file_path` - The path to the WEBP image.
/// - `image` - The image containing the WEBP image data.
pub fn write_image_webp_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    let mut rgb_data = Vec::with_capacity(image.as_slice().len() * 3);
    for &value in image.as_slice() {
        rgb_data.extend_from_slice(&[value, value, value]);
    }

    write_webp_impl(
        file_path,
        &rgb_data,
        image.width() as u32,
        image.height() as u32,
        ExtendedColorType::Rgb8,
    )
}

// utility function to read the webp file
fn read_webp_impl(file_path: impl AsRef<Path>) -> Result<DynamicImage, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if file_path
        .extension()
        .map_or(true, |ext| !ext.eq_ignore_ascii_case("webp"))
    {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let file_reader = BufReader::new(File::open(file_path)?);
    let decoder = WebPDecoder::new(file_reader)?;
    Ok(DynamicImage::from_decoder(decoder)?)
}

// utility function to decode webp files from raw bytes
fn decode_webp_impl<const C: usize>(
    src: &[u8],
    dst: &mut Image<u8, C>,
    convert: fn(DynamicImage) -> Vec<u8>,
) -> Result<(), IoError> {
    let decoder = WebPDecoder::new(Cursor::new(src))?;

    let (width, height) = decoder.dimensions();
    if [height as usize, width as usize] != [dst.height(), dst.width()] {
        return Err(IoError::DecodeMismatchResolution(
            height as usize,
            width as usize,
            dst.height(),
            dst.width(),
        ));
    }

    let img = DynamicImage::from_decoder(decoder)?;
    dst.as_slice_mut().copy_from_slice(&convert(img));
    Ok(())
}

fn write_webp_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    width: u32,
    height: u32,
    color_type: ExtendedColorType,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;
    let encoder = WebPEncoder::new_lossless(file);
    encoder
        .encode(image_data, width, height, color_type)
        .map_err(IoError::ImageEncodeError)?;
    Ok(())
}
