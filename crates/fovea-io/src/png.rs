use std::{fs, fs::File, path::Path};

use fovea_image::{Image, ImageSize};
use png::{BitDepth, ColorType, Decoder, Encoder};

use crate::{
    convert_buf_u16_u8, convert_buf_u8_u16, convert_buf_u8_u16_into_slice, error::IoError,
};

/// Read a PNG image with a single channel (mono8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A grayscale image with a single channel (mono8).
pub fn read_image_png_mono8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let (buf, size) = read_png_impl(file_path)?;
    Ok(Image::new(size.into(), buf)?)
}

/// Read a PNG image with a three channels (rgb8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
pub fn read_image_png_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let (buf, size) = read_png_impl(file_path)?;
    Ok(Image::new(size.into(), buf)?)
}

/// Read a PNG image with a four channels (rgba8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGBA image with four channels (rgba8).
pub fn read_image_png_rgba8(file_path: impl AsRef<Path>) -> Result<Image<u8, 4>, IoError> {
    let (buf, size) = read_png_impl(file_path)?;
    Ok(Image::new(size.into(), buf)?)
}

/// Read a PNG image with a three channels (rgb16).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGB image with three channels (rgb16).
pub fn read_image_png_rgb16(file_path: impl AsRef<Path>) -> Result<Image<u16, 3>, IoError> {
    let (buf, size) = read_png_impl(file_path)?;
    let buf_u16 = convert_buf_u8_u16(buf);

    Ok(Image::new(size.into(), buf_u16)?)
}

/// Read a PNG image with a four channels (rgba16).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGBA image with four channels (rgba16).
pub fn read_image_png_rgba16(file_path: impl AsRef<Path>) -> Result<Image<u16, 4>, IoError> {
    let (buf, size) = read_png_impl(file_path)?;
    let buf_u16 = convert_buf_u8_u16(buf);

    Ok(Image::new(size.into(), buf_u16)?)
}

/// Read a PNG image with a single channel (mono16).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A grayscale image with a single channel (mono16).
pub fn read_image_png_mono16(file_path: impl AsRef<Path>) -> Result<Image<u16, 1>, IoError> {
    let (buf, size) = read_png_impl(file_path)?;
    let buf_u16 = convert_buf_u8_u16(buf);

    Ok(Image::new(size.into(), buf_u16)?)
}

/// Decodes a PNG image with a single channel (mono8) from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the png file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_png_mono8(src: &[u8], dst: &mut Image<u8, 1>) -> Result<(), IoError> {
    decode_png_impl(src, dst)
}

/// Decodes a PNG image with a three channel (rgb8) from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the png file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_png_rgb8(src: &[u8], dst: &mut Image<u8, 3>) -> Result<(), IoError> {
    decode_png_impl(src, dst)
}

/// Decodes a PNG image with a four channel (rgba8) from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the png file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_png_rgba8(src: &[u8], dst: &mut Image<u8, 4>) -> Result<(), IoError> {
    decode_png_impl(src, dst)
}

/// Decodes a PNG (16 bit) image with a single channel (mono16) from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the png file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_png_mono16(src: &[u8], dst: &mut Image<u16, 1>) -> Result<(), IoError> {
    decode_png16_impl(src, dst)
}

/// Decodes a PNG (16 bit) image with a three channel (rgb16) from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the png file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_png_rgb16(src: &[u8], dst: &mut Image<u16, 3>) -> Result<(), IoError> {
    decode_png16_impl(src, dst)
}

/// Decodes a PNG (16 bit) image with a four channel (rgba16) from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the png file
/// - `dst` - A mutable reference to the destination image
pub fn decode_image_png_rgba16(src: &[u8], dst: &mut Image<u16, 4>) -> Result<(), IoError> {
    decode_png16_impl(src, dst)
}

// utility function to read the png file
fn read_png_impl(file_path: impl AsRef<Path>) -> Result<(Vec<u8>, [usize; 2]), IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    if let Some(extension) = file_path.extension() {
        if !extension.eq_ignore_ascii_case("png") {
            return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
        }
    } else {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let file = fs::File::open(file_path)?;
    let mut reader = Decoder::new(file)
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    Ok((buf, [info.width as usize, info.height as usize]))
}

// utility function to decode png files from raw bytes
fn decode_png_impl<const C: usize>(src: &[u8], dst: &mut Image<u8, C>) -> Result<(), IoError> {
    let mut reader = Decoder::new(src)
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let info = reader.info();
    if [info.height as usize, info.width as usize] != [dst.height(), dst.width()] {
        return Err(IoError::DecodeMismatchResolution(
            info.height as usize,
            info.width as usize,
            dst.height(),
            dst.width(),
        ));
    }

    let buf = dst.as_slice_mut();
    if buf.len() != reader.output_buffer_size() {
        return Err(IoError::PngDecodeError(format!(
            "the destination image does not match the encoded color type. \
            Provided {}, required: {}",
            buf.len(),
            reader.output_buffer_size()
        )));
    }

    reader
        .next_frame(buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    Ok(())
}

// 16-bit variant, the frame is decoded big endian and repacked into u16
fn decode_png16_impl<const C: usize>(src: &[u8], dst: &mut Image<u16, C>) -> Result<(), IoError> {
    let mut reader = Decoder::new(src)
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let info = reader.info();
    if [info.height as usize, info.width as usize] != [dst.height(), dst.width()] {
        return Err(IoError::DecodeMismatchResolution(
            info.height as usize,
            info.width as usize,
            dst.height(),
            dst.width(),
        ));
    }

    if dst.as_slice().len() * 2 != reader.output_buffer_size() {
        return Err(IoError::PngDecodeError(format!(
            "the destination image does not match the encoded color type. \
            Provided {}, required: {}",
            dst.as_slice().len() * 2,
            reader.output_buffer_size()
        )));
    }

    let mut buf = vec![0; reader.output_buffer_size()];
    reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    convert_buf_u8_u16_into_slice(&buf, dst.as_slice_mut());

    Ok(())
}

/// Writes the given PNG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Rgb,
    )
}

/// Writes the given PNG _(rgba8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_rgba8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 4>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Rgba,
    )
}

/// Writes the given PNG _(grayscale 8-bit)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Grayscale,
    )
}

/// Writes the given PNG _(rgb16)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_rgb16(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 3>,
) -> Result<(), IoError> {
    let image_size = image.size();
    let image_buf = convert_buf_u16_u8(image.as_slice());

    write_png_impl(
        file_path,
        &image_buf,
        image_size,
        BitDepth::Sixteen,
        ColorType::Rgb,
    )
}

/// Writes the given PNG _(rgba16)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_rgba16(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 4>,
) -> Result<(), IoError> {
    let image_size = image.size();
    let image_buf = convert_buf_u16_u8(image.as_slice());

    write_png_impl(
        file_path,
        &image_buf,
        image_size,
        BitDepth::Sixteen,
        ColorType::Rgba,
    )
}

/// Writes the given PNG _(grayscale 16-bit)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_gray16(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 1>,
) -> Result<(), IoError> {
    let image_size = image.size();
    let image_buf = convert_buf_u16_u8(image.as_slice());

    write_png_impl(
        file_path,
        &image_buf,
        image_size,
        BitDepth::Sixteen,
        ColorType::Grayscale,
    )
}

fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;

    let mut encoder = Encoder::new(file, image_size.width as u32, image_size.height as u32);
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::read;

    fn checkerboard_rgb8(width: usize, height: usize) -> Image<u8, 3> {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        Image::new([width, height].into(), data).unwrap()
    }

    #[test]
    fn read_write_png_rgb8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("board.png");

        let image = checkerboard_rgb8(9, 7);
        write_image_png_rgb8(&file_path, &image)?;
        assert!(file_path.exists(), "File does not exist: {:?}", file_path);

        let image_back = read_image_png_rgb8(&file_path)?;
        assert_eq!(image_back.cols(), 9);
        assert_eq!(image_back.rows(), 7);
        assert_eq!(image_back.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn read_write_png_mono8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("ramp.png");

        let image = Image::<u8, 1>::new([8, 2].into(), (0u8..16).collect())?;
        write_image_png_gray8(&file_path, &image)?;

        let image_back = read_image_png_mono8(&file_path)?;
        assert_eq!(image_back.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn read_write_png_rgb16() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("deep.png");

        let image = Image::<u16, 3>::new(
            [2, 2].into(),
            vec![0, 1, 2, 300, 400, 500, 60000, 61000, 62000, 9, 8, 7],
        )?;
        write_image_png_rgb16(&file_path, &image)?;

        let image_back = read_image_png_rgb16(&file_path)?;
        assert_eq!(image_back.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn read_write_png_mono16() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("depth.png");

        let image = Image::<u16, 1>::new([3, 2].into(), vec![0, 1000, 2000, 3000, 40000, 65535])?;
        write_image_png_gray16(&file_path, &image)?;

        let image_back = read_image_png_mono16(&file_path)?;
        assert_eq!(image_back.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn decode_png_from_bytes() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("board.png");
        let image = checkerboard_rgb8(9, 7);
        write_image_png_rgb8(&file_path, &image)?;

        let bytes = read(&file_path)?;
        let mut image_back: Image<u8, 3> = Image::from_size_val([9, 7].into(), 0)?;
        decode_image_png_rgb8(&bytes, &mut image_back)?;

        assert_eq!(image_back.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn decode_png_rejects_wrong_resolution() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("board.png");
        write_image_png_rgb8(&file_path, &checkerboard_rgb8(9, 7))?;

        let bytes = read(&file_path)?;
        let mut image_back: Image<u8, 3> = Image::from_size_val([4, 4].into(), 0)?;
        let result = decode_image_png_rgb8(&bytes, &mut image_back);
        assert!(matches!(
            result,
            Err(IoError::DecodeMismatchResolution(7, 9, 4, 4))
        ));
        Ok(())
    }

    #[test]
    fn decode_png16_from_bytes() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("depth.png");
        let image = Image::<u16, 1>::new([3, 2].into(), vec![0, 1000, 2000, 3000, 40000, 65535])?;
        write_image_png_gray16(&file_path, &image)?;

        let bytes = read(&file_path)?;
        let mut image_back: Image<u16, 1> = Image::from_size_val([3, 2].into(), 0)?;
        decode_image_png_mono16(&bytes, &mut image_back)?;

        assert_eq!(image_back.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn read_png_wrong_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("board.jpg");
        std::fs::write(&file_path, b"not a png")?;

        let result = read_image_png_rgb8(&file_path);
        assert!(matches!(result, Err(IoError::InvalidFileExtension(_))));
        Ok(())
    }
}
