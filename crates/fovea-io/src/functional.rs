use std::{io::Cursor, path::Path, str::FromStr};

use fovea_image::{DynImage, Image};
use image::{imageops::FilterType, DynamicImage};

use crate::error::IoError;
use crate::{exr, jpeg, png, tiff, webp};

/// How a decoded image is converted before it is returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Keep the layout and dtype stored in the file.
    Unchanged,
    /// Convert to 8-bit single channel.
    Grayscale,
    /// Convert to 8-bit RGB.
    #[default]
    Color,
}

impl ColorMode {
    /// The canonical name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Unchanged => "unchanged",
            ColorMode::Grayscale => "grayscale",
            ColorMode::Color => "color",
        }
    }
}

impl FromStr for ColorMode {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unchanged" => Ok(ColorMode::Unchanged),
            "grayscale" => Ok(ColorMode::Grayscale),
            "color" => Ok(ColorMode::Color),
            _ => Err(IoError::InvalidValue(format!("unknown color mode: {}", s))),
        }
    }
}

/// Decimation applied while reading, relative to the stored resolution.
///
/// Only meaningful together with [`ColorMode::Grayscale`] or
/// [`ColorMode::Color`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReduceRatio {
    /// Full resolution.
    #[default]
    None,
    /// Half the stored width and height.
    Two,
    /// A quarter of the stored width and height.
    Four,
    /// An eighth of the stored width and height.
    Eight,
}

impl ReduceRatio {
    /// The divisor applied to both image axes.
    pub fn factor(&self) -> u32 {
        match self {
            ReduceRatio::None => 1,
            ReduceRatio::Two => 2,
            ReduceRatio::Four => 4,
            ReduceRatio::Eight => 8,
        }
    }
}

impl FromStr for ReduceRatio {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "1" => Ok(ReduceRatio::None),
            "2" => Ok(ReduceRatio::Two),
            "4" => Ok(ReduceRatio::Four),
            "8" => Ok(ReduceRatio::Eight),
            _ => Err(IoError::InvalidValue(format!(
                "unknown reduce ratio: {}",
                s
            ))),
        }
    }
}

/// The encodings the write side of the codec boundary can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG, lossy, 8-bit.
    Jpeg,
    /// PNG, lossless, 8 or 16-bit.
    Png,
    /// WEBP, lossless, 8-bit.
    Webp,
    /// TIFF, lossless, 8/16-bit integer or 32-bit float.
    Tiff,
    /// OpenEXR, 32-bit float.
    Exr,
}

impl ImageFormat {
    /// Infer the format from a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::Webp),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "exr" => Some(ImageFormat::Exr),
            _ => None,
        }
    }

    /// Infer the format from the extension of `file_path`, ignoring case.
    pub fn from_path(file_path: impl AsRef<Path>) -> Option<Self> {
        file_path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl FromStr for ImageFormat {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageFormat::from_extension(s)
            .ok_or_else(|| IoError::InvalidValue(format!("unknown image format: {}", s)))
    }
}

/// Reads an image from the given file path.
///
/// The file format is guessed from the content, so any format supported by
/// the image crate decodes. The result is normalized to RGB channel order.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
/// * `mode` - The conversion applied to the decoded image.
/// * `reduce` - Optional decimation, requires a concrete `mode`.
///
/// # Returns
///
/// An image containing the decoded data.
///
/// # Example
///
/// ```no_run
/// use fovea_io::functional::{read_image, ColorMode, ReduceRatio};
///
/// let image = read_image("dog.jpeg", ColorMode::Color, ReduceRatio::None).unwrap();
/// assert_eq!(image.num_channels(), 3);
/// ```
pub fn read_image(
    file_path: impl AsRef<Path>,
    mode: ColorMode,
    reduce: ReduceRatio,
) -> Result<DynImage, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let data = std::fs::read(file_path)?;
    decode_image(&data, mode, reduce)
}

/// Decodes an image from raw bytes.
///
/// Behaves like [`read_image`] but takes the encoded file content
/// directly.
///
/// # Arguments
///
/// * `src` - The raw bytes of an encoded image file.
/// * `mode` - The conversion applied to the decoded image.
/// * `reduce` - Optional decimation, requires a concrete `mode`.
pub fn decode_image(src: &[u8], mode: ColorMode, reduce: ReduceRatio) -> Result<DynImage, IoError> {
    if mode == ColorMode::Unchanged && reduce != ReduceRatio::None {
        return Err(IoError::InvalidParameter(
            "reduced decoding requires grayscale or color mode".to_string(),
        ));
    }

    let img = image::ImageReader::new(Cursor::new(src))
        .with_guessed_format()?
        .decode()?;

    let img = match reduce.factor() {
        1 => img,
        factor => {
            let width = (img.width() / factor).max(1);
            let height = (img.height() / factor).max(1);
            img.resize_exact(width, height, FilterType::Triangle)
        }
    };

    match mode {
        ColorMode::Unchanged => from_dynamic(img),
        ColorMode::Grayscale => {
            let buf = img.into_luma8();
            let size = [buf.width() as usize, buf.height() as usize];
            Ok(DynImage::Gray8(Image::new(size.into(), buf.into_raw())?))
        }
        ColorMode::Color => {
            let buf = img.into_rgb8();
            let size = [buf.width() as usize, buf.height() as usize];
            Ok(DynImage::Rgb8(Image::new(size.into(), buf.into_raw())?))
        }
    }
}

fn from_dynamic(img: DynamicImage) -> Result<DynImage, IoError> {
    let size = [img.width() as usize, img.height() as usize];
    let dyn_img = match img {
        DynamicImage::ImageLuma8(buf) => DynImage::Gray8(Image::new(size.into(), buf.into_raw())?),
        DynamicImage::ImageRgb8(buf) => DynImage::Rgb8(Image::new(size.into(), buf.into_raw())?),
        DynamicImage::ImageRgba8(buf) => DynImage::Rgba8(Image::new(size.into(), buf.into_raw())?),
        DynamicImage::ImageLuma16(buf) => {
            DynImage::Gray16(Image::new(size.into(), buf.into_raw())?)
        }
        DynamicImage::ImageRgb16(buf) => DynImage::Rgb16(Image::new(size.into(), buf.into_raw())?),
        DynamicImage::ImageRgba16(buf) => {
            DynImage::Rgba16(Image::new(size.into(), buf.into_raw())?)
        }
        DynamicImage::ImageRgb32F(buf) => {
            DynImage::RgbF32(Image::new(size.into(), buf.into_raw())?)
        }
        other => {
            return Err(IoError::UnsupportedImageFormat(format!(
                "{:?}",
                other.color()
            )))
        }
    };
    Ok(dyn_img)
}

/// Writes an image to the given file path with the requested encoding.
///
/// # Arguments
///
/// * `file_path` - Where the encoded file lands.
/// * `image` - The image to encode.
/// * `format` - The target encoding.
/// * `quality` - Encoding quality in 1..=100, only accepted for
///   [`ImageFormat::Jpeg`] and [`ImageFormat::Webp`].
///
/// # Errors
///
/// Fails with [`IoError::UnsupportedImageFormat`] when the image layout
/// cannot be expressed in the target encoding, and with
/// [`IoError::InvalidParameter`] when `quality` is passed for a format
/// that does not take one.
pub fn write_image(
    file_path: impl AsRef<Path>,
    image: &DynImage,
    format: ImageFormat,
    quality: Option<u8>,
) -> Result<(), IoError> {
    if quality.is_some() && !matches!(format, ImageFormat::Jpeg | ImageFormat::Webp) {
        return Err(IoError::InvalidParameter(format!(
            "quality is not supported for {:?}",
            format
        )));
    }

    match format {
        ImageFormat::Jpeg => {
            let quality = quality.unwrap_or(95);
            match image {
                DynImage::Gray8(img) => jpeg::write_image_jpeg_gray8(file_path, img, quality),
                DynImage::Rgb8(img) => jpeg::write_image_jpeg_rgb8(file_path, img, quality),
                _ => Err(unsupported_layout(image, format)),
            }
        }
        ImageFormat::Png => match image {
            DynImage::Gray8(img) => png::write_image_png_gray8(file_path, img),
            DynImage::Rgb8(img) => png::write_image_png_rgb8(file_path, img),
            DynImage::Rgba8(img) => png::write_image_png_rgba8(file_path, img),
            DynImage::Gray16(img) => png::write_image_png_gray16(file_path, img),
            DynImage::Rgb16(img) => png::write_image_png_rgb16(file_path, img),
            DynImage::Rgba16(img) => png::write_image_png_rgba16(file_path, img),
            _ => Err(unsupported_layout(image, format)),
        },
        ImageFormat::Webp => {
            if quality.is_some() {
                // the backend only ships a lossless encoder
                log::warn!("webp encoding is lossless, the quality value is ignored");
            }
            match image {
                DynImage::Gray8(img) => webp::write_image_webp_gray8(file_path, img),
                DynImage::Rgb8(img) => webp::write_image_webp_rgb8(file_path, img),
                DynImage::Rgba8(img) => webp::write_image_webp_rgba8(file_path, img),
                _ => Err(unsupported_layout(image, format)),
            }
        }
        ImageFormat::Tiff => match image {
            DynImage::Gray8(img) => tiff::write_image_tiff_mono8(file_path, img),
            DynImage::Rgb8(img) => tiff::write_image_tiff_rgb8(file_path, img),
            DynImage::Gray16(img) => tiff::write_image_tiff_mono16(file_path, img),
            DynImage::Rgb16(img) => tiff::write_image_tiff_rgb16(file_path, img),
            DynImage::GrayF32(img) => tiff::write_image_tiff_mono32f(file_path, img),
            DynImage::RgbF32(img) => tiff::write_image_tiff_rgb32f(file_path, img),
            _ => Err(unsupported_layout(image, format)),
        },
        ImageFormat::Exr => match image {
            DynImage::GrayF32(img) => exr::write_image_exr_mono32f(file_path, img),
            DynImage::RgbF32(img) => exr::write_image_exr_rgb32f(file_path, img),
            _ => Err(unsupported_layout(image, format)),
        },
    }
}

fn unsupported_layout(image: &DynImage, format: ImageFormat) -> IoError {
    IoError::UnsupportedImageFormat(format!(
        "{:?} cannot encode a {:?} image with {} channels",
        format,
        image.dtype(),
        image.num_channels()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_rgb8(width: usize, height: usize) -> Image<u8, 3> {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 255 / width) as u8);
                data.push((y * 255 / height) as u8);
                data.push(64);
            }
        }
        Image::new([width, height].into(), data).unwrap()
    }

    #[test]
    fn color_mode_from_str() -> Result<(), IoError> {
        assert_eq!(ColorMode::from_str("unchanged")?, ColorMode::Unchanged);
        assert_eq!(ColorMode::from_str("grayscale")?, ColorMode::Grayscale);
        assert_eq!(ColorMode::from_str("color")?, ColorMode::Color);
        assert!(matches!(
            ColorMode::from_str("bgr"),
            Err(IoError::InvalidValue(_))
        ));
        Ok(())
    }

    #[test]
    fn reduce_ratio_from_str() -> Result<(), IoError> {
        assert_eq!(ReduceRatio::from_str("none")?.factor(), 1);
        assert_eq!(ReduceRatio::from_str("8")?.factor(), 8);
        assert!(matches!(
            ReduceRatio::from_str("3"),
            Err(IoError::InvalidValue(_))
        ));
        Ok(())
    }

    #[test]
    fn image_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("tif"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_extension("bmp"), None);
        assert_eq!(
            ImageFormat::from_path("/tmp/out.webp"),
            Some(ImageFormat::Webp)
        );
    }

    #[test]
    fn read_image_color_and_grayscale() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.png");
        png::write_image_png_rgb8(&file_path, &gradient_rgb8(16, 8))?;

        let color = read_image(&file_path, ColorMode::Color, ReduceRatio::None)?;
        assert_eq!(color.num_channels(), 3);
        assert_eq!(color.size().width, 16);

        let gray = read_image(&file_path, ColorMode::Grayscale, ReduceRatio::None)?;
        assert_eq!(gray.num_channels(), 1);
        assert_eq!(gray.size().height, 8);
        Ok(())
    }

    #[test]
    fn read_image_unchanged_keeps_alpha() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("alpha.png");

        let image = Image::<u8, 4>::from_size_val([4, 4].into(), 200)?;
        png::write_image_png_rgba8(&file_path, &image)?;

        let back = read_image(&file_path, ColorMode::Unchanged, ReduceRatio::None)?;
        assert!(matches!(back, DynImage::Rgba8(_)));
        Ok(())
    }

    #[test]
    fn read_image_reduced() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.png");
        png::write_image_png_rgb8(&file_path, &gradient_rgb8(32, 16))?;

        let reduced = read_image(&file_path, ColorMode::Color, ReduceRatio::Four)?;
        assert_eq!(reduced.size().width, 8);
        assert_eq!(reduced.size().height, 4);
        Ok(())
    }

    #[test]
    fn read_image_reduce_needs_concrete_mode() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.png");
        png::write_image_png_rgb8(&file_path, &gradient_rgb8(8, 8))?;

        let result = read_image(&file_path, ColorMode::Unchanged, ReduceRatio::Two);
        assert!(matches!(result, Err(IoError::InvalidParameter(_))));
        Ok(())
    }

    #[test]
    fn read_image_missing_file() {
        let result = read_image("missing.png", ColorMode::Color, ReduceRatio::None);
        assert!(matches!(result, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn decode_image_from_bytes() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.png");
        let image = gradient_rgb8(16, 8);
        png::write_image_png_rgb8(&file_path, &image)?;

        let bytes = std::fs::read(&file_path)?;
        let decoded = decode_image(&bytes, ColorMode::Color, ReduceRatio::None)?;
        match decoded {
            DynImage::Rgb8(img) => assert_eq!(img.as_slice(), image.as_slice()),
            other => panic!("unexpected layout: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn write_then_read_png_exact() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("out.png");

        let image = DynImage::Rgb8(gradient_rgb8(16, 8));
        write_image(&file_path, &image, ImageFormat::Png, None)?;

        let back = read_image(&file_path, ColorMode::Unchanged, ReduceRatio::None)?;
        assert_eq!(back, image);
        Ok(())
    }

    #[test]
    fn write_quality_rejected_for_lossless_formats() {
        let image = DynImage::Rgb8(gradient_rgb8(4, 4));
        let result = write_image("out.png", &image, ImageFormat::Png, Some(90));
        assert!(matches!(result, Err(IoError::InvalidParameter(_))));
    }

    #[test]
    fn write_rejects_impossible_layout() {
        let image = DynImage::Gray16(Image::<u16, 1>::from_size_val([4, 4].into(), 0).unwrap());
        let result = write_image("out.jpeg", &image, ImageFormat::Jpeg, None);
        assert!(matches!(result, Err(IoError::UnsupportedImageFormat(_))));
    }
}
