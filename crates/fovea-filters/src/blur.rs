use fovea_image::Image;

use crate::border::{BorderMode, REPLICATE_ONLY};
use crate::buffer::{copy_back, per_channel};
use crate::error::FilterError;
use crate::kernel::{gaussian_kernel, validate_ksize};

/// Smooth an image with a normalized box (mean) kernel.
///
/// Delegates to the native box filter channel by channel.
///
/// # Arguments
///
/// * `src` - The image to smooth.
/// * `ksize` - The kernel extent as (width, height); both odd and positive.
/// * `border` - The border handling mode.
///
/// # Errors
///
/// Fails with [`FilterError::InvalidParameter`] for even or zero kernel
/// sizes and with [`FilterError::UnsupportedOperation`] for border modes the
/// backend does not execute.
pub fn box_blur<const C: usize>(
    src: &Image<u8, C>,
    ksize: (usize, usize),
    border: BorderMode,
) -> Result<Image<u8, C>, FilterError> {
    validate_ksize("box_blur", ksize)?;
    border.ensure_supported("box_blur", REPLICATE_ONLY)?;

    let x_radius = (ksize.0 / 2) as u32;
    let y_radius = (ksize.1 / 2) as u32;
    per_channel(src, |buf| {
        imageproc::filter::box_filter(buf, x_radius, y_radius)
    })
}

/// In-place variant of [`box_blur`]: the result lands in `img`'s buffer.
pub fn box_blur_in_place<const C: usize>(
    img: &mut Image<u8, C>,
    ksize: (usize, usize),
    border: BorderMode,
) -> Result<(), FilterError> {
    let result = box_blur(&*img, ksize, border)?;
    copy_back("box_blur", img, result);
    Ok(())
}

/// Smooth an image with a normalized mean kernel.
///
/// Alias of [`box_blur`]; both names are in common use.
pub fn blur<const C: usize>(
    src: &Image<u8, C>,
    ksize: (usize, usize),
    border: BorderMode,
) -> Result<Image<u8, C>, FilterError> {
    box_blur(src, ksize, border)
}

/// In-place variant of [`blur`].
pub fn blur_in_place<const C: usize>(
    img: &mut Image<u8, C>,
    ksize: (usize, usize),
    border: BorderMode,
) -> Result<(), FilterError> {
    let result = blur(&*img, ksize, border)?;
    copy_back("blur", img, result);
    Ok(())
}

/// Smooth an image with a Gaussian kernel.
///
/// The 1-D coefficients are built by [`gaussian_kernel`] and executed by the
/// native separable filter channel by channel.
///
/// # Arguments
///
/// * `src` - The image to smooth.
/// * `ksize` - The kernel extent as (width, height); both odd and positive.
/// * `sigma` - The standard deviation per axis; `<= 0` derives it from the
///   kernel size.
/// * `border` - The border handling mode.
pub fn gaussian_blur<const C: usize>(
    src: &Image<u8, C>,
    ksize: (usize, usize),
    sigma: (f64, f64),
    border: BorderMode,
) -> Result<Image<u8, C>, FilterError> {
    validate_ksize("gaussian_blur", ksize)?;
    border.ensure_supported("gaussian_blur", REPLICATE_ONLY)?;

    let kernel_x = gaussian_kernel(ksize.0, sigma.0)?;
    let kernel_y = gaussian_kernel(ksize.1, sigma.1)?;
    per_channel(src, |buf| {
        imageproc::filter::separable_filter(buf, &kernel_x, &kernel_y)
    })
}

/// In-place variant of [`gaussian_blur`].
pub fn gaussian_blur_in_place<const C: usize>(
    img: &mut Image<u8, C>,
    ksize: (usize, usize),
    sigma: (f64, f64),
    border: BorderMode,
) -> Result<(), FilterError> {
    let result = gaussian_blur(&*img, ksize, sigma, border)?;
    copy_back("gaussian_blur", img, result);
    Ok(())
}

/// Smooth an image with a median filter.
///
/// # Arguments
///
/// * `src` - The image to smooth.
/// * `ksize` - The square window extent; odd and at least 3.
pub fn median_blur<const C: usize>(
    src: &Image<u8, C>,
    ksize: usize,
) -> Result<Image<u8, C>, FilterError> {
    if ksize < 3 || ksize % 2 == 0 {
        return Err(FilterError::InvalidParameter(format!(
            "median_blur: kernel size {} must be odd and at least 3",
            ksize
        )));
    }

    let radius = (ksize / 2) as u32;
    per_channel(src, |buf| {
        imageproc::filter::median_filter(buf, radius, radius)
    })
}

/// In-place variant of [`median_blur`].
pub fn median_blur_in_place<const C: usize>(
    img: &mut Image<u8, C>,
    ksize: usize,
) -> Result<(), FilterError> {
    let result = median_blur(&*img, ksize)?;
    copy_back("median_blur", img, result);
    Ok(())
}

/// Smooth an image with an edge-preserving bilateral filter.
///
/// # Arguments
///
/// * `src` - The image to smooth.
/// * `diameter` - The pixel neighborhood diameter; positive.
/// * `sigma_color` - Filter sigma in the color space; positive.
/// * `sigma_space` - Filter sigma in the coordinate space; positive.
/// * `border` - The border handling mode.
pub fn bilateral_filter<const C: usize>(
    src: &Image<u8, C>,
    diameter: u32,
    sigma_color: f64,
    sigma_space: f64,
    border: BorderMode,
) -> Result<Image<u8, C>, FilterError> {
    if diameter == 0 {
        return Err(FilterError::InvalidParameter(
            "bilateral_filter: diameter must be positive".to_string(),
        ));
    }
    if sigma_color <= 0.0 || sigma_space <= 0.0 {
        return Err(FilterError::InvalidParameter(
            "bilateral_filter: sigmas must be positive".to_string(),
        ));
    }
    border.ensure_supported("bilateral_filter", REPLICATE_ONLY)?;

    per_channel(src, |buf| {
        imageproc::filter::bilateral_filter(buf, diameter, sigma_color as f32, sigma_space as f32)
    })
}

/// In-place variant of [`bilateral_filter`].
pub fn bilateral_filter_in_place<const C: usize>(
    img: &mut Image<u8, C>,
    diameter: u32,
    sigma_color: f64,
    sigma_space: f64,
    border: BorderMode,
) -> Result<(), FilterError> {
    let result = bilateral_filter(&*img, diameter, sigma_color, sigma_space, border)?;
    copy_back("bilateral_filter", img, result);
    Ok(())
}
