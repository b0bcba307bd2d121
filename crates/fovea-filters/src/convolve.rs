use fovea_image::Image;
use imageproc::definitions::Clamp;

use crate::border::{BorderMode, REPLICATE_ONLY};
use crate::buffer::{copy_back, gray_to_buffer, per_channel};
use crate::error::FilterError;


/// Correlate an image with an arbitrary 2-D kernel.
///
/// Intermediate sums are accumulated as `f32` and clamped back to `u8`.
///
/// # Arguments
///
/// * `src` - The image to filter.
/// * `kernel` - The kernel coefficients in row-major order.
/// * `kernel_size` - The kernel extent as (width, height).
/// * `border` - The border handling mode.
///
/// # Errors
///
/// Fails if the coefficient count does not match `kernel_size` or the border
/// mode is not executed by the backend.
pub fn filter_2d<const C: usize>(
    src: &Image<u8, C>,
    kernel: &[f32],
    kernel_size: (usize, usize),
    border: BorderMode,
) -> Result<Image<u8, C>, FilterError> {
    let (kw, kh) = kernel_size;
    if kw == 0 || kh == 0 {
        return Err(FilterError::InvalidParameter(
            "filter_2d: kernel size must be positive".to_string(),
        ));
    }
    if kernel.len() != kw * kh {
        return Err(FilterError::InvalidParameter(format!(
            "filter_2d: kernel has {} coefficients, expected {}x{} = {}",
            kernel.len(),
            kw,
            kh,
            kw * kh
        )));
    }
    border.ensure_supported("filter_2d", REPLICATE_ONLY)?;

    let kern = imageproc::filter::Kernel::new(kernel, kw as u32, kh as u32);
    per_channel(src, |buf| {
        kern.filter(buf, |channel: &mut u8, acc: f32| {
            *channel = <u8 as Clamp<f32>>::clamp(acc)
        })
    })
}

/// In-place variant of [`filter_2d`]: the result lands in `img`'s buffer.
pub fn filter_2d_in_place<const C: usize>(
    img: &mut Image<u8, C>,
    kernel: &[f32],
    kernel_size: (usize, usize),
    border: BorderMode,
) -> Result<(), FilterError> {
    let result = filter_2d(&*img, kernel, kernel_size, border)?;
    copy_back("filter_2d", img, result);
    Ok(())
}

/// Second-derivative edge response with the 3x3 Laplacian kernel.
///
/// The output is signed; there is no in-place variant because the element
/// type widens to `i16`.
///
/// # Arguments
///
/// * `src` - The image to differentiate.
pub fn laplacian<const C: usize>(src: &Image<u8, C>) -> Result<Image<i16, C>, FilterError> {
    let planes = src.split_channels()?;
    let mut out = vec![0i16; src.width() * src.height() * C];
    for (ch, plane) in planes.iter().enumerate() {
        let buf = gray_to_buffer(plane)?;
        let filtered = imageproc::filter::laplacian_filter(&buf);
        for (i, value) in filtered.into_raw().into_iter().enumerate() {
            out[i * C + ch] = value;
        }
    }
    Ok(Image::new(src.size(), out)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_2d_identity_kernel_copies_input() -> Result<(), FilterError> {
        let data: Vec<u8> = (0..5 * 4 * 3).map(|v| (v * 7 % 251) as u8).collect();
        let img = Image::<u8, 3>::new([5, 4].into(), data)?;

        #[rustfmt::skip]
        let kernel = [
            0.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        let out = filter_2d(&img, &kernel, (3, 3), BorderMode::Replicate)?;
        assert_eq!(out.as_slice(), img.as_slice());
        Ok(())
    }

    #[test]
    fn filter_2d_scaling_kernel_clamps() -> Result<(), FilterError> {
        let img = Image::<u8, 1>::new([3, 1].into(), vec![0, 10, 200])?;
        let out = filter_2d(&img, &[2.0], (1, 1), BorderMode::Replicate)?;
        assert_eq!(out.as_slice(), &[0, 20, 255]);
        Ok(())
    }

    #[test]
    fn filter_2d_rejects_mismatched_coefficients() {
        let img = Image::<u8, 1>::from_size_val([3, 3].into(), 0).unwrap();
        let err = filter_2d(&img, &[1.0; 8], (3, 3), BorderMode::Replicate);
        assert!(matches!(err, Err(FilterError::InvalidParameter(_))));
    }

    #[test]
    fn filter_2d_in_place_matches_pure_and_keeps_buffer() -> Result<(), FilterError> {
        let data: Vec<u8> = (0..6 * 6).map(|v| (v * 11 % 256) as u8).collect();
        let img = Image::<u8, 1>::new([6, 6].into(), data)?;
        let kernel = [0.0, 0.25, 0.0, 0.25, 0.0, 0.25, 0.0, 0.25, 0.0];

        let pure = filter_2d(&img, &kernel, (3, 3), BorderMode::Replicate)?;
        let mut in_place = img.clone();
        let ptr_before = in_place.as_slice().as_ptr();
        filter_2d_in_place(&mut in_place, &kernel, (3, 3), BorderMode::Replicate)?;

        assert_eq!(in_place.as_slice().as_ptr(), ptr_before);
        assert_eq!(in_place.as_slice(), pure.as_slice());
        Ok(())
    }

    #[test]
    fn laplacian_is_zero_on_uniform_image() -> Result<(), FilterError> {
        let img = Image::<u8, 3>::from_size_val([7, 5].into(), 133)?;
        let out = laplacian(&img)?;
        assert_eq!(out.size(), img.size());
        assert!(out.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn laplacian_responds_to_an_impulse() -> Result<(), FilterError> {
        let mut img = Image::<u8, 1>::from_size_val([5, 5].into(), 0)?;
        img.as_slice_mut()[2 * 5 + 2] = 255;
        let out = laplacian(&img)?;

        assert_eq!(out.get_pixel(2, 2, 0)?, -8 * 255);
        assert_eq!(out.get_pixel(1, 2, 0)?, 255);
        assert_eq!(out.get_pixel(3, 3, 0)?, 255);
        assert_eq!(out.get_pixel(0, 2, 0)?, 0);
        Ok(())
    }
}
