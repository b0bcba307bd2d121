use fovea_image::Image;
use image::GrayImage;

use crate::buffer::gray_to_buffer;
use crate::error::FilterError;

/// Per-channel intensity histogram with 256 bins.
///
/// # Arguments
///
/// * `src` - The image to analyze.
///
/// # Returns
///
/// One `[u32; 256]` bin table per channel, in channel order.
pub fn histogram<const C: usize>(src: &Image<u8, C>) -> Result<Vec<[u32; 256]>, FilterError> {
    let planes = src.split_channels()?;
    let mut out = Vec::with_capacity(C);
    for plane in &planes {
        let buf = gray_to_buffer(plane)?;
        let hist = imageproc::stats::histogram(&buf);
        let bins = hist
            .channels
            .first()
            .copied()
            .ok_or(FilterError::BufferConversion)?;
        out.push(bins);
    }
    Ok(out)
}

/// Peak signal-to-noise ratio between two images, in decibels.
///
/// All subpixels contribute to the mean squared error. Identical images
/// yield positive infinity.
///
/// # Arguments
///
/// * `original` - The reference image.
/// * `noisy` - The degraded image; must match `original` in size.
///
/// # Errors
///
/// Fails with [`FilterError::InvalidParameter`] when the sizes differ.
pub fn psnr<const C: usize>(
    original: &Image<u8, C>,
    noisy: &Image<u8, C>,
) -> Result<f64, FilterError> {
    if original.size() != noisy.size() {
        return Err(FilterError::InvalidParameter(format!(
            "psnr: image sizes differ ({} vs {})",
            original.size(),
            noisy.size()
        )));
    }

    let a = flat_view(original)?;
    let b = flat_view(noisy)?;
    Ok(imageproc::stats::peak_signal_to_noise_ratio(&a, &b))
}

/// View the interleaved samples of `img` as a single plane of width
/// `w * C` so channel count does not matter to the backend.
fn flat_view<const C: usize>(img: &Image<u8, C>) -> Result<GrayImage, FilterError> {
    GrayImage::from_raw(
        (img.width() * C) as u32,
        img.height() as u32,
        img.as_slice().to_vec(),
    )
    .ok_or(FilterError::BufferConversion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_every_sample() -> Result<(), FilterError> {
        let img = Image::<u8, 1>::new([4, 1].into(), vec![0, 0, 7, 255])?;
        let hist = histogram(&img)?;

        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0][0], 2);
        assert_eq!(hist[0][7], 1);
        assert_eq!(hist[0][255], 1);
        assert_eq!(hist[0].iter().sum::<u32>(), 4);
        Ok(())
    }

    #[test]
    fn histogram_is_per_channel() -> Result<(), FilterError> {
        let img = Image::<u8, 3>::new([1, 2].into(), vec![10, 20, 30, 10, 20, 30])?;
        let hist = histogram(&img)?;

        assert_eq!(hist.len(), 3);
        assert_eq!(hist[0][10], 2);
        assert_eq!(hist[1][20], 2);
        assert_eq!(hist[2][30], 2);
        assert_eq!(hist[1][10], 0);
        Ok(())
    }

    #[test]
    fn psnr_is_infinite_for_identical_images() -> Result<(), FilterError> {
        let img = Image::<u8, 3>::from_size_val([4, 4].into(), 100)?;
        let value = psnr(&img, &img.clone())?;
        assert!(value.is_infinite() && value > 0.0);
        Ok(())
    }

    #[test]
    fn psnr_drops_with_noise() -> Result<(), FilterError> {
        let img = Image::<u8, 1>::from_size_val([8, 8].into(), 100)?;
        let slightly = Image::<u8, 1>::from_size_val([8, 8].into(), 102)?;
        let badly = Image::<u8, 1>::from_size_val([8, 8].into(), 150)?;

        let high = psnr(&img, &slightly)?;
        let low = psnr(&img, &badly)?;
        assert!(high > low);
        assert!(low > 0.0);
        Ok(())
    }

    #[test]
    fn psnr_rejects_size_mismatch() {
        let a = Image::<u8, 1>::from_size_val([4, 4].into(), 0).unwrap();
        let b = Image::<u8, 1>::from_size_val([4, 5].into(), 0).unwrap();
        assert!(matches!(
            psnr(&a, &b),
            Err(FilterError::InvalidParameter(_))
        ));
    }
}
