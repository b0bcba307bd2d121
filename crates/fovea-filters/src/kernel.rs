use crate::error::FilterError;

/// Validate a 2-D kernel size: both extents positive and odd.
pub(crate) fn validate_ksize(op: &str, ksize: (usize, usize)) -> Result<(), FilterError> {
    for k in [ksize.0, ksize.1] {
        if k == 0 || k % 2 == 0 {
            return Err(FilterError::InvalidParameter(format!(
                "{}: kernel size {:?} must be positive and odd",
                op, ksize
            )));
        }
    }
    Ok(())
}

/// The sigma the conventional defaulting rule derives from a kernel size.
///
/// Used when the caller passes `sigma <= 0`.
pub(crate) fn sigma_from_ksize(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Build a normalized 1-D Gaussian kernel.
///
/// # Arguments
///
/// * `ksize` - The kernel length; must be positive and odd.
/// * `sigma` - The Gaussian standard deviation; values `<= 0` derive the
///   sigma from `ksize` with the conventional rule
///   `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
///
/// # Returns
///
/// The kernel coefficients, summing to one.
///
/// # Errors
///
/// Fails with [`FilterError::InvalidParameter`] for even or zero sizes.
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> Result<Vec<f32>, FilterError> {
    validate_ksize("gaussian_kernel", (ksize, ksize))?;

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        sigma_from_ksize(ksize)
    };

    let center = (ksize - 1) as f64 / 2.0;
    let mut kernel = Vec::with_capacity(ksize);
    let mut sum = 0.0;
    for i in 0..ksize {
        let x = i as f64 - center;
        let v = (-x * x / (2.0 * sigma * sigma)).exp();
        kernel.push(v);
        sum += v;
    }

    Ok(kernel.into_iter().map(|v| (v / sum) as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gaussian_kernel_is_normalized_and_symmetric() -> Result<(), FilterError> {
        let kernel = gaussian_kernel(5, 1.2)?;
        assert_eq!(kernel.len(), 5);
        let sum: f32 = kernel.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        assert_relative_eq!(kernel[0], kernel[4], epsilon = 1e-6);
        assert_relative_eq!(kernel[1], kernel[3], epsilon = 1e-6);
        assert!(kernel[2] > kernel[1] && kernel[1] > kernel[0]);
        Ok(())
    }

    #[test]
    fn gaussian_kernel_derives_sigma_when_non_positive() -> Result<(), FilterError> {
        let derived = gaussian_kernel(3, 0.0)?;
        let explicit = gaussian_kernel(3, sigma_from_ksize(3))?;
        assert_eq!(derived, explicit);
        Ok(())
    }

    #[test]
    fn gaussian_kernel_rejects_even_size() {
        assert!(gaussian_kernel(4, 1.0).is_err());
        assert!(gaussian_kernel(0, 1.0).is_err());
    }
}
