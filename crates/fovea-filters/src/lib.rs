#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image smoothing module.
pub mod blur;

/// border handling and structuring element enumerations.
pub mod border;

mod buffer;

/// color space conversion module.
pub mod convert;

/// 2-d correlation and edge response module.
pub mod convolve;

/// error types for the crate.
pub mod error;

/// smoothing kernel construction module.
pub mod kernel;

/// grayscale morphology module.
pub mod morphology;

/// filter composition module.
pub mod pipeline;

/// Gaussian pyramid module.
pub mod pyramid;

/// image statistics module.
pub mod stats;

pub use crate::blur::{
    bilateral_filter, bilateral_filter_in_place, blur, blur_in_place, box_blur, box_blur_in_place,
    gaussian_blur, gaussian_blur_in_place, median_blur, median_blur_in_place,
};
pub use crate::border::{BorderMode, MorphShape};
pub use crate::convert::{gray_from_rgb, rgb_from_gray};
pub use crate::convolve::{filter_2d, filter_2d_in_place, laplacian};
pub use crate::error::FilterError;
pub use crate::kernel::gaussian_kernel;
pub use crate::morphology::{dilate, dilate_in_place, erode, erode_in_place};
pub use crate::pipeline::{stages, Pipeline, Stage};
pub use crate::pyramid::{build_pyramid, pyr_down, pyr_up};
pub use crate::stats::{histogram, psnr};
