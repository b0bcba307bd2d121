use crate::error::FilterError;

/// A single pipeline stage: a fallible unary function over `T`.
pub type Stage<T> = Box<dyn Fn(T) -> Result<T, FilterError> + Send + Sync>;

/// An ordered sequence of unary stages applied left to right.
///
/// The pipeline holds no per-invocation state; one instance can process any
/// number of inputs. An empty pipeline returns its input unchanged.
///
/// # Examples
///
/// ```
/// use fovea_filters::{stages, BorderMode, Pipeline};
/// use fovea_image::Image;
///
/// let pipeline = Pipeline::new()
///     .with(stages::box_blur::<3>((3, 3), BorderMode::Replicate).unwrap())
///     .with(|img: Image<u8, 3>| img.map(|v| 255 - v).map_err(Into::into));
///
/// let img = Image::from_size_val([4, 4].into(), 10).unwrap();
/// let out = pipeline.apply(img).unwrap();
/// assert!(out.as_slice().iter().all(|&v| v == 245));
/// ```
pub struct Pipeline<T> {
    stages: Vec<Stage<T>>,
}

impl<T> Pipeline<T> {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage, consuming and returning the pipeline.
    pub fn with<F>(mut self, stage: F) -> Self
    where
        F: Fn(T) -> Result<T, FilterError> + Send + Sync + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append an already boxed stage.
    pub fn push(&mut self, stage: Stage<T>) {
        self.stages.push(stage);
    }

    /// The number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Thread `input` through every stage in order.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; later stages do not run.
    pub fn apply(&self, input: T) -> Result<T, FilterError> {
        self.stages.iter().try_fold(input, |value, stage| stage(value))
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ready-made pipeline stages for the filter functions in this crate.
///
/// Each constructor validates its parameters eagerly so a misconfigured
/// stage fails when the pipeline is built, not on first use.
pub mod stages {
    use fovea_image::Image;

    use super::Stage;
    use crate::border::{BorderMode, MorphShape, REPLICATE_ONLY};
    use crate::error::FilterError;
    use crate::kernel::validate_ksize;

    /// A [`crate::box_blur`] stage.
    pub fn box_blur<const C: usize>(
        ksize: (usize, usize),
        border: BorderMode,
    ) -> Result<Stage<Image<u8, C>>, FilterError> {
        validate_ksize("box_blur", ksize)?;
        border.ensure_supported("box_blur", REPLICATE_ONLY)?;
        Ok(Box::new(move |img| crate::blur::box_blur(&img, ksize, border)))
    }

    /// A [`crate::gaussian_blur`] stage.
    pub fn gaussian_blur<const C: usize>(
        ksize: (usize, usize),
        sigma: (f64, f64),
        border: BorderMode,
    ) -> Result<Stage<Image<u8, C>>, FilterError> {
        validate_ksize("gaussian_blur", ksize)?;
        border.ensure_supported("gaussian_blur", REPLICATE_ONLY)?;
        Ok(Box::new(move |img| {
            crate::blur::gaussian_blur(&img, ksize, sigma, border)
        }))
    }

    /// A [`crate::median_blur`] stage.
    pub fn median_blur<const C: usize>(ksize: usize) -> Result<Stage<Image<u8, C>>, FilterError> {
        if ksize < 3 || ksize % 2 == 0 {
            return Err(FilterError::InvalidParameter(format!(
                "median_blur: kernel size {} must be odd and at least 3",
                ksize
            )));
        }
        Ok(Box::new(move |img| crate::blur::median_blur(&img, ksize)))
    }

    /// A [`crate::filter_2d`] stage; the kernel coefficients are owned by
    /// the stage.
    pub fn filter_2d<const C: usize>(
        kernel: Vec<f32>,
        kernel_size: (usize, usize),
        border: BorderMode,
    ) -> Result<Stage<Image<u8, C>>, FilterError> {
        if kernel.len() != kernel_size.0 * kernel_size.1 {
            return Err(FilterError::InvalidParameter(format!(
                "filter_2d: kernel has {} coefficients, expected {}",
                kernel.len(),
                kernel_size.0 * kernel_size.1
            )));
        }
        border.ensure_supported("filter_2d", REPLICATE_ONLY)?;
        Ok(Box::new(move |img| {
            crate::convolve::filter_2d(&img, &kernel, kernel_size, border)
        }))
    }

    /// An [`crate::erode`] stage.
    pub fn erode<const C: usize>(
        shape: MorphShape,
        radius: u8,
    ) -> Result<Stage<Image<u8, C>>, FilterError> {
        Ok(Box::new(move |img| {
            crate::morphology::erode(&img, shape, radius)
        }))
    }

    /// A [`crate::dilate`] stage.
    pub fn dilate<const C: usize>(
        shape: MorphShape,
        radius: u8,
    ) -> Result<Stage<Image<u8, C>>, FilterError> {
        Ok(Box::new(move |img| {
            crate::morphology::dilate(&img, shape, radius)
        }))
    }
}
