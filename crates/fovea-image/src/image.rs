use crate::dtype::PixelData;
use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use fovea_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width as u32, size.height as u32]
    }
}

/// Represents an image with pixel data.
///
/// The pixel data is stored row-major with interleaved channels, i.e. with
/// shape (H, W, C). Channel order is RGB for color images; grayscale images
/// use `C = 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const C: usize>
where
    T: PixelData,
{
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const C: usize> Image<T, C>
where
    T: PixelData,
{
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an
    /// error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use fovea_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 3],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.width * size.height * C;
        if data.len() != expected {
            return Err(ImageError::InvalidDataLength(data.len(), expected));
        }

        Ok(Self { size, data })
    }

    /// Create a new image filled with a constant value.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `val` - The value assigned to every channel of every pixel.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError> {
        let data = vec![val; size.width * size.height * C];
        Image::new(size, data)
    }

    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// The height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// The number of columns, alias of [`Image::width`].
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// The number of rows, alias of [`Image::height`].
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// The number of channels of the image.
    pub fn num_channels(&self) -> usize {
        C
    }

    /// The runtime dtype tag of the pixel data.
    pub fn dtype(&self) -> crate::Dtype {
        T::DTYPE
    }

    /// The pixel data as a flat slice in (H, W, C) order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The pixel data as a mutable flat slice in (H, W, C) order.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return the pixel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get the value of a single pixel channel.
    ///
    /// # Arguments
    ///
    /// * `x` - The column of the pixel.
    /// * `y` - The row of the pixel.
    /// * `ch` - The channel index.
    ///
    /// # Errors
    ///
    /// Fails if the coordinate or channel index is out of bounds.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<T, ImageError> {
        if x >= self.size.width || y >= self.size.height {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.size.width,
                self.size.height,
            ));
        }
        if ch >= C {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, C));
        }

        Ok(self.data[(y * self.size.width + x) * C + ch])
    }

    /// Apply a function to every pixel channel value, producing a new image.
    pub fn map<U, F>(&self, f: F) -> Result<Image<U, C>, ImageError>
    where
        U: PixelData,
        F: Fn(T) -> U,
    {
        let data = self.data.iter().map(|&x| f(x)).collect();
        Image::new(self.size, data)
    }

    /// Cast the pixel data of the image to a different dtype.
    ///
    /// # Errors
    ///
    /// Fails with [`ImageError::CastError`] when a value is not representable
    /// in the target dtype.
    pub fn cast<U>(&self) -> Result<Image<U, C>, ImageError>
    where
        U: PixelData,
    {
        let data = self
            .data
            .iter()
            .map(|&x| U::from(x).ok_or(ImageError::CastError))
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, data)
    }

    /// Cast the pixel data to a different dtype, scaling every value.
    ///
    /// The value is multiplied by `scale` in f64 before the cast, so
    /// `cast_and_scale::<f32>(1.0 / 255.0)` maps u8 images onto [0, 1].
    pub fn cast_and_scale<U>(&self, scale: f64) -> Result<Image<U, C>, ImageError>
    where
        U: PixelData,
    {
        let data = self
            .data
            .iter()
            .map(|&x| {
                let v = x.to_f64().ok_or(ImageError::CastError)? * scale;
                U::from(v).ok_or(ImageError::CastError)
            })
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, data)
    }

    /// Extract a single channel as a grayscale image.
    ///
    /// # Errors
    ///
    /// Fails if the channel index is out of bounds.
    pub fn channel(&self, channel: usize) -> Result<Image<T, 1>, ImageError> {
        if channel >= C {
            return Err(ImageError::ChannelIndexOutOfBounds(channel, C));
        }

        let data = self
            .data
            .iter()
            .skip(channel)
            .step_by(C)
            .copied()
            .collect();

        Image::new(self.size, data)
    }

    /// Split the image into its channel planes.
    pub fn split_channels(&self) -> Result<Vec<Image<T, 1>>, ImageError> {
        (0..C).map(|ch| self.channel(ch)).collect()
    }

    /// Interleave channel planes back into a multi-channel image.
    ///
    /// # Errors
    ///
    /// Fails if the number of planes is not `C` or the planes disagree on
    /// size.
    pub fn merge_channels(channels: &[Image<T, 1>]) -> Result<Self, ImageError> {
        if channels.len() != C {
            return Err(ImageError::InvalidChannelCount(C, channels.len()));
        }
        let size = channels[0].size();
        for plane in channels.iter().skip(1) {
            if plane.size() != size {
                return Err(ImageError::InvalidImageSize(
                    size.width,
                    size.height,
                    plane.size().width,
                    plane.size().height,
                ));
            }
        }

        let mut data = Vec::with_capacity(size.width * size.height * C);
        for i in 0..size.width * size.height {
            for plane in channels {
                data.push(plane.as_slice()[i]);
            }
        }

        Image::new(size, data)
    }

    /// Apply a function to the whole image value and return its result.
    ///
    /// This is a plain value combinator so conversions can be chained
    /// left to right.
    ///
    /// # Examples
    ///
    /// ```
    /// use fovea_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 1>::from_size_val([4, 4].into(), 7).unwrap();
    /// let doubled = image.then(|img| img.map(|x| x.saturating_mul(2)).unwrap());
    /// assert_eq!(doubled.as_slice()[0], 14);
    /// ```
    pub fn then<U, F>(self, f: F) -> U
    where
        F: FnOnce(Self) -> U,
    {
        f(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dtype;

    #[test]
    fn image_new_validates_length() {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        assert!(Image::<u8, 3>::new(size, vec![0u8; 4 * 3 * 3]).is_ok());
        let err = Image::<u8, 3>::new(size, vec![0u8; 5]);
        assert!(matches!(err, Err(ImageError::InvalidDataLength(5, 36))));
    }

    #[test]
    fn image_accessors() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val([10, 20].into(), 0)?;
        assert_eq!(image.width(), 10);
        assert_eq!(image.cols(), 10);
        assert_eq!(image.height(), 20);
        assert_eq!(image.rows(), 20);
        assert_eq!(image.num_channels(), 3);
        assert_eq!(image.dtype(), Dtype::U8);
        Ok(())
    }

    #[test]
    fn get_pixel_bounds() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            [2, 1].into(),
            vec![1, 2, 3, 4, 5, 6],
        )?;
        assert_eq!(image.get_pixel(1, 0, 2)?, 6);
        assert!(image.get_pixel(2, 0, 0).is_err());
        assert!(image.get_pixel(0, 0, 3).is_err());
        Ok(())
    }

    #[test]
    fn cast_round_trip() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([2, 2].into(), vec![0, 128, 200, 255])?;
        let as_f32 = image.cast::<f32>()?;
        assert_eq!(as_f32.as_slice(), &[0.0, 128.0, 200.0, 255.0]);
        let back = as_f32.cast::<u8>()?;
        assert_eq!(back.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn cast_out_of_range_fails() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new([1, 1].into(), vec![300.0])?;
        assert!(matches!(image.cast::<u8>(), Err(ImageError::CastError)));
        Ok(())
    }

    #[test]
    fn cast_and_scale() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([1, 2].into(), vec![0, 255])?;
        let scaled = image.cast_and_scale::<f32>(1.0 / 255.0)?;
        assert_eq!(scaled.as_slice()[0], 0.0);
        assert!((scaled.as_slice()[1] - 1.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn channel_split_and_merge() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            [2, 1].into(),
            vec![10, 20, 30, 40, 50, 60],
        )?;
        let g = image.channel(1)?;
        assert_eq!(g.as_slice(), &[20, 50]);

        let planes = image.split_channels()?;
        assert_eq!(planes.len(), 3);
        let merged = Image::<u8, 3>::merge_channels(&planes)?;
        assert_eq!(merged.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn merge_channels_rejects_wrong_count() -> Result<(), ImageError> {
        let plane = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let err = Image::<u8, 3>::merge_channels(&[plane.clone(), plane]);
        assert!(matches!(err, Err(ImageError::InvalidChannelCount(3, 2))));
        Ok(())
    }

    #[test]
    fn then_chains_left_to_right() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([2, 2].into(), 3)?;
        let sum: u32 = image
            .then(|img| img.map(|x| x.saturating_add(1)).unwrap())
            .then(|img| img.as_slice().iter().map(|&x| x as u32).sum());
        assert_eq!(sum, 16);
        Ok(())
    }
}
