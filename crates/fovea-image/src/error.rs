/// An error type for image construction and conversion.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the pixel data length does not match the image geometry.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when an image does not have the expected size.
    #[error("Invalid image size. Expected {0}x{1}, got {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a channel index is out of bounds.
    #[error("Channel index {0} out of bounds for an image with {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when merging channel planes with the wrong count.
    #[error("Expected {0} channel planes, got {1}")]
    InvalidChannelCount(usize, usize),

    /// Error when a pixel coordinate is out of bounds.
    #[error("Pixel coordinate ({0}, {1}) out of bounds for a {2}x{3} image")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a numeric cast between pixel dtypes fails.
    #[error("Failed to cast pixel value")]
    CastError,
}
