/// An error type for filter and pipeline operations.
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    /// Error when a parameter fails validation before dispatch.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error when the backing library cannot perform the requested variant.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Error when pixel data cannot be viewed as a native buffer.
    #[error("Failed to convert pixel data into a native image buffer")]
    BufferConversion,

    /// Error produced by the image value type.
    #[error(transparent)]
    Image(#[from] fovea_image::ImageError),
}
