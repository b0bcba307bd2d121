/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open or manipulate the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// An invalid parameter was passed to a codec call.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A string does not name a recognized enum value.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Error to decode the JPEG image.
    #[error("Error with Jpeg decoding. {0}")]
    JpegDecodingError(#[from] zune_jpeg::errors::DecodeErrors),

    /// Error to encode the JPEG image.
    #[error("Error with Jpeg encoding. {0}")]
    JpegEncodingError(#[from] jpeg_encoder::EncodingError),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] fovea_image::ImageError),

    /// Error to decode an image through the generic decoder.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// Error to encode an image through the generic encoder.
    #[error("Failed to encode the image. {0}")]
    ImageEncodeError(image::ImageError),

    /// Error to encode the PNG image.
    #[error("Failed to encode the png image. {0}")]
    PngEncodingError(String),

    /// Error to decode the PNG image.
    #[error("Failed to decode the png image. {0}")]
    PngDecodeError(String),

    /// Error to decode the TIFF image.
    #[error("Failed to decode the tiff image. {0}")]
    TiffDecodingError(#[from] tiff::TiffError),

    /// The decoded image resolution differs from the destination buffer.
    #[error("Decoded image resolution ({0}x{1}) does not match the destination ({2}x{3})")]
    DecodeMismatchResolution(usize, usize, usize, usize),

    /// The pixel layout of the file is not supported by the requested call.
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),
}
