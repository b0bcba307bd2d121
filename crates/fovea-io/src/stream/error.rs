use fovea_image::ImageSize;

/// An error type for the stream module.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    /// A property name outside the recognized enumeration.
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// The native handle refused a property write.
    #[error("Property {property} rejected: {reason}")]
    PropertyRejected {
        /// The property that was being set.
        property: String,
        /// Why the native side refused it.
        reason: String,
    },

    /// The source cannot report a finite frame count.
    #[error("The source does not report a finite frame count")]
    UnknownLength,

    /// A frame with the wrong spatial dimensions was handed to a writer.
    #[error("Frame size {got} does not match the configured {expected}")]
    ShapeMismatch {
        /// The frame size fixed at construction.
        expected: ImageSize,
        /// The size of the offending frame.
        got: ImageSize,
    },

    /// The window is not open.
    #[error("The window is not open")]
    NotOpen,

    /// A string does not name a recognized enum value.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The source path does not exist.
    #[error("Source does not exist: {0}")]
    SourceNotFound(std::path::PathBuf),

    /// An error for an invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An error occurred during checking the image format.
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    /// An error occurred during GStreamer initialization.
    #[error(transparent)]
    GStreamerError(#[from] gstreamer::glib::Error),

    /// An error occurred during GStreamer downcast of pipeline element.
    #[error("Failed to downcast pipeline")]
    DowncastPipelineError(gstreamer::Element),

    /// An error occurred during GStreamer downcast of appsink.
    #[error("Failed to get an element by name")]
    GetElementByNameError,

    /// An error occurred during GStreamer to get the bus.
    #[error("Failed to get the bus")]
    BusError,

    /// An error occurred during GStreamer to set the pipeline state.
    #[error(transparent)]
    SetPipelineStateError(#[from] gstreamer::StateChangeError),

    /// An error occurred during GStreamer to pull sample from appsink.
    #[error(transparent)]
    PullSampleError(#[from] gstreamer::glib::BoolError),

    /// An error occurred during GStreamer to get the caps from the sample.
    #[error("Failed caps: {0}")]
    GetCapsError(String),

    /// An error occurred during GStreamer to get the buffer from the sample.
    #[error("Failed to get the buffer from the sample")]
    GetBufferError,

    /// An error occurred during GStreamer to map the buffer to an image frame.
    #[error(transparent)]
    CreateImageFrameError(#[from] fovea_image::ImageError),

    /// An error occurred during GStreamer to send eos event.
    #[error("Failed to send eos event")]
    SendEosError,

    /// An error occurred during GStreamer to push a buffer.
    #[error(transparent)]
    GstreamerFlowError(#[from] gstreamer::FlowError),

    /// A seek request could not be carried out.
    #[error("Failed to seek the pipeline")]
    SeekError,
}
