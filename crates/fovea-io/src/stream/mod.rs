/// A module to handle the display window.
pub mod display;
/// A module to handle the stream errors.
pub mod error;
/// A module to handle the reader and writer properties.
pub mod properties;
/// A module to handle the video reading.
pub mod reader;
/// A module to handle the video sources.
pub mod source;
/// A module to handle the video encoding.
pub mod writer;

pub use crate::stream::display::{AspectMode, VideoWindow, WindowBackend};
pub use crate::stream::error::StreamError;
pub use crate::stream::properties::{
    fps_from_wait_time, wait_time_from_fps, CaptureProperty, WriterProperty,
};
pub use crate::stream::reader::{Frames, ReaderState, Video};
pub use crate::stream::source::{
    CaptureBackend, DeviceSource, FileSource, SourceKind, UrlSource, VideoSource,
};
pub use crate::stream::writer::{FrameFormat, VideoCodec, VideoWriter};
