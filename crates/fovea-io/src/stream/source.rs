use std::path::{Path, PathBuf};
use std::str::FromStr;

use fovea_image::ImageSize;

use super::error::StreamError;

/// What kind of endpoint a reader pipeline is fed from.
///
/// Finite length queries and seeking only make sense for some of these,
/// so readers branch on the kind at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A local video file.
    File,
    /// A capture device such as a camera.
    Device,
    /// A network stream addressed by URL.
    Url,
}

/// The capture backends a device source can be driven by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureBackend {
    /// Let the pipeline pick whatever source element is available.
    #[default]
    Auto,
    /// Video4Linux2.
    V4l2,
    /// The libcamera stack.
    Libcamera,
}

impl CaptureBackend {
    /// The canonical name of the backend.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureBackend::Auto => "auto",
            CaptureBackend::V4l2 => "v4l2",
            CaptureBackend::Libcamera => "libcamera",
        }
    }
}

impl FromStr for CaptureBackend {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(CaptureBackend::Auto),
            "v4l2" => Ok(CaptureBackend::V4l2),
            "libcamera" => Ok(CaptureBackend::Libcamera),
            _ => Err(StreamError::InvalidValue(format!(
                "unknown capture backend: {}",
                s
            ))),
        }
    }
}

/// Something a reader pipeline can be built over.
///
/// Implementations describe where the frames come from; the reader owns
/// everything downstream of that description.
pub trait VideoSource {
    /// Renders the full pipeline description for this source.
    fn pipeline_description(&self) -> Result<String, StreamError>;

    /// The kind of endpoint this source wraps.
    fn kind(&self) -> SourceKind;
}

// The shared downstream half of every reader pipeline. The color balance
// element carries the picture controls of the properties proxy; frames
// land in the appsink as packed RGB.
fn appsink_tail(live: bool) -> &'static str {
    if live {
        "videoconvert ! videobalance name=balance ! videoconvert ! \
        video/x-raw,format=RGB ! \
        appsink name=sink sync=false max-buffers=1 drop=true"
    } else {
        "videoconvert ! videobalance name=balance ! videoconvert ! \
        video/x-raw,format=RGB ! \
        appsink name=sink sync=false max-buffers=5 drop=false"
    }
}

/// A video file on the local filesystem.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a new file source over the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }

    /// The path this source reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VideoSource for FileSource {
    fn pipeline_description(&self) -> Result<String, StreamError> {
        if !self.path.exists() {
            return Err(StreamError::SourceNotFound(self.path.clone()));
        }

        Ok(format!(
            "filesrc location=\"{}\" ! decodebin ! {}",
            self.path.to_string_lossy(),
            appsink_tail(false)
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::File
    }
}

/// A capture device addressed by index.
pub struct DeviceSource {
    index: u32,
    backend: CaptureBackend,
    size: Option<ImageSize>,
    fps: Option<u32>,
}

impl DeviceSource {
    /// Creates a new device source over the given device index.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            backend: CaptureBackend::Auto,
            size: None,
            fps: None,
        }
    }

    /// Selects the capture backend.
    pub fn with_backend(mut self, backend: CaptureBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Requests a capture resolution from the device.
    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Requests a capture frame rate from the device.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }
}

impl VideoSource for DeviceSource {
    fn pipeline_description(&self) -> Result<String, StreamError> {
        let source = match self.backend {
            CaptureBackend::Auto => "autovideosrc".to_string(),
            CaptureBackend::V4l2 => format!("v4l2src device=/dev/video{}", self.index),
            // libcamera addresses cameras by name, the default camera is used
            CaptureBackend::Libcamera => "libcamerasrc".to_string(),
        };

        let video_resize = if let Some(size) = self.size {
            format!("! video/x-raw,width={},height={} ", size.width, size.height)
        } else {
            "".to_string()
        };

        let video_rate = if let Some(fps) = self.fps {
            format!("! videorate ! video/x-raw,framerate={}/1 ", fps)
        } else {
            "".to_string()
        };

        Ok(format!(
            "{} {}{}! {}",
            source,
            video_resize,
            video_rate,
            appsink_tail(true)
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Device
    }
}

/// A network stream addressed by URL.
pub struct UrlSource {
    url: String,
}

impl UrlSource {
    /// Creates a new source over the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The URL this source reads from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl VideoSource for UrlSource {
    fn pipeline_description(&self) -> Result<String, StreamError> {
        Ok(format!(
            "uridecodebin uri=\"{}\" ! {}",
            self.url,
            appsink_tail(false)
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Url
    }
}
