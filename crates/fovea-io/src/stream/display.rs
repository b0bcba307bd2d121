use std::str::FromStr;

use fovea_image::{Image, ImageSize};
use gstreamer::prelude::*;

use super::error::StreamError;

/// How a window relates its own size to the frame size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AspectMode {
    /// The frame stretches with the window.
    Free,
    /// The frame keeps its own ratio inside the window.
    Keep,
    /// A fixed numeric ratio.
    Fixed(f64),
}

impl FromStr for AspectMode {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "freeratio" => Ok(AspectMode::Free),
            "keepratio" => Ok(AspectMode::Keep),
            _ => match s.parse::<f64>() {
                Ok(ratio) if ratio.is_finite() && ratio > 0.0 => Ok(AspectMode::Fixed(ratio)),
                _ => Err(StreamError::InvalidValue(format!(
                    "unknown aspect mode: {}",
                    s
                ))),
            },
        }
    }
}

/// The native sink a window renders through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WindowBackend {
    /// Let the pipeline pick whatever sink is available.
    #[default]
    Auto,
    /// OpenGL rendering.
    Gl,
    /// Plain X11.
    X11,
    /// X11 with XVideo acceleration.
    Xv,
}

impl WindowBackend {
    /// The canonical name of the backend.
    pub fn name(&self) -> &'static str {
        match self {
            WindowBackend::Auto => "auto",
            WindowBackend::Gl => "gl",
            WindowBackend::X11 => "x11",
            WindowBackend::Xv => "xv",
        }
    }

    fn element(&self) -> &'static str {
        match self {
            WindowBackend::Auto => "autovideosink",
            WindowBackend::Gl => "glimagesink",
            WindowBackend::X11 => "ximagesink",
            WindowBackend::Xv => "xvimagesink",
        }
    }
}

impl FromStr for WindowBackend {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(WindowBackend::Auto),
            "gl" => Ok(WindowBackend::Gl),
            "x11" => Ok(WindowBackend::X11),
            "xv" => Ok(WindowBackend::Xv),
            _ => Err(StreamError::InvalidValue(format!(
                "unknown window backend: {}",
                s
            ))),
        }
    }
}

/// A display window fed with RGB frames.
///
/// The window owns at most one native sink at a time and can be opened
/// and closed repeatedly. Every property accessor and every write
/// requires the window to be open. Window properties forward 1:1 to the
/// native sink, a sink without the matching native property rejects the
/// call instead of pretending.
pub struct VideoWindow {
    name: String,
    backend: WindowBackend,
    pipeline: Option<gstreamer::Pipeline>,
    appsrc: Option<gstreamer_app::AppSrc>,
    sink: Option<gstreamer::Element>,
    size: Option<ImageSize>,
}

impl VideoWindow {
    /// Creates a window handle. Nothing is shown until [`open`] is
    /// called.
    ///
    /// [`open`]: VideoWindow::open
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: WindowBackend::Auto,
            pipeline: None,
            appsrc: None,
            sink: None,
            size: None,
        }
    }

    /// Selects the rendering backend. Takes effect on the next open.
    pub fn with_backend(mut self, backend: WindowBackend) -> Self {
        self.backend = backend;
        self
    }

    /// The caller facing name of the window.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the native window is currently open.
    pub fn is_open(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Opens the native window. Redundant calls only log a warning.
    ///
    /// # Errors
    ///
    /// Fails if the sink pipeline cannot be built or started.
    pub fn open(&mut self) -> Result<(), StreamError> {
        if self.is_open() {
            log::warn!("The window {} is already open", self.name);
            return Ok(());
        }

        if !gstreamer::INITIALIZED.load(std::sync::atomic::Ordering::Relaxed) {
            gstreamer::init()?;
        }

        let pipeline_str = format!(
            "appsrc name=src is-live=true format=time ! videoconvert ! {} name=display_sink",
            self.backend.element()
        );

        let pipeline = gstreamer::parse::launch(&pipeline_str)?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(StreamError::DowncastPipelineError)?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or_else(|| StreamError::GetElementByNameError)?
            .dynamic_cast::<gstreamer_app::AppSrc>()
            .map_err(StreamError::DowncastPipelineError)?;

        let sink = pipeline
            .by_name("display_sink")
            .ok_or_else(|| StreamError::GetElementByNameError)?;

        // the source stamps buffers itself, callers push at their own pace
        appsrc.set_property("do-timestamp", true);

        pipeline.set_state(gstreamer::State::Playing)?;

        self.pipeline = Some(pipeline);
        self.appsrc = Some(appsrc);
        self.sink = Some(sink);
        self.size = None;

        Ok(())
    }

    /// Closes the native window. Redundant calls only log a warning.
    ///
    /// # Errors
    ///
    /// Fails if the pipeline refuses to shut down. The handle is
    /// released either way.
    pub fn close(&mut self) -> Result<(), StreamError> {
        let Some(pipeline) = self.pipeline.take() else {
            log::warn!("The window {} is already closed", self.name);
            return Ok(());
        };
        self.appsrc = None;
        self.sink = None;
        self.size = None;

        pipeline.set_state(gstreamer::State::Null)?;
        Ok(())
    }

    /// Pushes one frame to the window and polls the native event loop
    /// once, without blocking.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::NotOpen`] when the window is closed.
    pub fn write(&mut self, img: &Image<u8, 3>) -> Result<(), StreamError> {
        let (Some(pipeline), Some(appsrc)) = (&self.pipeline, &self.appsrc) else {
            return Err(StreamError::NotOpen);
        };

        let size = img.size();
        if self.size != Some(size) {
            let caps = gstreamer::Caps::builder("video/x-raw")
                .field("format", "RGB")
                .field("width", size.width as i32)
                .field("height", size.height as i32)
                .build();
            appsrc.set_caps(Some(&caps));
            self.size = Some(size);
        }

        let buffer = gstreamer::Buffer::from_mut_slice(img.as_slice().to_vec());
        appsrc.push_buffer(buffer)?;

        let bus = pipeline.bus().ok_or(StreamError::BusError)?;
        while let Some(msg) = bus.pop() {
            match msg.view() {
                gstreamer::MessageView::Eos(..) => log::debug!("gstreamer received EOS"),
                gstreamer::MessageView::Error(err) => {
                    log::error!(
                        "Error from {:?}: {} ({:?})",
                        err.src().map(|s| s.path_string()),
                        err.error(),
                        err.debug()
                    );
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn sink(&self) -> Result<&gstreamer::Element, StreamError> {
        self.sink.as_ref().ok_or(StreamError::NotOpen)
    }

    // Properties forward by name onto the native sink. Existence, type
    // and access are checked first, set_property panics otherwise.
    fn checked_pspec(
        sink: &gstreamer::Element,
        name: &str,
        wanted: gstreamer::glib::Type,
        access: gstreamer::glib::ParamFlags,
    ) -> Result<(), StreamError> {
        let Some(pspec) = sink.find_property(name) else {
            return Err(StreamError::PropertyRejected {
                property: name.to_string(),
                reason: "not supported by the native sink".to_string(),
            });
        };
        if pspec.value_type() != wanted {
            return Err(StreamError::PropertyRejected {
                property: name.to_string(),
                reason: "the native property has a different type".to_string(),
            });
        }
        if !pspec.flags().contains(access) {
            return Err(StreamError::PropertyRejected {
                property: name.to_string(),
                reason: if access == gstreamer::glib::ParamFlags::WRITABLE {
                    "the native property cannot be written".to_string()
                } else {
                    "the native property cannot be read".to_string()
                },
            });
        }
        Ok(())
    }

    fn set_sink_bool(&self, name: &str, value: bool) -> Result<(), StreamError> {
        let sink = self.sink()?;
        Self::checked_pspec(
            sink,
            name,
            gstreamer::glib::Type::BOOL,
            gstreamer::glib::ParamFlags::WRITABLE,
        )?;
        sink.set_property(name, value);
        Ok(())
    }

    fn sink_bool(&self, name: &str) -> Result<bool, StreamError> {
        let sink = self.sink()?;
        Self::checked_pspec(
            sink,
            name,
            gstreamer::glib::Type::BOOL,
            gstreamer::glib::ParamFlags::READABLE,
        )?;
        Ok(sink.property::<bool>(name))
    }

    fn set_sink_i32(&self, name: &str, value: i32) -> Result<(), StreamError> {
        let sink = self.sink()?;
        Self::checked_pspec(
            sink,
            name,
            gstreamer::glib::Type::I32,
            gstreamer::glib::ParamFlags::WRITABLE,
        )?;
        sink.set_property(name, value);
        Ok(())
    }

    fn sink_i32(&self, name: &str) -> Result<i32, StreamError> {
        let sink = self.sink()?;
        Self::checked_pspec(
            sink,
            name,
            gstreamer::glib::Type::I32,
            gstreamer::glib::ParamFlags::READABLE,
        )?;
        Ok(sink.property::<i32>(name))
    }

    /// Switches synchronization to the clock on the native sink.
    pub fn set_vsync(&self, enabled: bool) -> Result<(), StreamError> {
        self.set_sink_bool("sync", enabled)
    }

    /// Whether the native sink synchronizes to the clock.
    pub fn vsync(&self) -> Result<bool, StreamError> {
        self.sink_bool("sync")
    }

    /// Switches the native window in and out of fullscreen.
    pub fn set_fullscreen(&self, enabled: bool) -> Result<(), StreamError> {
        self.set_sink_bool("fullscreen", enabled)
    }

    /// Whether the native window is fullscreen.
    pub fn fullscreen(&self) -> Result<bool, StreamError> {
        self.sink_bool("fullscreen")
    }

    /// Shows or hides the native window.
    pub fn set_visible(&self, visible: bool) -> Result<(), StreamError> {
        self.set_sink_bool("visible", visible)
    }

    /// Whether the native window is visible.
    pub fn visible(&self) -> Result<bool, StreamError> {
        self.sink_bool("visible")
    }

    /// Keeps the native window above the others.
    pub fn set_topmost(&self, topmost: bool) -> Result<(), StreamError> {
        self.set_sink_bool("topmost", topmost)
    }

    /// Whether the native window stays above the others.
    pub fn topmost(&self) -> Result<bool, StreamError> {
        self.sink_bool("topmost")
    }

    /// Lets the native window resize itself to the frames.
    pub fn set_auto_size(&self, enabled: bool) -> Result<(), StreamError> {
        self.set_sink_bool("auto-size", enabled)
    }

    /// Whether the native window resizes itself to the frames.
    pub fn auto_size(&self) -> Result<bool, StreamError> {
        self.sink_bool("auto-size")
    }

    /// Sets how the frame ratio follows the window.
    ///
    /// # Errors
    ///
    /// The native sinks only keep or free the frame ratio, a fixed
    /// numeric ratio is rejected.
    pub fn set_aspect_mode(&self, mode: AspectMode) -> Result<(), StreamError> {
        match mode {
            AspectMode::Free => self.set_sink_bool("force-aspect-ratio", false),
            AspectMode::Keep => self.set_sink_bool("force-aspect-ratio", true),
            AspectMode::Fixed(_) => Err(StreamError::PropertyRejected {
                property: "aspect_ratio".to_string(),
                reason: "the native sink only keeps or frees the frame ratio".to_string(),
            }),
        }
    }

    /// How the frame ratio follows the window.
    pub fn aspect_mode(&self) -> Result<AspectMode, StreamError> {
        if self.sink_bool("force-aspect-ratio")? {
            Ok(AspectMode::Keep)
        } else {
            Ok(AspectMode::Free)
        }
    }

    /// Resizes the native window.
    pub fn set_size(&self, size: ImageSize) -> Result<(), StreamError> {
        self.set_sink_i32("window-width", size.width as i32)?;
        self.set_sink_i32("window-height", size.height as i32)
    }

    /// The native window size, falling back to the negotiated frame size
    /// when the sink does not report one.
    pub fn size(&self) -> Result<ImageSize, StreamError> {
        if !self.is_open() {
            return Err(StreamError::NotOpen);
        }
        match (self.sink_i32("window-width"), self.sink_i32("window-height")) {
            (Ok(width), Ok(height)) if width > 0 && height > 0 => Ok(ImageSize {
                width: width as usize,
                height: height as usize,
            }),
            _ => self.size.ok_or_else(|| StreamError::PropertyRejected {
                property: "size".to_string(),
                reason: "the native sink does not report its size".to_string(),
            }),
        }
    }

    /// Whether frames are rendered through OpenGL.
    pub fn opengl(&self) -> Result<bool, StreamError> {
        if !self.is_open() {
            return Err(StreamError::NotOpen);
        }
        Ok(self.backend == WindowBackend::Gl)
    }

    /// Requests OpenGL rendering.
    ///
    /// # Errors
    ///
    /// The backend is fixed per window, asking for anything other than
    /// the current one is rejected.
    pub fn set_opengl(&self, enabled: bool) -> Result<(), StreamError> {
        if enabled == self.opengl()? {
            return Ok(());
        }
        Err(StreamError::PropertyRejected {
            property: "opengl".to_string(),
            reason: "the backend is chosen when the window is constructed".to_string(),
        })
    }
}

impl Drop for VideoWindow {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                log::error!("Failed to close the window {}: {}", self.name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_mode_from_str() -> Result<(), StreamError> {
        assert_eq!(AspectMode::from_str("freeratio")?, AspectMode::Free);
        assert_eq!(AspectMode::from_str("keepratio")?, AspectMode::Keep);
        assert_eq!(AspectMode::from_str("1.5")?, AspectMode::Fixed(1.5));
        assert!(matches!(
            AspectMode::from_str("wide"),
            Err(StreamError::InvalidValue(_))
        ));
        assert!(matches!(
            AspectMode::from_str("-2.0"),
            Err(StreamError::InvalidValue(_))
        ));
        Ok(())
    }

    #[test]
    fn window_backend_from_str() -> Result<(), StreamError> {
        assert_eq!(WindowBackend::from_str("auto")?, WindowBackend::Auto);
        assert_eq!(WindowBackend::from_str("gl")?, WindowBackend::Gl);
        assert!(matches!(
            WindowBackend::from_str("wayland"),
            Err(StreamError::InvalidValue(_))
        ));
        Ok(())
    }

    #[test]
    fn closed_window_rejects_everything() -> Result<(), Box<dyn std::error::Error>> {
        let mut window = VideoWindow::new("preview");
        assert!(!window.is_open());

        let img = Image::<u8, 3>::from_size_val([4, 2].into(), 0)?;
        assert!(matches!(window.write(&img), Err(StreamError::NotOpen)));
        assert!(matches!(window.vsync(), Err(StreamError::NotOpen)));
        assert!(matches!(window.set_vsync(true), Err(StreamError::NotOpen)));
        assert!(matches!(window.fullscreen(), Err(StreamError::NotOpen)));
        assert!(matches!(window.size(), Err(StreamError::NotOpen)));
        assert!(matches!(window.opengl(), Err(StreamError::NotOpen)));
        assert!(matches!(
            window.set_aspect_mode(AspectMode::Keep),
            Err(StreamError::NotOpen)
        ));

        // closing a window that never opened is only worth a warning
        window.close()?;
        Ok(())
    }

    #[ignore = "need gstreamer in CI"]
    #[test]
    fn window_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
        let mut window = VideoWindow::new("preview");
        window.open()?;
        assert!(window.is_open());

        // redundant open is not an error
        window.open()?;

        let img = Image::<u8, 3>::from_size_val([32, 24].into(), 128)?;
        window.write(&img)?;
        window.write(&img)?;

        window.close()?;
        assert!(!window.is_open());
        window.close()?;

        // the window can be opened again
        window.open()?;
        window.write(&img)?;
        window.close()?;
        Ok(())
    }
}
