use std::time::Duration;

use fovea_image::{Image, ImageSize};
use gstreamer::prelude::*;

use super::error::StreamError;
use super::properties::{fps_from_wait_time, wait_time_from_fps, CaptureProperty};
use super::source::{DeviceSource, FileSource, SourceKind, UrlSource, VideoSource};

/// Lifecycle of a video reader.
///
/// Both end states are terminal, an exhausted reader cannot be rewound
/// back into iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderState {
    /// Frames can still be pulled.
    Opened,
    /// The source reported end of stream.
    Exhausted,
    /// The native handle has been released.
    Closed,
}

/// A video reader over a file, device or network source.
///
/// Frames are decoded to packed RGB and handed out as owned images. The
/// reader is single pass, once the source reports exhaustion iteration
/// stops for good. All calls block the calling thread, there is no
/// worker thread behind this type.
pub struct Video {
    pipeline: gstreamer::Pipeline,
    appsink: gstreamer_app::AppSink,
    balance: gstreamer::Element,
    kind: SourceKind,
    state: ReaderState,
    fps: f64,
    frame_size: Option<ImageSize>,
    pos_frames: u64,
}

impl Video {
    /// Opens a reader over the given source.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be described, or if the underlying
    /// pipeline cannot be built and started.
    pub fn new(source: &impl VideoSource) -> Result<Self, StreamError> {
        let pipeline_desc = source.pipeline_description()?;

        if !gstreamer::INITIALIZED.load(std::sync::atomic::Ordering::Relaxed) {
            gstreamer::init()?;
        }

        let pipeline = gstreamer::parse::launch(&pipeline_desc)?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(StreamError::DowncastPipelineError)?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| StreamError::GetElementByNameError)?
            .dynamic_cast::<gstreamer_app::AppSink>()
            .map_err(StreamError::DowncastPipelineError)?;

        let balance = pipeline
            .by_name("balance")
            .ok_or_else(|| StreamError::GetElementByNameError)?;

        pipeline.set_state(gstreamer::State::Playing)?;

        let mut video = Self {
            pipeline,
            appsink,
            balance,
            kind: source.kind(),
            state: ReaderState::Opened,
            fps: 0.0,
            frame_size: None,
            pos_frames: 0,
        };
        video.cache_stream_info();

        Ok(video)
    }

    /// Opens a reader over a local video file.
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist or the pipeline cannot start.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, StreamError> {
        Self::new(&FileSource::new(path))
    }

    /// Opens a reader over a capture device.
    ///
    /// # Errors
    ///
    /// Fails if the pipeline cannot start.
    pub fn from_device(index: u32) -> Result<Self, StreamError> {
        Self::new(&DeviceSource::new(index))
    }

    /// Opens a reader over a network stream.
    ///
    /// # Errors
    ///
    /// Fails if the pipeline cannot start.
    pub fn from_url(url: impl Into<String>) -> Result<Self, StreamError> {
        Self::new(&UrlSource::new(url))
    }

    // Blocks briefly on the first preroll so callers can query the frame
    // geometry before pulling frames. Live sources that are slow to start
    // fill this in on the first read instead.
    fn cache_stream_info(&mut self) {
        match self
            .appsink
            .try_pull_preroll(gstreamer::ClockTime::from_seconds(10))
        {
            Some(sample) => {
                if let Err(e) = self.apply_sample_caps(&sample) {
                    log::warn!("Failed to read the stream caps: {}", e);
                }
            }
            None => log::warn!("The stream did not preroll in time, geometry is unknown yet"),
        }
    }

    fn apply_sample_caps(&mut self, sample: &gstreamer::Sample) -> Result<(), StreamError> {
        let caps = sample
            .caps()
            .ok_or_else(|| StreamError::GetCapsError("Failed to get the caps".to_string()))?;
        let structure = caps
            .structure(0)
            .ok_or_else(|| StreamError::GetCapsError("Failed to get the structure".to_string()))?;

        let width = structure
            .get::<i32>("width")
            .map_err(|e| StreamError::GetCapsError(e.to_string()))?;
        let height = structure
            .get::<i32>("height")
            .map_err(|e| StreamError::GetCapsError(e.to_string()))?;
        self.frame_size = Some(ImageSize {
            width: width as usize,
            height: height as usize,
        });

        if let Ok(framerate) = structure.get::<gstreamer::Fraction>("framerate") {
            if framerate.denom() > 0 {
                self.fps = framerate.numer() as f64 / framerate.denom() as f64;
            }
        }

        Ok(())
    }

    /// Pulls the next frame, or `None` once the source is exhausted.
    ///
    /// Normal end of stream is not an error. A source that stops
    /// delivering frames, for whatever reason, moves the reader into the
    /// exhausted state and every later call returns `None`.
    ///
    /// # Errors
    ///
    /// Fails if a delivered sample cannot be turned into an image.
    pub fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, StreamError> {
        if self.state != ReaderState::Opened {
            return Ok(None);
        }

        self.drain_bus();
        if self.state != ReaderState::Opened {
            return Ok(None);
        }

        let Some(sample) = self
            .appsink
            .try_pull_sample(gstreamer::ClockTime::from_seconds(5))
        else {
            if self.appsink.is_eos() {
                log::debug!("gstreamer received EOS");
            } else {
                log::warn!("No sample within 5s, treating the stream as exhausted");
            }
            self.state = ReaderState::Exhausted;
            return Ok(None);
        };

        if self.frame_size.is_none() || self.fps <= 0.0 {
            if let Err(e) = self.apply_sample_caps(&sample) {
                log::warn!("Failed to read the stream caps: {}", e);
            }
        }

        match Self::extract_image_frame(sample) {
            Ok(frame) => {
                self.pos_frames += 1;
                Ok(Some(frame))
            }
            Err(e) => {
                self.state = ReaderState::Exhausted;
                Err(e)
            }
        }
    }

    // Bus messages are handled inline on the calling thread, there is no
    // watcher thread behind this type. EOS is only logged here, remaining
    // queued samples still have to be drained from the appsink.
    fn drain_bus(&mut self) {
        let Some(bus) = self.pipeline.bus() else {
            return;
        };
        while let Some(msg) = bus.pop() {
            match msg.view() {
                gstreamer::MessageView::Eos(..) => {
                    log::debug!("gstreamer received EOS");
                }
                gstreamer::MessageView::Error(err) => {
                    log::error!(
                        "Error from {:?}: {} ({:?})",
                        err.src().map(|s| s.path_string()),
                        err.error(),
                        err.debug()
                    );
                    self.state = ReaderState::Exhausted;
                }
                _ => {}
            }
        }
    }

    fn extract_image_frame(sample: gstreamer::Sample) -> Result<Image<u8, 3>, StreamError> {
        let caps = sample
            .caps()
            .ok_or_else(|| StreamError::GetCapsError("Failed to get the caps".to_string()))?;
        let structure = caps
            .structure(0)
            .ok_or_else(|| StreamError::GetCapsError("Failed to get the structure".to_string()))?;
        let height = structure
            .get::<i32>("height")
            .map_err(|e| StreamError::GetCapsError(e.to_string()))? as usize;
        let width = structure
            .get::<i32>("width")
            .map_err(|e| StreamError::GetCapsError(e.to_string()))? as usize;

        let buffer = sample.buffer().ok_or(StreamError::GetBufferError)?;
        let map = buffer
            .map_readable()
            .map_err(|_| StreamError::GetBufferError)?;
        let data = map.as_slice();

        let row_bytes = width * 3;
        let expected = row_bytes * height;
        let img_data = if data.len() == expected {
            data.to_vec()
        } else if data.len() > expected && height > 0 {
            // rows carry alignment padding, keep the packed part of each one
            let stride = data.len() / height;
            if stride < row_bytes {
                return Err(StreamError::InvalidImageFormat(format!(
                    "buffer of {} bytes cannot hold a {}x{} rgb frame",
                    data.len(),
                    width,
                    height
                )));
            }
            let mut packed = Vec::with_capacity(expected);
            for row in data.chunks_exact(stride).take(height) {
                packed.extend_from_slice(&row[..row_bytes]);
            }
            packed
        } else {
            return Err(StreamError::InvalidImageFormat(format!(
                "buffer of {} bytes cannot hold a {}x{} rgb frame",
                data.len(),
                width,
                height
            )));
        };

        Ok(Image::new([width, height].into(), img_data)?)
    }

    /// Borrowing iterator over the remaining frames.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { video: self }
    }

    /// The frame rate reported by the source, zero when unknown.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// The delay between frames in seconds, derived from the frame rate.
    pub fn wait_time(&self) -> f64 {
        wait_time_from_fps(self.fps)
    }

    /// Sets the delay between frames in seconds, adjusting the frame rate
    /// to match. Zero means unpaced.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::InvalidValue`] for negative or non-finite
    /// delays.
    pub fn set_wait_time(&mut self, seconds: f64) -> Result<(), StreamError> {
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(StreamError::InvalidValue(format!(
                "invalid wait time {}",
                seconds
            )));
        }
        self.fps = fps_from_wait_time(seconds);
        Ok(())
    }

    /// The frame geometry, once the source has negotiated it.
    pub fn frame_size(&self) -> Option<ImageSize> {
        self.frame_size
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// The kind of source behind this reader.
    pub fn source_kind(&self) -> SourceKind {
        self.kind
    }

    /// Total number of frames in the source.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::UnknownLength`] for device streams and
    /// for sources without a finite reported duration. A spurious count
    /// is never returned.
    pub fn num_frames(&self) -> Result<usize, StreamError> {
        if self.kind == SourceKind::Device {
            return Err(StreamError::UnknownLength);
        }
        if self.fps <= 0.0 {
            return Err(StreamError::UnknownLength);
        }
        let duration = self.get_duration().ok_or(StreamError::UnknownLength)?;
        let frames = (duration.as_secs_f64() * self.fps).round() as i64;
        if frames <= 0 {
            return Err(StreamError::UnknownLength);
        }
        Ok(frames as usize)
    }

    /// Reads a property from the reader.
    ///
    /// Properties whose value is unknown, such as the frame count of an
    /// unbounded stream, come back as `None` rather than a sentinel.
    ///
    /// # Errors
    ///
    /// Fails if the underlying query fails.
    pub fn get(&self, prop: CaptureProperty) -> Result<Option<f64>, StreamError> {
        match prop {
            CaptureProperty::FrameWidth => Ok(self.frame_size.map(|s| s.width as f64)),
            CaptureProperty::FrameHeight => Ok(self.frame_size.map(|s| s.height as f64)),
            CaptureProperty::Fps => Ok(Some(self.fps)),
            CaptureProperty::FrameCount => match self.num_frames() {
                Ok(n) => Ok(Some(n as f64)),
                Err(StreamError::UnknownLength) => Ok(None),
                Err(e) => Err(e),
            },
            CaptureProperty::PosMsec => Ok(self.get_pos().map(|p| p.as_secs_f64() * 1e3)),
            CaptureProperty::PosFrames => Ok(Some(self.pos_frames as f64)),
            CaptureProperty::Brightness
            | CaptureProperty::Contrast
            | CaptureProperty::Saturation
            | CaptureProperty::Hue => {
                let Some(control) = prop.balance_control() else {
                    return Err(StreamError::UnknownProperty(prop.name().to_string()));
                };
                Ok(Some(self.balance.property::<f64>(control.gst_name)))
            }
        }
    }

    /// Writes a property on the reader.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::PropertyRejected`] when the property is
    /// read only, the value is out of range, or the reader is closed.
    pub fn set(&mut self, prop: CaptureProperty, value: f64) -> Result<(), StreamError> {
        if self.state == ReaderState::Closed {
            return Err(StreamError::PropertyRejected {
                property: prop.name().to_string(),
                reason: "the reader is closed".to_string(),
            });
        }
        match prop {
            CaptureProperty::Fps => {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(StreamError::PropertyRejected {
                        property: prop.name().to_string(),
                        reason: format!("invalid frame rate {}", value),
                    });
                }
                self.fps = value;
                Ok(())
            }
            CaptureProperty::PosMsec => {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(StreamError::PropertyRejected {
                        property: prop.name().to_string(),
                        reason: format!("invalid position {}", value),
                    });
                }
                self.seek(Duration::from_secs_f64(value / 1e3))
            }
            CaptureProperty::PosFrames => {
                if self.fps <= 0.0 {
                    return Err(StreamError::PropertyRejected {
                        property: prop.name().to_string(),
                        reason: "the frame rate is unknown".to_string(),
                    });
                }
                if !(value.is_finite() && value >= 0.0) {
                    return Err(StreamError::PropertyRejected {
                        property: prop.name().to_string(),
                        reason: format!("invalid position {}", value),
                    });
                }
                self.seek(Duration::from_secs_f64(value / self.fps))
            }
            CaptureProperty::Brightness
            | CaptureProperty::Contrast
            | CaptureProperty::Saturation
            | CaptureProperty::Hue => {
                let Some(control) = prop.balance_control() else {
                    return Err(StreamError::UnknownProperty(prop.name().to_string()));
                };
                control.validate(prop.name(), value)?;
                self.balance.set_property(control.gst_name, value);
                Ok(())
            }
            CaptureProperty::FrameWidth
            | CaptureProperty::FrameHeight
            | CaptureProperty::FrameCount => Err(StreamError::PropertyRejected {
                property: prop.name().to_string(),
                reason: "read only".to_string(),
            }),
        }
    }

    /// Seeks to an absolute position.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::SeekError`] when the reader is no longer
    /// in the opened state or the source cannot seek, as device streams
    /// cannot.
    pub fn seek(&mut self, position: Duration) -> Result<(), StreamError> {
        if self.state != ReaderState::Opened {
            return Err(StreamError::SeekError);
        }
        let clock_time = gstreamer::ClockTime::from_nseconds(position.as_nanos() as u64);
        self.pipeline
            .seek_simple(
                gstreamer::SeekFlags::FLUSH | gstreamer::SeekFlags::ACCURATE,
                clock_time,
            )
            .map_err(|_| StreamError::SeekError)?;
        if self.fps > 0.0 {
            self.pos_frames = (position.as_secs_f64() * self.fps).round() as u64;
        }
        Ok(())
    }

    /// Current playback position, when the pipeline reports one.
    pub fn get_pos(&self) -> Option<Duration> {
        self.pipeline
            .query_position::<gstreamer::format::ClockTime>()
            .map(|t| Duration::from_nanos(t.nseconds()))
    }

    /// Total duration of the source, when the pipeline reports one.
    pub fn get_duration(&self) -> Option<Duration> {
        self.pipeline
            .query_duration::<gstreamer::format::ClockTime>()
            .map(|t| Duration::from_nanos(t.nseconds()))
    }

    /// Releases the native handle. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Fails if the pipeline refuses to shut down. The handle is
    /// released either way.
    pub fn close(&mut self) -> Result<(), StreamError> {
        if self.state == ReaderState::Closed {
            return Ok(());
        }
        self.state = ReaderState::Closed;
        let eos_sent = self.pipeline.send_event(gstreamer::event::Eos::new());
        self.pipeline.set_state(gstreamer::State::Null)?;
        if !eos_sent {
            return Err(StreamError::SendEosError);
        }
        Ok(())
    }
}

impl Drop for Video {
    fn drop(&mut self) {
        if self.state != ReaderState::Closed {
            if let Err(e) = self.close() {
                log::error!("Failed to close the video reader: {}", e);
            }
        }
    }
}

/// Iterator over the remaining frames of a reader.
///
/// Read failures are logged and end the iteration, normal end of stream
/// ends it silently.
pub struct Frames<'a> {
    video: &'a mut Video,
}

impl Iterator for Frames<'_> {
    type Item = Image<u8, 3>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.video.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Failed to read a frame: {}", e);
                None
            }
        }
    }
}

impl<'a> IntoIterator for &'a mut Video {
    type Item = Image<u8, 3>;
    type IntoIter = Frames<'a>;

    fn into_iter(self) -> Frames<'a> {
        self.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{FileSource, FrameFormat, VideoCodec, VideoWriter};

    fn write_clip(
        file_path: &std::path::Path,
        size: ImageSize,
        fps: u32,
        frames: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = VideoWriter::new(
            file_path,
            VideoCodec::H264,
            FrameFormat::Rgb8,
            fps,
            size,
        )?;
        writer.start()?;
        for i in 0..frames {
            let value = (i * 40) as u8;
            let frame = Image::<u8, 3>::from_size_val(size, value)?;
            writer.write(&frame)?;
        }
        writer.close()?;
        Ok(())
    }

    #[ignore = "need gstreamer in CI"]
    #[test]
    fn read_back_written_clip() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("clip.mp4");
        let size = ImageSize {
            width: 6,
            height: 4,
        };
        write_clip(&file_path, size, 7, 3)?;
        assert!(file_path.exists());

        let mut video = Video::new(&FileSource::new(&file_path))?;
        assert_eq!(video.state(), ReaderState::Opened);
        assert_eq!(video.frame_size(), Some(size));
        assert!(video.fps() > 0.0);
        assert_eq!(video.num_frames()?, 3);

        let mut count = 0;
        for frame in &mut video {
            assert_eq!(frame.size(), size);
            count += 1;
        }
        assert_eq!(count, 3);
        assert_eq!(video.state(), ReaderState::Exhausted);

        // exhaustion is terminal
        assert!(video.read_frame()?.is_none());
        assert!(matches!(
            video.seek(Duration::from_millis(0)),
            Err(StreamError::SeekError)
        ));

        video.close()?;
        video.close()?;
        Ok(())
    }

    #[ignore = "need gstreamer in CI"]
    #[test]
    fn picture_controls_and_fps() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("clip.mp4");
        let size = ImageSize {
            width: 6,
            height: 4,
        };
        write_clip(&file_path, size, 7, 2)?;

        let mut video = Video::new(&FileSource::new(&file_path))?;

        video.set(CaptureProperty::Brightness, 0.25)?;
        let brightness = video.get(CaptureProperty::Brightness)?;
        assert_eq!(brightness, Some(0.25));

        assert!(matches!(
            video.set(CaptureProperty::Brightness, 1.5),
            Err(StreamError::PropertyRejected { .. })
        ));
        assert!(matches!(
            video.set(CaptureProperty::FrameWidth, 640.0),
            Err(StreamError::PropertyRejected { .. })
        ));

        video.set(CaptureProperty::Fps, 25.0)?;
        assert_eq!(video.fps(), 25.0);
        assert_eq!(video.wait_time(), 1.0 / 25.0);

        video.set_wait_time(0.1)?;
        assert_eq!(video.fps(), 10.0);
        video.set_wait_time(0.0)?;
        assert_eq!(video.fps(), 0.0);
        assert!(matches!(
            video.set_wait_time(-1.0),
            Err(StreamError::InvalidValue(_))
        ));

        video.close()?;
        Ok(())
    }
}
