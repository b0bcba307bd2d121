use std::path::Path;
use std::str::FromStr;

use fovea_image::{Image, ImageSize};
use gstreamer::prelude::*;

use super::error::StreamError;
use super::properties::{quality_from_quantizer, quantizer_from_quality, WriterProperty};

/// The video codecs a writer can encode with.
///
/// The container is tied to the codec, h264 goes into mp4, vp9 into
/// webm and motion jpeg into avi.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoCodec {
    /// H264 in an mp4 container.
    H264,
    /// VP9 in a webm container.
    Vp9,
    /// Motion JPEG in an avi container.
    Mjpeg,
}

impl VideoCodec {
    /// The canonical name of the codec.
    pub fn name(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::Vp9 => "vp9",
            VideoCodec::Mjpeg => "mjpeg",
        }
    }

    /// The four character code identifying the compression format.
    pub fn fourcc(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "avc1",
            VideoCodec::Vp9 => "vp09",
            VideoCodec::Mjpeg => "MJPG",
        }
    }
}

impl FromStr for VideoCodec {
    type Err = StreamError;

    // accepts the fourcc spellings as well
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "h264" | "avc1" | "x264" => Ok(VideoCodec::H264),
            "vp9" | "vp09" | "vp90" => Ok(VideoCodec::Vp9),
            "mjpeg" | "mjpg" => Ok(VideoCodec::Mjpeg),
            _ => Err(StreamError::InvalidValue(format!("unknown codec: {}", s))),
        }
    }
}

/// The pixel layout of the frames handed to a writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFormat {
    /// 8-bit RGB.
    Rgb8,
    /// 8-bit grayscale.
    Mono8,
}

impl FrameFormat {
    pub(crate) fn channels(&self) -> usize {
        match self {
            FrameFormat::Rgb8 => 3,
            FrameFormat::Mono8 => 1,
        }
    }

    fn gst_format(&self) -> &'static str {
        match self {
            FrameFormat::Rgb8 => "RGB",
            FrameFormat::Mono8 => "GRAY8",
        }
    }
}

/// A video writer to encode frames into a file.
///
/// The frame geometry and rate are fixed at construction, every written
/// frame must match them exactly. Writing happens on the calling thread,
/// closing blocks until the container is finalized on disk.
pub struct VideoWriter {
    pipeline: gstreamer::Pipeline,
    appsrc: gstreamer_app::AppSrc,
    encoder: gstreamer::Element,
    codec: VideoCodec,
    format: FrameFormat,
    fps: u32,
    frame_size: ImageSize,
    counter: u64,
    started: bool,
    closed: bool,
}

impl VideoWriter {
    /// Creates a new writer over the given output path.
    ///
    /// # Arguments
    ///
    /// * `file_path` - The path to save the video file.
    /// * `codec` - The codec to encode the video with.
    /// * `format` - The expected image format of the incoming frames.
    /// * `fps` - The frames per second of the video.
    /// * `size` - The size of every frame of the video.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the pipeline cannot be
    /// built.
    pub fn new(
        file_path: impl AsRef<Path>,
        codec: VideoCodec,
        format: FrameFormat,
        fps: u32,
        size: ImageSize,
    ) -> Result<Self, StreamError> {
        if fps == 0 {
            return Err(StreamError::InvalidConfig(
                "the frame rate must be positive".to_string(),
            ));
        }
        if size.width == 0 || size.height == 0 {
            return Err(StreamError::InvalidConfig(
                "the frame size must be non zero".to_string(),
            ));
        }

        if !gstreamer::INITIALIZED.load(std::sync::atomic::Ordering::Relaxed) {
            gstreamer::init()?;
        }

        let file_path = file_path.as_ref().to_string_lossy();
        let pipeline_str = match codec {
            VideoCodec::H264 => format!(
                "appsrc name=src ! videoconvert ! video/x-raw,format=I420 ! \
                x264enc name=enc ! video/x-h264,profile=main ! h264parse ! \
                mp4mux ! filesink location=\"{}\"",
                file_path
            ),
            VideoCodec::Vp9 => format!(
                "appsrc name=src ! videoconvert ! video/x-raw,format=I420 ! \
                vp9enc name=enc ! webmmux ! filesink location=\"{}\"",
                file_path
            ),
            VideoCodec::Mjpeg => format!(
                "appsrc name=src ! videoconvert ! jpegenc name=enc ! \
                avimux ! filesink location=\"{}\"",
                file_path
            ),
        };

        let pipeline = gstreamer::parse::launch(&pipeline_str)?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(StreamError::DowncastPipelineError)?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or_else(|| StreamError::GetElementByNameError)?
            .dynamic_cast::<gstreamer_app::AppSrc>()
            .map_err(StreamError::DowncastPipelineError)?;

        let encoder = pipeline
            .by_name("enc")
            .ok_or_else(|| StreamError::GetElementByNameError)?;

        appsrc.set_format(gstreamer::Format::Time);

        let caps = gstreamer::Caps::builder("video/x-raw")
            .field("format", format.gst_format())
            .field("width", size.width as i32)
            .field("height", size.height as i32)
            .field("framerate", gstreamer::Fraction::new(fps as i32, 1))
            .build();
        appsrc.set_caps(Some(&caps));

        appsrc.set_is_live(true);
        appsrc.set_property("block", false);

        Ok(Self {
            pipeline,
            appsrc,
            encoder,
            codec,
            format,
            fps,
            frame_size: size,
            counter: 0,
            started: false,
            closed: false,
        })
    }

    /// Starts the pipeline. Redundant calls only log a warning.
    ///
    /// # Errors
    ///
    /// Fails if the pipeline refuses to start or the writer was closed.
    pub fn start(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::InvalidConfig(
                "the writer is closed".to_string(),
            ));
        }
        if self.started {
            log::warn!("The video writer is already started");
            return Ok(());
        }
        self.pipeline.set_state(gstreamer::State::Playing)?;
        self.started = true;
        Ok(())
    }

    /// Encodes one frame.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::ShapeMismatch`] when the frame size
    /// differs from the configured one, and with
    /// [`StreamError::InvalidImageFormat`] when the channel count does
    /// not match the configured format.
    pub fn write<const C: usize>(&mut self, img: &Image<u8, C>) -> Result<(), StreamError> {
        if !self.started {
            return Err(StreamError::InvalidConfig(
                "the writer is not started".to_string(),
            ));
        }

        match self.format {
            FrameFormat::Mono8 => {
                if C != 1 {
                    return Err(StreamError::InvalidImageFormat(format!(
                        "Invalid number of channels: expected 1, got {}",
                        C
                    )));
                }
            }
            FrameFormat::Rgb8 => {
                if C != 3 {
                    return Err(StreamError::InvalidImageFormat(format!(
                        "Invalid number of channels: expected 3, got {}",
                        C
                    )));
                }
            }
        }

        if img.size() != self.frame_size {
            return Err(StreamError::ShapeMismatch {
                expected: self.frame_size,
                got: img.size(),
            });
        }

        let mut buffer = gstreamer::Buffer::from_mut_slice(img.as_slice().to_vec());

        let pts = gstreamer::ClockTime::from_nseconds(self.counter * 1_000_000_000 / self.fps as u64);
        let duration = gstreamer::ClockTime::from_nseconds(1_000_000_000 / self.fps as u64);

        let buffer_ref = buffer.get_mut().ok_or(StreamError::GetBufferError)?;
        buffer_ref.set_pts(Some(pts));
        buffer_ref.set_duration(Some(duration));

        self.counter += 1;
        self.appsrc.push_buffer(buffer)?;

        self.pump_bus();

        Ok(())
    }

    // surfaces encoder complaints between writes without blocking
    fn pump_bus(&self) {
        let Some(bus) = self.pipeline.bus() else {
            return;
        };
        while let Some(msg) = bus.pop() {
            if let gstreamer::MessageView::Error(err) = msg.view() {
                log::error!(
                    "Error from {:?}: {} ({:?})",
                    err.src().map(|s| s.path_string()),
                    err.error(),
                    err.debug()
                );
            }
        }
    }

    /// Reads a writer property.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::PropertyRejected`] when the encoder has
    /// no native counterpart for the property.
    pub fn get(&self, prop: WriterProperty) -> Result<Option<f64>, StreamError> {
        match prop {
            WriterProperty::Quality => match self.codec {
                VideoCodec::H264 => {
                    let quantizer = self.encoder.property::<u32>("quantizer");
                    Ok(Some(quality_from_quantizer(quantizer) as f64))
                }
                VideoCodec::Mjpeg => Ok(Some(self.encoder.property::<i32>("quality") as f64)),
                VideoCodec::Vp9 => Err(StreamError::PropertyRejected {
                    property: prop.name().to_string(),
                    reason: "the encoder has no direct quality control".to_string(),
                }),
            },
            WriterProperty::FrameBytes => Ok(Some(
                (self.frame_size.width * self.frame_size.height * self.format.channels()) as f64,
            )),
            WriterProperty::NFrames => Ok(Some(self.counter as f64)),
        }
    }

    /// Writes a writer property.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::PropertyRejected`] when the property is
    /// read only, out of range, or has no native counterpart.
    pub fn set(&mut self, prop: WriterProperty, value: f64) -> Result<(), StreamError> {
        match prop {
            WriterProperty::Quality => {
                if !(value.is_finite() && (1.0..=100.0).contains(&value)) {
                    return Err(StreamError::PropertyRejected {
                        property: prop.name().to_string(),
                        reason: format!("quality {} outside [1, 100]", value),
                    });
                }
                match self.codec {
                    VideoCodec::H264 => {
                        self.encoder.set_property_from_str("pass", "quant");
                        self.encoder
                            .set_property("quantizer", quantizer_from_quality(value as u32));
                        Ok(())
                    }
                    VideoCodec::Mjpeg => {
                        self.encoder.set_property("quality", value as i32);
                        Ok(())
                    }
                    VideoCodec::Vp9 => Err(StreamError::PropertyRejected {
                        property: prop.name().to_string(),
                        reason: "the encoder has no direct quality control".to_string(),
                    }),
                }
            }
            WriterProperty::FrameBytes | WriterProperty::NFrames => {
                Err(StreamError::PropertyRejected {
                    property: prop.name().to_string(),
                    reason: "read only".to_string(),
                })
            }
        }
    }

    /// Flushes the stream and releases the native handle. Safe to call
    /// more than once.
    ///
    /// Blocks until the muxer has finalized the container, the output
    /// file is complete once this returns.
    ///
    /// # Errors
    ///
    /// Fails if the end of stream cannot be delivered or the pipeline
    /// refuses to shut down. The handle is released either way.
    pub fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut flush_result = Ok(());
        if self.started {
            match self.appsrc.end_of_stream() {
                Ok(_) => self.wait_for_eos(),
                Err(e) => flush_result = Err(StreamError::GstreamerFlowError(e)),
            }
        }

        self.pipeline.set_state(gstreamer::State::Null)?;
        flush_result
    }

    fn wait_for_eos(&self) {
        let Some(bus) = self.pipeline.bus() else {
            return;
        };
        match bus.timed_pop_filtered(
            gstreamer::ClockTime::from_seconds(30),
            &[gstreamer::MessageType::Eos, gstreamer::MessageType::Error],
        ) {
            Some(msg) => match msg.view() {
                gstreamer::MessageView::Eos(..) => {
                    log::debug!("gstreamer received EOS")
                }
                gstreamer::MessageView::Error(err) => {
                    log::error!(
                        "Error from {:?}: {} ({:?})",
                        err.src().map(|s| s.path_string()),
                        err.error(),
                        err.debug()
                    );
                }
                _ => {}
            },
            None => log::warn!("No EOS within 30s, the output file may be truncated"),
        }
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                log::error!("Failed to close the video writer: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_from_str() -> Result<(), StreamError> {
        assert_eq!(VideoCodec::from_str("h264")?, VideoCodec::H264);
        assert_eq!(VideoCodec::from_str("AVC1")?, VideoCodec::H264);
        assert_eq!(VideoCodec::from_str("vp9")?, VideoCodec::Vp9);
        assert_eq!(VideoCodec::from_str("MJPG")?, VideoCodec::Mjpeg);
        assert!(matches!(
            VideoCodec::from_str("h265"),
            Err(StreamError::InvalidValue(_))
        ));
        Ok(())
    }

    #[test]
    fn codec_fourcc_round_trip() -> Result<(), StreamError> {
        for codec in [VideoCodec::H264, VideoCodec::Vp9, VideoCodec::Mjpeg] {
            assert_eq!(VideoCodec::from_str(codec.fourcc())?, codec);
        }
        Ok(())
    }

    #[ignore = "need gstreamer in CI"]
    #[test]
    fn video_writer_h264() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("video.mp4");
        let size = ImageSize {
            width: 6,
            height: 4,
        };

        let mut writer = VideoWriter::new(&file_path, VideoCodec::H264, FrameFormat::Rgb8, 30, size)?;
        writer.start()?;

        for i in 0..5 {
            let img = Image::<u8, 3>::from_size_val(size, i * 30)?;
            writer.write(&img)?;
        }
        assert_eq!(writer.get(WriterProperty::NFrames)?, Some(5.0));
        assert_eq!(writer.get(WriterProperty::FrameBytes)?, Some(72.0));

        writer.close()?;
        writer.close()?;

        assert!(file_path.exists());
        assert!(std::fs::metadata(&file_path)?.len() > 0);
        Ok(())
    }

    #[ignore = "need gstreamer in CI"]
    #[test]
    fn video_writer_rejects_bad_frames() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("video.mp4");
        let size = ImageSize {
            width: 6,
            height: 4,
        };

        let mut writer = VideoWriter::new(&file_path, VideoCodec::H264, FrameFormat::Rgb8, 30, size)?;
        writer.start()?;

        let wrong_size = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            0,
        )?;
        assert!(matches!(
            writer.write(&wrong_size),
            Err(StreamError::ShapeMismatch { .. })
        ));

        let wrong_channels = Image::<u8, 1>::from_size_val(size, 0)?;
        assert!(matches!(
            writer.write(&wrong_channels),
            Err(StreamError::InvalidImageFormat(_))
        ));

        writer.close()?;
        Ok(())
    }

    #[ignore = "need gstreamer in CI"]
    #[test]
    fn video_writer_quality() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("video.avi");
        let size = ImageSize {
            width: 6,
            height: 4,
        };

        let mut writer = VideoWriter::new(&file_path, VideoCodec::Mjpeg, FrameFormat::Rgb8, 10, size)?;
        writer.set(WriterProperty::Quality, 50.0)?;
        assert_eq!(writer.get(WriterProperty::Quality)?, Some(50.0));

        assert!(matches!(
            writer.set(WriterProperty::Quality, 0.0),
            Err(StreamError::PropertyRejected { .. })
        ));
        assert!(matches!(
            writer.set(WriterProperty::NFrames, 3.0),
            Err(StreamError::PropertyRejected { .. })
        ));
        Ok(())
    }

    #[test]
    fn video_writer_rejects_zero_fps() {
        let size = ImageSize {
            width: 6,
            height: 4,
        };
        assert!(matches!(
            VideoWriter::new("/tmp/video.mp4", VideoCodec::H264, FrameFormat::Rgb8, 0, size),
            Err(StreamError::InvalidConfig(_))
        ));
    }
}
