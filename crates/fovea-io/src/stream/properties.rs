use std::str::FromStr;

use super::error::StreamError;

/// The recognized properties of a video reader.
///
/// Each variant aliases exactly one piece of native pipeline state, either
/// a query on the pipeline itself or a control on the color balance stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureProperty {
    /// Width of the decoded frames in pixels. Read only.
    FrameWidth,
    /// Height of the decoded frames in pixels. Read only.
    FrameHeight,
    /// Frame rate reported by the source.
    Fps,
    /// Total number of frames, when the source reports one. Read only.
    FrameCount,
    /// Current position in milliseconds.
    PosMsec,
    /// Number of frames delivered so far. Read only.
    PosFrames,
    /// Picture brightness control.
    Brightness,
    /// Picture contrast control.
    Contrast,
    /// Picture saturation control.
    Saturation,
    /// Picture hue control.
    Hue,
}

impl CaptureProperty {
    /// The canonical name of the property.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureProperty::FrameWidth => "frame_width",
            CaptureProperty::FrameHeight => "frame_height",
            CaptureProperty::Fps => "fps",
            CaptureProperty::FrameCount => "frame_count",
            CaptureProperty::PosMsec => "pos_msec",
            CaptureProperty::PosFrames => "pos_frames",
            CaptureProperty::Brightness => "brightness",
            CaptureProperty::Contrast => "contrast",
            CaptureProperty::Saturation => "saturation",
            CaptureProperty::Hue => "hue",
        }
    }

    /// The color balance control behind this property, if it is one.
    pub(crate) fn balance_control(&self) -> Option<BalanceControl> {
        match self {
            CaptureProperty::Brightness => Some(BalanceControl {
                gst_name: "brightness",
                min: -1.0,
                max: 1.0,
            }),
            CaptureProperty::Contrast => Some(BalanceControl {
                gst_name: "contrast",
                min: 0.0,
                max: 2.0,
            }),
            CaptureProperty::Saturation => Some(BalanceControl {
                gst_name: "saturation",
                min: 0.0,
                max: 2.0,
            }),
            CaptureProperty::Hue => Some(BalanceControl {
                gst_name: "hue",
                min: -1.0,
                max: 1.0,
            }),
            _ => None,
        }
    }
}

impl FromStr for CaptureProperty {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frame_width" => Ok(CaptureProperty::FrameWidth),
            "frame_height" => Ok(CaptureProperty::FrameHeight),
            "fps" => Ok(CaptureProperty::Fps),
            "frame_count" => Ok(CaptureProperty::FrameCount),
            "pos_msec" => Ok(CaptureProperty::PosMsec),
            "pos_frames" => Ok(CaptureProperty::PosFrames),
            "brightness" => Ok(CaptureProperty::Brightness),
            "contrast" => Ok(CaptureProperty::Contrast),
            "saturation" => Ok(CaptureProperty::Saturation),
            "hue" => Ok(CaptureProperty::Hue),
            _ => Err(StreamError::UnknownProperty(s.to_string())),
        }
    }
}

/// A picture control exposed by the color balance stage.
pub(crate) struct BalanceControl {
    /// The native property name on the balance element.
    pub gst_name: &'static str,
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl BalanceControl {
    /// Checks that a value lies inside the control range.
    pub fn validate(&self, property: &str, value: f64) -> Result<(), StreamError> {
        if value < self.min || value > self.max || !value.is_finite() {
            return Err(StreamError::PropertyRejected {
                property: property.to_string(),
                reason: format!("value {} outside [{}, {}]", value, self.min, self.max),
            });
        }
        Ok(())
    }
}

/// The recognized properties of a video writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterProperty {
    /// Encoder quality, 1 to 100.
    Quality,
    /// Size of one uncompressed input frame in bytes. Read only.
    FrameBytes,
    /// Number of frames written so far. Read only.
    NFrames,
}

impl WriterProperty {
    /// The canonical name of the property.
    pub fn name(&self) -> &'static str {
        match self {
            WriterProperty::Quality => "quality",
            WriterProperty::FrameBytes => "frame_bytes",
            WriterProperty::NFrames => "n_frames",
        }
    }
}

impl FromStr for WriterProperty {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quality" => Ok(WriterProperty::Quality),
            "frame_bytes" => Ok(WriterProperty::FrameBytes),
            "n_frames" => Ok(WriterProperty::NFrames),
            _ => Err(StreamError::UnknownProperty(s.to_string())),
        }
    }
}

/// Derives the inter frame delay in seconds from a frame rate.
///
/// A zero or negative rate has no defined delay and maps to zero.
pub fn wait_time_from_fps(fps: f64) -> f64 {
    if fps > 0.0 {
        1.0 / fps
    } else {
        0.0
    }
}

/// Derives the frame rate from an inter frame delay in seconds.
pub fn fps_from_wait_time(wait_time: f64) -> f64 {
    if wait_time > 0.0 {
        1.0 / wait_time
    } else {
        0.0
    }
}

// x264 takes a constant quantizer between 0 (best) and 50, the public
// quality knob runs the other way from 1 to 100.
pub(crate) fn quantizer_from_quality(quality: u32) -> u32 {
    (100 - quality.min(100)) / 2
}

pub(crate) fn quality_from_quantizer(quantizer: u32) -> u32 {
    100 - 2 * quantizer.min(50)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn capture_property_names_round_trip() -> Result<(), StreamError> {
        let all = [
            CaptureProperty::FrameWidth,
            CaptureProperty::FrameHeight,
            CaptureProperty::Fps,
            CaptureProperty::FrameCount,
            CaptureProperty::PosMsec,
            CaptureProperty::PosFrames,
            CaptureProperty::Brightness,
            CaptureProperty::Contrast,
            CaptureProperty::Saturation,
            CaptureProperty::Hue,
        ];
        for prop in all {
            assert_eq!(CaptureProperty::from_str(prop.name())?, prop);
        }
        Ok(())
    }

    #[test]
    fn unknown_capture_property() {
        assert!(matches!(
            CaptureProperty::from_str("gamma"),
            Err(StreamError::UnknownProperty(_))
        ));
    }

    #[test]
    fn writer_property_names_round_trip() -> Result<(), StreamError> {
        for prop in [
            WriterProperty::Quality,
            WriterProperty::FrameBytes,
            WriterProperty::NFrames,
        ] {
            assert_eq!(WriterProperty::from_str(prop.name())?, prop);
        }
        Ok(())
    }

    #[test]
    fn balance_ranges() {
        let control = CaptureProperty::Brightness.balance_control().unwrap();
        assert!(control.validate("brightness", 0.5).is_ok());
        assert!(control.validate("brightness", -1.0).is_ok());
        assert!(matches!(
            control.validate("brightness", 1.5),
            Err(StreamError::PropertyRejected { .. })
        ));

        let control = CaptureProperty::Contrast.balance_control().unwrap();
        assert!(control.validate("contrast", 2.0).is_ok());
        assert!(control.validate("contrast", -0.1).is_err());

        assert!(CaptureProperty::Fps.balance_control().is_none());
    }

    #[test]
    fn wait_time_reciprocity() {
        for fps in [1.0, 24.0, 29.97, 60.0, 240.0] {
            let wait_time = wait_time_from_fps(fps);
            assert_relative_eq!(wait_time, 1.0 / fps);
            assert_relative_eq!(fps_from_wait_time(wait_time), fps, max_relative = 1e-12);
        }
    }

    #[test]
    fn zero_fps_has_no_wait_time() {
        assert_eq!(wait_time_from_fps(0.0), 0.0);
        assert_eq!(fps_from_wait_time(0.0), 0.0);
    }

    #[test]
    fn quality_quantizer_mapping() {
        assert_eq!(quantizer_from_quality(100), 0);
        assert_eq!(quantizer_from_quality(2), 49);
        assert_eq!(quality_from_quantizer(0), 100);
        assert_eq!(quality_from_quantizer(50), 0);
        for quality in [10, 40, 80] {
            let back = quality_from_quantizer(quantizer_from_quality(quality));
            assert!(back.abs_diff(quality) <= 1);
        }
    }
}
