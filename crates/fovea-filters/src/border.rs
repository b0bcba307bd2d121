use std::str::FromStr;

use crate::error::FilterError;

/// Border handling modes accepted by the filter functions.
///
/// The names follow the conventional computer-vision border taxonomy
/// (`BORDER_CONSTANT`, `BORDER_REPLICATE`, ...). Every filter validates the
/// requested mode against the modes its backing operation actually
/// implements before any native call happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderMode {
    /// Fill out-of-bounds pixels with a constant value.
    Constant,
    /// Replicate the value of the nearest border pixel.
    Replicate,
    /// Reflect the image across the border, excluding the border pixel.
    Reflect,
    /// Reflect the image across the border, including the border pixel.
    Reflect101,
    /// Wrap the image around periodically.
    Wrap,
    /// Ignore pixels outside the region of interest.
    Isolated,
}

impl BorderMode {
    /// The canonical lower-case name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            BorderMode::Constant => "constant",
            BorderMode::Replicate => "replicate",
            BorderMode::Reflect => "reflect",
            BorderMode::Reflect101 => "reflect101",
            BorderMode::Wrap => "wrap",
            BorderMode::Isolated => "isolated",
        }
    }

    /// Validate that `self` is one of the modes `op` can execute.
    ///
    /// # Errors
    ///
    /// Fails with [`FilterError::UnsupportedOperation`] when the backing
    /// library implements `op` only for other modes.
    pub fn ensure_supported(self, op: &str, supported: &[BorderMode]) -> Result<(), FilterError> {
        if supported.contains(&self) {
            Ok(())
        } else {
            Err(FilterError::UnsupportedOperation(format!(
                "{} does not support border mode '{}'",
                op,
                self.name()
            )))
        }
    }
}

impl FromStr for BorderMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(BorderMode::Constant),
            "replicate" => Ok(BorderMode::Replicate),
            "reflect" => Ok(BorderMode::Reflect),
            "reflect101" => Ok(BorderMode::Reflect101),
            "wrap" => Ok(BorderMode::Wrap),
            "isolated" => Ok(BorderMode::Isolated),
            // the conventional default border is reflect-101
            "default" => Ok(BorderMode::Reflect101),
            other => Err(FilterError::InvalidParameter(format!(
                "unknown border mode '{}'",
                other
            ))),
        }
    }
}

/// The border modes the filtering backends execute.
///
/// The underlying library clamps coordinates at the image edge, which is
/// replicate-border behavior; other modes are rejected before dispatch.
pub(crate) const REPLICATE_ONLY: &[BorderMode] = &[BorderMode::Replicate];

/// Structuring element shapes for the morphological operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphShape {
    /// Square structuring element.
    Rect,
    /// Cross-shaped structuring element.
    Cross,
    /// Elliptical structuring element.
    Ellipse,
}

impl MorphShape {
    /// The canonical lower-case name of the shape.
    pub fn name(&self) -> &'static str {
        match self {
            MorphShape::Rect => "rect",
            MorphShape::Cross => "cross",
            MorphShape::Ellipse => "ellipse",
        }
    }

    /// The native structuring element of this shape with the given radius.
    ///
    /// The element spans `2 * radius + 1` pixels per axis.
    pub(crate) fn mask(self, radius: u8) -> imageproc::morphology::Mask {
        match self {
            MorphShape::Rect => imageproc::morphology::Mask::square(radius),
            MorphShape::Cross => imageproc::morphology::Mask::diamond(radius),
            MorphShape::Ellipse => imageproc::morphology::Mask::disk(radius),
        }
    }
}

impl FromStr for MorphShape {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rect" => Ok(MorphShape::Rect),
            "cross" => Ok(MorphShape::Cross),
            "ellipse" => Ok(MorphShape::Ellipse),
            other => Err(FilterError::InvalidParameter(format!(
                "unknown structuring element shape '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_mode_parses_known_names() {
        for name in ["constant", "replicate", "reflect", "reflect101", "wrap", "isolated"] {
            let mode: BorderMode = name.parse().unwrap();
            assert_eq!(mode.name(), name);
        }
    }

    #[test]
    fn border_mode_default_alias() {
        let mode: BorderMode = "default".parse().unwrap();
        assert_eq!(mode, BorderMode::Reflect101);
    }

    #[test]
    fn border_mode_rejects_unknown_name() {
        let err = "mirror".parse::<BorderMode>();
        assert!(matches!(err, Err(FilterError::InvalidParameter(_))));
    }

    #[test]
    fn border_mode_support_check() {
        let ok = BorderMode::Replicate.ensure_supported("box_blur", &[BorderMode::Replicate]);
        assert!(ok.is_ok());
        let err = BorderMode::Wrap.ensure_supported("box_blur", &[BorderMode::Replicate]);
        assert!(matches!(err, Err(FilterError::UnsupportedOperation(_))));
    }

    #[test]
    fn morph_shape_parses() {
        assert_eq!("rect".parse::<MorphShape>().unwrap(), MorphShape::Rect);
        assert_eq!("cross".parse::<MorphShape>().unwrap(), MorphShape::Cross);
        assert_eq!("ellipse".parse::<MorphShape>().unwrap(), MorphShape::Ellipse);
        assert!("disk".parse::<MorphShape>().is_err());
    }
}
