use crate::dtype::Dtype;
use crate::image::{Image, ImageSize};

/// An image whose layout and dtype are only known at runtime.
///
/// Decoders return this when the caller asked for the file's native layout
/// instead of forcing grayscale or color. The variant set covers the layouts
/// the codec boundary can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum DynImage {
    /// 8-bit grayscale.
    Gray8(Image<u8, 1>),
    /// 8-bit RGB.
    Rgb8(Image<u8, 3>),
    /// 8-bit RGBA.
    Rgba8(Image<u8, 4>),
    /// 16-bit grayscale.
    Gray16(Image<u16, 1>),
    /// 16-bit RGB.
    Rgb16(Image<u16, 3>),
    /// 16-bit RGBA.
    Rgba16(Image<u16, 4>),
    /// 32-bit float grayscale.
    GrayF32(Image<f32, 1>),
    /// 32-bit float RGB.
    RgbF32(Image<f32, 3>),
}

impl DynImage {
    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            DynImage::Gray8(img) => img.size(),
            DynImage::Rgb8(img) => img.size(),
            DynImage::Rgba8(img) => img.size(),
            DynImage::Gray16(img) => img.size(),
            DynImage::Rgb16(img) => img.size(),
            DynImage::Rgba16(img) => img.size(),
            DynImage::GrayF32(img) => img.size(),
            DynImage::RgbF32(img) => img.size(),
        }
    }

    /// The dtype of the pixel data.
    pub fn dtype(&self) -> Dtype {
        match self {
            DynImage::Gray8(_) | DynImage::Rgb8(_) | DynImage::Rgba8(_) => Dtype::U8,
            DynImage::Gray16(_) | DynImage::Rgb16(_) | DynImage::Rgba16(_) => Dtype::U16,
            DynImage::GrayF32(_) | DynImage::RgbF32(_) => Dtype::F32,
        }
    }

    /// The number of channels.
    pub fn num_channels(&self) -> usize {
        match self {
            DynImage::Gray8(_) | DynImage::Gray16(_) | DynImage::GrayF32(_) => 1,
            DynImage::Rgb8(_) | DynImage::Rgb16(_) | DynImage::RgbF32(_) => 3,
            DynImage::Rgba8(_) | DynImage::Rgba16(_) => 4,
        }
    }

    /// Borrow the image as 8-bit grayscale, if that is what it holds.
    pub fn as_gray8(&self) -> Option<&Image<u8, 1>> {
        match self {
            DynImage::Gray8(img) => Some(img),
            _ => None,
        }
    }

    /// Borrow the image as 8-bit RGB, if that is what it holds.
    pub fn as_rgb8(&self) -> Option<&Image<u8, 3>> {
        match self {
            DynImage::Rgb8(img) => Some(img),
            _ => None,
        }
    }

    /// Consume the value, returning the 8-bit grayscale image if held.
    pub fn into_gray8(self) -> Option<Image<u8, 1>> {
        match self {
            DynImage::Gray8(img) => Some(img),
            _ => None,
        }
    }

    /// Consume the value, returning the 8-bit RGB image if held.
    pub fn into_rgb8(self) -> Option<Image<u8, 3>> {
        match self {
            DynImage::Rgb8(img) => Some(img),
            _ => None,
        }
    }
}

impl From<Image<u8, 1>> for DynImage {
    fn from(img: Image<u8, 1>) -> Self {
        DynImage::Gray8(img)
    }
}

impl From<Image<u8, 3>> for DynImage {
    fn from(img: Image<u8, 3>) -> Self {
        DynImage::Rgb8(img)
    }
}

impl From<Image<u8, 4>> for DynImage {
    fn from(img: Image<u8, 4>) -> Self {
        DynImage::Rgba8(img)
    }
}

impl From<Image<u16, 1>> for DynImage {
    fn from(img: Image<u16, 1>) -> Self {
        DynImage::Gray16(img)
    }
}

impl From<Image<u16, 3>> for DynImage {
    fn from(img: Image<u16, 3>) -> Self {
        DynImage::Rgb16(img)
    }
}

impl From<Image<u16, 4>> for DynImage {
    fn from(img: Image<u16, 4>) -> Self {
        DynImage::Rgba16(img)
    }
}

impl From<Image<f32, 1>> for DynImage {
    fn from(img: Image<f32, 1>) -> Self {
        DynImage::GrayF32(img)
    }
}

impl From<Image<f32, 3>> for DynImage {
    fn from(img: Image<f32, 3>) -> Self {
        DynImage::RgbF32(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        let img = Image::<u8, 3>::from_size_val([6, 4].into(), 0).unwrap();
        let dyn_img = DynImage::from(img);
        assert_eq!(dyn_img.size().width, 6);
        assert_eq!(dyn_img.size().height, 4);
        assert_eq!(dyn_img.dtype(), Dtype::U8);
        assert_eq!(dyn_img.num_channels(), 3);
        assert!(dyn_img.as_rgb8().is_some());
        assert!(dyn_img.as_gray8().is_none());
    }

    #[test]
    fn into_variants() {
        let img = Image::<u16, 1>::from_size_val([2, 2].into(), 1).unwrap();
        let dyn_img = DynImage::from(img);
        assert_eq!(dyn_img.dtype(), Dtype::U16);
        assert!(dyn_img.into_gray8().is_none());
    }
}
