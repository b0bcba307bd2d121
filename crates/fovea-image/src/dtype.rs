/// Tag identifying the pixel dtype of an image at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// 8-bit unsigned integer pixels.
    U8,
    /// 16-bit unsigned integer pixels.
    U16,
    /// 16-bit signed integer pixels.
    I16,
    /// 32-bit signed integer pixels.
    I32,
    /// 32-bit floating point pixels.
    F32,
    /// 64-bit floating point pixels.
    F64,
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Dtype::U8 => "u8",
            Dtype::U16 => "u16",
            Dtype::I16 => "i16",
            Dtype::I32 => "i32",
            Dtype::F32 => "f32",
            Dtype::F64 => "f64",
        };
        write!(f, "{}", name)
    }
}

mod private {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Trait for the pixel data types an [`Image`](crate::Image) can carry.
///
/// The set is closed: u8, u16, i16, i32, f32 and f64. The trait is sealed so
/// downstream code can rely on [`Dtype`] covering every implementor.
pub trait PixelData:
    private::Sealed
    + Copy
    + Default
    + PartialOrd
    + Send
    + Sync
    + num_traits::NumCast
    + num_traits::ToPrimitive
    + 'static
{
    /// The runtime tag for this dtype.
    const DTYPE: Dtype;
}

impl PixelData for u8 {
    const DTYPE: Dtype = Dtype::U8;
}

impl PixelData for u16 {
    const DTYPE: Dtype = Dtype::U16;
}

impl PixelData for i16 {
    const DTYPE: Dtype = Dtype::I16;
}

impl PixelData for i32 {
    const DTYPE: Dtype = Dtype::I32;
}

impl PixelData for f32 {
    const DTYPE: Dtype = Dtype::F32;
}

impl PixelData for f64 {
    const DTYPE: Dtype = Dtype::F64;
}
