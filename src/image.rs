
use std::{fmt, str::FromStr};

use crate::{
    error::{ResampleError, Result},
    reduce::IntRounding,
};

/// Pixel mode of an [`Image`].
///
/// Every 8-bit mode is stored as plain interleaved lanes, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// 1-bit bilevel, stored one byte per pixel.
    Bilevel,
    Gray,
    /// 8-bit palette indices.
    Palette,
    GrayAlpha,
    Rgb,
    Rgba,
    Cmyk,
    YCbCr,
    I32,
    F32,
}

/// Sample type backing a [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    U8,
    I32,
    F32,
}

impl Mode {
    /// Number of interleaved lanes per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Bilevel | Self::Gray | Self::Palette | Self::I32 | Self::F32 => 1,
            Self::GrayAlpha => 2,
            Self::Rgb | Self::YCbCr => 3,
            Self::Rgba | Self::Cmyk => 4,
        }
    }

    #[must_use]
    pub const fn storage(self) -> Storage {
        match self {
            Self::I32 => Storage::I32,
            Self::F32 => Storage::F32,
            _ => Storage::U8,
        }
    }

    /// Whether sample values can be meaningfully interpolated.
    ///
    /// Palette indices and bilevel pixels cannot.
    #[must_use]
    pub const fn is_interpolable(self) -> bool {
        !matches!(self, Self::Bilevel | Self::Palette)
    }

    /// Single-channel mode for the given storage.
    #[must_use]
    pub const fn single_channel(storage: Storage) -> Self {
        match storage {
            Storage::U8 => Self::Gray,
            Storage::I32 => Self::I32,
            Storage::F32 => Self::F32,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bilevel => "1",
            Self::Gray => "L",
            Self::Palette => "P",
            Self::GrayAlpha => "LA",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
            Self::Cmyk => "CMYK",
            Self::YCbCr => "YCbCr",
            Self::I32 => "I",
            Self::F32 => "F",
        }
    }
}

impl FromStr for Mode {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "1" => Self::Bilevel,
            "L" => Self::Gray,
            "P" => Self::Palette,
            "LA" => Self::GrayAlpha,
            "RGB" => Self::Rgb,
            "RGBA" => Self::Rgba,
            "CMYK" => Self::Cmyk,
            "YCbCr" => Self::YCbCr,
            "I" => Self::I32,
            "F" => Self::F32,
            _ => return Err(ResampleError::FormatMismatch),
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Buffer {
    U8(Vec<u8>),
    I32(Vec<i32>),
    F32(Vec<f32>),
}

/// A 2-D grid of interleaved pixels in row-major order.
///
/// The buffer is zero-initialized on allocation and released on drop.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    mode: Mode,
    width: usize,
    height: usize,
    buffer: Buffer,
}

impl Image {
    /// Allocates a zeroed image.
    ///
    /// Fails with [`ResampleError::AllocationFailure`] if the buffer cannot
    /// be reserved or its size overflows.
    pub fn new(mode: Mode, width: usize, height: usize) -> Result<Self> {
        let len = buffer_len(mode, width, height)?;
        let buffer = match mode.storage() {
            Storage::U8 => Buffer::U8(zeroed(len)?),
            Storage::I32 => Buffer::I32(zeroed(len)?),
            Storage::F32 => Buffer::F32(zeroed(len)?),
        };
        Ok(Self {
            mode,
            width,
            height,
            buffer,
        })
    }

    /// Wraps an existing interleaved buffer.
    pub fn from_vec<T: Sample>(
        mode: Mode,
        width: usize,
        height: usize,
        data: Vec<T>,
    ) -> Result<Self> {
        if mode.storage() != T::STORAGE {
            return Err(ResampleError::FormatMismatch);
        }
        let len = buffer_len(mode, width, height)?;
        if data.len() != len {
            return Err(ResampleError::value(format!(
                "buffer holds {} samples, {}x{} {} image needs {}",
                data.len(),
                width,
                height,
                mode,
                len
            )));
        }
        Ok(Self {
            mode,
            width,
            height,
            buffer: T::wrap(data),
        })
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of samples in one row.
    #[must_use]
    pub const fn row_len(&self) -> usize {
        self.width * self.mode.channels()
    }

    /// All samples, or `None` if `T` does not match the image storage.
    #[must_use]
    pub fn pixels<T: Sample>(&self) -> Option<&[T]> {
        T::view(&self.buffer)
    }

    pub fn pixels_mut<T: Sample>(&mut self) -> Option<&mut [T]> {
        T::view_mut(&mut self.buffer)
    }

    /// Samples of row `y`.
    #[must_use]
    pub fn row<T: Sample>(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let len = self.row_len();
        self.pixels::<T>().map(|px| &px[y * len..(y + 1) * len])
    }

    pub fn into_vec<T: Sample>(self) -> Option<Vec<T>> {
        T::unwrap(self.buffer)
    }
}

fn buffer_len(mode: Mode, width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(mode.channels()))
        .ok_or(ResampleError::AllocationFailure)
}

fn zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| ResampleError::AllocationFailure)?;
    data.resize(len, T::default());
    Ok(data)
}

#[allow(private_interfaces)]
mod sealed {
    use super::Buffer;

    pub trait Sealed: Sized {
        fn view(buffer: &Buffer) -> Option<&[Self]>;
        fn view_mut(buffer: &mut Buffer) -> Option<&mut [Self]>;
        fn wrap(data: Vec<Self>) -> Buffer;
        fn unwrap(buffer: Buffer) -> Option<Vec<Self>>;
    }

    macro_rules! impl_sealed {
        ($ty:ty, $variant:ident) => {
            impl Sealed for $ty {
                fn view(buffer: &Buffer) -> Option<&[Self]> {
                    match buffer {
                        Buffer::$variant(data) => Some(data.as_slice()),
                        _ => None,
                    }
                }

                fn view_mut(buffer: &mut Buffer) -> Option<&mut [Self]> {
                    match buffer {
                        Buffer::$variant(data) => Some(data.as_mut_slice()),
                        _ => None,
                    }
                }

                fn wrap(data: Vec<Self>) -> Buffer {
                    Buffer::$variant(data)
                }

                fn unwrap(buffer: Buffer) -> Option<Vec<Self>> {
                    match buffer {
                        Buffer::$variant(data) => Some(data),
                        _ => None,
                    }
                }
            }
        };
    }

    impl_sealed!(u8, U8);
    impl_sealed!(i32, I32);
    impl_sealed!(f32, F32);
}

/// A sample type an [`Image`] can be stored in.
pub trait Sample: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    const STORAGE: Storage;

    /// Widens the sample for weighted accumulation.
    fn to_f32(self) -> f32;

    /// Converts a weighted sum back to a sample, given the window's
    /// normalization factor.
    fn finalize(sum: f32, norm: f32, rounding: IntRounding) -> Self;
}

impl Sample for u8 {
    const STORAGE: Storage = Storage::U8;

    #[inline]
    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    /// Round half up by truncation after a `+0.5` bias, saturating to `0..=255`.
    #[inline]
    #[allow(clippy::suboptimal_flops)]
    fn finalize(sum: f32, norm: f32, _rounding: IntRounding) -> Self {
        let value = sum * norm + 0.5;
        if value < 0.5 {
            0
        } else if value >= 255.0 {
            u8::MAX
        } else {
            value as u8
        }
    }
}

impl Sample for i32 {
    const STORAGE: Storage = Storage::I32;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn finalize(sum: f32, norm: f32, rounding: IntRounding) -> Self {
        match rounding {
            IntRounding::TruncateThenScale => ((sum as i32) as f32 * norm) as i32,
            IntRounding::ScaleThenTruncate => (sum * norm) as i32,
        }
    }
}

impl Sample for f32 {
    const STORAGE: Storage = Storage::F32;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn finalize(sum: f32, norm: f32, _rounding: IntRounding) -> Self {
        sum * norm
    }
}
