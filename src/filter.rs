
use std::{f64::consts::PI, fmt, str::FromStr};

use crate::error::{ResampleError, Result};

/// Interpolation kernel used to compute resampling weights.
///
/// The integer values match the legacy filter tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    Nearest = 0,
    /// Lanczos-3, a sinc windowed by a wider sinc.
    Antialias = 1,
    #[default]
    Bilinear = 2,
    Bicubic = 3,
}

impl Filter {
    pub const ALL: [Filter; 4] = [
        Filter::Nearest,
        Filter::Antialias,
        Filter::Bilinear,
        Filter::Bicubic,
    ];

    /// Half-width, in input samples, beyond which the kernel is exactly zero.
    #[must_use]
    pub const fn support(self) -> f32 {
        match self {
            Self::Nearest => 0.5,
            Self::Bilinear => 1.0,
            Self::Bicubic => 2.0,
            Self::Antialias => 3.0,
        }
    }

    /// Evaluates the kernel at offset `x` from the sample center.
    #[must_use]
    pub fn eval(self, x: f32) -> f32 {
        match self {
            Self::Nearest => nearest(x),
            Self::Bilinear => bilinear(x),
            Self::Bicubic => bicubic(x),
            Self::Antialias => lanczos3(x),
        }
    }
}

#[inline]
fn nearest(x: f32) -> f32 {
    if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 }
}

#[inline]
fn bilinear(x: f32) -> f32 {
    let x = x.abs();
    if x < 1.0 { 1.0 - x } else { 0.0 }
}

/// Cubic convolution with `a = -0.5`, evaluated in double precision.
#[inline]
#[allow(clippy::suboptimal_flops)]
fn bicubic(x: f32) -> f32 {
    const A: f64 = -0.5;

    let x = f64::from(x.abs());
    let y = if x < 1.0 {
        ((A + 2.0) * x - (A + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        (((x - 5.0) * x + 8.0) * x - 4.0) * A
    } else {
        0.0
    };
    y as f32
}

/// Normalized sinc, with `sinc(0) = 1`.
#[inline]
fn sinc(x: f32) -> f32 {
    if x == 0.0 {
        return 1.0;
    }
    // The argument is rounded to f32 before the division.
    let x = f64::from((f64::from(x) * PI) as f32);
    (x.sin() / x) as f32
}

#[inline]
fn lanczos3(x: f32) -> f32 {
    if (-3.0..3.0).contains(&x) {
        sinc(x) * sinc(x / 3.0)
    } else {
        0.0
    }
}

impl TryFrom<i64> for Filter {
    type Error = ResampleError;

    fn try_from(val: i64) -> Result<Self> {
        Ok(match val {
            0 => Self::Nearest,
            1 => Self::Antialias,
            2 => Self::Bilinear,
            3 => Self::Bicubic,
            _ => {
                return Err(ResampleError::value(format!(
                    "unsupported resampling filter {val}, must be 0-3"
                )));
            }
        })
    }
}

impl FromStr for Filter {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "nearest" => Self::Nearest,
            "antialias" | "lanczos" => Self::Antialias,
            "bilinear" => Self::Bilinear,
            "bicubic" => Self::Bicubic,
            _ => {
                return Err(ResampleError::value(format!(
                    "unsupported resampling filter '{s}'"
                )));
            }
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nearest => "nearest",
            Self::Antialias => "antialias",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
        })
    }
}
