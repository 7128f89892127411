#[cfg(target_arch = "x86_64")]
mod avx2;
mod rust;


use cfg_if::cfg_if;

use crate::{
    coefficients::Coefficients,
    image::{Sample, Storage},
};

/// Order of operations when finalizing 32-bit integer samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntRounding {
    /// `(int) sum * norm`: the weighted sum is truncated before it is scaled
    /// by the normalization factor, and the product is truncated again.
    /// Matches legacy output bit for bit.
    #[default]
    TruncateThenScale,
    /// `(int) (sum * norm)`: a single truncation after scaling.
    ScaleThenTruncate,
}

/// Resamples every row of `src` along the horizontal axis.
///
/// For each row and each output column, the input samples in the planned
/// window are accumulated with their weights, then scaled by the window's
/// normalization factor and converted back with [`Sample::finalize`].
/// Channels are interleaved and resampled independently.
///
/// # Parameters
/// - `dest`: Destination samples, `coeffs.len() * channels` per row
/// - `src`: Source samples, `src_width * channels` per row
/// - `src_width`: Width of the source image in pixels
/// - `height`: Number of rows in both buffers
/// - `channels`: Number of interleaved lanes per pixel
/// - `coeffs`: Coefficients planned for `src_width -> coeffs.len()`
/// - `rounding`: Finalization order for 32-bit integer samples
pub fn reduce_horizontal<T: Sample>(
    dest: &mut [T],
    src: &[T],
    src_width: usize,
    height: usize,
    channels: usize,
    coeffs: &Coefficients,
    rounding: IntRounding,
) {
    // For performance reasons, check the array bounds once at the start.
    assert!(channels > 0);
    assert!(
        src_width
            .checked_mul(channels)
            .and_then(|n| n.checked_mul(height))
            .is_some_and(|n| src.len() >= n)
    );
    assert!(
        coeffs
            .len()
            .checked_mul(channels)
            .and_then(|n| n.checked_mul(height))
            .is_some_and(|n| dest.len() >= n)
    );

    cfg_if! {
        if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
            if channels == 1
                && T::STORAGE != Storage::U8
                && avx2::fits_gather_offsets(src_width)
                && crate::util::has_avx2()
            {
                // SAFETY: We check for AVX2 first
                unsafe {
                    avx2::reduce_horizontal(dest, src, src_width, height, coeffs, rounding);
                }
                return;
            }
        }
    }

    rust::reduce_horizontal(dest, src, src_width, height, channels, coeffs, rounding);
}
