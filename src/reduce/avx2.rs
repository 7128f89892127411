#![allow(clippy::undocumented_unsafe_blocks)]

use std::arch::x86_64::*;

use crate::{
    coefficients::Coefficients,
    image::{Sample, Storage},
    reduce::IntRounding,
};

const LANES: usize = 8;

/// Whether offsets of up to eight rows fit the 32-bit gather indices.
pub(super) fn fits_gather_offsets(src_width: usize) -> bool {
    src_width
        .checked_mul(LANES - 1)
        .is_some_and(|offset| offset <= i32::MAX as usize)
}

/// Horizontal resampling of single-channel 32-bit samples, eight rows at a time.
///
/// Each lane accumulates one row in the same order as the scalar path, with a
/// separate multiply and add, so results are bit-identical to it. Rows left
/// over after the last full group of eight go through the scalar path.
#[target_feature(enable = "avx2")]
pub(super) fn reduce_horizontal<T: Sample>(
    dest: &mut [T],
    src: &[T],
    src_width: usize,
    height: usize,
    coeffs: &Coefficients,
    rounding: IntRounding,
) {
    debug_assert!(T::STORAGE != Storage::U8);
    debug_assert!(fits_gather_offsets(src_width));

    let dest_width = coeffs.len();
    let groups = height / LANES;
    let mut sums = [0.0f32; LANES];

    unsafe {
        let stride = src_width as i32;
        let offsets = _mm256_setr_epi32(
            0,
            stride,
            stride * 2,
            stride * 3,
            stride * 4,
            stride * 5,
            stride * 6,
            stride * 7,
        );

        for group in 0..groups {
            let y0 = group * LANES;
            let src_rows = src.as_ptr().add(y0 * src_width);

            for (xx, window) in coeffs.windows().iter().enumerate() {
                let mut acc = _mm256_setzero_ps();
                for (i, &k) in coeffs.weights(window).iter().enumerate() {
                    let values = gather::<T>(src_rows.add(window.xmin + i), offsets);
                    acc = _mm256_add_ps(acc, _mm256_mul_ps(values, _mm256_set1_ps(k)));
                }

                _mm256_storeu_ps(sums.as_mut_ptr(), acc);
                for (lane, &sum) in sums.iter().enumerate() {
                    dest[(y0 + lane) * dest_width + xx] = T::finalize(sum, window.norm, rounding);
                }
            }
        }
    }

    let done = groups * LANES;
    super::rust::reduce_horizontal(
        &mut dest[done * dest_width..],
        &src[done * src_width..],
        src_width,
        height - done,
        1,
        coeffs,
        rounding,
    );
}

/// Loads one sample from each of eight rows starting at `base`, widened to `f32`.
#[target_feature(enable = "avx2")]
unsafe fn gather<T: Sample>(base: *const T, offsets: __m256i) -> __m256 {
    match T::STORAGE {
        Storage::F32 => _mm256_i32gather_ps::<4>(base as *const f32, offsets),
        Storage::I32 => {
            _mm256_cvtepi32_ps(_mm256_i32gather_epi32::<4>(base as *const i32, offsets))
        }
        Storage::U8 => unreachable!(),
    }
}
