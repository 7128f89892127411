
use anyhow::{Result, bail};
use core::slice;
use std::mem::transmute;

use vapoursynth::{frame::Frame, prelude::Component};

use crate::image::Sample;

#[cfg(target_arch = "x86_64")]
cpufeatures::new!(cpuid_avx2, "avx2");

#[cfg(target_arch = "x86_64")]
pub use cpuid_avx2::get as has_avx2;

/// A sample type that can be both resampled and read from a VapourSynth frame.
pub trait Pixel: Sample + Component {}

impl<T> Pixel for T where T: Sample + Component {}

/// Copies `height` rows of `row_size` samples between two buffers whose
/// rows are `src_stride` and `dest_stride` samples apart.
///
/// When both strides equal the row size, the rows are copied in a single
/// block.
pub fn vs_bitblt<T: Copy>(
    dest: &mut [T],
    dest_stride: usize,
    src: &[T],
    src_stride: usize,
    row_size: usize,
    height: usize,
) {
    if src_stride == dest_stride && src_stride == row_size {
        dest[..row_size * height].copy_from_slice(&src[..row_size * height]);
    } else {
        for i in 0..height {
            let src_start = i * src_stride;
            let dest_start = i * dest_stride;
            dest[dest_start..dest_start + row_size]
                .copy_from_slice(&src[src_start..src_start + row_size]);
        }
    }
}

/// Gets a slice to the plane's data including its padding.
/// The `plane` function in Vapoursynth fails if a plane has padding,
/// so rows are addressed through the frame's stride instead.
pub fn plane_with_padding<'a, T: Pixel>(frame: &'a Frame, plane: usize) -> Result<&'a [T]> {
    if frame.format().plane_count() < plane + 1 {
        bail!("Tried to get plane not present in frame");
    }

    let data_ptr = frame.data_ptr(plane);
    let stride = frame.stride(plane);
    let height = frame.height(plane);
    let bytes_per_pixel = size_of::<T>();

    // SAFETY: We know the layout of the plane
    Ok(unsafe {
        slice::from_raw_parts(
            transmute::<*const u8, *const T>(data_ptr),
            stride * height / bytes_per_pixel,
        )
    })
}

/// Mutable counterpart of [`plane_with_padding`].
pub fn plane_with_padding_mut<'a, T: Pixel>(
    frame: &'a mut Frame,
    plane: usize,
) -> Result<&'a mut [T]> {
    if frame.format().plane_count() < plane + 1 {
        bail!("Tried to get plane not present in frame");
    }

    let data_ptr = frame.data_ptr_mut(plane);
    let stride = frame.stride(plane);
    let height = frame.height(plane);
    let bytes_per_pixel = size_of::<T>();

    // SAFETY: We know the layout of the plane
    Ok(unsafe {
        slice::from_raw_parts_mut(
            transmute::<*mut u8, *mut T>(data_ptr),
            stride * height / bytes_per_pixel,
        )
    })
}
