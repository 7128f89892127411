
use crate::{
    error::{ResampleError, Result},
    image::{Image, Sample, Storage},
};

/// Side length of the square tiles copied at a time, in pixels.
const BLOCK: usize = 64;

/// Writes the transpose of `src` into `dest`, so that
/// `dest[x][y] == src[y][x]` for every pixel.
///
/// `dest` must have the same mode as `src` with width and height swapped.
pub fn transpose(dest: &mut Image, src: &Image) -> Result<()> {
    if dest.mode() != src.mode() {
        return Err(ResampleError::FormatMismatch);
    }
    if dest.width() != src.height() || dest.height() != src.width() {
        return Err(ResampleError::value(format!(
            "cannot transpose {}x{} into {}x{}",
            src.width(),
            src.height(),
            dest.width(),
            dest.height()
        )));
    }

    match src.mode().storage() {
        Storage::U8 => transpose_typed::<u8>(dest, src),
        Storage::I32 => transpose_typed::<i32>(dest, src),
        Storage::F32 => transpose_typed::<f32>(dest, src),
    }
}

fn transpose_typed<T: Sample>(dest: &mut Image, src: &Image) -> Result<()> {
    let channels = src.mode().channels();
    let (width, height) = (src.width(), src.height());
    let src = src.pixels::<T>().ok_or(ResampleError::FormatMismatch)?;
    let dest = dest.pixels_mut::<T>().ok_or(ResampleError::FormatMismatch)?;

    transpose_blocked(dest, src, width, height, channels);
    Ok(())
}

/// Transposes a `width x height` grid of `channels`-lane pixels, tile by tile
/// so that both the reads and the writes stay within a few cache lines.
fn transpose_blocked<T: Copy>(
    dest: &mut [T],
    src: &[T],
    width: usize,
    height: usize,
    channels: usize,
) {
    let src_stride = width * channels;
    let dest_stride = height * channels;

    for y0 in (0..height).step_by(BLOCK) {
        let y1 = (y0 + BLOCK).min(height);
        for x0 in (0..width).step_by(BLOCK) {
            let x1 = (x0 + BLOCK).min(width);
            for y in y0..y1 {
                let src_row = &src[y * src_stride..(y + 1) * src_stride];
                for x in x0..x1 {
                    let from = x * channels;
                    let to = x * dest_stride + y * channels;
                    dest[to..to + channels].copy_from_slice(&src_row[from..from + channels]);
                }
            }
        }
    }
}
