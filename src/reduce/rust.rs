use crate::{
    coefficients::Coefficients,
    image::Sample,
    reduce::IntRounding,
};

// Products are rounded before they are summed, exactly like the AVX2 backend.
#[allow(clippy::suboptimal_flops)]
pub(super) fn reduce_horizontal<T: Sample>(
    dest: &mut [T],
    src: &[T],
    src_width: usize,
    height: usize,
    channels: usize,
    coeffs: &Coefficients,
    rounding: IntRounding,
) {
    let src_stride = src_width * channels;
    let dest_stride = coeffs.len() * channels;

    for y in 0..height {
        let src_row = &src[y * src_stride..(y + 1) * src_stride];
        let dest_row = &mut dest[y * dest_stride..(y + 1) * dest_stride];

        for (window, out) in coeffs
            .windows()
            .iter()
            .zip(dest_row.chunks_exact_mut(channels))
        {
            let weights = coeffs.weights(window);
            let pixels = &src_row[window.xmin * channels..window.xmax * channels];

            for (c, out) in out.iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for (&k, px) in weights.iter().zip(pixels.chunks_exact(channels)) {
                    sum += px[c].to_f32() * k;
                }
                *out = T::finalize(sum, window.norm, rounding);
            }
        }
    }
}
