
use log::trace;

use crate::{
    error::{ResampleError, Result},
    filter::Filter,
};

/// The input samples contributing to one output sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// First contributing input index.
    pub xmin: usize,
    /// One past the last contributing input index.
    pub xmax: usize,
    /// Reciprocal of the summed weights, or `1.0` if they sum to zero.
    pub norm: f32,
    offset: usize,
}

impl Window {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.xmax - self.xmin
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.xmax == self.xmin
    }
}

/// Resampling weights for every output position along one axis.
///
/// Weights are stored unnormalized in one flat buffer; each [`Window`]
/// indexes its own slice of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    windows: Vec<Window>,
    weights: Vec<f32>,
}

impl Coefficients {
    /// Plans the resampling of `src_len` input samples onto `dest_len`
    /// output samples.
    ///
    /// When downscaling, the kernel is stretched by the scale factor so that
    /// every input sample contributes. When upscaling, it keeps its native
    /// width.
    pub fn plan(src_len: usize, dest_len: usize, filter: Filter) -> Result<Self> {
        let mut windows = Vec::new();
        windows
            .try_reserve_exact(dest_len)
            .map_err(|_| ResampleError::AllocationFailure)?;
        if dest_len == 0 {
            return Ok(Self {
                windows,
                weights: Vec::new(),
            });
        }

        let scale = src_len as f32 / dest_len as f32;
        let filterscale = scale.max(1.0);
        let support = filter.support() * filterscale;
        let ss = 1.0 / filterscale;

        // Upper bound on the window length, with room for rounding.
        let kmax = support.ceil() as usize * 2 + 1;
        let mut weights = Vec::new();
        weights
            .try_reserve(dest_len.saturating_mul(kmax).min(dest_len.saturating_mul(src_len)))
            .map_err(|_| ResampleError::AllocationFailure)?;

        let src_limit = src_len as f32;
        for xx in 0..dest_len {
            let center = (xx as f32 + 0.5) * scale;
            let xmax = (center + support).ceil().min(src_limit).max(0.0) as usize;
            let xmin = ((center - support).floor().max(0.0) as usize).min(xmax);

            let offset = weights.len();
            let mut total = 0.0f32;
            for x in xmin..xmax {
                // The kernel argument is formed in double precision.
                let arg = (f64::from(x as f32 - center) + 0.5) * f64::from(ss);
                let w = filter.eval(arg as f32) * ss;
                weights.push(w);
                total += w;
            }

            windows.push(Window {
                xmin,
                xmax,
                norm: if total == 0.0 { 1.0 } else { 1.0 / total },
                offset,
            });
        }

        trace!(
            "planned {} -> {} with {} (scale {}, support {}, {} taps)",
            src_len,
            dest_len,
            filter,
            scale,
            support,
            weights.len()
        );

        Ok(Self { windows, weights })
    }

    /// Number of output positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    #[must_use]
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Unnormalized weights of `window`, one per input sample in
    /// `xmin..xmax`.
    #[must_use]
    pub fn weights(&self, window: &Window) -> &[f32] {
        &self.weights[window.offset..window.offset + window.len()]
    }
}
