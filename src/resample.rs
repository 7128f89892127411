#[cfg(test)]
mod tests;

use log::debug;

use crate::{
    coefficients::Coefficients,
    error::{ResampleError, Result},
    filter::Filter,
    image::{Image, Sample, Storage},
    reduce::{IntRounding, reduce_horizontal},
    section::{Section, Unsynchronized},
    transpose::transpose,
};

/// Resamples images with one filter.
///
/// By default it uses the legacy integer rounding order and no
/// synchronization; use [`Resampler::section`] to hold a lock while samples
/// are accumulated.
pub struct Resampler<'s, S: Section + ?Sized = Unsynchronized> {
    filter: Filter,
    int_rounding: IntRounding,
    section: &'s S,
}

impl Resampler<'static> {
    #[must_use]
    pub const fn new(filter: Filter) -> Self {
        Self {
            filter,
            int_rounding: IntRounding::TruncateThenScale,
            section: &Unsynchronized,
        }
    }
}

impl Default for Resampler<'static> {
    fn default() -> Self {
        Self::new(Filter::default())
    }
}

impl<S: Section + ?Sized> Resampler<'_, S> {
    #[must_use]
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    #[must_use]
    pub fn int_rounding(self, int_rounding: IntRounding) -> Self {
        Self {
            int_rounding,
            ..self
        }
    }

    /// Enters `section` around every reduction pass.
    #[must_use]
    pub fn section<'t, T: Section + ?Sized>(self, section: &'t T) -> Resampler<'t, T> {
        Resampler {
            filter: self.filter,
            int_rounding: self.int_rounding,
            section,
        }
    }

    /// Resamples the rows of `src` into `dest`, changing only their width.
    ///
    /// Both images must share a mode and a height.
    pub fn resample_axis(&self, dest: &mut Image, src: &Image) -> Result<()> {
        if dest.mode() != src.mode() {
            return Err(ResampleError::FormatMismatch);
        }
        if dest.height() != src.height() {
            return Err(ResampleError::value("resample_axis requires equal heights"));
        }

        let coeffs = Coefficients::plan(src.width(), dest.width(), self.filter)?;
        match src.mode().storage() {
            Storage::U8 => self.reduce::<u8>(dest, src, &coeffs),
            Storage::I32 => self.reduce::<i32>(dest, src, &coeffs),
            Storage::F32 => self.reduce::<f32>(dest, src, &coeffs),
        }
    }

    fn reduce<T: Sample>(&self, dest: &mut Image, src: &Image, coeffs: &Coefficients) -> Result<()> {
        let channels = src.mode().channels();
        let (src_width, height) = (src.width(), src.height());
        let src = src.pixels::<T>().ok_or(ResampleError::FormatMismatch)?;
        let dest = dest.pixels_mut::<T>().ok_or(ResampleError::FormatMismatch)?;

        let _guard = self.section.enter();
        reduce_horizontal(dest, src, src_width, height, channels, coeffs, self.int_rounding);
        Ok(())
    }

    /// Resizes `src` to the dimensions of `dest`.
    ///
    /// Rows are resampled first, then the intermediate image is transposed so
    /// that its columns can be resampled as rows, and transposed back into
    /// `dest`. Palette and bilevel images are rejected.
    pub fn resize(&self, dest: &mut Image, src: &Image) -> Result<()> {
        let mode = src.mode();
        if !mode.is_interpolable() || dest.mode() != mode {
            return Err(ResampleError::FormatMismatch);
        }

        let (width, height) = (dest.width(), dest.height());
        debug!(
            "resize {} {}x{} -> {}x{} with {}",
            mode,
            src.width(),
            src.height(),
            width,
            height,
            self.filter
        );

        let mut rows = Image::new(mode, width, src.height())?;
        self.resample_axis(&mut rows, src)?;

        let mut columns = Image::new(mode, src.height(), width)?;
        transpose(&mut columns, &rows)?;
        drop(rows);

        let mut resized = Image::new(mode, height, width)?;
        self.resample_axis(&mut resized, &columns)?;
        drop(columns);

        transpose(dest, &resized)
    }
}

/// Resamples the rows of `src` into `dest` with the default settings of
/// [`Resampler::new`].
pub fn resample_axis(dest: &mut Image, src: &Image, filter: Filter) -> Result<()> {
    Resampler::new(filter).resample_axis(dest, src)
}

/// Resizes `src` to the dimensions of `dest` with the default settings of
/// [`Resampler::new`].
pub fn resize(dest: &mut Image, src: &Image, filter: Filter) -> Result<()> {
    Resampler::new(filter).resize(dest, src)
}
