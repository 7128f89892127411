
use std::num::NonZeroUsize;

use anyhow::{Result, anyhow, bail};
use vapoursynth::{
    format::{ColorFamily, Format, SampleType},
    frame::{FrameRef, FrameRefMut},
    node::Node,
    plugins::Filter as VsFilter,
    prelude::Property,
    video_info::Resolution,
};

use crate::{
    error::ResampleError,
    filter::Filter,
    image::{Image, Mode},
    resample::Resampler,
    util::{Pixel, plane_with_padding, plane_with_padding_mut, vs_bitblt},
};

/// Resizes every plane of a clip to a new resolution.
pub struct Resize<'core> {
    /// Input clip
    clip: Node<'core>,
    /// Output width of the luma plane.
    width: NonZeroUsize,
    /// Output height of the luma plane.
    height: NonZeroUsize,
    /// Resampling kernel.
    ///
    /// - 0 is nearest neighbour
    /// - 1 is antialias (Lanczos-3)
    /// - 2 is bilinear
    /// - 3 is bicubic
    filter: Filter,

    // Internal fields
    format: Format<'core>,
}

impl<'core> Resize<'core> {
    pub fn new(clip: Node<'core>, width: i64, height: i64, filter: Option<i64>) -> Result<Self> {
        // Parse arguments
        let filter = filter.map(Filter::try_from).unwrap_or(Ok(Filter::Bilinear))?;
        let (Some(width), Some(height)) = (positive(width), positive(height)) else {
            bail!("Resize: width and height must be positive");
        };

        // Validate video info
        let video_info = clip.info();
        if matches!(video_info.resolution, Property::Variable) {
            bail!("Resize: variable resolution input clips are not supported");
        }
        let format = match video_info.format {
            Property::Variable => {
                bail!("Resize: variable format input clips are not supported")
            }
            Property::Constant(format) => format,
        };
        match (format.sample_type(), format.bits_per_sample()) {
            (SampleType::Integer, 8) | (SampleType::Float, 32) => {}
            _ => bail!("Resize: input clip must be 8-bit integer or 32-bit float"),
        }
        if ![ColorFamily::Gray, ColorFamily::YUV, ColorFamily::RGB].contains(&format.color_family())
        {
            bail!("Resize: input clip must be GRAY, YUV or RGB");
        }

        let x_ratio_uv = 1usize << format.sub_sampling_w();
        let y_ratio_uv = 1usize << format.sub_sampling_h();
        if width.get() % x_ratio_uv != 0 || height.get() % y_ratio_uv != 0 {
            bail!(
                "Resize: output dimensions must be divisible by the chroma subsampling ({}x{})",
                x_ratio_uv,
                y_ratio_uv
            );
        }

        Ok(Self {
            clip,
            width,
            height,
            filter,
            format,
        })
    }

    fn get_frame_internal<T: Pixel>(
        &self,
        core: vapoursynth::core::CoreRef<'core>,
        context: vapoursynth::plugins::FrameContext,
        n: usize,
    ) -> Result<FrameRef<'core>> {
        let src = self
            .clip
            .get_frame_filter(context, n)
            .ok_or_else(|| anyhow!("Resize: called get_frame_filter before request_frame_filter"))?;

        // SAFETY: Every plane is fully written before returning
        let mut dest = unsafe {
            FrameRefMut::new_uninitialized(
                core,
                Some(&src),
                self.format,
                Resolution {
                    width: self.width.get(),
                    height: self.height.get(),
                },
            )
        };

        let resampler = Resampler::new(self.filter);
        let bytes_per_sample = size_of::<T>();
        for plane in 0..self.format.plane_count() {
            let src_plane = PlaneRef {
                width: src.width(plane),
                height: src.height(plane),
                stride: src.stride(plane) / bytes_per_sample,
            };
            let dest_plane = PlaneRef {
                width: dest.width(plane),
                height: dest.height(plane),
                stride: dest.stride(plane) / bytes_per_sample,
            };
            resize_plane(
                &resampler,
                plane_with_padding_mut::<T>(&mut dest, plane)?,
                dest_plane,
                plane_with_padding::<T>(&src, plane)?,
                src_plane,
            )?;
        }

        Ok(dest.into())
    }
}

fn positive(value: i64) -> Option<NonZeroUsize> {
    usize::try_from(value).ok().and_then(NonZeroUsize::new)
}

/// Dimensions of one plane inside a padded frame buffer, in samples.
#[derive(Debug, Clone, Copy)]
struct PlaneRef {
    width: usize,
    height: usize,
    stride: usize,
}

/// Resizes one plane as a single-channel image.
fn resize_plane<T: Pixel>(
    resampler: &Resampler<'_>,
    dest: &mut [T],
    dest_plane: PlaneRef,
    src: &[T],
    src_plane: PlaneRef,
) -> Result<()> {
    let mode = Mode::single_channel(T::STORAGE);

    let mut input = Image::new(mode, src_plane.width, src_plane.height)?;
    vs_bitblt(
        input
            .pixels_mut::<T>()
            .ok_or(ResampleError::FormatMismatch)?,
        src_plane.width,
        src,
        src_plane.stride,
        src_plane.width,
        src_plane.height,
    );

    let mut output = Image::new(mode, dest_plane.width, dest_plane.height)?;
    resampler.resize(&mut output, &input)?;
    drop(input);

    vs_bitblt(
        dest,
        dest_plane.stride,
        output.pixels::<T>().ok_or(ResampleError::FormatMismatch)?,
        dest_plane.width,
        dest_plane.width,
        dest_plane.height,
    );
    Ok(())
}

impl<'core> VsFilter<'core> for Resize<'core> {
    fn video_info(
        &self,
        _api: vapoursynth::prelude::API,
        _core: vapoursynth::core::CoreRef<'core>,
    ) -> Vec<vapoursynth::video_info::VideoInfo<'core>> {
        let mut info = self.clip.info();
        info.resolution = Property::Constant(Resolution {
            width: self.width.get(),
            height: self.height.get(),
        });
        vec![info]
    }

    fn get_frame_initial(
        &self,
        _api: vapoursynth::prelude::API,
        _core: vapoursynth::core::CoreRef<'core>,
        context: vapoursynth::plugins::FrameContext,
        n: usize,
    ) -> std::result::Result<Option<vapoursynth::prelude::FrameRef<'core>>, anyhow::Error> {
        self.clip.request_frame_filter(context, n);
        Ok(None)
    }

    fn get_frame(
        &self,
        _api: vapoursynth::prelude::API,
        core: vapoursynth::core::CoreRef<'core>,
        context: vapoursynth::plugins::FrameContext,
        n: usize,
    ) -> std::result::Result<vapoursynth::prelude::FrameRef<'core>, anyhow::Error> {
        match self.format.sample_type() {
            SampleType::Integer => self.get_frame_internal::<u8>(core, context, n),
            SampleType::Float => self.get_frame_internal::<f32>(core, context, n),
        }
    }
}
