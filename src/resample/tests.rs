#![allow(clippy::unwrap_used, reason = "allow in test files")]

use std::{
    cell::Cell,
    f32::consts::PI,
    sync::{Mutex, RwLock},
};

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use super::*;
use crate::image::Mode;

fn gray_row(data: &[u8]) -> Image {
    Image::from_vec(Mode::Gray, data.len(), 1, data.to_vec()).unwrap()
}

fn float_rows(data: &[f32], height: usize) -> Image {
    let pixels = data.iter().copied().cycle().take(data.len() * height).collect();
    Image::from_vec(Mode::F32, data.len(), height, pixels).unwrap()
}

#[test]
fn resize_bilinear_downscale() {
    let src = gray_row(&[10, 20, 30, 40, 50, 60, 70, 80]);
    let mut dest = Image::new(Mode::Gray, 4, 1).unwrap();

    resize(&mut dest, &src, Filter::Bilinear).unwrap();

    // The outer windows are truncated at the image edge and renormalized,
    // which pulls the first and last samples inwards.
    assert_eq!(dest.pixels::<u8>().unwrap(), &[17, 35, 55, 73]);
}

#[test]
fn resample_axis_bilinear_downscale() {
    let src = gray_row(&[10, 20, 30, 40, 50, 60, 70, 80]);
    let mut dest = Image::new(Mode::Gray, 4, 1).unwrap();

    resample_axis(&mut dest, &src, Filter::Bilinear).unwrap();

    assert_eq!(dest.pixels::<u8>().unwrap(), &[17, 35, 55, 73]);
}

#[test]
fn resize_averages_instead_of_aliasing() {
    let src = gray_row(&[0, 100, 0, 100]);
    let mut dest = Image::new(Mode::Gray, 2, 1).unwrap();

    resize(&mut dest, &src, Filter::Bilinear).unwrap();

    assert_eq!(dest.pixels::<u8>().unwrap(), &[43, 57]);
}

#[test]
fn resize_alternating_extremes_stays_in_range() {
    let src = gray_row(&[0, 255, 0, 255, 0, 255, 0, 255]);
    let mut dest = Image::new(Mode::Gray, 3, 1).unwrap();

    resize(&mut dest, &src, Filter::Bicubic).unwrap();

    assert_eq!(dest.pixels::<u8>().unwrap(), &[112, 128, 143]);
}

#[test]
fn same_size_is_identity() {
    let (width, height) = (13, 7);
    let rgb: Vec<u8> = (0..width * height * 3).map(|i| (i * 31 % 251) as u8).collect();
    let int: Vec<i32> = (0..(width * height) as i32).map(|i| i * 7919 - 40_000).collect();
    let float: Vec<f32> = (0..width * height).map(|i| (i as f32 * 0.37).sin() * 100.0).collect();
    let images = [
        Image::from_vec(Mode::Rgb, width, height, rgb).unwrap(),
        Image::from_vec(Mode::I32, width, height, int).unwrap(),
        Image::from_vec(Mode::F32, width, height, float).unwrap(),
    ];

    for src in &images {
        for filter in [Filter::Nearest, Filter::Bilinear, Filter::Bicubic] {
            let mut dest = Image::new(src.mode(), width, height).unwrap();
            resample_axis(&mut dest, src, filter).unwrap();
            assert_eq!(&dest, src, "resample_axis {} {filter}", src.mode());

            let mut dest = Image::new(src.mode(), width, height).unwrap();
            resize(&mut dest, src, filter).unwrap();
            assert_eq!(&dest, src, "resize {} {filter}", src.mode());
        }
    }
}

#[test]
fn antialias_same_size_is_identity_for_8_bit() {
    let data: Vec<u8> = (0..40 * 4).map(|i| (i * 13 % 256) as u8).collect();
    let src = Image::from_vec(Mode::GrayAlpha, 20, 4, data).unwrap();
    let mut dest = Image::new(Mode::GrayAlpha, 20, 4).unwrap();

    resize(&mut dest, &src, Filter::Antialias).unwrap();

    assert_eq!(dest, src);
}

#[test]
fn integer_rounding_order_is_selectable() {
    let src = Image::from_vec(Mode::I32, 8, 1, vec![9, 9, 1, 0, 0, 0, 0, 0]).unwrap();

    let mut legacy = Image::new(Mode::I32, 4, 1).unwrap();
    Resampler::new(Filter::Bilinear)
        .resample_axis(&mut legacy, &src)
        .unwrap();
    assert_eq!(legacy.pixels::<i32>().unwrap()[0], 6);

    let mut scaled = Image::new(Mode::I32, 4, 1).unwrap();
    Resampler::new(Filter::Bilinear)
        .int_rounding(IntRounding::ScaleThenTruncate)
        .resample_axis(&mut scaled, &src)
        .unwrap();
    assert_eq!(scaled.pixels::<i32>().unwrap()[0], 7);
}

#[test]
fn smooth_round_trip_stays_in_range() {
    let profile: Vec<f32> = (0..16)
        .map(|i| 127.5 - 127.5 * (PI * i as f32 / 15.0).cos())
        .collect();
    let src = float_rows(&profile, 2);

    for filter in Filter::ALL {
        let mut up = Image::new(Mode::F32, 40, 2).unwrap();
        resize(&mut up, &src, filter).unwrap();
        let mut back = Image::new(Mode::F32, 16, 2).unwrap();
        resize(&mut back, &up, filter).unwrap();

        for &v in back.pixels::<f32>().unwrap() {
            assert!((-0.5..=255.5).contains(&v), "{filter}: {v}");
        }
    }
}

#[test]
fn step_edge_overshoot_is_bounded() {
    let mut edge = vec![0.0f32; 8];
    edge.extend([255.0; 8]);
    let src = float_rows(&edge, 2);

    for filter in [Filter::Bicubic, Filter::Antialias] {
        let mut up = Image::new(Mode::F32, 40, 2).unwrap();
        resize(&mut up, &src, filter).unwrap();
        let mut back = Image::new(Mode::F32, 16, 2).unwrap();
        resize(&mut back, &up, filter).unwrap();

        // Cubic and windowed-sinc kernels ring at sharp edges, within a
        // fraction of the input range.
        let out = back.pixels::<f32>().unwrap();
        let min = out.iter().copied().fold(f32::INFINITY, f32::min);
        let max = out.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(min < 0.0 && max > 255.0, "{filter}: {min}..{max}");
        assert!(min > -0.1 * 255.0 && max < 1.1 * 255.0, "{filter}: {min}..{max}");
    }
}

#[test]
fn resize_rejects_palette_and_bilevel() {
    for mode in [Mode::Palette, Mode::Bilevel] {
        let src = Image::new(mode, 4, 4).unwrap();
        let mut dest = Image::new(mode, 2, 2).unwrap();
        assert_eq!(
            resize(&mut dest, &src, Filter::Nearest),
            Err(ResampleError::FormatMismatch)
        );
    }
}

#[test]
fn mismatched_modes_are_rejected() {
    let src = Image::new(Mode::Rgb, 4, 4).unwrap();
    let mut dest = Image::new(Mode::Rgba, 2, 4).unwrap();
    assert_eq!(
        resample_axis(&mut dest, &src, Filter::Bilinear),
        Err(ResampleError::FormatMismatch)
    );
    assert_eq!(
        resize(&mut dest, &src, Filter::Bilinear),
        Err(ResampleError::FormatMismatch)
    );
}

#[test]
fn resample_axis_requires_equal_heights() {
    let src = Image::new(Mode::Gray, 4, 4).unwrap();
    let mut dest = Image::new(Mode::Gray, 2, 3).unwrap();
    assert_eq!(
        resample_axis(&mut dest, &src, Filter::Bilinear),
        Err(ResampleError::value("resample_axis requires equal heights"))
    );
}

#[test]
fn empty_source_resamples_to_zero() {
    let src = Image::new(Mode::F32, 0, 2).unwrap();
    let mut dest = Image::from_vec(Mode::F32, 3, 2, vec![1.0f32; 6]).unwrap();

    resample_axis(&mut dest, &src, Filter::Bicubic).unwrap();

    assert_eq!(dest.pixels::<f32>().unwrap(), &[0.0; 6]);
}

#[test]
fn empty_destination_is_allowed() {
    let src = gray_row(&[1, 2, 3]);
    let mut dest = Image::new(Mode::Gray, 0, 0).unwrap();
    resize(&mut dest, &src, Filter::Antialias).unwrap();
    assert!(dest.pixels::<u8>().unwrap().is_empty());
}

struct Counting(Cell<usize>);

impl Section for Counting {
    type Guard<'a> = ();

    fn enter(&self) -> Self::Guard<'_> {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn section_is_entered_once_per_pass() {
    let section = Counting(Cell::new(0));
    let resampler = Resampler::new(Filter::Bicubic).section(&section);
    let src = Image::new(Mode::Rgba, 9, 5).unwrap();

    let mut dest = Image::new(Mode::Rgba, 4, 5).unwrap();
    resampler.resample_axis(&mut dest, &src).unwrap();
    assert_eq!(section.0.get(), 1);

    let mut dest = Image::new(Mode::Rgba, 4, 11).unwrap();
    resampler.resize(&mut dest, &src).unwrap();
    assert_eq!(section.0.get(), 3);
}

#[test]
fn locks_are_released_after_resize() {
    let src = gray_row(&[10, 20, 30, 40, 50, 60, 70, 80]);

    let rwlock = RwLock::new(());
    let mut dest = Image::new(Mode::Gray, 4, 1).unwrap();
    Resampler::new(Filter::Bilinear)
        .section(&rwlock)
        .resize(&mut dest, &src)
        .unwrap();
    assert!(rwlock.try_write().is_ok());

    let mutex = Mutex::new(());
    let mut dest2 = Image::new(Mode::Gray, 4, 1).unwrap();
    Resampler::new(Filter::Bilinear)
        .section(&mutex)
        .resize(&mut dest2, &src)
        .unwrap();
    assert!(mutex.try_lock().is_ok());

    assert_eq!(dest, dest2);
}

#[quickcheck]
fn flat_field_is_preserved(value: u8, src_w: u8, src_h: u8, dest_w: u8, dest_h: u8) -> TestResult {
    let dims = [src_w, src_h, dest_w, dest_h].map(|d| d as usize % 48 + 1);
    let [src_w, src_h, dest_w, dest_h] = dims;

    let src = Image::from_vec(Mode::Gray, src_w, src_h, vec![value; src_w * src_h]).unwrap();
    for filter in Filter::ALL {
        let mut dest = Image::new(Mode::Gray, dest_w, dest_h).unwrap();
        resize(&mut dest, &src, filter).unwrap();
        if dest.pixels::<u8>().unwrap().iter().any(|&v| v != value) {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[quickcheck]
fn binary_input_saturates_like_float(bits: Vec<bool>, dest_w: u8, filter: u8) -> TestResult {
    if bits.is_empty() {
        return TestResult::discard();
    }
    let dest_w = dest_w as usize % 64 + 1;
    let filter = Filter::ALL[filter as usize % 4];

    let bytes: Vec<u8> = bits.iter().map(|&b| if b { 255 } else { 0 }).collect();
    let floats: Vec<f32> = bytes.iter().map(|&v| f32::from(v)).collect();
    let src_u8 = gray_row(&bytes);
    let src_f32 = float_rows(&floats, 1);

    let mut dest_u8 = Image::new(Mode::Gray, dest_w, 1).unwrap();
    let mut dest_f32 = Image::new(Mode::F32, dest_w, 1).unwrap();
    resample_axis(&mut dest_u8, &src_u8, filter).unwrap();
    resample_axis(&mut dest_f32, &src_f32, filter).unwrap();

    // Both formats accumulate identically; 8-bit output is the float result
    // rounded and clamped to 0..=255.
    let expected = dest_f32.pixels::<f32>().unwrap().iter().map(|&v| {
        let v = v + 0.5;
        if v < 0.5 {
            0
        } else if v >= 255.0 {
            255
        } else {
            v as u8
        }
    });
    TestResult::from_bool(dest_u8.pixels::<u8>().unwrap().iter().copied().eq(expected))
}
