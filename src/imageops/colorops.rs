//! Functions for altering the color of an image in place.
use std::str::FromStr;

use log::trace;
use num_traits::clamp;

use crate::image::{Pixel, RasterImage};
use crate::{ImageError, ImageResult};

/// How [`brightness`] combines a channel with its factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessMethod {
    /// `c + factor`
    Add,
    /// `c * factor`
    Multiply,
}

impl FromStr for BrightnessMethod {
    type Err = ImageError;

    /// Parse `"add"` or `"multiply"`.
    fn from_str(s: &str) -> ImageResult<BrightnessMethod> {
        match s {
            "add" => Ok(BrightnessMethod::Add),
            "multiply" => Ok(BrightnessMethod::Multiply),
            _ => Err(ImageError::ValueError(
                "method must be add or multiply".to_owned(),
            )),
        }
    }
}

/// Clamp `value` to the channel range and truncate it.
fn to_channel(value: f64) -> u8 {
    clamp(value, 0.0, 255.0) as u8
}

/// Invert each channel of `image`.
pub fn invert(image: &mut RasterImage) {
    for pixel in image.pixels_mut() {
        pixel.apply(|c| 255 - c);
    }
}

/// Replace each pixel with the truncated average of its three channels.
pub fn grayscale(image: &mut RasterImage) {
    for pixel in image.pixels_mut() {
        let avg = (u16::from(pixel.r) + u16::from(pixel.g) + u16::from(pixel.b)) / 3;
        *pixel = gray(avg as u8);
    }
}

/// Replace each pixel with its ITU-R 601-2 luma.
///
/// Each weighted term is truncated on its own, so `(100, 150, 200)` maps to
/// `29 + 88 + 22 = 139`.
pub fn grayscale_luma(image: &mut RasterImage) {
    for pixel in image.pixels_mut() {
        let luma = u32::from(pixel.r) * 299 / 1000
            + u32::from(pixel.g) * 587 / 1000
            + u32::from(pixel.b) * 114 / 1000;
        *pixel = gray(luma as u8);
    }
}

fn gray(value: u8) -> Pixel {
    Pixel::new(value, value, value)
}

/// Brighten or darken every channel by `factor`.
///
/// Results are clamped to `[0, 255]` per channel.
pub fn brightness(image: &mut RasterImage, factor: f64, method: BrightnessMethod) {
    let op: fn(f64, f64) -> f64 = match method {
        BrightnessMethod::Add => |c, factor| c + factor,
        BrightnessMethod::Multiply => |c, factor| c * factor,
    };

    for pixel in image.pixels_mut() {
        pixel.apply(|c| to_channel(op(f64::from(c), factor)));
    }
}

/// Scale the spread of every channel around that channel's mean.
///
/// `factor` above 1.0 increases contrast, below 1.0 reduces it, and 1.0
/// leaves the image unchanged. The means are truncated to whole values.
pub fn contrast(image: &mut RasterImage, factor: f64) {
    let total = image.pixels().len() as u64;
    if total == 0 {
        return;
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, c) in sums.iter_mut().zip(pixel.channels().iter()) {
            *sum += u64::from(*c);
        }
    }
    let mean = |sum: u64| (sum / total) as f64;
    let (mean_r, mean_g, mean_b) = (mean(sums[0]), mean(sums[1]), mean(sums[2]));
    trace!("contrast {} around means ({}, {}, {})", factor, mean_r, mean_g, mean_b);

    let adjust = |c: u8, mean: f64| to_channel(f64::from(c) * factor + (1.0 - factor) * mean);
    for pixel in image.pixels_mut() {
        *pixel = Pixel::new(
            adjust(pixel.r, mean_r),
            adjust(pixel.g, mean_g),
            adjust(pixel.b, mean_b),
        );
    }
}
