//! Image Processing Functions
use std::str::FromStr;

use log::trace;

use crate::image::{Pixel, RasterImage};
use crate::{ImageError, ImageResult};

pub mod colorops;

pub use self::colorops::{brightness, contrast, grayscale, grayscale_luma, invert, BrightnessMethod};

/// A color channel of a [`Pixel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl FromStr for Channel {
    type Err = ImageError;

    /// Parse `"red"`, `"green"` or `"blue"`.
    fn from_str(s: &str) -> ImageResult<Channel> {
        match s {
            "red" => Ok(Channel::Red),
            "green" => Ok(Channel::Green),
            "blue" => Ok(Channel::Blue),
            _ => Err(ImageError::ValueError(
                "only red, green, and blue are supported".to_owned(),
            )),
        }
    }
}

/// Return a copy of the `width` x `height` rectangle whose top-left corner
/// is at `(x, y)`.
///
/// The source image is left untouched. The result keeps the source headers
/// apart from the size fields, which describe the cropped grid.
pub fn crop(image: &RasterImage, x: u32, y: u32, width: u32, height: u32) -> ImageResult<RasterImage> {
    if width == 0 {
        return Err(ImageError::ValueError("width must be > 0".to_owned()));
    }
    if height == 0 {
        return Err(ImageError::ValueError("height must be > 0".to_owned()));
    }
    if x.checked_add(width).map_or(true, |right| right > image.width()) {
        return Err(ImageError::ValueError("width out of bounds".to_owned()));
    }
    if y.checked_add(height).map_or(true, |bottom| bottom > image.height()) {
        return Err(ImageError::ValueError("height out of bounds".to_owned()));
    }
    trace!("crop {}x{} at ({}, {})", width, height, x, y);

    let (x, width, height) = (x as usize, width as usize, height as usize);
    let mut pixels = Vec::with_capacity(width * height);
    for row in image.rows().skip(y as usize).take(height) {
        pixels.extend_from_slice(&row[x..x + width]);
    }

    Ok(image.with_pixels(width, height, pixels))
}

/// Return a copy of `image` in which every channel except `channel` is zero.
pub fn get_channel(image: &RasterImage, channel: Channel) -> RasterImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = match channel {
            Channel::Red => Pixel::new(pixel.r, 0, 0),
            Channel::Green => Pixel::new(0, pixel.g, 0),
            Channel::Blue => Pixel::new(0, 0, pixel.b),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A `width` x `height` image where pixel (x, y) is (x, y, x + y).
    fn gradient(width: u32, height: u32) -> RasterImage {
        let mut img = RasterImage::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                img.put_pixel(x, y, Pixel::new(x as u8, y as u8, (x + y) as u8));
            }
        }
        img
    }

    #[test]
    fn crop_copies_the_rectangle() {
        let img = gradient(6, 5);
        let cropped = crop(&img, 1, 2, 3, 2).unwrap();

        assert_eq!(cropped.dimensions(), (3, 2));
        assert_eq!(*cropped.get_pixel(0, 0), Pixel::new(1, 2, 3));
        assert_eq!(*cropped.get_pixel(2, 1), Pixel::new(3, 3, 6));

        assert_eq!(cropped.stride(), 12);
        assert_eq!(cropped.padding(), 3);
        assert_eq!(cropped.info_header().width, 3);
        assert_eq!(cropped.info_header().height, 2);
        assert_eq!(cropped.info_header().size_image, 24);
        assert_eq!(cropped.file_header().size, 54 + 24);

        // source untouched
        assert_eq!(img, gradient(6, 5));
    }

    #[test]
    fn crop_of_full_bounds_is_a_copy() {
        let img = gradient(5, 3);
        assert_eq!(crop(&img, 0, 0, 5, 3).unwrap(), img);
    }

    #[test]
    fn crop_rejects_out_of_bounds() {
        let img = gradient(4, 4);
        match crop(&img, 2, 0, 3, 1) {
            Err(ImageError::ValueError(msg)) => assert_eq!(msg, "width out of bounds"),
            other => panic!("unexpected {:?}", other),
        }
        match crop(&img, 0, 1, 1, 4) {
            Err(ImageError::ValueError(msg)) => assert_eq!(msg, "height out of bounds"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(crop(&img, u32::MAX, 0, 2, 1).is_err());
        assert!(crop(&img, 0, 0, 0, 1).is_err());
    }

    #[test]
    fn get_channel_zeroes_the_others() {
        let mut img = RasterImage::new(1, 1).unwrap();
        img.put_pixel(0, 0, Pixel::new(10, 20, 30));

        let red = get_channel(&img, "red".parse().unwrap());
        let green = get_channel(&img, Channel::Green);
        let blue = get_channel(&img, Channel::Blue);
        assert_eq!(*red.get_pixel(0, 0), Pixel::new(10, 0, 0));
        assert_eq!(*green.get_pixel(0, 0), Pixel::new(0, 20, 0));
        assert_eq!(*blue.get_pixel(0, 0), Pixel::new(0, 0, 30));
        assert_eq!(*img.get_pixel(0, 0), Pixel::new(10, 20, 30));
    }

    #[test]
    fn unknown_channel_is_a_value_error() {
        match "alpha".parse::<Channel>() {
            Err(ImageError::ValueError(msg)) => {
                assert_eq!(msg, "only red, green, and blue are supported")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
