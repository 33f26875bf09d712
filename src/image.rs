use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::slice::{ChunksExact, ChunksExactMut};

use crate::header::{FileHeader, InfoHeader, BI_RGB, BMP_MAGIC, INFO_HEADER_SIZE, PIXEL_DATA_OFFSET};
use crate::encoder::BmpEncoder;
use crate::{ImageError, ImageResult};

pub(crate) const BITS_PER_PIXEL: u16 = 24;
pub(crate) const BYTES_PER_PIXEL: usize = 3;

/// Bytes taken by one encoded row of `width` pixels, padded to a multiple of 4.
///
/// Returns `None` if the computation overflows.
pub(crate) fn row_stride(width: usize) -> Option<usize> {
    width
        .checked_mul(BYTES_PER_PIXEL)?
        .checked_add(3)
        .map(|bytes| bytes / 4 * 4)
}

/// A single RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Pixel {
        Pixel { r, g, b }
    }

    /// Build a pixel from the on-disk Blue, Green, Red byte order.
    pub fn from_bgr(bgr: [u8; 3]) -> Pixel {
        Pixel {
            r: bgr[2],
            g: bgr[1],
            b: bgr[0],
        }
    }

    /// The pixel in on-disk Blue, Green, Red byte order.
    pub fn to_bgr(self) -> [u8; 3] {
        [self.b, self.g, self.r]
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Apply `f` to every channel, returning the new pixel.
    pub fn map<F: FnMut(u8) -> u8>(self, mut f: F) -> Pixel {
        Pixel {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }

    /// Apply `f` to every channel in place.
    pub fn apply<F: FnMut(u8) -> u8>(&mut self, f: F) {
        *self = self.map(f);
    }
}

/// An uncompressed 24-bit bitmap held in memory.
///
/// Pixels are stored row-major with the top row first, whatever the
/// orientation of the file the image was decoded from. The headers, `stride`
/// and `padding` always describe the current pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    filename: Option<String>,
    file_header: FileHeader,
    info_header: InfoHeader,
    stride: usize,
    padding: usize,
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl RasterImage {
    /// Create a black `width` x `height` image with fresh headers.
    pub fn new(width: u32, height: u32) -> ImageResult<RasterImage> {
        if width == 0 {
            return Err(ImageError::ValueError("width must be > 0".to_owned()));
        }
        if height == 0 {
            return Err(ImageError::ValueError("height must be > 0".to_owned()));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(ImageError::ValueError("image dimensions too large".to_owned()));
        }

        let (width, height) = (width as usize, height as usize);
        let size_image = row_stride(width)
            .and_then(|stride| stride.checked_mul(height))
            .filter(|&size| size <= (u32::MAX - PIXEL_DATA_OFFSET) as usize)
            .ok_or_else(|| ImageError::ValueError("image dimensions too large".to_owned()))?;
        let len = width
            .checked_mul(height)
            .ok_or_else(|| ImageError::ValueError("image dimensions too large".to_owned()))?;

        let file_header = FileHeader {
            magic: BMP_MAGIC,
            size: PIXEL_DATA_OFFSET + size_image as u32,
            reserved1: 0,
            reserved2: 0,
            off_bits: PIXEL_DATA_OFFSET,
        };
        let info_header = InfoHeader {
            size: INFO_HEADER_SIZE,
            width: width as i32,
            height: height as i32,
            planes: 1,
            bit_count: BITS_PER_PIXEL,
            compression: BI_RGB,
            size_image: size_image as u32,
            x_pixels_per_meter: 0,
            y_pixels_per_meter: 0,
            colors_used: 0,
            colors_important: 0,
        };

        Ok(RasterImage::from_parts(
            None,
            file_header,
            info_header,
            width,
            height,
            vec![Pixel::BLACK; len],
        ))
    }

    /// Assemble an image from decoded headers and a `width * height` grid.
    ///
    /// The headers are taken as given; only `stride` and `padding` are derived.
    pub(crate) fn from_parts(
        filename: Option<String>,
        file_header: FileHeader,
        info_header: InfoHeader,
        width: usize,
        height: usize,
        pixels: Vec<Pixel>,
    ) -> RasterImage {
        debug_assert_eq!(pixels.len(), width * height);
        let mut image = RasterImage {
            filename,
            file_header,
            info_header,
            stride: 0,
            padding: 0,
            width,
            height,
            pixels,
        };
        image.update_layout();
        image
    }

    /// A new image sharing this image's headers but holding `pixels`.
    ///
    /// The metadata of the result is refreshed for the new dimensions.
    pub(crate) fn with_pixels(&self, width: usize, height: usize, pixels: Vec<Pixel>) -> RasterImage {
        let mut image = RasterImage::from_parts(
            self.filename.clone(),
            self.file_header,
            self.info_header,
            width,
            height,
            pixels,
        );
        image.refresh_metadata();
        image
    }

    fn update_layout(&mut self) {
        // The grid is already allocated, so the row size cannot overflow.
        self.stride = row_stride(self.width).unwrap_or(usize::MAX);
        self.padding = self.stride - self.width * BYTES_PER_PIXEL;
    }

    /// Recompute every size-derived header field from the pixel grid.
    ///
    /// Must run after anything that changes the grid dimensions.
    pub fn refresh_metadata(&mut self) {
        self.update_layout();
        let size_image = (self.stride * self.height) as u32;
        self.info_header.width = self.width as i32;
        self.info_header.height = self.height as i32;
        self.info_header.size_image = size_image;
        self.file_header.size = self.file_header.off_bits.saturating_add(size_image);
    }

    /// Encode the image to a new file at `path`, replacing any existing file.
    ///
    /// A failed save can leave a truncated file behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        BmpEncoder::new(&mut writer).encode(self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_ref().map(String::as_str)
    }

    pub fn set_filename<S: Into<String>>(&mut self, filename: S) {
        self.filename = Some(filename.into());
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Bytes per encoded row, padding included.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Zero bytes appended to each encoded row.
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> &Pixel {
        let index = self.index_of(x, y);
        &self.pixels[index]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> &mut Pixel {
        let index = self.index_of(x, y);
        &mut self.pixels[index]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        *self.get_pixel_mut(x, y) = pixel;
    }

    fn index_of(&self, x: u32, y: u32) -> usize {
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            panic!(
                "Image index {:?} out of bounds {:?}",
                (x, y),
                (self.width, self.height)
            );
        }
        y * self.width + x
    }

    /// All pixels, row-major from the top-left corner.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> ChunksExact<'_, Pixel> {
        self.pixels.chunks_exact(self.width.max(1))
    }

    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, Pixel> {
        self.pixels.chunks_exact_mut(self.width.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_padded_to_four_bytes() {
        let expected = [(1, 4), (2, 8), (3, 12), (4, 12), (5, 16), (8, 24)];
        for &(width, stride) in &expected {
            let padding = stride - width * 3;
            assert_eq!(row_stride(width), Some(stride));
            assert!(padding <= 3);
        }
        assert_eq!(row_stride(usize::MAX), None);
    }

    #[test]
    fn new_image_is_black_with_fresh_headers() {
        let img = RasterImage::new(3, 2).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.stride(), 12);
        assert_eq!(img.padding(), 3);
        assert!(img.pixels().iter().all(|p| *p == Pixel::BLACK));
        assert_eq!(img.filename(), None);

        let fh = img.file_header();
        assert_eq!(fh.magic, *b"BM");
        assert_eq!(fh.off_bits, 54);
        assert_eq!(fh.size, 54 + 24);

        let ih = img.info_header();
        assert_eq!((ih.width, ih.height), (3, 2));
        assert_eq!(ih.size, 40);
        assert_eq!(ih.bit_count, 24);
        assert_eq!(ih.compression, 0);
        assert_eq!(ih.size_image, 24);
    }

    #[test]
    fn new_rejects_empty_dimensions() {
        match RasterImage::new(0, 4) {
            Err(ImageError::ValueError(msg)) => assert_eq!(msg, "width must be > 0"),
            other => panic!("unexpected {:?}", other),
        }
        match RasterImage::new(4, 0) {
            Err(ImageError::ValueError(msg)) => assert_eq!(msg, "height must be > 0"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn new_rejects_oversized_dimensions() {
        assert!(RasterImage::new(u32::MAX, 1).is_err());
        assert!(RasterImage::new(1 << 20, 1 << 20).is_err());
    }

    #[test]
    fn pixel_access_is_top_left_origin() {
        let mut img = RasterImage::new(2, 2).unwrap();
        img.put_pixel(1, 0, Pixel::new(1, 2, 3));
        assert_eq!(img.pixels()[1], Pixel::new(1, 2, 3));
        assert_eq!(img.rows().next().unwrap()[1], Pixel::new(1, 2, 3));
        assert_eq!(*img.get_pixel(1, 0), Pixel::new(1, 2, 3));
    }

    #[test]
    #[should_panic]
    fn pixel_access_out_of_bounds_panics() {
        let img = RasterImage::new(2, 2).unwrap();
        img.get_pixel(2, 0);
    }

    #[test]
    fn refresh_metadata_follows_the_grid() {
        let img = RasterImage::new(8, 8).unwrap();
        let small = img.with_pixels(5, 3, vec![Pixel::BLACK; 15]);
        assert_eq!(small.stride(), 16);
        assert_eq!(small.padding(), 1);
        assert_eq!(small.info_header().width, 5);
        assert_eq!(small.info_header().height, 3);
        assert_eq!(small.info_header().size_image, 48);
        assert_eq!(small.file_header().size, 54 + 48);
    }

    #[test]
    fn bgr_order() {
        let p = Pixel::new(10, 20, 30);
        assert_eq!(p.to_bgr(), [30, 20, 10]);
        assert_eq!(Pixel::from_bgr([30, 20, 10]), p);
        assert_eq!(p.map(|c| c / 10), Pixel::new(1, 2, 3));
    }
}
