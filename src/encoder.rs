use std::io::Write;

use log::debug;

use crate::header::PIXEL_DATA_OFFSET;
use crate::image::{RasterImage, BYTES_PER_PIXEL};
use crate::ImageResult;

/// The representation of a BMP encoder.
///
/// Rows are always written bottom-up. Each row is handed to the writer in a
/// single call, so pass a buffered writer when encoding to a file.
pub struct BmpEncoder<'a, W: 'a> {
    writer: &'a mut W,
}

impl<'a, W: Write + 'a> BmpEncoder<'a, W> {
    /// Create a new encoder that writes its output to `w`.
    pub fn new(w: &'a mut W) -> Self {
        BmpEncoder { writer: w }
    }

    /// Encode `image` as a 24-bit uncompressed bitmap.
    ///
    /// The headers are written as stored in the image. A partially written
    /// stream is left as is when an error occurs.
    pub fn encode(&mut self, image: &RasterImage) -> ImageResult<()> {
        let file_header = image.file_header();
        debug!(
            "encoding {}x{} bitmap, stride {} padding {}",
            image.width(),
            image.height(),
            image.stride(),
            image.padding()
        );

        file_header.write_to(&mut *self.writer)?;
        image.info_header().write_to(&mut *self.writer)?;

        // keep the pixel array at the offset the header points to
        let gap = file_header.off_bits.saturating_sub(PIXEL_DATA_OFFSET) as usize;
        if gap > 0 {
            self.writer.write_all(&vec![0; gap])?;
        }

        let mut row_data = Vec::with_capacity(image.stride());
        for row in image.rows().rev() {
            row_data.clear();
            for pixel in row {
                row_data.extend_from_slice(&pixel.to_bgr());
            }
            row_data.resize(row.len() * BYTES_PER_PIXEL + image.padding(), 0);
            self.writer.write_all(&row_data)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Pixel;
    use crate::BmpDecoder;
    use std::io::{self, Cursor};

    #[test]
    fn writes_rows_bottom_up_with_padding() {
        let mut img = RasterImage::new(1, 2).unwrap();
        img.put_pixel(0, 0, Pixel::new(1, 2, 3));
        img.put_pixel(0, 1, Pixel::new(4, 5, 6));

        let mut buf = Vec::new();
        BmpEncoder::new(&mut buf).encode(&img).unwrap();

        assert_eq!(buf.len(), 54 + 8);
        assert_eq!(&buf[..2], b"BM");
        assert_eq!(&buf[2..6], &62u32.to_le_bytes());
        assert_eq!(&buf[10..14], &54u32.to_le_bytes());
        assert_eq!(&buf[54..], &[6, 5, 4, 0, 3, 2, 1, 0]);
    }

    #[test]
    fn round_trips_through_the_decoder() {
        let mut img = RasterImage::new(5, 3).unwrap();
        for (i, p) in img.pixels_mut().iter_mut().enumerate() {
            let i = i as u8;
            *p = Pixel::new(i, i.wrapping_mul(7), 255 - i);
        }

        let mut buf = Vec::new();
        BmpEncoder::new(&mut buf).encode(&img).unwrap();
        assert_eq!(buf.len() as u32, img.file_header().size);

        let decoded = BmpDecoder::new(Cursor::new(buf)).unwrap().read_image().unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn fills_the_gap_before_the_pixel_array() {
        let mut data = vec![
            b'B', b'M', 64, 0, 0, 0, 0, 0, 0, 0, 58, 0, 0, 0, //
            40, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 24, 0, //
            0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
            0, 0, 0, 0, 0, 0, 0, 0,
        ];
        data.extend_from_slice(&[9, 9, 9, 9, 30, 20, 10, 0]);
        let img = BmpDecoder::new(Cursor::new(data.clone()))
            .unwrap()
            .read_image()
            .unwrap();

        let mut buf = Vec::new();
        BmpEncoder::new(&mut buf).encode(&img).unwrap();
        assert_eq!(&buf[..54], &data[..54]);
        assert_eq!(&buf[54..], &[0, 0, 0, 0, 30, 20, 10, 0]);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_returned() {
        let img = RasterImage::new(2, 2).unwrap();
        match BmpEncoder::new(&mut FailingWriter).encode(&img) {
            Err(crate::ImageError::IoError(e)) => assert_eq!(e.kind(), io::ErrorKind::Other),
            other => panic!("unexpected {:?}", other),
        }
    }
}
