use std::io::{Read, Seek, SeekFrom};

use log::{debug, warn};

use crate::header::{FileHeader, InfoHeader, BI_RGB, BMP_MAGIC, INFO_HEADER_SIZE, PIXEL_DATA_OFFSET};
use crate::image::{row_stride, Pixel, RasterImage, BITS_PER_PIXEL, BYTES_PER_PIXEL};
use crate::limits::Limits;
use crate::{ImageError, ImageResult};

/// A decoder for uncompressed 24-bit BMP files.
///
/// The headers are read and validated when the decoder is created, so the
/// dimensions can be inspected before any pixel data is read. The reader
/// must be positioned at the start of the file.
pub struct BmpDecoder<R> {
    reader: R,
    filename: Option<String>,
    file_header: FileHeader,
    info_header: InfoHeader,
    top_down: bool,
    width: usize,
    height: usize,
    padding: usize,
}

impl<R: Read + Seek> BmpDecoder<R> {
    /// Create a new decoder that decodes from the stream `reader`.
    pub fn new(reader: R) -> ImageResult<BmpDecoder<R>> {
        BmpDecoder::with_limits(reader, Limits::default())
    }

    /// Create a new decoder, refusing images that exceed `limits`.
    pub fn with_limits(mut reader: R, limits: Limits) -> ImageResult<BmpDecoder<R>> {
        let file_header = read_file_header(&mut reader)?;
        let mut info_header = read_info_header(&mut reader)?;

        if file_header.off_bits < PIXEL_DATA_OFFSET {
            return Err(ImageError::FormatError(format!(
                "pixel data offset {} overlaps the headers",
                file_header.off_bits
            )));
        }

        // Negative heights mark top-down images; keep the positive value.
        let top_down = info_header.height < 0;
        info_header.height = info_header
            .height
            .checked_abs()
            .ok_or_else(|| ImageError::FormatError("invalid image height".to_owned()))?;

        let (width, height) = (info_header.width as u32, info_header.height as u32);
        limits.check_dimensions(width, height)?;
        limits.reserve(u64::from(width) * u64::from(height) * BYTES_PER_PIXEL as u64)?;

        let (width, height) = (width as usize, height as usize);
        let fits = width
            .checked_mul(height)
            .and_then(|len| len.checked_mul(BYTES_PER_PIXEL))
            .is_some();
        if !fits {
            return Err(ImageError::LimitError("image does not fit in memory".to_owned()));
        }
        let stride = row_stride(width)
            .ok_or_else(|| ImageError::LimitError("image does not fit in memory".to_owned()))?;
        let padding = stride - width * BYTES_PER_PIXEL;

        if info_header.planes != 1 {
            warn!("bitmap declares {} color planes", info_header.planes);
        }
        if info_header.size_image != 0 && info_header.size_image as usize != stride * height {
            warn!(
                "bitmap declares {} bytes of pixel data, expected {}",
                info_header.size_image,
                stride * height
            );
        }

        debug!(
            "bmp header: {}x{} {}, stride {} padding {} offset {}",
            width,
            height,
            if top_down { "top-down" } else { "bottom-up" },
            stride,
            padding,
            file_header.off_bits
        );

        Ok(BmpDecoder {
            reader,
            filename: None,
            file_header,
            info_header,
            top_down,
            width,
            height,
            padding,
        })
    }

    /// Name recorded as the decoded image's filename.
    pub fn set_filename<S: Into<String>>(&mut self, filename: S) {
        self.filename = Some(filename.into());
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    /// The info header, with its height already made positive.
    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    /// Whether the rows are stored top row first in the file.
    pub fn is_top_down(&self) -> bool {
        self.top_down
    }

    /// Read the pixel array and return the decoded image.
    pub fn read_image(mut self) -> ImageResult<RasterImage> {
        let (width, height) = (self.width, self.height);
        self.reader
            .seek(SeekFrom::Start(u64::from(self.file_header.off_bits)))?;

        let mut pixels = vec![Pixel::BLACK; width * height];
        let mut row_data = vec![0; width * BYTES_PER_PIXEL];
        for i in 0..height {
            let row = if self.top_down { i } else { height - 1 - i };
            self.reader.read_exact(&mut row_data)?;

            let target = &mut pixels[row * width..(row + 1) * width];
            for (pixel, bgr) in target.iter_mut().zip(row_data.chunks_exact(BYTES_PER_PIXEL)) {
                *pixel = Pixel::from_bgr([bgr[0], bgr[1], bgr[2]]);
            }

            if self.padding > 0 {
                self.reader.seek(SeekFrom::Current(self.padding as i64))?;
            }
        }

        Ok(RasterImage::from_parts(
            self.filename,
            self.file_header,
            self.info_header,
            width,
            height,
            pixels,
        ))
    }
}

fn read_file_header<R: Read>(reader: &mut R) -> ImageResult<FileHeader> {
    let header = FileHeader::read_from(reader)?;
    if header.magic != BMP_MAGIC {
        return Err(ImageError::FormatError("not a bitmap".to_owned()));
    }
    Ok(header)
}

fn read_info_header<R: Read>(reader: &mut R) -> ImageResult<InfoHeader> {
    let header = InfoHeader::read_from(reader)?;
    if header.bit_count != BITS_PER_PIXEL || header.compression != BI_RGB {
        return Err(ImageError::FormatError(
            "unsupported bit depth/compression".to_owned(),
        ));
    }
    if header.size != INFO_HEADER_SIZE {
        return Err(ImageError::FormatError(format!(
            "unsupported info header size {}",
            header.size
        )));
    }
    if header.width <= 0 {
        return Err(ImageError::FormatError(format!(
            "invalid image width {}",
            header.width
        )));
    }
    if header.height == 0 {
        return Err(ImageError::FormatError("invalid image height 0".to_owned()));
    }
    Ok(header)
}
