//!  Decoding, Encoding and Editing of 24-bit BMP Images
//!
//!  A decoder and encoder for uncompressed, 24 bits per pixel BMP (Windows
//!  Bitmap) images, plus a handful of pixel operations on the decoded image.
//!
//!  ```no_run
//!  use bmp24::imageops::{self, colorops};
//!
//!  let mut img = bmp24::open("photo.bmp")?;
//!  colorops::grayscale_luma(&mut img);
//!  let corner = imageops::crop(&img, 0, 0, 32, 32)?;
//!  corner.save("corner.bmp")?;
//!  # Ok::<(), bmp24::ImageError>(())
//!  ```
//!
//!  # Related Links
//!  * <https://msdn.microsoft.com/en-us/library/windows/desktop/dd183375%28v=vs.85%29.aspx>
//!  * <https://en.wikipedia.org/wiki/BMP_file_format>
//!

use std::error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::Path;

pub use crate::decoder::BmpDecoder;
pub use crate::encoder::BmpEncoder;
pub use crate::header::{FileHeader, InfoHeader};
pub use crate::image::{Pixel, RasterImage};
pub use crate::limits::Limits;

#[derive(Debug)]
pub enum ImageError {
    /// The stream is not a bitmap this crate can read.
    FormatError(String),
    /// A caller supplied an invalid argument.
    ValueError(String),
    /// Decoding was refused by the configured [`Limits`].
    LimitError(String),
    IoError(io::Error),
}

pub type ImageResult<T> = Result<T, ImageError>;

impl fmt::Display for ImageError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImageError::FormatError(e) => write!(fmt, "format error: {}", e),
            ImageError::ValueError(e) => write!(fmt, "invalid value: {}", e),
            ImageError::LimitError(e) => write!(fmt, "limit exceeded: {}", e),
            ImageError::IoError(e) => fmt::Display::fmt(e, fmt),
        }
    }
}

impl error::Error for ImageError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ImageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ImageError {
    fn from(err: io::Error) -> ImageError {
        ImageError::IoError(err)
    }
}

/// Decode a bitmap from `reader` using the default [`Limits`].
pub fn decode<R: Read + Seek>(reader: R) -> ImageResult<RasterImage> {
    BmpDecoder::new(reader)?.read_image()
}

/// Encode `image` into `writer`.
///
/// The writer is used as is; wrap unbuffered sinks in a `BufWriter`.
pub fn encode<W: Write>(image: &RasterImage, writer: &mut W) -> ImageResult<()> {
    BmpEncoder::new(writer).encode(image)
}

/// Open and decode the bitmap at `path`, recording the path as its filename.
pub fn open<P: AsRef<Path>>(path: P) -> ImageResult<RasterImage> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);
    let mut decoder = BmpDecoder::new(file)?;
    decoder.set_filename(path.display().to_string());
    decoder.read_image()
}

mod decoder;
mod encoder;
mod header;
mod image;
pub mod imageops;
mod limits;
