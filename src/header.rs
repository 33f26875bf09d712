use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Size of the on-disk `BITMAPFILEHEADER`.
pub(crate) const FILE_HEADER_SIZE: u32 = 14;
/// Size of the on-disk `BITMAPINFOHEADER`.
pub(crate) const INFO_HEADER_SIZE: u32 = 40;
/// Offset of the pixel array when no palette or extra header data follows.
pub(crate) const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

pub(crate) const BMP_MAGIC: [u8; 2] = *b"BM";
pub(crate) const BI_RGB: u32 = 0;

/// The 14 byte header every BMP file starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// File type tag, `BM` for bitmaps.
    pub magic: [u8; 2],
    /// Size of the whole file in bytes.
    pub size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    /// Offset from the start of the file to the pixel array.
    pub off_bits: u32,
}

impl FileHeader {
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> io::Result<FileHeader> {
        let mut magic = [0; 2];
        reader.read_exact(&mut magic)?;
        Ok(FileHeader {
            magic,
            size: reader.read_u32::<LittleEndian>()?,
            reserved1: reader.read_u16::<LittleEndian>()?,
            reserved2: reader.read_u16::<LittleEndian>()?,
            off_bits: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.magic)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_u16::<LittleEndian>(self.reserved1)?;
        writer.write_u16::<LittleEndian>(self.reserved2)?;
        writer.write_u32::<LittleEndian>(self.off_bits)
    }
}

/// The 40 byte `BITMAPINFOHEADER` describing dimensions and pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    /// Size of this header, 40 for the variant supported here.
    pub size: u32,
    pub width: i32,
    /// Negative when rows are stored top-down in the file.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    /// Size of the pixel array in bytes, padding included.
    pub size_image: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> io::Result<InfoHeader> {
        Ok(InfoHeader {
            size: reader.read_u32::<LittleEndian>()?,
            width: reader.read_i32::<LittleEndian>()?,
            height: reader.read_i32::<LittleEndian>()?,
            planes: reader.read_u16::<LittleEndian>()?,
            bit_count: reader.read_u16::<LittleEndian>()?,
            compression: reader.read_u32::<LittleEndian>()?,
            size_image: reader.read_u32::<LittleEndian>()?,
            x_pixels_per_meter: reader.read_i32::<LittleEndian>()?,
            y_pixels_per_meter: reader.read_i32::<LittleEndian>()?,
            colors_used: reader.read_u32::<LittleEndian>()?,
            colors_important: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_i32::<LittleEndian>(self.width)?;
        writer.write_i32::<LittleEndian>(self.height)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bit_count)?;
        writer.write_u32::<LittleEndian>(self.compression)?;
        writer.write_u32::<LittleEndian>(self.size_image)?;
        writer.write_i32::<LittleEndian>(self.x_pixels_per_meter)?;
        writer.write_i32::<LittleEndian>(self.y_pixels_per_meter)?;
        writer.write_u32::<LittleEndian>(self.colors_used)?;
        writer.write_u32::<LittleEndian>(self.colors_important)
    }
}
