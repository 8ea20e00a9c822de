use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::frame::RawFrame;
use crate::image::{BufferError, DisplayImage, Orientation, PixelData};
use crate::types::{PixelFormat, Size};

/// Color space of conversion output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColorSpace {
    DeviceRgb,
}

/// Position of the alpha channel within a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaInfo {
    First,
    Last,
}

/// Component byte order of conversion output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Native,
    Big,
    Little,
}

/// Describes the pixel layout conversion produces.
///
/// The preview path supports exactly one layout: 8 bits per component,
/// 32 bits per pixel, device RGB, alpha last, native byte order — i.e.
/// packed RGBA. Any other descriptor is rejected per frame rather than
/// approximated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFormat {
    pub bits_per_component: u8,
    pub bits_per_pixel: u8,
    pub color_space: ColorSpace,
    pub alpha: AlphaInfo,
    pub byte_order: ByteOrder,
}

impl ImageFormat {
    /// Packed RGBA, the one layout the converter produces.
    pub fn rgba8() -> Self {
        ImageFormat {
            bits_per_component: 8,
            bits_per_pixel: 32,
            color_space: ColorSpace::DeviceRgb,
            alpha: AlphaInfo::Last,
            byte_order: ByteOrder::Native,
        }
    }

    fn is_packed_rgba8(&self) -> bool {
        self.bits_per_component == 8
            && self.bits_per_pixel == 32
            && self.color_space == ColorSpace::DeviceRgb
            && self.alpha == AlphaInfo::Last
            && self.byte_order == ByteOrder::Native
    }
}

impl Default for ImageFormat {
    fn default() -> Self {
        Self::rgba8()
    }
}

/// Why a frame could not be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConvertError {
    /// The frame is not packed BGRA.
    UnsupportedFormat(PixelFormat),
    /// The converter's output descriptor is not a layout it can produce.
    UnsupportedDescriptor,
    /// BGRA frames carry exactly one plane.
    BadPlaneCount(usize),
    /// Zero width or height.
    EmptyFrame,
    /// The source row stride cannot hold a full row of pixels.
    RowTooShort { bytes_per_row: usize, needed: usize },
    /// The plane holds fewer bytes than its geometry claims.
    TruncatedPlane { needed: usize, actual: usize },
    /// Output geometry does not fit in `usize`.
    GeometryOverflow,
    /// The converted memory could not be wrapped as a pixel buffer.
    Buffer(BufferError),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(format) => {
                write!(f, "unsupported pixel format {format:?}")
            }
            Self::UnsupportedDescriptor => f.write_str("unsupported output descriptor"),
            Self::BadPlaneCount(count) => write!(f, "expected 1 plane, got {count}"),
            Self::EmptyFrame => f.write_str("zero-sized frame"),
            Self::RowTooShort {
                bytes_per_row,
                needed,
            } => {
                write!(f, "bytes per row {bytes_per_row} shorter than row size {needed}")
            }
            Self::TruncatedPlane { needed, actual } => {
                write!(f, "plane truncated: need {needed} bytes, got {actual}")
            }
            Self::GeometryOverflow => f.write_str("frame geometry overflows"),
            Self::Buffer(e) => write!(f, "buffer creation failed: {e}"),
        }
    }
}

impl core::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BufferError> for ConvertError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

/// Intermediate buffer holding converted pixels: compact RGBA rows, newly
/// allocated per frame. Owns its allocation; dropped at most once by
/// construction.
#[derive(Debug)]
pub struct ConvertedBuffer {
    data: Vec<u8>,
    size: Size,
    bytes_per_row: usize,
}

impl ConvertedBuffer {
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Transfer the converted memory into a backing pixel buffer.
    pub fn into_pixel_data(self) -> Result<PixelData, BufferError> {
        PixelData::from_vec(self.data, self.size, self.bytes_per_row)
    }
}

/// Converts raw BGRA camera frames into displayable RGBA images.
///
/// Entirely synchronous; it blocks the delivery context for the duration of
/// one frame, which is acceptable because late frames are discarded
/// upstream rather than queued.
pub struct Converter {
    format: ImageFormat,
}

impl Converter {
    pub fn new(format: ImageFormat) -> Self {
        Converter { format }
    }

    pub fn format(&self) -> &ImageFormat {
        &self.format
    }

    /// Convert one frame into a displayable image, oriented 90° clockwise
    /// relative to the raw sensor rows.
    ///
    /// On any failure the frame is simply not produced; partial allocations
    /// are dropped and the caller decides what to log.
    pub fn convert(&self, frame: &RawFrame<'_>) -> Result<DisplayImage, ConvertError> {
        let buffer = self.init_buffer(frame)?;
        let pixels = buffer.into_pixel_data()?;
        Ok(DisplayImage::new(pixels, Orientation::Right))
    }

    /// The one real conversion call: BGRA source rows (with their stride)
    /// into a compact RGBA buffer.
    pub fn init_buffer(&self, frame: &RawFrame<'_>) -> Result<ConvertedBuffer, ConvertError> {
        if !self.format.is_packed_rgba8() {
            return Err(ConvertError::UnsupportedDescriptor);
        }
        if frame.pixel_format() != PixelFormat::Bgra32 {
            return Err(ConvertError::UnsupportedFormat(frame.pixel_format()));
        }
        if frame.planes().len() != 1 {
            return Err(ConvertError::BadPlaneCount(frame.planes().len()));
        }

        let size = frame.size();
        let width = size.width as usize;
        let height = size.height as usize;
        if width == 0 || height == 0 {
            return Err(ConvertError::EmptyFrame);
        }

        let plane = &frame.planes()[0];
        let row_bytes = width.checked_mul(4).ok_or(ConvertError::GeometryOverflow)?;
        if plane.bytes_per_row < row_bytes {
            return Err(ConvertError::RowTooShort {
                bytes_per_row: plane.bytes_per_row,
                needed: row_bytes,
            });
        }
        let needed = plane
            .bytes_per_row
            .checked_mul(height - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or(ConvertError::GeometryOverflow)?;
        if plane.data.len() < needed {
            return Err(ConvertError::TruncatedPlane {
                needed,
                actual: plane.data.len(),
            });
        }

        let total = row_bytes
            .checked_mul(height)
            .ok_or(ConvertError::GeometryOverflow)?;
        let mut data = vec![0u8; total];
        for y in 0..height {
            let src_start = y * plane.bytes_per_row;
            let src = &plane.data[src_start..src_start + row_bytes];
            let dst = &mut data[y * row_bytes..(y + 1) * row_bytes];
            for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
                d[0] = s[2];
                d[1] = s[1];
                d[2] = s[0];
                d[3] = s[3];
            }
        }

        Ok(ConvertedBuffer {
            data,
            size,
            bytes_per_row: row_bytes,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Converter::new(ImageFormat::rgba8())
    }
}
