use alloc::vec::Vec;
use core::fmt;

use crate::types::Size;

/// Why a backing pixel buffer could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    /// The allocation does not match the stated geometry.
    LengthMismatch { expected: usize, actual: usize },
    /// `bytes_per_row` cannot hold a full row of 32-bit pixels.
    RowTooShort { bytes_per_row: usize, needed: usize },
    /// The stated geometry does not fit in `usize`.
    GeometryOverflow,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, actual } => {
                write!(f, "buffer length mismatch: expected {expected}, got {actual}")
            }
            Self::RowTooShort {
                bytes_per_row,
                needed,
            } => {
                write!(f, "bytes per row {bytes_per_row} shorter than row size {needed}")
            }
            Self::GeometryOverflow => f.write_str("buffer geometry overflows"),
        }
    }
}

impl core::error::Error for BufferError {}

/// Owned backing memory for a displayable image.
///
/// Ownership of the allocation moves in on construction and the memory is
/// freed exactly once when the value is dropped. There is no release
/// callback to pair with a free call; the type system carries that contract.
#[derive(Debug)]
pub struct PixelData {
    data: Vec<u8>,
    size: Size,
    bytes_per_row: usize,
}

impl PixelData {
    /// Wrap converted memory as a pixel buffer.
    ///
    /// Fails if the allocation disagrees with the stated geometry; the
    /// allocation is consumed and dropped either way.
    pub fn from_vec(data: Vec<u8>, size: Size, bytes_per_row: usize) -> Result<Self, BufferError> {
        let needed = (size.width as usize)
            .checked_mul(4)
            .ok_or(BufferError::GeometryOverflow)?;
        if bytes_per_row < needed {
            return Err(BufferError::RowTooShort {
                bytes_per_row,
                needed,
            });
        }
        let expected = bytes_per_row
            .checked_mul(size.height as usize)
            .ok_or(BufferError::GeometryOverflow)?;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelData {
            data,
            size,
            bytes_per_row,
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Hand the allocation back out (e.g. to upload into a texture).
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// Orientation of an image relative to its stored pixel rows.
///
/// Camera sensors are mounted sideways relative to a portrait UI, so a
/// preview frame is displayed rotated rather than re-laid-out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Up,
    Down,
    /// Rotated 90° counter-clockwise for display.
    Left,
    /// Rotated 90° clockwise for display.
    Right,
}

impl Orientation {
    /// Whether displaying at this orientation swaps width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Orientation::Left | Orientation::Right)
    }
}

/// A fully decoded image ready for display.
#[derive(Debug)]
pub struct DisplayImage {
    pixels: PixelData,
    orientation: Orientation,
}

impl DisplayImage {
    pub fn new(pixels: PixelData, orientation: Orientation) -> Self {
        DisplayImage {
            pixels,
            orientation,
        }
    }

    /// Dimensions of the stored pixel rows.
    pub fn size(&self) -> Size {
        self.pixels.size()
    }

    /// Dimensions as displayed, after orientation is applied.
    pub fn display_size(&self) -> Size {
        let size = self.pixels.size();
        if self.orientation.swaps_dimensions() {
            size.transposed()
        } else {
            size
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn pixels(&self) -> &PixelData {
        &self.pixels
    }

    /// The display sink takes ownership of the backing memory.
    pub fn into_pixels(self) -> PixelData {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn from_vec_accepts_matching_geometry() {
        let data = vec![0u8; 8 * 2];
        let pixels = PixelData::from_vec(data, Size::new(2, 2), 8).unwrap();
        assert_eq!(pixels.size(), Size::new(2, 2));
        assert_eq!(pixels.bytes_per_row(), 8);
    }

    #[test]
    fn from_vec_rejects_length_mismatch() {
        let data = vec![0u8; 15];
        let err = PixelData::from_vec(data, Size::new(2, 2), 8).unwrap_err();
        assert_eq!(
            err,
            BufferError::LengthMismatch {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn from_vec_rejects_short_rows() {
        let data = vec![0u8; 12];
        let err = PixelData::from_vec(data, Size::new(2, 2), 6).unwrap_err();
        assert!(matches!(err, BufferError::RowTooShort { .. }));
    }

    #[test]
    fn right_orientation_swaps_display_dimensions() {
        let data = vec![0u8; 1280 * 4 * 720];
        let pixels = PixelData::from_vec(data, Size::new(1280, 720), 1280 * 4).unwrap();
        let image = DisplayImage::new(pixels, Orientation::Right);
        assert_eq!(image.size(), Size::new(1280, 720));
        assert_eq!(image.display_size(), Size::new(720, 1280));
    }

    #[test]
    fn up_orientation_keeps_display_dimensions() {
        let data = vec![0u8; 8 * 2];
        let pixels = PixelData::from_vec(data, Size::new(2, 2), 8).unwrap();
        let image = DisplayImage::new(pixels, Orientation::Up);
        assert_eq!(image.display_size(), Size::new(2, 2));
    }
}
