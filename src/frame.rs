use arrayvec::ArrayVec;
use core::time::Duration;

use crate::types::{PixelFormat, Size};

/// Maximum number of planes carried inline by a frame.
const MAX_PLANES: usize = 4;

/// A single plane of image data.
pub struct Plane<'a> {
    pub data: &'a [u8],
    pub bytes_per_row: usize,
}

/// A borrowed video frame. Lifetime tied to callback scope (zero-copy).
///
/// The backing memory is owned by the capture system, not by this crate; it
/// is mapped and locked only until the delivery callback returns. Anything
/// that must outlive the callback has to be copied out (which is exactly
/// what conversion does).
pub struct RawFrame<'a> {
    pixel_format: PixelFormat,
    size: Size,
    planes: ArrayVec<Plane<'a>, MAX_PLANES>,
    timestamp: Duration,
}

impl<'a> RawFrame<'a> {
    /// A packed single-plane BGRA frame, the format the preview path runs on.
    pub fn from_bgra(data: &'a [u8], bytes_per_row: usize, size: Size, timestamp: Duration) -> Self {
        let mut planes = ArrayVec::new();
        planes.push(Plane {
            data,
            bytes_per_row,
        });
        RawFrame {
            pixel_format: PixelFormat::Bgra32,
            size,
            planes,
            timestamp,
        }
    }

    /// A frame in an arbitrary format. Planes beyond the inline capacity
    /// are not representable and are ignored; no real capture format has
    /// more than three.
    pub fn from_planes(
        pixel_format: PixelFormat,
        size: Size,
        planes: impl IntoIterator<Item = Plane<'a>>,
        timestamp: Duration,
    ) -> Self {
        let planes: ArrayVec<Plane<'a>, MAX_PLANES> =
            planes.into_iter().take(MAX_PLANES).collect();
        RawFrame {
            pixel_format,
            size,
            planes,
            timestamp,
        }
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn planes(&self) -> &[Plane<'a>] {
        &self.planes
    }

    /// Presentation timestamp relative to the source's clock.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
}

/// One delivery from a frame source.
///
/// The two delegate callbacks of a native capture session (frame delivered,
/// frame dropped) collapse into a single variant type pushed to a single
/// consumer.
pub enum CaptureEvent<'a> {
    /// A frame arrived; readable for the duration of the callback only.
    Frame(RawFrame<'a>),
    /// The source discarded a frame before delivery (late-frame policy).
    Dropped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgra_frame_has_one_plane() {
        let data = [0u8; 4 * 2 * 2];
        let frame = RawFrame::from_bgra(&data, 8, Size::new(2, 2), Duration::ZERO);
        assert_eq!(frame.pixel_format(), PixelFormat::Bgra32);
        assert_eq!(frame.planes().len(), 1);
        assert_eq!(frame.planes()[0].bytes_per_row, 8);
    }

    #[test]
    fn planar_frame_keeps_plane_order() {
        let y = [0u8; 4];
        let uv = [0u8; 2];
        let frame = RawFrame::from_planes(
            PixelFormat::Nv12,
            Size::new(2, 2),
            [
                Plane {
                    data: &y,
                    bytes_per_row: 2,
                },
                Plane {
                    data: &uv,
                    bytes_per_row: 2,
                },
            ],
            Duration::from_millis(33),
        );
        assert_eq!(frame.planes().len(), 2);
        assert_eq!(frame.planes()[0].data.len(), 4);
        assert_eq!(frame.timestamp(), Duration::from_millis(33));
    }
}
