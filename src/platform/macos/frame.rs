use core::time::Duration;

use objc2_core_media::CMTime;
use objc2_core_video::{
    CVPixelBuffer, CVPixelBufferGetBaseAddress, CVPixelBufferGetBaseAddressOfPlane,
    CVPixelBufferGetBytesPerRow, CVPixelBufferGetBytesPerRowOfPlane, CVPixelBufferGetHeight,
    CVPixelBufferGetHeightOfPlane, CVPixelBufferGetPixelFormatType, CVPixelBufferGetPlaneCount,
    CVPixelBufferGetWidth, CVPixelBufferLockBaseAddress, CVPixelBufferLockFlags,
    CVPixelBufferUnlockBaseAddress, kCVReturnSuccess,
};

use crate::frame::{Plane, RawFrame};
use crate::platform::macos::device::fourcc_to_pixel_format;
use crate::types::Size;

/// RAII guard over a pixel buffer's base-address lock.
///
/// The capture system owns the buffer; its memory may only be read between
/// lock and unlock. Tying the unlock to `Drop` pairs the two calls on every
/// exit path of the delivery callback, success or failure.
pub(crate) struct PixelLockGuard<'a> {
    pixel_buffer: &'a CVPixelBuffer,
    flags: CVPixelBufferLockFlags,
}

impl<'a> PixelLockGuard<'a> {
    pub(crate) fn lock_read_only(pixel_buffer: &'a CVPixelBuffer) -> Option<Self> {
        let flags = CVPixelBufferLockFlags::ReadOnly;
        let ret = unsafe { CVPixelBufferLockBaseAddress(pixel_buffer, flags) };
        if ret == kCVReturnSuccess {
            Some(PixelLockGuard {
                pixel_buffer,
                flags,
            })
        } else {
            None
        }
    }

    /// The locked buffer, at the lifetime of the underlying reference (not
    /// of the guard), so a frame view can be built from it.
    pub(crate) fn pixel_buffer(&self) -> &'a CVPixelBuffer {
        self.pixel_buffer
    }
}

impl Drop for PixelLockGuard<'_> {
    fn drop(&mut self) {
        unsafe { CVPixelBufferUnlockBaseAddress(self.pixel_buffer, self.flags) };
    }
}

/// Presentation timestamp of a sample buffer as a duration on the source
/// clock. Invalid or negative times collapse to zero.
pub(crate) fn timestamp_from_cm_time(time: CMTime) -> Duration {
    if time.timescale > 0 && time.value >= 0 {
        Duration::from_secs_f64(time.value as f64 / time.timescale as f64)
    } else {
        Duration::ZERO
    }
}

/// Build a borrowed frame view over a locked pixel buffer.
///
/// Returns `None` for pixel formats this crate does not recognize or when
/// the buffer exposes no readable planes.
///
/// SAFETY: the base address must stay locked for the whole lifetime `'a`.
pub(crate) unsafe fn raw_frame_from_locked<'a>(
    pixel_buffer: &'a CVPixelBuffer,
    timestamp: Duration,
) -> Option<RawFrame<'a>> {
    let width = CVPixelBufferGetWidth(pixel_buffer);
    let height = CVPixelBufferGetHeight(pixel_buffer);
    let fourcc = CVPixelBufferGetPixelFormatType(pixel_buffer);
    let pixel_format = fourcc_to_pixel_format(fourcc)?;
    let size = Size {
        width: width as u32,
        height: height as u32,
    };

    let plane_count = CVPixelBufferGetPlaneCount(pixel_buffer);
    let planes: Vec<Plane<'a>> = if plane_count == 0 {
        // Non-planar: single plane
        let base = CVPixelBufferGetBaseAddress(pixel_buffer);
        let bytes_per_row = CVPixelBufferGetBytesPerRow(pixel_buffer);
        if base.is_null() {
            vec![]
        } else {
            let len = bytes_per_row * height;
            let data = unsafe { std::slice::from_raw_parts(base as *const u8, len) };
            vec![Plane {
                data,
                bytes_per_row,
            }]
        }
    } else {
        (0..plane_count)
            .filter_map(|i| {
                let base = CVPixelBufferGetBaseAddressOfPlane(pixel_buffer, i);
                if base.is_null() {
                    return None;
                }
                let bytes_per_row = CVPixelBufferGetBytesPerRowOfPlane(pixel_buffer, i);
                let h = CVPixelBufferGetHeightOfPlane(pixel_buffer, i);
                let len = bytes_per_row * h;
                let data = unsafe { std::slice::from_raw_parts(base as *const u8, len) };
                Some(Plane {
                    data,
                    bytes_per_row,
                })
            })
            .collect()
    };

    if planes.is_empty() {
        return None;
    }

    Some(RawFrame::from_planes(pixel_format, size, planes, timestamp))
}
