/// Pixel formats encountered across platforms.
///
/// The preview path converts `Bgra32` only; other formats are recognized so
/// a source can report what it actually delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    Nv12,
    Yuyv,
    Uyvy,
    Bgra32,
    Jpeg,
}

/// Pixel dimensions of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    /// Dimensions with width and height exchanged.
    pub const fn transposed(self) -> Self {
        Size {
            width: self.height,
            height: self.width,
        }
    }
}

/// Configuration for opening a capture session.
///
/// The session runs a single fixed format; there is no per-device format
/// negotiation. Late frames are discarded upstream rather than queued, so a
/// slow consumer sees drop notifications instead of growing latency.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub pixel_format: PixelFormat,
    pub size: Size,
    /// Discard frames the consumer was too slow to take.
    pub discard_late_frames: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            pixel_format: PixelFormat::Bgra32,
            size: Size::new(1280, 720),
            discard_late_frames: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transposed_swaps_dimensions() {
        let size = Size::new(1280, 720);
        assert_eq!(size.transposed(), Size::new(720, 1280));
    }

    #[test]
    fn default_session_is_bgra_720p() {
        let config = SessionConfig::default();
        assert_eq!(config.pixel_format, PixelFormat::Bgra32);
        assert_eq!(config.size, Size::new(1280, 720));
        assert!(config.discard_late_frames);
    }
}
