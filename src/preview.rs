use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::convert::Converter;
use crate::frame::CaptureEvent;
use crate::sink::UiHandle;

/// Shared on/off switch for the preview.
///
/// Written by the UI context, read by the delivery context. Relaxed ordering
/// is enough here: the flag has no consistency requirement beyond eventual
/// visibility, and it only gates frames delivered after it changes — an
/// in-flight frame keeps whatever decision was read for it.
#[derive(Clone)]
pub struct PreviewToggle {
    enabled: Arc<AtomicBool>,
}

impl PreviewToggle {
    pub fn new(enabled: bool) -> Self {
        PreviewToggle {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Flip the switch and return the new state.
    pub fn flip(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Point-in-time copy of the preview counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Frames converted and posted to the UI.
    pub converted: u64,
    /// Frames skipped because the preview was off.
    pub skipped: u64,
    /// Drop notifications from the source.
    pub dropped: u64,
    /// Frames discarded because conversion failed.
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    converted: AtomicU64,
    skipped: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

/// Preview counters, readable from any thread.
#[derive(Clone, Default)]
pub struct PreviewStats {
    inner: Arc<Counters>,
}

impl PreviewStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            converted: self.inner.converted.load(Ordering::Relaxed),
            skipped: self.inner.skipped.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }

    fn record_converted(&self) {
        self.inner.converted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_skipped(&self) {
        self.inner.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_dropped(&self) {
        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// The single consumer of capture events.
///
/// Gates on the preview toggle, converts, and posts the result toward the
/// UI. Every per-frame failure is handled here: logged, counted, and the
/// frame discarded. Nothing propagates, nothing is retried, and a failure
/// affects the current frame only.
pub struct Previewer {
    toggle: PreviewToggle,
    converter: Converter,
    ui: UiHandle,
    stats: PreviewStats,
}

impl Previewer {
    /// The preview starts switched off, like a viewfinder behind a start
    /// button; flip the [`PreviewToggle`] to begin displaying.
    pub fn new(converter: Converter, ui: UiHandle) -> Self {
        Previewer {
            toggle: PreviewToggle::new(false),
            converter,
            ui,
            stats: PreviewStats::default(),
        }
    }

    /// Handle for the UI context to switch the preview on and off.
    pub fn toggle(&self) -> PreviewToggle {
        self.toggle.clone()
    }

    /// Handle for reading the counters from any thread.
    pub fn stats(&self) -> PreviewStats {
        self.stats.clone()
    }

    /// Process one capture event on the delivery context.
    pub fn handle(&self, event: CaptureEvent<'_>) {
        match event {
            CaptureEvent::Dropped => {
                self.stats.record_dropped();
                log::debug!("frame dropped by source");
            }
            CaptureEvent::Frame(frame) => {
                if !self.toggle.is_enabled() {
                    self.stats.record_skipped();
                    return;
                }
                match self.converter.convert(&frame) {
                    Ok(image) => {
                        self.stats.record_converted();
                        self.ui.post(image);
                    }
                    Err(e) => {
                        self.stats.record_failed();
                        log::warn!("frame conversion failed: {e}");
                    }
                }
            }
        }
    }

    /// Adapt into the handler a [`FrameSource`](crate::source::FrameSource)
    /// takes ownership of.
    pub fn into_handler(self) -> impl FnMut(CaptureEvent<'_>) + Send + 'static {
        move |event| self.handle(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Plane, RawFrame};
    use crate::image::DisplayImage;
    use crate::sink::{DisplaySink, UiQueue};
    use crate::types::{PixelFormat, Size};
    use core::time::Duration;

    struct Collecting {
        images: Vec<DisplayImage>,
    }

    impl Collecting {
        fn new() -> Self {
            Collecting { images: Vec::new() }
        }
    }

    impl DisplaySink for Collecting {
        fn set_image(&mut self, image: DisplayImage) {
            self.images.push(image);
        }
    }

    fn deliver_bgra(previewer: &Previewer, width: u32, height: u32) {
        let data = vec![7u8; width as usize * 4 * height as usize];
        let frame = RawFrame::from_bgra(
            &data,
            width as usize * 4,
            Size::new(width, height),
            Duration::ZERO,
        );
        previewer.handle(CaptureEvent::Frame(frame));
    }

    #[test]
    fn toggle_off_never_reaches_the_sink() {
        let (handle, queue) = UiQueue::channel();
        let previewer = Previewer::new(Converter::default(), handle);

        deliver_bgra(&previewer, 4, 2);
        deliver_bgra(&previewer, 4, 2);

        let mut sink = Collecting::new();
        assert_eq!(queue.drain_into(&mut sink), 0);
        assert_eq!(previewer.stats().snapshot().skipped, 2);
        assert_eq!(previewer.stats().snapshot().converted, 0);
    }

    #[test]
    fn toggle_on_posts_exactly_one_image_per_frame() {
        let (handle, queue) = UiQueue::channel();
        let previewer = Previewer::new(Converter::default(), handle);
        previewer.toggle().set(true);

        deliver_bgra(&previewer, 4, 2);
        deliver_bgra(&previewer, 4, 2);
        deliver_bgra(&previewer, 4, 2);

        let mut sink = Collecting::new();
        assert_eq!(queue.drain_into(&mut sink), 3);
        // Storage dimensions match the input frame; display is rotated.
        assert_eq!(sink.images[0].size(), Size::new(4, 2));
        assert_eq!(sink.images[0].display_size(), Size::new(2, 4));
        assert_eq!(previewer.stats().snapshot().converted, 3);
    }

    #[test]
    fn flipping_mid_stream_affects_only_later_frames() {
        let (handle, queue) = UiQueue::channel();
        let previewer = Previewer::new(Converter::default(), handle);
        let toggle = previewer.toggle();

        deliver_bgra(&previewer, 2, 2);
        assert!(toggle.flip());
        deliver_bgra(&previewer, 2, 2);
        deliver_bgra(&previewer, 2, 2);
        assert!(!toggle.flip());
        deliver_bgra(&previewer, 2, 2);

        let mut sink = Collecting::new();
        assert_eq!(queue.drain_into(&mut sink), 2);
        let stats = previewer.stats().snapshot();
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.converted, 2);
    }

    #[test]
    fn conversion_failure_discards_the_frame_only() {
        let (handle, queue) = UiQueue::channel();
        let previewer = Previewer::new(Converter::default(), handle);
        previewer.toggle().set(true);

        // A planar frame the converter rejects.
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
            Duration::ZERO,
        );
        previewer.handle(CaptureEvent::Frame(frame));
        deliver_bgra(&previewer, 2, 2);

        let mut sink = Collecting::new();
        assert_eq!(queue.drain_into(&mut sink), 1);
        let stats = previewer.stats().snapshot();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.converted, 1);
    }

    #[test]
    fn drop_notifications_are_counted_not_displayed() {
        let (handle, queue) = UiQueue::channel();
        let previewer = Previewer::new(Converter::default(), handle);
        previewer.toggle().set(true);

        previewer.handle(CaptureEvent::Dropped);
        previewer.handle(CaptureEvent::Dropped);

        let mut sink = Collecting::new();
        assert_eq!(queue.drain_into(&mut sink), 0);
        assert_eq!(previewer.stats().snapshot().dropped, 2);
    }
}
