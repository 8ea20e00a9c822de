//! End-to-end preview over the synthetic source: background-thread
//! delivery, toggle gating, conversion, and the UI hand-off queue.

use std::time::Duration;

use camera_preview::convert::Converter;
use camera_preview::image::DisplayImage;
use camera_preview::preview::Previewer;
use camera_preview::sink::{DisplaySink, UiQueue};
use camera_preview::source::FrameSource;
use camera_preview::synthetic::{SyntheticConfig, SyntheticSource};
use camera_preview::types::Size;

struct Collecting {
    images: Vec<(Size, Size)>,
}

impl DisplaySink for Collecting {
    fn set_image(&mut self, image: DisplayImage) {
        self.images.push((image.size(), image.display_size()));
    }
}

#[test]
fn synthetic_stream_previews_end_to_end() {
    let mut source = SyntheticSource::new(SyntheticConfig {
        size: Size::new(64, 32),
        interval: Duration::ZERO,
        frame_limit: Some(20),
        drop_every: Some(5),
    });

    let (handle, queue) = UiQueue::channel();
    let previewer = Previewer::new(Converter::default(), handle);
    let stats = previewer.stats();
    previewer.toggle().set(true);

    source.start(previewer.into_handler()).unwrap();

    // The queue closes once the source finishes and the handler is dropped.
    let mut sink = Collecting { images: Vec::new() };
    while queue.wait_into(&mut sink) {}
    source.stop().unwrap();

    // 20 deliveries with every 5th dropped: 16 frames, 4 drops.
    assert_eq!(sink.images.len(), 16);
    for (size, display_size) in &sink.images {
        assert_eq!(*size, Size::new(64, 32));
        assert_eq!(*display_size, Size::new(32, 64));
    }

    let s = stats.snapshot();
    assert_eq!(s.converted, 16);
    assert_eq!(s.dropped, 4);
    assert_eq!(s.skipped, 0);
    assert_eq!(s.failed, 0);
}

#[test]
fn preview_off_never_reaches_the_sink() {
    let mut source = SyntheticSource::new(SyntheticConfig {
        size: Size::new(64, 32),
        interval: Duration::ZERO,
        frame_limit: Some(10),
        drop_every: None,
    });

    let (handle, queue) = UiQueue::channel();
    let previewer = Previewer::new(Converter::default(), handle);
    let stats = previewer.stats();

    source.start(previewer.into_handler()).unwrap();

    let mut sink = Collecting { images: Vec::new() };
    while queue.wait_into(&mut sink) {}
    source.stop().unwrap();

    assert!(sink.images.is_empty());
    let s = stats.snapshot();
    assert_eq!(s.skipped, 10);
    assert_eq!(s.converted, 0);
}
