use std::sync::mpsc;

use crate::image::DisplayImage;

/// Shows the most recently converted image.
///
/// Implementations mutate display state and must only be driven from the UI
/// context; [`UiQueue`] is the bridge that gets images there.
pub trait DisplaySink {
    /// Replace the currently shown image. The previous image is released
    /// when its value is overwritten.
    fn set_image(&mut self, image: DisplayImage);
}

/// Sending half of the UI hand-off: post images from the delivery context.
#[derive(Clone)]
pub struct UiHandle {
    tx: mpsc::Sender<DisplayImage>,
}

impl UiHandle {
    /// Fire-and-forget post toward the UI context.
    ///
    /// Never blocks. If the UI side has gone away the image is discarded
    /// and the disconnect logged at debug.
    pub fn post(&self, image: DisplayImage) {
        if self.tx.send(image).is_err() {
            log::debug!("display queue disconnected, image discarded");
        }
    }
}

/// Receiving half of the UI hand-off, drained on the UI context.
///
/// Display mutation is only safe on the UI context, so the converter never
/// touches the sink directly; it posts through a [`UiHandle`] and the UI
/// drains here.
pub struct UiQueue {
    rx: mpsc::Receiver<DisplayImage>,
}

impl UiQueue {
    pub fn channel() -> (UiHandle, UiQueue) {
        let (tx, rx) = mpsc::channel();
        (UiHandle { tx }, UiQueue { rx })
    }

    /// Hand every pending image to the sink, in arrival order, and return
    /// how many were delivered. The sink ends up showing the most recent.
    pub fn drain_into<S: DisplaySink>(&self, sink: &mut S) -> usize {
        let mut delivered = 0;
        while let Ok(image) = self.rx.try_recv() {
            sink.set_image(image);
            delivered += 1;
        }
        delivered
    }

    /// Block until the next image arrives (or the sending side is gone) and
    /// hand it to the sink. Returns false once no more images can arrive.
    pub fn wait_into<S: DisplaySink>(&self, sink: &mut S) -> bool {
        match self.rx.recv() {
            Ok(image) => {
                sink.set_image(image);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Orientation, PixelData};
    use crate::types::Size;

    struct Collecting {
        sizes: Vec<Size>,
    }

    impl DisplaySink for Collecting {
        fn set_image(&mut self, image: DisplayImage) {
            self.sizes.push(image.display_size());
        }
    }

    fn image(width: u32, height: u32) -> DisplayImage {
        let size = Size::new(width, height);
        let data = vec![0u8; width as usize * 4 * height as usize];
        let pixels = PixelData::from_vec(data, size, width as usize * 4).unwrap();
        DisplayImage::new(pixels, Orientation::Up)
    }

    #[test]
    fn drain_delivers_in_arrival_order() {
        let (handle, queue) = UiQueue::channel();
        handle.post(image(2, 2));
        handle.post(image(4, 4));

        let mut sink = Collecting { sizes: Vec::new() };
        assert_eq!(queue.drain_into(&mut sink), 2);
        assert_eq!(sink.sizes, vec![Size::new(2, 2), Size::new(4, 4)]);
    }

    #[test]
    fn drain_on_empty_queue_is_a_no_op() {
        let (_handle, queue) = UiQueue::channel();
        let mut sink = Collecting { sizes: Vec::new() };
        assert_eq!(queue.drain_into(&mut sink), 0);
        assert!(sink.sizes.is_empty());
    }

    #[test]
    fn post_after_queue_dropped_is_silently_discarded() {
        let (handle, queue) = UiQueue::channel();
        drop(queue);
        handle.post(image(2, 2));
    }
}
