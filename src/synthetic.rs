//! Synthetic frame source.
//!
//! Generates deterministic BGRA frames on a background thread, standing in
//! for a camera where none is available (tests, CI, the demo on platforms
//! without a backend). Delivery matches the platform contract: a single
//! dedicated thread, one event at a time, frames borrowed for the duration
//! of the callback only.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::{Error, PlatformError};
use crate::frame::{CaptureEvent, RawFrame};
use crate::source::FrameSource;
use crate::types::Size;

/// Configuration for a synthetic source.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub size: Size,
    /// Delivery cadence. Zero means as fast as the consumer runs.
    pub interval: Duration,
    /// Stop after this many deliveries (frames and drops both count).
    pub frame_limit: Option<u64>,
    /// Emit a drop notification instead of every Nth delivery, simulating
    /// the late-frame policy of a real capture session.
    pub drop_every: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        SyntheticConfig {
            size: Size::new(1280, 720),
            interval: Duration::from_millis(33),
            frame_limit: None,
            drop_every: None,
        }
    }
}

/// Background-thread frame source with generated content.
pub struct SyntheticSource {
    config: SyntheticConfig,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        SyntheticSource {
            config,
            worker: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl FrameSource for SyntheticSource {
    type Error = Error;

    fn start<H>(&mut self, mut handler: H) -> Result<(), Self::Error>
    where
        H: FnMut(CaptureEvent<'_>) + Send + 'static,
    {
        if self.worker.is_some() {
            return Err(Error::AlreadyStarted);
        }

        let config = self.config.clone();
        let stop = Arc::clone(&self.stop);
        stop.store(false, Ordering::Relaxed);

        let worker = std::thread::Builder::new()
            .name("camera-preview.synthetic".into())
            .spawn(move || {
                let bytes_per_row = config.size.width as usize * 4;
                let mut pixels = vec![0u8; bytes_per_row * config.size.height as usize];
                let mut delivered: u64 = 0;
                let mut elapsed = Duration::ZERO;

                log::info!(
                    "synthetic source started ({}x{})",
                    config.size.width,
                    config.size.height
                );

                while !stop.load(Ordering::Relaxed) {
                    if config.frame_limit.is_some_and(|limit| delivered >= limit) {
                        break;
                    }
                    delivered += 1;

                    if config.drop_every.is_some_and(|n| n > 0 && delivered % n == 0) {
                        handler(CaptureEvent::Dropped);
                    } else {
                        fill_pattern(&mut pixels, delivered);
                        let frame =
                            RawFrame::from_bgra(&pixels, bytes_per_row, config.size, elapsed);
                        handler(CaptureEvent::Frame(frame));
                    }

                    elapsed += config.interval;
                    if !config.interval.is_zero() {
                        std::thread::sleep(config.interval);
                    }
                }
            })
            .map_err(|_| {
                Error::Platform(PlatformError::Message("failed to spawn delivery thread"))
            })?;

        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        let Some(worker) = self.worker.take() else {
            return Err(Error::NotStarted);
        };
        self.stop.store(true, Ordering::Relaxed);
        let _ = worker.join();
        Ok(())
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}

/// Deterministic per-frame pixel pattern: a gradient that shifts with the
/// frame index, opaque alpha.
fn fill_pattern(pixels: &mut [u8], frame_index: u64) {
    for (i, px) in pixels.chunks_exact_mut(4).enumerate() {
        let v = (i as u64).wrapping_add(frame_index);
        px[0] = (v % 251) as u8;
        px[1] = (v % 241) as u8;
        px[2] = (v % 239) as u8;
        px[3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn delivers_frames_then_stops_at_limit() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            size: Size::new(4, 2),
            interval: Duration::ZERO,
            frame_limit: Some(5),
            drop_every: None,
        });

        let (tx, rx) = mpsc::channel();
        source
            .start(move |event| {
                let is_frame = matches!(event, CaptureEvent::Frame(_));
                let _ = tx.send(is_frame);
            })
            .unwrap();

        let events: Vec<bool> = rx.iter().collect();
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|&is_frame| is_frame));
        source.stop().unwrap();
    }

    #[test]
    fn drop_policy_emits_notifications() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            size: Size::new(4, 2),
            interval: Duration::ZERO,
            frame_limit: Some(10),
            drop_every: Some(5),
        });

        let (tx, rx) = mpsc::channel();
        source
            .start(move |event| {
                let is_frame = matches!(event, CaptureEvent::Frame(_));
                let _ = tx.send(is_frame);
            })
            .unwrap();

        let events: Vec<bool> = rx.iter().collect();
        assert_eq!(events.len(), 10);
        assert_eq!(events.iter().filter(|&&is_frame| !is_frame).count(), 2);
        source.stop().unwrap();
    }

    #[test]
    fn frames_carry_the_configured_geometry() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            size: Size::new(8, 4),
            interval: Duration::ZERO,
            frame_limit: Some(1),
            drop_every: None,
        });

        let (tx, rx) = mpsc::channel();
        source
            .start(move |event| {
                if let CaptureEvent::Frame(frame) = event {
                    let _ = tx.send((
                        frame.size(),
                        frame.planes()[0].bytes_per_row,
                        frame.planes()[0].data.len(),
                    ));
                }
            })
            .unwrap();

        let (size, bytes_per_row, len) = rx.recv().unwrap();
        assert_eq!(size, Size::new(8, 4));
        assert_eq!(bytes_per_row, 32);
        assert_eq!(len, 32 * 4);
        source.stop().unwrap();
    }

    #[test]
    fn double_start_is_rejected() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            frame_limit: Some(1),
            interval: Duration::ZERO,
            ..SyntheticConfig::default()
        });
        source.start(|_| {}).unwrap();
        assert!(matches!(source.start(|_| {}), Err(Error::AlreadyStarted)));
        source.stop().unwrap();
    }

    #[test]
    fn stop_without_start_is_rejected() {
        let mut source = SyntheticSource::new(SyntheticConfig::default());
        assert!(matches!(source.stop(), Err(Error::NotStarted)));
    }
}
