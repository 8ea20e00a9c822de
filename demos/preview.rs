use camera_preview::convert::Converter;
use camera_preview::image::DisplayImage;
use camera_preview::preview::Previewer;
use camera_preview::sink::{DisplaySink, UiQueue};

/// Stand-in for a UI image view: prints what it would display.
struct ConsoleSink {
    shown: u64,
}

impl DisplaySink for ConsoleSink {
    fn set_image(&mut self, image: DisplayImage) {
        self.shown += 1;
        let size = image.display_size();
        println!(
            "Image {}: {}x{} ({:?})",
            self.shown,
            size.width,
            size.height,
            image.orientation(),
        );
    }
}

fn main() {
    env_logger::init();

    #[cfg(target_os = "macos")]
    {
        use std::sync::mpsc;

        use camera_preview::device::{CameraDevice, CameraManager};
        use camera_preview::platform::macos::auth;
        use camera_preview::platform::macos::device::MacosCameraManager;
        use camera_preview::source::{Authorization, FrameSource};
        use camera_preview::types::SessionConfig;

        // Request camera permission, prompting only if still undetermined.
        let status = match auth::authorization_status().expect("failed to read authorization") {
            Authorization::NotDetermined => {
                let (tx, rx) = mpsc::channel();
                auth::request_access(move |status| {
                    let _ = tx.send(status);
                })
                .expect("failed to request access");
                rx.recv().expect("no authorization decision")
            }
            status => status,
        };

        if status != Authorization::Authorized {
            println!("Camera permission not granted.");
            return;
        }

        let Some(device) = MacosCameraManager
            .default_device()
            .expect("failed to get default device")
        else {
            println!("No camera found.");
            return;
        };

        println!("Using: {} ({})", device.name(), device.id());

        let mut source = device
            .open(&SessionConfig::default())
            .expect("failed to open session");

        let (handle, queue) = UiQueue::channel();
        let previewer = Previewer::new(Converter::default(), handle);
        let toggle = previewer.toggle();
        let stats = previewer.stats();

        source
            .start(previewer.into_handler())
            .expect("failed to start source");
        toggle.set(true);

        // Stand-in for the UI loop: drain the hand-off queue here.
        let mut sink = ConsoleSink { shown: 0 };
        while sink.shown < 60 {
            if !queue.wait_into(&mut sink) {
                break;
            }
        }

        source.stop().expect("failed to stop source");

        let s = stats.snapshot();
        println!(
            "\nDone. converted={} skipped={} dropped={} failed={}",
            s.converted, s.skipped, s.dropped, s.failed,
        );
    }

    #[cfg(not(target_os = "macos"))]
    {
        use std::time::Duration;

        use camera_preview::source::FrameSource;
        use camera_preview::synthetic::{SyntheticConfig, SyntheticSource};
        use camera_preview::types::Size;

        println!("No camera backend on this platform; using the synthetic source.");

        let mut source = SyntheticSource::new(SyntheticConfig {
            size: Size::new(1280, 720),
            interval: Duration::from_millis(33),
            frame_limit: Some(60),
            drop_every: Some(10),
        });

        let (handle, queue) = UiQueue::channel();
        let previewer = Previewer::new(Converter::default(), handle);
        let toggle = previewer.toggle();
        let stats = previewer.stats();

        source
            .start(previewer.into_handler())
            .expect("failed to start source");
        toggle.set(true);

        let mut sink = ConsoleSink { shown: 0 };
        while queue.wait_into(&mut sink) {}

        source.stop().expect("failed to stop source");

        let s = stats.snapshot();
        println!(
            "\nDone. converted={} skipped={} dropped={} failed={}",
            s.converted, s.skipped, s.dropped, s.failed,
        );
    }
}
